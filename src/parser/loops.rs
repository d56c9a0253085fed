//! Loop detection: `for`/`while` headers and their bodies, numbered
//! globally in source order.

use crate::token::Token;
use crate::types::LoopInfo;

pub(super) fn parse_loops(source: &str, sig: &[&Token]) -> Vec<LoopInfo> {
    let mut loops = Vec::new();
    let mut next_index = 0usize;
    let mut i = 0usize;

    while i < sig.len() {
        let is_loop_keyword = sig[i].is_keyword("for") || sig[i].is_keyword("while");
        if !is_loop_keyword || !sig.get(i + 1).is_some_and(|t| t.is_punct("(")) {
            i += 1;
            continue;
        }

        let header_start = i;

        // Matching ')' of the header.
        let mut paren_depth = 1i32;
        let mut j = i + 2;
        while j < sig.len() && paren_depth > 0 {
            if sig[j].is_punct("(") {
                paren_depth += 1;
            } else if sig[j].is_punct(")") {
                paren_depth -= 1;
            }
            if paren_depth > 0 {
                j += 1;
            }
        }
        if paren_depth != 0 {
            i += 1;
            continue;
        }
        let close_paren_idx = j;
        let loop_header =
            source[sig[header_start].offset..sig[close_paren_idx].end_offset].to_string();

        let body_idx = close_paren_idx + 1;
        let end_line = if sig.get(body_idx).is_some_and(|t| t.is_punct("{")) {
            let mut depth = 1i32;
            let mut k = body_idx + 1;
            while k < sig.len() && depth > 0 {
                if sig[k].is_punct("{") {
                    depth += 1;
                } else if sig[k].is_punct("}") {
                    depth -= 1;
                }
                if depth > 0 {
                    k += 1;
                }
            }
            if depth == 0 {
                sig[k].line
            } else {
                sig[sig.len() - 1].line
            }
        } else {
            // Single statement body, terminated by a top-level ';'.
            let mut depth = 0i32;
            let mut k = body_idx;
            let mut found = None;
            while k < sig.len() {
                if sig[k].is_punct("(") || sig[k].is_punct("{") {
                    depth += 1;
                } else if sig[k].is_punct(")") || sig[k].is_punct("}") {
                    depth -= 1;
                } else if sig[k].is_punct(";") && depth <= 0 {
                    found = Some(k);
                    break;
                }
                k += 1;
            }
            match found {
                Some(k) => sig[k].line,
                None => sig[sig.len() - 1].line,
            }
        };

        loops.push(LoopInfo {
            loop_index: next_index,
            line_number: sig[header_start].line,
            end_line,
            loop_header,
            max_iter: None,
        });
        next_index += 1;
        i = header_start + 1;
    }

    loops
}
