//! Loop iteration capping.
//!
//! Applied as part of every verbatim line-range copy the assembler does,
//! rather than as a separate whole-file pass: each copy already knows the
//! original line numbers it's pulling from, so it's the natural place to
//! splice in a loop's counter/break pair without having to re-locate loops
//! in output text whose line numbers have since shifted.

use crate::codegen::lines::indentation_of;
use crate::types::{LoopCaps, LoopInfo};

/// Splits a braceless loop's `line_number..=end_line` source text into its
/// header (through the closing paren of the loop's condition) and its
/// single trailing statement. Works whether the statement shares the
/// header's physical line or sits on its own.
fn split_braceless_loop(lines: &[&str], loop_info: &LoopInfo) -> (String, String) {
    let joined = lines[(loop_info.line_number - 1)..loop_info.end_line].join("\n");
    let paren_start = joined.find('(').expect("loop header has a '('");
    let mut paren_depth = 0i32;
    let mut header_end = None;
    for (i, c) in joined.char_indices().filter(|(i, _)| *i >= paren_start) {
        match c {
            '(' => paren_depth += 1,
            ')' => {
                paren_depth -= 1;
                if paren_depth == 0 {
                    header_end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let header_end = header_end.expect("loop header parens are balanced");
    let header_text = joined[..=header_end].to_string();
    let stmt_text = joined[header_end + 1..].trim().to_string();
    (header_text, stmt_text)
}

/// Declares `_dbgIter{idx}` then emits the loop header (and, for a block
/// body, the lines through its opening `{`) with
/// `if (++_dbgIter{idx} > cap) break;` spliced in as the body's first
/// statement. Used by the shadow-variable path in `codegen::shadow`, where
/// the loop directly enclosing the debug line is capped but its body is
/// assembled from several independently-copied pieces rather than one
/// contiguous range.
///
/// Returns `(text, first_body_line, needs_closing_brace)`: `first_body_line`
/// is the 1-based line of the loop's first real body statement, and
/// `needs_closing_brace` is set when the loop had no source braces to begin
/// with, so the caller must supply a synthetic closing `}` once it has
/// finished emitting the rest of the body.
pub(crate) fn header_with_capped_break(
    lines: &[&str],
    loop_info: &LoopInfo,
    cap: u32,
) -> (String, usize, bool) {
    let idx = loop_info.loop_index;
    let indent = indentation_of(lines, loop_info.line_number);
    let mut out = vec![format!("{indent}int _dbgIter{idx} = 0;")];

    let has_block_body =
        (loop_info.line_number..=loop_info.end_line).any(|l| lines[l - 1].contains('{'));

    if has_block_body {
        out.push(lines[loop_info.line_number - 1].to_string());
        let mut cursor = loop_info.line_number;
        while !lines[cursor - 1].contains('{') && cursor < loop_info.end_line {
            cursor += 1;
            out.push(lines[cursor - 1].to_string());
        }
        let body_indent = indentation_of(lines, (cursor + 1).min(lines.len()));
        out.push(format!("{body_indent}if (++_dbgIter{idx} > {cap}) break;"));
        (out.join("\n"), cursor + 1, false)
    } else {
        let (header_text, _stmt_text) = split_braceless_loop(lines, loop_info);
        let body_indent = format!("{indent}    ");
        out.push(format!("{header_text} {{"));
        out.push(format!("{body_indent}if (++_dbgIter{idx} > {cap}) break;"));
        (out.join("\n"), loop_info.end_line + 1, true)
    }
}

/// Copies source lines `start..=end` (1-based, inclusive) verbatim, except
/// that any loop in `loops` which both lies *entirely* within that range
/// and has an entry in `loop_caps` gets a counter declared immediately
/// before its header and a capped-break as the first statement of its
/// body. Untouched otherwise: headers, conditions and
/// updates are never rewritten.
pub(crate) fn copy_with_loop_caps(
    lines: &[&str],
    start: usize,
    end: usize,
    loops: &[LoopInfo],
    loop_caps: &LoopCaps,
) -> String {
    if start == 0 || start > end {
        return String::new();
    }
    let end = end.min(lines.len());

    let mut capped: Vec<&LoopInfo> = loops
        .iter()
        .filter(|l| {
            l.line_number >= start && l.end_line <= end && loop_caps.contains_key(&l.loop_index)
        })
        .collect();
    capped.sort_by_key(|l| l.line_number);

    let mut out = Vec::new();
    let mut line_no = start;
    while line_no <= end {
        if let Some(loop_info) = capped.iter().find(|l| l.line_number == line_no) {
            let cap = loop_caps[&loop_info.loop_index];
            let idx = loop_info.loop_index;
            let indent = indentation_of(lines, line_no);
            out.push(format!("{indent}int _dbgIter{idx} = 0;"));

            let has_block_body =
                (line_no..=loop_info.end_line).any(|l| lines[l - 1].contains('{'));

            if has_block_body {
                // Emit the header line itself, which may carry the opening
                // `{` already or have it on a later line.
                out.push(lines[line_no - 1].to_string());
                let mut cursor = line_no;
                while !lines[cursor - 1].contains('{') && cursor < loop_info.end_line {
                    cursor += 1;
                    out.push(lines[cursor - 1].to_string());
                }
                let body_indent = indentation_of(lines, (cursor + 1).min(lines.len()));
                out.push(format!("{body_indent}if (++_dbgIter{idx} > {cap}) break;"));
                line_no = cursor + 1;
            } else {
                // Single-statement body, no braces anywhere: header and
                // statement may even share one physical line
                // (`for (...) s += 1.0;`). Splice in a block so the capped
                // break lands as the body's first statement instead of
                // trailing text after the loop entirely.
                let (header_text, stmt_text) = split_braceless_loop(lines, loop_info);
                let body_indent = format!("{indent}    ");
                out.push(format!("{header_text} {{"));
                out.push(format!("{body_indent}if (++_dbgIter{idx} > {cap}) break;"));
                out.push(format!("{body_indent}{stmt_text}"));
                out.push(format!("{indent}}}"));
                line_no = loop_info.end_line + 1;
            }
            continue;
        }

        out.push(lines[line_no - 1].to_string());
        line_no += 1;
    }

    out.join("\n")
}
