//! Function detection: `<type> <ident> ( <params> ) {` at brace depth 0.

use crate::token::Token;
use crate::types::{FunctionInfo, Parameter, Qualifier};

pub(super) fn parse_functions(source: &str, sig: &[&Token]) -> Vec<FunctionInfo> {
    let mut functions = Vec::new();
    let mut brace_depth: i32 = 0;
    let mut i = 0usize;

    while i < sig.len() {
        if brace_depth == 0 && looks_like_function_header(sig, i) {
            if let Some((info, end_idx)) = try_parse_function(source, sig, i) {
                functions.push(info);
                i = end_idx + 1;
                continue;
            }
        }

        if sig[i].is_punct("{") {
            brace_depth += 1;
        } else if sig[i].is_punct("}") {
            brace_depth -= 1;
        }
        i += 1;
    }

    functions
}

fn looks_like_function_header(sig: &[&Token], i: usize) -> bool {
    sig.get(i).is_some_and(|t| t.kind == crate::token::TokenKind::Type)
        && sig.get(i + 1).is_some_and(|t| t.kind == crate::token::TokenKind::Ident)
        && sig.get(i + 2).is_some_and(|t| t.is_punct("("))
}

/// Returns the parsed function plus the index of its closing `}` token.
fn try_parse_function(source: &str, sig: &[&Token], i: usize) -> Option<(FunctionInfo, usize)> {
    let name = sig[i + 1].lexeme.clone();
    let return_type = sig[i].lexeme.clone();

    // Find the matching ')' for the parameter list.
    let mut paren_depth = 1i32;
    let mut j = i + 3;
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
        // Unbalanced: best-effort, stop here.
        return None;
    }
    let close_paren_idx = j;
    let param_tokens = &sig[(i + 3)..close_paren_idx];

    // The opening '{' must be the very next significant token (whitespace
    // and comments between header and brace are already filtered out).
    let brace_idx = close_paren_idx + 1;
    if !sig.get(brace_idx).is_some_and(|t| t.is_punct("{")) {
        return None;
    }

    let parameters = parse_parameters(param_tokens);
    let signature_text =
        source[sig[i].offset..sig[close_paren_idx].end_offset].to_string();

    let body_start_line = sig[brace_idx].line;

    // Find the matching closing brace, tolerating unbalanced input by
    // falling back to EOF.
    let mut depth = 1i32;
    let mut k = brace_idx + 1;
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
    let (end_idx, end_line) = if depth == 0 {
        (k, sig[k].line)
    } else {
        let last = sig.len() - 1;
        (last, sig[last].line)
    };

    Some((
        FunctionInfo {
            name,
            return_type,
            parameters,
            start_line: sig[i].line,
            body_start_line,
            end_line,
            signature_text,
            body_open_token: brace_idx,
            body_close_token: end_idx,
        },
        end_idx,
    ))
}

fn parse_parameters(tokens: &[&Token]) -> Vec<Parameter> {
    if tokens.is_empty() {
        return Vec::new();
    }
    if tokens.len() == 1 && tokens[0].lexeme == "void" {
        return Vec::new();
    }

    let mut groups: Vec<Vec<&Token>> = Vec::new();
    let mut current: Vec<&Token> = Vec::new();
    let mut depth = 0i32;
    for t in tokens {
        if t.is_punct("(") || t.is_punct("[") {
            depth += 1;
        } else if t.is_punct(")") || t.is_punct("]") {
            depth -= 1;
        }
        if t.is_punct(",") && depth == 0 {
            groups.push(std::mem::take(&mut current));
        } else {
            current.push(t);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups.iter().filter(|g| !g.is_empty()).map(|g| parse_one_parameter(g)).collect()
}

fn parse_one_parameter(group: &[&Token]) -> Parameter {
    let mut idx = 0usize;
    let mut qualifier = Qualifier::None;
    loop {
        match group.get(idx).map(|t| t.lexeme.as_str()) {
            Some("in") => {
                qualifier = Qualifier::In;
                idx += 1;
            }
            Some("out") => {
                qualifier = Qualifier::Out;
                idx += 1;
            }
            Some("inout") => {
                qualifier = Qualifier::InOut;
                idx += 1;
            }
            Some("const") | Some("highp") | Some("mediump") | Some("lowp") => {
                idx += 1;
            }
            _ => break,
        }
    }

    let name = group.last().map(|t| t.lexeme.clone()).unwrap_or_default();
    let ty_tokens = if idx < group.len() {
        &group[idx..group.len() - 1]
    } else {
        &group[0..0]
    };
    let ty = ty_tokens
        .iter()
        .map(|t| t.lexeme.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Parameter { name, ty, qualifier }
}
