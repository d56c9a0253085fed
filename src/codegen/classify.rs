//! Debug-expression classification.
//!
//! Joins the logical statement around the debug line (scanning forward to
//! the terminating `;` and backward to the previous statement boundary),
//! then keys off the first token to decide declaration vs. assignment vs.
//! `return` — a type keyword appearing first always means a declaration,
//! even inside an expression that happens to start with a constructor
//! call like `vec2(...)`.

use crate::token::{Token, TokenKind};
use crate::types::LoopInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
    Declaration,
    Assignment,
    Return,
}

/// The result of classifying the logical statement that contains the
/// debug line.
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    pub category: Category,
    /// Variable name for `Declaration`/`Assignment`; unused for `Return`
    /// (the visualized symbol there is always the synthesized shadow).
    pub name: String,
    /// `Some(ty)` only when the statement is itself a typed declaration;
    /// `Assignment` and `Return` are typed later.
    pub declared_type: Option<String>,
    /// The textual return expression, only populated for `Category::Return`.
    pub expr_text: Option<String>,
    pub stmt_start_line: usize,
    pub stmt_end_line: usize,
    /// Index of the statement's first token in the significant-token
    /// stream, used as the upper bound for the backward type scan
    ///.
    pub stmt_start_idx: usize,
}

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/="];
const CMP_OPS: &[&str] = &["==", "!=", "<=", ">="];

fn first_index_on_line(sig: &[&Token], line: usize) -> Option<usize> {
    sig.iter().position(|t| t.line == line && t.kind != TokenKind::Preprocessor)
}

/// Expands `anchor` outward to the bounds of its enclosing statement:
/// backward to the previous `;`, `{`, or `}`; forward to the next
/// top-level `;` (paren/bracket depth returns to zero before it counts).
/// Returns `(start_idx, end_idx)`, both inclusive, where `end_idx` is the
/// terminating `;` token. `None` if no terminator is found (malformed/EOF).
pub(crate) fn expand_statement(sig: &[&Token], anchor: usize) -> Option<(usize, usize)> {
    let mut start = anchor;
    while start > 0 {
        let prev = sig[start - 1];
        if prev.is_punct(";") || prev.is_punct("{") || prev.is_punct("}") {
            break;
        }
        start -= 1;
    }

    let mut depth = 0i32;
    let mut end = anchor;
    while end < sig.len() {
        let t = sig[end];
        if t.is_punct("(") || t.is_punct("[") || t.is_punct("{") {
            depth += 1;
        } else if t.is_punct(")") || t.is_punct("]") || t.is_punct("}") {
            if depth == 0 {
                // Hit an unmatched close before any ';' — e.g. the debug
                // line sits inside a loop header's parens, or is itself a
                // control statement with a block body. Not a statement
                // shape this classifier handles.
                return None;
            }
            depth -= 1;
        } else if t.is_punct(";") && depth == 0 {
            return Some((start, end));
        }
        end += 1;
    }
    None
}

/// Strips whitespace from both and checks the caller-supplied line content
/// actually occurs within the extracted statement, guarding against a
/// stale call from a host that hasn't re-synced line numbers yet.
fn content_is_fresh(content: &str, statement_text: &str) -> bool {
    let needle: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    if needle.is_empty() {
        return true;
    }
    let haystack: String = statement_text.chars().filter(|c| !c.is_whitespace()).collect();
    haystack.contains(&needle)
}

enum TopLevelOp {
    Assign(usize),
    Cmp,
}

/// Scans statement tokens (excluding the trailing `;`) for the first
/// top-level assignment or comparison operator. Comparisons occurring
/// after an assignment operator (e.g. the `a == b` in `bool f = a == b;`)
/// are part of the RHS and don't count — only whichever operator class
/// appears *first* decides the statement's shape.
fn find_top_level_op(stmt_tokens: &[&Token]) -> Option<TopLevelOp> {
    let mut depth = 0i32;
    for (idx, t) in stmt_tokens.iter().enumerate() {
        if t.is_punct("(") || t.is_punct("[") {
            depth += 1;
        } else if t.is_punct(")") || t.is_punct("]") {
            depth -= 1;
        } else if depth == 0 && t.kind == TokenKind::Punct {
            if ASSIGN_OPS.contains(&t.lexeme.as_str()) {
                return Some(TopLevelOp::Assign(idx));
            }
            if CMP_OPS.contains(&t.lexeme.as_str()) || t.lexeme == "<" || t.lexeme == ">" {
                return Some(TopLevelOp::Cmp);
            }
        }
    }
    None
}

/// Root identifier of a (possibly swizzled) lvalue: `uv.x` strips down to
/// `uv`.
fn root_name(lhs: &[&Token]) -> Option<String> {
    lhs.first().filter(|t| t.kind == TokenKind::Ident).map(|t| t.lexeme.clone())
}

pub(crate) fn classify_debug_line(
    source: &str,
    sig: &[&Token],
    all_loops: &[LoopInfo],
    line: usize,
    content: &str,
) -> Option<Classification> {
    // A debug line selected on a loop header is never debuggable: it's not
    // an assignment statement.
    if all_loops.iter().any(|l| l.line_number == line) {
        return None;
    }

    let anchor = first_index_on_line(sig, line)?;
    let (start, end) = expand_statement(sig, anchor)?;
    let stmt_tokens = &sig[start..=end];
    let stmt_start_line = sig[start].line;
    let stmt_end_line = sig[end].line;

    let statement_text = source[sig[start].offset..sig[end].end_offset].to_string();
    if !content_is_fresh(content, &statement_text) {
        return None;
    }

    let first = stmt_tokens[0];

    if first.kind == TokenKind::Keyword && first.lexeme == "return" {
        let expr_tokens = &stmt_tokens[1..stmt_tokens.len() - 1];
        if expr_tokens.is_empty() {
            return None;
        }
        let expr_text =
            source[expr_tokens[0].offset..expr_tokens[expr_tokens.len() - 1].end_offset].to_string();
        return Some(Classification {
            category: Category::Return,
            name: "_dbgReturn".to_string(),
            declared_type: None,
            expr_text: Some(expr_text),
            stmt_start_line,
            stmt_end_line,
            stmt_start_idx: start,
        });
    }

    if first.kind == TokenKind::Type {
        let name_tok = stmt_tokens.get(1)?;
        if name_tok.kind != TokenKind::Ident {
            return None;
        }
        let after = stmt_tokens.get(2)?;
        if !(after.is_punct("=") || after.is_punct(";")) {
            return None;
        }
        return Some(Classification {
            category: Category::Declaration,
            name: name_tok.lexeme.clone(),
            declared_type: Some(first.lexeme.clone()),
            expr_text: None,
            stmt_start_line,
            stmt_end_line,
            stmt_start_idx: start,
        });
    }

    // Not a declaration and not `return`: look for the first top-level
    // operator. Assignment (including compound) wins; a bare comparison or
    // a no-operator expression statement is not debuggable.
    let body_tokens = &stmt_tokens[..stmt_tokens.len() - 1];
    match find_top_level_op(body_tokens) {
        Some(TopLevelOp::Assign(op_idx)) => {
            let lhs = &body_tokens[..op_idx];
            let name = root_name(lhs)?;
            Some(Classification {
                category: Category::Assignment,
                name,
                declared_type: None,
                expr_text: None,
                stmt_start_line,
                stmt_end_line,
                stmt_start_idx: start,
            })
        }
        Some(TopLevelOp::Cmp) | None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::significant_tokens;

    fn classify(src: &str, line: usize) -> Option<Classification> {
        let tokens = tokenize(src);
        let sig = significant_tokens(&tokens);
        classify_debug_line(src, &sig, &[], line, "")
    }

    #[test]
    fn typed_declaration_with_init() {
        let c = classify("float l = length(uv);", 1).unwrap();
        assert_eq!(c.category, Category::Declaration);
        assert_eq!(c.name, "l");
        assert_eq!(c.declared_type.as_deref(), Some("float"));
    }

    #[test]
    fn bare_declaration_no_init() {
        let c = classify("float l;", 1).unwrap();
        assert_eq!(c.category, Category::Declaration);
        assert_eq!(c.declared_type.as_deref(), Some("float"));
    }

    #[test]
    fn assignment_to_existing_name() {
        let c = classify("wp = vec3(1.0);", 1).unwrap();
        assert_eq!(c.category, Category::Assignment);
        assert_eq!(c.name, "wp");
    }

    #[test]
    fn compound_assignment_is_assignment_not_declaration() {
        let c = classify("wp *= mix(vec3(1.0), vec3(2.0), 0.5);", 1).unwrap();
        assert_eq!(c.category, Category::Assignment);
        assert_eq!(c.name, "wp");
    }

    #[test]
    fn swizzled_lhs_roots_to_base_name() {
        let c = classify("uv.x *= 2.0;", 1).unwrap();
        assert_eq!(c.category, Category::Assignment);
        assert_eq!(c.name, "uv");
    }

    #[test]
    fn return_statement() {
        let c = classify("return step(0.1, sin(r));", 1).unwrap();
        assert_eq!(c.category, Category::Return);
        assert_eq!(c.expr_text.as_deref(), Some("step(0.1, sin(r))"));
    }

    #[test]
    fn comparison_is_not_debuggable() {
        assert!(classify("if (a == b) { x = 1.0; }", 1).is_none());
        assert!(classify("a == b;", 1).is_none());
    }

    #[test]
    fn bare_expression_is_not_debuggable() {
        assert!(classify("doSomething(x);", 1).is_none());
    }

    #[test]
    fn comparison_inside_assignment_rhs_is_fine() {
        let c = classify("bool flag = a == b;", 1).unwrap();
        assert_eq!(c.category, Category::Declaration);
        assert_eq!(c.declared_type.as_deref(), Some("bool"));
    }

    #[test]
    fn stale_content_rejected() {
        let tokens = tokenize("float l = length(uv);");
        let sig = significant_tokens(&tokens);
        let c = classify_debug_line(
            "float l = length(uv);",
            &sig,
            &[],
            1,
            "totally different statement",
        );
        assert!(c.is_none());
    }
}
