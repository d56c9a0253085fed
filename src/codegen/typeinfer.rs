//! Type inference for the visualized expression.
//!
//! A typed declaration already carries its type; everything else falls
//! back to a backward scan for the nearest prior `T name` / `T name = …`
//! of the same root name, first within the enclosing function, then
//! within file-scope globals — mirroring how a GLSL compiler's own scope
//! resolution would walk outward, just without building real scopes.

use crate::codegen::classify::{Category, Classification};
use crate::token::{Token, TokenKind};
use crate::types::{FunctionInfo, GlslType};

/// Scans backward from `before_idx` (exclusive) for the nearest
/// `<type> <root_name> (=|;|\[)` pattern, skipping over tokens that
/// belong to some *other* function (so a same-named local in a sibling
/// helper is never mistaken for this one).
fn backward_scan_type(
    sig: &[&Token],
    functions: &[FunctionInfo],
    current_fn: Option<&FunctionInfo>,
    before_idx: usize,
    root_name: &str,
) -> Option<String> {
    let mut idx = before_idx;
    while idx > 0 {
        idx -= 1;
        let t = sig[idx];

        let inside_current = current_fn.is_some_and(|f| t.line >= f.body_start_line && t.line <= f.end_line);
        let inside_other = functions.iter().any(|of| {
            Some(of.name.as_str()) != current_fn.map(|f| f.name.as_str()) && of.contains_line(t.line)
        });
        if !inside_current && inside_other {
            continue;
        }

        if t.kind == TokenKind::Type {
            if let (Some(name_tok), Some(op_tok)) = (sig.get(idx + 1), sig.get(idx + 2)) {
                if name_tok.lexeme == root_name
                    && (op_tok.is_punct("=") || op_tok.is_punct(";") || op_tok.is_punct("["))
                {
                    return Some(t.lexeme.clone());
                }
            }
        }
    }
    None
}

/// Resolves the declared-or-inferred type of the classified expression
///. Returns `None` when no type can be determined
/// (step 4: "if no type is found, return absent").
pub(crate) fn infer_type(
    sig: &[&Token],
    functions: &[FunctionInfo],
    current_fn: Option<&FunctionInfo>,
    stmt_start_idx: usize,
    classification: &Classification,
) -> Option<GlslType> {
    match classification.category {
        Category::Declaration => GlslType::parse(classification.declared_type.as_deref()?),
        Category::Return => {
            let f = current_fn?;
            GlslType::parse(&f.return_type)
        }
        Category::Assignment => {
            let ty = backward_scan_type(
                sig,
                functions,
                current_fn,
                stmt_start_idx,
                &classification.name,
            )?;
            GlslType::parse(&ty)
        }
    }
}
