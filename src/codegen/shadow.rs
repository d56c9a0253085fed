//! Builds the truncated function body shared by both rewrite targets
//!: a `mainImage` being debugged directly, and a helper
//! function being debugged (whose body ends in `return` rather than a
//! `fragColor` assignment — see `mainimage.rs`/`codegen/mod.rs` for the
//! two callers).
//!
//! Handles the shadow-variable rule
//! uniformly for every classification category: a loop-enclosed debug
//! line never breaks control flow, so the visualized value is captured
//! into `_dbgShadow` and the loop's own body is otherwise left alone.

use crate::codegen::classify::{Category, Classification};
use crate::codegen::loopcap::{copy_with_loop_caps, header_with_capped_break};
use crate::codegen::lines::{indentation_of, slice_lines};
use crate::types::{FunctionInfo, GlslType, LoopCaps, LoopInfo};

pub(crate) struct BodyParts {
    /// Everything from just after the opening `{` through either the
    /// debug statement (no enclosing loop) or the outermost enclosing
    /// loop's closing brace (shadowed).
    pub body_lines: String,
    /// The symbol to use in the trailing `fragColor = …`/`return …`
    /// statement emitted by the caller.
    pub trailing_value: String,
    /// Indentation of wherever the trailing statement should sit — the
    /// debug line's own indent when there's no enclosing loop, or the
    /// outermost loop's indent (one level out) when shadowed.
    pub trailing_indent: String,
}

/// `enclosing_loops` must already be sorted outermost-first
/// (`ParsedProgram::loops_enclosing`).
pub(crate) fn build_body_parts(
    lines: &[&str],
    f: &FunctionInfo,
    enclosing_loops: &[&LoopInfo],
    classification: &Classification,
    ty: GlslType,
    all_loops: &[LoopInfo],
    loop_caps: &LoopCaps,
) -> BodyParts {
    let stmt_indent = indentation_of(lines, classification.stmt_start_line);

    match enclosing_loops.first() {
        None => {
            let prefix = copy_with_loop_caps(
                lines,
                f.body_start_line + 1,
                classification.stmt_start_line.saturating_sub(1),
                all_loops,
                loop_caps,
            );
            let (statement_text, trailing_value) = match classification.category {
                Category::Return => {
                    let expr = classification.expr_text.as_deref().unwrap_or_default();
                    (
                        format!("{stmt_indent}{} _dbgReturn = {expr};", f.return_type),
                        "_dbgReturn".to_string(),
                    )
                }
                _ => (
                    slice_lines(lines, classification.stmt_start_line, classification.stmt_end_line),
                    classification.name.clone(),
                ),
            };

            let body_lines = [prefix, statement_text]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");

            BodyParts { body_lines, trailing_value, trailing_indent: stmt_indent }
        }
        Some(outer) => {
            let outer_indent = indentation_of(lines, outer.line_number);
            let prefix_before_outer = copy_with_loop_caps(
                lines,
                f.body_start_line + 1,
                outer.line_number.saturating_sub(1),
                all_loops,
                loop_caps,
            );
            let shadow_decl = format!("{outer_indent}{} _dbgShadow;", ty.glsl());

            // The loop directly enclosing the debug line is capped from
            // here rather than by `copy_with_loop_caps`'s own single-range
            // scan: its body is split across `loop_prefix`,
            // `statement_and_shadow` and `remainder` below, none of which
            // spans the loop's full `line_number..=end_line`, so that scan
            // would never see it as fully contained and would silently
            // skip the cap.
            let (loop_header, body_start_line, needs_closing_brace) =
                match loop_caps.get(&outer.loop_index) {
                    Some(&cap) => {
                        let (text, next_line, synthesized) =
                            header_with_capped_break(lines, outer, cap);
                        (text, next_line, synthesized)
                    }
                    None => (String::new(), outer.line_number, false),
                };

            let loop_prefix = if classification.stmt_start_line > body_start_line {
                copy_with_loop_caps(
                    lines,
                    body_start_line,
                    classification.stmt_start_line - 1,
                    all_loops,
                    loop_caps,
                )
            } else {
                String::new()
            };

            let statement_and_shadow = match classification.category {
                Category::Return => {
                    let expr = classification.expr_text.as_deref().unwrap_or_default();
                    format!("{stmt_indent}_dbgShadow = {expr};")
                }
                _ => {
                    let verbatim =
                        slice_lines(lines, classification.stmt_start_line, classification.stmt_end_line);
                    let shadow_assign = format!("{stmt_indent}_dbgShadow = {};", classification.name);
                    format!("{verbatim}\n{shadow_assign}")
                }
            };

            let remainder = copy_with_loop_caps(
                lines,
                classification.stmt_end_line + 1,
                outer.end_line,
                all_loops,
                loop_caps,
            );

            // A capped, originally braceless loop had no source `}` to copy
            // via `remainder`, so one is synthesized to close the block
            // `header_with_capped_break` opened.
            let closing_brace =
                if needs_closing_brace { format!("{outer_indent}}}") } else { String::new() };

            let body_lines = [
                prefix_before_outer,
                shadow_decl,
                loop_header,
                loop_prefix,
                statement_and_shadow,
                remainder,
                closing_brace,
            ]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

            BodyParts {
                body_lines,
                trailing_value: "_dbgShadow".to_string(),
                trailing_indent: outer_indent,
            }
        }
    }
}
