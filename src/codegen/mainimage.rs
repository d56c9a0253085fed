//! `mainImage` synthesis and call-site binding for a debugged helper
//! function.

use crate::codegen::classify::expand_statement;
use crate::codegen::lines::{indentation_of, slice_lines};
use crate::codegen::loopcap::copy_with_loop_caps;
use crate::token::{Token, TokenKind};
use crate::types::{
    default_custom_value_for_type, CustomParams, FunctionInfo, GlslType, LoopCaps, LoopInfo,
    Parameter,
};

fn default_args(params: &[Parameter], custom_params: &CustomParams) -> String {
    params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            custom_params
                .get(&i)
                .cloned()
                .unwrap_or_else(|| default_custom_value_for_type(&p.ty))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Finds the first top-level call `target(...)` inside `main_fn`'s body
/// and returns `(arg_text, call_statement_start_line, call_statement_end_line)`.
/// "Top-level" means at brace depth 0 relative to the function body: a call
/// nested inside an `if`/block is not a candidate, since splicing a result
/// declaration in front of it would leave the retained prefix holding an
/// unclosed `{`.
fn find_call(
    sig: &[&Token],
    source: &str,
    main_fn: &FunctionInfo,
    target_name: &str,
) -> Option<(String, usize, usize)> {
    let lo = main_fn.body_open_token + 1;
    let hi = main_fn.body_close_token;
    let mut depth = 0i32;
    let mut call_idx = None;
    for idx in lo..hi {
        let t = sig[idx];
        if t.is_punct("{") {
            depth += 1;
        } else if t.is_punct("}") {
            depth -= 1;
        } else if depth == 0
            && t.kind == TokenKind::Ident
            && t.lexeme == target_name
            && sig.get(idx + 1).is_some_and(|n| n.is_punct("("))
        {
            call_idx = Some(idx);
            break;
        }
    }
    let call_idx = call_idx?;

    let open_idx = call_idx + 1;
    let mut depth = 1i32;
    let mut j = open_idx + 1;
    while j < sig.len() && depth > 0 {
        if sig[j].is_punct("(") {
            depth += 1;
        } else if sig[j].is_punct(")") {
            depth -= 1;
        }
        if depth > 0 {
            j += 1;
        }
    }
    if depth != 0 {
        return None;
    }
    let close_idx = j;
    let arg_tokens = &sig[(open_idx + 1)..close_idx];
    let args_text = split_top_level_args(source, arg_tokens);

    let (stmt_start, stmt_end) = expand_statement(sig, call_idx)?;
    Some((args_text, sig[stmt_start].line, sig[stmt_end].line))
}

fn split_top_level_args(source: &str, tokens: &[&Token]) -> String {
    if tokens.is_empty() {
        return String::new();
    }
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut group_start = 0usize;
    let mut depth = 0i32;
    for (i, t) in tokens.iter().enumerate() {
        if t.is_punct("(") || t.is_punct("[") {
            depth += 1;
        } else if t.is_punct(")") || t.is_punct("]") {
            depth -= 1;
        } else if t.is_punct(",") && depth == 0 {
            groups.push((group_start, i));
            group_start = i + 1;
        }
    }
    groups.push((group_start, tokens.len()));

    groups
        .into_iter()
        .filter(|(s, e)| s < e)
        .map(|(s, e)| source[tokens[s].offset..tokens[e - 1].end_offset].to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the full replacement text of `mainImage` when debugging helper
/// `target_name`. `viz` formats the final visualization
/// statement for the resolved type.
pub(crate) fn synthesize_main_image(
    lines: &[&str],
    source: &str,
    sig: &[&Token],
    main_fn: &FunctionInfo,
    target_name: &str,
    target_params: &[Parameter],
    ty: GlslType,
    custom_params: &CustomParams,
    all_loops: &[LoopInfo],
    loop_caps: &LoopCaps,
    viz: impl Fn(GlslType, &str, &str) -> String,
) -> String {
    let header_text = slice_lines(lines, main_fn.start_line, main_fn.body_start_line);
    let closing_line = slice_lines(lines, main_fn.end_line, main_fn.end_line);

    let (args_text, prefix_text, indent) = match find_call(sig, source, main_fn, target_name) {
        Some((args, stmt_start_line, _stmt_end_line)) => {
            let indent = indentation_of(lines, stmt_start_line);
            let prefix = if stmt_start_line > main_fn.body_start_line + 1 {
                copy_with_loop_caps(
                    lines,
                    main_fn.body_start_line + 1,
                    stmt_start_line - 1,
                    all_loops,
                    loop_caps,
                )
            } else {
                String::new()
            };
            (args, prefix, indent)
        }
        None => {
            let indent = indentation_of(lines, main_fn.body_start_line + 1);
            let indent = if indent.is_empty() { "    ".to_string() } else { indent };
            (default_args(target_params, custom_params), String::new(), indent)
        }
    };

    let decl = format!("{indent}{} result = {target_name}({args_text});", ty.glsl());
    let viz_stmt = viz(ty, "result", &indent);

    let body = [prefix_text, decl, viz_stmt]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    format!("{header_text}\n{body}\n{closing_line}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::lines::split_lines;
    use crate::lexer::tokenize;
    use crate::parser::{self, significant_tokens};
    use crate::types::GlslType;
    use std::collections::BTreeMap;

    fn viz_float(_ty: GlslType, expr: &str, indent: &str) -> String {
        format!("{indent}fragColor = vec4(vec3({expr}), 1.0);")
    }

    #[test]
    fn binds_call_site_when_helper_is_called() {
        let src = "\
float spiralSDF(vec2 st, float turns) {
    return length(st);
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord.xy;
    float l = spiralSDF(uv, 50.0);
    fragColor = vec4(vec3(l), 1.0);
}
";
        let lines = split_lines(src);
        let tokens = tokenize(src);
        let sig = significant_tokens(&tokens);
        let program = parser::parse(src);
        let main_fn = program.find_function("mainImage").unwrap();
        let target = program.find_function("spiralSDF").unwrap();
        let out = synthesize_main_image(
            &lines,
            src,
            &sig,
            main_fn,
            "spiralSDF",
            &target.parameters,
            GlslType::Float,
            &BTreeMap::new(),
            &program.loops,
            &BTreeMap::new(),
            viz_float,
        );
        assert!(out.contains("float result = spiralSDF(uv, 50.0);"));
        assert!(out.contains("fragColor = vec4(vec3(result), 1.0);"));
        assert!(!out.contains("float l = spiralSDF"));
    }

    #[test]
    fn synthesizes_default_call_when_helper_not_called() {
        let src = "\
vec2 sdCutHollowSphere(vec3 p, float r, float h, float t) {
    return vec2(length(p) - r, h);
}

float otherHelper(vec3 p) {
    vec2 d = sdCutHollowSphere(p, 0.5, 0.5, 0.5);
    return d.x;
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord.xy;
    fragColor = vec4(otherHelper(vec3(uv, 0.0)));
}
";
        let lines = split_lines(src);
        let tokens = tokenize(src);
        let sig = significant_tokens(&tokens);
        let program = parser::parse(src);
        let main_fn = program.find_function("mainImage").unwrap();
        let target = program.find_function("sdCutHollowSphere").unwrap();
        let out = synthesize_main_image(
            &lines,
            src,
            &sig,
            main_fn,
            "sdCutHollowSphere",
            &target.parameters,
            GlslType::Vec2,
            &BTreeMap::new(),
            &program.loops,
            &BTreeMap::new(),
            |ty, expr, indent| format!("{indent}fragColor = vec4({expr}, {ty_glsl_discard});", ty_glsl_discard = ty.glsl()),
        );
        assert!(out.contains("sdCutHollowSphere("));
        assert!(!out.contains("p, 0.5, 0.5, 0.5"));
        assert!(!out.contains(" d "));
    }

    #[test]
    fn nested_call_is_not_treated_as_top_level() {
        // `spiralSDF` is only called inside an `if` block, not at brace
        // depth 0 in `mainImage` — binding to it there would splice the
        // result declaration in front of an unclosed `{`, so this must fall
        // back to a synthesized default call site instead.
        let src = "\
float spiralSDF(vec2 st, float turns) {
    return length(st) * turns;
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord.xy;
    if (uv.x > 0.5) {
        float l = spiralSDF(uv, 50.0);
        fragColor = vec4(vec3(l), 1.0);
    }
}
";
        let lines = split_lines(src);
        let tokens = tokenize(src);
        let sig = significant_tokens(&tokens);
        let program = parser::parse(src);
        let main_fn = program.find_function("mainImage").unwrap();
        let target = program.find_function("spiralSDF").unwrap();
        let out = synthesize_main_image(
            &lines,
            src,
            &sig,
            main_fn,
            "spiralSDF",
            &target.parameters,
            GlslType::Float,
            &BTreeMap::new(),
            &program.loops,
            &BTreeMap::new(),
            viz_float,
        );
        assert!(!out.contains("uv, 50.0"), "must not bind to the nested call's arguments");
        assert!(out.contains("float result = spiralSDF("));
        // The retained text must stay brace-balanced.
        let opens = out.matches('{').count();
        let closes = out.matches('}').count();
        assert_eq!(opens, closes);
    }
}
