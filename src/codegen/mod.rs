//! Code Generator — the central rewriter.
//!
//! Orchestrates classification, type inference, the shadow/truncation
//! rules and `mainImage` synthesis into the single entry point the facade
//! (`crate::debugger`) calls.

mod classify;
pub(crate) mod lines;
mod loopcap;
mod mainimage;
mod shadow;
mod typeinfer;

use std::collections::HashSet;

use crate::lexer::tokenize;
use crate::parser::{self, significant_tokens};
use crate::types::{CustomParams, FunctionInfo, GlslType, LoopCaps};

use classify::Classification;
use lines::{collect_global_prefix, slice_lines, split_lines};
use loopcap::copy_with_loop_caps;
use shadow::build_body_parts;

fn viz_statement(ty: GlslType, expr: &str, indent: &str) -> String {
    match ty {
        GlslType::Float | GlslType::Int | GlslType::Bool => {
            format!("{indent}fragColor = vec4(vec3({expr}), 1.0);")
        }
        GlslType::Vec2 => format!("{indent}fragColor = vec4({expr}, 0.0, 1.0);"),
        GlslType::Vec3 => format!("{indent}fragColor = vec4({expr}, 1.0);"),
        GlslType::Vec4 => format!("{indent}fragColor = {expr};"),
    }
}

fn rewrite_header_return_type(header_text: &str, old_ty: &str, new_ty: &str) -> String {
    match header_text.strip_prefix(old_ty) {
        Some(rest) => format!("{new_ty}{rest}"),
        None => header_text.to_string(),
    }
}

/// Names of functions textually called (by substring match on `name(`)
/// within `text` — used to pull in helpers referenced by a retained
/// verbatim prefix of `mainImage` that itself calls something other than
/// the debugged function.
fn names_called_in(text: &str, candidates: &[FunctionInfo]) -> Vec<String> {
    candidates
        .iter()
        .filter(|f| f.name != "mainImage")
        .filter(|f| text.contains(&format!("{}(", f.name)))
        .map(|f| f.name.clone())
        .collect()
}

/// Assembles the final shader: global prefix, retained helper functions in
/// original source order (rewritten text substituted in where present),
/// and the synthesized/rewritten `mainImage` last.
fn assemble(
    lines: &[&str],
    program: &parser::ParsedProgram,
    rewritten: &std::collections::HashMap<String, String>,
    reachable: &HashSet<String>,
    loop_caps: &LoopCaps,
    main_image_text: String,
) -> String {
    let mut ordered: Vec<&FunctionInfo> =
        program.functions.iter().filter(|f| f.name != "mainImage").collect();
    ordered.sort_by_key(|f| f.start_line);

    let prefix = match ordered.first() {
        Some(first) => collect_global_prefix(lines, &program.functions, first),
        None => match program.find_function("mainImage") {
            Some(mi) => collect_global_prefix(lines, &program.functions, mi),
            None => String::new(),
        },
    };

    let mut sections = vec![prefix];
    for f in ordered {
        if !reachable.contains(&f.name) {
            continue;
        }
        let text = rewritten
            .get(&f.name)
            .cloned()
            .unwrap_or_else(|| copy_with_loop_caps(lines, f.start_line, f.end_line, &program.loops, loop_caps));
        sections.push(text);
    }
    sections.push(main_image_text);

    sections.into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join("\n\n") + "\n"
}

/// `modifyShaderForDebugging`.
pub fn generate(
    source: &str,
    line: usize,
    content: &str,
    custom_params: Option<&CustomParams>,
    loop_caps: Option<&LoopCaps>,
) -> Option<String> {
    if line == 0 {
        return None;
    }

    let empty_custom = CustomParams::new();
    let empty_caps = LoopCaps::new();
    let custom_params = custom_params.unwrap_or(&empty_custom);
    let loop_caps = loop_caps.unwrap_or(&empty_caps);

    let lines = split_lines(source);
    let tokens = tokenize(source);
    let sig = significant_tokens(&tokens);
    let program = parser::parse(source);

    let current_fn = program.function_containing_line(line);
    let classification = classify::classify_debug_line(source, &sig, &program.loops, line, content)?;
    let ty = typeinfer::infer_type(&sig, &program.functions, current_fn, classification.stmt_start_idx, &classification)?;

    match current_fn {
        None => Some(generate_global(&lines, &program, &classification, ty)),
        Some(f) if f.name == "mainImage" => {
            let enclosing = program.loops_enclosing(f, line);
            let parts = build_body_parts(&lines, f, &enclosing, &classification, ty, &program.loops, loop_caps);
            let header_text = slice_lines(&lines, f.start_line, f.body_start_line);
            let closing_line = slice_lines(&lines, f.end_line, f.end_line);
            let trailing = viz_statement(ty, &parts.trailing_value, &parts.trailing_indent);
            let main_image_text =
                format!("{header_text}\n{}\n{trailing}\n{closing_line}", parts.body_lines);

            // `mainImage`'s body may have been truncated at the debug
            // statement (or at the enclosing loop's end), dropping whatever
            // followed it in the original source — so reachability must be
            // seeded from what the truncated/synthesized text actually
            // calls, not from a full-body scan of the untouched source
            // (which would over-retain helpers only reachable through the
            // dropped tail).
            let mut roots = vec!["mainImage"];
            let extra = names_called_in(&main_image_text, &program.functions);
            let extra_refs: Vec<&str> = extra.iter().map(|s| s.as_str()).collect();
            roots.extend(extra_refs);
            let reachable = parser::reachable_from(source, &program.functions, &roots);
            let rewritten = std::collections::HashMap::new();
            Some(assemble(&lines, &program, &rewritten, &reachable, loop_caps, main_image_text))
        }
        Some(f) => {
            let enclosing = program.loops_enclosing(f, line);
            let parts = build_body_parts(&lines, f, &enclosing, &classification, ty, &program.loops, loop_caps);
            let header_text = slice_lines(&lines, f.start_line, f.body_start_line);
            let header_text = if ty.glsl() != f.return_type {
                rewrite_header_return_type(&header_text, &f.return_type, ty.glsl())
            } else {
                header_text
            };
            let closing_line = slice_lines(&lines, f.end_line, f.end_line);
            let trailing = format!("{}return {};", parts.trailing_indent, parts.trailing_value);
            let rewritten_f_text =
                format!("{header_text}\n{}\n{trailing}\n{closing_line}", parts.body_lines);

            let main_fn = program.find_function("mainImage")?;
            let main_image_text = mainimage::synthesize_main_image(
                &lines,
                source,
                &sig,
                main_fn,
                &f.name,
                &f.parameters,
                ty,
                custom_params,
                &program.loops,
                loop_caps,
                viz_statement,
            );

            let mut roots = vec![f.name.as_str()];
            let extra = names_called_in(&main_image_text, &program.functions);
            let extra_refs: Vec<&str> = extra.iter().map(|s| s.as_str()).collect();
            roots.extend(extra_refs);
            let reachable = parser::reachable_from(source, &program.functions, &roots);

            let mut rewritten = std::collections::HashMap::new();
            rewritten.insert(f.name.clone(), rewritten_f_text);
            Some(assemble(&lines, &program, &rewritten, &reachable, loop_caps, main_image_text))
        }
    }
}

fn generate_global(
    lines: &[&str],
    program: &parser::ParsedProgram,
    classification: &Classification,
    ty: GlslType,
) -> String {
    let prefix = lines::global_lines_upto(lines, &program.functions, classification.stmt_end_line);
    let viz = viz_statement(ty, &classification.name, "    ");
    let main_image = format!("void mainImage(out vec4 fragColor, in vec2 fragCoord) {{\n{viz}\n}}");
    if prefix.is_empty() {
        format!("{main_image}\n")
    } else {
        format!("{prefix}\n\n{main_image}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_float_in_main_image() {
        let src = "void mainImage(out vec4 fragColor, in vec2 fragCoord){\n vec2 uv=fragCoord/iResolution.xy;\n float l=length(uv);\n fragColor=vec4(vec3(l),1.0);\n}\n";
        let out = generate(src, 3, "float l=length(uv);", None, None).unwrap();
        assert!(out.contains("float l=length(uv);") || out.contains("float l = length(uv);"));
        assert!(out.contains("fragColor = vec4(vec3(l), 1.0);"));
        assert!(!out.contains("fragColor=vec4(vec3(l),1.0);"));
    }

    #[test]
    fn inside_a_loop() {
        let src = "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord.xy;
    for (int i = 0; i < 10; i++) {
        float x = float(i) * 0.1;
        uv.x += x;
    }
    fragColor = vec4(uv, 0.0, 1.0);
}
";
        let out = generate(src, 4, "float x = float(i) * 0.1;", None, None).unwrap();
        assert!(out.contains("float _dbgShadow;"));
        assert!(out.contains("_dbgShadow = x;"));
        assert!(out.contains("uv.x += x;"));
        assert!(!out.contains("fragColor = vec4(uv, 0.0, 1.0);"));
        assert!(out.contains("fragColor = vec4(vec3(_dbgShadow), 1.0);"));
        let shadow_pos = out.find("_dbgShadow;").unwrap();
        let for_pos = out.find("for (").unwrap();
        assert!(shadow_pos < for_pos);
    }

    #[test]
    fn helper_function_return_rewrite() {
        let src = "\
float spiralSDF(vec2 st, float turns) {
    float r = length(st);
    float a = atan(st.x, st.y);
    return step(0.1, sin(r * turns + a));
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord.xy;
    float l = spiralSDF(uv, 50.0);
    fragColor = vec4(vec3(l), 1.0);
}
";
        let out = generate(src, 4, "return step(0.1, sin(r * turns + a));", None, None).unwrap();
        assert!(out.contains("float _dbgReturn = step(0.1, sin(r * turns + a));"));
        assert!(out.contains("return _dbgReturn;"));
        assert!(out.contains("float result = spiralSDF(uv, 50.0);"));
        assert!(out.contains("fragColor = vec4(vec3(result), 1.0);"));
    }

    #[test]
    fn helper_not_called_in_main_image_gets_default_call_site() {
        let src = "\
vec2 sdCutHollowSphere(vec3 p, float r, float h, float t) {
    float d = length(p.xz) - r;
    return vec2(d, h - p.y);
}

float sceneSDF(vec3 p) {
    vec2 v = sdCutHollowSphere(p, 0.5, 0.5, 0.5);
    return v.x;
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord.xy;
    fragColor = vec4(sceneSDF(vec3(uv, 0.0)));
}
";
        let out = generate(src, 3, "return vec2(d, h - p.y);", None, None).unwrap();
        assert!(out.contains("vec2 result = sdCutHollowSphere("));
        assert!(!out.contains("p, 0.5, 0.5, 0.5"));
    }

    #[test]
    fn loop_cap_inserted() {
        // The debug line sits after the loop (not inside it), so the loop
        // is carried verbatim into the retained prefix — cap insertion only
        // applies to loops that end up in the retained output.
        let src = "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    float total = 0.0;
    for (int i = 0; i < 100; i++) {
        total += 0.01;
    }
    float avg = total / 100.0;
    fragColor = vec4(vec3(avg), 1.0);
}
";
        let mut caps = LoopCaps::new();
        caps.insert(0, 5);
        let out = generate(src, 6, "float avg = total / 100.0;", None, Some(&caps)).unwrap();
        assert!(out.contains("int _dbgIter0 = 0;"));
        assert!(out.contains("if (++_dbgIter0 > 5) break;"));
    }

    #[test]
    fn loop_cap_inserted_for_braceless_loop_body() {
        // The capped loop has no `{` at all (a single-statement body), so
        // the break must be spliced inside a synthesized block rather than
        // landing after the whole `for` statement.
        let src = "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    float total = 0.0;
    for (int i = 0; i < 100; i++) total += 0.01;
    float avg = total / 100.0;
    fragColor = vec4(vec3(avg), 1.0);
}
";
        let mut caps = LoopCaps::new();
        caps.insert(0, 5);
        let out = generate(src, 4, "float avg = total / 100.0;", None, Some(&caps)).unwrap();
        assert!(out.contains("int _dbgIter0 = 0;"));
        assert!(out.contains("if (++_dbgIter0 > 5) break;"));
        assert!(out.contains("total += 0.01;"));

        let break_pos = out.find("if (++_dbgIter0 > 5) break;").unwrap();
        let for_pos = out.find("for (").unwrap();
        let stmt_pos = out.find("total += 0.01;").unwrap();
        assert!(for_pos < break_pos);
        assert!(break_pos < stmt_pos);

        let opens = out.matches('{').count();
        let closes = out.matches('}').count();
        assert_eq!(opens, closes, "output must stay brace-balanced");
    }

    #[test]
    fn loop_cap_inserted_when_debug_line_is_inside_the_loop() {
        // Here the debug line sits *inside* the loop body, so the
        // shadow-variable path assembles the output from several pieces
        // rather than one contiguous copy — the cap still has to land.
        let src = "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    float total = 0.0;
    for (int i = 0; i < 100; i++) {
        float x = float(i) * 0.01;
        total += x;
    }
    fragColor = vec4(vec3(total), 1.0);
}
";
        let mut caps = LoopCaps::new();
        caps.insert(0, 5);
        let out = generate(src, 4, "float x = float(i) * 0.01;", None, Some(&caps)).unwrap();
        assert!(out.contains("int _dbgIter0 = 0;"));
        assert!(out.contains("if (++_dbgIter0 > 5) break;"));
        assert!(out.contains("total += x;"));

        let break_pos = out.find("if (++_dbgIter0 > 5) break;").unwrap();
        let for_pos = out.find("for (").unwrap();
        let stmt_pos = out.find("float x = float(i) * 0.01;").unwrap();
        assert!(for_pos < break_pos);
        assert!(break_pos < stmt_pos);

        let opens = out.matches('{').count();
        let closes = out.matches('}').count();
        assert_eq!(opens, closes, "output must stay brace-balanced");
    }

    #[test]
    fn comparison_line_is_not_debuggable() {
        let src = "void mainImage(out vec4 fragColor, in vec2 fragCoord){\n if (a == b) { fragColor = vec4(1.0); }\n}\n";
        assert!(generate(src, 2, "if (a == b) { fragColor = vec4(1.0); }", None, None).is_none());
    }

    #[test]
    fn helper_only_called_after_truncation_point_is_dropped() {
        // `unused` is called after the debug line in the original source,
        // but that tail is truncated away by the direct-mainImage rewrite,
        // so `unused` must not survive into the assembled output.
        let src = "\
float unused(float x) {
    return x * 2.0;
}

void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    float l = length(fragCoord);
    fragColor = vec4(vec3(l), 1.0);
    float wasted = unused(l);
}
";
        let out = generate(src, 6, "float l = length(fragCoord);", None, None).unwrap();
        assert!(!out.contains("float unused"));
        assert!(!out.contains("unused("));
    }

    #[test]
    fn global_scope_declaration() {
        let src = "float GLOBAL_SCALE = 2.0;\nvoid mainImage(out vec4 fragColor, in vec2 fragCoord){ fragColor = vec4(GLOBAL_SCALE); }\n";
        let out = generate(src, 1, "float GLOBAL_SCALE = 2.0;", None, None).unwrap();
        assert!(out.contains("float GLOBAL_SCALE = 2.0;"));
        assert!(out.contains("fragColor = vec4(vec3(GLOBAL_SCALE), 1.0);"));
    }
}
