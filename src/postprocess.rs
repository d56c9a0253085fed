//! Post-processing pass: rewrites only the final `fragColor`
//! assignment inside `mainImage` to apply normalization and/or a step
//! threshold. Unlike the debug transformer this never truncates or
//! restructures the shader — it only inserts statements immediately
//! before `mainImage`'s closing brace.

use serde::{Deserialize, Serialize};

use crate::codegen::lines::{indentation_of, slice_lines, split_lines};
use crate::parser;

/// Normalization mode applied to `fragColor.rgb` before an optional step
/// threshold.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalize {
    #[default]
    Off,
    Soft,
    Abs,
}

/// `applyFullShaderPostProcessing`. Returns `None` when there is
/// nothing to do (`normalize == Off` and no step threshold) or when the
/// source has no `mainImage` to anchor the rewrite to.
pub fn apply_full_shader_post_processing(
    source: &str,
    normalize: Normalize,
    step_threshold: Option<f32>,
) -> Option<String> {
    if normalize == Normalize::Off && step_threshold.is_none() {
        return None;
    }

    let program = parser::parse(source);
    let main_fn = program.find_function("mainImage")?;
    let lines = split_lines(source);

    let indent = indentation_of(&lines, main_fn.end_line.saturating_sub(1).max(main_fn.body_start_line + 1));

    let mut inserted = Vec::new();
    match normalize {
        Normalize::Off => {}
        Normalize::Soft => inserted.push(format!("{indent}fragColor.rgb = fragColor.rgb * 0.5 + 0.5;")),
        Normalize::Abs => inserted.push(format!("{indent}fragColor.rgb = abs(fragColor.rgb);")),
    }
    if let Some(t) = step_threshold {
        inserted.push(format!("{indent}fragColor.rgb = step(vec3({t}), fragColor.rgb);"));
    }

    let before_close = slice_lines(&lines, 1, main_fn.end_line.saturating_sub(1));
    let closing_line = slice_lines(&lines, main_fn.end_line, main_fn.end_line);
    let after = if main_fn.end_line < lines.len() {
        slice_lines(&lines, main_fn.end_line + 1, lines.len())
    } else {
        String::new()
    };

    let mut out = String::new();
    out.push_str(&before_close);
    out.push('\n');
    out.push_str(&inserted.join("\n"));
    out.push('\n');
    out.push_str(&closing_line);
    if !after.is_empty() {
        out.push('\n');
        out.push_str(&after);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADER: &str = "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord.xy / iResolution.xy;
    fragColor = vec4(uv, 0.0, 1.0);
}
";

    #[test]
    fn off_with_no_step_returns_none() {
        assert!(apply_full_shader_post_processing(SHADER, Normalize::Off, None).is_none());
    }

    #[test]
    fn soft_normalize_inserted_before_closing_brace() {
        let out = apply_full_shader_post_processing(SHADER, Normalize::Soft, None).unwrap();
        assert!(out.contains("fragColor.rgb = fragColor.rgb * 0.5 + 0.5;"));
        assert!(out.contains("fragColor = vec4(uv, 0.0, 1.0);"));
        let insert_pos = out.find("* 0.5 + 0.5").unwrap();
        let brace_pos = out.rfind('}').unwrap();
        assert!(insert_pos < brace_pos);
    }

    #[test]
    fn abs_normalize() {
        let out = apply_full_shader_post_processing(SHADER, Normalize::Abs, None).unwrap();
        assert!(out.contains("fragColor.rgb = abs(fragColor.rgb);"));
    }

    #[test]
    fn compose_normalize_then_step() {
        let out = apply_full_shader_post_processing(SHADER, Normalize::Soft, Some(0.3)).unwrap();
        let soft_pos = out.find("* 0.5 + 0.5").unwrap();
        let step_pos = out.find("step(vec3(0.3)").unwrap();
        assert!(soft_pos < step_pos);
    }

    #[test]
    fn step_only() {
        let out = apply_full_shader_post_processing(SHADER, Normalize::Off, Some(0.5)).unwrap();
        assert!(out.contains("step(vec3(0.5), fragColor.rgb);"));
    }

    #[test]
    fn deterministic_for_identical_arguments() {
        // Calling twice with the same source and arguments (not chaining
        // the first call's output into the second) is a pure function and
        // must produce identical output.
        let first = apply_full_shader_post_processing(SHADER, Normalize::Soft, Some(0.3)).unwrap();
        let second = apply_full_shader_post_processing(SHADER, Normalize::Soft, Some(0.3)).unwrap();
        assert_eq!(first, second);
    }
}
