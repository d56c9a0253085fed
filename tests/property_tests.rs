use proptest::prelude::*;
use shader_debug_transformer::modify_shader_for_debugging;

fn brace_balance(s: &str) -> i64 {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

fn shader_with_constant(value: f32) -> String {
    format!(
        "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {{
    vec2 uv = fragCoord.xy / iResolution.xy;
    float l = length(uv) * {value:.3};
    fragColor = vec4(vec3(l), 1.0);
}}
"
    )
}

fn shader_with_loop(iterations: u32, value: f32) -> String {
    format!(
        "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {{
    vec2 uv = fragCoord.xy;
    for (int i = 0; i < {iterations}; i++) {{
        float x = float(i) * {value:.3};
        uv.x += x;
    }}
    fragColor = vec4(uv, 0.0, 1.0);
}}
"
    )
}

proptest! {
    // Rewriting a simple float declaration in `mainImage` always preserves
    // brace balance, whatever constant the shader happens to multiply by,
    // and the result re-lexes without panicking.
    #[test]
    fn rewrite_preserves_brace_balance(value in -1000.0f32..1000.0) {
        prop_assume!(value.is_finite());
        let src = shader_with_constant(value);
        let content = format!("float l = length(uv) * {value:.3};");
        if let Some(out) = modify_shader_for_debugging(&src, 3, &content, None, None) {
            prop_assert_eq!(brace_balance(&out), 0);
        }
    }

    // Same property through the loop/shadow path, across a range of
    // iteration counts and per-iteration increments.
    #[test]
    fn loop_shadow_rewrite_preserves_brace_balance(
        iterations in 1u32..500,
        value in -10.0f32..10.0,
    ) {
        prop_assume!(value.is_finite());
        let src = shader_with_loop(iterations, value);
        let content = format!("float x = float(i) * {value:.3};");
        if let Some(out) = modify_shader_for_debugging(&src, 4, &content, None, None) {
            prop_assert_eq!(brace_balance(&out), 0);
        }
    }

    // A stale/mismatched debug-line content must never cause a panic;
    // it's either rejected outright or (if it happens to still match
    // some nearby statement) produces a normal rewrite.
    #[test]
    fn mismatched_content_never_panics(noise in "[a-zA-Z0-9_ ]{0,40}") {
        let src = shader_with_constant(1.0);
        let _ = modify_shader_for_debugging(&src, 3, &noise, None, None);
    }
}
