use shader_debug_transformer::modify_shader_for_debugging;

// spec §8 scenario 3.
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
    let out = modify_shader_for_debugging(
        src,
        4,
        "return step(0.1, sin(r * turns + a));",
        None,
        None,
    )
    .expect("return statement should be debuggable");

    assert!(out.contains("float _dbgReturn = step(0.1, sin(r * turns + a));"));
    let helper_end = out.find("return _dbgReturn;").expect("rewritten return present");

    assert!(out.contains("float result = spiralSDF(uv, 50.0);"));
    let call_site = out
        .find("float result = spiralSDF(uv, 50.0);")
        .expect("call site bound to original arguments");
    assert!(helper_end < call_site, "helper precedes mainImage in the assembled output");

    assert!(out.contains("fragColor = vec4(vec3(result), 1.0);"));
}
