//! Facade: the small set of free functions a host actually calls.
//! Everything else in the crate is an implementation detail reached through
//! these entry points or through `DebugSession`/`SharedDebugSession`.

use tracing::{debug, instrument, trace, warn};

use crate::codegen;
use crate::types::{CustomParams, LoopCaps};

/// `modifyShaderForDebugging`. `None` means the selected
/// line isn't debuggable — not an error.
#[instrument(level = "debug", skip(source, content, custom_params, loop_caps))]
pub fn modify_shader_for_debugging(
    source: &str,
    line: usize,
    content: &str,
    custom_params: Option<&CustomParams>,
    loop_caps: Option<&LoopCaps>,
) -> Option<String> {
    trace!(content, "classifying debug line");
    let result = codegen::generate(source, line, content, custom_params, loop_caps);
    match &result {
        Some(_) => debug!("rewrote shader for debug line"),
        None => warn!("line is not debuggable, returning source unchanged to caller"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delegates_to_codegen() {
        let src = "void mainImage(out vec4 fragColor, in vec2 fragCoord){\n float l = 1.0;\n fragColor = vec4(1.0);\n}\n";
        let out = modify_shader_for_debugging(src, 2, "float l = 1.0;", None, None);
        assert!(out.unwrap().contains("fragColor = vec4(vec3(l), 1.0);"));
    }

    #[test]
    fn non_debuggable_line_returns_none() {
        let src = "void mainImage(out vec4 fragColor, in vec2 fragCoord){\n if (true) {}\n}\n";
        assert!(modify_shader_for_debugging(src, 2, "if (true) {}", None, None).is_none());
    }
}
