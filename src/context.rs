//! Function-Context Extractor: given source and a debug line,
//! answers which function contains it, which loops enclose it, and what
//! default visualization values its parameters should offer.

use crate::parser::{self, ParsedProgram};
use crate::types::{
    default_custom_value_for_type, DebugFunctionContext, DebugLoopInfo, DebugParameterInfo,
    ParamMode, Parameter,
};

/// Default GLSL expression derived from `uv`, by parameter type.
fn uv_value_for_type(ty: &str) -> String {
    match ty {
        "vec2" => "uv".to_string(),
        "float" => "uv.x".to_string(),
        "vec3" => "vec3(uv, 0.0)".to_string(),
        "vec4" => "vec4(uv, 0.0, 1.0)".to_string(),
        "int" | "uint" => "int(uv.x * 10.0)".to_string(),
        "bool" => "(uv.x > 0.5)".to_string(),
        _ => "uv.x".to_string(),
    }
}

/// Aspect-corrected, -1..1 range form of `uv`, substituted per type the same
/// way `uv_value_for_type` substitutes plain `uv`.
fn centered_uv_expr() -> &'static str {
    "(-1.0 + 2.0 * uv) * vec2(iResolution.x / iResolution.y, 1.0)"
}

fn centered_uv_value_for_type(ty: &str) -> String {
    let centered = centered_uv_expr();
    match ty {
        "vec2" => centered.to_string(),
        "float" => format!("({centered}).x"),
        "vec3" => format!("vec3({centered}, 0.0)"),
        "vec4" => format!("vec4({centered}, 0.0, 1.0)"),
        "int" | "uint" => format!("int(({centered}).x * 10.0)"),
        "bool" => format!("(({centered}).x > 0.5)"),
        _ => format!("({centered}).x"),
    }
}

fn to_debug_parameter(p: &Parameter) -> DebugParameterInfo {
    let default_custom_value = default_custom_value_for_type(&p.ty);
    let mode = if p.ty == "vec2" { ParamMode::Uv } else { ParamMode::Custom };
    DebugParameterInfo {
        name: p.name.clone(),
        ty: p.ty.clone(),
        uv_value: uv_value_for_type(&p.ty),
        centered_uv_value: centered_uv_value_for_type(&p.ty),
        default_custom_value: default_custom_value.clone(),
        mode,
        custom_value: default_custom_value,
    }
}

pub fn extract_function_context(source: &str, line: usize) -> Option<DebugFunctionContext> {
    if line == 0 {
        return None;
    }
    let program = parser::parse(source);
    Some(build_context(&program, line))
}

pub(crate) fn build_context(program: &ParsedProgram, line: usize) -> DebugFunctionContext {
    let Some(function) = program.function_containing_line(line) else {
        return DebugFunctionContext::global();
    };

    let loops: Vec<DebugLoopInfo> = program
        .loops_enclosing(function, line)
        .into_iter()
        .map(|l| DebugLoopInfo {
            loop_index: l.loop_index,
            line_number: l.line_number,
            end_line: l.end_line,
            loop_header: l.loop_header.clone(),
        })
        .collect();

    let is_function = function.name != "mainImage";

    DebugFunctionContext {
        function_name: function.name.clone(),
        return_type: function.return_type.clone(),
        parameters: function.parameters.iter().map(to_debug_parameter).collect(),
        is_function,
        loops,
    }
}
