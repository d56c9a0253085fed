//! Shared data model: functions, loops, parameters, debug context.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parameter passing qualifier on a GLSL function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Qualifier {
    In,
    Out,
    InOut,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
    pub qualifier: Qualifier,
}

/// A parsed GLSL function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    /// 1-based line of the first token of the header (return type).
    pub start_line: usize,
    /// 1-based line of the opening `{`.
    pub body_start_line: usize,
    /// 1-based line of the matching closing `}`.
    pub end_line: usize,
    /// Verbatim header text, from `start_line` through the closing `)`.
    pub signature_text: String,
    /// Index of the opening `{` in the significant-token stream used to
    /// parse it. Not part of the public data model; lets the call-graph
    /// pass scan exactly the body without re-deriving it from line numbers
    /// (which would misfire on the common `foo(...) { ... }` one-liner).
    pub(crate) body_open_token: usize,
    pub(crate) body_close_token: usize,
}

impl FunctionInfo {
    pub fn contains_line(&self, line: usize) -> bool {
        self.body_start_line <= line && line <= self.end_line
    }
}

/// A parsed `for`/`while` loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopInfo {
    /// Assigned in source order across the whole file.
    pub loop_index: usize,
    /// 1-based line of the `for`/`while` keyword.
    pub line_number: usize,
    /// 1-based line of the matching closing `}` (or the statement-terminating `;`).
    pub end_line: usize,
    /// Verbatim header text including the parenthesized condition.
    pub loop_header: String,
    pub max_iter: Option<u32>,
}

impl LoopInfo {
    pub fn strictly_contains(&self, line: usize) -> bool {
        self.line_number < line && line <= self.end_line
    }
}

/// Visualization shape. Every GLSL type the generator can picture is mapped
/// to one of these; unknown/unsupported types return `None`
/// from type inference rather than picking an arbitrary fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlslType {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
}

impl GlslType {
    pub fn parse(s: &str) -> Option<GlslType> {
        match s {
            "float" => Some(GlslType::Float),
            "int" | "uint" => Some(GlslType::Int),
            "bool" => Some(GlslType::Bool),
            "vec2" => Some(GlslType::Vec2),
            "vec3" => Some(GlslType::Vec3),
            "vec4" => Some(GlslType::Vec4),
            _ => None,
        }
    }

    pub fn glsl(&self) -> &'static str {
        match self {
            GlslType::Float => "float",
            GlslType::Int => "int",
            GlslType::Bool => "bool",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
        }
    }
}

/// One formal parameter of the function enclosing the debug line, with the
/// default values the host UI offers for "what should this argument be at
/// the synthesized call site".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugParameterInfo {
    pub name: String,
    pub ty: String,
    pub uv_value: String,
    pub centered_uv_value: String,
    pub default_custom_value: String,
    pub mode: ParamMode,
    pub custom_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamMode {
    Uv,
    CenteredUv,
    Custom,
    Preset,
}

/// A loop enclosing the debug line, as reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugLoopInfo {
    pub loop_index: usize,
    pub line_number: usize,
    pub end_line: usize,
    pub loop_header: String,
}

/// The function-context answer for a given debug line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugFunctionContext {
    pub function_name: String,
    pub return_type: String,
    pub parameters: Vec<DebugParameterInfo>,
    pub is_function: bool,
    pub loops: Vec<DebugLoopInfo>,
}

impl DebugFunctionContext {
    pub fn global() -> DebugFunctionContext {
        DebugFunctionContext {
            function_name: "<global>".to_string(),
            return_type: String::new(),
            parameters: Vec::new(),
            is_function: false,
            loops: Vec::new(),
        }
    }
}

pub type CustomParams = BTreeMap<usize, String>;
pub type LoopCaps = BTreeMap<usize, u32>;

/// Fallback literal for a parameter's visualized type when no explicit
/// custom value has been supplied for it.
/// Shared between function-context defaults and synthesized `mainImage`
/// call-site arguments so the two never drift apart.
pub(crate) fn default_custom_value_for_type(ty: &str) -> String {
    match ty {
        "float" => "0.5".to_string(),
        "int" | "uint" => "1".to_string(),
        "bool" => "true".to_string(),
        "vec2" => "vec2(0.5)".to_string(),
        "vec3" => "vec3(0.5)".to_string(),
        "vec4" => "vec4(0.5, 0.5, 0.5, 1.0)".to_string(),
        _ => "0.5".to_string(),
    }
}
