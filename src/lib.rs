//! A source-to-source GLSL rewriter that turns a single selected statement
//! inside a Shadertoy-style fragment shader into a visualization of that
//! statement's value, plus a small post-processing pass for normalizing
//! the final color output.
//!
//! The five pieces: [`lexer`] tokenizes, [`parser`]
//! extracts function/loop structure from the token stream, [`context`]
//! answers "what function/loops/parameters surround this line", [`codegen`]
//! (reached only through [`debugger::modify_shader_for_debugging`]) does the
//! actual rewrite, and [`session`] carries per-view state across calls.

mod codegen;
mod context;
mod debugger;
mod error;
mod lexer;
mod parser;
mod postprocess;
mod session;
mod token;
mod types;

pub use context::extract_function_context;
pub use debugger::modify_shader_for_debugging;
pub use error::ShaderDebugError;
pub use postprocess::{apply_full_shader_post_processing, Normalize};
pub use session::{DebugSession, DebugSessionState, SharedDebugSession};
pub use types::{
    CustomParams, DebugFunctionContext, DebugLoopInfo, DebugParameterInfo, GlslType, LoopCaps,
    ParamMode, Parameter, Qualifier,
};
