//! GLSL structural parser.
//!
//! No AST is built. A single brace-depth-tracking scan over the token
//! stream extracts the facts downstream components need: function spans,
//! loop spans, and (lazily, per query) the call graph used for helper
//! inclusion.

mod callgraph;
mod functions;
mod loops;

pub use callgraph::reachable_from;

use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};
use crate::types::{FunctionInfo, LoopInfo};

/// The facts extracted from one source file.
#[derive(Debug, Clone, Default)]
pub struct ParsedProgram {
    pub functions: Vec<FunctionInfo>,
    pub loops: Vec<LoopInfo>,
}

impl ParsedProgram {
    pub fn function_containing_line(&self, line: usize) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.contains_line(line))
    }

    pub fn find_function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Loops that strictly enclose `line` and lie within `function`, sorted
    /// by source order.
    pub fn loops_enclosing(&self, function: &FunctionInfo, line: usize) -> Vec<&LoopInfo> {
        let mut loops: Vec<&LoopInfo> = self
            .loops
            .iter()
            .filter(|l| {
                l.strictly_contains(line)
                    && l.line_number >= function.body_start_line
                    && l.end_line <= function.end_line
            })
            .collect();
        loops.sort_by_key(|l| l.line_number);
        loops
    }
}

/// Tokens relevant to structural scanning: comments and newlines carry no
/// structural information but do carry line numbers, so they're dropped
/// here only after the lexer has already used them to track positions.
pub(crate) fn significant_tokens(tokens: &[Token]) -> Vec<&Token> {
    tokens
        .iter()
        .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Newline))
        .collect()
}

pub fn parse(source: &str) -> ParsedProgram {
    let tokens = tokenize(source);
    let sig = significant_tokens(&tokens);
    let functions = functions::parse_functions(source, &sig);
    let loops = loops::parse_loops(source, &sig);
    ParsedProgram { functions, loops }
}
