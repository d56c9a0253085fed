//! Call-graph traversal used to decide which helper functions to retain in
//! the assembled output. The graph may be cyclic; traversal
//! visits each function at most once.

use std::collections::{HashMap, HashSet};

use crate::lexer::tokenize;
use crate::parser::significant_tokens;
use crate::token::TokenKind;
use crate::types::FunctionInfo;

fn direct_callees(source: &str, functions: &[FunctionInfo]) -> HashMap<String, HashSet<String>> {
    let tokens = tokenize(source);
    let sig = significant_tokens(&tokens);
    let names: HashSet<&str> = functions.iter().map(|f| f.name.as_str()).collect();

    let mut edges: HashMap<String, HashSet<String>> = HashMap::new();
    for f in functions {
        let mut callees = HashSet::new();
        // Scan strictly inside the body, excluding the header, so a
        // function's own name token in its declaration is never mistaken
        // for a self-call (this matters for single-line `foo(...) { ... }`
        // definitions where header and body share a line).
        let lo = f.body_open_token + 1;
        let hi = f.body_close_token;
        for idx in lo..hi {
            let t = sig[idx];
            if t.kind == TokenKind::Ident
                && names.contains(t.lexeme.as_str())
                && sig.get(idx + 1).is_some_and(|n| n.is_punct("("))
            {
                callees.insert(t.lexeme.clone());
            }
        }
        edges.insert(f.name.clone(), callees);
    }
    edges
}

/// All function names transitively reachable from `roots` via calls,
/// including the roots themselves (if they are known functions).
pub fn reachable_from(source: &str, functions: &[FunctionInfo], roots: &[&str]) -> HashSet<String> {
    let edges = direct_callees(source, functions);
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = roots.iter().map(|r| r.to_string()).collect();

    while let Some(name) = stack.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if let Some(callees) = edges.get(&name) {
            for callee in callees {
                if !visited.contains(callee) {
                    stack.push(callee.clone());
                }
            }
        }
    }

    visited
}
