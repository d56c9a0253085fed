//! Line-oriented helpers shared by the rewriter. Most of the assembly work
//! here is "keep these lines verbatim, drop those" — easier to reason
//! about on a `Vec<&str>` of lines than on raw byte
//! offsets, so the rewriter works in terms of 1-based line numbers and
//! only drops to byte offsets for sub-line surgery (call-site splicing,
//! loop-cap insertion).

use crate::types::FunctionInfo;

pub(crate) fn split_lines(source: &str) -> Vec<&str> {
    source.lines().collect()
}

/// Verbatim text of lines `start..=end` (1-based, inclusive), joined with `\n`.
pub(crate) fn slice_lines(lines: &[&str], start: usize, end: usize) -> String {
    if start == 0 || start > end || start > lines.len() {
        return String::new();
    }
    let end = end.min(lines.len());
    lines[(start - 1)..end].join("\n")
}

/// Leading whitespace of the given 1-based line, used to keep synthesized
/// lines visually aligned with the code they're inserted next to.
pub(crate) fn indentation_of(lines: &[&str], line: usize) -> String {
    lines
        .get(line.saturating_sub(1))
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).collect())
        .unwrap_or_default()
}

/// All lines before `target.start_line` that are not part of some other
/// function's span (header through closing brace): all preprocessor lines
/// and global declarations, verbatim.
pub(crate) fn collect_global_prefix(
    lines: &[&str],
    functions: &[FunctionInfo],
    target: &FunctionInfo,
) -> String {
    let mut kept = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        if line_no >= target.start_line {
            break;
        }
        let inside_other_fn = functions
            .iter()
            .any(|f| f.name != target.name && f.start_line <= line_no && line_no <= f.end_line);
        if !inside_other_fn {
            kept.push(*line);
        }
    }
    kept.join("\n")
}

/// Global-scope variant of [`collect_global_prefix`] used when the debug
/// line itself is a top-level declaration outside any function: every line
/// up to and including `upto` that isn't inside a function body, so later
/// global declarations and
/// all functions are dropped rather than carried into the synthesized
/// `mainImage`-only output.
pub(crate) fn global_lines_upto(lines: &[&str], functions: &[FunctionInfo], upto: usize) -> String {
    let mut kept = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        if line_no > upto {
            break;
        }
        let inside_fn = functions.iter().any(|f| f.start_line <= line_no && line_no <= f.end_line);
        if !inside_fn {
            kept.push(*line);
        }
    }
    kept.join("\n")
}
