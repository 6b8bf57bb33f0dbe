//! Call hierarchy for VintLang.
//!
//! Functions are only recognized in their canonical `let name = func`
//! form. A call site belongs to the nearest preceding function whose
//! body, by brace counting, still encloses it; calls outside every body
//! belong to a synthetic `<global>` caller that spans the document.

use tower_lsp::lsp_types::{
    CallHierarchyIncomingCall, CallHierarchyItem, CallHierarchyOutgoingCall, Position, Range,
    SymbolKind, Url,
};

use crate::analysis::{
    block_end_line, call_regex, code_lines, function_declaration_regex, get_word_at_position,
    line_range, named_call_regex, named_function_declaration_regex, span_range, DocumentAnalysis,
};
use crate::language::is_reserved;

/// Name of the caller used for top-level call sites.
pub const GLOBAL_CALLER: &str = "<global>";

/// A function declaration: its line and the range of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FunctionDecl {
    line: usize,
    name_range: Range,
}

fn find_function(analysis: &DocumentAnalysis, name: &str) -> Option<FunctionDecl> {
    let re = named_function_declaration_regex(name)?;

    analysis.lines.iter().enumerate().find_map(|(line_num, line)| {
        let name_match = re.captures(line)?.get(1)?;
        Some(FunctionDecl {
            line: line_num,
            name_range: span_range(line_num, line, name_match.start(), name_match.end()),
        })
    })
}

fn function_item(analysis: &DocumentAnalysis, uri: &Url, name: &str, decl: FunctionDecl) -> CallHierarchyItem {
    let line = &analysis.lines[decl.line];
    CallHierarchyItem {
        name: name.to_string(),
        kind: SymbolKind::FUNCTION,
        tags: None,
        detail: Some(line.trim().to_string()),
        uri: uri.clone(),
        range: line_range(decl.line, line),
        selection_range: decl.name_range,
        data: None,
    }
}

fn global_item(analysis: &DocumentAnalysis, uri: &Url) -> CallHierarchyItem {
    let origin = Range {
        start: Position::new(0, 0),
        end: Position::new(0, 0),
    };
    CallHierarchyItem {
        name: GLOBAL_CALLER.to_string(),
        kind: SymbolKind::FILE,
        tags: None,
        detail: None,
        uri: uri.clone(),
        range: analysis.full_range(),
        selection_range: origin,
        data: None,
    }
}

/// The function whose body encloses `line_num`, if any.
fn enclosing_function(analysis: &DocumentAnalysis, line_num: usize) -> Option<(String, FunctionDecl)> {
    (0..=line_num).rev().find_map(|candidate| {
        let line = &analysis.lines[candidate];
        let name_match = function_declaration_regex().captures(line)?.get(1)?;
        if block_end_line(&analysis.lines, candidate) < line_num {
            return None;
        }
        Some((
            name_match.as_str().to_string(),
            FunctionDecl {
                line: candidate,
                name_range: span_range(candidate, line, name_match.start(), name_match.end()),
            },
        ))
    })
}

/// Resolve the word at a position to a function declaration.
pub fn prepare_call_hierarchy(
    analysis: &DocumentAnalysis,
    uri: &Url,
    position: Position,
) -> Option<Vec<CallHierarchyItem>> {
    let (word, _) = get_word_at_position(&analysis.lines, position)?;
    let decl = find_function(analysis, &word)?;
    Some(vec![function_item(analysis, uri, &word, decl)])
}

/// Callers of `name`, grouped by caller in order of first call.
pub fn incoming_calls(analysis: &DocumentAnalysis, uri: &Url, name: &str) -> Vec<CallHierarchyIncomingCall> {
    let Some(re) = named_call_regex(name) else {
        return Vec::new();
    };
    let mut calls: Vec<CallHierarchyIncomingCall> = Vec::new();

    for (line_num, line) in code_lines(&analysis.lines) {
        for m in re.find_iter(line) {
            let call_range = span_range(line_num, line, m.start(), m.start() + name.len());
            let from = match enclosing_function(analysis, line_num) {
                Some((caller, decl)) => function_item(analysis, uri, &caller, decl),
                None => global_item(analysis, uri),
            };

            match calls.iter_mut().find(|call| call.from.name == from.name) {
                Some(call) => call.from_ranges.push(call_range),
                None => calls.push(CallHierarchyIncomingCall {
                    from,
                    from_ranges: vec![call_range],
                }),
            }
        }
    }

    calls
}

/// Functions called from the body of `name`, grouped by callee.
pub fn outgoing_calls(analysis: &DocumentAnalysis, uri: &Url, name: &str) -> Vec<CallHierarchyOutgoingCall> {
    let Some(decl) = find_function(analysis, name) else {
        return Vec::new();
    };
    let end = block_end_line(&analysis.lines, decl.line);
    let mut calls: Vec<CallHierarchyOutgoingCall> = Vec::new();

    for (line_num, line) in code_lines(&analysis.lines) {
        if line_num < decl.line || line_num > end {
            continue;
        }

        for caps in call_regex().captures_iter(line) {
            let Some(callee) = caps.get(1) else {
                continue;
            };
            if is_reserved(callee.as_str()) {
                continue;
            }
            let Some(callee_decl) = find_function(analysis, callee.as_str()) else {
                continue;
            };

            let call_range = span_range(line_num, line, callee.start(), callee.end());
            match calls.iter_mut().find(|call| call.to.name == callee.as_str()) {
                Some(call) => call.from_ranges.push(call_range),
                None => calls.push(CallHierarchyOutgoingCall {
                    to: function_item(analysis, uri, callee.as_str(), callee_decl),
                    from_ranges: vec![call_range],
                }),
            }
        }
    }

    calls
}
