//! Diagnostic generation for VintLang.
//!
//! Generates LSP diagnostics for:
//! - Closing braces without an opening brace on the same line
//! - Unbalanced parentheses on lines that open no block
//! - Functions not declared as `let name = func(...)`
//! - Assignments to names that were never declared with `let`
//! - Functions and variables that are never used
//!
//! Every rule is a per-line heuristic; rules are independent and a line
//! may trigger several of them.

use serde_json::json;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, DiagnosticTag, NumberOrString, Range};

use crate::analysis::{
    code_lines, function_declaration_regex, identifier_regex, span_range, trimmed_line_range,
};
use crate::language::{is_keyword, DECLARATION_KEYWORD, FUNCTION_KEYWORD};
use crate::symbols::{SymbolKind, SymbolTable};

pub const UNMATCHED_BRACE: &str = "unmatched-brace";
pub const UNMATCHED_PAREN: &str = "unmatched-paren";
pub const INVALID_FUNCTION_SYNTAX: &str = "invalid-function-syntax";
pub const MISSING_LET: &str = "missing-let";
pub const UNUSED_SYMBOL: &str = "unused-symbol";

/// Source attached to every diagnostic.
pub const SOURCE: &str = "vintlang";

fn bare_assignment_regex() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*[^=\s]").expect("static pattern")
    })
}

/// Compute all diagnostics for a document.
pub fn compute_diagnostics(lines: &[String], symbols: &SymbolTable) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (line_num, line) in code_lines(lines) {
        lint_line(line_num, line, symbols, &mut diagnostics);
    }

    lint_unused_symbols(symbols, &mut diagnostics);

    diagnostics
}

/// Get the diagnostic code as a string.
pub fn diagnostic_code(diagnostic: &Diagnostic) -> Option<&str> {
    match diagnostic.code.as_ref()? {
        NumberOrString::String(code) => Some(code.as_str()),
        NumberOrString::Number(_) => None,
    }
}

fn lint_line(line_num: usize, line: &str, symbols: &SymbolTable, diagnostics: &mut Vec<Diagnostic>) {
    let open_braces = line.matches('{').count();
    let close_braces = line.matches('}').count();
    let open_parens = line.matches('(').count();
    let close_parens = line.matches(')').count();

    if close_braces > open_braces {
        diagnostics.push(diagnostic(
            trimmed_line_range(line_num, line),
            DiagnosticSeverity::ERROR,
            UNMATCHED_BRACE,
            "Unmatched closing brace '}'".to_string(),
        ));
    }

    if open_parens != close_parens && open_braces == 0 {
        diagnostics.push(diagnostic(
            trimmed_line_range(line_num, line),
            DiagnosticSeverity::WARNING,
            UNMATCHED_PAREN,
            format!(
                "Unmatched parentheses: {} '(' and {} ')'",
                open_parens, close_parens
            ),
        ));
    }

    let has_word = |target: &str| identifier_regex().find_iter(line).any(|m| m.as_str() == target);

    if has_word(FUNCTION_KEYWORD) && !function_declaration_regex().is_match(line) {
        diagnostics.push(diagnostic(
            trimmed_line_range(line_num, line),
            DiagnosticSeverity::ERROR,
            INVALID_FUNCTION_SYNTAX,
            "Function should be declared as 'let name = func(params) { ... }'".to_string(),
        ));
    }

    if let Some(name) = bare_assignment_regex().captures(line).and_then(|c| c.get(1)) {
        let var_name = name.as_str();
        if !has_word(DECLARATION_KEYWORD) && !is_keyword(var_name) && !symbols.contains(var_name) {
            let mut diag = diagnostic(
                span_range(line_num, line, name.start(), name.end()),
                DiagnosticSeverity::WARNING,
                MISSING_LET,
                format!("Consider using 'let' to declare variable '{}'", var_name),
            );
            diag.data = Some(json!({ "variable": var_name }));
            diagnostics.push(diag);
        }
    }
}

fn lint_unused_symbols(symbols: &SymbolTable, diagnostics: &mut Vec<Diagnostic>) {
    for symbol in symbols.in_declaration_order() {
        if symbol.kind == SymbolKind::Import || !symbol.references.is_empty() {
            continue;
        }

        let mut diag = diagnostic(
            symbol.name_range,
            DiagnosticSeverity::HINT,
            UNUSED_SYMBOL,
            format!(
                "{} '{}' is declared but never used",
                capitalize(symbol.kind.as_str()),
                symbol.name
            ),
        );
        diag.tags = Some(vec![DiagnosticTag::UNNECESSARY]);
        diag.data = Some(json!({
            "symbol": symbol.name,
            "kind": symbol.kind.as_str(),
        }));
        diagnostics.push(diag);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn diagnostic(range: Range, severity: DiagnosticSeverity, code: &str, message: String) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(severity),
        code: Some(NumberOrString::String(code.to_string())),
        code_description: None,
        source: Some(SOURCE.to_string()),
        message,
        related_information: None,
        tags: None,
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::split_lines;
    use crate::symbols::index_symbols;
    use tower_lsp::lsp_types::Position;

    fn diagnose(text: &str) -> Vec<Diagnostic> {
        let lines = split_lines(text);
        let symbols = index_symbols(&lines);
        compute_diagnostics(&lines, &symbols)
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().filter_map(diagnostic_code).collect()
    }

    #[test]
    fn test_used_variable_is_clean() {
        assert!(diagnose("let x = 5\nprint(x)").is_empty());
    }

    #[test]
    fn test_unused_variable_hint() {
        let diagnostics = diagnose("let x = 5");
        assert_eq!(diagnostics.len(), 1);

        let diag = &diagnostics[0];
        assert_eq!(diag.severity, Some(DiagnosticSeverity::HINT));
        assert_eq!(diagnostic_code(diag), Some(UNUSED_SYMBOL));
        assert!(diag.message.contains("'x'"));
        assert_eq!(diag.range.start, Position::new(0, 4));
        assert_eq!(diag.range.end, Position::new(0, 5));
        assert_eq!(diag.tags, Some(vec![DiagnosticTag::UNNECESSARY]));
    }

    #[test]
    fn test_missing_let_warning() {
        let diagnostics = diagnose("y = 10");
        assert_eq!(diagnostics.len(), 1);

        let diag = &diagnostics[0];
        assert_eq!(diag.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(diagnostic_code(diag), Some(MISSING_LET));
        assert!(diag.message.contains("'y'"));
        assert_eq!(diag.range.start, Position::new(0, 0));
        assert_eq!(diag.range.end, Position::new(0, 1));
    }

    #[test]
    fn test_missing_let_skips_known_symbols_and_comparisons() {
        assert!(diagnose("let y = 1\ny = 2").is_empty());
        assert!(!codes(&diagnose("let a = 1\nif (a == 2) { print(a) }")).contains(&MISSING_LET));
        assert!(!codes(&diagnose("let k = 1\nk += 1")).contains(&MISSING_LET));
    }

    #[test]
    fn test_unmatched_closing_brace() {
        let diagnostics = diagnose("  }");
        assert_eq!(codes(&diagnostics), vec![UNMATCHED_BRACE]);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostics[0].range.start, Position::new(0, 2));

        assert!(diagnose("if (true) { print(1) }").is_empty());
    }

    #[test]
    fn test_unmatched_paren_only_without_brace() {
        let diagnostics = diagnose("print((1)");
        assert_eq!(codes(&diagnostics), vec![UNMATCHED_PAREN]);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));

        assert!(!codes(&diagnose("if ((true) {\n}")).contains(&UNMATCHED_PAREN));
    }

    #[test]
    fn test_invalid_function_syntax() {
        let diagnostics = diagnose("func main() {");
        assert_eq!(codes(&diagnostics), vec![INVALID_FUNCTION_SYNTAX]);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));

        assert!(!codes(&diagnose("let main = func() {\n}\nmain()")).contains(&INVALID_FUNCTION_SYNTAX));
        // Only the keyword itself counts, not words containing it.
        assert!(diagnose("let functional = 1\nprint(functional)").is_empty());
    }

    #[test]
    fn test_rules_are_cumulative() {
        let diagnostics = diagnose("} func(");
        assert_eq!(
            codes(&diagnostics),
            vec![UNMATCHED_BRACE, UNMATCHED_PAREN, INVALID_FUNCTION_SYNTAX]
        );

        let diagnostics = diagnose("z = func(");
        assert_eq!(
            codes(&diagnostics),
            vec![UNMATCHED_PAREN, INVALID_FUNCTION_SYNTAX, MISSING_LET]
        );
    }

    #[test]
    fn test_imports_are_never_unused() {
        assert!(diagnose("import time").is_empty());
    }

    #[test]
    fn test_unused_iff_no_references() {
        let docs = [
            "let a = 1\nlet b = func() { return a }\nlet c = 3\nprint(c)",
            "import os\nlet run = func(cmd) {\n  return exec(cmd)\n}\nlet unused = run",
            "let add = func(a, b) { return a + b }\nadd(1, 2)",
        ];

        for text in docs {
            let lines = split_lines(text);
            let symbols = index_symbols(&lines);
            let diagnostics = compute_diagnostics(&lines, &symbols);

            for symbol in symbols.iter() {
                let flagged = diagnostics.iter().any(|d| {
                    diagnostic_code(d) == Some(UNUSED_SYMBOL)
                        && d.range == symbol.name_range
                });
                let expected = symbol.references.is_empty() && symbol.kind != SymbolKind::Import;
                assert_eq!(flagged, expected, "symbol {} in {:?}", symbol.name, text);
            }
        }
    }

    #[test]
    fn test_diagnostics_are_deterministic() {
        let text = "y = 1\nfunc bad() {\n}\nlet x = 2\nprint((x)";
        assert_eq!(diagnose(text), diagnose(text));
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        assert!(diagnose("// y = 1 }\n/* func\n z = 2 */").is_empty());
    }
}
