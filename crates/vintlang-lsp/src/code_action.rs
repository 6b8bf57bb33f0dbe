//! Quick fixes for VintLang diagnostics.
//!
//! - `missing-let`: insert `let ` before the assigned name
//! - `unused-symbol`: delete the declaring line
//! - `invalid-function-syntax`: open the function documentation

use serde_json::json;
use std::collections::HashMap;
use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Command, Diagnostic, Position, Range,
    TextEdit, Url, WorkspaceEdit,
};

use crate::analysis::{utf16_len, DocumentAnalysis};
use crate::diagnostics::{diagnostic_code, INVALID_FUNCTION_SYNTAX, MISSING_LET, UNUSED_SYMBOL};
use crate::language::DECLARATION_KEYWORD;

/// Client command that opens a documentation topic.
pub const OPEN_DOCUMENTATION_COMMAND: &str = "vintlang.openDocumentation";

/// Code actions for the diagnostics of a code-action request.
pub fn get_code_actions(
    analysis: &DocumentAnalysis,
    uri: &Url,
    diagnostics: &[Diagnostic],
) -> Vec<CodeActionOrCommand> {
    diagnostics
        .iter()
        .filter_map(|diagnostic| match diagnostic_code(diagnostic)? {
            MISSING_LET => {
                let at = diagnostic.range.start;
                Some(quick_fix(
                    uri,
                    diagnostic,
                    format!("Add '{}' declaration", DECLARATION_KEYWORD),
                    Range { start: at, end: at },
                    format!("{} ", DECLARATION_KEYWORD),
                ))
            }
            UNUSED_SYMBOL => {
                let line = diagnostic.range.start.line;
                let name = diagnostic
                    .data
                    .as_ref()
                    .and_then(|data| data.get("symbol"))
                    .and_then(|symbol| symbol.as_str())
                    .unwrap_or("symbol");
                Some(quick_fix(
                    uri,
                    diagnostic,
                    format!("Remove unused '{}'", name),
                    Range {
                        start: Position::new(line, 0),
                        end: line_deletion_end(analysis, line),
                    },
                    String::new(),
                ))
            }
            INVALID_FUNCTION_SYNTAX => Some(CodeAction {
                title: "Open function syntax documentation".to_string(),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![diagnostic.clone()]),
                command: Some(Command {
                    title: "Open documentation".to_string(),
                    command: OPEN_DOCUMENTATION_COMMAND.to_string(),
                    arguments: Some(vec![json!("functions")]),
                }),
                ..Default::default()
            }),
            _ => None,
        })
        .map(CodeActionOrCommand::CodeAction)
        .collect()
}

/// End of a whole-line deletion: the start of the next line, or the end
/// of the line itself when it is the last one.
fn line_deletion_end(analysis: &DocumentAnalysis, line: u32) -> Position {
    let next = line as usize + 1;
    if next < analysis.lines.len() {
        return Position::new(line + 1, 0);
    }
    let width = analysis.line(line as usize).map(utf16_len).unwrap_or(0);
    Position::new(line, width)
}

fn quick_fix(
    uri: &Url,
    diagnostic: &Diagnostic,
    title: String,
    range: Range,
    new_text: String,
) -> CodeAction {
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![TextEdit { range, new_text }]);

    CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        is_preferred: Some(true),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_document;

    fn uri() -> Url {
        Url::parse("file:///tmp/fix.vint").unwrap()
    }

    fn actions(text: &str) -> Vec<CodeAction> {
        let analysis = analyze_document(text);
        get_code_actions(&analysis, &uri(), &analysis.diagnostics)
            .into_iter()
            .map(|action| match action {
                CodeActionOrCommand::CodeAction(action) => action,
                CodeActionOrCommand::Command(_) => panic!("expected a code action"),
            })
            .collect()
    }

    fn only_edit(action: &CodeAction) -> TextEdit {
        let changes = action.edit.as_ref().unwrap().changes.as_ref().unwrap();
        let edits = &changes[&uri()];
        assert_eq!(edits.len(), 1);
        edits[0].clone()
    }

    #[test]
    fn test_missing_let_inserts_keyword() {
        let actions = actions("  y = 10\nprint(y)");
        assert_eq!(actions.len(), 1);

        let edit = only_edit(&actions[0]);
        assert_eq!(edit.new_text, "let ");
        assert_eq!(edit.range.start, Position::new(0, 2));
        assert_eq!(edit.range.end, Position::new(0, 2));
    }

    #[test]
    fn test_unused_symbol_deletes_line() {
        let actions = actions("let spare = 5\nprint(1)");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Remove unused 'spare'");

        let edit = only_edit(&actions[0]);
        assert_eq!(edit.new_text, "");
        assert_eq!(edit.range.start, Position::new(0, 0));
        assert_eq!(edit.range.end, Position::new(1, 0));
    }

    #[test]
    fn test_unused_symbol_on_last_line_stays_in_document() {
        let actions = actions("print(1)\nlet spare = \"é\"");
        let edit = only_edit(&actions[0]);
        assert_eq!(edit.range.start, Position::new(1, 0));
        assert_eq!(edit.range.end, Position::new(1, 15));
    }

    #[test]
    fn test_invalid_function_opens_documentation() {
        let actions = actions("func main() {\n}");
        assert_eq!(actions.len(), 1);
        assert!(actions[0].edit.is_none());

        let command = actions[0].command.as_ref().unwrap();
        assert_eq!(command.command, OPEN_DOCUMENTATION_COMMAND);
    }

    #[test]
    fn test_unrelated_diagnostics_ignored() {
        let foreign = Diagnostic {
            message: "elsewhere".to_string(),
            ..Default::default()
        };
        let analysis = analyze_document("print(1)");
        assert!(get_code_actions(&analysis, &uri(), &[foreign]).is_empty());
    }
}
