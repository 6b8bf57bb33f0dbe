//! Reference-count code lenses above function declarations.
//!
//! Every line is scanned, comments included, both for declarations and
//! for the calls that are counted.

use serde_json::json;
use tower_lsp::lsp_types::{CodeLens, Command, Url};

use crate::analysis::{function_declaration_regex, named_call_regex, span_range, DocumentAnalysis};

/// Client command bound to every lens.
pub const SHOW_REFERENCES_COMMAND: &str = "vintlang.showReferences";

/// One lens per function declaration, counting the other lines that
/// call it.
pub fn get_code_lenses(analysis: &DocumentAnalysis, uri: &Url) -> Vec<CodeLens> {
    let lines = &analysis.lines;
    let mut lenses = Vec::new();

    for (decl_line, line) in lines.iter().enumerate() {
        let Some(name) = function_declaration_regex().captures(line).and_then(|c| c.get(1)) else {
            continue;
        };
        let Some(re) = named_call_regex(name.as_str()) else {
            continue;
        };

        let count = lines
            .iter()
            .enumerate()
            .filter(|(line_num, text)| *line_num != decl_line && re.is_match(text))
            .count();

        let range = span_range(decl_line, line, name.start(), name.end());
        lenses.push(CodeLens {
            range,
            command: Some(Command {
                title: format!("{} reference{}", count, if count == 1 { "" } else { "s" }),
                command: SHOW_REFERENCES_COMMAND.to_string(),
                arguments: Some(vec![json!(uri), json!(range.start)]),
            }),
            data: None,
        });
    }

    lenses
}
