//! Inlay hints for VintLang.
//!
//! Two kinds of hints are produced:
//! - parameter names before the arguments of well-known builtins
//! - an inferred type after the name in `let name = <literal>`
//!
//! Arguments are found by splitting the text between `(` and the next
//! `)` on commas. Nested calls and strings containing commas are not
//! understood.

use tower_lsp::lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, Position, Range};

use crate::analysis::{call_regex, code_lines, utf16_col, variable_declaration_regex, DocumentAnalysis};
use crate::language::builtin_signature;

/// Builtins whose arguments get parameter-name hints.
pub const PARAMETER_HINT_BUILTINS: &[&str] = &[
    "convert", "has_key", "range", "split", "join", "replace", "slice", "pow", "format", "add",
    "subtract",
];

/// Get the inlay hints for the lines touched by `range`.
pub fn get_inlay_hints(analysis: &DocumentAnalysis, range: Range) -> Vec<InlayHint> {
    let first = range.start.line as usize;
    let last = range.end.line as usize;
    let mut hints = Vec::new();

    for (line_num, line) in code_lines(&analysis.lines) {
        if line_num < first || line_num > last {
            continue;
        }
        type_hint(line_num, line, &mut hints);
        parameter_hints(line_num, line, &mut hints);
    }

    hints
}

fn type_hint(line_num: usize, line: &str, hints: &mut Vec<InlayHint>) {
    let Some(caps) = variable_declaration_regex().captures(line) else {
        return;
    };
    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
        return;
    };
    let Some(ty) = infer_literal_type(&line[whole.end()..]) else {
        return;
    };

    hints.push(InlayHint {
        position: Position::new(line_num as u32, utf16_col(line, name.end())),
        label: InlayHintLabel::String(format!(": {ty}")),
        kind: Some(InlayHintKind::TYPE),
        text_edits: None,
        tooltip: None,
        padding_left: None,
        padding_right: None,
        data: None,
    });
}

fn parameter_hints(line_num: usize, line: &str, hints: &mut Vec<InlayHint>) {
    for caps in call_regex().captures_iter(line) {
        let (Some(call), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !PARAMETER_HINT_BUILTINS.contains(&name.as_str()) {
            continue;
        }
        let Some(signature) = builtin_signature(name.as_str()) else {
            continue;
        };

        let args_start = call.end();
        let args_end = line[args_start..]
            .find(')')
            .map_or(line.len(), |offset| args_start + offset);

        let mut offset = args_start;
        for (arg, parameter) in line[args_start..args_end].split(',').zip(signature.parameters) {
            let leading = arg.len() - arg.trim_start().len();
            if !arg.trim().is_empty() {
                hints.push(InlayHint {
                    position: Position::new(line_num as u32, utf16_col(line, offset + leading)),
                    label: InlayHintLabel::String(format!("{parameter}:")),
                    kind: Some(InlayHintKind::PARAMETER),
                    text_edits: None,
                    tooltip: None,
                    padding_left: None,
                    padding_right: Some(true),
                    data: None,
                });
            }
            offset += arg.len() + 1;
        }
    }
}

/// Type name for the literal shape of a right-hand side, if recognized.
pub fn infer_literal_type(rhs: &str) -> Option<&'static str> {
    let value = rhs.split("//").next().unwrap_or_default().trim();
    let first = value.chars().next()?;

    let ty = match first {
        '"' | '\'' => "string",
        '[' => "array",
        '{' => "map",
        _ if value == "true" || value == "false" => "bool",
        _ if value.starts_with("func")
            && !value["func".len()..].starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') =>
        {
            "function"
        }
        _ => {
            let digits = value.strip_prefix('-').unwrap_or(value);
            match digits.split_once('.') {
                None if is_digits(digits) => "int",
                Some((whole, frac)) if is_digits(whole) && is_digits(frac) => "float",
                _ => return None,
            }
        }
    };

    Some(ty)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_document;

    fn whole(analysis: &DocumentAnalysis) -> Range {
        analysis.full_range()
    }

    fn labels(hints: &[InlayHint]) -> Vec<(u32, u32, String)> {
        hints
            .iter()
            .map(|h| {
                let InlayHintLabel::String(label) = &h.label else {
                    panic!("expected a string label");
                };
                (h.position.line, h.position.character, label.clone())
            })
            .collect()
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(infer_literal_type(" \"hi\""), Some("string"));
        assert_eq!(infer_literal_type(" 'hi'"), Some("string"));
        assert_eq!(infer_literal_type(" 42"), Some("int"));
        assert_eq!(infer_literal_type(" -3.5 // note"), Some("float"));
        assert_eq!(infer_literal_type(" true"), Some("bool"));
        assert_eq!(infer_literal_type(" [1, 2]"), Some("array"));
        assert_eq!(infer_literal_type(" {\"a\": 1}"), Some("map"));
        assert_eq!(infer_literal_type(" func(x) { }"), Some("function"));
        assert_eq!(infer_literal_type(" other(1)"), None);
        assert_eq!(infer_literal_type(" functional"), None);
        assert_eq!(infer_literal_type(" 1.2.3"), None);
        assert_eq!(infer_literal_type(""), None);
    }

    #[test]
    fn test_type_hint_after_name() {
        let analysis = analyze_document("let count = 10\nlet label = describe(count)");
        let hints = get_inlay_hints(&analysis, whole(&analysis));
        assert_eq!(labels(&hints), vec![(0, 9, ": int".to_string())]);
        assert_eq!(hints[0].kind, Some(InlayHintKind::TYPE));
    }

    #[test]
    fn test_parameter_hints() {
        let analysis = analyze_document("print(replace(s, \"a\", \"b\"))");
        let hints = get_inlay_hints(&analysis, whole(&analysis));
        assert_eq!(
            labels(&hints),
            vec![
                (0, 14, "text:".to_string()),
                (0, 17, "old:".to_string()),
                (0, 22, "new:".to_string()),
            ]
        );
        assert!(hints.iter().all(|h| h.kind == Some(InlayHintKind::PARAMETER)));
    }

    #[test]
    fn test_extra_arguments_get_no_hint() {
        let analysis = analyze_document("pow(2, 8, 1)");
        let hints = get_inlay_hints(&analysis, whole(&analysis));
        assert_eq!(hints.len(), 2);
    }

    #[test]
    fn test_hints_limited_to_range() {
        let analysis = analyze_document("let a = 1\nlet b = 2\nlet c = 3");
        let range = Range {
            start: Position::new(1, 0),
            end: Position::new(1, 9),
        };
        let hints = get_inlay_hints(&analysis, range);
        assert_eq!(labels(&hints), vec![(1, 5, ": int".to_string())]);
    }
}
