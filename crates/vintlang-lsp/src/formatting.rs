//! Document formatting for VintLang.
//!
//! Indentation is re-derived from braces alone: a line starting with `}`
//! dedents before it is emitted, a line ending with `{` indents the
//! lines after it. Depth never drops below zero. Blank lines are emptied.

use tower_lsp::lsp_types::{Position, Range, TextEdit};

use crate::analysis::{analyze_document, utf16_len, DocumentAnalysis};

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Reformat lines, starting at the given depth. Returns the formatted
/// lines and the depth after the last one.
fn format_lines<'a>(lines: impl IntoIterator<Item = &'a String>, mut depth: usize) -> (Vec<String>, usize) {
    let mut formatted = Vec::new();

    for line in lines {
        let trimmed = line.trim();

        if trimmed.starts_with('}') {
            depth = depth.saturating_sub(1);
        }

        if trimmed.is_empty() {
            formatted.push(String::new());
        } else {
            formatted.push(format!("{}{}", " ".repeat(depth * INDENT_WIDTH), trimmed));
        }

        if trimmed.ends_with('{') {
            depth += 1;
        }
    }

    (formatted, depth)
}

/// Format a whole text.
pub fn format_text(content: &str) -> String {
    let analysis = analyze_document(content);
    format_lines(&analysis.lines, 0).0.join(analysis.newline())
}

/// Format a whole document as a single edit. Returns no edit when the
/// document is already formatted.
pub fn format_document(analysis: &DocumentAnalysis) -> Vec<TextEdit> {
    let (formatted, _) = format_lines(&analysis.lines, 0);
    if formatted == analysis.lines {
        return Vec::new();
    }

    vec![TextEdit {
        range: analysis.full_range(),
        new_text: formatted.join(analysis.newline()),
    }]
}

/// Format the lines touched by `range`. The starting depth is derived
/// from the lines before the range.
pub fn format_range(analysis: &DocumentAnalysis, range: Range) -> Vec<TextEdit> {
    let lines = &analysis.lines;
    if lines.is_empty() {
        return Vec::new();
    }

    let start = (range.start.line as usize).min(lines.len() - 1);
    let end = (range.end.line as usize).clamp(start, lines.len() - 1);

    let (_, depth) = format_lines(&lines[..start], 0);
    let (formatted, _) = format_lines(&lines[start..=end], depth);
    if formatted[..] == lines[start..=end] {
        return Vec::new();
    }

    vec![TextEdit {
        range: Range {
            start: Position::new(start as u32, 0),
            end: Position::new(end as u32, utf16_len(&lines[end])),
        },
        new_text: formatted.join(analysis.newline()),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSY: &str = "let f = func(x) {\nif (x > 1) {\n  print(x)\n      }\n   else {\n  return 0\n}\n}\n\n  f(2)";

    #[test]
    fn test_format_indents_by_braces() {
        assert_eq!(
            format_text(MESSY),
            "let f = func(x) {\n    if (x > 1) {\n        print(x)\n    }\n    else {\n        return 0\n    }\n}\n\nf(2)"
        );
    }

    #[test]
    fn test_format_document_single_edit() {
        let analysis = analyze_document(MESSY);
        let edits = format_document(&analysis);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range.start, Position::new(0, 0));
        assert_eq!(edits[0].range.end, Position::new(9, 6));
    }

    #[test]
    fn test_format_is_idempotent() {
        let once = format_text(MESSY);
        assert_eq!(format_text(&once), once);
        assert!(format_document(&analyze_document(&once)).is_empty());
    }

    #[test]
    fn test_depth_never_negative() {
        assert_eq!(format_text("}\n}\nprint(1)"), "}\n}\nprint(1)");
    }

    #[test]
    fn test_keeps_crlf() {
        assert_eq!(format_text("if (a) {\r\nb()\r\n}"), "if (a) {\r\n    b()\r\n}");
    }

    #[test]
    fn test_document_edit_keeps_crlf() {
        let analysis = analyze_document("if (a) {\r\nb()\r\n}\r\n");
        let edits = format_document(&analysis);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "if (a) {\r\n    b()\r\n}\r\n");
        assert_eq!(edits[0].range.end, Position::new(3, 0));
    }

    #[test]
    fn test_range_edit_keeps_crlf() {
        let analysis = analyze_document("if (a) {\r\nb()\r\nc()\r\n}");
        let edits = format_range(
            &analysis,
            Range {
                start: Position::new(1, 0),
                end: Position::new(2, 3),
            },
        );
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "    b()\r\n    c()");
    }

    #[test]
    fn test_format_range_uses_preceding_depth() {
        let analysis = analyze_document("let f = func() {\nif (a) {\nb()\n}\n}");
        let edits = format_range(
            &analysis,
            Range {
                start: Position::new(2, 0),
                end: Position::new(3, 0),
            },
        );
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range.start, Position::new(2, 0));
        assert_eq!(edits[0].range.end, Position::new(3, 1));
        assert_eq!(edits[0].new_text, "        b()\n    }");
    }
}
