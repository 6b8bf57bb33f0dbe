//! Code analysis for VintLang files.
//!
//! Every open document owns one [`DocumentAnalysis`]: the split lines of
//! its current text, the symbol table rebuilt from them and the
//! diagnostics derived from both. The whole value is rebuilt on every
//! change and swapped in as a unit, so resolvers never observe a table
//! that belongs to another version of the text.
//!
//! This module also hosts the text helpers shared by the resolvers:
//! line splitting, UTF-16 column conversion, word lookup and the
//! comment-aware line iterator.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tower_lsp::lsp_types::{Diagnostic, Position, Range};

use crate::diagnostics::compute_diagnostics;
use crate::symbols::{index_symbols, SymbolTable};

macro_rules! static_regex {
    ($(#[$meta:meta])* $name:ident, $pattern:expr) => {
        $(#[$meta])*
        pub fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static pattern"))
        }
    };
}

static_regex!(
    /// `let name = func`, the canonical function declaration.
    function_declaration_regex,
    r"\blet\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*func\b"
);
static_regex!(
    /// `let name =`, any declaration.
    variable_declaration_regex,
    r"\blet\s+([A-Za-z_][A-Za-z0-9_]*)\s*="
);
static_regex!(
    /// `import name`.
    import_regex,
    r"\bimport\s+([A-Za-z_][A-Za-z0-9_]*)"
);
static_regex!(
    /// Any identifier-shaped word.
    identifier_regex,
    r"\b[A-Za-z_][A-Za-z0-9_]*\b"
);
static_regex!(
    /// `name(`, call syntax.
    call_regex,
    r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\("
);

/// Word-boundary occurrences of `name`.
///
/// Identifiers are escaped before being embedded, so a name can never
/// change the meaning of the pattern.
pub fn word_regex(name: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok()
}

/// Call sites of `name`.
pub fn named_call_regex(name: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))).ok()
}

/// `let name =` or `import name` for a specific name.
pub fn named_declaration_regex(name: &str) -> Option<Regex> {
    let name = regex::escape(name);
    Regex::new(&format!(r"\blet\s+({name})\s*=|\bimport\s+({name})\b")).ok()
}

/// `let name = func` for a specific name.
pub fn named_function_declaration_regex(name: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"\blet\s+({})\s*=\s*func\b",
        regex::escape(name)
    ))
    .ok()
}

/// Result of analyzing a document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentAnalysis {
    /// The document text split into lines (line terminators removed).
    pub lines: Vec<String>,
    /// Declarations and their usage sites.
    pub symbols: SymbolTable,
    /// Diagnostics for the current text.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the text uses `\r\n` line endings.
    pub crlf: bool,
}

impl DocumentAnalysis {
    /// Get a line of the document.
    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    /// Line terminator to use when writing lines back.
    pub fn newline(&self) -> &'static str {
        if self.crlf {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Range covering the whole document.
    pub fn full_range(&self) -> Range {
        let last = self.lines.len().saturating_sub(1);
        let end_character = self.lines.last().map(|l| utf16_len(l)).unwrap_or(0);
        Range {
            start: Position::new(0, 0),
            end: Position::new(last as u32, end_character),
        }
    }
}

/// Analyze a VintLang document: split, index, diagnose.
pub fn analyze_document(content: &str) -> DocumentAnalysis {
    let started = Instant::now();

    let lines = split_lines(content);
    let symbols = index_symbols(&lines);
    let diagnostics = compute_diagnostics(&lines, &symbols);

    log::debug!(
        "analyzed {} lines: {} symbols, {} diagnostics in {:?}",
        lines.len(),
        symbols.len(),
        diagnostics.len(),
        started.elapsed()
    );

    DocumentAnalysis {
        lines,
        symbols,
        diagnostics,
        crlf: content.contains("\r\n"),
    }
}

/// Split text into lines on `\n`, dropping a trailing `\r`.
///
/// Unlike [`str::lines`] a trailing newline yields a final empty line,
/// which keeps line numbers aligned with the editor's view.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Number of UTF-16 code units in `s`.
pub fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

/// Convert a byte offset within `line` to a UTF-16 column.
pub fn utf16_col(line: &str, byte: usize) -> u32 {
    let byte = byte.min(line.len());
    utf16_len(&line[..byte])
}

/// Convert a UTF-16 column to a byte offset within `line`, clamped to
/// the line length and to a char boundary.
pub fn byte_index(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (idx, c) in line.char_indices() {
        if units >= character {
            return idx;
        }
        units += c.len_utf16() as u32;
    }
    line.len()
}

/// Range of a byte span on one line.
pub fn span_range(line_num: usize, line: &str, start: usize, end: usize) -> Range {
    Range {
        start: Position::new(line_num as u32, utf16_col(line, start)),
        end: Position::new(line_num as u32, utf16_col(line, end)),
    }
}

/// Range covering a whole line.
pub fn line_range(line_num: usize, line: &str) -> Range {
    span_range(line_num, line, 0, line.len())
}

/// Range covering the trimmed content of a line.
pub fn trimmed_line_range(line_num: usize, line: &str) -> Range {
    let start = line.len() - line.trim_start().len();
    let end = line.trim_end().len().max(start);
    span_range(line_num, line, start, end)
}

/// Check if a character is part of a word.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Get the word at a position, with its range.
pub fn get_word_at_position(lines: &[String], position: Position) -> Option<(String, Range)> {
    let line = lines.get(position.line as usize)?;
    let offset = byte_index(line, position.character);

    let start = line[..offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(offset);
    let end = line[offset..]
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(idx, _)| offset + idx)
        .unwrap_or(line.len());

    if start == end {
        return None;
    }

    Some((
        line[start..end].to_string(),
        span_range(position.line as usize, line, start, end),
    ))
}

/// Lines that carry code: blank lines, `//` lines and block comments
/// are skipped.
///
/// Block comments are only recognized when `/*` starts the trimmed line.
pub fn code_lines(lines: &[String]) -> Vec<(usize, &str)> {
    let mut result = Vec::with_capacity(lines.len());
    let mut in_block_comment = false;

    for (line_num, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if in_block_comment {
            if trimmed.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }

        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        if trimmed.starts_with("/*") {
            in_block_comment = !trimmed.contains("*/");
            continue;
        }

        result.push((line_num, line.as_str()));
    }

    result
}

/// Line on which the body opened at `start_line` closes, by brace
/// depth counting. Falls back to the last line for an unterminated body
/// and to `start_line` when no brace opens.
pub fn block_end_line(lines: &[String], start_line: usize) -> usize {
    let mut depth = 0i32;
    let mut opened = false;

    for (line_num, line) in lines.iter().enumerate().skip(start_line) {
        for c in line.chars() {
            match c {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' if opened => {
                    depth -= 1;
                    if depth == 0 {
                        return line_num;
                    }
                }
                _ => {}
            }
        }
        if !opened {
            return start_line;
        }
    }

    if opened {
        lines.len().saturating_sub(1)
    } else {
        start_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        split_lines(text)
    }

    #[test]
    fn test_split_lines_keeps_trailing_empty_line() {
        assert_eq!(lines("a\r\nb\n"), vec!["a", "b", ""]);
        assert_eq!(lines(""), vec![""]);
    }

    #[test]
    fn test_utf16_conversion() {
        let line = "let é = \"😀\" + x";
        let x = line.find('x').unwrap();
        assert_eq!(utf16_col(line, x), 15);
        assert_eq!(byte_index(line, 15), x);
        assert_eq!(byte_index(line, 999), line.len());
    }

    #[test]
    fn test_word_at_position() {
        let doc = lines("let counter = 1\nprint(counter)");
        let (word, range) = get_word_at_position(&doc, Position::new(1, 8)).unwrap();
        assert_eq!(word, "counter");
        assert_eq!(range.start, Position::new(1, 6));
        assert_eq!(range.end, Position::new(1, 13));

        // Cursor just past the end of a word still resolves it.
        let (word, _) = get_word_at_position(&doc, Position::new(0, 11)).unwrap();
        assert_eq!(word, "counter");

        assert!(get_word_at_position(&doc, Position::new(0, 12)).is_none());
        assert!(get_word_at_position(&doc, Position::new(5, 0)).is_none());
    }

    #[test]
    fn test_code_lines_skip_comments() {
        let doc = lines("// note\nlet a = 1\n/* start\nlet b = 2\nend */\n\nlet c = 3\n   /* one line */\nx");
        let kept: Vec<usize> = code_lines(&doc).into_iter().map(|(n, _)| n).collect();
        assert_eq!(kept, vec![1, 6, 8]);
    }

    #[test]
    fn test_block_end_line() {
        let doc = lines("let f = func() {\n  if (x) {\n  }\n}\nprint(1)");
        assert_eq!(block_end_line(&doc, 0), 3);
        assert_eq!(block_end_line(&doc, 1), 2);
        assert_eq!(block_end_line(&doc, 4), 4);

        let single = lines("let add = func(a, b) { return a + b }");
        assert_eq!(block_end_line(&single, 0), 0);

        let open = lines("let f = func() {\nprint(1)");
        assert_eq!(block_end_line(&open, 0), 1);
    }

    #[test]
    fn test_escaped_name_patterns() {
        let re = word_regex("a+b").unwrap();
        assert!(!re.is_match("aab"));
        assert!(named_call_regex("add").unwrap().is_match("add (1, 2)"));
        assert!(!named_call_regex("add").unwrap().is_match("address(1)"));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let text = "let x = 5\nlet f = func(a) { return a }\nprint(x)\nf(1)";
        assert_eq!(analyze_document(text), analyze_document(text));
    }

    #[test]
    fn test_line_ending_detection() {
        assert_eq!(analyze_document("a\r\nb").newline(), "\r\n");
        assert_eq!(analyze_document("a\nb").newline(), "\n");
        assert_eq!(analyze_document("").newline(), "\n");
    }
}
