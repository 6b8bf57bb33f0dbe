//! Navigation providers for VintLang.
//!
//! Provides:
//! - Go-to-definition (`let name =` or `import name`)
//! - Find references and document highlights (word-boundary matches)
//! - Rename, refused for keywords and builtins
//!
//! All lookups are textual searches over the document's lines.

use std::collections::HashMap;
use tower_lsp::lsp_types::{
    DocumentHighlight, DocumentHighlightKind, GotoDefinitionResponse, Location, Position,
    PrepareRenameResponse, Range, TextEdit, Url, WorkspaceEdit,
};

use crate::analysis::{
    get_word_at_position, is_word_char, named_declaration_regex, span_range, word_regex,
    DocumentAnalysis,
};
use crate::language::is_reserved;

/// Get the definition location of the word at a position.
pub fn get_definition(
    analysis: &DocumentAnalysis,
    uri: &Url,
    position: Position,
) -> Option<GotoDefinitionResponse> {
    let (word, _) = get_word_at_position(&analysis.lines, position)?;
    let range = find_declaration(analysis, &word)?;

    Some(GotoDefinitionResponse::Scalar(Location {
        uri: uri.clone(),
        range,
    }))
}

/// Range of the first declaration of `name`.
pub fn find_declaration(analysis: &DocumentAnalysis, name: &str) -> Option<Range> {
    let re = named_declaration_regex(name)?;

    analysis.lines.iter().enumerate().find_map(|(line_num, line)| {
        let caps = re.captures(line)?;
        let name_match = caps.get(1).or_else(|| caps.get(2))?;
        Some(span_range(line_num, line, name_match.start(), name_match.end()))
    })
}

/// Every word-boundary occurrence of `name`, in document order.
pub fn find_occurrences(analysis: &DocumentAnalysis, name: &str) -> Vec<Range> {
    let Some(re) = word_regex(name) else {
        return Vec::new();
    };

    analysis
        .lines
        .iter()
        .enumerate()
        .flat_map(|(line_num, line)| {
            re.find_iter(line)
                .map(move |m| span_range(line_num, line, m.start(), m.end()))
        })
        .collect()
}

/// Find all references to the word at a position.
pub fn get_references(
    analysis: &DocumentAnalysis,
    uri: &Url,
    position: Position,
    include_declaration: bool,
) -> Vec<Location> {
    let Some((word, _)) = get_word_at_position(&analysis.lines, position) else {
        return Vec::new();
    };

    let declaration = if include_declaration {
        None
    } else {
        find_declaration(analysis, &word)
    };

    find_occurrences(analysis, &word)
        .into_iter()
        .filter(|range| Some(*range) != declaration)
        .map(|range| Location {
            uri: uri.clone(),
            range,
        })
        .collect()
}

/// Highlight every occurrence of the word at a position. The
/// declaration site is marked as a write.
pub fn get_document_highlights(
    analysis: &DocumentAnalysis,
    position: Position,
) -> Vec<DocumentHighlight> {
    let Some((word, _)) = get_word_at_position(&analysis.lines, position) else {
        return Vec::new();
    };
    let declaration = find_declaration(analysis, &word);

    find_occurrences(analysis, &word)
        .into_iter()
        .map(|range| DocumentHighlight {
            range,
            kind: Some(if Some(range) == declaration {
                DocumentHighlightKind::WRITE
            } else {
                DocumentHighlightKind::READ
            }),
        })
        .collect()
}

/// Check whether the word at a position can be renamed.
pub fn prepare_rename(analysis: &DocumentAnalysis, position: Position) -> Option<PrepareRenameResponse> {
    let (word, range) = get_word_at_position(&analysis.lines, position)?;
    if is_reserved(&word) {
        return None;
    }

    Some(PrepareRenameResponse::RangeWithPlaceholder {
        range,
        placeholder: word,
    })
}

/// Rename every occurrence of the word at a position.
pub fn rename(
    analysis: &DocumentAnalysis,
    uri: &Url,
    position: Position,
    new_name: &str,
) -> Option<WorkspaceEdit> {
    let (word, _) = get_word_at_position(&analysis.lines, position)?;
    if is_reserved(&word) || !is_valid_identifier(new_name) {
        return None;
    }

    let edits: Vec<TextEdit> = find_occurrences(analysis, &word)
        .into_iter()
        .map(|range| TextEdit {
            range,
            new_text: new_name.to_string(),
        })
        .collect();

    let mut changes = HashMap::new();
    changes.insert(uri.clone(), edits);

    Some(WorkspaceEdit {
        changes: Some(changes),
        ..Default::default()
    })
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_') && chars.all(is_word_char)
}
