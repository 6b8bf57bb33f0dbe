//! Document management for the LSP server.
//!
//! Tracks open documents and their content using rope data structures.
//! Each document carries the analysis of its current text, built when
//! the text is stored, so a document handed out by the store always
//! pairs a text with the symbol table derived from that exact text.

use dashmap::DashMap;
use ropey::Rope;
use std::sync::Arc;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::analysis::{analyze_document, DocumentAnalysis};

/// A document being edited.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document URI.
    pub uri: Url,
    /// The document content as a rope.
    pub content: Rope,
    /// The document version.
    pub version: i32,
    /// Analysis of `content`, replaced wholesale on every change.
    pub analysis: Arc<DocumentAnalysis>,
}

impl Document {
    /// Create a new document with the given content.
    pub fn new(uri: Url, content: &str, version: i32) -> Self {
        Self::from_rope(uri, Rope::from_str(content), version)
    }

    fn from_rope(uri: Url, content: Rope, version: i32) -> Self {
        let analysis = Arc::new(analyze_document(&content.to_string()));
        Self {
            uri,
            content,
            version,
            analysis,
        }
    }

    /// Get the full text of the document.
    pub fn text(&self) -> String {
        self.content.to_string()
    }
}

/// Char index of an LSP position (UTF-16 column). Positions past the end
/// of a line clamp to the line end, positions past the last line clamp to
/// the end of the text.
fn position_to_char(rope: &Rope, position: Position) -> usize {
    let line = position.line as usize;
    if line >= rope.len_lines() {
        return rope.len_chars();
    }

    let mut utf16 = 0;
    let mut offset = 0;
    for c in rope.line(line).chars() {
        if utf16 >= position.character as usize || c == '\n' || c == '\r' {
            break;
        }
        utf16 += c.len_utf16();
        offset += 1;
    }

    rope.line_to_char(line) + offset
}

/// Apply content changes in order. A change without a range replaces the
/// whole text.
fn apply_changes(content: &mut Rope, changes: Vec<TextDocumentContentChangeEvent>) {
    for change in changes {
        match change.range {
            Some(range) => {
                let start = position_to_char(content, range.start);
                let end = position_to_char(content, range.end).max(start);
                content.remove(start..end);
                content.insert(start, &change.text);
            }
            None => *content = Rope::from_str(&change.text),
        }
    }
}

/// Document store for managing all open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    /// Create a new document store.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open a document.
    pub fn open(&self, uri: Url, content: &str, version: i32) -> Document {
        let document = Document::new(uri.clone(), content, version);
        self.documents.insert(uri, document.clone());
        document
    }

    /// Apply a `didChange` batch to a document. An unknown document
    /// starts from empty text.
    pub fn update(
        &self,
        uri: Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Document {
        let mut content = self
            .documents
            .get(&uri)
            .map(|doc| doc.content.clone())
            .unwrap_or_else(Rope::new);
        apply_changes(&mut content, changes);

        // Analyze outside the map lock; the swap below is a single insert.
        let document = Document::from_rope(uri.clone(), content, version);
        self.documents.insert(uri, document.clone());
        document
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) -> Option<Document> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    /// Get a document.
    pub fn get(&self, uri: &Url) -> Option<Document> {
        self.documents.get(uri).map(|doc| doc.clone())
    }

    /// All open documents, ordered by URI.
    pub fn all(&self) -> Vec<Document> {
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by(|a, b| a.uri.as_str().cmp(b.uri.as_str()));
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tower_lsp::lsp_types::Range;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///tmp/{name}.vint")).unwrap()
    }

    fn full(text: &str) -> Vec<TextDocumentContentChangeEvent> {
        vec![TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: text.to_string(),
        }]
    }

    fn edit(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position::new(start.0, start.1),
                end: Position::new(end.0, end.1),
            }),
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_open_get_close() {
        let store = DocumentStore::new();
        store.open(uri("a"), "let x = 5\nprint(x)", 1);

        let doc = store.get(&uri("a")).unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.text(), "let x = 5\nprint(x)");
        assert!(doc.analysis.symbols.get("x").unwrap().used);
        assert!(doc.analysis.diagnostics.is_empty());

        assert!(store.close(&uri("a")).is_some());
        assert!(store.get(&uri("a")).is_none());
        assert!(store.close(&uri("a")).is_none());
    }

    #[test]
    fn test_update_replaces_text_and_analysis() {
        let store = DocumentStore::new();
        store.open(uri("a"), "let x = 5\nprint(x)", 1);
        store.update(uri("a"), full("let x = 5"), 2);

        let doc = store.get(&uri("a")).unwrap();
        assert_eq!(doc.version, 2);
        assert_eq!(doc.text(), "let x = 5");
        assert!(!doc.analysis.symbols.get("x").unwrap().used);
        assert_eq!(doc.analysis.diagnostics.len(), 1);
    }

    #[test]
    fn test_snapshot_survives_update() {
        let store = DocumentStore::new();
        store.open(uri("a"), "let old = 1", 1);
        let snapshot = store.get(&uri("a")).unwrap();

        store.update(uri("a"), full("let new = 2"), 2);

        assert!(snapshot.analysis.symbols.contains("old"));
        assert!(store.get(&uri("a")).unwrap().analysis.symbols.contains("new"));
    }

    #[test]
    fn test_update_unknown_document_opens_it() {
        let store = DocumentStore::new();
        store.update(uri("late"), full("print(1)"), 3);
        let doc = store.get(&uri("late")).unwrap();
        assert_eq!(doc.version, 3);
        assert_eq!(doc.text(), "print(1)");
    }

    #[test]
    fn test_all_accepts_malformed_text() {
        let store = DocumentStore::new();
        store.open(uri("b"), "}}} ((( func", 1);
        store.open(uri("a"), "", 1);

        let all = store.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].uri, uri("a"));
        assert_eq!(all[1].uri, uri("b"));
    }

    #[test]
    fn test_ranged_edits_apply_to_rope() {
        let store = DocumentStore::new();
        store.open(uri("a"), "let x = 5\nprint(y)", 1);

        let doc = store.update(
            uri("a"),
            vec![edit((1, 6), (1, 7), "x"), edit((0, 8), (0, 9), "42")],
            2,
        );
        assert_eq!(doc.text(), "let x = 42\nprint(x)");
        assert!(doc.analysis.symbols.get("x").unwrap().used);
    }

    #[test]
    fn test_ranged_edit_uses_utf16_columns() {
        let store = DocumentStore::new();
        store.open(uri("a"), "let s = \"😀a\"", 1);

        // The emoji takes two UTF-16 units, so `a` starts at column 11.
        let doc = store.update(uri("a"), vec![edit((0, 11), (0, 12), "b")], 2);
        assert_eq!(doc.text(), "let s = \"😀b\"");
    }

    #[test]
    fn test_edit_past_end_appends() {
        let store = DocumentStore::new();
        store.open(uri("a"), "print(1)", 1);

        let doc = store.update(uri("a"), vec![edit((5, 0), (5, 0), "\nprint(2)")], 2);
        assert_eq!(doc.text(), "print(1)\nprint(2)");
    }
}
