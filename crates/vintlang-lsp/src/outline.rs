//! Document and workspace symbols for VintLang.
//!
//! Re-scans every line of a document for declarations and imports and
//! reports one entry per match: the whole line as the symbol range, the
//! declared name as the selection range. A line holding both a binding
//! and an import yields both. Commented-out declarations are listed too.

use tower_lsp::lsp_types::{DocumentSymbol, Location, SymbolInformation, SymbolKind, Url};

use crate::analysis::{line_range, span_range, DocumentAnalysis};
use crate::symbols::{line_declarations, SymbolKind as DeclKind};

fn lsp_kind(kind: DeclKind) -> SymbolKind {
    match kind {
        DeclKind::Function => SymbolKind::FUNCTION,
        DeclKind::Variable => SymbolKind::VARIABLE,
        DeclKind::Import => SymbolKind::MODULE,
    }
}

/// Symbols declared in a document, in line order.
#[allow(deprecated)]
pub fn get_document_symbols(analysis: &DocumentAnalysis) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();

    for (line_num, line) in analysis.lines.iter().enumerate() {
        for decl in line_declarations(line) {
            symbols.push(DocumentSymbol {
                name: decl.name.to_string(),
                detail: Some(line.trim().to_string()),
                kind: lsp_kind(decl.kind),
                tags: None,
                deprecated: None,
                range: line_range(line_num, line),
                selection_range: span_range(line_num, line, decl.start, decl.end),
                children: None,
            });
        }
    }

    symbols
}

/// Symbols across documents whose name contains `query`, ignoring case.
/// An empty query matches everything.
#[allow(deprecated)]
pub fn get_workspace_symbols<'a>(
    documents: impl IntoIterator<Item = (&'a Url, &'a DocumentAnalysis)>,
    query: &str,
) -> Vec<SymbolInformation> {
    let query = query.to_lowercase();
    let mut result = Vec::new();

    for (uri, analysis) in documents {
        for symbol in get_document_symbols(analysis) {
            if !symbol.name.to_lowercase().contains(&query) {
                continue;
            }
            result.push(SymbolInformation {
                name: symbol.name,
                kind: symbol.kind,
                tags: None,
                deprecated: None,
                location: Location {
                    uri: uri.clone(),
                    range: symbol.range,
                },
                container_name: None,
            });
        }
    }

    result
}
