//! Language Server Protocol implementation for VintLang.
//!
//! This crate provides a full-featured LSP server that can be used by
//! any editor supporting the Language Server Protocol.
//!
//! Features:
//! - Diagnostics for unbalanced delimiters, malformed functions, missing
//!   `let` and unused symbols
//! - Completion for keywords, builtins, modules and document symbols
//! - Hover documentation and signature help
//! - Go-to-definition, references, highlights and rename
//! - Document and workspace symbols, folding, formatting
//! - Semantic tokens, inlay hints, call hierarchy, code lenses, colors
//!
//! All analysis is heuristic and line based; there is no parser.

pub mod analysis;
mod backend;
pub mod call_hierarchy;
pub mod code_action;
pub mod code_lens;
pub mod color;
pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod document;
pub mod folding;
pub mod formatting;
pub mod hover;
pub mod inlay_hints;
pub mod language;
pub mod outline;
pub mod semantic_tokens;
pub mod symbols;

pub use analysis::{analyze_document, DocumentAnalysis};
pub use backend::VintLangServer;

use tower_lsp::{LspService, Server};

/// Run the LSP server over stdio.
///
/// This function blocks until the client disconnects.
pub async fn run_lsp_server() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(VintLangServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
