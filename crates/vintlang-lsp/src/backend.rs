//! LSP backend implementation for VintLang.
//!
//! This module implements the Language Server Protocol handler
//! using tower-lsp. Every request reads one document snapshot from the
//! store and hands its analysis to a resolver.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::call_hierarchy::{incoming_calls, outgoing_calls, prepare_call_hierarchy};
use crate::code_action::get_code_actions;
use crate::code_lens::get_code_lenses;
use crate::color::{get_color_presentations, get_document_colors};
use crate::completion::{get_completions, resolve_completion};
use crate::definition::{
    get_definition, get_document_highlights, get_references, prepare_rename, rename,
};
use crate::document::DocumentStore;
use crate::folding::get_folding_ranges;
use crate::formatting::{format_document, format_range};
use crate::hover::{get_hover, get_signature_help};
use crate::inlay_hints::get_inlay_hints;
use crate::outline::{get_document_symbols, get_workspace_symbols};
use crate::semantic_tokens::{get_semantic_tokens, legend};

/// VintLang Language Server.
pub struct VintLangServer {
    /// The LSP client connection.
    client: Client,
    /// Document store for open files.
    documents: DocumentStore,
}

impl VintLangServer {
    /// Create a new VintLang language server.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
        }
    }

    /// Publish the diagnostics of a document's current analysis.
    async fn analyze_and_publish(&self, uri: Url) {
        if let Some(doc) = self.documents.get(&uri) {
            log::debug!(
                "publishing {} diagnostics for {} (version {})",
                doc.analysis.diagnostics.len(),
                uri,
                doc.version
            );
            self.client
                .publish_diagnostics(uri, doc.analysis.diagnostics.clone(), Some(doc.version))
                .await;
        }
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn full_report(items: Vec<Diagnostic>) -> DocumentDiagnosticReportResult {
    DocumentDiagnosticReportResult::Report(DocumentDiagnosticReport::Full(
        RelatedFullDocumentDiagnosticReport {
            related_documents: None,
            full_document_diagnostic_report: FullDocumentDiagnosticReport {
                result_id: None,
                items,
            },
        },
    ))
}

#[tower_lsp::async_trait]
impl LanguageServer for VintLangServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root_uri) = params.root_uri {
            log::info!("initializing for workspace {}", root_uri);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        ".".to_string(),
                        "(".to_string(),
                        "{".to_string(),
                        "[".to_string(),
                    ]),
                    resolve_provider: Some(true),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: None,
                    work_done_progress_options: Default::default(),
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_highlight_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: Default::default(),
                })),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                document_range_formatting_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                semantic_tokens_provider: Some(
                    SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                        legend: legend(),
                        full: Some(SemanticTokensFullOptions::Bool(true)),
                        range: None,
                        work_done_progress_options: Default::default(),
                    }),
                ),
                inlay_hint_provider: Some(OneOf::Left(true)),
                call_hierarchy_provider: Some(CallHierarchyServerCapability::Simple(true)),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                color_provider: Some(ColorProviderCapability::Simple(true)),
                diagnostic_provider: Some(DiagnosticServerCapabilities::Options(
                    DiagnosticOptions {
                        identifier: Some("vintlang".to_string()),
                        inter_file_dependencies: false,
                        workspace_diagnostics: false,
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "vintlang-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("VintLang LSP server initialized");
        self.client
            .log_message(MessageType::INFO, "VintLang LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;

        log::info!("opened {} (version {})", uri, version);
        self.documents.open(uri.clone(), &text, version);
        self.analyze_and_publish(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        log::debug!(
            "changed {} (version {}, {} edits)",
            uri,
            version,
            params.content_changes.len()
        );
        self.documents.update(uri.clone(), params.content_changes, version);
        self.analyze_and_publish(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        log::info!("closed {}", uri);
        self.documents.close(&uri);

        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        let items = get_completions(&doc.analysis);
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(resolve_completion(item))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(get_hover(&doc.analysis, position))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(get_signature_help(&doc.analysis, position))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(get_definition(&doc.analysis, &uri, position))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        let locations = get_references(
            &doc.analysis,
            &uri,
            position,
            params.context.include_declaration,
        );
        Ok(non_empty(locations))
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(get_document_highlights(&doc.analysis, position)))
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> Result<Option<PrepareRenameResponse>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(prepare_rename(&doc.analysis, params.position))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(rename(&doc.analysis, &uri, position, &params.new_name))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(Some(DocumentSymbolResponse::Nested(get_document_symbols(
            &doc.analysis,
        ))))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        let documents = self.documents.all();
        let symbols = get_workspace_symbols(
            documents.iter().map(|doc| (&doc.uri, doc.analysis.as_ref())),
            &params.query,
        );
        Ok(Some(symbols))
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(get_folding_ranges(&doc.analysis)))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(format_document(&doc.analysis)))
    }

    async fn range_formatting(
        &self,
        params: DocumentRangeFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(format_range(&doc.analysis, params.range)))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(get_code_actions(
            &doc.analysis,
            &uri,
            &params.context.diagnostics,
        )))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data: get_semantic_tokens(&doc.analysis),
        })))
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(get_inlay_hints(&doc.analysis, params.range)))
    }

    async fn prepare_call_hierarchy(
        &self,
        params: CallHierarchyPrepareParams,
    ) -> Result<Option<Vec<CallHierarchyItem>>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(prepare_call_hierarchy(&doc.analysis, &uri, position))
    }

    async fn incoming_calls(
        &self,
        params: CallHierarchyIncomingCallsParams,
    ) -> Result<Option<Vec<CallHierarchyIncomingCall>>> {
        let item = params.item;
        let doc = match self.documents.get(&item.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(incoming_calls(&doc.analysis, &item.uri, &item.name)))
    }

    async fn outgoing_calls(
        &self,
        params: CallHierarchyOutgoingCallsParams,
    ) -> Result<Option<Vec<CallHierarchyOutgoingCall>>> {
        let item = params.item;
        let doc = match self.documents.get(&item.uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(outgoing_calls(&doc.analysis, &item.uri, &item.name)))
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let uri = params.text_document.uri;
        let doc = match self.documents.get(&uri) {
            Some(d) => d,
            None => return Ok(None),
        };

        Ok(non_empty(get_code_lenses(&doc.analysis, &uri)))
    }

    async fn document_color(&self, params: DocumentColorParams) -> Result<Vec<ColorInformation>> {
        let doc = match self.documents.get(&params.text_document.uri) {
            Some(d) => d,
            None => return Ok(Vec::new()),
        };

        Ok(get_document_colors(&doc.analysis))
    }

    async fn color_presentation(
        &self,
        params: ColorPresentationParams,
    ) -> Result<Vec<ColorPresentation>> {
        Ok(get_color_presentations(params.color, params.range))
    }

    async fn diagnostic(
        &self,
        params: DocumentDiagnosticParams,
    ) -> Result<DocumentDiagnosticReportResult> {
        let items = self
            .documents
            .get(&params.text_document.uri)
            .map(|doc| doc.analysis.diagnostics.clone())
            .unwrap_or_default();

        Ok(full_report(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::UNUSED_SYMBOL;
    use tower_lsp::LspService;

    fn uri() -> Url {
        Url::parse("file:///tmp/main.vint").unwrap()
    }

    async fn pull(server: &VintLangServer, uri: Url) -> Vec<Diagnostic> {
        let report = server
            .diagnostic(DocumentDiagnosticParams {
                text_document: TextDocumentIdentifier { uri },
                identifier: None,
                previous_result_id: None,
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
            })
            .await
            .unwrap();

        match report {
            DocumentDiagnosticReportResult::Report(DocumentDiagnosticReport::Full(report)) => {
                report.full_document_diagnostic_report.items
            }
            other => panic!("expected a full report, got {:?}", other),
        }
    }

    async fn open(server: &VintLangServer, text: &str) {
        server
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri(),
                    language_id: "vint".to_string(),
                    version: 1,
                    text: text.to_string(),
                },
            })
            .await;
    }

    async fn change(
        server: &VintLangServer,
        version: i32,
        change: TextDocumentContentChangeEvent,
    ) {
        server
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri(),
                    version,
                },
                content_changes: vec![change],
            })
            .await;
    }

    #[tokio::test]
    async fn test_pull_diagnostics_follow_latest_text() {
        let (service, _) = LspService::new(VintLangServer::new);
        let server = service.inner();

        open(server, "let x = 5").await;
        let items = pull(server, uri()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].code, Some(NumberOrString::String(UNUSED_SYMBOL.into())));

        change(
            server,
            2,
            TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "let x = 5\nprint(x)".to_string(),
            },
        )
        .await;
        assert!(pull(server, uri()).await.is_empty());

        // A ranged edit renames the use, so `x` is unused again.
        change(
            server,
            3,
            TextDocumentContentChangeEvent {
                range: Some(Range::new(Position::new(1, 6), Position::new(1, 7))),
                range_length: None,
                text: "y".to_string(),
            },
        )
        .await;
        let items = pull(server, uri()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(server.documents.get(&uri()).unwrap().version, 3);
    }

    #[tokio::test]
    async fn test_closed_and_unknown_documents_report_nothing() {
        let (service, _) = LspService::new(VintLangServer::new);
        let server = service.inner();

        let unknown = Url::parse("file:///tmp/other.vint").unwrap();
        assert!(pull(server, unknown).await.is_empty());

        open(server, "}\nlet x = 5").await;
        assert_eq!(pull(server, uri()).await.len(), 2);

        server
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier { uri: uri() },
            })
            .await;
        assert!(server.documents.get(&uri()).is_none());
        assert!(pull(server, uri()).await.is_empty());
    }
}
