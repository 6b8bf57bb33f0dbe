//! Completion provider for VintLang.
//!
//! Provides code completion for:
//! - Keywords
//! - Built-in functions (inserted as call snippets)
//! - Standard library modules
//! - Functions, variables and imports declared in the document
//!
//! Items carry a small JSON payload naming their catalog so that
//! `completionItem/resolve` can attach documentation lazily.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, Documentation, InsertTextFormat, MarkupContent, MarkupKind,
};

use crate::analysis::DocumentAnalysis;
use crate::language::{
    builtin_signature, hover_documentation, is_builtin, is_keyword, is_module, BUILTINS, KEYWORDS,
    MODULES,
};
use crate::symbols::SymbolKind;

/// Catalog an item was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionCategory {
    Keyword,
    Builtin,
    Module,
    Symbol,
}

/// Payload stored in `CompletionItem::data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionData {
    pub category: CompletionCategory,
}

impl CompletionData {
    fn to_value(category: CompletionCategory) -> Option<serde_json::Value> {
        serde_json::to_value(CompletionData { category }).ok()
    }
}

/// Get all completions for a document.
pub fn get_completions(analysis: &DocumentAnalysis) -> Vec<CompletionItem> {
    let mut items = Vec::with_capacity(KEYWORDS.len() + BUILTINS.len() + MODULES.len());

    items.extend(KEYWORDS.iter().map(|keyword| CompletionItem {
        label: keyword.to_string(),
        kind: Some(CompletionItemKind::KEYWORD),
        data: CompletionData::to_value(CompletionCategory::Keyword),
        ..Default::default()
    }));

    items.extend(BUILTINS.iter().map(|builtin| CompletionItem {
        label: builtin.to_string(),
        kind: Some(CompletionItemKind::FUNCTION),
        insert_text: Some(format!("{}($1)", builtin)),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        data: CompletionData::to_value(CompletionCategory::Builtin),
        ..Default::default()
    }));

    items.extend(MODULES.iter().map(|module| CompletionItem {
        label: module.to_string(),
        kind: Some(CompletionItemKind::MODULE),
        data: CompletionData::to_value(CompletionCategory::Module),
        ..Default::default()
    }));

    items.extend(get_symbol_completions(analysis));

    items
}

/// Completions for names declared in the document.
fn get_symbol_completions(analysis: &DocumentAnalysis) -> Vec<CompletionItem> {
    analysis
        .symbols
        .in_declaration_order()
        .into_iter()
        .filter(|symbol| {
            !is_keyword(&symbol.name) && !is_builtin(&symbol.name) && !is_module(&symbol.name)
        })
        .map(|symbol| {
            let (kind, insert_text, insert_text_format) = match symbol.kind {
                SymbolKind::Function => (
                    CompletionItemKind::FUNCTION,
                    Some(format!("{}($1)", symbol.name)),
                    Some(InsertTextFormat::SNIPPET),
                ),
                SymbolKind::Variable => (CompletionItemKind::VARIABLE, None, None),
                SymbolKind::Import => (CompletionItemKind::MODULE, None, None),
            };

            CompletionItem {
                label: symbol.name.clone(),
                kind: Some(kind),
                detail: Some(format!(
                    "{} declared on line {}",
                    symbol.kind.as_str(),
                    symbol.declaration_line + 1
                )),
                insert_text,
                insert_text_format,
                data: CompletionData::to_value(CompletionCategory::Symbol),
                ..Default::default()
            }
        })
        .collect()
}

/// Attach detail and documentation to a completion item.
pub fn resolve_completion(mut item: CompletionItem) -> CompletionItem {
    let category = item
        .data
        .clone()
        .and_then(|data| serde_json::from_value::<CompletionData>(data).ok())
        .map(|data| data.category)
        .or_else(|| category_of(&item.label));

    let label = item.label.clone();
    match category {
        Some(CompletionCategory::Keyword) => {
            item.detail = Some("VintLang keyword".to_string());
            item.documentation = Some(documentation_for(&label, || {
                format!("The '{}' keyword in VintLang", label)
            }));
        }
        Some(CompletionCategory::Builtin) => {
            item.detail = Some(match builtin_signature(&label) {
                Some(sig) => sig.label(),
                None => "VintLang built-in function".to_string(),
            });
            item.documentation = Some(documentation_for(&label, || {
                match builtin_signature(&label) {
                    Some(sig) => sig.description.to_string(),
                    None => format!("Built-in function: {}()", label),
                }
            }));
        }
        Some(CompletionCategory::Module) => {
            item.detail = Some("VintLang module".to_string());
            item.documentation = Some(documentation_for(&label, || {
                format!("VintLang module: {}", label)
            }));
        }
        Some(CompletionCategory::Symbol) | None => {}
    }

    item
}

fn category_of(label: &str) -> Option<CompletionCategory> {
    if is_keyword(label) {
        Some(CompletionCategory::Keyword)
    } else if is_builtin(label) {
        Some(CompletionCategory::Builtin)
    } else if is_module(label) {
        Some(CompletionCategory::Module)
    } else {
        None
    }
}

/// Rich documentation from the hover table, else a plain fallback.
fn documentation_for(label: &str, fallback: impl FnOnce() -> String) -> Documentation {
    match hover_documentation(label) {
        Some(doc) => Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: doc.to_string(),
        }),
        None => Documentation::String(fallback()),
    }
}
