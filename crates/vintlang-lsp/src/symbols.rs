//! Symbol indexing for VintLang.
//!
//! The indexer makes two line-oriented passes over the code lines of a
//! document. The declaration pass records functions (`let f = func`),
//! variables (`let x =`) and imports (`import mod`); the first
//! declaration of a name wins. The reference pass then attributes every
//! identifier that is neither a keyword nor a builtin to its symbol.
//!
//! Symbols live in one flat global scope: there is no block scoping and
//! no shadowing.

use std::collections::BTreeMap;
use tower_lsp::lsp_types::Range;

use crate::analysis::{
    code_lines, function_declaration_regex, identifier_regex, import_regex, span_range,
    utf16_col, variable_declaration_regex,
};
use crate::language::is_reserved;

/// What a symbol declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Variable,
    Import,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Variable => "variable",
            SymbolKind::Import => "import",
        }
    }
}

/// Scope of a symbol. The language model is flat, so every symbol is
/// global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolScope {
    #[default]
    Global,
}

/// A tracked declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// The declared name.
    pub name: String,
    /// Function, variable or import.
    pub kind: SymbolKind,
    /// Line of the first declaration.
    pub declaration_line: u32,
    /// Range of the name at the declaration site.
    pub name_range: Range,
    pub scope: SymbolScope,
    /// Lines of every usage, in document order. A line using the name
    /// twice appears twice.
    pub references: Vec<u32>,
    /// Whether any reference was recorded.
    pub used: bool,
}

/// A declaration found on a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub kind: SymbolKind,
    /// Byte span of the name within the line.
    pub start: usize,
    pub end: usize,
}

/// Match a line against the declaration patterns, in priority order:
/// function, then variable, then import.
pub fn declaration_on_line(line: &str) -> Option<Declaration<'_>> {
    let patterns = [
        (function_declaration_regex(), SymbolKind::Function),
        (variable_declaration_regex(), SymbolKind::Variable),
        (import_regex(), SymbolKind::Import),
    ];

    patterns.into_iter().find_map(|(re, kind)| {
        let name = re.captures(line)?.get(1)?;
        Some(Declaration {
            name: name.as_str(),
            kind,
            start: name.start(),
            end: name.end(),
        })
    })
}

/// Every declaration on a line as the outline reports them: the binding
/// (function, else variable) followed by the import, each matched on its
/// own.
pub fn line_declarations(line: &str) -> Vec<Declaration<'_>> {
    let binding = [
        (function_declaration_regex(), SymbolKind::Function),
        (variable_declaration_regex(), SymbolKind::Variable),
    ]
    .into_iter()
    .find_map(|(re, kind)| Some((re.captures(line)?.get(1)?, kind)));
    let import = import_regex()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|name| (name, SymbolKind::Import));

    binding
        .into_iter()
        .chain(import)
        .map(|(name, kind)| Declaration {
            name: name.as_str(),
            kind,
            start: name.start(),
            end: name.end(),
        })
        .collect()
}

/// Mapping from name to symbol for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Symbols ordered by declaration line, then name.
    pub fn in_declaration_order(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.symbols.values().collect();
        symbols.sort_by(|a, b| {
            a.declaration_line
                .cmp(&b.declaration_line)
                .then_with(|| a.name_range.start.character.cmp(&b.name_range.start.character))
        });
        symbols
    }

    /// Record a declaration unless the name is already known.
    fn declare(&mut self, symbol: Symbol) {
        self.symbols.entry(symbol.name.clone()).or_insert(symbol);
    }
}

/// Build the symbol table for a document.
pub fn index_symbols(lines: &[String]) -> SymbolTable {
    let code = code_lines(lines);
    let mut table = SymbolTable::default();

    // Declaration pass
    for &(line_num, line) in &code {
        if let Some(decl) = declaration_on_line(line) {
            table.declare(Symbol {
                name: decl.name.to_string(),
                kind: decl.kind,
                declaration_line: line_num as u32,
                name_range: span_range(line_num, line, decl.start, decl.end),
                scope: SymbolScope::Global,
                references: Vec::new(),
                used: false,
            });
        }
    }

    // Reference pass
    for &(line_num, line) in &code {
        for word in identifier_regex().find_iter(line) {
            if is_reserved(word.as_str()) {
                continue;
            }

            let Some(symbol) = table.symbols.get_mut(word.as_str()) else {
                continue;
            };

            // The declared name itself is not a usage.
            if symbol.declaration_line == line_num as u32
                && symbol.name_range.start.character == utf16_col(line, word.start())
            {
                continue;
            }

            symbol.references.push(line_num as u32);
            symbol.used = true;
        }
    }

    table
}
