//! Semantic tokens for VintLang.
//!
//! Each line is classified by a fixed sequence of regex passes. Passes
//! may overlap (a keyword inside a comment is reported twice); overlaps
//! are kept and a layering renderer lets the later pass win. Tokens are
//! ordered by position before delta encoding, with ties kept in pass
//! order.

use regex::Regex;
use std::sync::OnceLock;
use tower_lsp::lsp_types::{
    SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend,
};

use crate::analysis::{
    function_declaration_regex, utf16_col, variable_declaration_regex, DocumentAnalysis,
};
use crate::language::{BUILTINS, DECLARATIVES, KEYWORDS, LITERAL_KEYWORDS, MODULES};

pub const TOKEN_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::KEYWORD,   // 0
    SemanticTokenType::FUNCTION,  // 1
    SemanticTokenType::NAMESPACE, // 2
    SemanticTokenType::VARIABLE,  // 3
    SemanticTokenType::STRING,    // 4
    SemanticTokenType::NUMBER,    // 5
    SemanticTokenType::COMMENT,   // 6
    SemanticTokenType::OPERATOR,  // 7
    SemanticTokenType::MACRO,     // 8
];

pub const TOKEN_MODIFIERS: &[SemanticTokenModifier] = &[
    SemanticTokenModifier::DECLARATION,     // bit 0
    SemanticTokenModifier::DEFAULT_LIBRARY, // bit 1
    SemanticTokenModifier::READONLY,        // bit 2
];

const KEYWORD: u32 = 0;
const FUNCTION: u32 = 1;
const NAMESPACE: u32 = 2;
const VARIABLE: u32 = 3;
const STRING: u32 = 4;
const NUMBER: u32 = 5;
const COMMENT: u32 = 6;
const OPERATOR: u32 = 7;
const MACRO: u32 = 8;

const DECLARATION: u32 = 1 << 0;
const DEFAULT_LIBRARY: u32 = 1 << 1;
const READONLY: u32 = 1 << 2;

/// Legend advertised in the server capabilities.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TOKEN_TYPES.to_vec(),
        token_modifiers: TOKEN_MODIFIERS.to_vec(),
    }
}

/// A classified span before delta encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken {
    pub line: u32,
    pub start: u32,
    pub length: u32,
    pub token_type: u32,
    pub modifiers: u32,
}

struct Passes {
    keyword: Regex,
    builtin: Regex,
    module: Regex,
    string: Regex,
    number: Regex,
    comment: Regex,
    operator: Regex,
    literal: Regex,
    declarative: Regex,
}

fn word_list_regex(words: &[&str]) -> String {
    format!(r"\b(?:{})\b", words.join("|"))
}

fn passes() -> &'static Passes {
    static PASSES: OnceLock<Passes> = OnceLock::new();
    PASSES.get_or_init(|| {
        let build = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Passes {
            keyword: build(&word_list_regex(KEYWORDS)),
            builtin: build(&word_list_regex(BUILTINS)),
            module: build(&word_list_regex(MODULES)),
            string: build(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#),
            number: build(r"\b\d+(?:\.\d+)?\b"),
            comment: build(r"//.*$"),
            operator: build(r"[+\-*/%=<>!&|]+"),
            literal: build(&word_list_regex(LITERAL_KEYWORDS)),
            declarative: build(&format!(r"^\s*({})\b", DECLARATIVES.join("|"))),
        }
    })
}

/// Classify every line of a document, in emission order.
pub fn classify(analysis: &DocumentAnalysis) -> Vec<RawToken> {
    let passes = passes();
    let mut tokens = Vec::new();

    for (line_num, line) in analysis.lines.iter().enumerate() {
        let mut push = |start: usize, end: usize, token_type: u32, modifiers: u32| {
            let start_col = utf16_col(line, start);
            tokens.push(RawToken {
                line: line_num as u32,
                start: start_col,
                length: utf16_col(line, end) - start_col,
                token_type,
                modifiers,
            });
        };

        for m in passes.keyword.find_iter(line) {
            push(m.start(), m.end(), KEYWORD, 0);
        }
        for m in passes.builtin.find_iter(line) {
            push(m.start(), m.end(), FUNCTION, DEFAULT_LIBRARY);
        }
        for m in passes.module.find_iter(line) {
            push(m.start(), m.end(), NAMESPACE, DEFAULT_LIBRARY);
        }

        let function_decl = function_declaration_regex()
            .captures(line)
            .and_then(|c| c.get(1));
        if let Some(name) = function_decl {
            push(name.start(), name.end(), FUNCTION, DECLARATION);
        } else if let Some(name) = variable_declaration_regex()
            .captures(line)
            .and_then(|c| c.get(1))
        {
            push(name.start(), name.end(), VARIABLE, DECLARATION);
        }

        for m in passes.string.find_iter(line) {
            push(m.start(), m.end(), STRING, 0);
        }
        for m in passes.number.find_iter(line) {
            push(m.start(), m.end(), NUMBER, 0);
        }
        for m in passes.comment.find_iter(line) {
            push(m.start(), m.end(), COMMENT, 0);
        }
        for m in passes.operator.find_iter(line) {
            push(m.start(), m.end(), OPERATOR, 0);
        }
        for m in passes.literal.find_iter(line) {
            push(m.start(), m.end(), KEYWORD, READONLY);
        }
        if let Some(word) = passes.declarative.captures(line).and_then(|c| c.get(1)) {
            push(word.start(), word.end(), MACRO, 0);
        }
    }

    tokens
}

/// Delta-encode tokens for `textDocument/semanticTokens/full`.
pub fn encode(mut tokens: Vec<RawToken>) -> Vec<SemanticToken> {
    // Stable sort keeps pass order for tokens sharing a start.
    tokens.sort_by_key(|t| (t.line, t.start));

    let mut data = Vec::with_capacity(tokens.len());
    let mut prev_line = 0;
    let mut prev_start = 0;

    for token in tokens {
        let delta_line = token.line - prev_line;
        let delta_start = if delta_line == 0 {
            token.start - prev_start
        } else {
            token.start
        };

        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.token_type,
            token_modifiers_bitset: token.modifiers,
        });

        prev_line = token.line;
        prev_start = token.start;
    }

    data
}

/// Semantic tokens for a whole document.
pub fn get_semantic_tokens(analysis: &DocumentAnalysis) -> Vec<SemanticToken> {
    encode(classify(analysis))
}
