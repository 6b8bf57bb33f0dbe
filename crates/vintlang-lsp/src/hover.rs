//! Hover and signature help for VintLang.
//!
//! Both are lookups in fixed tables: hover documentation keyed by the
//! word under the cursor, signatures keyed by the name of the call that
//! encloses the cursor.

use tower_lsp::lsp_types::{
    Documentation, Hover, HoverContents, MarkupContent, MarkupKind, ParameterInformation,
    ParameterLabel, Position, SignatureHelp, SignatureInformation,
};

use crate::analysis::{byte_index, get_word_at_position, is_word_char, DocumentAnalysis};
use crate::language::{builtin_signature, hover_documentation};

/// Get hover information for the word at a position.
pub fn get_hover(analysis: &DocumentAnalysis, position: Position) -> Option<Hover> {
    let (word, range) = get_word_at_position(&analysis.lines, position)?;
    let doc = hover_documentation(&word)?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: doc.to_string(),
        }),
        range: Some(range),
    })
}

/// Get signature help for the call enclosing a position.
pub fn get_signature_help(analysis: &DocumentAnalysis, position: Position) -> Option<SignatureHelp> {
    let line = analysis.line(position.line as usize)?;
    let prefix = &line[..byte_index(line, position.character)];

    let (name, args) = enclosing_call(prefix)?;
    let signature = builtin_signature(name)?;
    let active_parameter = args.matches(',').count() as u32;

    let parameters = signature
        .parameters
        .iter()
        .map(|param| ParameterInformation {
            label: ParameterLabel::Simple(param.to_string()),
            documentation: None,
        })
        .collect();

    Some(SignatureHelp {
        signatures: vec![SignatureInformation {
            label: signature.label(),
            documentation: Some(Documentation::String(signature.description.to_string())),
            parameters: Some(parameters),
            active_parameter: Some(active_parameter),
        }],
        active_signature: Some(0),
        active_parameter: Some(active_parameter),
    })
}

/// Find the innermost unclosed call in `prefix`, returning its name and
/// the argument text typed so far.
fn enclosing_call(prefix: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut open = None;

    for (idx, c) in prefix.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth == 0 => {
                open = Some(idx);
                break;
            }
            '(' => depth -= 1,
            _ => {}
        }
    }

    let open = open?;
    let before = prefix[..open].trim_end();
    let name_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(idx, _)| idx)?;

    Some((&before[name_start..], &prefix[open + 1..]))
}
