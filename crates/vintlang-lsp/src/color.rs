//! Color literals: `#RGB`, `#RRGGBB`, `rgb(r, g, b)` and
//! `rgba(r, g, b, a)`.

use regex::Regex;
use std::sync::OnceLock;
use tower_lsp::lsp_types::{Color, ColorInformation, ColorPresentation, Range, TextEdit};

use crate::analysis::{span_range, DocumentAnalysis};

fn hex_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})\b").expect("static pattern"))
}

fn rgb_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\brgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(\d*\.?\d+)\s*)?\)",
        )
        .expect("static pattern")
    })
}

/// Every color literal in the document, in line order.
pub fn get_document_colors(analysis: &DocumentAnalysis) -> Vec<ColorInformation> {
    let mut colors = Vec::new();

    for (line_num, line) in analysis.lines.iter().enumerate() {
        for caps in hex_color_regex().captures_iter(line) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(color) = parse_hex(digits.as_str()) {
                colors.push(ColorInformation {
                    range: span_range(line_num, line, whole.start(), whole.end()),
                    color,
                });
            }
        }

        for caps in rgb_color_regex().captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let channel = |i: usize| {
                caps.get(i)
                    .and_then(|m| m.as_str().parse::<u16>().ok())
                    .map(|v| f32::from(v.min(255)) / 255.0)
            };
            let (Some(red), Some(green), Some(blue)) = (channel(1), channel(2), channel(3)) else {
                continue;
            };
            let alpha = caps
                .get(4)
                .and_then(|m| m.as_str().parse::<f32>().ok())
                .map_or(1.0, |a| a.clamp(0.0, 1.0));

            colors.push(ColorInformation {
                range: span_range(line_num, line, whole.start(), whole.end()),
                color: Color {
                    red,
                    green,
                    blue,
                    alpha,
                },
            });
        }
    }

    colors
}

fn parse_hex(digits: &str) -> Option<Color> {
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };

    Some(Color {
        red: channel(0)?,
        green: channel(2)?,
        blue: channel(4)?,
        alpha: 1.0,
    })
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Text renderings of a color: hex, `rgb(...)`, and `rgba(...)` when the
/// color is not fully opaque.
pub fn get_color_presentations(color: Color, range: Range) -> Vec<ColorPresentation> {
    let (r, g, b) = (to_byte(color.red), to_byte(color.green), to_byte(color.blue));

    let mut labels = vec![format!("#{r:02X}{g:02X}{b:02X}"), format!("rgb({r}, {g}, {b})")];
    if color.alpha < 1.0 {
        labels.push(format!("rgba({r}, {g}, {b}, {})", color.alpha));
    }

    labels
        .into_iter()
        .map(|label| ColorPresentation {
            text_edit: Some(TextEdit {
                range,
                new_text: label.clone(),
            }),
            label,
            additional_text_edits: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_document;
    use tower_lsp::lsp_types::Position;

    fn labels(color: Color) -> Vec<String> {
        get_color_presentations(color, Range::default())
            .into_iter()
            .map(|p| p.label)
            .collect()
    }

    #[test]
    fn test_hex_red() {
        let colors = get_document_colors(&analyze_document("let c = \"#FF0000\""));
        assert_eq!(colors.len(), 1);
        assert_eq!(
            colors[0].color,
            Color {
                red: 1.0,
                green: 0.0,
                blue: 0.0,
                alpha: 1.0
            }
        );
        assert_eq!(colors[0].range.start, Position::new(0, 9));
        assert_eq!(colors[0].range.end, Position::new(0, 16));

        assert_eq!(labels(colors[0].color), vec!["#FF0000", "rgb(255, 0, 0)"]);
    }

    #[test]
    fn test_short_hex() {
        let colors = get_document_colors(&analyze_document("#0f0"));
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].color.green, 1.0);
        assert_eq!(colors[0].color.red, 0.0);
    }

    #[test]
    fn test_rgb_and_rgba() {
        let colors = get_document_colors(&analyze_document("rgb(0, 0, 255) rgba(255, 255, 255, 0.5)"));
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0].color.blue, 1.0);
        assert_eq!(colors[0].color.alpha, 1.0);
        assert_eq!(colors[1].color.alpha, 0.5);
        assert_eq!(colors[1].range.start, Position::new(0, 15));
    }

    #[test]
    fn test_translucent_presentation_adds_rgba() {
        let color = Color {
            red: 0.0,
            green: 0.0,
            blue: 1.0,
            alpha: 0.5,
        };
        assert_eq!(
            labels(color),
            vec!["#0000FF", "rgb(0, 0, 255)", "rgba(0, 0, 255, 0.5)"]
        );
    }

    #[test]
    fn test_ignores_non_colors() {
        assert!(get_document_colors(&analyze_document("#12\n#GGGGGG\nrgb(1, 2)")).is_empty());
    }
}
