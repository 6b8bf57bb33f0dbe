//! Folding ranges for VintLang.
//!
//! Brace regions come from a stack of the lines holding each `{`; a `}`
//! pops the innermost one and yields a region when it spans more than
//! one line. Block comments fold from the line containing `/*` to the
//! first line containing `*/`.

use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind};

use crate::analysis::DocumentAnalysis;

/// Get folding ranges for a document.
pub fn get_folding_ranges(analysis: &DocumentAnalysis) -> Vec<FoldingRange> {
    let lines = &analysis.lines;
    let mut ranges = Vec::new();
    let mut brace_stack: Vec<usize> = Vec::new();

    for (line_num, line) in lines.iter().enumerate() {
        for c in line.chars() {
            match c {
                '{' => brace_stack.push(line_num),
                '}' => {
                    if let Some(start) = brace_stack.pop() {
                        if line_num > start {
                            ranges.push(folding_range(start, line_num, FoldingRangeKind::Region));
                        }
                    }
                }
                _ => {}
            }
        }

        if line.contains("/*") {
            let end = lines
                .iter()
                .enumerate()
                .skip(line_num)
                .find(|(_, l)| l.contains("*/"))
                .map(|(n, _)| n);

            if let Some(end) = end.filter(|&end| end > line_num) {
                ranges.push(folding_range(line_num, end, FoldingRangeKind::Comment));
            }
        }
    }

    ranges
}

fn folding_range(start: usize, end: usize, kind: FoldingRangeKind) -> FoldingRange {
    FoldingRange {
        start_line: start as u32,
        end_line: end as u32,
        kind: Some(kind),
        ..Default::default()
    }
}
