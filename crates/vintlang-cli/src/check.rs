//! The `check` and `format` commands.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};
use vintlang_lsp::analyze_document;
use vintlang_lsp::formatting::format_text;

/// Render one diagnostic as `file:line:col: severity[code]: message`,
/// with 1-based line and column.
pub fn render_diagnostic(path: &Path, diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        Some(DiagnosticSeverity::ERROR) => "error",
        Some(DiagnosticSeverity::WARNING) => "warning",
        Some(DiagnosticSeverity::INFORMATION) => "info",
        _ => "hint",
    };
    let code = match &diagnostic.code {
        Some(NumberOrString::String(code)) => format!("[{}]", code),
        Some(NumberOrString::Number(code)) => format!("[{}]", code),
        None => String::new(),
    };

    format!(
        "{}:{}:{}: {}{}: {}",
        path.display(),
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1,
        severity,
        code,
        diagnostic.message
    )
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Some(DiagnosticSeverity::ERROR))
        .count()
}

/// Diagnose a file and print the report. Fails when any error is found.
pub fn check_file(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let analysis = analyze_document(&content);
    for diagnostic in &analysis.diagnostics {
        println!("{}", render_diagnostic(path, diagnostic));
    }

    log::info!(
        "{}: {} symbols, {} diagnostics",
        path.display(),
        analysis.symbols.len(),
        analysis.diagnostics.len()
    );

    let errors = count_errors(&analysis.diagnostics);
    if errors > 0 {
        anyhow::bail!("{} error(s) in {}", errors, path.display());
    }
    Ok(())
}

/// Format a file, printing the result or writing it back in place.
pub fn format_file(path: &Path, write: bool) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let formatted = format_text(&content);

    if !write {
        println!("{}", formatted);
        return Ok(());
    }

    if formatted == content {
        log::info!("{} is already formatted", path.display());
        return Ok(());
    }

    fs::write(path, &formatted).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Formatted {}", path.display());
    Ok(())
}
