use std::io::Write;

use owo_colors::OwoColorize;
use patcite_catalog::CatalogSummary;

use crate::pipeline::DocumentStats;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the per-document summary after processing.
pub fn print_document_summary(
    w: &mut dyn Write,
    file_name: &str,
    stats: &DocumentStats,
    summary: &CatalogSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", format!("CITATION CATALOG: {}", file_name).bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "CITATION CATALOG: {}", file_name)?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(
        w,
        "  Paragraphs: {} total, {} with trigger signals, {} chunks sent",
        stats.paragraphs, stats.triggered, stats.chunks
    )?;

    if color.enabled() {
        writeln!(w, "  {} {}", "NPL references:".green(), summary.npl)?;
        writeln!(w, "  {} {}", "Accession IDs:".green(), summary.accessions)?;
        writeln!(w, "  {} {}", "Standards:".green(), summary.standards)?;
    } else {
        writeln!(w, "  NPL references: {}", summary.npl)?;
        writeln!(w, "  Accession IDs: {}", summary.accessions)?;
        writeln!(w, "  Standards: {}", summary.standards)?;
    }
    writeln!(w, "  Total citations: {}", summary.total())?;

    let filtered = format!(
        "(corrected {}, filtered out {})",
        stats.npl_corrected, stats.npl_skipped
    );
    if stats.npl_corrected > 0 || stats.npl_skipped > 0 {
        if color.enabled() {
            writeln!(w, "  {}", filtered.dimmed())?;
        } else {
            writeln!(w, "  {}", filtered)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print the chunk listing for the dry-run `split` subcommand.
pub fn print_split_chunks(
    w: &mut dyn Write,
    paragraph_num: &str,
    chunks: &[String],
    threshold: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let lengths: Vec<String> = chunks.iter().map(|c| c.chars().count().to_string()).collect();
    writeln!(w, "paragraph {} lengths: {}", paragraph_num, lengths.join(", "))?;
    for (index, chunk) in chunks.iter().enumerate() {
        writeln!(w, "--- paragraph {}.{} ---", paragraph_num, index + 1)?;
        if chunk.chars().count() > threshold {
            let note = format!("(still {} chars, over the {} threshold)", chunk.chars().count(), threshold);
            if color.enabled() {
                writeln!(w, "{}", note.yellow())?;
            } else {
                writeln!(w, "{}", note)?;
            }
        }
        writeln!(w, "{}", chunk)?;
        writeln!(w)?;
    }
    Ok(())
}
