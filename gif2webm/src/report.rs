//! Batch summary rendering

use std::fmt::Write;

use crate::pipeline::{BatchSummary, FileOutcome};

pub fn render_human(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "═══════════════════════════════════════");
    let _ = writeln!(out, "📊 Sticker batch summary");
    let _ = writeln!(out, "═══════════════════════════════════════");
    let _ = writeln!(
        out,
        "GIFs found:        {} ({} converted, {} failed)",
        summary.gifs_found, summary.conversion.succeeded, summary.conversion.failed
    );
    let _ = writeln!(
        out,
        "Clips fitted:      {} ({} failed)",
        summary.fitting.succeeded, summary.fitting.failed
    );
    let _ = writeln!(out, "  copied as is:    {}", summary.already_compliant);
    let _ = writeln!(out, "  re-encoded:      {}", summary.reencoded);
    let _ = writeln!(out, "  reduced size:    {}", summary.reduced_resolution);
    let _ = writeln!(out, "  over budget:     {}", summary.over_budget);
    let _ = writeln!(
        out,
        "Moved to '{}': {}",
        summary.final_dir.display(),
        summary.moved
    );
    if summary.move_failures > 0 {
        let _ = writeln!(out, "Move failures:     {}", summary.move_failures);
    }
    if !summary.cleanup_ok {
        let _ = writeln!(out, "⚠️  Intermediate folders could not be fully removed");
    }
    let _ = writeln!(out, "Elapsed:           {:.1}s", summary.elapsed_secs);
    if summary.conversion.all_succeeded()
        && summary.fitting.all_succeeded()
        && summary.over_budget == 0
        && summary.move_failures == 0
    {
        let _ = writeln!(out, "✅ Every sticker fits the budget");
    }

    let problems: Vec<String> = summary
        .files
        .iter()
        .filter_map(|f| match &f.outcome {
            FileOutcome::ConvertFailed { error } => Some(format!("❌ {} (convert): {}", f.name, error)),
            FileOutcome::FitFailed { error } => Some(format!("❌ {} (fit): {}", f.name, error)),
            FileOutcome::Fitted { status, size, .. } if !status.met_budget() => {
                Some(format!("⚠️  {} is over budget at {}", f.name, size))
            }
            FileOutcome::Fitted { .. } => None,
        })
        .collect();

    if !problems.is_empty() {
        let _ = writeln!(out, "───────────────────────────────────────");
        for line in problems {
            let _ = writeln!(out, "{}", line);
        }
    }
    out
}
