//! Inspect command implementation

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use rarity_map_core::{VerifyReport, read_artifact, verify};
use tracing::{debug, instrument};

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Artifact to inspect
    pub artifact: Utf8PathBuf,
}

/// Summarize an artifact and re-check each entry against its thresholds.
///
/// Fails when any entry's recorded tier disagrees with its thresholds or
/// names a tier the thresholds do not define.
#[instrument(name = "cmd_inspect", skip_all, fields(artifact = %args.artifact))]
pub fn cmd_inspect(args: InspectArgs, global_json: bool) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing inspect command");

    let artifact = read_artifact(&args.artifact)?;
    let report = verify(&artifact);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.artifact, &report, artifact.diagnostics.is_some());
    }

    if !report.is_consistent() {
        anyhow::bail!(
            "{}: {} entries disagree with the thresholds, {} use unknown tiers",
            args.artifact,
            report.mismatches.len(),
            report.unknown_tiers.len()
        );
    }
    Ok(())
}

fn print_report(path: &Utf8Path, report: &VerifyReport, has_diagnostics: bool) {
    println!("{} ({} entries)", path.as_str().bold(), report.entries);
    if has_diagnostics {
        println!("{}", "Embedded diagnostics present".dimmed());
    }
    for tier in &report.tiers {
        println!("  {:<12} {:>7}", tier.name, tier.count);
    }
    if !report.unclassified.is_empty() {
        println!(
            "{} {} entries lie outside every interval (fallback tier): {}",
            "note:".cyan().bold(),
            report.unclassified.len(),
            report.unclassified.join(", ")
        );
    }
    for m in &report.mismatches {
        println!(
            "{} {} scored {:.3} is recorded as {} but the thresholds give {}",
            "mismatch:".red().bold(),
            m.word,
            m.score,
            m.recorded,
            m.derived
        );
    }
    for word in &report.unknown_tiers {
        println!("{} {} uses a tier not in the thresholds", "unknown:".red().bold(), word);
    }
    if report.is_consistent() {
        println!("{}", "consistent".green());
    }
}
