//! Build command implementation

use std::collections::HashSet;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rarity_map_core::config::{self, Config};
use rarity_map_core::error::LookupError;
use rarity_map_core::{
    BuildDiagnostics, BuildError, FrequencyProvider, FrequencyScale, FrequencyTable, build,
    write_artifact,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Wordlist read when neither the command line nor config names one.
pub const DEFAULT_WORDLIST: &str = "wordlist.txt";

/// Artifact path used when neither the command line nor config names one.
pub const DEFAULT_OUTPUT: &str = "rarity_map.json";

/// Arguments for the `build` subcommand.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Wordlist file, one word per line [default: wordlist.txt]
    pub wordlist: Option<Utf8PathBuf>,

    /// Artifact path to write [default: rarity_map.json]
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Frequency table: `word<delimiter>value` rows
    #[arg(short, long, value_name = "FILE")]
    pub frequencies: Option<Utf8PathBuf>,

    /// How the table's values are expressed
    #[arg(long, value_enum)]
    pub scale: Option<FrequencyScale>,

    /// Column delimiter of the frequency table [default: tab]
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Locale tag for frequency lookups
    #[arg(long)]
    pub locale: Option<String>,

    /// Leave this tier's words out of the map (they are still counted)
    #[arg(long, value_name = "TIER")]
    pub omit_tier: Option<String>,

    /// Tier for scores no interval contains
    #[arg(long, value_name = "TIER")]
    pub fallback_tier: Option<String>,

    /// Sample words shown per tier
    #[arg(long, value_name = "N")]
    pub samples: Option<usize>,

    /// Write indented JSON
    #[arg(long)]
    pub pretty: bool,

    /// Include the diagnostics in the artifact
    #[arg(long)]
    pub embed_diagnostics: bool,
}

/// Counts lookups on a progress bar while delegating to the real provider.
struct Tracked<'a, P: ?Sized> {
    inner: &'a P,
    bar: &'a ProgressBar,
}

impl<P: FrequencyProvider + ?Sized> FrequencyProvider for Tracked<'_, P> {
    fn zipf(&self, word: &str, locale: &str) -> Result<f64, LookupError> {
        let result = self.inner.zipf(word, locale);
        self.bar.inc(1);
        result
    }
}

fn progress_bar(lookups: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(lookups as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} looking up {pos}/{len} words {wide_bar} {eta}")
    {
        bar.set_style(style);
    }
    bar
}

#[derive(Serialize)]
struct BuildReport<'a> {
    output: &'a Utf8Path,
    entries: usize,
    diagnostics: &'a BuildDiagnostics,
}

/// Build a rarity map artifact from a wordlist.
///
/// Command-line values override the loaded configuration.
#[instrument(name = "cmd_build", skip_all, fields(json_output = global_json))]
pub fn cmd_build(
    args: BuildArgs,
    global_json: bool,
    quiet: bool,
    config: &Config,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    let wordlist_path = args
        .wordlist
        .or_else(|| config.input.clone())
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_WORDLIST));
    let output = args
        .output
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));
    let frequencies = args
        .frequencies
        .or_else(|| config.frequencies.clone())
        .context("no frequency table given; pass --frequencies or set `frequencies` in config")?;
    let scale = args.scale.unwrap_or(config.frequency_scale);
    let delimiter = config::delimiter_byte(args.delimiter.unwrap_or(config.delimiter))?;

    let mut options = config.build_options();
    if let Some(locale) = args.locale {
        options.locale = locale;
    }
    if let Some(tier) = args.omit_tier {
        options.omit_tier = Some(tier);
    }
    if let Some(tier) = args.fallback_tier {
        options.fallback_tier = tier;
    }
    if let Some(n) = args.samples {
        options.sample_size = n;
    }
    options.embed_diagnostics |= args.embed_diagnostics;
    let pretty = args.pretty || config.pretty;
    let tiers = config.threshold_table();

    debug!(
        wordlist = %wordlist_path,
        output = %output,
        frequencies = %frequencies,
        scale = scale.as_str(),
        "executing build command"
    );

    // Reject bad tiers and empty input before the frequency table is loaded.
    tiers
        .validate(&options.fallback_tier, options.omit_tier.as_deref())
        .context("invalid tier configuration")?;
    let words = super::read_wordlist(&wordlist_path, max_input)?;
    if words.is_empty() {
        return Err(BuildError::EmptyInput)
            .with_context(|| format!("nothing to build from {wordlist_path}"));
    }

    let table = FrequencyTable::from_path(&frequencies, &options.locale, scale, delimiter)
        .context("failed to load frequency table")?;

    let lookups = words.iter().collect::<HashSet<_>>().len();
    let bar = progress_bar(lookups, quiet || global_json);
    let provider = Tracked {
        inner: &table,
        bar: &bar,
    };
    let result = build(&words, &provider, &tiers, &options);
    bar.finish_and_clear();
    let (artifact, diagnostics) =
        result.with_context(|| format!("failed to build rarity map from {wordlist_path}"))?;

    write_artifact(&output, &artifact, pretty)?;
    info!(output = %output, entries = artifact.len(), "artifact written");

    if global_json {
        let report = BuildReport {
            output: &output,
            entries: artifact.len(),
            diagnostics: &diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        print_summary(&output, &diagnostics);
    }

    Ok(())
}

fn print_summary(output: &Utf8Path, diagnostics: &BuildDiagnostics) {
    println!(
        "{} {} ({} entries kept, {} words read)",
        "Wrote".green().bold(),
        output.cyan(),
        diagnostics.kept_entries,
        diagnostics.total_words
    );
    if let Some(ref tier) = diagnostics.omitted_tier {
        println!(
            "{}: {} ({} words)",
            "Omitted tier".dimmed(),
            tier,
            diagnostics.omitted_entries
        );
    }
    println!("{}: {:.3}", "Max zipf".dimmed(), diagnostics.max_zipf);
    if diagnostics.duplicate_words > 0 {
        println!(
            "{}: {}",
            "Duplicate lines".dimmed(),
            diagnostics.duplicate_words
        );
    }

    println!();
    println!("{}", "Tiers".bold().underline());
    let width = diagnostics
        .tiers
        .iter()
        .map(|t| t.name.len())
        .max()
        .unwrap_or(0);
    for tier in &diagnostics.tiers {
        let samples = tier
            .samples
            .iter()
            .map(|s| format!("{} ({:.2})", s.word, s.score))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {:<width$}  {:>7}  {}",
            tier.name,
            tier.count,
            samples.dimmed()
        );
    }

    if diagnostics.lookup_fallbacks > 0 {
        println!(
            "{} {} words had no frequency data and were scored from zipf 0.0",
            "warning:".yellow().bold(),
            diagnostics.lookup_fallbacks
        );
    }
    if diagnostics.unclassified > 0 {
        println!(
            "{} {} words fell outside every tier and got the fallback tier",
            "warning:".yellow().bold(),
            diagnostics.unclassified
        );
    }
}
