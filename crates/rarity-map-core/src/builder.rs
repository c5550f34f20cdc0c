//! Rarity map assembly.
//!
//! [`build`] ties the pipeline together:
//!
//! 1. validate the tier table,
//! 2. look up a Zipf frequency for every distinct word ([`score::gather_frequencies`]),
//! 3. score and classify each input line in order, counting and sampling as it goes,
//! 4. assemble the [`RarityMap`] with the exact threshold table used.
//!
//! Step 3 cannot start before step 2 finishes because every score depends on
//! the input-wide maximum.

use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{BuildDiagnostics, Sample};
use crate::error::{BuildError, BuildResult};
use crate::frequency::FrequencyProvider;
use crate::score::{self, FALLBACK_ZIPF};
use crate::tiers::{DEFAULT_FALLBACK_TIER, ThresholdTable};
use crate::wordlist;

/// Default number of sample words kept per tier.
pub const DEFAULT_SAMPLE_SIZE: usize = 6;

/// Default locale tag for frequency lookups.
pub const DEFAULT_LOCALE: &str = "en";

/// Per-run options that do not change how scores are computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Locale tag passed to every frequency lookup.
    pub locale: String,
    /// Tier whose entries are left out of the map (still counted).
    pub omit_tier: Option<String>,
    /// Tier assigned to scores no bound contains.
    pub fallback_tier: String,
    /// Maximum sample words kept per tier in diagnostics.
    pub sample_size: usize,
    /// Copy the diagnostics into the artifact.
    pub embed_diagnostics: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            omit_tier: None,
            fallback_tier: DEFAULT_FALLBACK_TIER.to_string(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            embed_diagnostics: false,
        }
    }
}

/// Score, frequency, and tier for one word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RarityEntry {
    /// Rarity score; `0.0` for the most common input word.
    pub score: f64,
    /// Zipf frequency the score was derived from.
    pub zipf: f64,
    /// Tier name.
    pub bucket: String,
}

/// The persisted artifact: thresholds plus word entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RarityMap {
    /// Tier bounds used for this build, in classification order.
    pub thresholds: ThresholdTable,
    /// Entries keyed by normalized word, sorted for reproducible output.
    pub map: BTreeMap<String, RarityEntry>,
    /// Build diagnostics, present only when embedding was requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub diagnostics: Option<BuildDiagnostics>,
}

impl RarityMap {
    /// Entry for `word`, if it was kept.
    pub fn get(&self, word: &str) -> Option<&RarityEntry> {
        self.map.get(word)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Build a rarity map for `words`.
///
/// Each word is normalized with [`wordlist::normalize`] and blank words are
/// skipped, so map keys match what the CLI reads from a wordlist. Lookup
/// failures and unclassified scores are recovered locally and counted in the
/// returned diagnostics.
///
/// # Errors
///
/// - [`BuildError::Config`] if the tier table, fallback tier, or omit tier is
///   invalid. Nothing is looked up in that case.
/// - [`BuildError::EmptyInput`] if `words` has no non-blank word.
#[tracing::instrument(
    skip(words, provider, tiers, options),
    fields(word_count = words.len(), tiers = tiers.len(), locale = %options.locale)
)]
pub fn build<P>(
    words: &[String],
    provider: &P,
    tiers: &ThresholdTable,
    options: &BuildOptions,
) -> BuildResult<(RarityMap, BuildDiagnostics)>
where
    P: FrequencyProvider + ?Sized,
{
    let omit = options.omit_tier.as_deref();
    tiers.validate(&options.fallback_tier, omit)?;
    for issue in tiers.coverage_issues() {
        tracing::warn!(%issue, "tier table coverage");
    }

    let words: Vec<String> = words
        .iter()
        .map(|w| wordlist::normalize(w))
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return Err(BuildError::EmptyInput);
    }

    let frequencies = score::gather_frequencies(&words, provider, &options.locale)?;

    let mut diagnostics = BuildDiagnostics::for_tiers(tiers);
    diagnostics.max_zipf = frequencies.max_zipf();
    diagnostics.lookup_fallbacks = frequencies.fallbacks().len();
    diagnostics.omitted_tier = options.omit_tier.clone();

    let mut map = BTreeMap::new();
    let mut seen: HashSet<&str> = HashSet::with_capacity(frequencies.len());

    for word in &words {
        let zipf = frequencies.zipf(word).unwrap_or(FALLBACK_ZIPF);
        let score = frequencies.score(zipf);
        let (bucket, unclassified) = tiers.classify_or(score, &options.fallback_tier);
        let first_sighting = seen.insert(word.as_str());

        if unclassified && first_sighting {
            tracing::debug!(word = %word, score, "score matched no tier, using fallback");
            diagnostics.unclassified += 1;
        }

        diagnostics.record(
            Sample {
                word: word.clone(),
                score,
                zipf,
            },
            bucket,
            first_sighting,
            options.sample_size,
        );

        if omit == Some(bucket) {
            if first_sighting {
                diagnostics.omitted_entries += 1;
            }
            continue;
        }

        map.insert(
            word.clone(),
            RarityEntry {
                score,
                zipf,
                bucket: bucket.to_string(),
            },
        );
    }

    diagnostics.unique_words = seen.len();
    diagnostics.kept_entries = map.len();

    if diagnostics.lookup_fallbacks > 0 {
        tracing::warn!(
            count = diagnostics.lookup_fallbacks,
            "words had no frequency data and were scored as maximally rare"
        );
    }
    if diagnostics.unclassified > 0 {
        tracing::warn!(
            count = diagnostics.unclassified,
            fallback = %options.fallback_tier,
            "scores matched no tier; check the tier table for gaps"
        );
    }
    tracing::info!(
        total = diagnostics.total_words,
        kept = diagnostics.kept_entries,
        max_zipf = diagnostics.max_zipf,
        "rarity map built"
    );

    let rarity_map = RarityMap {
        thresholds: tiers.clone(),
        map,
        diagnostics: options.embed_diagnostics.then(|| diagnostics.clone()),
    };
    Ok((rarity_map, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, LookupError};
    use crate::frequency::FrequencyTable;
    use crate::tiers::{OPEN_HIGH, OPEN_LOW, TierBound};

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn mock() -> FrequencyTable {
        FrequencyTable::from_zipf_pairs("en", [("the", 7.0), ("apple", 4.5), ("zythum", 1.0)])
    }

    #[test]
    fn three_word_scenario() {
        let (map, diag) = build(
            &words(&["the", "apple", "zythum"]),
            &mock(),
            &ThresholdTable::default(),
            &BuildOptions::default(),
        )
        .unwrap();

        assert_eq!(map.len(), 3);
        let the = map.get("the").unwrap();
        assert_eq!((the.score, the.zipf, the.bucket.as_str()), (0.0, 7.0, "common"));
        let apple = map.get("apple").unwrap();
        assert_eq!((apple.score, apple.bucket.as_str()), (2.5, "common"));
        let zythum = map.get("zythum").unwrap();
        assert_eq!((zythum.score, zythum.bucket.as_str()), (6.0, "legendary"));

        assert_eq!(diag.total_words, 3);
        assert_eq!(diag.kept_entries, 3);
        assert_eq!(diag.count("common"), 2);
        assert_eq!(diag.count("legendary"), 1);
        assert_eq!(diag.max_zipf, 7.0);
        assert!(!diag.has_fallbacks());
        assert!(map.diagnostics.is_none());
    }

    #[test]
    fn thresholds_are_the_table_used() {
        let tiers = ThresholdTable::new(vec![
            TierBound::new("plain", OPEN_LOW, 2.0),
            TierBound::new("fancy", 2.0, OPEN_HIGH),
        ]);
        let options = BuildOptions {
            fallback_tier: "plain".to_string(),
            ..BuildOptions::default()
        };
        let (map, _) = build(&words(&["the", "apple"]), &mock(), &tiers, &options).unwrap();
        assert_eq!(map.thresholds, tiers);
        assert_eq!(map.get("apple").unwrap().bucket, "fancy");
    }

    #[test]
    fn score_is_max_minus_zipf_for_every_word() {
        let input = words(&["the", "apple", "zythum"]);
        let (map, _) = build(&input, &mock(), &ThresholdTable::default(), &BuildOptions::default())
            .unwrap();
        let max = map.map.values().map(|e| e.zipf).fold(f64::NEG_INFINITY, f64::max);
        for entry in map.map.values() {
            assert!((entry.score - (max - entry.zipf)).abs() < 1e-12);
        }
    }

    #[test]
    fn failed_lookup_scores_as_maximally_rare() {
        let (map, diag) = build(
            &words(&["the", "qwzx"]),
            &mock(),
            &ThresholdTable::default(),
            &BuildOptions::default(),
        )
        .unwrap();
        let entry = map.get("qwzx").unwrap();
        assert_eq!(entry.zipf, 0.0);
        assert_eq!(entry.score, 7.0);
        assert_eq!(entry.bucket, "legendary");
        assert_eq!(diag.lookup_fallbacks, 1);
    }

    #[test]
    fn omitted_tier_is_counted_but_not_kept() {
        let options = BuildOptions {
            omit_tier: Some("common".to_string()),
            ..BuildOptions::default()
        };
        let (map, diag) = build(
            &words(&["the", "apple", "zythum"]),
            &mock(),
            &ThresholdTable::default(),
            &options,
        )
        .unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.get("zythum").is_some());
        assert_eq!(diag.count("common"), 2);
        assert_eq!(diag.omitted_entries, 2);
        assert_eq!(diag.kept_entries, 1);
        assert_eq!(diag.omitted_tier.as_deref(), Some("common"));
    }

    #[test]
    fn omitting_does_not_change_scores() {
        let input = words(&["the", "apple", "zythum"]);
        let (full, _) = build(&input, &mock(), &ThresholdTable::default(), &BuildOptions::default())
            .unwrap();
        let options = BuildOptions {
            omit_tier: Some("common".to_string()),
            ..BuildOptions::default()
        };
        let (trimmed, _) = build(&input, &mock(), &ThresholdTable::default(), &options).unwrap();
        assert_eq!(trimmed.get("zythum"), full.get("zythum"));
    }

    #[test]
    fn gap_in_tiers_uses_fallback_and_counts_it() {
        let tiers = ThresholdTable::new(vec![
            TierBound::new("common", OPEN_LOW, 2.0),
            TierBound::new("rare", 5.0, OPEN_HIGH),
        ]);
        let (map, diag) = build(
            &words(&["the", "apple", "zythum"]),
            &mock(),
            &tiers,
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(map.get("apple").unwrap().bucket, "common");
        assert_eq!(diag.unclassified, 1);
        assert!(diag.has_fallbacks());
    }

    #[test]
    fn unnormalized_words_are_normalized_before_lookup() {
        let (map, diag) = build(
            &words(&["The", " APPLE ", "", "   "]),
            &mock(),
            &ThresholdTable::default(),
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(map.map.keys().collect::<Vec<_>>(), ["apple", "the"]);
        assert_eq!(map.get("the").unwrap().zipf, 7.0);
        assert_eq!(map.get("apple").unwrap().score, 2.5);
        assert_eq!(diag.lookup_fallbacks, 0);
        assert_eq!(diag.total_words, 2);
    }

    #[test]
    fn blank_only_words_are_empty_input() {
        let err = build(
            &words(&["", "  "]),
            &mock(),
            &ThresholdTable::default(),
            &BuildOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::EmptyInput));
    }

    #[test]
    fn inverted_bound_falls_back_instead_of_failing() {
        let tiers = ThresholdTable::new(vec![
            TierBound::new("common", OPEN_LOW, 3.0),
            TierBound::new("rare", 5.0, 4.0),
            TierBound::new("legendary", 6.0, OPEN_HIGH),
        ]);
        let provider =
            FrequencyTable::from_zipf_pairs("en", [("the", 7.0), ("plum", 2.5), ("zythum", 1.0)]);
        let (map, diag) = build(
            &words(&["the", "plum", "zythum"]),
            &provider,
            &tiers,
            &BuildOptions::default(),
        )
        .unwrap();

        let plum = map.get("plum").unwrap();
        assert_eq!(plum.score, 4.5);
        assert_eq!(plum.bucket, "common");
        assert_eq!(map.get("zythum").unwrap().bucket, "legendary");
        assert_eq!(diag.unclassified, 1);
        assert_eq!(diag.count("rare"), 0);
        assert_eq!(diag.count("common"), 2);
    }

    #[test]
    fn duplicates_collapse_in_map_but_count_in_diagnostics() {
        let (map, diag) = build(
            &words(&["apple", "the", "apple"]),
            &mock(),
            &ThresholdTable::default(),
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(diag.total_words, 3);
        assert_eq!(diag.unique_words, 2);
        assert_eq!(diag.duplicate_words, 1);
        assert_eq!(diag.count("common"), 3);
        assert_eq!(diag.tier("common").unwrap().samples.len(), 2);
    }

    #[test]
    fn sample_size_is_respected() {
        let table = FrequencyTable::from_zipf_pairs(
            "en",
            (0..10).map(|i| (format!("w{i}"), 7.0)),
        );
        let input: Vec<String> = (0..10).map(|i| format!("w{i}")).collect();
        let options = BuildOptions {
            sample_size: 3,
            ..BuildOptions::default()
        };
        let (_, diag) = build(&input, &table, &ThresholdTable::default(), &options).unwrap();
        assert_eq!(diag.count("common"), 10);
        assert_eq!(diag.tier("common").unwrap().samples.len(), 3);
    }

    #[test]
    fn embedding_copies_diagnostics_into_artifact() {
        let options = BuildOptions {
            embed_diagnostics: true,
            ..BuildOptions::default()
        };
        let (map, diag) = build(
            &words(&["the"]),
            &mock(),
            &ThresholdTable::default(),
            &options,
        )
        .unwrap();
        assert_eq!(map.diagnostics.as_ref(), Some(&diag));
    }

    #[test]
    fn empty_input_fails_before_lookups() {
        let provider = |_: &str, _: &str| -> Result<f64, LookupError> {
            panic!("provider must not be called for empty input")
        };
        let err = build(&[], &provider, &ThresholdTable::default(), &BuildOptions::default())
            .unwrap_err();
        assert!(matches!(err, BuildError::EmptyInput));
    }

    #[test]
    fn invalid_tiers_fail_before_lookups() {
        let provider = |_: &str, _: &str| -> Result<f64, LookupError> {
            panic!("provider must not be called for invalid tiers")
        };
        let options = BuildOptions {
            omit_tier: Some("boring".to_string()),
            ..BuildOptions::default()
        };
        let err = build(&words(&["the"]), &provider, &ThresholdTable::default(), &options)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::UnknownTier { role: "omit", .. })
        ));
    }

    #[test]
    fn identical_runs_serialize_identically() {
        let input = words(&["zythum", "the", "apple", "the"]);
        let run = || {
            let (map, _) = build(&input, &mock(), &ThresholdTable::default(), &BuildOptions::default())
                .unwrap();
            serde_json::to_string(&map).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn artifact_json_shape() {
        let (map, _) = build(
            &words(&["the"]),
            &mock(),
            &ThresholdTable::default(),
            &BuildOptions::default(),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::to_value(&map).unwrap();
        assert_eq!(json["thresholds"]["legendary"][0], 6.0);
        assert_eq!(json["map"]["the"]["bucket"], "common");
        assert_eq!(json["map"]["the"]["zipf"], 7.0);
        assert!(json.get("diagnostics").is_none());
    }
}
