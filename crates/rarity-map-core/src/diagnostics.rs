//! Build diagnostics.
//!
//! Counts and samples collected while building a rarity map. They are meant
//! for humans sanity-checking a build and are only written into the artifact
//! when explicitly requested.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tiers::ThresholdTable;

/// One sampled word with its score and frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Sample {
    /// The normalized word.
    pub word: String,
    /// Rarity score.
    pub score: f64,
    /// Zipf frequency.
    pub zipf: f64,
}

/// Count and samples for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TierSummary {
    /// Tier name.
    pub name: String,
    /// Input lines classified into this tier, duplicates included.
    pub count: usize,
    /// First few distinct words classified into this tier.
    pub samples: Vec<Sample>,
}

/// Summary statistics for a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BuildDiagnostics {
    /// Non-blank input lines processed.
    pub total_words: usize,
    /// Distinct words among the input lines.
    pub unique_words: usize,
    /// Lines repeating a word seen earlier.
    pub duplicate_words: usize,
    /// Entries written to the map.
    pub kept_entries: usize,
    /// Distinct words left out of the map by the omit-tier option.
    pub omitted_entries: usize,
    /// Tier excluded from the map, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub omitted_tier: Option<String>,
    /// Highest Zipf frequency in the input, the zero point of the score axis.
    pub max_zipf: f64,
    /// Distinct words whose frequency lookup failed and fell back to zero.
    pub lookup_fallbacks: usize,
    /// Distinct words whose score matched no tier and got the fallback tier.
    pub unclassified: usize,
    /// Per-tier counts and samples in classification order.
    pub tiers: Vec<TierSummary>,
}

impl BuildDiagnostics {
    /// Empty diagnostics with one zeroed summary per tier.
    pub fn for_tiers(tiers: &ThresholdTable) -> Self {
        Self {
            total_words: 0,
            unique_words: 0,
            duplicate_words: 0,
            kept_entries: 0,
            omitted_entries: 0,
            omitted_tier: None,
            max_zipf: 0.0,
            lookup_fallbacks: 0,
            unclassified: 0,
            tiers: tiers
                .names()
                .map(|name| TierSummary {
                    name: name.to_string(),
                    count: 0,
                    samples: Vec::new(),
                })
                .collect(),
        }
    }

    /// Summary for the tier named `name`.
    pub fn tier(&self, name: &str) -> Option<&TierSummary> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// Line count for the tier named `name` (zero if unknown).
    pub fn count(&self, name: &str) -> usize {
        self.tier(name).map_or(0, |t| t.count)
    }

    /// Record one classified input line.
    ///
    /// `first_sighting` is `false` for repeated words; those add to the count
    /// but never to the samples.
    pub(crate) fn record(&mut self, sample: Sample, tier: &str, first_sighting: bool, cap: usize) {
        self.total_words += 1;
        if !first_sighting {
            self.duplicate_words += 1;
        }
        if let Some(summary) = self.tiers.iter_mut().find(|t| t.name == tier) {
            summary.count += 1;
            if first_sighting && summary.samples.len() < cap {
                summary.samples.push(sample);
            }
        }
    }

    /// Returns `true` if any lookup or classification fell back.
    pub const fn has_fallbacks(&self) -> bool {
        self.lookup_fallbacks > 0 || self.unclassified > 0
    }
}
