//! Rarity scoring.
//!
//! A word's rarity score is `max_zipf - zipf(word)`, where `max_zipf` is the
//! highest Zipf frequency among the words of the current input. The most
//! common input word scores `0.0` and rarer words score higher. Because the
//! maximum comes from the input itself, scores are only comparable within a
//! single build.
//!
//! Scoring runs in two phases: [`gather_frequencies`] looks up every word,
//! then [`FrequencySet::score`] is applied per word once the maximum is known.

use std::collections::HashMap;

use crate::error::{BuildError, BuildResult, LookupError};
use crate::frequency::FrequencyProvider;

/// Zipf value substituted when a lookup fails.
pub const FALLBACK_ZIPF: f64 = 0.0;

/// Frequencies for every distinct input word plus the input-wide maximum.
#[derive(Debug, Clone)]
pub struct FrequencySet {
    zipf: HashMap<String, f64>,
    fallbacks: Vec<String>,
    max_zipf: f64,
}

impl FrequencySet {
    /// Zipf frequency recorded for `word`, if it was part of the input.
    pub fn zipf(&self, word: &str) -> Option<f64> {
        self.zipf.get(word).copied()
    }

    /// Highest Zipf frequency among the input words.
    pub const fn max_zipf(&self) -> f64 {
        self.max_zipf
    }

    /// Words whose lookup failed, in first-seen order.
    pub fn fallbacks(&self) -> &[String] {
        &self.fallbacks
    }

    /// Number of distinct words looked up.
    pub fn len(&self) -> usize {
        self.zipf.len()
    }

    /// Returns `true` if no words were looked up.
    pub fn is_empty(&self) -> bool {
        self.zipf.is_empty()
    }

    /// Rarity score for a Zipf frequency relative to this set's maximum.
    pub fn score(&self, zipf: f64) -> f64 {
        rarity_score(self.max_zipf, zipf)
    }
}

/// `max_zipf - zipf`.
pub fn rarity_score(max_zipf: f64, zipf: f64) -> f64 {
    max_zipf - zipf
}

/// Look up every distinct word and compute the input-wide maximum.
///
/// Each distinct word is queried once. A failed lookup records
/// [`FALLBACK_ZIPF`] for that word and the build carries on.
///
/// # Errors
///
/// Returns [`BuildError::EmptyInput`] if `words` is empty.
#[tracing::instrument(skip(words, provider), fields(word_count = words.len()))]
pub fn gather_frequencies<P>(
    words: &[String],
    provider: &P,
    locale: &str,
) -> BuildResult<FrequencySet>
where
    P: FrequencyProvider + ?Sized,
{
    let mut zipf: HashMap<String, f64> = HashMap::with_capacity(words.len());
    let mut fallbacks = Vec::new();

    for word in words {
        if zipf.contains_key(word) {
            continue;
        }
        let value = match lookup(provider, word, locale) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(word = %word, error = %err, "frequency lookup failed, using fallback");
                fallbacks.push(word.clone());
                FALLBACK_ZIPF
            }
        };
        zipf.insert(word.clone(), value);
    }

    if zipf.is_empty() {
        return Err(BuildError::EmptyInput);
    }

    let max_zipf = zipf.values().copied().fold(f64::NEG_INFINITY, f64::max);
    tracing::debug!(
        distinct = zipf.len(),
        fallbacks = fallbacks.len(),
        max_zipf,
        "frequencies gathered"
    );

    Ok(FrequencySet {
        zipf,
        fallbacks,
        max_zipf,
    })
}

fn lookup<P>(provider: &P, word: &str, locale: &str) -> Result<f64, LookupError>
where
    P: FrequencyProvider + ?Sized,
{
    let value = provider.zipf(word, locale)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LookupError::InvalidValue {
            word: word.to_string(),
            value,
        })
    }
}
