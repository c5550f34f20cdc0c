//! Word frequency sources.
//!
//! The builder only needs one capability from a frequency source: given a
//! word and a locale tag, return a frequency on the Zipf scale (log10 of
//! occurrences per billion words, so "the" sits around 7 and a rare word
//! near 1). [`FrequencyProvider`] is that seam.
//!
//! [`FrequencyTable`] is the file-backed provider used by the CLI. It reads a
//! delimited `word<delim>value` file where the value is either already a Zipf
//! frequency or a raw occurrence count.

use std::collections::HashMap;
use std::fs::File;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{FrequencyError, FrequencyResult, LookupError};
use crate::wordlist;

/// A source of Zipf-scale word frequencies.
pub trait FrequencyProvider {
    /// Look up the Zipf frequency of `word` for `locale`.
    ///
    /// Implementations should return an error for unknown words rather than
    /// inventing a value; the caller decides on the fallback.
    fn zipf(&self, word: &str, locale: &str) -> Result<f64, LookupError>;
}

impl<F> FrequencyProvider for F
where
    F: Fn(&str, &str) -> Result<f64, LookupError>,
{
    fn zipf(&self, word: &str, locale: &str) -> Result<f64, LookupError> {
        self(word, locale)
    }
}

/// How values in a frequency table file are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FrequencyScale {
    /// Values are Zipf frequencies and are used as-is.
    #[default]
    Zipf,
    /// Values are raw occurrence counts, converted to Zipf on load.
    Count,
}

impl FrequencyScale {
    /// Returns the scale as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Zipf => "zipf",
            Self::Count => "count",
        }
    }
}

impl std::fmt::Display for FrequencyScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert an occurrence count to the Zipf scale given the corpus total.
///
/// Zipf is `log10(frequency per billion words)`.
pub fn count_to_zipf(count: f64, total: f64) -> f64 {
    (count / total * 1e9).log10()
}

/// In-memory frequency table for a single locale.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    locale: String,
    zipf: HashMap<String, f64>,
}

impl FrequencyTable {
    /// Build a table from `(word, zipf)` pairs.
    ///
    /// Words are normalized like wordlist lines. When a word appears more than
    /// once the highest value wins. Non-finite values are dropped.
    pub fn from_zipf_pairs<I, S>(locale: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut zipf: HashMap<String, f64> = HashMap::new();
        for (word, value) in pairs {
            let key = wordlist::normalize(word.as_ref());
            if key.is_empty() || !value.is_finite() {
                continue;
            }
            zipf.entry(key)
                .and_modify(|v| *v = v.max(value))
                .or_insert(value);
        }
        Self {
            locale: locale.into(),
            zipf,
        }
    }

    /// Build a table from `(word, count)` pairs, converting counts to Zipf.
    ///
    /// When a word appears more than once the highest count wins, as with
    /// [`Self::from_zipf_pairs`]. The total is the sum of the kept counts.
    /// Zero and negative counts are dropped.
    pub fn from_count_pairs<I, S>(locale: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<String, f64> = HashMap::new();
        for (word, count) in pairs {
            let key = wordlist::normalize(word.as_ref());
            if key.is_empty() || !count.is_finite() || count <= 0.0 {
                continue;
            }
            counts
                .entry(key)
                .and_modify(|c| *c = c.max(count))
                .or_insert(count);
        }
        let total: f64 = counts.values().sum();
        let zipf = counts
            .into_iter()
            .map(|(word, count)| (word, count_to_zipf(count, total)))
            .collect();
        Self {
            locale: locale.into(),
            zipf,
        }
    }

    /// Load a table from a delimited file.
    ///
    /// Each row is `word<delimiter>value[<delimiter>...]`; extra columns are
    /// ignored, there is no header row, and lines starting with `#` are
    /// comments.
    #[tracing::instrument(fields(path = %path.as_ref()), skip(path))]
    pub fn from_path(
        path: impl AsRef<Utf8Path>,
        locale: &str,
        scale: FrequencyScale,
        delimiter: u8,
    ) -> FrequencyResult<Self> {
        let path = path.as_ref();
        let file = File::open(path.as_std_path()).map_err(|source| FrequencyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .comment(Some(b'#'))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| FrequencyError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let line = record.position().map_or(0, csv::Position::line);
            let (Some(word), Some(raw)) = (record.get(0), record.get(1)) else {
                return Err(FrequencyError::BadValue {
                    path: path.to_path_buf(),
                    line,
                    value: record.get(0).unwrap_or_default().to_string(),
                });
            };
            let value: f64 = raw.parse().map_err(|_| FrequencyError::BadValue {
                path: path.to_path_buf(),
                line,
                value: raw.to_string(),
            })?;
            rows.push((word.to_string(), value));
        }

        let table = match scale {
            FrequencyScale::Zipf => Self::from_zipf_pairs(locale, rows),
            FrequencyScale::Count => Self::from_count_pairs(locale, rows),
        };
        if table.is_empty() {
            return Err(FrequencyError::Empty(Utf8PathBuf::from(path)));
        }

        tracing::info!(
            entries = table.len(),
            locale,
            scale = scale.as_str(),
            "frequency table loaded"
        );
        Ok(table)
    }

    /// Locale tag this table answers for.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Number of distinct words in the table.
    pub fn len(&self) -> usize {
        self.zipf.len()
    }

    /// Returns `true` if the table has no words.
    pub fn is_empty(&self) -> bool {
        self.zipf.is_empty()
    }
}

impl FrequencyProvider for FrequencyTable {
    fn zipf(&self, word: &str, locale: &str) -> Result<f64, LookupError> {
        if !self.locale.eq_ignore_ascii_case(locale) {
            return Err(LookupError::UnsupportedLocale {
                requested: locale.to_string(),
                available: self.locale.clone(),
            });
        }
        self.zipf
            .get(word)
            .copied()
            .ok_or_else(|| LookupError::UnknownWord(word.to_string()))
    }
}
