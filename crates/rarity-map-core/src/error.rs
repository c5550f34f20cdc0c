//! Error types for rarity-map-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,

    /// The tier table has no entries.
    #[error("tier table is empty")]
    EmptyTiers,

    /// A tier has an empty or whitespace-only name.
    #[error("tier #{index} has a blank name")]
    BlankTierName {
        /// Position of the tier in the configured table.
        index: usize,
    },

    /// Two tiers share a name, which would collide in the artifact.
    #[error("tier `{0}` is defined more than once")]
    DuplicateTier(String),

    /// A tier bound is NaN or infinite.
    #[error("tier `{name}` has non-finite bounds [{low}, {high})")]
    InvalidBounds {
        /// Tier name.
        name: String,
        /// Inclusive lower bound.
        low: f64,
        /// Exclusive upper bound.
        high: f64,
    },

    /// The frequency table delimiter is not a single ASCII character.
    #[error("delimiter {0:?} must be a single ASCII character")]
    Delimiter(char),

    /// A tier referenced by name does not exist in the table.
    #[error("{role} tier `{name}` is not in the tier table (known: {available})")]
    UnknownTier {
        /// What the tier was referenced as ("fallback" or "omit").
        role: &'static str,
        /// The tier name that was requested.
        name: String,
        /// Comma-separated list of configured tier names.
        available: String,
    },
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a single frequency lookup failed.
///
/// Lookup failures never abort a build; the builder substitutes a zipf of
/// `0.0` and counts the event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    /// The word is not present in the frequency source.
    #[error("unknown word `{0}`")]
    UnknownWord(String),

    /// The frequency source has no data for the requested locale.
    #[error("locale `{requested}` is not supported (source locale: {available})")]
    UnsupportedLocale {
        /// Locale tag passed to the lookup.
        requested: String,
        /// Locale tag the source was loaded for.
        available: String,
    },

    /// The frequency source returned a value that is not a finite number.
    #[error("frequency for `{word}` is not finite: {value}")]
    InvalidValue {
        /// The word that was looked up.
        word: String,
        /// The offending value.
        value: f64,
    },
}

/// Errors that can occur while loading a frequency table.
#[derive(Error, Debug)]
pub enum FrequencyError {
    /// The table file could not be opened or read.
    #[error("failed to read frequency table {path}: {source}")]
    Io {
        /// Path of the table file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A row could not be parsed.
    #[error("malformed frequency table row in {path}: {source}")]
    Csv {
        /// Path of the table file.
        path: Utf8PathBuf,
        /// Underlying parse error.
        source: csv::Error,
    },

    /// A row had a value that is not a number.
    #[error("{path} line {line}: `{value}` is not a number")]
    BadValue {
        /// Path of the table file.
        path: Utf8PathBuf,
        /// 1-based line number.
        line: u64,
        /// Raw value text.
        value: String,
    },

    /// The table contained no usable rows.
    #[error("frequency table {0} has no entries")]
    Empty(Utf8PathBuf),
}

/// Result type alias using [`FrequencyError`].
pub type FrequencyResult<T> = Result<T, FrequencyError>;

/// Errors that abort a rarity map build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The wordlist is empty after trimming and dropping blank lines.
    #[error("wordlist contains no words")]
    EmptyInput,

    /// The tier configuration was rejected before any lookup ran.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias using [`BuildError`].
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that can occur when persisting or loading an artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Filesystem error while reading or writing the artifact.
    #[error("artifact I/O failed for {path}: {source}")]
    Io {
        /// Path of the artifact.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact could not be encoded or decoded as JSON.
    #[error("artifact JSON error for {path}: {source}")]
    Json {
        /// Path of the artifact.
        path: Utf8PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },
}

/// Result type alias using [`ArtifactError`].
pub type ArtifactResult<T> = Result<T, ArtifactError>;
