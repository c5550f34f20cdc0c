//! Core library for rarity-map.
//!
//! Turns a wordlist into a rarity map: every word gets a Zipf frequency from a
//! [`FrequencyProvider`], a rarity score relative to the most common word in
//! the list, and a named tier from an ordered [`ThresholdTable`].
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`wordlist`] - Wordlist parsing and word normalization
//! - [`frequency`] - Frequency provider seam and the file-backed table
//! - [`score`] - Rarity scoring relative to the input maximum
//! - [`tiers`] - Tier bounds and classification
//! - [`builder`] - Pipeline assembly into a [`RarityMap`]
//! - [`diagnostics`] - Per-tier counts and samples
//! - [`artifact`] - Reading, writing, and verifying artifacts
//!
//! # Quick Start
//!
//! ```
//! use rarity_map_core::{BuildOptions, FrequencyTable, ThresholdTable, build, wordlist};
//!
//! let table = FrequencyTable::from_zipf_pairs("en", [("the", 7.0), ("apple", 4.5), ("zythum", 1.0)]);
//! let words = wordlist::parse_wordlist("the\napple\nzythum\n");
//!
//! let (map, diagnostics) =
//!     build(&words, &table, &ThresholdTable::default(), &BuildOptions::default()).unwrap();
//!
//! assert_eq!(map.get("zythum").unwrap().bucket, "legendary");
//! assert_eq!(diagnostics.count("common"), 2);
//! ```
#![deny(unsafe_code)]

pub mod artifact;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frequency;
pub mod score;
pub mod tiers;
pub mod wordlist;

pub use artifact::{VerifyReport, read_artifact, verify, write_artifact};
pub use builder::{BuildOptions, RarityEntry, RarityMap, build};
pub use config::{Config, ConfigLoader, ConfigSources, DEFAULT_MAX_INPUT_BYTES, LogLevel};
pub use diagnostics::{BuildDiagnostics, Sample, TierSummary};
pub use error::{
    ArtifactError, BuildError, ConfigError, ConfigResult, FrequencyError, LookupError,
};
pub use frequency::{FrequencyProvider, FrequencyScale, FrequencyTable};
pub use tiers::{ThresholdTable, TierBound};
