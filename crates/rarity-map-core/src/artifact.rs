//! Artifact persistence.
//!
//! Artifacts are JSON. Writes go to a temporary file next to the target and
//! are renamed into place, so a reader never sees a half-written artifact and
//! a failed build leaves any previous artifact untouched.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};

use camino::Utf8Path;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::builder::RarityMap;
use crate::error::{ArtifactError, ArtifactResult};

/// Write `artifact` to `path` atomically.
///
/// Compact JSON unless `pretty` is set. Parent directories are created.
#[tracing::instrument(skip(artifact), fields(entries = artifact.len()))]
pub fn write_artifact(path: &Utf8Path, artifact: &RarityMap, pretty: bool) -> ArtifactResult<()> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path()).map_err(io_err)?;

    let temp = NamedTempFile::new_in(parent.as_std_path()).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        let encoded = if pretty {
            serde_json::to_writer_pretty(&mut writer, artifact)
        } else {
            serde_json::to_writer(&mut writer, artifact)
        };
        encoded.map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)?;
    }
    temp.persist(path.as_std_path())
        .map_err(|e| io_err(e.error))?;

    tracing::info!(path = %path, "artifact written");
    Ok(())
}

/// Load an artifact from `path`.
#[tracing::instrument]
pub fn read_artifact(path: &Utf8Path) -> ArtifactResult<RarityMap> {
    let file = File::open(path.as_std_path()).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// An entry whose stored tier disagrees with its thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    /// The word.
    pub word: String,
    /// Stored score.
    pub score: f64,
    /// Tier recorded in the artifact.
    pub recorded: String,
    /// Tier the thresholds give for the score.
    pub derived: String,
}

/// Tier counts for an artifact's entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCount {
    /// Tier name.
    pub name: String,
    /// Entries recorded under the tier.
    pub count: usize,
}

/// Result of checking an artifact against its own thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyReport {
    /// Number of entries checked.
    pub entries: usize,
    /// Entries per tier, in threshold order.
    pub tiers: Vec<TierCount>,
    /// Entries whose score lies outside every interval.
    ///
    /// These were assigned a fallback tier at build time and cannot be
    /// re-derived from the thresholds alone.
    pub unclassified: Vec<String>,
    /// Entries whose recorded tier differs from the derived one.
    pub mismatches: Vec<Mismatch>,
    /// Entries whose recorded tier is not in the thresholds.
    pub unknown_tiers: Vec<String>,
}

impl VerifyReport {
    /// Returns `true` if every classifiable entry matches its thresholds.
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty() && self.unknown_tiers.is_empty()
    }
}

/// Re-derive every entry's tier from the artifact's thresholds.
#[tracing::instrument(skip_all, fields(entries = artifact.len()))]
pub fn verify(artifact: &RarityMap) -> VerifyReport {
    let mut report = VerifyReport {
        entries: artifact.len(),
        tiers: artifact
            .thresholds
            .names()
            .map(|name| TierCount {
                name: name.to_string(),
                count: 0,
            })
            .collect(),
        unclassified: Vec::new(),
        mismatches: Vec::new(),
        unknown_tiers: Vec::new(),
    };

    for (word, entry) in &artifact.map {
        match report.tiers.iter_mut().find(|t| t.name == entry.bucket) {
            Some(tier) => tier.count += 1,
            None => {
                report.unknown_tiers.push(word.clone());
                continue;
            }
        }
        match artifact.thresholds.classify(entry.score) {
            None => report.unclassified.push(word.clone()),
            Some(derived) if derived != entry.bucket => report.mismatches.push(Mismatch {
                word: word.clone(),
                score: entry.score,
                recorded: entry.bucket.clone(),
                derived: derived.to_string(),
            }),
            Some(_) => {}
        }
    }

    tracing::debug!(
        mismatches = report.mismatches.len(),
        unclassified = report.unclassified.len(),
        "artifact verified"
    );
    report
}

/// JSON Schema describing the artifact format.
pub fn artifact_schema() -> schemars::Schema {
    schemars::schema_for!(RarityMap)
}
