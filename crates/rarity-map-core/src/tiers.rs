//! Rarity tiers and score classification.
//!
//! A [`ThresholdTable`] is an ordered list of [`TierBound`]s, each a
//! half-open interval `[low, high)` on the rarity score axis. Classification
//! scans the table in configured order and the first interval containing the
//! score wins. The table is never re-sorted; callers own its ordering.
//!
//! In the artifact the table is written as a JSON object whose members keep
//! the configured order:
//!
//! ```json
//! {"common":[-1000000000.0,3.0],"uncommon":[3.0,4.0]}
//! ```

use std::collections::HashSet;
use std::fmt;

use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};

/// Score used as the open lower end of the lowest tier.
pub const OPEN_LOW: f64 = -1e9;

/// Score used as the open upper end of the highest tier.
pub const OPEN_HIGH: f64 = 1e9;

/// Tier assigned when no bound contains a score, unless configured otherwise.
pub const DEFAULT_FALLBACK_TIER: &str = "common";

/// A named half-open score interval `[low, high)`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct TierBound {
    /// Tier name written into the artifact.
    pub name: String,
    /// Inclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
}

impl TierBound {
    /// Create a bound.
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            low,
            high,
        }
    }

    /// Returns `true` if `score` lies in `[low, high)`.
    pub fn contains(&self, score: f64) -> bool {
        self.low <= score && score < self.high
    }
}

/// Ordered tier bounds used for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    bounds: Vec<TierBound>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::new(vec![
            TierBound::new("common", OPEN_LOW, 3.0),
            TierBound::new("uncommon", 3.0, 4.0),
            TierBound::new("rare", 4.0, 5.0),
            TierBound::new("epic", 5.0, 6.0),
            TierBound::new("legendary", 6.0, OPEN_HIGH),
        ])
    }
}

/// A structural problem between two neighbouring bounds.
///
/// These do not stop a build. Scores falling in a gap or an empty interval
/// go to the fallback tier, and overlapping ranges resolve to whichever
/// bound comes first.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageIssue {
    /// A bound with `low >= high` that no score can match.
    Empty {
        /// Tier name.
        name: String,
        /// Configured lower bound.
        low: f64,
        /// Configured upper bound.
        high: f64,
    },
    /// Scores in `[from, to)` match no bound.
    Gap {
        /// Tier whose `high` opens the gap.
        after: String,
        /// Tier whose `low` closes the gap.
        before: String,
        /// Start of the uncovered range.
        from: f64,
        /// End of the uncovered range.
        to: f64,
    },
    /// Two consecutive bounds share scores in `[from, to)`.
    Overlap {
        /// Earlier tier, which wins for the shared range.
        first: String,
        /// Later tier, shadowed for the shared range.
        second: String,
        /// Start of the shared range.
        from: f64,
        /// End of the shared range.
        to: f64,
    },
}

impl fmt::Display for CoverageIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { name, low, high } => {
                write!(f, "`{name}` has an empty interval [{low}, {high}) and matches nothing")
            }
            Self::Gap {
                after,
                before,
                from,
                to,
            } => write!(f, "gap [{from}, {to}) between `{after}` and `{before}`"),
            Self::Overlap {
                first,
                second,
                from,
                to,
            } => write!(
                f,
                "`{first}` and `{second}` overlap on [{from}, {to}); `{first}` wins"
            ),
        }
    }
}

impl ThresholdTable {
    /// Create a table from bounds in classification order.
    pub const fn new(bounds: Vec<TierBound>) -> Self {
        Self { bounds }
    }

    /// Bounds in classification order.
    pub fn bounds(&self) -> &[TierBound] {
        &self.bounds
    }

    /// Tier names in classification order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bounds.iter().map(|b| b.name.as_str())
    }

    /// Returns `true` if a tier named `name` exists.
    pub fn contains_tier(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Number of tiers.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Returns `true` if there are no tiers.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Return the name of the first bound containing `score`.
    ///
    /// `None` means the score falls outside every bound.
    pub fn classify(&self, score: f64) -> Option<&str> {
        self.bounds
            .iter()
            .find(|b| b.contains(score))
            .map(|b| b.name.as_str())
    }

    /// Classify `score`, returning `fallback` when no bound matches.
    ///
    /// The boolean is `true` when the fallback was used.
    pub fn classify_or<'a>(&'a self, score: f64, fallback: &'a str) -> (&'a str, bool) {
        match self.classify(score) {
            Some(name) => (name, false),
            None => (fallback, true),
        }
    }

    /// Check the table for errors that make its output ambiguous.
    ///
    /// `fallback` must name a tier so unclassified scores land somewhere the
    /// artifact describes. `omit`, when set, must name a tier too.
    pub fn validate(&self, fallback: &str, omit: Option<&str>) -> ConfigResult<()> {
        if self.bounds.is_empty() {
            return Err(ConfigError::EmptyTiers);
        }

        let mut seen = HashSet::new();
        for (index, bound) in self.bounds.iter().enumerate() {
            if bound.name.trim().is_empty() {
                return Err(ConfigError::BlankTierName { index });
            }
            if !seen.insert(bound.name.as_str()) {
                return Err(ConfigError::DuplicateTier(bound.name.clone()));
            }
            if !bound.low.is_finite() || !bound.high.is_finite() {
                return Err(ConfigError::InvalidBounds {
                    name: bound.name.clone(),
                    low: bound.low,
                    high: bound.high,
                });
            }
        }

        self.require_tier("fallback", fallback)?;
        if let Some(omit) = omit {
            self.require_tier("omit", omit)?;
        }
        Ok(())
    }

    fn require_tier(&self, role: &'static str, name: &str) -> ConfigResult<()> {
        if self.contains_tier(name) {
            Ok(())
        } else {
            Err(ConfigError::UnknownTier {
                role,
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
        }
    }

    /// Report empty bounds, then gaps and overlaps between consecutive
    /// non-empty bounds.
    pub fn coverage_issues(&self) -> Vec<CoverageIssue> {
        let (live, empty): (Vec<&TierBound>, Vec<&TierBound>) =
            self.bounds.iter().partition(|b| b.low < b.high);

        let mut issues: Vec<CoverageIssue> = empty
            .into_iter()
            .map(|b| CoverageIssue::Empty {
                name: b.name.clone(),
                low: b.low,
                high: b.high,
            })
            .collect();
        issues.extend(live.windows(2).filter_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if a.high < b.low {
                Some(CoverageIssue::Gap {
                    after: a.name.clone(),
                    before: b.name.clone(),
                    from: a.high,
                    to: b.low,
                })
            } else if a.high > b.low {
                Some(CoverageIssue::Overlap {
                    first: a.name.clone(),
                    second: b.name.clone(),
                    from: b.low,
                    to: a.high.min(b.high),
                })
            } else {
                None
            }
        }));
        issues
    }
}

impl Serialize for ThresholdTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bounds.len()))?;
        for bound in &self.bounds {
            map.serialize_entry(&bound.name, &[bound.low, bound.high])?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ThresholdTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ThresholdTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tier name to [low, high]")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut bounds = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, [low, high])) = access.next_entry::<String, [f64; 2]>()? {
                    bounds.push(TierBound { name, low, high });
                }
                Ok(ThresholdTable { bounds })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

impl JsonSchema for ThresholdTable {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "ThresholdTable".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        let bound = generator.subschema_for::<[f64; 2]>();
        schemars::json_schema!({
            "type": "object",
            "description": "Tier name to [low, high) score interval, in classification order.",
            "additionalProperties": bound,
        })
    }
}
