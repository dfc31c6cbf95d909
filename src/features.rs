//! Audio feature vectors used to steer catalog recommendations.
//!
//! A vector is a keyed map from feature name (`target_energy`, `min_valence`,
//! ...) to a value. Vectors are values: they are never mutated in place by the
//! adjustment engine, every merge produces a new vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Musical characteristic understood by the recommendation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Valence,
    Energy,
    Tempo,
    Acousticness,
    Danceability,
    Instrumentalness,
    Speechiness,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Valence,
        Feature::Energy,
        Feature::Tempo,
        Feature::Acousticness,
        Feature::Danceability,
        Feature::Instrumentalness,
        Feature::Speechiness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Valence => "valence",
            Feature::Energy => "energy",
            Feature::Tempo => "tempo",
            Feature::Acousticness => "acousticness",
            Feature::Danceability => "danceability",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Speechiness => "speechiness",
        }
    }
}

/// How a value constrains a feature: a target, or a lower/upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bound {
    Target,
    Min,
    Max,
}

impl Bound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::Target => "target",
            Bound::Min => "min",
            Bound::Max => "max",
        }
    }
}

/// Key of an audio feature vector, rendered as `<bound>_<feature>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FeatureKey {
    pub bound: Bound,
    pub feature: Feature,
}

impl FeatureKey {
    pub const fn target(feature: Feature) -> Self {
        Self {
            bound: Bound::Target,
            feature,
        }
    }

    pub const fn min(feature: Feature) -> Self {
        Self {
            bound: Bound::Min,
            feature,
        }
    }

    pub const fn max(feature: Feature) -> Self {
        Self {
            bound: Bound::Max,
            feature,
        }
    }

    /// Whether values for this key must stay within `[0.0, 1.0]` after an
    /// adjustment. Only targets of the normalized features qualify; tempo,
    /// speechiness and every min/max bound are left as-is.
    pub fn is_unit_bounded(&self) -> bool {
        self.bound == Bound::Target
            && matches!(
                self.feature,
                Feature::Valence
                    | Feature::Energy
                    | Feature::Acousticness
                    | Feature::Danceability
                    | Feature::Instrumentalness
            )
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.bound.as_str(), self.feature.as_str())
    }
}

/// Error returned when a feature name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown audio feature: {0}")]
pub struct UnknownFeature(pub String);

impl FromStr for FeatureKey {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bound, rest) = s
            .split_once('_')
            .ok_or_else(|| UnknownFeature(s.to_string()))?;

        let bound = match bound {
            "target" => Bound::Target,
            "min" => Bound::Min,
            "max" => Bound::Max,
            _ => return Err(UnknownFeature(s.to_string())),
        };

        let feature = Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == rest)
            .ok_or_else(|| UnknownFeature(s.to_string()))?;

        Ok(Self { bound, feature })
    }
}

impl From<FeatureKey> for String {
    fn from(key: FeatureKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for FeatureKey {
    type Error = UnknownFeature;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Signed per-feature change applied by an adjustment, in application order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureDelta(Vec<(FeatureKey, f64)>);

impl FeatureDelta {
    pub fn new(changes: Vec<(FeatureKey, f64)>) -> Self {
        Self(changes)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        self.0.iter().copied()
    }
}

/// Keyed audio feature vector.
///
/// Merge semantics: adding a delta sums into an existing key and inserts a
/// missing one; unit-bounded targets are clamped after each change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioFeatures(BTreeMap<FeatureKey, f64>);

impl AudioFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: FeatureKey, value: f64) -> Self {
        self.0.insert(key, value);
        self
    }

    pub fn get(&self, key: FeatureKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    /// Value for `key`, reading a missing key as `0.0`
    pub fn value_or_zero(&self, key: FeatureKey) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Return a new vector with `delta` merged in
    pub fn merged(&self, delta: &FeatureDelta) -> Self {
        let mut out = self.0.clone();
        for (key, change) in delta.iter() {
            let value = out.entry(key).and_modify(|v| *v += change).or_insert(change);
            if key.is_unit_bounded() {
                *value = value.clamp(0.0, 1.0);
            }
        }
        Self(out)
    }

    /// Render as `(name, value)` pairs for a query string
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }
}

impl FromIterator<(FeatureKey, f64)> for AudioFeatures {
    fn from_iter<I: IntoIterator<Item = (FeatureKey, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
