use std::error::Error;
use std::fmt::{Display, Formatter};

/// Feature key for the notes workspace.
pub const FEATURE_NOTES: &str = "features.notes";

const SUPPORTED_FEATURE_KEYS: &[&str] = &[FEATURE_NOTES];

/// Gated installation feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Notes,
}

impl Feature {
    /// Dotted key as used in the permissions document.
    pub fn key(self) -> &'static str {
        match self {
            Self::Notes => FEATURE_NOTES,
        }
    }

    pub fn supported_keys() -> &'static [&'static str] {
        SUPPORTED_FEATURE_KEYS
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Parses a dotted feature key. Matching is exact after trimming.
pub fn parse_feature(value: &str) -> Result<Feature, FeatureError> {
    match value.trim() {
        "" => Err(FeatureError::Empty),
        FEATURE_NOTES => Ok(Feature::Notes),
        other => Err(FeatureError::Unsupported(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    Empty,
    Unsupported(String),
}

impl Display for FeatureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "feature key must not be empty"),
            Self::Unsupported(value) => write!(f, "feature key is unsupported: {value}"),
        }
    }
}

impl Error for FeatureError {}
