//! Bucket table configuration.
//!
//! Buckets are listed in ascending order of their upper bound. Each bucket
//! covers `(previous upper, upper]`; the first starts at zero and the last
//! has no upper bound.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Amount used to place a record in a bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationBasis {
    #[default]
    UnitPrice,
    /// Quantity multiplied by unit price
    LineTotal,
}

/// One value range and its batch size
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BucketConfig {
    pub name: String,
    /// Inclusive upper bound; `None` for the open-ended last bucket
    #[serde(default)]
    pub upper_bound: Option<u64>,
    pub batch_size: usize,
}

impl BucketConfig {
    pub fn new(name: impl Into<String>, upper_bound: Option<u64>, batch_size: usize) -> Self {
        Self {
            name: name.into(),
            upper_bound,
            batch_size,
        }
    }
}

/// The standard six-bucket table
pub fn default_buckets() -> Vec<BucketConfig> {
    vec![
        BucketConfig::new("0-1500", Some(1_500), 10),
        BucketConfig::new("1501-5000", Some(5_000), 10),
        BucketConfig::new("5001-25000", Some(25_000), 10),
        BucketConfig::new("25001-100000", Some(100_000), 10),
        BucketConfig::new("100001-200000", Some(200_000), 1),
        BucketConfig::new(">200000", None, 1),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub basis: ClassificationBasis,
    pub buckets: Vec<BucketConfig>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            basis: ClassificationBasis::default(),
            buckets: default_buckets(),
        }
    }
}

impl ClassificationConfig {
    /// Buckets must partition `[0, ∞)`: ascending bounds, unique names,
    /// positive batch sizes and exactly one open-ended bucket in last place.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(last) = self.buckets.last() else {
            return Err(ConfigError::invalid("classification.buckets is empty"));
        };
        if last.upper_bound.is_some() {
            return Err(ConfigError::invalid(format!(
                "last bucket '{}' must not have an upper bound",
                last.name
            )));
        }

        let mut previous: Option<u64> = None;
        let mut names = std::collections::HashSet::new();
        for (index, bucket) in self.buckets.iter().enumerate() {
            if bucket.name.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "bucket #{} has an empty name",
                    index + 1
                )));
            }
            if !names.insert(bucket.name.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "duplicate bucket name '{}'",
                    bucket.name
                )));
            }
            if bucket.batch_size == 0 {
                return Err(ConfigError::invalid(format!(
                    "bucket '{}' has batch_size 0",
                    bucket.name
                )));
            }

            let is_last = index + 1 == self.buckets.len();
            match (bucket.upper_bound, is_last) {
                (None, false) => {
                    return Err(ConfigError::invalid(format!(
                        "only the last bucket may be open-ended, found '{}'",
                        bucket.name
                    )));
                }
                (Some(upper), _) => {
                    if previous.is_some_and(|p| upper <= p) {
                        return Err(ConfigError::invalid(format!(
                            "bucket '{}' upper bound {} is not above the previous bound",
                            bucket.name, upper
                        )));
                    }
                    previous = Some(upper);
                }
                (None, true) => {}
            }
        }
        Ok(())
    }
}
