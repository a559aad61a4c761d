//! Storage tuning configuration

use nmstore_core::validation::density;
use nmstore_core::{Result, StorageError, StorageInfo};

/// Configuration for conversions and densification
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StorageConfig {
    /// Density at or above which a sparse storage is cheaper as dense
    pub densify_threshold: f64,
    /// Extra off-diagonal capacity reserved when building Yale storages
    pub yale_capacity_hint: usize,
}

impl StorageConfig {
    /// Set the densification threshold
    pub fn with_densify_threshold(mut self, threshold: f64) -> Self {
        self.densify_threshold = threshold;
        self
    }

    /// Set the Yale capacity hint
    pub fn with_yale_capacity_hint(mut self, capacity: usize) -> Self {
        self.yale_capacity_hint = capacity;
        self
    }

    /// Check that the threshold lies in `(0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.densify_threshold > 0.0 && self.densify_threshold <= 1.0 {
            Ok(())
        } else {
            Err(StorageError::InvalidConfig)
        }
    }

    /// Whether `storage` is sparse and dense enough to be stored densely
    pub fn should_densify<S: StorageInfo + ?Sized>(&self, storage: &S) -> bool {
        if !storage.stype().is_sparse() {
            return false;
        }
        match storage.max_elements() {
            Ok(max) => density(storage.element_count(), max) >= self.densify_threshold,
            Err(_) => false,
        }
    }

    /// Load and validate a configuration from JSON
    ///
    /// Missing fields take their default values.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("rejecting storage config: {e}");
            StorageError::InvalidConfig
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            densify_threshold: 0.5,
            yale_capacity_hint: 0,
        }
    }
}
