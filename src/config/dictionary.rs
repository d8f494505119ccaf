//! Dictionary configuration.

use super::{
    check, parse_env_bool, parse_env_opt, parse_env_var, read_json, write_json, Config,
    ValidationError,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Construction parameters for a [`Dictionary`](crate::Dictionary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Bucket count; must be a power of two
    pub capacity: usize,

    /// Double the bucket count when the load factor is exceeded
    pub auto_grow: bool,

    /// Entries per bucket that trigger auto-growth
    pub max_load_factor: f64,

    /// Generator seed for `choose`; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            auto_grow: false,
            max_load_factor: 0.75,
            seed: None,
        }
    }
}

impl Config for DictionaryConfig {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !self.capacity.is_power_of_two() {
            errors.push(
                ValidationError::new(
                    "capacity",
                    &self.capacity.to_string(),
                    "bucket count must be a power of two",
                )
                .with_suggestion("typical values: 16, 64, 1024"),
            );
        }

        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            errors.push(
                ValidationError::new(
                    "max_load_factor",
                    &self.max_load_factor.to_string(),
                    "load factor must be a positive finite number",
                )
                .with_suggestion("typical values: 0.75-2.0"),
            );
        }

        check("Dictionary", errors)
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();

        config.capacity = parse_env_var(&format!("{}DICTIONARY_CAPACITY", prefix), config.capacity);
        config.auto_grow =
            parse_env_bool(&format!("{}DICTIONARY_AUTO_GROW", prefix), config.auto_grow);
        config.max_load_factor = parse_env_var(
            &format!("{}DICTIONARY_MAX_LOAD_FACTOR", prefix),
            config.max_load_factor,
        );
        config.seed = parse_env_opt(&format!("{}DICTIONARY_SEED", prefix)).or(config.seed);

        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            capacity: 1024,
            auto_grow: true,
            max_load_factor: 0.75,
            seed: None,
        }
    }

    fn memory_preset() -> Self {
        Self {
            capacity: 8,
            auto_grow: true,
            max_load_factor: 4.0,
            seed: None,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            capacity: 4096,
            auto_grow: false,
            max_load_factor: 1.0,
            seed: None,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(self, path, "dictionary")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_json(path, "dictionary")?;
        config.validate()?;
        Ok(config)
    }
}

impl DictionaryConfig {
    /// Create a new dictionary configuration builder.
    pub fn builder() -> DictionaryConfigBuilder {
        DictionaryConfigBuilder::new()
    }
}

/// Builder for [`DictionaryConfig`].
#[derive(Debug, Clone)]
pub struct DictionaryConfigBuilder {
    config: DictionaryConfig,
}

impl DictionaryConfigBuilder {
    /// Create a builder starting from the defaults.
    pub fn new() -> Self {
        Self {
            config: DictionaryConfig::default(),
        }
    }

    /// Set the bucket count.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Enable or disable auto-growth.
    pub fn auto_grow(mut self, enabled: bool) -> Self {
        self.config.auto_grow = enabled;
        self
    }

    /// Set the auto-growth threshold.
    pub fn max_load_factor(mut self, factor: f64) -> Self {
        self.config.max_load_factor = factor;
        self
    }

    /// Fix the generator seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<DictionaryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for DictionaryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
