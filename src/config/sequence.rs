//! Sequence configuration.

use super::{check, parse_env_opt, parse_env_var, read_json, write_json, Config, ValidationError};
use crate::containers::SequenceKind;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest length any sequence accepts by default.
pub const DEFAULT_MAX_CAPACITY: usize = u32::MAX as usize;

/// Construction parameters for a [`Sequence`](crate::Sequence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Backing implementation
    pub kind: SequenceKind,

    /// Elements admitted up front (slots for contiguous backings, nodes
    /// for linked ones)
    pub initial_capacity: usize,

    /// Length limit; growth past it fails with `TooBig`
    pub max_capacity: usize,

    /// Generator seed for shuffle and draws; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            kind: SequenceKind::ArrayList,
            initial_capacity: 0,
            max_capacity: DEFAULT_MAX_CAPACITY,
            seed: None,
        }
    }
}

impl Config for SequenceConfig {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.max_capacity == 0 {
            errors.push(
                ValidationError::new("max_capacity", "0", "maximum capacity must be at least 1")
                    .with_suggestion("default: 4294967295"),
            );
        }

        if self.initial_capacity > self.max_capacity {
            errors.push(ValidationError::new(
                "initial_capacity",
                &self.initial_capacity.to_string(),
                "initial capacity cannot exceed the maximum capacity",
            ));
        }

        check("Sequence", errors)
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();

        config.kind = parse_env_var(&format!("{}SEQUENCE_KIND", prefix), config.kind);
        config.initial_capacity = parse_env_var(
            &format!("{}SEQUENCE_INITIAL_CAPACITY", prefix),
            config.initial_capacity,
        );
        config.max_capacity = parse_env_var(
            &format!("{}SEQUENCE_MAX_CAPACITY", prefix),
            config.max_capacity,
        );
        config.seed = parse_env_opt(&format!("{}SEQUENCE_SEED", prefix)).or(config.seed);

        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            kind: SequenceKind::ArrayList,
            initial_capacity: 64,
            ..Self::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            kind: SequenceKind::SinglyLinkedList,
            ..Self::default()
        }
    }

    fn realtime_preset() -> Self {
        Self {
            kind: SequenceKind::Deque,
            initial_capacity: 1024,
            ..Self::default()
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(self, path, "sequence")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = read_json(path, "sequence")?;
        config.validate()?;
        Ok(config)
    }
}

impl SequenceConfig {
    /// Create a new sequence configuration builder.
    pub fn builder() -> SequenceConfigBuilder {
        SequenceConfigBuilder::new()
    }
}

/// Builder for [`SequenceConfig`].
#[derive(Debug, Clone)]
pub struct SequenceConfigBuilder {
    config: SequenceConfig,
}

impl SequenceConfigBuilder {
    /// Create a builder starting from the defaults.
    pub fn new() -> Self {
        Self {
            config: SequenceConfig::default(),
        }
    }

    /// Set the backing kind.
    pub fn kind(mut self, kind: SequenceKind) -> Self {
        self.config.kind = kind;
        self
    }

    /// Set the number of elements admitted at construction.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Set the length limit.
    pub fn max_capacity(mut self, capacity: usize) -> Self {
        self.config.max_capacity = capacity;
        self
    }

    /// Fix the generator seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<SequenceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SequenceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
