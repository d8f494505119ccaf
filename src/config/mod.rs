//! Construction parameters for sequences and dictionaries
//!
//! [`SequenceConfig`] and [`DictionaryConfig`] are plain serde structs with
//! builders. The [`Config`] trait adds validation, environment overrides,
//! presets and JSON files.
//!
//! ```rust
//! use polyseq::config::{Config, DictionaryConfig, SequenceConfig};
//! use polyseq::SequenceKind;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SequenceConfig::builder()
//!     .kind(SequenceKind::Deque)
//!     .initial_capacity(64)
//!     .seed(7)
//!     .build()?;
//! assert_eq!(config.kind, SequenceKind::Deque);
//!
//! // MYAPP_DICTIONARY_CAPACITY, MYAPP_DICTIONARY_AUTO_GROW, ...
//! let dict = DictionaryConfig::from_env_with_prefix("MYAPP_")?;
//! assert!(dict.validate().is_ok());
//! # Ok(())
//! # }
//! ```

use crate::error::{PolyseqError, Result};
use std::env;
use std::fmt;
use std::path::Path;

pub mod dictionary;
pub mod sequence;


pub use dictionary::{DictionaryConfig, DictionaryConfigBuilder};
pub use sequence::{SequenceConfig, SequenceConfigBuilder};

/// Default prefix for environment variables.
pub const ENV_PREFIX: &str = "POLYSEQ_";

/// Shared behaviour of the configuration structs.
pub trait Config: Clone + fmt::Debug {
    /// Check every field, reporting all violations at once.
    fn validate(&self) -> Result<()>;

    /// Defaults overridden by `POLYSEQ_`-prefixed variables, e.g.
    /// `POLYSEQ_SEQUENCE_KIND=deque`.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Like [`Config::from_env`] with another prefix. Unset or unparsable
    /// variables keep their defaults; the result is validated.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Larger up-front capacity.
    fn performance_preset() -> Self;

    /// Smallest footprint.
    fn memory_preset() -> Self;

    /// Capacity reserved up front so steady-state operations do not grow.
    fn realtime_preset() -> Self;

    /// The defaults.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Write as pretty-printed JSON.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Read JSON and validate it.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// One rejected field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Field name
    pub field: String,
    /// Rejected value, rendered
    pub value: String,
    /// What the field requires
    pub reason: String,
    /// Example of an accepted value
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Rejection of `value` for `field`.
    pub fn new(field: &str, value: &str, reason: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
            suggestion: None,
        }
    }

    /// Attach an accepted example.
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}: {}", self.field, self.value, self.reason)?;
        match &self.suggestion {
            Some(suggestion) => write!(f, " ({})", suggestion),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Fold collected validation errors into one configuration error.
pub(crate) fn check(component: &str, errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(PolyseqError::configuration(format!(
        "{} configuration validation failed: {}",
        component,
        errors
            .into_iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    )))
}

/// Parse an environment variable, falling back to `default` when it is
/// unset or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse an optional environment variable, `None` when unset or unparsable.
pub fn parse_env_opt<T: std::str::FromStr>(var_name: &str) -> Option<T> {
    env::var(var_name).ok().and_then(|s| s.trim().parse().ok())
}

/// Boolean environment variable: "true", "1", "yes" or "on" in any case
/// is true, anything else false, unset is `default`.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}

pub(crate) fn write_json<T: serde::Serialize, P: AsRef<Path>>(
    value: &T,
    path: P,
    what: &str,
) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value).map_err(|e| {
        PolyseqError::configuration(format!("Failed to serialize {} config: {}", what, e))
    })?;

    std::fs::write(path, serialized).map_err(|e| {
        PolyseqError::configuration(format!("Failed to write {} config file: {}", what, e))
    })
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned, P: AsRef<Path>>(
    path: P,
    what: &str,
) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PolyseqError::configuration(format!("Failed to read {} config file: {}", what, e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        PolyseqError::configuration(format!("Failed to parse {} config file: {}", what, e))
    })
}
