//! Error handling for the polyseq library
//!
//! Every fallible operation returns a [`Result`] carrying a [`PolyseqError`].
//! Failed operations leave the structure they were called on unchanged.

use thiserror::Error;

/// Main error type for the polyseq library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyseqError {
    /// Index outside `[-len, len)`
    #[error("Out of range: index {index}, length {len}")]
    OutOfRange {
        /// The index as passed by the caller
        index: isize,
        /// The length of the sequence at the time of the call
        len: usize,
    },

    /// Removal or inspection of an element from an empty structure
    #[error("Empty: cannot {operation} on an empty sequence")]
    Empty {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// No element satisfied the lookup
    #[error("Not found: {what}")]
    NotFound {
        /// Description of what was looked for
        what: String,
    },

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Requested growth exceeds the index-range limit
    #[error("Too big: requested {requested} elements, limit {limit}")]
    TooBig {
        /// Number of elements requested
        requested: usize,
        /// Largest number of elements allowed
        limit: usize,
    },

    /// Argument rejected before any state was touched
    #[error("Bad argument: {message}")]
    BadArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// A structural invariant check failed
    #[error("Corrupted structure: {message}")]
    Corrupted {
        /// Which invariant failed
        message: String,
    },

    /// The entropy source could not supply seed bytes
    #[error("Entropy unavailable: {message}")]
    Entropy {
        /// Message from the entropy source
        message: String,
    },
}

impl PolyseqError {
    /// Create an out of range error
    pub fn out_of_range(index: isize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Create an empty error
    pub fn empty(operation: &'static str) -> Self {
        Self::Empty { operation }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create a too big error
    pub fn too_big(requested: usize, limit: usize) -> Self {
        Self::TooBig { requested, limit }
    }

    /// Create a bad argument error
    pub fn bad_argument<S: Into<String>>(message: S) -> Self {
        Self::BadArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a corrupted structure error
    pub fn corrupted<S: Into<String>>(message: S) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Create an entropy error
    pub fn entropy<S: Into<String>>(message: S) -> Self {
        Self::Entropy {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors may succeed when retried after the caller frees
    /// memory or the environment changes.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::OutOfMemory { .. } => true,
            Self::Entropy { .. } => true,
            Self::OutOfRange { .. } => false,
            Self::Empty { .. } => false,
            Self::NotFound { .. } => false,
            Self::TooBig { .. } => false,
            Self::BadArgument { .. } => false,
            Self::Configuration { .. } => false,
            Self::Corrupted { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "range",
            Self::Empty { .. } => "empty",
            Self::NotFound { .. } => "lookup",
            Self::OutOfMemory { .. } => "memory",
            Self::TooBig { .. } => "capacity",
            Self::BadArgument { .. } => "argument",
            Self::Configuration { .. } => "config",
            Self::Corrupted { .. } => "invariant",
            Self::Entropy { .. } => "entropy",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PolyseqError>;

/// Resolve a possibly negative index against `len`.
///
/// Negative indices count from the end, so `-1` is the last element.
/// Anything outside `[-len, len)` is an [`PolyseqError::OutOfRange`].
#[inline]
pub fn resolve_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index as usize)
    };
    match resolved {
        Some(i) if i < len => Ok(i),
        _ => Err(PolyseqError::out_of_range(index, len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PolyseqError::bad_argument("capacity 12 is not a power of two");
        assert_eq!(err.category(), "argument");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_resolve_positive_indices() {
        assert_eq!(resolve_index(0, 3), Ok(0));
        assert_eq!(resolve_index(2, 3), Ok(2));
        assert!(resolve_index(3, 3).is_err());
        assert!(resolve_index(0, 0).is_err());
    }

    #[test]
    fn test_resolve_negative_indices() {
        assert_eq!(resolve_index(-1, 3), Ok(2));
        assert_eq!(resolve_index(-3, 3), Ok(0));
        assert_eq!(
            resolve_index(-4, 3),
            Err(PolyseqError::OutOfRange { index: -4, len: 3 })
        );
        assert!(resolve_index(isize::MIN, 3).is_err());
        assert!(resolve_index(-1, 0).is_err());
    }

    #[test]
    fn test_all_error_types() {
        let range_err = PolyseqError::out_of_range(5, 3);
        assert_eq!(range_err.category(), "range");
        assert!(!range_err.is_recoverable());

        let empty_err = PolyseqError::empty("pop");
        assert_eq!(empty_err.category(), "empty");
        assert!(!empty_err.is_recoverable());

        let missing = PolyseqError::not_found("matching element");
        assert_eq!(missing.category(), "lookup");

        let memory_err = PolyseqError::out_of_memory(1024);
        assert_eq!(memory_err.category(), "memory");
        assert!(memory_err.is_recoverable());

        let big_err = PolyseqError::too_big(1 << 40, u32::MAX as usize);
        assert_eq!(big_err.category(), "capacity");
        assert!(!big_err.is_recoverable());

        let config_err = PolyseqError::configuration("max_capacity must be at least 1");
        assert_eq!(config_err.category(), "config");

        let corrupt = PolyseqError::corrupted("size 3 != occupancy 2");
        assert_eq!(corrupt.category(), "invariant");

        let entropy_err = PolyseqError::entropy("no entropy device");
        assert!(entropy_err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = PolyseqError::out_of_range(-7, 5);
        let display = format!("{}", err);
        assert!(display.contains("Out of range"));
        assert!(display.contains("-7"));
        assert!(display.contains("5"));

        let empty = PolyseqError::empty("shift");
        assert!(format!("{}", empty).contains("shift"));

        let big = PolyseqError::too_big(10, 8);
        let big_display = format!("{}", big);
        assert!(big_display.contains("Too big"));
        assert!(big_display.contains("10"));
    }

    #[test]
    fn test_error_debug() {
        let err = PolyseqError::bad_argument("debug test");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("BadArgument"));
        assert!(debug_str.contains("debug test"));
    }
}
