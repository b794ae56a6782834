//! Error types for grid encoding and decoding.
//!
//! ## Error Categories
//!
//! - **Invalid Target**: The decode target is not a record type
//! - **Type Mismatches**: A non-empty cell could not be coerced to its field's scalar kind
//! - **Datetime Errors**: Timestamp text did not match the expected pattern, or a stored
//!   instant could not be read back while encoding
//! - **Unsupported Shapes**: Field kinds the layout model does not define
//!
//! Empty cells are never errors. Decoding is not transactional: when
//! [`crate::from_grid_into`] fails, fields visited before the failing one keep their
//! decoded values.
//!
//! ## Examples
//!
//! ```rust
//! use serde_sheet::Error;
//!
//! let err = Error::field_type_mismatch("num", "abc", "integer");
//! assert!(err.to_string().contains("num"));
//! assert!(err.to_string().contains("abc"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The decode target is not a writable record.
    #[error("Invalid decode target: {0}")]
    InvalidTarget(String),

    /// A grid cell cannot be coerced to the field's scalar kind.
    #[error("Type mismatch in field `{field}`: cannot parse {value:?} as {expected}")]
    FieldTypeMismatch {
        field: String,
        value: String,
        expected: String,
    },

    /// Timestamp text does not match the expected pattern.
    #[error("Datetime error in field `{field}`: {value:?} ({reason})")]
    DatetimeParse {
        field: String,
        value: String,
        reason: String,
    },

    /// A field kind the layout model does not define.
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Custom error raised through the serde bridge
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an invalid target error.
    pub fn invalid_target(msg: &str) -> Self {
        Error::InvalidTarget(msg.to_string())
    }

    /// Creates a type mismatch error naming the field and the raw cell text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_sheet::Error;
    ///
    /// let err = Error::field_type_mismatch("active", "maybe", "bool");
    /// assert!(err.to_string().contains("as bool"));
    /// ```
    pub fn field_type_mismatch(field: &str, value: &str, expected: &str) -> Self {
        Error::FieldTypeMismatch {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Creates a datetime parse error.
    pub fn datetime_parse<R: fmt::Display>(field: &str, value: &str, reason: R) -> Self {
        Error::DatetimeParse {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an unsupported shape error.
    pub fn unsupported_shape(msg: &str) -> Self {
        Error::UnsupportedShape(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
