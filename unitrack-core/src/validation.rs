//! Validation error types

use std::fmt;

/// Validation error for domain input
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., country code)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Invalid enum variant
    InvalidVariant { field: &'static str, value: String },

    /// Numeric value outside the allowed range
    OutOfRange { field: &'static str, min: f64, max: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::OutOfRange { field, min, max } => {
                write!(f, "{} must be between {} and {}", field, min, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check an optional numeric field against an inclusive range.
pub(crate) fn check_range<T>(field: &'static str, value: Option<T>, min: T, max: T) -> Result<(), ValidationError>
where
    T: PartialOrd + Copy + Into<f64>,
{
    match value {
        Some(v) if v < min || v > max => Err(ValidationError::OutOfRange {
            field,
            min: min.into(),
            max: max.into(),
        }),
        _ => Ok(()),
    }
}
