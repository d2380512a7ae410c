//! Rig validation.
//!
//! Checks every field of a [`RigConfig`](crate::RigConfig) against the ranges
//! the spatial processors accept and reports all problems at once.
//!
//! # Example
//!
//! ```rust
//! use abc_config::{RigConfig, ValidationError};
//!
//! let mut rig = RigConfig::default();
//! rig.order = 40;
//! rig.optimization = "loud".to_string();
//!
//! match rig.validate() {
//!     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
//!     other => panic!("expected two errors, got {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric field outside its accepted range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field, e.g. `diffusion.feedback`.
        field: String,
        /// The rejected value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Field whose value is not one of the recognised names or shapes.
    #[error("invalid '{field}' = {value}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: String,
        /// The rejected value, as written.
        value: String,
        /// Description of what is wrong.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl ValidationError {
    /// Shorthand for [`ValidationError::OutOfRange`].
    pub fn out_of_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    /// Shorthand for [`ValidationError::Invalid`].
    pub fn invalid(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Number of individual problems this error stands for.
    pub fn count(&self) -> usize {
        match self {
            ValidationError::Multiple(errors) => errors.len(),
            _ => 1,
        }
    }
}

/// Collects problems and folds them into one result.
#[derive(Debug, Default)]
pub(crate) struct Problems(Vec<ValidationError>);

impl Problems {
    pub(crate) fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Record an error when `value` lies outside `[min, max]` or is not finite.
    pub(crate) fn range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() || value < min || value > max {
            self.push(ValidationError::out_of_range(field, value, min, max));
        }
    }

    /// Record an error when `value` is not finite.
    pub(crate) fn finite(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(ValidationError::invalid(field, value, "must be finite"));
        }
    }

    pub(crate) fn finish(mut self) -> ValidationResult<()> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(ValidationError::Multiple(self.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_problems_are_ok() {
        assert_eq!(Problems::default().finish(), Ok(()));
    }

    #[test]
    fn single_problem_is_not_wrapped() {
        let mut p = Problems::default();
        p.range("order", 20.0, 0.0, 16.0);
        let err = p.finish().unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
        assert_eq!(err.count(), 1);
    }

    #[test]
    fn several_problems_are_collected() {
        let mut p = Problems::default();
        p.range("a", -1.0, 0.0, 1.0);
        p.range("b", 0.5, 0.0, 1.0);
        p.finite("c", f64::NAN);
        let err = p.finish().unwrap_err();
        assert_eq!(err.count(), 2);
        let msg = err.to_string();
        assert!(msg.contains("'a' value -1"), "{msg}");
        assert!(msg.contains("invalid 'c' = NaN"), "{msg}");
    }

    #[test]
    fn range_rejects_nan() {
        let mut p = Problems::default();
        p.range("x", f64::NAN, 0.0, 1.0);
        assert!(p.finish().is_err());
    }

    #[test]
    fn invalid_display() {
        let err = ValidationError::invalid("dimension", "cubic", "expected planar or spherical");
        assert_eq!(
            err.to_string(),
            "invalid 'dimension' = cubic: expected planar or spherical"
        );
    }
}
