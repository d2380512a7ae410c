//! Construction-time errors for spatial processors.
//!
//! Every check happens before the first sample is processed. Once a
//! processor exists, its audio path cannot fail.

use thiserror::Error;

/// Errors raised while building a spatial processor.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SpatialError {
    /// Ambisonic order outside the supported range.
    #[error("ambisonic order {order} outside [0, {max}]")]
    InvalidOrder {
        /// Requested order.
        order: i64,
        /// Largest supported order.
        max: usize,
    },

    /// Speaker layout with too few entries.
    #[error("speaker layout needs at least {min} entries, got {len}")]
    LayoutTooSmall {
        /// Number of speakers supplied.
        len: usize,
        /// Minimum number of speakers.
        min: usize,
    },

    /// Speaker angle is NaN or infinite.
    #[error("speaker angle at index {index} is not finite")]
    NonFiniteAngle {
        /// Position of the offending angle in the layout.
        index: usize,
    },

    /// Distribution selector outside [0, 21].
    #[error("distribution selector {0} outside [0, 21]")]
    InvalidDistribution(i64),

    /// Optimization selector outside [0, 2].
    #[error("optimization selector {0} outside [0, 2]")]
    InvalidOptimMode(i64),

    /// Direction flag other than +1 / -1.
    #[error("direction must be +1 or -1, got {0}")]
    InvalidDirection(i64),

    /// Non-positive or non-finite sample rate.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// Zero-length delay line.
    #[error("maximum delay must be at least one sample")]
    InvalidDelay,

    /// Two stages disagree on channel count.
    #[error("channel mismatch: expected {expected}, got {actual}")]
    ChannelMismatch {
        /// Channels the consumer expects.
        expected: usize,
        /// Channels the producer delivers.
        actual: usize,
    },
}

impl From<abc_core::ChannelMismatch> for SpatialError {
    fn from(e: abc_core::ChannelMismatch) -> Self {
        SpatialError::ChannelMismatch {
            expected: e.expected,
            actual: e.actual,
        }
    }
}

/// Result type for spatial construction.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Reject non-positive or non-finite sample rates.
pub(crate) fn check_sample_rate(sample_rate: f32) -> SpatialResult<f32> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(sample_rate)
    } else {
        Err(SpatialError::InvalidSampleRate(sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = SpatialError::LayoutTooSmall { len: 1, min: 2 };
        assert_eq!(
            err.to_string(),
            "speaker layout needs at least 2 entries, got 1"
        );
        assert_eq!(
            SpatialError::InvalidDistribution(22).to_string(),
            "distribution selector 22 outside [0, 21]"
        );
        assert_eq!(
            SpatialError::InvalidOrder { order: -1, max: 16 }.to_string(),
            "ambisonic order -1 outside [0, 16]"
        );
    }

    #[test]
    fn channel_mismatch_converts() {
        let err = SpatialError::from(abc_core::ChannelMismatch {
            expected: 5,
            actual: 3,
        });
        assert_eq!(
            err,
            SpatialError::ChannelMismatch {
                expected: 5,
                actual: 3
            }
        );
    }

    #[test]
    fn sample_rate_validation() {
        assert_eq!(check_sample_rate(48000.0), Ok(48000.0));
        assert!(check_sample_rate(0.0).is_err());
        assert!(check_sample_rate(f32::NAN).is_err());
    }
}
