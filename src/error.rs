use thiserror::Error;

/// Errors raised while planning or tracking a motion profile.
///
/// All variants are recoverable: the caller can retry with adjusted limits
/// or a different target.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// An input was not finite or outside its allowed range.
    #[error("invalid argument `{name}` = {value}: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The controller has no profile yet (`set_target` was never called).
    #[error("no motion profile generated yet")]
    NoProfile,

    /// The active profile has zero duration and cannot be re-timed.
    #[error("motion profile has zero duration")]
    ZeroDuration,
}

impl MotionError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        MotionError::InvalidArgument {
            name,
            value,
            reason,
        }
    }
}

/// Fails with `InvalidArgument` unless `value` is finite.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64, MotionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MotionError::invalid(name, value, "must be finite"))
    }
}

/// Fails with `InvalidArgument` unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64, MotionError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MotionError::invalid(name, value, "must be finite and > 0"))
    }
}
