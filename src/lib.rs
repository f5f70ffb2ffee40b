//! # smooth_motion
//!
//! Jerk-limited seven-segment S-curve motion planning for a single axis.
//!
//! This library provides the following modules:
//! - `segment` for the kinematic state and constant-jerk segment value types.
//! - `config` for motion limits and solver parameters.
//! - `scurve_generator` for solving the seven-phase breakdown of a move.
//! - `scurve` for the profile: exact and sampled evaluation at any time.
//! - `sampled_curve` for the Hermite curves behind fast profile evaluation.
//! - `controller` for the per-axis controller advanced once per fixed tick.
//! - `error` for the error type shared by all of the above.
//!
//! ```
//! use smooth_motion::{SmoothMotion, MotionLimits, ProfileConfig};
//!
//! let mut axis = SmoothMotion::new(MotionLimits::new(5.0, 2.0, 5.0), ProfileConfig::default())?;
//! axis.set_target(10.0, 0.0)?;
//! while axis.get_time() <= axis.get_duration() {
//!     axis.integrate(SmoothMotion::DEFAULT_FIXED_TIME_STEP);
//! }
//! assert!(axis.is_at_target());
//! # Ok::<(), smooth_motion::MotionError>(())
//! ```
//!
//! Author: Anton Khrustalev, creapunk

pub mod config;
pub mod error;
pub mod sampled_curve;
pub mod scurve;
pub mod scurve_generator;
pub mod segment;
pub mod controller;

// Re-export main structs for convenience:
pub use config::*;
pub use error::MotionError;
pub use sampled_curve::*;
pub use scurve::*;
pub use scurve_generator::*;
pub use segment::*;
pub use controller::*;
