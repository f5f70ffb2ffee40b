use crate::error::{ensure_positive, MotionError};

/// Kinematic limits of one axis. All values are absolute magnitudes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionLimits {
    /// Velocity that must never be exceeded.
    pub max_velocity: f64,
    /// Acceleration that must never be exceeded.
    pub max_acceleration: f64,
    /// Jerk used during every ramp phase.
    pub jerk: f64,
}

impl Default for MotionLimits {
    fn default() -> Self {
        MotionLimits {
            max_velocity: 5.0,
            max_acceleration: 2.0,
            jerk: 5.0,
        }
    }
}

impl MotionLimits {
    pub fn new(max_velocity: f64, max_acceleration: f64, jerk: f64) -> Self {
        MotionLimits {
            max_velocity,
            max_acceleration,
            jerk,
        }
    }

    /// Every limit must be finite and strictly positive, since the solver divides by them.
    pub fn validate(&self) -> Result<(), MotionError> {
        ensure_positive("max_velocity", self.max_velocity)?;
        ensure_positive("max_acceleration", self.max_acceleration)?;
        ensure_positive("jerk", self.jerk)?;
        Ok(())
    }
}

/// Solver and sampling parameters passed into every profile generation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileConfig {
    /// Bisection depth used when the velocity limit is unreachable.
    pub max_solver_iterations: u32,
    /// Number of times the phase samples are bisected before fitting curves.
    pub subdivisions: u32,
    /// Build the sampled curves used by `SCurve::evaluate_curves`.
    pub create_curves: bool,
    /// Distance accuracy at which the bisection stops early.
    pub distance_tolerance: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            max_solver_iterations: 60,
            subdivisions: 3,
            create_curves: true,
            distance_tolerance: 1e-6,
        }
    }
}

impl ProfileConfig {
    /// Sample count doubles per subdivision, so the depth is capped.
    pub const MAX_SUBDIVISIONS: u32 = 8;

    pub fn validate(&self) -> Result<(), MotionError> {
        if self.max_solver_iterations == 0 {
            return Err(MotionError::invalid(
                "max_solver_iterations",
                0.0,
                "must be at least 1",
            ));
        }
        if self.subdivisions > Self::MAX_SUBDIVISIONS {
            return Err(MotionError::invalid(
                "subdivisions",
                self.subdivisions as f64,
                "exceeds ProfileConfig::MAX_SUBDIVISIONS",
            ));
        }
        ensure_positive("distance_tolerance", self.distance_tolerance)?;
        Ok(())
    }

    pub fn with_subdivisions(mut self, subdivisions: u32) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    pub fn with_max_solver_iterations(mut self, iterations: u32) -> Self {
        self.max_solver_iterations = iterations;
        self
    }

    pub fn with_curves(mut self, create_curves: bool) -> Self {
        self.create_curves = create_curves;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MotionLimits::default().validate().is_ok());
        assert!(ProfileConfig::default().validate().is_ok());
    }

    #[rstest]
    #[case(MotionLimits::new(0.0, 2.0, 5.0), "max_velocity")]
    #[case(MotionLimits::new(5.0, -2.0, 5.0), "max_acceleration")]
    #[case(MotionLimits::new(5.0, 2.0, f64::NAN), "jerk")]
    fn test_invalid_limits(#[case] limits: MotionLimits, #[case] expected: &str) {
        match limits.validate() {
            Err(MotionError::InvalidArgument { name, .. }) => assert_eq!(name, expected),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_subdivisions_capped() {
        let config = ProfileConfig::default().with_subdivisions(ProfileConfig::MAX_SUBDIVISIONS + 1);
        assert!(config.validate().is_err());
        let config = ProfileConfig::default().with_max_solver_iterations(0);
        assert!(config.validate().is_err());
    }
}
