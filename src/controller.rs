use tracing::{debug, trace};

use crate::config::{MotionLimits, ProfileConfig};
use crate::error::{ensure_finite, ensure_positive, MotionError};
use crate::scurve::SCurve;
use crate::segment::MotionState;

/// SmoothMotion drives one axis along jerk-limited profiles, one fixed
/// simulation tick at a time.
///
/// The controller is idle until the first `set_target`. Every new target replaces
/// the active profile immediately (no blending), starting from the current state.
#[derive(Clone, Debug)]
pub struct SmoothMotion {
    /// Limits used for every generated profile
    limits: MotionLimits,

    /// Solver and sampling parameters
    config: ProfileConfig,

    /// Time added by each `integrate` call, in seconds
    fixed_time_step: f64,

    /// Playback speed multiplier applied on top of the duration scale
    speed_override: f64,

    /// Position tolerance for `is_at_target`
    target_tolerance: f64,

    /// Active profile, `None` while idle
    profile: Option<SCurve>,

    /// The current instantaneous state
    state: MotionState,

    /// Requested destination
    target_state: MotionState,

    /// Local time since the last `set_target`
    time: f64,

    /// Re-timing factor: profile time = local time / duration_scale
    duration_scale: f64,
}

impl Default for SmoothMotion {
    fn default() -> Self {
        Self {
            limits: MotionLimits::default(),
            config: ProfileConfig::default(),
            fixed_time_step: Self::DEFAULT_FIXED_TIME_STEP,
            speed_override: 1.0,
            target_tolerance: Self::DEFAULT_TARGET_TOLERANCE,
            profile: None,
            state: MotionState::default(),
            target_state: MotionState::default(),
            time: 0.0,
            duration_scale: 1.0,
        }
    }
}

impl SmoothMotion {
    /// Default simulation tick, 50 Hz.
    pub const DEFAULT_FIXED_TIME_STEP: f64 = 0.02;

    /// Default position tolerance of `is_at_target`.
    pub const DEFAULT_TARGET_TOLERANCE: f64 = 1e-6;

    /// Creates an idle controller with validated limits and solver parameters.
    pub fn new(limits: MotionLimits, config: ProfileConfig) -> Result<Self, MotionError> {
        limits.validate()?;
        config.validate()?;
        Ok(Self {
            limits,
            config,
            ..Self::default()
        })
    }

    /// Sets the tick length used by `integrate`.
    pub fn with_fixed_time_step(mut self, step: f64) -> Result<Self, MotionError> {
        self.fixed_time_step = ensure_positive("fixed_time_step", step)?;
        Ok(self)
    }

    /// Sets the position tolerance used by `is_at_target`.
    pub fn with_target_tolerance(mut self, tolerance: f64) -> Result<Self, MotionError> {
        let tolerance = ensure_finite("target_tolerance", tolerance)?;
        if tolerance < 0.0 {
            return Err(MotionError::invalid(
                "target_tolerance",
                tolerance,
                "must be >= 0",
            ));
        }
        self.target_tolerance = tolerance;
        Ok(self)
    }

    /// Plans a new profile from the current state to `position` / `velocity`
    /// with zero final acceleration. Resets local time and duration scale.
    ///
    /// On error the previous profile stays active.
    pub fn set_target(&mut self, position: f64, velocity: f64) -> Result<(), MotionError> {
        let target = MotionState::new(position, velocity, 0.0);
        let profile = SCurve::generate(self.state, target, &self.limits, &self.config)?;
        debug!(
            from = self.state.position,
            to = position,
            duration = profile.duration(),
            phases = profile.phases().len(),
            "new motion target"
        );

        self.target_state = target;
        self.profile = Some(profile);
        self.time = 0.0;
        self.duration_scale = 1.0;
        Ok(())
    }

    /// Advances local time by one fixed tick and samples the profile.
    ///
    /// `_dt` is ignored: profiles assume a constant step, so the caller must call
    /// this exactly once per fixed simulation tick of `fixed_time_step` seconds.
    /// Returns `false` while idle.
    pub fn integrate(&mut self, _dt: f64) -> bool {
        let profile = match &self.profile {
            Some(profile) => profile,
            None => return false,
        };

        self.time += self.fixed_time_step;
        let t = self.time / self.duration_scale * self.speed_override;
        self.state = profile.evaluate_curves(t);

        trace!(
            time = self.time,
            profile_time = t,
            position = self.state.position,
            velocity = self.state.velocity,
            "motion tick"
        );
        true
    }

    /// Stretches or compresses the active profile to last `duration` seconds
    /// without re-planning it.
    pub fn adjust_duration(&mut self, duration: f64) -> Result<(), MotionError> {
        ensure_positive("duration", duration)?;
        let profile = self.profile.as_ref().ok_or(MotionError::NoProfile)?;
        if profile.duration() <= 0.0 {
            return Err(MotionError::ZeroDuration);
        }
        self.duration_scale = duration / profile.duration();
        Ok(())
    }

    // -----------------------------------------------------------------
    //  Setter methods
    // -----------------------------------------------------------------

    pub fn set_initial_position(&mut self, position: f64) {
        self.state.position = position;
    }

    pub fn set_initial_velocity(&mut self, velocity: f64) {
        self.state.velocity = velocity;
    }

    pub fn set_initial_acceleration(&mut self, acceleration: f64) {
        self.state.acceleration = acceleration;
    }

    /// Playback speed multiplier, `1.0` is nominal. Zero freezes the motion.
    pub fn set_speed_override(&mut self, speed_override: f64) -> Result<(), MotionError> {
        let speed_override = ensure_finite("speed_override", speed_override)?;
        if speed_override < 0.0 {
            return Err(MotionError::invalid(
                "speed_override",
                speed_override,
                "must be >= 0",
            ));
        }
        self.speed_override = speed_override;
        Ok(())
    }

    /// New limits apply from the next `set_target`.
    pub fn set_limits(&mut self, limits: MotionLimits) -> Result<(), MotionError> {
        limits.validate()?;
        self.limits = limits;
        Ok(())
    }

    // -----------------------------------------------------------------
    //  Getter methods
    // -----------------------------------------------------------------

    pub fn get_position(&self) -> f64 {
        self.state.position
    }

    pub fn get_velocity(&self) -> f64 {
        self.state.velocity
    }

    pub fn get_acceleration(&self) -> f64 {
        self.state.acceleration
    }

    /// Duration of the active profile after re-timing, zero while idle.
    pub fn get_duration(&self) -> f64 {
        self.profile
            .as_ref()
            .map_or(0.0, |p| p.duration() * self.duration_scale)
    }

    /// Local time since the last `set_target`.
    pub fn get_time(&self) -> f64 {
        self.time
    }

    pub fn get_state(&self) -> MotionState {
        self.state
    }

    pub fn get_target_state(&self) -> MotionState {
        self.target_state
    }

    pub fn get_limits(&self) -> MotionLimits {
        self.limits
    }

    pub fn get_speed_override(&self) -> f64 {
        self.speed_override
    }

    pub fn get_duration_scale(&self) -> f64 {
        self.duration_scale
    }

    pub fn get_fixed_time_step(&self) -> f64 {
        self.fixed_time_step
    }

    pub fn profile(&self) -> Option<&SCurve> {
        self.profile.as_ref()
    }

    /// True when the position is within the target tolerance of the destination.
    pub fn is_at_target(&self) -> bool {
        (self.state.position - self.target_state.position).abs() <= self.target_tolerance
    }
}

/// Re-times every axis with a profile so that all of them finish together
/// with the slowest one. Returns the common duration, zero if no axis moves.
pub fn synchronize_durations(axes: &mut [SmoothMotion]) -> Result<f64, MotionError> {
    let longest = axes
        .iter()
        .map(SmoothMotion::get_duration)
        .fold(0.0, f64::max);
    if longest <= 0.0 {
        return Ok(0.0);
    }

    for axis in axes.iter_mut() {
        let moving = axis.profile().is_some_and(|p| p.duration() > 0.0);
        if moving {
            axis.adjust_duration(longest)?;
        }
    }
    debug!(axes = axes.len(), duration = longest, "axes synchronized");
    Ok(longest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Ticks until the profile (including re-timing) has elapsed, returns the tick count.
    fn run_to_end(motion: &mut SmoothMotion) -> usize {
        let step = motion.get_fixed_time_step();
        let ticks = (motion.get_duration() / motion.get_speed_override() / step).ceil() as usize + 1;
        for _ in 0..ticks {
            assert!(motion.integrate(step));
        }
        ticks
    }

    #[test]
    fn test_idle_controller_does_not_integrate() {
        let mut motion = SmoothMotion::default();
        assert!(!motion.integrate(0.02));
        assert_eq!(motion.get_time(), 0.0);
        assert_eq!(motion.get_duration(), 0.0);
        assert_eq!(motion.adjust_duration(1.0), Err(MotionError::NoProfile));
    }

    #[test]
    fn test_reaches_target() {
        let mut motion = SmoothMotion::default();
        motion.set_target(10.0, 0.0).unwrap();
        assert!(!motion.is_at_target());
        run_to_end(&mut motion);
        assert!(motion.is_at_target());
        assert_eq!(motion.get_position(), 10.0);
        assert_eq!(motion.get_velocity(), 0.0);
    }

    #[test]
    fn test_holds_moving_target_after_end() {
        let mut motion = SmoothMotion::default();
        motion.set_target(10.0, 2.0).unwrap();
        let ticks = (motion.get_duration() / motion.get_fixed_time_step()).ceil() as usize + 50;
        for _ in 0..ticks {
            assert!(motion.integrate(0.02));
        }
        assert!(motion.get_time() > motion.get_duration() + 0.5);
        assert_eq!(motion.get_state(), MotionState::new(10.0, 2.0, 0.0));
        assert!(motion.is_at_target());

        for _ in 0..100 {
            motion.integrate(0.02);
        }
        assert_eq!(motion.get_position(), 10.0);
        assert!(motion.is_at_target());
    }

    #[rstest]
    #[case(0.02)]
    #[case(1.0)]
    #[case(0.0)]
    fn test_integrate_uses_fixed_step(#[case] dt: f64) {
        let mut motion = SmoothMotion::default();
        motion.set_target(1.0, 0.0).unwrap();
        motion.integrate(dt);
        assert_eq!(motion.get_time(), SmoothMotion::DEFAULT_FIXED_TIME_STEP);
    }

    #[test]
    fn test_adjust_duration_stretches_profile() {
        let mut reference = SmoothMotion::default();
        reference.set_target(10.0, 0.0).unwrap();
        let nominal = reference.get_duration();

        let mut slow = SmoothMotion::default();
        slow.set_target(10.0, 0.0).unwrap();
        slow.adjust_duration(2.0 * nominal).unwrap();
        assert!((slow.get_duration() - 2.0 * nominal).abs() < 1e-12);

        // after the same 40 ticks the stretched axis has covered less distance
        for _ in 0..40 {
            reference.integrate(0.02);
            slow.integrate(0.02);
        }
        assert!(slow.get_position() < reference.get_position());

        run_to_end(&mut slow);
        assert!(slow.is_at_target());
    }

    #[test]
    fn test_speed_override_halves_travel_time() {
        let mut motion = SmoothMotion::default();
        motion.set_speed_override(2.0).unwrap();
        motion.set_target(10.0, 0.0).unwrap();
        let ticks = run_to_end(&mut motion);
        assert!(motion.is_at_target());
        let nominal_ticks = (motion.get_duration() / 0.02).ceil() as usize + 1;
        assert!(ticks < nominal_ticks);
    }

    #[test]
    fn test_retarget_resets_time_and_scale() {
        let mut motion = SmoothMotion::default();
        motion.set_target(10.0, 0.0).unwrap();
        motion.adjust_duration(20.0).unwrap();
        for _ in 0..50 {
            motion.integrate(0.02);
        }
        let position = motion.get_position();
        motion.set_target(-5.0, 0.0).unwrap();
        assert_eq!(motion.get_time(), 0.0);
        assert_eq!(motion.get_duration_scale(), 1.0);
        let profile = motion.profile().unwrap();
        assert_eq!(profile.initial().position, position);
        run_to_end(&mut motion);
        assert!(motion.is_at_target());
    }

    #[test]
    fn test_initial_state_seeds_profile() {
        let mut motion = SmoothMotion::default();
        motion.set_initial_position(3.0);
        motion.set_initial_velocity(1.0);
        motion.set_target(8.0, 0.0).unwrap();
        let first = motion.profile().unwrap().phases()[0];
        assert_eq!(first.x_start, 3.0);
        assert_eq!(first.v_start, 1.0);
    }

    #[test]
    fn test_failed_target_keeps_previous_profile() {
        let mut motion = SmoothMotion::default();
        motion.set_target(10.0, 0.0).unwrap();
        let duration = motion.get_duration();
        assert!(motion.set_target(f64::NAN, 0.0).is_err());
        assert!(motion.set_target(20.0, 99.0).is_err());
        assert_eq!(motion.get_duration(), duration);
        assert_eq!(motion.get_target_state().position, 10.0);
    }

    #[test]
    fn test_zero_duration_profile_cannot_be_retimed() {
        let mut motion = SmoothMotion::default();
        motion.set_target(0.0, 0.0).unwrap();
        assert!(motion.is_at_target());
        assert!(motion.integrate(0.02));
        assert_eq!(motion.adjust_duration(1.0), Err(MotionError::ZeroDuration));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(SmoothMotion::new(MotionLimits::new(1.0, 0.0, 1.0), ProfileConfig::default()).is_err());
        assert!(SmoothMotion::default().with_fixed_time_step(0.0).is_err());
        assert!(SmoothMotion::default().with_target_tolerance(-1.0).is_err());
        assert!(SmoothMotion::default().set_speed_override(-1.0).is_err());
    }

    #[test]
    fn test_synchronize_durations() {
        let mut axes = vec![SmoothMotion::default(), SmoothMotion::default(), SmoothMotion::default()];
        axes[0].set_target(10.0, 0.0).unwrap();
        axes[1].set_target(2.0, 0.0).unwrap();
        // third axis stays idle

        let longest = synchronize_durations(&mut axes).unwrap();
        assert!((axes[0].get_duration() - longest).abs() < 1e-12);
        assert!((axes[1].get_duration() - longest).abs() < 1e-12);
        assert_eq!(axes[2].get_duration(), 0.0);

        let ticks = (longest / 0.02).ceil() as usize + 1;
        for _ in 0..ticks {
            for axis in axes.iter_mut() {
                axis.integrate(0.02);
            }
        }
        assert!(axes[0].is_at_target());
        assert!(axes[1].is_at_target());
    }
}
