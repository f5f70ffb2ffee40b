use tracing::{debug, warn};

use crate::config::{MotionLimits, ProfileConfig};
use crate::error::{ensure_finite, MotionError};
use crate::segment::{MotionState, Segment};

/// Ordered constant-jerk phases covering a whole move in the normalized
/// (forward, zero-based) frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SCurveResult {
    /// Contiguous phases, first `t_start == 0`. Empty for a degenerate move.
    pub phases: Vec<Segment>,
    /// Final-position drift that was removed by snapping the last phase.
    pub position_error: f64,
}

impl SCurveResult {
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Total time covered by all phases.
    pub fn duration(&self) -> f64 {
        match (self.phases.first(), self.phases.last()) {
            (Some(first), Some(last)) => last.t_end - first.t_start,
            _ => 0.0,
        }
    }
}

/// Seven-segment jerk-limited S-curve solver.
///
/// The canonical phases are:
///  T1 jerk up, T2 constant acceleration, T3 jerk down,
///  T4 cruise,
///  T5 jerk down, T6 constant deceleration, T7 jerk up.
///
/// An extra leading phase is inserted when the initial acceleration opposes the
/// direction of travel.
pub struct SCurveGenerator;

impl SCurveGenerator {
    /// Phases shorter than this are omitted from the output.
    pub const MIN_PHASE_DURATION: f64 = 1e-6;

    /// Final-position drift above this is reported with a warning.
    pub const DRIFT_WARNING: f64 = 1e-3;

    // Velocity changes below this need no acceleration phases
    const DV_MIN: f64 = 1e-6;

    // Initial acceleration below this is treated as zero
    const A_MIN: f64 = 1e-6;

    // Relative slack when checking boundary velocities against the limit
    const V_SLACK: f64 = 1e-9;

    /// Computes the phases moving `distance` forward from velocity `v0` with
    /// acceleration `a0` to velocity `v1` and zero acceleration.
    ///
    /// # Detailed explanation of the logic:
    ///
    /// 1. **Initial acceleration correction**. If `a0` is negative (opposing travel)
    ///    one phase of `+jerk` brings it to zero first. Positive `a0` is folded into
    ///    the acceleration phases instead.
    ///
    /// 2. **Feasibility**. Distance needed to reach `max_velocity` and come back down
    ///    to `v1`. If it fits, the leftover distance is covered by a cruise phase.
    ///
    /// 3. **Bisection**. Otherwise the peak velocity is searched in `[min(v0, v1), max_velocity]`
    ///    until accel + decel distance matches the remaining distance.
    ///
    /// 4. **Expansion**. T1..T7 are integrated forward into segments, skipping empty phases.
    ///
    /// 5. **Snap**. The last phase ends exactly at `distance` with velocity `v1`.
    pub fn generate(
        distance: f64,           // travel distance, >= 0
        v0: f64,                 // initial velocity
        a0: f64,                 // initial acceleration
        v1: f64,                 // exit velocity
        limits: &MotionLimits,   // velocity / acceleration / jerk limits
        config: &ProfileConfig,  // solver parameters
    ) -> Result<SCurveResult, MotionError> {
        limits.validate()?;
        config.validate()?;
        Self::validate_goal(distance, v0, a0, v1, limits.max_velocity)?;

        let v_max = limits.max_velocity;
        let a_max = limits.max_acceleration;
        let j_max = limits.jerk;

        if distance == 0.0 && (v1 - v0).abs() < Self::DV_MIN && a0.abs() <= Self::A_MIN {
            debug!("degenerate move, no phases generated");
            return Ok(SCurveResult::default());
        }

        let mut phases = Vec::with_capacity(8);
        let mut state = MotionState::new(0.0, v0, a0);

        // 1) Bring an opposing initial acceleration to zero
        if a0.abs() > Self::A_MIN && a0 < 0.0 {
            let t_init = a0.abs() / j_max;
            let j_init = -a0.signum() * j_max;
            Self::push_phase(&mut phases, &mut state, j_init, t_init);
        }

        let v_start = state.velocity;
        let a_start = state.acceleration;
        let x_remaining = distance - state.position;

        // 2) Can the velocity limit be reached within the remaining distance?
        let dist_full = Self::distance_for_v_peak(v_start, v1, v_max, a_max, j_max, a_start);

        let (v_peak, t_cruise) = if dist_full <= x_remaining {
            let leftover = x_remaining - dist_full;
            let t4 = (leftover / v_max).max(0.0);
            debug!(dist_full, t4, "velocity limit reachable, cruising");
            (v_max, t4)
        } else {
            // 3) Fit the peak velocity by bisection
            let v_peak = Self::fit_v_peak(
                x_remaining,
                (v_start, v1),
                a_start,
                limits,
                config.distance_tolerance,
                config.max_solver_iterations,
            );
            debug!(dist_full, v_peak, "velocity limit unreachable, peak velocity fitted");
            (v_peak, 0.0)
        };

        // 4) Expand the canonical phases
        let [t1, t2, t3] = Self::accel_times_tri_or_trap(v_start, v_peak, a_max, j_max, a_start);
        let [t5, t6, t7] = Self::decel_times_tri_or_trap(v_peak, v1, a_max, j_max);

        let canonical = [
            (j_max, t1),
            (0.0, t2),
            (-j_max, t3),
            (0.0, t_cruise),
            (-j_max, t5),
            (0.0, t6),
            (j_max, t7),
        ];
        for (jerk, duration) in canonical {
            if duration > Self::MIN_PHASE_DURATION {
                Self::push_phase(&mut phases, &mut state, jerk, duration);
            }
        }

        // 5) Snap the final state onto the target
        let mut position_error = 0.0;
        if let Some(last) = phases.last_mut() {
            position_error = (last.x_end - distance).abs();
            if position_error > Self::DRIFT_WARNING {
                warn!(position_error, distance, "s-curve final position drift");
            }
            last.x_end = distance;
            last.v_end = v1;
        }

        debug!(
            phases = phases.len(),
            v_peak,
            position_error,
            "s-curve phases generated"
        );
        Ok(SCurveResult {
            phases,
            position_error,
        })
    }

    fn validate_goal(distance: f64, v0: f64, a0: f64, v1: f64, v_max: f64) -> Result<(), MotionError> {
        ensure_finite("distance", distance)?;
        if distance < 0.0 {
            return Err(MotionError::invalid(
                "distance",
                distance,
                "must be >= 0, normalize the direction first",
            ));
        }
        ensure_finite("a0", a0)?;
        let v_bound = v_max * (1.0 + Self::V_SLACK);
        for (name, v) in [("v0", v0), ("v1", v1)] {
            ensure_finite(name, v)?;
            if v.abs() > v_bound {
                return Err(MotionError::invalid(name, v, "exceeds max_velocity"));
            }
        }
        Ok(())
    }

    /// Appends one constant-jerk phase and advances `state` to its end.
    fn push_phase(phases: &mut Vec<Segment>, state: &mut MotionState, jerk: f64, duration: f64) {
        let t_start = phases.last().map_or(0.0, |p| p.t_end);
        let segment = Segment::integrate(*state, jerk, duration, t_start);
        *state = segment.end_state();
        phases.push(segment);
    }

    /// Bisection for the peak velocity whose accel + decel distance equals `ds`.
    fn fit_v_peak(
        ds: f64,               // remaining distance
        v: (f64, f64),         // (start_velocity, exit_velocity)
        a0: f64,               // acceleration at start
        limits: &MotionLimits, // limits
        epsilon: f64,          // distance accuracy
        max_iterations: u32,
    ) -> f64 {
        let mut lower = v.0.min(v.1);
        let mut upper = limits.max_velocity;

        for _ in 0..max_iterations {
            let mid = 0.5 * (lower + upper);
            let d_mid = Self::distance_for_v_peak(
                v.0,
                v.1,
                mid,
                limits.max_acceleration,
                limits.jerk,
                a0,
            );
            if d_mid > ds {
                upper = mid;
            } else {
                lower = mid;
            }
            if (d_mid - ds).abs() < epsilon {
                break;
            }
        }
        0.5 * (lower + upper)
    }

    /// Phase times (T1, T2, T3) to accelerate from `v_start` to `v_end`,
    /// starting with acceleration `a0` and ending with zero acceleration.
    ///
    /// Triangular when the two jerk ramps alone overshoot the velocity change,
    /// trapezoidal (with a plateau at `a_max`) otherwise.
    fn accel_times_tri_or_trap(v_start: f64, v_end: f64, a_max: f64, j_max: f64, a0: f64) -> [f64; 3] {
        let dv = v_end - v_start;
        if dv < Self::DV_MIN {
            return [0.0; 3]; // no acceleration needed
        }

        let t_j_corrected = (a_max - a0.abs()) / j_max;
        let dv_j_corrected = a0.abs() * t_j_corrected + 0.5 * j_max * t_j_corrected.powi(2);

        let t_j_full = a_max / j_max;
        let dv_j_full = 0.5 * a_max * t_j_full;

        if dv_j_corrected + dv_j_full > dv {
            // Triangular: peak acceleration a_p satisfies (2*a_p^2 - a0^2) / (2*j) = dv
            let a_peak = (j_max * dv + 0.5 * a0 * a0).sqrt().max(a0);
            let t1 = ((a_peak - a0) / j_max).max(0.0);
            let t3 = a_peak / j_max;
            [t1, 0.0, t3]
        } else {
            // Trapezoidal
            let dv_left = dv - (dv_j_corrected + dv_j_full);
            [t_j_corrected, dv_left / a_max, t_j_full]
        }
    }

    /// Phase times (T5, T6, T7) to decelerate from `v_start` to `v_end`
    /// with zero acceleration at both ends.
    fn decel_times_tri_or_trap(v_start: f64, v_end: f64, a_max: f64, j_max: f64) -> [f64; 3] {
        let dv = v_start - v_end;
        if dv < Self::DV_MIN {
            return [0.0; 3]; // no deceleration needed
        }

        let t_j = a_max / j_max;
        let dv_j = 0.5 * a_max * t_j;

        if 2.0 * dv_j > dv {
            // Triangular
            let t5 = (dv / j_max).sqrt();
            [t5, 0.0, t5]
        } else {
            // Trapezoidal
            let dv_left = dv - 2.0 * dv_j;
            [t_j, dv_left / a_max, t_j]
        }
    }

    /// Distance to accelerate `v0 -> v_peak` and decelerate `v_peak -> v1`.
    fn distance_for_v_peak(v0: f64, v1: f64, v_peak: f64, a_max: f64, j_max: f64, a0: f64) -> f64 {
        let [t1, t2, t3] = Self::accel_times_tri_or_trap(v0, v_peak, a_max, j_max, a0);
        let [t5, t6, t7] = Self::decel_times_tri_or_trap(v_peak, v1, a_max, j_max);

        let dist_acc = Self::calc_travel(
            MotionState::new(0.0, v0, a0),
            [(j_max, t1), (0.0, t2), (-j_max, t3)],
        );
        let dist_dec = Self::calc_travel(
            MotionState::new(0.0, v_peak, 0.0),
            [(-j_max, t5), (0.0, t6), (j_max, t7)],
        );
        dist_acc + dist_dec
    }

    /// Distance covered by chaining constant-jerk `(jerk, time)` phases from `start`.
    fn calc_travel(start: MotionState, phases: [(f64, f64); 3]) -> f64 {
        phases
            .iter()
            .fold(start, |state, &(jerk, t)| state.integrate(jerk, t))
            .position
            - start.position
    }
}
