use crate::config::{MotionLimits, ProfileConfig};
use crate::error::{ensure_finite, MotionError};
use crate::sampled_curve::{HermiteCurve, Keyframe};
use crate::scurve_generator::SCurveGenerator;
use crate::segment::{MotionState, Segment};

/// Densified curves of a profile, for cheap repeated evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampledCurves {
    pub position: HermiteCurve,
    pub velocity: HermiteCurve,
    pub acceleration: HermiteCurve,
    pub jerk: HermiteCurve,
}

/// One sample of the subdivided phase table.
#[derive(Clone, Copy, Debug)]
struct Sample {
    time: f64,
    state: MotionState,
    jerk: f64, // jerk of the phase starting at this sample
}

/// A jerk-limited motion profile between two kinematic states.
///
/// The profile is immutable once generated. Time runs from `0` to `duration`.
/// Past the end, exact evaluation coasts at the final velocity while curve
/// evaluation holds the target.
#[derive(Clone, Debug, PartialEq)]
pub struct SCurve {
    /// Contiguous constant-jerk phases in world coordinates.
    phases: Vec<Segment>,

    /// Total time covered by `phases`.
    duration: f64,

    /// State the profile starts from, returned when there are no phases.
    initial: MotionState,

    /// State the profile was asked to reach.
    target: MotionState,

    /// Drift removed from the final phase by the solver.
    position_error: f64,

    /// Sampled curves, when requested by the configuration.
    curves: Option<SampledCurves>,
}

impl SCurve {
    /// Generates the profile moving from `initial` to `target`.
    ///
    /// Backward moves are solved as forward moves and mirrored afterwards, then the
    /// phases are shifted to start at `initial.position`.
    pub fn generate(
        initial: MotionState,
        target: MotionState,
        limits: &MotionLimits,
        config: &ProfileConfig,
    ) -> Result<Self, MotionError> {
        ensure_finite("initial.position", initial.position)?;
        ensure_finite("target.position", target.position)?;

        let ds_raw = target.position - initial.position;
        let invert = ds_raw < 0.0;
        let direction = if invert { -1.0 } else { 1.0 };

        let result = SCurveGenerator::generate(
            ds_raw * direction,
            initial.velocity * direction,
            initial.acceleration * direction,
            target.velocity * direction,
            limits,
            config,
        )?;

        let mut phases = result.phases;
        for phase in phases.iter_mut() {
            if invert {
                phase.invert();
            }
            phase.offset_position(initial.position);
        }
        if let Some(last) = phases.last_mut() {
            // mirroring and offsetting must not reintroduce drift
            last.x_end = target.position;
            last.v_end = target.velocity;
        }

        let duration = match (phases.first(), phases.last()) {
            (Some(first), Some(last)) => last.t_end - first.t_start,
            _ => 0.0,
        };

        let mut curve = SCurve {
            phases,
            duration,
            initial,
            target,
            position_error: result.position_error,
            curves: None,
        };
        if config.create_curves && !curve.phases.is_empty() {
            curve.curves = Some(curve.create_curves(config.subdivisions));
        }
        Ok(curve)
    }

    /// Exact state at time `t` by evaluating the containing phase polynomial.
    ///
    /// Before the start and after the end the state is extrapolated linearly from the
    /// boundary velocity with zero acceleration. A profile without phases always
    /// returns its initial state.
    pub fn evaluate_exact(&self, t: f64) -> MotionState {
        let (first, last) = match (self.phases.first(), self.phases.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.initial,
        };

        if t < first.t_start {
            return first.start_state().coast(t - first.t_start);
        }
        if t > last.t_end {
            return last.end_state().coast(t - last.t_end);
        }
        if t == last.t_end {
            return last.end_state();
        }

        let idx = self
            .phases
            .partition_point(|p| p.t_end < t)
            .min(self.phases.len() - 1);
        self.phases[idx].state_at(t)
    }

    /// Approximate state at time `t` from the sampled curves.
    ///
    /// Times before the start clamp to the first sample and times at or after the end
    /// hold the target state. Without sampled curves the window is evaluated exactly.
    pub fn evaluate_curves(&self, t: f64) -> MotionState {
        if self.phases.is_empty() {
            return self.initial;
        }
        if t >= self.duration {
            return self.target;
        }

        let t = t.max(0.0);
        match &self.curves {
            Some(curves) => MotionState::new(
                curves.position.evaluate(t),
                curves.velocity.evaluate(t),
                curves.acceleration.evaluate(t),
            ),
            None => self.evaluate_exact(t),
        }
    }

    pub fn phases(&self) -> &[Segment] {
        &self.phases
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn initial(&self) -> MotionState {
        self.initial
    }

    pub fn target(&self) -> MotionState {
        self.target
    }

    /// Velocity at the end of the last phase.
    pub fn target_velocity(&self) -> f64 {
        self.phases.last().map_or(self.target.velocity, |p| p.v_end)
    }

    /// Final-position drift the solver removed before snapping onto the target.
    pub fn position_error(&self) -> f64 {
        self.position_error
    }

    pub fn curves(&self) -> Option<&SampledCurves> {
        self.curves.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phase boundary samples, each interval bisected `subdivisions` times.
    fn subdivided_samples(&self, subdivisions: u32) -> Vec<Sample> {
        let mut samples: Vec<Sample> = self
            .phases
            .iter()
            .map(|p| Sample {
                time: p.t_start,
                state: p.start_state(),
                jerk: p.jerk,
            })
            .collect();
        if let Some(last) = self.phases.last() {
            samples.push(Sample {
                time: last.t_end,
                state: last.end_state(),
                jerk: last.jerk,
            });
        }

        for _ in 0..subdivisions {
            let mut dense = Vec::with_capacity(samples.len() * 2);
            for pair in samples.windows(2) {
                let (s0, s1) = (pair[0], pair[1]);
                let half = 0.5 * (s1.time - s0.time);
                dense.push(s0);
                dense.push(Sample {
                    time: s0.time + half,
                    state: s0.state.integrate(s0.jerk, half),
                    jerk: s0.jerk,
                });
            }
            if let Some(&last) = samples.last() {
                dense.push(last);
            }
            samples = dense;
        }
        samples
    }

    /// Fits tangent-continuous curves through the subdivided samples.
    ///
    /// Position keys use velocity as tangent and velocity keys use acceleration;
    /// acceleration and jerk keys use finite-difference tangents.
    fn create_curves(&self, subdivisions: u32) -> SampledCurves {
        let samples = self.subdivided_samples(subdivisions);

        let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
        let accelerations: Vec<f64> = samples.iter().map(|s| s.state.acceleration).collect();
        let jerks: Vec<f64> = samples.iter().map(|s| s.jerk).collect();

        let position = samples
            .iter()
            .map(|s| Keyframe::new(s.time, s.state.position, s.state.velocity, s.state.velocity))
            .collect();
        let velocity = samples
            .iter()
            .map(|s| {
                Keyframe::new(
                    s.time,
                    s.state.velocity,
                    s.state.acceleration,
                    s.state.acceleration,
                )
            })
            .collect();

        SampledCurves {
            position: HermiteCurve::new(position),
            velocity: HermiteCurve::new(velocity),
            acceleration: HermiteCurve::from_samples(&times, &accelerations),
            jerk: HermiteCurve::from_samples(&times, &jerks),
        }
    }
}
