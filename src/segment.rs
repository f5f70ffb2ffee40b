/// Kinematic state of one axis at a single instant.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl MotionState {
    /// Creates a new MotionState.
    pub fn new(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Advances this state under constant `jerk` for `dt` seconds.
    ///
    /// `dt` may be negative, which integrates backwards along the same polynomial.
    pub fn integrate(&self, jerk: f64, dt: f64) -> MotionState {
        let (s0, v0, a0) = (self.position, self.velocity, self.acceleration);

        // acc(t) = a0 + j*t
        let acc = a0 + jerk * dt;

        // vel(t) = v0 + a0*t + j*t^2/2
        let vel = v0 + a0 * dt + 0.5 * jerk * dt * dt;

        // pos(t) = s0 + v0*t + a0*t^2/2 + j*t^3/6
        let pos = s0 + v0 * dt + 0.5 * a0 * dt * dt + jerk * dt * dt * dt / 6.0;

        MotionState::new(pos, vel, acc)
    }

    /// Moves at constant velocity for `dt` seconds with zero acceleration.
    pub fn coast(&self, dt: f64) -> MotionState {
        MotionState::new(self.position + self.velocity * dt, self.velocity, 0.0)
    }
}

/// One constant-jerk interval of an S-curve, with its boundary conditions
/// and global timestamps.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub duration: f64,
    pub jerk: f64,
    pub a_start: f64,
    pub a_end: f64,
    pub v_start: f64,
    pub v_end: f64,
    pub x_start: f64,
    pub x_end: f64,
    pub t_start: f64,
    pub t_end: f64,
}

impl Segment {
    /// Integrates `start` under `jerk` for `duration`, starting at global time `t_start`.
    pub fn integrate(start: MotionState, jerk: f64, duration: f64, t_start: f64) -> Self {
        let end = start.integrate(jerk, duration);
        Self {
            duration,
            jerk,
            a_start: start.acceleration,
            a_end: end.acceleration,
            v_start: start.velocity,
            v_end: end.velocity,
            x_start: start.position,
            x_end: end.position,
            t_start,
            t_end: t_start + duration,
        }
    }

    pub fn start_state(&self) -> MotionState {
        MotionState::new(self.x_start, self.v_start, self.a_start)
    }

    pub fn end_state(&self) -> MotionState {
        MotionState::new(self.x_end, self.v_end, self.a_end)
    }

    /// Exact state at global time `t` (not clamped to the segment).
    pub fn state_at(&self, t: f64) -> MotionState {
        self.start_state().integrate(self.jerk, t - self.t_start)
    }

    /// Mirrors the segment about position zero: every signed quantity is negated.
    pub fn invert(&mut self) {
        self.v_start = -self.v_start;
        self.v_end = -self.v_end;
        self.a_start = -self.a_start;
        self.a_end = -self.a_end;
        self.jerk = -self.jerk;
        self.x_start = -self.x_start;
        self.x_end = -self.x_end;
    }

    pub fn offset_position(&mut self, offset: f64) {
        self.x_start += offset;
        self.x_end += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-12;

    #[rstest]
    #[case(0.0, 0.0, 0.0, 5.0, 0.4)]
    #[case(1.0, 2.0, -1.0, -5.0, 0.25)]
    #[case(-3.0, 0.5, 2.0, 0.0, 2.1)]
    fn test_segment_invariants(
        #[case] x0: f64,
        #[case] v0: f64,
        #[case] a0: f64,
        #[case] jerk: f64,
        #[case] t: f64,
    ) {
        let seg = Segment::integrate(MotionState::new(x0, v0, a0), jerk, t, 1.5);
        assert!((seg.a_end - (a0 + jerk * t)).abs() < EPS);
        assert!((seg.v_end - (v0 + a0 * t + 0.5 * jerk * t * t)).abs() < EPS);
        let x_end = x0 + v0 * t + 0.5 * a0 * t * t + jerk * t * t * t / 6.0;
        assert!((seg.x_end - x_end).abs() < EPS);
        assert!((seg.t_end - seg.t_start - seg.duration).abs() < EPS);
    }

    #[test]
    fn test_state_at_boundaries() {
        let seg = Segment::integrate(MotionState::new(2.0, 1.0, 0.5), 3.0, 0.8, 4.0);
        assert_eq!(seg.state_at(4.0), seg.start_state());
        let end = seg.state_at(4.8);
        assert!((end.position - seg.x_end).abs() < EPS);
        assert!((end.velocity - seg.v_end).abs() < EPS);
        assert!((end.acceleration - seg.a_end).abs() < EPS);
    }

    #[test]
    fn test_invert_and_offset() {
        let mut seg = Segment::integrate(MotionState::new(0.0, 1.0, 2.0), 5.0, 0.3, 0.0);
        let original = seg;
        seg.invert();
        seg.offset_position(10.0);
        assert_eq!(seg.x_start, 10.0);
        assert_eq!(seg.x_end, 10.0 - original.x_end);
        assert_eq!(seg.v_end, -original.v_end);
        assert_eq!(seg.jerk, -5.0);
        assert_eq!(seg.t_end, original.t_end);
    }

    #[test]
    fn test_coast() {
        let s = MotionState::new(1.0, -2.0, 4.0).coast(0.5);
        assert_eq!(s, MotionState::new(0.0, -2.0, 0.0));
    }
}
