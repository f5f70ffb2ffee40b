/// A single key of a sampled curve: value and slopes at one point in time.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f64,
    pub value: f64,
    pub in_tangent: f64,
    pub out_tangent: f64,
}

impl Keyframe {
    pub fn new(time: f64, value: f64, in_tangent: f64, out_tangent: f64) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Piecewise cubic Hermite curve through keyframes sorted by time.
///
/// Between two keys the curve matches both values and uses the left key's
/// `out_tangent` and the right key's `in_tangent`. Outside the key range the
/// curve is clamped to the first or last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HermiteCurve {
    keys: Vec<Keyframe>,
}

impl HermiteCurve {
    /// Builds a curve from keys with strictly increasing times.
    pub fn new(keys: Vec<Keyframe>) -> Self {
        debug_assert!(keys.windows(2).all(|k| k[0].time < k[1].time));
        Self { keys }
    }

    /// Keys whose tangents are finite differences of the values: one-sided at
    /// the ends, mean of the neighbouring slopes inside.
    pub fn from_samples(times: &[f64], values: &[f64]) -> Self {
        let n = times.len().min(values.len());
        let slope = |i: usize| (values[i + 1] - values[i]) / (times[i + 1] - times[i]);

        let keys = (0..n)
            .map(|i| {
                let tangent = if n < 2 {
                    0.0
                } else if i == 0 {
                    slope(0)
                } else if i == n - 1 {
                    slope(n - 2)
                } else {
                    0.5 * (slope(i - 1) + slope(i))
                };
                Keyframe::new(times[i], values[i], tangent, tangent)
            })
            .collect();
        Self::new(keys)
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value of the curve at `t`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // index of the first key strictly after t; t lies inside (first, last)
        let idx = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[idx - 1];
        let k1 = &self.keys[idx];

        let width = k1.time - k0.time;
        let u = (t - k0.time) / width;
        let u2 = u * u;
        let u3 = u2 * u;

        // Cubic Hermite basis
        let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
        let h10 = u3 - 2.0 * u2 + u;
        let h01 = -2.0 * u3 + 3.0 * u2;
        let h11 = u3 - u2;

        // Tangents are d(value)/d(time); the basis needs d(value)/du
        h00 * k0.value + h10 * k0.out_tangent * width + h01 * k1.value + h11 * k1.in_tangent * width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.5, 0.125)]
    #[case(1.0, 1.0)]
    #[case(1.5, 3.375)]
    #[case(2.0, 8.0)]
    fn test_cubic_reproduced_exactly(#[case] t: f64, #[case] expected: f64) {
        // f(t) = t^3 with exact derivatives at the keys
        let keys = [0.0, 1.0, 2.0]
            .iter()
            .map(|&x: &f64| Keyframe::new(x, x.powi(3), 3.0 * x * x, 3.0 * x * x))
            .collect();
        let curve = HermiteCurve::new(keys);
        assert!((curve.evaluate(t) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_outside_range() {
        let curve = HermiteCurve::from_samples(&[1.0, 2.0], &[4.0, 6.0]);
        assert_eq!(curve.evaluate(0.0), 4.0);
        assert_eq!(curve.evaluate(3.0), 6.0);
        assert!((curve.evaluate(1.5) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_finite_difference_tangents() {
        let curve = HermiteCurve::from_samples(&[0.0, 1.0, 3.0], &[0.0, 2.0, 2.0]);
        let keys = curve.keys();
        assert_eq!(keys[0].out_tangent, 2.0);
        assert_eq!(keys[1].in_tangent, 1.0);
        assert_eq!(keys[1].out_tangent, 1.0);
        assert_eq!(keys[2].in_tangent, 0.0);
    }

    #[test]
    fn test_empty_curve() {
        let curve = HermiteCurve::default();
        assert!(curve.is_empty());
        assert_eq!(curve.evaluate(1.0), 0.0);
    }
}
