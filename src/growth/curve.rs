//! Normalized growth curves mapping relative age to relative scale

use serde::{Deserialize, Serialize};

/// Shape of a species' growth over its lifetime.
///
/// Input and output are both normalized to `[0, 1]`: the input is
/// `age / max_age`, the output is interpolated between the species'
/// minimum and maximum scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleCurve {
    /// Scale grows proportionally with age
    Linear,
    /// Fast early growth that levels off, `1 - (1 - t)^2`
    EaseOut,
    /// Fixed fraction regardless of age
    Constant { value: f32 },
    /// Piecewise-linear keys `[t, value]`, sorted by `t`
    Points { points: Vec<[f32; 2]> },
}

impl Default for ScaleCurve {
    fn default() -> Self {
        ScaleCurve::Linear
    }
}

impl ScaleCurve {
    pub fn eval(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            ScaleCurve::Linear => t,
            ScaleCurve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            ScaleCurve::Constant { value } => *value,
            ScaleCurve::Points { points } => eval_points(points, t),
        }
    }

    /// Keys must be sorted by time for interpolation to be meaningful
    pub fn is_well_formed(&self) -> bool {
        match self {
            ScaleCurve::Points { points } => {
                !points.is_empty() && points.windows(2).all(|w| w[0][0] <= w[1][0])
            }
            ScaleCurve::Constant { value } => value.is_finite(),
            _ => true,
        }
    }
}

fn eval_points(points: &[[f32; 2]], t: f32) -> f32 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return 1.0,
    };
    if t <= first[0] {
        return first[1];
    }
    if t >= last[0] {
        return last[1];
    }
    for w in points.windows(2) {
        let [t0, v0] = w[0];
        let [t1, v1] = w[1];
        if t >= t0 && t <= t1 {
            let span = t1 - t0;
            if span <= f32::EPSILON {
                return v1;
            }
            return v0 + (v1 - v0) * (t - t0) / span;
        }
    }
    last[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_clamps() {
        assert_eq!(ScaleCurve::Linear.eval(-1.0), 0.0);
        assert_eq!(ScaleCurve::Linear.eval(0.25), 0.25);
        assert_eq!(ScaleCurve::Linear.eval(3.0), 1.0);
    }

    #[test]
    fn test_ease_out_is_monotonic() {
        let curve = ScaleCurve::EaseOut;
        let mut prev = curve.eval(0.0);
        for i in 1..=20 {
            let v = curve.eval(i as f32 / 20.0);
            assert!(v >= prev);
            prev = v;
        }
        assert_eq!(curve.eval(1.0), 1.0);
    }

    #[test]
    fn test_points_interpolate() {
        let curve = ScaleCurve::Points {
            points: vec![[0.0, 0.0], [0.5, 0.8], [1.0, 1.0]],
        };
        assert!((curve.eval(0.25) - 0.4).abs() < 1e-6);
        assert!((curve.eval(0.75) - 0.9).abs() < 1e-6);
        assert_eq!(curve.eval(1.0), 1.0);
    }

    #[test]
    fn test_unsorted_points_rejected() {
        let curve = ScaleCurve::Points {
            points: vec![[0.5, 0.0], [0.1, 1.0]],
        };
        assert!(!curve.is_well_formed());
    }

    #[test]
    fn test_curve_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            curve: ScaleCurve,
        }
        let holder: Holder = toml::from_str(
            r#"
            [curve]
            kind = "points"
            points = [[0.0, 0.2], [1.0, 1.0]]
            "#,
        )
        .unwrap();
        assert!(matches!(holder.curve, ScaleCurve::Points { .. }));
    }
}
