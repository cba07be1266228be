//! Easing functions and cubic Bezier curves used by animations.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::geom::{Point, pt};

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn clamp01(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

pub fn close_to(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

pub fn ease_in_quint(t: f64) -> f64 {
    t.powi(5)
}

pub fn ease_out_quint(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(5)
}

pub fn ease_in_cubic(t: f64) -> f64 {
    t.powi(3)
}

pub fn ease_in_circ(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

pub fn ease_out_elastic(t: f64) -> f64 {
    const C4: f64 = (2.0 * PI) / 3.0;

    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
    }
}

/// Cubic Bezier through four control points. As a graph, `x` of the first
/// point is 0 and of the last is 1, and the inner points keep `x` monotonic.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BezierCurve {
    #[serde(rename = "Points")]
    pub points: [Point; 4],
}

impl BezierCurve {
    pub const DEFAULT: Self = Self::new([pt(0.0, 0.0), pt(0.3, 0.0), pt(0.7, 1.0), pt(1.0, 1.0)]);

    pub const fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    pub fn point_at(&self, t: f64) -> Point {
        let [p0, p1, p2, p3] = self.points;
        let u = 1.0 - t;
        p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    fn x_at(&self, t: f64) -> f64 {
        self.point_at(t).x
    }

    fn dx_at(&self, t: f64) -> f64 {
        let [p0, p1, p2, p3] = self.points;
        let u = 1.0 - t;
        3.0 * u * u * (p1.x - p0.x) + 6.0 * u * t * (p2.x - p1.x) + 3.0 * t * t * (p3.x - p2.x)
    }

    /// Newton's method for the curve parameter whose `x` is `x`.
    pub fn solve_t(&self, x: f64) -> f64 {
        const ITERATIONS: usize = 4;

        let mut t = x;
        for _ in 0..ITERATIONS {
            let slope = self.dx_at(t);
            if slope.abs() < 1e-9 {
                break;
            }
            t = (t - (self.x_at(t) - x) / slope).clamp(0.0, 1.0);
        }
        t
    }

    /// Reads the curve as a function `y(x)` over `x ∈ [0, 1]`.
    pub fn graph(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        self.point_at(self.solve_t(x)).y
    }
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easings_hit_endpoints() {
        for ease in [
            ease_in_quint,
            ease_out_quint,
            ease_in_cubic,
            ease_in_circ,
            ease_out_elastic,
        ] {
            assert!(close_to(ease(0.0), 0.0, 1e-9));
            assert!(close_to(ease(1.0), 1.0, 1e-9));
        }
    }

    #[test]
    fn elastic_overshoots() {
        let peak = (1..100)
            .map(|i| ease_out_elastic(i as f64 / 100.0))
            .fold(0.0, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn graph_matches_endpoints_and_is_monotonic_for_default() {
        let curve = BezierCurve::DEFAULT;
        assert!(close_to(curve.graph(0.0), 0.0, 1e-6));
        assert!(close_to(curve.graph(1.0), 1.0, 1e-6));

        let mut prev = -1.0;
        for i in 0..=20 {
            let y = curve.graph(i as f64 / 20.0);
            assert!(y >= prev - 1e-6);
            prev = y;
        }
    }

    #[test]
    fn linear_curve_is_identity() {
        let curve = BezierCurve::new([
            pt(0.0, 0.0),
            pt(1.0 / 3.0, 1.0 / 3.0),
            pt(2.0 / 3.0, 2.0 / 3.0),
            pt(1.0, 1.0),
        ]);
        for i in 0..=10 {
            let x = i as f64 / 10.0;
            assert!(close_to(curve.graph(x), x, 1e-6));
        }
    }

    #[test]
    fn curve_json_uses_pascal_case() {
        let json = serde_json::to_string(&BezierCurve::DEFAULT).unwrap();
        assert!(json.starts_with(r#"{"Points":[{"X":0.0,"Y":0.0}"#));
    }
}
