use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Screen-space point in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub const fn pt(x: f64, y: f64) -> Point {
    Point { x, y }
}

impl Point {
    pub const ZERO: Self = pt(0.0, 0.0);

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Rotates around the origin by `theta` radians.
    pub fn rotate(self, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        pt(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        pt(
            crate::ease::lerp(self.x, other.x, t),
            crate::ease::lerp(self.y, other.y, t),
        )
    }

    pub fn is_in(self, rect: Rect) -> bool {
        rect.contains(self)
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        pt(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        pt(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        pt(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        pt(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        pt(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle, `min` inclusive and `max` exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub const ZERO: Self = Self {
        min: Point::ZERO,
        max: Point::ZERO,
    };

    /// Builds a well-formed rect from any two corners.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: pt(x0.min(x1), y0.min(y1)),
            max: pt(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn from_wh(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Point {
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn translate(&self, by: Point) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }

    /// Shrinks every side by `n` (grows when negative). A side pair that would
    /// cross collapses onto its center.
    pub fn inset(&self, n: f64) -> Self {
        let mut rect = *self;
        if self.width() < 2.0 * n {
            rect.min.x = (self.min.x + self.max.x) * 0.5;
            rect.max.x = rect.min.x;
        } else {
            rect.min.x += n;
            rect.max.x -= n;
        }
        if self.height() < 2.0 * n {
            rect.min.y = (self.min.y + self.max.y) * 0.5;
            rect.max.y = rect.min.y;
        } else {
            rect.min.y += n;
            rect.max.y -= n;
        }
        rect
    }

    pub fn intersect(&self, other: &Self) -> Self {
        let rect = Self {
            min: pt(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: pt(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if rect.is_empty() { Self::ZERO } else { rect }
    }

    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: pt(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: pt(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    pub fn contains(&self, point: Point) -> bool {
        self.min.x <= point.x && point.x < self.max.x && self.min.y <= point.y && point.y < self.max.y
    }

    /// Whether `self` lies entirely inside `other`.
    pub fn is_inside(&self, other: &Self) -> bool {
        self.min.x >= other.min.x
            && self.min.y >= other.min.y
            && self.max.x <= other.max.x
            && self.max.y <= other.max.y
    }

    pub fn scale_centered(&self, sx: f64, sy: f64) -> Self {
        let center = self.center();
        let half = pt(self.width() * sx * 0.5, self.height() * sy * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Scales the rect by `s` about an arbitrary `point`.
    pub fn scale_about(&self, point: Point, s: f64) -> Self {
        Self::new(
            point.x + (self.min.x - point.x) * s,
            point.y + (self.min.y - point.y) * s,
            point.x + (self.max.x - point.x) * s,
            point.y + (self.max.y - point.y) * s,
        )
    }

    pub fn centered_at(&self, center: Point) -> Self {
        let half = self.size() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn move_to(&self, min: Point) -> Self {
        Self {
            min,
            max: min + self.size(),
        }
    }

    /// Rounds both corners to whole pixels.
    pub fn snapped(&self) -> Self {
        Self {
            min: pt(self.min.x.floor(), self.min.y.floor()),
            max: pt(self.max.x.floor(), self.max.y.floor()),
        }
    }
}

/// Uniform scale that makes a `w`×`h` box fit inside a `fit_w`×`fit_h` box.
pub fn scale_to_fit(w: f64, h: f64, fit_w: f64, fit_h: f64) -> f64 {
    (fit_w / w).min(fit_h / h)
}
