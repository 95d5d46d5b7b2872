// Copyright 2025 Lars Brubaker
// License: MIT
//
// Pure geometric functions on image-plane points.
//
// Points use raster coordinates: x is the column, y is the row (y grows
// downward).  The predicates below are the textbook formulas evaluated on
// (x, y) as given, so "counter-clockwise" means positive `orient`, which on
// screen looks clockwise.  All of them are exact for integer pixel
// coordinates of realistic image sizes.

use std::ops::{Add, Mul, Sub};

pub type Real = f64;

/// A 2D point (or vector) in image coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: Real,
    pub y: Real,
}

impl Point2 {
    #[inline]
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    /// Hashable identity of this point's exact coordinates.
    #[inline]
    pub fn key(self) -> PointKey {
        PointKey::from(self)
    }

    #[inline]
    pub fn dot(self, o: Point2) -> Real {
        self.x * o.x + self.y * o.y
    }

    /// z component of the 3D cross product.
    #[inline]
    pub fn cross(self, o: Point2) -> Real {
        self.x * o.y - self.y * o.x
    }

    #[inline]
    pub fn norm(self) -> Real {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn dist(self, o: Point2) -> Real {
        (self - o).norm()
    }

    #[inline]
    pub fn dist2(self, o: Point2) -> Real {
        let d = self - o;
        d.dot(d)
    }

    #[inline]
    pub fn midpoint(self, o: Point2) -> Point2 {
        Point2::new(self.x / 2.0 + o.x / 2.0, self.y / 2.0 + o.y / 2.0)
    }
}

impl Add for Point2 {
    type Output = Point2;
    #[inline]
    fn add(self, o: Point2) -> Point2 {
        Point2::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;
    #[inline]
    fn sub(self, o: Point2) -> Point2 {
        Point2::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<Real> for Point2 {
    type Output = Point2;
    #[inline]
    fn mul(self, s: Real) -> Point2 {
        Point2::new(self.x * s, self.y * s)
    }
}

impl From<(i32, i32)> for Point2 {
    fn from((x, y): (i32, i32)) -> Self {
        Point2::new(x as Real, y as Real)
    }
}

/// Structural hash key for a point: the exact bit patterns of both
/// coordinates, with -0.0 folded onto 0.0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey(u64, u64);

impl From<Point2> for PointKey {
    #[inline]
    fn from(p: Point2) -> Self {
        PointKey(canonical_bits(p.x), canonical_bits(p.y))
    }
}

#[inline]
fn canonical_bits(v: Real) -> u64 {
    if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

/// Twice the signed area of triangle (a, b, c).
/// Positive when c lies to the left of the directed line a→b.
#[inline]
pub fn orient(a: Point2, b: Point2, c: Point2) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// In-circle predicate: positive when `d` lies strictly inside the circle
/// through a, b, c (which must have positive orientation), zero when the
/// four points are cocircular.
pub fn in_circle(a: Point2, b: Point2, c: Point2, d: Point2) -> Real {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let ab_det = adx * bdy - bdx * ady;
    let bc_det = bdx * cdy - cdx * bdy;
    let ca_det = cdx * ady - adx * cdy;

    let a_lift = adx * adx + ady * ady;
    let b_lift = bdx * bdx + bdy * bdy;
    let c_lift = cdx * cdx + cdy * cdy;

    a_lift * bc_det + b_lift * ca_det + c_lift * ab_det
}

/// Center of the circle through a, b, c.  `None` for collinear input.
pub fn circumcenter(a: Point2, b: Point2, c: Point2) -> Option<Point2> {
    let b = b - a;
    let c = c - a;
    let d = 2.0 * b.cross(c);
    if d == 0.0 {
        return None;
    }
    let b2 = b.dot(b);
    let c2 = c.dot(c);
    let ux = (c.y * b2 - b.y * c2) / d;
    let uy = (b.x * c2 - c.x * b2) / d;
    let center = Point2::new(a.x + ux, a.y + uy);
    (center.x.is_finite() && center.y.is_finite()).then_some(center)
}

/// Signed angle in radians that rotates vector `a` onto vector `b`, in (-π, π].
#[inline]
pub fn signed_angle(a: Point2, b: Point2) -> Real {
    a.cross(b).atan2(a.dot(b))
}

/// Barycentric coordinates of `p` with respect to triangle `t`.
/// `None` when the triangle has zero area.
pub fn barycentric(t: &[Point2; 3], p: Point2) -> Option<[Real; 3]> {
    let [v1, v2, v3] = *t;
    let total = (v2.y - v3.y) * (v1.x - v3.x) + (v3.x - v2.x) * (v1.y - v3.y);
    if total == 0.0 {
        return None;
    }
    let w1 = ((v2.y - v3.y) * (p.x - v3.x) + (v3.x - v2.x) * (p.y - v3.y)) / total;
    let w2 = ((v3.y - v1.y) * (p.x - v3.x) + (v1.x - v3.x) * (p.y - v3.y)) / total;
    Some([w1, w2, 1.0 - w1 - w2])
}

/// Where a point lies relative to a closed polygon.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundedSide {
    Inside,
    OnBoundary,
    Outside,
}

/// Classify `p` against the polygon `poly` (either orientation).
pub fn bounded_side(poly: &[Point2], p: Point2) -> BoundedSide {
    let n = poly.len();
    if n < 3 {
        return BoundedSide::Outside;
    }
    let mut inside = false;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if on_segment(a, b, p) {
            return BoundedSide::OnBoundary;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    if inside {
        BoundedSide::Inside
    } else {
        BoundedSide::Outside
    }
}

/// True if `p` lies on the closed segment a–b.
#[inline]
pub fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
    orient(a, b, p) == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// True if closed segments a–b and c–d share at least one point.
pub fn segments_intersect(a: Point2, b: Point2, c: Point2, d: Point2) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    on_segment(c, d, a) || on_segment(c, d, b) || on_segment(a, b, c) || on_segment(a, b, d)
}

/// Signed area of a closed polygon (positive for positive orientation).
pub fn polygon_signed_area(poly: &[Point2]) -> Real {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        area += a.cross(b);
    }
    area * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [Point2; 4] = [
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(0.0, 10.0),
    ];

    #[test]
    fn orient_basic() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(orient(a, b, Point2::new(0.5, 1.0)) > 0.0);
        assert!(orient(a, b, Point2::new(0.5, -1.0)) < 0.0);
        assert_eq!(orient(a, b, Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn in_circle_unit_triangle() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert!(in_circle(a, b, c, Point2::new(0.5, 0.5)) > 0.0);
        assert!(in_circle(a, b, c, Point2::new(2.0, 2.0)) < 0.0);
        // (1,1) is cocircular with the other three.
        assert_eq!(in_circle(a, b, c, Point2::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn circumcenter_right_triangle_is_hypotenuse_midpoint() {
        let c = circumcenter(
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        )
        .unwrap();
        assert!((c.x - 2.0).abs() < 1e-12 && (c.y - 2.0).abs() < 1e-12, "{:?}", c);
        assert!(circumcenter(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0)
        )
        .is_none());
    }

    #[test]
    fn signed_angle_quarter_turns() {
        let x = Point2::new(1.0, 0.0);
        let y = Point2::new(0.0, 1.0);
        assert!((signed_angle(x, y) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((signed_angle(y, x) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn barycentric_reproduces_point() {
        let t = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        ];
        let p = Point2::new(1.0, 2.0);
        let w = barycentric(&t, p).unwrap();
        let x = w[0] * t[0].x + w[1] * t[1].x + w[2] * t[2].x;
        let y = w[0] * t[0].y + w[1] * t[1].y + w[2] * t[2].y;
        assert!((x - p.x).abs() < 1e-12 && (y - p.y).abs() < 1e-12);
        assert!((w.iter().sum::<Real>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bounded_side_square() {
        assert_eq!(bounded_side(&SQUARE, Point2::new(5.0, 5.0)), BoundedSide::Inside);
        assert_eq!(bounded_side(&SQUARE, Point2::new(10.0, 3.0)), BoundedSide::OnBoundary);
        assert_eq!(bounded_side(&SQUARE, Point2::new(0.0, 0.0)), BoundedSide::OnBoundary);
        assert_eq!(bounded_side(&SQUARE, Point2::new(11.0, 5.0)), BoundedSide::Outside);
        assert_eq!(bounded_side(&SQUARE, Point2::new(-1.0, 10.0)), BoundedSide::Outside);
    }

    #[test]
    fn segments_touching_and_crossing() {
        let o = Point2::new(0.0, 0.0);
        let a = Point2::new(2.0, 2.0);
        assert!(segments_intersect(o, a, Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)));
        assert!(segments_intersect(o, a, a, Point2::new(3.0, 0.0)));
        assert!(!segments_intersect(o, a, Point2::new(3.0, 0.0), Point2::new(4.0, 0.0)));
    }

    #[test]
    fn point_key_folds_negative_zero() {
        assert_eq!(Point2::new(-0.0, 1.0).key(), Point2::new(0.0, 1.0).key());
        assert_ne!(Point2::new(0.5, 1.0).key(), Point2::new(1.0, 0.5).key());
    }

    #[test]
    fn polygon_area_sign() {
        assert_eq!(polygon_signed_area(&SQUARE), 100.0);
        let mut rev = SQUARE;
        rev.reverse();
        assert_eq!(polygon_signed_area(&rev), -100.0);
    }
}
