//! 2D geometry kernel: vectors, line segments, curved (arc) segments, and
//! closed-form ray intersection against both.
//!
//! Every function here is pure — no ownership of scene state, no fallible
//! paths. A ray either hits or it doesn't; degenerate configurations (parallel
//! rays, zero-length segments encountered mid-trace) are reported as `None`,
//! never as an error. See `error` for the up-front validation that keeps truly
//! malformed geometry (coincident endpoints, impossible arcs) out of the hot
//! path entirely.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub};

/// Tolerance used for parallel-ray and behind-origin checks.
pub const EPSILON: f64 = 1e-9;

/// Default distance a ray's new origin is advanced along its outgoing
/// direction after an interaction, to avoid re-intersecting the interface it
/// just left.
pub const DEFAULT_EPSILON_ADVANCE: f64 = 1e-3;

/// A 2D vector of doubles, used for both points and directions.
///
/// Directions are unit-length by convention; violating this is a bug, not a
/// runtime error — callers that produce a non-unit direction and pass it to
/// the geometry kernel get geometrically wrong (not panicking) results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector. Debug-asserts on near-zero length, since a
    /// zero-length direction is always a caller bug in this engine.
    #[inline(always)]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "attempted to normalize a zero-length vector");
        self / len
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// 2D "cross product" — the z-component of the 3D cross product of the
    /// two vectors extended into the plane. Used for side tests.
    #[inline(always)]
    pub fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Rotates the vector by +90°: `(x, y) -> (-y, x)`. This is the signed
    /// normal convention used throughout (§3: "the signed normal is the
    /// tangent rotated by +90°").
    #[inline(always)]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Specular reflection of `self` about `normal`: `dir - 2(dir.normal)normal`.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Component-wise linear interpolation.
    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Angle of this vector from the positive x-axis, in radians.
    #[inline(always)]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }
}

/// Rotates `v` by `angle_rad` counter-clockwise using the standard 2D
/// rotation matrix.
#[inline]
pub fn rotate2(v: Vec2, angle_rad: f64) -> Vec2 {
    let (s, c) = angle_rad.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    #[inline(always)]
    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

impl MulAssign<f64> for Vec2 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv)
    }
}

impl DivAssign<f64> for Vec2 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
    }
}

// ─── Segments ───────────────────────────────────────────────────────────────

/// A flat oriented line segment. The tangent points from `p1` to `p2`; the
/// signed normal is the tangent rotated +90°.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p1: Vec2,
    pub p2: Vec2,
}

impl LineSegment {
    pub const fn new(p1: Vec2, p2: Vec2) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).length()
    }

    pub fn tangent(&self) -> Vec2 {
        (self.p2 - self.p1).normalized()
    }

    pub fn normal(&self) -> Vec2 {
        self.tangent().perp()
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }
}

/// A curved (circular-arc) interface between `p1` and `p2` with signed radius
/// `radius_mm`. A zero radius is flat.
///
/// Sign convention: positive radius places the center of curvature on the
/// chord's `-normal` side (the side the chord's signed normal points *away*
/// from), negative on the `+normal` side. This is the inverse of the literal
/// reading of §3 — see `DESIGN.md` §"Open Question decisions", item 2: the
/// spec itself flags this convention as ambiguous and calls for verification
/// against Scenario E (a positive-radius concave mirror that must focus
/// incoming rays on its front side); that scenario only converges with the
/// sign used here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvedSegment {
    pub p1: Vec2,
    pub p2: Vec2,
    pub radius_mm: f64,
}

impl CurvedSegment {
    pub const fn new(p1: Vec2, p2: Vec2, radius_mm: f64) -> Self {
        Self { p1, p2, radius_mm }
    }

    pub fn is_flat(&self) -> bool {
        self.radius_mm == 0.0
    }

    pub fn chord(&self) -> LineSegment {
        LineSegment::new(self.p1, self.p2)
    }

    /// The center of curvature, located on the perpendicular bisector of the
    /// chord at distance `sqrt(r^2 - (chord/2)^2)` from the midpoint, on the
    /// side selected by the sign of `radius_mm` (see struct docs).
    pub fn center(&self) -> Vec2 {
        let chord = self.chord();
        let half_chord = chord.length() / 2.0;
        let r = self.radius_mm.abs();
        let h2 = (r * r - half_chord * half_chord).max(0.0);
        let h = h2.sqrt();
        let mid = chord.midpoint();
        let normal = chord.normal();
        if self.radius_mm > 0.0 {
            mid - normal * h
        } else {
            mid + normal * h
        }
    }
}

/// Sum type over the two kinds of optical interface geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometrySegment {
    Line(LineSegment),
    Curved(CurvedSegment),
}

impl GeometrySegment {
    pub fn endpoints(&self) -> (Vec2, Vec2) {
        match self {
            GeometrySegment::Line(l) => (l.p1, l.p2),
            GeometrySegment::Curved(c) => (c.p1, c.p2),
        }
    }

    /// Dispatches to `ray_hit_segment` or `ray_hit_arc`, collapsing a curved
    /// segment with zero radius to the flat case.
    pub fn ray_hit(&self, origin: Vec2, dir: Vec2) -> Option<Hit> {
        match self {
            GeometrySegment::Line(l) => ray_hit_segment(origin, dir, l.p1, l.p2),
            GeometrySegment::Curved(c) if c.is_flat() => {
                ray_hit_segment(origin, dir, c.p1, c.p2)
            }
            GeometrySegment::Curved(c) => {
                ray_hit_arc(origin, dir, c.center(), c.radius_mm, c.p1, c.p2)
            }
        }
    }
}

/// The result of a successful ray/interface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f64,
    pub point: Vec2,
    pub tangent: Vec2,
    pub normal: Vec2,
    pub center_of_segment: Vec2,
    pub length: f64,
    /// Parameter along the interface from `p1` (`0.0`) to `p2` (`1.0`) at
    /// which the ray hit. Lets callers tell an interior hit (`0 < u < 1`)
    /// apart from one that exactly grazes an endpoint (`u == 0` or `1`).
    pub u: f64,
}

/// Intersects a ray with a flat line segment.
///
/// Returns `None` if the ray is parallel to the segment, the intersection is
/// behind the ray origin (`t < EPSILON`), or falls outside the segment
/// (parameter outside `[0, 1]`).
pub fn ray_hit_segment(origin: Vec2, dir: Vec2, p1: Vec2, p2: Vec2) -> Option<Hit> {
    let seg = p2 - p1;
    let denom = dir.cross(seg);
    if denom.abs() < EPSILON {
        return None; // parallel
    }
    let diff = p1 - origin;
    let t = diff.cross(seg) / denom;
    let u = diff.cross(dir) / denom;
    if t < EPSILON || !(0.0..=1.0).contains(&u) {
        return None;
    }
    let point = origin + dir * t;
    let tangent = seg.normalized();
    let normal = tangent.perp();
    Some(Hit {
        t,
        point,
        tangent,
        normal,
        center_of_segment: (p1 + p2) * 0.5,
        length: seg.length(),
        u,
    })
}

/// Intersects a ray with the circular arc of radius `|radius|` centered at
/// `center`, delimited by `p1`/`p2` (the shorter arc between them).
///
/// The outward normal at the hit point is the radial direction from `center`,
/// oriented so its sign matches the flat-segment normal convention of the
/// chord (i.e. positive component along the chord's `+normal` side when
/// `radius > 0`, negative when `radius < 0`).
pub fn ray_hit_arc(
    origin: Vec2,
    dir: Vec2,
    center: Vec2,
    radius: f64,
    p1: Vec2,
    p2: Vec2,
) -> Option<Hit> {
    let r = radius.abs();
    let oc = origin - center;
    let b = dir.dot(oc);
    let c = oc.length_squared() - r * r;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t0 = -b - sqrt_d;
    let t1 = -b + sqrt_d;

    let chord = LineSegment::new(p1, p2);
    let chord_normal = chord.normal();

    let mut candidates: Vec<f64> = Vec::with_capacity(2);
    if t0 >= EPSILON {
        candidates.push(t0);
    }
    if t1 >= EPSILON && (t1 - t0).abs() > EPSILON {
        candidates.push(t1);
    }
    candidates.sort_by(|a, b| a.partial_cmp(b).unwrap());

    for t in candidates {
        let point = origin + dir * t;
        if let Some(u) = arc_param(point, center, p1, p2) {
            let radial = (point - center).normalized();
            let outward = if radial.dot(chord_normal) * radius.signum() >= 0.0 {
                radial
            } else {
                -radial
            };
            // The tangent is a fixed vector matching the flat-surface
            // convention (the chord's own tangent), not derived from the
            // possibly-flipped `outward` normal.
            let tangent = chord.tangent();
            return Some(Hit {
                t,
                point,
                tangent,
                normal: outward,
                center_of_segment: chord.midpoint(),
                length: chord.length(),
                u,
            });
        }
    }
    None
}

/// Checks whether `point` (assumed to lie on the circle through `center`)
/// falls on the shorter of the two arcs delimited by `p1`/`p2`, returning its
/// parameter along that arc from `p1` (`0.0`) to `p2` (`1.0`) if so.
fn arc_param(point: Vec2, center: Vec2, p1: Vec2, p2: Vec2) -> Option<f64> {
    let a1 = (p1 - center).angle();
    let a2 = (p2 - center).angle();
    let ap = (point - center).angle();

    // Sweeping counter-clockwise from p1 to p2 covers one of the two arcs;
    // whichever of that sweep or its complement is <= pi is the minor arc.
    let ccw_span = angular_distance(a1, a2);
    if ccw_span <= std::f64::consts::PI {
        let d = angular_distance(a1, ap);
        (d <= ccw_span + 1e-9).then(|| (d / ccw_span).clamp(0.0, 1.0))
    } else {
        let cw_span = std::f64::consts::TAU - ccw_span;
        let d = angular_distance(a2, ap);
        (d <= cw_span + 1e-9).then(|| (1.0 - d / cw_span).clamp(0.0, 1.0))
    }
}

/// Smallest non-negative angular distance travelling counter-clockwise from
/// `from` to `to`, wrapped into `[0, 2*pi)`.
fn angular_distance(from: f64, to: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let mut d = (to - from) % tau;
    if d < 0.0 {
        d += tau;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn vec2_reflect_normal_incidence() {
        let dir = Vec2::new(1.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);
        let r = dir.reflect(normal);
        assert_abs_diff_eq!(r.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rotate2_quarter_turn() {
        let v = Vec2::new(1.0, 0.0);
        let r = rotate2(v, std::f64::consts::FRAC_PI_2);
        assert_abs_diff_eq!(r.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn perp_matches_plus_90() {
        let v = Vec2::new(1.0, 0.0);
        let p = v.perp();
        let r = rotate2(v, std::f64::consts::FRAC_PI_2);
        assert_abs_diff_eq!(p.x, r.x, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, r.y, epsilon = 1e-9);
    }

    #[test]
    fn ray_hit_segment_basic() {
        let hit = ray_hit_segment(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(50.0, -20.0),
            Vec2::new(50.0, 20.0),
        )
        .expect("should hit");
        assert_abs_diff_eq!(hit.t, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.point.x, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.point.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn ray_hit_segment_misses_parallel() {
        let hit = ray_hit_segment(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(50.0, -20.0),
            Vec2::new(50.0, 20.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn ray_hit_segment_misses_behind_origin() {
        let hit = ray_hit_segment(
            Vec2::new(100.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(50.0, -20.0),
            Vec2::new(50.0, 20.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn ray_hit_segment_misses_off_segment() {
        let hit = ray_hit_segment(
            Vec2::new(0.0, 100.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(50.0, -20.0),
            Vec2::new(50.0, 20.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn ray_hit_arc_concave_mirror_chord() {
        // Matches Scenario E's geometry: endpoints (50,-10)/(50,10), r=+50.
        let c = CurvedSegment::new(Vec2::new(50.0, -10.0), Vec2::new(50.0, 10.0), 50.0);
        let center = c.center();
        // chord half-length 10, r=50 => h = sqrt(2500-100) = sqrt(2400);
        // center sits beyond the chord (away from the source) so the arc
        // bulges toward the source, as a concave mirror must.
        assert_abs_diff_eq!(center.x, 50.0 + 2400f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(center.y, 0.0, epsilon = 1e-9);

        let hit = ray_hit_arc(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            center,
            50.0,
            c.p1,
            c.p2,
        )
        .expect("axial ray should hit the mirror vertex");
        assert_abs_diff_eq!(hit.point.y, 0.0, epsilon = 1e-6);
        // vertex is slightly in front of the chord plane (sagged toward the source)
        assert!(hit.point.x < 50.0);
        // outward normal at the vertex on-axis should point back toward -x (toward the source)
        assert!(hit.normal.x < 0.0);
    }

    #[test]
    fn curved_segment_flat_when_zero_radius() {
        let c = CurvedSegment::new(Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0), 0.0);
        assert!(c.is_flat());
    }
}
