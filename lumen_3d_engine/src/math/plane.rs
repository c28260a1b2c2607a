/// Plane - `normal · P + d = 0`.
///
/// No invariant on the normal length, except where a method says so.
/// Frustum planes are renormalised after extraction, so their signed
/// distances are true euclidean distances.

use std::fmt;
use std::ops::Neg;
use glam::{Mat3, Mat4, Vec3, Vec4};
use super::aabb::{AxisAlignedBox, Extent};

/// Side of a plane a point or volume lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Exactly on the plane
    NoSide,
    /// On the side the normal points to
    Positive,
    /// Opposite to the normal
    Negative,
    /// Straddles the plane (boxes and volumes only)
    Both,
}

/// Infinite plane in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane with the given normal passing through `point`
    pub fn from_normal_point(normal: Vec3, point: Vec3) -> Self {
        Self { normal, d: -normal.dot(point) }
    }

    /// Plane through three points, with a unit normal (counter-clockwise winding)
    pub fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let mut plane = Self::default();
        plane.redefine(p0, p1, p2);
        plane
    }

    /// Plane from an (a, b, c, d) coefficient vector
    pub fn from_vec4(coefficients: Vec4) -> Self {
        Self { normal: coefficients.truncate(), d: coefficients.w }
    }

    /// Coefficient vector (a, b, c, d)
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.d)
    }

    /// Redefine through three points: `normal = normalize((p1 - p0) x (p2 - p0))`
    pub fn redefine(&mut self, p0: Vec3, p1: Vec3, p2: Vec3) {
        self.normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        self.d = -self.normal.dot(p0);
    }

    pub fn redefine_normal_point(&mut self, normal: Vec3, point: Vec3) {
        self.normal = normal;
        self.d = -normal.dot(point);
    }

    // ===== CLASSIFICATION =====

    /// Signed distance, scaled by the normal length
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    pub fn side(&self, point: Vec3) -> PlaneSide {
        let distance = self.distance(point);
        if distance < 0.0 {
            PlaneSide::Negative
        } else if distance > 0.0 {
            PlaneSide::Positive
        } else {
            PlaneSide::NoSide
        }
    }

    /// Classify a box given by center and half size.
    ///
    /// Returns `Both` when the box straddles the plane.
    pub fn side_of_box(&self, center: Vec3, half_size: Vec3) -> PlaneSide {
        let distance = self.distance(center);
        let max_abs_distance = self.normal.abs().dot(half_size);

        if distance < -max_abs_distance {
            PlaneSide::Negative
        } else if distance > max_abs_distance {
            PlaneSide::Positive
        } else {
            PlaneSide::Both
        }
    }

    pub fn side_of_aabb(&self, aabb: &AxisAlignedBox) -> PlaneSide {
        match aabb.extent() {
            Extent::Null => PlaneSide::NoSide,
            Extent::Infinite => PlaneSide::Both,
            Extent::Finite => self.side_of_box(aabb.center(), aabb.half_size()),
        }
    }

    // ===== PROJECTION & NORMALISATION =====

    /// Project `v` onto the plane through the origin (assumes a unit normal)
    pub fn project_vector(&self, v: Vec3) -> Vec3 {
        let n = self.normal;
        let outer = Mat3::from_cols(n * n.x, n * n.y, n * n.z);
        (Mat3::IDENTITY - outer) * v
    }

    /// Scale normal and `d` so the normal is unit length.
    ///
    /// Returns the previous normal length. A zero normal is left untouched.
    pub fn normalise(&mut self) -> f32 {
        let length = self.normal.length();
        if length > 0.0 {
            let inv_length = 1.0 / length;
            self.normal *= inv_length;
            self.d *= inv_length;
        }
        length
    }

    /// Transform the plane by `matrix` (inverse-transpose), renormalised
    pub fn transformed(&self, matrix: &Mat4) -> Plane {
        let coefficients = matrix.inverse().transpose() * self.to_vec4();
        let mut plane = Plane::from_vec4(coefficients);
        plane.normalise();
        plane
    }
}

impl Neg for Plane {
    type Output = Plane;

    fn neg(self) -> Plane {
        Plane::new(-self.normal, -self.d)
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plane(normal={}, d={})", self.normal, self.d)
    }
}

#[cfg(test)]
#[path = "plane_tests.rs"]
mod tests;
