/// AxisAlignedBox - bounding box with explicit null / finite / infinite state.
///
/// A null box is the empty set and an infinite box contains everything.
/// Only finite boxes carry meaningful `minimum` / `maximum` values, and for
/// those `minimum <= maximum` holds componentwise.
///
/// Corner ordering (`all_corners`, `corner`):
///
/// ```text
///    1-------2
///   /|      /|
///  / |     / |
/// 5-------4  |
/// |  0----|--3
/// | /     | /
/// |/      |/
/// 6-------7
/// ```
///
/// Far corners (0..=3) sit at `minimum.z`, near corners (4..=7) at `maximum.z`.

use std::fmt;
use glam::{Affine3A, Mat3A, Mat4, Vec3};
use super::plane::{Plane, PlaneSide};
use super::sphere::Sphere;

/// Extent state of an AxisAlignedBox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// Empty box
    Null,
    /// Box bounded by minimum / maximum
    Finite,
    /// Box containing all of space
    Infinite,
}

/// Named box corners, valued by their index in `all_corners()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    FarLeftBottom = 0,
    FarLeftTop = 1,
    FarRightTop = 2,
    FarRightBottom = 3,
    NearRightTop = 4,
    NearLeftTop = 5,
    NearLeftBottom = 6,
    NearRightBottom = 7,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct AxisAlignedBox {
    minimum: Vec3,
    maximum: Vec3,
    extent: Extent,
}

impl AxisAlignedBox {
    /// Create a null (empty) box
    pub fn new_null() -> Self {
        Self {
            minimum: Vec3::splat(-0.5),
            maximum: Vec3::splat(0.5),
            extent: Extent::Null,
        }
    }

    /// Create an infinite box
    pub fn new_infinite() -> Self {
        Self {
            minimum: Vec3::splat(-0.5),
            maximum: Vec3::splat(0.5),
            extent: Extent::Infinite,
        }
    }

    /// Create a finite box. `min` must be <= `max` on every axis.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let mut aabb = Self::new_null();
        aabb.set_extents(min, max);
        aabb
    }

    // ===== GETTERS =====

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn minimum(&self) -> Vec3 {
        self.minimum
    }

    pub fn maximum(&self) -> Vec3 {
        self.maximum
    }

    pub fn is_null(&self) -> bool {
        self.extent == Extent::Null
    }

    pub fn is_finite(&self) -> bool {
        self.extent == Extent::Finite
    }

    pub fn is_infinite(&self) -> bool {
        self.extent == Extent::Infinite
    }

    /// Center of a finite box (zero otherwise)
    pub fn center(&self) -> Vec3 {
        match self.extent {
            Extent::Finite => (self.minimum + self.maximum) * 0.5,
            _ => Vec3::ZERO,
        }
    }

    /// Full size; zero for null, infinite on every axis for infinite
    pub fn size(&self) -> Vec3 {
        match self.extent {
            Extent::Null => Vec3::ZERO,
            Extent::Finite => self.maximum - self.minimum,
            Extent::Infinite => Vec3::INFINITY,
        }
    }

    pub fn half_size(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Position of a single corner (meaningful for finite boxes only)
    pub fn corner(&self, corner: Corner) -> Vec3 {
        let (min, max) = (self.minimum, self.maximum);
        match corner {
            Corner::FarLeftBottom => min,
            Corner::FarLeftTop => Vec3::new(min.x, max.y, min.z),
            Corner::FarRightTop => Vec3::new(max.x, max.y, min.z),
            Corner::FarRightBottom => Vec3::new(max.x, min.y, min.z),
            Corner::NearRightTop => max,
            Corner::NearLeftTop => Vec3::new(min.x, max.y, max.z),
            Corner::NearLeftBottom => Vec3::new(min.x, min.y, max.z),
            Corner::NearRightBottom => Vec3::new(max.x, min.y, max.z),
        }
    }

    /// All eight corners, indexed as documented on the type
    pub fn all_corners(&self) -> [Vec3; 8] {
        [
            self.corner(Corner::FarLeftBottom),
            self.corner(Corner::FarLeftTop),
            self.corner(Corner::FarRightTop),
            self.corner(Corner::FarRightBottom),
            self.corner(Corner::NearRightTop),
            self.corner(Corner::NearLeftTop),
            self.corner(Corner::NearLeftBottom),
            self.corner(Corner::NearRightBottom),
        ]
    }

    // ===== SETTERS =====

    /// Make the box finite with the given bounds.
    pub fn set_extents(&mut self, min: Vec3, max: Vec3) {
        debug_assert!(
            min.cmple(max).all(),
            "AxisAlignedBox::set_extents: minimum {} exceeds maximum {}", min, max
        );
        self.extent = Extent::Finite;
        self.minimum = min;
        self.maximum = max;
    }

    pub fn set_null(&mut self) {
        self.extent = Extent::Null;
    }

    pub fn set_infinite(&mut self) {
        self.extent = Extent::Infinite;
    }

    // ===== MERGING =====

    /// Grow this box to enclose `other`.
    pub fn merge(&mut self, other: &AxisAlignedBox) {
        if other.extent == Extent::Null || self.extent == Extent::Infinite {
            return;
        }
        match (self.extent, other.extent) {
            (_, Extent::Infinite) => self.extent = Extent::Infinite,
            (Extent::Null, _) => self.set_extents(other.minimum, other.maximum),
            _ => {
                let min = self.minimum.min(other.minimum);
                let max = self.maximum.max(other.maximum);
                self.set_extents(min, max);
            }
        }
    }

    /// Grow this box to enclose `point`.
    pub fn merge_point(&mut self, point: Vec3) {
        match self.extent {
            Extent::Null => self.set_extents(point, point),
            Extent::Finite => {
                self.maximum = self.maximum.max(point);
                self.minimum = self.minimum.min(point);
            }
            Extent::Infinite => {}
        }
    }

    // ===== TRANSFORMS =====

    /// Re-bound the box under a general 4x4 transform.
    ///
    /// Transforms all eight corners (with perspective divide) and merges them.
    /// Conservative for non-affine input.
    pub fn transform(&mut self, matrix: &Mat4) {
        if self.extent != Extent::Finite {
            return;
        }
        let corners = self.all_corners();
        self.set_null();
        for corner in corners {
            self.merge_point(matrix.project_point3(corner));
        }
    }

    /// Re-bound the box under an affine transform in O(1).
    ///
    /// The new half size is the old one multiplied by the absolute
    /// value of the linear part.
    pub fn transform_affine(&mut self, affine: &Affine3A) {
        if self.extent != Extent::Finite {
            return;
        }
        let center = affine.transform_point3(self.center());
        let m = affine.matrix3;
        let abs = Mat3A::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs());
        let half = abs.mul_vec3(self.half_size());
        self.set_extents(center - half, center + half);
    }

    /// Scale a finite box about the origin
    pub fn scale(&mut self, factors: Vec3) {
        if self.extent != Extent::Finite {
            return;
        }
        let a = self.minimum * factors;
        let b = self.maximum * factors;
        self.set_extents(a.min(b), a.max(b));
    }

    // ===== INTERSECTION =====

    /// Separating-axis overlap test (touching boxes intersect)
    pub fn intersects(&self, other: &AxisAlignedBox) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        if self.is_infinite() || other.is_infinite() {
            return true;
        }
        !(self.maximum.x < other.minimum.x
            || self.maximum.y < other.minimum.y
            || self.maximum.z < other.minimum.z
            || self.minimum.x > other.maximum.x
            || self.minimum.y > other.maximum.y
            || self.minimum.z > other.maximum.z)
    }

    /// Overlap with a sphere (closest point on box within the radius)
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        match self.extent {
            Extent::Null => false,
            Extent::Infinite => true,
            Extent::Finite => self.squared_distance(sphere.center()) <= sphere.radius() * sphere.radius(),
        }
    }

    /// True when the plane passes through the box
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        plane.side_of_aabb(self) == PlaneSide::Both
    }

    /// Same as `contains_point`
    pub fn intersects_point(&self, point: Vec3) -> bool {
        self.contains_point(point)
    }

    /// Overlapping region, or a null box when the boxes do not overlap.
    ///
    /// Boxes that only touch produce a null box.
    pub fn intersection(&self, other: &AxisAlignedBox) -> AxisAlignedBox {
        if self.is_null() || other.is_null() {
            return AxisAlignedBox::new_null();
        }
        if self.is_infinite() {
            return *other;
        }
        if other.is_infinite() {
            return *self;
        }

        let int_min = self.minimum.max(other.minimum);
        let int_max = self.maximum.min(other.maximum);
        if int_min.cmplt(int_max).all() {
            AxisAlignedBox::new(int_min, int_max)
        } else {
            AxisAlignedBox::new_null()
        }
    }

    pub fn volume(&self) -> f32 {
        match self.extent {
            Extent::Null => 0.0,
            Extent::Finite => {
                let diff = self.maximum - self.minimum;
                diff.x * diff.y * diff.z
            }
            Extent::Infinite => f32::INFINITY,
        }
    }

    // ===== CONTAINMENT & DISTANCE =====

    /// Point containment (boundary included). A null box contains no point.
    pub fn contains_point(&self, point: Vec3) -> bool {
        match self.extent {
            Extent::Null => false,
            Extent::Infinite => true,
            Extent::Finite => self.minimum.cmple(point).all() && point.cmple(self.maximum).all(),
        }
    }

    /// Box containment. A null `other` is contained by every box,
    /// including a null one.
    pub fn contains(&self, other: &AxisAlignedBox) -> bool {
        if other.is_null() || self.is_infinite() {
            return true;
        }
        if self.is_null() || other.is_infinite() {
            return false;
        }
        self.minimum.cmple(other.minimum).all() && other.maximum.cmple(self.maximum).all()
    }

    /// Squared distance from the box to `point`.
    ///
    /// Zero when contained; infinite for a null box.
    pub fn squared_distance(&self, point: Vec3) -> f32 {
        if self.contains_point(point) {
            return 0.0;
        }
        if self.is_null() {
            return f32::INFINITY;
        }
        let below = (self.minimum - point).max(Vec3::ZERO);
        let above = (point - self.maximum).max(Vec3::ZERO);
        (below + above).length_squared()
    }

    pub fn distance(&self, point: Vec3) -> f32 {
        self.squared_distance(point).sqrt()
    }
}

impl Default for AxisAlignedBox {
    fn default() -> Self {
        Self::new_null()
    }
}

impl PartialEq for AxisAlignedBox {
    fn eq(&self, other: &Self) -> bool {
        if self.extent != other.extent {
            return false;
        }
        match self.extent {
            Extent::Finite => self.minimum == other.minimum && self.maximum == other.maximum,
            _ => true,
        }
    }
}

impl fmt::Display for AxisAlignedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extent {
            Extent::Null => write!(f, "AxisAlignedBox(null)"),
            Extent::Finite => write!(f, "AxisAlignedBox(min={}, max={})", self.minimum, self.maximum),
            Extent::Infinite => write!(f, "AxisAlignedBox(infinite)"),
        }
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
