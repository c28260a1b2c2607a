/// Sphere - center and radius.

use glam::Vec3;
use super::aabb::AxisAlignedBox;
use super::plane::Plane;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    // ===== INTERSECTION =====

    pub fn intersects(&self, other: &Sphere) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).length_squared() <= reach * reach
    }

    pub fn intersects_aabb(&self, aabb: &AxisAlignedBox) -> bool {
        aabb.intersects_sphere(self)
    }

    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        plane.distance(self.center).abs() <= self.radius
    }

    pub fn intersects_point(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    /// Grow to the smallest sphere enclosing both spheres.
    ///
    /// If one sphere already contains the other, the larger one is kept.
    pub fn merge(&mut self, other: &Sphere) {
        let diff = other.center - self.center;
        let length_sq = diff.length_squared();
        let radius_diff = other.radius - self.radius;

        if radius_diff * radius_diff >= length_sq {
            if radius_diff > 0.0 {
                *self = *other;
            }
            return;
        }

        let length = length_sq.sqrt();
        let t = (length + radius_diff) / (2.0 * length);
        self.center += diff * t;
        self.radius = 0.5 * (length + self.radius + other.radius);
    }
}

#[cfg(test)]
#[path = "sphere_tests.rs"]
mod tests;
