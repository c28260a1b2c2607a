/// Ray - half-line used for viewport picking.
///
/// Intersection methods return the distance along the ray (in units of
/// `direction`) of the first hit, or `None`.

use glam::Vec3;
use super::aabb::{AxisAlignedBox, Extent};
use super::plane::Plane;
use super::plane_bounded_volume::PlaneBoundedVolume;
use super::sphere::Sphere;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    /// Point at distance `t` along the ray
    pub fn point(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Hit distance against a plane. Parallel rays and hits behind the
    /// origin miss.
    pub fn intersects_plane(&self, plane: &Plane) -> Option<f32> {
        self.plane_hit(plane).filter(|t| *t >= 0.0)
    }

    /// Signed hit parameter against a plane, `None` when parallel
    fn plane_hit(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let nom = plane.normal.dot(self.origin) + plane.d;
        Some(-(nom / denom))
    }

    /// Hit distance against a sphere. An origin inside the sphere hits at 0.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> Option<f32> {
        let rel_origin = self.origin - sphere.center();
        let radius = sphere.radius();

        if rel_origin.length_squared() <= radius * radius {
            return Some(0.0);
        }

        let a = self.direction.dot(self.direction);
        let b = 2.0 * rel_origin.dot(self.direction);
        let c = rel_origin.dot(rel_origin) - radius * radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = (-b - root) / (2.0 * a);
        let far = (-b + root) / (2.0 * a);
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }

    /// Hit distance against a box. An origin inside the box hits at 0.
    pub fn intersects_aabb(&self, aabb: &AxisAlignedBox) -> Option<f32> {
        match aabb.extent() {
            Extent::Null => return None,
            Extent::Infinite => return Some(0.0),
            Extent::Finite => {}
        }

        if aabb.contains_point(self.origin) {
            return Some(0.0);
        }

        let min = aabb.minimum();
        let max = aabb.maximum();
        let mut nearest: Option<f32> = None;

        // Only the faces the ray can enter through are tested
        for axis in 0..3 {
            let o = self.origin[axis];
            let dir = self.direction[axis];
            let face = if o <= min[axis] && dir > 0.0 {
                min[axis]
            } else if o >= max[axis] && dir < 0.0 {
                max[axis]
            } else {
                continue;
            };

            let t = (face - o) / dir;
            if t < 0.0 {
                continue;
            }
            let hit = self.point(t);
            let inside_face = (0..3)
                .filter(|other| *other != axis)
                .all(|other| hit[other] >= min[other] && hit[other] <= max[other]);
            if inside_face && nearest.map_or(true, |best| t < best) {
                nearest = Some(t);
            }
        }

        nearest
    }

    /// Hit distance against a convex volume.
    ///
    /// An origin inside every plane hits at 0.
    pub fn intersects_volume(&self, volume: &PlaneBoundedVolume) -> Option<f32> {
        let mut all_inside = true;
        let mut entry: Option<f32> = None;
        let mut exit: Option<f32> = None;

        for plane in &volume.planes {
            let hit = self.plane_hit(plane).filter(|t| *t >= 0.0);
            if plane.side(self.origin) == volume.outside {
                all_inside = false;
                // Outside a plane the ray never crosses: no hit at all
                let t = hit?;
                entry = Some(entry.map_or(t, |e| e.max(t)));
            } else if let Some(t) = hit {
                exit = Some(exit.map_or(t, |e| e.min(t)));
            }
        }

        if all_inside {
            return Some(0.0);
        }

        let entry = entry?;
        match exit {
            Some(exit) if exit < entry => None,
            _ => Some(entry),
        }
    }
}

#[cfg(test)]
#[path = "ray_tests.rs"]
mod tests;
