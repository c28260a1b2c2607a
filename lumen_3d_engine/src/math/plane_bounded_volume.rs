/// PlaneBoundedVolume - convex region bounded by a list of planes.
///
/// Built by `Camera::camera_to_viewport_box_volume` for region picking and
/// by `Frustum::plane_bounded_volume`. `outside` names the side of each
/// plane that lies outside the volume.

use glam::Vec3;
use super::aabb::{AxisAlignedBox, Extent};
use super::plane::{Plane, PlaneSide};
use super::ray::Ray;
use super::sphere::Sphere;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaneBoundedVolume {
    /// Bounding planes
    pub planes: Vec<Plane>,
    /// Side of each plane considered outside
    pub outside: PlaneSide,
}

impl PlaneBoundedVolume {
    pub fn new(outside: PlaneSide) -> Self {
        Self { planes: Vec::new(), outside }
    }

    pub fn with_planes(planes: Vec<Plane>, outside: PlaneSide) -> Self {
        Self { planes, outside }
    }

    /// False as soon as the box lies fully on the outside of one plane
    pub fn intersects_aabb(&self, aabb: &AxisAlignedBox) -> bool {
        match aabb.extent() {
            Extent::Null => false,
            Extent::Infinite => true,
            Extent::Finite => {
                let center = aabb.center();
                let half_size = aabb.half_size();
                self.planes
                    .iter()
                    .all(|plane| plane.side_of_box(center, half_size) != self.outside)
            }
        }
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let radius = sphere.radius();
        self.planes.iter().all(|plane| {
            let distance = plane.distance(sphere.center());
            if self.outside == PlaneSide::Negative {
                distance >= -radius
            } else {
                distance <= radius
            }
        })
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.side(point) != self.outside)
    }

    pub fn intersects_ray(&self, ray: &Ray) -> Option<f32> {
        ray.intersects_volume(self)
    }
}

impl Default for PlaneBoundedVolume {
    fn default() -> Self {
        Self::new(PlaneSide::Negative)
    }
}

#[cfg(test)]
#[path = "plane_bounded_volume_tests.rs"]
mod tests;
