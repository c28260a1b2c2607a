//! Math module - geometric primitives for visibility and projection.
//!
//! Value types built on glam: bounding boxes with null/finite/infinite
//! states, planes with side classification, spheres, rays and convex
//! plane-bounded volumes, plus the matrix helpers used by the frustum.

mod aabb;
mod plane;
mod sphere;
mod ray;
mod plane_bounded_volume;
mod util;

pub use aabb::{AxisAlignedBox, Extent, Corner};
pub use plane::{Plane, PlaneSide};
pub use sphere::Sphere;
pub use ray::Ray;
pub use plane_bounded_volume::PlaneBoundedVolume;
pub use util::{
    build_reflection_matrix, make_view_matrix, mat4_from_rows,
    reflect, rotation_to, sign,
};
