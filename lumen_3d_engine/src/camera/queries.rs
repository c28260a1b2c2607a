/// Visibility queries shared by frustums and cameras.
///
/// A `Camera` answers these through its culling frustum when one is set,
/// so culling code is written against the trait rather than a concrete type.

use glam::{Mat4, Vec3};
use crate::math::{AxisAlignedBox, Plane, Sphere};
use super::frustum::FrustumPlane;

/// Outcome of a visibility test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Inside or intersecting the frustum
    Visible,
    /// Nothing to see (null bounding box)
    Empty,
    /// Entirely outside; the first plane that rejected it
    Culled(FrustumPlane),
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }

    /// Plane that culled the volume, if any
    pub fn culled_by(self) -> Option<FrustumPlane> {
        match self {
            Visibility::Culled(plane) => Some(plane),
            _ => None,
        }
    }
}

/// Rectangle in normalized device coordinates ([-1, 1] on both axes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdcRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl NdcRect {
    /// The whole screen
    pub const FULL: NdcRect = NdcRect { left: -1.0, top: 1.0, right: 1.0, bottom: -1.0 };
}

impl Default for NdcRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Queries answered by "the frustum used for culling".
///
/// Queries take `&mut self`: they may refresh lazily derived state.
pub trait FrustumQueries {
    /// Classify a box; the first culling plane is reported
    fn test_aabb(&mut self, aabb: &AxisAlignedBox) -> Visibility;

    fn test_sphere(&mut self, sphere: &Sphere) -> Visibility;

    fn test_point(&mut self, point: Vec3) -> Visibility;

    /// The six world-space clip planes, indexed by `FrustumPlane`
    fn frustum_planes(&mut self) -> [Plane; 6];

    /// Corners: near (TR, TL, BL, BR) then far (TR, TL, BL, BR)
    fn world_space_corners(&mut self) -> [Vec3; 8];

    fn view_matrix(&mut self) -> Mat4;

    fn near_clip_distance(&self) -> f32;

    /// Far clip distance; 0 means infinite
    fn far_clip_distance(&self) -> f32;

    /// Screen-space bounds of a sphere's silhouette.
    ///
    /// `None` when the sphere does not restrict the screen (it contains the
    /// eye, lies behind it, or covers everything).
    fn project_sphere(&mut self, sphere: &Sphere) -> Option<NdcRect>;

    fn is_visible_aabb(&mut self, aabb: &AxisAlignedBox) -> bool {
        self.test_aabb(aabb).is_visible()
    }

    fn is_visible_sphere(&mut self, sphere: &Sphere) -> bool {
        self.test_sphere(sphere).is_visible()
    }

    fn is_visible_point(&mut self, point: Vec3) -> bool {
        self.test_point(point).is_visible()
    }

    fn frustum_plane(&mut self, plane: FrustumPlane) -> Plane {
        self.frustum_planes()[plane.index()]
    }
}
