/// Frustum - projection, view, clip planes and corners derived on demand.
///
/// A frustum is described by a handful of parameters (projection type,
/// field of view, clip distances, pose, reflection and oblique near plane).
/// Everything else is derived lazily and cached:
///
/// ```text
///   pose / node / reflection ──> VIEW ───────┐
///                                            ├──> PLANES, CORNERS
///   fov / near / far / extents ─> PROJECTION ┘
///   oblique near plane (needs VIEW) ─> PROJECTION
/// ```
///
/// Setters only mark caches stale; the next query recomputes what it needs.
/// The frustum looks down its local -Z axis.

use std::fmt;
use std::rc::{Rc, Weak};
use bitflags::bitflags;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::math::{
    AxisAlignedBox, Plane, PlaneBoundedVolume, PlaneSide, Sphere,
    build_reflection_matrix, make_view_matrix, mat4_from_rows, reflect, rotation_to, sign,
};
use crate::renderer::{RenderQueue, RENDER_QUEUE_MAIN, DEFAULT_RENDERABLE_PRIORITY};
use crate::scene::{NodeTransform, PlaneProvider};
use crate::{engine_bail, engine_error, engine_trace, engine_warn};
use super::queries::{FrustumQueries, NdcRect, Visibility};
use super::wireframe::FrustumWireframe;

const LOG_SOURCE: &str = "lumen3d::Frustum";

/// Depth adjustment keeping an infinite far plane projection well defined
pub const INFINITE_FAR_PLANE_ADJUST: f32 = 0.00001;

/// Stand-in far distance for bounds and corners when the far plane is infinite
pub const INFINITE_FAR_DISTANCE: f32 = 100000.0;

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionType {
    Orthographic,
    #[default]
    Perspective,
}

/// Index of a clip plane in `frustum_planes()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    Near = 0,
    Far = 1,
    Left = 2,
    Right = 3,
    Top = 4,
    Bottom = 5,
}

impl FrustumPlane {
    /// All planes in index order
    pub const ALL: [FrustumPlane; 6] = [
        FrustumPlane::Near,
        FrustumPlane::Far,
        FrustumPlane::Left,
        FrustumPlane::Right,
        FrustumPlane::Top,
        FrustumPlane::Bottom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Result of a 3-way frustum/AABB classification.
///
/// Used for hierarchical culling:
/// - `Outside` → skip the entire subtree
/// - `Inside` → collect everything below without further testing
/// - `Partial` → test children individually
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB partially overlaps the frustum
    Partial,
}

/// Near-plane rectangle in eye space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrustumExtents {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl FrustumExtents {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self { left, right, top, bottom }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Construction parameters for a `Frustum`
#[derive(Debug, Clone, PartialEq)]
pub struct FrustumDesc {
    pub projection_type: ProjectionType,
    /// Vertical field of view, radians
    pub fov_y: f32,
    pub near_distance: f32,
    /// 0 means an infinite far plane
    pub far_distance: f32,
    pub aspect_ratio: f32,
    /// Orthographic window height, world units
    pub ortho_height: f32,
    pub focal_length: f32,
    pub frustum_offset: Vec2,
}

impl Default for FrustumDesc {
    fn default() -> Self {
        Self {
            projection_type: ProjectionType::Perspective,
            fov_y: std::f32::consts::FRAC_PI_4,
            near_distance: 100.0,
            far_distance: 100000.0,
            aspect_ratio: 1.333_333_3,
            ortho_height: 1000.0,
            focal_length: 1.0,
            frustum_offset: Vec2::ZERO,
        }
    }
}

bitflags! {
    /// Derived state that must be recomputed before the next read
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Stale: u8 {
        const VIEW = 1 << 0;
        const PROJECTION = 1 << 1;
        const PLANES = 1 << 2;
        const CORNERS = 1 << 3;
    }
}

/// Read a linked plane, dropping the link when its provider is gone
fn poll_linked_plane(link: &mut Option<Weak<dyn PlaneProvider>>, what: &str) -> Option<Plane> {
    let provider = link.as_ref()?.upgrade();
    match provider {
        Some(provider) => Some(provider.derived_plane()),
        None => {
            engine_warn!(LOG_SOURCE, "Linked {} plane was dropped, keeping its last value", what);
            *link = None;
            None
        }
    }
}

/// Lazily evaluated view volume
#[derive(Clone)]
pub struct Frustum {
    name: String,

    // Projection parameters
    projection_type: ProjectionType,
    fov_y: f32,
    near_distance: f32,
    far_distance: f32,
    aspect: f32,
    ortho_height: f32,
    focal_length: f32,
    frustum_offset: Vec2,
    manual_extents: Option<FrustumExtents>,
    custom_view_matrix: Option<Mat4>,
    custom_projection_matrix: Option<Mat4>,

    // Pose relative to the attachment node
    position: Vec3,
    orientation: Quat,
    node: Option<Weak<dyn NodeTransform>>,
    last_parent_orientation: Quat,
    last_parent_position: Vec3,
    real_orientation: Quat,
    real_position: Vec3,
    derived_orientation: Quat,
    derived_position: Vec3,

    // Reflection
    reflect: bool,
    reflect_plane: Plane,
    reflect_matrix: Mat4,
    linked_reflect_plane: Option<Weak<dyn PlaneProvider>>,
    last_linked_reflect_plane: Plane,

    // Oblique near plane
    oblique_depth_projection: bool,
    oblique_plane: Plane,
    linked_oblique_plane: Option<Weak<dyn PlaneProvider>>,
    last_linked_oblique_plane: Plane,

    // Derived state
    stale: Stale,
    view_revision: u64,
    projection_revision: u64,
    extents: FrustumExtents,
    projection_matrix: Mat4,
    projection_matrix_rs: Mat4,
    projection_matrix_rs_depth: Mat4,
    view_matrix: Mat4,
    planes: [Plane; 6],
    corners: [Vec3; 8],
    bounding_box: AxisAlignedBox,

    // Debug display
    debug_display: bool,
    render_queue_group: u8,
}

impl Frustum {
    /// Create a perspective frustum with default parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), &FrustumDesc::default())
    }

    /// Create a frustum from a descriptor.
    ///
    /// Fails when the near distance or focal length is not positive.
    pub fn from_desc(name: impl Into<String>, desc: &FrustumDesc) -> Result<Self> {
        let name = name.into();
        if desc.near_distance <= 0.0 {
            engine_bail!(LOG_SOURCE, "Frustum '{}': near clip distance must be > 0, got {}",
                name, desc.near_distance);
        }
        if desc.focal_length <= 0.0 {
            engine_bail!(LOG_SOURCE, "Frustum '{}': focal length must be > 0, got {}",
                name, desc.focal_length);
        }
        Ok(Self::build(name, desc))
    }

    fn build(name: String, desc: &FrustumDesc) -> Self {
        Self {
            name,
            projection_type: desc.projection_type,
            fov_y: desc.fov_y,
            near_distance: desc.near_distance,
            far_distance: desc.far_distance,
            aspect: desc.aspect_ratio,
            ortho_height: desc.ortho_height,
            focal_length: desc.focal_length,
            frustum_offset: desc.frustum_offset,
            manual_extents: None,
            custom_view_matrix: None,
            custom_projection_matrix: None,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            node: None,
            last_parent_orientation: Quat::IDENTITY,
            last_parent_position: Vec3::ZERO,
            real_orientation: Quat::IDENTITY,
            real_position: Vec3::ZERO,
            derived_orientation: Quat::IDENTITY,
            derived_position: Vec3::ZERO,
            reflect: false,
            reflect_plane: Plane::default(),
            reflect_matrix: Mat4::IDENTITY,
            linked_reflect_plane: None,
            last_linked_reflect_plane: Plane::default(),
            oblique_depth_projection: false,
            oblique_plane: Plane::default(),
            linked_oblique_plane: None,
            last_linked_oblique_plane: Plane::default(),
            stale: Stale::all(),
            view_revision: 0,
            projection_revision: 0,
            extents: FrustumExtents::default(),
            projection_matrix: Mat4::ZERO,
            projection_matrix_rs: Mat4::ZERO,
            projection_matrix_rs_depth: Mat4::ZERO,
            view_matrix: Mat4::ZERO,
            planes: [Plane::default(); 6],
            corners: [Vec3::ZERO; 8],
            bounding_box: AxisAlignedBox::new_null(),
            debug_display: false,
            render_queue_group: RENDER_QUEUE_MAIN,
        }
    }

    // ===== PARAMETER GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    /// Vertical field of view, radians
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    pub fn frustum_offset(&self) -> Vec2 {
        self.frustum_offset
    }

    pub fn ortho_window_height(&self) -> f32 {
        self.ortho_height
    }

    pub fn ortho_window_width(&self) -> f32 {
        self.ortho_height * self.aspect
    }

    /// Position relative to the attachment node
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation relative to the attachment node
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn is_attached(&self) -> bool {
        self.parent_node().is_some()
    }

    pub fn is_reflected(&self) -> bool {
        self.reflect
    }

    pub fn is_custom_near_clip_plane_enabled(&self) -> bool {
        self.oblique_depth_projection
    }

    pub fn is_custom_view_matrix_enabled(&self) -> bool {
        self.custom_view_matrix.is_some()
    }

    pub fn is_custom_projection_matrix_enabled(&self) -> bool {
        self.custom_projection_matrix.is_some()
    }

    pub fn has_manual_extents(&self) -> bool {
        self.manual_extents.is_some()
    }

    /// Incremented every time the view matrix is rebuilt
    pub fn view_revision(&self) -> u64 {
        self.view_revision
    }

    /// Incremented every time the projection matrix is rebuilt
    pub fn projection_revision(&self) -> u64 {
        self.projection_revision
    }

    pub(crate) fn parent_node(&self) -> Option<Rc<dyn NodeTransform>> {
        self.node.as_ref().and_then(Weak::upgrade)
    }

    // ===== PARAMETER SETTERS =====

    /// Set the vertical field of view (radians)
    pub fn set_fov_y(&mut self, fov_y: f32) {
        self.fov_y = fov_y;
        self.invalidate_frustum();
    }

    pub fn set_near_clip_distance(&mut self, near: f32) -> Result<()> {
        if near <= 0.0 {
            engine_bail!(LOG_SOURCE, "Frustum '{}': near clip distance must be > 0, got {}",
                self.name, near);
        }
        self.near_distance = near;
        self.invalidate_frustum();
        Ok(())
    }

    /// Set the far clip distance; 0 makes the far plane infinite
    pub fn set_far_clip_distance(&mut self, far: f32) {
        self.far_distance = far;
        self.invalidate_frustum();
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.invalidate_frustum();
    }

    /// Shift the perspective window (in focal-plane units)
    pub fn set_frustum_offset(&mut self, offset: Vec2) {
        self.frustum_offset = offset;
        self.invalidate_frustum();
    }

    pub fn set_focal_length(&mut self, focal_length: f32) -> Result<()> {
        if focal_length <= 0.0 {
            engine_bail!(LOG_SOURCE, "Frustum '{}': focal length must be > 0, got {}",
                self.name, focal_length);
        }
        self.focal_length = focal_length;
        self.invalidate_frustum();
        Ok(())
    }

    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        if projection_type == ProjectionType::Orthographic && self.oblique_depth_projection {
            engine_warn!(LOG_SOURCE,
                "Frustum '{}': custom near clip plane is ignored by orthographic projections",
                self.name);
        }
        self.projection_type = projection_type;
        self.invalidate_frustum();
    }

    /// Set the orthographic window; the aspect ratio becomes `width / height`
    pub fn set_ortho_window(&mut self, width: f32, height: f32) {
        self.ortho_height = height;
        self.aspect = width / height;
        self.invalidate_frustum();
    }

    /// Set the orthographic window height, keeping the aspect ratio
    pub fn set_ortho_window_height(&mut self, height: f32) {
        self.ortho_height = height;
        self.invalidate_frustum();
    }

    /// Set the orthographic window width, keeping the aspect ratio
    pub fn set_ortho_window_width(&mut self, width: f32) {
        self.ortho_height = width / self.aspect;
        self.invalidate_frustum();
    }

    /// Override the near-plane rectangle computed from fov / aspect
    pub fn set_frustum_extents(&mut self, left: f32, right: f32, top: f32, bottom: f32) {
        self.manual_extents = Some(FrustumExtents::new(left, right, top, bottom));
        self.invalidate_frustum();
    }

    pub fn reset_frustum_extents(&mut self) {
        self.manual_extents = None;
        self.invalidate_frustum();
    }

    /// Use `matrix` as the view matrix instead of deriving it from the pose
    pub fn set_custom_view_matrix(&mut self, matrix: Option<Mat4>) {
        self.custom_view_matrix = matrix;
        self.invalidate_view();
    }

    /// Use `matrix` as the projection matrix instead of building one
    pub fn set_custom_projection_matrix(&mut self, matrix: Option<Mat4>) {
        self.custom_projection_matrix = matrix;
        self.invalidate_frustum();
    }

    // ===== POSE =====

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate_view();
    }

    /// Set the local orientation (normalised)
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
        self.invalidate_view();
    }

    /// Follow `node`: the pose becomes relative to its derived transform
    pub fn attach_to_node<N: NodeTransform + 'static>(&mut self, node: &Rc<N>) {
        let weak = Rc::downgrade(node) as Weak<dyn NodeTransform>;
        self.node = Some(weak);
        self.invalidate_view();
    }

    pub fn detach_from_node(&mut self) {
        self.node = None;
        self.invalidate_view();
    }

    // ===== REFLECTION =====

    /// Mirror the view through a fixed plane
    pub fn enable_reflection(&mut self, plane: Plane) {
        self.reflect = true;
        self.reflect_plane = plane;
        self.linked_reflect_plane = None;
        self.reflect_matrix = build_reflection_matrix(&plane);
        self.invalidate_view();
    }

    /// Mirror the view through a plane owned by another object, re-read on
    /// every query
    pub fn enable_linked_reflection<P: PlaneProvider + 'static>(&mut self, provider: &Rc<P>) {
        let plane = provider.derived_plane();
        let weak = Rc::downgrade(provider) as Weak<dyn PlaneProvider>;
        self.reflect = true;
        self.linked_reflect_plane = Some(weak);
        self.reflect_plane = plane;
        self.reflect_matrix = build_reflection_matrix(&plane);
        self.last_linked_reflect_plane = plane;
        self.invalidate_view();
    }

    pub fn disable_reflection(&mut self) {
        self.reflect = false;
        self.linked_reflect_plane = None;
        self.last_linked_reflect_plane = Plane::default();
        self.invalidate_view();
    }

    pub fn reflection_plane(&self) -> Plane {
        self.reflect_plane
    }

    /// Reflection matrix (identity when not reflecting)
    pub fn reflection_matrix(&mut self) -> Mat4 {
        self.update_view();
        if self.reflect { self.reflect_matrix } else { Mat4::IDENTITY }
    }

    // ===== OBLIQUE NEAR PLANE =====

    /// Clip against `plane` instead of the near plane.
    ///
    /// The plane's positive side is kept, so the eye must sit on its
    /// negative side (e.g. a camera reflected below a water surface whose
    /// normal points up). Only perspective projections support this.
    pub fn enable_custom_near_clip_plane(&mut self, plane: Plane) -> Result<()> {
        self.check_oblique_supported()?;
        self.oblique_depth_projection = true;
        self.linked_oblique_plane = None;
        self.oblique_plane = plane;
        self.invalidate_frustum();
        Ok(())
    }

    /// Clip against a plane owned by another object, re-read on every query
    pub fn enable_linked_custom_near_clip_plane<P: PlaneProvider + 'static>(
        &mut self,
        provider: &Rc<P>,
    ) -> Result<()> {
        self.check_oblique_supported()?;
        let plane = provider.derived_plane();
        let weak = Rc::downgrade(provider) as Weak<dyn PlaneProvider>;
        self.oblique_depth_projection = true;
        self.linked_oblique_plane = Some(weak);
        self.oblique_plane = plane;
        self.last_linked_oblique_plane = plane;
        self.invalidate_frustum();
        Ok(())
    }

    pub fn disable_custom_near_clip_plane(&mut self) {
        self.oblique_depth_projection = false;
        self.linked_oblique_plane = None;
        self.invalidate_frustum();
    }

    fn check_oblique_supported(&self) -> Result<()> {
        if self.projection_type == ProjectionType::Orthographic {
            let message = format!(
                "Frustum '{}': custom near clip planes require a perspective projection",
                self.name
            );
            engine_error!(LOG_SOURCE, "{}", message);
            return Err(Error::UnsupportedOperation(message));
        }
        Ok(())
    }

    // ===== INVALIDATION =====

    /// Mark the projection and everything derived from it as stale
    pub fn invalidate_frustum(&mut self) {
        self.stale |= Stale::PROJECTION | Stale::PLANES | Stale::CORNERS;
    }

    /// Mark the view and everything derived from it as stale
    pub fn invalidate_view(&mut self) {
        self.stale |= Stale::VIEW | Stale::PLANES | Stale::CORNERS;
    }

    /// Poll the node and the linked reflection plane; refresh the real and
    /// derived pose when the view is stale
    fn is_view_out_of_date(&mut self) -> bool {
        let (parent_orientation, parent_position) = match self.parent_node() {
            Some(node) => (node.derived_orientation(), node.derived_position()),
            None => (Quat::IDENTITY, Vec3::ZERO),
        };
        if parent_orientation != self.last_parent_orientation
            || parent_position != self.last_parent_position
        {
            self.last_parent_orientation = parent_orientation;
            self.last_parent_position = parent_position;
            self.invalidate_view();
        }

        if self.reflect {
            if let Some(plane) = poll_linked_plane(&mut self.linked_reflect_plane, "reflection") {
                if plane != self.last_linked_reflect_plane {
                    self.reflect_plane = plane;
                    self.reflect_matrix = build_reflection_matrix(&plane);
                    self.last_linked_reflect_plane = plane;
                    self.invalidate_view();
                }
            }
        }

        if self.stale.contains(Stale::VIEW) {
            self.real_orientation = parent_orientation * self.orientation;
            self.real_position = parent_orientation * self.position + parent_position;

            if self.reflect {
                // Mirror the direction, keeping the up vector as the fallback axis
                let dir = self.real_orientation * Vec3::NEG_Z;
                let reflected_dir = reflect(dir, self.reflect_plane.normal);
                let up = self.real_orientation * Vec3::Y;
                self.derived_orientation =
                    rotation_to(dir, reflected_dir, up) * self.real_orientation;
                self.derived_position = self.reflect_matrix.transform_point3(self.real_position);
            } else {
                self.derived_orientation = self.real_orientation;
                self.derived_position = self.real_position;
            }
        }

        self.stale.contains(Stale::VIEW)
    }

    /// Poll the linked oblique plane; the projection depends on the view
    /// while an oblique plane is active
    fn is_frustum_out_of_date(&mut self) -> bool {
        if self.oblique_depth_projection {
            if self.is_view_out_of_date() {
                self.stale |= Stale::PROJECTION;
            }
            if let Some(plane) = poll_linked_plane(&mut self.linked_oblique_plane, "near clip") {
                if plane != self.last_linked_oblique_plane {
                    self.oblique_plane = plane;
                    self.last_linked_oblique_plane = plane;
                    self.invalidate_frustum();
                }
            }
        }
        self.stale.contains(Stale::PROJECTION)
    }

    // ===== DERIVATION =====

    pub(crate) fn update_view(&mut self) {
        if self.is_view_out_of_date() {
            self.update_view_impl();
        }
    }

    fn update_view_impl(&mut self) {
        self.view_matrix = match self.custom_view_matrix {
            Some(matrix) => matrix,
            None => {
                let reflect_matrix = if self.reflect { Some(&self.reflect_matrix) } else { None };
                make_view_matrix(self.real_position, self.real_orientation, reflect_matrix)
            }
        };

        self.stale.remove(Stale::VIEW);
        self.stale |= Stale::PLANES | Stale::CORNERS;
        if self.oblique_depth_projection {
            // The oblique plane is expressed in view space
            self.stale |= Stale::PROJECTION;
        }
        self.view_revision += 1;

        engine_trace!(LOG_SOURCE, "Frustum '{}': view matrix rebuilt (revision {})",
            self.name, self.view_revision);
    }

    pub(crate) fn update_frustum(&mut self) {
        if self.is_frustum_out_of_date() {
            self.update_frustum_impl();
        }
    }

    fn update_frustum_impl(&mut self) {
        let extents = self.calc_projection_parameters();
        self.extents = extents;
        let FrustumExtents { left, right, top, bottom } = extents;

        match self.custom_projection_matrix {
            Some(matrix) => self.projection_matrix = matrix,
            None => {
                let inv_w = 1.0 / (right - left);
                let inv_h = 1.0 / (top - bottom);
                let inv_d = 1.0 / (self.far_distance - self.near_distance);
                let near = self.near_distance;

                match self.projection_type {
                    ProjectionType::Perspective => {
                        let a = 2.0 * near * inv_w;
                        let b = 2.0 * near * inv_h;
                        let c = (right + left) * inv_w;
                        let d = (top + bottom) * inv_h;
                        let (q, qn) = if self.far_distance == 0.0 {
                            (INFINITE_FAR_PLANE_ADJUST - 1.0, near * (INFINITE_FAR_PLANE_ADJUST - 2.0))
                        } else {
                            (-(self.far_distance + near) * inv_d, -2.0 * self.far_distance * near * inv_d)
                        };

                        self.projection_matrix = mat4_from_rows([
                            [a, 0.0, c, 0.0],
                            [0.0, b, d, 0.0],
                            [0.0, 0.0, q, qn],
                            [0.0, 0.0, -1.0, 0.0],
                        ]);

                        if self.oblique_depth_projection {
                            self.apply_oblique_near_plane();
                        }
                    }
                    ProjectionType::Orthographic => {
                        let a = 2.0 * inv_w;
                        let b = 2.0 * inv_h;
                        let c = -(right + left) * inv_w;
                        let d = -(top + bottom) * inv_h;
                        let (q, qn) = if self.far_distance == 0.0 {
                            (-INFINITE_FAR_PLANE_ADJUST / near, -INFINITE_FAR_PLANE_ADJUST - 1.0)
                        } else {
                            (-2.0 * inv_d, -(self.far_distance + near) * inv_d)
                        };

                        self.projection_matrix = mat4_from_rows([
                            [a, 0.0, 0.0, c],
                            [0.0, b, 0.0, d],
                            [0.0, 0.0, q, qn],
                            [0.0, 0.0, 0.0, 1.0],
                        ]);
                    }
                }
            }
        }

        match Engine::render_backend() {
            Some(backend) => {
                self.projection_matrix_rs =
                    backend.convert_projection_matrix(&self.projection_matrix, false);
                self.projection_matrix_rs_depth =
                    backend.convert_projection_matrix(&self.projection_matrix, true);
            }
            None => {
                self.projection_matrix_rs = self.projection_matrix;
                self.projection_matrix_rs_depth = self.projection_matrix;
            }
        }

        self.update_bounding_box(&extents);

        self.stale.remove(Stale::PROJECTION);
        self.stale |= Stale::PLANES | Stale::CORNERS;
        self.projection_revision += 1;

        engine_trace!(LOG_SOURCE, "Frustum '{}': projection rebuilt (revision {})",
            self.name, self.projection_revision);
    }

    /// Replace the depth row so the near clip plane becomes the oblique plane
    /// (Lengyel's oblique near-plane clipping)
    fn apply_oblique_near_plane(&mut self) {
        self.update_view();
        let clip = self.oblique_plane.transformed(&self.view_matrix);

        let mut rows = self.projection_matrix.transpose().to_cols_array_2d();

        // Clip-space corner opposite the plane, back in eye space
        let q = Vec4::new(
            (sign(clip.normal.x) + rows[0][2]) / rows[0][0],
            (sign(clip.normal.y) + rows[1][2]) / rows[1][1],
            -1.0,
            (1.0 + rows[2][2]) / rows[2][3],
        );

        let plane = clip.to_vec4();
        let c = plane * (2.0 / plane.dot(q));
        rows[2] = [c.x, c.y, c.z + 1.0, c.w];

        self.projection_matrix = mat4_from_rows(rows);
    }

    /// Near-plane rectangle for the current parameters
    fn calc_projection_parameters(&self) -> FrustumExtents {
        if let Some(matrix) = self.custom_projection_matrix {
            // Unproject the full NDC near rectangle (corners at +-1 on z = -1,
            // not the half-size rectangle at mid depth)
            let inverse = matrix.inverse();
            let top_left = inverse.project_point3(Vec3::new(-1.0, 1.0, -1.0));
            let bottom_right = inverse.project_point3(Vec3::new(1.0, -1.0, -1.0));
            return FrustumExtents::new(top_left.x, bottom_right.x, top_left.y, bottom_right.y);
        }

        if let Some(extents) = self.manual_extents {
            return extents;
        }

        match self.projection_type {
            ProjectionType::Perspective => {
                let half_h = (self.fov_y * 0.5).tan() * self.near_distance;
                let half_w = half_h * self.aspect;
                let near_focal = self.near_distance / self.focal_length;
                let offset = self.frustum_offset * near_focal;
                FrustumExtents::new(
                    -half_w + offset.x,
                    half_w + offset.x,
                    half_h + offset.y,
                    -half_h + offset.y,
                )
            }
            ProjectionType::Orthographic => {
                // Frustum offset has no meaning for orthographic projections
                let half_h = self.ortho_height * 0.5;
                let half_w = half_h * self.aspect;
                FrustumExtents::new(-half_w, half_w, half_h, -half_h)
            }
        }
    }

    fn effective_far_distance(&self) -> f32 {
        if self.far_distance == 0.0 { INFINITE_FAR_DISTANCE } else { self.far_distance }
    }

    /// Ratio from near-plane to far-plane extents
    fn far_extents_ratio(&self) -> f32 {
        match self.projection_type {
            ProjectionType::Perspective => self.effective_far_distance() / self.near_distance,
            ProjectionType::Orthographic => 1.0,
        }
    }

    fn update_bounding_box(&mut self, extents: &FrustumExtents) {
        let far = self.effective_far_distance();
        let mut min = Vec3::new(extents.left, extents.bottom, -far);
        let mut max = Vec3::new(extents.right, extents.top, 0.0);

        if self.custom_projection_matrix.is_some() {
            // Custom matrices may flip axes
            let corner = min;
            min = min.min(max);
            max = max.max(corner);
        }

        if self.projection_type == ProjectionType::Perspective {
            let ratio = far / self.near_distance;
            min = min.min(Vec3::new(extents.left * ratio, extents.bottom * ratio, -far));
            max = max.max(Vec3::new(extents.right * ratio, extents.top * ratio, 0.0));
        }

        self.bounding_box = AxisAlignedBox::new(min, max);
    }

    fn update_frustum_planes(&mut self) {
        self.update_view();
        self.update_frustum();

        if !self.stale.contains(Stale::PLANES) {
            return;
        }

        // Gribb & Hartmann on the combined matrix
        let combo = self.projection_matrix * self.view_matrix;
        let (r0, r1, r2, r3) = (combo.row(0), combo.row(1), combo.row(2), combo.row(3));

        self.planes[FrustumPlane::Left.index()] = Plane::from_vec4(r3 + r0);
        self.planes[FrustumPlane::Right.index()] = Plane::from_vec4(r3 - r0);
        self.planes[FrustumPlane::Top.index()] = Plane::from_vec4(r3 - r1);
        self.planes[FrustumPlane::Bottom.index()] = Plane::from_vec4(r3 + r1);
        self.planes[FrustumPlane::Near.index()] = Plane::from_vec4(r3 + r2);
        self.planes[FrustumPlane::Far.index()] = Plane::from_vec4(r3 - r2);

        for plane in self.planes.iter_mut() {
            plane.normalise();
        }

        self.stale.remove(Stale::PLANES);
    }

    fn update_world_space_corners(&mut self) {
        self.update_view();
        self.update_frustum();

        if !self.stale.contains(Stale::CORNERS) {
            return;
        }

        let eye_to_world = self.view_matrix.inverse();
        let FrustumExtents { left, right, top, bottom } = self.extents;
        let near = self.near_distance;
        let far = self.effective_far_distance();
        let ratio = self.far_extents_ratio();
        let (far_left, far_right) = (left * ratio, right * ratio);
        let (far_top, far_bottom) = (top * ratio, bottom * ratio);

        let eye_corners = [
            Vec3::new(right, top, -near),
            Vec3::new(left, top, -near),
            Vec3::new(left, bottom, -near),
            Vec3::new(right, bottom, -near),
            Vec3::new(far_right, far_top, -far),
            Vec3::new(far_left, far_top, -far),
            Vec3::new(far_left, far_bottom, -far),
            Vec3::new(far_right, far_bottom, -far),
        ];
        for (corner, eye) in self.corners.iter_mut().zip(eye_corners) {
            *corner = eye_to_world.transform_point3(eye);
        }

        self.stale.remove(Stale::CORNERS);
    }

    // ===== DERIVED GETTERS =====

    /// Standard right-handed projection matrix, depth in [-1, 1]
    pub fn projection_matrix(&mut self) -> Mat4 {
        self.update_frustum();
        self.projection_matrix
    }

    /// Projection matrix in the render backend's fixed-function convention
    pub fn projection_matrix_rs(&mut self) -> Mat4 {
        self.update_frustum();
        self.projection_matrix_rs
    }

    /// Projection matrix in the render backend's depth range, for GPU programs
    pub fn projection_matrix_with_rs_depth(&mut self) -> Mat4 {
        self.update_frustum();
        self.projection_matrix_rs_depth
    }

    /// View matrix with the eye translated by `relative_position`
    pub fn view_matrix_relative(&mut self, relative_position: Vec3) -> Mat4 {
        self.update_view();
        self.view_matrix * Mat4::from_translation(relative_position)
    }

    /// Current near-plane rectangle
    pub fn frustum_extents(&mut self) -> FrustumExtents {
        self.update_frustum();
        self.extents
    }

    /// Bounds of the frustum volume in local space
    pub fn bounding_box(&mut self) -> AxisAlignedBox {
        self.update_frustum();
        self.bounding_box
    }

    pub fn bounding_radius(&self) -> f32 {
        self.effective_far_distance()
    }

    /// The frustum as a convex volume
    pub fn plane_bounded_volume(&mut self) -> PlaneBoundedVolume {
        self.update_frustum_planes();
        let order = [
            FrustumPlane::Near,
            FrustumPlane::Far,
            FrustumPlane::Bottom,
            FrustumPlane::Top,
            FrustumPlane::Left,
            FrustumPlane::Right,
        ];
        let planes = order.iter().map(|plane| self.planes[plane.index()]).collect();
        PlaneBoundedVolume::with_planes(planes, PlaneSide::Negative)
    }

    /// World orientation before reflection
    pub fn real_orientation(&mut self) -> Quat {
        self.update_view();
        self.real_orientation
    }

    /// World position before reflection
    pub fn real_position(&mut self) -> Vec3 {
        self.update_view();
        self.real_position
    }

    /// World orientation, reflected when reflection is enabled
    pub fn derived_orientation(&mut self) -> Quat {
        self.update_view();
        self.derived_orientation
    }

    /// World position, reflected when reflection is enabled
    pub fn derived_position(&mut self) -> Vec3 {
        self.update_view();
        self.derived_position
    }

    pub fn derived_direction(&mut self) -> Vec3 {
        self.derived_orientation() * Vec3::NEG_Z
    }

    pub fn derived_up(&mut self) -> Vec3 {
        self.derived_orientation() * Vec3::Y
    }

    pub fn derived_right(&mut self) -> Vec3 {
        self.derived_orientation() * Vec3::X
    }

    /// Classify a box as outside, inside or straddling the frustum
    pub fn classify_aabb(&mut self, aabb: &AxisAlignedBox) -> FrustumTest {
        if aabb.is_null() {
            return FrustumTest::Outside;
        }
        if aabb.is_infinite() {
            return FrustumTest::Partial;
        }

        self.update_frustum_planes();
        let center = aabb.center();
        let half_size = aabb.half_size();
        let mut all_inside = true;

        for plane in FrustumPlane::ALL {
            if self.skips_plane(plane) {
                continue;
            }
            match self.planes[plane.index()].side_of_box(center, half_size) {
                PlaneSide::Negative => return FrustumTest::Outside,
                PlaneSide::Both => all_inside = false,
                _ => {}
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    fn skips_plane(&self, plane: FrustumPlane) -> bool {
        plane == FrustumPlane::Far && self.far_distance == 0.0
    }

    // ===== DEBUG DISPLAY =====

    pub fn set_debug_display_enabled(&mut self, enabled: bool) {
        self.debug_display = enabled;
    }

    pub fn is_debug_display_enabled(&self) -> bool {
        self.debug_display
    }

    pub fn render_queue_group(&self) -> u8 {
        self.render_queue_group
    }

    pub fn set_render_queue_group(&mut self, queue_id: u8) {
        self.render_queue_group = queue_id;
    }

    /// World transform of the (unreflected) eye
    pub fn world_transform(&mut self) -> Mat4 {
        self.update_view();
        Mat4::from_rotation_translation(self.real_orientation, self.real_position)
    }

    /// Outline of the frustum in eye space as a line list.
    ///
    /// 32 vertices: near rectangle, far rectangle, eye to near corners, then
    /// near to far corners.
    pub fn debug_line_vertices(&mut self) -> Vec<Vec3> {
        self.update_frustum();
        let FrustumExtents { left, right, top, bottom } = self.extents;
        let near = self.near_distance;
        let far = self.effective_far_distance();
        let ratio = self.far_extents_ratio();

        let near_tl = Vec3::new(left, top, -near);
        let near_tr = Vec3::new(right, top, -near);
        let near_br = Vec3::new(right, bottom, -near);
        let near_bl = Vec3::new(left, bottom, -near);
        let far_tl = Vec3::new(left * ratio, top * ratio, -far);
        let far_tr = Vec3::new(right * ratio, top * ratio, -far);
        let far_br = Vec3::new(right * ratio, bottom * ratio, -far);
        let far_bl = Vec3::new(left * ratio, bottom * ratio, -far);
        let eye = Vec3::ZERO;

        vec![
            // Near rectangle
            near_tl, near_tr,
            near_tr, near_br,
            near_br, near_bl,
            near_bl, near_tl,
            // Far rectangle
            far_tl, far_tr,
            far_tr, far_br,
            far_br, far_bl,
            far_bl, far_tl,
            // Pyramid sides
            eye, near_tl,
            eye, near_tr,
            eye, near_br,
            eye, near_bl,
            // Box sides
            near_tl, far_tl,
            near_tr, far_tr,
            near_br, far_br,
            near_bl, far_bl,
        ]
    }

    /// Contribute the debug wireframe when debug display is enabled
    pub fn update_render_queue(&mut self, queue: &mut dyn RenderQueue) {
        if !self.debug_display {
            return;
        }
        let wireframe = FrustumWireframe::new(
            format!("{}/wireframe", self.name),
            self.debug_line_vertices(),
            self.world_transform(),
        );
        queue.add_renderable(Box::new(wireframe), self.render_queue_group, DEFAULT_RENDERABLE_PRIORITY);
    }
}

impl FrustumQueries for Frustum {
    fn test_aabb(&mut self, aabb: &AxisAlignedBox) -> Visibility {
        if aabb.is_null() {
            return Visibility::Empty;
        }
        if aabb.is_infinite() {
            return Visibility::Visible;
        }

        self.update_frustum_planes();
        let center = aabb.center();
        let half_size = aabb.half_size();

        for plane in FrustumPlane::ALL {
            if self.skips_plane(plane) {
                continue;
            }
            if self.planes[plane.index()].side_of_box(center, half_size) == PlaneSide::Negative {
                return Visibility::Culled(plane);
            }
        }
        Visibility::Visible
    }

    fn test_sphere(&mut self, sphere: &Sphere) -> Visibility {
        self.update_frustum_planes();

        for plane in FrustumPlane::ALL {
            if self.skips_plane(plane) {
                continue;
            }
            // Touching from outside counts as culled
            if self.planes[plane.index()].distance(sphere.center()) <= -sphere.radius() {
                return Visibility::Culled(plane);
            }
        }
        Visibility::Visible
    }

    fn test_point(&mut self, point: Vec3) -> Visibility {
        self.update_frustum_planes();

        for plane in FrustumPlane::ALL {
            if self.skips_plane(plane) {
                continue;
            }
            if self.planes[plane.index()].side(point) == PlaneSide::Negative {
                return Visibility::Culled(plane);
            }
        }
        Visibility::Visible
    }

    fn frustum_planes(&mut self) -> [Plane; 6] {
        self.update_frustum_planes();
        self.planes
    }

    fn world_space_corners(&mut self) -> [Vec3; 8] {
        self.update_world_space_corners();
        self.corners
    }

    fn view_matrix(&mut self) -> Mat4 {
        self.update_view();
        self.view_matrix
    }

    fn near_clip_distance(&self) -> f32 {
        self.near_distance
    }

    fn far_clip_distance(&self) -> f32 {
        self.far_distance
    }

    fn project_sphere(&mut self, sphere: &Sphere) -> Option<NdcRect> {
        self.update_view();
        let eye = self.view_matrix.transform_point3(sphere.center());

        let mut rect = NdcRect::FULL;

        if eye.z < 0.0 {
            self.update_frustum();
            let projection = self.projection_matrix;
            let near = self.near_distance;
            let r = sphere.radius();
            let rsq = r * r;

            // Eye inside the sphere
            if eye.length_squared() <= rsq {
                return None;
            }

            let lxz = eye.x * eye.x + eye.z * eye.z;
            let lyz = eye.y * eye.y + eye.z * eye.z;

            // Tangent planes in XZ bound left / right
            for (nx, nz) in tangent_normals(lxz, r, eye.x, eye.z) {
                let pz = (lxz - rsq) / (eye.z - (nz / nx) * eye.x);
                if pz < 0.0 {
                    let near_x = (nz * near) / nx;
                    let projected = projection.project_point3(Vec3::new(near_x, 0.0, -near));
                    let px = -(pz * nz) / nx;
                    if px > eye.x {
                        rect.right = rect.right.min(projected.x);
                    } else {
                        rect.left = rect.left.max(projected.x);
                    }
                }
            }

            // Tangent planes in YZ bound top / bottom
            for (ny, nz) in tangent_normals(lyz, r, eye.y, eye.z) {
                let pz = (lyz - rsq) / (eye.z - (nz / ny) * eye.y);
                if pz < 0.0 {
                    let near_y = (nz * near) / ny;
                    let projected = projection.project_point3(Vec3::new(0.0, near_y, -near));
                    let py = -(pz * nz) / ny;
                    if py > eye.y {
                        rect.top = rect.top.min(projected.y);
                    } else {
                        rect.bottom = rect.bottom.max(projected.y);
                    }
                }
            }
        }

        if rect == NdcRect::FULL { None } else { Some(rect) }
    }
}

/// Normals (n_axis, n_z) of the two planes through the eye tangent to a
/// sphere, in one eye-space coordinate plane. Empty without two real roots.
fn tangent_normals(l_sq: f32, r: f32, axis: f32, z: f32) -> Vec<(f32, f32)> {
    let a = l_sq;
    let b = -2.0 * r * axis;
    let c = r * r - z * z;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant <= 0.0 {
        return Vec::new();
    }

    let root = discriminant.sqrt();
    [(-b + root) / (2.0 * a), (-b - root) / (2.0 * a)]
        .into_iter()
        .map(|n_axis| (n_axis, (r - n_axis * axis) / z))
        .collect()
}

impl fmt::Debug for Frustum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frustum")
            .field("name", &self.name)
            .field("projection_type", &self.projection_type)
            .field("fov_y", &self.fov_y)
            .field("near_distance", &self.near_distance)
            .field("far_distance", &self.far_distance)
            .field("aspect", &self.aspect)
            .field("position", &self.position)
            .field("orientation", &self.orientation)
            .field("attached", &self.is_attached())
            .field("reflect", &self.reflect)
            .field("oblique_depth_projection", &self.oblique_depth_projection)
            .finish()
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
