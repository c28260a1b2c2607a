/// Camera - a frustum with a viewpoint API.
///
/// Owns its own `Frustum` for projection and view, and may hand visibility
/// queries to a separate culling frustum (for example a frozen frustum used
/// to inspect culling from the outside). Adds picking rays and volumes,
/// window sub-region clipping, forward intersection with a plane (shadow
/// volume construction), listeners, auto tracking and LOD settings.

use std::cell::RefCell;
use std::f32::consts::PI;
use std::fmt;
use std::rc::{Rc, Weak};
use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use crate::error::Result;
use crate::math::{AxisAlignedBox, Plane, PlaneBoundedVolume, Ray, Sphere, rotation_to};
use crate::scene::NodeTransform;
use crate::engine_trace;
use super::frustum::{Frustum, FrustumDesc, FrustumPlane, ProjectionType};
use super::listener::CameraListener;
use super::queries::{FrustumQueries, NdcRect, Visibility};

const LOG_SOURCE: &str = "lumen3d::Camera";

/// How geometry is rasterized when rendered from a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    Points,
    Wireframe,
    #[default]
    Solid,
}

/// Construction parameters for a `Camera`
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDesc {
    pub name: String,
    pub frustum: FrustumDesc,
    /// Axis yaw rotates around; `None` yaws around the local up axis
    pub fixed_yaw_axis: Option<Vec3>,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            name: "camera".to_string(),
            frustum: FrustumDesc::default(),
            fixed_yaw_axis: Some(Vec3::Y),
        }
    }
}

/// Sub-rectangle of the viewport, in [0, 1] screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

/// Viewpoint for rendering and culling
pub struct Camera {
    name: String,
    frustum: Frustum,
    cull_frustum: Option<Rc<RefCell<Frustum>>>,
    polygon_mode: PolygonMode,

    yaw_fixed: bool,
    yaw_fixed_axis: Vec3,

    auto_track_target: Option<Weak<dyn NodeTransform>>,
    auto_track_offset: Vec3,

    lod_bias: f32,
    lod_bias_inverse: f32,
    lod_camera: Option<Weak<RefCell<Camera>>>,

    window: Option<Window>,
    window_dirty: bool,
    window_revisions: (u64, u64),
    window_clip_planes: Vec<Plane>,

    rendered_faces: u32,
    rendered_batches: u32,
    auto_aspect_ratio: bool,
    use_rendering_distance: bool,

    listeners: Vec<Rc<dyn CameraListener>>,
}

impl Camera {
    /// Create a camera with default frustum parameters, yawing around world Y
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let frustum = Frustum::new(name.clone());
        Self::build(name, frustum, Some(Vec3::Y))
    }

    /// Create a camera from a descriptor.
    ///
    /// Fails when the frustum parameters are rejected.
    pub fn from_desc(desc: &CameraDesc) -> Result<Self> {
        let frustum = Frustum::from_desc(desc.name.clone(), &desc.frustum)?;
        Ok(Self::build(desc.name.clone(), frustum, desc.fixed_yaw_axis))
    }

    fn build(name: String, frustum: Frustum, fixed_yaw_axis: Option<Vec3>) -> Self {
        Self {
            name,
            frustum,
            cull_frustum: None,
            polygon_mode: PolygonMode::Solid,
            yaw_fixed: fixed_yaw_axis.is_some(),
            yaw_fixed_axis: fixed_yaw_axis.unwrap_or(Vec3::Y),
            auto_track_target: None,
            auto_track_offset: Vec3::ZERO,
            lod_bias: 1.0,
            lod_bias_inverse: 1.0,
            lod_camera: None,
            window: None,
            window_dirty: true,
            window_revisions: (0, 0),
            window_clip_planes: Vec::new(),
            rendered_faces: 0,
            rendered_batches: 0,
            auto_aspect_ratio: false,
            use_rendering_distance: true,
            listeners: Vec::new(),
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The camera's own frustum (projection parameters, pose)
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn frustum_mut(&mut self) -> &mut Frustum {
        &mut self.frustum
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
    }

    /// Frustum used for visibility queries instead of the camera's own
    pub fn culling_frustum(&self) -> Option<&Rc<RefCell<Frustum>>> {
        self.cull_frustum.as_ref()
    }

    pub fn set_culling_frustum(&mut self, frustum: Option<Rc<RefCell<Frustum>>>) {
        self.cull_frustum = frustum;
    }

    fn with_query_frustum<R>(&mut self, query: impl FnOnce(&mut Frustum) -> R) -> R {
        match &self.cull_frustum {
            Some(cull) => query(&mut cull.borrow_mut()),
            None => query(&mut self.frustum),
        }
    }

    /// View matrix of the camera's own frustum, ignoring any culling frustum
    pub fn own_view_matrix(&mut self) -> Mat4 {
        self.frustum.view_matrix()
    }

    pub fn projection_matrix(&mut self) -> Mat4 {
        self.frustum.projection_matrix()
    }

    pub fn projection_matrix_rs(&mut self) -> Mat4 {
        self.frustum.projection_matrix_rs()
    }

    // ===== POSE =====

    /// Position relative to the attachment node
    pub fn position(&self) -> Vec3 {
        self.frustum.position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.frustum.set_position(position);
    }

    /// Translate in parent space
    pub fn move_by(&mut self, offset: Vec3) {
        let position = self.frustum.position() + offset;
        self.frustum.set_position(position);
    }

    /// Translate along the camera's local axes
    pub fn move_relative(&mut self, offset: Vec3) {
        let position = self.frustum.position() + self.frustum.orientation() * offset;
        self.frustum.set_position(position);
    }

    /// Orientation relative to the attachment node
    pub fn orientation(&self) -> Quat {
        self.frustum.orientation()
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.frustum.set_orientation(orientation);
    }

    /// Local viewing direction (-Z)
    pub fn direction(&self) -> Vec3 {
        self.frustum.orientation() * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.frustum.orientation() * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.frustum.orientation() * Vec3::X
    }

    /// Point the camera along a world-space direction.
    ///
    /// A zero vector is ignored. With a fixed yaw axis the camera keeps its
    /// up vector in the plane of that axis, unless the direction is parallel
    /// to it; otherwise it turns along the shortest arc.
    pub fn set_direction(&mut self, direction: Vec3) {
        if direction == Vec3::ZERO {
            return;
        }

        // The camera looks down its local -Z
        let z_adjust = (-direction).normalize();

        let fixed_yaw_orientation = if self.yaw_fixed {
            let x_axis = self.yaw_fixed_axis.cross(z_adjust).normalize_or_zero();
            let y_axis = z_adjust.cross(x_axis).normalize_or_zero();
            (x_axis != Vec3::ZERO)
                .then(|| Quat::from_mat3(&Mat3::from_cols(x_axis, y_axis, z_adjust)))
        } else {
            None
        };

        let target = match fixed_yaw_orientation {
            Some(orientation) => orientation,
            None => {
                let real = self.frustum.real_orientation();
                let z_axis = real * Vec3::Z;
                let rotation = if (z_axis + z_adjust).length_squared() < 0.00005 {
                    // Half turn: yaw around the current up axis
                    Quat::from_axis_angle((real * Vec3::Y).normalize(), PI)
                } else {
                    rotation_to(z_axis, z_adjust, Vec3::ZERO)
                };
                rotation * real
            }
        };

        let local = match self.frustum.parent_node() {
            Some(node) => node.derived_orientation().inverse() * target,
            None => target,
        };
        self.frustum.set_orientation(local);
    }

    /// Point the camera at a world-space target
    pub fn look_at(&mut self, target: Vec3) {
        let eye = self.frustum.real_position();
        self.set_direction(target - eye);
    }

    /// Rotate around the local Z axis
    pub fn roll(&mut self, angle: f32) {
        let axis = self.frustum.orientation() * Vec3::Z;
        self.rotate_axis_angle(axis, angle);
    }

    /// Rotate around the fixed yaw axis, or the local Y axis
    pub fn yaw(&mut self, angle: f32) {
        let axis = if self.yaw_fixed {
            self.yaw_fixed_axis
        } else {
            self.frustum.orientation() * Vec3::Y
        };
        self.rotate_axis_angle(axis, angle);
    }

    /// Rotate around the local X axis
    pub fn pitch(&mut self, angle: f32) {
        let axis = self.frustum.orientation() * Vec3::X;
        self.rotate_axis_angle(axis, angle);
    }

    pub fn rotate_axis_angle(&mut self, axis: Vec3, angle: f32) {
        self.rotate(Quat::from_axis_angle(axis.normalize(), angle));
    }

    /// Apply `rotation` after the current orientation
    pub fn rotate(&mut self, rotation: Quat) {
        let orientation = rotation.normalize() * self.frustum.orientation();
        self.frustum.set_orientation(orientation);
    }

    /// Yaw around `axis` (`None` yaws around the local up axis)
    pub fn set_fixed_yaw_axis(&mut self, axis: Option<Vec3>) {
        self.yaw_fixed = axis.is_some();
        if let Some(axis) = axis {
            self.yaw_fixed_axis = axis;
        }
    }

    pub fn fixed_yaw_axis(&self) -> Option<Vec3> {
        self.yaw_fixed.then_some(self.yaw_fixed_axis)
    }

    pub fn attach_to_node<N: NodeTransform + 'static>(&mut self, node: &Rc<N>) {
        self.frustum.attach_to_node(node);
    }

    pub fn detach_from_node(&mut self) {
        self.frustum.detach_from_node();
    }

    // ===== DERIVED POSE =====

    /// World orientation, reflected when reflection is enabled
    pub fn derived_orientation(&mut self) -> Quat {
        self.frustum.derived_orientation()
    }

    pub fn derived_position(&mut self) -> Vec3 {
        self.frustum.derived_position()
    }

    pub fn derived_direction(&mut self) -> Vec3 {
        self.frustum.derived_direction()
    }

    pub fn derived_up(&mut self) -> Vec3 {
        self.frustum.derived_up()
    }

    pub fn derived_right(&mut self) -> Vec3 {
        self.frustum.derived_right()
    }

    /// World orientation before reflection
    pub fn real_orientation(&mut self) -> Quat {
        self.frustum.real_orientation()
    }

    pub fn real_position(&mut self) -> Vec3 {
        self.frustum.real_position()
    }

    pub fn real_direction(&mut self) -> Vec3 {
        self.real_orientation() * Vec3::NEG_Z
    }

    pub fn real_up(&mut self) -> Vec3 {
        self.real_orientation() * Vec3::Y
    }

    pub fn real_right(&mut self) -> Vec3 {
        self.real_orientation() * Vec3::X
    }

    // ===== AUTO TRACKING =====

    /// Keep looking at `target` (plus `offset`) on every `auto_track()`
    pub fn set_auto_tracking<N: NodeTransform + 'static>(&mut self, target: &Rc<N>, offset: Vec3) {
        let weak = Rc::downgrade(target) as Weak<dyn NodeTransform>;
        self.auto_track_target = Some(weak);
        self.auto_track_offset = offset;
    }

    pub fn disable_auto_tracking(&mut self) {
        self.auto_track_target = None;
    }

    pub fn is_auto_tracking(&self) -> bool {
        self.auto_track_target.as_ref().and_then(Weak::upgrade).is_some()
    }

    pub fn auto_track_offset(&self) -> Vec3 {
        self.auto_track_offset
    }

    /// Turn towards the tracked node; expects node transforms to be current
    pub fn auto_track(&mut self) {
        let target = self.auto_track_target.as_ref().and_then(Weak::upgrade);
        match target {
            Some(node) => self.look_at(node.derived_position() + self.auto_track_offset),
            None => self.auto_track_target = None,
        }
    }

    // ===== LOD =====

    /// Scale applied to LOD distances; must be > 0
    pub fn set_lod_bias(&mut self, factor: f32) {
        debug_assert!(factor > 0.0, "Camera::set_lod_bias: bias factor must be > 0, got {}", factor);
        self.lod_bias = factor;
        self.lod_bias_inverse = 1.0 / factor;
    }

    pub fn lod_bias(&self) -> f32 {
        self.lod_bias
    }

    pub fn lod_bias_inverse(&self) -> f32 {
        self.lod_bias_inverse
    }

    /// Camera whose position drives LOD selection; `None` (or this camera)
    /// means the camera itself
    pub fn set_lod_camera(&mut self, camera: Option<&Rc<RefCell<Camera>>>) {
        let this = self as *const Camera;
        self.lod_camera = camera
            .filter(|camera| !std::ptr::eq(camera.as_ptr() as *const Camera, this))
            .map(Rc::downgrade);
    }

    /// LOD camera, `None` when the camera is its own LOD camera
    pub fn lod_camera(&self) -> Option<Rc<RefCell<Camera>>> {
        self.lod_camera.as_ref().and_then(Weak::upgrade)
    }

    // ===== PICKING =====

    /// World-space ray through a screen point (`x`, `y` in [0, 1], origin at
    /// the top left), starting on the near plane
    pub fn camera_to_viewport_ray(&mut self, screen_x: f32, screen_y: f32) -> Ray {
        let inverse_vp = (self.frustum.projection_matrix() * self.frustum.view_matrix()).inverse();

        let nx = 2.0 * screen_x - 1.0;
        let ny = 1.0 - 2.0 * screen_y;

        // Mid depth instead of the far plane keeps infinite projections usable
        let origin = inverse_vp.project_point3(Vec3::new(nx, ny, -1.0));
        let target = inverse_vp.project_point3(Vec3::new(nx, ny, 0.0));

        Ray::new(origin, (target - origin).normalize())
    }

    /// Volume covering a screen rectangle, for region selection
    pub fn camera_to_viewport_box_volume(
        &mut self,
        screen_left: f32,
        screen_top: f32,
        screen_right: f32,
        screen_bottom: f32,
        include_far_plane: bool,
    ) -> PlaneBoundedVolume {
        let mut volume = PlaneBoundedVolume::default();

        match self.frustum.projection_type() {
            ProjectionType::Perspective => {
                let ul = self.camera_to_viewport_ray(screen_left, screen_top);
                let ur = self.camera_to_viewport_ray(screen_right, screen_top);
                let bl = self.camera_to_viewport_ray(screen_left, screen_bottom);
                let br = self.camera_to_viewport_ray(screen_right, screen_bottom);
                let eye = self.frustum.derived_position();

                // Top, right, bottom, left
                for (a, b) in [(ul, ur), (ur, br), (br, bl), (bl, ul)] {
                    let normal = a.direction().cross(b.direction()).normalize();
                    volume.planes.push(Plane::from_normal_point(normal, eye));
                }
            }
            ProjectionType::Orthographic => {
                // Parallel to the camera's own side planes
                let ul = self.camera_to_viewport_ray(screen_left, screen_top);
                let br = self.camera_to_viewport_ray(screen_right, screen_bottom);
                let planes = self.frustum.frustum_planes();

                volume.planes.push(Plane::from_normal_point(
                    planes[FrustumPlane::Top.index()].normal, ul.origin()));
                volume.planes.push(Plane::from_normal_point(
                    planes[FrustumPlane::Right.index()].normal, br.origin()));
                volume.planes.push(Plane::from_normal_point(
                    planes[FrustumPlane::Bottom.index()].normal, br.origin()));
                volume.planes.push(Plane::from_normal_point(
                    planes[FrustumPlane::Left.index()].normal, ul.origin()));
            }
        }

        volume.planes.push(self.frustum_plane(FrustumPlane::Near));
        if include_far_plane {
            volume.planes.push(self.frustum_plane(FrustumPlane::Far));
        }
        volume
    }

    // ===== WINDOW CLIPPING =====

    /// Restrict rendering to a sub-rectangle of the viewport ([0, 1] screen
    /// coordinates, origin at the top left)
    pub fn set_window(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
        self.window = Some(Window { left, top, right, bottom });
        self.window_dirty = true;
    }

    pub fn reset_window(&mut self) {
        self.window = None;
    }

    pub fn is_window_set(&self) -> bool {
        self.window.is_some()
    }

    /// Clip planes bounding the window (empty when no window is set)
    pub fn window_planes(&mut self) -> &[Plane] {
        self.update_window_planes();
        if self.window.is_some() {
            &self.window_clip_planes
        } else {
            &[]
        }
    }

    fn update_window_planes(&mut self) {
        let Some(window) = self.window else {
            return;
        };

        let extents = self.frustum.frustum_extents();
        let view = self.frustum.view_matrix();
        let revisions = (self.frustum.view_revision(), self.frustum.projection_revision());
        if !self.window_dirty && revisions == self.window_revisions {
            return;
        }

        let width = extents.width();
        let height = extents.height();
        let left = extents.left + window.left * width;
        let right = extents.left + window.right * width;
        let top = extents.top - window.top * height;
        let bottom = extents.top - window.bottom * height;
        let near = self.frustum.near_clip_distance();

        let inverse_view = view.inverse();
        let ul = inverse_view.transform_point3(Vec3::new(left, top, -near));
        let ur = inverse_view.transform_point3(Vec3::new(right, top, -near));
        let bl = inverse_view.transform_point3(Vec3::new(left, bottom, -near));
        let br = inverse_view.transform_point3(Vec3::new(right, bottom, -near));

        self.window_clip_planes.clear();
        match self.frustum.projection_type() {
            ProjectionType::Perspective => {
                let eye = self.frustum.derived_position();
                self.window_clip_planes.push(Plane::from_points(eye, bl, ul));
                self.window_clip_planes.push(Plane::from_points(eye, ul, ur));
                self.window_clip_planes.push(Plane::from_points(eye, ur, br));
                self.window_clip_planes.push(Plane::from_points(eye, br, bl));
            }
            ProjectionType::Orthographic => {
                let x_axis = inverse_view.x_axis.truncate().normalize();
                let y_axis = inverse_view.y_axis.truncate().normalize();
                self.window_clip_planes.push(Plane::from_normal_point(x_axis, bl));
                self.window_clip_planes.push(Plane::from_normal_point(-x_axis, ur));
                self.window_clip_planes.push(Plane::from_normal_point(y_axis, bl));
                self.window_clip_planes.push(Plane::from_normal_point(-y_axis, ur));
            }
        }

        self.window_dirty = false;
        self.window_revisions = revisions;
        engine_trace!(LOG_SOURCE, "Camera '{}': window clip planes rebuilt", self.name);
    }

    // ===== FORWARD INTERSECTION =====

    /// Intersect the four frustum edge rays with a world plane.
    ///
    /// Returns 0, 3, 4 or 5 entries: finite intersections (w = 1) and, where
    /// a ray runs parallel to or away from the plane, directions towards the
    /// intersection at infinity (w = 0).
    pub fn forward_intersect(&mut self, world_plane: &Plane) -> Vec<Vec4> {
        let corners = self.world_space_corners();

        // Rotate the plane normal onto +Z so the plane is z = const
        let plane = if world_plane.normal.z < 0.0 { -*world_plane } else { *world_plane };
        let inverse_plane_rotation = rotation_to(plane.normal, Vec3::Z, Vec3::ZERO);

        let eye = inverse_plane_rotation * self.frustum.derived_position();
        let directions = [
            inverse_plane_rotation * corners[0] - eye,
            inverse_plane_rotation * corners[1] - eye,
            inverse_plane_rotation * corners[2] - eye,
            inverse_plane_rotation * corners[3] - eye,
        ];

        let plane_rotation = inverse_plane_rotation.inverse();
        ray_forward_intersect(eye, &directions, -plane.d)
            .into_iter()
            .map(|point| (plane_rotation * point.truncate()).extend(point.w))
            .collect()
    }

    // ===== RENDER STATISTICS & SETTINGS =====

    pub fn notify_rendered_faces(&mut self, faces: u32) {
        self.rendered_faces = faces;
    }

    pub fn notify_rendered_batches(&mut self, batches: u32) {
        self.rendered_batches = batches;
    }

    /// Faces rendered in the last frame
    pub fn rendered_faces(&self) -> u32 {
        self.rendered_faces
    }

    pub fn rendered_batches(&self) -> u32 {
        self.rendered_batches
    }

    /// Whether the viewport should keep the aspect ratio in sync with its size
    pub fn auto_aspect_ratio(&self) -> bool {
        self.auto_aspect_ratio
    }

    pub fn set_auto_aspect_ratio(&mut self, enabled: bool) {
        self.auto_aspect_ratio = enabled;
    }

    /// Whether objects may be hidden beyond their rendering distance
    pub fn use_rendering_distance(&self) -> bool {
        self.use_rendering_distance
    }

    pub fn set_use_rendering_distance(&mut self, enabled: bool) {
        self.use_rendering_distance = enabled;
    }

    /// A little more than the near distance
    pub fn bounding_radius(&self) -> f32 {
        self.frustum.near_clip_distance() * 1.5
    }

    /// Copy position, orientation, projection basics, LOD camera, rendering
    /// distance flag and culling frustum from `other`
    pub fn synchronise_base_settings_with(&mut self, other: &Camera) -> Result<()> {
        self.set_position(other.position());
        self.frustum.set_projection_type(other.frustum.projection_type());
        self.set_orientation(other.orientation());
        self.frustum.set_aspect_ratio(other.frustum.aspect_ratio());
        self.frustum.set_near_clip_distance(other.near_clip_distance())?;
        self.frustum.set_far_clip_distance(other.far_clip_distance());
        self.lod_camera = other.lod_camera.clone();
        self.use_rendering_distance = other.use_rendering_distance;
        self.cull_frustum = other.cull_frustum.clone();
        Ok(())
    }

    // ===== LISTENERS =====

    pub fn add_listener(&mut self, listener: Rc<dyn CameraListener>) {
        self.listeners.push(listener);
    }

    /// Remove a listener (compared by identity)
    pub fn remove_listener<L: CameraListener + ?Sized>(&mut self, listener: &Rc<L>) {
        let target = Rc::as_ptr(listener) as *const ();
        self.listeners.retain(|registered| Rc::as_ptr(registered) as *const () != target);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn fire_pre_render_scene(&mut self) {
        let listeners = self.listeners.clone();
        for listener in &listeners {
            listener.camera_pre_render_scene(self);
        }
    }

    pub fn fire_post_render_scene(&mut self) {
        let listeners = self.listeners.clone();
        for listener in &listeners {
            listener.camera_post_render_scene(self);
        }
    }
}

/// Intersections of four rays from `anchor` with the plane z = `plane_offset`.
///
/// Rays parallel to the plane meet it at infinity; rays pointing away
/// straddle infinity and are back-projected towards their finite neighbours.
fn ray_forward_intersect(anchor: Vec3, directions: &[Vec3; 4], plane_offset: f32) -> Vec<Vec4> {
    #[derive(Clone, Copy, PartialEq)]
    enum Hit {
        Finite,
        AtInfinity,
        StraddlesInfinity,
    }

    let delta = plane_offset - anchor.z;
    let mut points = [Vec3::ZERO; 4];
    let mut hits = [Hit::Finite; 4];

    for (i, direction) in directions.iter().enumerate() {
        let test = direction.z * delta;
        if test == 0.0 {
            points[i] = *direction;
            hits[i] = Hit::AtInfinity;
        } else {
            let lambda = delta / direction.z;
            points[i] = anchor + lambda * *direction;
            if test < 0.0 {
                hits[i] = Hit::StraddlesInfinity;
            }
        }
    }

    let mut result = Vec::with_capacity(5);
    for i in 0..4 {
        if hits[i] == Hit::Finite {
            result.push(points[i].extend(1.0));
            continue;
        }

        let next = (i + 1) % 4;
        let prev = (i + 3) % 4;
        if hits[prev] != Hit::Finite && hits[next] != Hit::Finite {
            continue;
        }

        if hits[i] == Hit::AtInfinity {
            result.push(points[i].extend(0.0));
        } else {
            if hits[prev] == Hit::Finite {
                result.push((points[prev] - points[i]).extend(0.0));
            }
            if hits[next] == Hit::Finite {
                result.push((points[next] - points[i]).extend(0.0));
            }
        }
    }
    result
}

impl FrustumQueries for Camera {
    fn test_aabb(&mut self, aabb: &AxisAlignedBox) -> Visibility {
        self.with_query_frustum(|frustum| frustum.test_aabb(aabb))
    }

    fn test_sphere(&mut self, sphere: &Sphere) -> Visibility {
        self.with_query_frustum(|frustum| frustum.test_sphere(sphere))
    }

    fn test_point(&mut self, point: Vec3) -> Visibility {
        self.with_query_frustum(|frustum| frustum.test_point(point))
    }

    fn frustum_planes(&mut self) -> [Plane; 6] {
        self.with_query_frustum(|frustum| frustum.frustum_planes())
    }

    fn world_space_corners(&mut self) -> [Vec3; 8] {
        self.with_query_frustum(|frustum| frustum.world_space_corners())
    }

    fn view_matrix(&mut self) -> Mat4 {
        self.with_query_frustum(|frustum| frustum.view_matrix())
    }

    fn near_clip_distance(&self) -> f32 {
        match &self.cull_frustum {
            Some(cull) => cull.borrow().near_clip_distance(),
            None => self.frustum.near_clip_distance(),
        }
    }

    fn far_clip_distance(&self) -> f32 {
        match &self.cull_frustum {
            Some(cull) => cull.borrow().far_clip_distance(),
            None => self.frustum.far_clip_distance(),
        }
    }

    fn project_sphere(&mut self, sphere: &Sphere) -> Option<NdcRect> {
        self.with_query_frustum(|frustum| frustum.project_sphere(sphere))
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        let listeners = std::mem::take(&mut self.listeners);
        for listener in &listeners {
            listener.camera_destroyed(self);
        }
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Camera(name='{}', pos={}, direction={}, near={}, far={}, fov_y={:.2}deg, aspect={}, offset={}, focal_length={})",
            self.name,
            self.position(),
            self.direction(),
            self.frustum.near_clip_distance(),
            self.frustum.far_clip_distance(),
            self.frustum.fov_y().to_degrees(),
            self.frustum.aspect_ratio(),
            self.frustum.frustum_offset(),
            self.frustum.focal_length(),
        )
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
