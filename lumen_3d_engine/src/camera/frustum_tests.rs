//! Unit tests for frustum.rs
//!
//! Tests touching the global render backend or logger are #[serial].

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use glam::{Mat4, Quat, Vec2, Vec3};
use serial_test::serial;
use crate::engine::Engine;
use crate::error::Error;
use crate::log::{LogEntry, LogSeverity, Logger};
use crate::math::{AxisAlignedBox, Plane, Sphere};
use crate::renderer::{
    Direct3dConvention, RenderBackend, RenderQueue, SortedRenderQueue, RENDER_QUEUE_MAIN,
};
use crate::scene::{MovablePlane, SceneNode};
use super::*;

// ============================================================================
// TEST HELPERS
// ============================================================================

const EPSILON: f32 = 1e-4;

/// Perspective frustum: 90° fov, square aspect, near 1, far 10
fn unit_frustum() -> Frustum {
    let desc = FrustumDesc {
        fov_y: FRAC_PI_2,
        near_distance: 1.0,
        far_distance: 10.0,
        aspect_ratio: 1.0,
        ..Default::default()
    };
    Frustum::from_desc("unit", &desc).unwrap()
}

fn assert_vec3_near(actual: Vec3, expected: Vec3) {
    assert!(
        actual.abs_diff_eq(expected, EPSILON),
        "expected {}, got {}", expected, actual
    );
}

fn assert_mat4_near(actual: Mat4, expected: Mat4, tolerance: f32) {
    assert!(
        actual.abs_diff_eq(expected, tolerance),
        "expected {:?}, got {:?}", expected, actual
    );
}

struct CaptureLogger {
    entries: Arc<Mutex<Vec<(LogSeverity, String)>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push((entry.severity, entry.message.clone()));
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_uses_default_parameters() {
    let frustum = Frustum::new("default");

    assert_eq!(frustum.name(), "default");
    assert_eq!(frustum.projection_type(), ProjectionType::Perspective);
    assert_eq!(frustum.fov_y(), FRAC_PI_4);
    assert_eq!(frustum.near_clip_distance(), 100.0);
    assert_eq!(frustum.far_clip_distance(), 100000.0);
    assert!((frustum.aspect_ratio() - 1.333_333_3).abs() < 1e-6);
    assert_eq!(frustum.ortho_window_height(), 1000.0);
    assert_eq!(frustum.focal_length(), 1.0);
    assert_eq!(frustum.frustum_offset(), Vec2::ZERO);
    assert!(!frustum.is_attached());
    assert!(!frustum.is_reflected());
    assert!(!frustum.is_custom_near_clip_plane_enabled());
}

#[test]
fn test_from_desc_rejects_non_positive_near() {
    let desc = FrustumDesc { near_distance: 0.0, ..Default::default() };
    let result = Frustum::from_desc("bad", &desc);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
}

#[test]
fn test_from_desc_rejects_non_positive_focal_length() {
    let desc = FrustumDesc { focal_length: -1.0, ..Default::default() };
    assert!(matches!(Frustum::from_desc("bad", &desc), Err(Error::InvalidParameter(_))));
}

#[test]
fn test_setters_reject_invalid_values_and_keep_state() {
    let mut frustum = unit_frustum();

    assert!(frustum.set_near_clip_distance(-5.0).is_err());
    assert_eq!(frustum.near_clip_distance(), 1.0);

    assert!(frustum.set_focal_length(0.0).is_err());
    assert_eq!(frustum.focal_length(), 1.0);

    assert!(frustum.set_near_clip_distance(2.0).is_ok());
    assert_eq!(frustum.near_clip_distance(), 2.0);
}

// ============================================================================
// Orthographic window
// ============================================================================

#[test]
fn test_ortho_window_round_trip() {
    let mut frustum = Frustum::new("ortho");
    frustum.set_projection_type(ProjectionType::Orthographic);
    frustum.set_ortho_window(100.0, 50.0);

    assert_eq!(frustum.ortho_window_width(), 100.0);
    assert_eq!(frustum.ortho_window_height(), 50.0);
    assert_eq!(frustum.aspect_ratio(), 2.0);
}

#[test]
fn test_ortho_window_width_keeps_aspect() {
    let mut frustum = Frustum::new("ortho");
    frustum.set_ortho_window(100.0, 50.0);
    frustum.set_ortho_window_width(40.0);

    assert_eq!(frustum.aspect_ratio(), 2.0);
    assert_eq!(frustum.ortho_window_height(), 20.0);
    assert_eq!(frustum.ortho_window_width(), 40.0);
}

// ============================================================================
// Projection matrices
// ============================================================================

#[test]
fn test_perspective_matrix_matches_glam() {
    let mut frustum = Frustum::new("persp");
    frustum.set_near_clip_distance(0.5).unwrap();
    frustum.set_far_clip_distance(200.0);
    frustum.set_aspect_ratio(16.0 / 9.0);

    let expected = Mat4::perspective_rh_gl(FRAC_PI_4, 16.0 / 9.0, 0.5, 200.0);
    assert_mat4_near(frustum.projection_matrix(), expected, 1e-5);
}

#[test]
fn test_orthographic_matrix_matches_glam() {
    let mut frustum = unit_frustum();
    frustum.set_projection_type(ProjectionType::Orthographic);
    frustum.set_ortho_window(8.0, 4.0);

    let expected = Mat4::orthographic_rh_gl(-4.0, 4.0, -2.0, 2.0, 1.0, 10.0);
    assert_mat4_near(frustum.projection_matrix(), expected, 1e-6);
}

#[test]
fn test_infinite_far_plane_projection() {
    let mut frustum = unit_frustum();
    frustum.set_far_clip_distance(0.0);

    let row2 = frustum.projection_matrix().row(2);
    assert!((row2.z - (INFINITE_FAR_PLANE_ADJUST - 1.0)).abs() < 1e-7);
    assert!((row2.w - (INFINITE_FAR_PLANE_ADJUST - 2.0)).abs() < 1e-7);

    // The far plane is never tested
    assert!(frustum.is_visible_point(Vec3::new(0.0, 0.0, -1.0e7)));
    assert_eq!(frustum.bounding_radius(), INFINITE_FAR_DISTANCE);
}

#[test]
fn test_frustum_offset_shifts_extents() {
    let mut frustum = unit_frustum();
    frustum.set_focal_length(2.0).unwrap();
    frustum.set_frustum_offset(Vec2::new(1.0, 0.5));

    // Offset scaled by near / focal = 0.5
    let extents = frustum.frustum_extents();
    assert!((extents.left - (-1.0 + 0.5)).abs() < EPSILON);
    assert!((extents.right - (1.0 + 0.5)).abs() < EPSILON);
    assert!((extents.top - (1.0 + 0.25)).abs() < EPSILON);
    assert!((extents.bottom - (-1.0 + 0.25)).abs() < EPSILON);
}

#[test]
fn test_manual_extents_override_fov() {
    let mut frustum = unit_frustum();
    frustum.set_frustum_extents(-2.0, 1.0, 3.0, -0.5);
    assert!(frustum.has_manual_extents());
    assert_eq!(frustum.frustum_extents(), FrustumExtents::new(-2.0, 1.0, 3.0, -0.5));

    frustum.reset_frustum_extents();
    let extents = frustum.frustum_extents();
    assert!((extents.right - 1.0).abs() < EPSILON);
    assert!((extents.width() - 2.0).abs() < EPSILON);
}

#[test]
fn test_custom_projection_matrix_and_extents() {
    let mut frustum = Frustum::new("custom");
    let custom = Mat4::perspective_rh_gl(FRAC_PI_2, 1.0, 1.0, 100.0);
    frustum.set_custom_projection_matrix(Some(custom));

    assert!(frustum.is_custom_projection_matrix_enabled());
    assert_eq!(frustum.projection_matrix(), custom);

    let extents = frustum.frustum_extents();
    assert!((extents.left + 1.0).abs() < EPSILON);
    assert!((extents.right - 1.0).abs() < EPSILON);
    assert!((extents.top - 1.0).abs() < EPSILON);
    assert!((extents.bottom + 1.0).abs() < EPSILON);

    frustum.set_custom_projection_matrix(None);
    assert_ne!(frustum.projection_matrix(), custom);
}

#[test]
fn test_custom_view_matrix() {
    let mut frustum = unit_frustum();
    let custom = Mat4::look_at_rh(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::Y);
    frustum.set_custom_view_matrix(Some(custom));

    assert!(frustum.is_custom_view_matrix_enabled());
    assert_eq!(frustum.view_matrix(), custom);

    frustum.set_position(Vec3::new(100.0, 0.0, 0.0));
    assert_eq!(frustum.view_matrix(), custom);
}

#[test]
#[serial]
fn test_projection_without_backend_is_unconverted() {
    Engine::reset_for_testing();
    let mut frustum = unit_frustum();

    let projection = frustum.projection_matrix();
    assert_eq!(frustum.projection_matrix_rs(), projection);
    assert_eq!(frustum.projection_matrix_with_rs_depth(), projection);
}

#[test]
#[serial]
fn test_projection_converted_by_backend() {
    Engine::reset_for_testing();
    let _ = Engine::initialize();
    Engine::set_render_backend(Direct3dConvention).unwrap();

    let mut frustum = unit_frustum();
    let projection = frustum.projection_matrix();

    assert_eq!(
        frustum.projection_matrix_rs(),
        Direct3dConvention.convert_projection_matrix(&projection, false)
    );
    assert_eq!(
        frustum.projection_matrix_with_rs_depth(),
        Direct3dConvention.convert_projection_matrix(&projection, true)
    );

    Engine::reset_for_testing();
}

// ============================================================================
// Plane extraction & visibility
// ============================================================================

#[test]
fn test_plane_extraction_sanity() {
    let mut frustum = Frustum::new("eye");
    let near = frustum.near_clip_distance();

    assert!(frustum.is_visible_point(Vec3::new(0.0, 0.0, -near - 1.0)));
    assert!(!frustum.is_visible_point(Vec3::new(0.0, 0.0, 1.0)));
    assert_eq!(
        frustum.test_point(Vec3::new(0.0, 0.0, 1.0)),
        Visibility::Culled(FrustumPlane::Near)
    );
}

#[test]
fn test_extracted_planes_are_unit_length_and_inward() {
    let mut frustum = unit_frustum();
    let planes = frustum.frustum_planes();
    let inside = Vec3::new(0.0, 0.0, -5.0);

    for plane in planes {
        assert!((plane.normal.length() - 1.0).abs() < EPSILON);
        assert!(plane.distance(inside) > 0.0);
    }

    let near = frustum.frustum_plane(FrustumPlane::Near);
    assert_vec3_near(near.normal, Vec3::NEG_Z);
    assert!((near.d + 1.0).abs() < EPSILON);

    let far = frustum.frustum_plane(FrustumPlane::Far);
    assert_vec3_near(far.normal, Vec3::Z);
    assert!((far.d - 10.0).abs() < EPSILON);
}

#[test]
fn test_points_report_culling_plane() {
    let mut frustum = unit_frustum();

    assert_eq!(frustum.test_point(Vec3::new(0.0, 0.0, -20.0)), Visibility::Culled(FrustumPlane::Far));
    assert_eq!(frustum.test_point(Vec3::new(-9.0, 0.0, -5.0)), Visibility::Culled(FrustumPlane::Left));
    assert_eq!(frustum.test_point(Vec3::new(9.0, 0.0, -5.0)), Visibility::Culled(FrustumPlane::Right));
    assert_eq!(frustum.test_point(Vec3::new(0.0, 9.0, -5.0)), Visibility::Culled(FrustumPlane::Top));
    assert_eq!(frustum.test_point(Vec3::new(0.0, -9.0, -5.0)), Visibility::Culled(FrustumPlane::Bottom));
}

#[test]
fn test_sphere_culling_boundary() {
    let mut frustum = Frustum::new("eye");
    let center = Vec3::new(0.0, 0.0, -50.0);
    let distance = frustum.frustum_plane(FrustumPlane::Near).distance(center);
    assert!(distance < 0.0);

    // Center exactly one radius behind the near plane
    let touching = Sphere::new(center, -distance);
    assert_eq!(frustum.test_sphere(&touching), Visibility::Culled(FrustumPlane::Near));

    let overlapping = Sphere::new(center, -distance + 0.01);
    assert!(frustum.is_visible_sphere(&overlapping));
}

#[test]
fn test_aabb_visibility() {
    let mut frustum = unit_frustum();

    assert_eq!(frustum.test_aabb(&AxisAlignedBox::new_null()), Visibility::Empty);
    assert!(!frustum.is_visible_aabb(&AxisAlignedBox::new_null()));
    assert!(frustum.is_visible_aabb(&AxisAlignedBox::new_infinite()));

    let inside = AxisAlignedBox::new(Vec3::new(-1.0, -1.0, -6.0), Vec3::new(1.0, 1.0, -4.0));
    assert!(frustum.is_visible_aabb(&inside));

    let straddling = AxisAlignedBox::new(Vec3::new(-1.0, -1.0, -12.0), Vec3::new(1.0, 1.0, -8.0));
    assert!(frustum.is_visible_aabb(&straddling));

    let behind = AxisAlignedBox::new(Vec3::new(-1.0, -1.0, 1.0), Vec3::new(1.0, 1.0, 3.0));
    assert_eq!(frustum.test_aabb(&behind), Visibility::Culled(FrustumPlane::Near));
    assert_eq!(frustum.test_aabb(&behind).culled_by(), Some(FrustumPlane::Near));
}

#[test]
fn test_classify_aabb() {
    let mut frustum = unit_frustum();

    let inside = AxisAlignedBox::new(Vec3::new(-1.0, -1.0, -6.0), Vec3::new(1.0, 1.0, -4.0));
    assert_eq!(frustum.classify_aabb(&inside), FrustumTest::Inside);

    let straddling = AxisAlignedBox::new(Vec3::new(-1.0, -1.0, -12.0), Vec3::new(1.0, 1.0, -8.0));
    assert_eq!(frustum.classify_aabb(&straddling), FrustumTest::Partial);

    let outside = AxisAlignedBox::new(Vec3::new(50.0, 50.0, -6.0), Vec3::new(60.0, 60.0, -4.0));
    assert_eq!(frustum.classify_aabb(&outside), FrustumTest::Outside);

    assert_eq!(frustum.classify_aabb(&AxisAlignedBox::new_null()), FrustumTest::Outside);
    assert_eq!(frustum.classify_aabb(&AxisAlignedBox::new_infinite()), FrustumTest::Partial);
}

#[test]
fn test_plane_bounded_volume_matches_frustum() {
    let mut frustum = unit_frustum();
    let volume = frustum.plane_bounded_volume();

    assert_eq!(volume.planes.len(), 6);
    assert!(volume.contains_point(Vec3::new(0.0, 0.0, -5.0)));
    assert!(!volume.contains_point(Vec3::new(0.0, 0.0, 5.0)));
}

// ============================================================================
// Lazy derivation
// ============================================================================

#[test]
fn test_queries_do_not_rebuild_clean_state() {
    let mut frustum = unit_frustum();
    frustum.frustum_planes();
    let view_revision = frustum.view_revision();
    let projection_revision = frustum.projection_revision();

    frustum.frustum_planes();
    frustum.world_space_corners();
    frustum.is_visible_point(Vec3::ZERO);

    assert_eq!(frustum.view_revision(), view_revision);
    assert_eq!(frustum.projection_revision(), projection_revision);
}

#[test]
fn test_setters_invalidate_only_their_branch() {
    let mut frustum = unit_frustum();
    frustum.frustum_planes();
    let view_revision = frustum.view_revision();
    let projection_revision = frustum.projection_revision();

    frustum.set_fov_y(1.0);
    frustum.frustum_planes();
    assert_eq!(frustum.view_revision(), view_revision);
    assert_eq!(frustum.projection_revision(), projection_revision + 1);

    frustum.set_position(Vec3::new(1.0, 0.0, 0.0));
    frustum.frustum_planes();
    assert_eq!(frustum.view_revision(), view_revision + 1);
    assert_eq!(frustum.projection_revision(), projection_revision + 1);
}

#[test]
fn test_planes_follow_pose_changes() {
    let mut frustum = unit_frustum();
    let point = Vec3::new(0.0, 0.0, -5.0);
    assert!(frustum.is_visible_point(point));

    // Turn around: the point is now behind
    frustum.set_orientation(Quat::from_rotation_y(std::f32::consts::PI));
    assert!(!frustum.is_visible_point(point));
    assert!(frustum.is_visible_point(Vec3::new(0.0, 0.0, 5.0)));
}

// ============================================================================
// Attachment
// ============================================================================

#[test]
fn test_attached_frustum_follows_node() {
    let node = Rc::new(SceneNode::new("rig"));
    let mut frustum = unit_frustum();
    frustum.set_position(Vec3::new(0.0, 0.0, 2.0));
    frustum.attach_to_node(&node);
    assert!(frustum.is_attached());

    node.set_position(Vec3::new(10.0, 0.0, 0.0));
    assert_vec3_near(frustum.derived_position(), Vec3::new(10.0, 0.0, 2.0));

    // Node rotation carries the local offset
    node.set_orientation(Quat::from_rotation_y(FRAC_PI_2));
    assert_vec3_near(frustum.derived_position(), Vec3::new(12.0, 0.0, 0.0));
    assert_vec3_near(frustum.derived_direction(), Vec3::NEG_X);
    assert!(frustum.is_visible_point(Vec3::new(5.0, 0.0, 0.0)));
}

#[test]
fn test_node_movement_is_detected_without_setters() {
    let node = Rc::new(SceneNode::new("rig"));
    let mut frustum = unit_frustum();
    frustum.attach_to_node(&node);
    frustum.view_matrix();
    let revision = frustum.view_revision();

    frustum.view_matrix();
    assert_eq!(frustum.view_revision(), revision);

    node.translate(Vec3::new(0.0, 1.0, 0.0));
    frustum.view_matrix();
    assert_eq!(frustum.view_revision(), revision + 1);
}

#[test]
fn test_dropped_node_reads_as_detached() {
    let node = Rc::new(SceneNode::new("temporary"));
    let mut frustum = unit_frustum();
    frustum.set_position(Vec3::new(1.0, 2.0, 3.0));
    frustum.attach_to_node(&node);
    node.set_position(Vec3::new(100.0, 0.0, 0.0));
    assert_vec3_near(frustum.derived_position(), Vec3::new(101.0, 2.0, 3.0));

    drop(node);
    assert!(!frustum.is_attached());
    assert_vec3_near(frustum.derived_position(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_detach_restores_local_pose() {
    let node = Rc::new(SceneNode::new("rig"));
    node.set_position(Vec3::new(0.0, 5.0, 0.0));
    let mut frustum = unit_frustum();
    frustum.attach_to_node(&node);
    assert_vec3_near(frustum.real_position(), Vec3::new(0.0, 5.0, 0.0));

    frustum.detach_from_node();
    assert_vec3_near(frustum.real_position(), Vec3::ZERO);
}

// ============================================================================
// Reflection
// ============================================================================

#[test]
fn test_reflection_mirrors_derived_pose() {
    let mut frustum = Frustum::new("mirror");
    frustum.set_position(Vec3::new(0.0, 10.0, 0.0));
    frustum.set_orientation(Quat::from_rotation_arc(Vec3::NEG_Z, Vec3::NEG_Y));
    frustum.enable_reflection(Plane::new(Vec3::Y, 0.0));

    assert!(frustum.is_reflected());
    let derived = frustum.derived_position();
    assert!(derived.y < 0.0);
    assert_vec3_near(derived, Vec3::new(0.0, -10.0, 0.0));

    // Looking down becomes looking up
    assert_vec3_near(frustum.derived_direction(), Vec3::Y);

    // Real pose is untouched
    assert_vec3_near(frustum.real_position(), Vec3::new(0.0, 10.0, 0.0));

    frustum.disable_reflection();
    assert_vec3_near(frustum.derived_position(), Vec3::new(0.0, 10.0, 0.0));
    assert_eq!(frustum.reflection_matrix(), Mat4::IDENTITY);
}

#[test]
fn test_linked_reflection_tracks_plane() {
    let water = Rc::new(MovablePlane::new("water", Plane::new(Vec3::Y, 0.0)));
    let mut frustum = Frustum::new("mirror");
    frustum.set_position(Vec3::new(0.0, 10.0, 0.0));
    frustum.enable_linked_reflection(&water);
    assert_vec3_near(frustum.derived_position(), Vec3::new(0.0, -10.0, 0.0));

    // Raise the water to y = 5
    water.set_plane(Plane::new(Vec3::Y, -5.0));
    assert_vec3_near(frustum.derived_position(), Vec3::ZERO);
    assert_eq!(frustum.reflection_plane(), Plane::new(Vec3::Y, -5.0));
}

#[test]
fn test_dropped_linked_plane_keeps_last_value() {
    let water = Rc::new(MovablePlane::new("water", Plane::new(Vec3::Y, -5.0)));
    let mut frustum = Frustum::new("mirror");
    frustum.set_position(Vec3::new(0.0, 10.0, 0.0));
    frustum.enable_linked_reflection(&water);
    assert_vec3_near(frustum.derived_position(), Vec3::ZERO);

    drop(water);
    frustum.set_position(Vec3::new(0.0, 8.0, 0.0));
    assert_vec3_near(frustum.derived_position(), Vec3::new(0.0, 2.0, 0.0));
}

// ============================================================================
// Oblique near plane
// ============================================================================

fn oblique_frustum() -> Frustum {
    let desc = FrustumDesc {
        near_distance: 1.0,
        far_distance: 1000.0,
        aspect_ratio: 1.0,
        ..Default::default()
    };
    Frustum::from_desc("oblique", &desc).unwrap()
}

#[test]
fn test_oblique_plane_becomes_near_plane() {
    let mut frustum = oblique_frustum();
    // Clip everything closer than z = -50
    frustum.enable_custom_near_clip_plane(Plane::new(Vec3::NEG_Z, -50.0)).unwrap();
    assert!(frustum.is_custom_near_clip_plane_enabled());

    let projection = frustum.projection_matrix();
    let on_plane = projection.project_point3(Vec3::new(0.0, 0.0, -50.0));
    assert!((on_plane.z + 1.0).abs() < 1e-3);

    let in_front = projection.project_point3(Vec3::new(0.0, 0.0, -40.0));
    assert!(in_front.z < -1.0);

    let near = frustum.frustum_plane(FrustumPlane::Near);
    assert!((near.normal.z + 1.0).abs() < 1e-3);
    assert!((near.d + 50.0).abs() < 1e-2);
    assert!(!frustum.is_visible_point(Vec3::new(0.0, 0.0, -40.0)));
}

#[test]
fn test_oblique_plane_is_reevaluated_after_view_change() {
    let mut frustum = oblique_frustum();
    frustum.enable_custom_near_clip_plane(Plane::new(Vec3::NEG_Z, -50.0)).unwrap();
    frustum.projection_matrix();
    let revision = frustum.projection_revision();

    frustum.set_position(Vec3::new(0.0, 0.0, -20.0));
    frustum.projection_matrix();
    assert!(frustum.projection_revision() > revision);

    // World plane z = -50 is now 30 units in front of the eye
    let near = frustum.frustum_plane(FrustumPlane::Near);
    assert!((near.d + 50.0).abs() < 1e-2);
    assert!(frustum.is_visible_point(Vec3::new(0.0, 0.0, -60.0)));
    assert!(!frustum.is_visible_point(Vec3::new(0.0, 0.0, -45.0)));
}

#[test]
fn test_linked_oblique_plane_tracks_provider() {
    let mirror = Rc::new(MovablePlane::new("mirror", Plane::new(Vec3::NEG_Z, -50.0)));
    let mut frustum = oblique_frustum();
    frustum.enable_linked_custom_near_clip_plane(&mirror).unwrap();
    assert!(!frustum.is_visible_point(Vec3::new(0.0, 0.0, -45.0)));

    mirror.set_plane(Plane::new(Vec3::NEG_Z, -30.0));
    assert!(frustum.is_visible_point(Vec3::new(0.0, 0.0, -45.0)));

    frustum.disable_custom_near_clip_plane();
    assert!(frustum.is_visible_point(Vec3::new(0.0, 0.0, -2.0)));
}

#[test]
fn test_oblique_plane_rejected_for_orthographic() {
    let mut frustum = oblique_frustum();
    frustum.set_projection_type(ProjectionType::Orthographic);

    let result = frustum.enable_custom_near_clip_plane(Plane::new(Vec3::NEG_Z, -50.0));
    assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
    assert!(!frustum.is_custom_near_clip_plane_enabled());
}

#[test]
#[serial]
fn test_oblique_plane_ignored_after_switch_to_orthographic() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });

    let mut frustum = oblique_frustum();
    frustum.enable_custom_near_clip_plane(Plane::new(Vec3::NEG_Z, -50.0)).unwrap();
    frustum.set_projection_type(ProjectionType::Orthographic);

    let mut plain = oblique_frustum();
    plain.set_projection_type(ProjectionType::Orthographic);
    assert_eq!(frustum.projection_matrix(), plain.projection_matrix());

    Engine::reset_logger();
    let entries = entries.lock().unwrap();
    assert!(entries.iter().any(|(severity, message)| {
        *severity == LogSeverity::Warn && message.contains("orthographic")
    }));
}

// ============================================================================
// Corners & bounds
// ============================================================================

#[test]
fn test_world_space_corners_perspective() {
    let mut frustum = unit_frustum();
    frustum.set_position(Vec3::new(5.0, 0.0, 0.0));
    let corners = frustum.world_space_corners();

    let expected = [
        Vec3::new(6.0, 1.0, -1.0),
        Vec3::new(4.0, 1.0, -1.0),
        Vec3::new(4.0, -1.0, -1.0),
        Vec3::new(6.0, -1.0, -1.0),
        Vec3::new(15.0, 10.0, -10.0),
        Vec3::new(-5.0, 10.0, -10.0),
        Vec3::new(-5.0, -10.0, -10.0),
        Vec3::new(15.0, -10.0, -10.0),
    ];
    for (corner, expected) in corners.iter().zip(expected) {
        assert_vec3_near(*corner, expected);
    }
}

#[test]
fn test_world_space_corners_orthographic() {
    let mut frustum = unit_frustum();
    frustum.set_projection_type(ProjectionType::Orthographic);
    frustum.set_ortho_window(4.0, 2.0);
    let corners = frustum.world_space_corners();

    assert_vec3_near(corners[0], Vec3::new(2.0, 1.0, -1.0));
    assert_vec3_near(corners[4], Vec3::new(2.0, 1.0, -10.0));
    assert_vec3_near(corners[6], Vec3::new(-2.0, -1.0, -10.0));
}

#[test]
fn test_infinite_far_corners_use_stand_in_distance() {
    let mut frustum = unit_frustum();
    frustum.set_far_clip_distance(0.0);
    let corners = frustum.world_space_corners();
    assert!((corners[4].z + INFINITE_FAR_DISTANCE).abs() < 1.0);
}

#[test]
fn test_bounding_box_perspective() {
    let mut frustum = unit_frustum();
    let aabb = frustum.bounding_box();

    assert_vec3_near(aabb.minimum(), Vec3::new(-10.0, -10.0, -10.0));
    assert_vec3_near(aabb.maximum(), Vec3::new(10.0, 10.0, 0.0));
    assert_eq!(frustum.bounding_radius(), 10.0);
}

#[test]
fn test_bounding_box_orthographic() {
    let mut frustum = unit_frustum();
    frustum.set_projection_type(ProjectionType::Orthographic);
    frustum.set_ortho_window(4.0, 2.0);
    let aabb = frustum.bounding_box();

    assert_vec3_near(aabb.minimum(), Vec3::new(-2.0, -1.0, -10.0));
    assert_vec3_near(aabb.maximum(), Vec3::new(2.0, 1.0, 0.0));
}

#[test]
fn test_view_matrix_relative() {
    let mut frustum = unit_frustum();
    frustum.set_position(Vec3::new(0.0, 0.0, 10.0));
    let relative = frustum.view_matrix_relative(Vec3::new(0.0, 0.0, 10.0));

    // Relative to the eye, the eye sits at the origin
    assert_vec3_near(relative.transform_point3(Vec3::ZERO), Vec3::ZERO);
}

// ============================================================================
// project_sphere
// ============================================================================

#[test]
fn test_project_sphere_ahead() {
    let mut frustum = Frustum::new("eye");
    let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1000.0), 50.0);

    let rect = frustum.project_sphere(&sphere).unwrap();
    assert!(rect.left < 0.0 && rect.right > 0.0);
    assert!(rect.bottom < 0.0 && rect.top > 0.0);
    assert!((rect.left + rect.right).abs() < EPSILON);
    assert!((rect.top + rect.bottom).abs() < EPSILON);
    assert!(rect.right < 0.5 && rect.top < 0.5);

    // Wider than tall: the horizontal extent is squeezed by the aspect ratio
    assert!(rect.right < rect.top);
}

#[test]
fn test_project_sphere_off_center() {
    let mut frustum = Frustum::new("eye");
    let sphere = Sphere::new(Vec3::new(200.0, 0.0, -1000.0), 50.0);

    let rect = frustum.project_sphere(&sphere).unwrap();
    assert!(rect.left > 0.0);
    assert!(rect.right > rect.left);
}

#[test]
fn test_project_sphere_unrestricted() {
    let mut frustum = Frustum::new("eye");

    // Eye inside the sphere
    assert_eq!(frustum.project_sphere(&Sphere::new(Vec3::new(0.0, 0.0, -10.0), 50.0)), None);

    // Behind the eye
    assert_eq!(frustum.project_sphere(&Sphere::new(Vec3::new(0.0, 0.0, 500.0), 10.0)), None);
}

// ============================================================================
// Debug display
// ============================================================================

#[test]
fn test_debug_line_vertices() {
    let mut frustum = unit_frustum();
    let vertices = frustum.debug_line_vertices();

    assert_eq!(vertices.len(), 32);
    assert_vec3_near(vertices[0], Vec3::new(-1.0, 1.0, -1.0));
    assert_vec3_near(vertices[8], Vec3::new(-10.0, 10.0, -10.0));
    assert_eq!(vertices[16], Vec3::ZERO);
}

#[test]
fn test_update_render_queue_only_when_enabled() {
    let mut frustum = unit_frustum();
    frustum.set_position(Vec3::new(1.0, 2.0, 3.0));
    let mut queue = SortedRenderQueue::new();

    frustum.update_render_queue(&mut queue);
    assert!(queue.is_empty());

    frustum.set_debug_display_enabled(true);
    frustum.update_render_queue(&mut queue);
    assert_eq!(queue.group_size(RENDER_QUEUE_MAIN), 1);

    let sorted = queue.sorted();
    let (_, _, renderable) = sorted[0];
    assert_eq!(renderable.name(), "unit/wireframe");
    assert_eq!(renderable.render_operation().vertex_count(), 32);
    assert_vec3_near(renderable.world_transform().w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_render_queue_group_is_configurable() {
    let mut frustum = unit_frustum();
    frustum.set_debug_display_enabled(true);
    frustum.set_render_queue_group(90);
    let mut queue = SortedRenderQueue::new();

    let queue_ref: &mut dyn RenderQueue = &mut queue;
    frustum.update_render_queue(queue_ref);
    assert_eq!(queue.queue_ids(), vec![90]);
}
