use glam::Vec3;
use super::*;
use crate::math::{AxisAlignedBox, Plane, PlaneBoundedVolume, PlaneSide, Sphere};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ============================================================================
// Ray vs Plane
// ============================================================================

#[test]
fn test_ray_hits_plane_in_front() {
    let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
    let t = ray.intersects_plane(&Plane::new(Vec3::Y, 0.0)).unwrap();
    assert!(approx(t, 10.0));
    assert_eq!(ray.point(t), Vec3::ZERO);
}

#[test]
fn test_ray_misses_plane_behind_or_parallel() {
    let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
    assert_eq!(ray.intersects_plane(&Plane::new(Vec3::Y, 0.0)), None);

    let parallel = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::X);
    assert_eq!(parallel.intersects_plane(&Plane::new(Vec3::Y, 0.0)), None);
}

// ============================================================================
// Ray vs Sphere
// ============================================================================

#[test]
fn test_ray_hits_sphere_front_surface() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
    let t = ray.intersects_sphere(&Sphere::new(Vec3::ZERO, 2.0)).unwrap();
    assert!(approx(t, 8.0));
}

#[test]
fn test_ray_inside_sphere_hits_at_zero() {
    let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::X);
    assert_eq!(ray.intersects_sphere(&Sphere::new(Vec3::ZERO, 2.0)), Some(0.0));
}

#[test]
fn test_ray_misses_sphere_behind() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
    assert_eq!(ray.intersects_sphere(&Sphere::new(Vec3::ZERO, 2.0)), None);
}

// ============================================================================
// Ray vs AABB
// ============================================================================

#[test]
fn test_ray_hits_box_face() {
    let aabb = AxisAlignedBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let ray = Ray::new(Vec3::new(-5.0, 0.25, 0.0), Vec3::X);
    assert!(approx(ray.intersects_aabb(&aabb).unwrap(), 4.0));
}

#[test]
fn test_ray_misses_box() {
    let aabb = AxisAlignedBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let ray = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::X);
    assert_eq!(ray.intersects_aabb(&aabb), None);
    assert_eq!(ray.intersects_aabb(&AxisAlignedBox::new_null()), None);
    assert_eq!(ray.intersects_aabb(&AxisAlignedBox::new_infinite()), Some(0.0));
}

#[test]
fn test_ray_from_inside_box() {
    let aabb = AxisAlignedBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert_eq!(Ray::new(Vec3::ZERO, Vec3::Y).intersects_aabb(&aabb), Some(0.0));
}

// ============================================================================
// Ray vs PlaneBoundedVolume
// ============================================================================

fn unit_cube_volume() -> PlaneBoundedVolume {
    // Normals point inside, outside = negative side
    PlaneBoundedVolume::with_planes(
        vec![
            Plane::new(Vec3::X, 1.0),
            Plane::new(Vec3::NEG_X, 1.0),
            Plane::new(Vec3::Y, 1.0),
            Plane::new(Vec3::NEG_Y, 1.0),
            Plane::new(Vec3::Z, 1.0),
            Plane::new(Vec3::NEG_Z, 1.0),
        ],
        PlaneSide::Negative,
    )
}

#[test]
fn test_ray_enters_volume() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
    assert!(approx(ray.intersects_volume(&unit_cube_volume()).unwrap(), 9.0));
}

#[test]
fn test_ray_misses_volume() {
    let ray = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z);
    assert_eq!(ray.intersects_volume(&unit_cube_volume()), None);
}

#[test]
fn test_ray_starting_inside_volume() {
    let ray = Ray::new(Vec3::new(0.2, 0.1, 0.0), Vec3::X);
    assert_eq!(ray.intersects_volume(&unit_cube_volume()), Some(0.0));
}
