/// Matrix and rotation helpers shared by Frustum and Camera.
///
/// glam matrices are column-major. Helpers that are naturally written row by
/// row go through `mat4_from_rows`.

use glam::{Mat3, Mat4, Quat, Vec3};
use super::plane::Plane;

/// Build a matrix from its rows
pub fn mat4_from_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows).transpose()
}

/// -1, 0 or 1 (zero maps to zero, unlike `f32::signum`)
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Reflect a direction about a plane normal (unit length)
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Matrix mirroring space through `plane` (unit normal expected)
pub fn build_reflection_matrix(plane: &Plane) -> Mat4 {
    let n = plane.normal;
    let d = plane.d;
    mat4_from_rows([
        [-2.0 * n.x * n.x + 1.0, -2.0 * n.x * n.y, -2.0 * n.x * n.z, -2.0 * n.x * d],
        [-2.0 * n.y * n.x, -2.0 * n.y * n.y + 1.0, -2.0 * n.y * n.z, -2.0 * n.y * d],
        [-2.0 * n.z * n.x, -2.0 * n.z * n.y, -2.0 * n.z * n.z + 1.0, -2.0 * n.z * d],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// View matrix for an eye at `position` with `orientation`.
///
/// The eye looks down its local -Z. With `reflect_matrix`, the world is
/// mirrored before the view transform.
pub fn make_view_matrix(position: Vec3, orientation: Quat, reflect_matrix: Option<&Mat4>) -> Mat4 {
    let rot_t = Mat3::from_quat(orientation).transpose();
    let trans = -(rot_t * position);

    let view = Mat4::from_cols(
        rot_t.x_axis.extend(0.0),
        rot_t.y_axis.extend(0.0),
        rot_t.z_axis.extend(0.0),
        trans.extend(1.0),
    );

    match reflect_matrix {
        Some(reflect) => view * *reflect,
        None => view,
    }
}

/// Shortest-arc rotation taking `from` onto `to`.
///
/// Opposite vectors rotate half a turn about `fallback_axis`, or about an
/// arbitrary perpendicular axis when `fallback_axis` is zero.
pub fn rotation_to(from: Vec3, to: Vec3, fallback_axis: Vec3) -> Quat {
    let v0 = from.normalize_or_zero();
    let v1 = to.normalize_or_zero();
    let d = v0.dot(v1);

    if d >= 1.0 {
        return Quat::IDENTITY;
    }

    if d < 1e-6 - 1.0 {
        if fallback_axis != Vec3::ZERO {
            return Quat::from_axis_angle(fallback_axis.normalize(), std::f32::consts::PI);
        }
        let mut axis = Vec3::X.cross(from);
        if axis.length_squared() < 1e-12 {
            axis = Vec3::Y.cross(from);
        }
        return Quat::from_axis_angle(axis.normalize(), std::f32::consts::PI);
    }

    let s = ((1.0 + d) * 2.0).sqrt();
    let inv_s = 1.0 / s;
    let c = v0.cross(v1);
    Quat::from_xyzw(c.x * inv_s, c.y * inv_s, c.z * inv_s, s * 0.5).normalize()
}

#[cfg(test)]
#[path = "util_tests.rs"]
mod tests;
