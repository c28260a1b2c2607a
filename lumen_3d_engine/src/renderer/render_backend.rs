/// Render backend: projection-matrix convention hook.
///
/// Frustums build standard right-handed projection matrices with a [-1, 1]
/// depth range. A backend converts them into its native convention; the
/// result is cached next to the standard matrix.

use glam::Mat4;
use crate::math::mat4_from_rows;

/// GPU backend boundary seen by the frustum
pub trait RenderBackend {
    /// Backend name (for logs)
    fn name(&self) -> &str;

    /// Convert a right-handed, [-1, 1] depth projection matrix into this
    /// backend's convention.
    ///
    /// `for_gpu_program` asks for the matrix fed to shaders, which keeps the
    /// right-handed view space; otherwise the fixed-function convention is
    /// returned.
    fn convert_projection_matrix(&self, matrix: &Mat4, for_gpu_program: bool) -> Mat4;
}

/// OpenGL convention: matrices are used unmodified
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGlConvention;

impl RenderBackend for OpenGlConvention {
    fn name(&self) -> &str {
        "OpenGL"
    }

    fn convert_projection_matrix(&self, matrix: &Mat4, _for_gpu_program: bool) -> Mat4 {
        *matrix
    }
}

/// Direct3D convention: [0, 1] depth, left-handed for fixed function
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct3dConvention;

impl RenderBackend for Direct3dConvention {
    fn name(&self) -> &str {
        "Direct3D"
    }

    fn convert_projection_matrix(&self, matrix: &Mat4, for_gpu_program: bool) -> Mat4 {
        let mut rows = matrix.transpose().to_cols_array_2d();

        // Depth range [-1, 1] -> [0, 1]
        for col in 0..4 {
            rows[2][col] = (rows[2][col] + rows[3][col]) * 0.5;
        }

        if !for_gpu_program {
            // Right-handed -> left-handed
            for row in rows.iter_mut() {
                row[2] = -row[2];
            }
        }

        mat4_from_rows(rows)
    }
}

#[cfg(test)]
#[path = "render_backend_tests.rs"]
mod tests;
