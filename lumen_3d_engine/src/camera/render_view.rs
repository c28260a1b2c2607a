/// RenderView - result of culling a scene against a camera.
///
/// Created by a `CameraCuller`. Holds a snapshot of the camera matrices at
/// culling time and the keys of the visible objects.
///
/// Ephemeral: lives for one frame. The caller can hand the same view to
/// several passes.

use glam::{Mat4, Vec3};
use crate::scene::ObjectKey;

/// Camera snapshot plus visible object keys
#[derive(Debug, Clone)]
pub struct RenderView {
    camera_name: String,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    camera_position: Vec3,
    visible_objects: Vec<ObjectKey>,
}

impl RenderView {
    /// Create a new RenderView (crate-internal: only cullers create these).
    pub(crate) fn new(
        camera_name: impl Into<String>,
        view_matrix: Mat4,
        projection_matrix: Mat4,
        camera_position: Vec3,
        visible_objects: Vec<ObjectKey>,
    ) -> Self {
        Self {
            camera_name: camera_name.into(),
            view_matrix,
            projection_matrix,
            camera_position,
            visible_objects,
        }
    }

    pub fn camera_name(&self) -> &str {
        &self.camera_name
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Projection * view
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// World-space camera position at culling time
    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    /// Keys of visible objects in the Scene.
    pub fn visible_objects(&self) -> &[ObjectKey] {
        &self.visible_objects
    }

    /// Number of visible objects.
    pub fn visible_count(&self) -> usize {
        self.visible_objects.len()
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
