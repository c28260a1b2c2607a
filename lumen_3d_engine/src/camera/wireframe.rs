/// Debug outline of a frustum, handed to a render queue.

use glam::{Mat4, Vec3};
use crate::renderer::{PrimitiveTopology, RenderOperation, Renderable};

/// Snapshot of a frustum's outline as a line list
#[derive(Debug, Clone)]
pub struct FrustumWireframe {
    name: String,
    vertices: Vec<Vec3>,
    world_transform: Mat4,
}

impl FrustumWireframe {
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>, world_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            vertices,
            world_transform,
        }
    }

    /// Line vertices in eye space
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }
}

impl Renderable for FrustumWireframe {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_operation(&self) -> RenderOperation {
        RenderOperation {
            topology: PrimitiveTopology::LineList,
            vertices: self.vertices.clone(),
        }
    }

    fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    /// Frustum outlines are drawn regardless of depth ordering
    fn squared_view_depth(&self, _camera_position: Vec3) -> f32 {
        0.0
    }
}

#[cfg(test)]
#[path = "wireframe_tests.rs"]
mod tests;
