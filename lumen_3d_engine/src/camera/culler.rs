/// Camera culling strategies.
///
/// A CameraCuller determines which scene objects are visible from a given
/// camera. Queries go through the camera, so a culling frustum set on the
/// camera is honoured.

use crate::engine_debug;
use crate::scene::{ObjectKey, Scene};
use super::camera::Camera;
use super::queries::FrustumQueries;
use super::render_view::RenderView;

/// Strategy for determining visible objects from a camera.
///
/// Called once per frame before drawing. The returned RenderView
/// is ephemeral.
///
/// `&mut self` allows stateful implementations (e.g. caching)
/// to maintain state across frames.
pub trait CameraCuller: Send + Sync {
    /// Cull the scene against the camera and return visible objects.
    fn cull(&mut self, scene: &mut Scene, camera: &mut Camera) -> RenderView;
}

/// Frustum culler: tests each visible object's world AABB against the
/// camera's culling volume.
#[derive(Debug, Default)]
pub struct FrustumCuller;

impl FrustumCuller {
    pub fn new() -> Self {
        Self
    }
}

impl CameraCuller for FrustumCuller {
    fn cull(&mut self, scene: &mut Scene, camera: &mut Camera) -> RenderView {
        let visible: Vec<ObjectKey> = scene.objects_mut()
            .filter_map(|(key, object)| {
                if !object.is_visible() {
                    return None;
                }
                let world_aabb = object.world_bounding_box();
                camera.is_visible_aabb(&world_aabb).then_some(key)
            })
            .collect();

        engine_debug!("lumen3d::FrustumCuller", "Camera '{}': {} of {} objects visible",
            camera.name(), visible.len(), scene.object_count());

        let view_matrix = camera.own_view_matrix();
        let projection_matrix = camera.projection_matrix();
        let eye = camera.derived_position();
        RenderView::new(camera.name(), view_matrix, projection_matrix, eye, visible)
    }
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
