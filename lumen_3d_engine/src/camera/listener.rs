/// Camera event callbacks.
///
/// Listeners receive the camera mutably, so a callback may add or remove
/// listeners; the camera always iterates over a copy of its list.

use super::camera::Camera;

/// Observer of camera rendering events. All methods default to no-ops.
pub trait CameraListener {
    /// Called before the scene is rendered from this camera
    fn camera_pre_render_scene(&self, _camera: &mut Camera) {}

    /// Called after the scene has been rendered from this camera
    fn camera_post_render_scene(&self, _camera: &mut Camera) {}

    /// Called when the camera is dropped
    fn camera_destroyed(&self, _camera: &mut Camera) {}
}
