/// Scene node - the attachment contract frustums and objects poll.
///
/// Transform propagation through a hierarchy lives outside this crate. A
/// frustum only needs the node's derived (world) pose, which it compares
/// against its last cached values to detect movement.

use std::cell::Cell;
use glam::{Mat4, Quat, Vec3};

/// World transform provider an object can be attached to.
///
/// Implementations must return plain values: equality on the returned
/// orientation / position is how dependants detect staleness.
pub trait NodeTransform {
    /// World-space orientation
    fn derived_orientation(&self) -> Quat;

    /// World-space position
    fn derived_position(&self) -> Vec3;

    /// World-space scale
    fn derived_scale(&self) -> Vec3 {
        Vec3::ONE
    }

    /// Full world transform (scale, then rotation, then translation)
    fn full_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.derived_scale(),
            self.derived_orientation(),
            self.derived_position(),
        )
    }
}

/// Minimal world-transform holder.
///
/// Uses interior mutability so a node shared through `Rc` can be moved
/// while frustums hold a `Weak` handle to it.
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    position: Cell<Vec3>,
    orientation: Cell<Quat>,
    scale: Cell<Vec3>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Cell::new(Vec3::ZERO),
            orientation: Cell::new(Quat::IDENTITY),
            scale: Cell::new(Vec3::ONE),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ===== SETTERS =====

    pub fn set_position(&self, position: Vec3) {
        self.position.set(position);
    }

    pub fn translate(&self, offset: Vec3) {
        self.position.set(self.position.get() + offset);
    }

    /// Set the orientation (normalised)
    pub fn set_orientation(&self, orientation: Quat) {
        self.orientation.set(orientation.normalize());
    }

    /// Rotate about a world-space axis
    pub fn rotate(&self, axis: Vec3, angle: f32) {
        let q = Quat::from_axis_angle(axis.normalize(), angle);
        self.orientation.set((q * self.orientation.get()).normalize());
    }

    pub fn set_scale(&self, scale: Vec3) {
        self.scale.set(scale);
    }
}

impl NodeTransform for SceneNode {
    fn derived_orientation(&self) -> Quat {
        self.orientation.get()
    }

    fn derived_position(&self) -> Vec3 {
        self.position.get()
    }

    fn derived_scale(&self) -> Vec3 {
        self.scale.get()
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
