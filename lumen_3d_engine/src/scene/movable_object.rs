/// MovableObject - a bounded object placed in the world through a node.
///
/// Holds a local-space bounding box and caches its world-space bounding
/// box and sphere. The cache is keyed on the node's full transform, so
/// moving the node is picked up on the next query.

use std::rc::{Rc, Weak};
use glam::{Mat4, Vec3};
use crate::math::{AxisAlignedBox, Sphere};
use super::node::NodeTransform;

pub struct MovableObject {
    name: String,
    local_bounding_box: AxisAlignedBox,
    node: Option<Weak<dyn NodeTransform>>,
    visible: bool,
    /// Cached world box and the transform it was computed with
    world_bounding_box: AxisAlignedBox,
    world_box_transform: Option<Mat4>,
}

impl MovableObject {
    pub fn new(name: impl Into<String>, local_bounding_box: AxisAlignedBox) -> Self {
        Self {
            name: name.into(),
            local_bounding_box,
            node: None,
            visible: true,
            world_bounding_box: AxisAlignedBox::new_null(),
            world_box_transform: None,
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_bounding_box(&self) -> &AxisAlignedBox {
        &self.local_bounding_box
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// True while attached to a live node
    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// Radius of the sphere around the local origin enclosing the local box
    pub fn bounding_radius(&self) -> f32 {
        if !self.local_bounding_box.is_finite() {
            return 0.0;
        }
        self.local_bounding_box.minimum().length()
            .max(self.local_bounding_box.maximum().length())
    }

    // ===== SETTERS =====

    pub fn set_local_bounding_box(&mut self, aabb: AxisAlignedBox) {
        self.local_bounding_box = aabb;
        self.world_box_transform = None;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn attach_to_node<N: NodeTransform + 'static>(&mut self, node: &Rc<N>) {
        let weak = Rc::downgrade(node) as Weak<dyn NodeTransform>;
        self.node = Some(weak);
        self.world_box_transform = None;
    }

    pub fn detach_from_node(&mut self) {
        self.node = None;
        self.world_box_transform = None;
    }

    fn parent(&self) -> Option<Rc<dyn NodeTransform>> {
        self.node.as_ref().and_then(Weak::upgrade)
    }

    // ===== WORLD BOUNDS =====

    /// Parent full transform, identity when detached
    pub fn world_transform(&self) -> Mat4 {
        self.parent().map_or(Mat4::IDENTITY, |node| node.full_transform())
    }

    /// World-space bounding box, recomputed when the parent moved
    pub fn world_bounding_box(&mut self) -> AxisAlignedBox {
        let transform = self.world_transform();
        if self.world_box_transform != Some(transform) {
            let mut aabb = self.local_bounding_box;
            aabb.transform(&transform);
            self.world_bounding_box = aabb;
            self.world_box_transform = Some(transform);
        }
        self.world_bounding_box
    }

    /// World-space bounding sphere centered on the parent position
    pub fn world_bounding_sphere(&self) -> Sphere {
        match self.parent() {
            Some(node) => {
                let scale = node.derived_scale().abs().max_element();
                Sphere::new(node.derived_position(), self.bounding_radius() * scale)
            }
            None => Sphere::new(Vec3::ZERO, self.bounding_radius()),
        }
    }
}

#[cfg(test)]
#[path = "movable_object_tests.rs"]
mod tests;
