/// Movable plane - a plane that follows a scene node.
///
/// Frustums link to it for reflection or oblique near clipping and poll
/// `derived_plane()` on every query.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use crate::math::Plane;
use super::node::NodeTransform;

/// Provider of a world-space plane
pub trait PlaneProvider {
    /// Current world-space plane
    fn derived_plane(&self) -> Plane;
}

/// Plane defined in a node's local space.
///
/// Detached (or attached to a dropped node) it reports its local plane.
pub struct MovablePlane {
    name: String,
    plane: Cell<Plane>,
    node: RefCell<Option<Weak<dyn NodeTransform>>>,
}

impl MovablePlane {
    pub fn new(name: impl Into<String>, plane: Plane) -> Self {
        Self {
            name: name.into(),
            plane: Cell::new(plane),
            node: RefCell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plane in local space
    pub fn plane(&self) -> Plane {
        self.plane.get()
    }

    pub fn set_plane(&self, plane: Plane) {
        self.plane.set(plane);
    }

    pub fn attach_to_node<N: NodeTransform + 'static>(&self, node: &Rc<N>) {
        let weak = Rc::downgrade(node) as Weak<dyn NodeTransform>;
        *self.node.borrow_mut() = Some(weak);
    }

    pub fn detach_from_node(&self) {
        *self.node.borrow_mut() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.node.borrow().as_ref().and_then(Weak::upgrade).is_some()
    }
}

impl PlaneProvider for MovablePlane {
    fn derived_plane(&self) -> Plane {
        let local = self.plane.get();
        let node = self.node.borrow().as_ref().and_then(Weak::upgrade);
        match node {
            Some(node) => {
                // Rotation first keeps d, translation shifts along the new normal
                let normal = node.derived_orientation() * local.normal;
                let d = local.d - normal.dot(node.derived_position());
                Plane::new(normal, d)
            }
            None => local,
        }
    }
}

#[cfg(test)]
#[path = "movable_plane_tests.rs"]
mod tests;
