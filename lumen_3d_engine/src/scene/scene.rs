/// Scene - a keyed collection of MovableObjects for culling.
///
/// Uses a SlotMap for O(1) insert/remove with stable keys.
/// Objects are stored contiguously for cache-friendly iteration.

use slotmap::{new_key_type, SlotMap};
use super::movable_object::MovableObject;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a MovableObject within a Scene.
    ///
    /// Keys remain valid even after other objects are removed.
    /// A key becomes invalid only when its own object is removed.
    pub struct ObjectKey;
}

/// A scene containing movable objects.
#[derive(Default)]
pub struct Scene {
    objects: SlotMap<ObjectKey, MovableObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self { objects: SlotMap::with_key() }
    }

    /// Add an object, returning its stable key
    pub fn add_object(&mut self, object: MovableObject) -> ObjectKey {
        self.objects.insert(object)
    }

    /// Remove an object. Returns it if the key was valid.
    pub fn remove_object(&mut self, key: ObjectKey) -> Option<MovableObject> {
        self.objects.remove(key)
    }

    pub fn object(&self, key: ObjectKey) -> Option<&MovableObject> {
        self.objects.get(key)
    }

    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut MovableObject> {
        self.objects.get_mut(key)
    }

    pub fn object_keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.objects.keys()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &MovableObject)> {
        self.objects.iter()
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = (ObjectKey, &mut MovableObject)> {
        self.objects.iter_mut()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
