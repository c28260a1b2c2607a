//! Scene module
//!
//! Attachment contracts and the objects frustums are culled against:
//! nodes supplying world transforms, planes linked for reflection or
//! oblique clipping, and the keyed object store walked by the culler.

mod node;
mod movable_plane;
mod movable_object;
mod scene;

pub use node::{NodeTransform, SceneNode};
pub use movable_plane::{PlaneProvider, MovablePlane};
pub use movable_object::MovableObject;
pub use scene::{Scene, ObjectKey};
