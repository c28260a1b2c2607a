/*!
# Lumen 3D Engine

Visibility and projection core of the Lumen 3D rendering engine.

The heart of this crate is the lazily recomputed frustum chain: from a small
set of user-settable parameters (field of view, near/far distances, pose,
reflection and oblique-clip state) it derives view and projection matrices,
six world-space clip planes and eight world-space corners, and classifies
points, spheres and boxes against the resulting volume.

## Architecture

- **math**: AxisAlignedBox, Plane, Sphere, Ray, PlaneBoundedVolume, matrix helpers
- **scene**: attachment contracts (NodeTransform, PlaneProvider), SceneNode,
  MovablePlane, MovableObject and the keyed Scene store
- **renderer**: RenderBackend projection conventions and the render queue boundary
- **camera**: Frustum, Camera, FrustumQueries, FrustumCuller and RenderView

Caches are recomputed on demand by `&mut self` queries. Nodes and linked planes
are held through `Weak` handles, so a dropped collaborator reads as detached.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod math;
pub mod scene;
pub mod renderer;
pub mod camera;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::{Engine, SharedRenderBackend};

    // Render backend conventions
    pub use crate::renderer::{RenderBackend, OpenGlConvention, Direct3dConvention};

    // Frustum and camera
    pub use crate::camera::{Camera, Frustum, FrustumQueries};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Math sub-module
    pub mod math {
        pub use crate::math::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Render sub-module
    pub mod render {
        pub use crate::renderer::*;
    }

    // Camera sub-module with all frustum/camera types
    pub mod camera {
        pub use crate::camera::*;
    }
}

// Re-export math library at crate root
pub use glam;
