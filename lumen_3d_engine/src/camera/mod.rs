//! Camera module - frustum, camera, culling and render view.
//!
//! `Frustum` owns the lazily recomputed projection chain. `Camera` wraps a
//! frustum with a viewpoint API and can delegate visibility queries to a
//! separate culling frustum. Both answer `FrustumQueries`.
//!
//! The engine does NOT store or manage cameras. They are owned and driven
//! by the caller.

mod camera;
mod culler;
mod frustum;
mod listener;
mod queries;
mod render_view;
mod wireframe;

pub use camera::{Camera, CameraDesc, PolygonMode};
pub use culler::{CameraCuller, FrustumCuller};
pub use frustum::{
    Frustum, FrustumDesc, FrustumExtents, FrustumPlane, FrustumTest, ProjectionType,
    INFINITE_FAR_DISTANCE, INFINITE_FAR_PLANE_ADJUST,
};
pub use listener::CameraListener;
pub use queries::{FrustumQueries, NdcRect, Visibility};
pub use render_view::RenderView;
pub use wireframe::FrustumWireframe;
