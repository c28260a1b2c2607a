/// Renderer module - the backend boundary seen by frustums and cameras

mod render_backend;
mod render_queue;

pub use render_backend::{RenderBackend, OpenGlConvention, Direct3dConvention};
pub use render_queue::{
    Renderable, RenderOperation, PrimitiveTopology,
    RenderQueue, SortedRenderQueue,
    RENDER_QUEUE_MAIN, DEFAULT_RENDERABLE_PRIORITY,
};
