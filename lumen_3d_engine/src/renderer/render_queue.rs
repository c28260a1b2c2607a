/// Render queue boundary.
///
/// Frustums and cameras contribute debug renderables (their wireframe) to a
/// render queue. `SortedRenderQueue` is a CPU-side implementation that keeps
/// entries grouped by queue id and ordered by priority.

use glam::{Mat4, Vec3};
use rdst::RadixSort;
use rustc_hash::FxHashMap;

/// Queue id of the main geometry pass
pub const RENDER_QUEUE_MAIN: u8 = 50;

/// Priority used when the contributor has no preference
pub const DEFAULT_RENDERABLE_PRIORITY: u16 = 100;

/// Primitive topology of a render operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Triangle list
    TriangleList,
    /// Line list
    LineList,
    /// Point list
    PointList,
}

/// Geometry handed to the backend for one draw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOperation {
    pub topology: PrimitiveTopology,
    /// Vertex positions in the renderable's local space
    pub vertices: Vec<Vec3>,
}

impl RenderOperation {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Tightly packed vertex data, ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices.as_slice())
    }
}

/// Something a render queue can draw
pub trait Renderable {
    fn name(&self) -> &str;

    fn render_operation(&self) -> RenderOperation;

    /// Local-to-world transform
    fn world_transform(&self) -> Mat4;

    /// Squared distance from the camera, for depth sorting
    fn squared_view_depth(&self, camera_position: Vec3) -> f32 {
        (self.world_transform().w_axis.truncate() - camera_position).length_squared()
    }
}

/// Consumer of renderables
pub trait RenderQueue {
    fn add_renderable(&mut self, renderable: Box<dyn Renderable>, queue_id: u8, priority: u16);
}

struct QueueEntry {
    queue_id: u8,
    priority: u16,
    renderable: Box<dyn Renderable>,
}

/// Render queue sorted by (queue id, priority, insertion order)
#[derive(Default)]
pub struct SortedRenderQueue {
    entries: Vec<QueueEntry>,
    group_sizes: FxHashMap<u8, usize>,
}

impl SortedRenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of renderables in one queue group
    pub fn group_size(&self, queue_id: u8) -> usize {
        self.group_sizes.get(&queue_id).copied().unwrap_or(0)
    }

    /// Non-empty queue groups, ascending
    pub fn queue_ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.group_sizes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.group_sizes.clear();
    }

    /// Entries in draw order: queue id, then priority, then insertion order
    pub fn sorted(&self) -> Vec<(u8, u16, &dyn Renderable)> {
        // Key layout: queue id (8) | priority (16) | insertion index (32)
        let mut keys: Vec<u64> = self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                (u64::from(entry.queue_id) << 48)
                    | (u64::from(entry.priority) << 32)
                    | index as u64
            })
            .collect();
        keys.radix_sort_unstable();

        keys.into_iter()
            .map(|key| {
                let entry = &self.entries[(key & 0xFFFF_FFFF) as usize];
                (entry.queue_id, entry.priority, entry.renderable.as_ref())
            })
            .collect()
    }
}

impl RenderQueue for SortedRenderQueue {
    fn add_renderable(&mut self, renderable: Box<dyn Renderable>, queue_id: u8, priority: u16) {
        *self.group_sizes.entry(queue_id).or_insert(0) += 1;
        self.entries.push(QueueEntry { queue_id, priority, renderable });
    }
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
