//! Layered Compositor
//!
//! Each screen region (prompt, canvas, preview, input, status) renders into
//! its own layer buffer at origin coordinates. The compositor blits visible
//! layers back to front into one output buffer and answers hit tests for
//! mouse events.

mod layer;

use std::collections::HashMap;

use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;

pub use layer::Layer;

/// Unique identifier for a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u32);

/// Owns all layers and composites them together
pub struct Compositor {
    layers: HashMap<LayerId, Layer>,
    /// Layer IDs sorted by z-index, back to front
    render_order: Vec<LayerId>,
    next_id: u32,
    output: Buffer,
    area: Rect,
}

impl Compositor {
    /// Create a compositor for the given screen area
    pub fn new(area: Rect) -> Self {
        Self {
            layers: HashMap::new(),
            render_order: Vec::new(),
            next_id: 0,
            output: Buffer::empty(area),
            area,
        }
    }

    /// Create a layer and return its ID
    pub fn create_layer(&mut self, bounds: Rect, z_index: i32) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        self.layers.insert(id, Layer::new(bounds, z_index));
        self.update_render_order();

        id
    }

    /// Mutable access to a layer's buffer for rendering
    pub fn layer_buffer_mut(&mut self, id: LayerId) -> Option<&mut Buffer> {
        self.layers.get_mut(&id).map(|l| &mut l.buffer)
    }

    /// Screen bounds of a layer
    pub fn layer_bounds(&self, id: LayerId) -> Option<Rect> {
        self.layers.get(&id).map(|l| l.bounds)
    }

    /// Move and resize a layer; its buffer is reallocated when the size changes
    pub fn place_layer(&mut self, id: LayerId, bounds: Rect) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.place(bounds);
        }
    }

    /// Resize the whole screen
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.output = Buffer::empty(area);
    }

    /// Composite all layers into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        self.output.reset();

        for id in &self.render_order {
            if let Some(layer) = self.layers.get(id) {
                Self::blit_layer(&mut self.output, self.area, layer);
            }
        }

        &self.output
    }

    /// Untouched cells are transparent; everything else overwrites
    fn blit_layer(output: &mut Buffer, area: Rect, layer: &Layer) {
        let bounds = layer.bounds;
        let blank = Cell::default();

        for ly in 0..bounds.height {
            for lx in 0..bounds.width {
                let (dst_x, dst_y) = (bounds.x + lx, bounds.y + ly);
                if dst_x >= area.width || dst_y >= area.height {
                    continue;
                }

                let Some(src) = layer.buffer.cell((lx, ly)) else {
                    continue;
                };
                if *src == blank {
                    continue;
                }
                if let Some(dst) = output.cell_mut((dst_x, dst_y)) {
                    *dst = src.clone();
                }
            }
        }
    }

    /// Topmost layer at a screen position
    pub fn layer_at(&self, x: u16, y: u16) -> Option<LayerId> {
        self.render_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.layers.get(id).is_some_and(|l| l.contains(x, y)))
    }

    fn update_render_order(&mut self) {
        self.render_order = self.layers.keys().copied().collect();
        self.render_order
            .sort_by_key(|id| self.layers.get(id).map_or(0, |l| l.z_index));
    }
}
