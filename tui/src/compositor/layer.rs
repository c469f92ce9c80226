//! A single compositor layer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// A positioned buffer with a z-index
pub struct Layer {
    /// Screen bounds
    pub bounds: Rect,
    /// Higher renders on top
    pub z_index: i32,
    /// Content, in origin coordinates
    pub buffer: Buffer,
}

impl Layer {
    pub(crate) fn new(bounds: Rect, z_index: i32) -> Self {
        Self {
            bounds,
            z_index,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }

    pub(crate) fn place(&mut self, bounds: Rect) {
        if bounds.width != self.bounds.width || bounds.height != self.bounds.height {
            self.buffer = Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height));
        }
        self.bounds = bounds;
    }

    /// Whether a screen position falls inside this layer
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.bounds.x
            && x < self.bounds.x.saturating_add(self.bounds.width)
            && y >= self.bounds.y
            && y < self.bounds.y.saturating_add(self.bounds.height)
    }
}
