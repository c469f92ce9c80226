//! Stroke Canvas Widget
//!
//! Shows a [`StrokeSurface`] in the terminal with half-block cells: every
//! cell is two square "pixels", the upper half drawn as `▀` foreground and
//! the lower half as background.
//!
//! [`CanvasViewport`] fixes how many surface pixels one half-cell covers and
//! turns terminal mouse positions into [`PointerInput`] so that the core's
//! [`SurfaceOrigin`] mapping does the rest.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use studio_core::{Point, PointerInput, StrokeSurface, SurfaceOrigin};

const HALF_BLOCK: &str = "▀";

/// Placement and scale of the canvas on screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasViewport {
    /// Screen cells covered by the canvas
    pub area: Rect,
    /// Surface pixels per cell column, and per half cell row
    pub scale: f32,
}

impl CanvasViewport {
    /// Largest viewport with the surface's aspect ratio that fits `bounds`
    pub fn fit(bounds: Rect, surface_width: u32, surface_height: u32) -> Self {
        if bounds.width == 0 || bounds.height == 0 || surface_width == 0 || surface_height == 0 {
            return Self {
                area: Rect::new(bounds.x, bounds.y, 0, 0),
                scale: 1.0,
            };
        }

        let (w, h) = (surface_width as f32, surface_height as f32);
        let scale = (w / f32::from(bounds.width)).max(h / (2.0 * f32::from(bounds.height)));

        let columns = ((w / scale).ceil() as u16).min(bounds.width);
        let rows = ((h / (2.0 * scale)).ceil() as u16).min(bounds.height);

        Self {
            area: Rect::new(bounds.x, bounds.y, columns, rows),
            scale,
        }
    }

    /// Whether a screen cell belongs to the canvas
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.right()
            && row >= self.area.y
            && row < self.area.bottom()
    }

    /// Pointer input at the centre of a screen cell, in scaled screen pixels
    pub fn pointer(&self, column: u16, row: u16) -> PointerInput {
        PointerInput::Mouse {
            client: Point::new(
                (f32::from(column) + 0.5) * self.scale,
                (f32::from(row) * 2.0 + 1.0) * self.scale,
            ),
        }
    }

    /// On-screen offset of the surface, in scaled screen pixels
    pub fn origin(&self) -> SurfaceOrigin {
        SurfaceOrigin::new(
            f32::from(self.area.x) * self.scale,
            f32::from(self.area.y) * 2.0 * self.scale,
        )
    }
}

/// Renders a stroke surface at a viewport's scale
pub struct StrokeCanvas<'a> {
    surface: &'a StrokeSurface,
    scale: f32,
}

impl<'a> StrokeCanvas<'a> {
    pub fn new(surface: &'a StrokeSurface, viewport: &CanvasViewport) -> Self {
        Self {
            surface,
            scale: viewport.scale,
        }
    }

    /// Whether any pixel under the half cell (column, half_row) is inked
    fn half_inked(&self, column: u16, half_row: u16) -> bool {
        let span = |cell: u16, limit: u32| {
            let start = (f32::from(cell) * self.scale).floor() as u32;
            let end = ((f32::from(cell) + 1.0) * self.scale).floor() as u32;
            (start.min(limit), end.max(start + 1).min(limit))
        };

        let (x0, x1) = span(column, self.surface.width());
        let (y0, y1) = span(half_row, self.surface.height());

        (y0..y1).any(|y| (x0..x1).any(|x| self.surface.is_inked(x, y)))
    }
}

fn color(rgb: [u8; 3]) -> Color {
    Color::Rgb(rgb[0], rgb[1], rgb[2])
}

impl Widget for StrokeCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = self.surface.style();
        let (ink, paper) = (color(style.ink.0), color(style.background.0));

        for row in 0..area.height {
            for column in 0..area.width {
                let top = if self.half_inked(column, row * 2) { ink } else { paper };
                let bottom = if self.half_inked(column, row * 2 + 1) { ink } else { paper };

                if let Some(cell) = buf.cell_mut((area.x + column, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK).set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        let viewport = CanvasViewport::fit(Rect::new(2, 1, 80, 30), 200, 300);

        // Height bound: 300 px over 60 half rows
        assert_eq!(viewport.scale, 5.0);
        assert_eq!(viewport.area, Rect::new(2, 1, 40, 30));
    }

    #[test]
    fn test_fit_degenerate_bounds() {
        let viewport = CanvasViewport::fit(Rect::new(0, 0, 0, 10), 200, 300);
        assert_eq!(viewport.area.area(), 0);
        assert!(!viewport.contains(0, 0));
    }

    #[test]
    fn test_pointer_maps_to_surface_pixels() {
        let viewport = CanvasViewport::fit(Rect::new(2, 1, 80, 30), 200, 300);

        let input = viewport.pointer(2, 1);
        let local = viewport.origin().to_local(&input).unwrap();
        assert_eq!(local, Point::new(2.5, 5.0));

        let input = viewport.pointer(41, 30);
        let local = viewport.origin().to_local(&input).unwrap();
        assert_eq!(local, Point::new(197.5, 295.0));
    }

    #[test]
    fn test_render_shows_ink() {
        let mut surface = StrokeSurface::new(20, 20);
        surface.begin(Point::new(1.0, 1.0));
        surface.extend(Point::new(2.0, 1.0));
        surface.end();

        let viewport = CanvasViewport::fit(Rect::new(0, 0, 4, 2), 20, 20);
        assert_eq!(viewport.scale, 5.0);

        let mut buf = Buffer::empty(viewport.area);
        StrokeCanvas::new(&surface, &viewport).render(viewport.area, &mut buf);

        let inked = buf.cell((0, 0)).unwrap();
        assert_eq!(inked.symbol(), HALF_BLOCK);
        assert_eq!(inked.fg, Color::Rgb(0, 0, 0));

        let blank = buf.cell((3, 1)).unwrap();
        assert_eq!(blank.fg, Color::Rgb(255, 255, 255));
        assert_eq!(blank.bg, Color::Rgb(255, 255, 255));
    }
}
