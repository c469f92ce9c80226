//! Stroke Capture Surface
//!
//! Converts pointer and touch input into line segments rasterized onto a
//! fixed-size RGB buffer, and exports the buffer as a PNG data URL.
//!
//! # Coordinates
//!
//! Surfaces report input in their own screen space. [`SurfaceOrigin`]
//! subtracts the surface's on-screen offset so every point reaching
//! [`StrokeSurface`] is surface-local. Touch input uses the first active
//! touch only.
//!
//! # Drawing style
//!
//! The style is fixed configuration ([`StrokeStyle::DEFAULT`]): black ink,
//! 3px wide, on white. Segments are drawn by stamping a round brush along
//! their length, which gives round caps and round joins.

use std::fmt;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};

/// Distance between brush stamps along a segment, in pixels
const STAMP_SPACING: f32 = 0.5;

/// A surface-local (or screen) position
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Raw input as delivered by a UI surface, in screen coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum PointerInput {
    /// Mouse or pen pointer
    Mouse {
        /// Screen position of the pointer
        client: Point,
    },
    /// Touch input; only the first touch is used
    Touch {
        /// Active touches in screen coordinates
        touches: Vec<Point>,
    },
}

/// On-screen offset of a surface
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceOrigin {
    /// Screen x of the surface's left edge
    pub left: f32,
    /// Screen y of the surface's top edge
    pub top: f32,
}

impl SurfaceOrigin {
    /// Create an origin
    #[must_use]
    pub const fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }

    /// Normalize input into surface-local coordinates
    ///
    /// Returns `None` for a touch event without active touches.
    #[must_use]
    pub fn to_local(&self, input: &PointerInput) -> Option<Point> {
        let client = match input {
            PointerInput::Mouse { client } => *client,
            PointerInput::Touch { touches } => *touches.first()?,
        };
        Some(Point::new(client.x - self.left, client.y - self.top))
    }
}

/// Fixed drawing style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Ink colour
    pub ink: Rgb<u8>,
    /// Background colour the buffer is cleared to
    pub background: Rgb<u8>,
    /// Line width in pixels
    pub width: f32,
}

impl StrokeStyle {
    /// Black 3px ink on white
    pub const DEFAULT: Self = Self {
        ink: Rgb([0, 0, 0]),
        background: Rgb([255, 255, 255]),
        width: 3.0,
    };
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A self-contained encoded image (`data:image/png;base64,...`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedImage(String);

impl EncodedImage {
    const PNG_PREFIX: &'static str = "data:image/png;base64,";

    /// Encode raw PNG bytes as a data URL
    #[must_use]
    pub fn from_png(bytes: &[u8]) -> Self {
        Self(format!("{}{}", Self::PNG_PREFIX, STANDARD.encode(bytes)))
    }

    /// Wrap an existing data URL
    #[must_use]
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// The data URL
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base64 payload after the comma, if the URL has one
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.0.split_once(',').map(|(_, payload)| payload)
    }

    /// Consume into the data URL
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The stroke buffer plus the active path
#[derive(Clone, Debug)]
pub struct StrokeSurface {
    buffer: RgbImage,
    style: StrokeStyle,
    /// Last point of the active path; `None` between gestures
    cursor: Option<Point>,
    /// Whether any pixel has been inked since the last clear
    inked: bool,
}

impl StrokeSurface {
    /// Create a blank surface of the given logical size
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_style(width, height, StrokeStyle::DEFAULT)
    }

    /// Create a blank surface with an explicit style
    #[must_use]
    pub fn with_style(width: u32, height: u32, style: StrokeStyle) -> Self {
        Self {
            buffer: RgbImage::from_pixel(width, height, style.background),
            style,
            cursor: None,
            inked: false,
        }
    }

    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// The drawing style
    #[must_use]
    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Whether a path is active
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Whether nothing has been drawn since creation or the last clear
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.inked
    }

    /// Whether the pixel at (x, y) differs from the background
    #[must_use]
    pub fn is_inked(&self, x: u32, y: u32) -> bool {
        self.buffer
            .get_pixel_checked(x, y)
            .is_some_and(|pixel| *pixel != self.style.background)
    }

    /// Start a new path at `point`
    pub fn begin(&mut self, point: Point) {
        self.cursor = Some(point);
    }

    /// Draw a segment from the last point to `point`
    ///
    /// No-op without an active path.
    pub fn extend(&mut self, point: Point) {
        let Some(last) = self.cursor else {
            return;
        };
        self.draw_segment(last, point);
        self.cursor = Some(point);
    }

    /// Terminate the active path
    pub fn end(&mut self) {
        self.cursor = None;
    }

    /// Reset every pixel to the background
    pub fn clear(&mut self) {
        let background = self.style.background;
        for pixel in self.buffer.pixels_mut() {
            *pixel = background;
        }
        self.inked = false;
    }

    /// Export the buffer as a PNG data URL
    ///
    /// Never fails. If PNG encoding itself errors the payload is empty and
    /// the failure is logged.
    #[must_use]
    pub fn export_image(&self) -> EncodedImage {
        let mut png = Vec::new();
        if let Err(e) = self
            .buffer
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        {
            tracing::error!(error = %e, "Failed to encode stroke buffer as PNG");
            png.clear();
        }
        EncodedImage::from_png(&png)
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        // Only the part of the segment the brush can reach is stamped
        let reach = f64::from(self.style.width / 2.0);
        let bounds = [
            -reach,
            -reach,
            f64::from(self.width()) + reach,
            f64::from(self.height()) + reach,
        ];
        let Some((from, to)) = clip_segment(from, to, bounds) else {
            return;
        };

        let length = from.distance(to);
        // Truncation is fine: the count only needs to be roughly length / spacing
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = ((length / STAMP_SPACING).ceil() as u32).max(1);

        #[allow(clippy::cast_precision_loss)]
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.stamp(from.lerp(to, t));
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn stamp(&mut self, center: Point) {
        let radius = self.style.width / 2.0;
        let (width, height) = (i64::from(self.width()), i64::from(self.height()));

        let min_x = ((center.x - radius).floor() as i64).max(0);
        let max_x = ((center.x + radius).ceil() as i64).min(width - 1);
        let min_y = ((center.y - radius).floor() as i64).max(0);
        let max_y = ((center.y + radius).ceil() as i64).min(height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    self.buffer.put_pixel(x as u32, y as u32, self.style.ink);
                    self.inked = true;
                }
            }
        }
    }
}

impl Default for StrokeSurface {
    fn default() -> Self {
        Self::new(200, 300)
    }
}

/// The part of a segment inside `[left, top, right, bottom]` (Liang-Barsky)
///
/// Works in `f64` so that far-away endpoints keep the clipped ends exact.
/// Non-finite endpoints clip to nothing.
#[allow(clippy::cast_possible_truncation)]
fn clip_segment(from: Point, to: Point, bounds: [f64; 4]) -> Option<(Point, Point)> {
    if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
        return None;
    }

    let [left, top, right, bottom] = bounds;
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let (dx, dy) = (f64::from(to.x) - x0, f64::from(to.y) - y0);

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, x0 - left), (dx, right - x0), (-dy, y0 - top), (dy, bottom - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| Point::new((x0 + dx * t) as f32, (y0 + dy * t) as f32);
    Some((at(t0), at(t1)))
}
