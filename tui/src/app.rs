//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin surface over the
//! studio shell:
//! - Event loop (keyboard, mouse, resize)
//! - Stroke capture from mouse drags on the canvas layer
//! - At most one network action in flight, polled alongside input
//! - Rendering through the layered compositor

use std::io;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{StatefulWidget, Widget};
use ratatui::Terminal;

use studio_core::{
    CaptureState, PendingSubmission, ResolvedSubmission, StatusLevel, Studio, StudioError,
    SubmissionKind,
};

use crate::compositor::{Compositor, LayerId};
use crate::theme;
use crate::widgets::{CanvasViewport, StrokeCanvas, TextBlock, TextBlockState};

/// Input box height (separator plus text lines)
const INPUT_HEIGHT: u16 = 3;

/// Redraw interval while idle
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

const KEY_HINTS: &str =
    "^S save | ^L clear | Enter render | ^G dataset | ^Y copy | ^H/F5 health | Esc quit";

const PREVIEW_PLACEHOLDER: &str = "Type text below and press Enter to render it in your handwriting.";

/// Layer IDs for UI regions
struct AppLayers {
    prompt: LayerId,
    canvas: LayerId,
    preview: LayerId,
    input: LayerId,
    status: LayerId,
}

/// Screen regions for a terminal size
struct Regions {
    prompt: Rect,
    canvas_bounds: Rect,
    preview: Rect,
    input: Rect,
    status: Rect,
}

impl Regions {
    fn for_area(area: Rect) -> Self {
        let main_height = area.height.saturating_sub(INPUT_HEIGHT + 1);
        let left_width = area.width / 2;

        Self {
            prompt: Rect::new(0, 0, left_width, main_height.min(1)),
            canvas_bounds: Rect::new(
                1,
                1,
                left_width.saturating_sub(2),
                main_height.saturating_sub(1),
            ),
            preview: Rect::new(
                left_width + 1,
                0,
                area.width.saturating_sub(left_width + 1),
                main_height,
            ),
            input: Rect::new(
                0,
                main_height,
                area.width,
                INPUT_HEIGHT.min(area.height.saturating_sub(1)),
            ),
            status: Rect::new(0, area.height.saturating_sub(1), area.width, area.height.min(1)),
        }
    }
}

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// The application shell
    studio: Studio,

    // === UI Components ===
    compositor: Compositor,
    layers: AppLayers,
    viewport: CanvasViewport,
    preview_state: TextBlockState,
}

impl App {
    /// Create an app for a terminal of `size` (columns, rows)
    pub fn new(studio: Studio, size: (u16, u16)) -> Self {
        let area = Rect::new(0, 0, size.0, size.1);
        let regions = Regions::for_area(area);
        let viewport = CanvasViewport::fit(
            regions.canvas_bounds,
            studio.surface().width(),
            studio.surface().height(),
        );

        let mut compositor = Compositor::new(area);
        let layers = AppLayers {
            prompt: compositor.create_layer(regions.prompt, 0),
            canvas: compositor.create_layer(viewport.area, 5),
            preview: compositor.create_layer(regions.preview, 0),
            input: compositor.create_layer(regions.input, 10),
            status: compositor.create_layer(regions.status, 10),
        };

        Self {
            running: true,
            studio,
            compositor,
            layers,
            viewport,
            preview_state: TextBlockState::default(),
        }
    }

    /// The application shell
    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Where the canvas sits on screen
    pub fn viewport(&self) -> CanvasViewport {
        self.viewport
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        // Check the service so the status bar says early if it is unreachable
        let mut in_flight: Option<BoxFuture<'static, ResolvedSubmission>> = self
            .studio
            .begin_health_check()
            .ok()
            .map(|pending| pending.resolve().boxed());

        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events first so drawing stays responsive
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Some(pending) = self.handle_event(event) {
                            in_flight = Some(pending.resolve().boxed());
                        }
                    }
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                resolved = next_resolved(&mut in_flight) => {
                    in_flight = None;
                    self.complete(resolved);
                }

                _ = tokio::time::sleep(FRAME_INTERVAL) => {}
            }

            self.render(terminal)?;
        }

        if in_flight.is_some() {
            tracing::info!("Quitting with a request in flight; it is abandoned");
        }

        Ok(())
    }

    /// Apply one terminal event; returns a network action to drive, if one started
    pub fn handle_event(&mut self, event: Event) -> Option<PendingSubmission> {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                None
            }
            Event::Resize(width, height) => {
                self.handle_resize(width, height);
                None
            }
            _ => None,
        }
    }

    /// Fold a finished network action into the shell
    pub fn complete(&mut self, resolved: ResolvedSubmission) {
        let kind = resolved.kind();
        match self.studio.apply(resolved) {
            Ok(()) if kind == SubmissionKind::RenderText => self.preview_state.scroll_to_top(),
            Ok(()) => {}
            Err(e) => tracing::debug!(%kind, error = %e, "Action finished with an error"),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<PendingSubmission> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        let started = match key.code {
            // Quit
            KeyCode::Esc => {
                self.running = false;
                return None;
            }
            KeyCode::Char('c') if ctrl => {
                self.running = false;
                return None;
            }

            // Actions
            KeyCode::Char('s') if ctrl => self.studio.begin_save_drawing(),
            KeyCode::Char('g') if ctrl => self.studio.begin_generate_dataset(),
            KeyCode::Char('h') if ctrl => self.studio.begin_health_check(),
            KeyCode::F(5) => self.studio.begin_health_check(),
            KeyCode::Enter => self.studio.begin_render_text(),
            KeyCode::Char('l') if ctrl => {
                if let Err(e) = self.studio.clear_drawing() {
                    tracing::debug!(error = %e, "Clear not performed");
                }
                return None;
            }
            KeyCode::Char('y') if ctrl => {
                if let Err(e) = self.studio.copy_rendered_output() {
                    tracing::debug!(error = %e, "Copy not performed");
                }
                return None;
            }

            // Typing
            KeyCode::Char(c) if !ctrl => {
                self.studio.text_input_mut().push(c);
                return None;
            }
            KeyCode::Backspace => {
                self.studio.text_input_mut().pop();
                return None;
            }

            // Preview scrolling
            KeyCode::PageUp => {
                self.preview_state.scroll(-3);
                return None;
            }
            KeyCode::PageDown => {
                self.preview_state.scroll(3);
                return None;
            }

            _ => return None,
        };

        match started {
            Ok(pending) => Some(pending),
            Err(StudioError::Busy) => {
                tracing::debug!("Ignoring action while another is in flight");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Action rejected");
                None
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);

        // The drawing is frozen while an action is in flight
        let drawn = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.compositor.layer_at(column, row) != Some(self.layers.canvas) {
                    return;
                }
                let input = self.viewport.pointer(column, row);
                match self.viewport.origin().to_local(&input) {
                    Some(point) => self.studio.begin_stroke(point),
                    None => Ok(()),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if !self.studio.surface().is_drawing() {
                    return;
                }
                let input = self.viewport.pointer(column, row);
                match self.viewport.origin().to_local(&input) {
                    Some(point) => self.studio.extend_stroke(point),
                    None => Ok(()),
                }
            }
            MouseEventKind::Up(_) => {
                self.studio.end_stroke();
                Ok(())
            }
            MouseEventKind::ScrollUp => {
                self.preview_state.scroll(-1);
                Ok(())
            }
            MouseEventKind::ScrollDown => {
                self.preview_state.scroll(1);
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(e) = drawn {
            tracing::trace!(error = %e, "Stroke input ignored");
        }
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        let area = Rect::new(0, 0, width, height);
        let regions = Regions::for_area(area);

        self.compositor.resize(area);
        self.viewport = CanvasViewport::fit(
            regions.canvas_bounds,
            self.studio.surface().width(),
            self.studio.surface().height(),
        );

        self.compositor.place_layer(self.layers.prompt, regions.prompt);
        self.compositor.place_layer(self.layers.canvas, self.viewport.area);
        self.compositor.place_layer(self.layers.preview, regions.preview);
        self.compositor.place_layer(self.layers.input, regions.input);
        self.compositor.place_layer(self.layers.status, regions.status);

        tracing::debug!(width, height, scale = self.viewport.scale, "Resized");
    }

    // === Rendering ===

    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let output = self.compose();
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    if let (Some(src), Some(dst)) = (output.cell((x, y)), buf.cell_mut((x, y))) {
                        *dst = src.clone();
                    }
                }
            }
        })?;

        Ok(())
    }

    /// Render every layer and return the composited screen
    pub fn compose(&mut self) -> &Buffer {
        self.render_prompt();
        self.render_canvas();
        self.render_preview();
        self.render_input();
        self.render_status();
        self.compositor.composite()
    }

    fn render_prompt(&mut self) {
        let session = self.studio.session();
        let progress = session.progress();
        let text = match (session.state(), session.current_symbol()) {
            (CaptureState::Capturing(_), Some(symbol)) => format!(
                "Draw '{symbol}'  ({}/{} saved)",
                progress.captured, progress.total
            ),
            _ => format!("All {} symbols captured", progress.total),
        };

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.prompt) {
            buf.reset();
            let area = buf.area;
            let style = Style::default()
                .fg(theme::ACCENT_BLUE)
                .add_modifier(Modifier::BOLD);
            buf.set_stringn(area.x + 1, area.y, &text, area.width.saturating_sub(1) as usize, style);
        }
    }

    fn render_canvas(&mut self) {
        let viewport = self.viewport;
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.canvas) {
            let area = buf.area;
            StrokeCanvas::new(self.studio.surface(), &viewport).render(area, buf);
        }
    }

    fn render_preview(&mut self) {
        let text = self.studio.display().text();
        let (content, style) = match text.as_deref() {
            Some(text) => (text, Style::default().fg(theme::PREVIEW_INK)),
            None => (PREVIEW_PLACEHOLDER, Style::default().fg(theme::DIM_GRAY)),
        };

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.preview) {
            buf.reset();
            let area = buf.area;
            if area.height < 2 {
                return;
            }

            buf.set_stringn(
                area.x,
                area.y,
                "Rendered handwriting",
                area.width as usize,
                Style::default().fg(theme::ACCENT_BLUE),
            );

            let body = Rect::new(area.x, area.y + 1, area.width, area.height - 1);
            TextBlock::new(content)
                .style(style)
                .render(body, buf, &mut self.preview_state);
        }
    }

    fn render_input(&mut self) {
        let input = self.studio.text_input();

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.input) {
            buf.reset();
            let area = buf.area;

            let separator = "-".repeat(area.width as usize);
            buf.set_string(area.x, area.y, &separator, Style::default().fg(theme::DIM_GRAY));

            let text_height = area.height.saturating_sub(1) as usize;
            let text_width = area.width.saturating_sub(1) as usize;
            if text_width < 5 || text_height < 1 {
                return;
            }

            let full_input = format!("Text: {input}_");
            let wrapped: Vec<String> = textwrap::wrap(&full_input, text_width)
                .iter()
                .map(ToString::to_string)
                .collect();

            // Keep the cursor line visible
            let skip = wrapped.len().saturating_sub(text_height);
            for (y, line) in (area.y + 1..area.bottom()).zip(wrapped.iter().skip(skip)) {
                buf.set_string(area.x, y, line, Style::default().fg(theme::INPUT_GREEN));
            }
        }
    }

    fn render_status(&mut self) {
        let (text, level) = match self.studio.status() {
            Some(status) => (status.text.clone(), status.level),
            None => ("Ready".to_string(), StatusLevel::Info),
        };

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.status) {
            buf.reset();
            let area = buf.area;
            let width = area.width as usize;

            let (x, _) = buf.set_stringn(
                area.x,
                area.y,
                format!(" {text}"),
                width,
                Style::default().fg(theme::status_color(level)),
            );
            let remaining = width.saturating_sub(usize::from(x - area.x));
            buf.set_stringn(
                x,
                area.y,
                format!(" | {KEY_HINTS}"),
                remaining,
                Style::default().fg(theme::DIM_GRAY),
            );
        }
    }
}

/// Resolves the in-flight action, or never when idle
async fn next_resolved(
    in_flight: &mut Option<BoxFuture<'static, ResolvedSubmission>>,
) -> ResolvedSubmission {
    match in_flight.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}
