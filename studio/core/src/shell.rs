//! Studio - The Application Shell
//!
//! The shell owns the UI state (text input, status message, busy flag) and
//! the components, and sequences the user's actions:
//!
//! 1. Generate test dataset
//! 2. Save current drawing
//! 3. Render text
//! 4. Copy rendered output
//! 5. Health check
//!
//! # Single flight
//!
//! At most one action runs at a time. Network actions are split so a
//! surface can keep handling input while a request is outstanding:
//!
//! ```text
//! begin_*()  ──▶ PendingSubmission ──resolve()──▶ ResolvedSubmission ──apply()──▶ status
//!    │                 (holds BusyGuard)                (holds BusyGuard)           │
//!    └── busy? ──▶ Err(Busy)                                      guard dropped ◀──┘
//! ```
//!
//! The busy flag is released when the guard drops, on every path out,
//! including a pending submission that is dropped unresolved.
//!
//! The drawing is frozen while the flag is held: strokes and clears are
//! rejected with [`StudioError::Busy`], so a save acknowledgement only ever
//! clears the image that was exported.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::api::{ApiClient, ApiError, SubmissionKind, SubmissionRequest, SubmissionResult, TransportError};
use crate::config::StudioConfig;
use crate::display::RenderDisplay;
use crate::error::StudioError;
use crate::session::{CaptureState, LetterSession};
use crate::surface::{Point, StrokeSurface};

/// Shown when rendering is requested with blank text
pub const BLANK_TEXT_MESSAGE: &str = "Please enter some text to render";

/// Severity of a status message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    /// Progress information
    Info,
    /// An action succeeded
    Success,
    /// An action failed
    Error,
}

/// The last status shown to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    /// Severity
    pub level: StatusLevel,
    /// Text
    pub text: String,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Shared single-flight flag
#[derive(Clone, Debug, Default)]
struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the busy flag on drop
#[derive(Debug)]
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A network action in flight
///
/// Holds the busy flag until the resolved outcome is applied or this value
/// is dropped.
pub struct PendingSubmission {
    kind: SubmissionKind,
    symbol: Option<char>,
    guard: BusyGuard,
    future: BoxFuture<'static, Result<SubmissionResult, ApiError>>,
}

impl PendingSubmission {
    /// What is in flight
    #[must_use]
    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    /// Wait for the request to complete, time out or fail
    pub async fn resolve(self) -> ResolvedSubmission {
        let outcome = self.future.await;
        ResolvedSubmission {
            kind: self.kind,
            symbol: self.symbol,
            outcome,
            _guard: self.guard,
        }
    }
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("kind", &self.kind)
            .field("symbol", &self.symbol)
            .finish_non_exhaustive()
    }
}

/// A finished network action waiting to be applied
#[derive(Debug)]
pub struct ResolvedSubmission {
    kind: SubmissionKind,
    symbol: Option<char>,
    outcome: Result<SubmissionResult, ApiError>,
    _guard: BusyGuard,
}

impl ResolvedSubmission {
    /// What completed
    #[must_use]
    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    /// The raw outcome
    #[must_use]
    pub fn outcome(&self) -> &Result<SubmissionResult, ApiError> {
        &self.outcome
    }
}

/// The application shell
#[derive(Debug)]
pub struct Studio {
    client: ApiClient,
    surface: StrokeSurface,
    session: LetterSession,
    display: RenderDisplay,
    text_input: String,
    status: Option<StatusMessage>,
    busy: BusyFlag,
}

impl Studio {
    /// Compose a shell from its parts
    #[must_use]
    pub fn new(
        client: ApiClient,
        surface: StrokeSurface,
        session: LetterSession,
        display: RenderDisplay,
    ) -> Self {
        Self {
            client,
            surface,
            session,
            display,
            text_input: String::new(),
            status: None,
            busy: BusyFlag::default(),
        }
    }

    /// Build a shell from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the HTTP client cannot be built.
    pub fn from_config(config: &StudioConfig, display: RenderDisplay) -> Result<Self, TransportError> {
        let client = ApiClient::new(config.api.clone())?;
        let surface = StrokeSurface::new(config.canvas.width, config.canvas.height);
        let session = LetterSession::new(config.symbols.clone());
        Ok(Self::new(client, surface, session, display))
    }

    // === State access ===

    /// The API client
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The stroke surface
    #[must_use]
    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    /// The letter session
    #[must_use]
    pub fn session(&self) -> &LetterSession {
        &self.session
    }

    /// The render display
    #[must_use]
    pub fn display(&self) -> &RenderDisplay {
        &self.display
    }

    /// Current text input
    #[must_use]
    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    /// Replace the text input
    pub fn set_text_input(&mut self, text: impl Into<String>) {
        self.text_input = text.into();
    }

    /// Edit the text input in place
    pub fn text_input_mut(&mut self) -> &mut String {
        &mut self.text_input
    }

    /// Last status message
    #[must_use]
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Whether an action is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    // === Drawing ===

    /// Start a stroke at a surface-local point
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if an action is in flight.
    pub fn begin_stroke(&mut self, point: Point) -> Result<(), StudioError> {
        self.ensure_idle()?;
        self.surface.begin(point);
        self.surface.extend(point);
        Ok(())
    }

    /// Extend the active stroke to a surface-local point
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if an action is in flight.
    pub fn extend_stroke(&mut self, point: Point) -> Result<(), StudioError> {
        self.ensure_idle()?;
        self.surface.extend(point);
        Ok(())
    }

    /// Finish the active stroke; touches no pixels, so always allowed
    pub fn end_stroke(&mut self) {
        self.surface.end();
    }

    /// Clear the drawing
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if an action is in flight.
    pub fn clear_drawing(&mut self) -> Result<(), StudioError> {
        self.ensure_idle()?;
        self.surface.clear();
        Ok(())
    }

    // === Actions ===

    /// Start generating a test dataset for the whole symbol sequence
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if another action is in flight.
    pub fn begin_generate_dataset(&mut self) -> Result<PendingSubmission, StudioError> {
        let request = SubmissionRequest::GenerateDataset {
            symbols: self.session.symbols().clone(),
        };
        self.begin(request, None, "Generating test dataset...")
    }

    /// Start saving the current drawing for the current symbol
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if another action is in flight,
    /// [`StudioError::Validation`] once every symbol is captured.
    pub fn begin_save_drawing(&mut self) -> Result<PendingSubmission, StudioError> {
        self.ensure_idle()?;
        let Some(symbol) = self.session.current_symbol() else {
            return Err(self.fail(StudioError::Validation(
                "All symbols have been captured".to_string(),
            )));
        };

        let request = SubmissionRequest::SaveLetter {
            symbol,
            image: self.surface.export_image(),
        };
        self.begin(request, Some(symbol), format!("Saving '{symbol}'..."))
    }

    /// Start rendering the text input
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if another action is in flight,
    /// [`StudioError::Validation`] for blank text (no request is made).
    pub fn begin_render_text(&mut self) -> Result<PendingSubmission, StudioError> {
        self.ensure_idle()?;
        if self.text_input.trim().is_empty() {
            return Err(self.fail(StudioError::Validation(BLANK_TEXT_MESSAGE.to_string())));
        }

        let request = SubmissionRequest::RenderText {
            text: self.text_input.clone(),
        };
        self.begin(request, None, "Rendering handwriting...")
    }

    /// Start a health check
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if another action is in flight.
    pub fn begin_health_check(&mut self) -> Result<PendingSubmission, StudioError> {
        self.begin(SubmissionRequest::HealthCheck, None, "Checking service health...")
    }

    /// Fold a finished action into the shell state
    ///
    /// The status message is always updated; the busy flag is released when
    /// this returns.
    ///
    /// # Errors
    ///
    /// The action's failure, already reflected in the status message.
    pub fn apply(&mut self, resolved: ResolvedSubmission) -> Result<(), StudioError> {
        let ResolvedSubmission {
            kind,
            symbol,
            outcome,
            _guard,
        } = resolved;

        let result = match outcome {
            Ok(result) if result.success => result,
            Ok(result) => {
                let message = result
                    .message
                    .unwrap_or_else(|| rejection_message(kind).to_string());
                return Err(self.fail(StudioError::Api(ApiError::Server {
                    status: result.status,
                    message,
                })));
            }
            Err(e) => return Err(self.fail(StudioError::Api(e))),
        };

        match kind {
            SubmissionKind::GenerateDataset => {
                let message = result
                    .message
                    .unwrap_or_else(|| "Test dataset generated".to_string());
                self.succeed(format!("{message}. Try rendering some text!"));
            }
            SubmissionKind::SaveLetter => self.acknowledge_save(symbol),
            SubmissionKind::RenderText => {
                self.display.present(result.payload.as_deref().unwrap_or_default());
                self.succeed("Handwriting rendered successfully");
            }
            SubmissionKind::HealthCheck => {
                self.succeed("Handwriting service is reachable");
            }
        }

        Ok(())
    }

    /// Copy the rendered output to the clipboard
    ///
    /// # Errors
    ///
    /// [`StudioError::Busy`] if another action is in flight,
    /// [`StudioError::Clipboard`] if nothing is rendered or access is denied.
    pub fn copy_rendered_output(&mut self) -> Result<(), StudioError> {
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(StudioError::Busy);
        };

        match self.display.copy_content() {
            Ok(chars) => {
                tracing::info!(chars, "Copied rendered output");
                self.succeed("Rendered text copied to clipboard");
                Ok(())
            }
            Err(e) => Err(self.fail(StudioError::Clipboard(e))),
        }
    }

    /// Generate a test dataset and apply the outcome
    ///
    /// # Errors
    ///
    /// See [`Studio::begin_generate_dataset`] and [`Studio::apply`].
    pub async fn generate_dataset(&mut self) -> Result<(), StudioError> {
        let pending = self.begin_generate_dataset()?;
        let resolved = pending.resolve().await;
        self.apply(resolved)
    }

    /// Save the current drawing and apply the outcome
    ///
    /// # Errors
    ///
    /// See [`Studio::begin_save_drawing`] and [`Studio::apply`].
    pub async fn save_drawing(&mut self) -> Result<(), StudioError> {
        let pending = self.begin_save_drawing()?;
        let resolved = pending.resolve().await;
        self.apply(resolved)
    }

    /// Render the text input and apply the outcome
    ///
    /// # Errors
    ///
    /// See [`Studio::begin_render_text`] and [`Studio::apply`].
    pub async fn render_text(&mut self) -> Result<(), StudioError> {
        let pending = self.begin_render_text()?;
        let resolved = pending.resolve().await;
        self.apply(resolved)
    }

    /// Check service health and apply the outcome
    ///
    /// # Errors
    ///
    /// See [`Studio::begin_health_check`] and [`Studio::apply`].
    pub async fn check_health(&mut self) -> Result<(), StudioError> {
        let pending = self.begin_health_check()?;
        let resolved = pending.resolve().await;
        self.apply(resolved)
    }

    // === Internals ===

    fn ensure_idle(&self) -> Result<(), StudioError> {
        if self.is_busy() {
            return Err(StudioError::Busy);
        }
        Ok(())
    }

    fn begin(
        &mut self,
        request: SubmissionRequest,
        symbol: Option<char>,
        progress: impl Into<String>,
    ) -> Result<PendingSubmission, StudioError> {
        let Some(guard) = self.busy.try_acquire() else {
            tracing::debug!(kind = %request.kind(), "Rejected action while busy");
            return Err(StudioError::Busy);
        };

        let kind = request.kind();
        tracing::info!(%kind, "Starting submission");
        self.status = Some(StatusMessage::new(StatusLevel::Info, progress));

        let client = self.client.clone();
        Ok(PendingSubmission {
            kind,
            symbol,
            guard,
            future: Box::pin(async move { client.send(request).await }),
        })
    }

    fn acknowledge_save(&mut self, symbol: Option<char>) {
        let Some(symbol) = symbol else {
            return;
        };
        if self.session.current_symbol() != Some(symbol) {
            tracing::warn!(%symbol, "Save acknowledged for a symbol that is no longer current");
            return;
        }

        let state = self.session.save_acknowledged();
        self.surface.clear();

        let message = match state {
            CaptureState::Capturing(_) => match self.session.current_symbol() {
                Some(next) => format!("Saved '{symbol}'. Now draw '{next}'"),
                None => format!("Saved '{symbol}'"),
            },
            CaptureState::Complete => format!(
                "Saved '{symbol}'. All {} symbols captured",
                self.session.symbols().len()
            ),
        };
        self.succeed(message);
    }

    fn succeed(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(status = %text, "Action succeeded");
        self.status = Some(StatusMessage::new(StatusLevel::Success, text));
    }

    fn fail(&mut self, error: StudioError) -> StudioError {
        tracing::warn!(kind = ?error.kind(), error = %error, "Action failed");
        self.status = Some(StatusMessage::new(StatusLevel::Error, error.to_string()));
        error
    }
}

fn rejection_message(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::SaveLetter => "Error saving letter",
        SubmissionKind::RenderText => "Error rendering handwriting",
        SubmissionKind::GenerateDataset => "Error generating test dataset",
        SubmissionKind::HealthCheck => "Handwriting service reported a problem",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpReply, HttpRequest, RawBody, Transport};
    use crate::config::ApiConfig;
    use crate::display::{ClipboardSink, SandboxedDisplay};
    use crate::error::{ClipboardError, ErrorKind};
    use crate::symbols::SymbolSequence;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Answers every request with the same JSON body and counts calls
    struct ScriptedTransport {
        status: u16,
        body: serde_json::Value,
        calls: AtomicUsize,
        last: Mutex<Option<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(status: u16, body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn execute(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request);
            Ok(HttpReply {
                status: self.status,
                reason: String::new(),
                body: Ok(self.body.clone()),
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingClipboard(Arc<Mutex<Vec<String>>>);

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn studio_with(transport: Arc<ScriptedTransport>, symbols: &str) -> (Studio, RecordingClipboard) {
        let clipboard = RecordingClipboard::default();
        let display = RenderDisplay::new(Box::new(SandboxedDisplay::new()), Box::new(clipboard.clone()));
        let client = ApiClient::with_transport(ApiConfig::new("http://studio.test"), transport);
        let session = LetterSession::new(SymbolSequence::parse(symbols).unwrap());
        let studio = Studio::new(client, StrokeSurface::new(40, 60), session, display);
        (studio, clipboard)
    }

    fn draw(studio: &mut Studio) {
        studio.begin_stroke(Point::new(5.0, 5.0)).unwrap();
        studio.extend_stroke(Point::new(30.0, 50.0)).unwrap();
        studio.end_stroke();
    }

    #[test]
    fn test_save_advances_and_clears() {
        let transport = ScriptedTransport::new(200, serde_json::json!({ "success": true }));
        let (mut studio, _) = studio_with(transport.clone(), "AB");
        draw(&mut studio);

        tokio_test::block_on(studio.save_drawing()).unwrap();

        assert_eq!(studio.session().state(), CaptureState::Capturing(1));
        assert!(studio.surface().is_blank());
        assert_eq!(studio.status().unwrap().text, "Saved 'A'. Now draw 'B'");
        assert!(!studio.is_busy());

        let last = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.body.unwrap()["letter"], "A");
    }

    #[test]
    fn test_failed_save_changes_nothing() {
        let transport = ScriptedTransport::new(500, serde_json::json!({ "error": "disk full" }));
        let (mut studio, _) = studio_with(transport, "AB");
        draw(&mut studio);

        let err = tokio_test::block_on(studio.save_drawing()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(studio.session().state(), CaptureState::Capturing(0));
        assert!(!studio.surface().is_blank());
        let status = studio.status().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert_eq!(status.text, "disk full");
        assert!(!studio.is_busy());
    }

    /// Fails every request the same way before any response arrives
    struct FailingTransport(TransportError);

    #[async_trait::async_trait]
    impl Transport for FailingTransport {
        fn name(&self) -> &str {
            "failing"
        }

        async fn execute(&self, _request: HttpRequest) -> Result<HttpReply, TransportError> {
            Err(self.0.clone())
        }
    }

    #[test]
    fn test_unreachable_save_changes_nothing() {
        for (failure, kind) in [
            (TransportError::Network("connection refused".into()), ErrorKind::Network),
            (TransportError::Timeout, ErrorKind::Timeout),
        ] {
            let display = RenderDisplay::new(
                Box::new(SandboxedDisplay::new()),
                Box::new(RecordingClipboard::default()),
            );
            let client = ApiClient::with_transport(
                ApiConfig::new("http://studio.test"),
                Arc::new(FailingTransport(failure)),
            );
            let session = LetterSession::new(SymbolSequence::parse("AB").unwrap());
            let mut studio = Studio::new(client, StrokeSurface::new(40, 60), session, display);
            draw(&mut studio);

            let err = tokio_test::block_on(studio.save_drawing()).unwrap_err();

            assert_eq!(err.kind(), kind);
            assert_eq!(studio.session().state(), CaptureState::Capturing(0));
            assert!(!studio.surface().is_blank());
            assert_eq!(studio.status().unwrap().level, StatusLevel::Error);
            assert!(!studio.is_busy());
        }
    }

    #[test]
    fn test_drawing_frozen_while_save_in_flight() {
        let transport = ScriptedTransport::new(200, serde_json::json!({ "success": true }));
        let (mut studio, _) = studio_with(transport, "AB");
        draw(&mut studio);
        let exported = studio.surface().export_image();

        let pending = studio.begin_save_drawing().unwrap();

        assert!(matches!(studio.clear_drawing(), Err(StudioError::Busy)));
        assert!(matches!(
            studio.begin_stroke(Point::new(35.0, 5.0)),
            Err(StudioError::Busy)
        ));
        assert!(matches!(
            studio.extend_stroke(Point::new(35.0, 55.0)),
            Err(StudioError::Busy)
        ));
        studio.end_stroke();
        assert_eq!(studio.surface().export_image(), exported);

        let resolved = tokio_test::block_on(pending.resolve());
        studio.apply(resolved).unwrap();

        assert_eq!(studio.session().state(), CaptureState::Capturing(1));
        assert!(studio.surface().is_blank());

        // Idle again: the next symbol can be drawn
        draw(&mut studio);
        assert!(!studio.surface().is_blank());
        studio.clear_drawing().unwrap();
        assert!(studio.surface().is_blank());
    }

    #[test]
    fn test_rejected_save_in_success_body() {
        let transport = ScriptedTransport::new(
            200,
            serde_json::json!({ "success": false, "error": "Missing letter or image data" }),
        );
        let (mut studio, _) = studio_with(transport, "AB");

        let err = tokio_test::block_on(studio.save_drawing()).unwrap_err();
        assert_eq!(err.to_string(), "Missing letter or image data");
        assert_eq!(studio.session().current_index(), Some(0));
    }

    #[test]
    fn test_save_after_complete_is_validation_error() {
        let transport = ScriptedTransport::new(200, serde_json::json!({ "success": true }));
        let (mut studio, _) = studio_with(transport.clone(), "A");

        tokio_test::block_on(studio.save_drawing()).unwrap();
        assert!(studio.session().is_complete());
        assert_eq!(studio.status().unwrap().text, "Saved 'A'. All 1 symbols captured");

        let err = tokio_test::block_on(studio.save_drawing()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_blank_render_never_hits_network() {
        let transport = ScriptedTransport::new(200, serde_json::json!({ "success": true }));
        let (mut studio, _) = studio_with(transport.clone(), "A");
        studio.set_text_input("   \n\t");

        let err = tokio_test::block_on(studio.render_text()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(studio.status().unwrap().text, BLANK_TEXT_MESSAGE);
        assert_eq!(transport.calls(), 0);
        assert!(!studio.is_busy());
    }

    #[test]
    fn test_render_then_copy() {
        let transport = ScriptedTransport::new(
            200,
            serde_json::json!({
                "success": true,
                "html_content": "<div class=\"lines\"><img src=\"/images/letters/set1/blue/79.png\"/><img src=\"/images/letters/set1/blue/107.png\"/></div>"
            }),
        );
        let (mut studio, clipboard) = studio_with(transport, "A");

        let err = studio.copy_rendered_output().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Clipboard);
        assert!(clipboard.0.lock().unwrap().is_empty());

        studio.set_text_input("Ok");
        tokio_test::block_on(studio.render_text()).unwrap();
        assert_eq!(studio.status().unwrap().text, "Handwriting rendered successfully");
        assert_eq!(studio.display().text().as_deref(), Some("Ok"));

        studio.copy_rendered_output().unwrap();
        assert_eq!(*clipboard.0.lock().unwrap(), vec!["Ok".to_string()]);
        assert!(!studio.is_busy());
    }

    #[test]
    fn test_dataset_message() {
        let transport = ScriptedTransport::new(
            200,
            serde_json::json!({ "success": true, "message": "Generated 3 characters" }),
        );
        let (mut studio, _) = studio_with(transport.clone(), "AB1");

        tokio_test::block_on(studio.generate_dataset()).unwrap();

        assert_eq!(
            studio.status().unwrap().text,
            "Generated 3 characters. Try rendering some text!"
        );
        let last = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.body, Some(serde_json::json!({ "letterlist": "AB1" })));
    }

    #[test]
    fn test_actions_are_single_flight() {
        let transport = ScriptedTransport::new(200, serde_json::json!({ "success": true }));
        let (mut studio, _) = studio_with(transport.clone(), "AB");
        studio.set_text_input("hello");

        let pending = studio.begin_health_check().unwrap();
        assert!(studio.is_busy());
        assert_eq!(studio.status().unwrap().level, StatusLevel::Info);

        assert!(matches!(studio.begin_save_drawing(), Err(StudioError::Busy)));
        assert!(matches!(studio.begin_render_text(), Err(StudioError::Busy)));
        assert!(matches!(studio.begin_generate_dataset(), Err(StudioError::Busy)));
        assert!(matches!(studio.copy_rendered_output(), Err(StudioError::Busy)));

        let resolved = tokio_test::block_on(pending.resolve());
        assert!(studio.is_busy());
        studio.apply(resolved).unwrap();
        assert!(!studio.is_busy());
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_dropped_pending_releases_busy() {
        let transport = ScriptedTransport::new(200, serde_json::json!({ "success": true }));
        let (mut studio, _) = studio_with(transport.clone(), "A");

        let pending = studio.begin_generate_dataset().unwrap();
        assert!(studio.is_busy());
        drop(pending);
        assert!(!studio.is_busy());
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_non_json_health_is_success() {
        struct PlainTransport;

        #[async_trait::async_trait]
        impl Transport for PlainTransport {
            fn name(&self) -> &str {
                "plain"
            }

            async fn execute(&self, _request: HttpRequest) -> Result<HttpReply, TransportError> {
                Ok(HttpReply {
                    status: 200,
                    reason: "OK".to_string(),
                    body: Err(RawBody {
                        content_type: Some("text/plain".to_string()),
                        text: "OK".to_string(),
                    }),
                })
            }
        }

        let display = RenderDisplay::new(
            Box::new(SandboxedDisplay::new()),
            Box::new(RecordingClipboard::default()),
        );
        let client = ApiClient::with_transport(ApiConfig::default(), Arc::new(PlainTransport));
        let mut studio = Studio::new(client, StrokeSurface::default(), LetterSession::default(), display);

        tokio_test::block_on(studio.check_health()).unwrap();
        assert_eq!(studio.status().unwrap().text, "Handwriting service is reachable");
    }
}
