//! Letter Session
//!
//! Tracks which symbol of the sequence is being captured. The session
//! only moves forward when the service acknowledges a save; a failed save
//! leaves it where it was so the user can redraw and retry.
//!
//! ```text
//! Capturing(0) ──ack──▶ Capturing(1) ──ack──▶ … ──ack──▶ Complete
//! ```
//!
//! `Complete` is terminal. Starting over means building a new session.

use crate::symbols::SymbolSequence;

/// Session state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// Waiting for a drawing of the symbol at this index
    Capturing(usize),
    /// Every symbol has been saved
    Complete,
}

/// How far through the sequence the session is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Symbols saved so far
    pub captured: usize,
    /// Symbols in the sequence
    pub total: usize,
}

/// Letter session controller
#[derive(Clone, Debug)]
pub struct LetterSession {
    symbols: SymbolSequence,
    state: CaptureState,
}

impl LetterSession {
    /// Start a session at the first symbol
    #[must_use]
    pub fn new(symbols: SymbolSequence) -> Self {
        // A parsed sequence is never empty, but keep the state consistent
        // with the index invariant if one ever is.
        let state = if symbols.is_empty() {
            CaptureState::Complete
        } else {
            CaptureState::Capturing(0)
        };
        Self { symbols, state }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// The sequence being captured
    #[must_use]
    pub fn symbols(&self) -> &SymbolSequence {
        &self.symbols
    }

    /// Index of the symbol being captured, `None` once complete
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            CaptureState::Capturing(index) => Some(index),
            CaptureState::Complete => None,
        }
    }

    /// Symbol being captured, `None` once complete
    #[must_use]
    pub fn current_symbol(&self) -> Option<char> {
        self.current_index().and_then(|index| self.symbols.get(index))
    }

    /// Whether every symbol has been saved
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == CaptureState::Complete
    }

    /// Saved / total
    #[must_use]
    pub fn progress(&self) -> Progress {
        let total = self.symbols.len();
        let captured = match self.state {
            CaptureState::Capturing(index) => index,
            CaptureState::Complete => total,
        };
        Progress { captured, total }
    }

    /// Advance after the service acknowledged a save of the current symbol
    ///
    /// No-op once complete.
    pub fn save_acknowledged(&mut self) -> CaptureState {
        self.state = match self.state {
            CaptureState::Capturing(index) if index + 1 < self.symbols.len() => {
                CaptureState::Capturing(index + 1)
            }
            CaptureState::Capturing(_) => {
                tracing::info!(total = self.symbols.len(), "All symbols captured");
                CaptureState::Complete
            }
            CaptureState::Complete => CaptureState::Complete,
        };
        self.state
    }
}

impl Default for LetterSession {
    fn default() -> Self {
        Self::new(SymbolSequence::default())
    }
}
