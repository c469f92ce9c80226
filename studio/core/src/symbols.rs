//! Symbol Sequence
//!
//! The fixed, ordered set of characters the user draws one sample for.
//! A sequence is immutable once built; the letter session walks it from
//! front to back.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Uppercase letters, lowercase letters, then digits
pub const DEFAULT_SYMBOLS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Reasons a string cannot become a symbol sequence
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// No symbols at all
    #[error("symbol sequence is empty")]
    Empty,

    /// Whitespace cannot be drawn as a sample
    #[error("symbol sequence contains whitespace at position {position}")]
    Whitespace {
        /// Character position of the offending symbol
        position: usize,
    },

    /// Each symbol is captured exactly once
    #[error("symbol '{symbol}' appears more than once")]
    Duplicate {
        /// The repeated symbol
        symbol: char,
    },
}

/// Ordered, duplicate-free list of symbols
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolSequence {
    symbols: Vec<char>,
}

impl SymbolSequence {
    /// Build a sequence from a string, one symbol per character
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] for empty input, whitespace or duplicates.
    pub fn parse(input: &str) -> Result<Self, SequenceError> {
        let mut symbols: Vec<char> = Vec::with_capacity(input.len());
        for (position, symbol) in input.chars().enumerate() {
            if symbol.is_whitespace() {
                return Err(SequenceError::Whitespace { position });
            }
            if symbols.contains(&symbol) {
                return Err(SequenceError::Duplicate { symbol });
            }
            symbols.push(symbol);
        }

        if symbols.is_empty() {
            return Err(SequenceError::Empty);
        }

        Ok(Self { symbols })
    }

    /// Number of symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a parsed sequence
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    /// All symbols in capture order
    #[must_use]
    pub fn as_slice(&self) -> &[char] {
        &self.symbols
    }

    /// The sequence as the `letterlist` string the service expects
    #[must_use]
    pub fn to_letter_list(&self) -> String {
        self.symbols.iter().collect()
    }
}

impl Default for SymbolSequence {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.chars().collect(),
        }
    }
}

impl FromStr for SymbolSequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SymbolSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_letter_list())
    }
}
