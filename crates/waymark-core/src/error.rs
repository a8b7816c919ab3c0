//! Error types for Waymark core.

use std::fmt;

/// The main error type for Waymark core operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Document-tree error.
    Dom(DomError),
    /// Selector parsing error.
    Selector(SelectorError),
    /// Timer-related error.
    Timer(TimerError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dom(err) => write!(f, "Document error: {err}"),
            Self::Selector(err) => write!(f, "Selector error: {err}"),
            Self::Timer(err) => write!(f, "Timer error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            Self::Selector(err) => Some(err),
            Self::Timer(err) => Some(err),
        }
    }
}

/// Errors raised by document-tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomError {
    /// The element ID is invalid or belongs to another document.
    InvalidElementId,
    /// Attempted to insert an element into itself or one of its descendants.
    CircularParentage,
    /// The reference element is not a child of the given parent.
    NotAChild,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElementId => write!(f, "Invalid or foreign element ID"),
            Self::CircularParentage => {
                write!(f, "Cannot insert an element into itself or a descendant")
            }
            Self::NotAChild => write!(f, "Reference element is not a child of the parent"),
        }
    }
}

impl std::error::Error for DomError {}

/// A selector string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    /// The offending selector text.
    pub selector: String,
    /// What went wrong.
    pub message: String,
}

impl SelectorError {
    pub(crate) fn new(selector: &str, message: impl Into<String>) -> Self {
        Self {
            selector: selector.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid selector '{}': {}", self.selector, self.message)
    }
}

impl std::error::Error for SelectorError {}

/// Timer-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The timer ID is invalid or has already fired or been stopped.
    InvalidTimerId,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimerId => write!(f, "Invalid or expired timer ID"),
        }
    }
}

impl std::error::Error for TimerError {}

impl From<DomError> for CoreError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

impl From<SelectorError> for CoreError {
    fn from(err: SelectorError) -> Self {
        Self::Selector(err)
    }
}

impl From<TimerError> for CoreError {
    fn from(err: TimerError) -> Self {
        Self::Timer(err)
    }
}

/// Result type for document-tree operations.
pub type DomResult<T> = std::result::Result<T, DomError>;

/// A specialized Result type for Waymark core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
