//! Screen stack error types

use thiserror::Error;

use crate::manager::ScreenId;

/// Screen-related errors
#[derive(Error, Debug)]
pub enum ScreenError {
    /// The screen is not on this manager's stack
    #[error("screen {0:?} is not owned by this manager")]
    NotOwned(ScreenId),

    /// Reading or writing saved state failed
    #[error("screen state I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Saved state could not be encoded or decoded
    #[error("screen state format error: {0}")]
    Format(#[from] serde_json::Error),

    /// Saved state names a screen type with no registered factory
    #[error("unknown screen type: {0}")]
    UnknownScreenType(String),

    /// A control tree operation failed while building a screen
    #[error("control error: {0}")]
    Control(#[from] cdx_layout::ControlError),
}

/// Result type for screen operations
pub type Result<T> = std::result::Result<T, ScreenError>;
