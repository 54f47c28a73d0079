//! Control tree error types

use thiserror::Error;

use crate::tree::ControlId;

/// Errors from control tree operations
///
/// Every variant except `MissingResource` indicates a programming error in
/// the caller; none of them are worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The control id is not (or no longer) part of this tree
    #[error("unknown control {0:?}")]
    UnknownControl(ControlId),

    /// The child already has a parent; detach it first
    #[error("control {child:?} already has parent {parent:?}")]
    AlreadyParented { child: ControlId, parent: ControlId },

    /// Adding the child would make a control its own ancestor
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    WouldCycle { child: ControlId, parent: ControlId },

    /// The control is not a child of the given parent
    #[error("control {child:?} is not a child of {parent:?}")]
    NotAChild { child: ControlId, parent: ControlId },

    /// Child index past the end of the child list
    #[error("child index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// A texture or font the control needs to draw was never supplied
    #[error("control {control:?} is missing its {resource}")]
    MissingResource {
        control: ControlId,
        resource: &'static str,
    },

    /// The operation does not apply to this kind of control
    #[error("control {control:?} is not a {expected}")]
    WrongKind {
        control: ControlId,
        expected: &'static str,
    },
}

/// Result type for control tree operations
pub type Result<T> = std::result::Result<T, ControlError>;
