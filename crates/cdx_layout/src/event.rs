//! Events reported by controls

use crate::tree::ControlId;

/// Something a control wants its host screen to react to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    /// A button took a tap and is showing its clicked texture
    Tapped(ControlId),
    /// A button finished its click feedback; act on the click now
    Clicked(ControlId),
}

impl ControlEvent {
    pub fn control(&self) -> ControlId {
        match *self {
            ControlEvent::Tapped(id) | ControlEvent::Clicked(id) => id,
        }
    }
}
