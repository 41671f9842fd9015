//! Event codes a process can wait on.

use core::fmt;

use crate::config::EV_UART_INPUT;

/// An opaque event tag; matching is exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Event(pub u8);

impl Event {
    /// No event of interest.
    pub const NONE: Event = Event(0);

    /// UART input became available.
    pub const UART_INPUT: Event = Event(EV_UART_INPUT);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw event code.
    pub const fn as_raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Event::NONE => write!(f, "none"),
            Event::UART_INPUT => write!(f, "uart-input"),
            Event(code) => write!(f, "event#{}", code),
        }
    }
}
