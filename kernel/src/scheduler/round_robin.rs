//! Round-robin scheduler policy.
//!
//! Every runnable slot gets its turn in strict slot-index order, starting
//! just after the process that ran last. Identical table state always
//! yields the identical decision.

use crate::config::{MAX_PROCS, NEXT_PROC_SAME, NEXT_PROC_UNAVAIL};
use crate::process::{Pid, ProcessTable};

/// Outcome of one scheduling decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Transfer control to another process.
    Switch(Pid),
    /// The current process keeps running; no switch needed.
    Continue,
    /// Nothing is runnable; take the idle path.
    Idle,
}

impl Decision {
    /// Encode as the raw byte returned to assembly callers.
    pub const fn to_raw(self) -> u8 {
        match self {
            Decision::Switch(pid) => pid.as_raw() as u8,
            Decision::Continue => NEXT_PROC_SAME,
            Decision::Idle => NEXT_PROC_UNAVAIL,
        }
    }

    /// Decode a raw scheduling outcome.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            NEXT_PROC_SAME => Some(Decision::Continue),
            NEXT_PROC_UNAVAIL => Some(Decision::Idle),
            _ if (raw as usize) < MAX_PROCS => Some(Decision::Switch(Pid(raw as i8))),
            _ => None,
        }
    }
}

/// Pick the next process to run after `current`.
///
/// The scan starts at the slot after `current` and wraps around; with no
/// current process it starts at slot 0. Reaching `current` again while it
/// is still runnable means it simply continues.
pub fn select_next(table: &ProcessTable, current: Option<Pid>) -> Decision {
    let current = current.and_then(Pid::index);
    let start = current.map_or(0, |index| index + 1);

    for offset in 0..MAX_PROCS {
        let index = (start + offset) % MAX_PROCS;
        if !table.is_runnable(index) {
            continue;
        }
        return if Some(index) == current {
            Decision::Continue
        } else {
            Decision::Switch(Pid::from_index(index))
        };
    }

    Decision::Idle
}
