//! Process identifiers and states.

use core::fmt;

use bitflags::bitflags;

use crate::config::MAX_PROCS;

/// Process ID type.
///
/// Valid pids index the process table, `[0, MAX_PROCS)`. Negative values
/// never name a process; they are reserved for error codes at the raw
/// ABI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(pub i8);

impl Pid {
    /// Slot index of this pid, or `None` when out of range.
    pub const fn index(self) -> Option<usize> {
        if self.0 >= 0 && (self.0 as usize) < MAX_PROCS {
            Some(self.0 as usize)
        } else {
            None
        }
    }

    /// Get the raw pid value.
    pub const fn as_raw(self) -> i8 {
        self.0
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        Pid(index as i8)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process state.
///
/// The discriminants are the raw codes read by the context switch code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProcessState {
    /// Slot is free.
    Unused = 0,
    /// Process is eligible to run.
    Run = 1,
    /// Process is waiting for an event.
    Sleep = 2,
    /// Process has exited and waits to be reaped.
    Zombie = 3,
    /// Process has been created but not admitted yet.
    New = 4,
    /// Process has been terminated.
    Stop = 5,
    /// No process is runnable; the idle path is executing.
    Idle = 7,
}

impl ProcessState {
    /// Get the raw state code.
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Decode a raw state code.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ProcessState::Unused),
            1 => Some(ProcessState::Run),
            2 => Some(ProcessState::Sleep),
            3 => Some(ProcessState::Zombie),
            4 => Some(ProcessState::New),
            5 => Some(ProcessState::Stop),
            7 => Some(ProcessState::Idle),
            _ => None,
        }
    }

    /// The single-state mask for this state.
    pub const fn mask(self) -> StateMask {
        StateMask::from_bits_retain(1 << self.raw())
    }

    pub const fn name(self) -> &'static str {
        match self {
            ProcessState::Unused => "UNUSED",
            ProcessState::Run => "RUN",
            ProcessState::Sleep => "SLEEP",
            ProcessState::Zombie => "ZOMBIE",
            ProcessState::New => "NEW",
            ProcessState::Stop => "STOP",
            ProcessState::Idle => "IDLE",
        }
    }
}

bitflags! {
    /// A set of process states, one bit per raw state code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StateMask: u8 {
        const UNUSED = 1 << 0;
        const RUN = 1 << 1;
        const SLEEP = 1 << 2;
        const ZOMBIE = 1 << 3;
        const NEW = 1 << 4;
        const STOP = 1 << 5;
        const IDLE = 1 << 7;

        /// States that own a live execution context.
        const LIVE = Self::NEW.bits() | Self::RUN.bits() | Self::SLEEP.bits();
        /// States awaiting reclamation.
        const TERMINATED = Self::STOP.bits() | Self::ZOMBIE.bits();
    }
}

impl StateMask {
    pub const fn has(self, state: ProcessState) -> bool {
        self.bits() & state.mask().bits() != 0
    }
}
