//! Process management error types.
//!
//! Every table operation validates its arguments before touching any
//! entry, so an error always leaves the table exactly as it was.

use core::fmt;

use crate::process::{Pid, ProcessState, StateMask};

/// Process management error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcError {
    /// All process slots are occupied.
    NoFreeSlot,
    /// The pid is outside `[0, MAX_PROCS)`.
    InvalidPid(Pid),
    /// The requested transition is not legal from the current state.
    InvalidState {
        pid: Pid,
        current: ProcessState,
        expected: StateMask,
    },
    /// A process tried to sleep without naming an event.
    InvalidEvent(Pid),
    /// The slot is the active execution context and cannot be released.
    Busy(Pid),
    /// The global scheduler has not been initialized.
    NotInitialized,
    /// The global scheduler was already initialized.
    AlreadyInitialized,
    /// The operation acts on the current process, but none has run yet.
    NoCurrentProcess,
}

impl ProcError {
    /// Negative code used where a raw pid is returned to assembly callers.
    pub const fn code(self) -> i8 {
        match self {
            ProcError::NoFreeSlot => -1,
            ProcError::InvalidPid(_) => -2,
            ProcError::InvalidState { .. } => -3,
            ProcError::InvalidEvent(_) => -4,
            ProcError::Busy(_) => -5,
            ProcError::NotInitialized => -6,
            ProcError::AlreadyInitialized => -7,
            ProcError::NoCurrentProcess => -8,
        }
    }
}

impl fmt::Display for ProcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcError::NoFreeSlot => write!(f, "no free process slot"),
            ProcError::InvalidPid(pid) => write!(f, "invalid pid {}", pid),
            ProcError::InvalidState {
                pid,
                current,
                expected,
            } => write!(
                f,
                "invalid state for pid {}: current={}, expected={:?}",
                pid,
                current.name(),
                expected
            ),
            ProcError::InvalidEvent(pid) => write!(f, "pid {} must sleep on a non-zero event", pid),
            ProcError::Busy(pid) => write!(f, "pid {} is the running context", pid),
            ProcError::NotInitialized => write!(f, "scheduler not initialized"),
            ProcError::AlreadyInitialized => write!(f, "scheduler already initialized"),
            ProcError::NoCurrentProcess => write!(f, "no process is running"),
        }
    }
}

/// Result type for process management operations.
pub type Result<T> = core::result::Result<T, ProcError>;

/// Flatten a creation result into the raw `pid_t` convention:
/// the pid on success, a negative error code otherwise.
pub fn raw_pid(result: Result<Pid>) -> i8 {
    match result {
        Ok(pid) => pid.as_raw(),
        Err(err) => err.code(),
    }
}
