//! Kernel configuration constants.
//!
//! This module contains compile-time configuration for the kernel.
//! The layout constants form a contract with the assembly-level context
//! switch code and must not change independently of it.

/// Maximum number of processes.
pub const MAX_PROCS: usize = 5;

/// Number of bytes used per process in the process list.
pub const PROC_LIST_ENTRY: usize = 4;

/// Stack size per process in bytes.
pub const STACK_SIZE: usize = 128;

/// Byte offset of the state field inside a process list entry.
pub const PSTRUCT_STATE_OFF: usize = 2;

/// Byte offset of the event field inside a process list entry.
pub const PSTRUCT_EVENT_OFF: usize = 3;

/// Raw scheduling outcome: no process is runnable.
pub const NEXT_PROC_UNAVAIL: u8 = 0xff;

/// Raw scheduling outcome: the current process keeps running.
pub const NEXT_PROC_SAME: u8 = 0xfe;

/// Event posted by the UART driver when input is available.
pub const EV_UART_INPUT: u8 = 1;

/// Size of the return address pushed on a fresh stack.
pub const RETURN_ADDRESS_LEN: usize = 2;

/// Register save area of a context frame (32 general registers + SREG).
pub const SAVED_CONTEXT_LEN: usize = 33;

const _: () = assert!(MAX_PROCS > 0 && MAX_PROCS <= i8::MAX as usize);
const _: () = assert!((MAX_PROCS as u8) < NEXT_PROC_SAME);
const _: () = assert!(STACK_SIZE > RETURN_ADDRESS_LEN + SAVED_CONTEXT_LEN);
const _: () = assert!(STACK_SIZE <= u16::MAX as usize);

/// Runtime scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Allow `admit` to move a stopped process back to `RUN`.
    pub resume_stopped: bool,
    /// Reclaim zombie slots automatically once they are switched away from.
    pub reap_zombies: bool,
}

impl KernelConfig {
    /// Default policy: stopped processes stay stopped, zombies are reaped.
    pub const fn new() -> Self {
        KernelConfig {
            resume_stopped: false,
            reap_zombies: true,
        }
    }

    pub const fn with_resume_stopped(mut self, enabled: bool) -> Self {
        self.resume_stopped = enabled;
        self
    }

    pub const fn with_reap_zombies(mut self, enabled: bool) -> Self {
        self.reap_zombies = enabled;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}
