//! Per-process stack memory.
//!
//! Each slot owns exactly `STACK_SIZE` bytes. A fresh stack is laid out
//! the way the context switch code expects to find a suspended process:
//!
//! ```text
//! [STACK_SIZE - 1]            entry address, low byte
//! [STACK_SIZE - 2]            entry address, high byte
//! [STACK_SIZE - 3 ..]         SAVED_CONTEXT_LEN zeroed register slots
//! [INITIAL_STACK_POINTER]     first free byte (saved stack pointer)
//! [0 .. INITIAL_STACK_POINTER] zeroed
//! ```
//!
//! Restoring this frame pops the zeroed registers and returns into the
//! entry point.

use crate::config::{RETURN_ADDRESS_LEN, SAVED_CONTEXT_LEN, STACK_SIZE};

/// Process entry point. A process never returns; it exits through the
/// scheduler instead.
pub type EntryPoint = fn() -> !;

/// Saved stack pointer of a freshly seeded stack, relative to the stack base.
pub const INITIAL_STACK_POINTER: u16 =
    (STACK_SIZE - 1 - RETURN_ADDRESS_LEN - SAVED_CONTEXT_LEN) as u16;

/// Stack region of one process slot.
#[derive(Clone, PartialEq, Eq)]
#[repr(C)]
pub struct ProcessStack {
    bytes: [u8; STACK_SIZE],
}

impl ProcessStack {
    /// Create a zeroed stack.
    pub const fn new() -> Self {
        ProcessStack {
            bytes: [0; STACK_SIZE],
        }
    }

    /// Reinitialize the stack so the first resumption enters `entry`.
    ///
    /// Returns the initial saved stack pointer.
    pub fn seed(&mut self, entry: EntryPoint) -> u16 {
        self.bytes = [0; STACK_SIZE];

        let [lo, hi] = code_address(entry).to_le_bytes();
        self.bytes[STACK_SIZE - 1] = lo;
        self.bytes[STACK_SIZE - 2] = hi;

        INITIAL_STACK_POINTER
    }

    pub fn as_bytes(&self) -> &[u8; STACK_SIZE] {
        &self.bytes
    }
}

/// Return address pushed for `entry`.
#[cfg(target_pointer_width = "16")]
fn code_address(entry: EntryPoint) -> u16 {
    entry as usize as u16
}

/// Return address pushed for `entry`.
///
/// Only 16-bit targets can resume a seeded frame. Wider builds (host
/// tests) keep the low 16 bits so the layout stays checkable.
#[cfg(not(target_pointer_width = "16"))]
fn code_address(entry: EntryPoint) -> u16 {
    (entry as usize & usize::from(u16::MAX)) as u16
}

impl Default for ProcessStack {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ProcessStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProcessStack")
            .field("size", &STACK_SIZE)
            .finish()
    }
}
