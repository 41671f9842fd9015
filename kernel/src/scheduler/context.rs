//! Saved execution contexts.
//!
//! The register-level switch itself belongs to the platform. This module
//! provides the handle through which the platform reaches a process's
//! saved stack pointer and stack memory, and nothing else of the table.

use core::ptr::NonNull;

use crate::process::Pid;

/// Handle to the saved context of one process slot.
///
/// The handle points into the process table, which lives inside the
/// global scheduler for the whole run of the kernel. The platform reads
/// the saved stack pointer to resume a process and writes it when
/// suspending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHandle {
    pid: Pid,
    /// Saved stack pointer field of the slot's entry.
    stack_pointer: NonNull<u16>,
    /// Lowest address of the slot's stack region.
    stack_base: NonNull<u8>,
}

impl ContextHandle {
    pub(crate) fn new(pid: Pid, stack_pointer: NonNull<u16>, stack_base: NonNull<u8>) -> Self {
        ContextHandle {
            pid,
            stack_pointer,
            stack_base,
        }
    }

    /// Process this context belongs to.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Location of the saved stack pointer (an offset from `stack_base`).
    pub fn stack_pointer_slot(&self) -> *mut u16 {
        self.stack_pointer.as_ptr()
    }

    /// Lowest address of the stack region.
    pub fn stack_base(&self) -> *mut u8 {
        self.stack_base.as_ptr()
    }

    /// Read the saved stack pointer.
    ///
    /// # Safety
    ///
    /// The slot must not have been reclaimed since the handle was taken.
    pub unsafe fn saved_stack_pointer(&self) -> u16 {
        // SAFETY: the caller guarantees the entry is still live.
        unsafe { self.stack_pointer.as_ptr().read() }
    }

    /// Store a new saved stack pointer.
    ///
    /// # Safety
    ///
    /// The slot must not have been reclaimed since the handle was taken,
    /// and `sp` must lie within the slot's stack region.
    pub unsafe fn set_saved_stack_pointer(&self, sp: u16) {
        // SAFETY: the caller guarantees the entry is still live.
        unsafe { self.stack_pointer.as_ptr().write(sp) }
    }

    /// Absolute address the saved stack pointer refers to.
    ///
    /// # Safety
    ///
    /// Same requirements as [`ContextHandle::saved_stack_pointer`].
    pub unsafe fn stack_address(&self) -> *mut u8 {
        // SAFETY: the saved offset never exceeds the stack size.
        unsafe {
            self.stack_base
                .as_ptr()
                .add(self.saved_stack_pointer() as usize)
        }
    }
}
