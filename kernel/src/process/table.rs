//! Process Table
//!
//! Maintains the fixed table of process slots. Each slot pairs a 4-byte
//! entry (saved stack pointer, state, awaited event) with its own stack.
//! The entry layout is read by raw byte offset from the context switch
//! code, so it is pinned with compile-time assertions.

use core::mem::{offset_of, size_of};
use core::ptr::NonNull;

use super::event::Event;
use super::stack::{EntryPoint, ProcessStack};
use super::state::{Pid, ProcessState, StateMask};
use crate::config::{MAX_PROCS, PROC_LIST_ENTRY, PSTRUCT_EVENT_OFF, PSTRUCT_STATE_OFF};
use crate::error::{ProcError, Result};
use crate::scheduler::ContextHandle;

/// One process list entry, as seen by the context switch code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ProcEntry {
    /// Saved stack pointer, relative to the slot's stack base.
    stack_pointer: u16,
    /// Process state.
    state: ProcessState,
    /// Awaited event, `Event::NONE` when not sleeping.
    event: Event,
}

const _: () = assert!(size_of::<ProcEntry>() == PROC_LIST_ENTRY);
const _: () = assert!(offset_of!(ProcEntry, state) == PSTRUCT_STATE_OFF);
const _: () = assert!(offset_of!(ProcEntry, event) == PSTRUCT_EVENT_OFF);

impl ProcEntry {
    const UNUSED: ProcEntry = ProcEntry {
        stack_pointer: 0,
        state: ProcessState::Unused,
        event: Event::NONE,
    };

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn event(&self) -> Event {
        self.event
    }

    /// Saved stack pointer; meaningless while the slot is unused.
    pub fn stack_pointer(&self) -> Option<u16> {
        match self.state {
            ProcessState::Unused => None,
            _ => Some(self.stack_pointer),
        }
    }

    /// Raw byte image of this entry in target byte order.
    pub fn to_bytes(&self) -> [u8; PROC_LIST_ENTRY] {
        let sp = self.stack_pointer.to_ne_bytes();
        let mut bytes = [0u8; PROC_LIST_ENTRY];
        bytes[0] = sp[0];
        bytes[1] = sp[1];
        bytes[PSTRUCT_STATE_OFF] = self.state.raw();
        bytes[PSTRUCT_EVENT_OFF] = self.event.as_raw();
        bytes
    }
}

/// The process table.
pub struct ProcessTable {
    /// Process list entries, contiguous for the context switch code.
    entries: [ProcEntry; MAX_PROCS],
    /// Stack region owned by each slot.
    stacks: [ProcessStack; MAX_PROCS],
    /// Entry point each slot was seeded with.
    entry_points: [Option<EntryPoint>; MAX_PROCS],
}

impl ProcessTable {
    /// Create a table with every slot unused.
    pub const fn new() -> Self {
        const EMPTY_STACK: ProcessStack = ProcessStack::new();

        ProcessTable {
            entries: [ProcEntry::UNUSED; MAX_PROCS],
            stacks: [EMPTY_STACK; MAX_PROCS],
            entry_points: [None; MAX_PROCS],
        }
    }

    /// Validate a pid and return its slot index.
    fn slot(&self, pid: Pid) -> Result<usize> {
        pid.index().ok_or(ProcError::InvalidPid(pid))
    }

    /// Validate a pid and require its slot to be in one of `expected`.
    fn slot_in(&self, pid: Pid, expected: StateMask) -> Result<usize> {
        let index = self.slot(pid)?;
        let current = self.entries[index].state;
        if expected.has(current) {
            Ok(index)
        } else {
            Err(ProcError::InvalidState {
                pid,
                current,
                expected,
            })
        }
    }

    /// Reserve the first unused slot and seed it to start at `entry`.
    pub fn allocate(&mut self, entry: EntryPoint) -> Result<Pid> {
        let index = self
            .entries
            .iter()
            .position(|e| e.state == ProcessState::Unused)
            .ok_or(ProcError::NoFreeSlot)?;

        let stack_pointer = self.stacks[index].seed(entry);
        self.entries[index] = ProcEntry {
            stack_pointer,
            state: ProcessState::New,
            event: Event::NONE,
        };
        self.entry_points[index] = Some(entry);

        let pid = Pid::from_index(index);
        log::debug!("[PROC] allocated pid {}", pid);
        Ok(pid)
    }

    /// Admit a new process to scheduling (`NEW → RUN`).
    pub fn admit(&mut self, pid: Pid) -> Result<()> {
        self.admit_from(pid, StateMask::NEW)
    }

    /// Move a process to `RUN` from any of the `admittable` states.
    pub fn admit_from(&mut self, pid: Pid, admittable: StateMask) -> Result<()> {
        let index = self.slot_in(pid, admittable)?;
        self.entries[index].state = ProcessState::Run;
        self.entries[index].event = Event::NONE;
        log::debug!("[PROC] pid {} admitted", pid);
        Ok(())
    }

    /// Terminate a live process (`NEW | RUN | SLEEP → STOP`).
    pub fn terminate(&mut self, pid: Pid) -> Result<()> {
        let index = self.slot_in(pid, StateMask::LIVE)?;
        self.entries[index].state = ProcessState::Stop;
        self.entries[index].event = Event::NONE;
        log::debug!("[PROC] pid {} stopped", pid);
        Ok(())
    }

    /// Mark a running process that ended itself (`RUN → ZOMBIE`).
    pub fn exit(&mut self, pid: Pid) -> Result<()> {
        let index = self.slot_in(pid, StateMask::RUN)?;
        self.entries[index].state = ProcessState::Zombie;
        log::debug!("[PROC] pid {} exited", pid);
        Ok(())
    }

    /// Suspend a running process until `event` is posted (`RUN → SLEEP`).
    ///
    /// Only the process itself may call this for its own pid.
    pub fn sleep(&mut self, pid: Pid, event: Event) -> Result<()> {
        let index = self.slot_in(pid, StateMask::RUN)?;
        if event.is_none() {
            return Err(ProcError::InvalidEvent(pid));
        }
        self.entries[index].state = ProcessState::Sleep;
        self.entries[index].event = event;
        log::trace!("[PROC] pid {} sleeping on {}", pid, event);
        Ok(())
    }

    /// Make every process sleeping on `event` runnable again.
    ///
    /// All matching sleepers are woken, not just the first one.
    /// Returns the number of processes woken.
    pub fn wake(&mut self, event: Event) -> usize {
        if event.is_none() {
            return 0;
        }

        let mut woken = 0;
        for entry in self.entries.iter_mut() {
            if entry.state == ProcessState::Sleep && entry.event == event {
                entry.state = ProcessState::Run;
                entry.event = Event::NONE;
                woken += 1;
            }
        }

        if woken > 0 {
            log::trace!("[PROC] {} woke {} process(es)", event, woken);
        }
        woken
    }

    /// Release a terminated slot for reuse (`STOP | ZOMBIE → UNUSED`).
    ///
    /// The caller guarantees the slot is not the active context.
    pub fn reclaim(&mut self, pid: Pid) -> Result<()> {
        let index = self.slot_in(pid, StateMask::TERMINATED)?;
        self.entries[index] = ProcEntry::UNUSED;
        self.entry_points[index] = None;
        log::debug!("[PROC] pid {} reclaimed", pid);
        Ok(())
    }

    /// Get the state of a slot.
    pub fn state(&self, pid: Pid) -> Result<ProcessState> {
        Ok(self.entries[self.slot(pid)?].state)
    }

    /// Get the event a slot is waiting on.
    pub fn event(&self, pid: Pid) -> Result<Event> {
        Ok(self.entries[self.slot(pid)?].event)
    }

    /// Get a slot's entry.
    pub fn entry(&self, pid: Pid) -> Result<&ProcEntry> {
        Ok(&self.entries[self.slot(pid)?])
    }

    /// Get a slot's stack region.
    pub fn stack(&self, pid: Pid) -> Result<&ProcessStack> {
        Ok(&self.stacks[self.slot(pid)?])
    }

    /// Get the entry point a slot was seeded with.
    pub fn entry_point(&self, pid: Pid) -> Result<Option<EntryPoint>> {
        Ok(self.entry_points[self.slot(pid)?])
    }

    /// Raw 4-byte image of a slot's entry.
    pub fn entry_bytes(&self, pid: Pid) -> Result<[u8; PROC_LIST_ENTRY]> {
        Ok(self.entries[self.slot(pid)?].to_bytes())
    }

    /// Base address of the contiguous entry array, for assembly code that
    /// indexes entries by `PROC_LIST_ENTRY` and reads fields by offset.
    pub fn entries_ptr(&self) -> *const u8 {
        self.entries.as_ptr().cast()
    }

    pub(crate) fn is_runnable(&self, index: usize) -> bool {
        self.entries[index].state == ProcessState::Run
    }

    /// Number of slots whose state is in `mask`.
    pub fn count(&self, mask: StateMask) -> usize {
        self.entries.iter().filter(|e| mask.has(e.state)).count()
    }

    /// Number of unused slots.
    pub fn free_slots(&self) -> usize {
        self.count(StateMask::UNUSED)
    }

    /// Iterate over all slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Pid, &ProcEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (Pid::from_index(i), e))
    }

    /// Hand out the saved-context handle of an occupied slot.
    ///
    /// This is the only path by which the context switch primitive reaches
    /// the stack pointer and stack memory.
    pub(crate) fn context_handle(&mut self, pid: Pid) -> Result<ContextHandle> {
        let index = self.slot_in(pid, !StateMask::UNUSED)?;
        let stack_pointer = NonNull::from(&mut self.entries[index].stack_pointer);
        let stack_base = NonNull::from(&mut self.stacks[index]).cast::<u8>();
        Ok(ContextHandle::new(pid, stack_pointer, stack_base))
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}
