//! Process Management
//!
//! This module provides the fixed process table: slot allocation, state
//! transitions and event tagging for every process in the system.

pub mod event;
pub mod stack;
pub mod state;
pub mod table;

pub use event::Event;
pub use stack::{EntryPoint, ProcessStack, INITIAL_STACK_POINTER};
pub use state::{Pid, ProcessState, StateMask};
pub use table::{ProcEntry, ProcessTable};
