//! Cooperative Kernel Library
//!
//! A minimal cooperative multitasking core for small 8/16-bit targets:
//! a fixed table of at most `MAX_PROCS` processes, each with its own
//! `STACK_SIZE`-byte stack, and a round-robin scheduler that resumes
//! processes when the events they sleep on are posted.
//!
//! # Boot sequence
//!
//! ```ignore
//! static BOARD: Board = Board::new();
//!
//! coop_kernel::logger::init(log::LevelFilter::Info).ok();
//! coop_kernel::scheduler::init(&BOARD, KernelConfig::new())?;
//! coop_kernel::scheduler::start_process(shell_main)?;
//! coop_kernel::scheduler::schedule()?;
//! ```
//!
//! The UART receive interrupt calls
//! `scheduler::notify(Event::UART_INPUT)`; a process waiting for input
//! calls `scheduler::sleep_on(Event::UART_INPUT)`.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod config;
pub mod error;
pub mod logger;
pub mod process;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use arch::Platform;
pub use config::KernelConfig;
pub use error::{ProcError, Result};
pub use process::{EntryPoint, Event, Pid, ProcessState};
pub use scheduler::{Decision, Scheduler};
