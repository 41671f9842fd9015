//! Kernel scheduler module.
//!
//! This module implements cooperative round-robin scheduling over the
//! fixed process table. Control only returns to the scheduler at explicit
//! suspension points: yielding, sleeping on an event, or terminating.
//!
//! [`Scheduler`] holds the whole scheduling state explicitly (table,
//! current pid, statistics) so the policy can be driven without a real
//! context switch. The free functions below wrap the single global
//! instance and are what processes and drivers call.

pub mod context;
pub mod round_robin;

use spin::Mutex;

use crate::arch::{self, Platform};
use crate::config::KernelConfig;
use crate::error::{ProcError, Result};
use crate::process::{EntryPoint, Event, Pid, ProcessState, ProcessTable, StateMask};

pub use context::ContextHandle;
pub use round_robin::{select_next, Decision};

/// Global scheduler instance.
static SCHEDULER: Mutex<Option<Scheduler>> = Mutex::new(None);

/// Scheduling counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedStats {
    /// Decisions that transferred control to another process.
    pub switches: u32,
    /// Decisions that kept the current process running.
    pub continues: u32,
    /// Decisions that found nothing runnable.
    pub idle_entries: u32,
    /// Zombie slots reclaimed by the scheduler.
    pub reaped: u32,
}

/// The scheduler implementation.
pub struct Scheduler {
    /// Process slots and their stacks.
    table: ProcessTable,
    /// Process that owns the CPU, `None` until the first switch.
    current: Option<Pid>,
    /// Whether the last decision was `Idle`.
    idling: bool,
    /// Scheduling policy.
    config: KernelConfig,
    /// Scheduling counters.
    stats: SchedStats,
}

impl Scheduler {
    /// Create a new scheduler with an empty table.
    pub const fn new(config: KernelConfig) -> Self {
        Scheduler {
            table: ProcessTable::new(),
            current: None,
            idling: false,
            config,
            stats: SchedStats {
                switches: 0,
                continues: 0,
                idle_entries: 0,
                reaped: 0,
            },
        }
    }

    /// Read-only view of the process table.
    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    /// Process that currently owns the CPU.
    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    /// State of the execution context: `IDLE` while the idle path runs.
    pub fn current_state(&self) -> Option<ProcessState> {
        if self.idling {
            return Some(ProcessState::Idle);
        }
        self.current.and_then(|pid| self.table.state(pid).ok())
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn stats(&self) -> SchedStats {
        self.stats
    }

    /// Create a process in state `NEW`.
    pub fn create(&mut self, entry: EntryPoint) -> Result<Pid> {
        self.table.allocate(entry)
    }

    /// Create a process and admit it right away.
    pub fn start(&mut self, entry: EntryPoint) -> Result<Pid> {
        let pid = self.table.allocate(entry)?;
        self.table.admit(pid)?;
        Ok(pid)
    }

    /// Admit a process to scheduling.
    ///
    /// Stopped processes are only admittable when the configuration
    /// allows resuming them.
    pub fn admit(&mut self, pid: Pid) -> Result<()> {
        let admittable = if self.config.resume_stopped {
            StateMask::NEW | StateMask::STOP
        } else {
            StateMask::NEW
        };
        self.table.admit_from(pid, admittable)
    }

    /// Terminate a process. Terminating the current process takes effect
    /// at the next scheduling decision.
    pub fn terminate(&mut self, pid: Pid) -> Result<()> {
        self.table.terminate(pid)
    }

    /// Put a running process to sleep on `event`.
    pub fn sleep(&mut self, pid: Pid, event: Event) -> Result<()> {
        self.table.sleep(pid, event)
    }

    /// Put the current process to sleep on `event`.
    pub fn sleep_current(&mut self, event: Event) -> Result<Pid> {
        let pid = self.current.ok_or(ProcError::NoCurrentProcess)?;
        self.table.sleep(pid, event)?;
        Ok(pid)
    }

    /// Mark the current process as exited.
    pub fn exit_current(&mut self) -> Result<Pid> {
        let pid = self.current.ok_or(ProcError::NoCurrentProcess)?;
        self.table.exit(pid)?;
        Ok(pid)
    }

    /// Post an event: every process sleeping on it becomes runnable.
    pub fn notify(&mut self, event: Event) -> usize {
        self.table.wake(event)
    }

    /// Release a terminated slot. The running context cannot be released.
    pub fn reclaim(&mut self, pid: Pid) -> Result<()> {
        if self.current == Some(pid) {
            return Err(ProcError::Busy(pid));
        }
        self.table.reclaim(pid)
    }

    /// Decide what runs next without changing any state.
    pub fn select(&self) -> Decision {
        select_next(&self.table, self.current)
    }

    /// Make a scheduling decision and commit it.
    pub fn schedule(&mut self) -> Decision {
        if self.config.reap_zombies {
            self.reap_zombies();
        }

        let decision = self.select();
        match decision {
            Decision::Switch(next) => {
                log::trace!("[SCHED] switch {:?} -> {}", self.current, next);
                self.current = Some(next);
                self.idling = false;
                self.stats.switches += 1;
            }
            Decision::Continue => {
                self.idling = false;
                self.stats.continues += 1;
            }
            Decision::Idle => {
                if !self.idling {
                    log::trace!("[SCHED] no runnable process, idling");
                }
                self.idling = true;
                self.stats.idle_entries += 1;
            }
        }
        decision
    }

    /// Reclaim every zombie except the one whose stack is still in use.
    fn reap_zombies(&mut self) {
        for index in 0..crate::config::MAX_PROCS {
            let pid = Pid::from_index(index);
            if self.current == Some(pid) {
                continue;
            }
            if self.table.state(pid) == Ok(ProcessState::Zombie) && self.table.reclaim(pid).is_ok() {
                self.stats.reaped += 1;
            }
        }
    }

    /// Saved-context handle for the context switch primitive.
    pub(crate) fn context(&mut self, pid: Pid) -> Result<ContextHandle> {
        self.table.context_handle(pid)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(KernelConfig::new())
    }
}

// ==================== Global entry points ====================

/// Initialize the global scheduler and register the platform.
pub fn init(platform: &'static dyn Platform, config: KernelConfig) -> Result<()> {
    if !arch::install(platform) {
        return Err(ProcError::AlreadyInitialized);
    }

    arch::without_interrupts(platform, || {
        *SCHEDULER.lock() = Some(Scheduler::new(config));
    });

    log::info!("[SCHED] Scheduler initialized ({:?})", config);
    Ok(())
}

/// Run `f` on the global scheduler inside a critical section.
fn with_scheduler<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&mut Scheduler) -> Result<R>,
{
    let platform = arch::platform().ok_or(ProcError::NotInitialized)?;
    arch::without_interrupts(platform, || {
        let mut guard = SCHEDULER.lock();
        let scheduler = guard.as_mut().ok_or(ProcError::NotInitialized)?;
        f(scheduler)
    })
}

/// Create a new process in state `NEW`.
pub fn create_process(entry: EntryPoint) -> Result<Pid> {
    with_scheduler(|s| s.create(entry))
}

/// Create a process that runs at the next scheduling point.
pub fn start_process(entry: EntryPoint) -> Result<Pid> {
    with_scheduler(|s| s.start(entry))
}

/// Admit a process to scheduling.
pub fn admit_process(pid: Pid) -> Result<()> {
    with_scheduler(|s| s.admit(pid))
}

/// Terminate a process. A process terminating itself gives up the CPU.
pub fn terminate_process(pid: Pid) -> Result<()> {
    let was_current = with_scheduler(|s| {
        s.terminate(pid)?;
        Ok(s.current() == Some(pid))
    })?;

    if was_current {
        schedule()?;
    }
    Ok(())
}

/// Release the slot of a terminated process.
pub fn reclaim_process(pid: Pid) -> Result<()> {
    with_scheduler(|s| s.reclaim(pid))
}

/// Post an event. Safe to call from interrupt handlers; the woken
/// processes run at the next scheduling point.
pub fn notify(event: Event) -> Result<usize> {
    with_scheduler(|s| Ok(s.notify(event)))
}

/// Suspend the current process until `event` is posted.
pub fn sleep_on(event: Event) -> Result<()> {
    with_scheduler(|s| s.sleep_current(event))?;
    schedule()?;
    Ok(())
}

/// Give up the CPU to the next runnable process.
pub fn yield_now() -> Result<()> {
    schedule()?;
    Ok(())
}

/// End the current process. On hardware this never returns; the slot is
/// reclaimed after the scheduler has switched away from it.
pub fn exit_current() -> Result<()> {
    with_scheduler(|s| s.exit_current())?;
    schedule()?;
    Ok(())
}

/// Get the current process ID.
pub fn current_pid() -> Option<Pid> {
    with_scheduler(|s| Ok(s.current())).ok().flatten()
}

/// State of the execution context, `IDLE` while the idle path waits.
pub fn current_state() -> Option<ProcessState> {
    with_scheduler(|s| Ok(s.current_state())).ok().flatten()
}

/// Get the global scheduling counters.
pub fn stats() -> Result<SchedStats> {
    with_scheduler(|s| Ok(s.stats()))
}

/// Saved contexts of a switch: `prev` is `None` out of the boot context.
type SwitchPair = (Option<ContextHandle>, ContextHandle);

/// Schedule the next process.
///
/// The whole decision runs with interrupts masked. When nothing is
/// runnable the scheduler lock is released and `Platform::idle` enables
/// interrupts and waits atomically, so an event posted between the
/// decision and the wait cannot be lost. Interrupts are restored before
/// the platform swaps stacks.
///
/// The returned decision is the one that suspended the caller: after a
/// `Switch` it is reported once the caller has been resumed again.
pub fn schedule() -> Result<Decision> {
    let platform = arch::platform().ok_or(ProcError::NotInitialized)?;

    let was_enabled = platform.disable_interrupts();
    let outcome = decide(platform);
    platform.restore_interrupts(was_enabled);
    let (decision, switch) = outcome?;

    if let Some((prev, next)) = switch {
        // SAFETY: both handles were taken in this decision and the table
        // lives in a static, so they stay valid.
        unsafe { platform.switch_context(prev, next) };
    }
    Ok(decision)
}

/// Decide until something runs. Must be called with interrupts masked.
fn decide(platform: &dyn Platform) -> Result<(Decision, Option<SwitchPair>)> {
    loop {
        let step = {
            let mut guard = SCHEDULER.lock();
            let s = guard.as_mut().ok_or(ProcError::NotInitialized)?;
            let prev = s.current();
            let decision = s.schedule();
            let switch = match decision {
                Decision::Switch(next) => {
                    let prev = match prev {
                        Some(pid) => Some(s.context(pid)?),
                        None => None,
                    };
                    Some((prev, s.context(next)?))
                }
                _ => None,
            };
            (decision, switch)
        };

        match step {
            // Lock released; interrupts stay masked until idle enables them.
            (Decision::Idle, _) => platform.idle(),
            step => return Ok(step),
        }
    }
}
