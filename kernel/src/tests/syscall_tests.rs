//! Syscall Unit Tests
//!
//! Tests for the global entry points processes and drivers call. They
//! share one scheduler and one registered platform, so the whole boot to
//! reclaim sequence lives in a single test.

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU16, AtomicUsize, Ordering};

    use crate::arch::Platform;
    use crate::config::KernelConfig;
    use crate::error::ProcError;
    use crate::process::{Event, Pid, ProcessState, INITIAL_STACK_POINTER};
    use crate::scheduler::{self, ContextHandle, Decision};

    /// Host stand-in for a board: records switches instead of performing
    /// them, and plays the UART interrupt whenever the kernel idles.
    struct MockBoard {
        interrupts: AtomicBool,
        /// A UART byte is latched and fires at the first unmask after the
        /// kernel has decided to idle.
        uart_armed: AtomicBool,
        /// The latched byte has been delivered.
        uart_delivered: AtomicBool,
        /// `idle` calls made after the wakeup was already delivered.
        late_idles: AtomicUsize,
        switches: AtomicUsize,
        idles: AtomicUsize,
        last_prev: AtomicI8,
        last_next: AtomicI8,
        last_sp: AtomicU16,
        console: spin::Mutex<String>,
    }

    static BOARD: MockBoard = MockBoard {
        interrupts: AtomicBool::new(true),
        uart_armed: AtomicBool::new(false),
        uart_delivered: AtomicBool::new(false),
        late_idles: AtomicUsize::new(0),
        switches: AtomicUsize::new(0),
        idles: AtomicUsize::new(0),
        last_prev: AtomicI8::new(-1),
        last_next: AtomicI8::new(-1),
        last_sp: AtomicU16::new(0),
        console: spin::Mutex::new(String::new()),
    };

    impl MockBoard {
        fn unmask(&self) {
            self.interrupts.store(true, Ordering::SeqCst);
            if !self.uart_armed.swap(false, Ordering::SeqCst) {
                return;
            }
            if scheduler::current_state() == Some(ProcessState::Idle) {
                scheduler::notify(Event::UART_INPUT).unwrap();
                self.uart_delivered.store(true, Ordering::SeqCst);
            } else {
                self.uart_armed.store(true, Ordering::SeqCst);
            }
        }
    }

    impl Platform for MockBoard {
        fn disable_interrupts(&self) -> bool {
            self.interrupts.swap(false, Ordering::SeqCst)
        }

        fn restore_interrupts(&self, was_enabled: bool) {
            if was_enabled {
                self.unmask();
            } else {
                self.interrupts.store(false, Ordering::SeqCst);
            }
        }

        unsafe fn switch_context(&self, prev: Option<ContextHandle>, next: ContextHandle) {
            assert!(
                self.interrupts.load(Ordering::SeqCst),
                "switch issued inside the critical section"
            );
            let prev = prev.map_or(-1, |handle| handle.pid().as_raw());
            self.last_prev.store(prev, Ordering::SeqCst);
            self.last_next.store(next.pid().as_raw(), Ordering::SeqCst);
            // SAFETY: the handle was taken in this decision.
            let sp = unsafe { next.saved_stack_pointer() };
            self.last_sp.store(sp, Ordering::SeqCst);
            self.switches.fetch_add(1, Ordering::SeqCst);
        }

        fn idle(&self) {
            assert!(
                !self.interrupts.load(Ordering::SeqCst),
                "idle entered with interrupts enabled"
            );
            self.idles.fetch_add(1, Ordering::SeqCst);
            if self.uart_delivered.swap(false, Ordering::SeqCst) {
                self.late_idles.fetch_add(1, Ordering::SeqCst);
            }

            // sei; sleep
            self.unmask();
            if !self.uart_delivered.swap(false, Ordering::SeqCst) {
                // A byte arrives on the UART.
                scheduler::notify(Event::UART_INPUT).unwrap();
            }
            self.interrupts.store(false, Ordering::SeqCst);
        }

        fn console_write(&self, s: &str) {
            self.console.lock().push_str(s);
        }
    }

    fn worker() -> ! {
        loop {
            core::hint::spin_loop();
        }
    }

    fn last_switch() -> (i8, i8) {
        (
            BOARD.last_prev.load(Ordering::SeqCst),
            BOARD.last_next.load(Ordering::SeqCst),
        )
    }

    #[test]
    fn test_kernel_lifecycle() {
        // ========================================
        // Before init
        // ========================================

        assert_eq!(scheduler::create_process(worker), Err(ProcError::NotInitialized));
        assert_eq!(scheduler::schedule(), Err(ProcError::NotInitialized));
        assert_eq!(scheduler::notify(Event::UART_INPUT), Err(ProcError::NotInitialized));
        assert_eq!(scheduler::current_pid(), None);

        // ========================================
        // Init
        // ========================================

        crate::logger::init(log::LevelFilter::Trace).unwrap();
        scheduler::init(&BOARD, KernelConfig::new()).unwrap();
        assert_eq!(
            scheduler::init(&BOARD, KernelConfig::new()),
            Err(ProcError::AlreadyInitialized)
        );
        assert!(BOARD.interrupts.load(Ordering::SeqCst));
        assert_eq!(
            scheduler::sleep_on(Event::UART_INPUT),
            Err(ProcError::NoCurrentProcess)
        );

        // ========================================
        // First switch out of the boot context
        // ========================================

        let a = scheduler::start_process(worker).unwrap();
        let b = scheduler::create_process(worker).unwrap();
        assert_eq!((a, b), (Pid(0), Pid(1)));
        scheduler::admit_process(b).unwrap();
        assert!(matches!(
            scheduler::admit_process(b),
            Err(ProcError::InvalidState { .. })
        ));

        assert_eq!(scheduler::schedule(), Ok(Decision::Switch(a)));
        assert_eq!(last_switch(), (-1, 0));
        assert_eq!(BOARD.last_sp.load(Ordering::SeqCst), INITIAL_STACK_POINTER);
        assert_eq!(scheduler::current_pid(), Some(a));

        // ========================================
        // Sleep and the idle path
        // ========================================

        scheduler::sleep_on(Event::UART_INPUT).unwrap();
        assert_eq!(last_switch(), (0, 1));
        assert_eq!(scheduler::current_pid(), Some(b));

        // Everybody sleeps; the idle path gets the UART byte and the scan
        // resumes after b.
        scheduler::sleep_on(Event::UART_INPUT).unwrap();
        assert_eq!(BOARD.idles.load(Ordering::SeqCst), 1);
        assert_eq!(last_switch(), (1, 0));
        assert_eq!(scheduler::current_pid(), Some(a));

        // ========================================
        // Exit and termination
        // ========================================

        scheduler::exit_current().unwrap();
        assert_eq!(last_switch(), (0, 1));

        // Running on b's stack now: a is reaped, b continues.
        scheduler::yield_now().unwrap();
        assert_eq!(scheduler::current_pid(), Some(b));

        let c = scheduler::start_process(worker).unwrap();
        assert_eq!(c, Pid(0));

        scheduler::terminate_process(b).unwrap();
        assert_eq!(last_switch(), (1, 0));
        assert_eq!(scheduler::current_pid(), Some(c));

        scheduler::reclaim_process(b).unwrap();
        assert_eq!(scheduler::reclaim_process(b), Err(ProcError::InvalidState {
            pid: b,
            current: ProcessState::Unused,
            expected: crate::process::StateMask::TERMINATED,
        }));
        assert_eq!(scheduler::reclaim_process(c), Err(ProcError::Busy(c)));
        assert_eq!(scheduler::terminate_process(Pid(9)), Err(ProcError::InvalidPid(Pid(9))));

        // ========================================
        // Counters and console
        // ========================================

        let stats = scheduler::stats().unwrap();
        assert_eq!(stats.switches, 5);
        assert_eq!(stats.continues, 1);
        assert_eq!(stats.idle_entries, 1);
        assert_eq!(stats.reaped, 1);
        assert_eq!(BOARD.switches.load(Ordering::SeqCst), 5);

        {
            let console = BOARD.console.lock();
            assert!(console.contains("[INFO ] [SCHED] Scheduler initialized"));
            assert!(console.contains("[DEBUG] [PROC] pid 0 exited"));
        }

        // ========================================
        // Wakeup racing the idle decision
        // ========================================

        // The byte is latched while c goes to sleep and fires as soon as
        // the kernel has chosen to idle. It must wake c without a second
        // byte.
        BOARD.uart_armed.store(true, Ordering::SeqCst);
        scheduler::sleep_on(Event::UART_INPUT).unwrap();

        assert!(!BOARD.uart_armed.load(Ordering::SeqCst));
        assert_eq!(BOARD.late_idles.load(Ordering::SeqCst), 0);
        assert_eq!(BOARD.idles.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler::current_pid(), Some(c));
        assert_eq!(scheduler::current_state(), Some(ProcessState::Run));
        assert!(BOARD.interrupts.load(Ordering::SeqCst));

        let stats = scheduler::stats().unwrap();
        assert_eq!(stats.idle_entries, 2);
        assert_eq!(stats.continues, 2);
        assert_eq!(stats.switches, 5);
    }
}
