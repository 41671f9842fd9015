//! Architecture-specific hooks.
//!
//! The kernel core is target independent. Board support code implements
//! [`Platform`] for the chip it runs on and registers it once at boot;
//! everything interrupt-, register- or power-related goes through it.

use spin::Once;

use crate::scheduler::ContextHandle;

/// Services the kernel needs from the target.
pub trait Platform: Sync {
    /// Mask interrupts. Returns whether they were enabled before.
    fn disable_interrupts(&self) -> bool;

    /// Restore the interrupt state returned by `disable_interrupts`.
    fn restore_interrupts(&self, was_enabled: bool);

    /// Save the running context into `prev` and resume `next`.
    ///
    /// `prev` is `None` for the very first switch out of the boot context,
    /// which is abandoned. The call returns once `prev` is resumed again.
    /// It is invoked with the scheduler lock released and interrupts
    /// restored; the implementation masks them for the register swap.
    ///
    /// # Safety
    ///
    /// Both handles must come from the scheduler in the same decision.
    unsafe fn switch_context(&self, prev: Option<ContextHandle>, next: ContextHandle);

    /// Wait for the next interrupt, e.g. in a low-power sleep mode.
    ///
    /// Called with interrupts masked and the scheduler lock released.
    /// The implementation must enable interrupts and enter the wait as one
    /// atomic step (`sei; sleep` on AVR) and mask them again before
    /// returning.
    fn idle(&self);

    /// Write diagnostic text to the console.
    fn console_write(&self, _s: &str) {}
}

/// Registered platform.
static PLATFORM: Once<&'static dyn Platform> = Once::new();

/// Register the platform. Returns `false` if one was already registered.
pub fn install(platform: &'static dyn Platform) -> bool {
    let mut installed = false;
    PLATFORM.call_once(|| {
        installed = true;
        platform
    });
    installed
}

/// Get the registered platform.
pub fn platform() -> Option<&'static dyn Platform> {
    PLATFORM.get().copied()
}

/// Execute code with interrupts disabled.
#[inline]
pub fn without_interrupts<F, R>(platform: &dyn Platform, f: F) -> R
where
    F: FnOnce() -> R,
{
    let was_enabled = platform.disable_interrupts();
    let result = f();
    platform.restore_interrupts(was_enabled);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, Ordering};

    struct Flag(AtomicBool);

    impl Platform for Flag {
        fn disable_interrupts(&self) -> bool {
            self.0.swap(false, Ordering::SeqCst)
        }

        fn restore_interrupts(&self, was_enabled: bool) {
            self.0.store(was_enabled, Ordering::SeqCst);
        }

        unsafe fn switch_context(&self, _prev: Option<ContextHandle>, _next: ContextHandle) {}

        fn idle(&self) {}
    }

    #[test]
    fn test_without_interrupts_nests() {
        let flag = Flag(AtomicBool::new(true));

        without_interrupts(&flag, || {
            assert!(!flag.0.load(Ordering::SeqCst));
            without_interrupts(&flag, || {
                assert!(!flag.0.load(Ordering::SeqCst));
            });
            // The inner section must not re-enable interrupts early.
            assert!(!flag.0.load(Ordering::SeqCst));
        });

        assert!(flag.0.load(Ordering::SeqCst));
    }
}
