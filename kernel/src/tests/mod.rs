//! Kernel Unit Tests Module
//!
//! Scenario tests for the process table and the scheduler.

mod syscall_tests;
