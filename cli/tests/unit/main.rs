//! Unit tests for fleet CLI
//!
//! These tests use stubbed control planes and paused time, and run fast
//! without external I/O.

mod controller_state_machine;
mod mocks;
