//! Test utilities for mastering tests
//!
//! Deterministic test signal generation and analysis tools shared by the
//! unit, integration and benchmark code of the mastering crates.

pub mod analysis;
pub mod signals;

pub use analysis::*;
pub use signals::*;
