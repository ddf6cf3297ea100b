//! Inter-cycle pacing.
//!
//! Pacing only slows a run down for watching it; results never depend on it.

use std::{fmt, thread, time::Duration};

/// Called by the processor once after every executed cycle.
pub trait Pacer: fmt::Debug + Send {
    fn pace(&mut self);
}

/// Runs at full speed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn pace(&mut self) {}
}

/// Sleeps for a fixed duration after each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Pacer for FixedDelay {
    fn pace(&mut self) {
        thread::sleep(self.0);
    }
}
