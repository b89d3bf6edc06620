use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lets at most one pass of an operation run at a time.
///
/// Both the scheduled ticker and the manual HTTP trigger go through the same
/// guard. Acquisition never waits: a caller that finds a pass in flight is
/// told so and decides what to do (skip the tick, answer 409).
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    lock: Arc<Mutex<()>>,
}

/// Held for the duration of a pass; dropping it lets the next one start.
#[derive(Debug)]
pub struct FlightGuard {
    _guard: OwnedMutexGuard<()>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.lock
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| FlightGuard { _guard: guard })
    }
}
