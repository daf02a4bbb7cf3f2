use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Hook consulted by the dispatcher right before any network I/O.
///
/// Returning `true` makes the send fail with
/// [`DispatchError::InjectedFailure`](crate::error::DispatchError::InjectedFailure),
/// exercising the same log-and-drop path as a transport error.
pub trait FaultInjector: Send + Sync {
    fn should_fail(&self) -> bool;
}

/// Never injects a failure. Used unless a test swaps in something else.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaults;

impl FaultInjector for NoFaults {
    fn should_fail(&self) -> bool {
        false
    }
}

/// Shareable on/off switch. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct FaultSwitch {
    tripped: Arc<AtomicBool>,
}

impl FaultSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.tripped.store(false, Ordering::SeqCst);
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}

impl FaultInjector for FaultSwitch {
    fn should_fail(&self) -> bool {
        self.is_tripped()
    }
}
