use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::error::{BridgeError, BridgeResult};

/// Single-slot gate in front of the host applications. Waiters are served in
/// arrival order and give up after `wait`.
#[derive(Debug)]
pub struct SingleFlightGate {
    slot: Mutex<()>,
    wait: Duration,
}

/// Held while one command is in flight; dropping it opens the gate.
pub type GatePermit<'a> = MutexGuard<'a, ()>;

impl SingleFlightGate {
    pub fn new(wait: Duration) -> Self {
        Self {
            slot: Mutex::new(()),
            wait,
        }
    }

    pub async fn enter(&self) -> BridgeResult<GatePermit<'_>> {
        tokio::time::timeout(self.wait, self.slot.lock())
            .await
            .map_err(|_| {
                BridgeError::Timeout(format!(
                    "waited {} ms for a previous automation command to finish",
                    self.wait.as_millis()
                ))
            })
    }

    pub fn is_open(&self) -> bool {
        self.slot.try_lock().is_ok()
    }
}
