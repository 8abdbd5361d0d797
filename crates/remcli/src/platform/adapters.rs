use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::bridge::script::AutomationCommand;
use crate::error::BridgeResult;

/// Everything one execution left behind: stdout, stderr, exit status and
/// how long it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

/// Executes automation commands against the host. `Err` is reserved for
/// failing to run the command at all; anything the host reports comes back
/// in the [`RawOutput`].
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    fn id(&self) -> &str {
        "unsupported"
    }

    async fn execute(&self, command: &AutomationCommand) -> BridgeResult<RawOutput>;
}

pub type SharedRunner = Arc<dyn ScriptRunner>;

#[cfg(target_os = "macos")]
pub mod osascript;
#[cfg(any(not(target_os = "macos"), test))]
pub mod portable;
#[cfg(test)]
pub mod fake;
