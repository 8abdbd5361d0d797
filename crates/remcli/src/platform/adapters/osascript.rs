use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use super::{RawOutput, ScriptRunner};
use crate::bridge::script::AutomationCommand;
use crate::error::{BridgeError, BridgeResult};

const OSASCRIPT: &str = "osascript";

/// Runs commands through `osascript -e`. The child is killed if the caller
/// stops waiting, which is how the bridge's execution timeout takes effect.
#[derive(Debug, Default)]
pub struct OsascriptRunner;

impl OsascriptRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    fn id(&self) -> &str {
        OSASCRIPT
    }

    async fn execute(&self, command: &AutomationCommand) -> BridgeResult<RawOutput> {
        let started = Instant::now();
        let output = Command::new(OSASCRIPT)
            .arg("-e")
            .arg(command.script())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|error| BridgeError::Automation(format!("failed to execute osascript: {error}")))?;
        Ok(RawOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            elapsed: started.elapsed(),
        })
    }
}
