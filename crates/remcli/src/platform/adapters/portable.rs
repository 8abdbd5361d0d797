use async_trait::async_trait;

use super::{RawOutput, ScriptRunner};
use crate::bridge::script::AutomationCommand;
use crate::error::{BridgeError, BridgeResult};

/// Runner for hosts without AppleScript. Every command fails before anything
/// is executed.
#[derive(Debug, Default)]
pub struct PortableRunner;

impl PortableRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScriptRunner for PortableRunner {
    async fn execute(&self, command: &AutomationCommand) -> BridgeResult<RawOutput> {
        Err(BridgeError::Automation(format!(
            "{} requires AppleScript, which is not available on this platform",
            command.action().label()
        )))
    }
}
