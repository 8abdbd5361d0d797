//! The automation bridge: builds a script per operation, runs it through the
//! injected [`ScriptRunner`](crate::platform::ScriptRunner) one at a time, and
//! decodes or classifies what comes back.
//!
//! Failed commands are never retried. A script may have changed the host's
//! state before failing, so repeating it could duplicate side effects.

pub mod gate;
pub mod script;


use std::sync::Arc;
use std::time::Duration;

use crate::config::BridgeConfig;
use crate::dates::{self, Clock};
use crate::error::{BridgeError, BridgeResult};
use crate::mapper::{self, Outcome};
use crate::parser::{self, Decoded};
use crate::platform::SharedRunner;
use crate::types::{Calendar, CalendarEvent, EventQuery, NewEvent, Reminder, TimeSnapshot};

use self::gate::SingleFlightGate;
use self::script::{Action, AutomationCommand};

pub struct AutomationBridge {
    runner: SharedRunner,
    clock: Arc<dyn Clock>,
    gate: SingleFlightGate,
    script_timeout: Duration,
}

impl AutomationBridge {
    pub fn new(runner: SharedRunner, clock: Arc<dyn Clock>, config: &BridgeConfig) -> Self {
        Self {
            runner,
            clock,
            gate: SingleFlightGate::new(config.lock_wait),
            script_timeout: config.script_timeout,
        }
    }

    pub fn runner_id(&self) -> &str {
        self.runner.id()
    }

    /// True when no command is in flight.
    pub fn is_idle(&self) -> bool {
        self.gate.is_open()
    }

    /// Incomplete reminders, in the application's order.
    pub async fn list_reminders(&self) -> BridgeResult<Vec<Reminder>> {
        self.run(Action::ListReminders, parser::decode_reminders).await
    }

    /// The first reminder named `name`.
    pub async fn get_reminder(&self, name: &str) -> BridgeResult<Reminder> {
        let action = Action::GetReminder {
            name: name.to_string(),
        };
        self.run(action, single_reminder).await
    }

    pub async fn complete_reminder(&self, name: &str) -> BridgeResult<Reminder> {
        let action = Action::CompleteReminder {
            name: name.to_string(),
        };
        self.run(action, single_reminder).await
    }

    /// Deletes the first reminder named `name` and returns it as it was.
    pub async fn delete_reminder(&self, name: &str) -> BridgeResult<Reminder> {
        let action = Action::DeleteReminder {
            name: name.to_string(),
        };
        self.run(action, single_reminder).await
    }

    pub async fn update_reminder(&self, old_name: &str, new_name: &str) -> BridgeResult<Reminder> {
        let action = Action::UpdateReminder {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        };
        self.run(action, single_reminder).await
    }

    pub async fn add_reminder(&self, name: &str, body: Option<&str>) -> BridgeResult<Reminder> {
        let action = Action::AddReminder {
            name: name.to_string(),
            body: body.map(str::to_string),
        };
        self.run(action, single_reminder).await
    }

    pub async fn list_calendars(&self) -> BridgeResult<Vec<Calendar>> {
        self.run(Action::ListCalendars, parser::decode_calendars).await
    }

    pub async fn create_calendar_event(&self, event: NewEvent) -> BridgeResult<CalendarEvent> {
        dates::ensure_ordered(&event.start, &event.end)?;
        self.run(Action::CreateEvent(event), |raw| {
            parser::decode_events(raw).and_then(parser::expect_single)
        })
        .await
    }

    /// Events overlapping `[start, end]`, ordered by start.
    pub async fn get_calendar_events(&self, query: EventQuery) -> BridgeResult<Vec<CalendarEvent>> {
        dates::ensure_ordered(&query.start, &query.end)?;
        self.run(Action::GetEvents(query), parser::decode_events).await
    }

    /// Reads the injected clock; the host applications are not involved.
    pub fn current_time(&self) -> TimeSnapshot {
        dates::snapshot(self.clock.as_ref())
    }

    async fn run<T>(
        &self,
        action: Action,
        decode: fn(&str) -> BridgeResult<Decoded<T>>,
    ) -> BridgeResult<T> {
        let not_found = action.not_found_message();
        let stdout = self.execute(AutomationCommand::new(action)).await?;
        match decode(&stdout)? {
            Decoded::Found(value) => Ok(value),
            Decoded::NotFound => Err(BridgeError::NotFound(not_found)),
        }
    }

    async fn execute(&self, command: AutomationCommand) -> BridgeResult<String> {
        let label = command.action().label();
        let permit = self.gate.enter().await.inspect_err(|error| {
            tracing::warn!(operation = label, "automation gate unavailable: {error}");
        })?;
        tracing::debug!(
            operation = label,
            runner = self.runner.id(),
            script_bytes = command.script().len(),
            "executing automation command"
        );
        let executed = tokio::time::timeout(self.script_timeout, self.runner.execute(&command)).await;
        drop(permit);

        let raw = match executed {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(operation = label, "automation command timed out");
                return Err(mapper::timed_out(self.script_timeout));
            }
        };
        match mapper::classify(&raw, self.script_timeout) {
            Outcome::Success(stdout) => {
                tracing::debug!(
                    operation = label,
                    elapsed = ?raw.elapsed,
                    "automation command finished"
                );
                Ok(stdout.to_string())
            }
            Outcome::Failure(error) => {
                tracing::warn!(
                    operation = label,
                    exit_code = ?raw.exit_code,
                    kind = error.kind().as_str(),
                    "automation command failed: {error}"
                );
                Err(error)
            }
        }
    }
}

fn single_reminder(raw: &str) -> BridgeResult<Decoded<Reminder>> {
    parser::decode_reminders(raw).and_then(parser::expect_single)
}
