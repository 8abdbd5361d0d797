//! Request dispatcher: validates an operation call, runs it on the bridge and
//! wraps the outcome in an [`OperationResponse`]. Never fails and never panics
//! outward; every problem becomes an error envelope.

mod args;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::bridge::AutomationBridge;
use crate::dates;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{EventQuery, NewEvent, OperationResponse};

use self::args::Args;

/// Argument schema of one operation. Every argument is a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl OperationSpec {
    const fn new(
        name: &'static str,
        required: &'static [&'static str],
        optional: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            required,
            optional,
        }
    }

    fn accepts(&self, argument: &str) -> bool {
        self.required
            .iter()
            .chain(self.optional)
            .any(|name| *name == argument)
    }
}

pub const OPERATIONS: &[OperationSpec] = &[
    OperationSpec::new("list_reminders", &[], &[]),
    OperationSpec::new("get_reminder", &["name"], &[]),
    OperationSpec::new("complete_reminder", &["name"], &[]),
    OperationSpec::new("delete_reminder", &["name"], &[]),
    OperationSpec::new("update_reminder", &["old_name", "new_name"], &[]),
    OperationSpec::new("add_reminder", &["name"], &["body"]),
    OperationSpec::new("list_calendars", &[], &[]),
    OperationSpec::new(
        "create_calendar_event",
        &["title", "start_date", "end_date"],
        &["calendar_name", "location", "notes"],
    ),
    OperationSpec::new(
        "get_calendar_events",
        &["start_date", "end_date"],
        &["calendar_name"],
    ),
    OperationSpec::new("get_current_time", &[], &[]),
];

pub fn find_operation(name: &str) -> BridgeResult<&'static OperationSpec> {
    OPERATIONS
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| BridgeError::validation(format!("unknown operation {name:?}")))
}

#[derive(Clone)]
pub struct Dispatcher {
    bridge: Arc<AutomationBridge>,
}

impl Dispatcher {
    pub fn new(bridge: Arc<AutomationBridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &AutomationBridge {
        &self.bridge
    }

    pub fn operations(&self) -> &'static [OperationSpec] {
        OPERATIONS
    }

    #[tracing::instrument(skip(self, arguments), fields(request_id = %uuid::Uuid::new_v4()))]
    pub async fn dispatch(&self, operation: &str, arguments: &Map<String, Value>) -> OperationResponse {
        let outcome = AssertUnwindSafe(self.invoke(operation, arguments))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(data)) => {
                tracing::info!("operation succeeded");
                OperationResponse::ok(data)
            }
            Ok(Err(error)) => {
                tracing::info!(kind = error.kind().as_str(), "operation failed: {error}");
                OperationResponse::failure(&error)
            }
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                tracing::error!("operation panicked: {detail}");
                OperationResponse::failure(&BridgeError::Automation(format!(
                    "internal failure while handling {operation}: {detail}"
                )))
            }
        }
    }

    async fn invoke(&self, operation: &str, arguments: &Map<String, Value>) -> BridgeResult<Value> {
        let spec = find_operation(operation)?;
        let args = Args::parse(spec, arguments)?;
        let bridge = self.bridge.as_ref();
        match spec.name {
            "list_reminders" => to_data(bridge.list_reminders().await?),
            "get_reminder" => to_data(bridge.get_reminder(args.required("name")?).await?),
            "complete_reminder" => to_data(bridge.complete_reminder(args.required("name")?).await?),
            "delete_reminder" => to_data(bridge.delete_reminder(args.required("name")?).await?),
            "update_reminder" => to_data(
                bridge
                    .update_reminder(args.required("old_name")?, args.required("new_name")?)
                    .await?,
            ),
            "add_reminder" => to_data(
                bridge
                    .add_reminder(args.required("name")?, args.optional("body"))
                    .await?,
            ),
            "list_calendars" => to_data(bridge.list_calendars().await?),
            "create_calendar_event" => {
                let start = args.date("start_date")?;
                let end = args.date("end_date")?;
                dates::ensure_ordered(&start, &end)?;
                let event = NewEvent {
                    title: args.required("title")?.to_string(),
                    start,
                    end,
                    calendar_name: args.optional("calendar_name").map(str::to_string),
                    location: args.optional("location").map(str::to_string),
                    notes: args.optional("notes").map(str::to_string),
                };
                to_data(bridge.create_calendar_event(event).await?)
            }
            "get_calendar_events" => {
                let start = args.date("start_date")?;
                let end = args.date("end_date")?;
                dates::ensure_ordered(&start, &end)?;
                let query = EventQuery {
                    start,
                    end,
                    calendar_name: args.optional("calendar_name").map(str::to_string),
                };
                to_data(bridge.get_calendar_events(query).await?)
            }
            "get_current_time" => to_data(bridge.current_time()),
            other => Err(BridgeError::Automation(format!(
                "operation {other:?} has no handler"
            ))),
        }
    }
}

fn to_data<T: Serialize>(value: T) -> BridgeResult<Value> {
    serde_json::to_value(value)
        .map_err(|error| BridgeError::serialization(format!("failed to encode result: {error}")))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
