use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dates::wire_format;
use crate::error::{BridgeError, ErrorKind};

/// A reminder as stored by the Reminders application.
///
/// `name` is the only lookup key the application offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub name: String,
    pub body: Option<String>,
    pub completed: bool,
}

/// A named collection of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub name: String,
}

/// An event read back from the Calendar application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    #[serde(with = "wire_format")]
    pub start: NaiveDateTime,
    #[serde(with = "wire_format")]
    pub end: NaiveDateTime,
    pub calendar_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Pre-validated input for creating an event. `end >= start` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub calendar_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Pre-validated range query. `end >= start` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub calendar_name: Option<String>,
}

/// "Now" captured once, with every projection derived from the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSnapshot {
    pub iso: String,
    pub locale: String,
    pub wire: String,
    pub timestamp: i64,
    pub utc_offset: String,
    pub components: TimeComponents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeComponents {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub weekday: String,
}

/// Error body of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

/// Response envelope returned for every operation call:
/// `{ "success": true, "data": ... }` or `{ "success": false, "error": { kind, message } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl OperationResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: &BridgeError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorPayload {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|error| error.kind)
    }
}
