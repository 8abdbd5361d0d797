//! Strict decoder for script replies.
//!
//! Grammar requested from every script:
//!
//! ```text
//! reply  = header RS *(record RS)
//! header = status US count
//! record = field *(US field)
//! ```

use crate::dates::parse_wire;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{Calendar, CalendarEvent, Reminder};

pub const RECORD_SEPARATOR: char = '\u{1e}';
pub const FIELD_SEPARATOR: char = '\u{1f}';
pub const STATUS_OK: &str = "OK";
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

const REMINDER_FIELDS: usize = 3;
const CALENDAR_FIELDS: usize = 1;
const EVENT_FIELDS: usize = 6;

/// Outcome of a decoded reply. `NotFound` is distinct from an empty `Found`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Found(T),
    NotFound,
}

impl<T> Decoded<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Found(value) => Decoded::Found(f(value)),
            Decoded::NotFound => Decoded::NotFound,
        }
    }
}

/// Split a reply into its records, each already split into fields.
pub fn decode_records(raw: &str) -> BridgeResult<Decoded<Vec<Vec<&str>>>> {
    let body = raw.strip_suffix('\n').unwrap_or(raw);
    let Some(body) = body.strip_suffix(RECORD_SEPARATOR) else {
        return Err(BridgeError::serialization(format!(
            "reply is not terminated by a record separator: {:?}",
            preview(raw)
        )));
    };
    let mut chunks = body.split(RECORD_SEPARATOR);
    let header = chunks.next().unwrap_or_default();
    let Some((status, count)) = header.split_once(FIELD_SEPARATOR) else {
        return Err(BridgeError::serialization(format!(
            "reply header is malformed: {:?}",
            preview(header)
        )));
    };
    let count: usize = count.parse().map_err(|_| {
        BridgeError::serialization(format!("reply record count is not a number: {count:?}"))
    })?;
    let records: Vec<Vec<&str>> = chunks
        .map(|record| record.split(FIELD_SEPARATOR).collect())
        .collect();
    if records.len() != count {
        return Err(BridgeError::serialization(format!(
            "reply announced {count} records but carried {}",
            records.len()
        )));
    }
    match status {
        STATUS_OK => Ok(Decoded::Found(records)),
        STATUS_NOT_FOUND if count == 0 => Ok(Decoded::NotFound),
        STATUS_NOT_FOUND => Err(BridgeError::serialization(
            "NOT_FOUND reply carried records",
        )),
        other => Err(BridgeError::serialization(format!(
            "unknown reply status {other:?}"
        ))),
    }
}

pub fn decode_reminders(raw: &str) -> BridgeResult<Decoded<Vec<Reminder>>> {
    decode_with(raw, REMINDER_FIELDS, "reminder", |fields| {
        Ok(Reminder {
            name: fields[0].to_string(),
            body: optional(fields[1]),
            completed: parse_bool(fields[2])?,
        })
    })
}

pub fn decode_calendars(raw: &str) -> BridgeResult<Decoded<Vec<Calendar>>> {
    decode_with(raw, CALENDAR_FIELDS, "calendar", |fields| {
        Ok(Calendar {
            name: fields[0].to_string(),
        })
    })
}

/// Events come back ordered by start, then title.
pub fn decode_events(raw: &str) -> BridgeResult<Decoded<Vec<CalendarEvent>>> {
    let decoded = decode_with(raw, EVENT_FIELDS, "event", |fields| {
        let start = parse_wire(fields[1], "event start").map_err(as_serialization)?;
        let end = parse_wire(fields[2], "event end").map_err(as_serialization)?;
        Ok(CalendarEvent {
            title: fields[0].to_string(),
            start,
            end,
            calendar_name: optional(fields[3]),
            location: optional(fields[4]),
            notes: optional(fields[5]),
        })
    })?;
    Ok(decoded.map(|mut events| {
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
        events
    }))
}

/// Single-target operations must produce exactly one record.
pub fn expect_single<T>(decoded: Decoded<Vec<T>>) -> BridgeResult<Decoded<T>> {
    match decoded {
        Decoded::NotFound => Ok(Decoded::NotFound),
        Decoded::Found(mut items) if items.len() == 1 => Ok(Decoded::Found(items.remove(0))),
        Decoded::Found(items) => Err(BridgeError::serialization(format!(
            "expected exactly one record, got {}",
            items.len()
        ))),
    }
}

fn decode_with<T>(
    raw: &str,
    arity: usize,
    what: &str,
    build: impl Fn(&[&str]) -> BridgeResult<T>,
) -> BridgeResult<Decoded<Vec<T>>> {
    let records = match decode_records(raw)? {
        Decoded::NotFound => return Ok(Decoded::NotFound),
        Decoded::Found(records) => records,
    };
    let mut out = Vec::with_capacity(records.len());
    for (idx, fields) in records.iter().enumerate() {
        if fields.len() != arity {
            return Err(BridgeError::serialization(format!(
                "{what} record {idx} has {} fields, expected {arity}",
                fields.len()
            )));
        }
        out.push(build(fields.as_slice())?);
    }
    Ok(Decoded::Found(out))
}

fn parse_bool(value: &str) -> BridgeResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(BridgeError::serialization(format!(
            "expected true or false, got {other:?}"
        ))),
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn as_serialization(error: BridgeError) -> BridgeError {
    match error {
        BridgeError::Validation(message) => BridgeError::Serialization(message),
        other => other,
    }
}

fn preview(raw: &str) -> String {
    raw.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn reply(status: &str, records: &[&[&str]]) -> String {
        let mut out = format!("{status}{FIELD_SEPARATOR}{}{RECORD_SEPARATOR}", records.len());
        for record in records {
            out.push_str(&record.join(FIELD_SEPARATOR.to_string().as_str()));
            out.push(RECORD_SEPARATOR);
        }
        out.push('\n');
        out
    }

    #[test]
    fn decodes_reminders_in_order() {
        let raw = reply(
            STATUS_OK,
            &[&["Buy milk", "2 litres", "false"], &["Call mom", "", "true"]],
        );
        let Decoded::Found(reminders) = decode_reminders(&raw).expect("decode") else {
            panic!("expected records");
        };
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].name, "Buy milk");
        assert_eq!(reminders[0].body.as_deref(), Some("2 litres"));
        assert!(!reminders[0].completed);
        assert_eq!(reminders[1].body, None);
        assert!(reminders[1].completed);
    }

    #[test]
    fn empty_list_is_found_not_missing() {
        let raw = reply(STATUS_OK, &[]);
        assert_eq!(decode_reminders(&raw).expect("decode"), Decoded::Found(Vec::new()));
    }

    #[test]
    fn not_found_is_distinct() {
        let raw = reply(STATUS_NOT_FOUND, &[]);
        assert_eq!(decode_reminders(&raw).expect("decode"), Decoded::NotFound);
    }

    #[test]
    fn names_may_contain_commas_and_newlines() {
        let raw = reply(STATUS_OK, &[&["eggs, flour\nand sugar", "", "false"]]);
        let Decoded::Found(reminders) = decode_reminders(&raw).expect("decode") else {
            panic!("expected records");
        };
        assert_eq!(reminders[0].name, "eggs, flour\nand sugar");
    }

    #[test]
    fn rejects_wrong_field_count() {
        let raw = reply(STATUS_OK, &[&["Buy milk", "false"]]);
        let error = decode_reminders(&raw).expect_err("two fields");
        assert_eq!(error.kind(), ErrorKind::SerializationError);
        assert!(error.to_string().contains("has 2 fields"));
    }

    #[test]
    fn rejects_count_mismatch() {
        let raw = format!("OK{FIELD_SEPARATOR}2{RECORD_SEPARATOR}a{RECORD_SEPARATOR}");
        let error = decode_calendars(&raw).expect_err("count mismatch");
        assert!(error.to_string().contains("announced 2 records"));
    }

    #[test]
    fn rejects_unterminated_and_legacy_output() {
        assert!(decode_reminders("Buy milk, Call mom\n").is_err());
        assert!(decode_reminders("").is_err());
        let raw = format!("OK{FIELD_SEPARATOR}0");
        assert!(decode_reminders(&raw).is_err());
    }

    #[test]
    fn rejects_unknown_status_and_bad_bool() {
        let raw = reply("MAYBE", &[]);
        assert!(decode_calendars(&raw).is_err());
        let raw = reply(STATUS_OK, &[&["x", "", "yes"]]);
        assert!(decode_reminders(&raw).is_err());
    }

    #[test]
    fn decodes_events_sorted_by_start() {
        let raw = reply(
            STATUS_OK,
            &[
                &["Lunch", "2024-01-15 12:00:00", "2024-01-15 13:00:00", "Home", "", ""],
                &["Standup", "2024-01-15 09:00:00", "2024-01-15 09:15:00", "Work", "Room A", "daily"],
            ],
        );
        let Decoded::Found(events) = decode_events(&raw).expect("decode") else {
            panic!("expected events");
        };
        assert_eq!(events[0].title, "Standup");
        assert_eq!(events[0].location.as_deref(), Some("Room A"));
        assert_eq!(events[0].notes.as_deref(), Some("daily"));
        assert_eq!(events[1].calendar_name.as_deref(), Some("Home"));
        assert_eq!(events[1].location, None);
    }

    #[test]
    fn bad_event_date_is_a_serialization_error() {
        let raw = reply(
            STATUS_OK,
            &[&["Lunch", "Monday, 15 January 2024", "2024-01-15 13:00:00", "Home", "", ""]],
        );
        let error = decode_events(&raw).expect_err("bad date");
        assert_eq!(error.kind(), ErrorKind::SerializationError);
    }

    #[test]
    fn expect_single_requires_one_record() {
        assert_eq!(expect_single(Decoded::Found(vec![1])).expect("one"), Decoded::Found(1));
        assert_eq!(expect_single::<i32>(Decoded::NotFound).expect("nf"), Decoded::NotFound);
        assert!(expect_single(Decoded::Found(vec![1, 2])).is_err());
        assert!(expect_single::<i32>(Decoded::Found(vec![])).is_err());
    }
}
