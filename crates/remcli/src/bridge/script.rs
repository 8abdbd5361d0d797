//! AppleScript command builder.
//!
//! Every string that reaches a script goes through [`applescript_literal`].
//! Dates are passed as integers to the `makeDate` handler, so no caller value
//! is ever interpolated raw.

use crate::dates::applescript_date;
use crate::parser::{FIELD_SEPARATOR, RECORD_SEPARATOR, STATUS_NOT_FOUND, STATUS_OK};
use crate::types::{EventQuery, NewEvent};

const REMINDERS_APP: &str = "Reminders";
const CALENDAR_APP: &str = "Calendar";

/// A logical operation against the host applications, with pre-validated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ListReminders,
    GetReminder { name: String },
    CompleteReminder { name: String },
    DeleteReminder { name: String },
    UpdateReminder { old_name: String, new_name: String },
    AddReminder { name: String, body: Option<String> },
    ListCalendars,
    CreateEvent(NewEvent),
    GetEvents(EventQuery),
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::ListReminders => "list_reminders",
            Action::GetReminder { .. } => "get_reminder",
            Action::CompleteReminder { .. } => "complete_reminder",
            Action::DeleteReminder { .. } => "delete_reminder",
            Action::UpdateReminder { .. } => "update_reminder",
            Action::AddReminder { .. } => "add_reminder",
            Action::ListCalendars => "list_calendars",
            Action::CreateEvent(_) => "create_calendar_event",
            Action::GetEvents(_) => "get_calendar_events",
        }
    }

    /// Message used when the script answers `NOT_FOUND`.
    pub fn not_found_message(&self) -> String {
        match self {
            Action::GetReminder { name }
            | Action::CompleteReminder { name }
            | Action::DeleteReminder { name } => format!("no reminder named {name:?}"),
            Action::UpdateReminder { old_name, .. } => format!("no reminder named {old_name:?}"),
            Action::CreateEvent(NewEvent {
                calendar_name: Some(calendar),
                ..
            })
            | Action::GetEvents(EventQuery {
                calendar_name: Some(calendar),
                ..
            }) => format!("no calendar named {calendar:?}"),
            Action::CreateEvent(_) => "no writable calendar available".to_string(),
            _ => format!("{} found nothing to act on", self.label()),
        }
    }
}

/// Script text paired with the action it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationCommand {
    action: Action,
    script: String,
}

impl AutomationCommand {
    pub fn new(action: Action) -> Self {
        let script = build_script(&action);
        Self { action, script }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn script(&self) -> &str {
        &self.script
    }
}

/// Escape a string for use between AppleScript double quotes.
pub fn escape_applescript_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Build an AppleScript text expression that evaluates to exactly `value`.
///
/// Control characters without a backslash escape are spliced in as
/// `(character id N)`; the result is then parenthesized.
pub fn applescript_literal(value: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in value.chars() {
        if ch.is_control() && !matches!(ch, '\n' | '\r' | '\t') {
            if !current.is_empty() {
                parts.push(format!("\"{}\"", escape_applescript_string(&current)));
                current.clear();
            }
            parts.push(format!("(character id {})", ch as u32));
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() || parts.is_empty() {
        parts.push(format!("\"{}\"", escape_applescript_string(&current)));
    }
    if parts.len() == 1 && parts[0].starts_with('"') {
        return parts.remove(0);
    }
    format!("({})", parts.join(" & "))
}

fn build_script(action: &Action) -> String {
    match action {
        Action::ListReminders => reminders_script(
            "\tset matches to every reminder whose completed is false\n\
             \tset rows to {}\n\
             \trepeat with r in matches\n\
             \t\tset end of rows to my reminderRecord(r)\n\
             \tend repeat\n",
            &format!("return my encodeReply(\"{STATUS_OK}\", rows)"),
        ),
        Action::GetReminder { name } => {
            reminders_script(&first_reminder(name), &ok_with("my reminderRecord(theReminder)"))
        }
        Action::CompleteReminder { name } => reminders_script(
            &format!(
                "{}\tset completed of theReminder to true\n",
                first_reminder(name)
            ),
            &ok_with("my reminderRecord(theReminder)"),
        ),
        Action::DeleteReminder { name } => reminders_script(
            &format!(
                "{}\tset row to my reminderRecord(theReminder)\n\tdelete theReminder\n",
                first_reminder(name)
            ),
            &ok_with("row"),
        ),
        Action::UpdateReminder { old_name, new_name } => reminders_script(
            &format!(
                "{}\tset name of theReminder to {}\n",
                first_reminder(old_name),
                applescript_literal(new_name)
            ),
            &ok_with("my reminderRecord(theReminder)"),
        ),
        Action::AddReminder { name, body } => {
            let mut properties = format!("name:{}", applescript_literal(name));
            if let Some(body) = body {
                properties.push_str(&format!(", body:{}", applescript_literal(body)));
            }
            reminders_script(
                &format!("\tset theReminder to make new reminder with properties {{{properties}}}\n"),
                &ok_with("my reminderRecord(theReminder)"),
            )
        }
        Action::ListCalendars => calendar_script(
            "",
            "\tset rows to {}\n\
             \trepeat with c in (every calendar)\n\
             \t\tset end of rows to my clean(name of c)\n\
             \tend repeat\n",
            &format!("return my encodeReply(\"{STATUS_OK}\", rows)"),
        ),
        Action::CreateEvent(event) => create_event_script(event),
        Action::GetEvents(query) => get_events_script(query),
    }
}

fn create_event_script(event: &NewEvent) -> String {
    let setup = date_setup(&event.start, &event.end);
    let resolve = match &event.calendar_name {
        Some(calendar) => calendar_lookup(calendar),
        None => format!(
            "\tset matches to every calendar whose writable is true\n{}",
            not_found_guard()
        ),
    };
    let mut properties = format!(
        "summary:{}, start date:startDate, end date:endDate",
        applescript_literal(&event.title)
    );
    if let Some(location) = &event.location {
        properties.push_str(&format!(", location:{}", applescript_literal(location)));
    }
    if let Some(notes) = &event.notes {
        properties.push_str(&format!(", description:{}", applescript_literal(notes)));
    }
    let body = format!(
        "{resolve}\tset theCalendar to item 1 of matches\n\
         \tset theEvent to make new event at end of events of theCalendar with properties {{{properties}}}\n\
         \tset row to my eventRecord(theEvent, name of theCalendar)\n"
    );
    calendar_script(&setup, &body, &ok_with("row"))
}

fn get_events_script(query: &EventQuery) -> String {
    let setup = date_setup(&query.start, &query.end);
    let resolve = match &query.calendar_name {
        Some(calendar) => calendar_lookup(calendar),
        None => "\tset matches to every calendar\n".to_string(),
    };
    let body = format!(
        "{resolve}\tset rows to {{}}\n\
         \trepeat with c in matches\n\
         \t\tset calName to name of c\n\
         \t\tset hits to (every event of c whose start date <= endDate and end date >= startDate)\n\
         \t\trepeat with e in hits\n\
         \t\t\tset end of rows to my eventRecord(e, calName)\n\
         \t\tend repeat\n\
         \tend repeat\n"
    );
    calendar_script(
        &setup,
        &body,
        &format!("return my encodeReply(\"{STATUS_OK}\", rows)"),
    )
}

fn first_reminder(name: &str) -> String {
    format!(
        "\tset matches to every reminder whose name is {}\n{}\tset theReminder to item 1 of matches\n",
        applescript_literal(name),
        not_found_guard()
    )
}

fn calendar_lookup(name: &str) -> String {
    format!(
        "\tset matches to every calendar whose name is {}\n{}",
        applescript_literal(name),
        not_found_guard()
    )
}

fn not_found_guard() -> String {
    format!("\tif (count of matches) is 0 then return my encodeReply(\"{STATUS_NOT_FOUND}\", {{}})\n")
}

fn ok_with(row: &str) -> String {
    format!("return my encodeReply(\"{STATUS_OK}\", {{{row}}})")
}

fn date_setup(start: &chrono::NaiveDateTime, end: &chrono::NaiveDateTime) -> String {
    format!(
        "set startDate to {}\nset endDate to {}\n",
        applescript_date(start),
        applescript_date(end)
    )
}

fn reminders_script(body: &str, tail: &str) -> String {
    format!(
        "{}{}tell application \"{REMINDERS_APP}\"\n{body}\t{tail}\nend tell\n",
        common_handlers(),
        REMINDER_HANDLERS
    )
}

fn calendar_script(setup: &str, body: &str, tail: &str) -> String {
    format!(
        "{}{}{setup}tell application \"{CALENDAR_APP}\"\n{body}\t{tail}\nend tell\n",
        common_handlers(),
        CALENDAR_HANDLERS
    )
}

fn common_handlers() -> String {
    format!(
        r#"on fieldSep()
	return character id {field}
end fieldSep

on recordSep()
	return character id {record}
end recordSep

on clean(v)
	if v is missing value then return ""
	return v as text
end clean

on joinFields(fields)
	set out to ""
	repeat with i from 1 to count of fields
		if i > 1 then set out to out & my fieldSep()
		set out to out & (item i of fields)
	end repeat
	return out
end joinFields

on encodeReply(statusText, rows)
	set out to statusText & my fieldSep() & ((count of rows) as text) & my recordSep()
	repeat with r in rows
		set out to out & (contents of r) & my recordSep()
	end repeat
	return out
end encodeReply

"#,
        field = FIELD_SEPARATOR as u32,
        record = RECORD_SEPARATOR as u32,
    )
}

const REMINDER_HANDLERS: &str = r#"on reminderRecord(r)
	tell application "Reminders"
		return my joinFields({my clean(name of r), my clean(body of r), (completed of r) as text})
	end tell
end reminderRecord

"#;

const CALENDAR_HANDLERS: &str = r#"on pad2(n)
	return text -2 thru -1 of ("0" & (n as integer))
end pad2

on makeDate(y, mo, d, h, mi, s)
	set theDate to current date
	set day of theDate to 1
	set year of theDate to y
	set month of theDate to mo
	set day of theDate to d
	set time of theDate to (h * hours + mi * minutes + s)
	return theDate
end makeDate

on wireDate(d)
	set t to time of d
	return ((year of d) as text) & "-" & my pad2(month of d as integer) & "-" & my pad2(day of d) & " " & my pad2(t div hours) & ":" & my pad2((t mod hours) div minutes) & ":" & my pad2(t mod minutes)
end wireDate

on eventRecord(e, calName)
	tell application "Calendar"
		return my joinFields({my clean(summary of e), my wireDate(start date of e), my wireDate(end date of e), calName, my clean(location of e), my clean(description of e)})
	end tell
end eventRecord

"#;
