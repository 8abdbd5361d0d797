//! In-memory stand-in for the Reminders and Calendar applications.
//!
//! Answers each [`Action`] in the same reply grammar the generated scripts
//! produce, so the bridge, parser and dispatcher run unmodified against it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{RawOutput, ScriptRunner};
use crate::bridge::script::{Action, AutomationCommand};
use crate::dates::format_wire;
use crate::error::BridgeResult;
use crate::parser::{FIELD_SEPARATOR, RECORD_SEPARATOR, STATUS_NOT_FOUND, STATUS_OK};
use crate::types::{CalendarEvent, Reminder};

struct FakeCalendar {
    name: String,
    writable: bool,
}

#[derive(Default)]
struct HostState {
    reminders: Vec<Reminder>,
    calendars: Vec<FakeCalendar>,
    events: Vec<CalendarEvent>,
}

pub struct FakeHost {
    state: Mutex<HostState>,
    delay: Mutex<Option<Duration>>,
    scripted: Mutex<VecDeque<RawOutput>>,
    executed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    /// A host with a read-only "Holidays" calendar followed by writable
    /// "Home" and "Work" calendars.
    pub fn new() -> Self {
        let calendars = [("Holidays", false), ("Home", true), ("Work", true)]
            .into_iter()
            .map(|(name, writable)| FakeCalendar {
                name: name.to_string(),
                writable,
            })
            .collect();
        Self {
            state: Mutex::new(HostState {
                calendars,
                ..HostState::default()
            }),
            delay: Mutex::new(None),
            scripted: Mutex::new(VecDeque::new()),
            executed: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every following execution sleeps this long before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().expect("delay lock") = delay;
    }

    /// Answer the next execution with this raw triple instead of simulating it.
    pub fn push_raw(&self, raw: RawOutput) {
        self.scripted.lock().expect("scripted lock").push_back(raw);
    }

    pub fn seed_reminder(&self, name: &str, body: Option<&str>, completed: bool) {
        self.state.lock().expect("state lock").reminders.push(Reminder {
            name: name.to_string(),
            body: body.map(str::to_string),
            completed,
        });
    }

    pub fn reminders(&self) -> Vec<Reminder> {
        self.state.lock().expect("state lock").reminders.clone()
    }

    pub fn executed_scripts(&self) -> Vec<String> {
        self.executed.lock().expect("executed lock").clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, action: &Action) -> String {
        let mut state = self.state.lock().expect("state lock");
        match action {
            Action::ListReminders => {
                let rows = state
                    .reminders
                    .iter()
                    .filter(|r| !r.completed)
                    .map(reminder_row)
                    .collect();
                reply(STATUS_OK, rows)
            }
            Action::GetReminder { name } => match state.reminders.iter().find(|r| &r.name == name) {
                Some(reminder) => reply(STATUS_OK, vec![reminder_row(reminder)]),
                None => reply(STATUS_NOT_FOUND, Vec::new()),
            },
            Action::CompleteReminder { name } => {
                match state.reminders.iter_mut().find(|r| &r.name == name) {
                    Some(reminder) => {
                        reminder.completed = true;
                        reply(STATUS_OK, vec![reminder_row(reminder)])
                    }
                    None => reply(STATUS_NOT_FOUND, Vec::new()),
                }
            }
            Action::DeleteReminder { name } => {
                match state.reminders.iter().position(|r| &r.name == name) {
                    Some(idx) => {
                        let removed = state.reminders.remove(idx);
                        reply(STATUS_OK, vec![reminder_row(&removed)])
                    }
                    None => reply(STATUS_NOT_FOUND, Vec::new()),
                }
            }
            Action::UpdateReminder { old_name, new_name } => {
                match state.reminders.iter_mut().find(|r| &r.name == old_name) {
                    Some(reminder) => {
                        reminder.name = new_name.clone();
                        reply(STATUS_OK, vec![reminder_row(reminder)])
                    }
                    None => reply(STATUS_NOT_FOUND, Vec::new()),
                }
            }
            Action::AddReminder { name, body } => {
                let reminder = Reminder {
                    name: name.clone(),
                    body: body.clone().filter(|b| !b.is_empty()),
                    completed: false,
                };
                let row = reminder_row(&reminder);
                state.reminders.push(reminder);
                reply(STATUS_OK, vec![row])
            }
            Action::ListCalendars => {
                let rows = state.calendars.iter().map(|c| c.name.clone()).collect();
                reply(STATUS_OK, rows)
            }
            Action::CreateEvent(event) => {
                let calendar = match &event.calendar_name {
                    Some(name) => state.calendars.iter().find(|c| &c.name == name),
                    None => state.calendars.iter().find(|c| c.writable),
                };
                let Some(calendar) = calendar else {
                    return reply(STATUS_NOT_FOUND, Vec::new());
                };
                let created = CalendarEvent {
                    title: event.title.clone(),
                    start: event.start,
                    end: event.end,
                    calendar_name: Some(calendar.name.clone()),
                    location: event.location.clone(),
                    notes: event.notes.clone(),
                };
                let row = event_row(&created);
                state.events.push(created);
                reply(STATUS_OK, vec![row])
            }
            Action::GetEvents(query) => {
                if let Some(name) = &query.calendar_name {
                    if !state.calendars.iter().any(|c| &c.name == name) {
                        return reply(STATUS_NOT_FOUND, Vec::new());
                    }
                }
                let rows = state
                    .events
                    .iter()
                    .filter(|e| match &query.calendar_name {
                        Some(name) => e.calendar_name.as_ref() == Some(name),
                        None => true,
                    })
                    .filter(|e| e.start <= query.end && e.end >= query.start)
                    .map(event_row)
                    .collect();
                reply(STATUS_OK, rows)
            }
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScriptRunner for FakeHost {
    fn id(&self) -> &str {
        "fake"
    }

    async fn execute(&self, command: &AutomationCommand) -> BridgeResult<RawOutput> {
        let started = Instant::now();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.executed
            .lock()
            .expect("executed lock")
            .push(command.script().to_string());

        let delay = *self.delay.lock().expect("delay lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.scripted.lock().expect("scripted lock").pop_front();
        if let Some(raw) = scripted {
            return Ok(raw);
        }
        let stdout = format!("{}\n", self.respond(command.action()));
        Ok(RawOutput {
            stdout,
            stderr: String::new(),
            exit_code: Some(0),
            elapsed: started.elapsed(),
        })
    }
}

fn reminder_row(reminder: &Reminder) -> String {
    join(&[
        reminder.name.as_str(),
        reminder.body.as_deref().unwrap_or(""),
        if reminder.completed { "true" } else { "false" },
    ])
}

fn event_row(event: &CalendarEvent) -> String {
    join(&[
        event.title.as_str(),
        &format_wire(&event.start),
        &format_wire(&event.end),
        event.calendar_name.as_deref().unwrap_or(""),
        event.location.as_deref().unwrap_or(""),
        event.notes.as_deref().unwrap_or(""),
    ])
}

fn join(fields: &[&str]) -> String {
    fields.join(FIELD_SEPARATOR.to_string().as_str())
}

fn reply(status: &str, rows: Vec<String>) -> String {
    let mut out = format!("{status}{FIELD_SEPARATOR}{}{RECORD_SEPARATOR}", rows.len());
    for row in rows {
        out.push_str(&row);
        out.push(RECORD_SEPARATOR);
    }
    out
}
