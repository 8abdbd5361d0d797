//! Classifies the outcome of one script execution into the error taxonomy.

use std::time::Duration;

use crate::error::BridgeError;
use crate::platform::RawOutput;

/// AppleScript error numbers with a dedicated classification.
const APPLE_EVENT_TIMED_OUT: i32 = -1712;
const CANT_GET_OBJECT: i32 = -1728;
const INVALID_INDEX: i32 = -1719;

/// Result of classifying a raw triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// Clean exit; stdout is handed to the parser.
    Success(&'a str),
    Failure(BridgeError),
}

/// Classify a finished execution. `bound` is the execution timeout it ran under.
pub fn classify(raw: &RawOutput, bound: Duration) -> Outcome<'_> {
    if raw.elapsed > bound {
        return Outcome::Failure(timed_out(bound));
    }
    let stderr = raw.stderr.trim();
    if raw.exit_code == Some(0) && stderr.is_empty() {
        return Outcome::Success(&raw.stdout);
    }
    Outcome::Failure(classify_failure(stderr, raw.exit_code))
}

pub fn timed_out(bound: Duration) -> BridgeError {
    BridgeError::Timeout(format!(
        "automation command exceeded {} ms",
        bound.as_millis()
    ))
}

fn classify_failure(stderr: &str, exit_code: Option<i32>) -> BridgeError {
    let diagnostic = if stderr.is_empty() {
        match exit_code {
            Some(code) => format!("osascript exited with status {code}"),
            None => "osascript was terminated by a signal".to_string(),
        }
    } else {
        stderr.to_string()
    };
    match applescript_error_number(stderr) {
        Some(APPLE_EVENT_TIMED_OUT) => BridgeError::Timeout(diagnostic),
        Some(CANT_GET_OBJECT) | Some(INVALID_INDEX) => BridgeError::NotFound(diagnostic),
        _ => BridgeError::Automation(diagnostic),
    }
}

/// Extract the trailing `(-NNNN)` error number osascript prints, e.g.
/// `execution error: Reminders got an error: ... (-1728)`.
pub fn applescript_error_number(stderr: &str) -> Option<i32> {
    let trimmed = stderr.trim_end();
    let inner = trimmed.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let number = &inner[open + 1..];
    if !number.starts_with('-') {
        return None;
    }
    number.parse().ok()
}
