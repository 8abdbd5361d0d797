//! Date/time normalization between the wire format, AppleScript dates and
//! the human-readable projections of "now".
//!
//! The human-readable projection is rendered in the clock's locale. The
//! system clock takes it from `LC_ALL`, `LC_TIME` or `LANG`, in that order.
//!
//! Wire dates are `YYYY-MM-DD HH:MM:SS` in the host's local wall-clock time.
//! They are kept as [`NaiveDateTime`] because the host applications interpret
//! them in their own local zone.

use chrono::{
    DateTime, Datelike, FixedOffset, Local, Locale, NaiveDateTime, SecondsFormat, SubsecRound,
    Timelike,
};

use crate::error::{BridgeError, BridgeResult};
use crate::types::{TimeComponents, TimeSnapshot};

pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const WIRE_LEN: usize = 19;
const MIN_YEAR: &str = "1000";

pub const DEFAULT_LOCALE: Locale = Locale::en_US;
const US_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M:%S %p";
const INTERNATIONAL_FORMAT: &str = "%A, %-d %B %Y, %H:%M:%S";
const LOCALE_ENV: [&str; 3] = ["LC_ALL", "LC_TIME", "LANG"];

/// Source of "now" and of the locale it is presented in. Injected so
/// snapshots are reproducible in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn locale(&self) -> Locale {
        DEFAULT_LOCALE
    }
}

/// Reads the host clock in the host's local zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    locale: Locale,
}

impl SystemClock {
    /// Captures the host locale once, at construction.
    pub fn new() -> Self {
        Self {
            locale: host_locale(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset().trunc_subsecs(0)
    }

    fn locale(&self) -> Locale {
        self.locale
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
    locale: Locale,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant,
            locale: DEFAULT_LOCALE,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    fn locale(&self) -> Locale {
        self.locale
    }
}

/// Locale named by the first non-empty of `LC_ALL`, `LC_TIME` and `LANG`.
/// Unknown names, `C` and `POSIX` fall back to `en_US`.
pub fn host_locale() -> Locale {
    LOCALE_ENV
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| parse_locale(&value))
        .unwrap_or(DEFAULT_LOCALE)
}

/// Parse a POSIX locale name such as `de_DE.UTF-8` or `sr_RS@latin`.
pub fn parse_locale(value: &str) -> Option<Locale> {
    let name = value.split(['.', '@']).next()?;
    if name.is_empty() || name == "C" || name == "POSIX" {
        return None;
    }
    Locale::try_from(name).ok()
}

fn human_format(locale: Locale) -> &'static str {
    if locale == Locale::en_US {
        US_FORMAT
    } else {
        INTERNATIONAL_FORMAT
    }
}

/// Parse a wire-format date. `field` names the argument in error messages.
pub fn parse_wire(value: &str, field: &str) -> BridgeResult<NaiveDateTime> {
    if !has_wire_shape(value) {
        return Err(BridgeError::validation(format!(
            "{field} must match YYYY-MM-DD HH:MM:SS, got {value:?}"
        )));
    }
    if &value[..4] < MIN_YEAR {
        return Err(BridgeError::validation(format!(
            "{field} must have a four-digit year from {MIN_YEAR}, got {value:?}"
        )));
    }
    NaiveDateTime::parse_from_str(value, WIRE_FORMAT).map_err(|error| {
        BridgeError::validation(format!("{field} is not a valid date/time ({value:?}): {error}"))
    })
}

pub fn format_wire(value: &NaiveDateTime) -> String {
    value.format(WIRE_FORMAT).to_string()
}

/// Rejects ranges whose end precedes their start.
pub fn ensure_ordered(start: &NaiveDateTime, end: &NaiveDateTime) -> BridgeResult<()> {
    if end < start {
        return Err(BridgeError::validation(format!(
            "end_date {} is earlier than start_date {}",
            format_wire(end),
            format_wire(start)
        )));
    }
    Ok(())
}

/// Checks every digit position and separator. chrono alone accepts unpadded
/// fields and leap seconds.
fn has_wire_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != WIRE_LEN {
        return false;
    }
    let separators_ok = bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b' '
        && bytes[13] == b':'
        && bytes[16] == b':';
    let digits_ok = bytes
        .iter()
        .enumerate()
        .filter(|(idx, _)| ![4, 7, 10, 13, 16].contains(idx))
        .all(|(_, byte)| byte.is_ascii_digit());
    separators_ok && digits_ok && &value[17..19] <= "59"
}

/// AppleScript expression building `value` with the script-local `makeDate`
/// handler. Only integers are interpolated.
pub fn applescript_date(value: &NaiveDateTime) -> String {
    format!(
        "my makeDate({}, {}, {}, {}, {}, {})",
        value.year(),
        value.month(),
        value.day(),
        value.hour(),
        value.minute(),
        value.second()
    )
}

/// Capture every projection of `now` from a single reading of the clock.
pub fn snapshot(clock: &dyn Clock) -> TimeSnapshot {
    let now = clock.now();
    let locale = clock.locale();
    TimeSnapshot {
        iso: now.to_rfc3339_opts(SecondsFormat::Secs, false),
        locale: now.format_localized(human_format(locale), locale).to_string(),
        wire: now.format(WIRE_FORMAT).to_string(),
        timestamp: now.timestamp(),
        utc_offset: now.format("%:z").to_string(),
        components: TimeComponents {
            year: now.year(),
            month: now.month(),
            day: now.day(),
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
            weekday: now.format("%A").to_string(),
        },
    }
}

/// Serde adapter for wire-format dates.
pub mod wire_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_wire(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_wire(&raw, "date").map_err(serde::de::Error::custom)
    }
}
