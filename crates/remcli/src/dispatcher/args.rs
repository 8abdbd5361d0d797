use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use super::OperationSpec;
use crate::dates::parse_wire;
use crate::error::{BridgeError, BridgeResult};
use crate::parser::{FIELD_SEPARATOR, RECORD_SEPARATOR};

/// Arguments that identify something and so may not be blank.
const NAME_ARGUMENTS: &[&str] = &["name", "old_name", "new_name", "title", "calendar_name"];

/// Arguments of one call, checked against the operation's schema.
#[derive(Debug)]
pub(super) struct Args<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> Args<'a> {
    pub(super) fn parse(spec: &OperationSpec, raw: &'a Map<String, Value>) -> BridgeResult<Self> {
        let mut values = HashMap::new();
        for (key, value) in raw {
            if !spec.accepts(key) {
                return Err(BridgeError::validation(format!(
                    "{} does not accept argument {key:?}",
                    spec.name
                )));
            }
            let text = match value {
                Value::Null => continue,
                Value::String(text) => text.as_str(),
                other => {
                    return Err(BridgeError::validation(format!(
                        "argument {key:?} must be a string, got {}",
                        json_type_name(other)
                    )))
                }
            };
            if text.contains([RECORD_SEPARATOR, FIELD_SEPARATOR]) {
                return Err(BridgeError::validation(format!(
                    "argument {key:?} contains a reserved control character"
                )));
            }
            if NAME_ARGUMENTS.contains(&key.as_str()) && text.trim().is_empty() {
                return Err(BridgeError::validation(format!(
                    "argument {key:?} must not be empty"
                )));
            }
            values.insert(key.as_str(), text);
        }
        if let Some(missing) = spec.required.iter().find(|name| !values.contains_key(**name)) {
            return Err(BridgeError::validation(format!(
                "{} requires argument {missing:?}",
                spec.name
            )));
        }
        Ok(Self { values })
    }

    pub(super) fn required(&self, name: &str) -> BridgeResult<&'a str> {
        self.optional(name)
            .ok_or_else(|| BridgeError::validation(format!("missing argument {name:?}")))
    }

    pub(super) fn optional(&self, name: &str) -> Option<&'a str> {
        self.values.get(name).copied()
    }

    pub(super) fn date(&self, name: &str) -> BridgeResult<NaiveDateTime> {
        parse_wire(self.required(name)?, name)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
