use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

// ─── Event ─────────────────────────────────────────────────────

/// One recorded host-function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub frame: u64,
    #[serde(rename = "fn")]
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ret: Option<Value>,
}

impl Event {
    pub fn new(frame: u64, function: &str, args: Vec<Value>) -> Self {
        Event {
            frame,
            function: function.to_string(),
            args,
            ret: None,
        }
    }

    pub fn with_ret(mut self, ret: Value) -> Self {
        self.ret = Some(ret);
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "[frame {}] {}({})", self.frame, self.function, args.join(", "))?;
        if let Some(ret) = &self.ret {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}

// ─── Pattern ───────────────────────────────────────────────────

/// A partial event used as a match predicate. Absent fields are wildcards.
///
/// Field values are kept as raw JSON. A key written as `null` is set, not
/// absent, and a value of the wrong type is a pattern that matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pattern {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub frame: Option<Value>,
    #[serde(
        rename = "fn",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub function: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub ret: Option<Value>,
}

/// Any value of a present key, `null` included.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Pattern {
    /// Pattern matching any event with the given function name.
    pub fn function(name: &str) -> Self {
        Pattern {
            function: Some(Value::from(name)),
            ..Pattern::default()
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(Value::Array(args));
        self
    }

    pub fn with_frame(mut self, frame: u64) -> Self {
        self.frame = Some(Value::from(frame));
        self
    }

    /// `Value::Null` requires the event to have no return value.
    pub fn with_ret(mut self, ret: Value) -> Self {
        self.ret = Some(ret);
        self
    }

    /// The function name, if the pattern sets one as a string.
    pub fn function_name(&self) -> Option<&str> {
        self.function.as_ref().and_then(Value::as_str)
    }
}

/// The fully specified pattern of an event: every field set.
impl From<&Event> for Pattern {
    fn from(event: &Event) -> Self {
        Pattern {
            frame: Some(Value::from(event.frame)),
            function: Some(Value::from(event.function.as_str())),
            args: Some(Value::Array(event.args.clone())),
            ret: Some(event.ret.clone().unwrap_or(Value::Null)),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// ─── Trace ─────────────────────────────────────────────────────

/// A loaded trace document.
///
/// Keeps the raw document for whole-trace comparison alongside the typed
/// event list used by the pattern verifiers. Never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    document: Value,
    events: Vec<Event>,
}

impl Trace {
    /// Parse a trace from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(document)
    }

    /// Build a trace from an already-parsed document.
    ///
    /// A document without `events` has no events. Frames must be
    /// non-decreasing.
    pub fn from_value(document: Value) -> Result<Self, ModelError> {
        let obj = document.as_object().ok_or(ModelError::NotAnObject)?;

        let events = match obj.get("events") {
            None => Vec::new(),
            Some(Value::Array(items)) => {
                let mut events = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let event = Event::deserialize(item)
                        .map_err(|source| ModelError::InvalidEvent { index, source })?;
                    events.push(event);
                }
                events
            }
            Some(_) => return Err(ModelError::EventsNotArray),
        };

        for (index, pair) in events.windows(2).enumerate() {
            if pair[1].frame < pair[0].frame {
                return Err(ModelError::FrameRegression {
                    index: index + 1,
                    frame: pair[1].frame,
                    previous: pair[0].frame,
                });
            }
        }

        Ok(Trace { document, events })
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The raw parsed document, metadata included.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Look up a top-level metadata field (anything other than `events`).
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        if key == "events" {
            return None;
        }
        self.document.get(key)
    }
}
