use serde_json::Value;

use crate::event::{Event, Pattern};

/// Decide whether `event` satisfies `pattern`.
///
/// Every field the pattern sets must be exactly equal on the event, with no
/// coercion between JSON types. `args` compares the whole list: same length,
/// same value at every position. A `ret` of `null` matches an event with no
/// return value.
pub fn matches(event: &Event, pattern: &Pattern) -> bool {
    if let Some(frame) = &pattern.frame {
        if frame.as_u64() != Some(event.frame) {
            return false;
        }
    }

    if let Some(function) = &pattern.function {
        if function.as_str() != Some(event.function.as_str()) {
            return false;
        }
    }

    if let Some(ret) = &pattern.ret {
        if event.ret.as_ref().unwrap_or(&Value::Null) != ret {
            return false;
        }
    }

    if let Some(args) = &pattern.args {
        match args {
            Value::Array(args) if *args == event.args => {}
            _ => return false,
        }
    }

    true
}
