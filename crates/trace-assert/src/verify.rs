//! Trace verifiers.
//!
//! Every verifier is a pure function of the event list and one spec
//! fragment, and reports only the first violation it finds.

use log::warn;
use serde_json::Value;

use crate::error::AssertionFailure;
use crate::event::{Event, Pattern, Trace};
use crate::matcher::matches;
use crate::spec::{Assertion, CountRule};

/// Outcome of a single verifier.
pub type Check = Result<(), AssertionFailure>;

// ─── Ordered subsequence ──────────────────────────────────────

/// Event indices matched by each required pattern, in trace order.
///
/// Each pattern takes the first match at or after the cursor, and the cursor
/// moves past it, so the returned indices are strictly increasing.
pub fn ordered_positions(
    events: &[Event],
    required: &[Pattern],
) -> Result<Vec<usize>, AssertionFailure> {
    let mut positions = Vec::with_capacity(required.len());
    let mut cursor = 0;

    for pattern in required {
        let found = events[cursor..].iter().position(|e| matches(e, pattern));
        match found {
            Some(offset) => {
                positions.push(cursor + offset);
                cursor += offset + 1;
            }
            None => {
                return Err(AssertionFailure::MissingEvent {
                    pattern: pattern.clone(),
                })
            }
        }
    }

    Ok(positions)
}

/// Required patterns must appear in the trace in list order (not
/// necessarily adjacent).
pub fn verify_ordered(events: &[Event], required: &[Pattern]) -> Check {
    ordered_positions(events, required).map(|_| ())
}

// ─── Unordered subsequence ────────────────────────────────────

/// Event index claimed by each required pattern, in pattern order.
///
/// Greedy first-fit: a pattern claims the earliest unused match, even when a
/// later pattern needed that same event and another assignment would have
/// satisfied both. Existing specs rely on this exact failure behavior.
pub fn unordered_assignment(
    events: &[Event],
    required: &[Pattern],
) -> Result<Vec<usize>, AssertionFailure> {
    let mut used = vec![false; events.len()];
    let mut assignment = Vec::with_capacity(required.len());

    for pattern in required {
        let found = events
            .iter()
            .enumerate()
            .find(|(i, e)| !used[*i] && matches(e, pattern))
            .map(|(i, _)| i);

        match found {
            Some(i) => {
                used[i] = true;
                assignment.push(i);
            }
            None => {
                return Err(AssertionFailure::MissingEvent {
                    pattern: pattern.clone(),
                })
            }
        }
    }

    Ok(assignment)
}

/// Required patterns must each claim a distinct event, in any order.
pub fn verify_unordered(events: &[Event], required: &[Pattern]) -> Check {
    unordered_assignment(events, required).map(|_| ())
}

// ─── Call counts ──────────────────────────────────────────────

/// Each complete `{fn, min}` rule needs at least `min` events named `fn`.
///
/// Incomplete rules are skipped with a warning. Stops at the first rule
/// that is violated.
pub fn verify_counts(events: &[Event], rules: &[CountRule]) -> Check {
    for rule in rules {
        let Some((function, min)) = rule.resolved() else {
            warn!("skipping incomplete min_calls rule: {rule:?}");
            continue;
        };

        let got = events.iter().filter(|e| e.function == function).count() as u64;
        if got < min {
            return Err(AssertionFailure::TooFewCalls {
                function: function.to_string(),
                expected: min,
                got,
            });
        }
    }

    Ok(())
}

// ─── Exact trace ──────────────────────────────────────────────

/// Whole-document structural equality, metadata and event order included.
///
/// Works on the raw parsed documents; event contents are never validated.
pub fn verify_exact(actual: &Value, expected: &Value) -> bool {
    actual == expected
}

// ─── Dispatch ─────────────────────────────────────────────────

/// Subsequence check (ordered or not), then call counts.
pub fn verify_contains(
    events: &[Event],
    required: &[Pattern],
    ordered: bool,
    min_calls: &[CountRule],
) -> Check {
    if ordered {
        verify_ordered(events, required)?;
    } else {
        verify_unordered(events, required)?;
    }
    verify_counts(events, min_calls)
}

/// Run the verifiers an assertion calls for.
///
/// `expected` is only consulted for [`Assertion::Exact`]; passing `None`
/// there is a mismatch.
pub fn verify(actual: &Trace, assertion: Assertion<'_>, expected: Option<&Trace>) -> Check {
    match assertion {
        Assertion::Exact => match expected {
            Some(expected) if verify_exact(actual.document(), expected.document()) => Ok(()),
            _ => Err(AssertionFailure::TraceMismatch),
        },
        Assertion::Contains {
            required,
            ordered,
            min_calls,
        } => verify_contains(actual.events(), required, ordered, min_calls),
    }
}
