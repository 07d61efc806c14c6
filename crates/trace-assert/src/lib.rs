pub mod error;
pub mod event;
pub mod matcher;
pub mod spec;
pub mod verify;

pub use error::{AssertionFailure, ModelError};
pub use event::{Event, Pattern, Trace};
pub use matcher::matches;
pub use spec::{Assertion, CountRule, ExpectedMode, RenderMode, TraceSpec};
pub use verify::{
    verify, verify_contains, verify_counts, verify_exact, verify_ordered, verify_unordered, Check,
};
