pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod harness;
pub mod report;
pub mod runner;

pub use config::RunnerConfig;
pub use error::RunError;
pub use harness::{CommandHarness, Harness, Invocation};
pub use report::{RunSummary, SpecOutcome, Verdict};
pub use runner::{Runner, Stage};
