//! Replay of ledger entries against a live store.

mod report;
mod runner;

pub use report::{ActionOutcome, ActionTarget, ApplyAction, ApplyReport, SkipReason};
pub use runner::{MigrationApplier, PropertyScope};
