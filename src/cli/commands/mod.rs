//! CLI command implementations.

pub mod dashboard;
pub mod history;
pub mod run;
pub mod snapshot;
pub mod validate;
