//! Observability subsystem.
//!
//! Structured log events go to stderr; stdout is reserved for the JSON
//! results of a run.

pub mod logging;

pub use logging::init_logging;
