//! Logging setup: `tracing` with an `EnvFilter` read from `VIGIL_LOG`.

pub mod setup;

pub use setup::{init_tracing, DEFAULT_FILTER, LOG_ENV_VAR};
