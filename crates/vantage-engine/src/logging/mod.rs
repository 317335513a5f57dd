//! Logging setup.
//!
//! Library code logs through the `log` facade only; binaries call `init_logging`
//! once to install the `env_logger` backend.

mod init;

pub use init::{init_logging, LoggingConfig};
