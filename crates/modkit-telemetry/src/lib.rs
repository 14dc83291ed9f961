//! modkit Telemetry - logging setup for modkit hosts.
//!
//! Wraps `tracing-subscriber` with a serializable [`LogConfig`]: level and
//! per-crate directives, pretty/compact/JSON output, and stdout, stderr or
//! rolling-file targets.
//!
//! # Example
//!
//! ```rust,no_run
//! use modkit_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), modkit_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("modkit_loader=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("Loading mods");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
