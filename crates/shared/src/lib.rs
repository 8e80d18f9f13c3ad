//! # dashboard-shared
//!
//! Foundational types shared by the dashboard configuration crates:
//!
//! - Error envelope with stable, namespaced error codes
//! - Secret detection and redaction for env-sourced credentials
//! - A proof wrapper for values that passed boundary validation
//!
//! This crate only depends on external crates.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod redaction;
pub mod validation;

pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, REDACTED_VALUE};
pub use redaction::{REDACTED, SecretString, is_secret_key, redact_if_secret};
pub use validation::Validated;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
