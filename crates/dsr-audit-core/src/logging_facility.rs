//! Structured logging facility for the audit engine
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use dsr_audit_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```
//!
//! ## Logging Ownership
//!
//! The recorder owns lifecycle events (`start`/`end`/`end_error`) for the
//! operations it orchestrates. The comparator and shortcut log only
//! `tracing::debug!` detail and a `warn!` when the depth guard trips.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
