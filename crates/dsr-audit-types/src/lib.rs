//! Core types shared across the DSR audit facilities
//!
//! This crate provides foundational types used by the error, logging and
//! audit-entry layers:
//!
//! - **Correlation types**: RequestId, EntryId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{EntryId, RequestId};
