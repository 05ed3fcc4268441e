#![deny(unsafe_code)]

//! Shared test utilities for the Keel workspace.
//!
//! Provides reusable element fixtures, event recorders, and tracing helpers
//! so that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! keel-test-utils = { workspace = true }
//! ```

pub mod fixtures;
pub mod recorder;
pub mod tracing_setup;
