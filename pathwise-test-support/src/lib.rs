//! Shared test utilities for the pathwise crates.
//!
//! [`tracing::RecordingLayer`] captures spans and events so suites can assert
//! on instrumentation, and [`profile::ProptestRunProfile`] gives every
//! property suite the same environment-driven case count and fork policy.

pub mod profile;
pub mod tracing;
