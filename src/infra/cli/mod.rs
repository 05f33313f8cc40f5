//! CLI infrastructure for diffpane.
//!
//! Provides diff acquisition and full-file loading for the viewer binary.

pub mod diff;
