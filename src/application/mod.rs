//! Application layer (use-cases, policies).
//!
//! Turns parsed diffs into the aligned row model and projects it onto the two
//! panes, without depending on any UI framework.

pub mod projection;
pub mod rows;
