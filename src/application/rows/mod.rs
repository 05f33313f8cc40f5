//! Visual row building: merges a parsed file with optional full contents into
//! one ordered row sequence, and groups per-row connectors into runs.

mod builder;
mod grouping;

pub use builder::{FullContents, build_rows};
pub use grouping::group_connectors;

#[cfg(test)]
mod tests;
