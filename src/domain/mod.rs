//! Domain types for diffpane.
//! Defines the structured diff model and the derived visual model.

pub mod diff;
pub mod error;
pub mod visual;

pub use diff::*;
pub use error::*;
pub use visual::*;
