//! Infrastructure layer (adapters/implementations).
//!
//! This module contains the IO-facing pieces (git, filesystem, configuration)
//! and the text-level diff handling shared by them.

pub mod app_config;
pub mod cli;
pub mod diff;
pub mod hash;
