//! Foundational data structures, error types, profiles and section definitions.

pub mod error;
pub mod models;
pub mod options;
pub mod profile;
pub mod sections;
