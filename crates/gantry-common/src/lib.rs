//! # gantry-common
//!
//! Shared error definitions, generator options, and constants used across
//! the entire gantry workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives the loader, the code
//! generator, and the CLI build upon.

pub mod config;
pub mod constants;
pub mod error;
