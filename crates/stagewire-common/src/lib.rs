//! # stagewire-common
//!
//! Shared error definitions, configuration model, primitive types, and
//! constants used across the Stagewire workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the vocabulary that the engine, the SDK and
//! the CLI all speak.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
