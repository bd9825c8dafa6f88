//! # fingerprinter common library
//!
//! Shared code for the fingerprinter tools:
//! - Configuration loading and settings resolution
//! - Common error types

pub mod config;
pub mod error;

pub use error::{Error, Result};
