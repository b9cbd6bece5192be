//! Common types shared across Keyfold crates.
//!
//! This crate provides the single error taxonomy used throughout the
//! workspace, so every layer reports failures in one vocabulary.

pub mod error;

pub use error::{Error, Result};
