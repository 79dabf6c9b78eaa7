//! Core types: errors and tool settings.

pub mod config;
pub mod errors;
