#![forbid(unsafe_code)]

//! Artifact Sweeper (asweep) removes old artifacts from an Artifactory
//! instance through the JFrog CLI.
//!
//! One run:
//! 1. **Locate**: a time-windowed AQL query lists candidate artifacts
//! 2. **Plan**: glob exclusions protect paths from deletion
//! 3. **Execute**: a bounded worker pool issues one delete per path
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use artifact_sweeper::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use artifact_sweeper::core::config::Config;
//! use artifact_sweeper::scanner::exclusion::ExclusionSet;
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod remote;
pub mod scanner;
