//! Dual-sink logging: console + timestamped run log, written by one thread.

pub mod dual;
pub mod file;
