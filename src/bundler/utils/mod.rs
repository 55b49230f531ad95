//! Shared helpers for the packaging stages.

pub mod fs;
