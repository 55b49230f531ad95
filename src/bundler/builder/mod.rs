//! Build orchestration.
//!
//! This module provides the [`Bundler`] orchestrator that turns a validated
//! [`Settings`](crate::bundler::Settings) into a `.pyz` archive.
//!
//! # Module Organization
//!
//! - `checksum` - SHA256 of the finished archive
//! - `orchestrator` - [`Bundler`] and the stage sequence
//! - [`outcome`] - [`BuildOutcome`], [`BundledArtifact`], [`PipelineState`]
//! - [`tool_detection`] - locating the package manager interpreter

mod checksum;
mod orchestrator;
mod outcome;
mod tool_detection;

pub use checksum::calculate_sha256;
pub use orchestrator::Bundler;
pub use outcome::{BuildOutcome, BundledArtifact, PipelineState};
pub use tool_detection::locate_executable;
