//! Zipapp bundling library.
//!
//! Packages a Python source tree, plus the dependencies listed in its
//! requirements manifest, into a single `.pyz` archive that the Python
//! runtime can execute directly.
//!
//! # Example
//!
//! ```no_run
//! use zipapp_bundler::bundler::{BuildOutcome, Bundler, SettingsBuilder};
//! use zipapp_bundler::bundler::status::RecordingSink;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> zipapp_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .source("my_project")
//!     .entry("my_project.cli:main")
//!     .index_url("https://pypi.org/simple")
//!     .launcher(true)
//!     .build()?;
//!
//! let status = RecordingSink::new();
//! if let BuildOutcome::Success(artifact) =
//!     Bundler::new(settings).run(&CancellationToken::new(), &status).await
//! {
//!     println!("{} ({} bytes)", artifact.path.display(), artifact.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod exclude;
pub mod settings;
pub mod status;
pub mod utils;
pub mod zipapp;

pub use builder::{BuildOutcome, BundledArtifact, Bundler, PipelineState};
pub use error::{Error, Result};
pub use exclude::{ExcludePattern, ExcludeSet};
pub use settings::{Settings, SettingsBuilder, ValidationErrors};
pub use status::{StatusLevel, StatusSink};
pub use zipapp::EntryPoint;
