//! Zipapp packaging stages.
//!
//! Each stage is a free function over paths and plain options; the
//! [`Bundler`](crate::bundler::Bundler) orchestrator sequences them.
//!
//! 1. [`staging`]: filtered copy of the source tree
//! 2. [`deps`]: `pip install --target` into the staged tree
//! 3. [`cleanup`]: strip installer metadata and bytecode
//! 4. [`bootstrap`]: self-extracting entry shim
//! 5. [`archive`]: write the `.pyz`
//! 6. [`launcher`]: optional `.vbs` desktop launcher

pub mod archive;
pub mod bootstrap;
pub mod cleanup;
pub mod deps;
mod entry;
pub mod launcher;
pub mod staging;
mod template;

pub use entry::EntryPoint;
