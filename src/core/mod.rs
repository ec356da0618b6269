//! Core application functionality
//!
//! This module contains the application-level pieces around the font
//! transforms: CLI and settings handling, errors, the version type and the
//! build pipeline that ties the stages together.

pub mod cli;
pub mod config_file;
pub mod errors;
pub mod pipeline;
pub mod platform;
pub mod version;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config_file::{BuildConfig, CompilerConfig, VariantConfig};
pub use errors::{BuildContext, BuildResult, ReferenceKind, SourceError};
pub use pipeline::{build, prepare_source, BuildRequest, BuildSummary, PreparedSource};
pub use version::FontVersion;
