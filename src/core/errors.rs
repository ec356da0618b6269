//! Error types and context helpers
//!
//! Domain errors are `thiserror` enums so callers and tests can match on
//! them; everything at the application boundary travels as `anyhow::Error`
//! with file context attached through [`BuildContext`].

use std::fmt;
use std::path::Path;

use anyhow::Context;
use thiserror::Error;

/// Result type used by the pipeline and the CLI
pub type BuildResult<T> = anyhow::Result<T>;

/// Fatal problems with the font source or the build inputs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("malformed version string '{0}': expected MAJOR.MINOR, e.g. 1.234")]
    MalformedVersion(String),

    #[error("glyph '{0}' is required but missing from the font")]
    MissingGlyph(String),

    #[error("{kind} references glyph '{name}' which does not exist")]
    DanglingReference { kind: ReferenceKind, name: String },

    #[error("glyph '{0}' has no outline to measure")]
    EmptyOutline(String),

    #[error("'{0}' is not a valid glyph name")]
    InvalidGlyphName(String),

    #[error("invalid codepoint range '{0}': expected hex like 0627 or 0600-06FF")]
    InvalidCodepointRange(String),
}

/// Where a dangling glyph reference was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    GlyphOrder,
    Group(String),
    Kerning,
    Component(String),
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::GlyphOrder => write!(f, "glyph order"),
            ReferenceKind::Group(group) => write!(f, "group '{group}'"),
            ReferenceKind::Kerning => write!(f, "kerning"),
            ReferenceKind::Component(glyph) => write!(f, "a component of glyph '{glyph}'"),
        }
    }
}

/// Attach "failed to <operation> <path>" context to fallible file operations
pub trait BuildContext<T> {
    fn with_file_context(self, operation: &str, path: &Path) -> BuildResult<T>;
}

impl<T, E> BuildContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_file_context(self, operation: &str, path: &Path) -> BuildResult<T> {
        self.with_context(|| format!("Failed to {operation} {}", path.display()))
    }
}

/// Check that a path looks like a UFO directory before handing it to norad
pub fn validate_ufo_path(path: &Path) -> BuildResult<()> {
    if !path.exists() {
        anyhow::bail!(
            "Font source does not exist: {}\nMake sure the path is correct.",
            path.display()
        );
    }
    if !path.is_dir() {
        anyhow::bail!("Not a UFO directory: {}", path.display());
    }
    if !path.join("metainfo.plist").exists() {
        anyhow::bail!(
            "Not a valid UFO directory: missing metainfo.plist in {}",
            path.display()
        );
    }
    Ok(())
}
