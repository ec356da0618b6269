//! OpenType feature source handling
//!
//! Feature text comes from two places: the hand-written feature file given
//! on the command line, and whatever the UFO already carries (including
//! rules appended by glyph synthesis). The external file is always placed
//! first so its `languagesystem` statements precede any lookup.

pub mod preprocess;
pub mod rules;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::font_source::FontSource;

pub use preprocess::Preprocessor;
pub use rules::{stroke_glyph_name, StrokeRules, StrokeSubstitution};

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("failed to read feature file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unexpected #{directive} in {origin} at line {line}")]
    UnexpectedDirective {
        directive: String,
        origin: String,
        line: usize,
    },
    #[error("#{directive} without an argument in {origin} at line {line}")]
    MissingArgument {
        directive: String,
        origin: String,
        line: usize,
    },
    #[error("conditional block opened in {origin} at line {line} is never closed")]
    Unterminated { origin: String, line: usize },
    #[error("includes nested too deeply at {}", .0.display())]
    IncludeDepth(PathBuf),
}

/// Read and preprocess an external feature file with the given macros defined
pub fn load_external_features<S: AsRef<str>>(
    path: &Path,
    defines: &[S],
) -> Result<String, FeatureError> {
    let mut preprocessor = Preprocessor::new();
    for name in defines {
        preprocessor.define(name.as_ref());
    }
    preprocessor.process_file(path)
}

/// Prepend external feature text to the source's own features
pub fn merge_features(source: &mut FontSource, external: &str) {
    let resident = source.features().to_string();
    let resident_len = resident.len();
    let merged = match (external.trim().is_empty(), resident.trim().is_empty()) {
        (true, _) => resident,
        (false, true) => external.to_string(),
        (false, false) if external.ends_with('\n') => format!("{external}{resident}"),
        (false, false) => format!("{external}\n{resident}"),
    };
    tracing::debug!(
        "Merged {} bytes of external features with {} bytes resident",
        external.len(),
        resident_len
    );
    source.set_features(merged);
}
