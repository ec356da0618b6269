//! UFO file I/O operations

use std::path::Path;

use norad::Font;

use crate::core::errors::{validate_ufo_path, BuildContext, BuildResult};

/// Load a UFO font file from disk
pub fn load_ufo_from_path(path: impl AsRef<Path>) -> BuildResult<Font> {
    let path = path.as_ref();
    validate_ufo_path(path)?;
    let font = Font::load(path).with_file_context("load", path)?;
    tracing::debug!(
        "Loaded UFO {} with {} glyphs",
        path.display(),
        font.default_layer().len()
    );
    Ok(font)
}

/// Write a UFO to disk, replacing whatever is at `path`
pub fn save_ufo_to_path(font: &Font, path: impl AsRef<Path>) -> BuildResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_file_context("create", parent)?;
    }
    font.save(path).with_file_context("save", path)?;
    tracing::debug!("Saved UFO to {}", path.display());
    Ok(())
}
