//! Build configuration file handling
//!
//! Settings come from the file named by `--config`, or from
//! `~/.config/fontsmith/settings.json` when that exists. Every field has a
//! default, so a partial file (or none at all) is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{BuildContext, BuildResult, SourceError};

/// Build configuration from settings.json
///
/// These settings are overridden by CLI arguments where both exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Authored stroke glyphs to derive width-bucketed copies from
    pub stroke_bases: Vec<String>,
    /// Export production glyph names to the compiled font
    pub production_names: bool,
    pub compiler: CompilerConfig,
    /// Subsetter executable used for the variant build
    pub subsetter: String,
    pub variant: VariantConfig,
    /// Also write logs to a dated file in the logs directory
    pub log_to_file: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            stroke_bases: vec!["overlinecomb".to_string(), "lowlinecomb".to_string()],
            production_names: true,
            compiler: CompilerConfig::default(),
            subsetter: "pyftsubset".to_string(),
            variant: VariantConfig::default(),
            log_to_file: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// `fontc` executable; produces TrueType outlines
    pub fontc: String,
    /// Command producing CFF outlines, invoked as `<cmd> <ufo> -o <output>`
    pub cff_command: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            fontc: "fontc".to_string(),
            cff_command: None,
        }
    }
}

/// Settings for the variant derivation path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    /// Macro defined while preprocessing the feature file
    pub define: String,
    /// Appended to family, full and PostScript names
    pub name_suffix: String,
    pub sample_text: String,
    /// Ascender written to hhea, OS/2 typo and OS/2 win metrics
    pub ascender: i32,
    /// Scale factor applied to `marks`
    pub scale: f64,
    pub marks: Vec<String>,
    /// Retained codepoints, as `"0627"` or `"0600-06FF"`
    pub codepoints: Vec<String>,
}

impl Default for VariantConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            define: "VARIANT".to_string(),
            name_suffix: " Quran".to_string(),
            sample_text: "بِسۡمِ ٱللَّهِ ٱلرَّحۡمَٰنِ ٱلرَّحِيمِ".to_string(),
            ascender: 1124,
            scale: 1.5,
            marks: strings(&[
                "fatha-ar",
                "damma-ar",
                "kasra-ar",
                "fathatan-ar",
                "dammatan-ar",
                "kasratan-ar",
                "shadda-ar",
                "sukun-ar",
            ]),
            codepoints: strings(&[
                "0020", "0021", "0028", "0029", "002E", "0030-0039", "003A", "005B", "005D",
                "00A0", "00AB", "00BB", "0600-06FF", "0750-077F", "08A0-08FF", "200C-200F",
                "2010", "25CC", "FC5E-FC63", "FD3E", "FD3F", "FDF2", "FDFA", "FDFD",
                "FE70-FE7F",
            ]),
        }
    }
}

impl BuildConfig {
    /// Get the path to the fontsmith config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join("fontsmith")
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Get the path to the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::config_dir().join("logs")
    }

    /// Load from an explicit path, else the user config file, else defaults
    ///
    /// An explicit path must exist and parse; the user file is optional.
    pub fn load(explicit: Option<&Path>) -> BuildResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    tracing::debug!("No settings file at {:?}, using defaults", path);
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path).with_file_context("read", &path)?;
        let config: Self = serde_json::from_str(&contents).with_file_context("parse", &path)?;
        config.validate()?;
        tracing::debug!("Loaded build settings from {:?}", path);
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_file_context("create", parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).with_file_context("write", path)?;
        tracing::debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Reject glyph names norad would refuse
    pub fn validate(&self) -> Result<(), SourceError> {
        for name in self.stroke_bases.iter().chain(&self.variant.marks) {
            if norad::Name::new(name).is_err() {
                return Err(SourceError::InvalidGlyphName(name.clone()));
            }
        }
        Ok(())
    }
}
