//! Command line interface for the fontsmith build tool
//!
//! Handles parsing command line arguments and validating them before the
//! pipeline starts.

use clap::Parser;
use std::path::PathBuf;

use crate::core::errors::{validate_ufo_path, BuildResult};
use crate::core::version::FontVersion;

/// fontsmith CLI arguments
///
/// Examples:
///   fontsmith --input Amiri-Regular.ufo --output Amiri-Regular.ttf \
///             --features amiri.fea --version 1.001 --license OFL.txt
///   fontsmith ... --variant --output AmiriQuran.ttf   # Derived variant
///   fontsmith ... --companion Latin.ufo               # Merge a companion source
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "fontsmith",
    about = "Build production font binaries from UFO sources",
    long_about = "fontsmith prepares a UFO source for release: it merges an optional companion source, synthesizes width-matched over/underline glyphs with their substitution rules, merges the external feature file, optionally derives a variant, and compiles the result."
)]
pub struct CliArgs {
    /// Source font to build
    #[clap(long = "input", short = 'i', help = "Source UFO to build")]
    pub input: PathBuf,

    /// Output binary; the extension selects the outline flavor
    #[clap(
        long = "output",
        short = 'o',
        help = "Output font file",
        long_help = "Path of the compiled font. A .ttf extension selects TrueType outlines; any other extension selects CFF outlines."
    )]
    pub output: PathBuf,

    /// External feature source placed before the font's own features
    #[clap(long = "features", help = "Feature file to include")]
    pub features: PathBuf,

    /// Font version as MAJOR.MINOR
    #[clap(
        long = "version",
        value_name = "MAJOR.MINOR",
        help = "Font version, e.g. 1.001",
        value_parser = parse_version
    )]
    pub font_version: FontVersion,

    /// License text stored in the font's name table
    #[clap(long = "license", help = "License file to embed")]
    pub license: PathBuf,

    /// Build the derived variant instead of the regular font
    #[clap(
        long = "variant",
        help = "Build the derived variant",
        long_help = "Build the derived variant: enlarge the configured marks, rename the family, subset to the configured codepoints and widen the vertical metrics to fit."
    )]
    pub variant: bool,

    /// Secondary source whose glyphs are merged into the input
    #[clap(long = "companion", help = "Companion UFO to merge into the input")]
    pub companion: Option<PathBuf>,

    /// Build settings file
    #[clap(
        long = "config",
        help = "Build settings (JSON)",
        long_help = "Build settings file. Defaults to ~/.config/fontsmith/settings.json when that exists."
    )]
    pub config: Option<PathBuf>,

    /// Directory for a dated log file
    #[clap(long = "log-dir", help = "Also write logs to a file in this directory")]
    pub log_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_version(text: &str) -> Result<FontVersion, String> {
    FontVersion::parse(text).map_err(|err| err.to_string())
}

impl CliArgs {
    /// Check that input paths exist before doing any work
    pub fn validate(&self) -> BuildResult<()> {
        validate_ufo_path(&self.input)?;
        if let Some(companion) = &self.companion {
            validate_ufo_path(companion)?;
        }
        for (what, path) in [("Feature file", &self.features), ("License file", &self.license)] {
            if !path.is_file() {
                anyhow::bail!("{what} does not exist: {}", path.display());
            }
        }
        Ok(())
    }
}
