//! Font version strings
//!
//! The build takes the version as a dotted `MAJOR.MINOR` string, e.g. `1.234`,
//! and writes the two halves into the UFO font info.

use std::fmt;
use std::str::FromStr;

use crate::core::errors::SourceError;

/// A parsed `MAJOR.MINOR` font version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontVersion {
    pub major: i32,
    pub minor: u32,
}

impl FontVersion {
    /// Parse a version string of exactly two dot-separated integers
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let malformed = || SourceError::MalformedVersion(text.to_string());

        let (major, minor) = text.trim().split_once('.').ok_or_else(malformed)?;
        let major = major.parse::<i32>().map_err(|_| malformed())?;
        let minor = minor.parse::<u32>().map_err(|_| malformed())?;
        if major < 0 {
            return Err(malformed());
        }

        Ok(Self { major, minor })
    }

    /// Write the version into UFO font info
    pub fn apply(&self, info: &mut norad::FontInfo) {
        info.version_major = Some(self.major);
        info.version_minor = Some(self.minor);
    }
}

impl FromStr for FontVersion {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FontVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.major, self.minor)
    }
}
