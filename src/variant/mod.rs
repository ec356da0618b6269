//! Variant derivation
//!
//! The variant build enlarges a fixed set of vowel marks, renames the family
//! and restricts the compiled font to a codepoint allow-list. The geometric
//! and metadata steps run on the UFO; subsetting and the vertical metric
//! fix-up run on the compiled binary (see `compile`).

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use kurbo::Rect;

use crate::core::config_file::VariantConfig;
use crate::core::errors::SourceError;
use crate::data::glyph_bounds;
use crate::font_source::{metrics, FontSource};
use crate::geometry::{scale_about, transform_glyph};

/// Scale each named glyph about its own bounding-box centre.
///
/// Contours, anchors and component placements move together; advance widths
/// are left alone so zero-width marks stay zero-width.
pub fn rescale_marks<S: AsRef<str>>(
    source: &mut FontSource,
    names: &[S],
    factor: f64,
) -> Result<(), SourceError> {
    for name in names {
        let name = name.as_ref();
        let glyph = source
            .glyph(name)
            .ok_or_else(|| SourceError::MissingGlyph(name.to_string()))?;
        let Some(bounds) = glyph_bounds(glyph, source.layer()) else {
            tracing::warn!("Glyph '{}' has no outline, not rescaling", name);
            continue;
        };
        let affine = scale_about(bounds.center(), factor);
        if let Some(glyph) = source.glyph_mut(name) {
            transform_glyph(glyph, affine);
        }
        tracing::debug!("Scaled '{}' by {} about {:?}", name, factor, bounds.center());
    }
    tracing::info!("Rescaled {} mark glyphs by {}", names.len(), factor);
    Ok(())
}

/// Rename the family and override sample text and ascender metrics
pub fn rewrite_metadata(source: &mut FontSource, config: &VariantConfig) {
    let info = source.info_mut();
    metrics::append_name_suffix(info, &config.name_suffix);
    info.open_type_name_sample_text = Some(config.sample_text.clone());
    metrics::override_ascender(info, config.ascender);
    tracing::info!("Variant family name: {}", metrics::display_name(source.info()));
}

/// What the subsetter keeps from the compiled variant
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetPlan {
    pub codepoints: BTreeSet<u32>,
    pub keep_glyph_names: bool,
    /// Keep every name ID in every language
    pub keep_all_names: bool,
    pub layout_scripts: Vec<String>,
    /// Layout features removed on top of the subsetter's defaults
    pub dropped_features: Vec<String>,
    pub recalc_average_width: bool,
    pub recalc_max_context: bool,
}

impl SubsetPlan {
    /// Codepoints collapsed back into contiguous ranges
    pub fn codepoint_ranges(&self) -> Vec<RangeInclusive<u32>> {
        let mut ranges: Vec<RangeInclusive<u32>> = Vec::new();
        for &cp in &self.codepoints {
            match ranges.last_mut() {
                Some(last) if *last.end() + 1 == cp => *last = *last.start()..=cp,
                _ => ranges.push(cp..=cp),
            }
        }
        ranges
    }
}

/// Build the subset plan for the configured variant
pub fn subset_plan(config: &VariantConfig) -> Result<SubsetPlan, SourceError> {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
    Ok(SubsetPlan {
        codepoints: parse_codepoints(&config.codepoints)?,
        keep_glyph_names: true,
        keep_all_names: true,
        layout_scripts: strings(&["DFLT", "arab"]),
        // The variant's digits are plain base glyphs
        dropped_features: strings(&["pnum", "onum", "numr", "dnom"]),
        recalc_average_width: true,
        recalc_max_context: true,
    })
}

/// Parse `"0627"` and `"0600-06FF"` style entries into a codepoint set
pub fn parse_codepoints<S: AsRef<str>>(entries: &[S]) -> Result<BTreeSet<u32>, SourceError> {
    let mut codepoints = BTreeSet::new();
    for entry in entries {
        let entry = entry.as_ref();
        let invalid = || SourceError::InvalidCodepointRange(entry.to_string());
        let parse = |hex: &str| {
            let hex = hex.trim();
            let hex = hex
                .strip_prefix("U+")
                .or_else(|| hex.strip_prefix("u+"))
                .unwrap_or(hex);
            u32::from_str_radix(hex, 16)
                .ok()
                .filter(|&cp| char::from_u32(cp).is_some())
                .ok_or_else(invalid)
        };
        let (start, end) = match entry.split_once('-') {
            Some((start, end)) => (parse(start)?, parse(end)?),
            None => {
                let cp = parse(entry)?;
                (cp, cp)
            }
        };
        if start > end {
            return Err(invalid());
        }
        // Ranges may span the surrogate block, which holds no characters
        codepoints.extend((start..=end).filter(|&cp| char::from_u32(cp).is_some()));
    }
    Ok(codepoints)
}

/// Union of the bounds of the named glyphs, for logging and checks
pub fn marks_bounds<S: AsRef<str>>(source: &FontSource, names: &[S]) -> Option<Rect> {
    names
        .iter()
        .filter_map(|name| glyph_bounds(source.glyph(name.as_ref())?, source.layer()))
        .reduce(|a, b| a.union(b))
}
