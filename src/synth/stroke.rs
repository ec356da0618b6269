//! Over/underline stroke synthesis
//!
//! Combining over- and underline marks have to span the glyph they attach
//! to. For a hand-drawn base stroke, one stroke glyph is synthesized per width
//! bucket of the spacing glyphs in the font, and a contextual substitution
//! picks the right one after each glyph.

use std::collections::HashSet;

use kurbo::Rect;
use norad::Glyph;
use tracing::{debug, info};

use crate::core::errors::SourceError;
use crate::data::glyph_bounds;
use crate::features::rules::{stroke_glyph_name, StrokeRules};
use crate::font_source::{FontSource, GLYPH_ORDER_KEY, MARK_CATEGORY, SKIP_EXPORT_KEY};
use crate::geometry::rectangle_contour;
use crate::synth::bucket::{group_by_width, WidthBuckets};

/// What was generated for one base stroke
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeReport {
    pub base: String,
    /// Synthesized glyph names, in ascending bucket order
    pub glyphs: Vec<String>,
    pub rules: StrokeRules,
}

/// Stroke placement derived from the base glyph's own outline
#[derive(Debug, Clone, Copy, PartialEq)]
struct StrokeGeometry {
    /// Bottom of the synthesized stroke: the base glyph's top
    pos: f64,
    /// The base glyph's own vertical extent
    thickness: f64,
    /// The base glyph's left side bearing, mirrored on the right
    side_bearing: f64,
}

impl StrokeGeometry {
    /// Normalized so a side bearing wider than half the bucket keeps the
    /// contour's winding
    fn rect_for(&self, bucket: u32) -> Rect {
        Rect::new(
            self.side_bearing,
            self.pos,
            f64::from(bucket) - self.side_bearing,
            self.pos + self.thickness,
        )
        .abs()
    }
}

/// Synthesize width-bucketed copies of the stroke glyph `base` and append the
/// rules selecting them to the feature buffer.
///
/// Returns `Ok(None)` when the font has no glyph named `base`; not every
/// font needs strokes.
pub fn synthesize_strokes(
    source: &mut FontSource,
    base: &str,
) -> Result<Option<StrokeReport>, SourceError> {
    let Some(base_glyph) = source.glyph(base) else {
        debug!("No '{base}' glyph, skipping stroke synthesis");
        return Ok(None);
    };

    let bounds = glyph_bounds(base_glyph, source.layer())
        .ok_or_else(|| SourceError::EmptyOutline(base.to_string()))?;
    let geometry = StrokeGeometry {
        pos: bounds.y1,
        thickness: bounds.height(),
        side_bearing: bounds.x0,
    };

    let buckets = eligible_buckets(source);
    let mut synthesized = Vec::with_capacity(buckets.len());
    for &bucket in buckets.keys() {
        let name = stroke_glyph_name(base, bucket);
        let mut glyph = Glyph::new(&name);
        glyph.width = 0.0;
        glyph.contours.push(rectangle_contour(geometry.rect_for(bucket)));

        source.insert_glyph(glyph);
        source.set_category(&name, MARK_CATEGORY);
        debug!("Synthesized stroke {name}");
        synthesized.push(name);
    }
    add_to_glyph_order(source, &synthesized);

    let rules = StrokeRules::new(base, &buckets);
    if !rules.is_empty() {
        source.append_features(&rules.to_fea());
    }

    info!(
        "Synthesized {} '{base}' stroke glyphs",
        synthesized.len()
    );
    Ok(Some(StrokeReport {
        base: base.to_string(),
        glyphs: synthesized,
        rules,
    }))
}

/// Spacing glyphs grouped by width bucket.
///
/// Glyphs with no advance, glyphs tagged as marks and glyphs the compiler
/// drops never carry a stroke of their own.
fn eligible_buckets(source: &FontSource) -> WidthBuckets {
    let skipped: HashSet<String> = source.string_list(SKIP_EXPORT_KEY).into_iter().collect();
    group_by_width(
        source
            .glyphs()
            .filter(|glyph| glyph.width > 0.0)
            .filter(|glyph| !source.is_mark(glyph.name().as_str()))
            .filter(|glyph| !skipped.contains(glyph.name().as_str()))
            .map(|glyph| (glyph.name().as_str(), glyph.width)),
    )
}

fn add_to_glyph_order(source: &mut FontSource, names: &[String]) {
    if !source.has_lib_key(GLYPH_ORDER_KEY) {
        return;
    }
    let mut order = source.glyph_order();
    for name in names {
        if !order.contains(name) {
            order.push(name.clone());
        }
    }
    source.set_glyph_order(&order);
}
