//! Vertical metric fix-up for compiled binaries
//!
//! Enlarged marks in the variant build can reach past the source's hhea
//! ascender and descender. After subsetting, the compiled font's outlines are
//! measured with skrifa and hhea is widened to cover them, then the font is
//! reassembled with write-fonts.

use kurbo::{BezPath, Point, Rect, Shape};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::MetadataProvider;
use thiserror::Error;
use write_fonts::from_obj::ToOwnedTable;
use write_fonts::read::{FontRef, ReadError, TableProvider};
use write_fonts::tables::hhea::Hhea;
use write_fonts::types::FWord;
use write_fonts::{BuilderError, FontBuilder};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to parse compiled font: {0}")]
    Read(#[from] ReadError),
    #[error("failed to load outlines: {0}")]
    Outlines(String),
    #[error("failed to draw glyph {glyph}: {message}")]
    Draw { glyph: u32, message: String },
    #[error("failed to rebuild font: {0}")]
    Build(#[from] BuilderError),
}

/// Lowest and highest points reached by any outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalExtents {
    pub y_min: f64,
    pub y_max: f64,
}

/// Collects drawn outlines into a kurbo path
#[derive(Default)]
struct PathPen {
    path: BezPath,
}

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(point(x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path.quad_to(point(cx0, cy0), point(x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path
            .curve_to(point(cx0, cy0), point(cx1, cy1), point(x, y));
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

fn point(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

/// Measure every outline in the font; `None` if all glyphs are empty
pub fn outline_extents(data: &[u8]) -> Result<Option<VerticalExtents>, MetricsError> {
    let font =
        skrifa::FontRef::new(data).map_err(|err| MetricsError::Outlines(err.to_string()))?;
    let settings = || DrawSettings::unhinted(Size::unscaled(), LocationRef::default());

    let mut bounds: Option<Rect> = None;
    for (glyph_id, glyph) in font.outline_glyphs().iter() {
        let mut pen = PathPen::default();
        glyph
            .draw(settings(), &mut pen)
            .map_err(|err| MetricsError::Draw {
                glyph: glyph_id.to_u32(),
                message: err.to_string(),
            })?;
        if pen.path.elements().is_empty() {
            continue;
        }
        let glyph_bounds = pen.path.bounding_box();
        bounds = Some(bounds.map_or(glyph_bounds, |b| b.union(glyph_bounds)));
    }

    Ok(bounds.map(|rect| VerticalExtents {
        y_min: rect.y0,
        y_max: rect.y1,
    }))
}

/// Widen hhea ascender/descender to cover the actual outlines.
///
/// Returns the input unchanged when the metrics already cover every glyph.
pub fn fix_vertical_metrics(data: &[u8]) -> Result<Vec<u8>, MetricsError> {
    let Some(extents) = outline_extents(data)? else {
        return Ok(data.to_vec());
    };

    let font = FontRef::new(data)?;
    let mut hhea: Hhea = font.hhea()?.to_owned_table();
    let ascender = hhea.ascender.to_i16().max(extents.y_max.ceil() as i16);
    let descender = hhea.descender.to_i16().min(extents.y_min.floor() as i16);

    if ascender == hhea.ascender.to_i16() && descender == hhea.descender.to_i16() {
        tracing::debug!("hhea metrics already cover all outlines");
        return Ok(data.to_vec());
    }

    tracing::info!(
        "Adjusting hhea metrics: ascender {} -> {}, descender {} -> {}",
        hhea.ascender.to_i16(),
        ascender,
        hhea.descender.to_i16(),
        descender
    );
    hhea.ascender = FWord::new(ascender);
    hhea.descender = FWord::new(descender);

    let mut builder = FontBuilder::new();
    builder.add_table(&hhea)?;
    builder.copy_missing_tables(font);
    Ok(builder.build())
}
