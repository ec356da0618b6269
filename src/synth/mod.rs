//! Glyph synthesis
//!
//! Generated glyphs that are not drawn by hand: width-bucketed over/underline
//! strokes and the substitution rules that select them.

pub mod bucket;
pub mod stroke;

pub use bucket::{group_by_width, width_bucket, WidthBuckets, WIDTH_QUANTUM};
pub use stroke::{synthesize_strokes, StrokeReport};
