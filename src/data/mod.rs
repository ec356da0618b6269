//! UFO data access: loading, saving and geometry conversions

pub mod conversions;
pub mod ufo;

pub use conversions::{affine_from_norad, affine_to_norad, contour_to_bezpath, glyph_bounds};
