//! Geometric primitives and glyph transforms

use kurbo::{Affine, Point, Rect};
use norad::{Contour, ContourPoint, Glyph, PointType};

use crate::data::conversions::{affine_from_norad, affine_to_norad};

/// Build a closed, clockwise rectangle contour covering `rect`.
///
/// Clockwise winding matches PostScript outline direction, which the compiler
/// reverses as needed for TrueType output.
pub fn rectangle_contour(rect: Rect) -> Contour {
    let corners = [
        (rect.x0, rect.y0),
        (rect.x0, rect.y1),
        (rect.x1, rect.y1),
        (rect.x1, rect.y0),
    ];
    let points = corners
        .iter()
        .map(|&(x, y)| ContourPoint::new(x, y, PointType::Line, false, None, None))
        .collect();
    Contour::new(points, None)
}

/// Uniform scale by `factor` that keeps `center` fixed
pub fn scale_about(center: Point, factor: f64) -> Affine {
    Affine::translate(center.to_vec2())
        * Affine::scale(factor)
        * Affine::translate(-center.to_vec2())
}

/// Apply `affine` to every contour point, anchor and component of a glyph.
///
/// The advance width is not touched.
pub fn transform_glyph(glyph: &mut Glyph, affine: Affine) {
    for contour in glyph.contours.iter_mut() {
        for point in contour.points.iter_mut() {
            let moved = affine * Point::new(point.x, point.y);
            point.x = moved.x;
            point.y = moved.y;
        }
    }

    for anchor in glyph.anchors.iter_mut() {
        let moved = affine * Point::new(anchor.x, anchor.y);
        anchor.x = moved.x;
        anchor.y = moved.y;
    }

    for component in glyph.components.iter_mut() {
        let combined = affine * affine_from_norad(&component.transform);
        component.transform = affine_to_norad(combined);
    }
}
