//! Geometry conversions between norad UFO data and kurbo
//!
//! The build never renders outlines; it only needs bounding boxes and affine
//! transforms, so contours are converted to kurbo paths on demand.

use kurbo::{Affine, BezPath, Point, Rect, Shape};
use norad::{Contour, Glyph, Layer, PointType};

/// Components nested deeper than this are ignored when measuring bounds
const MAX_COMPONENT_DEPTH: usize = 32;

/// Convert a UFO contour into a closed (or open) kurbo path
pub fn contour_to_bezpath(contour: &Contour) -> BezPath {
    let mut path = BezPath::new();
    let points = &contour.points;
    if points.is_empty() {
        return path;
    }

    // UFO closed contours may start anywhere, including on an off-curve point.
    // Rotate so that iteration begins at the first on-curve point.
    let start = points
        .iter()
        .position(|p| p.typ != PointType::OffCurve)
        .unwrap_or(0);
    let is_open = points[0].typ == PointType::Move;
    let rotated = points[start..].iter().chain(points[..start].iter());

    let mut pending_offcurves: Vec<Point> = Vec::new();
    let mut first = true;
    for point in rotated {
        let pt = Point::new(point.x, point.y);
        if first {
            path.move_to(pt);
            first = false;
            continue;
        }
        match point.typ {
            PointType::OffCurve => pending_offcurves.push(pt),
            PointType::Move | PointType::Line => {
                pending_offcurves.clear();
                path.line_to(pt);
            }
            PointType::Curve => push_curve(&mut path, &mut pending_offcurves, pt),
            PointType::QCurve => push_qcurve(&mut path, &mut pending_offcurves, pt),
        }
    }

    if !is_open {
        // The start point's type says how to get back to it from the last point
        let first_point = &points[start];
        let first_pt = Point::new(first_point.x, first_point.y);
        match first_point.typ {
            PointType::Curve => push_curve(&mut path, &mut pending_offcurves, first_pt),
            PointType::QCurve => push_qcurve(&mut path, &mut pending_offcurves, first_pt),
            _ => {
                if !pending_offcurves.is_empty() {
                    push_qcurve(&mut path, &mut pending_offcurves, first_pt);
                }
            }
        }
        path.close_path();
    }
    path
}

fn push_curve(path: &mut BezPath, pending: &mut Vec<Point>, end: Point) {
    match pending.len() {
        0 => path.line_to(end),
        1 => path.quad_to(pending[0], end),
        n => path.curve_to(pending[n - 2], pending[n - 1], end),
    }
    pending.clear();
}

fn push_qcurve(path: &mut BezPath, pending: &mut Vec<Point>, end: Point) {
    if pending.is_empty() {
        path.line_to(end);
        return;
    }
    // Implied on-curve points sit halfway between consecutive off-curves
    for i in 0..pending.len() {
        let cp = pending[i];
        let target = match pending.get(i + 1) {
            Some(next) => cp.midpoint(*next),
            None => end,
        };
        path.quad_to(cp, target);
    }
    pending.clear();
}

/// Bounding box of a glyph's outline, including its components.
///
/// Components are looked up in `layer` and measured through their transforms.
/// Returns `None` for glyphs with no drawable outline (e.g. spaces).
pub fn glyph_bounds(glyph: &Glyph, layer: &Layer) -> Option<Rect> {
    bounds_with_transform(glyph, layer, Affine::IDENTITY, 0)
}

fn bounds_with_transform(
    glyph: &Glyph,
    layer: &Layer,
    transform: Affine,
    depth: usize,
) -> Option<Rect> {
    if depth > MAX_COMPONENT_DEPTH {
        tracing::warn!("Component nesting too deep in glyph '{}'", glyph.name());
        return None;
    }

    let contour_bounds = glyph
        .contours
        .iter()
        .filter(|contour| !contour.points.is_empty())
        .map(|contour| (transform * contour_to_bezpath(contour)).bounding_box());

    let component_bounds = glyph.components.iter().filter_map(|component| {
        let base = layer.get_glyph(component.base.as_str())?;
        let nested = transform * affine_from_norad(&component.transform);
        bounds_with_transform(base, layer, nested, depth + 1)
    });

    contour_bounds
        .chain(component_bounds)
        .reduce(|acc, rect| acc.union(rect))
}

/// Convert a UFO affine transform to kurbo
pub fn affine_from_norad(transform: &norad::AffineTransform) -> Affine {
    Affine::new([
        transform.x_scale,
        transform.xy_scale,
        transform.yx_scale,
        transform.y_scale,
        transform.x_offset,
        transform.y_offset,
    ])
}

/// Convert a kurbo affine back to the UFO representation
pub fn affine_to_norad(affine: Affine) -> norad::AffineTransform {
    let [x_scale, xy_scale, yx_scale, y_scale, x_offset, y_offset] = affine.as_coeffs();
    norad::AffineTransform {
        x_scale,
        xy_scale,
        yx_scale,
        y_scale,
        x_offset,
        y_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rectangle_contour;

    fn glyph_with_contours(name: &str, contours: Vec<Contour>) -> Glyph {
        let mut glyph = Glyph::new(name);
        glyph.contours = contours;
        glyph
    }

    #[test]
    fn test_rectangle_bounds() {
        let rect = Rect::new(-50.0, 600.0, 550.0, 650.0);
        let glyph = glyph_with_contours("bar", vec![rectangle_contour(rect)]);
        let font = norad::Font::new();
        assert_eq!(glyph_bounds(&glyph, font.default_layer()), Some(rect));
    }

    #[test]
    fn test_empty_glyph_has_no_bounds() {
        let glyph = Glyph::new("space");
        let font = norad::Font::new();
        assert_eq!(glyph_bounds(&glyph, font.default_layer()), None);
    }

    #[test]
    fn test_component_bounds_follow_transform() {
        let mut font = norad::Font::new();
        let dot = glyph_with_contours(
            "dot",
            vec![rectangle_contour(Rect::new(0.0, 0.0, 100.0, 100.0))],
        );
        font.default_layer_mut().insert_glyph(dot);

        let mut composite = Glyph::new("twodots");
        let offset = Affine::translate((200.0, 50.0));
        composite.components.push(norad::Component::new(
            norad::Name::new("dot").unwrap(),
            affine_to_norad(offset),
            None,
        ));
        composite.components.push(norad::Component::new(
            norad::Name::new("dot").unwrap(),
            affine_to_norad(Affine::IDENTITY),
            None,
        ));

        let bounds = glyph_bounds(&composite, font.default_layer()).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 300.0, 150.0));
    }

    #[test]
    fn test_affine_round_trip() {
        let affine = Affine::scale(1.5).then_translate((10.0, -20.0).into());
        assert_eq!(affine_from_norad(&affine_to_norad(affine)), affine);
    }

    #[test]
    fn test_offcurve_start_is_rotated() {
        // A closed quadratic contour that starts on an off-curve point
        let points = vec![
            norad::ContourPoint::new(0.0, 100.0, PointType::OffCurve, false, None, None),
            norad::ContourPoint::new(100.0, 100.0, PointType::QCurve, false, None, None),
            norad::ContourPoint::new(100.0, 0.0, PointType::Line, false, None, None),
            norad::ContourPoint::new(0.0, 0.0, PointType::Line, false, None, None),
        ];
        let path = contour_to_bezpath(&Contour::new(points, None));
        let bounds = path.bounding_box();
        assert_eq!(bounds.x0, 0.0);
        assert_eq!(bounds.x1, 100.0);
        assert!(bounds.y1 <= 100.0);
    }
}
