//! Bounding boxes of path-like nodes.

use svgtypes::{PointsParser, SimplePathSegment, SimplifyingPathParser};

use canvas_core::{Point, Rect};

/// Bounding box of path data, including curve control points.
///
/// Control points make the box conservative for curves, which is what a
/// clipart frame needs. Parsing stops at the first error, as SVG renderers
/// do. Returns `None` when no coordinates were read.
#[must_use]
pub fn path_bounds(d: &str) -> Option<Rect> {
    let mut points = Vec::new();
    for segment in SimplifyingPathParser::from(d) {
        let Ok(segment) = segment else {
            break;
        };
        match segment {
            SimplePathSegment::MoveTo { x, y } | SimplePathSegment::LineTo { x, y } => {
                points.push(Point::new(x, y));
            }
            SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                points.extend([Point::new(x1, y1), Point::new(x2, y2), Point::new(x, y)]);
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                points.extend([Point::new(x1, y1), Point::new(x, y)]);
            }
            SimplePathSegment::ClosePath => {}
        }
    }
    Rect::from_points(points)
}

/// Bounding box of a `points` attribute (polygon/polyline).
#[must_use]
pub fn points_bounds(points: &str) -> Option<Rect> {
    Rect::from_points(PointsParser::from(points).map(|(x, y)| Point::new(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let r = path_bounds("M10 10 l 20 0 l 0 30 z").expect("bounds");
        assert_eq!(r, Rect::new(10.0, 10.0, 20.0, 30.0));
    }

    #[test]
    fn test_curve_control_points_included() {
        let r = path_bounds("M0 0 C 0 -10 10 -10 10 0").expect("bounds");
        assert_eq!(r, Rect::new(0.0, -10.0, 10.0, 10.0));
    }

    #[test]
    fn test_arc_is_simplified() {
        let r = path_bounds("M0 50 A 50 50 0 0 1 100 50").expect("bounds");
        assert!(r.width >= 100.0 - 1e-9);
        assert!(r.y < 50.0);
    }

    #[test]
    fn test_points() {
        let r = points_bounds("0,0 40,10 20,30").expect("bounds");
        assert_eq!(r, Rect::new(0.0, 0.0, 40.0, 30.0));
        assert!(points_bounds("").is_none());
        assert!(path_bounds("").is_none());
    }
}
