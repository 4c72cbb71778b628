//! Layout templates expressed in canvas-relative fractions.

use serde::{Deserialize, Serialize};

use crate::document::Canvas;
use crate::element::{Element, ElementKind};
use crate::geometry::{clamp_font_size, Rect};

/// A template element whose geometry is a fraction of the canvas size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateElement {
    /// Left edge as a fraction of canvas width.
    pub x: f64,
    /// Top edge as a fraction of canvas height.
    pub y: f64,
    /// Width as a fraction of canvas width.
    pub width: f64,
    /// Height as a fraction of canvas height.
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Kind payload. Text font sizes are inches on the template's own canvas.
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// A catalogue template: partially specified elements plus the canvas size
/// they were authored for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template name.
    pub name: String,
    /// Width of the canvas the template was authored on, in inches.
    pub canvas_width: f64,
    /// Height of the canvas the template was authored on, in inches.
    pub canvas_height: f64,
    /// Elements in paint order.
    pub elements: Vec<TemplateElement>,
}

impl Template {
    /// Resolve fractional geometry into absolute inches on `target`.
    ///
    /// Each call produces fresh element ids.
    #[must_use]
    pub fn resolve(&self, target: Canvas) -> Vec<Element> {
        let font_scale = if self.canvas_height > 0.0 {
            target.height / self.canvas_height
        } else {
            1.0
        };

        self.elements
            .iter()
            .map(|t| {
                let mut kind = t.kind.clone();
                if let ElementKind::Text(props) = &mut kind {
                    props.font_size = clamp_font_size(props.font_size * font_scale);
                }
                Element::new(kind)
                    .with_bounds(Rect::new(
                        t.x * target.width,
                        t.y * target.height,
                        (t.width * target.width).max(0.0),
                        (t.height * target.height).max(0.0),
                    ))
                    .with_rotation(t.rotation)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ShapeKind, ShapeProps};
    use crate::geometry::points_to_inches;

    fn banner_template() -> Template {
        let heading = Element::text("GRAND OPENING", "Impact", points_to_inches(48.0));
        Template {
            name: "Grand opening".into(),
            canvas_width: 6.0,
            canvas_height: 3.0,
            elements: vec![
                TemplateElement {
                    x: 0.0,
                    y: 0.0,
                    width: 1.0,
                    height: 1.0,
                    rotation: 0.0,
                    kind: ElementKind::Shape(ShapeProps {
                        shape_kind: ShapeKind::Rect,
                        fill: "#ffee00".into(),
                        stroke: "none".into(),
                        stroke_width: 0.0,
                        corner_radius: 0.0,
                    }),
                },
                TemplateElement {
                    x: 0.1,
                    y: 0.25,
                    width: 0.8,
                    height: 0.5,
                    rotation: 0.0,
                    kind: heading.kind,
                },
            ],
        }
    }

    #[test]
    fn test_resolve_fractions() {
        let elements = banner_template().resolve(Canvas::new(72.0, 36.0));
        assert_eq!(elements.len(), 2);
        assert!((elements[0].width - 72.0).abs() < 1e-9);
        assert!((elements[0].height - 36.0).abs() < 1e-9);
        assert!((elements[1].x - 7.2).abs() < 1e-9);
        assert!((elements[1].y - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_font_scaled_by_height_and_clamped() {
        // 48pt on a 3in tall template → 96pt on a 6in tall canvas.
        let elements = banner_template().resolve(Canvas::new(12.0, 6.0));
        let size = elements[1].font_size().expect("text");
        assert!((size - points_to_inches(96.0)).abs() < 1e-9);

        // 48pt × 12 is beyond the accepted range.
        let elements = banner_template().resolve(Canvas::new(72.0, 36.0));
        let size = elements[1].font_size().expect("text");
        assert!((size - points_to_inches(100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_each_resolve_has_fresh_ids() {
        let t = banner_template();
        let a = t.resolve(Canvas::new(6.0, 3.0));
        let b = t.resolve(Canvas::new(6.0, 3.0));
        assert_ne!(a[0].id, b[0].id);
    }
}
