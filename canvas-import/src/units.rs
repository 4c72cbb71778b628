//! SVG lengths and the source coordinate system.

use std::str::FromStr;

use svgtypes::{Length, LengthUnit, ViewBox};

/// SVG user units (CSS pixels) per inch.
pub const USER_UNITS_PER_INCH: f64 = 96.0;

/// Convert a length into user units.
///
/// `font_size` resolves `em`/`ex`. Percentages have no reference box here and
/// resolve to `None`.
#[must_use]
pub fn to_user_units(length: Length, font_size: f64) -> Option<f64> {
    let n = length.number;
    let v = match length.unit {
        LengthUnit::None | LengthUnit::Px => n,
        LengthUnit::In => n * USER_UNITS_PER_INCH,
        LengthUnit::Cm => n * USER_UNITS_PER_INCH / 2.54,
        LengthUnit::Mm => n * USER_UNITS_PER_INCH / 25.4,
        LengthUnit::Pt => n * USER_UNITS_PER_INCH / 72.0,
        LengthUnit::Pc => n * USER_UNITS_PER_INCH / 6.0,
        LengthUnit::Em => n * font_size,
        LengthUnit::Ex => n * font_size / 2.0,
        LengthUnit::Percent => return None,
    };
    v.is_finite().then_some(v)
}

/// Parse an attribute value as a length in user units.
#[must_use]
pub fn parse_length(value: &str, font_size: f64) -> Option<f64> {
    Length::from_str(value.trim())
        .ok()
        .and_then(|l| to_user_units(l, font_size))
}

/// The rectangle of source user space that maps onto the target canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceFrame {
    /// Minimum x of the visible area.
    pub min_x: f64,
    /// Minimum y of the visible area.
    pub min_y: f64,
    /// Width in user units.
    pub width: f64,
    /// Height in user units.
    pub height: f64,
}

impl SourceFrame {
    /// Resolve the frame from root attributes.
    ///
    /// An explicit `viewBox` wins over `width`/`height`. Returns `None` when
    /// neither gives a positive size.
    #[must_use]
    pub fn from_root(view_box: Option<&str>, width: Option<&str>, height: Option<&str>) -> Option<Self> {
        if let Some(vb) = view_box.and_then(|v| ViewBox::from_str(v).ok()) {
            if vb.w > 0.0 && vb.h > 0.0 {
                return Some(Self {
                    min_x: vb.x,
                    min_y: vb.y,
                    width: vb.w,
                    height: vb.h,
                });
            }
        }
        let w = width.and_then(|v| parse_length(v, 16.0))?;
        let h = height.and_then(|v| parse_length(v, 16.0))?;
        (w > 0.0 && h > 0.0).then_some(Self {
            min_x: 0.0,
            min_y: 0.0,
            width: w,
            height: h,
        })
    }

    /// Uniform, aspect-preserving scale onto a `target_w` × `target_h` area.
    #[must_use]
    pub fn fit_scale(&self, target_w: f64, target_h: f64) -> f64 {
        (target_w / self.width).min(target_h / self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_units() {
        assert_eq!(parse_length("10", 16.0), Some(10.0));
        assert_eq!(parse_length("1in", 16.0), Some(96.0));
        assert_eq!(parse_length("72pt", 16.0), Some(96.0));
        assert_eq!(parse_length("2em", 12.0), Some(24.0));
        assert!((parse_length("25.4mm", 16.0).expect("mm") - 96.0).abs() < 1e-9);
        assert_eq!(parse_length("50%", 16.0), None);
        assert_eq!(parse_length("wide", 16.0), None);
    }

    #[test]
    fn test_view_box_wins() {
        let frame = SourceFrame::from_root(Some("10 20 100 50"), Some("1000"), Some("1000")).expect("frame");
        assert_eq!(
            frame,
            SourceFrame {
                min_x: 10.0,
                min_y: 20.0,
                width: 100.0,
                height: 50.0
            }
        );
    }

    #[test]
    fn test_width_height_with_units() {
        let frame = SourceFrame::from_root(None, Some("2in"), Some("1in")).expect("frame");
        assert_eq!((frame.width, frame.height), (192.0, 96.0));
        assert!(SourceFrame::from_root(None, Some("100"), None).is_none());
        assert!(SourceFrame::from_root(Some("0 0 0 0"), None, None).is_none());
    }

    #[test]
    fn test_fit_scale_is_uniform() {
        let frame = SourceFrame::from_root(Some("0 0 100 50"), None, None).expect("frame");
        assert!((frame.fit_scale(10.0, 5.0) - 0.1).abs() < 1e-12);
        assert!((frame.fit_scale(20.0, 5.0) - 0.1).abs() < 1e-12);
    }
}
