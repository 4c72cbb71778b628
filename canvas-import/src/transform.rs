//! The subset of SVG transforms the importer understands.
//!
//! `translate`, `scale` and `rotate` compose into an affine [`Transform`].
//! `matrix`, `skewX` and `skewY` are reported as unsupported and the node
//! carrying them is skipped.

use svgtypes::{TransformListParser, TransformListToken};

use canvas_core::geometry::normalize_rotation;
use canvas_core::Point;

/// Affine transform `[a c e; b d f; 0 0 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Why a `transform` attribute was not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// A primitive outside translate/scale/rotate.
    #[error("unsupported transform {0}")]
    Unsupported(&'static str),
    /// The attribute does not parse.
    #[error("malformed transform: {0}")]
    Malformed(String),
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Pure translation.
    #[must_use]
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// Pure scale.
    #[must_use]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Rotation about the origin, degrees clockwise in y-down space.
    #[must_use]
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Parse a `transform` attribute.
    ///
    /// # Errors
    ///
    /// Returns an error for matrix/skew primitives or malformed input.
    pub fn parse(text: &str) -> Result<Self, TransformError> {
        let mut out = Self::IDENTITY;
        for token in TransformListParser::from(text) {
            let step = match token.map_err(|e| TransformError::Malformed(e.to_string()))? {
                TransformListToken::Translate { tx, ty } => Self::translate(tx, ty),
                TransformListToken::Scale { sx, sy } => Self::scale(sx, sy),
                TransformListToken::Rotate { angle } => Self::rotate(angle),
                TransformListToken::Matrix { .. } => return Err(TransformError::Unsupported("matrix")),
                TransformListToken::SkewX { .. } => return Err(TransformError::Unsupported("skewX")),
                TransformListToken::SkewY { .. } => return Err(TransformError::Unsupported("skewY")),
            };
            out = out.then(&step);
        }
        Ok(out)
    }

    /// `self × other`: `other` applies first, in `self`'s coordinate system.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Map a point.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Length scale along the local x axis.
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Length scale along the local y axis.
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        self.c.hypot(self.d)
    }

    /// Rotation of the local x axis, normalised degrees.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        normalize_rotation(self.b.atan2(self.a).to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_translate_then_scale_order() {
        // SVG applies the rightmost primitive first.
        let t = Transform::parse("translate(10 20) scale(2)").expect("parse");
        assert!(close(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 22.0)));
    }

    #[test]
    fn test_rotate_about_center() {
        let t = Transform::parse("rotate(90 50 50)").expect("parse");
        assert!(close(t.apply(Point::new(100.0, 50.0)), Point::new(50.0, 100.0)));
        assert!((t.rotation() - 90.0).abs() < 1e-9);
        assert!((t.scale_x() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_is_unsupported() {
        assert_eq!(
            Transform::parse("matrix(1 0 0 1 5 5)"),
            Err(TransformError::Unsupported("matrix"))
        );
        assert_eq!(
            Transform::parse("translate(1) skewX(30)"),
            Err(TransformError::Unsupported("skewX"))
        );
    }

    #[test]
    fn test_scale_factors() {
        let t = Transform::parse("scale(2 3)").expect("parse");
        assert!((t.scale_x() - 2.0).abs() < 1e-12);
        assert!((t.scale_y() - 3.0).abs() < 1e-12);
        assert!(t.rotation().abs() < 1e-12);
    }
}
