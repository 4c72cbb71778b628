//! Inch-based geometry, zoom scale and unit conversion.
//!
//! Stored geometry is always in physical inches. Screen pixels only exist at
//! the presentation boundary through [`Viewport`], and typographic points only
//! exist at the property-editing boundary through [`points_to_inches`] and
//! [`inches_to_points`].

use serde::{Deserialize, Serialize};

/// Typographic points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// On-screen pixels per inch at 100% zoom.
pub const PIXELS_PER_INCH: f64 = 96.0;

/// Smallest font size accepted from user input, in points.
pub const MIN_FONT_SIZE_PT: f64 = 6.0;

/// Largest font size accepted from user input, in points.
pub const MAX_FONT_SIZE_PT: f64 = 100.0;

/// Decimal places kept when converting inches back to points.
const POINT_ROUNDING: f64 = 10_000.0;

/// A point in canvas space (inches) or screen space (pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the smallest rectangle containing every point.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Geometric centre, the pivot for element rotation.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the point lies inside or on the border.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Canvas zoom state. Presentation only; never alters stored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Zoom as a percentage (100 = actual size).
    pub zoom: f64,
    /// Screen pixels per inch at 100% zoom.
    pub pixels_per_inch: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 100.0,
            pixels_per_inch: PIXELS_PER_INCH,
        }
    }
}

impl Viewport {
    /// Create a viewport at the given zoom percentage.
    #[must_use]
    pub fn with_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            ..Self::default()
        }
    }

    /// Screen pixels per canvas inch: `(zoom / 100) × pixels_per_inch`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        (self.zoom / 100.0) * self.pixels_per_inch
    }

    /// Convert a screen-space distance to inches.
    #[must_use]
    pub fn to_inches(&self, pixels: f64) -> f64 {
        pixels / self.scale()
    }

    /// Convert an inch distance to screen pixels.
    #[must_use]
    pub fn to_pixels(&self, inches: f64) -> f64 {
        inches * self.scale()
    }

    /// Convert a screen point to a canvas point.
    #[must_use]
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new(self.to_inches(p.x), self.to_inches(p.y))
    }

    /// Convert a canvas point to a screen point.
    #[must_use]
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(self.to_pixels(p.x), self.to_pixels(p.y))
    }
}

/// Convert a font size from points to stored inches.
#[must_use]
pub fn points_to_inches(points: f64) -> f64 {
    points / POINTS_PER_INCH
}

/// Convert a stored inch font size to points for display.
///
/// Rounded to four decimals so that integer point values survive the
/// points → inches → points round trip exactly.
#[must_use]
pub fn inches_to_points(inches: f64) -> f64 {
    (inches * POINTS_PER_INCH * POINT_ROUNDING).round() / POINT_ROUNDING
}

/// Clamp a font size given in inches to the accepted point range.
#[must_use]
pub fn clamp_font_size(inches: f64) -> f64 {
    let min = points_to_inches(MIN_FONT_SIZE_PT);
    let max = points_to_inches(MAX_FONT_SIZE_PT);
    if inches.is_nan() {
        return min;
    }
    inches.clamp(min, max)
}

/// Normalise an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Rotate `p` about `center` by `degrees` (clockwise in a y-down space).
#[must_use]
pub fn rotate_point(p: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}
