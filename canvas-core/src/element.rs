//! Canvas elements - the drawable building blocks of a design.
//!
//! Every element shares a common geometry block (inches, top-left anchored,
//! rotated about its own centre) and carries one [`ElementKind`] payload. The
//! kind is a closed enum so every renderer, serializer and print path matches
//! it exhaustively.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{clamp_font_size, normalize_rotation, rotate_point, Point, Rect};
use crate::{CanvasError, CanvasResult};

/// Unique identifier for an element, stable for the document's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Font weight of a text element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Font style of a text element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Text decoration line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Underlined.
    Underline,
    /// Struck through.
    LineThrough,
}

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Flush right.
    Right,
}

/// Geometric primitive drawn by a shape element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Plain rectangle.
    #[default]
    Rect,
    /// Rectangle with rounded corners.
    RoundedRect,
    /// Circle or ellipse inscribed in the element box.
    Circle,
}

/// Text payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    /// Text content.
    pub content: String,
    /// Font family name.
    pub font_family: String,
    /// Font size in inches (edited in points at the UI boundary).
    pub font_size: f64,
    /// Font weight.
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Font style.
    #[serde(default)]
    pub font_style: FontStyle,
    /// Decoration line.
    #[serde(default)]
    pub text_decoration: TextDecoration,
    /// Fill colour.
    pub color: String,
    /// Horizontal alignment.
    #[serde(default)]
    pub text_align: TextAlign,
}

/// Shape payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    /// Primitive kind.
    pub shape_kind: ShapeKind,
    /// Fill colour or `none`.
    pub fill: String,
    /// Stroke colour or `none`.
    pub stroke: String,
    /// Stroke width in inches.
    #[serde(default)]
    pub stroke_width: f64,
    /// Corner radius in inches, used by [`ShapeKind::RoundedRect`].
    #[serde(default)]
    pub corner_radius: f64,
}

/// Raster or remote image payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Source URL or `data:` URI.
    pub src: String,
}

/// Clipart payload: an opaque vector reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipartProps {
    /// Source URL or `data:` URI.
    pub src: String,
    /// Original path data for imported vector nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_data: Option<String>,
}

/// The type of content an element draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A text block.
    Text(TextProps),
    /// An uploaded or remote image.
    Image(ImageProps),
    /// A clipart reference.
    Clipart(ClipartProps),
    /// A filled/stroked primitive.
    Shape(ShapeProps),
}

impl ElementKind {
    /// Wire name of the kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Clipart(_) => "clipart",
            Self::Shape(_) => "shape",
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

const fn default_visible() -> bool {
    true
}

/// A canvas element with common geometry and a kind payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Left edge in inches.
    pub x: f64,
    /// Top edge in inches.
    pub y: f64,
    /// Width in inches.
    pub width: f64,
    /// Height in inches.
    pub height: f64,
    /// Clockwise rotation in degrees about the element centre, in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity from 0 to 1.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Whether the element is drawn and printed.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Locked elements can be selected but not dragged, resized or edited.
    #[serde(default)]
    pub locked: bool,
    /// Kind payload.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create a new element with the given kind and a zero-size box at the origin.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            locked: false,
            kind,
        }
    }

    /// Create a left-aligned black text element.
    #[must_use]
    pub fn text(content: impl Into<String>, font_family: impl Into<String>, font_size: f64) -> Self {
        Self::new(ElementKind::Text(TextProps {
            content: content.into(),
            font_family: font_family.into(),
            font_size: clamp_font_size(font_size),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            color: "#000000".to_string(),
            text_align: TextAlign::Left,
        }))
    }

    /// Create a shape element with the given fill and no stroke.
    #[must_use]
    pub fn shape(shape_kind: ShapeKind, fill: impl Into<String>) -> Self {
        Self::new(ElementKind::Shape(ShapeProps {
            shape_kind,
            fill: fill.into(),
            stroke: "none".to_string(),
            stroke_width: 0.0,
            corner_radius: 0.0,
        }))
    }

    /// Create an image element.
    #[must_use]
    pub fn image(src: impl Into<String>) -> Self {
        Self::new(ElementKind::Image(ImageProps { src: src.into() }))
    }

    /// Create a clipart element.
    #[must_use]
    pub fn clipart(src: impl Into<String>) -> Self {
        Self::new(ElementKind::Clipart(ClipartProps {
            src: src.into(),
            path_data: None,
        }))
    }

    /// Set position and size.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.set_bounds(bounds);
        self
    }

    /// Set the rotation, normalised into `[0, 360)`.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = normalize_rotation(degrees);
        self
    }

    /// Set the opacity, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp_unit(opacity, self.opacity);
        self
    }

    /// Set whether the element is locked.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Overwrite position and size.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
    }

    /// Rotation pivot.
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Whether this is a text element.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text(_))
    }

    /// Font size in inches for text elements.
    #[must_use]
    pub fn font_size(&self) -> Option<f64> {
        match &self.kind {
            ElementKind::Text(t) => Some(t.font_size),
            ElementKind::Image(_) | ElementKind::Clipart(_) | ElementKind::Shape(_) => None,
        }
    }

    /// Check if a canvas point lies within the rotated element box.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        let local = rotate_point(p, self.center(), -self.rotation);
        self.bounds().contains(local)
    }

    /// Copy this element under a fresh id, offset by `(dx, dy)` inches.
    #[must_use]
    pub fn duplicate(&self, dx: f64, dy: f64) -> Self {
        let mut copy = self.clone();
        copy.id = ElementId::new();
        copy.x += dx;
        copy.y += dy;
        copy
    }

    /// Clamp every numeric field into its valid range, as input edits are.
    ///
    /// Non-finite coordinates become 0, sizes are floored at 0, opacity is
    /// clamped to 0–1, rotation is normalised and font sizes are clamped to
    /// the editable point range.
    pub fn normalize(&mut self) {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        self.x = finite_or_zero(self.x);
        self.y = finite_or_zero(self.y);
        self.width = clamp_size(finite_or_zero(self.width), 0.0);
        self.height = clamp_size(finite_or_zero(self.height), 0.0);
        self.rotation = normalize_rotation(self.rotation);
        self.opacity = clamp_unit(self.opacity, 1.0);
        match &mut self.kind {
            ElementKind::Text(props) => props.font_size = clamp_font_size(props.font_size),
            ElementKind::Shape(props) => {
                props.stroke_width = clamp_size(finite_or_zero(props.stroke_width), 0.0);
                props.corner_radius = clamp_size(finite_or_zero(props.corner_radius), 0.0);
            }
            ElementKind::Image(_) | ElementKind::Clipart(_) => {}
        }
    }

    /// Apply a partial update, clamping numeric fields to their valid range.
    ///
    /// Kind-specific patches must match the element kind; the element is left
    /// untouched when they do not.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidOperation`] when a kind-specific patch
    /// targets the wrong element kind.
    pub fn apply_patch(&mut self, patch: &ElementPatch) -> CanvasResult<()> {
        patch.check_kind(&self.kind)?;

        if let Some(x) = patch.x.filter(|v| v.is_finite()) {
            self.x = x;
        }
        if let Some(y) = patch.y.filter(|v| v.is_finite()) {
            self.y = y;
        }
        if let Some(w) = patch.width {
            self.width = clamp_size(w, self.width);
        }
        if let Some(h) = patch.height {
            self.height = clamp_size(h, self.height);
        }
        if let Some(r) = patch.rotation {
            self.rotation = normalize_rotation(r);
        }
        if let Some(o) = patch.opacity {
            self.opacity = clamp_unit(o, self.opacity);
        }
        if let Some(v) = patch.visible {
            self.visible = v;
        }
        if let Some(l) = patch.locked {
            self.locked = l;
        }

        match &mut self.kind {
            ElementKind::Text(props) => {
                if let Some(tp) = &patch.text {
                    tp.apply(props);
                }
            }
            ElementKind::Shape(props) => {
                if let Some(sp) = &patch.shape {
                    sp.apply(props);
                }
            }
            ElementKind::Image(ImageProps { src }) | ElementKind::Clipart(ClipartProps { src, .. }) => {
                if let Some(new_src) = patch.source.as_ref().and_then(|s| s.src.as_ref()) {
                    src.clone_from(new_src);
                }
            }
        }
        Ok(())
    }
}

fn clamp_size(value: f64, current: f64) -> f64 {
    if value.is_nan() {
        current
    } else {
        value.max(0.0)
    }
}

fn clamp_unit(value: f64, current: f64) -> f64 {
    if value.is_nan() {
        current
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Partial update to an element, as produced by property panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New width (clamped to ≥ 0).
    pub width: Option<f64>,
    /// New height (clamped to ≥ 0).
    pub height: Option<f64>,
    /// New rotation (normalised).
    pub rotation: Option<f64>,
    /// New opacity (clamped to 0–1).
    pub opacity: Option<f64>,
    /// New visibility.
    pub visible: Option<bool>,
    /// New lock state.
    pub locked: Option<bool>,
    /// Text-specific changes.
    pub text: Option<TextPatch>,
    /// Shape-specific changes.
    pub shape: Option<ShapePatch>,
    /// Image/clipart source change.
    pub source: Option<SourcePatch>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that only resizes the element.
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    fn check_kind(&self, kind: &ElementKind) -> CanvasResult<()> {
        let mismatch = match kind {
            ElementKind::Text(_) => self.shape.is_some() || self.source.is_some(),
            ElementKind::Shape(_) => self.text.is_some() || self.source.is_some(),
            ElementKind::Image(_) | ElementKind::Clipart(_) => {
                self.text.is_some() || self.shape.is_some()
            }
        };
        if mismatch {
            return Err(CanvasError::InvalidOperation(format!(
                "patch does not apply to {} element",
                kind.name()
            )));
        }
        Ok(())
    }
}

/// Partial update to [`TextProps`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextPatch {
    /// New content.
    pub content: Option<String>,
    /// New font family.
    pub font_family: Option<String>,
    /// New font size in inches (clamped to 6–100 pt).
    pub font_size: Option<f64>,
    /// New weight.
    pub font_weight: Option<FontWeight>,
    /// New style.
    pub font_style: Option<FontStyle>,
    /// New decoration.
    pub text_decoration: Option<TextDecoration>,
    /// New colour.
    pub color: Option<String>,
    /// New alignment.
    pub text_align: Option<TextAlign>,
}

impl TextPatch {
    fn apply(&self, props: &mut TextProps) {
        if let Some(c) = &self.content {
            props.content.clone_from(c);
        }
        if let Some(f) = &self.font_family {
            props.font_family.clone_from(f);
        }
        if let Some(s) = self.font_size {
            props.font_size = clamp_font_size(s);
        }
        if let Some(w) = self.font_weight {
            props.font_weight = w;
        }
        if let Some(s) = self.font_style {
            props.font_style = s;
        }
        if let Some(d) = self.text_decoration {
            props.text_decoration = d;
        }
        if let Some(c) = &self.color {
            props.color.clone_from(c);
        }
        if let Some(a) = self.text_align {
            props.text_align = a;
        }
    }
}

/// Partial update to [`ShapeProps`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapePatch {
    /// New primitive.
    pub shape_kind: Option<ShapeKind>,
    /// New fill.
    pub fill: Option<String>,
    /// New stroke colour.
    pub stroke: Option<String>,
    /// New stroke width (clamped to ≥ 0).
    pub stroke_width: Option<f64>,
    /// New corner radius (clamped to ≥ 0).
    pub corner_radius: Option<f64>,
}

impl ShapePatch {
    fn apply(&self, props: &mut ShapeProps) {
        if let Some(k) = self.shape_kind {
            props.shape_kind = k;
        }
        if let Some(f) = &self.fill {
            props.fill.clone_from(f);
        }
        if let Some(s) = &self.stroke {
            props.stroke.clone_from(s);
        }
        if let Some(w) = self.stroke_width {
            props.stroke_width = clamp_size(w, props.stroke_width);
        }
        if let Some(r) = self.corner_radius {
            props.corner_radius = clamp_size(r, props.corner_radius);
        }
    }
}

/// Partial update to an image or clipart source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourcePatch {
    /// New source URL.
    pub src: Option<String>,
}
