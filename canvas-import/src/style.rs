//! Presentation attribute resolution with inheritance.
//!
//! Each node's computed style starts from its parent's, then applies plain
//! presentation attributes, then the inline `style` declarations, which win.

use svgtypes::{Color, Paint, PaintFallback};

use crate::units::parse_length;

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at `x`.
    #[default]
    Start,
    /// Text is centred on `x`.
    Middle,
    /// Text ends at `x`.
    End,
}

/// Computed presentation properties for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Fill colour as `#rrggbb`, or `none`.
    pub fill: String,
    /// Stroke colour as `#rrggbb`, or `none`.
    pub stroke: String,
    /// Stroke width in user units.
    pub stroke_width: f64,
    /// Effective opacity, ancestors multiplied in.
    pub opacity: f64,
    /// Font family list as written.
    pub font_family: String,
    /// Font size in user units.
    pub font_size: f64,
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Underline or line-through, as written.
    pub text_decoration: Option<String>,
    /// Text anchor.
    pub text_anchor: TextAnchor,
    /// `display: none`; not inherited.
    pub hidden: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: "#000000".to_string(),
            stroke: "none".to_string(),
            stroke_width: 1.0,
            opacity: 1.0,
            font_family: "Arial".to_string(),
            font_size: 16.0,
            bold: false,
            italic: false,
            text_decoration: None,
            text_anchor: TextAnchor::Start,
            hidden: false,
        }
    }
}

impl Style {
    /// Compute the style of `node` given its parent's computed style.
    #[must_use]
    pub fn resolve(parent: &Self, node: roxmltree::Node<'_, '_>) -> Self {
        let mut style = Self {
            hidden: false,
            ..parent.clone()
        };
        let mut own_opacity = 1.0;

        for attr in node.attributes() {
            style.apply(attr.name(), attr.value(), parent, &mut own_opacity);
        }
        if let Some(inline) = node.attribute("style") {
            for (name, value) in declarations(inline) {
                style.apply(name, value, parent, &mut own_opacity);
            }
        }

        style.opacity = parent.opacity * own_opacity;
        style
    }

    fn apply(&mut self, name: &str, value: &str, parent: &Self, own_opacity: &mut f64) {
        let value = value.trim();
        match name {
            "fill" => {
                if let Some(paint) = paint(value) {
                    self.fill = paint;
                }
            }
            "stroke" => {
                if let Some(paint) = paint(value) {
                    self.stroke = paint;
                }
            }
            "stroke-width" => {
                if let Some(w) = parse_length(value, parent.font_size).filter(|w| *w >= 0.0) {
                    self.stroke_width = w;
                }
            }
            "opacity" => {
                if let Ok(o) = value.parse::<f64>() {
                    if o.is_finite() {
                        *own_opacity = o.clamp(0.0, 1.0);
                    }
                }
            }
            "font-family" => {
                let family = value.split(',').next().unwrap_or(value).trim().trim_matches(&['"', '\''][..]);
                if !family.is_empty() {
                    self.font_family = family.to_string();
                }
            }
            "font-size" => {
                if let Some(size) = parse_length(value, parent.font_size).filter(|s| *s > 0.0) {
                    self.font_size = size;
                }
            }
            "font-weight" => {
                self.bold = match value {
                    "bold" | "bolder" => true,
                    "normal" | "lighter" => false,
                    n => n.parse::<u16>().map_or(self.bold, |w| w >= 600),
                };
            }
            "font-style" => self.italic = matches!(value, "italic" | "oblique"),
            "text-decoration" => {
                self.text_decoration = (value != "none").then(|| value.to_string());
            }
            "text-anchor" => {
                self.text_anchor = match value {
                    "middle" => TextAnchor::Middle,
                    "end" => TextAnchor::End,
                    _ => TextAnchor::Start,
                };
            }
            "display" => self.hidden = value == "none",
            _ => {}
        }
    }
}

/// Split an inline `style` attribute into `(name, value)` declarations.
fn declarations(inline: &str) -> impl Iterator<Item = (&str, &str)> {
    inline.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let name = name.trim();
        (!name.is_empty()).then(|| (name, value.trim()))
    })
}

/// Normalise a paint value. `None` keeps the inherited paint.
fn paint(value: &str) -> Option<String> {
    match Paint::from_str(value) {
        Ok(Paint::None) => Some("none".to_string()),
        Ok(Paint::Inherit) => None,
        Ok(Paint::Color(c)) => Some(hex(c)),
        Ok(Paint::FuncIRI(_, Some(PaintFallback::Color(c)))) => Some(hex(c)),
        Ok(Paint::FuncIRI(_, Some(PaintFallback::None))) => Some("none".to_string()),
        // Gradients, patterns and context paints have no flat equivalent.
        Ok(_) => Some("#000000".to_string()),
        Err(_) => {
            tracing::debug!(value, "unparseable paint ignored");
            None
        }
    }
}

fn hex(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}
