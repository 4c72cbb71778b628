//! Print SVG generation.
//!
//! Geometry is converted from inches to output pixels (`inches × dpi`) and
//! elements are written in document order, so later elements paint on top
//! exactly as they do on screen.

use std::fmt::Write;

use canvas_core::{
    Canvas, ClipartProps, Element, ElementKind, FontStyle, FontWeight, ImageProps, ShapeKind, ShapeProps, TextAlign,
    TextDecoration, TextProps,
};

use crate::embed::EmbeddedImages;
use crate::error::{PrintError, PrintResult};

/// Baseline-to-baseline distance for multi-line text, in font sizes.
const TEXT_LINE_HEIGHT: f64 = 1.2;

/// Output pixels for a physical length.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn pixel_size(inches: f64, dpi: u32) -> u32 {
    (inches * f64::from(dpi)).round().max(0.0) as u32
}

/// Render visible `elements` on `canvas` into a standalone SVG document.
///
/// # Errors
///
/// Returns [`PrintError::EmptyDocument`] when no element is visible, and
/// [`PrintError::InvalidDpi`] / [`PrintError::InvalidCanvas`] for unusable
/// output dimensions.
pub fn render_svg(
    elements: &[Element],
    canvas: Canvas,
    dpi: u32,
    background: Option<&str>,
    images: &EmbeddedImages,
) -> PrintResult<String> {
    check_output(canvas, dpi)?;
    if !elements.iter().any(|e| e.visible) {
        return Err(PrintError::EmptyDocument);
    }

    let out_w = pixel_size(canvas.width, dpi);
    let out_h = pixel_size(canvas.height, dpi);
    let px = Px(f64::from(dpi));

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {out_w} {out_h}\">",
    );

    if let Some(bg) = background {
        let _ = write!(
            svg,
            "<rect width=\"{out_w}\" height=\"{out_h}\" fill=\"{}\"/>",
            escape_xml(bg)
        );
    }

    for element in elements.iter().filter(|e| e.visible) {
        render_element_svg(&mut svg, element, px, images);
    }

    svg.push_str("</svg>");
    Ok(svg)
}

/// Validate output dimensions.
///
/// # Errors
///
/// Returns an error for zero DPI or a canvas without area.
pub fn check_output(canvas: Canvas, dpi: u32) -> PrintResult<()> {
    if dpi == 0 {
        return Err(PrintError::InvalidDpi(dpi));
    }
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(canvas.width) || !valid(canvas.height) {
        return Err(PrintError::InvalidCanvas {
            width: canvas.width,
            height: canvas.height,
        });
    }
    Ok(())
}

/// Inch to output pixel conversion.
#[derive(Clone, Copy)]
struct Px(f64);

impl Px {
    fn of(self, inches: f64) -> f64 {
        inches * self.0
    }
}

/// Shared `transform`/`opacity` attributes, with a leading space.
fn common_attrs(element: &Element, px: Px) -> String {
    let mut attrs = String::new();
    if element.rotation != 0.0 {
        let c = element.center();
        let _ = write!(
            attrs,
            " transform=\"rotate({} {} {})\"",
            element.rotation,
            px.of(c.x),
            px.of(c.y)
        );
    }
    if element.opacity < 1.0 {
        let _ = write!(attrs, " opacity=\"{}\"", element.opacity);
    }
    attrs
}

/// Render a single element to SVG.
#[allow(clippy::many_single_char_names)]
fn render_element_svg(svg: &mut String, element: &Element, px: Px, images: &EmbeddedImages) {
    let x = px.of(element.x);
    let y = px.of(element.y);
    let w = px.of(element.width);
    let h = px.of(element.height);
    let common = common_attrs(element, px);

    match &element.kind {
        ElementKind::Shape(shape) => render_shape(svg, shape, (x, y, w, h), px, &common),

        ElementKind::Text(text) => render_text(svg, text, (x, y, w), px, &common),

        ElementKind::Image(ImageProps { src }) | ElementKind::Clipart(ClipartProps { src, .. }) => {
            let href = escape_xml(images.href(src));
            let _ = write!(
                svg,
                "<image x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\" href=\"{href}\" xlink:href=\"{href}\"{common}/>",
            );
        }
    }
}

#[allow(clippy::many_single_char_names)]
fn render_shape(svg: &mut String, shape: &ShapeProps, (x, y, w, h): (f64, f64, f64, f64), px: Px, common: &str) {
    let fill = escape_xml(&shape.fill);
    let mut paint = format!(" fill=\"{fill}\"");
    if shape.stroke != "none" && shape.stroke_width > 0.0 {
        let _ = write!(
            paint,
            " stroke=\"{}\" stroke-width=\"{}\"",
            escape_xml(&shape.stroke),
            px.of(shape.stroke_width)
        );
    }

    match shape.shape_kind {
        ShapeKind::Rect => {
            let _ = write!(
                svg,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\"{paint}{common}/>"
            );
        }
        ShapeKind::RoundedRect => {
            let r = px.of(shape.corner_radius).clamp(0.0, w.min(h) / 2.0);
            let _ = write!(
                svg,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" rx=\"{r}\" ry=\"{r}\"{paint}{common}/>"
            );
        }
        ShapeKind::Circle => {
            let (rx, ry) = (w / 2.0, h / 2.0);
            let _ = write!(
                svg,
                "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{rx}\" ry=\"{ry}\"{paint}{common}/>",
                x + rx,
                y + ry
            );
        }
    }
}

fn render_text(svg: &mut String, text: &TextProps, (x, y, w): (f64, f64, f64), px: Px, common: &str) {
    let font_size = px.of(text.font_size);
    let text_y = y + font_size;
    let (anchor_x, anchor) = match text.text_align {
        TextAlign::Left => (x, "start"),
        TextAlign::Center => (x + w / 2.0, "middle"),
        TextAlign::Right => (x + w, "end"),
    };

    let mut style = String::new();
    if text.font_weight == FontWeight::Bold {
        style.push_str(" font-weight=\"bold\"");
    }
    if text.font_style == FontStyle::Italic {
        style.push_str(" font-style=\"italic\"");
    }
    match text.text_decoration {
        TextDecoration::None => {}
        TextDecoration::Underline => style.push_str(" text-decoration=\"underline\""),
        TextDecoration::LineThrough => style.push_str(" text-decoration=\"line-through\""),
    }

    let _ = write!(
        svg,
        "<text x=\"{anchor_x}\" y=\"{text_y}\" font-size=\"{font_size}\" font-family=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\" xml:space=\"preserve\"{style}{common}>",
        escape_xml(&text.font_family),
        escape_xml(&text.color),
    );
    if text.content.contains('\n') {
        // SVG has no line breaks; each line is a tspan one line box lower.
        let step = font_size * TEXT_LINE_HEIGHT;
        for (i, line) in text.content.lines().enumerate() {
            let dy = if i == 0 { 0.0 } else { step };
            let _ = write!(svg, "<tspan x=\"{anchor_x}\" dy=\"{dy}\">{}</tspan>", escape_xml(line));
        }
    } else {
        svg.push_str(&escape_xml(&text.content));
    }
    svg.push_str("</text>");
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
