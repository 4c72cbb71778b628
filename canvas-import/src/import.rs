//! Mapping flattened SVG nodes onto canvas elements.

use roxmltree::{Document, ParsingOptions};

use canvas_core::{
    Canvas, CanvasResult, DesignDocument, Element, ElementId, ElementKind, FontStyle, FontWeight, Point, Rect,
    ShapeKind, TextAlign, TextDecoration,
};

use crate::error::{ImportError, ImportResult};
use crate::flatten::{Flattener, SourceNode, SourceShape, TextMetrics};
use crate::report::ImportReport;
use crate::source::{load_source, svg_data_uri, SourceFetcher, SvgSource};
use crate::style::{Style, TextAnchor};
use crate::units::SourceFrame;

/// Default nesting cap for container traversal.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default cap on elements visited per import, `<use>` expansions included.
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Frame used when a source declares no size and draws nothing measurable.
const UNSIZED_FRAME: f64 = 100.0;

/// Import tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    /// Container nesting cap. Deeper subtrees are dropped and counted in
    /// [`ImportReport::depth_truncations`].
    pub max_depth: usize,
    /// Cap on elements visited. Once reached the walk stops, the nodes
    /// already produced are kept and the rest are counted in
    /// [`ImportReport::budget_truncations`].
    pub max_nodes: usize,
    /// Estimated glyph advance as a fraction of the font size.
    pub text_width_factor: f64,
    /// Estimated line height as a fraction of the font size.
    pub text_line_height: f64,
    /// Thinnest bar produced for a `<line>`, in inches.
    pub min_line_thickness: f64,
    /// Centre the scaled drawing inside the target canvas.
    pub center: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            text_width_factor: 0.6,
            text_line_height: 1.2,
            min_line_thickness: 0.01,
            center: true,
        }
    }
}

/// Elements produced by an import, with diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// Elements in source paint order.
    pub elements: Vec<Element>,
    /// What was scaled, skipped or truncated.
    pub report: ImportReport,
}

/// Import inline SVG markup into elements sized for `target`.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] for malformed markup and
/// [`ImportError::InvalidTarget`] for a target without area.
pub fn import_svg(text: &str, target: Canvas, options: &ImportOptions) -> ImportResult<ImportOutcome> {
    import_text(text, || svg_data_uri(text), target, options)
}

/// Load a source and import it.
///
/// Nothing is returned unless the whole import succeeds.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded or parsed.
pub async fn import_source(
    source: &SvgSource,
    fetcher: &dyn SourceFetcher,
    target: Canvas,
    options: &ImportOptions,
) -> ImportResult<ImportOutcome> {
    check_target(target)?;
    let text = load_source(source, fetcher).await?;
    import_text(&text, || source.as_image_src(), target, options)
}

/// Append imported elements on top of a document.
///
/// # Errors
///
/// Returns [`canvas_core::CanvasError::DuplicateId`] if an element id is
/// already present; the document is unchanged in that case.
pub fn apply_import(doc: &mut DesignDocument, outcome: ImportOutcome) -> CanvasResult<Vec<ElementId>> {
    doc.extend(outcome.elements)
}

fn check_target(target: Canvas) -> ImportResult<()> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(target.width) && valid(target.height) {
        Ok(())
    } else {
        Err(ImportError::InvalidTarget {
            width: target.width,
            height: target.height,
        })
    }
}

fn import_text(
    text: &str,
    fallback_src: impl FnOnce() -> String,
    target: Canvas,
    options: &ImportOptions,
) -> ImportResult<ImportOutcome> {
    check_target(target)?;
    let doc = Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        },
    )?;
    let root = doc.root_element();

    let declared = (root.tag_name().name() == "svg")
        .then(|| SourceFrame::from_root(root.attribute("viewBox"), root.attribute("width"), root.attribute("height")))
        .flatten();

    let metrics = TextMetrics {
        width_factor: options.text_width_factor,
        line_height: options.text_line_height,
    };
    let (nodes, mut report) = Flattener::new(&doc, options.max_depth, metrics)
        .with_node_budget(options.max_nodes)
        .run(root);

    let frame = declared.unwrap_or_else(|| {
        report.unsized_source = true;
        let frame = content_frame(&nodes);
        tracing::warn!(width = frame.width, height = frame.height, "svg has no viewBox or size, using drawing extent");
        frame
    });

    let placement = Placement::new(frame, target, options.center);
    report.scale = placement.scale;

    let mut elements: Vec<Element> = nodes.iter().map(|n| placement.element(n, options)).collect();

    if elements.is_empty() {
        tracing::warn!(skipped = report.skipped.len(), "no drawable nodes, importing whole document as an image");
        report.fallback = true;
        elements.push(Element::image(fallback_src()).with_bounds(Rect::new(0.0, 0.0, target.width, target.height)));
    }

    tracing::info!(
        elements = elements.len(),
        skipped = report.skipped.len(),
        depth_truncations = report.depth_truncations,
        budget_truncations = report.budget_truncations,
        scale = report.scale,
        "svg imported"
    );
    Ok(ImportOutcome { elements, report })
}

/// Frame spanning the user-space origin and every drawn node.
fn content_frame(nodes: &[SourceNode]) -> SourceFrame {
    let extent = Rect::from_points(
        nodes
            .iter()
            .flat_map(SourceNode::corners)
            .chain(std::iter::once(Point::new(0.0, 0.0))),
    )
    .filter(|r| r.width > 0.0 && r.height > 0.0);

    match extent {
        Some(r) => SourceFrame {
            min_x: r.x,
            min_y: r.y,
            width: r.width,
            height: r.height,
        },
        None => SourceFrame {
            min_x: 0.0,
            min_y: 0.0,
            width: UNSIZED_FRAME,
            height: UNSIZED_FRAME,
        },
    }
}

/// Source user space to canvas inches.
struct Placement {
    frame: SourceFrame,
    scale: f64,
    offset: Point,
}

impl Placement {
    fn new(frame: SourceFrame, target: Canvas, center: bool) -> Self {
        let scale = frame.fit_scale(target.width, target.height);
        let offset = if center {
            Point::new(
                (target.width - frame.width * scale) / 2.0,
                (target.height - frame.height * scale) / 2.0,
            )
        } else {
            Point::new(0.0, 0.0)
        };
        Self { frame, scale, offset }
    }

    fn point(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.frame.min_x) * self.scale + self.offset.x,
            (p.y - self.frame.min_y) * self.scale + self.offset.y,
        )
    }

    fn element(&self, node: &SourceNode, options: &ImportOptions) -> Element {
        let sx = node.transform.scale_x() * self.scale;
        let sy = node.transform.scale_y() * self.scale;
        let c = self.point(node.transform.apply(node.local.center()));
        let mut w = node.local.width * sx;
        let mut h = node.local.height * sy;
        let style = &node.style;

        let element = match &node.shape {
            SourceShape::Rect { corner_radius } => {
                let kind = if *corner_radius > 0.0 {
                    ShapeKind::RoundedRect
                } else {
                    ShapeKind::Rect
                };
                shape(kind, style, (sx + sy) / 2.0, corner_radius * sx.min(sy))
            }
            SourceShape::Ellipse => shape(ShapeKind::Circle, style, (sx + sy) / 2.0, 0.0),
            SourceShape::Line => {
                h = h.max(options.min_line_thickness);
                Element::shape(ShapeKind::Rect, style.stroke.clone())
            }
            SourceShape::Text { content } => text(content, style, sy),
            SourceShape::Image { href } => Element::image(href.clone()),
            SourceShape::Vector { markup, data } => {
                let mut el = Element::clipart(svg_data_uri(markup));
                if let ElementKind::Clipart(props) = &mut el.kind {
                    props.path_data = Some(data.clone());
                }
                el
            }
        };

        w = w.max(0.0);
        h = h.max(0.0);
        element
            .with_bounds(Rect::new(c.x - w / 2.0, c.y - h / 2.0, w, h))
            .with_rotation(node.transform.rotation() + node.local_rotation)
            .with_opacity(style.opacity)
    }
}

fn shape(kind: ShapeKind, style: &Style, stroke_scale: f64, corner_radius: f64) -> Element {
    let mut el = Element::shape(kind, style.fill.clone());
    if let ElementKind::Shape(props) = &mut el.kind {
        if style.stroke != "none" && style.stroke_width > 0.0 {
            props.stroke.clone_from(&style.stroke);
            props.stroke_width = style.stroke_width * stroke_scale;
        }
        props.corner_radius = corner_radius;
    }
    el
}

fn text(content: &str, style: &Style, scale: f64) -> Element {
    let mut el = Element::text(content, style.font_family.clone(), style.font_size * scale);
    if let ElementKind::Text(props) = &mut el.kind {
        props.color = if style.fill == "none" {
            "#000000".to_string()
        } else {
            style.fill.clone()
        };
        if style.bold {
            props.font_weight = FontWeight::Bold;
        }
        if style.italic {
            props.font_style = FontStyle::Italic;
        }
        props.text_decoration = match style.text_decoration.as_deref() {
            Some(d) if d.contains("underline") => TextDecoration::Underline,
            Some(d) if d.contains("line-through") => TextDecoration::LineThrough,
            _ => TextDecoration::None,
        };
        props.text_align = match style.text_anchor {
            TextAnchor::Start => TextAlign::Left,
            TextAnchor::Middle => TextAlign::Center,
            TextAnchor::End => TextAlign::Right,
        };
    }
    el
}
