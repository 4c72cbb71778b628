//! Depth-bounded traversal of an SVG tree into flat, positioned nodes.
//!
//! Containers (`svg`, `g`, `a`, `switch`) and `<use>` references are
//! expanded; every visual leaf becomes a [`SourceNode`] carrying its box in
//! its own user space plus the accumulated transform to the root. Nothing
//! here knows about the target canvas.
//!
//! Two limits bound the walk: a nesting depth and a total number of visited
//! elements. The node budget covers `<use>` fan-out, where a short document
//! can reference the same subtree exponentially many times; once it is spent
//! the walk stops and the nodes produced so far are returned.

use std::collections::{HashMap, HashSet};

use roxmltree::{Document, Node};

use canvas_core::{Point, Rect};

use crate::path::{path_bounds, points_bounds};
use crate::report::ImportReport;
use crate::style::{Style, TextAnchor};
use crate::transform::Transform;
use crate::units::parse_length;

/// The SVG namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// The legacy XLink namespace used by `xlink:href`.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Non-visual nodes skipped without a report entry.
const DEFINITIONS: &[&str] = &[
    "defs",
    "linearGradient",
    "radialGradient",
    "clipPath",
    "mask",
    "pattern",
    "filter",
    "marker",
    "symbol",
    "metadata",
    "style",
    "title",
    "desc",
    "script",
];

/// Text measurement factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Average glyph advance as a fraction of the font size.
    pub width_factor: f64,
    /// Line box height as a fraction of the font size.
    pub line_height: f64,
}

/// What a flattened node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceShape {
    /// `<rect>`; radius in local user units.
    Rect {
        /// Corner radius.
        corner_radius: f64,
    },
    /// `<circle>` or `<ellipse>`.
    Ellipse,
    /// `<line>`, drawn as a thin bar filled with the stroke colour.
    Line,
    /// `<text>` with collapsed content.
    Text {
        /// Text content.
        content: String,
    },
    /// `<image>`.
    Image {
        /// Image reference.
        href: String,
    },
    /// `<path>`, `<polygon>` or `<polyline>`.
    Vector {
        /// Standalone markup for the node.
        markup: String,
        /// Original `d` or `points` data.
        data: String,
    },
}

/// A visual leaf with its geometry in its own user space.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    /// What the node draws.
    pub shape: SourceShape,
    /// Box in the node's user space.
    pub local: Rect,
    /// Extra rotation of the box about its centre, degrees.
    pub local_rotation: f64,
    /// Accumulated transform into root user space.
    pub transform: Transform,
    /// Computed presentation style.
    pub style: Style,
}

impl SourceNode {
    /// Axis-aligned corners of the placed box in root user space.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let r = self.local;
        let c = r.center();
        [
            Point::new(r.x, r.y),
            Point::new(r.right(), r.y),
            Point::new(r.right(), r.bottom()),
            Point::new(r.x, r.bottom()),
        ]
        .map(|p| {
            self.transform
                .apply(canvas_core::geometry::rotate_point(p, c, self.local_rotation))
        })
    }
}

/// Tree walker state.
pub struct Flattener<'a, 'input> {
    max_depth: usize,
    node_budget: usize,
    visited: usize,
    metrics: TextMetrics,
    ids: HashMap<&'a str, Node<'a, 'input>>,
    in_progress: HashSet<&'a str>,
    nodes: Vec<SourceNode>,
    report: ImportReport,
}

impl<'a, 'input> Flattener<'a, 'input> {
    /// Prepare a walk over `doc` with an unlimited node budget.
    #[must_use]
    pub fn new(doc: &'a Document<'input>, max_depth: usize, metrics: TextMetrics) -> Self {
        let ids = doc
            .descendants()
            .filter(Node::is_element)
            .filter_map(|n| n.attribute("id").map(|id| (id, n)))
            .collect();
        Self {
            max_depth,
            node_budget: usize::MAX,
            visited: 0,
            metrics,
            ids,
            in_progress: HashSet::new(),
            nodes: Vec::new(),
            report: ImportReport::default(),
        }
    }

    /// Stop after visiting `budget` elements, counting every `<use>`
    /// expansion again.
    #[must_use]
    pub fn with_node_budget(mut self, budget: usize) -> Self {
        self.node_budget = budget;
        self
    }

    /// Walk from `root` and return the visual leaves in document order.
    #[must_use]
    pub fn run(mut self, root: Node<'a, 'input>) -> (Vec<SourceNode>, ImportReport) {
        self.walk(root, &Style::default(), Transform::IDENTITY, 0);
        (self.nodes, self.report)
    }

    fn walk(&mut self, node: Node<'a, 'input>, parent: &Style, ctm: Transform, depth: usize) {
        if !node.is_element() {
            return;
        }
        let tag = node.tag_name();
        if tag.namespace().is_some_and(|ns| ns != SVG_NS) {
            // Editor metadata such as sodipodi/inkscape nodes.
            return;
        }
        let name = tag.name();
        if DEFINITIONS.contains(&name) {
            return;
        }
        if depth > self.max_depth {
            self.report.depth_truncations += 1;
            tracing::warn!(element = name, depth, "maximum nesting depth reached, subtree dropped");
            return;
        }
        if self.visited >= self.node_budget {
            if self.report.budget_truncations == 0 {
                tracing::warn!(budget = self.node_budget, "node budget spent, remaining nodes dropped");
            }
            self.report.budget_truncations += 1;
            return;
        }
        self.visited += 1;

        let style = Style::resolve(parent, node);
        if style.hidden {
            return;
        }
        let ctm = match node.attribute("transform").map(Transform::parse) {
            None => ctm,
            Some(Ok(local)) => ctm.then(&local),
            Some(Err(e)) => {
                self.skip(node, e.to_string());
                return;
            }
        };

        match name {
            "svg" | "g" | "a" | "switch" => {
                let ctm = if name == "svg" && node.parent_element().is_some() {
                    ctm.then(&Transform::translate(
                        length(node, "x", style.font_size),
                        length(node, "y", style.font_size),
                    ))
                } else {
                    ctm
                };
                for child in node.children() {
                    self.walk(child, &style, ctm, depth + 1);
                }
            }
            "use" => self.expand_use(node, &style, ctm, depth),
            "rect" => self.rect(node, style, ctm),
            "circle" => {
                let r = length(node, "r", style.font_size);
                self.ellipse(node, style, ctm, r, r);
            }
            "ellipse" => {
                let rx = length(node, "rx", style.font_size);
                let ry = length(node, "ry", style.font_size);
                self.ellipse(node, style, ctm, rx, ry);
            }
            "line" => self.line(node, style, ctm),
            "text" => self.text(node, style, ctm),
            "image" => self.image(node, style, ctm),
            "path" | "polygon" | "polyline" => self.vector(node, style, ctm),
            _ => self.skip(node, "unsupported element".to_string()),
        }
    }

    fn expand_use(&mut self, node: Node<'a, 'input>, style: &Style, ctm: Transform, depth: usize) {
        let Some(id) = href(node).and_then(|h| h.strip_prefix('#')) else {
            self.skip(node, "use without a local reference".to_string());
            return;
        };
        let Some(target) = self.ids.get(id).copied() else {
            self.skip(node, format!("unresolved reference #{id}"));
            return;
        };
        if !self.in_progress.insert(id) {
            self.skip(node, format!("cyclic reference #{id}"));
            return;
        }

        let ctm = ctm.then(&Transform::translate(
            length(node, "x", style.font_size),
            length(node, "y", style.font_size),
        ));
        if target.tag_name().name() == "symbol" {
            for child in target.children() {
                self.walk(child, style, ctm, depth + 1);
            }
        } else {
            self.walk(target, style, ctm, depth + 1);
        }
        self.in_progress.remove(id);
    }

    fn rect(&mut self, node: Node<'a, 'input>, style: Style, ctm: Transform) {
        let fs = style.font_size;
        let (w, h) = (length(node, "width", fs), length(node, "height", fs));
        if w <= 0.0 || h <= 0.0 {
            self.skip(node, "zero-size rect".to_string());
            return;
        }
        let rx = attr_length(node, "rx", fs).or_else(|| attr_length(node, "ry", fs));
        let local = Rect::new(length(node, "x", fs), length(node, "y", fs), w, h);
        self.push(
            SourceShape::Rect {
                corner_radius: rx.unwrap_or(0.0).clamp(0.0, w.min(h) / 2.0),
            },
            local,
            0.0,
            ctm,
            style,
        );
    }

    fn ellipse(&mut self, node: Node<'a, 'input>, style: Style, ctm: Transform, rx: f64, ry: f64) {
        if rx <= 0.0 || ry <= 0.0 {
            self.skip(node, "zero-radius ellipse".to_string());
            return;
        }
        let fs = style.font_size;
        let (cx, cy) = (length(node, "cx", fs), length(node, "cy", fs));
        let local = Rect::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0);
        self.push(SourceShape::Ellipse, local, 0.0, ctm, style);
    }

    fn line(&mut self, node: Node<'a, 'input>, style: Style, ctm: Transform) {
        if style.stroke == "none" {
            self.skip(node, "line without stroke".to_string());
            return;
        }
        let fs = style.font_size;
        let a = Point::new(length(node, "x1", fs), length(node, "y1", fs));
        let b = Point::new(length(node, "x2", fs), length(node, "y2", fs));
        let len = a.distance_to(b);
        let angle = (b.y - a.y).atan2(b.x - a.x).to_degrees();
        let t = style.stroke_width;
        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let local = Rect::new(mid.x - len / 2.0, mid.y - t / 2.0, len, t);
        self.push(SourceShape::Line, local, angle, ctm, style);
    }

    fn text(&mut self, node: Node<'a, 'input>, style: Style, ctm: Transform) {
        let content = node
            .descendants()
            .filter(Node::is_text)
            .filter_map(|n| n.text())
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ");
        if content.is_empty() {
            self.skip(node, "empty text".to_string());
            return;
        }

        let size = style.font_size;
        let x = first_coordinate(node, "x", size);
        let baseline = first_coordinate(node, "y", size);
        #[allow(clippy::cast_precision_loss)]
        let width = content.chars().count() as f64 * size * self.metrics.width_factor;
        let height = size * self.metrics.line_height;
        let left = match style.text_anchor {
            TextAnchor::Start => x,
            TextAnchor::Middle => x - width / 2.0,
            TextAnchor::End => x - width,
        };
        let local = Rect::new(left, baseline - size, width, height);
        self.push(SourceShape::Text { content }, local, 0.0, ctm, style);
    }

    fn image(&mut self, node: Node<'a, 'input>, style: Style, ctm: Transform) {
        let Some(href) = href(node).filter(|h| !h.trim().is_empty()) else {
            self.skip(node, "image without href".to_string());
            return;
        };
        let fs = style.font_size;
        let local = Rect::new(
            length(node, "x", fs),
            length(node, "y", fs),
            length(node, "width", fs),
            length(node, "height", fs),
        );
        if local.width <= 0.0 || local.height <= 0.0 {
            self.skip(node, "image without size".to_string());
            return;
        }
        let shape = SourceShape::Image {
            href: href.trim().to_string(),
        };
        self.push(shape, local, 0.0, ctm, style);
    }

    fn vector(&mut self, node: Node<'a, 'input>, style: Style, ctm: Transform) {
        let name = node.tag_name().name();
        let (attr, bounds) = if name == "path" {
            ("d", node.attribute("d").and_then(path_bounds))
        } else {
            ("points", node.attribute("points").and_then(points_bounds))
        };
        let Some(mut bounds) = bounds else {
            self.skip(node, format!("{name} without geometry"));
            return;
        };
        let data = node.attribute(attr).unwrap_or_default().to_string();

        if style.stroke != "none" {
            let pad = style.stroke_width / 2.0;
            bounds = Rect::new(
                bounds.x - pad,
                bounds.y - pad,
                bounds.width + pad * 2.0,
                bounds.height + pad * 2.0,
            );
        }
        let markup = standalone_markup(name, attr, &data, node.attribute("fill-rule"), &style, bounds);
        self.push(SourceShape::Vector { markup, data }, bounds, 0.0, ctm, style);
    }

    fn push(&mut self, shape: SourceShape, local: Rect, local_rotation: f64, transform: Transform, style: Style) {
        self.nodes.push(SourceNode {
            shape,
            local,
            local_rotation,
            transform,
            style,
        });
    }

    fn skip(&mut self, node: Node<'a, 'input>, reason: String) {
        let element = node.tag_name().name().to_string();
        tracing::warn!(%element, %reason, "svg node skipped");
        self.report.skip(element, reason);
    }
}

/// `href` or legacy `xlink:href`.
fn href<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute("href").or_else(|| node.attribute((XLINK_NS, "href")))
}

fn attr_length(node: Node<'_, '_>, name: &str, font_size: f64) -> Option<f64> {
    node.attribute(name).and_then(|v| parse_length(v, font_size))
}

fn length(node: Node<'_, '_>, name: &str, font_size: f64) -> f64 {
    attr_length(node, name, font_size).unwrap_or(0.0)
}

/// First entry of a coordinate list such as `<text x="10 20 30">`.
fn first_coordinate(node: Node<'_, '_>, name: &str, font_size: f64) -> f64 {
    node.attribute(name)
        .and_then(|v| v.split([' ', ',']).find(|s| !s.is_empty()))
        .and_then(|v| parse_length(v, font_size))
        .unwrap_or(0.0)
}

/// A self-contained SVG document drawing one vector node, framed by its bounds.
fn standalone_markup(
    name: &str,
    attr: &str,
    data: &str,
    fill_rule: Option<&str>,
    style: &Style,
    bounds: Rect,
) -> String {
    let fill_rule = fill_rule
        .map(|r| format!(r#" fill-rule="{}""#, escape_attr(r)))
        .unwrap_or_default();
    format!(
        r#"<svg xmlns="{SVG_NS}" viewBox="{} {} {} {}" preserveAspectRatio="none"><{name} {attr}="{}" fill="{}" stroke="{}" stroke-width="{}"{fill_rule}/></svg>"#,
        bounds.x,
        bounds.y,
        bounds.width,
        bounds.height,
        escape_attr(data),
        style.fill,
        style.stroke,
        style.stroke_width,
    )
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: TextMetrics = TextMetrics {
        width_factor: 0.6,
        line_height: 1.2,
    };

    fn flatten(svg: &str, max_depth: usize) -> (Vec<SourceNode>, ImportReport) {
        let doc = Document::parse(svg).expect("xml");
        Flattener::new(&doc, max_depth, METRICS).run(doc.root_element())
    }

    #[test]
    fn test_groups_accumulate_transforms() {
        let (nodes, _) = flatten(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="translate(10 0)"><g transform="translate(0 5)"><rect width="4" height="2"/></g></g></svg>"#,
            10,
        );
        assert_eq!(nodes.len(), 1);
        let origin = nodes[0].transform.apply(Point::new(0.0, 0.0));
        assert_eq!(origin, Point::new(10.0, 5.0));
    }

    #[test]
    fn test_definitions_are_not_drawn() {
        let (nodes, report) = flatten(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><defs><rect id="r" width="1" height="1"/></defs><title>x</title></svg>"#,
            10,
        );
        assert!(nodes.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_use_expands_and_translates() {
        let (nodes, _) = flatten(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><defs><circle id="dot" r="2"/></defs><use xlink:href="#dot" x="10" y="10"/><use href="#dot" x="20"/></svg>"##,
            10,
        );
        assert_eq!(nodes.len(), 2);
        let c = nodes[0].transform.apply(nodes[0].local.center());
        assert_eq!(c, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_cyclic_use_is_cut() {
        let (nodes, report) = flatten(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"><rect width="1" height="1"/><use href="#a"/></g></svg>"##,
            10,
        );
        assert_eq!(nodes.len(), 1);
        assert!(report.skipped.iter().any(|s| s.reason.contains("cyclic")));
    }

    #[test]
    fn test_depth_cap_truncates() {
        let mut svg = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg">"#);
        for _ in 0..12 {
            svg.push_str("<g>");
        }
        svg.push_str(r#"<rect width="1" height="1"/>"#);
        for _ in 0..12 {
            svg.push_str("</g>");
        }
        svg.push_str("</svg>");

        let (nodes, report) = flatten(&svg, 10);
        assert!(nodes.is_empty());
        assert_eq!(report.depth_truncations, 1);

        let (nodes, _) = flatten(&svg, 20);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_node_budget_stops_use_fan_out() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg"><defs><rect id="r" width="1" height="1"/><g id="g"><use href="#r"/><use href="#r"/><use href="#r"/></g></defs><use href="#g"/><use href="#g"/><use href="#g"/></svg>"##;
        let doc = Document::parse(svg).expect("xml");

        let (all, report) = Flattener::new(&doc, 10, METRICS).run(doc.root_element());
        assert_eq!(all.len(), 9);
        assert_eq!(report.budget_truncations, 0);

        // svg, then use + g + 3 × (use + rect) per expansion.
        let (some, report) = Flattener::new(&doc, 10, METRICS)
            .with_node_budget(10)
            .run(doc.root_element());
        assert_eq!(some.len(), 3);
        assert!(report.budget_truncations > 0);
        assert!(report.is_lossy());
    }

    #[test]
    fn test_hidden_subtree_skipped() {
        let (nodes, _) = flatten(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g style="display:none"><rect width="1" height="1"/></g></svg>"#,
            10,
        );
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_matrix_node_skipped_and_reported() {
        let (nodes, report) = flatten(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="1" height="1" transform="matrix(1 0 0 1 0 0)"/><rect width="2" height="2"/></svg>"#,
            10,
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("matrix"));
    }

    #[test]
    fn test_text_estimate_and_anchor() {
        let (nodes, _) = flatten(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="100" y="50" font-size="10" text-anchor="middle">  Hi <tspan>there</tspan></text></svg>"#,
            10,
        );
        let node = &nodes[0];
        assert_eq!(node.shape, SourceShape::Text { content: "Hi there".into() });
        // 8 chars × 10 × 0.6
        assert!((node.local.width - 48.0).abs() < 1e-9);
        assert!((node.local.height - 12.0).abs() < 1e-9);
        assert!((node.local.x - 76.0).abs() < 1e-9);
        assert!((node.local.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_becomes_rotated_bar() {
        let (nodes, _) = flatten(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><line x1="0" y1="0" x2="0" y2="10" stroke="red" stroke-width="2"/></svg>"#,
            10,
        );
        let node = &nodes[0];
        assert_eq!(node.shape, SourceShape::Line);
        assert!((node.local.width - 10.0).abs() < 1e-9);
        assert!((node.local.height - 2.0).abs() < 1e-9);
        assert!((node.local_rotation - 90.0).abs() < 1e-9);
        assert_eq!(node.local.center(), Point::new(0.0, 5.0));
    }

    #[test]
    fn test_path_markup_is_framed() {
        let (nodes, _) = flatten(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M10 10 H30 V40 Z" fill="blue"/></svg>"#,
            10,
        );
        let SourceShape::Vector { markup, data } = &nodes[0].shape else {
            panic!("expected vector");
        };
        assert_eq!(data, "M10 10 H30 V40 Z");
        assert!(markup.contains(r#"viewBox="10 10 20 30""#));
        assert!(markup.contains("#0000ff"));
    }
}
