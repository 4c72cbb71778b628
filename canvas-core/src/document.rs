//! The design document: canvas size plus the ordered element sequence.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, ElementPatch};
use crate::geometry::Point;
use crate::layers::{self, LayerOp};
use crate::template::Template;
use crate::{CanvasError, CanvasResult};

/// Offset applied to duplicated elements, in inches.
pub const DUPLICATE_OFFSET: f64 = 0.25;

/// Physical canvas size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    /// Width in inches.
    pub width: f64,
    /// Height in inches.
    pub height: f64,
}

impl Canvas {
    /// Create a canvas of the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// How a template is combined with the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    /// Append the template elements on top of the existing ones.
    Append,
    /// Discard existing elements first.
    Replace,
}

/// A complete editable artwork.
///
/// The order of `elements` is the paint and print order: later elements are
/// drawn on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    /// Physical canvas size.
    pub canvas: Canvas,
    /// Elements in paint order.
    elements: Vec<Element>,
}

impl DesignDocument {
    /// Create a blank document.
    #[must_use]
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            elements: Vec::new(),
        }
    }

    /// Elements in paint order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append an element on top of all others.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateId`] if the id is already present.
    pub fn add_element(&mut self, mut element: Element) -> CanvasResult<ElementId> {
        if self.index_of(element.id).is_some() {
            return Err(CanvasError::DuplicateId(element.id.to_string()));
        }
        element.normalize();
        let id = element.id;
        tracing::debug!(%id, kind = element.kind.name(), "add element");
        self.elements.push(element);
        Ok(id)
    }

    /// Append several elements, in order, on top of all others.
    ///
    /// Either all elements are added or none are.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateId`] if any id collides with the
    /// document or with another element in the batch.
    pub fn extend(&mut self, elements: Vec<Element>) -> CanvasResult<Vec<ElementId>> {
        let mut seen: HashSet<ElementId> = self.elements.iter().map(|e| e.id).collect();
        for el in &elements {
            if !seen.insert(el.id) {
                return Err(CanvasError::DuplicateId(el.id.to_string()));
            }
        }
        let ids = elements.iter().map(|e| e.id).collect();
        self.elements.extend(elements.into_iter().map(|mut e| {
            e.normalize();
            e
        }));
        Ok(ids)
    }

    /// Remove an element by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: ElementId) -> CanvasResult<Element> {
        let index = self.require_index(id)?;
        tracing::debug!(%id, "remove element");
        Ok(self.elements.remove(index))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Canonical (paint order) index of an element.
    #[must_use]
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn require_index(&self, id: ElementId) -> CanvasResult<usize> {
        self.index_of(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))
    }

    /// Apply a partial property update.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or the patch does not
    /// match its kind.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> CanvasResult<()> {
        let element = self
            .get_mut(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
        element.apply_patch(patch)
    }

    /// Duplicate an element, placing the copy on top.
    ///
    /// Locked elements can be duplicated; the copy keeps the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn duplicate_element(&mut self, id: ElementId) -> CanvasResult<ElementId> {
        let copy = self
            .get(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?
            .duplicate(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        self.add_element(copy)
    }

    /// Reorder an element within the paint order.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or the destination index is
    /// out of range.
    pub fn reorder(&mut self, id: ElementId, op: LayerOp) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        self.elements = layers::apply(&self.elements, index, op)?;
        Ok(())
    }

    /// Reorder using a top-first layer panel index.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of range.
    pub fn reorder_display(&mut self, display_index: usize, op: LayerOp) -> CanvasResult<()> {
        self.elements = layers::apply_display(&self.elements, display_index, op)?;
        Ok(())
    }

    /// Topmost visible element containing the canvas point.
    #[must_use]
    pub fn element_at(&self, p: Point) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.visible && e.contains_point(p))
            .map(|e| e.id)
    }

    /// Resolve a template against this canvas and add its elements.
    ///
    /// The document is left unchanged when this fails, in either mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved elements collide with existing ids.
    pub fn apply_template(&mut self, template: &Template, mode: TemplateMode) -> CanvasResult<Vec<ElementId>> {
        let resolved = template.resolve(self.canvas);
        tracing::debug!(count = resolved.len(), ?mode, "apply template");
        match mode {
            TemplateMode::Append => self.extend(resolved),
            TemplateMode::Replace => {
                let mut replacement = Self::new(self.canvas);
                let ids = replacement.extend(resolved)?;
                *self = replacement;
                Ok(ids)
            }
        }
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// Out-of-range numeric fields are clamped as [`Element::normalize`]
    /// does.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or element ids repeat.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let raw: Self = serde_json::from_str(json)?;
        let mut doc = Self::new(raw.canvas);
        doc.extend(raw.elements)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ShapeKind;
    use crate::geometry::Rect;

    fn shape_at(x: f64, y: f64) -> Element {
        Element::shape(ShapeKind::Rect, "#00ff00").with_bounds(Rect::new(x, y, 2.0, 2.0))
    }

    #[test]
    fn test_document_add_remove() {
        let mut doc = DesignDocument::new(Canvas::new(24.0, 12.0));
        assert!(doc.is_empty());

        let id = doc.add_element(shape_at(0.0, 0.0)).expect("add");
        assert_eq!(doc.len(), 1);
        assert!(doc.get(id).is_some());

        doc.remove_element(id).expect("should remove");
        assert!(doc.is_empty());
        assert!(matches!(doc.remove_element(id), Err(CanvasError::ElementNotFound(_))));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut doc = DesignDocument::new(Canvas::new(24.0, 12.0));
        let el = shape_at(0.0, 0.0);
        doc.add_element(el.clone()).expect("add");
        assert!(matches!(doc.add_element(el), Err(CanvasError::DuplicateId(_))));
    }

    #[test]
    fn test_extend_is_all_or_nothing() {
        let mut doc = DesignDocument::new(Canvas::new(24.0, 12.0));
        let a = shape_at(0.0, 0.0);
        let result = doc.extend(vec![a.clone(), shape_at(1.0, 1.0), a]);
        assert!(result.is_err());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_element_at_prefers_topmost() {
        let mut doc = DesignDocument::new(Canvas::new(24.0, 12.0));
        let bottom = doc.add_element(shape_at(0.0, 0.0)).expect("add");
        let top = doc.add_element(shape_at(1.0, 1.0)).expect("add");

        assert_eq!(doc.element_at(Point::new(1.5, 1.5)), Some(top));
        assert_eq!(doc.element_at(Point::new(0.5, 0.5)), Some(bottom));
        assert_eq!(doc.element_at(Point::new(10.0, 10.0)), None);

        doc.update_element(top, &ElementPatch { visible: Some(false), ..ElementPatch::default() })
            .expect("hide");
        assert_eq!(doc.element_at(Point::new(1.5, 1.5)), Some(bottom));
    }

    #[test]
    fn test_duplicate_goes_on_top() {
        let mut doc = DesignDocument::new(Canvas::new(24.0, 12.0));
        let a = doc.add_element(shape_at(0.0, 0.0)).expect("add");
        doc.add_element(shape_at(5.0, 5.0)).expect("add");
        let copy = doc.duplicate_element(a).expect("dup");
        assert_eq!(doc.index_of(copy), Some(2));
        let el = doc.get(copy).expect("copy");
        assert!((el.x - DUPLICATE_OFFSET).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reorder_by_id() {
        let mut doc = DesignDocument::new(Canvas::new(24.0, 12.0));
        let a = doc.add_element(shape_at(0.0, 0.0)).expect("add");
        let b = doc.add_element(shape_at(1.0, 0.0)).expect("add");
        doc.reorder(a, LayerOp::BringToFront).expect("reorder");
        assert_eq!(doc.index_of(a), Some(1));
        assert_eq!(doc.index_of(b), Some(0));
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let mut doc = DesignDocument::new(Canvas::new(72.0, 36.0));
        doc.add_element(shape_at(0.0, 0.0)).expect("add");
        doc.add_element(Element::text("SALE", "Impact", 1.0)).expect("add");
        doc.add_element(Element::image("https://cdn.example.com/a.png")).expect("add");

        let json = doc.to_json().expect("to json");
        let back = DesignDocument::from_json(&json).expect("from json");
        assert_eq!(back, doc);
        let value: serde_json::Value = serde_json::from_str(&json).expect("value");
        assert_eq!(value["canvas"]["width"], 72.0);
        assert_eq!(value["elements"][1]["type"], "text");
    }

    #[test]
    fn test_template_replace_swaps_whole_document() {
        use crate::template::{Template, TemplateElement};
        use crate::document::TemplateMode;

        let mut doc = DesignDocument::new(Canvas::new(6.0, 4.0));
        let old = doc.add_element(shape_at(1.0, 1.0)).expect("add");
        let template = Template {
            name: "Sale".into(),
            canvas_width: 6.0,
            canvas_height: 4.0,
            elements: vec![TemplateElement {
                x: 0.0,
                y: 0.0,
                width: 0.5,
                height: 0.5,
                rotation: 0.0,
                kind: shape_at(0.0, 0.0).kind,
            }],
        };

        let ids = doc.apply_template(&template, TemplateMode::Replace).expect("replace");
        assert_eq!(doc.canvas, Canvas::new(6.0, 4.0));
        assert!(doc.get(old).is_none());
        assert_eq!(doc.elements().iter().map(|e| e.id).collect::<Vec<_>>(), ids);
        assert_eq!(doc.elements()[0].bounds(), Rect::new(0.0, 0.0, 3.0, 2.0));
    }

    #[test]
    fn test_from_json_rejects_repeated_ids() {
        let el = shape_at(0.0, 0.0);
        let json = serde_json::json!({
            "canvas": { "width": 10.0, "height": 10.0 },
            "elements": [el.clone(), el],
        })
        .to_string();
        assert!(matches!(DesignDocument::from_json(&json), Err(CanvasError::DuplicateId(_))));
    }
}
