//! Pointer-driven selection and manipulation state machine.
//!
//! A [`Manipulator`] owns the in-flight gesture for one canvas. The host
//! feeds it pointer events in screen pixels together with the document it
//! edits, and receives a list of [`Action`]s describing what changed. While
//! [`Manipulator::is_capturing`] is true the host routes every pointer move
//! and pointer up to it, wherever the pointer is, so a gesture can never get
//! stuck when the pointer leaves the element.
//!
//! ```text
//!            pointer-down(element)          pointer-up
//!   Idle ─────────────────────────▶ Dragging ─────────▶ Idle
//!     │  pointer-down(handle)                 pointer-up
//!     ├───────────────────────────▶ Resizing ─────────▶ Idle
//!     │  double-click(text)                   end-edit / background
//!     └───────────────────────────▶ EditingText ──────▶ Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::document::{Canvas, DesignDocument};
use crate::element::{Element, ElementId, ElementKind, ElementPatch, TextPatch};
use crate::geometry::{clamp_font_size, rotate_point, Point, Rect, Viewport};
use crate::CanvasResult;

/// Smallest committed width/height of a resized element, in inches.
pub const MIN_ELEMENT_SIZE: f64 = 1.0;

/// A resize handle and the edges it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top edge.
    N,
    /// Bottom edge.
    S,
    /// Right edge.
    E,
    /// Left edge.
    W,
    /// Top-right corner.
    Ne,
    /// Top-left corner.
    Nw,
    /// Bottom-right corner.
    Se,
    /// Bottom-left corner.
    Sw,
}

impl Handle {
    /// Every handle, corners last so edge midpoints win hit-test ties.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::S,
        Self::E,
        Self::W,
        Self::Ne,
        Self::Nw,
        Self::Se,
        Self::Sw,
    ];

    /// Moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Moves the right edge.
    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Moves the top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Moves the bottom edge.
    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Position of the handle on an unrotated box.
    #[must_use]
    pub fn anchor(self, r: Rect) -> Point {
        let x = if self.moves_left() {
            r.x
        } else if self.moves_right() {
            r.right()
        } else {
            r.x + r.width / 2.0
        };
        let y = if self.moves_top() {
            r.y
        } else if self.moves_bottom() {
            r.bottom()
        } else {
            r.y + r.height / 2.0
        };
        Point::new(x, y)
    }
}

/// Resize `start` by dragging `handle` by `(dx, dy)` inches.
///
/// Far edges (`e`, `s`) change the size directly. Near edges (`n`, `w`)
/// change the size and shift the position by the same delta so the opposite
/// edge stays put. Sizes are floored at `min_size`, still anchored on the
/// opposite edge.
#[must_use]
pub fn resize_rect(start: Rect, handle: Handle, dx: f64, dy: f64, min_size: f64) -> Rect {
    let mut r = start;
    if handle.moves_right() {
        r.width = (start.width + dx).max(min_size);
    } else if handle.moves_left() {
        r.width = (start.width - dx).max(min_size);
        r.x = start.right() - r.width;
    }
    if handle.moves_bottom() {
        r.height = (start.height + dy).max(min_size);
    } else if handle.moves_top() {
        r.height = (start.height - dy).max(min_size);
        r.y = start.bottom() - r.height;
    }
    r
}

/// Map a handle drag on a text element into a font-size change.
///
/// The drag grows or shrinks the box proportionally; the font size follows
/// the same ratio, clamped to the accepted range, and the box is rescaled by
/// the clamped ratio with the opposite edges anchored.
#[must_use]
pub fn scale_text(start: Rect, start_font: f64, handle: Handle, dx: f64, dy: f64) -> (Rect, f64) {
    let grow_x = if handle.moves_right() {
        dx
    } else if handle.moves_left() {
        -dx
    } else {
        0.0
    };
    let grow_y = if handle.moves_bottom() {
        dy
    } else if handle.moves_top() {
        -dy
    } else {
        0.0
    };

    let ratio = if matches!(handle, Handle::E | Handle::W) {
        growth_ratio(start.width, grow_x)
    } else {
        growth_ratio(start.height, grow_y)
    };

    let font = clamp_font_size(start_font * ratio);
    let applied = if start_font > 0.0 { font / start_font } else { 1.0 };

    let mut r = start;
    r.width = start.width * applied;
    r.height = start.height * applied;
    if handle.moves_left() {
        r.x = start.right() - r.width;
    }
    if handle.moves_top() {
        r.y = start.bottom() - r.height;
    }
    (r, font)
}

fn growth_ratio(size: f64, grow: f64) -> f64 {
    if size > 0.0 {
        ((size + grow) / size).max(0.0)
    } else {
        1.0
    }
}

/// How drag gestures treat the canvas border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundsPolicy {
    /// Keep the element box within `[0, canvas - size]`.
    ClampToCanvas,
    /// Allow dragging past the canvas edge.
    Unbounded,
}

/// Product line a canvas edits; selects the editor policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasProfile {
    /// Banners, signs and stickers.
    Banner,
    /// Name badges.
    Badge,
}

/// Tunables for a [`Manipulator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Drag boundary policy.
    pub bounds: BoundsPolicy,
    /// Resize floor in inches.
    pub min_size: f64,
    /// Handle hit radius in screen pixels.
    pub handle_hit_radius: f64,
    /// Keyboard nudge step in inches.
    pub nudge_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::for_profile(CanvasProfile::Banner)
    }
}

impl EditorConfig {
    /// Configuration for a product profile.
    ///
    /// Banner canvases clamp drags to the canvas; badge canvases do not.
    #[must_use]
    pub fn for_profile(profile: CanvasProfile) -> Self {
        let bounds = match profile {
            CanvasProfile::Banner => BoundsPolicy::ClampToCanvas,
            CanvasProfile::Badge => BoundsPolicy::Unbounded,
        };
        Self {
            bounds,
            min_size: MIN_ELEMENT_SIZE,
            handle_hit_radius: 8.0,
            nudge_step: 0.125,
        }
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas.
    Background,
    /// An element body.
    Element(ElementId),
    /// A resize handle of the selected element.
    Handle(Handle),
}

/// The gesture currently in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    /// Nothing in progress.
    Idle,
    /// Moving an element.
    Dragging {
        /// Element being moved.
        id: ElementId,
        /// Pointer position at gesture start, screen pixels.
        start_pointer: Point,
        /// Element as it was at gesture start.
        before: Box<Element>,
    },
    /// Resizing an element through one of its handles.
    Resizing {
        /// Element being resized.
        id: ElementId,
        /// Handle being dragged.
        handle: Handle,
        /// Pointer position at gesture start, screen pixels.
        start_pointer: Point,
        /// Element as it was at gesture start.
        before: Box<Element>,
    },
    /// Editing the content of a text element.
    EditingText {
        /// Element being edited.
        id: ElementId,
        /// Uncommitted text.
        draft: String,
    },
}

impl GestureState {
    /// Element the gesture applies to.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } | Self::EditingText { id, .. } => {
                Some(*id)
            }
        }
    }
}

/// Why an interaction was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The element is locked.
    Locked,
    /// Only text elements can be edited in place.
    NotText,
    /// Another gesture is in flight.
    Busy,
}

/// Notification for the host after an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// An element became the selection.
    Selected(ElementId),
    /// The selection was cleared.
    Deselected(ElementId),
    /// Transient geometry changed; re-render.
    Updated(ElementId),
    /// A gesture or edit finished and changed the element.
    Committed {
        /// Changed element.
        id: ElementId,
        /// The element before the change, for history.
        before: Box<Element>,
    },
    /// In-place text editing began.
    TextEditStarted(ElementId),
    /// In-place text editing ended.
    TextEditEnded(ElementId),
    /// The interaction was refused.
    Rejected {
        /// Target element.
        id: ElementId,
        /// Reason.
        reason: RejectReason,
    },
    /// An element was removed.
    Removed(ElementId),
    /// An element was created from the selection.
    Created(ElementId),
}

/// Selection and gesture state machine for one canvas.
#[derive(Debug, Clone)]
pub struct Manipulator {
    config: EditorConfig,
    viewport: Viewport,
    state: GestureState,
    selected: Option<ElementId>,
}

impl Default for Manipulator {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Manipulator {
    /// Create a manipulator with the given configuration at 100% zoom.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            viewport: Viewport::default(),
            state: GestureState::Idle,
            selected: None,
        }
    }

    /// Create a manipulator for a product profile.
    #[must_use]
    pub fn for_profile(profile: CanvasProfile) -> Self {
        Self::new(EditorConfig::for_profile(profile))
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current gesture state.
    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Selected element, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Change zoom or pixel density. Stored geometry is unaffected.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Whether a pointer gesture is in flight and owns all pointer events.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        matches!(
            self.state,
            GestureState::Dragging { .. } | GestureState::Resizing { .. }
        )
    }

    /// Resolve a screen point into a pointer target.
    ///
    /// Handles of the selected element take priority over element bodies.
    #[must_use]
    pub fn target_at(&self, doc: &DesignDocument, screen: Point) -> PointerTarget {
        if let Some(el) = self.selected.and_then(|id| doc.get(id)) {
            let bounds = el.bounds();
            let center = bounds.center();
            for handle in Handle::ALL {
                let anchor = rotate_point(handle.anchor(bounds), center, el.rotation);
                let anchor = self.viewport.canvas_to_screen(anchor);
                if anchor.distance_to(screen) <= self.config.handle_hit_radius {
                    return PointerTarget::Handle(handle);
                }
            }
        }
        match doc.element_at(self.viewport.screen_to_canvas(screen)) {
            Some(id) => PointerTarget::Element(id),
            None => PointerTarget::Background,
        }
    }

    /// Handle a pointer-down event. Returns actions for the host.
    pub fn pointer_down(&mut self, doc: &mut DesignDocument, target: PointerTarget, screen: Point) -> Vec<Action> {
        let mut actions = Vec::new();

        // A pointer-up was lost; commit what we have before starting over.
        if self.is_capturing() {
            self.finish_gesture(doc, None, &mut actions);
        }

        match target {
            PointerTarget::Background => {
                self.end_text_edit_into(doc, &mut actions);
                if let Some(old) = self.selected.take() {
                    actions.push(Action::Deselected(old));
                }
            }
            PointerTarget::Element(id) => {
                if let GestureState::EditingText { id: editing, .. } = &self.state {
                    if *editing == id {
                        // Caret placement inside the edited text.
                        return actions;
                    }
                    self.end_text_edit_into(doc, &mut actions);
                }
                let Some(element) = doc.get(id) else {
                    return actions;
                };
                let locked = element.locked;
                let before = Box::new(element.clone());
                self.select_into(id, &mut actions);
                if locked {
                    tracing::debug!(%id, "drag refused on locked element");
                    actions.push(Action::Rejected {
                        id,
                        reason: RejectReason::Locked,
                    });
                    return actions;
                }
                tracing::debug!(%id, "drag start");
                self.state = GestureState::Dragging {
                    id,
                    start_pointer: screen,
                    before,
                };
            }
            PointerTarget::Handle(handle) => {
                let Some(id) = self.selected else {
                    return actions;
                };
                if matches!(&self.state, GestureState::EditingText { id: editing, .. } if *editing == id) {
                    return actions;
                }
                let Some(element) = doc.get(id) else {
                    return actions;
                };
                if element.locked {
                    actions.push(Action::Rejected {
                        id,
                        reason: RejectReason::Locked,
                    });
                    return actions;
                }
                tracing::debug!(%id, ?handle, "resize start");
                self.state = GestureState::Resizing {
                    id,
                    handle,
                    start_pointer: screen,
                    before: Box::new(element.clone()),
                };
            }
        }
        actions
    }

    /// Handle a pointer-move event. Returns actions for the host.
    pub fn pointer_move(&mut self, doc: &mut DesignDocument, screen: Point) -> Vec<Action> {
        match self.apply_pointer(doc, screen) {
            Some(id) => vec![Action::Updated(id)],
            None => Vec::new(),
        }
    }

    /// Handle a pointer-up event, wherever it happened. Returns actions for the host.
    pub fn pointer_up(&mut self, doc: &mut DesignDocument, screen: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        self.finish_gesture(doc, Some(screen), &mut actions);
        actions
    }

    /// Handle a double click on an element.
    pub fn double_click(&mut self, doc: &mut DesignDocument, id: ElementId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.is_capturing() {
            actions.push(Action::Rejected {
                id,
                reason: RejectReason::Busy,
            });
            return actions;
        }
        let Some(element) = doc.get(id) else {
            return actions;
        };
        let draft = match &element.kind {
            ElementKind::Text(props) => props.content.clone(),
            ElementKind::Image(_) | ElementKind::Clipart(_) | ElementKind::Shape(_) => {
                actions.push(Action::Rejected {
                    id,
                    reason: RejectReason::NotText,
                });
                return actions;
            }
        };
        if element.locked {
            actions.push(Action::Rejected {
                id,
                reason: RejectReason::Locked,
            });
            return actions;
        }
        if matches!(&self.state, GestureState::EditingText { id: editing, .. } if *editing == id) {
            return actions;
        }
        self.end_text_edit_into(doc, &mut actions);
        self.select_into(id, &mut actions);
        tracing::debug!(%id, "text edit start");
        self.state = GestureState::EditingText { id, draft };
        actions.push(Action::TextEditStarted(id));
        actions
    }

    /// Replace the uncommitted text of the element being edited.
    ///
    /// Returns `false` when no text edit is active.
    pub fn set_text_draft(&mut self, text: impl Into<String>) -> bool {
        if let GestureState::EditingText { draft, .. } = &mut self.state {
            *draft = text.into();
            true
        } else {
            false
        }
    }

    /// Commit the text being edited and return to idle.
    pub fn end_text_edit(&mut self, doc: &mut DesignDocument) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_text_edit_into(doc, &mut actions);
        actions
    }

    /// Select an element outside of a pointer gesture, e.g. from a layer panel.
    pub fn select(&mut self, doc: &mut DesignDocument, id: ElementId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.is_capturing() {
            actions.push(Action::Rejected {
                id,
                reason: RejectReason::Busy,
            });
            return actions;
        }
        if doc.get(id).is_none() {
            return actions;
        }
        if self.state.element() != Some(id) {
            self.end_text_edit_into(doc, &mut actions);
        }
        self.select_into(id, &mut actions);
        actions
    }

    /// Move the selected element by whole nudge steps.
    pub fn nudge(&mut self, doc: &mut DesignDocument, steps_x: i32, steps_y: i32) -> Vec<Action> {
        let mut actions = Vec::new();
        if !matches!(self.state, GestureState::Idle) {
            return actions;
        }
        let Some(id) = self.selected else {
            return actions;
        };
        let canvas = doc.canvas;
        let (bounds, step) = (self.config.bounds, self.config.nudge_step);
        let Some(element) = doc.get_mut(id) else {
            return actions;
        };
        if element.locked {
            actions.push(Action::Rejected {
                id,
                reason: RejectReason::Locked,
            });
            return actions;
        }
        let before = Box::new(element.clone());
        let target = Point::new(
            element.x + f64::from(steps_x) * step,
            element.y + f64::from(steps_y) * step,
        );
        let p = constrain(bounds, canvas, target, element.width, element.height);
        element.x = p.x;
        element.y = p.y;
        if element.bounds() != before.bounds() {
            actions.push(Action::Committed { id, before });
        }
        actions
    }

    /// Delete the selected element. Locked elements can be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected element no longer exists.
    pub fn delete_selected(&mut self, doc: &mut DesignDocument) -> CanvasResult<Vec<Action>> {
        let mut actions = Vec::new();
        let Some(id) = self.selected else {
            return Ok(actions);
        };
        if self.state.element() == Some(id) {
            self.state = GestureState::Idle;
        }
        doc.remove_element(id)?;
        self.selected = None;
        actions.push(Action::Deselected(id));
        actions.push(Action::Removed(id));
        Ok(actions)
    }

    /// Duplicate the selected element and select the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected element no longer exists.
    pub fn duplicate_selected(&mut self, doc: &mut DesignDocument) -> CanvasResult<Vec<Action>> {
        let mut actions = Vec::new();
        let Some(id) = self.selected else {
            return Ok(actions);
        };
        if self.is_capturing() {
            actions.push(Action::Rejected {
                id,
                reason: RejectReason::Busy,
            });
            return Ok(actions);
        }
        self.end_text_edit_into(doc, &mut actions);
        let copy = doc.duplicate_element(id)?;
        actions.push(Action::Created(copy));
        self.select_into(copy, &mut actions);
        Ok(actions)
    }

    /// Lock or unlock the selected element.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected element no longer exists.
    pub fn set_selected_locked(&mut self, doc: &mut DesignDocument, locked: bool) -> CanvasResult<Vec<Action>> {
        let mut actions = Vec::new();
        let Some(id) = self.selected else {
            return Ok(actions);
        };
        if self.is_capturing() {
            actions.push(Action::Rejected {
                id,
                reason: RejectReason::Busy,
            });
            return Ok(actions);
        }
        if locked && self.state.element() == Some(id) {
            self.end_text_edit_into(doc, &mut actions);
        }
        let before = doc
            .get(id)
            .cloned()
            .ok_or_else(|| crate::CanvasError::ElementNotFound(id.to_string()))?;
        if before.locked != locked {
            doc.update_element(
                id,
                &ElementPatch {
                    locked: Some(locked),
                    ..ElementPatch::default()
                },
            )?;
            actions.push(Action::Committed {
                id,
                before: Box::new(before),
            });
        }
        Ok(actions)
    }

    /// Drop any reference to an element removed by someone else.
    pub fn forget(&mut self, id: ElementId) {
        if self.state.element() == Some(id) {
            self.state = GestureState::Idle;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    fn select_into(&mut self, id: ElementId, actions: &mut Vec<Action>) {
        if self.selected == Some(id) {
            return;
        }
        if let Some(old) = self.selected.replace(id) {
            actions.push(Action::Deselected(old));
        }
        actions.push(Action::Selected(id));
    }

    /// Apply the transient geometry for the pointer position.
    fn apply_pointer(&mut self, doc: &mut DesignDocument, screen: Point) -> Option<ElementId> {
        let canvas = doc.canvas;
        match &self.state {
            GestureState::Idle | GestureState::EditingText { .. } => None,
            GestureState::Dragging {
                id,
                start_pointer,
                before,
            } => {
                let dx = self.viewport.to_inches(screen.x - start_pointer.x);
                let dy = self.viewport.to_inches(screen.y - start_pointer.y);
                let target = Point::new(before.x + dx, before.y + dy);
                let p = constrain(self.config.bounds, canvas, target, before.width, before.height);
                let element = doc.get_mut(*id)?;
                element.x = p.x;
                element.y = p.y;
                Some(*id)
            }
            GestureState::Resizing {
                id,
                handle,
                start_pointer,
                before,
            } => {
                let delta = Point::new(
                    self.viewport.to_inches(screen.x - start_pointer.x),
                    self.viewport.to_inches(screen.y - start_pointer.y),
                );
                // Handles follow the element's own axes.
                let local = rotate_point(delta, Point::default(), -before.rotation);
                let element = doc.get_mut(*id)?;
                if let Some(start_font) = before.font_size() {
                    let (r, font) = scale_text(before.bounds(), start_font, *handle, local.x, local.y);
                    if let ElementKind::Text(props) = &mut element.kind {
                        props.font_size = font;
                    }
                    element.set_bounds(r);
                } else {
                    element.set_bounds(resize_rect(before.bounds(), *handle, local.x, local.y, 0.0));
                }
                Some(*id)
            }
        }
    }

    /// Commit the gesture in flight; `screen` is the final pointer position when known.
    fn finish_gesture(&mut self, doc: &mut DesignDocument, screen: Option<Point>, actions: &mut Vec<Action>) {
        if let Some(screen) = screen {
            self.apply_pointer(doc, screen);
        }
        let min_size = self.config.min_size;
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => {}
            GestureState::EditingText { id, draft } => {
                // Pointer-up does not end an in-place edit.
                self.state = GestureState::EditingText { id, draft };
            }
            GestureState::Dragging { id, before, .. } => {
                if let Some(element) = doc.get(id) {
                    tracing::debug!(%id, x = element.x, y = element.y, "drag commit");
                    if element.bounds() != before.bounds() {
                        actions.push(Action::Committed { id, before });
                    }
                }
            }
            GestureState::Resizing { id, handle, before, .. } => {
                if let Some(element) = doc.get_mut(id) {
                    // Text is bounded by the font size range instead.
                    if !element.is_text() {
                        let floored = resize_rect(element.bounds(), handle, 0.0, 0.0, min_size);
                        element.set_bounds(floored);
                    }
                    tracing::debug!(%id, w = element.width, h = element.height, "resize commit");
                    if *element != *before {
                        actions.push(Action::Committed { id, before });
                    }
                }
            }
        }
    }

    fn end_text_edit_into(&mut self, doc: &mut DesignDocument, actions: &mut Vec<Action>) {
        let GestureState::EditingText { id, draft } = std::mem::replace(&mut self.state, GestureState::Idle) else {
            return;
        };
        if let Some(before) = doc.get(id).cloned() {
            let patch = ElementPatch {
                text: Some(TextPatch {
                    content: Some(draft),
                    ..TextPatch::default()
                }),
                ..ElementPatch::default()
            };
            match doc.update_element(id, &patch) {
                Ok(()) => {
                    if doc.get(id) != Some(&before) {
                        actions.push(Action::Committed {
                            id,
                            before: Box::new(before),
                        });
                    }
                }
                Err(e) => tracing::warn!(%id, "text commit failed: {e}"),
            }
        }
        tracing::debug!(%id, "text edit end");
        actions.push(Action::TextEditEnded(id));
    }
}

/// Apply the drag boundary policy to a candidate top-left position.
fn constrain(policy: BoundsPolicy, canvas: Canvas, p: Point, width: f64, height: f64) -> Point {
    match policy {
        BoundsPolicy::Unbounded => p,
        BoundsPolicy::ClampToCanvas => Point::new(
            p.x.min(canvas.width - width).max(0.0),
            p.y.min(canvas.height - height).max(0.0),
        ),
    }
}
