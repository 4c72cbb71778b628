//! Gesture Integration Tests
//!
//! Drives the manipulator with pointer sequences the way a canvas host does:
//! - Drag with and without canvas clamping
//! - Anchor-preserving resize and the commit floor
//! - Locked elements
//! - In-place text editing
//! - Zoom independence

use canvas_core::geometry::points_to_inches;
use canvas_core::{
    Action, Canvas, CanvasProfile, DesignDocument, Element, ElementId, ElementPatch, GestureState, Handle,
    Manipulator, Point, PointerTarget, Rect, RejectReason, ShapeKind, Viewport,
};

/// 100 screen pixels per inch keeps the arithmetic readable.
fn viewport() -> Viewport {
    Viewport {
        zoom: 100.0,
        pixels_per_inch: 100.0,
    }
}

fn setup(profile: CanvasProfile) -> (DesignDocument, Manipulator, ElementId) {
    let mut doc = DesignDocument::new(Canvas::new(10.0, 5.0));
    let id = doc
        .add_element(Element::shape(ShapeKind::Rect, "#3366ff").with_bounds(Rect::new(1.0, 1.0, 2.0, 2.0)))
        .expect("add");
    let mut m = Manipulator::for_profile(profile);
    m.set_viewport(viewport());
    (doc, m, id)
}

fn bounds(doc: &DesignDocument, id: ElementId) -> Rect {
    doc.get(id).expect("element").bounds()
}

fn committed(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::Committed { .. }))
}

// ============================================================================
// Drag Tests
// ============================================================================

#[test]
fn test_drag_moves_by_pointer_delta() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);

    let actions = m.pointer_down(&mut doc, PointerTarget::Element(id), Point::new(150.0, 150.0));
    assert!(actions.contains(&Action::Selected(id)));
    assert!(m.is_capturing());

    let actions = m.pointer_move(&mut doc, Point::new(250.0, 200.0));
    assert_eq!(actions, vec![Action::Updated(id)]);
    assert_eq!(bounds(&doc, id), Rect::new(2.0, 1.5, 2.0, 2.0));

    let actions = m.pointer_up(&mut doc, Point::new(250.0, 200.0));
    assert!(committed(&actions));
    assert_eq!(m.state(), &GestureState::Idle);
}

#[test]
fn test_banner_drag_is_clamped_to_canvas() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    m.pointer_down(&mut doc, PointerTarget::Element(id), Point::new(150.0, 150.0));
    m.pointer_move(&mut doc, Point::new(2000.0, -900.0));
    m.pointer_up(&mut doc, Point::new(2000.0, -900.0));
    assert_eq!(bounds(&doc, id), Rect::new(8.0, 0.0, 2.0, 2.0));
}

#[test]
fn test_badge_drag_is_unbounded() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Badge);
    m.pointer_down(&mut doc, PointerTarget::Element(id), Point::new(150.0, 150.0));
    m.pointer_move(&mut doc, Point::new(2000.0, -900.0));
    m.pointer_up(&mut doc, Point::new(2000.0, -900.0));
    let b = bounds(&doc, id);
    assert!((b.x - 19.5).abs() < 1e-9);
    assert!((b.y + 9.5).abs() < 1e-9);
}

#[test]
fn test_pointer_up_far_outside_ends_gesture() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Badge);
    m.pointer_down(&mut doc, PointerTarget::Element(id), Point::new(150.0, 150.0));
    m.pointer_move(&mut doc, Point::new(-5000.0, -5000.0));
    m.pointer_up(&mut doc, Point::new(-5000.0, -5000.0));
    assert!(!m.is_capturing());
    // Further moves no longer affect the element.
    let before = bounds(&doc, id);
    assert!(m.pointer_move(&mut doc, Point::new(0.0, 0.0)).is_empty());
    assert_eq!(bounds(&doc, id), before);
}

#[test]
fn test_click_without_move_does_not_commit() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    m.pointer_down(&mut doc, PointerTarget::Element(id), Point::new(150.0, 150.0));
    let actions = m.pointer_up(&mut doc, Point::new(150.0, 150.0));
    assert!(!committed(&actions));
    assert_eq!(m.selected(), Some(id));
}

#[test]
fn test_missed_pointer_up_commits_before_next_gesture() {
    let (mut doc, mut m, a) = setup(CanvasProfile::Badge);
    let b = doc
        .add_element(Element::shape(ShapeKind::Circle, "#000").with_bounds(Rect::new(5.0, 1.0, 1.0, 1.0)))
        .expect("add");
    m.pointer_down(&mut doc, PointerTarget::Element(a), Point::new(150.0, 150.0));
    m.pointer_move(&mut doc, Point::new(160.0, 150.0));
    let actions = m.pointer_down(&mut doc, PointerTarget::Element(b), Point::new(550.0, 150.0));
    assert!(matches!(actions.first(), Some(Action::Committed { id, .. }) if *id == a));
    assert!(actions.contains(&Action::Deselected(a)));
    assert!(actions.contains(&Action::Selected(b)));
}

#[test]
fn test_zoom_does_not_change_stored_geometry() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    let before = bounds(&doc, id);
    m.set_viewport(Viewport {
        zoom: 200.0,
        pixels_per_inch: 100.0,
    });
    assert_eq!(bounds(&doc, id), before);

    // At 200% one inch is 200 screen pixels.
    m.pointer_down(&mut doc, PointerTarget::Element(id), Point::new(300.0, 300.0));
    m.pointer_move(&mut doc, Point::new(500.0, 300.0));
    m.pointer_up(&mut doc, Point::new(500.0, 300.0));
    assert!((bounds(&doc, id).x - 2.0).abs() < 1e-9);
}

// ============================================================================
// Resize Tests
// ============================================================================

#[test]
fn test_se_handle_is_hit_tested_and_resizes() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    m.select(&mut doc, id);
    let target = m.target_at(&doc, Point::new(302.0, 299.0));
    assert_eq!(target, PointerTarget::Handle(Handle::Se));

    m.pointer_down(&mut doc, target, Point::new(300.0, 300.0));
    m.pointer_move(&mut doc, Point::new(350.0, 250.0));
    let actions = m.pointer_up(&mut doc, Point::new(350.0, 250.0));
    assert!(committed(&actions));

    let b = bounds(&doc, id);
    assert_eq!((b.x, b.y), (1.0, 1.0));
    assert!((b.width - 2.5).abs() < 1e-9);
    assert!((b.height - 1.5).abs() < 1e-9);
}

#[test]
fn test_nw_resize_keeps_opposite_corner() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    m.select(&mut doc, id);
    let start = bounds(&doc, id);

    m.pointer_down(&mut doc, PointerTarget::Handle(Handle::Nw), Point::new(100.0, 100.0));
    m.pointer_move(&mut doc, Point::new(60.0, 130.0));
    m.pointer_up(&mut doc, Point::new(60.0, 130.0));

    let b = bounds(&doc, id);
    assert!(((b.x - start.x) + (b.width - start.width)).abs() < 1e-9);
    assert!(((b.y - start.y) + (b.height - start.height)).abs() < 1e-9);
    assert!((b.right() - start.right()).abs() < 1e-9);
    assert!((b.bottom() - start.bottom()).abs() < 1e-9);
}

#[test]
fn test_resize_floor_applies_on_commit_only() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    m.select(&mut doc, id);
    m.pointer_down(&mut doc, PointerTarget::Handle(Handle::Se), Point::new(300.0, 300.0));
    m.pointer_move(&mut doc, Point::new(120.0, 130.0));

    // Transient geometry is not validated.
    let live = bounds(&doc, id);
    assert!(live.width < 1.0);

    m.pointer_up(&mut doc, Point::new(120.0, 130.0));
    let b = bounds(&doc, id);
    assert!((b.width - 1.0).abs() < 1e-9);
    assert!((b.height - 1.0).abs() < 1e-9);
    assert_eq!((b.x, b.y), (1.0, 1.0));
}

#[test]
fn test_text_resize_scales_font() {
    let mut doc = DesignDocument::new(Canvas::new(10.0, 5.0));
    let id = doc
        .add_element(
            Element::text("SALE", "Impact", points_to_inches(36.0)).with_bounds(Rect::new(1.0, 1.0, 4.0, 1.0)),
        )
        .expect("add");
    let mut m = Manipulator::default();
    m.set_viewport(viewport());
    m.select(&mut doc, id);

    m.pointer_down(&mut doc, PointerTarget::Handle(Handle::S), Point::new(300.0, 200.0));
    m.pointer_move(&mut doc, Point::new(300.0, 250.0));
    m.pointer_up(&mut doc, Point::new(300.0, 250.0));

    let el = doc.get(id).expect("text");
    let size = el.font_size().expect("font");
    assert!((size - points_to_inches(54.0)).abs() < 1e-9);
    assert!((el.height - 1.5).abs() < 1e-9);
    assert!((el.width - 6.0).abs() < 1e-9);
}

// ============================================================================
// Locked Element Tests
// ============================================================================

#[test]
fn test_locked_element_selects_but_does_not_move() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    doc.update_element(id, &ElementPatch { locked: Some(true), ..ElementPatch::default() })
        .expect("lock");
    let before = bounds(&doc, id);

    let actions = m.pointer_down(&mut doc, PointerTarget::Element(id), Point::new(150.0, 150.0));
    assert!(actions.contains(&Action::Selected(id)));
    assert!(actions.contains(&Action::Rejected {
        id,
        reason: RejectReason::Locked
    }));
    assert!(!m.is_capturing());

    assert!(m.pointer_move(&mut doc, Point::new(400.0, 400.0)).is_empty());
    assert!(!committed(&m.pointer_up(&mut doc, Point::new(400.0, 400.0))));
    assert_eq!(bounds(&doc, id), before);

    // Handles and text edits are refused as well; menu actions still work.
    let actions = m.pointer_down(&mut doc, PointerTarget::Handle(Handle::Se), Point::new(300.0, 300.0));
    assert!(matches!(actions.as_slice(), [Action::Rejected { .. }]));
    let copy = m.duplicate_selected(&mut doc).expect("duplicate");
    assert!(copy.iter().any(|a| matches!(a, Action::Created(_))));
    assert_eq!(doc.len(), 2);
}

#[test]
fn test_unlock_from_menu() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    m.select(&mut doc, id);
    m.set_selected_locked(&mut doc, true).expect("lock");
    assert!(doc.get(id).expect("el").locked);
    let actions = m.set_selected_locked(&mut doc, false).expect("unlock");
    assert!(committed(&actions));
    assert!(!doc.get(id).expect("el").locked);
}

#[test]
fn test_delete_locked_selection() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    m.select(&mut doc, id);
    m.set_selected_locked(&mut doc, true).expect("lock");
    let actions = m.delete_selected(&mut doc).expect("delete");
    assert!(actions.contains(&Action::Removed(id)));
    assert!(doc.is_empty());
    assert_eq!(m.selected(), None);
}

// ============================================================================
// Text Editing Tests
// ============================================================================

#[test]
fn test_text_edit_commits_on_background_click() {
    let mut doc = DesignDocument::new(Canvas::new(10.0, 5.0));
    let id = doc
        .add_element(Element::text("Hello", "Arial", 0.5).with_bounds(Rect::new(1.0, 1.0, 4.0, 1.0)))
        .expect("add");
    let mut m = Manipulator::default();
    m.set_viewport(viewport());

    let actions = m.double_click(&mut doc, id);
    assert!(actions.contains(&Action::TextEditStarted(id)));
    assert!(matches!(m.state(), GestureState::EditingText { draft, .. } if draft == "Hello"));

    // Clicking inside the edited text does not start a drag.
    assert!(m
        .pointer_down(&mut doc, PointerTarget::Element(id), Point::new(200.0, 150.0))
        .is_empty());
    assert!(!m.is_capturing());

    assert!(m.set_text_draft("Hello, world"));
    let actions = m.pointer_down(&mut doc, PointerTarget::Background, Point::new(900.0, 450.0));
    assert!(committed(&actions));
    assert!(actions.contains(&Action::TextEditEnded(id)));
    assert!(actions.contains(&Action::Deselected(id)));
    assert_eq!(m.state(), &GestureState::Idle);

    let el = doc.get(id).expect("text");
    assert!(matches!(&el.kind, canvas_core::ElementKind::Text(t) if t.content == "Hello, world"));
}

#[test]
fn test_double_click_on_shape_is_rejected() {
    let (mut doc, mut m, id) = setup(CanvasProfile::Banner);
    let actions = m.double_click(&mut doc, id);
    assert_eq!(
        actions,
        vec![Action::Rejected {
            id,
            reason: RejectReason::NotText
        }]
    );
    assert_eq!(m.state(), &GestureState::Idle);
}

// ============================================================================
// Rotation Tests
// ============================================================================

#[test]
fn test_full_turn_normalizes_to_zero() {
    let (mut doc, _m, id) = setup(CanvasProfile::Banner);
    doc.update_element(id, &ElementPatch { rotation: Some(360.0), ..ElementPatch::default() })
        .expect("rotate");
    assert!(doc.get(id).expect("el").rotation.abs() < f64::EPSILON);
}
