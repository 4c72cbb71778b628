//! A live editing session: document, manipulator and history together.
//!
//! The host shares a session as `Rc<RefCell<DesignSession>>`. Async work
//! (uploads, saves) holds a [`SessionGuard`] instead of a strong handle so a
//! completion arriving after the canvas was torn down is dropped rather than
//! mutating stale state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use async_trait::async_trait;

use crate::document::{DesignDocument, TemplateMode};
use crate::element::{Element, ElementId, ElementPatch};
use crate::geometry::{Point, Rect};
use crate::gesture::{Action, CanvasProfile, Manipulator, PointerTarget};
use crate::history::History;
use crate::layers::LayerOp;
use crate::store::{DesignStore, Owner, StoreError};
use crate::template::Template;
use crate::{CanvasError, CanvasResult};

/// A file picked by the user for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Original file name.
    pub file_name: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

/// Stores an uploaded file and returns a durable URL for it.
#[async_trait(?Send)]
pub trait AssetUploader {
    /// Upload `file`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Upload`] with a user-facing message on failure.
    async fn upload(&self, file: AssetFile) -> CanvasResult<String>;
}

/// Editing state for one open canvas.
#[derive(Debug, Clone)]
pub struct DesignSession {
    document: DesignDocument,
    manipulator: Manipulator,
    history: History,
}

/// Shared handle to a session.
pub type SharedSession = Rc<RefCell<DesignSession>>;

impl DesignSession {
    /// Open a session over `document` with the editor policy of `profile`.
    #[must_use]
    pub fn new(document: DesignDocument, profile: CanvasProfile) -> Self {
        Self {
            document,
            manipulator: Manipulator::for_profile(profile),
            history: History::default(),
        }
    }

    /// Wrap the session in a shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedSession {
        Rc::new(RefCell::new(self))
    }

    /// Current document, including transient gesture geometry.
    #[must_use]
    pub fn document(&self) -> &DesignDocument {
        &self.document
    }

    /// Gesture state machine.
    #[must_use]
    pub fn manipulator(&self) -> &Manipulator {
        &self.manipulator
    }

    /// Mutable gesture state machine, for zoom and configuration changes.
    pub fn manipulator_mut(&mut self) -> &mut Manipulator {
        &mut self.manipulator
    }

    /// Undo/redo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Pointer down at a screen position; the target is resolved by hit testing.
    pub fn pointer_down(&mut self, screen: Point) -> Vec<Action> {
        let target = self.manipulator.target_at(&self.document, screen);
        self.pointer_down_on(target, screen)
    }

    /// Pointer down on an already-resolved target.
    pub fn pointer_down_on(&mut self, target: PointerTarget, screen: Point) -> Vec<Action> {
        let actions = self.manipulator.pointer_down(&mut self.document, target, screen);
        self.record_commits(&actions);
        actions
    }

    /// Pointer move.
    pub fn pointer_move(&mut self, screen: Point) -> Vec<Action> {
        self.manipulator.pointer_move(&mut self.document, screen)
    }

    /// Pointer up.
    pub fn pointer_up(&mut self, screen: Point) -> Vec<Action> {
        let actions = self.manipulator.pointer_up(&mut self.document, screen);
        self.record_commits(&actions);
        actions
    }

    /// Double click on an element.
    pub fn double_click(&mut self, id: ElementId) -> Vec<Action> {
        let actions = self.manipulator.double_click(&mut self.document, id);
        self.record_commits(&actions);
        actions
    }

    /// Replace the in-progress text draft.
    pub fn set_text_draft(&mut self, text: impl Into<String>) -> bool {
        self.manipulator.set_text_draft(text)
    }

    /// Commit in-place text editing.
    pub fn end_text_edit(&mut self) -> Vec<Action> {
        let actions = self.manipulator.end_text_edit(&mut self.document);
        self.record_commits(&actions);
        actions
    }

    /// Nudge the selection by whole steps.
    pub fn nudge(&mut self, steps_x: i32, steps_y: i32) -> Vec<Action> {
        let actions = self.manipulator.nudge(&mut self.document, steps_x, steps_y);
        self.record_commits(&actions);
        actions
    }

    /// Delete the selected element.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection refers to a missing element.
    pub fn delete_selected(&mut self) -> CanvasResult<Vec<Action>> {
        let before = self.document.clone();
        let actions = self.manipulator.delete_selected(&mut self.document)?;
        self.record_if_changed(before);
        Ok(actions)
    }

    /// Duplicate the selected element.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection refers to a missing element.
    pub fn duplicate_selected(&mut self) -> CanvasResult<Vec<Action>> {
        let before = self.document.clone();
        let actions = self.manipulator.duplicate_selected(&mut self.document)?;
        self.record_if_changed(before);
        Ok(actions)
    }

    /// Lock or unlock the selected element.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection refers to a missing element.
    pub fn set_selected_locked(&mut self, locked: bool) -> CanvasResult<Vec<Action>> {
        let before = self.document.clone();
        let actions = self.manipulator.set_selected_locked(&mut self.document, locked)?;
        self.record_if_changed(before);
        Ok(actions)
    }

    /// Add an element on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the id already exists.
    pub fn add_element(&mut self, element: Element) -> CanvasResult<ElementId> {
        self.guard_idle()?;
        let before = self.document.clone();
        let id = self.document.add_element(element)?;
        self.history.record(before);
        Ok(id)
    }

    /// Apply a property-panel patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or the patch does not fit it.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> CanvasResult<()> {
        self.guard_idle()?;
        let before = self.document.clone();
        self.document.update_element(id, patch)?;
        self.record_if_changed(before);
        Ok(())
    }

    /// Reorder an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or an index is out of range.
    pub fn reorder(&mut self, id: ElementId, op: LayerOp) -> CanvasResult<()> {
        self.guard_idle()?;
        let before = self.document.clone();
        self.document.reorder(id, op)?;
        self.record_if_changed(before);
        Ok(())
    }

    /// Reorder by top-first layer panel index.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of range.
    pub fn reorder_display(&mut self, display_index: usize, op: LayerOp) -> CanvasResult<()> {
        self.guard_idle()?;
        let before = self.document.clone();
        self.document.reorder_display(display_index, op)?;
        self.record_if_changed(before);
        Ok(())
    }

    /// Apply a template.
    ///
    /// # Errors
    ///
    /// Returns an error if resolved ids collide.
    pub fn apply_template(&mut self, template: &Template, mode: TemplateMode) -> CanvasResult<Vec<ElementId>> {
        self.guard_idle()?;
        let before = self.document.clone();
        let ids = self.document.apply_template(template, mode)?;
        if let Some(selected) = self.manipulator.selected() {
            if self.document.get(selected).is_none() {
                self.manipulator.forget(selected);
            }
        }
        self.history.record(before);
        Ok(ids)
    }

    /// Restore the previous committed state. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        if self.manipulator.is_capturing() {
            return false;
        }
        match self.history.undo(&self.document) {
            Some(doc) => {
                self.replace_document(doc);
                true
            }
            None => false,
        }
    }

    /// Re-apply an undone state. Returns `false` when there is none.
    pub fn redo(&mut self) -> bool {
        if self.manipulator.is_capturing() {
            return false;
        }
        match self.history.redo(&self.document) {
            Some(doc) => {
                self.replace_document(doc);
                true
            }
            None => false,
        }
    }

    /// Persist the committed document for `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn save(&self, store: &dyn DesignStore, owner: &Owner) -> Result<(), StoreError> {
        store.save(owner, &self.document)
    }

    /// Open the design saved for `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is saved or the saved design is invalid.
    pub fn load(store: &dyn DesignStore, owner: &Owner, profile: CanvasProfile) -> Result<Self, StoreError> {
        let document = store.load(owner)?;
        tracing::info!(%owner, elements = document.len(), "design loaded");
        Ok(Self::new(document, profile))
    }

    fn replace_document(&mut self, doc: DesignDocument) {
        self.document = doc;
        let current = self.manipulator.state().element().or(self.manipulator.selected());
        if let Some(id) = current {
            if self.document.get(id).is_none() {
                self.manipulator.forget(id);
            }
        }
    }

    fn guard_idle(&self) -> CanvasResult<()> {
        if self.manipulator.is_capturing() {
            return Err(CanvasError::InvalidOperation("a gesture is in progress".into()));
        }
        Ok(())
    }

    fn record_if_changed(&mut self, before: DesignDocument) {
        if before != self.document {
            self.history.record(before);
        }
    }

    /// Rebuild the pre-event document from the committed elements' snapshots.
    fn record_commits(&mut self, actions: &[Action]) {
        let mut prior: Option<DesignDocument> = None;
        for action in actions.iter().rev() {
            if let Action::Committed { id, before } = action {
                let doc = prior.get_or_insert_with(|| self.document.clone());
                if let Some(el) = doc.get_mut(*id) {
                    el.clone_from(before);
                }
            }
        }
        if let Some(prior) = prior {
            self.history.record(prior);
        }
    }
}

/// Weak handle to a session, held by async work.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    inner: Weak<RefCell<DesignSession>>,
}

impl SessionGuard {
    /// Create a guard for a shared session.
    #[must_use]
    pub fn new(session: &SharedSession) -> Self {
        Self {
            inner: Rc::downgrade(session),
        }
    }

    /// Whether the session still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Run `f` against the session if it is still open.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::SessionClosed`] if the session was dropped.
    pub fn with<R>(&self, f: impl FnOnce(&mut DesignSession) -> R) -> CanvasResult<R> {
        let session = self.inner.upgrade().ok_or(CanvasError::SessionClosed)?;
        let mut session = session.borrow_mut();
        Ok(f(&mut session))
    }
}

/// Upload an image and, on success, add it to the session.
///
/// The document is only touched after the upload has produced a durable URL;
/// a failed upload leaves it unchanged.
///
/// # Errors
///
/// Returns [`CanvasError::Upload`] if the upload fails and
/// [`CanvasError::SessionClosed`] if the session went away meanwhile.
pub async fn add_uploaded_image(
    guard: &SessionGuard,
    uploader: &dyn AssetUploader,
    file: AssetFile,
    bounds: Rect,
) -> CanvasResult<ElementId> {
    let file_name = file.file_name.clone();
    let url = match uploader.upload(file).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(%file_name, "upload failed: {e}");
            return Err(e);
        }
    };
    tracing::info!(%file_name, %url, "asset uploaded");
    guard.with(|session| session.add_element(Element::image(url).with_bounds(bounds)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Canvas;
    use crate::element::{ElementKind, ShapeKind};

    struct FixedUploader(Result<String, String>);

    #[async_trait(?Send)]
    impl AssetUploader for FixedUploader {
        async fn upload(&self, _file: AssetFile) -> CanvasResult<String> {
            self.0.clone().map_err(CanvasError::Upload)
        }
    }

    fn file() -> AssetFile {
        AssetFile {
            file_name: "logo.png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn session() -> DesignSession {
        DesignSession::new(DesignDocument::new(Canvas::new(24.0, 12.0)), CanvasProfile::Banner)
    }

    #[tokio::test]
    async fn test_upload_success_adds_image() {
        let shared = session().into_shared();
        let guard = SessionGuard::new(&shared);
        let uploader = FixedUploader(Ok("https://cdn.example.com/logo.png".into()));

        let id = add_uploaded_image(&guard, &uploader, file(), Rect::new(1.0, 1.0, 4.0, 2.0))
            .await
            .expect("upload");

        let session = shared.borrow();
        let el = session.document().get(id).expect("image");
        assert!(matches!(&el.kind, ElementKind::Image(p) if p.src == "https://cdn.example.com/logo.png"));
        assert!(session.history().can_undo());
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_document() {
        let shared = session().into_shared();
        let guard = SessionGuard::new(&shared);
        let uploader = FixedUploader(Err("File too large".into()));

        let result = add_uploaded_image(&guard, &uploader, file(), Rect::new(0.0, 0.0, 1.0, 1.0)).await;
        assert!(matches!(result, Err(CanvasError::Upload(msg)) if msg == "File too large"));
        assert!(shared.borrow().document().is_empty());
    }

    #[tokio::test]
    async fn test_upload_after_teardown_is_dropped() {
        let shared = session().into_shared();
        let guard = SessionGuard::new(&shared);
        drop(shared);
        assert!(!guard.is_alive());

        let uploader = FixedUploader(Ok("https://cdn.example.com/x.png".into()));
        let result = add_uploaded_image(&guard, &uploader, file(), Rect::new(0.0, 0.0, 1.0, 1.0)).await;
        assert!(matches!(result, Err(CanvasError::SessionClosed)));
    }

    #[test]
    fn test_drag_is_one_undo_step() {
        let mut s = session();
        let id = s
            .add_element(Element::shape(ShapeKind::Rect, "#000").with_bounds(Rect::new(1.0, 1.0, 2.0, 2.0)))
            .expect("add");
        // 96 px per inch at 100%.
        s.pointer_down(Point::new(192.0, 192.0));
        s.pointer_move(Point::new(240.0, 192.0));
        s.pointer_move(Point::new(288.0, 192.0));
        s.pointer_up(Point::new(288.0, 192.0));
        assert!((s.document().get(id).expect("el").x - 2.0).abs() < 1e-9);

        assert!(s.undo());
        assert!((s.document().get(id).expect("el").x - 1.0).abs() < 1e-9);
        assert!(s.redo());
        assert!((s.document().get(id).expect("el").x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_undo_refused_mid_gesture() {
        let mut s = session();
        s.add_element(Element::shape(ShapeKind::Rect, "#000").with_bounds(Rect::new(1.0, 1.0, 2.0, 2.0)))
            .expect("add");
        s.pointer_down(Point::new(192.0, 192.0));
        assert!(s.manipulator().is_capturing());
        assert!(!s.undo());
        assert!(s.add_element(Element::image("x.png")).is_err());
    }

    #[test]
    fn test_undo_add_clears_selection() {
        let mut s = session();
        let id = s
            .add_element(Element::shape(ShapeKind::Rect, "#000").with_bounds(Rect::new(1.0, 1.0, 2.0, 2.0)))
            .expect("add");
        s.pointer_down(Point::new(192.0, 192.0));
        s.pointer_up(Point::new(192.0, 192.0));
        assert_eq!(s.manipulator().selected(), Some(id));
        assert!(s.undo());
        assert!(s.document().is_empty());
        assert_eq!(s.manipulator().selected(), None);
    }

    #[test]
    fn test_save_and_load() {
        let store = crate::store::MemoryDesignStore::new();
        let owner = Owner::Session("s1".into());
        let mut s = session();
        s.add_element(Element::text("Hi", "Arial", 0.5)).expect("add");
        s.save(&store, &owner).expect("save");
        let loaded = DesignSession::load(&store, &owner, CanvasProfile::Badge).expect("load");
        assert_eq!(loaded.document(), s.document());
    }
}
