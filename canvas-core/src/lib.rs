//! # Print Canvas Core
//!
//! Core logic for the print-shop design canvas: the element model, inch
//! geometry, layer ordering, the pointer gesture state machine and the
//! editing session shared by the banner and badge designers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 canvas-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Manipulation            │
//! │  - Elements      │  - Hit testing           │
//! │  - Layer order   │  - Drag / resize         │
//! │  - Templates     │  - In-place text edit    │
//! ├─────────────────────────────────────────────┤
//! │  Session         │  Persistence             │
//! │  - Undo / redo   │  - Design store          │
//! │  - Upload guard  │  - JSON documents        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All stored geometry is in physical inches; screen pixels and typographic
//! points only appear at the presentation boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod layers;
pub mod session;
pub mod store;
pub mod template;

pub use document::{Canvas, DesignDocument, TemplateMode};
pub use element::{
    ClipartProps, Element, ElementId, ElementKind, ElementPatch, FontStyle, FontWeight, ImageProps, ShapeKind,
    ShapePatch, ShapeProps, SourcePatch, TextAlign, TextDecoration, TextPatch, TextProps,
};
pub use error::{CanvasError, CanvasResult};
pub use geometry::{Point, Rect, Viewport};
pub use gesture::{
    Action, BoundsPolicy, CanvasProfile, EditorConfig, GestureState, Handle, Manipulator, PointerTarget,
    RejectReason,
};
pub use history::History;
pub use layers::LayerOp;
pub use session::{add_uploaded_image, AssetFile, AssetUploader, DesignSession, SessionGuard, SharedSession};
pub use store::{DesignStore, FileDesignStore, MemoryDesignStore, Owner, StoreError};
pub use template::{Template, TemplateElement};

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
