//! # Print Canvas Import
//!
//! Normalises foreign SVG documents into canvas elements sized for a target
//! canvas in inches.
//!
//! ## Pipeline
//!
//! ```text
//! SvgSource ──load──▶ text ──roxmltree──▶ tree
//!                                          │
//!                          Flattener (depth cap, node budget, <use>, styles)
//!                                          │
//!                                    SourceNode[]
//!                                          │
//!                     Placement (uniform fit, centring, inches)
//!                                          │
//!                                Element[] + ImportReport
//! ```
//!
//! Unsupported constructs are skipped and listed in the [`ImportReport`]; a
//! document that yields nothing drawable is imported as a single full-canvas
//! image instead.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod flatten;
pub mod import;
pub mod path;
pub mod report;
pub mod source;
pub mod style;
pub mod transform;
pub mod units;

pub use error::{ImportError, ImportResult};
pub use import::{
    apply_import, import_source, import_svg, ImportOptions, ImportOutcome, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES,
};
pub use report::{ImportReport, SkippedNode};
pub use source::{decode_data_uri, svg_data_uri, HttpSourceFetcher, SourceFetcher, SvgSource};
pub use transform::{Transform, TransformError};
pub use units::{SourceFrame, USER_UNITS_PER_INCH};
