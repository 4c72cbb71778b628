//! # Print Canvas Print
//!
//! Turns a design document into a self-contained print artifact: one SVG at
//! `width × dpi` by `height × dpi` pixels with every image inlined.
//!
//! ## Features
//!
//! - `raster`: downscaled PNG proofs via resvg/tiny-skia

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod embed;
pub mod error;
pub mod job;
pub mod svg;

#[cfg(feature = "raster")]
pub mod raster;

pub use batch::generate_batch;
pub use embed::{detect_mime, embed_images, EmbeddedImages, FetchedImage, HttpImageFetcher, ImageFetcher};
pub use error::{PrintError, PrintResult};
pub use job::{generate, PrintArtifact, PrintConfig, PrintJob, DEFAULT_DPI};
pub use svg::{pixel_size, render_svg};

#[cfg(feature = "raster")]
pub use raster::{render_proof_png, DEFAULT_PROOF_EDGE};
