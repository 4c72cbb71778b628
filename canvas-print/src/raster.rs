//! Downscaled PNG proofs of print artifacts.

use crate::error::{PrintError, PrintResult};

/// Longest proof edge used when none is given.
pub const DEFAULT_PROOF_EDGE: u32 = 1024;

/// Rasterise artifact SVG into a PNG whose longest edge is at most
/// `max_edge` pixels.
///
/// Embedded `data:` images are drawn; remote references are not fetched.
///
/// # Errors
///
/// Returns [`PrintError::Raster`] if the SVG cannot be parsed or encoded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn render_proof_png(svg: &str, max_edge: u32) -> PrintResult<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| PrintError::Raster(format!("SVG parsing failed: {e}")))?;

    let size = tree.size();
    let longest = size.width().max(size.height());
    let scale = if longest > 0.0 {
        (max_edge.max(1) as f32 / longest).min(1.0)
    } else {
        1.0
    };
    let px_w = (size.width() * scale).ceil() as u32;
    let px_h = (size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| PrintError::Raster("Failed to create pixmap".to_string()))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| PrintError::Raster(format!("PNG encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_is_downscaled_png() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4000" height="2000" viewBox="0 0 4000 2000"><rect width="4000" height="2000" fill="#ff0000"/></svg>"##;
        let png = render_proof_png(svg, 400).expect("proof");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);

        let decoded = image::load_from_memory(&png).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (400, 200));
    }

    #[test]
    fn test_invalid_svg() {
        assert!(matches!(render_proof_png("<nope", 100), Err(PrintError::Raster(_))));
    }
}
