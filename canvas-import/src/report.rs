//! Diagnostics collected during an import.

/// A node left out of the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
    /// Local tag name.
    pub element: String,
    /// Why it was skipped.
    pub reason: String,
}

/// What an import did besides producing elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Uniform source-to-inch scale applied.
    pub scale: f64,
    /// Nodes omitted from the result.
    pub skipped: Vec<SkippedNode>,
    /// Subtrees dropped at the depth cap.
    pub depth_truncations: usize,
    /// Nodes dropped after the node budget was spent.
    pub budget_truncations: usize,
    /// The whole document was imported as one image.
    pub fallback: bool,
    /// The root had neither a `viewBox` nor a `width`/`height`, so the
    /// drawing extent was used as the frame.
    pub unsized_source: bool,
}

impl ImportReport {
    pub(crate) fn skip(&mut self, element: String, reason: String) {
        self.skipped.push(SkippedNode { element, reason });
    }

    /// Whether any part of the source was dropped.
    #[must_use]
    pub fn is_lossy(&self) -> bool {
        !self.skipped.is_empty() || self.depth_truncations > 0 || self.budget_truncations > 0 || self.fallback
    }
}
