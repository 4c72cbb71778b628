//! Concurrent generation for the line items of an order.

use futures::future::join_all;

use crate::embed::ImageFetcher;
use crate::error::PrintResult;
use crate::job::{generate, PrintArtifact, PrintConfig, PrintJob};

/// Generate every job concurrently.
///
/// Results are joined positionally: `result[i]` always belongs to `jobs[i]`,
/// whatever order the image fetches complete in. A failed item does not
/// affect the others.
pub async fn generate_batch(
    jobs: &[PrintJob],
    config: &PrintConfig,
    fetcher: &dyn ImageFetcher,
) -> Vec<PrintResult<PrintArtifact>> {
    let results = join_all(jobs.iter().map(|job| generate(job, config, fetcher))).await;
    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(items = jobs.len(), failed, "print batch generated");
    results
}
