//! Best-effort removal of stored files after their rows are gone.

use futures::future::join_all;
use tracing::warn;

use dochub_core::traits::StorageProvider;

/// Delete every path, logging failures instead of returning them.
///
/// Returns the number of paths that could not be removed.
pub async fn remove_files(storage: &dyn StorageProvider, paths: &[String]) -> usize {
    let results = join_all(paths.iter().map(|path| async move {
        (path, storage.delete(path).await)
    }))
    .await;

    let mut failed = 0;
    for (path, result) in results {
        if let Err(e) = result {
            failed += 1;
            warn!(path = %path, error = %e, "Failed to remove stored file");
        }
    }
    failed
}
