//! Persistence collaborators: profile vectors, repair reports, and report images.
//!
//! The on-disk layouts are deliberately simple (file-per-vector, JSON lines,
//! content-addressed image files). None of them is an index; lookups are by id.

pub mod error;
pub mod images;
pub mod reports;
pub mod vectors;


pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "mock"))]
pub use images::MockImageStore;
pub use images::{FileImageStore, ImageFormat, ImageStore, StoredImage};
pub use reports::{InMemoryReportStore, JsonlReportStore, ReportStore};
#[cfg(any(test, feature = "mock"))]
pub use vectors::MockVectorStore;
pub use vectors::{FileVectorStore, VectorKind, VectorStore, bytes_to_f32_vec, f32_to_bytes};

/// Runs a synchronous store operation on tokio's blocking pool.
pub async fn run_blocking<T, F>(task: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
}
