//! Background execution of long-running operations on tokio's blocking
//! pool, so callers on an async UI thread are never blocked.
//!
//! Each `spawn_*` function must be called from inside a tokio runtime and
//! returns a [`TaskHandle`] the caller owns.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use capgo::pipeline::{ExportOptions, StampPipeline};
//! use capgo::task::spawn_export;
//!
//! # async fn run() -> capgo::Result<()> {
//! let pipeline = Arc::new(StampPipeline::new(ExportOptions::default()));
//! let handle = spawn_export(pipeline, "contract.pdf".into(), Vec::new())?;
//! let output = handle.join().await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::backend::PdfBackend;
use crate::error::{Error, Result};
use crate::model::{Document, PageOrder, Stamp};
use crate::pipeline::{BatchExporter, BatchReport, StampPipeline};
use crate::transform::PageTransform;

/// Owned handle to a background operation.
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Wait for the operation to settle.
    ///
    /// An aborted task yields [`Error::Cancelled`]; a panicked one yields
    /// [`Error::TaskJoin`].
    pub async fn join(self) -> Result<T> {
        match self.inner.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Cancelled),
            Err(e) => Err(Error::TaskJoin(e.to_string())),
        }
    }

    /// Cancel the operation if it has not started yet. Work already running
    /// on the blocking pool finishes, and its result is discarded.
    pub fn abort(&self) {
        self.inner.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

fn spawn<T, F>(job: F) -> Result<TaskHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let runtime = Handle::try_current().map_err(|e| Error::TaskJoin(e.to_string()))?;
    Ok(TaskHandle {
        inner: runtime.spawn_blocking(job),
    })
}

/// Stamp `pdf` in the background.
pub fn spawn_export<B>(
    pipeline: Arc<StampPipeline<B>>,
    pdf: PathBuf,
    stamps: Vec<Stamp>,
) -> Result<TaskHandle<PathBuf>>
where
    B: PdfBackend + 'static,
{
    spawn(move || pipeline.run(&pdf, &stamps))
}

/// Reorder `source`'s pages in the background.
pub fn spawn_transform<B>(
    transform: Arc<PageTransform<B>>,
    source: PathBuf,
    order: PageOrder,
) -> Result<TaskHandle<PathBuf>>
where
    B: PdfBackend + 'static,
{
    spawn(move || transform.transform(&source, &order))
}

/// Run a batch export in the background. The documents come back with
/// their statuses updated.
pub fn spawn_batch<B>(
    exporter: Arc<BatchExporter<B>>,
    mut docs: Vec<Document>,
) -> Result<TaskHandle<(Vec<Document>, BatchReport)>>
where
    B: PdfBackend + 'static,
{
    spawn(move || {
        let report = exporter.export(&mut docs);
        Ok((docs, report))
    })
}
