//! Sequential batch export over a document collection.

use std::path::PathBuf;

use crossbeam_channel::Sender;
use tokio_util::sync::CancellationToken;

use super::StampPipeline;
use crate::backend::{LopdfBackend, PdfBackend};
use crate::error::ErrorKind;
use crate::model::{Document, DocumentId};

/// Progress notification emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A document's export is starting.
    Started { id: DocumentId, name: String },
    /// A document was exported.
    Completed {
        id: DocumentId,
        name: String,
        output: PathBuf,
    },
    /// A document's export failed; the batch continues.
    Failed {
        id: DocumentId,
        name: String,
        kind: ErrorKind,
        message: String,
    },
    /// A stop was requested; `remaining` selected documents were not started.
    Stopped { remaining: usize },
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub completed: Vec<(DocumentId, PathBuf)>,
    pub failed: Vec<(DocumentId, String)>,
    /// Selected documents not started because of a stop request
    pub skipped: usize,
}

impl BatchReport {
    /// Every selected document was exported.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }

    pub fn was_stopped(&self) -> bool {
        self.skipped > 0
    }
}

/// Exports selected documents one after another.
///
/// A failing document is marked `error` and the batch moves on. A stop
/// request is honored between documents; the document in flight always
/// runs to completion.
pub struct BatchExporter<B = LopdfBackend> {
    pipeline: StampPipeline<B>,
    events: Option<Sender<BatchEvent>>,
    cancel: CancellationToken,
}

impl<B: PdfBackend> BatchExporter<B> {
    pub fn new(pipeline: StampPipeline<B>) -> Self {
        Self {
            pipeline,
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Send progress events to `sender`.
    pub fn with_events(mut self, sender: Sender<BatchEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Use an externally owned stop signal.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle that stops the batch before its next document.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn pipeline(&self) -> &StampPipeline<B> {
        &self.pipeline
    }

    /// Export every selected document in collection order.
    pub fn export(&self, docs: &mut [Document]) -> BatchReport {
        let total = docs.iter().filter(|d| d.selected).count();
        let mut report = BatchReport::default();
        let mut started = 0;

        for doc in docs.iter_mut().filter(|d| d.selected) {
            if self.cancel.is_cancelled() {
                report.skipped = total - started;
                log::info!("batch stopped, {} documents not started", report.skipped);
                self.emit(BatchEvent::Stopped {
                    remaining: report.skipped,
                });
                break;
            }
            started += 1;

            self.emit(BatchEvent::Started {
                id: doc.id,
                name: doc.name.clone(),
            });
            match self.pipeline.export_document(doc) {
                Ok(output) => {
                    self.emit(BatchEvent::Completed {
                        id: doc.id,
                        name: doc.name.clone(),
                        output: output.clone(),
                    });
                    report.completed.push((doc.id, output));
                }
                Err(e) => {
                    self.emit(BatchEvent::Failed {
                        id: doc.id,
                        name: doc.name.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                    report.failed.push((doc.id, e.to_string()));
                }
            }
        }

        log::info!(
            "batch finished: {} exported, {} failed, {} skipped",
            report.completed.len(),
            report.failed.len(),
            report.skipped
        );
        report
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = sender.send(event);
        }
    }
}
