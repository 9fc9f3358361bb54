//! Batch orchestration: codes in, printed labels and a report out.

use crate::code::{Code, Copies};
use crate::compose::{ComposedLabel, LabelComposer};
use crate::config::HISTORY_LIMIT;
use crate::device::{DeviceRef, PrintSubsystem};
use crate::dispatch::PrintDispatcher;
use crate::error::{BatchError, ComposeError, DeviceError, PersistenceError, PersistenceResult, ValidationError};
use crate::export::{ExportReport, export_label};
use crate::history::HistoryStore;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// A code that could not be composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCode {
    pub code: Code,
    pub error: ComposeError,
}

/// Outcome of one batch, for display by the front end.
#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub composed: usize,
    /// Labels composed without a symbol encoder
    pub degraded: usize,
    pub skipped: Vec<SkippedCode>,
    pub attempted: usize,
    pub printed: usize,
    pub feeds: usize,
    pub dispatch_error: Option<DeviceError>,
    pub persistence_error: Option<PersistenceError>,
}

impl BatchReport {
    fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            composed: 0,
            degraded: 0,
            skipped: Vec::new(),
            attempted: 0,
            printed: 0,
            feeds: 0,
            dispatch_error: None,
            persistence_error: None,
        }
    }

    /// Everything composed printed, and history was written.
    pub fn is_success(&self) -> bool {
        self.skipped.is_empty() && self.dispatch_error.is_none() && self.persistence_error.is_none()
    }
}

/// Links composer, history and dispatcher.
pub struct BatchController<S: PrintSubsystem> {
    composer: LabelComposer,
    dispatcher: PrintDispatcher<S>,
    history: Arc<dyn HistoryStore>,
}

impl<S: PrintSubsystem> BatchController<S> {
    pub fn new(
        composer: LabelComposer,
        dispatcher: PrintDispatcher<S>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            composer,
            dispatcher,
            history,
        }
    }

    pub fn dispatcher(&self) -> &PrintDispatcher<S> {
        &self.dispatcher
    }

    /// Composes, records and prints `codes`.
    ///
    /// An out-of-range copy count is rejected before anything else happens.
    pub fn run_batch(
        &self,
        codes: &[Code],
        copies: u32,
        device: &DeviceRef,
    ) -> Result<BatchReport, ValidationError> {
        let copies = Copies::new(copies)?;
        Ok(self.process(codes, copies, device, true))
    }

    /// Like [`Self::run_batch`], without writing history (reprint from history).
    pub fn reprint(
        &self,
        codes: &[Code],
        copies: u32,
        device: &DeviceRef,
    ) -> Result<BatchReport, ValidationError> {
        let copies = Copies::new(copies)?;
        Ok(self.process(codes, copies, device, false))
    }

    /// Most recent printed codes, newest first.
    pub fn recent(&self, limit: usize) -> PersistenceResult<Vec<Code>> {
        self.history.recent_codes(limit)
    }

    /// The history list as shown to operators: the last [`HISTORY_LIMIT`] codes.
    pub fn history(&self) -> PersistenceResult<Vec<Code>> {
        self.recent(HISTORY_LIMIT)
    }

    /// Composes each code and writes it as a PNG into `dir`.
    pub fn export(&self, codes: &[Code], dir: &Path) -> ExportReport {
        let mut report = ExportReport::default();
        for code in codes {
            let outcome = self
                .composer
                .compose(code)
                .map_err(|e| e.to_string())
                .and_then(|label| export_label(&label, dir).map_err(|e| e.to_string()));
            report.record(code, outcome);
        }
        info!(saved = report.saved.len(), total = report.total(), dir = %dir.display(), "export finished");
        report
    }

    #[instrument(skip_all, fields(codes = codes.len(), copies = copies.get(), device = %device.name))]
    fn process(&self, codes: &[Code], copies: Copies, device: &DeviceRef, persist: bool) -> BatchReport {
        let mut report = BatchReport::new();
        let labels = self.compose_all(codes, &mut report);

        if labels.is_empty() {
            warn!(batch = %report.batch_id, "nothing composed, skipping dispatch");
            return report;
        }

        if persist {
            let printed: Vec<Code> = labels.iter().map(|l| l.code().clone()).collect();
            if let Err(e) = self.history.append(&printed) {
                error!(batch = %report.batch_id, error = %e, "history write failed");
                report.persistence_error = Some(e);
            }
        }

        let result = self.dispatcher.dispatch(&labels, copies, device);
        report.attempted = result.attempted;
        report.printed = result.succeeded;
        report.feeds = result.feeds;
        report.dispatch_error = result.error;

        info!(
            batch = %report.batch_id,
            composed = report.composed,
            skipped = report.skipped.len(),
            printed = report.printed,
            "batch finished"
        );
        report
    }

    fn compose_all(&self, codes: &[Code], report: &mut BatchReport) -> Vec<ComposedLabel> {
        let mut labels = Vec::with_capacity(codes.len());
        for code in codes {
            match self.composer.compose(code) {
                Ok(label) => {
                    if label.is_degraded() {
                        report.degraded += 1;
                    }
                    labels.push(label);
                }
                Err(e) => {
                    warn!(code = %code, error = %e, "code skipped");
                    report.skipped.push(SkippedCode {
                        code: code.clone(),
                        error: e,
                    });
                }
            }
        }
        report.composed = labels.len();
        labels
    }
}

/// Print or reprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Print,
    Reprint,
}

/// Work item for a [`BatchWorker`].
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub codes: Vec<Code>,
    pub copies: u32,
    pub device: DeviceRef,
    pub mode: BatchMode,
}

type Reply = oneshot::Sender<Result<BatchReport, ValidationError>>;

/// Runs batches one at a time on a dedicated blocking thread.
pub struct BatchWorker {
    tx: mpsc::Sender<(BatchRequest, Reply)>,
    handle: JoinHandle<()>,
}

impl BatchWorker {
    /// Must be called inside a tokio runtime.
    pub fn spawn<S>(controller: BatchController<S>) -> Self
    where
        S: PrintSubsystem + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<(BatchRequest, Reply)>(8);
        let handle = tokio::task::spawn_blocking(move || {
            while let Some((request, reply)) = rx.blocking_recv() {
                let report = match request.mode {
                    BatchMode::Print => controller.run_batch(&request.codes, request.copies, &request.device),
                    BatchMode::Reprint => controller.reprint(&request.codes, request.copies, &request.device),
                };
                if reply.send(report).is_err() {
                    warn!("batch submitter went away before the report was ready");
                }
            }
            info!("batch worker stopped");
        });
        Self { tx, handle }
    }

    /// Queues `request` and waits for its report.
    pub async fn submit(&self, request: BatchRequest) -> Result<BatchReport, BatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| BatchError::WorkerGone)?;
        let report = reply_rx.await.map_err(|_| BatchError::WorkerGone)??;
        Ok(report)
    }

    /// Lets queued batches finish, then stops the worker.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            error!(error = %e, "batch worker panicked");
        }
    }
}
