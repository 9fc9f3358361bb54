//! Print dispatch: composed labels and a copy count to device jobs.
//!
//! Iteration is copy-major: every label of the batch prints once per copy
//! pass, in input order. A blank feed job separates consecutive items.
//! The first device error ends the dispatch; nothing is retried.

use crate::code::Copies;
use crate::compose::ComposedLabel;
use crate::config::DispatchConfig;
use crate::device::{DestRect, DeviceJob, DeviceRef, PrintSubsystem, ScopedJob};
use crate::error::{DeviceError, DeviceResult};
use crate::raster::Raster;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, instrument};

/// Outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Print jobs started (feeds not included)
    pub attempted: usize,
    pub succeeded: usize,
    pub feeds: usize,
    /// First device error; set iff the dispatch stopped early
    pub error: Option<DeviceError>,
}

impl DispatchResult {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Sends labels to a [`PrintSubsystem`].
pub struct PrintDispatcher<S: PrintSubsystem> {
    subsystem: S,
    config: DispatchConfig,
    in_flight: Mutex<()>,
}

impl<S: PrintSubsystem> PrintDispatcher<S> {
    pub fn new(subsystem: S) -> Self {
        Self::with_config(subsystem, DispatchConfig::default())
    }

    pub fn with_config(subsystem: S, config: DispatchConfig) -> Self {
        Self {
            subsystem,
            config,
            in_flight: Mutex::new(()),
        }
    }

    pub fn subsystem(&self) -> &S {
        &self.subsystem
    }

    /// Prints `copies` passes over `labels` on `device`.
    ///
    /// Blocks while another dispatch on this dispatcher is running.
    #[instrument(skip_all, fields(device = %device.name, labels = labels.len(), copies = copies.get()))]
    pub fn dispatch(
        &self,
        labels: &[ComposedLabel],
        copies: Copies,
        device: &DeviceRef,
    ) -> DispatchResult {
        let _batch = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        let rasters: Vec<Raster> = labels
            .iter()
            .map(|label| Raster::convert(label.image(), device.color_depth))
            .collect();
        let total = rasters.len() * copies.get() as usize;

        let mut result = DispatchResult::default();
        for pass in 0..copies.get() {
            for (raster, label) in rasters.iter().zip(labels) {
                result.attempted += 1;
                if let Err(e) = self.print_one(raster, device) {
                    error!(code = %label.code(), pass, job = result.attempted, error = %e, "print job failed, stopping batch");
                    result.error = Some(e);
                    return result;
                }
                result.succeeded += 1;
                debug!(code = %label.code(), pass, "label printed");

                if result.succeeded < total {
                    if let Err(e) = self.feed(device) {
                        error!(error = %e, "feed failed, stopping batch");
                        result.error = Some(e);
                        return result;
                    }
                    result.feeds += 1;
                }
            }
        }

        info!(printed = result.succeeded, feeds = result.feeds, "dispatch complete");
        result
    }

    fn print_one(&self, raster: &Raster, device: &DeviceRef) -> DeviceResult<()> {
        let area = self.subsystem.query_capability(device)?;
        let (width, height) = raster.dimensions();
        let dest = DestRect::fit(width, height, area, self.config.margin);

        let mut job = ScopedJob::open(&self.subsystem, device, &self.config.job_title)?;
        job.begin_page()?;
        job.blit(raster, dest)?;
        job.end_page()?;
        job.end_job()?;
        job.finish()
    }

    /// Blank single-page job to advance the stock past the cut line.
    fn feed(&self, device: &DeviceRef) -> DeviceResult<()> {
        let mut job = ScopedJob::open(&self.subsystem, device, &self.config.feed_title)?;
        job.begin_page()?;
        job.end_page()?;
        job.end_job()?;
        job.finish()
    }
}
