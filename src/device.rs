//! Print subsystem seam.
//!
//! The dispatcher drives printers only through [`PrintSubsystem`] and
//! [`DeviceJob`]; spooler or driver specifics live behind these traits.

use crate::error::{DeviceError, DeviceResult};
use crate::raster::{ColorDepth, Raster};
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// A resolved printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRef {
    pub name: String,
    pub color_depth: ColorDepth,
}

impl DeviceRef {
    /// Bilevel (Floyd–Steinberg) device, the usual thermal case.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color_depth: ColorDepth::default(),
        }
    }

    pub fn with_color_depth(mut self, depth: ColorDepth) -> Self {
        self.color_depth = depth;
        self
    }
}

/// Printable area in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapability {
    pub width: u32,
    pub height: u32,
}

/// Destination of a blit, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl DestRect {
    /// Scales a `label_w` x `label_h` bitmap to fit the printable area, keeping
    /// aspect ratio, shrunk by `margin` and centered.
    pub fn fit(label_w: u32, label_h: u32, area: DeviceCapability, margin: f32) -> DestRect {
        if label_w == 0 || label_h == 0 {
            return DestRect {
                x: (area.width / 2) as i32,
                y: (area.height / 2) as i32,
                width: 0,
                height: 0,
            };
        }
        let scale = (area.width as f64 / label_w as f64).min(area.height as f64 / label_h as f64)
            * margin as f64;
        let width = (label_w as f64 * scale) as u32;
        let height = (label_h as f64 * scale) as u32;
        DestRect {
            x: (area.width as i64 - width as i64).div_euclid(2) as i32,
            y: (area.height as i64 - height as i64).div_euclid(2) as i32,
            width,
            height,
        }
    }
}

/// One open print job on a device.
pub trait DeviceJob {
    fn begin_page(&mut self) -> DeviceResult<()>;

    fn blit(&mut self, raster: &Raster, dest: DestRect) -> DeviceResult<()>;

    fn end_page(&mut self) -> DeviceResult<()>;

    fn end_job(&mut self) -> DeviceResult<()>;

    /// Releases the device handle.
    fn close(&mut self) -> DeviceResult<()>;
}

/// Printer enumeration, job submission and capability queries.
pub trait PrintSubsystem {
    type Job: DeviceJob;

    fn list_devices(&self) -> DeviceResult<Vec<DeviceRef>>;

    fn open_job(&self, device: &DeviceRef, title: &str) -> DeviceResult<Self::Job>;

    fn query_capability(&self, device: &DeviceRef) -> DeviceResult<DeviceCapability>;
}

/// A job whose handle is closed exactly once: by [`ScopedJob::finish`], or on drop.
pub struct ScopedJob<J: DeviceJob> {
    job: J,
    closed: bool,
}

impl<J: DeviceJob> ScopedJob<J> {
    pub fn open<S>(subsystem: &S, device: &DeviceRef, title: &str) -> DeviceResult<Self>
    where
        S: PrintSubsystem<Job = J>,
    {
        let job = subsystem.open_job(device, title)?;
        debug!(device = %device.name, title, "job opened");
        Ok(Self { job, closed: false })
    }

    /// Closes the handle and reports the close result.
    pub fn finish(mut self) -> DeviceResult<()> {
        self.closed = true;
        self.job.close()
    }
}

impl<J: DeviceJob> Deref for ScopedJob<J> {
    type Target = J;

    fn deref(&self) -> &J {
        &self.job
    }
}

impl<J: DeviceJob> DerefMut for ScopedJob<J> {
    fn deref_mut(&mut self) -> &mut J {
        &mut self.job
    }
}

impl<J: DeviceJob> Drop for ScopedJob<J> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.job.close() {
            warn!(error = %e, "closing job after failure also failed");
        }
    }
}

/// Picks the printer to use.
///
/// A preferred name must be listed; without one the first listed device wins.
pub fn resolve_device<S: PrintSubsystem>(
    subsystem: &S,
    preferred: Option<&str>,
) -> DeviceResult<DeviceRef> {
    let devices = subsystem.list_devices()?;
    match preferred {
        Some(name) => devices
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DeviceError::NotFound(name.to_string())),
        None => devices.into_iter().next().ok_or(DeviceError::NoDevices),
    }
}
