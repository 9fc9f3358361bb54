#![allow(dead_code)]

use dmlabel::brand::{BrandAsset, BrandConfig};
use dmlabel::font::Face;
use dmlabel::config::LabelConfig;
use dmlabel::{
    BatchController, Code, ColorDepth, DestRect, DeviceCapability, DeviceError, DeviceJob, DeviceRef,
    DeviceResult, EncodeError, HistoryEntry, HistoryStore, LabelComposer, PersistenceError,
    PersistenceResult, PrintDispatcher, PrintSubsystem, Raster, SymbolBitmap, SymbolEncoder,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PRINTER: &str = "TSC TDP-225";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Query,
    Open(String),
    Print(Raster),
    Close,
}

/// What reached the paper, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Label(Raster),
    Feed,
}

/// In-process spooler that records every call.
#[derive(Clone, Default)]
pub struct RecordingSpooler {
    events: Arc<Mutex<Vec<Event>>>,
    prints: Arc<AtomicUsize>,
    /// 1-based print job whose blit fails
    pub fail_on_print: Option<usize>,
}

impl RecordingSpooler {
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_print: Some(n),
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Print(raster) => Some(Step::Label(raster)),
                Event::Open(title) if title == "Feed" => Some(Step::Feed),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct RecordingJob {
    spooler: RecordingSpooler,
}

impl DeviceJob for RecordingJob {
    fn begin_page(&mut self) -> DeviceResult<()> {
        Ok(())
    }

    fn blit(&mut self, raster: &Raster, _dest: DestRect) -> DeviceResult<()> {
        let n = self.spooler.prints.fetch_add(1, Ordering::SeqCst) + 1;
        if self.spooler.fail_on_print == Some(n) {
            return Err(DeviceError::Blit("paper jam".into()));
        }
        self.spooler.push(Event::Print(raster.clone()));
        Ok(())
    }

    fn end_page(&mut self) -> DeviceResult<()> {
        Ok(())
    }

    fn end_job(&mut self) -> DeviceResult<()> {
        Ok(())
    }

    fn close(&mut self) -> DeviceResult<()> {
        self.spooler.push(Event::Close);
        Ok(())
    }
}

impl PrintSubsystem for RecordingSpooler {
    type Job = RecordingJob;

    fn list_devices(&self) -> DeviceResult<Vec<DeviceRef>> {
        Ok(vec![device()])
    }

    fn open_job(&self, _device: &DeviceRef, title: &str) -> DeviceResult<RecordingJob> {
        self.push(Event::Open(title.to_string()));
        Ok(RecordingJob {
            spooler: self.clone(),
        })
    }

    fn query_capability(&self, _device: &DeviceRef) -> DeviceResult<DeviceCapability> {
        self.push(Event::Query);
        Ok(DeviceCapability {
            width: 448,
            height: 800,
        })
    }
}

/// Striped test symbol; distinct payloads give distinct bitmaps.
///
/// Payloads containing `BAD` are rejected.
pub struct StripeEncoder;

impl SymbolEncoder for StripeEncoder {
    fn encode(&self, payload: &str) -> Result<SymbolBitmap, EncodeError> {
        if payload.contains("BAD") {
            return Err(EncodeError::Failed("unsupported payload".into()));
        }
        let bytes = payload.as_bytes();
        let (width, height) = (bytes.len() as u32 * 8, 16u32);
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let byte = bytes[(x / 8) as usize];
                let dark = (byte >> (x % 8)) & 1 == (y % 2) as u8;
                let v = if dark { 0 } else { 255 };
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        Ok(SymbolBitmap {
            width,
            height,
            pixels,
        })
    }
}

/// History whose every call fails.
pub struct BrokenHistory;

impl HistoryStore for BrokenHistory {
    fn append(&self, _codes: &[Code]) -> PersistenceResult<()> {
        Err(PersistenceError::Poisoned)
    }

    fn recent_entries(&self, _limit: usize) -> PersistenceResult<Vec<HistoryEntry>> {
        Err(PersistenceError::Poisoned)
    }
}

pub fn device() -> DeviceRef {
    DeviceRef::new(PRINTER).with_color_depth(ColorDepth::Gray)
}

pub fn codes(raw: &[&str]) -> Vec<Code> {
    raw.iter().map(|c| Code::new(c).unwrap()).collect()
}

pub fn composer(encoder: Arc<dyn SymbolEncoder>) -> LabelComposer {
    LabelComposer::new(
        Arc::new(BrandAsset::new(&BrandConfig::default(), &Face::embedded())),
        encoder,
        LabelConfig::default().with_font_paths(Vec::new()),
    )
}

/// The raster `device()` receives for `code`.
pub fn expected_raster(code: &str) -> Raster {
    let label = composer(Arc::new(StripeEncoder))
        .compose(&Code::new(code).unwrap())
        .unwrap();
    Raster::convert(label.image(), device().color_depth)
}

pub fn controller(
    spooler: RecordingSpooler,
    history: Arc<dyn HistoryStore>,
) -> BatchController<RecordingSpooler> {
    BatchController::new(
        composer(Arc::new(StripeEncoder)),
        PrintDispatcher::new(spooler),
        history,
    )
}
