//! dmlabel: compose DataMatrix compliance labels and print them on label printers.
//!
//! Main modules:
//! - compose: label layout (symbol, caption, brand strip)
//! - dispatch: copy-major print dispatch with feeds between labels
//! - batch: orchestration, history and the background worker
//! - device: print subsystem traits
//! - symbol: symbol encoder seam
//! - font, brand, dithering, raster: rendering helpers
//! - history, export, settings, logging: collaborators and ambient setup

pub mod batch;
pub mod brand;
pub mod code;
pub mod compose;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod dithering;
pub mod error;
pub mod export;
pub mod font;
pub mod history;
pub mod logging;
pub mod raster;
pub mod settings;
pub mod symbol;

/// Batch API
pub use batch::{BatchController, BatchMode, BatchReport, BatchRequest, BatchWorker, SkippedCode};
/// Composition
pub use brand::{BrandAsset, BrandConfig};
pub use code::{Code, Copies};
pub use compose::{ComposedLabel, LabelComposer, Layout};
/// Printing
pub use device::{DestRect, DeviceCapability, DeviceJob, DeviceRef, PrintSubsystem, resolve_device};
pub use dispatch::{DispatchResult, PrintDispatcher};
pub use error::*;
pub use history::{HistoryEntry, HistoryStore, MemoryHistory, RedbHistory};
pub use raster::{ColorDepth, Raster};
#[cfg(feature = "qr")]
pub use symbol::QrEncoder;
pub use symbol::{MissingEncoder, SymbolBitmap, SymbolEncoder};
