//! Lossless PNG export of composed labels.

use crate::code::Code;
use crate::compose::ComposedLabel;
use crate::error::ExportError;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const UNSAFE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// `datamatrix_<code>.png`, with path-unsafe characters replaced by `_`.
pub fn file_name_for(code: &Code) -> String {
    let safe: String = code
        .as_str()
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) || c.is_control() { '_' } else { c })
        .collect();
    format!("datamatrix_{safe}.png")
}

/// Writes `label` into `dir` (created if missing) and returns the file path.
pub fn export_label(label: &ComposedLabel, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name_for(label.code()));
    label.image().save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

/// Result of exporting several codes.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<(Code, String)>,
}

impl ExportReport {
    pub fn total(&self) -> usize {
        self.saved.len() + self.failed.len()
    }

    pub(crate) fn record(&mut self, code: &Code, outcome: Result<PathBuf, String>) {
        match outcome {
            Ok(path) => {
                info!(code = %code, path = %path.display(), "label exported");
                self.saved.push(path);
            }
            Err(reason) => {
                warn!(code = %code, reason = %reason, "label export failed");
                self.failed.push((code.clone(), reason));
            }
        }
    }
}
