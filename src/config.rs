//! Label geometry and dispatch tuning.

use std::path::PathBuf;

// Label geometry (pixels)
pub const PAPER_WIDTH_PX: u32 = 224;
pub const TARGET_SYMBOL_PX: u32 = 118;
pub const PADDING_TOP: u32 = 15;
pub const PADDING_MID: u32 = 10;
pub const TEXT_MARGIN: u32 = 5;
pub const CODE_FONT_PX: f32 = 16.0;
pub const PLACEHOLDER_HEIGHT: u32 = 300;
pub const MAX_LABEL_HEIGHT: u32 = 4096;

// Brand strip
pub const BRAND_TITLE: &str = "ЧЕСТНЫЙ ЗНАК";
pub const BRAND_MARK_PX: u32 = 40;
pub const BRAND_STRIP_HEIGHT: u32 = 50;
pub const BRAND_FONT_PX: f32 = 16.0;

// Dispatch
pub const MARGIN_FACTOR: f32 = 0.9;
pub const MIN_COPIES: u32 = 1;
pub const MAX_COPIES: u32 = 100;
pub const PRINT_JOB_TITLE: &str = "DataMatrix Print";
pub const FEED_JOB_TITLE: &str = "Feed";

// History
pub const HISTORY_LIMIT: usize = 100;

/// Font files tried for the code text, in order, before the built-in face.
pub fn default_font_paths() -> Vec<PathBuf> {
    [
        "arialbd.ttf",
        "arial.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

/// Layout parameters for [`crate::compose::LabelComposer`].
#[derive(Debug, Clone)]
pub struct LabelConfig {
    pub paper_width: u32,
    pub target_symbol: u32,
    pub padding_top: u32,
    pub padding_mid: u32,
    pub text_margin: u32,
    pub font_size: f32,
    pub placeholder_height: u32,
    pub max_height: u32,
    pub font_paths: Vec<PathBuf>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            paper_width: PAPER_WIDTH_PX,
            target_symbol: TARGET_SYMBOL_PX,
            padding_top: PADDING_TOP,
            padding_mid: PADDING_MID,
            text_margin: TEXT_MARGIN,
            font_size: CODE_FONT_PX,
            placeholder_height: PLACEHOLDER_HEIGHT,
            max_height: MAX_LABEL_HEIGHT,
            font_paths: default_font_paths(),
        }
    }
}

impl LabelConfig {
    pub fn with_font_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.font_paths = paths;
        self
    }

    pub fn with_target_symbol(mut self, px: u32) -> Self {
        self.target_symbol = px;
        self
    }
}

/// Parameters for [`crate::dispatch::PrintDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Fraction of the printable area the label may occupy (< 1.0 leaves a border)
    pub margin: f32,
    pub job_title: String,
    pub feed_title: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            margin: MARGIN_FACTOR,
            job_title: PRINT_JOB_TITLE.to_string(),
            feed_title: FEED_JOB_TITLE.to_string(),
        }
    }
}
