//! Label composition: symbol, caption and brand strip on a fixed-width canvas.

use crate::brand::BrandAsset;
use crate::code::Code;
use crate::config::LabelConfig;
use crate::error::{ComposeError, ComposeResult, EncodeError};
use crate::font::{Face, FontChain};
use crate::symbol::SymbolEncoder;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::sync::Arc;
use tracing::{debug, warn};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const PLACEHOLDER_INSET: i32 = 10;

/// A finished label bitmap. Width always equals the configured paper width.
#[derive(Debug, Clone)]
pub struct ComposedLabel {
    code: Code,
    image: RgbImage,
    degraded: bool,
}

impl ComposedLabel {
    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True when produced without a symbol encoder.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Computed geometry of one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Scale taking the source symbol to the target size
    pub base_scale: f32,
    /// Second-pass factor, 1.0 when everything fits the paper
    pub shrink: f32,
    pub symbol_width: u32,
    pub symbol_height: u32,
    pub font_size: f32,
    pub text_width: u32,
    pub line_height: u32,
    pub wordmark_width: u32,
    pub wordmark_height: u32,
    pub symbol_y: u32,
    pub text_y: u32,
    pub rule_y: u32,
    pub wordmark_y: u32,
    pub height: u32,
}

impl Layout {
    pub fn is_shrunk(&self) -> bool {
        self.shrink < 1.0
    }
}

fn centered(outer: u32, inner: u32) -> u32 {
    outer.saturating_sub(inner) / 2
}

/// Turns codes into [`ComposedLabel`]s.
pub struct LabelComposer {
    brand: Arc<BrandAsset>,
    encoder: Arc<dyn SymbolEncoder>,
    face: Face,
    config: LabelConfig,
}

impl LabelComposer {
    /// Resolves the caption face from `config.font_paths`, falling back to the built-in face.
    pub fn new(brand: Arc<BrandAsset>, encoder: Arc<dyn SymbolEncoder>, config: LabelConfig) -> Self {
        let face = FontChain::from_paths(config.font_paths.clone()).resolve();
        Self {
            brand,
            encoder,
            face,
            config,
        }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    pub fn brand(&self) -> &BrandAsset {
        &self.brand
    }

    /// Plans the label for a symbol of `symbol_w` x `symbol_h` source pixels.
    pub fn layout(&self, code: &Code, symbol_w: u32, symbol_h: u32) -> Layout {
        let cfg = &self.config;
        let paper = cfg.paper_width;

        let base_scale = cfg.target_symbol as f32 / symbol_w.max(symbol_h).max(1) as f32;
        let scaled = |side: u32, factor: f32| ((side as f32 * base_scale * factor) as u32).max(1);

        let mut font = self.face.sized(cfg.font_size);
        let mut symbol_width = scaled(symbol_w, 1.0);
        let mut symbol_height = scaled(symbol_h, 1.0);
        let mut text_width = font.measure(code.as_str());

        let wordmark = self.brand.wordmark();
        let widest = symbol_width.max(text_width).max(wordmark.width());

        let mut shrink = 1.0;
        if widest > paper {
            shrink = paper as f32 / widest as f32;
            symbol_width = scaled(symbol_w, shrink).min(paper);
            symbol_height = scaled(symbol_h, shrink);
            font = font.resized(cfg.font_size * shrink);
            text_width = font.measure(code.as_str()).min(paper);
            debug!(code = %code, shrink, widest, "content wider than paper, shrinking");
        }

        let (wordmark_width, wordmark_height) = if wordmark.width() > paper {
            let fit = paper as f32 / wordmark.width() as f32;
            (paper, ((wordmark.height() as f32 * fit) as u32).max(1))
        } else {
            wordmark.dimensions()
        };

        let line_height = font.line_height();
        let symbol_y = cfg.padding_top;
        let text_y = symbol_y + symbol_height + cfg.padding_mid;
        let rule_y = text_y + line_height + 1;
        let wordmark_y = text_y + line_height + cfg.text_margin + cfg.padding_mid;
        let height = wordmark_y + wordmark_height;

        Layout {
            base_scale,
            shrink,
            symbol_width,
            symbol_height,
            font_size: font.size(),
            text_width,
            line_height,
            wordmark_width,
            wordmark_height,
            symbol_y,
            text_y,
            rule_y,
            wordmark_y,
            height,
        }
    }

    /// Composes the label for `code`.
    ///
    /// A missing encoder yields a placeholder label rather than an error.
    pub fn compose(&self, code: &Code) -> ComposeResult<ComposedLabel> {
        let bitmap = match self.encoder.encode(code.as_str()) {
            Ok(bitmap) => bitmap,
            Err(EncodeError::Unavailable) => {
                warn!(code = %code, "symbol encoder unavailable, composing placeholder");
                return self.placeholder(code);
            }
            Err(EncodeError::Failed(reason)) => return Err(ComposeError::Encode(reason)),
        };

        let (symbol_w, symbol_h) = (bitmap.width, bitmap.height);
        let source = bitmap.into_image()?;
        let layout = self.layout(code, symbol_w, symbol_h);
        let paper = self.config.paper_width;

        if layout.height > self.config.max_height {
            return Err(ComposeError::Canvas {
                width: paper,
                height: layout.height,
            });
        }

        let symbol = image::imageops::resize(
            &source,
            layout.symbol_width,
            layout.symbol_height,
            FilterType::Lanczos3,
        );

        let mut canvas = RgbImage::from_pixel(paper, layout.height, WHITE);
        image::imageops::overlay(
            &mut canvas,
            &symbol,
            centered(paper, layout.symbol_width) as i64,
            layout.symbol_y as i64,
        );

        let text_x = centered(paper, layout.text_width);
        let font = self.face.sized(layout.font_size);
        font.draw(&mut canvas, text_x as i32, layout.text_y as i32, code.as_str());
        if layout.text_width > 0 {
            let y = layout.rule_y as f32;
            let end = (text_x + layout.text_width - 1) as f32;
            draw_line_segment_mut(&mut canvas, (text_x as f32, y), (end, y), BLACK);
        }

        let wordmark = self.brand.wordmark();
        let fitted;
        let wordmark = if wordmark.width() != layout.wordmark_width {
            fitted = image::imageops::resize(
                wordmark,
                layout.wordmark_width,
                layout.wordmark_height,
                FilterType::Lanczos3,
            );
            &fitted
        } else {
            wordmark
        };
        image::imageops::overlay(
            &mut canvas,
            wordmark,
            centered(paper, layout.wordmark_width) as i64,
            layout.wordmark_y as i64,
        );

        debug!(code = %code, height = layout.height, shrink = layout.shrink, "label composed");
        Ok(ComposedLabel {
            code: code.clone(),
            image: canvas,
            degraded: false,
        })
    }

    fn placeholder(&self, code: &Code) -> ComposeResult<ComposedLabel> {
        let cfg = &self.config;
        let mut canvas = RgbImage::from_pixel(cfg.paper_width, cfg.placeholder_height, WHITE);
        let text = format!("DataMatrix:\n{}\n{}", code, self.brand.title());
        self.face
            .sized(cfg.font_size)
            .draw_lines(&mut canvas, PLACEHOLDER_INSET, PLACEHOLDER_INSET, &text);
        Ok(ComposedLabel {
            code: code.clone(),
            image: canvas,
            degraded: true,
        })
    }
}
