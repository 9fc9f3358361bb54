//! Brand artwork printed at the foot of every label.
//!
//! Built once at startup and shared read-only (`Arc<BrandAsset>`) by every
//! composer.

use crate::config::{
    BRAND_FONT_PX, BRAND_MARK_PX, BRAND_STRIP_HEIGHT, BRAND_TITLE, PAPER_WIDTH_PX, default_font_paths,
};
use crate::font::{Face, FontChain};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use tracing::{error, info, warn};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const STRIP_INSET: u32 = 10;

/// Inputs for building a [`BrandAsset`].
#[derive(Debug, Clone)]
pub struct BrandConfig {
    pub title: String,
    pub paper_width: u32,
    pub mark_size: u32,
    pub strip_height: u32,
    pub font_size: f32,
    /// Raster mark; a drawn emblem is used when absent
    pub mark: Option<RgbImage>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            title: BRAND_TITLE.to_string(),
            paper_width: PAPER_WIDTH_PX,
            mark_size: BRAND_MARK_PX,
            strip_height: BRAND_STRIP_HEIGHT,
            font_size: BRAND_FONT_PX,
            mark: None,
        }
    }
}

impl BrandConfig {
    /// Uses a base64-encoded PNG as the mark. Undecodable data keeps the drawn emblem.
    pub fn with_mark_base64(mut self, data: &str) -> Self {
        self.mark = decode_mark(data, self.mark_size);
        self
    }
}

/// Decodes a base64 image (whitespace tolerated) and scales it to `size`x`size`.
pub fn decode_mark(data: &str, size: u32) -> Option<RgbImage> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = match STANDARD.decode(compact) {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "brand mark is not valid base64");
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => {
            info!(width = img.width(), height = img.height(), "brand mark decoded");
            Some(image::imageops::resize(&img.to_rgb8(), size, size, FilterType::Lanczos3))
        }
        Err(e) => {
            error!(error = %e, "brand mark decode failed");
            None
        }
    }
}

/// Round emblem with a tick, used when no raster mark is supplied.
fn draw_emblem(size: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(size, size, WHITE);
    let s = size as f32;
    let c = (size / 2) as i32;
    draw_filled_circle_mut(&mut img, (c, c), c.saturating_sub(1), BLACK);
    let tick = [(0.28 * s, 0.52 * s), (0.44 * s, 0.68 * s), (0.74 * s, 0.34 * s)];
    for offset in [-1.0f32, 0.0, 1.0] {
        draw_line_segment_mut(&mut img, (tick[0].0, tick[0].1 + offset), (tick[1].0, tick[1].1 + offset), WHITE);
        draw_line_segment_mut(&mut img, (tick[1].0, tick[1].1 + offset), (tick[2].0, tick[2].1 + offset), WHITE);
    }
    img
}

/// Immutable brand artwork: the raster mark and the "mark + title" strip.
#[derive(Debug, Clone)]
pub struct BrandAsset {
    title: String,
    mark: RgbImage,
    wordmark: RgbImage,
}

impl BrandAsset {
    pub fn new(config: &BrandConfig, face: &Face) -> Self {
        let mark = config
            .mark
            .clone()
            .unwrap_or_else(|| draw_emblem(config.mark_size));

        let width = (config.paper_width / 3 * 2).max(1);
        let height = config.strip_height.max(mark.height()).max(1);
        let mut strip = RgbImage::from_pixel(width, height, WHITE);

        let text_x = STRIP_INSET + mark.width() + STRIP_INSET;
        image::imageops::overlay(
            &mut strip,
            &mark,
            STRIP_INSET as i64,
            ((height - mark.height()) / 2) as i64,
        );

        if !face.covers(&config.title) {
            warn!(title = %config.title, "brand font lacks glyphs for the title");
        }

        // Shrink the title until it fits beside the mark
        let available = width.saturating_sub(text_x + STRIP_INSET / 2).max(1);
        let mut font = face.sized(config.font_size);
        let measured = font.measure(&config.title);
        if measured > available {
            font = font.resized(config.font_size * available as f32 / measured as f32);
        }

        let text_w = font.measure(&config.title);
        let text_y = height.saturating_sub(font.line_height()) / 2;
        font.draw(&mut strip, text_x as i32, text_y as i32, &config.title);

        let underline_y = (text_y + font.line_height() + 2).min(height - 1) as f32;
        let end_x = (text_x + text_w).min(width - 1) as f32;
        draw_line_segment_mut(&mut strip, (text_x as f32, underline_y), (end_x, underline_y), BLACK);

        Self {
            title: config.title.clone(),
            mark,
            wordmark: strip,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mark(&self) -> &RgbImage {
        &self.mark
    }

    pub fn wordmark(&self) -> &RgbImage {
        &self.wordmark
    }
}

impl Default for BrandAsset {
    fn default() -> Self {
        let face = FontChain::from_paths(default_font_paths()).resolve();
        BrandAsset::new(&BrandConfig::default(), &face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strip_geometry() {
        let brand = BrandAsset::default();
        assert_eq!(brand.wordmark().width(), 148);
        assert_eq!(brand.wordmark().height(), 50);
        assert_eq!(brand.mark().dimensions(), (40, 40));
    }

    #[test]
    fn test_strip_has_ink() {
        let brand = BrandAsset::default();
        assert!(brand.wordmark().pixels().any(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_cyrillic_title_is_drawn_with_glyphs() {
        let config = BrandConfig::default();
        let brand = BrandAsset::new(&config, &Face::embedded());

        // right of the mark; the underline alone darkens one pixel per column
        let text_x = STRIP_INSET + config.mark_size + STRIP_INSET;
        let strip = brand.wordmark();
        let glyph_columns = (text_x..strip.width())
            .filter(|&x| (0..strip.height()).filter(|&y| strip.get_pixel(x, y).0[0] < 128).count() > 1)
            .count();
        assert!(glyph_columns > 30);
        assert!(Face::embedded().covers(brand.title()));
    }

    #[test]
    fn test_bad_base64_keeps_emblem() {
        let config = BrandConfig::default().with_mark_base64("not base64 !!!");
        assert!(config.mark.is_none());
        let brand = BrandAsset::new(&config, &Face::embedded());
        assert_eq!(brand.mark().dimensions(), (40, 40));
    }

    #[test]
    fn test_png_mark_is_resized() {
        let mut png = Vec::new();
        let src = RgbImage::from_pixel(8, 8, BLACK);
        src.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let config = BrandConfig::default().with_mark_base64(&STANDARD.encode(&png));
        assert_eq!(config.mark.as_ref().map(|m| m.dimensions()), Some((40, 40)));
    }
}
