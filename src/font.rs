//! Text measuring and rasterization for label captions.
//!
//! Faces are resolved through a [`FontChain`]: font files from disk are tried
//! in order, and the embedded DejaVu Sans Bold closes the chain so resolution
//! always succeeds.

use image::{Rgb, RgbImage};
use once_cell::sync::Lazy;
use rusttype::{point, Font, Scale};
use std::path::PathBuf;
use tracing::{debug, warn};

static FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");
static EMBEDDED_FONT: Lazy<Font<'static>> =
    Lazy::new(|| Font::try_from_bytes(FONT_DATA).expect("Failed to load embedded TTF"));

/// One step in the font fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// TrueType/OpenType file on disk
    File(PathBuf),
    /// Face compiled into the binary, always available
    Embedded,
}

impl FontSource {
    fn load(&self) -> Option<Face> {
        match self {
            FontSource::File(path) => {
                let bytes = std::fs::read(path).ok()?;
                match Font::try_from_vec(bytes) {
                    Some(font) => Some(Face(font)),
                    None => {
                        warn!(path = %path.display(), "font file is not a usable TTF/OTF");
                        None
                    }
                }
            }
            FontSource::Embedded => Some(Face::embedded()),
        }
    }
}

/// Ordered font strategies; the first one that loads wins.
#[derive(Debug, Clone)]
pub struct FontChain {
    sources: Vec<FontSource>,
}

impl FontChain {
    /// Tries each path in order, then the embedded face.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut sources: Vec<FontSource> =
            paths.into_iter().map(|p| FontSource::File(p.into())).collect();
        sources.push(FontSource::Embedded);
        Self { sources }
    }

    pub fn sources(&self) -> &[FontSource] {
        &self.sources
    }

    /// Resolves the first loadable face. Never fails.
    pub fn resolve(&self) -> Face {
        for source in &self.sources {
            if let Some(face) = source.load() {
                debug!(source = ?source, "font resolved");
                return face;
            }
        }
        Face::embedded()
    }
}

/// A resolved outline typeface, not yet sized.
#[derive(Clone)]
pub struct Face(Font<'static>);

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Face").field(&self.0.glyph_count()).finish()
    }
}

impl Face {
    pub fn embedded() -> Face {
        Face(EMBEDDED_FONT.clone())
    }

    pub fn sized(&self, size: f32) -> SizedFont {
        SizedFont {
            face: self.clone(),
            size,
        }
    }

    /// True when every character of `text` has a real glyph.
    pub fn covers(&self, text: &str) -> bool {
        text.chars()
            .filter(|ch| !ch.is_whitespace())
            .all(|ch| self.0.glyph(ch).id().0 != 0)
    }
}

/// A face at a concrete pixel size.
#[derive(Debug, Clone)]
pub struct SizedFont {
    face: Face,
    size: f32,
}

impl SizedFont {
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Same face at another size.
    pub fn resized(&self, size: f32) -> SizedFont {
        self.face.sized(size)
    }

    /// Pen advance of `text` in pixels, kerning included (unrounded).
    pub fn advance(&self, text: &str) -> f32 {
        let scale = Scale::uniform(self.size);
        self.face
            .0
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width)
    }

    /// Rendered width of `text`, rounded up to whole pixels.
    pub fn measure(&self, text: &str) -> u32 {
        self.advance(text).ceil() as u32
    }

    pub fn line_height(&self) -> u32 {
        let v = self.face.0.v_metrics(Scale::uniform(self.size));
        (v.ascent - v.descent).ceil() as u32
    }

    /// Draws black `text` with its top-left corner at (`x`, `y`). Clipped to the canvas.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str) {
        let scale = Scale::uniform(self.size);
        let v_metrics = self.face.0.v_metrics(scale);
        let origin = point(x as f32, y as f32 + v_metrics.ascent);
        for glyph in self.face.0.layout(text, scale, origin) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    darken(canvas, bb.min.x + gx as i32, bb.min.y + gy as i32, v);
                });
            }
        }
    }

    /// Draws each line of `text` below the previous one.
    pub fn draw_lines(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str) {
        let step = self.line_height() as i32 + 2;
        for (i, line) in text.lines().enumerate() {
            self.draw(canvas, x, y + i as i32 * step, line);
        }
    }
}

fn darken(canvas: &mut RgbImage, px: i32, py: i32, coverage: f32) {
    if px < 0 || py < 0 || px as u32 >= canvas.width() || py as u32 >= canvas.height() {
        return;
    }
    let pixel = canvas.get_pixel_mut(px as u32, py as u32);
    let keep = 1.0 - coverage.clamp(0.0, 1.0);
    *pixel = Rgb(pixel.0.map(|c| (c as f32 * keep) as u8));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink(canvas: &RgbImage) -> Vec<(u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] < 128)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_chain_falls_back_to_embedded() {
        let chain = FontChain::from_paths(["/nonexistent/bold.ttf", "/nonexistent/regular.ttf"]);
        assert_eq!(chain.sources().len(), 3);
        assert_eq!(chain.sources().last(), Some(&FontSource::Embedded));
        let face = chain.resolve();
        assert!(face.covers("ЧЕСТНЫЙ ЗНАК"));
        assert!(face.covers("01abc'&<>\";@$"));
    }

    #[test]
    fn test_font_file_loads_and_garbage_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.ttf");
        let bad = dir.path().join("bad.ttf");
        std::fs::write(&good, FONT_DATA).unwrap();
        std::fs::write(&bad, b"not a font").unwrap();

        assert!(FontSource::File(good.clone()).load().is_some());
        assert!(FontSource::File(bad.clone()).load().is_none());

        let face = FontChain::from_paths([bad, good]).resolve();
        assert_eq!(
            face.sized(16.0).measure("0104600000000001"),
            Face::embedded().sized(16.0).measure("0104600000000001")
        );
    }

    #[test]
    fn test_measure_scales_linearly() {
        let font = Face::embedded().sized(16.0);
        let half = font.resized(8.0);
        let code = "0104600000000001";
        let (full, halved) = (font.advance(code), half.advance(code));
        assert!(full > 0.0);
        assert!((full - 2.0 * halved).abs() < 1e-3 * full);
    }

    #[test]
    fn test_case_and_punctuation_render_distinctly() {
        let font = Face::embedded().sized(16.0);
        let draw = |text: &str| {
            let mut canvas = RgbImage::from_pixel(160, 24, Rgb([255, 255, 255]));
            font.draw(&mut canvas, 0, 0, text);
            canvas
        };
        assert_ne!(draw("01abc'&<"), draw("01ABC'&<"));
        assert_ne!(draw("'"), draw("\""));
        assert_ne!(font.advance("abc"), font.advance("ABC"));
    }

    #[test]
    fn test_draws_inside_measured_box() {
        let font = Face::embedded().sized(16.0);
        let mut canvas = RgbImage::from_pixel(60, 30, Rgb([255, 255, 255]));
        font.draw(&mut canvas, 2, 2, "01");
        let dark = ink(&canvas);
        assert!(!dark.is_empty());
        let right = 2 + font.measure("01") + 1;
        let bottom = 2 + font.line_height();
        assert!(dark.iter().all(|&(x, y)| x >= 2 && x <= right && y >= 2 && y <= bottom));
    }

    #[test]
    fn test_draw_lines_stacks_rows() {
        let font = Face::embedded().sized(16.0);
        let mut canvas = RgbImage::from_pixel(100, 60, Rgb([255, 255, 255]));
        font.draw_lines(&mut canvas, 0, 0, "AB\nCD");
        let step = font.line_height() + 2;
        let dark = ink(&canvas);
        assert!(dark.iter().any(|&(_, y)| y < step));
        assert!(dark.iter().any(|&(_, y)| y >= step));
    }

    #[test]
    fn test_draw_clips_outside_canvas() {
        let font = Face::embedded().sized(32.0);
        let mut canvas = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        font.draw(&mut canvas, -10, -10, "WWW");
        font.draw(&mut canvas, 100, 100, "WWW");
    }
}
