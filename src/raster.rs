//! Device-native rasters.

use crate::dithering::{self, ImageDithering};
use image::{GrayImage, RgbImage};

/// Pixel format a print device accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Rgb,
    Gray,
    /// 1-bit, reduced with the given method
    Bilevel(ImageDithering),
}

impl Default for ColorDepth {
    fn default() -> Self {
        ColorDepth::Bilevel(ImageDithering::FloydSteinberg)
    }
}

/// A label converted to a device's colour depth.
#[derive(Debug, Clone, PartialEq)]
pub enum Raster {
    Rgb(RgbImage),
    /// Grayscale; pure 0/255 when produced for a bilevel device
    Luma(GrayImage),
}

impl Raster {
    pub fn convert(image: &RgbImage, depth: ColorDepth) -> Raster {
        match depth {
            ColorDepth::Rgb => Raster::Rgb(image.clone()),
            ColorDepth::Gray => Raster::Luma(image::imageops::grayscale(image)),
            ColorDepth::Bilevel(method) => {
                let mut gray = image::imageops::grayscale(image);
                dithering::apply(&mut gray, method);
                Raster::Luma(gray)
            }
        }
    }

    /// Blank white page of the given size.
    pub fn blank(width: u32, height: u32) -> Raster {
        Raster::Luma(GrayImage::from_pixel(width, height, image::Luma([255])))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Raster::Rgb(img) => img.dimensions(),
            Raster::Luma(img) => img.dimensions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_default_depth_is_bilevel() {
        let img = RgbImage::from_fn(10, 4, |x, _| Rgb([(x * 25) as u8; 3]));
        let Raster::Luma(out) = Raster::convert(&img, ColorDepth::default()) else {
            panic!("expected luma raster");
        };
        assert_eq!(out.dimensions(), (10, 4));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_rgb_passthrough() {
        let img = RgbImage::from_pixel(3, 3, Rgb([10, 20, 30]));
        assert_eq!(Raster::convert(&img, ColorDepth::Rgb), Raster::Rgb(img));
    }

    #[test]
    fn test_threshold_depth_is_hard_cut() {
        let img = RgbImage::from_fn(4, 1, |x, _| Rgb([[0, 100, 200, 255][x as usize]; 3]));
        let Raster::Luma(out) = Raster::convert(&img, ColorDepth::Bilevel(ImageDithering::Threshold)) else {
            panic!("expected luma raster");
        };
        assert_eq!(out.as_raw(), &vec![0, 0, 255, 255]);
    }
}
