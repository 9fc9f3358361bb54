use image::GrayImage;
use image::imageops::{BiLevel, dither};

/// Reduction used when a device only takes 1-bit rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageDithering {
    Threshold,
    #[default]
    FloydSteinberg,
}

/// Reduces a grayscale image to pure black/white in-place.
pub fn apply(img: &mut GrayImage, method: ImageDithering) {
    match method {
        ImageDithering::Threshold => threshold(img),
        ImageDithering::FloydSteinberg => dither(img, &BiLevel),
    }
}

/// Hard cut at mid-gray.
pub fn threshold(img: &mut GrayImage) {
    for pixel in img.pixels_mut() {
        pixel[0] = if pixel[0] > 127 { 255 } else { 0 };
    }
}
