//! 2-D symbol encoding seam.
//!
//! The composer only needs an RGB pixel grid for a payload; how the grid is
//! produced is up to the [`SymbolEncoder`] implementation.

use crate::error::{ComposeError, EncodeError};
use image::RgbImage;

/// Encoder output: row-major RGB, 3 bytes per pixel, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SymbolBitmap {
    /// Converts into an image buffer, checking the declared geometry.
    pub fn into_image(self) -> Result<RgbImage, ComposeError> {
        let (width, height, len) = (self.width, self.height, self.pixels.len());
        if width == 0 || height == 0 {
            return Err(ComposeError::InvalidSymbol { width, height, len });
        }
        RgbImage::from_raw(width, height, self.pixels)
            .filter(|img| img.as_raw().len() == (width as usize) * (height as usize) * 3)
            .ok_or(ComposeError::InvalidSymbol { width, height, len })
    }
}

/// Payload to symbol bitmap.
pub trait SymbolEncoder: Send + Sync {
    fn encode(&self, payload: &str) -> Result<SymbolBitmap, EncodeError>;
}

/// Stand-in used when no encoder is installed; always reports `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingEncoder;

impl SymbolEncoder for MissingEncoder {
    fn encode(&self, _payload: &str) -> Result<SymbolBitmap, EncodeError> {
        Err(EncodeError::Unavailable)
    }
}

/// Matrix symbol encoder backed by the `qrcode` crate.
///
/// Emits one pixel per module, with a quiet zone of `quiet_zone` modules.
#[cfg(feature = "qr")]
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    pub quiet_zone: u32,
}

#[cfg(feature = "qr")]
impl Default for QrEncoder {
    fn default() -> Self {
        Self { quiet_zone: 2 }
    }
}

#[cfg(feature = "qr")]
impl SymbolEncoder for QrEncoder {
    fn encode(&self, payload: &str) -> Result<SymbolBitmap, EncodeError> {
        use qrcode::{Color, QrCode};

        let code = QrCode::new(payload.as_bytes())
            .map_err(|e| EncodeError::Failed(format!("QR encode error: {e}")))?;
        let modules = code.to_colors();
        let module_count = code.width() as u32;
        let side = module_count + 2 * self.quiet_zone;

        let mut pixels = vec![255u8; (side * side * 3) as usize];
        for (i, color) in modules.iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let x = (i as u32) % module_count + self.quiet_zone;
            let y = (i as u32) / module_count + self.quiet_zone;
            let idx = ((y * side + x) * 3) as usize;
            pixels[idx..idx + 3].copy_from_slice(&[0, 0, 0]);
        }

        Ok(SymbolBitmap {
            width: side,
            height: side,
            pixels,
        })
    }
}
