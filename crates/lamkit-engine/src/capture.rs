//! PNG capture from a raw RGBA pixel source.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use lamkit_core::{CaptureError, CaptureSource};

/// One frame of 8-bit RGBA pixels, row-major, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

/// Produces raw frames (a video element, a camera, a test pattern).
#[allow(async_fn_in_trait)]
pub trait PixelSource {
    /// Wait for and return the next frame.
    async fn next_frame(&mut self) -> Result<RgbaFrame, CaptureError>;
}

/// Encode `frame` as a PNG file.
pub fn encode_png(frame: &RgbaFrame) -> Result<Vec<u8>, CaptureError> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.pixels.len() != expected {
        return Err(CaptureError::Encode {
            reason: format!(
                "{}x{} frame needs {expected} bytes, got {}",
                frame.width,
                frame.height,
                frame.pixels.len()
            ),
        });
    }
    let image = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone()).ok_or_else(
        || CaptureError::Encode {
            reason: "invalid image data".into(),
        },
    )?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CaptureError::Encode {
            reason: e.to_string(),
        })?;
    Ok(out.into_inner())
}

/// A [`CaptureSource`] yielding each frame of `S` as PNG bytes.
pub struct PngCapture<S> {
    source: S,
}

impl<S: PixelSource> PngCapture<S> {
    /// Wrap a pixel source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: PixelSource> CaptureSource for PngCapture<S> {
    async fn capture(&mut self) -> Result<Vec<u8>, CaptureError> {
        let frame = self.source.next_frame().await?;
        encode_png(&frame)
    }
}
