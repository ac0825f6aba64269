//! Asynchronous capabilities the frame loop suspends on.
//!
//! Both traits use `async fn` directly. The loop runs on a single
//! cooperative task, so no `Send` bound is required of the futures.

use crate::error::CaptureError;

/// Produces binary resources asynchronously (e.g. a video frame encoded
/// to an image).
#[allow(async_fn_in_trait)]
pub trait CaptureSource {
    /// Capture the next resource.
    ///
    /// Resolves to the captured bytes, or to a [`CaptureError`] that the
    /// caller treats as fatal.
    async fn capture(&mut self) -> Result<Vec<u8>, CaptureError>;
}

/// Signals the start of each display frame.
#[allow(async_fn_in_trait)]
pub trait FrameClock {
    /// Wait for the next display frame.
    ///
    /// Resolves to the frame timestamp in milliseconds.
    async fn next_frame(&mut self) -> f64;
}
