//! Frame streaming loop for the LamKit host bridge.
//!
//! [`FrameStreamer`] renders an animation frame by frame and, on a
//! configurable cadence, captures fresh bytes, marshals them into a new
//! resource provider, builds a new animation against it and swaps the
//! pair in. The loop is a single sequential task: each iteration's
//! render starts only after the previous iteration's rebuild finished.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod capture;
pub mod config;
pub mod metrics;
pub mod streamer;

pub use capture::{encode_png, PixelSource, PngCapture, RgbaFrame};
pub use config::{ConfigError, LoopConfig};
pub use metrics::LoopMetrics;
pub use streamer::{ActivePair, FrameCycleState, FrameStreamer, LoopError};
