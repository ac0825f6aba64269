//! Core types and traits for the LamKit host bridge.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers that cross the native boundary (arena offsets, opaque
//! native handles, graphics context ids), the shared error types, and
//! the asynchronous capability traits driven by the frame loop.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::CaptureError;
pub use id::{ContextId, NativeHandle, Offset};
pub use traits::{CaptureSource, FrameClock};
