//! LamKit: a host bridge for a sandboxed native animation renderer.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! LamKit sub-crates. For most users, adding `lamkit` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use lamkit::prelude::*;
//!
//! let mut memory = LinearMemory::new(ArenaConfig::default()).unwrap();
//!
//! // Buffers survive arena growth: views are re-derived on demand.
//! let mut samples = ManagedBuffer::<f32>::from_slice(&mut memory, &[0.5, 1.5]).unwrap();
//! let filler = memory.allocate(64 * lamkit::arena::PAGE_SIZE).unwrap();
//! assert_eq!(samples.to_view(&memory).unwrap(), &[0.5, 1.5]);
//!
//! samples.free(&mut memory).unwrap();
//! samples.free(&mut memory).unwrap(); // second free is a no-op
//! memory.free(filler).unwrap();
//! assert_eq!(memory.stats().live_allocations, 0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `lamkit-core` | Offsets, native handles, capture and clock traits |
//! | [`arena`] | `lamkit-arena` | Linear memory arena and managed buffers |
//! | [`bridge`] | `lamkit-bridge` | Native module trait, marshalling, context bootstrap |
//! | [`engine`] | `lamkit-engine` | Frame streaming loop and PNG capture |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers, errors, and async capability traits (`lamkit-core`).
pub use lamkit_core as types;

/// Linear memory arena and growth-safe buffers (`lamkit-arena`).
///
/// [`arena::LinearMemory`] owns the shared memory; [`arena::ManagedBuffer`]
/// hands out typed views that are refreshed after growth.
pub use lamkit_arena as arena;

/// The native calling boundary (`lamkit-bridge`).
///
/// Implement [`bridge::NativeModule`] and [`bridge::GraphicsHost`] for a
/// concrete renderer, then drive it through a [`bridge::Runtime`].
pub use lamkit_bridge as bridge;

/// Frame streaming loop (`lamkit-engine`).
pub use lamkit_engine as engine;

/// Common imports for typical LamKit usage.
///
/// ```rust
/// use lamkit::prelude::*;
/// ```
pub mod prelude {
    // Identifiers and traits
    pub use lamkit_core::{CaptureError, CaptureSource, FrameClock, NativeHandle, Offset};

    // Arena
    pub use lamkit_arena::{ArenaConfig, ArenaError, LinearMemory, ManagedBuffer};

    // Bridge
    pub use lamkit_bridge::{
        marshal, CanvasSurface, CanvasTarget, ContextBootstrap, GraphicsHost, MarshalError,
        NativeModule, ResourceProvider, ResourceSet, Runtime,
    };

    // Engine
    pub use lamkit_engine::{FrameStreamer, LoopConfig, LoopError, LoopMetrics, PngCapture};
}
