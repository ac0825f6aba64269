//! Native calling boundary for the LamKit host bridge.
//!
//! The native module is an opaque capability surface called with arena
//! offsets rather than host objects. This crate defines that surface
//! ([`NativeModule`]), packs named binary resources into the three flat
//! tables its resource-provider constructor reads
//! ([`marshal`](marshal::marshal)), bootstraps the drawing context and
//! surface ([`ContextBootstrap`]), and ties memory and module together
//! in a [`Runtime`].
//!
//! # Ownership at the boundary
//!
//! - The three index tables belong to the marshaller for the duration of
//!   one constructor call and are freed as soon as it returns.
//! - Per-entry name and data buffers are handed to the native module when
//!   the constructor succeeds; the module copies or frees them.
//! - Source strings for animation construction are freed after the call.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod color;
pub mod cstr;
pub mod error;
pub mod marshal;
pub mod native;
pub mod resource;
pub mod runtime;

// Public re-exports for the primary API surface.
pub use bootstrap::{
    BootstrapState, CanvasSurface, CanvasTarget, ContextAttributes, ContextBootstrap,
    GraphicsHost, PowerPreference,
};
pub use color::{ColorSettings, ColorSpace, ColorSpaceHandle, ColorType, PixelFormat};
pub use error::MarshalError;
pub use marshal::{marshal, EntryBuffers, ResourceProvider, ResourceTable};
pub use native::{NativeModule, ResourceTableArgs};
pub use resource::{ResourceEntry, ResourceSet};
pub use runtime::Runtime;
