//! Growable linear memory shared with a sandboxed native module.
//!
//! The host and the native side address one contiguous byte region by
//! 32-bit offset. The region can grow; growth relocates the backing
//! store, so every typed view taken before it is stale. This crate
//! contains that hazard:
//!
//! ```text
//! LinearMemory (one per native instance)
//! ├── backing store: Vec<u64>, 8-byte aligned, grown by 64 KiB pages
//! ├── header-based allocator (first-fit free list + bump pointer)
//! ├── growth epoch (bumped on every relocation)
//! └── typed views (HEAP8 .. HEAPF64) borrowed from the current store
//!
//! ManagedBuffer<T> (one per allocation, single owner)
//! ├── offset + element count
//! └── cached view descriptor, valid only for the epoch it was taken in
//! ```
//!
//! Views are plain borrows of the arena, so the borrow checker already
//! rejects holding one across an `allocate` call. [`ManagedBuffer`]
//! additionally re-derives its view whenever the growth epoch changes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod element;
pub mod error;
pub mod memory;

// Public re-exports for the primary API surface.
pub use buffer::ManagedBuffer;
pub use config::ArenaConfig;
pub use element::{Element, HeapKind, TypedView};
pub use error::ArenaError;
pub use memory::{LinearMemory, MemoryStats, PAGE_SIZE};
