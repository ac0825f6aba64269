//! Test utilities and mock types for LamKit development.
//!
//! Provides a recording [`NativeModule`](lamkit_bridge::NativeModule)
//! ([`RecordingNative`]), a scripted
//! [`GraphicsHost`](lamkit_bridge::GraphicsHost)
//! ([`ScriptedGraphicsHost`]), and scripted async capabilities
//! ([`ScriptedCapture`], [`ImmediateClock`]) for driving the frame loop.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod capture;
pub mod host;
pub mod native;

pub use capture::{ImmediateClock, ScriptedCapture, YieldOnce};
pub use host::ScriptedGraphicsHost;
pub use native::{NativeEvent, NativeObject, RecordingNative};

use lamkit_arena::{ArenaConfig, LinearMemory};

/// A small arena for tests: one initial page, growable to `max_pages`.
pub fn test_memory(max_pages: u32) -> LinearMemory {
    LinearMemory::new(ArenaConfig {
        initial_pages: 1,
        max_pages,
        heap_base: ArenaConfig::DEFAULT_HEAP_BASE,
    })
    .expect("test arena config is valid")
}
