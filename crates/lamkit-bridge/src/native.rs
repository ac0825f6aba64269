//! The native module's calling surface.
//!
//! Everything the host asks of the native side goes through
//! [`NativeModule`]. Arguments that do not fit in a scalar are written
//! into the arena first and passed by [`Offset`]; objects the module
//! creates come back as [`NativeHandle`]s, with `NativeHandle::NULL`
//! signalling failure.

use lamkit_arena::LinearMemory;
use lamkit_core::{ContextId, NativeHandle, Offset};

use crate::color::ColorSettings;

/// Arguments of the resource-provider constructor.
///
/// Three parallel `u32` tables of `count` entries each. All offsets are
/// `Offset::NULL` when `count` is 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceTableArgs {
    /// Number of entries.
    pub count: u32,
    /// Table of name offsets. Each name is a NUL-terminated UTF-8 string.
    pub names: Offset,
    /// Table of data offsets.
    pub data: Offset,
    /// Table of data lengths in bytes.
    pub sizes: Offset,
}

/// Capabilities exported by the native module.
///
/// Constructors return `NativeHandle::NULL` on failure. The module runs
/// synchronously inside each call and shares the host's arena.
pub trait NativeModule {
    /// Create the sRGB colour space object.
    fn make_color_space_srgb(&mut self) -> NativeHandle;

    /// Wrap the host graphics context `context` in a native drawing
    /// context.
    fn make_gr_context(&mut self, context: ContextId) -> NativeHandle;

    /// Create an on-screen surface of `width` x `height` pixels drawing
    /// through `gr_context`.
    fn make_on_screen_surface(
        &mut self,
        gr_context: NativeHandle,
        width: u32,
        height: u32,
        color_space: NativeHandle,
        settings: ColorSettings,
    ) -> NativeHandle;

    /// Build a resource provider from the tables described by `args`.
    ///
    /// On success the module owns every per-entry name and data
    /// allocation the tables point at and must copy or free them. It must
    /// not free the tables themselves. On failure (null return) it must
    /// leave all of them untouched.
    fn make_resource_provider(
        &mut self,
        memory: &mut LinearMemory,
        args: ResourceTableArgs,
    ) -> NativeHandle;

    /// Build an animation from the NUL-terminated source string at
    /// `source`, resolving external assets through `provider`.
    fn make_animation(
        &mut self,
        memory: &LinearMemory,
        source: Offset,
        provider: NativeHandle,
    ) -> NativeHandle;

    /// Draw frame `frame` of `animation` onto `surface`.
    fn render_animation(&mut self, surface: NativeHandle, animation: NativeHandle, frame: u32);

    /// Destroy the object behind `handle`. Unknown or stale handles are
    /// ignored.
    fn delete(&mut self, memory: &mut LinearMemory, handle: NativeHandle);
}
