//! Drawing context and on-screen surface bootstrap.
//!
//! [`ContextBootstrap`] walks a canvas from nothing to a ready surface:
//!
//! ```text
//! Unconfigured -> ContextCreated -> ContextCurrent -> SurfaceReady
//!       \________________\________________\__________-> Failed
//! ```
//!
//! `Failed` is terminal for that bootstrap. Failure is reported as the
//! [`CanvasSurface::NULL`] sentinel rather than an error; callers check
//! [`CanvasSurface::is_null`].

use lamkit_arena::LinearMemory;
use lamkit_core::{ContextId, NativeHandle};
use log::{debug, warn};

use crate::color::{ColorSettings, ColorSpaceHandle};
use crate::native::NativeModule;

/// Extension enabled on every new context so the renderer can be
/// identified in diagnostics.
pub const DEBUG_RENDERER_INFO: &str = "WEBGL_debug_renderer_info";

/// GPU selection hint passed to context creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PowerPreference {
    /// Let the host decide.
    #[default]
    Default,
    /// Prefer the integrated GPU.
    LowPower,
    /// Prefer the discrete GPU.
    HighPerformance,
}

/// Capabilities requested when creating a graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextAttributes {
    /// Request an alpha channel.
    pub alpha: bool,
    /// Request a depth buffer.
    pub depth: bool,
    /// Stencil buffer bits.
    pub stencil: u8,
    /// Request multisampling.
    pub antialias: bool,
    /// Whether colour output is premultiplied by alpha.
    pub premultiplied_alpha: bool,
    /// Keep the drawing buffer between frames.
    pub preserve_drawing_buffer: bool,
    /// GPU selection hint.
    pub power_preference: PowerPreference,
    /// Refuse slow software fallbacks.
    pub fail_if_major_performance_caveat: bool,
    /// Enable all extensions at creation.
    pub enable_extensions_by_default: bool,
    /// Take manual control of buffer presentation.
    pub explicit_swap_control: bool,
    /// Render through an offscreen back buffer.
    pub render_via_offscreen_back_buffer: bool,
}

impl ContextAttributes {
    /// The fixed set used for canvas surfaces.
    pub const CANVAS: ContextAttributes = ContextAttributes {
        alpha: true,
        depth: true,
        stencil: 8,
        antialias: false,
        premultiplied_alpha: true,
        preserve_drawing_buffer: false,
        power_preference: PowerPreference::Default,
        fail_if_major_performance_caveat: false,
        enable_extensions_by_default: true,
        explicit_swap_control: false,
        render_via_offscreen_back_buffer: false,
    };
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self::CANVAS
    }
}

/// The canvas a surface is created for, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasTarget {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

/// The host graphics API.
pub trait GraphicsHost {
    /// Create a context on `target`. `None` when the host refuses.
    fn create_context(
        &mut self,
        target: &CanvasTarget,
        attributes: &ContextAttributes,
    ) -> Option<ContextId>;

    /// Make `context` current. Returns `false` on failure.
    fn make_context_current(&mut self, context: ContextId) -> bool;

    /// Enable extension `name` on `context`. Returns whether it is available.
    fn get_extension(&mut self, context: ContextId, name: &str) -> bool;

    /// Record `gr_context` as the native drawing context of `context`.
    fn set_direct_context(&mut self, context: ContextId, gr_context: NativeHandle);

    /// Release `context`. Called when bootstrapping fails after creation.
    fn destroy_context(&mut self, context: ContextId);
}

/// A native on-screen surface, tagged with the objects it draws through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSurface {
    /// The native surface object.
    pub handle: NativeHandle,
    /// Host context the surface draws into.
    pub context: Option<ContextId>,
    /// Native drawing context wrapping `context`.
    pub gr_context: NativeHandle,
    /// Colour settings the surface was created with.
    pub settings: ColorSettings,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

impl CanvasSurface {
    /// Returned when bootstrapping fails.
    pub const NULL: CanvasSurface = CanvasSurface {
        handle: NativeHandle::NULL,
        context: None,
        gr_context: NativeHandle::NULL,
        settings: ColorSettings::SRGB,
        width: 0,
        height: 0,
    };

    /// Whether this is the failure sentinel.
    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }
}

/// Where a [`ContextBootstrap`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapState {
    /// Nothing created yet.
    Unconfigured,
    /// The host created a context.
    ContextCreated(ContextId),
    /// The context is current.
    ContextCurrent(ContextId),
    /// The surface exists.
    SurfaceReady(CanvasSurface),
    /// Bootstrapping failed. Terminal.
    Failed,
}

/// Drives one canvas through context and surface creation.
#[derive(Debug)]
pub struct ContextBootstrap {
    attributes: ContextAttributes,
    state: BootstrapState,
}

impl ContextBootstrap {
    /// A bootstrap requesting [`ContextAttributes::CANVAS`].
    pub fn new() -> Self {
        Self::with_attributes(ContextAttributes::CANVAS)
    }

    /// A bootstrap requesting custom attributes.
    pub fn with_attributes(attributes: ContextAttributes) -> Self {
        Self {
            attributes,
            state: BootstrapState::Unconfigured,
        }
    }

    /// Current state.
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Attributes requested at context creation.
    pub fn attributes(&self) -> &ContextAttributes {
        &self.attributes
    }

    /// Create a context on `target` and an on-screen surface drawing into
    /// it in `color_space`.
    ///
    /// Returns [`CanvasSurface::NULL`] if any step fails, after releasing
    /// the host context and native objects created so far. Once the surface
    /// is ready, further calls return it again; once failed, they return
    /// the sentinel without touching the host.
    pub fn make_canvas_surface<G, M>(
        &mut self,
        host: &mut G,
        memory: &mut LinearMemory,
        native: &mut M,
        target: &CanvasTarget,
        color_space: ColorSpaceHandle,
    ) -> CanvasSurface
    where
        G: GraphicsHost + ?Sized,
        M: NativeModule + ?Sized,
    {
        match self.state {
            BootstrapState::SurfaceReady(surface) => return surface,
            BootstrapState::Failed => return CanvasSurface::NULL,
            _ => {}
        }

        let Some(context) = host.create_context(target, &self.attributes) else {
            warn!(
                "host refused a {}x{} graphics context",
                target.width, target.height
            );
            return self.fail();
        };
        self.transition(BootstrapState::ContextCreated(context));

        if !host.make_context_current(context) {
            warn!("could not make context {context} current");
            host.destroy_context(context);
            return self.fail();
        }
        self.transition(BootstrapState::ContextCurrent(context));

        if !host.get_extension(context, DEBUG_RENDERER_INFO) {
            debug!("{DEBUG_RENDERER_INFO} unavailable on context {context}");
        }

        let gr_context = native.make_gr_context(context);
        if gr_context.is_null() {
            warn!("native module could not wrap context {context}");
            host.destroy_context(context);
            return self.fail();
        }
        host.set_direct_context(context, gr_context);

        let settings = ColorSettings::for_color_space(Some(color_space.space));
        let handle = native.make_on_screen_surface(
            gr_context,
            target.width,
            target.height,
            color_space.handle,
            settings,
        );
        if handle.is_null() {
            warn!("native module could not create a surface on context {context}");
            native.delete(memory, gr_context);
            host.set_direct_context(context, NativeHandle::NULL);
            host.destroy_context(context);
            return self.fail();
        }

        let surface = CanvasSurface {
            handle,
            context: Some(context),
            gr_context,
            settings,
            width: target.width,
            height: target.height,
        };
        self.transition(BootstrapState::SurfaceReady(surface));
        surface
    }

    fn transition(&mut self, next: BootstrapState) {
        debug!("context bootstrap: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self) -> CanvasSurface {
        self.transition(BootstrapState::Failed);
        CanvasSurface::NULL
    }
}

impl Default for ContextBootstrap {
    fn default() -> Self {
        Self::new()
    }
}
