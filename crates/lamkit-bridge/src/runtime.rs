//! The loaded native module together with the memory it shares.

use std::mem;

use lamkit_arena::LinearMemory;
use lamkit_core::NativeHandle;
use log::{debug, warn};

use crate::bootstrap::{CanvasSurface, CanvasTarget, ContextBootstrap, GraphicsHost};
use crate::color::{ColorSpace, ColorSpaceHandle};
use crate::cstr;
use crate::error::MarshalError;
use crate::marshal::{marshal, ResourceProvider};
use crate::native::NativeModule;
use crate::resource::ResourceSet;

type Initializer<M> = Box<dyn FnOnce(&mut Runtime<M>)>;

/// Owns the arena and the native module, and exposes the module's
/// operations in host terms.
///
/// Initialisation is explicit: hooks registered with
/// [`add_initializer`](Self::add_initializer) run, in order, when
/// [`initialize`](Self::initialize) is first called, after the sRGB
/// colour space has been created.
pub struct Runtime<M: NativeModule> {
    memory: LinearMemory,
    native: M,
    srgb: Option<ColorSpaceHandle>,
    initializers: Vec<Initializer<M>>,
    initialized: bool,
}

impl<M: NativeModule> Runtime<M> {
    /// Wrap a loaded module and its arena.
    pub fn new(memory: LinearMemory, native: M) -> Self {
        Self {
            memory,
            native,
            srgb: None,
            initializers: Vec::new(),
            initialized: false,
        }
    }

    /// Register a hook to run during [`initialize`](Self::initialize).
    ///
    /// Runs immediately if the runtime is already initialised.
    pub fn add_initializer(&mut self, hook: impl FnOnce(&mut Self) + 'static) {
        if self.initialized {
            hook(self);
        } else {
            self.initializers.push(Box::new(hook));
        }
    }

    /// Create the sRGB colour space, then run the registered hooks.
    ///
    /// Only the first call does anything.
    pub fn initialize(&mut self) -> ColorSpaceHandle {
        if self.initialized {
            return self.color_space();
        }
        self.initialized = true;
        let srgb = self.color_space();
        let hooks = mem::take(&mut self.initializers);
        debug!("runtime initialised; running {} extra initialisers", hooks.len());
        for hook in hooks {
            hook(self);
        }
        srgb
    }

    /// Whether [`initialize`](Self::initialize) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The sRGB colour space, created on first use.
    pub fn color_space(&mut self) -> ColorSpaceHandle {
        if let Some(srgb) = self.srgb {
            return srgb;
        }
        let handle = self.native.make_color_space_srgb();
        if handle.is_null() {
            warn!("native module returned a null sRGB colour space");
        }
        let srgb = ColorSpaceHandle {
            space: ColorSpace::Srgb,
            handle,
        };
        self.srgb = Some(srgb);
        srgb
    }

    /// Bootstrap an on-screen surface for `target` in sRGB.
    pub fn make_canvas_surface<G: GraphicsHost + ?Sized>(
        &mut self,
        bootstrap: &mut ContextBootstrap,
        host: &mut G,
        target: &CanvasTarget,
    ) -> CanvasSurface {
        let color_space = self.color_space();
        bootstrap.make_canvas_surface(host, &mut self.memory, &mut self.native, target, color_space)
    }

    /// Marshal `resources` into a new native resource provider.
    pub fn make_resource_provider(
        &mut self,
        resources: &ResourceSet,
    ) -> Result<ResourceProvider, MarshalError> {
        marshal(&mut self.memory, &mut self.native, resources)
    }

    /// Build an animation from `source`, resolving assets through `provider`.
    ///
    /// The source is copied into the arena for the duration of the call.
    pub fn make_animation(
        &mut self,
        source: &str,
        provider: &ResourceProvider,
    ) -> Result<NativeHandle, MarshalError> {
        let offset = cstr::write_c_string(&mut self.memory, source)?;
        let animation = self
            .native
            .make_animation(&self.memory, offset, provider.handle());
        self.memory.free(offset)?;
        if animation.is_null() {
            return Err(MarshalError::AnimationRejected);
        }
        Ok(animation)
    }

    /// Draw `frame` of `animation` onto `surface`.
    pub fn render_animation(&mut self, surface: &CanvasSurface, animation: NativeHandle, frame: u32) {
        self.native.render_animation(surface.handle, animation, frame);
    }

    /// Destroy a native object. The null handle is ignored.
    pub fn delete(&mut self, handle: NativeHandle) {
        if handle.is_null() {
            return;
        }
        self.native.delete(&mut self.memory, handle);
    }

    /// The shared arena.
    pub fn memory(&self) -> &LinearMemory {
        &self.memory
    }

    /// Mutable access to the shared arena.
    pub fn memory_mut(&mut self) -> &mut LinearMemory {
        &mut self.memory
    }

    /// The native module.
    pub fn native(&self) -> &M {
        &self.native
    }

    /// Mutable access to the native module.
    pub fn native_mut(&mut self) -> &mut M {
        &mut self.native
    }

    /// Split into arena and module.
    pub fn into_parts(self) -> (LinearMemory, M) {
        (self.memory, self.native)
    }
}
