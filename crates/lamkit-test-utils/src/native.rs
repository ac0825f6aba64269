//! A native module that keeps its objects in memory and records calls.

use std::collections::BTreeMap;

use lamkit_arena::LinearMemory;
use lamkit_bridge::cstr::read_c_string;
use lamkit_bridge::{ColorSettings, NativeModule, ResourceTableArgs};
use lamkit_core::{ContextId, NativeHandle, Offset};

/// Objects a [`RecordingNative`] can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeObject {
    ColorSpace,
    GrContext {
        context: ContextId,
    },
    Surface {
        gr_context: NativeHandle,
        width: u32,
        height: u32,
        color_space: NativeHandle,
        settings: ColorSettings,
    },
    /// Copied resources, in table order.
    Provider {
        resources: Vec<(String, Vec<u8>)>,
    },
    Animation {
        source: String,
        provider: NativeHandle,
    },
}

/// Calls observed by a [`RecordingNative`].
#[derive(Clone, Debug, PartialEq)]
pub enum NativeEvent {
    ProviderBuilt {
        handle: NativeHandle,
        args: ResourceTableArgs,
    },
    ProviderRejected {
        args: ResourceTableArgs,
    },
    AnimationBuilt {
        handle: NativeHandle,
        provider: NativeHandle,
    },
    Rendered {
        surface: NativeHandle,
        animation: NativeHandle,
        frame: u32,
        /// Whether the animation and the provider it was built with were
        /// both live at the time of the call.
        consistent: bool,
    },
    Deleted {
        handle: NativeHandle,
    },
}

/// Mock native module.
///
/// The provider constructor copies every entry out of the arena and
/// frees the entry buffers, as a real module taking ownership would.
/// Constructors can be told to reject, returning the null handle.
/// Handles count up from 1 and are never reissued, so a deleted handle
/// stays dead.
#[derive(Default)]
pub struct RecordingNative {
    objects: BTreeMap<NativeHandle, NativeObject>,
    last_handle: u64,
    events: Vec<NativeEvent>,
    provider_budget: Option<usize>,
    reject_animations: bool,
    reject_gr_contexts: bool,
    reject_surfaces: bool,
}

impl RecordingNative {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only the next `n` provider constructions.
    pub fn accept_providers(mut self, n: usize) -> Self {
        self.provider_budget = Some(n);
        self
    }

    /// Reject every provider construction.
    pub fn rejecting_providers(self) -> Self {
        self.accept_providers(0)
    }

    pub fn rejecting_animations(mut self) -> Self {
        self.reject_animations = true;
        self
    }

    pub fn rejecting_gr_contexts(mut self) -> Self {
        self.reject_gr_contexts = true;
        self
    }

    pub fn rejecting_surfaces(mut self) -> Self {
        self.reject_surfaces = true;
        self
    }

    pub fn set_reject_animations(&mut self, reject: bool) {
        self.reject_animations = reject;
    }

    pub fn events(&self) -> &[NativeEvent] {
        &self.events
    }

    pub fn object(&self, handle: NativeHandle) -> Option<&NativeObject> {
        self.objects.get(&handle)
    }

    /// Resources copied into a provider.
    pub fn provider_resources(&self, handle: NativeHandle) -> Option<&[(String, Vec<u8>)]> {
        match self.objects.get(&handle)? {
            NativeObject::Provider { resources } => Some(resources.as_slice()),
            _ => None,
        }
    }

    /// Number of live objects of any kind.
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Number of live providers.
    pub fn live_providers(&self) -> usize {
        self.objects
            .values()
            .filter(|o| matches!(o, NativeObject::Provider { .. }))
            .count()
    }

    /// Number of live animations.
    pub fn live_animations(&self) -> usize {
        self.objects
            .values()
            .filter(|o| matches!(o, NativeObject::Animation { .. }))
            .count()
    }

    /// Frames passed to `render_animation`, in call order.
    pub fn rendered_frames(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                NativeEvent::Rendered { frame, .. } => Some(*frame),
                _ => None,
            })
            .collect()
    }

    fn insert(&mut self, object: NativeObject) -> NativeHandle {
        self.last_handle += 1;
        let handle = NativeHandle(self.last_handle);
        self.objects.insert(handle, object);
        handle
    }

    fn copy_resources(
        memory: &LinearMemory,
        args: ResourceTableArgs,
    ) -> Option<Vec<(String, Vec<u8>)>> {
        let count = args.count as usize;
        if count == 0 {
            return Some(Vec::new());
        }
        let names: &[u32] = memory.view(args.names, count).ok()?;
        let data: &[u32] = memory.view(args.data, count).ok()?;
        let sizes: &[u32] = memory.view(args.sizes, count).ok()?;
        let mut resources = Vec::with_capacity(count);
        for i in 0..count {
            let name = read_c_string(memory, Offset(names[i])).ok()?.to_owned();
            let bytes = memory
                .read_bytes(Offset(data[i]), sizes[i] as usize)
                .ok()?
                .to_vec();
            resources.push((name, bytes));
        }
        Some(resources)
    }

    fn entry_offsets(memory: &LinearMemory, args: ResourceTableArgs) -> Vec<Offset> {
        let count = args.count as usize;
        if count == 0 {
            return Vec::new();
        }
        let names: &[u32] = memory.view(args.names, count).unwrap_or(&[]);
        let data: &[u32] = memory.view(args.data, count).unwrap_or(&[]);
        names.iter().chain(data).map(|&o| Offset(o)).collect()
    }
}

impl NativeModule for RecordingNative {
    fn make_color_space_srgb(&mut self) -> NativeHandle {
        self.insert(NativeObject::ColorSpace)
    }

    fn make_gr_context(&mut self, context: ContextId) -> NativeHandle {
        if self.reject_gr_contexts {
            return NativeHandle::NULL;
        }
        self.insert(NativeObject::GrContext { context })
    }

    fn make_on_screen_surface(
        &mut self,
        gr_context: NativeHandle,
        width: u32,
        height: u32,
        color_space: NativeHandle,
        settings: ColorSettings,
    ) -> NativeHandle {
        if self.reject_surfaces || !self.objects.contains_key(&gr_context) {
            return NativeHandle::NULL;
        }
        self.insert(NativeObject::Surface {
            gr_context,
            width,
            height,
            color_space,
            settings,
        })
    }

    fn make_resource_provider(
        &mut self,
        memory: &mut LinearMemory,
        args: ResourceTableArgs,
    ) -> NativeHandle {
        if let Some(budget) = self.provider_budget.as_mut() {
            if *budget == 0 {
                self.events.push(NativeEvent::ProviderRejected { args });
                return NativeHandle::NULL;
            }
            *budget -= 1;
        }
        let Some(resources) = Self::copy_resources(memory, args) else {
            self.events.push(NativeEvent::ProviderRejected { args });
            return NativeHandle::NULL;
        };
        for offset in Self::entry_offsets(memory, args) {
            let _ = memory.free(offset);
        }
        let handle = self.insert(NativeObject::Provider { resources });
        self.events.push(NativeEvent::ProviderBuilt { handle, args });
        handle
    }

    fn make_animation(
        &mut self,
        memory: &LinearMemory,
        source: Offset,
        provider: NativeHandle,
    ) -> NativeHandle {
        if self.reject_animations || !self.objects.contains_key(&provider) {
            return NativeHandle::NULL;
        }
        let Ok(source) = read_c_string(memory, source) else {
            return NativeHandle::NULL;
        };
        let handle = self.insert(NativeObject::Animation {
            source: source.to_owned(),
            provider,
        });
        self.events.push(NativeEvent::AnimationBuilt { handle, provider });
        handle
    }

    fn render_animation(&mut self, surface: NativeHandle, animation: NativeHandle, frame: u32) {
        let consistent = match self.objects.get(&animation) {
            Some(NativeObject::Animation { provider, .. }) => self.objects.contains_key(provider),
            _ => false,
        };
        self.events.push(NativeEvent::Rendered {
            surface,
            animation,
            frame,
            consistent,
        });
    }

    fn delete(&mut self, _memory: &mut LinearMemory, handle: NativeHandle) {
        if self.objects.remove(&handle).is_some() {
            self.events.push(NativeEvent::Deleted { handle });
        }
    }
}
