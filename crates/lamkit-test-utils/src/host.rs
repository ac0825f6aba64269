//! A graphics host whose answers are set up front.

use lamkit_bridge::{CanvasTarget, ContextAttributes, GraphicsHost};
use lamkit_core::{ContextId, NativeHandle};

/// Mock [`GraphicsHost`].
///
/// Issues context ids from 1 upward when accepting. Every call is
/// recorded for later inspection.
pub struct ScriptedGraphicsHost {
    accept_contexts: bool,
    accept_make_current: bool,
    extensions_available: bool,
    next_id: u32,
    pub created: Vec<(CanvasTarget, ContextAttributes)>,
    pub current: Option<ContextId>,
    pub extensions: Vec<(ContextId, String)>,
    pub direct_contexts: Vec<(ContextId, NativeHandle)>,
    pub destroyed: Vec<ContextId>,
}

impl ScriptedGraphicsHost {
    /// A host that grants every request.
    pub fn accepting() -> Self {
        Self {
            accept_contexts: true,
            accept_make_current: true,
            extensions_available: true,
            next_id: 1,
            created: Vec::new(),
            current: None,
            extensions: Vec::new(),
            direct_contexts: Vec::new(),
            destroyed: Vec::new(),
        }
    }

    /// A host that refuses to create contexts.
    pub fn rejecting() -> Self {
        Self {
            accept_contexts: false,
            ..Self::accepting()
        }
    }

    pub fn failing_make_current(mut self) -> Self {
        self.accept_make_current = false;
        self
    }

    pub fn without_extensions(mut self) -> Self {
        self.extensions_available = false;
        self
    }

    pub fn set_accept_contexts(&mut self, accept: bool) {
        self.accept_contexts = accept;
    }

    /// The direct context most recently recorded for `context`.
    pub fn direct_context(&self, context: ContextId) -> Option<NativeHandle> {
        self.direct_contexts
            .iter()
            .rev()
            .find(|(c, _)| *c == context)
            .map(|(_, h)| *h)
    }
}

impl Default for ScriptedGraphicsHost {
    fn default() -> Self {
        Self::accepting()
    }
}

impl GraphicsHost for ScriptedGraphicsHost {
    fn create_context(
        &mut self,
        target: &CanvasTarget,
        attributes: &ContextAttributes,
    ) -> Option<ContextId> {
        self.created.push((*target, *attributes));
        if !self.accept_contexts {
            return None;
        }
        let id = ContextId(self.next_id);
        self.next_id += 1;
        Some(id)
    }

    fn make_context_current(&mut self, context: ContextId) -> bool {
        if self.accept_make_current {
            self.current = Some(context);
        }
        self.accept_make_current
    }

    fn get_extension(&mut self, context: ContextId, name: &str) -> bool {
        if self.extensions_available {
            self.extensions.push((context, name.to_owned()));
        }
        self.extensions_available
    }

    fn set_direct_context(&mut self, context: ContextId, gr_context: NativeHandle) {
        self.direct_contexts.push((context, gr_context));
    }

    fn destroy_context(&mut self, context: ContextId) {
        if self.current == Some(context) {
            self.current = None;
        }
        self.destroyed.push(context);
    }
}
