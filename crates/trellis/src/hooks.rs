//! Post-layout hooks.
//!
//! Decoration participants (corner rounding, borders, inspectors) react to
//! fresh geometry by registering a [`PostLayoutHook`] on a node. Hooks run
//! synchronously after the node's `computed_size` is published and before
//! its in-flight flag is cleared, in registration order.

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use trellis_core::geometry::Size;

use crate::{hierarchy::NodeId, pass::PassId};

/// Identifier returned by [`PostLayoutHookRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// Payload handed to hooks when a node finishes its pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEvent {
    pass: PassId,
    node: NodeId,
    size: Size,
    placed: usize,
    cancelled: bool,
}

impl LayoutEvent {
    pub(crate) fn new(pass: PassId, node: NodeId, size: Size, placed: usize, cancelled: bool) -> Self {
        Self {
            pass,
            node,
            size,
            placed,
            cancelled,
        }
    }

    pub fn pass(&self) -> PassId {
        self.pass
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The node's freshly published `computed_size`
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of children placed during the pass
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Whether the pass was cut short by cancellation
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Channel through which a hook asks for follow-up passes.
///
/// Requests are collected and forwarded to the coordinator once every hook
/// of the node has run. A request for the node whose hooks are running, or
/// for an ancestor it is being laid out under in the same pass, is rejected.
#[derive(Debug)]
pub struct HookContext {
    current: NodeId,
    requests: Vec<NodeId>,
}

impl HookContext {
    pub(crate) fn new(current: NodeId) -> Self {
        Self {
            current,
            requests: Vec::new(),
        }
    }

    /// Node whose hooks are running
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Ask for a layout pass on `node` after the hooks return.
    pub fn request_pass(&mut self, node: NodeId) {
        self.requests.push(node);
    }

    pub(crate) fn into_requests(self) -> Vec<NodeId> {
        self.requests
    }
}

/// Callback invoked after a node's layout pass.
pub trait PostLayoutHook {
    fn on_layout(&mut self, event: &LayoutEvent, ctx: &mut HookContext);
}

impl<F> PostLayoutHook for F
where
    F: FnMut(&LayoutEvent, &mut HookContext),
{
    fn on_layout(&mut self, event: &LayoutEvent, ctx: &mut HookContext) {
        self(event, ctx)
    }
}

/// Hooks keyed by node identity.
#[derive(Default)]
pub struct PostLayoutHookRegistry {
    hooks: IndexMap<NodeId, Vec<(HookId, Box<dyn PostLayoutHook>)>>,
    next_id: u64,
}

impl PostLayoutHookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` to run after every pass of `node`.
    pub fn register<H>(&mut self, node: NodeId, hook: H) -> HookId
    where
        H: PostLayoutHook + 'static,
    {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks
            .entry(node)
            .or_default()
            .push((id, Box::new(hook)));
        id
    }

    /// Remove a hook. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: HookId) -> bool {
        let Some(node) = self
            .hooks
            .iter()
            .find(|(_, hooks)| hooks.iter().any(|(hook_id, _)| *hook_id == id))
            .map(|(node, _)| *node)
        else {
            return false;
        };

        if let Some(hooks) = self.hooks.get_mut(&node) {
            hooks.retain(|(hook_id, _)| *hook_id != id);
            if hooks.is_empty() {
                self.hooks.shift_remove(&node);
            }
        }
        true
    }

    /// Drop every hook of `node`, typically once it is destroyed.
    pub fn clear_node(&mut self, node: NodeId) -> usize {
        let removed = self.hooks.shift_remove(&node).map_or(0, |hooks| hooks.len());
        if removed > 0 {
            debug!(node:% = node, removed; "Cleared post-layout hooks");
        }
        removed
    }

    pub fn hook_count(&self, node: NodeId) -> usize {
        self.hooks.get(&node).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn invoke(&mut self, event: &LayoutEvent, ctx: &mut HookContext) {
        let Some(hooks) = self.hooks.get_mut(&event.node()) else {
            return;
        };
        for (_, hook) in hooks.iter_mut() {
            hook.on_layout(event, ctx);
        }
    }
}

impl fmt::Debug for PostLayoutHookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(NodeId, usize)> = self
            .hooks
            .iter()
            .map(|(node, hooks)| (*node, hooks.len()))
            .collect();
        f.debug_struct("PostLayoutHookRegistry")
            .field("hooks", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}
