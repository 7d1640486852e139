//! Rounded-corner decoration driven by post-layout hooks.
//!
//! A container's corner radius can only be resolved once its size is
//! known. [`RoundedCorners`] registers a hook per tracked node and records
//! the effective radius, clamped to half of the shorter side, each time the
//! node is laid out.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use log::trace;

use crate::{
    hierarchy::NodeId,
    hooks::{HookContext, HookId, LayoutEvent, PostLayoutHookRegistry},
};

/// Effective corner radii of tracked layout nodes.
#[derive(Debug, Clone, Default)]
pub struct RoundedCorners {
    radii: Rc<RefCell<HashMap<NodeId, f32>>>,
}

impl RoundedCorners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the radius of `node` after each of its layout passes.
    pub fn track(&self, registry: &mut PostLayoutHookRegistry, node: NodeId, radius: f32) -> HookId {
        let radii = Rc::clone(&self.radii);
        registry.register(node, move |event: &LayoutEvent, _: &mut HookContext| {
            let effective = clamp_radius(radius, event.size().width(), event.size().height());
            trace!(node:% = event.node(), radius = effective; "Refreshed corner radius");
            radii.borrow_mut().insert(event.node(), effective);
        })
    }

    /// Last effective radius of `node`, `None` until it has been laid out.
    pub fn radius(&self, node: NodeId) -> Option<f32> {
        self.radii.borrow().get(&node).copied()
    }

    pub fn forget(&self, node: NodeId) {
        self.radii.borrow_mut().remove(&node);
    }
}

/// Clamp `radius` to what a `width` x `height` box can hold.
pub fn clamp_radius(radius: f32, width: f32, height: f32) -> f32 {
    radius.min(width.min(height) / 2.0).max(0.0)
}
