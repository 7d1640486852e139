//! Scheduling and stepping of layout passes.
//!
//! The [`UpdateCoordinator`] owns every piece of pass bookkeeping: the
//! per-node in-flight and dirty flags, cancellation tokens, the queue of
//! active passes and the post-layout hook registry.
//!
//! A pass is an explicit stack of frames, one per layout node being laid
//! out. Each step crosses one child boundary of the top frame, so a pass can
//! be suspended between any two children and resumed on the next
//! [`UpdateCoordinator::tick`]. Nested layout nodes push a new frame and are
//! finalized before their parent measures them, which gives a post-order
//! walk of the tree.

use std::collections::{HashMap, VecDeque};

use log::{debug, error, info, trace, warn};
use thiserror::Error;
use trellis_core::geometry::Size;

use crate::{
    cancel::CancelToken,
    config::EngineConfig,
    hierarchy::{Hierarchy, NodeId},
    hooks::{HookContext, LayoutEvent, PostLayoutHookRegistry},
    node::LayoutConfig,
    pass::{PassId, PassOutcome, PassReport, PassTicket, RejectReason, RequestOutcome},
    snapshot::{ChildEntry, ChildSnapshot},
    solver::LayoutSolver,
};

/// Errors raised by configuration edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} is not a layout node")]
    NotALayoutNode(NodeId),
}

#[derive(Debug, Default)]
struct NodeState {
    in_flight: bool,
    dirty: bool,
}

/// One layout node being laid out within a pass.
#[derive(Debug)]
struct Frame {
    node: NodeId,
    snapshot: ChildSnapshot,
    next: usize,
    solver: LayoutSolver,
    previous: Size,
    /// Entry of a nested layout node whose frame sits above this one.
    pending: Option<ChildEntry>,
}

#[derive(Debug)]
struct Pass {
    ticket: PassTicket,
    report: PassReport,
    token: CancelToken,
    frames: Vec<Frame>,
}

enum Step {
    Continue,
    Done,
}

/// Drives layout passes over a [`Hierarchy`].
///
/// At most one pass is in flight per layout node. A request made while the
/// node is in flight marks it dirty instead, and exactly one follow-up pass
/// is scheduled when the running one finishes.
#[derive(Debug, Default)]
pub struct UpdateCoordinator {
    config: EngineConfig,
    states: HashMap<NodeId, NodeState>,
    children: HashMap<NodeId, Vec<NodeId>>,
    tokens: HashMap<NodeId, CancelToken>,
    active: VecDeque<Pass>,
    hooks: PostLayoutHookRegistry,
    next_pass: u64,
}

impl UpdateCoordinator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hooks(&self) -> &PostLayoutHookRegistry {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut PostLayoutHookRegistry {
        &mut self.hooks
    }

    pub fn is_in_flight(&self, node: NodeId) -> bool {
        self.states.get(&node).is_some_and(|state| state.in_flight)
    }

    /// Whether a follow-up pass is owed to `node` once its current pass ends.
    pub fn is_dirty(&self, node: NodeId) -> bool {
        self.states.get(&node).is_some_and(|state| state.dirty)
    }

    /// `true` when no pass is active.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Schedule a layout pass on `node`.
    ///
    /// The pass starts immediately: the node's configuration and children
    /// are captured now, and edits made afterwards apply to the next pass.
    /// The pass itself advances on [`Self::tick`].
    pub fn request_pass<H>(&mut self, hierarchy: &H, node: NodeId) -> RequestOutcome
    where
        H: Hierarchy + ?Sized,
    {
        if !hierarchy.contains(node) {
            debug!(node:% = node; "Rejected pass request for unknown node");
            return RequestOutcome::Rejected(RejectReason::UnknownNode);
        }
        if hierarchy.layout(node).is_none() {
            debug!(node:% = node; "Rejected pass request for non-layout node");
            return RequestOutcome::Rejected(RejectReason::NotALayoutNode);
        }
        if self.is_in_flight(node) {
            if let Some(state) = self.states.get_mut(&node) {
                state.dirty = true;
            }
            debug!(node:% = node; "Coalesced pass request into running pass");
            return RequestOutcome::Coalesced;
        }

        let id = PassId::new(self.next_pass);
        self.next_pass += 1;

        let token = CancelToken::new();
        let Some(frame) = self.open_frame(hierarchy, node, &token) else {
            return RequestOutcome::Rejected(RejectReason::NotALayoutNode);
        };

        let ticket = PassTicket::new(id);
        self.active.push_back(Pass {
            ticket: ticket.clone(),
            report: PassReport::new(id, node),
            token,
            frames: vec![frame],
        });
        info!(pass:% = id, node:% = node; "Scheduled layout pass");

        RequestOutcome::Scheduled(ticket)
    }

    /// Cancel the pass running on `node`.
    ///
    /// Cancellation is cooperative: the pass notices it at the next child
    /// boundary and finalizes every open frame with the children processed
    /// so far. Returns `false` if `node` has no pass in flight.
    pub fn cancel_pass(&mut self, node: NodeId) -> bool {
        if !self.is_in_flight(node) {
            return false;
        }
        match self.tokens.get(&node) {
            Some(token) => {
                token.cancel();
                debug!(node:% = node; "Cancelled layout pass");
                true
            }
            None => false,
        }
    }

    /// Notify the coordinator that the children of `node` changed.
    pub fn on_hierarchy_changed<H>(&mut self, hierarchy: &H, node: NodeId) -> RequestOutcome
    where
        H: Hierarchy + ?Sized,
    {
        self.children
            .insert(node, hierarchy.children(node).to_vec());
        self.request_pass(hierarchy, node)
    }

    /// Replace the layout configuration of `node` and request a pass.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if `node` does not exist or is not a layout node.
    pub fn configure<H>(
        &mut self,
        hierarchy: &mut H,
        node: NodeId,
        config: LayoutConfig,
    ) -> Result<RequestOutcome, LayoutError>
    where
        H: Hierarchy + ?Sized,
    {
        if !hierarchy.contains(node) {
            return Err(LayoutError::UnknownNode(node));
        }
        let layout = hierarchy
            .layout_mut(node)
            .ok_or(LayoutError::NotALayoutNode(node))?;
        layout.set_config(config);

        Ok(self.request_pass(&*hierarchy, node))
    }

    /// Forget everything known about `node` and its known descendants.
    ///
    /// Running passes detect the destruction on their own; this only drops
    /// bookkeeping and hooks.
    pub fn on_node_destroyed(&mut self, node: NodeId) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(children) = self.children.remove(&current) {
                pending.extend(children);
            }
            self.states.remove(&current);
            self.tokens.remove(&current);
            self.hooks.clear_node(current);
        }
        debug!(node:% = node; "Dropped state of destroyed node");
    }

    /// Advance active passes by at most `steps_per_tick` child boundaries.
    ///
    /// Returns the reports of passes that finished during this tick. Passes
    /// scheduled while ticking, by hooks or dirty follow-ups, run in the
    /// same tick if the budget allows it.
    pub fn tick<H>(&mut self, hierarchy: &mut H) -> Vec<PassReport>
    where
        H: Hierarchy + ?Sized,
    {
        let budget = self.config.steps_per_tick();
        let mut steps = 0;
        let mut finished = Vec::new();

        while let Some(mut pass) = self.active.pop_front() {
            loop {
                if budget != 0 && steps >= budget {
                    self.active.push_front(pass);
                    return finished;
                }
                steps += 1;

                if let Step::Done = self.step(hierarchy, &mut pass) {
                    break;
                }
            }

            info!(
                pass:% = pass.report.id(),
                node:% = pass.report.root(),
                outcome:? = pass.report.outcome(),
                nodes = pass.report.nodes_laid_out().len(),
                steps = pass.report.steps();
                "Finished layout pass"
            );
            pass.ticket.complete(pass.report.clone());
            finished.push(pass.report);
        }

        finished
    }

    /// Tick until no pass is active.
    pub fn run_until_idle<H>(&mut self, hierarchy: &mut H) -> Vec<PassReport>
    where
        H: Hierarchy + ?Sized,
    {
        let mut reports = Vec::new();
        while !self.is_idle() {
            reports.extend(self.tick(hierarchy));
        }
        reports
    }

    /// Request a pass on `node` and drive it to completion.
    ///
    /// Returns `None` if the request was coalesced or rejected. A coalesced
    /// request still runs the owed follow-up before returning.
    pub fn layout_now<H>(&mut self, hierarchy: &mut H, node: NodeId) -> Option<PassReport>
    where
        H: Hierarchy + ?Sized,
    {
        match self.request_pass(&*hierarchy, node) {
            RequestOutcome::Scheduled(ticket) => {
                while !ticket.is_complete() && !self.is_idle() {
                    self.tick(hierarchy);
                }
                ticket.report()
            }
            RequestOutcome::Coalesced => {
                self.run_until_idle(hierarchy);
                None
            }
            RequestOutcome::Rejected(reason) => {
                warn!(node:% = node, reason:% = reason; "Manual layout request rejected");
                None
            }
        }
    }

    fn open_frame<H>(&mut self, hierarchy: &H, node: NodeId, token: &CancelToken) -> Option<Frame>
    where
        H: Hierarchy + ?Sized,
    {
        let layout = hierarchy.layout(node)?;
        let config = *layout.config();
        let previous = layout.computed_size();

        let children = hierarchy.children(node);
        let snapshot = ChildSnapshot::capture(hierarchy, children);
        self.children.insert(node, children.to_vec());

        let state = self.states.entry(node).or_default();
        state.in_flight = true;
        self.tokens.insert(node, token.clone());

        trace!(node:% = node, children = snapshot.len(); "Opened layout frame");
        Some(Frame {
            node,
            snapshot,
            next: 0,
            solver: LayoutSolver::new(config),
            previous,
            pending: None,
        })
    }

    /// Clears the in-flight flag and returns whether a follow-up is owed.
    fn release(&mut self, node: NodeId) -> bool {
        self.tokens.remove(&node);
        match self.states.get_mut(&node) {
            Some(state) => {
                state.in_flight = false;
                std::mem::take(&mut state.dirty)
            }
            None => false,
        }
    }

    fn step<H>(&mut self, hierarchy: &mut H, pass: &mut Pass) -> Step
    where
        H: Hierarchy + ?Sized,
    {
        pass.report.record_step();

        let Some(frame) = pass.frames.last_mut() else {
            return Step::Done;
        };
        let node = frame.node;

        if !hierarchy.contains(node) {
            pass.frames.pop();
            self.release(node);
            debug!(pass:% = pass.report.id(), node:% = node; "Layout node destroyed mid-pass");

            return match pass.frames.last_mut() {
                Some(parent) => {
                    parent.pending = None;
                    Step::Continue
                }
                None => {
                    pass.report.set_outcome(PassOutcome::Aborted);
                    Step::Done
                }
            };
        }

        if frame.next >= frame.snapshot.len() || pass.token.is_cancelled() {
            let size = self.finalize(hierarchy, pass);

            return match pass.frames.last_mut() {
                Some(parent) => {
                    if let Some(entry) = parent.pending.take() {
                        place_child(hierarchy, parent, &entry, size);
                    }
                    Step::Continue
                }
                None => {
                    if pass.token.is_cancelled() {
                        pass.report.set_outcome(PassOutcome::Cancelled);
                    }
                    pass.report.set_root_size(size);
                    Step::Done
                }
            };
        }

        let entry = frame.snapshot.entries()[frame.next];
        frame.next += 1;
        let child = entry.handle();

        if !entry.participates() || !hierarchy.contains(child) {
            trace!(node:% = node, child:% = child; "Skipped non-participating child");
            return Step::Continue;
        }

        if let Some(layout) = hierarchy.layout(child) {
            let depth = pass.frames.len();
            if depth >= self.config.max_depth() || pass.frames.iter().any(|f| f.node == child) {
                warn!(node:% = node, child:% = child, depth; "Skipped layout node forming a cycle");
                return Step::Continue;
            }

            if self.is_in_flight(child) {
                let size = layout.computed_size();
                let root = pass.report.root();
                if let Some(state) = self.states.get_mut(&root) {
                    state.dirty = true;
                }
                debug!(node:% = node, child:% = child; "Nested layout node busy in another pass");
                if let Some(frame) = pass.frames.last_mut() {
                    place_child(hierarchy, frame, &entry, size);
                }
                return Step::Continue;
            }

            if let Some(nested) = self.open_frame(&*hierarchy, child, &pass.token) {
                if let Some(frame) = pass.frames.last_mut() {
                    frame.pending = Some(entry);
                }
                pass.frames.push(nested);
            }
            return Step::Continue;
        }

        let axis = frame.solver.axis();
        if axis.is_stacking() {
            hierarchy.fit_content(child, axis);
        }
        let size = hierarchy.size(child).unwrap_or(entry.size());
        if let Some(frame) = pass.frames.last_mut() {
            place_child(hierarchy, frame, &entry, size);
        }
        Step::Continue
    }

    /// Pops the top frame, publishes its results and runs its hooks.
    fn finalize<H>(&mut self, hierarchy: &mut H, pass: &mut Pass) -> Size
    where
        H: Hierarchy + ?Sized,
    {
        let Some(frame) = pass.frames.pop() else {
            return Size::default();
        };
        let node = frame.node;
        let cancelled = pass.token.is_cancelled();

        let solution = frame.solver.finish(frame.previous);
        let placed = solution.placements().len();
        let (size, placements) = solution.into_parts();

        if let Some(layout) = hierarchy.layout_mut(node) {
            layout.publish(size, placements);
        }
        hierarchy.set_size(node, size);
        pass.report.record_node(node);
        debug!(
            pass:% = pass.report.id(),
            node:% = node,
            size:? = size,
            placed,
            cancelled;
            "Finalized layout node"
        );

        let event = LayoutEvent::new(pass.report.id(), node, size, placed, cancelled);
        let mut ctx = HookContext::new(node);
        self.hooks.invoke(&event, &mut ctx);

        let dirty = self.release(node);

        // The node and every ancestor still open in this pass are mid-layout.
        for request in ctx.into_requests() {
            if request == node || pass.frames.iter().any(|frame| frame.node == request) {
                error!(
                    node:% = node,
                    request:% = request,
                    reason:% = RejectReason::Reentrant;
                    "Post-layout hook requested a pass on a node being laid out"
                );
                pass.report.record_rejection();
                continue;
            }
            self.request_pass(&*hierarchy, request);
        }

        if dirty {
            debug!(node:% = node; "Scheduling follow-up pass for dirty node");
            self.request_pass(&*hierarchy, node);
        }

        size
    }
}

fn place_child<H>(hierarchy: &mut H, frame: &mut Frame, entry: &ChildEntry, size: Size)
where
    H: Hierarchy + ?Sized,
{
    let position = frame.solver.place(entry, size);
    if frame.solver.axis().is_stacking() {
        hierarchy.set_position(entry.handle(), position);
    }
    trace!(
        node:% = frame.node,
        child:% = entry.handle(),
        position:? = position,
        size:? = size,
        is_last = entry.is_last();
        "Placed child"
    );
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use float_cmp::assert_approx_eq;
    use trellis_core::geometry::{Axis, Point};

    use super::*;
    use crate::node::LayoutNode;

    #[derive(Debug)]
    struct TestNode {
        alive: bool,
        children: Vec<NodeId>,
        participates: bool,
        size: Size,
        position: Point,
        layout: Option<LayoutNode>,
    }

    /// Flat arena used to drive the coordinator without a full scene.
    #[derive(Debug, Default)]
    struct TestTree {
        nodes: Vec<TestNode>,
    }

    impl TestTree {
        fn add(&mut self, parent: Option<NodeId>, size: Size, layout: Option<LayoutConfig>) -> NodeId {
            let id = NodeId::new(self.nodes.len() as u32, 0);
            self.nodes.push(TestNode {
                alive: true,
                children: Vec::new(),
                participates: true,
                size,
                position: Point::new(3.0, 3.0),
                layout: layout.map(|config| LayoutNode::new(config, size)),
            });
            if let Some(parent) = parent {
                self.nodes[parent.index()].children.push(id);
            }
            id
        }

        fn leaf(&mut self, parent: NodeId, height: f32) -> NodeId {
            self.add(Some(parent), Size::new(50.0, height), None)
        }

        fn container(&mut self, parent: Option<NodeId>, config: LayoutConfig) -> NodeId {
            self.add(parent, Size::new(100.0, 0.0), Some(config))
        }

        fn destroy(&mut self, node: NodeId) {
            self.nodes[node.index()].alive = false;
        }

        fn computed(&self, node: NodeId) -> Size {
            self.layout(node).map(LayoutNode::computed_size).unwrap_or_default()
        }

        fn get(&self, node: NodeId) -> Option<&TestNode> {
            self.nodes.get(node.index()).filter(|n| n.alive)
        }

        fn get_mut(&mut self, node: NodeId) -> Option<&mut TestNode> {
            self.nodes.get_mut(node.index()).filter(|n| n.alive)
        }
    }

    impl Hierarchy for TestTree {
        fn contains(&self, node: NodeId) -> bool {
            self.get(node).is_some()
        }

        fn children(&self, node: NodeId) -> &[NodeId] {
            self.get(node)
                .map(|n| n.children.as_slice())
                .unwrap_or_default()
        }

        fn participates(&self, node: NodeId) -> bool {
            self.get(node).is_some_and(|n| n.participates)
        }

        fn size(&self, node: NodeId) -> Option<Size> {
            self.get(node).map(|n| n.size)
        }

        fn position(&self, node: NodeId) -> Option<Point> {
            self.get(node).map(|n| n.position)
        }

        fn set_position(&mut self, node: NodeId, position: Point) {
            if let Some(n) = self.get_mut(node) {
                n.position = position;
            }
        }

        fn set_size(&mut self, node: NodeId, size: Size) {
            if let Some(n) = self.get_mut(node) {
                n.size = size;
            }
        }

        fn layout(&self, node: NodeId) -> Option<&LayoutNode> {
            self.get(node).and_then(|n| n.layout.as_ref())
        }

        fn layout_mut(&mut self, node: NodeId) -> Option<&mut LayoutNode> {
            self.get_mut(node).and_then(|n| n.layout.as_mut())
        }
    }

    fn vertical(spacing: f32) -> LayoutConfig {
        LayoutConfig::new(Axis::Vertical).with_spacing(spacing)
    }

    #[test]
    fn test_single_pass_positions_children() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(5.0));
        let a = tree.leaf(root, 20.0);
        let b = tree.leaf(root, 30.0);
        let c = tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::default();
        let report = coordinator.layout_now(&mut tree, root).unwrap();

        assert_eq!(report.outcome(), PassOutcome::Completed);
        assert_eq!(report.nodes_laid_out(), &[root]);
        assert_eq!(report.root_size(), Some(Size::new(100.0, 70.0)));

        assert_eq!(tree.position(a), Some(Point::new(3.0, 0.0)));
        assert_eq!(tree.position(b), Some(Point::new(3.0, 25.0)));
        assert_eq!(tree.position(c), Some(Point::new(3.0, 60.0)));
        assert_eq!(tree.size(root), Some(Size::new(100.0, 70.0)));
        assert!(!coordinator.is_in_flight(root));
    }

    #[test]
    fn test_inactive_child_is_skipped() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(5.0));
        tree.leaf(root, 20.0);
        let hidden = tree.leaf(root, 30.0);
        let last = tree.leaf(root, 10.0);
        tree.nodes[hidden.index()].participates = false;

        let mut coordinator = UpdateCoordinator::default();
        coordinator.layout_now(&mut tree, root);

        assert_approx_eq!(f32, tree.computed(root).height(), 35.0);
        assert_eq!(tree.position(hidden), Some(Point::new(3.0, 3.0)));
        let placements = tree.layout(root).unwrap().placements();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].node(), last);
        assert!(placements[1].is_last());
    }

    #[test]
    fn test_requests_are_rejected_for_unknown_and_plain_nodes() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        let leaf = tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::default();
        assert!(matches!(
            coordinator.request_pass(&tree, leaf),
            RequestOutcome::Rejected(RejectReason::NotALayoutNode)
        ));
        assert!(matches!(
            coordinator.request_pass(&tree, NodeId::new(42, 0)),
            RequestOutcome::Rejected(RejectReason::UnknownNode)
        ));
        assert!(coordinator.is_idle());
    }

    #[test]
    fn test_requests_while_in_flight_coalesce_into_one_follow_up() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::default();
        let ticket = coordinator
            .request_pass(&tree, root)
            .ticket()
            .cloned()
            .unwrap();
        assert!(coordinator.is_in_flight(root));

        assert!(matches!(coordinator.request_pass(&tree, root), RequestOutcome::Coalesced));
        assert!(matches!(coordinator.request_pass(&tree, root), RequestOutcome::Coalesced));
        assert!(coordinator.is_dirty(root));

        let reports = coordinator.run_until_idle(&mut tree);

        assert_eq!(reports.len(), 2);
        assert!(ticket.is_complete());
        assert!(!coordinator.is_in_flight(root));
        assert!(!coordinator.is_dirty(root));
    }

    #[test]
    fn test_nested_nodes_are_laid_out_children_first() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(5.0));
        let header = tree.leaf(root, 10.0);
        let list = tree.container(Some(root), vertical(2.0));
        tree.leaf(list, 20.0);
        tree.leaf(list, 20.0);
        let footer = tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::default();
        let report = coordinator.layout_now(&mut tree, root).unwrap();

        assert_eq!(report.nodes_laid_out(), &[list, root]);
        assert_approx_eq!(f32, tree.computed(list).height(), 42.0);
        assert_eq!(tree.position(header), Some(Point::new(3.0, 0.0)));
        assert_eq!(tree.position(list), Some(Point::new(3.0, 15.0)));
        assert_eq!(tree.position(footer), Some(Point::new(3.0, 62.0)));
        assert_approx_eq!(f32, tree.computed(root).height(), 72.0);
        assert!(!coordinator.is_in_flight(list));
    }

    #[test]
    fn test_steps_per_tick_suspends_pass() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        for _ in 0..4 {
            tree.leaf(root, 10.0);
        }

        let mut coordinator = UpdateCoordinator::new(EngineConfig::new(2, 64));
        let ticket = coordinator
            .request_pass(&tree, root)
            .ticket()
            .cloned()
            .unwrap();

        assert!(coordinator.tick(&mut tree).is_empty());
        assert!(!ticket.is_complete());
        assert!(coordinator.is_in_flight(root));

        coordinator.run_until_idle(&mut tree);
        let report = ticket.report().unwrap();
        assert_eq!(report.steps(), 5);
        assert_approx_eq!(f32, tree.computed(root).height(), 40.0);
    }

    #[test]
    fn test_cancelled_pass_applies_partial_results() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        let first = tree.leaf(root, 10.0);
        tree.leaf(root, 10.0);
        let third = tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::new(EngineConfig::new(1, 64));
        let ticket = coordinator
            .request_pass(&tree, root)
            .ticket()
            .cloned()
            .unwrap();

        coordinator.tick(&mut tree);
        assert!(coordinator.cancel_pass(root));
        coordinator.run_until_idle(&mut tree);

        let report = ticket.report().unwrap();
        assert_eq!(report.outcome(), PassOutcome::Cancelled);
        assert_eq!(tree.position(first), Some(Point::new(3.0, 0.0)));
        assert_eq!(tree.position(third), Some(Point::new(3.0, 3.0)));
        assert_approx_eq!(f32, tree.computed(root).height(), 10.0);
        assert!(!coordinator.is_in_flight(root));
        assert!(!coordinator.cancel_pass(root));
    }

    #[test]
    fn test_destroyed_child_is_skipped() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(5.0));
        tree.leaf(root, 10.0);
        let doomed = tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::new(EngineConfig::new(1, 64));
        coordinator.request_pass(&tree, root);
        coordinator.tick(&mut tree);
        tree.destroy(doomed);
        coordinator.run_until_idle(&mut tree);

        assert_approx_eq!(f32, tree.computed(root).height(), 15.0);
    }

    #[test]
    fn test_destroyed_root_aborts_pass() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        tree.leaf(root, 10.0);
        tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::new(EngineConfig::new(1, 64));
        let ticket = coordinator
            .request_pass(&tree, root)
            .ticket()
            .cloned()
            .unwrap();
        coordinator.tick(&mut tree);

        tree.destroy(root);
        coordinator.on_node_destroyed(root);
        coordinator.run_until_idle(&mut tree);

        let report = ticket.report().unwrap();
        assert_eq!(report.outcome(), PassOutcome::Aborted);
        assert_eq!(report.root_size(), None);
        assert!(report.nodes_laid_out().is_empty());
        assert!(!coordinator.is_in_flight(root));
    }

    #[test]
    fn test_destroyed_nested_node_is_dropped() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        let nested = tree.container(Some(root), vertical(0.0));
        tree.leaf(nested, 10.0);
        tree.leaf(nested, 10.0);
        tree.leaf(root, 7.0);

        let mut coordinator = UpdateCoordinator::new(EngineConfig::new(1, 64));
        coordinator.request_pass(&tree, root);
        coordinator.tick(&mut tree);
        coordinator.tick(&mut tree);
        assert!(coordinator.is_in_flight(nested));

        tree.destroy(nested);
        let reports = coordinator.run_until_idle(&mut tree);

        assert_eq!(reports[0].outcome(), PassOutcome::Completed);
        assert_eq!(reports[0].nodes_laid_out(), &[root]);
        assert_approx_eq!(f32, tree.computed(root).height(), 7.0);
    }

    #[test]
    fn test_hooks_run_after_publish_and_before_release() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        tree.leaf(root, 12.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = UpdateCoordinator::default();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            coordinator
                .hooks_mut()
                .register(root, move |event: &LayoutEvent, _: &mut HookContext| {
                    seen.borrow_mut().push((tag, event.size().height(), event.placed()));
                });
        }

        coordinator.layout_now(&mut tree, root);

        assert_eq!(*seen.borrow(), vec![("first", 12.0, 1), ("second", 12.0, 1)]);
    }

    #[test]
    fn test_reentrant_hook_request_is_rejected() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        tree.leaf(root, 12.0);

        let mut coordinator = UpdateCoordinator::default();
        coordinator
            .hooks_mut()
            .register(root, |event: &LayoutEvent, ctx: &mut HookContext| {
                ctx.request_pass(event.node());
            });

        let reports = coordinator.run_until_idle(&mut tree);
        assert!(reports.is_empty());

        let report = coordinator.layout_now(&mut tree, root).unwrap();
        assert_eq!(report.rejected_requests(), 1);
        assert!(coordinator.is_idle());
    }

    #[test]
    fn test_hook_may_request_pass_on_other_node() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        tree.leaf(root, 12.0);
        let other = tree.container(None, vertical(0.0));
        tree.leaf(other, 8.0);

        let mut coordinator = UpdateCoordinator::default();
        coordinator
            .hooks_mut()
            .register(root, move |_: &LayoutEvent, ctx: &mut HookContext| {
                ctx.request_pass(other);
            });

        coordinator.request_pass(&tree, root);
        let reports = coordinator.run_until_idle(&mut tree);

        let roots: Vec<NodeId> = reports.iter().map(PassReport::root).collect();
        assert_eq!(roots, vec![root, other]);
        assert_approx_eq!(f32, tree.computed(other).height(), 8.0);
    }

    #[test]
    fn test_hook_request_for_enclosing_node_is_rejected() {
        let mut tree = TestTree::default();
        let parent = tree.container(None, vertical(0.0));
        let child = tree.container(Some(parent), vertical(0.0));
        tree.leaf(child, 12.0);

        let mut coordinator = UpdateCoordinator::new(EngineConfig::new(1, 64));
        coordinator
            .hooks_mut()
            .register(child, move |_: &LayoutEvent, ctx: &mut HookContext| {
                ctx.request_pass(parent);
            });

        coordinator.request_pass(&tree, parent);
        let mut reports = Vec::new();
        for _ in 0..100 {
            if coordinator.is_idle() {
                break;
            }
            reports.extend(coordinator.tick(&mut tree));
        }

        assert!(coordinator.is_idle(), "passes should settle");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].nodes_laid_out(), &[child, parent]);
        assert_eq!(reports[0].rejected_requests(), 1);
        assert!(!coordinator.is_dirty(parent));
        assert_approx_eq!(f32, tree.computed(parent).height(), 12.0);
    }

    #[test]
    fn test_nested_leaf_edit_propagates_in_one_request() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(5.0));
        tree.leaf(root, 10.0);
        let list = tree.container(Some(root), vertical(0.0));
        let item = tree.leaf(list, 20.0);

        let mut coordinator = UpdateCoordinator::default();
        coordinator.layout_now(&mut tree, root);
        assert_approx_eq!(f32, tree.computed(list).height(), 20.0);
        assert_approx_eq!(f32, tree.computed(root).height(), 35.0);

        tree.set_size(item, Size::new(50.0, 45.0));
        let report = coordinator.layout_now(&mut tree, root).unwrap();

        assert_eq!(report.nodes_laid_out(), &[list, root]);
        assert_approx_eq!(f32, tree.computed(list).height(), 45.0);
        assert_approx_eq!(f32, tree.computed(root).height(), 60.0);
        assert!(coordinator.is_idle());
    }

    #[test]
    fn test_configure_applies_to_next_pass() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        tree.leaf(root, 10.0);
        tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::default();
        coordinator.request_pass(&tree, root);

        let outcome = coordinator.configure(&mut tree, root, vertical(10.0)).unwrap();
        assert!(matches!(outcome, RequestOutcome::Coalesced));

        let reports = coordinator.run_until_idle(&mut tree);
        assert_eq!(reports.len(), 2);
        assert_approx_eq!(f32, tree.computed(root).height(), 30.0);

        let leaf = tree.children(root)[0];
        assert_eq!(
            coordinator
                .configure(&mut tree, leaf, vertical(0.0))
                .unwrap_err(),
            LayoutError::NotALayoutNode(leaf)
        );
        assert_eq!(
            coordinator
                .configure(&mut tree, NodeId::new(99, 0), vertical(0.0))
                .unwrap_err(),
            LayoutError::UnknownNode(NodeId::new(99, 0))
        );
    }

    #[test]
    fn test_nested_node_busy_in_other_pass_marks_root_dirty() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        let nested = tree.container(Some(root), vertical(0.0));
        tree.leaf(nested, 10.0);

        let mut coordinator = UpdateCoordinator::default();
        coordinator.request_pass(&tree, root);
        coordinator.request_pass(&tree, nested);

        let reports = coordinator.run_until_idle(&mut tree);

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].nodes_laid_out(), &[root]);
        assert_eq!(reports[2].nodes_laid_out(), &[nested, root]);
        assert_approx_eq!(f32, tree.computed(root).height(), 10.0);
    }

    #[test]
    fn test_cycle_is_skipped() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        let nested = tree.container(Some(root), vertical(0.0));
        tree.leaf(nested, 10.0);
        tree.nodes[nested.index()].children.push(root);

        let mut coordinator = UpdateCoordinator::default();
        let report = coordinator.layout_now(&mut tree, root).unwrap();

        assert_eq!(report.outcome(), PassOutcome::Completed);
        assert_eq!(report.nodes_laid_out(), &[nested, root]);
        assert_approx_eq!(f32, tree.computed(nested).height(), 10.0);
    }

    #[test]
    fn test_on_hierarchy_changed_picks_up_new_children() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(0.0));
        tree.leaf(root, 10.0);

        let mut coordinator = UpdateCoordinator::default();
        coordinator.layout_now(&mut tree, root);
        assert_approx_eq!(f32, tree.computed(root).height(), 10.0);

        tree.leaf(root, 15.0);
        assert!(coordinator.on_hierarchy_changed(&tree, root).is_scheduled());
        coordinator.run_until_idle(&mut tree);
        assert_approx_eq!(f32, tree.computed(root).height(), 25.0);
    }

    #[test]
    fn test_repeated_passes_are_idempotent() {
        let mut tree = TestTree::default();
        let root = tree.container(None, vertical(4.0));
        let nested = tree.container(Some(root), vertical(1.0));
        tree.leaf(nested, 5.0);
        tree.leaf(root, 9.0);

        let mut coordinator = UpdateCoordinator::default();
        coordinator.layout_now(&mut tree, root);
        let first: Vec<(Option<Point>, Option<Size>)> = (0..tree.nodes.len())
            .map(|i| NodeId::new(i as u32, 0))
            .map(|id| (tree.position(id), tree.size(id)))
            .collect();

        coordinator.layout_now(&mut tree, root);
        let second: Vec<(Option<Point>, Option<Size>)> = (0..tree.nodes.len())
            .map(|i| NodeId::new(i as u32, 0))
            .map(|id| (tree.position(id), tree.size(id)))
            .collect();

        assert_eq!(first, second);
    }
}
