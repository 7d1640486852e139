//! Pass identities, outcomes and completion tickets.

use std::{cell::RefCell, fmt, rc::Rc};

use trellis_core::geometry::Size;

use crate::hierarchy::NodeId;

/// Identifier of one top-level layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(u64);

impl PassId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass-{}", self.0)
    }
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every reachable child was processed.
    Completed,
    /// The pass was cancelled and finalized with the children processed so far.
    Cancelled,
    /// The root node was destroyed mid-pass; nothing was applied to it.
    Aborted,
}

/// Summary of a finished pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    id: PassId,
    root: NodeId,
    outcome: PassOutcome,
    nodes_laid_out: Vec<NodeId>,
    steps: usize,
    root_size: Option<Size>,
    rejected_requests: usize,
}

impl PassReport {
    pub(crate) fn new(id: PassId, root: NodeId) -> Self {
        Self {
            id,
            root,
            outcome: PassOutcome::Completed,
            nodes_laid_out: Vec::new(),
            steps: 0,
            root_size: None,
            rejected_requests: 0,
        }
    }

    pub fn id(&self) -> PassId {
        self.id
    }

    /// Node the pass was requested on
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn outcome(&self) -> PassOutcome {
        self.outcome
    }

    /// Layout nodes finalized by this pass, children before parents.
    pub fn nodes_laid_out(&self) -> &[NodeId] {
        &self.nodes_laid_out
    }

    /// Number of child boundaries the pass crossed.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Size published for the root, `None` if the pass was aborted.
    pub fn root_size(&self) -> Option<Size> {
        self.root_size
    }

    /// Hook requests rejected as reentrant during this pass.
    pub fn rejected_requests(&self) -> usize {
        self.rejected_requests
    }

    pub(crate) fn set_outcome(&mut self, outcome: PassOutcome) {
        self.outcome = outcome;
    }

    pub(crate) fn record_node(&mut self, node: NodeId) {
        self.nodes_laid_out.push(node);
    }

    pub(crate) fn record_step(&mut self) {
        self.steps += 1;
    }

    pub(crate) fn set_root_size(&mut self, size: Size) {
        self.root_size = Some(size);
    }

    pub(crate) fn record_rejection(&mut self) {
        self.rejected_requests += 1;
    }
}

/// Completion signal of a scheduled pass.
///
/// The ticket is filled in when the pass finishes, whatever its outcome.
#[derive(Debug, Clone)]
pub struct PassTicket {
    id: PassId,
    slot: Rc<RefCell<Option<PassReport>>>,
}

impl PassTicket {
    pub(crate) fn new(id: PassId) -> Self {
        Self {
            id,
            slot: Rc::new(RefCell::new(None)),
        }
    }

    pub fn id(&self) -> PassId {
        self.id
    }

    pub fn is_complete(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Report of the finished pass, `None` while it is still running.
    pub fn report(&self) -> Option<PassReport> {
        self.slot.borrow().clone()
    }

    pub(crate) fn complete(&self, report: PassReport) {
        *self.slot.borrow_mut() = Some(report);
    }
}

/// Why a pass request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The handle does not resolve to a live element.
    UnknownNode,
    /// The element carries no layout configuration.
    NotALayoutNode,
    /// A post-layout hook asked for a pass on the node whose hooks are running.
    Reentrant,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnknownNode => "unknown node",
            Self::NotALayoutNode => "not a layout node",
            Self::Reentrant => "reentrant request from a post-layout hook",
        };
        write!(f, "{reason}")
    }
}

/// Result of [`crate::coordinator::UpdateCoordinator::request_pass`].
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    /// A new pass was created; the ticket completes when it finishes.
    Scheduled(PassTicket),
    /// A pass is already in flight for the node; it was marked dirty and
    /// will run exactly once more afterwards.
    Coalesced,
    Rejected(RejectReason),
}

impl RequestOutcome {
    pub fn ticket(&self) -> Option<&PassTicket> {
        match self {
            Self::Scheduled(ticket) => Some(ticket),
            _ => None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }
}
