//! Point-in-time capture of a container's children.

use trellis_core::geometry::{Point, Size};

use crate::hierarchy::{Hierarchy, NodeId};

/// One child as seen at capture time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildEntry {
    handle: NodeId,
    participates: bool,
    is_last: bool,
    size: Size,
    position: Point,
}

impl ChildEntry {
    pub fn handle(&self) -> NodeId {
        self.handle
    }

    /// Whether the child takes part in positioning and sizing
    pub fn participates(&self) -> bool {
        self.participates
    }

    /// Whether no later entry participates
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    /// Box size at capture time
    pub fn size(&self) -> Size {
        self.size
    }

    /// Position at capture time
    pub fn position(&self) -> Point {
        self.position
    }
}

/// Immutable, ordered view of a node's children.
///
/// A pass works on the snapshot taken when its node's frame opened, so
/// children added or removed mid-pass are picked up by the next pass only.
/// At most one entry has `is_last` set, and only among participating ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildSnapshot {
    entries: Vec<ChildEntry>,
}

impl ChildSnapshot {
    /// Capture `children` from `hierarchy` in the given order.
    ///
    /// Handles that no longer resolve are kept as non-participating entries.
    pub fn capture<H: Hierarchy + ?Sized>(hierarchy: &H, children: &[NodeId]) -> Self {
        Self::from_children(children.iter().map(|&child| {
            let alive = hierarchy.contains(child);
            (
                child,
                alive && hierarchy.participates(child),
                hierarchy.size(child).unwrap_or_default(),
                hierarchy.position(child).unwrap_or_default(),
            )
        }))
    }

    /// Build a snapshot from `(handle, participates, size, position)` tuples.
    pub fn from_children<I>(children: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, bool, Size, Point)>,
    {
        let mut entries: Vec<ChildEntry> = children
            .into_iter()
            .map(|(handle, participates, size, position)| ChildEntry {
                handle,
                participates,
                is_last: false,
                size,
                position,
            })
            .collect();

        if let Some(last) = entries.iter_mut().rev().find(|entry| entry.participates) {
            last.is_last = true;
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[ChildEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ChildEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over participating entries only.
    pub fn participating(&self) -> impl Iterator<Item = &ChildEntry> {
        self.entries.iter().filter(|entry| entry.participates)
    }

    pub fn last_participating(&self) -> Option<&ChildEntry> {
        self.entries.iter().find(|entry| entry.is_last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(index: u32, participates: bool) -> (NodeId, bool, Size, Point) {
        (
            NodeId::new(index, 0),
            participates,
            Size::new(10.0, 10.0),
            Point::default(),
        )
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = ChildSnapshot::from_children(std::iter::empty());
        assert!(snapshot.is_empty());
        assert!(snapshot.last_participating().is_none());
    }

    #[test]
    fn test_last_participating_is_marked() {
        let snapshot =
            ChildSnapshot::from_children([child(1, true), child(2, true), child(3, true)]);

        let last: Vec<bool> = snapshot.entries().iter().map(ChildEntry::is_last).collect();
        assert_eq!(last, vec![false, false, true]);
        assert_eq!(
            snapshot.last_participating().map(ChildEntry::handle),
            Some(NodeId::new(3, 0))
        );
    }

    #[test]
    fn test_trailing_inactive_children_are_never_last() {
        let snapshot =
            ChildSnapshot::from_children([child(1, true), child(2, true), child(3, false)]);

        assert!(snapshot.entries()[1].is_last());
        assert!(!snapshot.entries()[2].is_last());
        assert_eq!(snapshot.participating().count(), 2);
    }

    #[test]
    fn test_no_participants_means_no_last() {
        let snapshot = ChildSnapshot::from_children([child(1, false), child(2, false)]);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.entries().iter().all(|entry| !entry.is_last()));
    }
}
