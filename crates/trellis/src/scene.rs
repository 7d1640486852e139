//! In-memory element tree implementing [`Hierarchy`].
//!
//! A [`Scene`] is a generational arena of [`Element`]s. Elements are boxes
//! with a position relative to their parent, a size, and optional layout,
//! text and fill attributes. It is the host tree used by scene documents,
//! the SVG exporter and the command-line front end.

use log::trace;
use thiserror::Error;

use trellis_core::{
    color::Color,
    geometry::{Axis, Point, Size},
    identifier::Id,
    text::{self, TextStyle},
};

use crate::{
    hierarchy::{Hierarchy, NodeId},
    node::{LayoutConfig, LayoutNode},
};

/// Errors raised by scene edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("element {0} does not exist")]
    UnknownNode(NodeId),

    #[error("element {0} has no text")]
    NoText(NodeId),
}

/// Text shown by a leaf element.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    content: String,
    style: TextStyle,
}

impl Text {
    pub fn new(content: impl Into<String>, style: TextStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }
}

/// A box in the scene.
///
/// # Examples
///
/// ```
/// # use trellis::scene::Element;
/// # use trellis::node::LayoutConfig;
/// # use trellis_core::geometry::{Axis, Size};
/// let menu = Element::new("menu", Size::new(200.0, 0.0))
///     .with_layout(LayoutConfig::new(Axis::Vertical).with_spacing(4.0));
/// assert!(menu.layout().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Element {
    name: Id,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    active: bool,
    ignore_layout: bool,
    position: Point,
    size: Size,
    layout: Option<LayoutNode>,
    text: Option<Text>,
    fill: Option<Color>,
    corner_radius: Option<f32>,
}

impl Element {
    pub fn new(name: impl Into<Id>, size: Size) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            active: true,
            ignore_layout: false,
            position: Point::default(),
            size,
            layout: None,
            text: None,
            fill: None,
            corner_radius: None,
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Turn the element into a layout container. The current size seeds
    /// the container's computed size.
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = Some(LayoutNode::new(config, self.size));
        self
    }

    pub fn with_text(mut self, text: Text) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_ignore_layout(mut self, ignore_layout: bool) -> Self {
        self.ignore_layout = ignore_layout;
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The element's own active flag; see [`Scene::is_active_in_hierarchy`].
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ignore_layout(&self) -> bool {
        self.ignore_layout
    }

    /// Position of the top-left corner relative to the parent
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn layout(&self) -> Option<&LayoutNode> {
        self.layout.as_ref()
    }

    pub fn text(&self) -> Option<&Text> {
        self.text.as_ref()
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn corner_radius(&self) -> Option<f32> {
        self.corner_radius
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Generational arena of elements.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level element.
    pub fn add_root(&mut self, element: Element) -> NodeId {
        let id = self.insert(element, None);
        self.roots.push(id);
        id
    }

    /// Append `element` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `parent` does not exist.
    pub fn add_child(&mut self, parent: NodeId, element: Element) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = self.insert(element, Some(parent));
        if let Some(parent) = self.element_mut(parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Destroy `node` and its whole subtree.
    ///
    /// Returns the destroyed handles, `node` first. Their slots are reused
    /// with a new generation, so the returned handles never resolve again.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn remove(&mut self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let element = self.get(node).ok_or(SceneError::UnknownNode(node))?;
        let parent = element.parent;

        match parent.and_then(|parent| self.element_mut(parent)) {
            Some(parent) => parent.children.retain(|child| *child != node),
            None => self.roots.retain(|root| *root != node),
        }

        let removed = self.descendants(node);
        for id in &removed {
            if let Some(slot) = self.slots.get_mut(id.index()) {
                slot.element = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index() as u32);
            }
        }
        trace!(node:% = node, removed = removed.len(); "Removed scene subtree");
        Ok(removed)
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.slots
            .get(node.index())
            .filter(|slot| slot.generation == node.generation())
            .and_then(|slot| slot.element.as_ref())
    }

    /// Top-level elements in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.element.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First element named `name` in pre-order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, element)| element.name == name)
            .map(|(id, _)| id)
    }

    /// `node` followed by all its descendants, in pre-order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(element) = self.get(current) else {
                continue;
            };
            order.push(current);
            stack.extend(element.children.iter().rev());
        }
        order
    }

    /// Every element in pre-order, roots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Element)> + '_ {
        self.roots
            .iter()
            .flat_map(|root| self.descendants(*root))
            .filter_map(|id| self.get(id).map(|element| (id, element)))
    }

    /// Whether `node` and all of its ancestors are active.
    pub fn is_active_in_hierarchy(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.get(id) {
                Some(element) if element.active => current = element.parent,
                _ => return false,
            }
        }
        true
    }

    /// Position of `node` relative to the scene origin.
    pub fn absolute_position(&self, node: NodeId) -> Option<Point> {
        let mut element = self.get(node)?;
        let mut position = element.position;
        while let Some(parent) = element.parent {
            element = self.get(parent)?;
            position = position.add_point(element.position);
        }
        Some(position)
    }

    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), SceneError> {
        self.try_element_mut(node)?.active = active;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn set_ignore_layout(&mut self, node: NodeId, ignore_layout: bool) -> Result<(), SceneError> {
        self.try_element_mut(node)?.ignore_layout = ignore_layout;
        Ok(())
    }

    /// Replace the text content of a text element.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist and
    /// [`SceneError::NoText`] if it does not display text.
    pub fn set_text(&mut self, node: NodeId, content: &str) -> Result<(), SceneError> {
        let text = self
            .try_element_mut(node)?
            .text
            .as_mut()
            .ok_or(SceneError::NoText(node))?;
        text.content = content.to_string();
        Ok(())
    }

    /// Turn an existing element into a layout container.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn attach_layout(&mut self, node: NodeId, config: LayoutConfig) -> Result<(), SceneError> {
        let element = self.try_element_mut(node)?;
        element.layout = Some(LayoutNode::new(config, element.size));
        Ok(())
    }

    fn insert(&mut self, mut element: Element, parent: Option<NodeId>) -> NodeId {
        element.parent = parent;
        element.children.clear();

        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.element = Some(element);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    element: Some(element),
                });
                NodeId::new(index, 0)
            }
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(node.index())
            .filter(|slot| slot.generation == node.generation())
            .and_then(|slot| slot.element.as_mut())
    }

    fn try_element_mut(&mut self, node: NodeId) -> Result<&mut Element, SceneError> {
        self.element_mut(node).ok_or(SceneError::UnknownNode(node))
    }
}

impl Hierarchy for Scene {
    fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    fn participates(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|element| !element.ignore_layout)
            && self.is_active_in_hierarchy(node)
    }

    fn size(&self, node: NodeId) -> Option<Size> {
        self.get(node).map(Element::size)
    }

    fn position(&self, node: NodeId) -> Option<Point> {
        self.get(node).map(Element::position)
    }

    fn set_position(&mut self, node: NodeId, position: Point) {
        if let Some(element) = self.element_mut(node) {
            element.position = position;
        }
    }

    fn set_size(&mut self, node: NodeId, size: Size) {
        if let Some(element) = self.element_mut(node) {
            element.size = size;
        }
    }

    /// Text leaves grow or shrink along `axis` to the measured text extent.
    fn fit_content(&mut self, node: NodeId, axis: Axis) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        if element.layout.is_some() {
            return;
        }
        if let Some(label) = &element.text {
            let measured = text::measure(&label.content, &label.style);
            element.size = element.size.with_along(axis, measured.along(axis));
        }
    }

    fn layout(&self, node: NodeId) -> Option<&LayoutNode> {
        self.get(node).and_then(Element::layout)
    }

    fn layout_mut(&mut self, node: NodeId) -> Option<&mut LayoutNode> {
        self.element_mut(node).and_then(|element| element.layout.as_mut())
    }
}
