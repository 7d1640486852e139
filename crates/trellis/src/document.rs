//! TOML scene documents.
//!
//! A scene document describes one element tree:
//!
//! ```toml
//! [root]
//! name = "menu"
//! size = [200.0, 0.0]
//! layout = { axis = "vertical", spacing = 5.0, padding = { min = [0.0, 8.0], max = [0.0, 8.0] } }
//!
//! [[root.children]]
//! name = "title"
//! size = [200.0, 0.0]
//! text = "Main Menu"
//! font_size = 18
//!
//! [[root.children]]
//! name = "play"
//! size = [200.0, 32.0]
//! fill = "#3070b0"
//! corner_radius = 6.0
//! ```

use std::ops::Range;

use serde::Deserialize;
use thiserror::Error;

use trellis_core::{
    color::Color,
    geometry::{Point, Size},
    identifier::Id,
    text::TextStyle,
};

use crate::{
    hierarchy::NodeId,
    node::LayoutConfig,
    scene::{Element, Scene, Text},
};

/// Error found while reading or building a scene document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DocumentError {
    message: String,
    span: Option<Range<usize>>,
}

impl DocumentError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte range of the offending input, when known
    pub fn span(&self) -> Option<Range<usize>> {
        self.span.clone()
    }
}

impl From<toml::de::Error> for DocumentError {
    fn from(err: toml::de::Error) -> Self {
        Self {
            message: err.message().to_string(),
            span: err.span(),
        }
    }
}

/// Description of one element and its subtree.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    size: Size,
    #[serde(default)]
    position: Point,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    ignore_layout: bool,
    #[serde(default)]
    layout: Option<LayoutConfig>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    font_size: Option<u16>,
    #[serde(default)]
    font_family: Option<String>,
    #[serde(default)]
    fill: Option<Color>,
    #[serde(default)]
    corner_radius: Option<f32>,
    #[serde(default)]
    children: Vec<ElementSpec>,
}

fn default_active() -> bool {
    true
}

impl ElementSpec {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn children(&self) -> &[ElementSpec] {
        &self.children
    }

    fn to_element(&self, anonymous_idx: usize) -> Element {
        let name = match &self.name {
            Some(name) => Id::new(name),
            None => Id::from_anonymous(anonymous_idx),
        };

        let mut element = Element::new(name, self.size)
            .with_position(self.position)
            .with_active(self.active)
            .with_ignore_layout(self.ignore_layout);

        if let Some(config) = self.layout {
            element = element.with_layout(config);
        }

        if let Some(content) = &self.text {
            let mut style = TextStyle::new();
            if let Some(size) = self.font_size {
                style.set_font_size(size);
            }
            if let Some(family) = &self.font_family {
                style.set_font_family(family);
            }
            element = element.with_text(Text::new(content.as_str(), style));
        }

        if let Some(fill) = self.fill {
            element = element.with_fill(fill);
        }

        if let Some(radius) = self.corner_radius {
            element = element.with_corner_radius(radius);
        }

        element
    }
}

/// A parsed scene document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDocument {
    root: ElementSpec,
}

impl SceneDocument {
    /// Parse a document from TOML source.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] carrying the span of the offending input
    /// when the source is not a valid scene document.
    pub fn from_toml(source: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(source)?)
    }

    pub fn root(&self) -> &ElementSpec {
        &self.root
    }

    /// Instantiate the document as a new [`Scene`].
    ///
    /// Returns the scene together with the handle of the root element.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] if an element cannot be attached to its
    /// parent.
    pub fn build(&self) -> Result<(Scene, NodeId), DocumentError> {
        let mut scene = Scene::new();
        let mut anonymous = 0;

        let root = scene.add_root(self.root.to_element(anonymous));
        anonymous += 1;

        let mut pending: Vec<(NodeId, &ElementSpec)> = self
            .root
            .children
            .iter()
            .rev()
            .map(|child| (root, child))
            .collect();

        while let Some((parent, spec)) = pending.pop() {
            let element = spec.to_element(anonymous);
            anonymous += 1;

            let id = scene
                .add_child(parent, element)
                .map_err(|err| DocumentError::new(err.to_string()))?;
            pending.extend(spec.children.iter().rev().map(|child| (id, child)));
        }

        Ok((scene, root))
    }
}
