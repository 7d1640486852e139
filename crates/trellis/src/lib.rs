//! Trellis - a recursive, incremental stacking layout engine.
//!
//! Containers stack their children vertically or horizontally with padding,
//! spacing and minimum sizes. Passes run children-first through nested
//! containers, can be stepped and cancelled cooperatively, and coalesce
//! repeated requests into a single follow-up pass.
//!
//! The engine reaches the host element tree only through the
//! [`hierarchy::Hierarchy`] trait. [`scene::Scene`] is the bundled host tree
//! used by scene documents and the SVG exporter.

pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod decoration;
pub mod document;
pub mod export;
pub mod hierarchy;
pub mod hooks;
pub mod node;
pub mod pass;
pub mod scene;
pub mod snapshot;
pub mod solver;

mod error;

pub use trellis_core::{color, geometry, identifier, text};

pub use error::TrellisError;

use std::path::Path;

use log::{debug, info, trace};

use config::AppConfig;
use coordinator::UpdateCoordinator;
use decoration::RoundedCorners;
use document::SceneDocument;
use hierarchy::{Hierarchy, NodeId};
use pass::PassReport;
use scene::Scene;

/// Builder for loading, laying out and rendering Trellis scenes.
///
/// # Examples
///
/// ```rust,no_run
/// use trellis::{SceneBuilder, config::AppConfig};
///
/// let source = r#"
/// [root]
/// name = "menu"
/// layout = { axis = "vertical", spacing = 4.0 }
///
/// [[root.children]]
/// size = [120.0, 30.0]
/// "#;
///
/// let builder = SceneBuilder::new(AppConfig::default());
/// let document = builder.parse(source).expect("Failed to parse");
/// let laid_out = builder.layout(&document).expect("Failed to lay out");
/// let svg = builder.render_svg(&laid_out).expect("Failed to render");
/// println!("{svg}");
/// ```
#[derive(Debug, Default)]
pub struct SceneBuilder {
    config: AppConfig,
}

impl SceneBuilder {
    /// Create a new scene builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse a TOML scene document.
    ///
    /// # Errors
    ///
    /// Returns `TrellisError::Document` carrying the source when the
    /// document is malformed.
    pub fn parse(&self, source: &str) -> Result<SceneDocument, TrellisError> {
        info!("Parsing scene document");

        let document = SceneDocument::from_toml(source)
            .map_err(|err| TrellisError::new_document_error(err, source))?;

        debug!("Scene document parsed successfully");
        trace!(document:?; "Parsed scene document");

        Ok(document)
    }

    /// Instantiate `document` and lay it out to completion.
    ///
    /// Every outermost layout node gets its own pass; nested layout nodes
    /// are reached through their ancestors. Layout nodes with a corner
    /// radius get their radius refreshed by a post-layout hook.
    ///
    /// # Errors
    ///
    /// Returns `TrellisError::Document` if the document cannot be built.
    pub fn layout(&self, document: &SceneDocument) -> Result<LaidOutScene, TrellisError> {
        let (mut scene, root) = document
            .build()
            .map_err(|err| TrellisError::new_document_error(err, String::new()))?;
        info!(elements = scene.len(); "Scene built");

        let corners = RoundedCorners::new();
        let mut coordinator = UpdateCoordinator::new(*self.config.engine());

        let mut outermost = Vec::new();
        for (id, element) in scene.iter() {
            if element.layout().is_none() {
                continue;
            }
            let radius = element
                .corner_radius()
                .unwrap_or(self.config.style().corner_radius());
            if radius > 0.0 {
                corners.track(coordinator.hooks_mut(), id, radius);
            }
            if !has_layout_ancestor(&scene, id) {
                outermost.push(id);
            }
        }

        for node in &outermost {
            coordinator.request_pass(&scene, *node);
        }
        let reports = coordinator.run_until_idle(&mut scene);
        info!(passes = reports.len(); "Layout calculated");

        Ok(LaidOutScene {
            scene,
            root,
            corners,
            coordinator,
            reports,
        })
    }

    /// Render a laid-out scene to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns `TrellisError::Export` if the configured style is invalid.
    pub fn render_svg(&self, laid_out: &LaidOutScene) -> Result<String, TrellisError> {
        let exporter = export::svg::Svg::new(self.config.style().clone());
        let doc = exporter.render_scene(&laid_out.scene, &laid_out.corners)?;

        info!("SVG rendered successfully");
        Ok(doc.to_string())
    }

    /// Render a laid-out scene and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns `TrellisError::Export` if the style is invalid or the file
    /// cannot be written.
    pub fn write_svg(&self, laid_out: &LaidOutScene, path: impl AsRef<Path>) -> Result<(), TrellisError> {
        let exporter = export::svg::Svg::new(self.config.style().clone());
        let doc = exporter.render_scene(&laid_out.scene, &laid_out.corners)?;
        exporter.write_document(&doc, path.as_ref())?;

        info!(path = path.as_ref().display().to_string(); "SVG written successfully");
        Ok(())
    }
}

fn has_layout_ancestor(scene: &Scene, node: NodeId) -> bool {
    let mut parent = scene.get(node).and_then(|element| element.parent());
    while let Some(id) = parent {
        if scene.layout(id).is_some() {
            return true;
        }
        parent = scene.get(id).and_then(|element| element.parent());
    }
    false
}

/// A scene after its initial layout, ready for further edits.
#[derive(Debug)]
pub struct LaidOutScene {
    scene: Scene,
    root: NodeId,
    corners: RoundedCorners,
    coordinator: UpdateCoordinator,
    reports: Vec<PassReport>,
}

impl LaidOutScene {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn corners(&self) -> &RoundedCorners {
        &self.corners
    }

    /// Reports of the passes run by the initial layout
    pub fn reports(&self) -> &[PassReport] {
        &self.reports
    }

    /// Scene and coordinator, for edits followed by new passes.
    pub fn parts_mut(&mut self) -> (&mut Scene, &mut UpdateCoordinator) {
        (&mut self.scene, &mut self.coordinator)
    }
}
