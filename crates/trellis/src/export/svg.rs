//! SVG rendering of a laid-out [`Scene`].
//!
//! Every element active in the hierarchy is drawn as a rectangle at its
//! absolute position, with text centered inside it. Containers are drawn
//! before their children so nested boxes stay visible.

use std::{fs::File, io::Write, path::Path};

use log::{debug, error, info};
use svg::{
    Document,
    node::{Text as SvgText, element as svg_element},
};

use trellis_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
};

use crate::{
    config::StyleConfig,
    decoration::{RoundedCorners, clamp_radius},
    export::Error,
    hierarchy::NodeId,
    scene::{Element, Scene},
};

const MARGIN: f32 = 20.0;

/// SVG exporter for scenes.
#[derive(Debug, Clone)]
pub struct Svg {
    style: StyleConfig,
}

impl Svg {
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    /// Render `scene` into an SVG document.
    ///
    /// Layout nodes tracked by `corners` use their refreshed radius; other
    /// elements clamp their own radius, or the style default, to their size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the style carries an invalid color.
    pub fn render_scene(&self, scene: &Scene, corners: &RoundedCorners) -> Result<Document, Error> {
        let fill = self.style.fill_color().map_err(Error::Render)?;
        let stroke = self.style.stroke_color().map_err(Error::Render)?;

        let visible: Vec<(NodeId, &Element, Point)> = scene
            .iter()
            .filter(|(id, _)| scene.is_active_in_hierarchy(*id))
            .filter_map(|(id, element)| {
                scene
                    .absolute_position(id)
                    .map(|position| (id, element, position))
            })
            .collect();

        let content_bounds = visible
            .iter()
            .map(|(_, element, position)| position.to_bounds(element.size()))
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default();
        let content_size = content_bounds.to_size();
        let svg_size = Size::new(
            MARGIN.mul_add(2.0, content_size.width()),
            MARGIN.mul_add(2.0, content_size.height()),
        );
        debug!(width = svg_size.width(), height = svg_size.height(); "Final SVG dimensions");

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", svg_size.width(), svg_size.height()),
            )
            .set("width", svg_size.width())
            .set("height", svg_size.height());

        if let Some(background) = self.style.background_color().map_err(Error::Render)? {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", &background)
                    .set("fill-opacity", background.alpha()),
            );
        }

        let offset = Point::new(
            MARGIN - content_bounds.min_x(),
            MARGIN - content_bounds.min_y(),
        );
        let mut main_group = svg_element::Group::new().set(
            "transform",
            format!("translate({}, {})", offset.x(), offset.y()),
        );

        for (id, element, position) in visible {
            let bounds = position.to_bounds(element.size());
            if element.text().is_none() || element.fill().is_some() {
                let radius = corners.radius(id).unwrap_or_else(|| {
                    clamp_radius(
                        element.corner_radius().unwrap_or(self.style.corner_radius()),
                        bounds.width(),
                        bounds.height(),
                    )
                });
                main_group = main_group.add(self.render_box(
                    bounds,
                    element.fill().unwrap_or(fill),
                    stroke,
                    radius,
                ));
            }
            if let Some(text) = element.text() {
                let center = Point::new(
                    bounds.min_x() + bounds.width() / 2.0,
                    bounds.min_y() + bounds.height() / 2.0,
                );
                main_group = main_group.add(
                    svg_element::Text::new("")
                        .set("x", center.x())
                        .set("y", center.y())
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "central")
                        .set("font-family", text.style().font_family())
                        .set("font-size", text.style().font_size())
                        .add(SvgText::new(text.content())),
                );
            }
        }

        Ok(doc.add(main_group))
    }

    /// Writes an SVG document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or written.
    pub fn write_document(&self, doc: &Document, path: &Path) -> Result<(), Error> {
        let file_name = path.display().to_string();
        info!(file_name; "Creating SVG file");

        let mut file = match File::create(path) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name, err:err; "Failed to create SVG file");
                return Err(Error::Io(err));
            }
        };

        if let Err(err) = write!(file, "{doc}") {
            error!(file_name, err:err; "Failed to write SVG content");
            return Err(Error::Io(err));
        }

        Ok(())
    }

    fn render_box(&self, bounds: Bounds, fill: Color, stroke: Color, radius: f32) -> svg_element::Rectangle {
        svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("stroke", &stroke)
            .set("stroke-opacity", stroke.alpha())
            .set("stroke-width", self.style.stroke_width())
            .set("fill", &fill)
            .set("fill-opacity", fill.alpha())
            .set("rx", radius)
    }
}
