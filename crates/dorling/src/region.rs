use crate::data::DataRow;
use crate::error::Result;
use crate::transition::Mode;
use dorling_geo::{Point, PreparedRegion};
use dorling_morph::{
    MorphOptions, Shape, ShapeMorph, StyleDict, StyleMorph, approximate_circle,
    circle_point_count, exact_circle_path,
};

/// A region in a settled layout: where its circle sits, what it looks like in both states and
/// how to morph between them.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    pub index: usize,
    pub centroid: Point,
    pub position: Point,
    /// Layout radius (after the viewport fit, when enabled).
    pub radius: f64,
    /// Drawn radius, `radius` minus the circle padding.
    pub rendered_radius: f64,
    pub data: Option<DataRow>,
    pub label: Option<String>,
    pub outline_path: String,
    /// Polygonal circle used as the morph target.
    pub circle_path: String,
    /// Arc form drawn once a transition has settled.
    pub circle_path_exact: String,
    pub map_style: StyleDict,
    pub circle_style: StyleDict,
    outline: Shape,
    circle: Shape,
    to_circle: ShapeMorph,
    style_to_circle: StyleMorph,
    style_to_map: StyleMorph,
}

pub(crate) struct RegionParts<'a> {
    pub prepared: &'a PreparedRegion,
    pub data: Option<&'a DataRow>,
    pub label: Option<String>,
    pub position: Point,
    pub radius: f64,
    pub padding: f64,
    pub circle_points: Option<usize>,
    pub map_style: StyleDict,
    pub circle_style: StyleDict,
}

impl Region {
    pub(crate) fn build(parts: RegionParts<'_>, morph: &MorphOptions) -> Result<Self> {
        let RegionParts {
            prepared,
            data,
            label,
            position,
            radius,
            padding,
            circle_points,
            map_style,
            circle_style,
        } = parts;

        let rendered_radius = (radius - padding.max(0.0)).max(0.0);
        let outline = Shape::with_path(prepared.exteriors(), prepared.outline_path.clone());
        let n = circle_point_count(outline.part_count(), circle_points);
        let circle = Shape::new(
            vec![approximate_circle(position, rendered_radius, n)],
            morph.precision,
        );
        let to_circle = ShapeMorph::between(&outline, &circle, morph)?;

        Ok(Self {
            id: prepared.id.clone(),
            index: prepared.index,
            centroid: prepared.centroid,
            position,
            radius,
            rendered_radius,
            data: data.cloned(),
            label,
            outline_path: prepared.outline_path.clone(),
            circle_path: circle.path.clone(),
            circle_path_exact: exact_circle_path(position, rendered_radius, morph.precision),
            style_to_circle: StyleMorph::between(&map_style, &circle_style),
            style_to_map: StyleMorph::between(&circle_style, &map_style),
            map_style,
            circle_style,
            outline,
            circle,
            to_circle,
        })
    }

    /// Outline path at `t = 0`, approximate circle at `t = 1`.
    pub fn morph_to_circle(&self, t: f64) -> String {
        self.to_circle.path_at(t)
    }

    /// Mirror of [`Region::morph_to_circle`].
    pub fn morph_to_map(&self, t: f64) -> String {
        self.to_circle.path_at(1.0 - t)
    }

    pub fn shape_to_circle(&self) -> &ShapeMorph {
        &self.to_circle
    }

    pub fn style_to_circle(&self) -> &StyleMorph {
        &self.style_to_circle
    }

    pub fn style_to_map(&self) -> &StyleMorph {
        &self.style_to_map
    }

    pub fn outline_shape(&self) -> &Shape {
        &self.outline
    }

    pub fn circle_shape(&self) -> &Shape {
        &self.circle
    }

    /// Path drawn while settled in `mode`.
    pub fn settled_path(&self, mode: Mode) -> &str {
        match mode {
            Mode::Map => &self.outline_path,
            Mode::Circles => &self.circle_path_exact,
        }
    }

    pub fn style(&self, mode: Mode) -> &StyleDict {
        match mode {
            Mode::Map => &self.map_style,
            Mode::Circles => &self.circle_style,
        }
    }

    /// Label position: the circle center in circle mode, the centroid on the map.
    pub fn label_anchor(&self, mode: Mode) -> Point {
        match mode {
            Mode::Map => self.centroid,
            Mode::Circles => self.position,
        }
    }
}
