use crate::error::Result;
use dorling_geo::path::DEFAULT_PRECISION;
use dorling_geo::{Projection, Size, size};
use dorling_layout::SimulationOptions;
use dorling_morph::MorphOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a region's label text is derived. Labels never affect layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelBy {
    #[default]
    None,
    /// The region id.
    Id,
    /// A data or property field, rendered as text.
    Field(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CartogramOptions {
    /// Canvas `[width, height]`.
    pub size: [f64; 2],
    pub projection: Projection,
    /// Rescale the settled circles to fill the canvas.
    pub zoom_to_fit: bool,
    /// Subtracted from each radius when drawing; the layout still uses the full radius.
    pub circle_padding: f64,
    /// Vertex count of the morphable circle polygon. Defaults to `max(20, 2 * parts)`.
    pub circle_points: Option<usize>,
    /// Outline edges longer than this are bisected before morphing.
    pub max_segment_length: Option<f64>,
    pub path_precision: u8,
    pub label: LabelBy,
    pub simulation: SimulationOptions,
}

impl Default for CartogramOptions {
    fn default() -> Self {
        Self {
            size: [500.0, 500.0],
            projection: Projection::default(),
            zoom_to_fit: true,
            circle_padding: 0.0,
            circle_points: None,
            max_segment_length: MorphOptions::default().max_segment_length,
            path_precision: DEFAULT_PRECISION,
            label: LabelBy::None,
            simulation: SimulationOptions::default(),
        }
    }
}

impl CartogramOptions {
    /// Options from a host-supplied JSON object. Missing keys take their defaults.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn canvas(&self) -> Size {
        size(self.size[0], self.size[1])
    }

    pub fn morph(&self) -> MorphOptions {
        MorphOptions {
            max_segment_length: self.max_segment_length,
            precision: self.path_precision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    /// Decelerating `t * (2 - t)`.
    #[default]
    QuadOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadOut => t * (2.0 - t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionOptions {
    /// Seconds. Zero (or less) settles immediately without frames.
    pub duration: f64,
    pub easing: Easing,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            duration: 1.0,
            easing: Easing::QuadOut,
        }
    }
}
