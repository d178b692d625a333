use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A raw `[x, y]` (or `[longitude, latitude]`) coordinate pair.
pub type Position = [f64; 2];

/// GeoJSON-shaped region geometry. Rings are closed or open; both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Exterior ring followed by optional holes.
    Polygon(Vec<Vec<Position>>),
    /// One polygon (exterior + holes) per part.
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    pub fn part_count(&self) -> usize {
        match self {
            Self::Polygon(_) => 1,
            Self::MultiPolygon(parts) => parts.len(),
        }
    }

    /// Every coordinate of every ring, in storage order.
    pub fn positions(&self) -> Box<dyn Iterator<Item = &Position> + '_> {
        match self {
            Self::Polygon(rings) => Box::new(rings.iter().flatten()),
            Self::MultiPolygon(parts) => Box::new(parts.iter().flatten().flatten()),
        }
    }

    /// Polygons as a list of parts, with `MultiPolygon` parts ordered by descending exterior
    /// ring length. The sort is stable, so equal-length parts keep their input order.
    pub fn sorted_parts(&self) -> Vec<&[Vec<Position>]> {
        match self {
            Self::Polygon(rings) => vec![rings.as_slice()],
            Self::MultiPolygon(parts) => {
                let mut out: Vec<&[Vec<Position>]> = parts.iter().map(Vec::as_slice).collect();
                out.sort_by_key(|rings| std::cmp::Reverse(rings.first().map_or(0, Vec::len)));
                out
            }
        }
    }
}

/// A neighbor hint: either an index into the feature list or a region id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NeighborRef {
    Index(usize),
    Id(String),
}

impl NeighborRef {
    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_u64().map(|i| Self::Index(i as usize)),
            Value::String(s) => Some(Self::Id(s.clone())),
            _ => None,
        }
    }
}

/// One input region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFeature {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub geometry: Geometry,
    /// Explicit neighbor hints. When empty, `properties.neighbors` is consulted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbors: Vec<NeighborRef>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl MapFeature {
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            neighbors: Vec::new(),
            properties: Map::new(),
        }
    }

    pub fn with_neighbors(mut self, neighbors: impl IntoIterator<Item = NeighborRef>) -> Self {
        self.neighbors = neighbors.into_iter().collect();
        self
    }

    pub fn neighbor_refs(&self) -> Vec<NeighborRef> {
        if !self.neighbors.is_empty() {
            return self.neighbors.clone();
        }
        self.properties
            .get("neighbors")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(NeighborRef::from_value).collect())
            .unwrap_or_default()
    }
}

// GeoJSON feature ids may be numbers; we key everything by string.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "feature id must be a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_geojson_feature_with_property_neighbors() {
        let f: MapFeature = serde_json::from_value(json!({
            "id": 6,
            "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] },
            "properties": { "neighbors": [1, "CA"] }
        }))
        .unwrap();
        assert_eq!(f.id, "6");
        assert_eq!(
            f.neighbor_refs(),
            vec![NeighborRef::Index(1), NeighborRef::Id("CA".to_string())]
        );
    }

    #[test]
    fn multipolygon_parts_sort_by_descending_exterior_length() {
        let small = vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]];
        let big = vec![vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]];
        let g = Geometry::MultiPolygon(vec![small.clone(), big.clone()]);
        let parts = g.sorted_parts();
        assert_eq!(parts[0], big.as_slice());
        assert_eq!(parts[1], small.as_slice());
    }
}
