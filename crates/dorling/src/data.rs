//! Joining the data table onto regions, and turning merged records into radii.

use dorling_geo::PreparedMap;
use dorling_geo::PreparedRegion;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Radius used when the size accessor has nothing to read.
pub const DEFAULT_RADIUS: f64 = 5.0;

/// One row of the data table, joined to a region by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DataRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "data row id must be a string or number, got {other}"
        ))),
    }
}

/// A region together with its data row, if the join found one.
#[derive(Debug, Clone, Copy)]
pub struct MergedRegion<'a> {
    pub region: &'a PreparedRegion,
    pub data: Option<&'a DataRow>,
}

impl<'a> MergedRegion<'a> {
    pub fn id(&self) -> &'a str {
        &self.region.id
    }

    pub fn index(&self) -> usize {
        self.region.index
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Data fields shadow the feature's properties.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.data
            .and_then(|d| d.fields.get(name))
            .or_else(|| self.region.properties.get(name))
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(Value::as_f64)
    }
}

pub type SizeFn = dyn Fn(&MergedRegion<'_>, usize) -> f64 + Send + Sync;

/// The size-by accessor.
///
/// `Custom` closures cannot be compared, so they carry a caller-chosen `token`: two accessors
/// with the same token are assumed to size regions identically, and the layout cache relies on
/// it. Change the token whenever the closure's behavior changes.
#[derive(Clone)]
pub enum SizeBy {
    Constant(f64),
    /// A numeric field of the merged record. Missing or non-numeric values use
    /// [`DEFAULT_RADIUS`].
    Field(String),
    Custom { token: u64, f: Arc<SizeFn> },
}

impl Default for SizeBy {
    fn default() -> Self {
        Self::Constant(DEFAULT_RADIUS)
    }
}

impl fmt::Debug for SizeBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(r) => f.debug_tuple("Constant").field(r).finish(),
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Custom { token, .. } => f.debug_struct("Custom").field("token", token).finish(),
        }
    }
}

impl SizeBy {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn custom(
        token: u64,
        f: impl Fn(&MergedRegion<'_>, usize) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            token,
            f: Arc::new(f),
        }
    }

    /// Radius for one region; negative and non-finite results become 0.
    pub fn radius(&self, region: &MergedRegion<'_>, index: usize) -> f64 {
        let r = match self {
            Self::Constant(r) => *r,
            Self::Field(name) => region.number(name).unwrap_or(DEFAULT_RADIUS),
            Self::Custom { f, .. } => f(region, index),
        };
        if r.is_finite() { r.max(0.0) } else { 0.0 }
    }
}

/// A region with no matching data row. The region keeps the accessor's default radius.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDataJoinWarning {
    pub region_id: String,
    pub index: usize,
}

impl fmt::Display for UnresolvedDataJoinWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "region {:?} (index {}) has no matching data row",
            self.region_id, self.index
        )
    }
}

/// Joins `data` onto the map's regions by id. The first row with a given id wins.
pub fn join<'a>(
    map: &'a PreparedMap,
    data: &'a [DataRow],
) -> (Vec<MergedRegion<'a>>, Vec<UnresolvedDataJoinWarning>) {
    let mut by_id: FxHashMap<&str, &DataRow> = FxHashMap::default();
    by_id.reserve(data.len());
    for row in data {
        by_id.entry(row.id.as_str()).or_insert(row);
    }

    let mut warnings = Vec::new();
    let merged = map
        .regions
        .iter()
        .map(|region| {
            let row = by_id.get(region.id.as_str()).copied();
            if row.is_none() {
                tracing::debug!(region = %region.id, index = region.index, "no data row for region");
                warnings.push(UnresolvedDataJoinWarning {
                    region_id: region.id.clone(),
                    index: region.index,
                });
            }
            MergedRegion { region, data: row }
        })
        .collect();
    (merged, warnings)
}
