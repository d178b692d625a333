use crate::error::{Error, Result};
use crate::feature::{MapFeature, NeighborRef};
use crate::geom::{Point, Size, point, validate_size};
use crate::path::polygons_path;
use crate::projection::{FittedProjection, Projection};
use crate::ring::{Polygon, Ring, centroid_moment, open_ring, vertex_mean};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value};

/// Below this the centroid falls back to the vertex mean.
const MIN_CENTROID_AREA: f64 = 1e-12;

/// Undirected adjacency between two regions, by region index. `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

/// A region after projection: drawing-plane geometry, outline path, centroid and neighbors.
#[derive(Debug, Clone)]
pub struct PreparedRegion {
    pub id: String,
    pub index: usize,
    /// Projected parts, largest exterior ring first.
    pub polygons: Vec<Polygon>,
    pub outline_path: String,
    pub centroid: Point,
    /// Sorted, symmetric neighbor indices.
    pub neighbors: Vec<usize>,
    pub properties: Map<String, Value>,
}

impl PreparedRegion {
    pub fn exteriors(&self) -> Vec<Ring> {
        self.polygons.iter().map(|p| p.exterior.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PreparedMap {
    pub size: Size,
    pub projection: FittedProjection,
    pub regions: Vec<PreparedRegion>,
    pub edges: Vec<Edge>,
    id_to_idx: FxHashMap<String, usize>,
}

impl PreparedMap {
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Projects `features` into a `size` canvas and derives outlines, centroids and edges.
///
/// `MultiPolygon` parts are ordered by descending exterior ring length before anything else
/// happens, so part order is identical on every call for the same input.
pub fn preprocess(
    features: &[MapFeature],
    size: Size,
    projection: Projection,
    precision: u8,
) -> Result<PreparedMap> {
    validate_size(size)?;

    let fitted = if features.is_empty() {
        FittedProjection {
            projection,
            scale: 1.0,
            translate: crate::geom::vector(0.0, 0.0),
        }
    } else {
        FittedProjection::fit_extent(projection, size, features.iter().map(|f| &f.geometry))?
    };

    let mut id_to_idx: FxHashMap<String, usize> = FxHashMap::default();
    id_to_idx.reserve(features.len());
    for (idx, f) in features.iter().enumerate() {
        id_to_idx.entry(f.id.clone()).or_insert(idx);
    }

    let mut regions: Vec<PreparedRegion> = Vec::with_capacity(features.len());
    for (index, f) in features.iter().enumerate() {
        let polygons = project_polygons(f, &fitted)?;
        let centroid = polygons_centroid(&polygons).ok_or_else(|| Error::DegenerateGeometry {
            id: f.id.clone(),
        })?;
        regions.push(PreparedRegion {
            id: f.id.clone(),
            index,
            outline_path: polygons_path(&polygons, precision),
            polygons,
            centroid,
            neighbors: Vec::new(),
            properties: f.properties.clone(),
        });
    }

    let edges = derive_edges(features, &id_to_idx);
    for e in &edges {
        regions[e.source].neighbors.push(e.target);
        regions[e.target].neighbors.push(e.source);
    }
    for r in &mut regions {
        r.neighbors.sort_unstable();
        r.neighbors.dedup();
    }

    tracing::debug!(
        regions = regions.len(),
        edges = edges.len(),
        scale = fitted.scale,
        "preprocessed map geometry"
    );

    Ok(PreparedMap {
        size,
        projection: fitted,
        regions,
        edges,
        id_to_idx,
    })
}

fn project_polygons(f: &MapFeature, fitted: &FittedProjection) -> Result<Vec<Polygon>> {
    let degenerate = || Error::DegenerateGeometry { id: f.id.clone() };

    let mut out: Vec<Polygon> = Vec::new();
    for rings in f.geometry.sorted_parts() {
        let mut projected = rings
            .iter()
            .map(|ring| open_ring(ring.iter().map(|p| fitted.project(*p))))
            .filter(|ring| !ring.is_empty());
        let Some(exterior) = projected.next() else {
            continue;
        };
        let holes: Vec<Ring> = projected.collect();
        out.push(Polygon { exterior, holes });
    }

    let all_finite = out
        .iter()
        .flat_map(Polygon::rings)
        .flatten()
        .all(|p| p.x.is_finite() && p.y.is_finite());
    if out.is_empty() || !all_finite {
        return Err(degenerate());
    }
    Ok(out)
}

/// Area-weighted centroid over all parts, holes subtracted.
fn polygons_centroid(polygons: &[Polygon]) -> Option<Point> {
    let mut area = 0.0;
    let mut mx = 0.0;
    let mut my = 0.0;
    for p in polygons {
        let (a, x, y) = centroid_moment(&p.exterior);
        area += a;
        mx += x;
        my += y;
        for h in &p.holes {
            let (a, x, y) = centroid_moment(h);
            area -= a;
            mx -= x;
            my -= y;
        }
    }
    if area > MIN_CENTROID_AREA {
        let c = point(mx / area, my / area);
        if c.x.is_finite() && c.y.is_finite() {
            return Some(c);
        }
    }
    vertex_mean(polygons.iter().flat_map(Polygon::rings).flatten())
}

fn derive_edges(features: &[MapFeature], id_to_idx: &FxHashMap<String, usize>) -> Vec<Edge> {
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut edges: Vec<Edge> = Vec::new();
    for (source, f) in features.iter().enumerate() {
        for r in f.neighbor_refs() {
            let target = match &r {
                NeighborRef::Index(i) if *i < features.len() => *i,
                NeighborRef::Id(id) if id_to_idx.contains_key(id) => id_to_idx[id],
                _ => {
                    tracing::warn!(region = %f.id, neighbor = ?r, "ignoring unresolved neighbor reference");
                    continue;
                }
            };
            if target == source {
                tracing::warn!(region = %f.id, "ignoring self-referencing neighbor");
                continue;
            }
            let key = (source.min(target), source.max(target));
            if seen.insert(key) {
                edges.push(Edge {
                    source: key.0,
                    target: key.1,
                });
            }
        }
    }
    edges
}
