use crate::ENDPOINT_EPS;
use crate::error::{Error, Result};
use crate::ring::{RingMorph, add_points, normalize};
use dorling_geo::path::{DEFAULT_PRECISION, PathWriter, polygons_path};
use dorling_geo::ring::{signed_area, vertex_mean};
use dorling_geo::{Polygon, Ring};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MorphOptions {
    /// Edges longer than this are bisected before vertices are matched; `None` disables it.
    pub max_segment_length: Option<f64>,
    pub precision: u8,
}

impl Default for MorphOptions {
    fn default() -> Self {
        Self {
            max_segment_length: Some(10.0),
            precision: DEFAULT_PRECISION,
        }
    }
}

/// The rings a morph moves, and the path drawn when the morph rests on this shape.
///
/// `path` may carry more than `parts` (an outline keeps its holes there), so endpoints render
/// exactly what the region would render without a morph.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub parts: Vec<Ring>,
    pub path: String,
}

impl Shape {
    pub fn new(parts: Vec<Ring>, precision: u8) -> Self {
        let mut w = PathWriter::new(precision);
        for p in &parts {
            w.ring(p);
        }
        Self {
            path: w.finish(),
            parts,
        }
    }

    /// Exterior rings as parts; the path keeps the holes.
    pub fn from_polygons(polygons: &[Polygon], precision: u8) -> Self {
        Self {
            parts: polygons.iter().map(|p| p.exterior.clone()).collect(),
            path: polygons_path(polygons, precision),
        }
    }

    pub fn with_path(parts: Vec<Ring>, path: impl Into<String>) -> Self {
        Self {
            parts,
            path: path.into(),
        }
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

/// Path interpolation between two shapes.
///
/// Equal part counts morph pairwise. A multi-part shape morphing into a single ring splits that
/// ring into one wedge per part (combine); a single ring morphing into many parts is the same
/// thing run backwards (separate). Any other pairing is a topology mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMorph {
    from_path: String,
    to_path: String,
    rings: Vec<RingMorph>,
    precision: u8,
}

impl ShapeMorph {
    pub fn between(from: &Shape, to: &Shape, opts: &MorphOptions) -> Result<Self> {
        let (m, n) = (from.part_count(), to.part_count());
        let max = opts.max_segment_length;
        let rings = if m == n {
            from.parts
                .iter()
                .zip(&to.parts)
                .map(|(a, b)| RingMorph::new(a, b, max))
                .collect()
        } else if n == 1 && m > 1 {
            tracing::trace!(parts = m, "morph: combining parts into one ring");
            combine(&from.parts, &to.parts[0], max)
        } else if m == 1 && n > 1 {
            return Ok(Self::between(to, from, opts)?.reversed());
        } else {
            return Err(Error::MorphTopologyMismatch {
                from_parts: m,
                to_parts: n,
            });
        };
        Ok(Self {
            from_path: from.path.clone(),
            to_path: to.path.clone(),
            rings,
            precision: opts.precision,
        })
    }

    pub fn reversed(&self) -> Self {
        Self {
            from_path: self.to_path.clone(),
            to_path: self.from_path.clone(),
            rings: self.rings.iter().map(RingMorph::reversed).collect(),
            precision: self.precision,
        }
    }

    /// Number of rings drawn mid-morph.
    pub fn part_count(&self) -> usize {
        self.rings.len()
    }

    pub fn from_path(&self) -> &str {
        &self.from_path
    }

    pub fn to_path(&self) -> &str {
        &self.to_path
    }

    pub fn parts_at(&self, t: f64) -> Vec<Ring> {
        self.rings.iter().map(|r| r.points_at(t)).collect()
    }

    /// Path at progress `t`. Within [`ENDPOINT_EPS`] of either end the endpoint path is returned
    /// verbatim.
    pub fn path_at(&self, t: f64) -> String {
        if t <= ENDPOINT_EPS {
            return self.from_path.clone();
        }
        if t >= 1.0 - ENDPOINT_EPS {
            return self.to_path.clone();
        }
        let mut w = PathWriter::new(self.precision);
        for r in &self.rings {
            w.ring(&r.points_at(t));
        }
        w.finish()
    }
}

fn combine(parts: &[Ring], target: &Ring, max: Option<f64>) -> Vec<RingMorph> {
    let weights: Vec<f64> = parts.iter().map(|p| signed_area(p).abs()).collect();
    split_ring(target, &weights, max)
        .iter()
        .zip(parts)
        .map(|(wedge, part)| RingMorph::new(part, wedge, max))
        .collect()
}

/// Cuts `ring` into `weights.len()` wedges fanning out from its vertex mean. Each wedge takes a
/// contiguous run of the ring's edges, at least two, the rest shared out by weight; neighboring
/// wedges share their boundary vertex.
pub(crate) fn split_ring(ring: &Ring, weights: &[f64], max: Option<f64>) -> Vec<Ring> {
    let k = weights.len();
    if k == 0 {
        return Vec::new();
    }
    let mut ring = normalize(ring, max);
    if ring.len() < 2 * k {
        let missing = 2 * k - ring.len();
        add_points(&mut ring, missing);
    }
    let Some(center) = vertex_mean(&ring) else {
        return Vec::new();
    };
    let counts = apportion(ring.len(), weights, 2);
    let n = ring.len();
    let mut start = 0;
    counts
        .into_iter()
        .map(|c| {
            let mut wedge: Ring = Vec::with_capacity(c + 2);
            wedge.push(center);
            wedge.extend((start..=start + c).map(|i| ring[i % n]));
            start += c;
            wedge
        })
        .collect()
}

/// Splits `total` into `weights.len()` integers of at least `min` each, the remainder by largest
/// remainder of the weighted share (lower index first on ties).
fn apportion(total: usize, weights: &[f64], min: usize) -> Vec<usize> {
    let k = weights.len();
    let spare = total.saturating_sub(min * k);
    let sum: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    let share = |w: f64| {
        if sum > 0.0 && w.is_finite() && w > 0.0 {
            spare as f64 * w / sum
        } else if sum > 0.0 {
            0.0
        } else {
            spare as f64 / k as f64
        }
    };
    let mut counts: Vec<usize> = Vec::with_capacity(k);
    let mut rema: Vec<(f64, usize)> = Vec::with_capacity(k);
    for (i, &w) in weights.iter().enumerate() {
        let s = share(w);
        let whole = s.floor();
        counts.push(min + whole as usize);
        rema.push((s - whole, i));
    }
    let assigned: usize = counts.iter().sum::<usize>() - min * k;
    rema.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, i) in rema.iter().take(spare.saturating_sub(assigned)) {
        counts[i] += 1;
    }
    counts
}
