//! Voronoi hit regions over circle centers, clipped to the canvas.
//!
//! Cells come from `voronoice` (Delaunay dual). Inputs the triangulation cannot represent
//! index-for-index (fewer than three sites, collinear or coincident sites, sites on or outside
//! the canvas edge) go through a half-plane clipper instead, which is exact for any input.

use crate::error::Result;
use crate::geom::{Point, Rect, Size, point, validate_size};
use crate::path::ring_path;
use crate::ring::{Ring, open_ring, signed_area};
use rustc_hash::FxHashSet;
use voronoice::{BoundingBox, ClipBehavior, VoronoiBuilder};

const COLLINEAR_EPS: f64 = 1e-9;

/// One clipped, convex cell per site. Cell `i` belongs to site `i`.
#[derive(Debug, Clone)]
pub struct HitRegions {
    bounds: Rect,
    sites: Vec<Point>,
    cells: Vec<Ring>,
}

impl HitRegions {
    pub fn build(sites: &[Point], size: Size) -> Result<Self> {
        validate_size(size)?;
        let bounds = Rect::new(point(0.0, 0.0), point(size.width, size.height));

        let cells = if needs_exact_fallback(sites, &bounds) {
            tracing::trace!(sites = sites.len(), "voronoi: half-plane fallback");
            half_plane_cells(sites, &bounds)
        } else {
            delaunay_cells(sites, &bounds).unwrap_or_else(|| {
                tracing::trace!(sites = sites.len(), "voronoi: backend rejected input");
                half_plane_cells(sites, &bounds)
            })
        };

        Ok(Self {
            bounds,
            sites: sites.to_vec(),
            cells,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Ring] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Ring> {
        self.cells.get(index)
    }

    pub fn cell_path(&self, index: usize, precision: u8) -> Option<String> {
        self.cells.get(index).map(|c| ring_path(c, precision))
    }

    /// Index of the cell containing `p`, `None` outside the canvas or when there are no sites.
    ///
    /// Ties on a shared boundary resolve to the lower index.
    pub fn locate(&self, p: Point) -> Option<usize> {
        let b = &self.bounds;
        if !(p.x >= b.min.x && p.x <= b.max.x && p.y >= b.min.y && p.y <= b.max.y) {
            return None;
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, s) in self.sites.iter().enumerate() {
            if self.cells[i].is_empty() {
                continue;
            }
            let d = (*s - p).square_length();
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }
}

fn strictly_inside(p: &Point, b: &Rect) -> bool {
    p.x > b.min.x && p.x < b.max.x && p.y > b.min.y && p.y < b.max.y
}

fn needs_exact_fallback(sites: &[Point], bounds: &Rect) -> bool {
    if sites.len() < 3 || sites.iter().any(|s| !strictly_inside(s, bounds)) {
        return true;
    }
    let mut seen: FxHashSet<(u64, u64)> = FxHashSet::default();
    if !sites.iter().all(|s| seen.insert((s.x.to_bits(), s.y.to_bits()))) {
        return true;
    }
    let a = sites[0];
    let Some(b) = sites.iter().copied().find(|s| *s != a) else {
        return true;
    };
    let ab = b - a;
    let scale = ab.square_length().max(1.0);
    sites.iter().all(|s| ab.cross(*s - a).abs() <= COLLINEAR_EPS * scale)
}

fn delaunay_cells(sites: &[Point], bounds: &Rect) -> Option<Vec<Ring>> {
    let center = bounds.center();
    let bbox = BoundingBox::new(
        voronoice::Point {
            x: center.x,
            y: center.y,
        },
        bounds.width(),
        bounds.height(),
    );
    let diagram = VoronoiBuilder::default()
        .set_sites(
            sites
                .iter()
                .map(|s| voronoice::Point { x: s.x, y: s.y })
                .collect(),
        )
        .set_bounding_box(bbox)
        .set_clip_behavior(ClipBehavior::Clip)
        .build()?;

    if diagram.cells().len() != sites.len() {
        return None;
    }
    let mut cells: Vec<Ring> = Vec::with_capacity(sites.len());
    for i in 0..sites.len() {
        let ring = open_ring(diagram.cell(i).iter_vertices().map(|v| point(v.x, v.y)));
        if ring.len() < 3 {
            return None;
        }
        cells.push(ring);
    }
    Some(cells)
}

/// Intersects the canvas with the bisector half-planes of every other site. Later duplicates of
/// a site get an empty cell so the output stays index-aligned.
fn half_plane_cells(sites: &[Point], bounds: &Rect) -> Vec<Ring> {
    let canvas: Ring = vec![
        bounds.min,
        point(bounds.max.x, bounds.min.y),
        bounds.max,
        point(bounds.min.x, bounds.max.y),
    ];

    let mut cells: Vec<Ring> = Vec::with_capacity(sites.len());
    for (i, si) in sites.iter().enumerate() {
        if sites[..i].contains(si) {
            cells.push(Vec::new());
            continue;
        }
        let mut cell = canvas.clone();
        for (j, sj) in sites.iter().enumerate() {
            if j == i || sj == si {
                continue;
            }
            cell = clip_half_plane(&cell, *si, *sj);
            if cell.is_empty() {
                break;
            }
        }
        let mut cell = open_ring(cell);
        if cell.len() < 3 || signed_area(&cell).abs() == 0.0 {
            cell.clear();
        }
        cells.push(cell);
    }
    cells
}

/// Keeps the part of `poly` closer to `keep` than to `other` (Sutherland-Hodgman, one edge).
fn clip_half_plane(poly: &[Point], keep: Point, other: Point) -> Ring {
    let n = other - keep;
    let mid = keep.lerp(other, 0.5);
    let side = |p: Point| (p - mid).dot(n);

    let mut out: Ring = Vec::with_capacity(poly.len() + 1);
    for (k, &cur) in poly.iter().enumerate() {
        let prev = poly[(k + poly.len() - 1) % poly.len()];
        let (dc, dp) = (side(cur), side(prev));
        if dc <= 0.0 {
            if dp > 0.0 {
                out.push(prev.lerp(cur, dp / (dp - dc)));
            }
            out.push(cur);
        } else if dp <= 0.0 {
            out.push(prev.lerp(cur, dp / (dp - dc)));
        }
    }
    out
}
