//! The three per-tick forces. Each one reads positions and adds to velocities.

use crate::random::Lcg;
use crate::simulation::Bodies;
use dorling_geo::{Edge, Point};

pub trait Force {
    fn apply(&mut self, bodies: &mut Bodies, alpha: f64, rng: &mut Lcg);
}

/// Springs along adjacency edges (d3 `forceLink`).
///
/// The correction is split between the endpoints by degree, so well-connected regions move less.
#[derive(Debug, Clone)]
pub struct LinkForce {
    links: Vec<(usize, usize)>,
    bias: Vec<f64>,
    distance: f64,
    strength: f64,
}

impl LinkForce {
    pub fn new(edges: &[Edge], node_count: usize, distance: f64, strength: f64) -> Self {
        let mut degree = vec![0usize; node_count];
        for e in edges {
            degree[e.source] += 1;
            degree[e.target] += 1;
        }
        let links: Vec<(usize, usize)> = edges.iter().map(|e| (e.source, e.target)).collect();
        let bias = links
            .iter()
            .map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
            .collect();
        Self {
            links,
            bias,
            distance,
            strength,
        }
    }
}

impl Force for LinkForce {
    fn apply(&mut self, b: &mut Bodies, alpha: f64, rng: &mut Lcg) {
        for (&(s, t), &bias) in self.links.iter().zip(&self.bias) {
            let mut dx = b.x[t] + b.vx[t] - b.x[s] - b.vx[s];
            let mut dy = b.y[t] + b.vy[t] - b.y[s] - b.vy[s];
            if dx == 0.0 {
                dx = rng.jiggle();
            }
            if dy == 0.0 {
                dy = rng.jiggle();
            }
            let l = dx.hypot(dy);
            let k = (l - self.distance) / l * alpha * self.strength;
            dx *= k;
            dy *= k;
            b.vx[t] -= dx * bias;
            b.vy[t] -= dy * bias;
            b.vx[s] += dx * (1.0 - bias);
            b.vy[s] += dy * (1.0 - bias);
        }
    }
}

/// Per-axis pull toward each body's fixed anchor (d3 `forceX` + `forceY`).
#[derive(Debug, Clone)]
pub struct AnchorForce {
    anchors: Vec<Point>,
    strength: f64,
}

impl AnchorForce {
    pub fn new(anchors: Vec<Point>, strength: f64) -> Self {
        Self { anchors, strength }
    }
}

impl Force for AnchorForce {
    fn apply(&mut self, b: &mut Bodies, alpha: f64, _rng: &mut Lcg) {
        let k = self.strength * alpha;
        for (i, a) in self.anchors.iter().enumerate() {
            b.vx[i] += (a.x - b.x[i]) * k;
            b.vy[i] += (a.y - b.y[i]) * k;
        }
    }
}

/// Pairwise non-overlap (d3 `forceCollide`), not scaled by alpha.
///
/// Overlapping pairs are pushed apart along the line between their predicted positions by the
/// penetration depth times `strength`; the larger circle moves less.
#[derive(Debug, Clone)]
pub struct CollideForce {
    radii: Vec<f64>,
    strength: f64,
    iterations: usize,
}

impl CollideForce {
    pub fn new(radii: Vec<f64>, strength: f64, iterations: usize) -> Self {
        Self {
            radii,
            strength,
            iterations,
        }
    }
}

impl Force for CollideForce {
    fn apply(&mut self, b: &mut Bodies, _alpha: f64, rng: &mut Lcg) {
        let n = self.radii.len();
        for _ in 0..self.iterations {
            for i in 0..n {
                let ri = self.radii[i];
                let ri2 = ri * ri;
                let xi = b.x[i] + b.vx[i];
                let yi = b.y[i] + b.vy[i];
                for j in (i + 1)..n {
                    let rj = self.radii[j];
                    let r = ri + rj;
                    let mut dx = xi - b.x[j] - b.vx[j];
                    let mut dy = yi - b.y[j] - b.vy[j];
                    let mut l = dx * dx + dy * dy;
                    if l >= r * r {
                        continue;
                    }
                    if dx == 0.0 {
                        dx = rng.jiggle();
                        l += dx * dx;
                    }
                    if dy == 0.0 {
                        dy = rng.jiggle();
                        l += dy * dy;
                    }
                    let l = l.sqrt();
                    let k = (r - l) / l * self.strength;
                    dx *= k;
                    dy *= k;
                    let rj2 = rj * rj;
                    let share = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };
                    b.vx[i] += dx * share;
                    b.vy[i] += dy * share;
                    b.vx[j] -= dx * (1.0 - share);
                    b.vy[j] -= dy * (1.0 - share);
                }
            }
        }
    }
}
