use crate::error::{Error, Result};
use dorling_geo::{Edge, Point};

#[derive(Debug, Clone)]
pub struct LayoutGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl LayoutGraph {
    pub fn validate(&self) -> Result<()> {
        let len = self.nodes.len();
        for e in &self.edges {
            if e.source >= len || e.target >= len {
                return Err(Error::MissingEndpoint {
                    from: e.source,
                    to: e.target,
                    len,
                });
            }
        }
        for (index, n) in self.nodes.iter().enumerate() {
            if !(n.radius.is_finite() && n.radius >= 0.0) {
                return Err(Error::InvalidRadius {
                    index,
                    radius: n.radius,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Node {
    /// Fixed spring target; also the initial position.
    pub anchor: Point,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct LayoutResult {
    /// Settled centers, index-aligned with `LayoutGraph::nodes`.
    pub positions: Vec<Point>,
    pub ticks: usize,
    /// Largest remaining `r_a + r_b - distance` over all pairs (0 when nothing overlaps); at most
    /// `overlap_slack`.
    pub max_overlap: f64,
}
