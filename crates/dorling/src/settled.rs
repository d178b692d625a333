use crate::data::{DataRow, SizeBy, UnresolvedDataJoinWarning, join};
use crate::error::Result;
use crate::options::CartogramOptions;
use dorling_geo::{Edge, HitRegions, Point, PreparedMap, Size};
use dorling_layout::{Circle, FitTransform, LayoutGraph, Node, fit_to_viewport};

/// Circle positions and radii for one set of layout inputs, independent of how regions are
/// drawn.
#[derive(Debug, Clone)]
pub struct SettledLayout {
    serial: u64,
    size: Size,
    circles: Vec<Circle>,
    edges: Vec<Edge>,
    transform: FitTransform,
    hit_regions: HitRegions,
    warnings: Vec<UnresolvedDataJoinWarning>,
    max_overlap: f64,
}

impl SettledLayout {
    /// Joins data, sizes the circles, runs the layout and fits it to the canvas (when enabled).
    /// `serial` identifies the result to the snapshots built on it.
    pub fn settle(
        serial: u64,
        map: &PreparedMap,
        data: &[DataRow],
        size_by: &SizeBy,
        opts: &CartogramOptions,
    ) -> Result<Self> {
        let span = tracing::debug_span!("dorling.settle", serial, regions = map.len());
        let _guard = span.enter();

        let (merged, warnings) = join(map, data);
        let graph = LayoutGraph {
            nodes: merged
                .iter()
                .enumerate()
                .map(|(i, m)| Node {
                    anchor: m.region.centroid,
                    radius: size_by.radius(m, i),
                })
                .collect(),
            edges: map.edges.clone(),
        };
        let settled = dorling_layout::layout(&graph, &opts.simulation)?;

        let mut circles: Vec<Circle> = settled
            .positions
            .iter()
            .zip(&graph.nodes)
            .map(|(&center, n)| Circle {
                center,
                radius: n.radius,
            })
            .collect();
        let transform = if opts.zoom_to_fit {
            let t = fit_to_viewport(&circles, map.size)?;
            t.apply(&mut circles);
            t
        } else {
            FitTransform::identity()
        };

        let sites: Vec<Point> = circles.iter().map(|c| c.center).collect();
        let hit_regions = HitRegions::build(&sites, map.size)?;

        tracing::debug!(
            unresolved = warnings.len(),
            scale = transform.scale,
            "layout settled for canvas"
        );

        Ok(Self {
            serial,
            size: map.size,
            circles,
            edges: graph.edges,
            transform,
            hit_regions,
            warnings,
            max_overlap: settled.max_overlap,
        })
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Final circles, after fitting, index-aligned with the map's regions.
    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn transform(&self) -> FitTransform {
        self.transform
    }

    pub fn hit_regions(&self) -> &HitRegions {
        &self.hit_regions
    }

    pub fn warnings(&self) -> &[UnresolvedDataJoinWarning] {
        &self.warnings
    }

    pub fn max_overlap(&self) -> f64 {
        self.max_overlap
    }
}
