use crate::cache::SnapshotKey;
use crate::data::{DataRow, MergedRegion, UnresolvedDataJoinWarning, join};
use crate::error::Result;
use crate::options::{CartogramOptions, LabelBy};
use crate::region::{Region, RegionParts};
use crate::settled::SettledLayout;
use crate::styles::StyleAccessors;
use dorling_geo::path::PathWriter;
use dorling_geo::{Edge, HitRegions, Point, PreparedMap, Size};
use dorling_layout::FitTransform;
use serde_json::Value;
use std::sync::Arc;

/// Drawable regions on top of a [`SettledLayout`]: outlines, circles, the morphs between them,
/// styles and labels.
#[derive(Debug, Clone)]
pub struct LayoutSnapshot {
    key: SnapshotKey,
    layout: Arc<SettledLayout>,
    regions: Vec<Region>,
}

impl LayoutSnapshot {
    /// Builds every region's paths, morphs and styles at the settled positions. The layout
    /// itself is not recomputed.
    pub fn build(
        key: SnapshotKey,
        layout: Arc<SettledLayout>,
        map: &PreparedMap,
        data: &[DataRow],
        styles: &StyleAccessors,
        opts: &CartogramOptions,
    ) -> Result<Self> {
        let span = tracing::debug_span!("dorling.snapshot", regions = map.len());
        let _guard = span.enter();

        let (merged, _) = join(map, data);
        let morph = opts.morph();
        let regions = merged
            .iter()
            .zip(layout.circles())
            .map(|(m, c)| {
                Region::build(
                    RegionParts {
                        prepared: m.region,
                        data: m.data,
                        label: label_text(&opts.label, m),
                        position: c.center,
                        radius: c.radius,
                        padding: opts.circle_padding,
                        circle_points: opts.circle_points,
                        map_style: styles.map_style(m),
                        circle_style: styles.circle_style(m),
                    },
                    &morph,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            regions = regions.len(),
            layout = layout.serial(),
            "snapshot built"
        );

        Ok(Self {
            key,
            layout,
            regions,
        })
    }

    pub fn key(&self) -> &SnapshotKey {
        &self.key
    }

    /// The settled layout the regions were placed from.
    pub fn layout(&self) -> &Arc<SettledLayout> {
        &self.layout
    }

    pub fn size(&self) -> Size {
        self.layout.size()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn region_by_id(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        self.layout.edges()
    }

    /// The viewport fit that was applied (identity when fitting is off).
    pub fn transform(&self) -> FitTransform {
        self.layout.transform()
    }

    /// Overlap left after the layout, before fitting. Never above the simulation's
    /// `overlap_slack`.
    pub fn max_overlap(&self) -> f64 {
        self.layout.max_overlap()
    }

    pub fn warnings(&self) -> &[UnresolvedDataJoinWarning] {
        self.layout.warnings()
    }

    /// One straight segment per adjacency, between the two circle centers.
    pub fn border_paths(&self, precision: u8) -> Vec<String> {
        self.edges()
            .iter()
            .map(|e| {
                let mut w = PathWriter::new(precision);
                w.move_to(self.regions[e.source].position)
                    .line_to(self.regions[e.target].position);
                w.finish()
            })
            .collect()
    }

    /// Voronoi cells over the circle centers, index-aligned with [`LayoutSnapshot::regions`].
    pub fn hit_regions(&self) -> &HitRegions {
        self.layout.hit_regions()
    }

    pub fn hit_test(&self, p: Point) -> Option<&Region> {
        self.hit_regions().locate(p).and_then(|i| self.regions.get(i))
    }
}

fn label_text(label: &LabelBy, region: &MergedRegion<'_>) -> Option<String> {
    match label {
        LabelBy::None => None,
        LabelBy::Id => Some(region.id().to_string()),
        LabelBy::Field(name) => region.field(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
    }
}
