//! Cache keys and the two-level layout cache.
//!
//! Settled layouts are keyed on what moves the circles: geometry, data, the size accessor,
//! canvas, projection, fitting and simulation options. Snapshots sit on top of a settled
//! layout and are keyed on its serial plus everything that only changes how regions are drawn,
//! so restyling or repadding never reruns the simulation.

use crate::data::{DataRow, SizeBy};
use crate::error::Result;
use crate::options::{CartogramOptions, LabelBy};
use crate::settled::SettledLayout;
use crate::snapshot::LayoutSnapshot;
use dorling_geo::{Geometry, MapFeature, NeighborRef, Projection};
use dorling_layout::SimulationOptions;
use rustc_hash::FxHasher;
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Component digests of the inputs a [`SettledLayout`] depends on.
///
/// Equal keys are a fast path only: a cached layout is reused once its stored
/// [`LayoutInputs`] also compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    geometry: u64,
    data: u64,
    size_by: u64,
    options: u64,
}

impl LayoutKey {
    /// Combines precomputed geometry and data digests with the accessor and the layout-relevant
    /// options (canvas size, projection, fitting, simulation).
    pub fn new(
        geometry: u64,
        data: u64,
        size_by: &SizeBy,
        opts: &CartogramOptions,
    ) -> Result<Self> {
        let mut h = FxHasher::default();
        hash_size_by(size_by, &mut h);
        let size_by = h.finish();

        let mut h = FxHasher::default();
        opts.size[0].to_bits().hash(&mut h);
        opts.size[1].to_bits().hash(&mut h);
        opts.projection.hash(&mut h);
        opts.zoom_to_fit.hash(&mut h);
        hash_json(&serde_json::to_value(&opts.simulation)?, &mut h);
        Ok(Self {
            geometry,
            data,
            size_by,
            options: h.finish(),
        })
    }
}

/// The inputs a cached [`SettledLayout`] was computed from.
#[derive(Debug, Clone)]
pub struct LayoutInputs {
    features: Arc<[MapFeature]>,
    data: Vec<DataRow>,
    size_by: SizeBy,
    size: [f64; 2],
    projection: Projection,
    zoom_to_fit: bool,
    simulation: SimulationOptions,
}

impl LayoutInputs {
    pub fn new(
        features: &Arc<[MapFeature]>,
        data: &[DataRow],
        size_by: &SizeBy,
        opts: &CartogramOptions,
    ) -> Self {
        Self {
            features: features.clone(),
            data: data.to_vec(),
            size_by: size_by.clone(),
            size: opts.size,
            projection: opts.projection,
            zoom_to_fit: opts.zoom_to_fit,
            simulation: opts.simulation.clone(),
        }
    }

    /// Exact comparison. `Custom` accessors compare by token.
    pub fn matches(
        &self,
        features: &Arc<[MapFeature]>,
        data: &[DataRow],
        size_by: &SizeBy,
        opts: &CartogramOptions,
    ) -> bool {
        (Arc::ptr_eq(&self.features, features) || *self.features == **features)
            && self.data == data
            && same_size_by(&self.size_by, size_by)
            && self.size == opts.size
            && self.projection == opts.projection
            && self.zoom_to_fit == opts.zoom_to_fit
            && self.simulation == opts.simulation
    }
}

/// Identifies a [`LayoutSnapshot`]: the settled layout it was built on plus the presentation
/// inputs (styles, padding, circle resolution, morph options, labels).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    layout: u64,
    style_generation: u64,
    circle_padding: u64,
    circle_points: Option<usize>,
    max_segment_length: Option<u64>,
    path_precision: u8,
    label: LabelBy,
}

impl SnapshotKey {
    pub fn new(layout: &SettledLayout, style_generation: u64, opts: &CartogramOptions) -> Self {
        Self {
            layout: layout.serial(),
            style_generation,
            circle_padding: opts.circle_padding.to_bits(),
            circle_points: opts.circle_points,
            max_segment_length: opts.max_segment_length.map(f64::to_bits),
            path_precision: opts.path_precision,
            label: opts.label.clone(),
        }
    }

    /// Serial of the settled layout underneath.
    pub fn layout(&self) -> u64 {
        self.layout
    }
}

pub fn geometry_digest(features: &[MapFeature]) -> u64 {
    let mut h = FxHasher::default();
    features.len().hash(&mut h);
    for f in features {
        f.id.hash(&mut h);
        match &f.geometry {
            Geometry::Polygon(rings) => {
                0u8.hash(&mut h);
                hash_rings(rings, &mut h);
            }
            Geometry::MultiPolygon(parts) => {
                1u8.hash(&mut h);
                parts.len().hash(&mut h);
                for rings in parts {
                    hash_rings(rings, &mut h);
                }
            }
        }
        for n in f.neighbor_refs() {
            match n {
                NeighborRef::Index(i) => i.hash(&mut h),
                NeighborRef::Id(id) => id.hash(&mut h),
            }
        }
        hash_object(&f.properties, &mut h);
    }
    h.finish()
}

pub fn data_digest(rows: &[DataRow]) -> u64 {
    let mut h = FxHasher::default();
    rows.len().hash(&mut h);
    for r in rows {
        r.id.hash(&mut h);
        hash_object(&r.fields, &mut h);
    }
    h.finish()
}

fn hash_rings(rings: &[Vec<[f64; 2]>], h: &mut FxHasher) {
    rings.len().hash(h);
    for ring in rings {
        ring.len().hash(h);
        for p in ring {
            p[0].to_bits().hash(h);
            p[1].to_bits().hash(h);
        }
    }
}

fn same_size_by(a: &SizeBy, b: &SizeBy) -> bool {
    match (a, b) {
        (SizeBy::Constant(x), SizeBy::Constant(y)) => x.to_bits() == y.to_bits(),
        (SizeBy::Field(x), SizeBy::Field(y)) => x == y,
        (SizeBy::Custom { token: x, .. }, SizeBy::Custom { token: y, .. }) => x == y,
        _ => false,
    }
}

fn hash_size_by(size_by: &SizeBy, h: &mut FxHasher) {
    match size_by {
        SizeBy::Constant(r) => {
            0u8.hash(h);
            r.to_bits().hash(h);
        }
        SizeBy::Field(name) => {
            1u8.hash(h);
            name.hash(h);
        }
        SizeBy::Custom { token, .. } => {
            2u8.hash(h);
            token.hash(h);
        }
    }
}

fn hash_object(m: &Map<String, Value>, h: &mut FxHasher) {
    m.len().hash(h);
    for (k, v) in m {
        k.hash(h);
        hash_json(v, h);
    }
}

fn hash_json(v: &Value, h: &mut FxHasher) {
    match v {
        Value::Null => 0u8.hash(h),
        Value::Bool(b) => {
            1u8.hash(h);
            b.hash(h);
        }
        Value::Number(n) => {
            2u8.hash(h);
            if let Some(i) = n.as_i64() {
                i.hash(h);
            } else if let Some(u) = n.as_u64() {
                u.hash(h);
            } else if let Some(f) = n.as_f64() {
                f.to_bits().hash(h);
            }
        }
        Value::String(s) => {
            3u8.hash(h);
            s.hash(h);
        }
        Value::Array(items) => {
            4u8.hash(h);
            items.len().hash(h);
            for x in items {
                hash_json(x, h);
            }
        }
        Value::Object(m) => {
            5u8.hash(h);
            hash_object(m, h);
        }
    }
}

#[derive(Debug)]
struct CachedLayout {
    key: LayoutKey,
    inputs: LayoutInputs,
    layout: Arc<SettledLayout>,
}

/// Holds the most recent settled layout and the most recent snapshot.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layout: Option<CachedLayout>,
    snapshot: Option<Arc<LayoutSnapshot>>,
    serial: u64,
    hits: u64,
    misses: u64,
    snapshot_hits: u64,
    snapshot_misses: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The settled layout for `key`. A stored layout is reused only when `matches` accepts its
    /// inputs; otherwise `settle` runs with a fresh serial.
    pub fn layout_or_try_insert_with(
        &mut self,
        key: LayoutKey,
        matches: impl FnOnce(&LayoutInputs) -> bool,
        settle: impl FnOnce(u64) -> Result<(LayoutInputs, SettledLayout)>,
    ) -> Result<Arc<SettledLayout>> {
        if let Some(cached) = self
            .layout
            .as_ref()
            .filter(|c| c.key == key && matches(&c.inputs))
        {
            self.hits += 1;
            tracing::trace!(serial = cached.layout.serial(), "layout cache hit");
            return Ok(cached.layout.clone());
        }
        self.misses += 1;
        self.serial += 1;
        tracing::trace!(serial = self.serial, "layout cache miss");
        let (inputs, settled) = settle(self.serial)?;
        let settled = Arc::new(settled);
        self.layout = Some(CachedLayout {
            key,
            inputs,
            layout: settled.clone(),
        });
        Ok(settled)
    }

    pub fn snapshot_or_try_insert_with(
        &mut self,
        key: SnapshotKey,
        build: impl FnOnce(SnapshotKey) -> Result<LayoutSnapshot>,
    ) -> Result<Arc<LayoutSnapshot>> {
        if let Some(snapshot) = self.snapshot.as_ref().filter(|s| *s.key() == key) {
            self.snapshot_hits += 1;
            return Ok(snapshot.clone());
        }
        self.snapshot_misses += 1;
        tracing::trace!(layout = key.layout, "snapshot rebuilt");
        let snapshot = Arc::new(build(key)?);
        self.snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub fn latest(&self) -> Option<&Arc<LayoutSnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn clear(&mut self) {
        self.layout = None;
        self.snapshot = None;
    }

    /// Layout lookups answered without running the simulation.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Simulation runs.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn snapshot_hits(&self) -> u64 {
        self.snapshot_hits
    }

    pub fn snapshot_misses(&self) -> u64 {
        self.snapshot_misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dorling_geo::preprocess;

    fn opts() -> CartogramOptions {
        CartogramOptions {
            size: [100.0, 100.0],
            projection: Projection::Identity,
            zoom_to_fit: false,
            ..CartogramOptions::default()
        }
    }

    fn features() -> Arc<[MapFeature]> {
        let ring = vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]];
        vec![MapFeature::new("a", Geometry::Polygon(vec![ring]))].into()
    }

    fn settle(serial: u64, opts: &CartogramOptions) -> SettledLayout {
        let map = preprocess(&features(), opts.canvas(), opts.projection, 3).unwrap();
        SettledLayout::settle(serial, &map, &[], &SizeBy::default(), opts).unwrap()
    }

    #[test]
    fn layout_key_changes_with_each_layout_input() {
        let opts = opts();
        let key = |g, d, s: &SizeBy, o: &CartogramOptions| LayoutKey::new(g, d, s, o).unwrap();
        let base = key(1, 2, &SizeBy::default(), &opts);
        assert_eq!(base, key(1, 2, &SizeBy::default(), &opts));
        assert_ne!(base, key(9, 2, &SizeBy::default(), &opts));
        assert_ne!(base, key(1, 9, &SizeBy::default(), &opts));
        assert_ne!(base, key(1, 2, &SizeBy::field("v"), &opts));
        let resized = CartogramOptions {
            size: [640.0, 480.0],
            ..opts.clone()
        };
        assert_ne!(base, key(1, 2, &SizeBy::default(), &resized));
        let mut looser = opts.clone();
        looser.simulation.link_distance = 12.0;
        assert_ne!(base, key(1, 2, &SizeBy::default(), &looser));
    }

    #[test]
    fn presentation_options_leave_the_layout_key_alone() {
        let opts = opts();
        let restyled = CartogramOptions {
            circle_padding: 2.0,
            circle_points: Some(64),
            max_segment_length: Some(1.0),
            path_precision: 1,
            label: LabelBy::Id,
            ..opts.clone()
        };
        let key = |o: &CartogramOptions| LayoutKey::new(1, 2, &SizeBy::default(), o).unwrap();
        assert_eq!(key(&opts), key(&restyled));

        let settled = settle(1, &opts);
        let base = SnapshotKey::new(&settled, 0, &opts);
        assert_ne!(base, SnapshotKey::new(&settled, 1, &opts));
        assert_ne!(base, SnapshotKey::new(&settled, 0, &restyled));
        assert_ne!(base, SnapshotKey::new(&settle(2, &opts), 0, &opts));
    }

    #[test]
    fn custom_accessors_compare_by_token() {
        let opts = opts();
        let a = SizeBy::custom(7, |_, _| 1.0);
        let b = SizeBy::custom(7, |_, _| 2.0);
        let c = SizeBy::custom(8, |_, _| 1.0);
        let key = |s: &SizeBy| LayoutKey::new(0, 0, s, &opts).unwrap();
        assert_eq!(key(&a), key(&b));
        assert_ne!(key(&a), key(&c));
        assert!(same_size_by(&a, &b));
        assert!(!same_size_by(&a, &c));
    }

    #[test]
    fn equal_digests_with_different_inputs_miss() {
        let opts = opts();
        let features = features();
        let stored = [DataRow::new("a").with("v", 1)];
        let other = [DataRow::new("a").with("v", 2)];
        let key = LayoutKey::new(1, 1, &SizeBy::default(), &opts).unwrap();

        let mut cache = LayoutCache::new();
        let first = cache
            .layout_or_try_insert_with(
                key,
                |_| true,
                |serial| {
                    let inputs = LayoutInputs::new(&features, &stored, &SizeBy::default(), &opts);
                    Ok((inputs, settle(serial, &opts)))
                },
            )
            .unwrap();
        let again = cache
            .layout_or_try_insert_with(
                key,
                |inputs| inputs.matches(&features, &stored, &SizeBy::default(), &opts),
                |_| panic!("identical inputs must hit"),
            )
            .unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let collided = cache
            .layout_or_try_insert_with(
                key,
                |inputs| inputs.matches(&features, &other, &SizeBy::default(), &opts),
                |serial| {
                    let inputs = LayoutInputs::new(&features, &other, &SizeBy::default(), &opts);
                    Ok((inputs, settle(serial, &opts)))
                },
            )
            .unwrap();
        assert_ne!(first.serial(), collided.serial());
        assert_eq!((cache.misses(), cache.hits()), (2, 1));
    }

    #[test]
    fn inputs_compare_features_by_content() {
        let opts = opts();
        let inputs = LayoutInputs::new(&features(), &[], &SizeBy::default(), &opts);
        assert!(inputs.matches(&features(), &[], &SizeBy::default(), &opts));
        let moved: Arc<[MapFeature]> = vec![MapFeature::new(
            "a",
            Geometry::Polygon(vec![vec![[1.0, 0.0], [4.0, 0.0], [4.0, 4.0], [1.0, 0.0]]]),
        )]
        .into();
        assert!(!inputs.matches(&moved, &[], &SizeBy::default(), &opts));
        assert!(!inputs.matches(&features(), &[], &SizeBy::Constant(3.0), &opts));
    }

    #[test]
    fn data_digest_sees_field_values() {
        let a = [DataRow::new("x").with("v", 1)];
        let b = [DataRow::new("x").with("v", 2)];
        assert_eq!(data_digest(&a), data_digest(&a.clone()));
        assert_ne!(data_digest(&a), data_digest(&b));
    }
}
