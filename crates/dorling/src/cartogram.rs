use crate::cache::{LayoutCache, LayoutInputs, LayoutKey, SnapshotKey, data_digest, geometry_digest};
use crate::data::{DataRow, SizeBy};
use crate::error::Result;
use crate::options::{CartogramOptions, TransitionOptions};
use crate::settled::SettledLayout;
use crate::snapshot::LayoutSnapshot;
use crate::styles::StyleAccessors;
use crate::transition::{Advance, Frame, Mode, TransitionDriver, TransitionStart};
use dorling_geo::{HitRegions, MapFeature, Point, PreparedMap, Size, preprocess};
use std::sync::Arc;

/// A map that can be shown as outlines or as a Dorling cartogram, and animated between them.
///
/// Inputs are set through the `set_*` methods. Layout is lazy: nothing is computed until a
/// snapshot, a display, or a mode change is requested. Once something is shown, changing an
/// input transitions the display to the new layout in the current mode.
#[derive(Debug)]
pub struct Cartogram {
    features: Arc<[MapFeature]>,
    map: PreparedMap,
    geometry_digest: u64,
    data: Vec<DataRow>,
    data_digest: u64,
    size_by: SizeBy,
    styles: StyleAccessors,
    style_generation: u64,
    options: CartogramOptions,
    transition: TransitionOptions,
    cache: LayoutCache,
    driver: TransitionDriver,
    mode: Mode,
}

impl Cartogram {
    pub fn new(features: Vec<MapFeature>, options: CartogramOptions) -> Result<Self> {
        let features: Arc<[MapFeature]> = features.into();
        let map = prepare(&features, &options)?;
        tracing::debug!(
            regions = map.len(),
            edges = map.edges.len(),
            "map preprocessed"
        );
        Ok(Self {
            geometry_digest: geometry_digest(&features),
            features,
            map,
            data: Vec::new(),
            data_digest: data_digest(&[]),
            size_by: SizeBy::default(),
            styles: StyleAccessors::default(),
            style_generation: 0,
            driver: TransitionDriver::new(options.morph()),
            options,
            transition: TransitionOptions::default(),
            cache: LayoutCache::new(),
            mode: Mode::Map,
        })
    }

    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    pub fn map(&self) -> &PreparedMap {
        &self.map
    }

    pub fn data(&self) -> &[DataRow] {
        &self.data
    }

    pub fn options(&self) -> &CartogramOptions {
        &self.options
    }

    pub fn transition(&self) -> TransitionOptions {
        self.transition
    }

    /// The mode shown, or being transitioned to.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn driver(&self) -> &TransitionDriver {
        &self.driver
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    pub fn set_transition(&mut self, transition: TransitionOptions) {
        self.transition = transition;
    }

    pub fn set_data(&mut self, data: Vec<DataRow>) -> Result<Option<TransitionStart>> {
        self.data_digest = data_digest(&data);
        self.data = data;
        self.relayout()
    }

    pub fn set_size_by(&mut self, size_by: SizeBy) -> Result<Option<TransitionStart>> {
        self.size_by = size_by;
        self.relayout()
    }

    /// Style accessors are opaque, so every call counts as a change.
    pub fn set_styles(&mut self, styles: StyleAccessors) -> Result<Option<TransitionStart>> {
        self.styles = styles;
        self.style_generation += 1;
        self.relayout()
    }

    /// Resizes the canvas. Outlines are re-projected for the new size.
    pub fn set_size(&mut self, size: Size) -> Result<Option<TransitionStart>> {
        let options = CartogramOptions {
            size: [size.width, size.height],
            ..self.options.clone()
        };
        self.set_options(options)
    }

    /// Replaces all options. The map is re-projected only when the canvas, projection or
    /// precision changed.
    pub fn set_options(&mut self, options: CartogramOptions) -> Result<Option<TransitionStart>> {
        let reproject = options.size != self.options.size
            || options.projection != self.options.projection
            || options.path_precision != self.options.path_precision;
        if reproject {
            self.map = prepare(&self.features, &options)?;
        }
        self.driver.set_morph_options(options.morph());
        self.options = options;
        self.relayout()
    }

    /// The snapshot for the current inputs. The layout runs at most once per distinct set of
    /// layout inputs; style, padding and label changes only rebuild the regions on top of it.
    pub fn snapshot(&mut self) -> Result<Arc<LayoutSnapshot>> {
        let key = LayoutKey::new(
            self.geometry_digest,
            self.data_digest,
            &self.size_by,
            &self.options,
        )?;
        let Self {
            features,
            map,
            data,
            size_by,
            styles,
            style_generation,
            options,
            cache,
            ..
        } = self;
        let layout = cache.layout_or_try_insert_with(
            key,
            |stored| stored.matches(features, data, size_by, options),
            |serial| {
                let settled = SettledLayout::settle(serial, map, data, size_by, options)?;
                Ok((LayoutInputs::new(features, data, size_by, options), settled))
            },
        )?;
        let key = SnapshotKey::new(&layout, *style_generation, options);
        cache.snapshot_or_try_insert_with(key, |key| {
            LayoutSnapshot::build(key, layout, map, data, styles, options)
        })
    }

    /// Shows the current layout in the current mode without animating.
    pub fn show(&mut self) -> Result<Frame> {
        let snapshot = self.snapshot()?;
        Ok(self.driver.show(&snapshot, self.mode))
    }

    /// Switches between outlines and circles. The first display is immediate. On error the
    /// mode is left unchanged.
    pub fn set_mode(&mut self, mode: Mode) -> Result<TransitionStart> {
        let snapshot = self.snapshot()?;
        let start = self.driver.request(&snapshot, mode, &self.transition)?;
        self.mode = mode;
        Ok(start)
    }

    pub fn advance(&mut self, dt: f64) -> Advance {
        self.driver.advance(dt)
    }

    pub fn advance_to(&mut self, t: f64) -> Advance {
        self.driver.advance_to(t)
    }

    pub fn cancel(&mut self) -> bool {
        self.driver.cancel()
    }

    /// What is drawn right now.
    pub fn current(&self) -> Frame {
        self.driver.current()
    }

    /// Voronoi cells of the current layout, index-aligned with the regions.
    pub fn hit_regions(&mut self) -> Result<HitRegions> {
        Ok(self.snapshot()?.hit_regions().clone())
    }

    /// Index of the region whose hit cell contains `p`.
    pub fn hit_test(&mut self, p: Point) -> Result<Option<usize>> {
        Ok(self.snapshot()?.hit_regions().locate(p))
    }

    fn relayout(&mut self) -> Result<Option<TransitionStart>> {
        if !self.driver.has_shown() {
            return Ok(None);
        }
        let snapshot = self.snapshot()?;
        self.driver
            .request(&snapshot, self.mode, &self.transition)
            .map(Some)
    }
}

fn prepare(features: &[MapFeature], options: &CartogramOptions) -> Result<PreparedMap> {
    Ok(preprocess(
        features,
        options.canvas(),
        options.projection,
        options.path_precision,
    )?)
}
