use crate::error::{Error, Result};
use crate::feature::{Geometry, Position};
use crate::geom::{Point, Size, Vector, bounds, point, validate_size, vector};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Web Mercator's latitude limit; beyond it the raw projection diverges.
const MERCATOR_MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Raw (unscaled) projections. Geographic projections map longitude/latitude in degrees and flip
/// the y axis so north is up on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Projection {
    #[default]
    Mercator,
    Equirectangular,
    /// Coordinates are already planar screen coordinates.
    Identity,
}

impl Projection {
    pub fn raw(self, p: Position) -> Point {
        match self {
            Self::Mercator => {
                let lambda = p[0].to_radians();
                let phi = p[1]
                    .clamp(-MERCATOR_MAX_LATITUDE, MERCATOR_MAX_LATITUDE)
                    .to_radians();
                point(lambda, -(FRAC_PI_4 + phi / 2.0).tan().ln())
            }
            Self::Equirectangular => point(p[0].to_radians(), -p[1].to_radians()),
            Self::Identity => point(p[0], p[1]),
        }
    }
}

/// A projection scaled and translated so a set of geometries fills a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedProjection {
    pub projection: Projection,
    pub scale: f64,
    pub translate: Vector,
}

impl FittedProjection {
    /// Fits the union of `geometries` into `[0, 0]..[width, height]`.
    ///
    /// One uniform scale is used for both axes: the constraining axis is filled exactly and the
    /// other axis is centered.
    pub fn fit_extent<'a>(
        projection: Projection,
        size: Size,
        geometries: impl IntoIterator<Item = &'a Geometry>,
    ) -> Result<Self> {
        validate_size(size)?;

        let raw: Vec<Point> = geometries
            .into_iter()
            .flat_map(Geometry::positions)
            .map(|p| projection.raw(*p))
            .collect();
        let b = bounds(&raw).ok_or(Error::DegenerateExtent)?;

        let bw = b.width();
        let bh = b.height();
        let kx = if bw > 0.0 { size.width / bw } else { f64::INFINITY };
        let ky = if bh > 0.0 { size.height / bh } else { f64::INFINITY };
        let scale = kx.min(ky);
        if !scale.is_finite() {
            return Err(Error::DegenerateExtent);
        }

        let tx = (size.width - scale * (b.min.x + b.max.x)) / 2.0;
        let ty = (size.height - scale * (b.min.y + b.max.y)) / 2.0;
        Ok(Self {
            projection,
            scale,
            translate: vector(tx, ty),
        })
    }

    pub fn project(&self, p: Position) -> Point {
        let r = self.projection.raw(p);
        point(
            r.x * self.scale + self.translate.x,
            r.y * self.scale + self.translate.y,
        )
    }
}
