use crate::data::MergedRegion;
use dorling_morph::{StyleDict, StyleValue};
use std::fmt;
use std::sync::Arc;

pub type StyleFn = dyn Fn(&MergedRegion<'_>) -> StyleDict + Send + Sync;

/// `fill: gold, stroke: black`.
pub fn basic_style() -> StyleDict {
    let mut s = StyleDict::new();
    s.insert("fill".into(), StyleValue::from("gold"));
    s.insert("stroke".into(), StyleValue::from("black"));
    s
}

/// Style accessors for the two visual states.
#[derive(Clone)]
pub struct StyleAccessors {
    map: Arc<StyleFn>,
    circle: Arc<StyleFn>,
}

impl Default for StyleAccessors {
    fn default() -> Self {
        Self::uniform(|_| basic_style())
    }
}

impl fmt::Debug for StyleAccessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleAccessors").finish_non_exhaustive()
    }
}

impl StyleAccessors {
    pub fn new(
        map: impl Fn(&MergedRegion<'_>) -> StyleDict + Send + Sync + 'static,
        circle: impl Fn(&MergedRegion<'_>) -> StyleDict + Send + Sync + 'static,
    ) -> Self {
        Self {
            map: Arc::new(map),
            circle: Arc::new(circle),
        }
    }

    /// The same style in both states.
    pub fn uniform(f: impl Fn(&MergedRegion<'_>) -> StyleDict + Send + Sync + 'static) -> Self {
        let f: Arc<StyleFn> = Arc::new(f);
        Self {
            map: f.clone(),
            circle: f,
        }
    }

    /// Constant dictionaries for every region.
    pub fn fixed(map: StyleDict, circle: StyleDict) -> Self {
        Self::new(move |_| map.clone(), move |_| circle.clone())
    }

    pub fn map_style(&self, region: &MergedRegion<'_>) -> StyleDict {
        (self.map)(region)
    }

    pub fn circle_style(&self, region: &MergedRegion<'_>) -> StyleDict {
        (self.circle)(region)
    }
}
