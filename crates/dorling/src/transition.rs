//! Driving morphs over time.
//!
//! [`TransitionDriver`] is an explicit state machine (`Idle`, `Transitioning`, `Settled`). The
//! host's animation loop calls [`TransitionDriver::advance`] once per frame and draws the
//! returned [`Frame`]. A new request while a transition is running cancels it and starts from
//! whatever was drawn last, so interrupted morphs never jump to an endpoint.

use crate::cache::SnapshotKey;
use crate::error::Result;
use crate::options::{Easing, TransitionOptions};
use crate::region::Region;
use crate::snapshot::LayoutSnapshot;
use dorling_geo::{Point, Ring};
use dorling_morph::{MorphOptions, Shape, ShapeMorph, StyleDict, StyleMorph};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// True region outlines.
    #[default]
    Map,
    Circles,
}

/// Shared cancellation flag for one transition. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverState {
    /// Nothing shown yet, or the last transition was cancelled.
    Idle,
    /// `progress` is the eased progress of the last issued frame.
    Transitioning { progress: f64 },
    Settled,
}

/// What to draw for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub id: String,
    pub index: usize,
    pub path: String,
    pub style: StyleDict,
    pub label_anchor: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Mode being transitioned to.
    pub mode: Mode,
    /// Eased progress in `[0, 1]`.
    pub progress: f64,
    /// The last frame of a transition; paths are the settled ones (exact circles, outlines).
    pub terminal: bool,
    pub features: Vec<FeatureFrame>,
}

#[derive(Debug, Clone)]
pub enum TransitionStart {
    /// Settled without animation (zero duration, first display, or nothing to do). No frames
    /// will be issued for this request.
    Immediate(Frame),
    Started(CancelToken),
}

#[derive(Debug, Clone)]
pub enum Advance {
    Frame(Frame),
    /// The transition was cancelled through its token. Not an error.
    Cancelled,
    /// No transition is running.
    Idle,
}

/// One region as currently drawn.
#[derive(Debug, Clone, PartialEq)]
struct FeatureVisual {
    id: String,
    index: usize,
    parts: Vec<Ring>,
    path: String,
    style: StyleDict,
    anchor: Point,
}

impl FeatureVisual {
    fn settled(region: &Region, mode: Mode) -> Self {
        let parts = match mode {
            Mode::Map => region.outline_shape().parts.clone(),
            Mode::Circles => region.circle_shape().parts.clone(),
        };
        Self {
            id: region.id.clone(),
            index: region.index,
            parts,
            path: region.settled_path(mode).to_string(),
            style: region.style(mode).clone(),
            anchor: region.label_anchor(mode),
        }
    }

    fn frame(&self) -> FeatureFrame {
        FeatureFrame {
            id: self.id.clone(),
            index: self.index,
            path: self.path.clone(),
            style: self.style.clone(),
            label_anchor: self.anchor,
        }
    }
}

#[derive(Debug, Clone)]
struct FeatureTransition {
    /// `None` for regions with nothing to morph from; they show their target immediately.
    shape: Option<ShapeMorph>,
    style: StyleMorph,
    from_anchor: Point,
    target: FeatureVisual,
}

impl FeatureTransition {
    fn visual_at(&self, t: f64) -> FeatureVisual {
        let Some(shape) = &self.shape else {
            return self.target.clone();
        };
        FeatureVisual {
            id: self.target.id.clone(),
            index: self.target.index,
            parts: shape.parts_at(t),
            path: shape.path_at(t),
            style: self.style.at(t),
            anchor: self.from_anchor.lerp(self.target.anchor, t),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveTransition {
    key: SnapshotKey,
    mode: Mode,
    features: Vec<FeatureTransition>,
    duration: f64,
    easing: Easing,
    elapsed: f64,
    token: CancelToken,
}

#[derive(Debug, Clone)]
pub struct TransitionDriver {
    morph: MorphOptions,
    state: DriverState,
    mode: Mode,
    visual: Option<Vec<FeatureVisual>>,
    settled_on: Option<(SnapshotKey, Mode)>,
    active: Option<ActiveTransition>,
    frames_issued: u64,
}

impl Default for TransitionDriver {
    fn default() -> Self {
        Self::new(MorphOptions::default())
    }
}

impl TransitionDriver {
    pub fn new(morph: MorphOptions) -> Self {
        Self {
            morph,
            state: DriverState::Idle,
            mode: Mode::Map,
            visual: None,
            settled_on: None,
            active: None,
            frames_issued: 0,
        }
    }

    pub fn set_morph_options(&mut self, morph: MorphOptions) {
        self.morph = morph;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The mode shown, or being transitioned to.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Whether anything has been shown yet.
    pub fn has_shown(&self) -> bool {
        self.visual.is_some()
    }

    /// Frames returned by [`TransitionDriver::advance`] so far, over all transitions.
    pub fn frames_issued(&self) -> u64 {
        self.frames_issued
    }

    /// What is currently drawn.
    pub fn current(&self) -> Frame {
        let progress = match self.state {
            DriverState::Transitioning { progress } => progress,
            _ => 1.0,
        };
        Frame {
            mode: self.mode,
            progress,
            terminal: self.state == DriverState::Settled,
            features: self
                .visual
                .iter()
                .flatten()
                .map(FeatureVisual::frame)
                .collect(),
        }
    }

    /// Shows `snapshot` in `mode` right away, cancelling any running transition.
    pub fn show(&mut self, snapshot: &LayoutSnapshot, mode: Mode) -> Frame {
        self.cancel();
        let visual: Vec<FeatureVisual> = snapshot
            .regions()
            .iter()
            .map(|r| FeatureVisual::settled(r, mode))
            .collect();
        self.visual = Some(visual);
        self.mode = mode;
        self.settled_on = Some((snapshot.key().clone(), mode));
        self.set_state(DriverState::Settled);
        self.current()
    }

    /// Starts a transition from what is drawn now to `snapshot` in `mode`.
    ///
    /// A running transition is cancelled first. With nothing shown yet, with zero duration, or
    /// when `snapshot` is already settled in `mode`, the target is shown immediately.
    pub fn request(
        &mut self,
        snapshot: &LayoutSnapshot,
        mode: Mode,
        opts: &TransitionOptions,
    ) -> Result<TransitionStart> {
        let was_settled_on = if self.active.is_some() {
            None
        } else {
            self.settled_on.clone()
        };
        self.cancel();

        let instant = !self.has_shown()
            || !(opts.duration.is_finite() && opts.duration > 0.0)
            || was_settled_on
                .as_ref()
                .is_some_and(|(key, from)| key == snapshot.key() && *from == mode);
        if instant {
            return Ok(TransitionStart::Immediate(self.show(snapshot, mode)));
        }

        let reuse_region_morphs = was_settled_on
            .as_ref()
            .is_some_and(|(key, from)| key == snapshot.key() && *from != mode);
        let current: FxHashMap<&str, &FeatureVisual> = self
            .visual
            .iter()
            .flatten()
            .map(|v| (v.id.as_str(), v))
            .collect();

        let mut features = Vec::with_capacity(snapshot.len());
        for region in snapshot.regions() {
            let target = FeatureVisual::settled(region, mode);
            let Some(from) = current.get(region.id.as_str()) else {
                features.push(FeatureTransition {
                    shape: None,
                    style: StyleMorph::between(&target.style, &target.style),
                    from_anchor: target.anchor,
                    target,
                });
                continue;
            };
            let (shape, style) = if reuse_region_morphs {
                match mode {
                    Mode::Circles => (
                        region.shape_to_circle().clone(),
                        region.style_to_circle().clone(),
                    ),
                    Mode::Map => (
                        region.shape_to_circle().reversed(),
                        region.style_to_map().clone(),
                    ),
                }
            } else {
                let start = Shape::with_path(from.parts.clone(), from.path.clone());
                let end = match mode {
                    Mode::Map => region.outline_shape(),
                    Mode::Circles => region.circle_shape(),
                };
                (
                    ShapeMorph::between(&start, end, &self.morph)?,
                    StyleMorph::between(&from.style, &target.style),
                )
            };
            features.push(FeatureTransition {
                shape: Some(shape),
                style,
                from_anchor: from.anchor,
                target,
            });
        }

        let token = CancelToken::new();
        self.active = Some(ActiveTransition {
            key: snapshot.key().clone(),
            mode,
            features,
            duration: opts.duration,
            easing: opts.easing,
            elapsed: 0.0,
            token: token.clone(),
        });
        self.mode = mode;
        self.settled_on = None;
        self.set_state(DriverState::Transitioning { progress: 0.0 });
        Ok(TransitionStart::Started(token))
    }

    /// Advances the running transition by `dt` seconds and returns the frame to draw.
    pub fn advance(&mut self, dt: f64) -> Advance {
        let Some(active) = self.active.as_mut() else {
            return Advance::Idle;
        };
        if dt.is_finite() && dt > 0.0 {
            active.elapsed += dt;
        }
        let raw = active.elapsed / active.duration;
        self.step(raw)
    }

    /// Jumps the running transition to raw (un-eased) progress `t`.
    pub fn advance_to(&mut self, t: f64) -> Advance {
        let Some(active) = self.active.as_mut() else {
            return Advance::Idle;
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        active.elapsed = t * active.duration;
        self.step(t)
    }

    /// Stops the running transition where it is. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.token.cancel();
        self.set_state(DriverState::Idle);
        true
    }

    fn step(&mut self, raw: f64) -> Advance {
        let Some(active) = self.active.as_ref() else {
            return Advance::Idle;
        };
        if active.token.is_cancelled() {
            self.active = None;
            self.set_state(DriverState::Idle);
            return Advance::Cancelled;
        }

        self.frames_issued += 1;
        if raw >= 1.0 {
            let Some(active) = self.active.take() else {
                return Advance::Idle;
            };
            let visual: Vec<FeatureVisual> =
                active.features.into_iter().map(|f| f.target).collect();
            self.visual = Some(visual);
            self.settled_on = Some((active.key, active.mode));
            self.set_state(DriverState::Settled);
            return Advance::Frame(self.current());
        }

        let t = active.easing.apply(raw);
        let visual: Vec<FeatureVisual> = active.features.iter().map(|f| f.visual_at(t)).collect();
        let mode = active.mode;
        self.visual = Some(visual);
        self.set_state(DriverState::Transitioning { progress: t });
        Advance::Frame(Frame {
            mode,
            progress: t,
            terminal: false,
            features: self
                .visual
                .iter()
                .flatten()
                .map(FeatureVisual::frame)
                .collect(),
        })
    }

    fn set_state(&mut self, state: DriverState) {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&state) {
            tracing::trace!(from = ?self.state, to = ?state, "transition state");
        }
        self.state = state;
    }
}
