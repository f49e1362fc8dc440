/*!
Motion-state classification and animation clip selection.

Clip names are matched once, when the host hands over its clip list, into a
[`ClipTable`]. Per tick the controller classifies a [`MotionState`] and the
[`AnimationSelector`] turns it into a cross-fade request when the clip to play
changes. Hosts without a native blend mixer can drive [`CrossFade`] for weights.
*/

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::ControllerError, input::IntentFlags};

/// Locomotion state derived each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionState {
    Idle,
    Walk,
    Run,
    ClimbingStairs,
}

impl MotionState {
    const COUNT: usize = 4;

    /// Classify from intent and `target_height - current_height`.
    ///
    /// Climbing takes priority over running, running over walking.
    pub fn classify(intent: &IntentFlags, height_gap: f32, climb_threshold: f32) -> Self {
        if !intent.is_moving() {
            return MotionState::Idle;
        }
        if height_gap > climb_threshold {
            MotionState::ClimbingStairs
        } else if intent.sprint {
            MotionState::Run
        } else {
            MotionState::Walk
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            MotionState::Idle => 0,
            MotionState::Walk => 1,
            MotionState::Run => 2,
            MotionState::ClimbingStairs => 3,
        }
    }
}

/// Map a clip name to the state it animates, by case-insensitive keyword.
///
/// Keywords are checked in order: `idle`, `run`, `walk`, then `ascend`/`stair`/`climb`.
/// Turn-in-place clips and anything unrecognized map to `None`.
pub fn classify_clip_name(name: &str) -> Option<MotionState> {
    let lower = name.to_ascii_lowercase();
    if lower.contains("turn") {
        return None;
    }
    if lower.contains("idle") {
        Some(MotionState::Idle)
    } else if lower.contains("run") {
        Some(MotionState::Run)
    } else if lower.contains("walk") {
        Some(MotionState::Walk)
    } else if ["ascend", "stair", "climb"].iter().any(|k| lower.contains(k)) {
        Some(MotionState::ClimbingStairs)
    } else {
        None
    }
}

/// Index of a clip in the host's clip list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(pub usize);

/// Motion state to clip lookup, resolved once at load time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClipTable {
    clips: [Option<ClipId>; MotionState::COUNT],
}

impl ClipTable {
    /// Build from clip names in host order. The first clip matching a state wins.
    pub fn from_clip_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for (i, name) in names.into_iter().enumerate() {
            if let Some(state) = classify_clip_name(name.as_ref()) {
                table.clips[state.slot()].get_or_insert(ClipId(i));
            }
        }
        table
    }

    pub fn with_clip(mut self, state: MotionState, clip: ClipId) -> Self {
        self.clips[state.slot()] = Some(clip);
        self
    }

    #[inline]
    pub fn get(&self, state: MotionState) -> Option<ClipId> {
        self.clips[state.slot()]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clips.iter().all(Option::is_none)
    }

    /// Clip to play for `state`, falling back to a similar moving state.
    ///
    /// Climbing falls back to running while sprinting and otherwise to walking;
    /// running falls back to walking. Idle has no fallback.
    pub fn resolve(&self, state: MotionState, sprinting: bool) -> Option<(MotionState, ClipId)> {
        let chain: &[MotionState] = match state {
            MotionState::ClimbingStairs if sprinting => &[
                MotionState::ClimbingStairs,
                MotionState::Run,
                MotionState::Walk,
            ],
            MotionState::ClimbingStairs => &[MotionState::ClimbingStairs, MotionState::Walk],
            MotionState::Run => &[MotionState::Run, MotionState::Walk],
            MotionState::Walk => &[MotionState::Walk],
            MotionState::Idle => &[MotionState::Idle],
        };
        chain
            .iter()
            .find_map(|&s| self.get(s).map(|clip| (s, clip)))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Cross-fade duration in seconds.
    pub fade_seconds: f32,
    /// Height gap (meters) above which moving counts as climbing.
    pub climb_threshold: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            fade_seconds: 0.2,
            climb_threshold: 0.1,
        }
    }
}

impl AnimationSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.fade_seconds >= 0.0) {
            return Err(ControllerError::invalid(
                "animation.fade_seconds",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// A requested clip change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationTransition {
    /// Clip to fade out, if one was playing.
    pub from: Option<ClipId>,
    /// Clip to restart and fade in.
    pub to: ClipId,
    /// State the new clip was resolved for, after fallback.
    pub state: MotionState,
    pub fade_seconds: f32,
}

/// Chooses the clip for each tick's motion state.
#[derive(Clone, Debug)]
pub struct AnimationSelector {
    settings: AnimationSettings,
    table: ClipTable,
    current: Option<ClipId>,
}

impl AnimationSelector {
    pub fn new(settings: AnimationSettings, table: ClipTable) -> Self {
        Self {
            settings,
            table,
            current: None,
        }
    }

    #[inline]
    pub fn current(&self) -> Option<ClipId> {
        self.current
    }

    #[inline]
    pub fn table(&self) -> &ClipTable {
        &self.table
    }

    /// Install a new clip table; the next selection fades in from nothing.
    pub fn set_table(&mut self, table: ClipTable) {
        self.table = table;
        self.current = None;
    }

    /// Returns a transition when the clip for `motion` differs from the one playing.
    /// With no usable clip the current one keeps playing.
    pub fn select(&mut self, motion: MotionState, sprinting: bool) -> Option<AnimationTransition> {
        let (state, clip) = self.table.resolve(motion, sprinting)?;
        if self.current == Some(clip) {
            return None;
        }

        let transition = AnimationTransition {
            from: self.current,
            to: clip,
            state,
            fade_seconds: self.settings.fade_seconds,
        };
        debug!(
            "Animation {:?} -> {:?} ({:?})",
            transition.from, transition.to, state
        );
        self.current = Some(clip);
        Some(transition)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Layer {
    clip: ClipId,
    weight: f32,
    /// Weight change per second; negative while fading out.
    rate: f32,
}

/// Per-clip blend weights for hosts that mix clips themselves.
#[derive(Clone, Debug, Default)]
pub struct CrossFade {
    layers: Vec<Layer>,
}

impl CrossFade {
    /// Start a transition: every playing clip fades out, `to` restarts from zero weight
    /// and fades in. The first clip ever started plays at full weight.
    pub fn start(&mut self, transition: &AnimationTransition) {
        if self.layers.is_empty() || transition.fade_seconds <= 0.0 {
            self.layers.clear();
            self.layers.push(Layer {
                clip: transition.to,
                weight: 1.0,
                rate: 0.0,
            });
            return;
        }

        let rate = 1.0 / transition.fade_seconds;
        self.layers.retain(|l| l.clip != transition.to);
        for layer in &mut self.layers {
            layer.rate = -rate;
        }
        self.layers.push(Layer {
            clip: transition.to,
            weight: 0.0,
            rate,
        });
    }

    /// Advance fades by `dt` seconds and drop fully faded-out clips.
    pub fn advance(&mut self, dt: f32) {
        for layer in &mut self.layers {
            layer.weight = (layer.weight + layer.rate * dt).clamp(0.0, 1.0);
            if layer.weight >= 1.0 {
                layer.rate = 0.0;
            }
        }
        self.layers.retain(|l| !(l.rate < 0.0 && l.weight <= 0.0));
    }

    /// Current weight of `clip`, zero when not playing.
    pub fn weight(&self, clip: ClipId) -> f32 {
        self.layers
            .iter()
            .find(|l| l.clip == clip)
            .map_or(0.0, |l| l.weight)
    }

    /// `(clip, weight)` for every clip still contributing.
    pub fn weights(&self) -> impl Iterator<Item = (ClipId, f32)> + '_ {
        self.layers.iter().map(|l| (l.clip, l.weight))
    }

    #[inline]
    pub fn is_blending(&self) -> bool {
        self.layers.iter().any(|l| l.rate != 0.0)
    }
}
