use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{collision::Vec3, error::ControllerError};

/// Identifier of an interaction marker, unique within a building.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub String);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximitySettings {
    /// Markers closer than this (meters, 3D) can be targeted.
    pub radius: f32,
    /// Seconds a marker stays hidden after an interaction.
    pub interaction_cooldown: f32,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            radius: 2.0,
            interaction_cooldown: 5.0,
        }
    }
}

impl ProximitySettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.radius > 0.0) {
            return Err(ControllerError::invalid("proximity.radius", "must be positive"));
        }
        if !(self.interaction_cooldown >= 0.0) {
            return Err(ControllerError::invalid(
                "proximity.interaction_cooldown",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// A point of interest the player can interact with.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionMarker {
    pub id: MarkerId,
    /// Mission reference handed to the host on interaction.
    pub mission: String,
    pub position: Vec3,
    /// Remaining hidden time in seconds; visible at zero.
    hidden_for: f32,
}

impl InteractionMarker {
    pub fn new(id: impl Into<MarkerId>, mission: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            mission: mission.into(),
            position,
            hidden_for: 0.0,
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.hidden_for <= 0.0
    }

    pub fn hide(&mut self, seconds: f32) {
        self.hidden_for = seconds.max(0.0);
    }

    /// Count down the cooldown; returns true on the tick the marker reappears.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.hidden_for <= 0.0 {
            return false;
        }
        self.hidden_for -= dt.max(0.0);
        if self.hidden_for <= 0.0 {
            self.hidden_for = 0.0;
            return true;
        }
        false
    }
}

/// An interaction the host should act on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interaction {
    pub marker: MarkerId,
    pub mission: String,
}

/// Tracks which marker, if any, the player can currently interact with.
#[derive(Clone, Debug)]
pub struct ProximityTracker {
    settings: ProximitySettings,
    markers: Vec<InteractionMarker>,
    target: Option<usize>,
}

impl ProximityTracker {
    pub fn new(settings: ProximitySettings, markers: Vec<InteractionMarker>) -> Self {
        Self {
            settings,
            markers,
            target: None,
        }
    }

    #[inline]
    pub fn markers(&self) -> &[InteractionMarker] {
        &self.markers
    }

    pub fn target(&self) -> Option<&InteractionMarker> {
        self.target.and_then(|i| self.markers.get(i))
    }

    /// Replace the marker set. The current target is dropped without notification.
    pub fn set_markers(&mut self, markers: Vec<InteractionMarker>) {
        self.markers = markers;
        self.target = None;
    }

    /// Advance hidden-marker cooldowns by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for marker in &mut self.markers {
            if marker.advance(dt) {
                debug!("Marker {} visible again", marker.id);
            }
        }
    }

    /// Pick the nearest visible marker within range of `position`.
    ///
    /// Returns `Some(new_target)` when the target changed (including to `None`).
    pub fn update(&mut self, position: Vec3) -> Option<Option<MarkerId>> {
        let radius_sq = self.settings.radius * self.settings.radius;
        let nearest = self
            .markers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_visible())
            .map(|(i, m)| (i, (m.position - position).norm_squared()))
            .filter(|&(_, d)| d < radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);

        if nearest == self.target {
            return None;
        }
        self.target = nearest;
        let id = self.target().map(|m| m.id.clone());
        debug!("Interaction target changed: {:?}", id);
        Some(id)
    }

    /// Interact with the current target: hides it for the cooldown and clears the target.
    pub fn interact(&mut self) -> Option<Interaction> {
        let index = self.target.take()?;
        let marker = self.markers.get_mut(index)?;
        marker.hide(self.settings.interaction_cooldown);
        Some(Interaction {
            marker: marker.id.clone(),
            mission: marker.mission.clone(),
        })
    }
}
