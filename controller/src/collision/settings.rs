/*!
Collision probe settings and tolerances.

These constants centralize the parameters used by the wall, ground and camera
probes. [`ProbeSettings`] carries them at runtime so a building catalog can
override them; its defaults are the constants below.

Notes
- Distances are in meters.
- The probes are heuristics over rays, not a swept volume. Values here trade
  robustness against thin geometry for cost.
*/

use serde::{Deserialize, Serialize};

use crate::constants::CELL_SIZE;
use crate::error::ControllerError;

/// Height above the player's feet the wall probe is cast from (meters).
/// Chest height clears stair risers and low trim while still catching walls.
pub const CHEST_HEIGHT: f32 = 1.0;

/// Largest |normal.y| a surface may have and still count as a wall.
/// Floors, ceilings and steep ramps above this are never walls.
pub const WALL_NORMAL_MAX_Y: f32 = 0.5;

/// How far above the player the ground ray starts (meters).
pub const GROUND_PROBE_LIFT: f32 = 5.0;

/// Length of the downward ground ray (meters).
pub const GROUND_PROBE_RANGE: f32 = 10.0;

/// Highest a ground hit may be above the player's feet to be accepted (meters).
/// Anything higher is a floor above, not a step.
pub const STEP_TOLERANCE: f32 = 1.5;

/// Ground height reported when no acceptable ground is found.
pub const DEFAULT_GROUND_HEIGHT: f32 = 0.0;

/// Distance kept between an occluded camera and the occluding surface (meters).
pub const CAMERA_MARGIN: f32 = 0.3;

/// Closest an occluded camera is pulled toward its target (meters).
pub const CAMERA_MIN_DISTANCE: f32 = 0.5;

/// Runtime parameters for [`super::CollisionScene`] queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub chest_height: f32,
    pub wall_normal_max_y: f32,
    pub ground_probe_lift: f32,
    pub ground_probe_range: f32,
    pub step_tolerance: f32,
    pub default_ground_height: f32,
    pub camera_margin: f32,
    pub camera_min_distance: f32,
    /// Horizontal size of spatial index cells.
    pub cell_size: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            chest_height: CHEST_HEIGHT,
            wall_normal_max_y: WALL_NORMAL_MAX_Y,
            ground_probe_lift: GROUND_PROBE_LIFT,
            ground_probe_range: GROUND_PROBE_RANGE,
            step_tolerance: STEP_TOLERANCE,
            default_ground_height: DEFAULT_GROUND_HEIGHT,
            camera_margin: CAMERA_MARGIN,
            camera_min_distance: CAMERA_MIN_DISTANCE,
            cell_size: CELL_SIZE,
        }
    }
}

impl ProbeSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.cell_size > 0.0) {
            return Err(ControllerError::invalid("probe.cell_size", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.wall_normal_max_y) {
            return Err(ControllerError::invalid(
                "probe.wall_normal_max_y",
                "must be within [0, 1]",
            ));
        }
        if !(self.ground_probe_range > 0.0) {
            return Err(ControllerError::invalid(
                "probe.ground_probe_range",
                "must be positive",
            ));
        }
        if self.camera_margin < 0.0 || self.camera_min_distance < 0.0 {
            return Err(ControllerError::invalid(
                "probe.camera_margin",
                "camera distances must not be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ProbeSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        let settings = ProbeSettings {
            cell_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ControllerError::InvalidSetting {
                name: "probe.cell_size",
                ..
            })
        ));
    }
}
