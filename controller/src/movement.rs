use serde::{Deserialize, Serialize};

use crate::{
    collision::{CollisionProbe, Vec3},
    error::ControllerError,
    input::IntentFlags,
    motion::{desired_direction, desired_translation},
    utils::{approach, shortest_angle_delta, wrap_angle, yaw_from_xz},
};

/// Axis components smaller than this are not applied or probed (meters).
const AXIS_EPS: f32 = 1.0e-6;

/// Tunables for [`step_movement`]. Distances in meters, fractions per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Planar distance covered per tick while walking.
    pub speed: f32,
    /// Multiplier applied to `speed` while sprint is held.
    pub sprint_multiplier: f32,
    /// Reach of the per-axis wall probe.
    pub wall_probe_distance: f32,
    /// Fraction of the remaining turn applied per tick.
    pub turn_fraction: f32,
    /// Fraction of the remaining height gap closed per tick.
    pub height_smoothing: f32,
    /// Height gaps at or above this freeze vertical tracking instead of stepping.
    pub max_height_step: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            speed: 0.12,
            sprint_multiplier: 2.0,
            wall_probe_distance: 0.6,
            turn_fraction: 0.15,
            height_smoothing: 0.15,
            max_height_step: 2.0,
        }
    }
}

impl MovementSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.speed > 0.0) {
            return Err(ControllerError::invalid("movement.speed", "must be positive"));
        }
        if !(self.sprint_multiplier >= 1.0) {
            return Err(ControllerError::invalid(
                "movement.sprint_multiplier",
                "must be at least 1",
            ));
        }
        if !(self.wall_probe_distance > 0.0) {
            return Err(ControllerError::invalid(
                "movement.wall_probe_distance",
                "must be positive",
            ));
        }
        for (name, value) in [
            ("movement.turn_fraction", self.turn_fraction),
            ("movement.height_smoothing", self.height_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ControllerError::invalid(name, "must be within (0, 1]"));
            }
        }
        if !(self.max_height_step > 0.0) {
            return Err(ControllerError::invalid(
                "movement.max_height_step",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Mutable per-session player record.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Feet position in world space. `position.y` always equals `current_height`
    /// after a tick.
    pub position: Vec3,
    /// Facing about +Y; yaw 0 faces +Z.
    pub yaw: f32,
    pub intent: IntentFlags,
    pub speed: f32,
    pub sprint_multiplier: f32,
    /// Smoothed ground-following height.
    pub current_height: f32,
    /// Latest ground probe result.
    pub target_height: f32,
}

impl PlayerState {
    pub fn new(position: Vec3, settings: &MovementSettings) -> Self {
        Self {
            position,
            yaw: 0.0,
            intent: IntentFlags::default(),
            speed: settings.speed,
            sprint_multiplier: settings.sprint_multiplier,
            current_height: position.y,
            target_height: position.y,
        }
    }

    /// Place the player at `target` immediately, resetting vertical tracking and intent.
    pub fn teleport(&mut self, target: Vec3) {
        self.position = target;
        self.current_height = target.y;
        self.target_height = target.y;
        self.intent.clear();
    }

    /// `target_height - current_height`; positive while stepping up.
    #[inline]
    pub fn height_gap(&self) -> f32 {
        self.target_height - self.current_height
    }
}

/// Output of a single [`step_movement`] tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepMovementResult {
    /// Planar displacement actually applied this tick.
    pub applied: Vec3,
    /// Planar displacement requested by intent, before wall gating.
    pub desired: Vec3,
    pub blocked_x: bool,
    pub blocked_z: bool,
    /// Vertical tracking was skipped because the ground jumped too far.
    pub height_frozen: bool,
}

/// Advance `player` by one tick of intent-driven movement.
///
/// Behavior
/// - Builds the desired displacement from intent relative to `camera_yaw`.
/// - Applies X then Z separately, each gated by a wall probe along that axis, so a
///   diagonal push into a wall slides along it.
/// - Turns toward the direction of intended motion by a fraction of the shortest arc.
/// - Re-probes the ground at the new position and eases `current_height` toward it,
///   unless the gap reaches `max_height_step`.
pub fn step_movement<P: CollisionProbe + ?Sized>(
    probe: &P,
    player: &mut PlayerState,
    camera_yaw: f32,
    settings: &MovementSettings,
) -> StepMovementResult {
    let mut result = StepMovementResult {
        desired: desired_translation(
            camera_yaw,
            &player.intent,
            player.speed,
            player.sprint_multiplier,
        ),
        ..Default::default()
    };

    // 1) Per-axis gated translation.
    let dx = result.desired.x;
    if dx.abs() > AXIS_EPS {
        let axis = Vec3::new(dx.signum(), 0.0, 0.0);
        if probe.is_wall_ahead(player.position, axis, settings.wall_probe_distance) {
            result.blocked_x = true;
        } else {
            player.position.x += dx;
            result.applied.x = dx;
        }
    }

    let dz = result.desired.z;
    if dz.abs() > AXIS_EPS {
        let axis = Vec3::new(0.0, 0.0, dz.signum());
        if probe.is_wall_ahead(player.position, axis, settings.wall_probe_distance) {
            result.blocked_z = true;
        } else {
            player.position.z += dz;
            result.applied.z = dz;
        }
    }

    // 2) Facing follows intended motion, not the slid result.
    if let Some(dir) = desired_direction(camera_yaw, &player.intent) {
        if let Some(target_yaw) = yaw_from_xz(dir.x, dir.z) {
            let delta = shortest_angle_delta(player.yaw, target_yaw);
            player.yaw = wrap_angle(player.yaw + delta * settings.turn_fraction);
        }
    }

    // 3) Ground following.
    player.target_height = probe.ground_height(player.position);
    if player.height_gap().abs() < settings.max_height_step {
        player.current_height = approach(
            player.current_height,
            player.target_height,
            settings.height_smoothing,
        );
    } else {
        result.height_frozen = true;
    }
    player.position.y = player.current_height;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionMesh, CollisionScene};

    /// Probe with scripted answers.
    struct FixedProbe {
        ground: f32,
        wall_on_x: bool,
        wall_on_z: bool,
    }

    impl CollisionProbe for FixedProbe {
        fn is_wall_ahead(&self, _position: Vec3, direction: Vec3, _max_distance: f32) -> bool {
            (self.wall_on_x && direction.x != 0.0) || (self.wall_on_z && direction.z != 0.0)
        }

        fn ground_height(&self, _position: Vec3) -> f32 {
            self.ground
        }

        fn camera_occlusion(&self, _origin: Vec3, ideal: Vec3) -> Vec3 {
            ideal
        }
    }

    fn open_ground(ground: f32) -> FixedProbe {
        FixedProbe {
            ground,
            wall_on_x: false,
            wall_on_z: false,
        }
    }

    #[test]
    fn forward_tick_in_empty_world() {
        let settings = MovementSettings::default();
        let scene = CollisionScene::default();
        let mut player = PlayerState::new(Vec3::zeros(), &settings);
        player.intent.forward = true;

        step_movement(&scene, &mut player, 0.0, &settings);

        assert!(player.position.x.abs() < 1.0e-6);
        assert!(player.position.y.abs() < 1.0e-6);
        assert!((player.position.z + 0.12).abs() < 1.0e-6);
        assert_eq!(player.current_height, 0.0);
    }

    #[test]
    fn height_moves_by_fixed_fraction() {
        let settings = MovementSettings::default();
        let mut player = PlayerState::new(Vec3::zeros(), &settings);

        step_movement(&open_ground(1.9), &mut player, 0.0, &settings);

        assert!((player.current_height - 0.285).abs() < 1.0e-6);
        assert_eq!(player.target_height, 1.9);
        assert_eq!(player.position.y, player.current_height);
    }

    #[test]
    fn large_ground_jump_freezes_vertical_tracking() {
        let settings = MovementSettings::default();
        let mut player = PlayerState::new(Vec3::new(0.0, 4.0, 0.0), &settings);

        let result = step_movement(&open_ground(0.0), &mut player, 0.0, &settings);

        assert!(result.height_frozen);
        assert_eq!(player.current_height, 4.0);
        assert_eq!(player.position.y, 4.0);
    }

    #[test]
    fn diagonal_into_x_wall_slides_along_z() {
        let settings = MovementSettings::default();
        let probe = FixedProbe {
            ground: 0.0,
            wall_on_x: true,
            wall_on_z: false,
        };
        let mut player = PlayerState::new(Vec3::zeros(), &settings);
        player.intent.forward = true;
        player.intent.right = true;

        let result = step_movement(&probe, &mut player, 0.0, &settings);

        assert!(result.blocked_x);
        assert_eq!(result.applied.x, 0.0);
        assert!(result.applied.z < 0.0);
        assert_eq!(player.position.x, 0.0);
        assert!(player.position.z < 0.0);
    }

    #[test]
    fn diagonal_slides_along_real_wall_geometry() {
        let settings = MovementSettings::default();
        let mut scene = CollisionScene::default();
        // Wall face at x = 0.5, spanning z in [-5, 5].
        scene.build(vec![
            CollisionMesh::cuboid(Vec3::new(0.75, 1.5, 0.0), Vec3::new(0.25, 1.5, 5.0)).unwrap(),
        ]);
        let mut player = PlayerState::new(Vec3::new(0.0, 0.0, 0.3), &settings);
        player.intent.forward = true;
        player.intent.right = true;

        let result = step_movement(&scene, &mut player, 0.0, &settings);

        assert!(result.blocked_x);
        assert_eq!(player.position.x, 0.0);
        assert!(player.position.z < 0.3);
    }

    #[test]
    fn turns_a_fraction_toward_motion() {
        let settings = MovementSettings::default();
        let mut player = PlayerState::new(Vec3::zeros(), &settings);
        player.intent.forward = true;

        // Camera yaw 0 moves toward -Z, whose facing yaw is PI.
        step_movement(&open_ground(0.0), &mut player, 0.0, &settings);
        assert!((player.yaw.abs() - 0.15 * std::f32::consts::PI).abs() < 1.0e-4);
    }

    #[test]
    fn idle_does_not_turn() {
        let settings = MovementSettings::default();
        let mut player = PlayerState::new(Vec3::zeros(), &settings);
        player.yaw = 1.0;

        let result = step_movement(&open_ground(0.0), &mut player, 2.0, &settings);

        assert_eq!(player.yaw, 1.0);
        assert_eq!(result.applied, Vec3::zeros());
    }

    #[test]
    fn teleport_resets_heights_and_intent() {
        let settings = MovementSettings::default();
        let mut player = PlayerState::new(Vec3::zeros(), &settings);
        player.intent.forward = true;
        player.intent.sprint = true;
        player.target_height = 3.0;

        player.teleport(Vec3::new(-4.3, 7.1, -6.1));

        assert_eq!(player.position, Vec3::new(-4.3, 7.1, -6.1));
        assert_eq!(player.current_height, 7.1);
        assert_eq!(player.target_height, 7.1);
        assert!(player.intent.is_empty());
    }

    #[test]
    fn default_settings_validate() {
        assert!(MovementSettings::default().validate().is_ok());
        let bad = MovementSettings {
            height_smoothing: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
