use serde::{Deserialize, Serialize};

use crate::{
    collision::{CollisionProbe, Quat, Vec3},
    error::ControllerError,
    utils::wrap_angle,
};

/// Third-person rig tunables. Angles in radians, distances in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Initial horizontal distance from the look-at point.
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Camera height above the look-at point at zero pitch.
    pub height: f32,
    /// Look-at point height above the player's feet.
    pub target_height: f32,
    /// Fraction of the remaining gap the camera closes per tick.
    pub smoothing: f32,
    pub initial_pitch: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Radians per pixel of pointer movement.
    pub look_sensitivity: f32,
    /// Distance per unit of scroll.
    pub zoom_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 1.85,
            // Below the default distance, so zooming back in can return to 1.85.
            // A floor of 2.0 would push the camera out on the first scroll.
            min_distance: 1.5,
            max_distance: 10.0,
            height: 1.3,
            target_height: 1.2,
            smoothing: 0.5,
            initial_pitch: 0.1,
            min_pitch: -0.4,
            max_pitch: 0.4,
            look_sensitivity: 0.002,
            zoom_sensitivity: 0.01,
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.min_distance > 0.0 && self.min_distance <= self.max_distance) {
            return Err(ControllerError::invalid(
                "camera.min_distance",
                "must be positive and not exceed max_distance",
            ));
        }
        if !(self.min_pitch <= self.max_pitch) {
            return Err(ControllerError::invalid(
                "camera.min_pitch",
                "must not exceed max_pitch",
            ));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ControllerError::invalid(
                "camera.smoothing",
                "must be within (0, 1]",
            ));
        }
        Ok(())
    }
}

/// World-space camera placement for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    /// Orientation whose -Z axis points from `position` toward `look_at`, with +Y up.
    ///
    /// Falls back to identity when the two coincide or the view is straight up/down.
    pub fn rotation(&self) -> Quat {
        let back = self.position - self.look_at;
        if back.norm_squared() < 1.0e-12 || back.cross(&Vec3::y()).norm_squared() < 1.0e-12 {
            return Quat::identity();
        }
        Quat::face_towards(&back, &Vec3::y())
    }
}

/// Orbiting follow camera with occlusion pull-in.
#[derive(Clone, Debug)]
pub struct CameraRig {
    settings: CameraSettings,
    yaw: f32,
    pitch: f32,
    distance: f32,
    /// `None` until the first update, which snaps instead of easing.
    position: Option<Vec3>,
}

impl CameraRig {
    pub fn new(settings: CameraSettings) -> Self {
        let pitch = settings
            .initial_pitch
            .clamp(settings.min_pitch, settings.max_pitch);
        let distance = settings
            .distance
            .clamp(settings.min_distance, settings.max_distance);
        Self {
            settings,
            yaw: 0.0,
            pitch,
            distance,
            position: None,
        }
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Apply a pointer delta. Pitch is clamped, never rejected.
    pub fn apply_look(&mut self, dx: f32, dy: f32) {
        let s = self.settings.look_sensitivity;
        self.yaw = wrap_angle(self.yaw - dx * s);
        self.pitch = (self.pitch + dy * s).clamp(self.settings.min_pitch, self.settings.max_pitch);
    }

    /// Apply a scroll delta to the follow distance, clamped to the configured bounds.
    pub fn apply_zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta * self.settings.zoom_sensitivity)
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }

    /// Offset from the look-at point to the unobstructed camera position.
    pub fn ideal_offset(&self) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(
            sin * self.distance,
            self.settings.height + self.pitch * 2.0,
            cos * self.distance,
        )
    }

    /// Recompute the camera for a player standing at `player_position`.
    pub fn update<P: CollisionProbe + ?Sized>(
        &mut self,
        player_position: Vec3,
        probe: &P,
    ) -> CameraPose {
        let look_at = player_position + Vec3::y() * self.settings.target_height;
        let safe = probe.camera_occlusion(look_at, look_at + self.ideal_offset());

        let position = match self.position {
            Some(current) => current + (safe - current) * self.settings.smoothing,
            None => safe,
        };
        self.position = Some(position);

        CameraPose { position, look_at }
    }

    /// Make the next update snap to its target, e.g. after a teleport.
    pub fn reset(&mut self) {
        self.position = None;
    }
}
