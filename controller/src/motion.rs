use crate::{collision::Vec3, input::IntentFlags};

/// Planar unit vectors derived from the camera yaw.
#[derive(Clone, Copy, Debug)]
pub struct CameraBasis {
    /// Direction the camera looks along, flattened (yaw 0 looks toward -Z).
    pub forward: Vec3,
    /// Screen-right, flattened.
    pub right: Vec3,
}

/// Compute the planar camera basis for `yaw`.
#[inline]
pub fn camera_basis(yaw: f32) -> CameraBasis {
    let (sin, cos) = yaw.sin_cos();
    CameraBasis {
        forward: Vec3::new(-sin, 0.0, -cos),
        right: Vec3::new(cos, 0.0, -sin),
    }
}

/// Unit planar direction selected by `intent` relative to the camera, if any.
///
/// Opposing keys cancel; `None` means no net direction this tick.
pub fn desired_direction(yaw: f32, intent: &IntentFlags) -> Option<Vec3> {
    let basis = camera_basis(yaw);
    let mut dir = Vec3::zeros();
    if intent.forward {
        dir += basis.forward;
    }
    if intent.backward {
        dir -= basis.forward;
    }
    if intent.right {
        dir += basis.right;
    }
    if intent.left {
        dir -= basis.right;
    }

    dir.try_normalize(1.0e-6)
}

/// Desired per-tick displacement for `intent`, before collision gating.
///
/// The step is `speed`, doubled (or scaled by `sprint_multiplier`) while sprinting.
pub fn desired_translation(
    yaw: f32,
    intent: &IntentFlags,
    speed: f32,
    sprint_multiplier: f32,
) -> Vec3 {
    let Some(dir) = desired_direction(yaw, intent) else {
        return Vec3::zeros();
    };
    let scale = if intent.sprint {
        speed * sprint_multiplier
    } else {
        speed
    };
    dir * scale.max(0.0)
}
