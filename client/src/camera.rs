use bevy::prelude::*;

use crate::player::CameraTarget;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, follow_player);
}

const CAMERA_DECAY_RATE: f32 = 24.0;
/// Larger jumps (teleports, building switches) cut instead of easing.
const CAMERA_SNAP_DISTANCE: f32 = 4.0;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_xyz(0.0, 3.0, -4.0).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                200.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

/// Ease the render camera toward the pose computed by the last controller tick.
fn follow_player(
    mut camera: Single<&mut Transform, With<Camera3d>>,
    target: Res<CameraTarget>,
    time: Res<Time>,
) {
    if target.position == target.look_at {
        return;
    }

    if camera.translation.distance(target.position) > CAMERA_SNAP_DISTANCE {
        camera.translation = target.position;
    } else {
        camera
            .translation
            .smooth_nudge(&target.position, CAMERA_DECAY_RATE, time.delta_secs());
    }
    camera.look_at(target.look_at, Vec3::Y);
}
