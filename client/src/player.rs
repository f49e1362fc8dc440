use bevy::prelude::*;
use controller::{AnimationTransition, ControllerEvent, MarkerId, PlayerController};

use crate::{level::Collision, to_bevy};

/// Render transforms further than this from the simulation snap instead of easing.
const SNAP_DISTANCE: f32 = 2.0;
const RENDER_DECAY_RATE: f32 = 24.0;
/// Capsule center above the feet.
pub const BODY_CENTER_HEIGHT: f32 = 0.85;

/// The character controller driving the local player.
#[derive(Resource)]
pub struct Controller(pub PlayerController);

#[derive(Component)]
pub struct Player;

/// The visible body, a child of [`Player`] animated relative to the feet.
#[derive(Component)]
pub struct AvatarBody;

/// Latest simulated placement; the render `Transform` eases toward it.
#[derive(Component, Debug, Default)]
pub struct SimTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

/// Camera placement computed by the last tick.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct CameraTarget {
    pub position: Vec3,
    pub look_at: Vec3,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct FloorChanged(pub u32);

#[derive(Message, Debug, Clone)]
pub struct TargetChanged(pub Option<MarkerId>);

#[derive(Message, Debug, Clone)]
pub struct MissionStarted {
    pub marker: MarkerId,
    pub mission: String,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct AnimationChanged(pub AnimationTransition);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CameraTarget>();
    app.add_message::<FloorChanged>();
    app.add_message::<TargetChanged>();
    app.add_message::<MissionStarted>();
    app.add_message::<AnimationChanged>();

    app.add_systems(Startup, spawn_player);
    app.add_systems(
        FixedUpdate,
        tick_controller.run_if(resource_exists::<Controller>),
    );
    app.add_systems(Update, interpolate);
}

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let body_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(226, 120, 64),
        perceptual_roughness: 0.8,
        ..default()
    });

    commands
        .spawn((
            Player,
            Name::new("Player"),
            SimTransform::default(),
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    AvatarBody,
                    Mesh3d(meshes.add(Capsule3d::new(0.3, 1.1))),
                    MeshMaterial3d(body_material.clone()),
                    Transform::from_xyz(0.0, BODY_CENTER_HEIGHT, 0.0),
                ))
                .with_children(|body| {
                    // Facing marker; yaw 0 faces +Z.
                    body.spawn((
                        Mesh3d(meshes.add(Cuboid::new(0.2, 0.12, 0.2))),
                        MeshMaterial3d(body_material),
                        Transform::from_xyz(0.0, 0.45, 0.3),
                    ));
                });
        });
}

fn tick_controller(
    time: Res<Time>,
    mut controller: ResMut<Controller>,
    collision: Res<Collision>,
    mut player: Single<&mut SimTransform, With<Player>>,
    mut camera_target: ResMut<CameraTarget>,
    mut floor_changed: MessageWriter<FloorChanged>,
    mut target_changed: MessageWriter<TargetChanged>,
    mut mission_started: MessageWriter<MissionStarted>,
    mut animation_changed: MessageWriter<AnimationChanged>,
) {
    let out = controller.0.tick(&collision.0, time.delta_secs());

    player.translation = to_bevy(out.player.position);
    player.rotation = Quat::from_rotation_y(out.player.yaw);

    camera_target.position = to_bevy(out.camera.position);
    camera_target.look_at = to_bevy(out.camera.look_at);

    for event in out.events {
        match event {
            ControllerEvent::FloorChanged { floor } => {
                debug!("Floor {}", floor);
                floor_changed.write(FloorChanged(floor));
            }
            ControllerEvent::TargetChanged { target } => {
                target_changed.write(TargetChanged(target));
            }
            ControllerEvent::Interacted(interaction) => {
                info!("Mission started: {}", interaction.mission);
                mission_started.write(MissionStarted {
                    marker: interaction.marker,
                    mission: interaction.mission,
                });
            }
            ControllerEvent::AnimationChanged(transition) => {
                animation_changed.write(AnimationChanged(transition));
            }
        }
    }
}

fn interpolate(time: Res<Time>, mut query: Query<(&mut Transform, &SimTransform)>) {
    let dt = time.delta_secs();
    for (mut render, sim) in &mut query {
        if render.translation.distance(sim.translation) > SNAP_DISTANCE {
            render.translation = sim.translation;
            render.rotation = sim.rotation;
            continue;
        }
        render
            .translation
            .smooth_nudge(&sim.translation, RENDER_DECAY_RATE, dt);
        render.rotation.smooth_nudge(&sim.rotation, RENDER_DECAY_RATE, dt);
    }
}
