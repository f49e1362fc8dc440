//! Procedural body animation driven by the controller's clip selection.
//!
//! The blockout avatar has no skeleton, so each clip is a bob-and-lean profile. The
//! controller picks clips by name exactly as it would for an imported rig; this module
//! only blends the profiles with the weights a [`CrossFade`] reports.

use std::f32::consts::TAU;

use bevy::prelude::*;
use controller::{ClipTable, CrossFade};

use crate::player::{AnimationChanged, AvatarBody, BODY_CENTER_HEIGHT, Controller};

#[derive(Clone, Copy, Debug)]
struct ProceduralClip {
    name: &'static str,
    /// Vertical bob amplitude in meters.
    bob: f32,
    bob_hz: f32,
    /// Forward lean in radians.
    lean: f32,
}

const CLIPS: [ProceduralClip; 4] = [
    ProceduralClip {
        name: "Idle",
        bob: 0.015,
        bob_hz: 0.4,
        lean: 0.0,
    },
    ProceduralClip {
        name: "Walking",
        bob: 0.05,
        bob_hz: 1.8,
        lean: 0.05,
    },
    ProceduralClip {
        name: "Running",
        bob: 0.09,
        bob_hz: 2.8,
        lean: 0.15,
    },
    ProceduralClip {
        name: "AscendingStairs",
        bob: 0.07,
        bob_hz: 1.5,
        lean: 0.12,
    },
];

#[derive(Resource, Default)]
struct Mixer {
    fade: CrossFade,
    elapsed: f32,
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Mixer>();
    app.add_systems(
        Update,
        (
            install_clip_table.run_if(resource_added::<Controller>),
            (start_transitions, animate_body).chain(),
        ),
    );
}

fn install_clip_table(mut controller: ResMut<Controller>) {
    let table = ClipTable::from_clip_names(CLIPS.iter().map(|c| c.name));
    controller.0.set_clip_table(table);
}

fn start_transitions(mut messages: MessageReader<AnimationChanged>, mut mixer: ResMut<Mixer>) {
    for AnimationChanged(transition) in messages.read() {
        debug!("Animation {:?} -> {:?}", transition.from, transition.state);
        mixer.fade.start(transition);
    }
}

fn animate_body(
    time: Res<Time>,
    mut mixer: ResMut<Mixer>,
    mut body: Single<&mut Transform, With<AvatarBody>>,
) {
    let dt = time.delta_secs();
    mixer.fade.advance(dt);
    mixer.elapsed += dt;

    let (mut offset, mut lean) = (0.0, 0.0);
    for (clip, weight) in mixer.fade.weights() {
        let Some(profile) = CLIPS.get(clip.0) else {
            continue;
        };
        offset += weight * profile.bob * (TAU * profile.bob_hz * mixer.elapsed).sin().abs();
        lean += weight * profile.lean;
    }

    body.translation.y = BODY_CENTER_HEIGHT + offset;
    body.rotation = Quat::from_rotation_x(lean);
}
