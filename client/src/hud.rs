//! On-screen floor label, interaction prompt and mission toast.

use bevy::prelude::*;
use controller::floor_label;

use crate::player::{Controller, FloorChanged, MissionStarted, TargetChanged};

const TOAST_SECONDS: f32 = 3.0;
const HELP: &str = "Click: look | WASD: move | Shift: sprint | E: interact | T: next location | B: next building | Esc: release";

#[derive(Component)]
struct FloorText;

#[derive(Component)]
struct PromptText;

#[derive(Component)]
struct ToastText(Timer);

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_hud);
    app.add_systems(
        Update,
        (
            show_floor,
            show_prompt.run_if(resource_exists::<Controller>),
            show_toast,
            expire_toast,
        ),
    );
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        FloorText,
        Text::new(floor_label(1)),
        TextFont {
            font_size: 24.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));

    commands.spawn((
        PromptText,
        Text::default(),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.85, 0.3)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(72.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        Visibility::Hidden,
    ));

    commands.spawn((
        ToastText(Timer::from_seconds(TOAST_SECONDS, TimerMode::Once)),
        Text::default(),
        TextFont {
            font_size: 28.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(30.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        Visibility::Hidden,
    ));

    commands.spawn((
        Text::new(HELP),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.7)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn show_floor(
    mut messages: MessageReader<FloorChanged>,
    mut text: Single<&mut Text, With<FloorText>>,
) {
    if let Some(FloorChanged(floor)) = messages.read().last() {
        text.0 = floor_label(*floor);
    }
}

fn show_prompt(
    mut messages: MessageReader<TargetChanged>,
    controller: Res<Controller>,
    prompt: Single<(&mut Text, &mut Visibility), With<PromptText>>,
) {
    if messages.read().last().is_none() {
        return;
    }
    let (mut text, mut visibility) = prompt.into_inner();
    match controller.0.target() {
        Some(marker) => {
            text.0 = format!("Press E: {}", marker.mission);
            *visibility = Visibility::Inherited;
        }
        None => *visibility = Visibility::Hidden,
    }
}

fn show_toast(
    mut messages: MessageReader<MissionStarted>,
    toast: Single<(&mut Text, &mut Visibility, &mut ToastText)>,
) {
    let Some(started) = messages.read().last() else {
        return;
    };
    let (mut text, mut visibility, mut toast) = toast.into_inner();
    text.0 = format!("Mission started: {}", started.mission);
    *visibility = Visibility::Inherited;
    toast.0.reset();
}

fn expire_toast(time: Res<Time>, toast: Single<(&mut Visibility, &mut ToastText)>) {
    let (mut visibility, mut toast) = toast.into_inner();
    if *visibility == Visibility::Hidden {
        return;
    }
    if toast.0.tick(time.delta()).just_finished() {
        *visibility = Visibility::Hidden;
    }
}
