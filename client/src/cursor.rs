//! Pointer capture for mouse look.
//!
//! Movement and look input only reach the controller while the cursor is locked,
//! so capture state is mirrored into it as `LookActive` edges.

use bevy::{
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow, WindowFocused},
};
use controller::InputEvent;
use leafwing_input_manager::prelude::ActionState;

use crate::{input::InputAction, player::Controller};

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerCaptured(pub bool);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<PointerCaptured>();

    app.add_systems(Update, (toggle_capture, release_on_focus_lost));

    // Apply when our desired capture state changes.
    app.add_systems(
        Update,
        apply_capture
            .run_if(resource_changed::<PointerCaptured>)
            .after(toggle_capture)
            .after(release_on_focus_lost),
    );
}

fn toggle_capture(actions: Res<ActionState<InputAction>>, mut captured: ResMut<PointerCaptured>) {
    if actions.just_pressed(&InputAction::Grab) && !captured.0 {
        captured.0 = true;
    } else if actions.just_pressed(&InputAction::Release) && captured.0 {
        captured.0 = false;
    }
}

fn release_on_focus_lost(
    mut messages: MessageReader<WindowFocused>,
    mut captured: ResMut<PointerCaptured>,
) {
    for message in messages.read() {
        if !message.focused && captured.0 {
            captured.0 = false;
        }
    }
}

fn apply_capture(
    captured: Res<PointerCaptured>,
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
    controller: Option<ResMut<Controller>>,
) {
    if captured.0 {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    } else {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    }

    if let Some(mut controller) = controller {
        controller.0.handle_input(InputEvent::LookActive(captured.0));
    }
}
