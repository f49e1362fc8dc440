use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
};
use controller::{Action, InputEvent};
use leafwing_input_manager::prelude::*;

use crate::player::Controller;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Backward,
    Left,
    Right,
    Sprint,
    Interact,
    /// Capture the pointer for mouse look.
    Grab,
    /// Give the pointer back to the OS.
    Release,
    NextLocation,
    NextBuilding,
}

impl InputAction {
    const CONTROLLER: [InputAction; 6] = [
        InputAction::Forward,
        InputAction::Backward,
        InputAction::Left,
        InputAction::Right,
        InputAction::Sprint,
        InputAction::Interact,
    ];

    fn controller_action(self) -> Option<Action> {
        match self {
            InputAction::Forward => Some(Action::Forward),
            InputAction::Backward => Some(Action::Backward),
            InputAction::Left => Some(Action::Left),
            InputAction::Right => Some(Action::Right),
            InputAction::Sprint => Some(Action::Sprint),
            InputAction::Interact => Some(Action::Interact),
            _ => None,
        }
    }
}

/// Wheel "lines" are scaled to the pixel deltas the zoom sensitivity is tuned for.
const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Forward, KeyCode::KeyW);
    input_map.insert(InputAction::Forward, KeyCode::ArrowUp);
    input_map.insert(InputAction::Backward, KeyCode::KeyS);
    input_map.insert(InputAction::Backward, KeyCode::ArrowDown);
    input_map.insert(InputAction::Left, KeyCode::KeyA);
    input_map.insert(InputAction::Left, KeyCode::ArrowLeft);
    input_map.insert(InputAction::Right, KeyCode::KeyD);
    input_map.insert(InputAction::Right, KeyCode::ArrowRight);
    input_map.insert(InputAction::Sprint, KeyCode::ShiftLeft);
    input_map.insert(InputAction::Sprint, KeyCode::ShiftRight);
    input_map.insert(InputAction::Interact, KeyCode::KeyE);
    input_map.insert(InputAction::Grab, MouseButton::Left);
    input_map.insert(InputAction::Release, KeyCode::Escape);
    input_map.insert(InputAction::NextLocation, KeyCode::KeyT);
    input_map.insert(InputAction::NextBuilding, KeyCode::KeyB);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());

    app.add_systems(
        Update,
        (forward_actions, forward_pointer).run_if(resource_exists::<Controller>),
    );
}

/// Turn key edges into controller input events.
fn forward_actions(actions: Res<ActionState<InputAction>>, mut controller: ResMut<Controller>) {
    for action in InputAction::CONTROLLER {
        let Some(mapped) = action.controller_action() else {
            continue;
        };
        if actions.just_pressed(&action) {
            controller.0.handle_input(InputEvent::Pressed(mapped));
        }
        if actions.just_released(&action) {
            controller.0.handle_input(InputEvent::Released(mapped));
        }
    }
}

fn forward_pointer(
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    mut controller: ResMut<Controller>,
) {
    if motion.delta != Vec2::ZERO {
        controller.0.handle_input(InputEvent::Look {
            dx: motion.delta.x,
            dy: motion.delta.y,
        });
    }

    if scroll.delta.y != 0.0 {
        let pixels = match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y * PIXELS_PER_SCROLL_LINE,
            MouseScrollUnit::Pixel => scroll.delta.y,
        };
        // Wheel up zooms in.
        controller.0.handle_input(InputEvent::Scroll(-pixels));
    }
}
