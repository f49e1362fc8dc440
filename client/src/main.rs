// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod animation;
mod camera;
mod cursor;
mod hud;
mod input;
mod level;
mod player;

use bevy::prelude::*;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Campus Walkthrough".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        // Per-tick controller constants assume this rate.
        app.insert_resource(Time::<Fixed>::from_hz(controller::TICK_HZ));

        app.add_plugins((
            input::plugin,
            cursor::plugin,
            level::plugin,
            player::plugin,
            animation::plugin,
            camera::plugin,
            hud::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}

/// Convert a controller vector into a Bevy one.
#[inline]
pub fn to_bevy(v: controller::collision::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}
