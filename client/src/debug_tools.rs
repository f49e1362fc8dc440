//! Debug/performance tooling for native dev builds.
//!
//! This plugin is compiled/used only when the caller gates it behind `dev_native`
//! (recommended: `#[cfg(feature = "dev_native")] mod debug_tools;` in `main.rs`).

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use controller::cell::{cell_min_corner, cell_of, neighborhood};
use iyes_perf_ui::prelude::*;

use crate::{
    level::Collision,
    player::{Controller, Player},
    to_bevy,
};

/// Toggles the collision cell overlay.
const CELL_OVERLAY_KEY: KeyCode = KeyCode::F3;

#[derive(Resource, Debug, Default)]
struct CellOverlay(bool);

/// Add debug/perf tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.init_resource::<CellOverlay>();
    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(
        Update,
        (
            toggle_cell_overlay,
            draw_collision_cells
                .run_if(|overlay: Res<CellOverlay>| overlay.0)
                .run_if(resource_exists::<Controller>),
        ),
    );
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn toggle_cell_overlay(keys: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<CellOverlay>) {
    if keys.just_pressed(CELL_OVERLAY_KEY) {
        overlay.0 = !overlay.0;
        info!("Collision cell overlay: {}", overlay.0);
    }
}

/// Outline the 3x3 block of cells probes search around the player, tinting the ones
/// that hold geometry.
fn draw_collision_cells(
    mut gizmos: Gizmos,
    controller: Res<Controller>,
    collision: Res<Collision>,
    player: Single<&Transform, With<Player>>,
) {
    let size = collision.0.grid().cell_size();
    let feet = to_bevy(controller.0.player().position);
    let y = player.translation.y + 0.05;

    for cell in neighborhood(cell_of(feet.x, feet.z, size)) {
        let (x, z) = cell_min_corner(cell, size);
        let center = Vec3::new(x + size * 0.5, y, z + size * 0.5);
        let occupied = !collision.0.grid().cell(cell).is_empty();
        let color = if occupied {
            Color::srgb(0.2, 0.9, 0.4)
        } else {
            Color::srgb(0.6, 0.6, 0.6)
        };
        gizmos.rect(
            Isometry3d::new(center, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            Vec2::splat(size * 0.98),
            color,
        );
    }
}
