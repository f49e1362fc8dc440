//! Building blockouts, their collision scene, and building/location switching.
//!
//! Each building in the catalog is rendered as a procedural blockout: a slab per
//! storey, exterior walls, a dividing wall with a doorway, and switchback stair
//! flights. The same boxes feed the controller's collision scene, so what the player
//! sees is what they walk on.

use bevy::{
    mesh::{Indices, VertexAttributeValues},
    prelude::*,
};
use controller::{
    BuildingCatalog, BuildingProfile, CollisionMesh, CollisionScene, ControllerError,
    ControllerSettings, MarkerId, PlayerController, collision::Mat4, floor_index,
};
use leafwing_input_manager::prelude::ActionState;

use crate::{input::InputAction, player::Controller};

const CATALOG_SOURCE: &str = include_str!("../assets/buildings.toml");

const HALF_WIDTH: f32 = 20.0;
const HALF_DEPTH: f32 = 15.0;
const WALL_THICKNESS: f32 = 0.3;
const SLAB_THICKNESS: f32 = 0.2;
const RAIL_THICKNESS: f32 = 0.2;
/// Guard rails stand this far above the storey they protect.
const RAIL_HEIGHT: f32 = 1.1;
const DOOR_HALF_WIDTH: f32 = 1.5;
const STEP_RISE: f32 = 0.25;
const STEP_TREAD: f32 = 0.5;
/// X extents of the two stair lanes; consecutive flights alternate between them.
const STAIR_LANES: [(f32, f32); 2] = [(10.0, 12.0), (13.0, 15.0)];

#[derive(Resource)]
pub struct Catalog(pub BuildingCatalog);

/// Collision geometry of the active building.
#[derive(Resource)]
pub struct Collision(pub CollisionScene);

/// Index into the catalog of the building being walked.
#[derive(Resource, Debug, Default)]
pub struct ActiveBuilding(pub usize);

/// Next location `NextLocation` teleports to.
#[derive(Resource, Debug, Default)]
struct LocationCursor(usize);

#[derive(Component)]
pub struct LevelGeometry;

#[derive(Component, Debug)]
pub struct MarkerVisual(pub MarkerId);

pub(super) fn plugin(app: &mut App) {
    let catalog = load_catalog();
    app.insert_resource(Collision(CollisionScene::new(
        catalog.settings.probe.clone(),
    )));
    app.insert_resource(Catalog(catalog));
    app.init_resource::<ActiveBuilding>();
    app.init_resource::<LocationCursor>();

    app.add_systems(Startup, spawn_lights);
    app.add_systems(
        Update,
        load_active_building.run_if(resource_changed::<ActiveBuilding>),
    );
    app.add_systems(
        Update,
        (switch_building, cycle_locations, sync_marker_visuals)
            .run_if(resource_exists::<Controller>),
    );
}

fn load_catalog() -> BuildingCatalog {
    match BuildingCatalog::from_toml_str(CATALOG_SOURCE) {
        Ok(catalog) if !catalog.buildings.is_empty() => catalog,
        Ok(_) => {
            warn!("Building catalog is empty, using the fallback blockout");
            fallback_catalog()
        }
        Err(err) => {
            warn!("Failed to load building catalog: {err}");
            fallback_catalog()
        }
    }
}

fn fallback_catalog() -> BuildingCatalog {
    BuildingCatalog {
        settings: ControllerSettings::default(),
        buildings: vec![BuildingProfile {
            id: "blockout".to_owned(),
            name: "Blockout".to_owned(),
            spawn: [-10.0, 0.0, 0.0],
            floor_height: controller::DEFAULT_FLOOR_HEIGHT,
            markers: Vec::new(),
            locations: Vec::new(),
        }],
    }
}

fn spawn_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(8.0, 30.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: 60.0,
            ..default()
        },
        Transform::from_xyz(-8.0, 10.0, -6.0),
    ));
}

fn load_active_building(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    catalog: Res<Catalog>,
    active: Res<ActiveBuilding>,
    mut collision: ResMut<Collision>,
    controller: Option<ResMut<Controller>>,
    spawned: Query<Entity, Or<(With<LevelGeometry>, With<MarkerVisual>)>>,
) {
    let Some(profile) = catalog.0.buildings.get(active.0) else {
        warn!("No building at catalog index {}", active.0);
        return;
    };

    for entity in &spawned {
        commands.entity(entity).despawn();
    }

    let floor_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.62, 0.6, 0.56),
        perceptual_roughness: 1.0,
        ..default()
    });
    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.82, 0.8, 0.74),
        perceptual_roughness: 0.9,
        ..default()
    });
    let stair_material = materials.add(Color::srgb_u8(124, 144, 255));
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.82, 0.2),
        emissive: LinearRgba::rgb(2.0, 1.5, 0.2),
        ..default()
    });

    let blocks = blockout(profile);
    let mut collision_meshes = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let mesh = Mesh::from(Cuboid::from_size(block.size));
        let transform = Transform::from_translation(block.center);
        match collision_mesh(&mesh, &transform) {
            Ok(collider) => collision_meshes.push(collider),
            Err(err) => warn!("Skipping collider at {}: {err}", block.center),
        }
        let material = match block.kind {
            BlockKind::Floor => floor_material.clone(),
            BlockKind::Wall => wall_material.clone(),
            BlockKind::Stair => stair_material.clone(),
        };
        commands.spawn((
            LevelGeometry,
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(material),
            transform,
        ));
    }
    collision.0.build(collision_meshes);

    let marker_mesh = meshes.add(Sphere::new(0.25));
    for marker in &profile.markers {
        commands.spawn((
            MarkerVisual(MarkerId(marker.id.clone())),
            Name::new(marker.mission.clone()),
            Mesh3d(marker_mesh.clone()),
            MeshMaterial3d(marker_material.clone()),
            Transform::from_translation(Vec3::from_array(marker.position)),
            Visibility::default(),
        ));
    }

    match controller {
        Some(mut controller) => {
            if let Err(err) = controller.0.load_building(profile) {
                error!("Failed to enter `{}`: {err}", profile.id);
            }
        }
        None => match PlayerController::for_building(catalog.0.settings.clone(), profile) {
            Ok(controller) => commands.insert_resource(Controller(controller)),
            Err(err) => error!("Failed to create controller for `{}`: {err}", profile.id),
        },
    }

    info!(
        "Loaded `{}`: {} blocks, {} markers",
        profile.name,
        blocks.len(),
        profile.markers.len()
    );
}

fn switch_building(
    actions: Res<ActionState<InputAction>>,
    catalog: Res<Catalog>,
    mut active: ResMut<ActiveBuilding>,
    mut cursor: ResMut<LocationCursor>,
) {
    let count = catalog.0.buildings.len();
    if !actions.just_pressed(&InputAction::NextBuilding) || count < 2 {
        return;
    }
    active.0 = (active.0 + 1) % count;
    cursor.0 = 0;
}

fn cycle_locations(
    actions: Res<ActionState<InputAction>>,
    mut controller: ResMut<Controller>,
    mut cursor: ResMut<LocationCursor>,
) {
    if !actions.just_pressed(&InputAction::NextLocation) {
        return;
    }
    let Some(building) = controller.0.building() else {
        return;
    };
    if building.locations.is_empty() {
        return;
    }
    let location = &building.locations[cursor.0 % building.locations.len()];
    let (id, name) = (location.id.clone(), location.name.clone());
    cursor.0 = cursor.0.wrapping_add(1);

    match controller.0.teleport_to_location(&id) {
        Ok(()) => info!("Teleported to {name}"),
        Err(err) => warn!("Teleport failed: {err}"),
    }
}

/// Hide markers on cooldown and enlarge the current target.
fn sync_marker_visuals(
    controller: Res<Controller>,
    mut markers: Query<(&MarkerVisual, &mut Visibility, &mut Transform)>,
) {
    let target = controller.0.target().map(|m| &m.id);
    for (visual, mut visibility, mut transform) in &mut markers {
        let visible = controller
            .0
            .markers()
            .iter()
            .find(|m| m.id == visual.0)
            .is_some_and(|m| m.is_visible());
        visibility.set_if_neq(if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
        let scale = if target == Some(&visual.0) { 1.6 } else { 1.0 };
        transform.scale = Vec3::splat(scale);
    }
}

/// World-space collision mesh from a render mesh placed at `transform`.
fn collision_mesh(mesh: &Mesh, transform: &Transform) -> Result<CollisionMesh, ControllerError> {
    let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return Err(ControllerError::EmptyMesh);
    };
    let vertices: Vec<[f32; 3]> = positions
        .iter()
        .map(|&p| transform.transform_point(Vec3::from_array(p)).to_array())
        .collect();
    let indices: Vec<u32> = match mesh.indices() {
        Some(Indices::U32(indices)) => indices.clone(),
        Some(Indices::U16(indices)) => indices.iter().map(|&i| u32::from(i)).collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    CollisionMesh::from_indexed(&vertices, &indices, &Mat4::identity())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockKind {
    Floor,
    Wall,
    Stair,
}

/// Axis-aligned box of level geometry.
#[derive(Clone, Copy, Debug)]
struct Block {
    center: Vec3,
    size: Vec3,
    kind: BlockKind,
}

impl Block {
    fn from_bounds(min: Vec3, max: Vec3, kind: BlockKind) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
            kind,
        }
    }

    fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }
}

/// Number of storeys needed to hold every location and marker.
fn storeys(profile: &BuildingProfile) -> u32 {
    let locations = profile.locations.iter().map(|l| l.floor);
    let markers = profile
        .markers
        .iter()
        .map(|m| floor_index(m.position[1], profile.floor_height));
    locations.chain(markers).max().unwrap_or(1).max(1)
}

/// One stair flight between two storeys.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Flight {
    base: f32,
    lane: (f32, f32),
    /// Z where the flight starts at `base`.
    bottom_z: f32,
    /// Z where it arrives one storey up.
    top_z: f32,
    steps: usize,
}

impl Flight {
    fn new(storey: u32, floor_height: f32) -> Self {
        let steps = (floor_height / STEP_RISE).round().max(1.0) as usize;
        let run = steps as f32 * STEP_TREAD;
        let (bottom_z, top_z) = if storey % 2 == 0 { (0.0, -run) } else { (-run, 0.0) };
        Self {
            base: storey as f32 * floor_height,
            lane: STAIR_LANES[storey as usize % 2],
            bottom_z,
            top_z,
            steps,
        }
    }

    fn z_range(&self) -> (f32, f32) {
        (self.bottom_z.min(self.top_z), self.bottom_z.max(self.top_z))
    }

    fn blocks(&self, floor_height: f32, out: &mut Vec<Block>) {
        let rise = floor_height / self.steps as f32;
        let dir = (self.top_z - self.bottom_z).signum();
        for i in 0..self.steps {
            let z0 = self.bottom_z + dir * i as f32 * STEP_TREAD;
            let z1 = z0 + dir * STEP_TREAD;
            out.push(Block::from_bounds(
                Vec3::new(self.lane.0, self.base, z0.min(z1)),
                Vec3::new(self.lane.1, self.base + (i + 1) as f32 * rise, z0.max(z1)),
                BlockKind::Stair,
            ));
        }

        // Side rails run from the flight's base up past the storey above, guarding the
        // stairwell on both levels.
        let (z_min, z_max) = self.z_range();
        let rail_top = self.base + floor_height + RAIL_HEIGHT;
        for x in [self.lane.0 - RAIL_THICKNESS, self.lane.1] {
            out.push(Block::from_bounds(
                Vec3::new(x, self.base, z_min),
                Vec3::new(x + RAIL_THICKNESS, rail_top, z_max),
                BlockKind::Wall,
            ));
        }

        // Upstairs, the bottom end of the stairwell is a drop.
        let outward = -dir;
        let guard_z = self.bottom_z + outward * RAIL_THICKNESS;
        out.push(Block::from_bounds(
            Vec3::new(self.lane.0, self.base + floor_height, self.bottom_z.min(guard_z)),
            Vec3::new(self.lane.1, rail_top, self.bottom_z.max(guard_z)),
            BlockKind::Wall,
        ));
    }
}

/// Slab with its top at `level`, leaving a hole over `opening` (`x0, x1, z0, z1`).
fn slab(level: f32, opening: Option<(f32, f32, f32, f32)>, out: &mut Vec<Block>) {
    let y0 = level - SLAB_THICKNESS;
    let mut push = |x0: f32, x1: f32, z0: f32, z1: f32| {
        if x1 > x0 && z1 > z0 {
            out.push(Block::from_bounds(
                Vec3::new(x0, y0, z0),
                Vec3::new(x1, level, z1),
                BlockKind::Floor,
            ));
        }
    };
    match opening {
        None => push(-HALF_WIDTH, HALF_WIDTH, -HALF_DEPTH, HALF_DEPTH),
        Some((x0, x1, z0, z1)) => {
            push(-HALF_WIDTH, x0, -HALF_DEPTH, HALF_DEPTH);
            push(x1, HALF_WIDTH, -HALF_DEPTH, HALF_DEPTH);
            push(x0, x1, -HALF_DEPTH, z0);
            push(x0, x1, z1, HALF_DEPTH);
        }
    }
}

/// Procedural geometry for `profile`.
fn blockout(profile: &BuildingProfile) -> Vec<Block> {
    let h = profile.floor_height;
    let storeys = storeys(profile);
    let height = storeys as f32 * h;
    let mut blocks = Vec::new();

    slab(0.0, None, &mut blocks);
    for storey in 1..storeys {
        let below = Flight::new(storey - 1, h);
        let (z0, z1) = below.z_range();
        slab(
            storey as f32 * h,
            Some((below.lane.0, below.lane.1, z0, z1)),
            &mut blocks,
        );
    }
    for storey in 0..storeys.saturating_sub(1) {
        Flight::new(storey, h).blocks(h, &mut blocks);
    }

    let t = WALL_THICKNESS;
    for (min, max) in [
        (
            Vec3::new(-HALF_WIDTH, 0.0, HALF_DEPTH - t),
            Vec3::new(HALF_WIDTH, height, HALF_DEPTH),
        ),
        (
            Vec3::new(-HALF_WIDTH, 0.0, -HALF_DEPTH),
            Vec3::new(HALF_WIDTH, height, -HALF_DEPTH + t),
        ),
        (
            Vec3::new(HALF_WIDTH - t, 0.0, -HALF_DEPTH),
            Vec3::new(HALF_WIDTH, height, HALF_DEPTH),
        ),
        (
            Vec3::new(-HALF_WIDTH, 0.0, -HALF_DEPTH),
            Vec3::new(-HALF_WIDTH + t, height, HALF_DEPTH),
        ),
    ] {
        blocks.push(Block::from_bounds(min, max, BlockKind::Wall));
    }

    // Dividing wall along x = 0 with a doorway on every storey.
    for storey in 0..storeys {
        let y0 = storey as f32 * h;
        let y1 = y0 + h - SLAB_THICKNESS;
        for (z0, z1) in [
            (-HALF_DEPTH + t, -DOOR_HALF_WIDTH),
            (DOOR_HALF_WIDTH, HALF_DEPTH - t),
        ] {
            blocks.push(Block::from_bounds(
                Vec3::new(-t * 0.5, y0, z0),
                Vec3::new(t * 0.5, y1, z1),
                BlockKind::Wall,
            ));
        }
    }

    blocks
}
