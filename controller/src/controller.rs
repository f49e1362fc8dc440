use log::{debug, info};

use crate::{
    animation::{AnimationSelector, AnimationTransition, ClipTable, MotionState},
    building::BuildingProfile,
    camera::{CameraPose, CameraRig},
    collision::{CollisionProbe, Quat, Vec3},
    config::ControllerSettings,
    error::ControllerError,
    floor::FloorTracker,
    input::{Action, InputEvent},
    movement::{PlayerState, StepMovementResult, step_movement},
    proximity::{Interaction, InteractionMarker, MarkerId, ProximityTracker},
};

/// Notifications produced by a tick, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEvent {
    FloorChanged { floor: u32 },
    /// The interaction target changed; `None` hides the prompt.
    TargetChanged { target: Option<MarkerId> },
    Interacted(Interaction),
    AnimationChanged(AnimationTransition),
}

/// Player placement for the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerTransform {
    pub position: Vec3,
    pub yaw: f32,
}

impl PlayerTransform {
    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), self.yaw)
    }
}

/// Everything a host needs after one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub player: PlayerTransform,
    pub camera: CameraPose,
    pub motion: MotionState,
    pub floor: u32,
    pub movement: StepMovementResult,
    pub events: Vec<ControllerEvent>,
}

/// Third-person character controller for one building session.
///
/// Owns player, camera, floor, proximity and animation state. Collision geometry
/// is borrowed per tick through [`CollisionProbe`], so geometry can finish loading
/// (or be swapped) without rebuilding the controller.
#[derive(Clone, Debug)]
pub struct PlayerController {
    settings: ControllerSettings,
    building: Option<BuildingProfile>,
    player: PlayerState,
    camera: CameraRig,
    floor: FloorTracker,
    proximity: ProximityTracker,
    animation: AnimationSelector,
    look_active: bool,
    interact_requested: bool,
    /// Events raised outside a tick (teleports), flushed by the next tick.
    pending: Vec<ControllerEvent>,
}

impl PlayerController {
    /// Controller at `spawn` with no building profile or markers.
    pub fn new(settings: ControllerSettings, spawn: Vec3, floor_height: f32) -> Self {
        Self {
            player: PlayerState::new(spawn, &settings.movement),
            camera: CameraRig::new(settings.camera.clone()),
            floor: FloorTracker::new(floor_height, spawn.y),
            proximity: ProximityTracker::new(settings.proximity.clone(), Vec::new()),
            animation: AnimationSelector::new(settings.animation.clone(), ClipTable::default()),
            settings,
            building: None,
            look_active: false,
            interact_requested: false,
            pending: Vec::new(),
        }
    }

    /// Controller spawned in `building`, with its markers and storey height.
    pub fn for_building(
        settings: ControllerSettings,
        building: &BuildingProfile,
    ) -> Result<Self, ControllerError> {
        settings.validate()?;
        building.validate()?;
        let mut controller = Self::new(settings, building.spawn_point(), building.floor_height);
        controller
            .proximity
            .set_markers(building.interaction_markers());
        controller.building = Some(building.clone());
        info!(
            "Entered building `{}` at {:?}",
            building.id,
            building.spawn_point()
        );
        Ok(controller)
    }

    /// Switch to another building: resets the player to its spawn, the camera, markers
    /// and floor tracking. Clip lookups are kept.
    pub fn load_building(&mut self, building: &BuildingProfile) -> Result<(), ControllerError> {
        building.validate()?;
        let spawn = building.spawn_point();
        self.player = PlayerState::new(spawn, &self.settings.movement);
        self.camera.reset();
        self.proximity.set_markers(building.interaction_markers());
        self.interact_requested = false;
        if let Some(floor) = self.floor.reset(building.floor_height, spawn.y) {
            self.pending.push(ControllerEvent::FloorChanged { floor });
        }
        self.building = Some(building.clone());
        info!("Entered building `{}` at {:?}", building.id, spawn);
        Ok(())
    }

    pub fn set_clip_table(&mut self, table: ClipTable) {
        self.animation.set_table(table);
    }

    /// Apply one input event. Movement presses are ignored while look is inactive;
    /// releases always apply so keys never stick.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(Action::Interact) => {
                if self.look_active {
                    self.interact_requested = true;
                }
            }
            InputEvent::Pressed(action) => {
                if self.look_active {
                    self.player.intent.set(action, true);
                }
            }
            InputEvent::Released(action) => self.player.intent.set(action, false),
            InputEvent::Look { dx, dy } => {
                if self.look_active {
                    self.camera.apply_look(dx, dy);
                }
            }
            InputEvent::Scroll(delta) => self.camera.apply_zoom(delta),
            InputEvent::LookActive(active) => {
                self.look_active = active;
                if !active {
                    self.player.intent.clear();
                }
            }
        }
    }

    /// Place the player at `target` immediately and clear intent. The camera snaps on
    /// the next tick.
    pub fn teleport(&mut self, target: Vec3) {
        self.player.teleport(target);
        self.camera.reset();
        if let Some(floor) = self.floor.update(target.y) {
            self.pending.push(ControllerEvent::FloorChanged { floor });
        }
        info!("Teleported to {:?}", target);
    }

    /// Teleport to a named location of the current building.
    pub fn teleport_to_location(&mut self, id: &str) -> Result<(), ControllerError> {
        let building = self
            .building
            .as_ref()
            .ok_or(ControllerError::NoBuilding)?;
        let target = building.location(id)?.position();
        self.teleport(target);
        Ok(())
    }

    /// Advance one fixed tick of `dt` seconds against `probe`.
    pub fn tick<P: CollisionProbe + ?Sized>(&mut self, probe: &P, dt: f32) -> FrameOutput {
        let mut events = std::mem::take(&mut self.pending);

        self.proximity.advance(dt);

        let movement = step_movement(
            probe,
            &mut self.player,
            self.camera.yaw(),
            &self.settings.movement,
        );

        if let Some(floor) = self.floor.update(self.player.position.y) {
            events.push(ControllerEvent::FloorChanged { floor });
        }

        if let Some(target) = self.proximity.update(self.player.position) {
            events.push(ControllerEvent::TargetChanged { target });
        }
        if std::mem::take(&mut self.interact_requested) {
            if let Some(interaction) = self.proximity.interact() {
                debug!("Interacted with {}", interaction.marker);
                events.push(ControllerEvent::Interacted(interaction));
                events.push(ControllerEvent::TargetChanged { target: None });
            }
        }

        let camera = self.camera.update(self.player.position, probe);

        let motion = MotionState::classify(
            &self.player.intent,
            self.player.height_gap(),
            self.settings.animation.climb_threshold,
        );
        if let Some(transition) = self.animation.select(motion, self.player.intent.sprint) {
            events.push(ControllerEvent::AnimationChanged(transition));
        }

        FrameOutput {
            player: self.transform(),
            camera,
            motion,
            floor: self.floor.current(),
            movement,
            events,
        }
    }

    #[inline]
    pub fn transform(&self) -> PlayerTransform {
        PlayerTransform {
            position: self.player.position,
            yaw: self.player.yaw,
        }
    }

    #[inline]
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    #[inline]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    #[inline]
    pub fn floor(&self) -> u32 {
        self.floor.current()
    }

    #[inline]
    pub fn building(&self) -> Option<&BuildingProfile> {
        self.building.as_ref()
    }

    #[inline]
    pub fn markers(&self) -> &[InteractionMarker] {
        self.proximity.markers()
    }

    pub fn target(&self) -> Option<&InteractionMarker> {
        self.proximity.target()
    }

    #[inline]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DEFAULT_FLOOR_HEIGHT, TICK_HZ,
        animation::ClipId,
        building::BuildingCatalog,
        collision::{CollisionMesh, CollisionScene},
    };

    const DT: f32 = 1.0 / TICK_HZ as f32;

    fn controller_at(spawn: Vec3) -> PlayerController {
        let mut c = PlayerController::new(ControllerSettings::default(), spawn, DEFAULT_FLOOR_HEIGHT);
        c.handle_input(InputEvent::LookActive(true));
        c
    }

    fn catalog() -> BuildingCatalog {
        BuildingCatalog::from_toml_str(
            r#"
            [[building]]
            id = "gp-square"
            name = "GP Square"
            spawn = [0.0, 0.0, 0.0]

            [[building.marker]]
            id = "mission-1"
            mission = "Find the Cafeteria"
            position = [0.0, 0.0, -1.0]

            [[building.location]]
            id = "gp-library"
            name = "Library"
            floor = 2
            position = [-10.0, 4.0, -10.0]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn one_forward_tick_without_geometry() {
        let mut c = controller_at(Vec3::zeros());
        c.handle_input(InputEvent::Pressed(Action::Forward));

        let out = c.tick(&CollisionScene::default(), DT);

        assert!(out.player.position.x.abs() < 1.0e-6);
        assert!(out.player.position.y.abs() < 1.0e-6);
        assert!((out.player.position.z + 0.12).abs() < 1.0e-6);
        assert_eq!(c.player().current_height, 0.0);
        assert_eq!(out.motion, MotionState::Walk);
    }

    #[test]
    fn presses_need_active_look_but_releases_always_apply() {
        let mut c = PlayerController::new(ControllerSettings::default(), Vec3::zeros(), 4.0);
        c.handle_input(InputEvent::Pressed(Action::Forward));
        assert!(c.player().intent.is_empty());

        c.handle_input(InputEvent::LookActive(true));
        c.handle_input(InputEvent::Pressed(Action::Forward));
        c.handle_input(InputEvent::LookActive(false));
        assert!(c.player().intent.is_empty());

        c.handle_input(InputEvent::LookActive(true));
        c.handle_input(InputEvent::Pressed(Action::Left));
        c.handle_input(InputEvent::Released(Action::Left));
        assert!(c.player().intent.is_empty());
    }

    #[test]
    fn look_moves_camera_and_walking_follows_it() {
        let mut c = controller_at(Vec3::zeros());
        // Quarter turn to the left.
        c.handle_input(InputEvent::Look {
            dx: -std::f32::consts::FRAC_PI_2 / 0.002,
            dy: 0.0,
        });
        c.handle_input(InputEvent::Pressed(Action::Forward));

        let out = c.tick(&CollisionScene::default(), DT);
        assert!((out.player.position.x + 0.12).abs() < 1.0e-4);
        assert!(out.player.position.z.abs() < 1.0e-4);
    }

    #[test]
    fn teleport_applies_in_the_same_tick() {
        let mut c = controller_at(Vec3::zeros());
        c.handle_input(InputEvent::Pressed(Action::Forward));
        c.handle_input(InputEvent::Pressed(Action::Sprint));

        c.teleport(Vec3::new(2.6, 7.1, -5.0));
        assert_eq!(c.player().position, Vec3::new(2.6, 7.1, -5.0));
        assert_eq!(c.player().current_height, 7.1);
        assert_eq!(c.player().target_height, 7.1);
        assert!(c.player().intent.is_empty());

        // No geometry: ground is 0, which is too far below to track.
        let out = c.tick(&CollisionScene::default(), DT);
        assert_eq!(out.player.position, Vec3::new(2.6, 7.1, -5.0));
        assert_eq!(out.floor, 2);
        assert_eq!(out.events, vec![ControllerEvent::FloorChanged { floor: 2 }]);
    }

    #[test]
    fn floor_change_is_reported_once_while_climbing() {
        let mut c = controller_at(Vec3::new(0.3, 3.0, -0.2));
        let mut scene = CollisionScene::default();
        scene.build(vec![
            CollisionMesh::cuboid(Vec3::new(0.0, 3.75, 0.0), Vec3::new(5.0, 0.25, 5.0)).unwrap(),
        ]);

        let mut floors = Vec::new();
        for _ in 0..120 {
            let out = c.tick(&scene, DT);
            floors.extend(out.events.iter().filter_map(|e| match e {
                ControllerEvent::FloorChanged { floor } => Some(*floor),
                _ => None,
            }));
        }
        assert_eq!(floors, vec![2]);
        assert!((c.player().current_height - 4.0).abs() < 1.0e-3);
    }

    #[test]
    fn approaching_and_using_a_marker() {
        let catalog = catalog();
        let mut c = PlayerController::for_building(
            ControllerSettings::default(),
            catalog.get("gp-square").unwrap(),
        )
        .unwrap();
        c.handle_input(InputEvent::LookActive(true));
        let scene = CollisionScene::default();

        let out = c.tick(&scene, DT);
        assert!(out.events.contains(&ControllerEvent::TargetChanged {
            target: Some(MarkerId::from("mission-1"))
        }));

        c.handle_input(InputEvent::Pressed(Action::Interact));
        let out = c.tick(&scene, DT);
        assert_eq!(
            out.events,
            vec![
                ControllerEvent::Interacted(Interaction {
                    marker: MarkerId::from("mission-1"),
                    mission: "Find the Cafeteria".to_owned(),
                }),
                ControllerEvent::TargetChanged { target: None },
            ]
        );

        // Hidden for the cooldown, then targetable again.
        let ticks = (5.0 / DT).ceil() as usize + 1;
        let reappeared = (0..ticks).any(|_| {
            c.tick(&scene, DT)
                .events
                .contains(&ControllerEvent::TargetChanged {
                    target: Some(MarkerId::from("mission-1")),
                })
        });
        assert!(reappeared);
    }

    #[test]
    fn teleport_to_named_location() {
        let catalog = catalog();
        let mut c = PlayerController::for_building(
            ControllerSettings::default(),
            catalog.get("gp-square").unwrap(),
        )
        .unwrap();

        c.teleport_to_location("gp-library").unwrap();
        assert_eq!(c.player().position, Vec3::new(-10.0, 4.0, -10.0));
        assert_eq!(c.floor(), 2);

        assert!(matches!(
            c.teleport_to_location("roof"),
            Err(ControllerError::UnknownLocation { .. })
        ));
    }

    #[test]
    fn animation_changes_follow_motion() {
        let mut c = controller_at(Vec3::zeros());
        c.set_clip_table(ClipTable::from_clip_names(["Idle", "Walking", "Running"]));
        let scene = CollisionScene::default();

        let first = c.tick(&scene, DT);
        assert!(matches!(
            first.events.as_slice(),
            [ControllerEvent::AnimationChanged(t)] if t.to == ClipId(0) && t.from.is_none()
        ));

        c.handle_input(InputEvent::Pressed(Action::Forward));
        c.handle_input(InputEvent::Pressed(Action::Sprint));
        let out = c.tick(&scene, DT);
        assert_eq!(out.motion, MotionState::Run);
        assert!(matches!(
            out.events.as_slice(),
            [ControllerEvent::AnimationChanged(t)] if t.to == ClipId(2) && t.from == Some(ClipId(0))
        ));

        // Same state, no event.
        assert!(c.tick(&scene, DT).events.is_empty());
    }

    #[test]
    fn camera_stays_out_of_walls() {
        let mut c = controller_at(Vec3::new(0.4, 0.0, 0.0));
        let mut scene = CollisionScene::default();
        // Wall right behind the player, between it and the camera.
        scene.build(vec![
            CollisionMesh::cuboid(Vec3::new(0.0, 2.0, 1.25), Vec3::new(5.0, 2.0, 0.25)).unwrap(),
        ]);

        let out = c.tick(&scene, DT);
        assert!(out.camera.position.z < 1.0);
        assert!(out.camera.position.z > 0.0);
    }
}
