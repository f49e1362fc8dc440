pub mod animation;
pub mod building;
pub mod camera;
pub mod cell;
pub mod collision;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod floor;
pub mod input;
pub mod motion;
pub mod movement;
pub mod proximity;
pub mod utils;

pub use animation::{
    AnimationSelector, AnimationSettings, AnimationTransition, ClipId, ClipTable, CrossFade,
    MotionState, classify_clip_name,
};
pub use building::{BuildingCatalog, BuildingProfile, Location, MarkerDef, floor_label};
pub use camera::{CameraPose, CameraRig, CameraSettings};
pub use cell::{CellCoord, cell_of, neighborhood};
pub use collision::{CollisionMesh, CollisionProbe, CollisionScene, ProbeSettings};
pub use config::ControllerSettings;
pub use constants::{CELL_SIZE, DEFAULT_FLOOR_HEIGHT, FLOOR_BIAS, TICK_HZ, YAW_EPS};
pub use controller::{ControllerEvent, FrameOutput, PlayerController, PlayerTransform};
pub use error::ControllerError;
pub use floor::{FloorTracker, floor_index};
pub use input::{Action, InputEvent, IntentFlags};
pub use movement::{MovementSettings, PlayerState, StepMovementResult, step_movement};
pub use proximity::{
    Interaction, InteractionMarker, MarkerId, ProximitySettings, ProximityTracker,
};
pub use utils::{shortest_angle_delta, wrap_angle, yaw_from_xz};
