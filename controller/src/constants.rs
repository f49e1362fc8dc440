/// Size of one spatial-index cell in world units (meters).
/// All cells are square and extend without bound vertically.
///
/// Queries look at the 3x3 block around the containing cell, so any ray shorter than
/// one cell width stays inside the searched block.
pub const CELL_SIZE: f32 = 10.0;

/// Default storey height used to derive a floor index from vertical position.
///
/// Buildings override this through their profile; the value is a content convention
/// baked into level geometry, not a physical constant.
pub const DEFAULT_FLOOR_HEIGHT: f32 = 4.0;

/// Bias added to the player's height before dividing by the floor height, so standing
/// slightly below a slab (stair landings, floor thickness) still counts as that floor.
pub const FLOOR_BIAS: f32 = 0.5;

/// Minimum planar motion required to treat the intent as "moving".
pub const YAW_EPS: f32 = 1.0e-6;

/// Simulation rate hosts should drive [`crate::PlayerController::tick`] at.
///
/// Speeds and smoothing fractions are expressed per tick, so a fixed rate keeps them
/// frame-rate independent.
pub const TICK_HZ: f64 = 60.0;
