/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between:
- mesh:         world-space triangle soups baked from level geometry
- grid:         the horizontal spatial index over mesh bounds
- narrow_phase: per-triangle ray casts backed by parry
- probe:        the wall, ground and camera queries used by the controller

Notes
- All positions are world space. Meshes are baked with their placement applied
  when they are registered, so queries never re-transform geometry.
- Hits carry the mesh they came from so callers can filter by source if needed.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Mat4 = na::Matrix4<f32>;

/// Stable handle of a registered collision mesh.
///
/// Ids are dense indices into the owning [`super::CollisionScene`] and are only
/// meaningful for the scene that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single ray hit against collision geometry.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Mesh that produced the hit.
    pub mesh: MeshId,
    /// Distance along the (unit) ray direction.
    pub distance: f32,
    /// World-space impact point.
    pub point: Point,
    /// World-space unit surface normal, facing the ray origin.
    pub normal: Vec3,
}
