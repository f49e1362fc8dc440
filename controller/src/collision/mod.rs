/*!
Collision root module.

Static building geometry is baked into world-space triangle meshes, indexed in a
horizontal grid, and queried with rays through parry. The code is split for clarity:

- types:        shared aliases and data types (MeshId, RayHit)
- settings:     probe constants and tolerances
- mesh:         world-space triangle meshes built from indexed buffers
- grid:         uniform XZ grid mapping cells to mesh ids
- narrow_phase: ray casts against candidate meshes
- probe:        the CollisionProbe trait and the CollisionScene implementing it
*/

pub mod grid;
pub mod mesh;
pub mod narrow_phase;
pub mod probe;
pub mod settings;
pub mod types;

// Re-export commonly used types and functions.
pub use grid::SpatialGrid;
pub use mesh::CollisionMesh;
pub use narrow_phase::{cast_ray_all, cast_ray_nearest};
pub use probe::{CollisionProbe, CollisionScene};
pub use settings::ProbeSettings;
pub use types::{Mat4, MeshId, Point, Quat, RayHit, Vec3};
