use log::{info, warn};

use super::{
    grid::SpatialGrid,
    mesh::CollisionMesh,
    narrow_phase,
    settings::ProbeSettings,
    types::{MeshId, Point, RayHit, Vec3},
};

/// Minimum length for a direction or camera offset to be cast.
const MIN_CAST_LENGTH: f32 = 1.0e-6;

/// Queries the movement integrator and camera rig need from static geometry.
///
/// Every method has a defined answer when nothing is hit, so implementations never fail:
/// no wall, the default ground height, and the unobstructed camera position.
pub trait CollisionProbe {
    /// True if a wall-like surface lies within `max_distance` along `direction`,
    /// probing from chest height above `position`.
    fn is_wall_ahead(&self, position: Vec3, direction: Vec3, max_distance: f32) -> bool;

    /// Height of the highest walkable surface under `position` within step tolerance.
    fn ground_height(&self, position: Vec3) -> f32;

    /// `ideal` if the segment from `origin` is clear, otherwise a point pulled in
    /// toward `origin` just short of the first obstruction.
    fn camera_occlusion(&self, origin: Vec3, ideal: Vec3) -> Vec3;
}

/// Static building geometry together with its spatial index.
///
/// The scene owns the meshes; the grid refers to them by [`MeshId`]. A scene with no
/// meshes is valid and answers every probe with its default.
#[derive(Clone, Debug)]
pub struct CollisionScene {
    meshes: Vec<CollisionMesh>,
    grid: SpatialGrid,
    settings: ProbeSettings,
}

impl Default for CollisionScene {
    fn default() -> Self {
        Self::new(ProbeSettings::default())
    }
}

impl CollisionScene {
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            meshes: Vec::new(),
            grid: SpatialGrid::new(settings.cell_size),
            settings,
        }
    }

    /// Replace the scene contents with `meshes` and index them.
    pub fn build(&mut self, meshes: Vec<CollisionMesh>) {
        self.clear();
        for (i, mesh) in meshes.iter().enumerate() {
            self.grid.insert(MeshId(i as u32), mesh.aabb());
        }
        self.meshes = meshes;

        if self.meshes.is_empty() {
            warn!("Collision scene built without geometry; probes fall back to defaults");
        } else {
            info!(
                "Collision scene built: {} meshes, {} triangles, {} cells",
                self.meshes.len(),
                self.triangle_count(),
                self.grid.occupied_cells()
            );
        }
    }

    /// Drop all geometry. Probes return their defaults until the next build.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.grid.clear();
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        !self.meshes.is_empty()
    }

    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangles().len()).sum()
    }

    #[inline]
    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[inline]
    pub fn mesh(&self, id: MeshId) -> Option<&CollisionMesh> {
        self.meshes.get(id.index())
    }

    /// Meshes indexed in the 3x3 cell block around `position`.
    #[inline]
    pub fn nearby(&self, position: Vec3) -> Vec<MeshId> {
        self.grid.query(position)
    }

    /// All hits along a ray, nearest first, against geometry near `origin`.
    pub fn cast_ray(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Vec<RayHit> {
        let candidates = self.nearby(origin);
        if candidates.is_empty() {
            return Vec::new();
        }
        narrow_phase::cast_ray_all(
            &self.meshes,
            &candidates,
            Point::from(origin),
            dir,
            max_distance,
        )
    }
}

impl CollisionProbe for CollisionScene {
    fn is_wall_ahead(&self, position: Vec3, direction: Vec3, max_distance: f32) -> bool {
        let Some(dir) = direction.try_normalize(MIN_CAST_LENGTH) else {
            return false;
        };
        let origin = position + Vec3::y() * self.settings.chest_height;

        self.cast_ray(origin, dir, max_distance)
            .iter()
            .any(|hit| hit.normal.y.abs() < self.settings.wall_normal_max_y)
    }

    fn ground_height(&self, position: Vec3) -> f32 {
        let origin = position + Vec3::y() * self.settings.ground_probe_lift;
        let ceiling = position.y + self.settings.step_tolerance;

        self.cast_ray(origin, -Vec3::y(), self.settings.ground_probe_range)
            .iter()
            .map(|hit| hit.point.y)
            .filter(|&y| y <= ceiling)
            .reduce(f32::max)
            .unwrap_or(self.settings.default_ground_height)
    }

    fn camera_occlusion(&self, origin: Vec3, ideal: Vec3) -> Vec3 {
        let offset = ideal - origin;
        let length = offset.norm();
        if !(length > MIN_CAST_LENGTH) {
            return ideal;
        }
        let dir = offset / length;

        match self.cast_ray(origin, dir, length).first() {
            Some(hit) if hit.distance < length => {
                let pulled = (hit.distance - self.settings.camera_margin)
                    .max(self.settings.camera_min_distance)
                    .min(length);
                origin + dir * pulled
            }
            _ => ideal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{settings::DEFAULT_GROUND_HEIGHT as DEFAULT_GROUND, types::Mat4};

    fn floor_plane(y: f32) -> CollisionMesh {
        CollisionMesh::from_indexed(
            &[
                [-50.0, y, -50.0],
                [50.0, y, -50.0],
                [50.0, y, 50.0],
                [-50.0, y, 50.0],
            ],
            &[0, 1, 2, 0, 2, 3],
            &Mat4::identity(),
        )
        .unwrap()
    }

    /// A wall whose face is perpendicular to X, at x = 1.
    fn wall_at_x1() -> CollisionMesh {
        CollisionMesh::cuboid(Vec3::new(1.25, 1.5, 0.0), Vec3::new(0.25, 1.5, 5.0)).unwrap()
    }

    fn scene(meshes: Vec<CollisionMesh>) -> CollisionScene {
        let mut scene = CollisionScene::default();
        scene.build(meshes);
        scene
    }

    #[test]
    fn empty_scene_answers_defaults() {
        let scene = CollisionScene::default();
        let p = Vec3::new(3.0, 2.0, -1.0);

        assert!(!scene.is_loaded());
        assert!(!scene.is_wall_ahead(p, Vec3::x(), 0.6));
        assert_eq!(scene.ground_height(p), DEFAULT_GROUND);
        let ideal = Vec3::new(3.0, 4.0, 2.0);
        assert_eq!(scene.camera_occlusion(p, ideal), ideal);
    }

    #[test]
    fn wall_facing_ray_detects_wall() {
        let scene = scene(vec![wall_at_x1()]);
        assert!(scene.is_wall_ahead(Vec3::new(0.5, 0.0, 0.0), Vec3::x(), 0.6));
        // Out of range.
        assert!(!scene.is_wall_ahead(Vec3::new(-0.5, 0.0, 0.0), Vec3::x(), 0.6));
        // Facing away.
        assert!(!scene.is_wall_ahead(Vec3::new(0.5, 0.0, 0.0), -Vec3::x(), 0.6));
    }

    #[test]
    fn floor_hits_are_never_walls() {
        let scene = scene(vec![floor_plane(2.0)]);
        // Chest ray pointing straight up hits the slab above face-on.
        assert!(!scene.is_wall_ahead(Vec3::new(0.3, 0.0, 0.2), Vec3::y(), 2.0));
    }

    #[test]
    fn zero_direction_is_not_a_wall() {
        let scene = scene(vec![wall_at_x1()]);
        assert!(!scene.is_wall_ahead(Vec3::new(0.9, 0.0, 0.0), Vec3::zeros(), 0.6));
    }

    #[test]
    fn ground_on_flat_plane() {
        let scene = scene(vec![floor_plane(0.0)]);
        assert!(scene.ground_height(Vec3::new(0.3, 5.0, 0.2)).abs() < 1.0e-5);
        // Ray range ends far above the plane; nothing qualifies.
        assert_eq!(scene.ground_height(Vec3::new(0.3, 100.0, 0.2)), DEFAULT_GROUND);
    }

    #[test]
    fn ground_accepts_steps_and_rejects_floor_above() {
        let scene = scene(vec![floor_plane(0.0), floor_plane(1.2), floor_plane(4.0)]);
        let p = Vec3::new(0.3, 0.0, 0.2);
        // 1.2 is within step tolerance, 4.0 is the storey above.
        assert!((scene.ground_height(p) - 1.2).abs() < 1.0e-5);
    }

    #[test]
    fn camera_is_pulled_in_front_of_occluder() {
        let scene = scene(vec![wall_at_x1()]);
        let origin = Vec3::new(-2.0, 1.0, 0.0);
        let ideal = Vec3::new(4.0, 1.0, 0.0);

        let safe = scene.camera_occlusion(origin, ideal);
        // Face at x = 1 is 3 units away; keep the 0.3 margin.
        assert!((safe.x - 0.7).abs() < 1.0e-4);
        assert!((safe.y - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn camera_pull_in_respects_min_distance() {
        let scene = scene(vec![wall_at_x1()]);
        let origin = Vec3::new(0.8, 1.0, 0.0);
        let safe = scene.camera_occlusion(origin, Vec3::new(4.0, 1.0, 0.0));
        assert!(((safe - origin).norm() - 0.5).abs() < 1.0e-4);
    }

    #[test]
    fn clear_camera_path_keeps_ideal() {
        let scene = scene(vec![wall_at_x1()]);
        let origin = Vec3::new(-2.0, 1.0, 0.0);
        let ideal = Vec3::new(-2.0, 1.0, 3.0);
        assert_eq!(scene.camera_occlusion(origin, ideal), ideal);
        assert_eq!(scene.camera_occlusion(origin, origin), origin);
    }

    #[test]
    fn rebuild_replaces_geometry() {
        let mut scene = scene(vec![wall_at_x1()]);
        assert_eq!(scene.mesh_count(), 1);

        scene.build(vec![floor_plane(0.0), floor_plane(4.0)]);
        assert_eq!(scene.mesh_count(), 2);
        assert!(!scene.is_wall_ahead(Vec3::new(0.5, 0.0, 0.0), Vec3::x(), 0.6));

        scene.clear();
        assert!(!scene.is_loaded());
    }
}
