use rapier3d::parry::query::{Ray, RayCast};

use super::{
    mesh::CollisionMesh,
    types::{MeshId, Point, RayHit, Vec3},
};

/// Cast a ray against a set of candidate meshes and return every hit, nearest first.
///
/// - `dir` must be unit length; hit distances are measured along it.
/// - Candidates whose AABB the ray misses are skipped; inside a mesh only triangles
///   whose BVH leaf the ray crosses are tested.
/// - Triangles are two-sided and the returned normal always faces the ray origin.
/// - Ids that do not resolve in `meshes` are ignored.
pub fn cast_ray_all(
    meshes: &[CollisionMesh],
    candidates: &[MeshId],
    origin: Point,
    dir: Vec3,
    max_distance: f32,
) -> Vec<RayHit> {
    let mut hits = Vec::new();
    if !(max_distance > 0.0) || !dir.iter().all(|c| c.is_finite()) {
        return hits;
    }

    let ray = Ray::new(origin, dir);
    for &id in candidates {
        let Some(mesh) = meshes.get(id.index()) else {
            continue;
        };
        if !mesh.aabb().intersects_local_ray(&ray, max_distance) {
            continue;
        }
        for tri in mesh.ray_candidates(&ray, max_distance) {
            if let Some(hit) = tri.cast_local_ray_and_get_normal(&ray, max_distance, true) {
                let mut normal = hit.normal;
                if normal.dot(&dir) > 0.0 {
                    normal = -normal;
                }
                hits.push(RayHit {
                    mesh: id,
                    distance: hit.time_of_impact,
                    point: ray.point_at(hit.time_of_impact),
                    normal,
                });
            }
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Nearest hit among `candidates`, if any.
pub fn cast_ray_nearest(
    meshes: &[CollisionMesh],
    candidates: &[MeshId],
    origin: Point,
    dir: Vec3,
    max_distance: f32,
) -> Option<RayHit> {
    cast_ray_all(meshes, candidates, origin, dir, max_distance)
        .into_iter()
        .next()
}
