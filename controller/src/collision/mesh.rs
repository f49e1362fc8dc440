use log::warn;
use rapier3d::parry::{
    bounding_volume::{Aabb, BoundingVolume},
    partitioning::{Bvh, BvhBuildStrategy},
    query::Ray,
    shape::Triangle,
};

use super::types::{Mat4, Point, Vec3};
use crate::error::ControllerError;

/// Triangles with an area below this (m^2) are dropped when baking.
pub const DEGENERATE_AREA: f32 = 1.0e-10;

/// Padding added to each triangle's box in the BVH. Axis-aligned triangles have flat
/// boxes, and a ray grazing one must still reach the triangle test.
const LEAF_PADDING: f32 = 1.0e-4;

/// Static collision geometry baked into world space.
///
/// The host hands over raw vertex/index buffers plus the placement of the mesh;
/// everything is transformed once here so ray queries work on world coordinates.
/// A BVH over the triangles keeps ray queries sublinear for large imported meshes.
#[derive(Clone, Debug)]
pub struct CollisionMesh {
    triangles: Vec<Triangle>,
    bvh: Bvh,
    aabb: Aabb,
}

impl CollisionMesh {
    /// Bake an indexed triangle list with the given world transform.
    ///
    /// Errors when the index buffer is malformed or when every triangle is degenerate.
    /// Individual degenerate triangles are skipped.
    pub fn from_indexed(
        vertices: &[[f32; 3]],
        indices: &[u32],
        world: &Mat4,
    ) -> Result<Self, ControllerError> {
        if indices.len() % 3 != 0 {
            return Err(ControllerError::IndexCountNotTriangles(indices.len()));
        }

        let mut baked = Vec::with_capacity(vertices.len());
        for v in vertices {
            if !v.iter().all(|c| c.is_finite()) {
                return Err(ControllerError::NonFiniteVertex);
            }
            baked.push(world.transform_point(&Point::new(v[0], v[1], v[2])));
        }

        let fetch = |index: u32| {
            baked
                .get(index as usize)
                .copied()
                .ok_or(ControllerError::IndexOutOfRange {
                    index,
                    vertex_count: vertices.len(),
                })
        };

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            triangles.push(Triangle::new(fetch(tri[0])?, fetch(tri[1])?, fetch(tri[2])?));
        }

        Self::from_triangles(triangles)
    }

    /// Build from world-space triangles, dropping degenerate ones.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Result<Self, ControllerError> {
        let total = triangles.len();
        let triangles: Vec<Triangle> = triangles
            .into_iter()
            .filter(|t| triangle_area(t) > DEGENERATE_AREA)
            .collect();

        if triangles.len() < total {
            warn!(
                "Dropped {} degenerate triangle(s) out of {}",
                total - triangles.len(),
                total
            );
        }

        let Some(first) = triangles.first() else {
            return Err(ControllerError::EmptyMesh);
        };

        let mut mins = first.a;
        let mut maxs = first.a;
        for t in &triangles {
            for p in [t.a, t.b, t.c] {
                mins = mins.inf(&p);
                maxs = maxs.sup(&p);
            }
        }

        let bvh = Bvh::from_iter(
            BvhBuildStrategy::Binned,
            triangles
                .iter()
                .map(|t| t.local_aabb().loosened(LEAF_PADDING))
                .enumerate(),
        );

        Ok(Self {
            triangles,
            bvh,
            aabb: Aabb::new(mins, maxs),
        })
    }

    /// Axis-aligned box as 12 outward-wound triangles. Used for blockout geometry.
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Result<Self, ControllerError> {
        let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);
        let corners: Vec<[f32; 3]> = [
            [-hx, -hy, -hz],
            [hx, -hy, -hz],
            [hx, hy, -hz],
            [-hx, hy, -hz],
            [-hx, -hy, hz],
            [hx, -hy, hz],
            [hx, hy, hz],
            [-hx, hy, hz],
        ]
        .into_iter()
        .map(|[x, y, z]| [x + center.x, y + center.y, z + center.z])
        .collect();

        #[rustfmt::skip]
        const INDICES: [u32; 36] = [
            0, 2, 1, 0, 3, 2, // -Z
            4, 5, 6, 4, 6, 7, // +Z
            0, 4, 7, 0, 7, 3, // -X
            1, 2, 6, 1, 6, 5, // +X
            0, 1, 5, 0, 5, 4, // -Y
            3, 7, 6, 3, 6, 2, // +Y
        ];

        Self::from_indexed(&corners, &INDICES, &Mat4::identity())
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangles whose BVH leaf the ray crosses within `max_distance`.
    pub fn ray_candidates<'a>(
        &'a self,
        ray: &'a Ray,
        max_distance: f32,
    ) -> impl Iterator<Item = &'a Triangle> + 'a {
        self.bvh
            .leaves(move |node| node.cast_ray(ray, max_distance) <= max_distance)
            .filter_map(|leaf| self.triangles.get(leaf as usize))
    }

    /// World-space bounds of every triangle in the mesh.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }
}

#[inline]
fn triangle_area(t: &Triangle) -> f32 {
    (t.b - t.a).cross(&(t.c - t.a)).norm() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn bakes_world_transform_into_vertices() {
        let world = Mat4::new_translation(&Vec3::new(10.0, 2.0, -5.0));
        let mesh = CollisionMesh::from_indexed(&quad_vertices(), &[0, 1, 2, 0, 2, 3], &world)
            .expect("valid quad");

        assert_eq!(mesh.triangles().len(), 2);
        assert!((mesh.aabb().mins.x - 10.0).abs() < 1.0e-6);
        assert!((mesh.aabb().mins.y - 2.0).abs() < 1.0e-6);
        assert!((mesh.aabb().maxs.z + 4.0).abs() < 1.0e-6);
    }

    #[test]
    fn rejects_partial_index_buffer() {
        let err = CollisionMesh::from_indexed(&quad_vertices(), &[0, 1], &Mat4::identity())
            .unwrap_err();
        assert!(matches!(err, ControllerError::IndexCountNotTriangles(2)));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = CollisionMesh::from_indexed(&quad_vertices(), &[0, 1, 9], &Mat4::identity())
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::IndexOutOfRange {
                index: 9,
                vertex_count: 4
            }
        ));
    }

    #[test]
    fn rejects_non_finite_vertices() {
        let mut verts = quad_vertices();
        verts[1][0] = f32::NAN;
        let err =
            CollisionMesh::from_indexed(&verts, &[0, 1, 2], &Mat4::identity()).unwrap_err();
        assert!(matches!(err, ControllerError::NonFiniteVertex));
    }

    #[test]
    fn drops_degenerate_triangles_and_keeps_the_rest() {
        // Second triangle repeats a vertex.
        let mesh = CollisionMesh::from_indexed(
            &quad_vertices(),
            &[0, 1, 2, 0, 0, 3],
            &Mat4::identity(),
        )
        .expect("one valid triangle remains");
        assert_eq!(mesh.triangles().len(), 1);
    }

    #[test]
    fn all_degenerate_is_empty_mesh() {
        let err = CollisionMesh::from_indexed(&quad_vertices(), &[0, 0, 1], &Mat4::identity())
            .unwrap_err();
        assert!(matches!(err, ControllerError::EmptyMesh));
    }

    #[test]
    fn ray_candidates_skip_triangles_off_the_ray() {
        // A row of 100 separate ground quads along +X.
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for i in 0..100u32 {
            let x = i as f32;
            vertices.extend([[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x + 1.0, 0.0, 1.0], [x, 0.0, 1.0]]);
            let b = i * 4;
            indices.extend([b, b + 1, b + 2, b, b + 2, b + 3]);
        }
        let mesh = CollisionMesh::from_indexed(&vertices, &indices, &Mat4::identity())
            .expect("ground strip");
        assert_eq!(mesh.triangles().len(), 200);

        let ray = Ray::new(Point::new(42.3, 5.0, 0.6), -Vec3::y());
        let candidates: Vec<_> = mesh.ray_candidates(&ray, 10.0).collect();
        assert!(!candidates.is_empty());
        assert!(candidates.len() <= 4);
        assert!(candidates.iter().all(|t| t.a.x >= 41.0 && t.a.x <= 43.0));

        // Out of reach: nothing below within range.
        assert_eq!(mesh.ray_candidates(&ray, 4.0).count(), 0);
    }

    #[test]
    fn cuboid_bounds_match_extents() {
        let mesh = CollisionMesh::cuboid(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 1.0, 2.0))
            .expect("cuboid");
        assert_eq!(mesh.triangles().len(), 12);
        assert_eq!(mesh.aabb().mins, Point::new(0.5, 1.0, 1.0));
        assert_eq!(mesh.aabb().maxs, Point::new(1.5, 3.0, 5.0));
    }
}
