use std::collections::HashMap;

use log::warn;
use rapier3d::parry::bounding_volume::Aabb;

use super::types::{MeshId, Vec3};
use crate::cell::{CellCoord, cell_of, cells_covering, neighborhood};

/// Uniform horizontal grid mapping cells to the meshes whose bounds overlap them.
///
/// Notes:
/// - A mesh is listed in every cell its planar AABB touches, so one lookup per cell
///   is enough to find every mesh that can intersect that column.
/// - Queries return the union of the 3x3 block around the query cell. A mesh spanning
///   several of those cells is reported once.
/// - The grid holds ids only; geometry lives in the owning scene.
/// - Meshes covering more than [`MAX_CELLS_PER_MESH`] cells (huge ground planes) are
///   kept in a separate list and returned by every query instead of being bucketed.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<MeshId>>,
    oversized: Vec<MeshId>,
}

/// Footprint, in cells, above which a mesh skips bucketing.
pub const MAX_CELLS_PER_MESH: u64 = 4096;

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Register `id` in every cell overlapped by the planar footprint of `aabb`.
    ///
    /// Bounds with non-finite coordinates are skipped with a warning, since they would
    /// cover an unbounded number of cells.
    pub fn insert(&mut self, id: MeshId, aabb: &Aabb) {
        let finite = aabb.mins.iter().chain(aabb.maxs.iter()).all(|c| c.is_finite());
        if !finite {
            warn!("Skipping mesh {:?} with non-finite bounds", id);
            return;
        }

        let (lo, hi) = cells_covering(
            aabb.mins.x,
            aabb.mins.z,
            aabb.maxs.x,
            aabb.maxs.z,
            self.cell_size,
        );
        let footprint = (i64::from(hi.x) - i64::from(lo.x) + 1) as u64
            * (i64::from(hi.z) - i64::from(lo.z) + 1) as u64;
        if footprint > MAX_CELLS_PER_MESH {
            warn!(
                "Mesh {:?} spans {} cells; it will be tested by every query",
                id, footprint
            );
            if !self.oversized.contains(&id) {
                self.oversized.push(id);
            }
            return;
        }

        for x in lo.x..=hi.x {
            for z in lo.z..=hi.z {
                let bucket = self.cells.entry(CellCoord::new(x, z)).or_default();
                if !bucket.contains(&id) {
                    bucket.push(id);
                }
            }
        }
    }

    /// Meshes registered in the 3x3 block of cells around `position`, sorted by id.
    pub fn query(&self, position: Vec3) -> Vec<MeshId> {
        let center = cell_of(position.x, position.z, self.cell_size);
        let mut out: Vec<MeshId> = neighborhood(center)
            .iter()
            .filter_map(|c| self.cells.get(c))
            .flatten()
            .chain(&self.oversized)
            .copied()
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Meshes registered in exactly `cell`.
    pub fn cell(&self, cell: CellCoord) -> &[MeshId] {
        self.cells.get(&cell).map_or(&[], Vec::as_slice)
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.oversized.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.oversized.is_empty()
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
