//! Grid cell helpers for the horizontal spatial partition.
//!
//! This module centralizes the world-to-cell mapping so the index and its callers agree
//! on which cell a point belongs to.
//!
//! # Model
//! - A [`CellCoord`] names one square column of space in the XZ plane.
//! - World units are meters; the cell size is a parameter (see [`crate::CELL_SIZE`]).
//! - Vertical extent is unbounded, the index only partitions the horizontal plane.
//!
//! # Mapping
//! - `x = floor(world_x / cell_size)`
//! - `z = floor(world_z / cell_size)`
//!
//! Negative coordinates map to negative cells; there is no offset or clamping to a fixed
//! world size, the backing map is sparse.

/// Integer coordinate of a grid cell in the XZ plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Maps a world position `(x, z)` to the cell containing it.
///
/// Float-to-int casts saturate, so absurd coordinates land on the outermost cells
/// instead of wrapping.
#[inline]
pub fn cell_of(x: f32, z: f32, cell_size: f32) -> CellCoord {
    let inv = 1.0 / cell_size;
    CellCoord {
        x: (x * inv).floor() as i32,
        z: (z * inv).floor() as i32,
    }
}

/// Returns the world position `(x, z)` of a cell's minimum corner.
#[inline]
pub fn cell_min_corner(cell: CellCoord, cell_size: f32) -> (f32, f32) {
    (cell.x as f32 * cell_size, cell.z as f32 * cell_size)
}

/// Returns the inclusive range of cells covered by the planar rectangle
/// `[min_x, max_x] x [min_z, max_z]`.
#[inline]
pub fn cells_covering(
    min_x: f32,
    min_z: f32,
    max_x: f32,
    max_z: f32,
    cell_size: f32,
) -> (CellCoord, CellCoord) {
    (
        cell_of(min_x, min_z, cell_size),
        cell_of(max_x, max_z, cell_size),
    )
}

/// Returns the 9 cells forming the 3x3 neighborhood around `center`.
///
/// Layout (top-down view, +Z = North):
///
/// [0] North-West | [1] North     | [2] North-East
/// ------------------------------------------------
/// [3] West       | [4] Center    | [5] East
/// ------------------------------------------------
/// [6] South-West | [7] South     | [8] South-East
#[inline]
pub fn neighborhood(center: CellCoord) -> [CellCoord; 9] {
    let CellCoord { x, z } = center;

    let x_west = x.saturating_sub(1);
    let x_east = x.saturating_add(1);
    let z_north = z.saturating_add(1);
    let z_south = z.saturating_sub(1);

    [
        CellCoord::new(x_west, z_north), // NW
        CellCoord::new(x, z_north),      // N
        CellCoord::new(x_east, z_north), // NE
        CellCoord::new(x_west, z),       // W
        center,                          // Center
        CellCoord::new(x_east, z),       // E
        CellCoord::new(x_west, z_south), // SW
        CellCoord::new(x, z_south),      // S
        CellCoord::new(x_east, z_south), // SE
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_of_floors_toward_negative_infinity() {
        assert_eq!(cell_of(0.0, 0.0, 10.0), CellCoord::new(0, 0));
        assert_eq!(cell_of(9.99, 9.99, 10.0), CellCoord::new(0, 0));
        assert_eq!(cell_of(10.0, 10.0, 10.0), CellCoord::new(1, 1));
        assert_eq!(cell_of(-0.01, -0.01, 10.0), CellCoord::new(-1, -1));
        assert_eq!(cell_of(-10.0, 25.0, 10.0), CellCoord::new(-1, 2));
    }

    #[test]
    fn min_corner_matches_cell_size_grid() {
        // Adjacent cells differ by exactly one cell size along the expected axis.
        let a = CellCoord::new(10, 20);
        let east = CellCoord::new(11, 20);
        let north = CellCoord::new(10, 21);

        let (ax, az) = cell_min_corner(a, 10.0);
        let (bx, bz) = cell_min_corner(east, 10.0);
        let (nx, nz) = cell_min_corner(north, 10.0);

        assert!((bx - ax - 10.0).abs() < 1.0e-6);
        assert!((bz - az).abs() < 1.0e-6);
        assert!((nx - ax).abs() < 1.0e-6);
        assert!((nz - az - 10.0).abs() < 1.0e-6);
    }

    #[test]
    fn min_corner_is_inside_its_own_cell() {
        for &(x, z) in &[(0, 0), (-3, 7), (12, -40), (-1, -1)] {
            let c = CellCoord::new(x, z);
            let (wx, wz) = cell_min_corner(c, 10.0);
            assert_eq!(cell_of(wx, wz, 10.0), c);
        }
    }

    #[test]
    fn covering_range_spans_rectangle_corners() {
        let (lo, hi) = cells_covering(-5.0, 3.0, 21.0, 9.0, 10.0);
        assert_eq!(lo, CellCoord::new(-1, 0));
        assert_eq!(hi, CellCoord::new(2, 0));
    }

    #[test]
    fn neighborhood_center_is_input() {
        let center = CellCoord::new(123, -45);
        let block = neighborhood(center);
        assert_eq!(block[4], center);
    }

    #[test]
    fn neighborhood_has_nine_distinct_cells_around_center() {
        let center = CellCoord::new(0, 0);
        let mut block = neighborhood(center).to_vec();
        block.sort();
        block.dedup();
        assert_eq!(block.len(), 9);
        for c in block {
            assert!((c.x - center.x).abs() <= 1);
            assert!((c.z - center.z).abs() <= 1);
        }
    }

    #[test]
    fn extreme_positions_saturate_instead_of_wrapping() {
        let huge = 1.0e30;
        let c = cell_of(huge, -huge, 10.0);
        assert_eq!(c, CellCoord::new(i32::MAX, i32::MIN));

        // The block around an edge cell must not wrap to the other side of the map.
        let block = neighborhood(c);
        assert!(block.iter().all(|n| n.x >= i32::MAX - 1 && n.z <= i32::MIN + 1));
    }
}
