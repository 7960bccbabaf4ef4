/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! 8-neighbourhood scoring on the assignment grid.
//!
//! Pure functions. Neighbours outside the matrix are absent: they count
//! neither as same-cluster nor as other-cluster, and there is no wraparound.
//! A corner cell therefore sees at most 3 neighbours, an edge cell 5 and an
//! interior cell 8.

use crate::grid::{AssignmentGrid, HEIGHT, WIDTH};

/// Offsets of the eight surrounding cells.
const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Cluster ids of the in-bounds neighbours of `(x, y)`.
fn neighbors(grid: &AssignmentGrid, x: usize, y: usize) -> impl Iterator<Item = u8> + '_ {
    OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx >= WIDTH as isize || ny >= HEIGHT as isize {
            return None;
        }
        grid.get(nx as usize, ny as usize)
    })
}

/// Number of in-bounds neighbours of `(x, y)` holding `target_cluster_id`.
pub fn same_cluster_neighbor_count(
    grid: &AssignmentGrid,
    x: usize,
    y: usize,
    target_cluster_id: u8,
) -> u8 {
    neighbors(grid, x, y)
        .filter(|&id| id == target_cluster_id)
        .count() as u8
}

/// Number of in-bounds neighbours of `(x, y)` owned by a non-zero cluster
/// other than `own_cluster_id`.
pub fn other_cluster_neighbor_count(
    grid: &AssignmentGrid,
    x: usize,
    y: usize,
    own_cluster_id: u8,
) -> u8 {
    neighbors(grid, x, y)
        .filter(|&id| id != 0 && id != own_cluster_id)
        .count() as u8
}

/// Cohesion score: same-cluster neighbours minus other-cluster neighbours.
///
/// Range `[-8, 8]`.
#[inline]
pub fn cohesion_score(grid: &AssignmentGrid, x: usize, y: usize, cluster_id: u8) -> i8 {
    same_cluster_neighbor_count(grid, x, y, cluster_id) as i8
        - other_cluster_neighbor_count(grid, x, y, cluster_id) as i8
}
