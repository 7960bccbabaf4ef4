//! Matrix geometry, the assignment grid and the pixel ordering.
//!
//! Physical positions are row-major linear indices: `position = y * WIDTH + x`.
//!
//! - [`AssignmentGrid`] maps every cell to the owning cluster id (0 = background
//!   or unassigned).
//! - [`PixelOrdering`] maps a logical slot to a physical position. Clusters own
//!   contiguous slot ranges; moving a pixel means swapping two slots.
//!
//! Both are plain arrays sized at compile time.

use rand::{Rng, RngCore};

/// Matrix width in pixels.
pub const WIDTH: usize = 13;

/// Matrix height in pixels.
pub const HEIGHT: usize = 8;

/// Total pixel capacity of the matrix.
pub const TOTAL_PIXELS: usize = WIDTH * HEIGHT;

/// Convert a linear position into `(x, y)`.
#[inline]
pub fn position_to_xy(position: usize) -> (usize, usize) {
    (position % WIDTH, position / WIDTH)
}

/// Convert `(x, y)` into a linear position.
#[inline]
pub fn xy_to_position(x: usize, y: usize) -> usize {
    y * WIDTH + x
}

// ─── AssignmentGrid ──────────────────────────────────────────────────────────

/// Cell → cluster id lookup, `HEIGHT` rows of `WIDTH` cells.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentGrid {
    cells: [[u8; WIDTH]; HEIGHT],
}

impl AssignmentGrid {
    /// An all-background grid.
    pub const fn new() -> Self {
        Self { cells: [[0; WIDTH]; HEIGHT] }
    }

    /// Reset every cell to 0.
    pub fn clear(&mut self) {
        self.cells = [[0; WIDTH]; HEIGHT];
    }

    /// Cluster id at `(x, y)`, or `None` outside the matrix.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Cluster id at a linear position, or `None` past the end.
    #[inline]
    pub fn at_position(&self, position: usize) -> Option<u8> {
        if position >= TOTAL_PIXELS {
            return None;
        }
        let (x, y) = position_to_xy(position);
        Some(self.cells[y][x])
    }

    /// Set the cluster id of a linear position. Out-of-range positions are ignored.
    #[inline]
    pub fn set_position(&mut self, position: usize, cluster_id: u8) {
        if position < TOTAL_PIXELS {
            let (x, y) = position_to_xy(position);
            self.cells[y][x] = cluster_id;
        }
    }

    /// Exchange the cluster ids stored at two linear positions.
    pub fn swap_positions(&mut self, a: usize, b: usize) {
        if a >= TOTAL_PIXELS || b >= TOTAL_PIXELS {
            return;
        }
        let (ax, ay) = position_to_xy(a);
        let (bx, by) = position_to_xy(b);
        let tmp = self.cells[ay][ax];
        self.cells[ay][ax] = self.cells[by][bx];
        self.cells[by][bx] = tmp;
    }

    /// Number of cells holding `cluster_id`.
    pub fn count(&self, cluster_id: u8) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == cluster_id)
            .count()
    }

    /// Row-major view of the cells.
    pub fn rows(&self) -> &[[u8; WIDTH]; HEIGHT] {
        &self.cells
    }
}

impl Default for AssignmentGrid {
    fn default() -> Self {
        Self::new()
    }
}

// ─── PixelOrdering ───────────────────────────────────────────────────────────

/// Logical slot → physical position.
///
/// Always a permutation of `0..TOTAL_PIXELS`; the only mutations are swaps
/// and a full reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelOrdering {
    slots: [u8; TOTAL_PIXELS],
}

impl PixelOrdering {
    /// Identity ordering: slot `i` holds position `i`.
    pub fn identity() -> Self {
        let mut slots = [0u8; TOTAL_PIXELS];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self { slots }
    }

    /// Restore the identity ordering.
    pub fn reset(&mut self) {
        *self = Self::identity();
    }

    /// Fisher–Yates shuffle driven by `rng`.
    pub fn shuffle<R: RngCore>(&mut self, rng: &mut R) {
        for i in (1..TOTAL_PIXELS).rev() {
            let j = rng.gen_range(0..=i);
            self.slots.swap(i, j);
        }
    }

    /// Physical position held by logical slot `index`.
    #[inline]
    pub fn position(&self, index: usize) -> usize {
        self.slots[index] as usize
    }

    /// Exchange the physical positions of two logical slots.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// All slots in logical order.
    pub fn as_slice(&self) -> &[u8] {
        &self.slots
    }
}

impl Default for PixelOrdering {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn position_round_trips_through_xy() {
        assert_eq!(position_to_xy(0), (0, 0));
        assert_eq!(position_to_xy(12), (12, 0));
        assert_eq!(position_to_xy(13), (0, 1));
        assert_eq!(position_to_xy(103), (12, 7));
        assert_eq!(xy_to_position(5, 3), 44);
    }

    #[test]
    fn grid_get_out_of_bounds_is_none() {
        let grid = AssignmentGrid::new();
        assert_eq!(grid.get(WIDTH, 0), None);
        assert_eq!(grid.get(0, HEIGHT), None);
        assert_eq!(grid.get(WIDTH - 1, HEIGHT - 1), Some(0));
        assert_eq!(grid.at_position(TOTAL_PIXELS), None);
    }

    #[test]
    fn swap_positions_exchanges_ids() {
        let mut grid = AssignmentGrid::new();
        grid.set_position(3, 2);
        grid.set_position(50, 4);
        grid.swap_positions(3, 50);
        assert_eq!(grid.at_position(3), Some(4));
        assert_eq!(grid.at_position(50), Some(2));
        assert_eq!(grid.count(2), 1);
        assert_eq!(grid.count(4), 1);
    }

    #[test]
    fn shuffle_keeps_a_permutation() {
        let mut ordering = PixelOrdering::identity();
        let mut rng = SmallRng::seed_from_u64(7);
        ordering.shuffle(&mut rng);

        let mut seen = [false; TOTAL_PIXELS];
        for &p in ordering.as_slice() {
            assert!(!seen[p as usize], "position {} appears twice", p);
            seen[p as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_ne!(ordering, PixelOrdering::identity());
    }
}
