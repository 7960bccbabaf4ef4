/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Cohesion engine: one stochastic local-search step per cluster per frame.
//!
//! # Algorithm
//!
//! For a cluster owning logical range `[offset, offset + n)`:
//!
//! 1. **Isolation pick**: draw `strength` indices uniformly (with replacement)
//!    from the range and score each physical cell with
//!    `same_cluster_neighbors − other_cluster_neighbors`. Keep the highest
//!    score; ties keep the first draw.
//! 2. **Target pick**: an independent pass with the same draw and scoring rule.
//! 3. If the two picks differ, swap their slots in the ordering and exchange
//!    the grid ids at both physical positions.
//!
//! Cost per step is `O(strength)`, independent of cluster size.
//!
//! Both passes maximise. The isolation pass does not look for the lowest
//! score; its "isolated" pick relies on sampling variance alone. This is the
//! behaviour the animation is tuned against and is kept as is.

use core::ops::Range;

use rand::{Rng, RngCore};

use crate::grid::{position_to_xy, AssignmentGrid, PixelOrdering};
use crate::neighbor::cohesion_score;

/// Starting score for a selection pass; every real score beats it.
const WORST_SCORE: i8 = i8::MIN;

/// A swap of two logical slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Swap {
    /// Logical index of the isolation pick.
    pub isolated: usize,
    /// Logical index of the target pick.
    pub target: usize,
}

/// Sample `samples` indices from `range` and return the best-scoring one.
///
/// Falls back to the last draw if no draw beat [`WORST_SCORE`].
/// An empty `range` draws nothing and returns `range.start`.
pub fn select_best<R: RngCore>(
    grid: &AssignmentGrid,
    ordering: &PixelOrdering,
    range: Range<usize>,
    cluster_id: u8,
    samples: u8,
    rng: &mut R,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let mut best_score = WORST_SCORE;
    let mut best: Option<usize> = None;
    let mut last = range.start;

    for _ in 0..samples {
        let index = rng.gen_range(range.clone());
        last = index;
        let (x, y) = position_to_xy(ordering.position(index));
        let score = cohesion_score(grid, x, y, cluster_id);
        if score > best_score {
            best_score = score;
            best = Some(index);
        }
    }

    best.unwrap_or(last)
}

/// Run one cohesion step over `range`.
///
/// Returns the swap performed, or `None` for an empty range or coinciding picks.
pub fn step<R: RngCore>(
    grid: &mut AssignmentGrid,
    ordering: &mut PixelOrdering,
    range: Range<usize>,
    cluster_id: u8,
    strength: u8,
    rng: &mut R,
) -> Option<Swap> {
    if range.is_empty() {
        return None;
    }

    let isolated = select_best(grid, ordering, range.clone(), cluster_id, strength, rng);
    let target = select_best(grid, ordering, range, cluster_id, strength, rng);
    if isolated == target {
        return None;
    }

    let a = ordering.position(isolated);
    let b = ordering.position(target);
    ordering.swap(isolated, target);
    grid.swap_positions(a, b);

    log::trace!(
        "cluster {}: swapped slots {} <-> {} (positions {} <-> {})",
        cluster_id,
        isolated,
        target,
        a,
        b
    );
    Some(Swap { isolated, target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TOTAL_PIXELS;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn stamped(range: Range<usize>, id: u8) -> (AssignmentGrid, PixelOrdering) {
        let ordering = PixelOrdering::identity();
        let mut grid = AssignmentGrid::new();
        for i in range {
            grid.set_position(ordering.position(i), id);
        }
        (grid, ordering)
    }

    #[test]
    fn empty_range_never_swaps() {
        let (mut grid, mut ordering) = stamped(0..0, 1);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(step(&mut grid, &mut ordering, 5..5, 1, 10, &mut rng), None);
        assert_eq!(ordering, PixelOrdering::identity());
    }

    #[test]
    fn single_pixel_cluster_never_swaps() {
        let (mut grid, mut ordering) = stamped(40..41, 2);
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..50 {
            assert_eq!(step(&mut grid, &mut ordering, 40..41, 2, 10, &mut rng), None);
        }
    }

    #[test]
    fn swaps_stay_inside_the_range() {
        let (mut grid, mut ordering) = stamped(20..50, 3);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            if let Some(s) = step(&mut grid, &mut ordering, 20..50, 3, 4, &mut rng) {
                assert!((20..50).contains(&s.isolated));
                assert!((20..50).contains(&s.target));
                assert_ne!(s.isolated, s.target);
            }
        }
        assert_eq!(grid.count(3), 30);
        // Slots outside the range are untouched.
        for i in (0..20).chain(50..TOTAL_PIXELS) {
            assert_eq!(ordering.position(i), i);
        }
    }

    #[test]
    fn grid_tracks_ordering_after_many_steps() {
        let (mut grid, mut ordering) = stamped(0..30, 1);
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..1000 {
            step(&mut grid, &mut ordering, 0..30, 1, 6, &mut rng);
        }
        for i in 0..30 {
            assert_eq!(grid.at_position(ordering.position(i)), Some(1));
        }
    }

    #[test]
    fn single_sample_picks_the_draw() {
        let (grid, ordering) = stamped(0..10, 1);
        let mut a = SmallRng::seed_from_u64(9);
        let mut b = SmallRng::seed_from_u64(9);
        let picked = select_best(&grid, &ordering, 0..10, 1, 1, &mut a);
        let drawn = b.gen_range(0..10usize);
        assert_eq!(picked, drawn);
    }

    #[test]
    fn equal_scores_keep_the_first_draw() {
        // Nothing assigned: every cell scores 0 for cluster 1.
        let grid = AssignmentGrid::new();
        let ordering = PixelOrdering::identity();
        for seed in 0..20 {
            let mut a = SmallRng::seed_from_u64(seed);
            let mut b = SmallRng::seed_from_u64(seed);
            let picked = select_best(&grid, &ordering, 0..50, 1, 8, &mut a);
            let first = b.gen_range(0..50usize);
            assert_eq!(picked, first, "seed {}", seed);
        }
    }

    #[test]
    fn empty_range_selects_without_drawing() {
        let grid = AssignmentGrid::new();
        let ordering = PixelOrdering::identity();
        let mut rng = SmallRng::seed_from_u64(6);
        assert_eq!(select_best(&grid, &ordering, 7..7, 1, 10, &mut rng), 7);
    }

    #[test]
    fn best_of_many_samples_finds_the_interior() {
        // Cluster 1 fills a 3×3 block at the top-left; its centre (1,1) is the
        // only cell with 8 same-cluster neighbours. Ordering puts that centre
        // into the range together with two weaker cells.
        let mut grid = AssignmentGrid::new();
        for y in 0..3 {
            for x in 0..3 {
                grid.set_position(crate::grid::xy_to_position(x, y), 1);
            }
        }
        let mut ordering = PixelOrdering::identity();
        // slot 0 → position 14 (1,1); slots 1, 2 stay at positions 1, 2.
        ordering.swap(0, 14);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut found = false;
        for _ in 0..20 {
            if select_best(&grid, &ordering, 0..3, 1, 10, &mut rng) == 0 {
                found = true;
                break;
            }
        }
        assert!(found, "10 samples from 3 slots should hit the best cell");
    }
}
