/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Cluster registry: loaded descriptors plus the derived pixel assignment.
//!
//! # Assignment
//!
//! Clusters own contiguous logical ranges of the [`PixelOrdering`], in
//! descriptor order: the first descriptor owns slots `[0, n₀)`, the next
//! `[n₀, n₀ + n₁)`, and so on. Each slot's physical position is stamped into
//! the [`AssignmentGrid`] with the cluster's id.
//!
//! Pixel budgets are truncated so the ranges never run past `TOTAL_PIXELS`;
//! the stored descriptor's `pixel_count` is the truncated value. Cells not
//! covered by any range stay 0.
//!
//! # Invariants
//!
//! - Sum of loaded `pixel_count` ≤ `TOTAL_PIXELS`.
//! - Every grid cell holds an active cluster id or 0.
//! - Range sizes never change between loads; only swaps inside a range move pixels.
//! - Loading reads the *current* ordering, so loading the same descriptors
//!   twice in a row yields the same grid.

use core::ops::Range;

use rand::RngCore;

use crate::cohesion::{self, Swap};
use crate::descriptor::{ClusterDescriptor, DescriptorList, MAX_CLUSTERS};
use crate::grid::{AssignmentGrid, PixelOrdering, TOTAL_PIXELS};

/// A loaded cluster and the start of its logical range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterSlot {
    /// The clamped, budget-truncated descriptor.
    pub descriptor: ClusterDescriptor,
    /// First logical index owned by this cluster.
    pub offset: usize,
}

impl ClusterSlot {
    /// Logical index range `[offset, offset + pixel_count)`.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.descriptor.pixel_count as usize
    }
}

/// Descriptors, assignment grid and pixel ordering for one matrix.
#[derive(Clone, Debug)]
pub struct ClusterRegistry {
    slots: heapless::Vec<ClusterSlot, MAX_CLUSTERS>,
    grid: AssignmentGrid,
    ordering: PixelOrdering,
}

impl ClusterRegistry {
    /// Empty registry: no clusters, all-zero grid, identity ordering.
    pub fn new() -> Self {
        Self {
            slots: heapless::Vec::new(),
            grid: AssignmentGrid::new(),
            ordering: PixelOrdering::identity(),
        }
    }

    /// Replace the loaded clusters and rebuild the assignment grid.
    ///
    /// Descriptors past [`MAX_CLUSTERS`] are ignored. Returns the number of
    /// clusters loaded; with an empty input nothing changes and 0 is returned.
    pub fn load(&mut self, descriptors: &[ClusterDescriptor]) -> usize {
        if descriptors.is_empty() {
            return 0;
        }

        self.slots.clear();
        self.grid.clear();

        let mut offset = 0usize;
        for d in descriptors.iter().take(MAX_CLUSTERS) {
            let remaining = TOTAL_PIXELS - offset;
            let count = (d.pixel_count as usize).min(remaining);
            if count < d.pixel_count as usize {
                log::debug!(
                    "cluster {} truncated from {} to {} pixels",
                    d.cluster_id,
                    d.pixel_count,
                    count
                );
            }

            let mut descriptor = d.clone();
            descriptor.pixel_count = count as u8;
            for index in offset..offset + count {
                self.grid.set_position(self.ordering.position(index), d.cluster_id);
            }

            // `take(MAX_CLUSTERS)` bounds the push.
            let _ = self.slots.push(ClusterSlot { descriptor, offset });
            offset += count;
        }

        log::debug!(
            "loaded {} clusters, {} of {} pixels assigned",
            self.slots.len(),
            offset,
            TOTAL_PIXELS
        );
        self.slots.len()
    }

    /// Run one cohesion step for the cluster in slot `index`.
    ///
    /// Returns the swap performed, if any. Out-of-range slots are a no-op.
    pub fn step_cluster<R: RngCore>(&mut self, index: usize, rng: &mut R) -> Option<Swap> {
        let slot = self.slots.get(index)?;
        cohesion::step(
            &mut self.grid,
            &mut self.ordering,
            slot.range(),
            slot.descriptor.cluster_id,
            slot.descriptor.clustering_strength,
            rng,
        )
    }

    // ── Ordering control ───────────────────────────────────────────────────

    /// Restore the identity ordering. Takes effect at the next [`load`](Self::load).
    pub fn reset_ordering(&mut self) {
        self.ordering.reset();
    }

    /// Shuffle the ordering. Takes effect at the next [`load`](Self::load).
    pub fn shuffle_ordering<R: RngCore>(&mut self, rng: &mut R) {
        self.ordering.shuffle(rng);
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// Number of loaded clusters.
    pub fn num_clusters(&self) -> usize {
        self.slots.len()
    }

    /// Loaded clusters in descriptor order.
    pub fn slots(&self) -> &[ClusterSlot] {
        &self.slots
    }

    /// Loaded descriptors in order, as an owned fixed-capacity list.
    pub fn descriptors(&self) -> DescriptorList {
        self.slots.iter().map(|s| s.descriptor.clone()).collect()
    }

    /// First loaded descriptor with `cluster_id`.
    pub fn descriptor_for(&self, cluster_id: u8) -> Option<&ClusterDescriptor> {
        self.slots
            .iter()
            .map(|s| &s.descriptor)
            .find(|d| d.cluster_id == cluster_id)
    }

    /// The assignment grid.
    pub fn grid(&self) -> &AssignmentGrid {
        &self.grid
    }

    /// The pixel ordering.
    pub fn ordering(&self) -> &PixelOrdering {
        &self.ordering
    }

    /// Total pixels assigned across all loaded clusters.
    pub fn assigned_pixels(&self) -> usize {
        self.slots.iter().map(|s| s.descriptor.pixel_count as usize).sum()
    }
}

impl Default for ClusterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(id: u8, pixels: i32) -> ClusterDescriptor {
        ClusterDescriptor::new(id, pixels, 180, 3, 100, "TEST")
    }

    #[test]
    fn ranges_follow_descriptor_order() {
        let mut reg = ClusterRegistry::new();
        reg.load(&[holding(1, 10), holding(2, 5), holding(0, 89)]);
        assert_eq!(reg.slots()[0].range(), 0..10);
        assert_eq!(reg.slots()[1].range(), 10..15);
        assert_eq!(reg.slots()[2].range(), 15..104);
    }

    #[test]
    fn identity_ordering_stamps_leading_positions() {
        let mut reg = ClusterRegistry::new();
        reg.load(&[holding(3, 4)]);
        for p in 0..4 {
            assert_eq!(reg.grid().at_position(p), Some(3));
        }
        assert_eq!(reg.grid().count(3), 4);
        assert_eq!(reg.grid().count(0), TOTAL_PIXELS - 4);
    }

    #[test]
    fn over_budget_is_truncated() {
        let mut reg = ClusterRegistry::new();
        reg.load(&[holding(1, 60), holding(2, 60), holding(3, 60)]);
        assert_eq!(reg.slots()[0].descriptor.pixel_count, 60);
        assert_eq!(reg.slots()[1].descriptor.pixel_count, 44);
        assert_eq!(reg.slots()[2].descriptor.pixel_count, 0);
        assert_eq!(reg.assigned_pixels(), TOTAL_PIXELS);
        assert_eq!(reg.grid().count(3), 0);
    }

    #[test]
    fn empty_load_keeps_previous_state() {
        let mut reg = ClusterRegistry::new();
        reg.load(&[holding(1, 8)]);
        assert_eq!(reg.load(&[]), 0);
        assert_eq!(reg.num_clusters(), 1);
        assert_eq!(reg.grid().count(1), 8);
    }

    #[test]
    fn extra_descriptors_are_ignored() {
        let mut reg = ClusterRegistry::new();
        let many: [ClusterDescriptor; 8] = core::array::from_fn(|i| holding(i as u8, 2));
        assert_eq!(reg.load(&many), MAX_CLUSTERS);
        assert_eq!(reg.grid().count(6), 0);
        assert_eq!(reg.grid().count(7), 0);
    }

    #[test]
    fn load_follows_shuffled_ordering() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let mut reg = ClusterRegistry::new();
        reg.shuffle_ordering(&mut SmallRng::seed_from_u64(11));
        reg.load(&[holding(2, 7)]);
        for index in 0..7 {
            let p = reg.ordering().position(index);
            assert_eq!(reg.grid().at_position(p), Some(2));
        }
        assert_eq!(reg.grid().count(2), 7);
    }

    #[test]
    fn descriptor_lookup_by_id() {
        let mut reg = ClusterRegistry::new();
        reg.load(&[holding(1, 10), ClusterDescriptor::new(0, 94, 90, 5, 40, "")]);
        assert_eq!(reg.descriptor_for(0).map(|d| d.brightness), Some(90));
        assert_eq!(reg.descriptor_for(1).map(|d| d.clustering_strength), Some(3));
        assert!(reg.descriptor_for(4).is_none());
    }
}
