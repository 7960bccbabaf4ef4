/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Host-facing engine: configuration application and the per-frame update.
//!
//! [`PortfolioEngine`] owns everything the animation mutates (registry,
//! timers and random source), so several engines can run side by side and
//! tests need no global reset.
//!
//! ```rust
//! use pixel_cluster::engine::PortfolioEngine;
//!
//! let mut engine = PortfolioEngine::with_seed(7);
//! engine.apply_configuration(
//!     br#"[{"cluster_id":1,"pixels":20,"brightness":180,"clustering":3,"speed":100,"symbol":"AAPL"},
//!          {"cluster_id":0,"pixels":84,"brightness":90,"clustering":4,"speed":100}]"#,
//! );
//! assert!(engine.is_active());
//!
//! let summary = engine.update(100);
//! assert_eq!(summary.clusters_run, 2);
//! assert_eq!(engine.registry().grid().count(1), 20);
//! ```
//!
//! Both entry points run to completion synchronously and must be called from
//! one control loop. Multi-threaded hosts keep the engine behind a single
//! owner (a mutex or a dedicated task).

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::cohesion::Swap;
use crate::descriptor::{ClusterDescriptor, DescriptorList};
use crate::grid::AssignmentGrid;
use crate::registry::ClusterRegistry;
use crate::scheduler::{Clock, FrameScheduler};
use crate::wire::{self, DecodeStop};

/// What one [`PortfolioEngine::update`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Clusters whose period had elapsed and that ran a cohesion step.
    pub clusters_run: usize,
    /// Swaps performed across those clusters.
    pub swaps: usize,
}

/// Result of [`PortfolioEngine::apply_configuration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Clusters loaded; 0 means the engine is now inactive.
    pub clusters: usize,
    /// Why decoding stopped.
    pub stop: DecodeStop,
}

/// Multi-cluster portfolio animation engine.
#[derive(Clone, Debug)]
pub struct PortfolioEngine<R: RngCore = SmallRng> {
    registry: ClusterRegistry,
    scheduler: FrameScheduler,
    rng: R,
    active: bool,
}

impl PortfolioEngine<SmallRng> {
    /// Engine with a `SmallRng` seeded from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> PortfolioEngine<R> {
    /// Inactive engine with an empty registry and identity ordering.
    pub fn new(rng: R) -> Self {
        Self {
            registry: ClusterRegistry::new(),
            scheduler: FrameScheduler::new(),
            rng,
            active: false,
        }
    }

    // ── Configuration ──────────────────────────────────────────────────────

    /// Decode a wire-format descriptor list and apply it.
    ///
    /// Decoding is tolerant (see [`crate::wire`]). If no cluster survives,
    /// the engine goes inactive and keeps its previous grid.
    pub fn apply_configuration(&mut self, raw: &[u8]) -> ApplyOutcome {
        let decoded = wire::decode(raw);
        let descriptors: DescriptorList = decoded
            .records
            .iter()
            .map(ClusterDescriptor::from_raw)
            .collect();
        let clusters = self.apply_descriptors(&descriptors);
        ApplyOutcome { clusters, stop: decoded.stop }
    }

    /// Apply already-built descriptors. Returns the number of clusters loaded.
    ///
    /// Out-of-range fields are clamped again here, so hand-built descriptors
    /// obey the same bounds as decoded ones.
    pub fn apply_descriptors(&mut self, descriptors: &[ClusterDescriptor]) -> usize {
        let clamped: DescriptorList = descriptors
            .iter()
            .take(crate::descriptor::MAX_CLUSTERS)
            .map(clamp_descriptor)
            .collect();

        let loaded = self.registry.load(&clamped);
        if loaded == 0 {
            log::warn!("configuration has no clusters; portfolio mode disabled");
            self.active = false;
            return 0;
        }

        self.scheduler.reset();
        self.active = true;
        loaded
    }

    /// Leave portfolio mode. The grid keeps its last state.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Restore the identity ordering; takes effect on the next apply.
    pub fn reset_ordering(&mut self) {
        self.registry.reset_ordering();
    }

    /// Shuffle the ordering with the engine's RNG; takes effect on the next apply.
    pub fn shuffle_ordering(&mut self) {
        self.registry.shuffle_ordering(&mut self.rng);
    }

    // ── Frame update ───────────────────────────────────────────────────────

    /// Advance the animation to `now_ms`.
    ///
    /// Every cluster whose period has elapsed since its last run gets one
    /// cohesion step. No-op while inactive.
    pub fn update(&mut self, now_ms: u64) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        if !self.active {
            return summary;
        }

        for index in 0..self.registry.num_clusters() {
            let period = self.registry.slots()[index].descriptor.animation_speed_ms;
            if !self.scheduler.try_run(index, period, now_ms) {
                continue;
            }
            summary.clusters_run += 1;
            if self.step(index).is_some() {
                summary.swaps += 1;
            }
        }
        summary
    }

    /// [`update`](Self::update) reading the time from `clock`.
    pub fn update_with_clock<C: Clock + ?Sized>(&mut self, clock: &C) -> UpdateSummary {
        self.update(clock.now_ms())
    }

    fn step(&mut self, index: usize) -> Option<Swap> {
        self.registry.step_cluster(index, &mut self.rng)
    }

    // ── Display view ───────────────────────────────────────────────────────

    /// `true` while portfolio mode is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The registry (descriptors, grid, ordering).
    pub fn registry(&self) -> &ClusterRegistry {
        &self.registry
    }

    /// The assignment grid.
    pub fn grid(&self) -> &AssignmentGrid {
        self.registry.grid()
    }

    /// Cluster id at `(x, y)`, `None` outside the matrix.
    pub fn cluster_at(&self, x: usize, y: usize) -> Option<u8> {
        self.registry.grid().get(x, y)
    }

    /// Brightness of `cluster_id`, if loaded.
    pub fn brightness_of(&self, cluster_id: u8) -> Option<u8> {
        self.registry.descriptor_for(cluster_id).map(|d| d.brightness)
    }

    /// Clustering strength of `cluster_id`, if loaded.
    pub fn clustering_strength_of(&self, cluster_id: u8) -> Option<u8> {
        self.registry
            .descriptor_for(cluster_id)
            .map(|d| d.clustering_strength)
    }

    /// The scheduler timers.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}

fn clamp_descriptor(d: &ClusterDescriptor) -> ClusterDescriptor {
    ClusterDescriptor::from_raw(&crate::descriptor::RawDescriptor {
        cluster_id: d.cluster_id as i32,
        pixels: d.pixel_count as i32,
        brightness: d.brightness as i32,
        clustering: d.clustering_strength as i32,
        speed: d.animation_speed_ms as i32,
        symbol: d.label.clone(),
    })
}
