//! Display snapshot: everything an external renderer needs for one frame.
//!
//! The renderer picks colours from each cell's cluster id and that cluster's
//! brightness and clustering strength. A [`DisplaySnapshot`] captures exactly
//! that, so a frame can be shipped to a renderer running elsewhere.
//!
//! Descriptor fields serialise under their wire-format names, so the
//! `clusters` array of a JSON snapshot is itself a valid configuration.
//!
//! # no_std
//!
//! Requires the `serde` feature. Fixed capacity throughout; no allocator.

use rand::RngCore;

use crate::descriptor::DescriptorList;
use crate::engine::PortfolioEngine;
use crate::grid::AssignmentGrid;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// A serialisable view of a [`PortfolioEngine`] at one instant.
///
/// ```rust,ignore
/// use pixel_cluster::snapshot::DisplaySnapshot;
///
/// let snapshot = DisplaySnapshot::from_engine(&engine, now_ms);
/// let json = serde_json::to_string(&snapshot).unwrap();
/// ```
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct DisplaySnapshot {
    /// Format version, [`SNAPSHOT_VERSION`] for new snapshots.
    pub version: u16,
    /// Host time the snapshot was taken at, ms.
    pub taken_at_ms: u64,
    /// Whether portfolio mode was running.
    pub active: bool,
    /// Cell → cluster id.
    pub grid: AssignmentGrid,
    /// Loaded clusters in descriptor order.
    pub clusters: DescriptorList,
}

impl DisplaySnapshot {
    /// Capture the current state of `engine`.
    pub fn from_engine<R: RngCore>(engine: &PortfolioEngine<R>, taken_at_ms: u64) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            taken_at_ms,
            active: engine.is_active(),
            grid: engine.grid().clone(),
            clusters: engine.registry().descriptors(),
        }
    }

    /// Brightness of `cluster_id`, if present.
    pub fn brightness_of(&self, cluster_id: u8) -> Option<u8> {
        self.clusters
            .iter()
            .find(|d| d.cluster_id == cluster_id)
            .map(|d| d.brightness)
    }

    /// Number of cells owned by `cluster_id`.
    pub fn cell_count(&self, cluster_id: u8) -> usize {
        self.grid.count(cluster_id)
    }
}
