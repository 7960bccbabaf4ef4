//! # pixel-cluster
//!
//! Portfolio visualisation for a 13 × 8 LED pixel matrix: every top holding
//! (and the rest of the portfolio, as background) owns a cluster of pixels,
//! and each cluster's pixels drift toward one another over time.
//!
//! ---
//!
//! ## How it moves
//!
//! **Fixed budgets**: a cluster's pixel count is set by its descriptor and
//! never changes during animation. Pixels move by *swapping* which physical
//! position occupies a logical slot.
//!
//! **Cheap local search**: each frame, a due cluster draws a handful of its
//! own pixels at random, scores each by its 8-neighbourhood
//! (`same − other`), and swaps two picks. The number of draws is the cluster's
//! clustering strength, so per-frame cost is bounded and predictable.
//!
//! **Independent clocks**: every cluster runs on its own period. A slow
//! cluster never holds back a fast one.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! wire bytes → wire::decode → ClusterDescriptor → ClusterRegistry → AssignmentGrid → renderer
//!                                                      ↑
//!                                FrameScheduler → cohesion::step   (per cluster, per frame)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`descriptor`] | [`ClusterDescriptor`] | Per-cluster parameters, clamped into range |
//! | [`wire`] | [`wire::decode`], [`wire::encode`] | Tolerant descriptor scanner and writer |
//! | [`grid`] | [`AssignmentGrid`], [`PixelOrdering`] | Matrix geometry, cell ownership, slot ordering |
//! | [`neighbor`] | [`neighbor::cohesion_score`] | Bounds-checked 8-neighbourhood counts |
//! | [`registry`] | [`ClusterRegistry`] | Loaded clusters and pixel assignment |
//! | [`cohesion`] | [`cohesion::step`] | One sampled swap per cluster per frame |
//! | [`scheduler`] | [`FrameScheduler`], [`Clock`] | Per-cluster rate limiting |
//! | [`engine`] | [`PortfolioEngine`] | Host entry points: apply configuration, update |
//! | [`portfolio`] | [`portfolio::build_descriptors`] | Holdings → descriptors |
//! | [`snapshot`] | [`snapshot::DisplaySnapshot`] | Serialisable frame for renderers (requires `serde`) |
//!
//! ## `no_std`
//!
//! `#![no_std]` by default, no allocator, every container fixed capacity.
//! Enable `std` for [`scheduler::StdClock`]; enable `serde` for serialisable
//! descriptors, grids and snapshots.
//!
//! Diagnostics go through the [`log`] facade; install any logger to see them.
//!
//! ## License
//!
//! Business Source License 1.1.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

pub mod descriptor;
pub mod wire;
pub mod grid;
pub mod neighbor;
pub mod registry;
pub mod cohesion;
pub mod scheduler;
pub mod engine;
pub mod portfolio;
#[cfg(feature = "serde")]
pub mod snapshot;

pub use descriptor::{ClusterDescriptor, DescriptorList, MAX_CLUSTERS};
pub use engine::{PortfolioEngine, UpdateSummary};
pub use grid::{AssignmentGrid, PixelOrdering, HEIGHT, TOTAL_PIXELS, WIDTH};
pub use registry::ClusterRegistry;
pub use scheduler::{Clock, FrameScheduler};
