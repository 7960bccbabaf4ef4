//! # Portfolio Matrix Demo
//!
//! Builds a five-holding portfolio, encodes it in the wire format the host
//! bridge sends, feeds it to the engine and runs two seconds of frames on a
//! real clock, printing the matrix before and after.
//!
//! Run with: `cargo run --example portfolio --features std`

use std::thread;
use std::time::Duration;

use pixel_cluster::engine::PortfolioEngine;
use pixel_cluster::portfolio::{build_descriptors, DisplayParamsConfig, Holding};
use pixel_cluster::scheduler::StdClock;
use pixel_cluster::wire;
use pixel_cluster::{AssignmentGrid, Clock, WIDTH};

// ── Display helpers ───────────────────────────────────────────────────────────

fn glyph(cluster_id: u8) -> char {
    match cluster_id {
        0 => '·',
        1 => '█',
        2 => '▓',
        3 => '▒',
        4 => '░',
        5 => '◆',
        _ => '?',
    }
}

fn print_grid(title: &str, grid: &AssignmentGrid) {
    println!("  {}", title);
    println!("  ┌{}┐", "─".repeat(WIDTH));
    for row in grid.rows() {
        let line: String = row.iter().map(|&id| glyph(id)).collect();
        println!("  │{}│", line);
    }
    println!("  └{}┘\n", "─".repeat(WIDTH));
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  Portfolio cluster animation, 13 × 8 matrix  ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let holdings = [
        Holding { symbol: "AAPL", market_value: 24_000.0, performance: 0.14 },
        Holding { symbol: "MSFT", market_value: 18_000.0, performance: 0.04 },
        Holding { symbol: "VWCE", market_value: 15_000.0, performance: 0.01 },
        Holding { symbol: "NOVO", market_value: 9_000.0, performance: -0.02 },
        Holding { symbol: "ASML", market_value: 6_000.0, performance: -0.09 },
    ];
    let descriptors = build_descriptors(&holdings, 100_000.0, 0.03, &DisplayParamsConfig::default());

    let mut payload = String::new();
    if wire::encode(&descriptors, &mut payload).is_err() {
        eprintln!("failed to encode descriptors");
        return;
    }
    println!("  wire payload ({} bytes):\n  {}\n", payload.len(), payload);

    for d in descriptors.iter() {
        println!(
            "  {} {:<5} id={} pixels={:>3} brightness={:>3} clustering={:>2} speed={:>3}ms",
            glyph(d.cluster_id),
            if d.label.is_empty() { "(bg)" } else { d.label.as_str() },
            d.cluster_id,
            d.pixel_count,
            d.brightness,
            d.clustering_strength,
            d.animation_speed_ms,
        );
    }
    println!();

    let mut engine = PortfolioEngine::with_seed(2026);
    engine.shuffle_ordering();
    let outcome = engine.apply_configuration(payload.as_bytes());
    println!("  loaded {} clusters (decoder: {})\n", outcome.clusters, outcome.stop);

    print_grid("t = 0 ms", engine.grid());

    let clock = StdClock::new();
    let mut frames = 0u32;
    let mut swaps = 0usize;
    while clock.now_ms() < 2_000 {
        swaps += engine.update_with_clock(&clock).swaps;
        frames += 1;
        thread::sleep(Duration::from_millis(16));
    }

    print_grid("t = 2000 ms", engine.grid());
    println!("  {} frames, {} swaps", frames, swaps);
}
