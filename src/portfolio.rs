//! Portfolio → cluster descriptors.
//!
//! Turns the top holdings of a portfolio into the descriptor list the engine
//! consumes: one cluster per holding (ids 1..=5, sized by portfolio share)
//! plus a background cluster (id 0) taking whatever pixels remain.
//!
//! Visual parameters come from the holding's performance band:
//!
//! | Band | Condition | Brightness | Clustering | Speed |
//! |------|-----------|-----------|------------|-------|
//! | thriving | `perf ≥ thriving` | 180–220 | 3 | smooth |
//! | on target | `perf ≥ on_target` | 150–180 | 4 | smooth |
//! | below | `perf ≥ below` | 120–150 | 5 | smooth |
//! | critical | otherwise | 100–120 | 7 | chaotic |
//!
//! Brightness is linear across each band. The background is drawn dimmer:
//! its brightness is remapped from `[100, 220]` into the background range.

use crate::descriptor::{ClusterDescriptor, DescriptorList, BACKGROUND_CLUSTER, MAX_CLUSTERS};
use crate::grid::TOTAL_PIXELS;

/// Holdings that get their own cluster.
pub const MAX_HOLDINGS: usize = MAX_CLUSTERS - 1;

/// Thresholds and ranges for mapping performance to visual parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayParamsConfig {
    /// Lower bound of the thriving band. Default: 0.03.
    pub thriving_threshold: f64,
    /// Lower bound of the on-target band. Default: 0.00.
    pub on_target_threshold: f64,
    /// Lower bound of the below-target band. Default: −0.03.
    pub below_threshold: f64,
    /// Thriving brightness range. Default: (180, 220).
    pub brightness_thriving: (f64, f64),
    /// On-target brightness range. Default: (150, 180).
    pub brightness_on_target: (f64, f64),
    /// Below-target brightness range. Default: (120, 150).
    pub brightness_below: (f64, f64),
    /// Critical brightness range. Default: (100, 120).
    pub brightness_critical: (f64, f64),
    /// Background brightness range. Default: (80, 120).
    pub background_brightness: (f64, f64),
    /// Animation period for healthy bands, ms. Default: 100.
    pub speed_smooth_ms: i32,
    /// Animation period for the critical band, ms. Default: 40.
    pub speed_chaotic_ms: i32,
    /// Smallest pixel budget for a holding. Default: 5.
    pub min_cluster_size: i32,
}

impl Default for DisplayParamsConfig {
    fn default() -> Self {
        Self {
            thriving_threshold: 0.03,
            on_target_threshold: 0.0,
            below_threshold: -0.03,
            brightness_thriving: (180.0, 220.0),
            brightness_on_target: (150.0, 180.0),
            brightness_below: (120.0, 150.0),
            brightness_critical: (100.0, 120.0),
            background_brightness: (80.0, 120.0),
            speed_smooth_ms: 100,
            speed_chaotic_ms: 40,
            min_cluster_size: 5,
        }
    }
}

/// Brightness, clustering and speed for one cluster, before descriptor clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualParams {
    /// Brightness, clamped to [100, 220].
    pub brightness: i32,
    /// Clustering strength, clamped to [1, 10].
    pub clustering: i32,
    /// Animation period in ms, clamped to [10, 500].
    pub speed: i32,
}

/// One portfolio position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Holding<'a> {
    /// Ticker symbol; truncated to the label capacity.
    pub symbol: &'a str,
    /// Market value in portfolio currency.
    pub market_value: f64,
    /// Trailing performance, compared against the band thresholds.
    pub performance: f64,
}

/// Map a performance figure to visual parameters.
pub fn visual_params(performance: f64, config: &DisplayParamsConfig) -> VisualParams {
    let c = config;
    let (brightness, clustering, speed): (i32, i32, i32) = if performance >= c.thriving_threshold {
        let (lo, hi) = ordered(c.brightness_thriving);
        let b = map_range(performance, c.thriving_threshold, c.thriving_threshold + 0.10, lo, hi);
        (b, 3, c.speed_smooth_ms)
    } else if performance >= c.on_target_threshold {
        let (lo, hi) = ordered(c.brightness_on_target);
        let b = map_range(performance, c.on_target_threshold, c.thriving_threshold, lo, hi);
        (b, 4, c.speed_smooth_ms)
    } else if performance >= c.below_threshold {
        let (lo, hi) = ordered(c.brightness_below);
        let b = map_range(performance, c.below_threshold, c.on_target_threshold, lo, hi);
        (b, 5, c.speed_smooth_ms)
    } else {
        let (lo, hi) = ordered(c.brightness_critical);
        let b = map_range(performance, c.below_threshold - 0.10, c.below_threshold, lo, hi);
        (b, 7, c.speed_chaotic_ms)
    };

    VisualParams {
        brightness: brightness.clamp(100, 220),
        clustering: clustering.clamp(1, 10),
        speed: speed.clamp(10, 500),
    }
}

/// Build the descriptor list for the top holdings plus background.
///
/// - `holdings`: largest positions first; only the first [`MAX_HOLDINGS`] are used.
/// - `total_value`: market value of the whole portfolio.
/// - `background_performance`: value-weighted performance of everything else.
pub fn build_descriptors(
    holdings: &[Holding<'_>],
    total_value: f64,
    background_performance: f64,
    config: &DisplayParamsConfig,
) -> DescriptorList {
    let mut out = DescriptorList::new();
    let mut used = 0i32;

    for (i, h) in holdings.iter().take(MAX_HOLDINGS).enumerate() {
        let share = if total_value > 0.0 { h.market_value / total_value } else { 0.0 };
        let pixels = round_non_negative(share * TOTAL_PIXELS as f64)
            .max(config.min_cluster_size)
            .clamp(0, TOTAL_PIXELS as i32);
        let params = visual_params(h.performance, config);

        log::debug!("holding {} ({}): {} pixels", i + 1, h.symbol, pixels);
        // `take(MAX_HOLDINGS)` leaves room for the background.
        let _ = out.push(ClusterDescriptor::new(
            (i + 1) as u8,
            pixels,
            params.brightness,
            params.clustering,
            params.speed,
            h.symbol,
        ));
        used = used.saturating_add(pixels);
    }

    let params = visual_params(background_performance, config);
    let (lo, hi) = ordered(config.background_brightness);
    let brightness = map_range(params.brightness as f64, 100.0, 220.0, lo, hi).clamp(lo as i32, hi as i32);
    let _ = out.push(ClusterDescriptor::new(
        BACKGROUND_CLUSTER,
        (TOTAL_PIXELS as i32 - used).max(0),
        brightness,
        params.clustering,
        params.speed,
        "",
    ));

    out
}

/// Linear map of `value` from `[in_min, in_max]` onto `[out_min, out_max]`,
/// saturating at the ends and truncating toward zero.
fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> i32 {
    if in_max == in_min {
        return out_min as i32;
    }
    let ratio = ((value - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    (out_min + ratio * (out_max - out_min)) as i32
}

/// `(min, max)` of a configured range, whichever way round it was given.
fn ordered((a, b): (f64, f64)) -> (f64, f64) {
    (a.min(b), a.max(b))
}

/// Round half away from zero for `x ≥ 0`; NaN and negatives give 0.
fn round_non_negative(x: f64) -> i32 {
    if x.is_nan() || x <= 0.0 {
        return 0;
    }
    (x + 0.5) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_pick_clustering_and_speed() {
        let c = DisplayParamsConfig::default();
        assert_eq!(visual_params(0.10, &c).clustering, 3);
        assert_eq!(visual_params(0.01, &c).clustering, 4);
        assert_eq!(visual_params(-0.01, &c).clustering, 5);
        let critical = visual_params(-0.20, &c);
        assert_eq!(critical.clustering, 7);
        assert_eq!(critical.speed, 40);
        assert_eq!(visual_params(0.10, &c).speed, 100);
    }

    #[test]
    fn brightness_is_linear_within_band() {
        let c = DisplayParamsConfig::default();
        // Thriving band spans [0.03, 0.13] → [180, 220].
        assert_eq!(visual_params(0.03, &c).brightness, 180);
        assert_eq!(visual_params(0.0805, &c).brightness, 200);
        assert_eq!(visual_params(1.0, &c).brightness, 220);
        // Critical band saturates at its floor.
        assert_eq!(visual_params(-5.0, &c).brightness, 100);
    }

    #[test]
    fn map_range_degenerate_input() {
        assert_eq!(map_range(5.0, 1.0, 1.0, 42.0, 99.0), 42);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_non_negative(20.5), 21);
        assert_eq!(round_non_negative(20.49), 20);
        assert_eq!(round_non_negative(f64::NAN), 0);
        assert_eq!(round_non_negative(-3.0), 0);
    }

    #[test]
    fn holdings_sized_by_share_with_minimum() {
        let holdings = [
            Holding { symbol: "AAPL", market_value: 25_000.0, performance: 0.05 },
            Holding { symbol: "TINY", market_value: 100.0, performance: 0.0 },
        ];
        let list = build_descriptors(&holdings, 100_000.0, 0.0, &DisplayParamsConfig::default());
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].cluster_id, 1);
        assert_eq!(list[0].pixel_count, 26);
        assert_eq!(list[0].label.as_str(), "AAPL");
        assert_eq!(list[1].cluster_id, 2);
        assert_eq!(list[1].pixel_count, 5);
        let bg = &list[2];
        assert!(bg.is_background());
        assert_eq!(bg.pixel_count, 104 - 26 - 5);
        assert!(bg.label.is_empty());
    }

    #[test]
    fn background_is_dimmer() {
        let list = build_descriptors(&[], 1.0, 0.5, &DisplayParamsConfig::default());
        assert_eq!(list.len(), 1);
        // 220 remapped from [100, 220] onto [80, 120].
        assert_eq!(list[0].brightness, 120);
        assert_eq!(list[0].pixel_count as usize, TOTAL_PIXELS);
    }

    #[test]
    fn at_most_five_holdings() {
        let h = Holding { symbol: "X", market_value: 10.0, performance: 0.0 };
        let list = build_descriptors(&[h; 8], 80.0, 0.0, &DisplayParamsConfig::default());
        assert_eq!(list.len(), MAX_CLUSTERS);
        assert_eq!(list[4].cluster_id, 5);
        assert!(list[5].is_background());
        // 5 × round(13) = 65 pixels used.
        assert_eq!(list[5].pixel_count, 39);
    }

    #[test]
    fn tiny_total_value_caps_each_holding() {
        let h = Holding { symbol: "X", market_value: 10.0, performance: 0.0 };
        let list = build_descriptors(&[h, h], 1e-300, 0.0, &DisplayParamsConfig::default());
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].pixel_count as usize, TOTAL_PIXELS);
        assert_eq!(list[1].pixel_count as usize, TOTAL_PIXELS);
        assert_eq!(list[2].pixel_count, 0);
    }

    #[test]
    fn inverted_ranges_are_reordered() {
        let c = DisplayParamsConfig {
            background_brightness: (120.0, 80.0),
            brightness_thriving: (220.0, 180.0),
            ..DisplayParamsConfig::default()
        };
        let list = build_descriptors(&[], 1.0, 0.5, &c);
        assert_eq!(list[0].brightness, 120);
        let list = build_descriptors(&[], 1.0, -5.0, &c);
        assert_eq!(list[0].brightness, 80);
        assert_eq!(visual_params(1.0, &c).brightness, 220);
        assert_eq!(visual_params(0.03, &c).brightness, 180);
    }

    #[test]
    fn zero_total_value_uses_minimum_size() {
        let h = Holding { symbol: "X", market_value: 10.0, performance: 0.0 };
        let list = build_descriptors(&[h], 0.0, 0.0, &DisplayParamsConfig::default());
        assert_eq!(list[0].pixel_count, 5);
    }
}
