//! Cluster descriptors: one per portfolio holding plus the background.
//!
//! A descriptor is what the host sends for each cluster: how many pixels it
//! owns, how bright it is, how hard its pixels pull together and how often
//! they are allowed to move. Raw values arrive as loosely typed integers and
//! are clamped into range on construction; nothing is ever rejected.
//!
//! # Ranges
//!
//! | Field | Range |
//! |-------|-------|
//! | `pixel_count` | `0..=TOTAL_PIXELS` |
//! | `brightness` | `80..=220` |
//! | `clustering_strength` | `1..=10` |
//! | `animation_speed_ms` | `10..=500` |
//! | `label` | at most [`MAX_LABEL_LEN`] bytes, empty for background |

use heapless::String;

use crate::grid::TOTAL_PIXELS;

/// Maximum number of clusters (five holdings plus background).
pub const MAX_CLUSTERS: usize = 6;

/// Maximum label length in bytes.
pub const MAX_LABEL_LEN: usize = 9;

/// Cluster id reserved for the background cluster (and unassigned cells).
pub const BACKGROUND_CLUSTER: u8 = 0;

/// Lowest accepted brightness.
pub const BRIGHTNESS_MIN: u8 = 80;
/// Highest accepted brightness.
pub const BRIGHTNESS_MAX: u8 = 220;
/// Lowest accepted clustering strength.
pub const STRENGTH_MIN: u8 = 1;
/// Highest accepted clustering strength.
pub const STRENGTH_MAX: u8 = 10;
/// Shortest accepted animation period in milliseconds.
pub const SPEED_MIN_MS: u16 = 10;
/// Longest accepted animation period in milliseconds.
pub const SPEED_MAX_MS: u16 = 500;

/// Fixed-capacity cluster label (ticker symbol).
pub type Label = String<MAX_LABEL_LEN>;

/// Fixed-capacity descriptor list, in descriptor order.
pub type DescriptorList = heapless::Vec<ClusterDescriptor, MAX_CLUSTERS>;

/// Raw, unclamped field values as produced by the decoder.
///
/// Missing fields are zero; the label is already truncated to fit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawDescriptor {
    /// Requested cluster id.
    pub cluster_id: i32,
    /// Requested pixel budget.
    pub pixels: i32,
    /// Requested brightness.
    pub brightness: i32,
    /// Requested clustering strength.
    pub clustering: i32,
    /// Requested animation period in milliseconds.
    pub speed: i32,
    /// Ticker symbol.
    pub symbol: Label,
}

/// A single, range-checked cluster descriptor.
///
/// With the `serde` feature the field names match the wire format, so a
/// serialised [`DescriptorList`] is itself a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterDescriptor {
    /// Cluster identifier (0 = background, 1..=5 = holdings).
    pub cluster_id: u8,
    /// Pixel budget. After loading into a registry this is the number of
    /// pixels actually assigned.
    #[cfg_attr(feature = "serde", serde(rename = "pixels"))]
    pub pixel_count: u8,
    /// Display brightness [80, 220].
    pub brightness: u8,
    /// Samples per selection pass [1, 10].
    #[cfg_attr(feature = "serde", serde(rename = "clustering"))]
    pub clustering_strength: u8,
    /// Minimum milliseconds between cohesion steps [10, 500].
    #[cfg_attr(feature = "serde", serde(rename = "speed"))]
    pub animation_speed_ms: u16,
    /// Ticker symbol, empty for background.
    #[cfg_attr(feature = "serde", serde(rename = "symbol", default))]
    pub label: Label,
}

impl ClusterDescriptor {
    /// Build a descriptor from raw values, clamping every field into range.
    pub fn from_raw(raw: &RawDescriptor) -> Self {
        Self {
            cluster_id: clamp_i32(raw.cluster_id, 0, u8::MAX as i32) as u8,
            pixel_count: clamp_i32(raw.pixels, 0, TOTAL_PIXELS as i32) as u8,
            brightness: clamp_i32(raw.brightness, BRIGHTNESS_MIN as i32, BRIGHTNESS_MAX as i32) as u8,
            clustering_strength: clamp_i32(raw.clustering, STRENGTH_MIN as i32, STRENGTH_MAX as i32)
                as u8,
            animation_speed_ms: clamp_i32(raw.speed, SPEED_MIN_MS as i32, SPEED_MAX_MS as i32)
                as u16,
            label: raw.symbol.clone(),
        }
    }

    /// Convenience constructor for hosts that build descriptors in code.
    ///
    /// Values are clamped exactly as decoded ones are; an over-long label is
    /// truncated at [`MAX_LABEL_LEN`] bytes.
    pub fn new(
        cluster_id: u8,
        pixel_count: i32,
        brightness: i32,
        clustering_strength: i32,
        animation_speed_ms: i32,
        label: &str,
    ) -> Self {
        Self::from_raw(&RawDescriptor {
            cluster_id: cluster_id as i32,
            pixels: pixel_count,
            brightness,
            clustering: clustering_strength,
            speed: animation_speed_ms,
            symbol: truncated_label(label),
        })
    }

    /// `true` for the background cluster.
    pub fn is_background(&self) -> bool {
        self.cluster_id == BACKGROUND_CLUSTER
    }
}

/// Copy `s` into a [`Label`], dropping whatever does not fit.
///
/// Truncation happens on a character boundary.
pub fn truncated_label(s: &str) -> Label {
    let mut label = Label::new();
    for ch in s.chars() {
        if label.push(ch).is_err() {
            break;
        }
    }
    label
}

#[inline]
fn clamp_i32(v: i32, lo: i32, hi: i32) -> i32 {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_clamps_low_values() {
        let d = ClusterDescriptor::from_raw(&RawDescriptor {
            cluster_id: -4,
            pixels: -10,
            brightness: 0,
            clustering: -1,
            speed: 0,
            symbol: Label::new(),
        });
        assert_eq!(d.cluster_id, 0);
        assert_eq!(d.pixel_count, 0);
        assert_eq!(d.brightness, BRIGHTNESS_MIN);
        assert_eq!(d.clustering_strength, STRENGTH_MIN);
        assert_eq!(d.animation_speed_ms, SPEED_MIN_MS);
    }

    #[test]
    fn from_raw_clamps_high_values() {
        let d = ClusterDescriptor::new(3, i32::MAX, 9999, 42, 100_000, "MSFT");
        assert_eq!(d.pixel_count as usize, TOTAL_PIXELS);
        assert_eq!(d.brightness, BRIGHTNESS_MAX);
        assert_eq!(d.clustering_strength, STRENGTH_MAX);
        assert_eq!(d.animation_speed_ms, SPEED_MAX_MS);
        assert_eq!(d.label.as_str(), "MSFT");
    }

    #[test]
    fn in_range_values_pass_through() {
        let d = ClusterDescriptor::new(1, 20, 180, 3, 100, "AAPL");
        assert_eq!(d.pixel_count, 20);
        assert_eq!(d.brightness, 180);
        assert_eq!(d.clustering_strength, 3);
        assert_eq!(d.animation_speed_ms, 100);
        assert!(!d.is_background());
    }

    #[test]
    fn long_label_is_truncated() {
        let label = truncated_label("VERYLONGSYMBOL");
        assert_eq!(label.as_str(), "VERYLONGS");
        assert_eq!(label.len(), MAX_LABEL_LEN);
    }

    #[test]
    fn multibyte_label_truncates_on_char_boundary() {
        // 4 × 2-byte chars = 8 bytes, the 5th would overflow 9.
        let label = truncated_label("ééééé");
        assert_eq!(label.as_str(), "éééé");
    }
}
