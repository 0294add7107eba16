//! Colour helpers shared by the themes.
//!
//! Hues are HSL degrees. Cluster colours start from the theme's tier hue and
//! get a small nudge derived from the cluster id, so neighbouring clusters of
//! the same tier stay distinguishable without a hand-picked colour each.

use sha2::{Digest, Sha256};

/// Hue variation allowed within a tier, either side of the base hue.
pub const HUE_VARIANCE: f64 = 12.0;

/// Convert HSL to a hex colour string.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    // Normalize hue to 0-360
    let h = ((h % 360.0) + 360.0) % 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

/// Hash a string to a deterministic float in [0, 1].
pub fn hash_to_float(s: &str) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let hash = hasher.finalize();
    let val = u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]]);
    val as f64 / u32::MAX as f64
}

/// Base hue shifted by a stable per-key offset within ±[`HUE_VARIANCE`].
pub fn nudged_hue(base: f64, key: &str) -> f64 {
    base + (hash_to_float(key) - 0.5) * HUE_VARIANCE * 2.0
}

/// Lighter, desaturated version of a hue for halos.
pub fn glow_color(hue: f64, light: bool) -> String {
    if light {
        hsl_to_hex(hue, 0.55, 0.7)
    } else {
        hsl_to_hex(hue, 0.6, 0.85)
    }
}
