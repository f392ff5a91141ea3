//! Categorical palette and the derived edge tone.

use tracing::warn;

use crate::config::{ColorConfig, EdgeToneConfig};

const GOLDEN_ANGLE_DEG: f64 = 137.507_764_050_037_85;
const PALETTE_HUE_START: f64 = 210.0;
const PALETTE_SATURATION: [f64; 3] = [62.0, 78.0, 48.0];
const PALETTE_LIGHTNESS: [f64; 2] = [46.0, 58.0];

/// Red, green and blue channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb([f64; 3]);

/// Hue in degrees; saturation and lightness in percent points.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hsl {
    hue: f64,
    sat: f64,
    light: f64,
}

fn channel_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Rgb {
    /// Accepts `#rgb` and `#rrggbb`.
    fn from_hex(color: &str) -> Option<Self> {
        let digits = color.trim().strip_prefix('#')?;
        let nibbles = digits
            .chars()
            .map(|ch| ch.to_digit(16).map(|digit| digit as u8))
            .collect::<Option<Vec<u8>>>()?;
        let bytes = match *nibbles.as_slice() {
            [r, g, b] => [r * 17, g * 17, b * 17],
            [r_hi, r_lo, g_hi, g_lo, b_hi, b_lo] => {
                [(r_hi << 4) | r_lo, (g_hi << 4) | g_lo, (b_hi << 4) | b_lo]
            }
            _ => return None,
        };
        Some(Rgb(bytes.map(|byte| f64::from(byte) / 255.0)))
    }

    fn bytes(self) -> [u8; 3] {
        self.0.map(channel_byte)
    }

    fn to_hex(self) -> String {
        let [r, g, b] = self.bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    fn to_hsl(self) -> Hsl {
        let [r, g, b] = self.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let chroma = max - min;
        let light = (max + min) / 2.0;
        if chroma == 0.0 {
            return Hsl {
                hue: 0.0,
                sat: 0.0,
                light: light * 100.0,
            };
        }

        let sector = if max == r {
            ((g - b) / chroma).rem_euclid(6.0)
        } else if max == g {
            (b - r) / chroma + 2.0
        } else {
            (r - g) / chroma + 4.0
        };
        Hsl {
            hue: sector * 60.0,
            sat: chroma / (1.0 - (2.0 * light - 1.0).abs()) * 100.0,
            light: light * 100.0,
        }
    }
}

impl Hsl {
    fn to_rgb(self) -> Rgb {
        let sat = (self.sat / 100.0).clamp(0.0, 1.0);
        let light = (self.light / 100.0).clamp(0.0, 1.0);
        let chroma = (1.0 - (2.0 * light - 1.0).abs()) * sat;
        let sector = self.hue.rem_euclid(360.0) / 60.0;
        let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u8 {
            0 => (chroma, second, 0.0),
            1 => (second, chroma, 0.0),
            2 => (0.0, chroma, second),
            3 => (0.0, second, chroma),
            4 => (second, 0.0, chroma),
            _ => (chroma, 0.0, second),
        };
        let offset = light - chroma / 2.0;
        Rgb([r + offset, g + offset, b + offset])
    }
}

/// Golden-angle hue walk with alternating saturation and lightness bands,
/// so neighbouring entries never share a hue.
pub fn categorical_palette(count: usize) -> Vec<String> {
    (0..count)
        .map(|idx| {
            let hsl = Hsl {
                hue: (PALETTE_HUE_START + idx as f64 * GOLDEN_ANGLE_DEG).rem_euclid(360.0),
                sat: PALETTE_SATURATION[idx % PALETTE_SATURATION.len()],
                light: PALETTE_LIGHTNESS[(idx / PALETTE_SATURATION.len()) % PALETTE_LIGHTNESS.len()],
            };
            hsl.to_rgb().to_hex()
        })
        .collect()
}

pub fn is_hex_color(color: &str) -> bool {
    Rgb::from_hex(color).is_some()
}

/// Brightened, desaturated, translucent variant of `color` as `rgba(...)`.
/// Returns `None` for anything that is not a hex color.
pub fn edge_tone(color: &str, tone: &EdgeToneConfig) -> Option<String> {
    let mut hsl = Rgb::from_hex(color)?.to_hsl();
    hsl.light = (hsl.light + tone.brighten).clamp(0.0, 100.0);
    hsl.sat = (hsl.sat - tone.desaturate).clamp(0.0, 100.0);
    let [r, g, b] = hsl.to_rgb().bytes();
    Some(format!("rgba({r}, {g}, {b}, {})", tone.alpha.clamp(0.0, 1.0)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Self {
        Self { colors }
    }

    /// Uses the configured palette when every entry is a hex color,
    /// otherwise generates `palette_size` colors.
    pub fn from_config(config: &ColorConfig) -> Self {
        if let Some(colors) = config.palette.as_ref().filter(|colors| !colors.is_empty()) {
            match colors.iter().find(|color| !is_hex_color(color)) {
                Some(bad) => {
                    warn!(color = %bad, "configured palette entry is not a hex color; generating palette")
                }
                None => return Self::new(colors.clone()),
            }
        }
        Self::new(categorical_palette(config.palette_size.max(1)))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Wraps around once the palette is exhausted.
    pub fn get(&self, idx: usize) -> &str {
        self.colors
            .get(idx % self.colors.len().max(1))
            .map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn palette_entries_are_distinct() {
        let palette = categorical_palette(40);
        assert_eq!(palette.len(), 40);
        let unique: HashSet<&String> = palette.iter().collect();
        assert_eq!(unique.len(), 40);
        assert!(palette.iter().all(|c| c.starts_with('#') && c.len() == 7));
    }

    #[test]
    fn palette_is_deterministic() {
        assert_eq!(categorical_palette(8), categorical_palette(8));
        assert_eq!(categorical_palette(8)[..4], categorical_palette(4)[..]);
    }

    #[test]
    fn hex_hsl_roundtrip_is_stable() {
        let rgb = Rgb::from_hex("#4e79a7").expect("hex");
        assert_eq!(rgb.to_hsl().to_rgb().to_hex(), "#4e79a7");
        assert_eq!(Rgb::from_hex("#fff"), Rgb::from_hex("#ffffff"));
        assert_eq!(Rgb::from_hex("#ff0000").map(|rgb| rgb.to_hsl().hue), Some(0.0));
    }

    #[test]
    fn edge_tone_lightens_and_sets_alpha() {
        let tone = EdgeToneConfig::default();
        let toned = edge_tone("#336699", &tone).expect("tone");
        assert!(toned.starts_with("rgba("));
        assert!(toned.ends_with(", 0.5)"));
        assert_eq!(Some(toned), edge_tone("#336699", &tone));
        assert!(edge_tone("steelblue", &tone).is_none());
    }

    #[test]
    fn non_ascii_colors_are_rejected_without_panicking() {
        let tone = EdgeToneConfig::default();
        assert!(edge_tone("#é1", &tone).is_none());
        assert!(edge_tone("#ab€", &tone).is_none());
        assert!(edge_tone("#12345g", &tone).is_none());
        assert!(!is_hex_color("#ééé"));
    }

    #[test]
    fn invalid_configured_palette_falls_back_to_generated() {
        let config = ColorConfig {
            palette: Some(vec!["#111111".into(), "#é1".into()]),
            palette_size: 6,
            ..ColorConfig::default()
        };
        let palette = Palette::from_config(&config);
        assert_eq!(palette.len(), 6);
        assert_eq!(palette.get(0), categorical_palette(6)[0]);
    }

    #[test]
    fn palette_wraps() {
        let palette = Palette::new(vec!["#000000".into(), "#ffffff".into()]);
        assert_eq!(palette.get(3), "#ffffff");
    }
}
