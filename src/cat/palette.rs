use glam::Vec3;
use thiserror::Error;

use crate::config::Configs;

/// Highest colour slot read from a config (`colours[1]` .. `colours[99]`).
pub const MAX_COLOURS: usize = 99;
/// Hue rotation speed for rainbow colours (degrees/second).
const RAINBOW_HUE_SPEED: f32 = 360.0 * 0.5;
/// Suffix marking a colour as rainbow in config files.
const RAINBOW_SUFFIX: char = '!';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColourError {
    #[error("colour {0:?} does not start with '#'")]
    MissingHash(String),

    #[error("colour {0:?} is not six hex digits")]
    InvalidHex(String),
}

/// Decode `#rrggbb` into 0..1 RGB.
pub fn hex_to_rgb(hex: &str) -> Result<Vec3, ColourError> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| ColourError::MissingHash(hex.to_string()))?;
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ColourError::InvalidHex(hex.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| ColourError::InvalidHex(hex.to_string()))
    };
    Ok(Vec3::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Encode 0..1 RGB as lowercase `#rrggbb`.
pub fn rgb_to_hex(rgb: Vec3) -> String {
    let [r, g, b] = (rgb.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round().to_array();
    format!("#{:02x}{:02x}{:02x}", r as u8, g as u8, b as u8)
}

/// RGB (0..1) to HSV with hue in degrees.
pub fn rgb_to_hsv(rgb: Vec3) -> Vec3 {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == rgb.x {
        60.0 * ((rgb.y - rgb.z) / delta).rem_euclid(6.0)
    } else if max == rgb.y {
        60.0 * ((rgb.z - rgb.x) / delta + 2.0)
    } else {
        60.0 * ((rgb.x - rgb.y) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    Vec3::new(hue, saturation, max)
}

pub fn hsv_to_rgb(hsv: Vec3) -> Vec3 {
    let (h, s, v) = (hsv.x.rem_euclid(360.0), hsv.y, hsv.z);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Vec3::new(r + m, g + m, b + m)
}

/// One palette entry. Rainbow swatches cycle their hue over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub rgb: Vec3,
    pub rainbow: bool,
}

impl Swatch {
    pub const WHITE: Swatch = Swatch {
        rgb: Vec3::ONE,
        rainbow: false,
    };

    /// Parse a config value: `#rrggbb`, optionally followed by `!`.
    pub fn parse(value: &str) -> Result<Self, ColourError> {
        let value = value.trim();
        let (hex, rainbow) = match value.strip_suffix(RAINBOW_SUFFIX) {
            Some(hex) => (hex, true),
            None => (value, false),
        };
        Ok(Self {
            rgb: hex_to_rgb(hex)?,
            rainbow,
        })
    }

    pub fn to_config_value(&self) -> String {
        let hex = rgb_to_hex(self.rgb);
        if self.rainbow {
            format!("{hex}{RAINBOW_SUFFIX}")
        } else {
            hex
        }
    }
}

/// Per-cat recolour table. Slot 0 is reserved and always white.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    /// Read `colours[i]` entries. Malformed values fall back to the schema
    /// default for that slot, then to black.
    pub fn from_config(configs: &Configs) -> Self {
        let mut swatches = vec![Swatch::WHITE];

        let highest = (1..=MAX_COLOURS)
            .rev()
            .find(|i| configs.string(&colour_key(*i)).is_some())
            .unwrap_or(0);

        for i in 1..=highest {
            let key = colour_key(i);
            let swatch = match configs.string(&key).map(Swatch::parse) {
                Some(Ok(swatch)) => swatch,
                Some(Err(e)) => {
                    log::warn!("{}: {key}: {e}, using default", configs.path().display());
                    configs
                        .schema()
                        .default_string(&key)
                        .and_then(|v| Swatch::parse(v).ok())
                        .unwrap_or(Swatch {
                            rgb: Vec3::ZERO,
                            rainbow: false,
                        })
                }
                None => Swatch {
                    rgb: Vec3::ZERO,
                    rainbow: false,
                },
            };
            swatches.push(swatch);
        }

        Self { swatches }
    }

    /// Write every slot except 0 back as `colours[i]`.
    pub fn store(&self, configs: &mut Configs) {
        for (i, swatch) in self.swatches.iter().enumerate().skip(1) {
            configs.set_string(&colour_key(i), &swatch.to_config_value());
        }
    }

    /// Advance the hue of every rainbow swatch.
    pub fn update(&mut self, dt: f32) {
        for swatch in self.swatches.iter_mut().skip(1).filter(|s| s.rainbow) {
            let mut hsv = rgb_to_hsv(swatch.rgb);
            hsv.x = (hsv.x + dt * RAINBOW_HUE_SPEED).rem_euclid(360.0);
            swatch.rgb = hsv_to_rgb(hsv);
        }
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn get(&self, slot: usize) -> Option<&Swatch> {
        self.swatches.get(slot)
    }

    pub fn set(&mut self, slot: usize, swatch: Swatch) {
        if slot == 0 || slot > MAX_COLOURS {
            return;
        }
        if slot >= self.swatches.len() {
            self.swatches.resize(
                slot + 1,
                Swatch {
                    rgb: Vec3::ZERO,
                    rainbow: false,
                },
            );
        }
        self.swatches[slot] = swatch;
    }
}

fn colour_key(slot: usize) -> String {
    format!("colours[{slot}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSchema;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn hex_decoding() {
        assert!(approx(hex_to_rgb("#ff8000").unwrap(), Vec3::new(1.0, 128.0 / 255.0, 0.0)));
        assert_eq!(hex_to_rgb("ff8000"), Err(ColourError::MissingHash("ff8000".into())));
        assert_eq!(hex_to_rgb("#ff80"), Err(ColourError::InvalidHex("#ff80".into())));
        assert_eq!(hex_to_rgb("#gg8000"), Err(ColourError::InvalidHex("#gg8000".into())));
        assert_eq!(rgb_to_hex(hex_to_rgb("#da6666").unwrap()), "#da6666");
    }

    #[test]
    fn hsv_conversion() {
        let red = Vec3::new(1.0, 0.0, 0.0);
        assert!(approx(rgb_to_hsv(red), Vec3::new(0.0, 1.0, 1.0)));
        assert!(approx(hsv_to_rgb(Vec3::new(120.0, 1.0, 1.0)), Vec3::new(0.0, 1.0, 0.0)));

        let pink = hex_to_rgb("#f7cede").unwrap();
        assert!(approx(hsv_to_rgb(rgb_to_hsv(pink)), pink));
    }

    #[test]
    fn rainbow_marker_round_trips_through_config() {
        let schema = ConfigSchema::new("unused", "").with_string("colours[2]", "#787878");
        let mut configs = crate::config::Configs::load(&schema, "nobody").unwrap();
        configs.set_string("colours[1]", "#da6666!");
        configs.set_string("colours[2]", "oops");
        configs.set_string("colours[3]", "#1f1f1f");

        let palette = Palette::from_config(&configs);
        assert_eq!(palette.swatches().len(), 4);
        assert_eq!(palette.get(0), Some(&Swatch::WHITE));
        assert!(palette.get(1).unwrap().rainbow);
        assert!(approx(palette.get(2).unwrap().rgb, Vec3::splat(120.0 / 255.0)));
        assert!(!palette.get(3).unwrap().rainbow);

        let mut out = configs.clone();
        palette.store(&mut out);
        assert_eq!(out.string("colours[1]"), Some("#da6666!"));
        assert_eq!(out.string("colours[2]"), Some("#787878"));
        assert_eq!(out.string("colours[3]"), Some("#1f1f1f"));
    }

    #[test]
    fn only_rainbow_swatches_rotate() {
        let mut palette = Palette {
            swatches: vec![
                Swatch::WHITE,
                Swatch {
                    rgb: Vec3::new(1.0, 0.0, 0.0),
                    rainbow: true,
                },
                Swatch {
                    rgb: Vec3::new(1.0, 0.0, 0.0),
                    rainbow: false,
                },
            ],
        };
        // 120 degrees at 180 deg/s.
        palette.update(2.0 / 3.0);

        assert!(approx(palette.swatches()[1].rgb, Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(palette.swatches()[2].rgb, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(palette.swatches()[0], Swatch::WHITE);
    }
}
