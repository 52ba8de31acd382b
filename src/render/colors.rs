use std::collections::HashMap;

use compact_str::CompactString;
use vello::peniko::Color;

/// Twenty-colour categorical palette (light/dark pairs of ten hues).
const CATEGORY20: [u32; 20] = [
    0x1f77b4, 0xaec7e8, 0xff7f0e, 0xffbb78, 0x2ca02c, 0x98df8a, 0xd62728, 0xff9896, 0x9467bd,
    0xc5b0d5, 0x8c564b, 0xc49c94, 0xe377c2, 0xf7b6d2, 0x7f7f7f, 0xc7c7c7, 0xbcbd22, 0xdbdb8d,
    0x17becf, 0x9edae5,
];

/// How far each palette colour is pulled toward white.
const FADE: f32 = 0.2;

/// Our custom color representation for easy manipulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl AppColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_rgb_u32(rgb: u32) -> Self {
        Self::new(
            ((rgb >> 16) & 0xFF) as f32 / 255.0,
            ((rgb >> 8) & 0xFF) as f32 / 255.0,
            (rgb & 0xFF) as f32 / 255.0,
        )
    }

    /// Convert to vello's peniko Color (AlphaColor<Srgb>).
    pub fn to_peniko(self) -> Color {
        Color::new([self.r, self.g, self.b, self.a])
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }

    /// Blend toward white by `amount` (0 = unchanged, 1 = white).
    pub fn lighten(self, amount: f32) -> Self {
        let mix = |v: f32| v + (1.0 - v) * amount;
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
            a: self.a,
        }
    }

    /// Create a darker version (for hover outlines).
    pub fn darken(self, amount: f32) -> Self {
        Self {
            r: (self.r - amount).max(0.0),
            g: (self.g - amount).max(0.0),
            b: (self.b - amount).max(0.0),
            a: self.a,
        }
    }

    /// Relative luminance, used to pick label ink.
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

/// Ordinal colour scale: each new category key takes the next palette entry,
/// wrapping around once the palette is exhausted.
#[derive(Debug, Clone)]
pub struct ColorScale {
    palette: Vec<AppColor>,
    assigned: HashMap<CompactString, usize>,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::category20()
    }
}

impl ColorScale {
    /// The twenty-colour palette, each colour faded toward white.
    pub fn category20() -> Self {
        Self::with_palette(
            CATEGORY20
                .iter()
                .map(|&rgb| AppColor::from_rgb_u32(rgb).lighten(FADE))
                .collect(),
        )
    }

    fn with_palette(palette: Vec<AppColor>) -> Self {
        Self {
            palette,
            assigned: HashMap::new(),
        }
    }

    /// Build a scale with `keys` assigned in order.
    pub fn for_categories<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut scale = Self::category20();
        for key in keys {
            scale.color(key);
        }
        scale
    }

    /// Colour for `key`, assigning the next palette entry on first use.
    pub fn color(&mut self, key: &str) -> AppColor {
        let next = self.assigned.len();
        let slot = *self
            .assigned
            .entry(CompactString::new(key))
            .or_insert(next);
        self.palette[slot % self.palette.len()]
    }

    /// Colour for an already assigned `key`.
    pub fn get(&self, key: &str) -> Option<AppColor> {
        self.assigned
            .get(key)
            .map(|&slot| self.palette[slot % self.palette.len()])
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Neutral fill for tiles whose category was never assigned.
pub const FALLBACK: AppColor = AppColor::new(0.75, 0.75, 0.75);

/// Ink that stays readable on `background`.
pub fn label_ink(background: AppColor) -> AppColor {
    if background.luminance() > 0.45 {
        AppColor::new(0.08, 0.08, 0.10)
    } else {
        AppColor::new(0.96, 0.96, 0.96)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_faded_toward_white() {
        let mut scale = ColorScale::category20();
        // 0x1f77b4 blended 20% toward white is #4c92c3.
        assert_eq!(scale.color("first").to_hex(), "#4c92c3");
    }

    #[test]
    fn keys_keep_their_first_colour() {
        let mut scale = ColorScale::default();
        let wii = scale.color("root.Wii");
        let nes = scale.color("root.NES");
        assert_ne!(wii, nes);
        assert_eq!(scale.color("root.Wii"), wii);
        assert_eq!(scale.get("root.NES"), Some(nes));
        assert_eq!(scale.get("root.GB"), None);
        assert_eq!(scale.len(), 2);
    }

    #[test]
    fn palette_wraps_after_twenty_keys() {
        let keys: Vec<String> = (0..21).map(|i| format!("k{i}")).collect();
        let scale = ColorScale::for_categories(keys.iter().map(String::as_str));
        assert_eq!(scale.get("k20"), scale.get("k0"));
    }

    #[test]
    fn ink_contrasts_with_background() {
        assert!(label_ink(AppColor::new(1.0, 1.0, 1.0)).luminance() < 0.2);
        assert!(label_ink(AppColor::new(0.0, 0.0, 0.2)).luminance() > 0.8);
    }
}
