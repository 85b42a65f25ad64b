//! Design themes applied uniformly to a rendered certificate.
//!
//! Every theme is a fixed palette keyed by a short style name (`classic`,
//! `modern`). The registry is built once on first access and is read-only
//! afterwards.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`, case-insensitive.
    ///
    /// ```
    /// use certgen::theme::Rgb;
    /// assert_eq!(Rgb::from_hex("#c9a227"), Some(Rgb::new(201, 162, 39)));
    /// assert_eq!(Rgb::from_hex("2DD4A4"), Some(Rgb::new(45, 212, 164)));
    /// assert_eq!(Rgb::from_hex("#fff"), None);
    /// ```
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels as floats in `0.0..=1.0`, the form PDF colour operators want.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Fixed grey used for labels, periods and the certificate id.
pub const MUTED_TEXT: Rgb = Rgb::new(113, 128, 150);
/// Body text colour for the description and contact details.
pub const BODY_TEXT: Rgb = Rgb::new(74, 85, 104);

/// The design-style key selected in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DesignStyle {
    #[default]
    Classic,
    Modern,
}

impl DesignStyle {
    pub const ALL: [DesignStyle; 2] = [DesignStyle::Classic, DesignStyle::Modern];

    pub fn key(self) -> &'static str {
        match self {
            DesignStyle::Classic => "classic",
            DesignStyle::Modern => "modern",
        }
    }

    /// Looks up the palette for this style.
    pub fn theme(self) -> &'static DesignTheme {
        // Every variant is inserted when the registry is built.
        &THEMES[&self]
    }
}

impl fmt::Display for DesignStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DesignStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "classic gold" | "gold" => Ok(DesignStyle::Classic),
            "modern" | "modern teal" | "teal" => Ok(DesignStyle::Modern),
            other => Err(format!(
                "unknown design '{}' (expected one of: classic, modern)",
                other
            )),
        }
    }
}

/// A named palette.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignTheme {
    pub style: DesignStyle,
    /// Human readable name shown in the design picker.
    pub name: &'static str,
    pub tagline: &'static str,
    /// Flat page fill used by the exported certificate.
    pub page_background: Rgb,
    pub border: Rgb,
    pub inner_border: Rgb,
    pub accent: Rgb,
    pub title: Rgb,
    pub text: Rgb,
    pub corner: Rgb,
}

static THEMES: Lazy<BTreeMap<DesignStyle, DesignTheme>> = Lazy::new(|| {
    let mut themes = BTreeMap::new();
    themes.insert(
        DesignStyle::Classic,
        DesignTheme {
            style: DesignStyle::Classic,
            name: "Classic Gold",
            tagline: "Elegant & Traditional",
            page_background: Rgb::new(255, 254, 245),
            border: Rgb::new(0xc9, 0xa2, 0x27),
            inner_border: Rgb::new(0xd4, 0xaf, 0x37),
            accent: Rgb::new(0xc9, 0xa2, 0x27),
            title: Rgb::new(0x1a, 0x36, 0x5d),
            text: Rgb::new(0x2d, 0x37, 0x48),
            corner: Rgb::new(0xc9, 0xa2, 0x27),
        },
    );
    themes.insert(
        DesignStyle::Modern,
        DesignTheme {
            style: DesignStyle::Modern,
            name: "Modern Teal",
            tagline: "Fresh & Contemporary",
            page_background: Rgb::new(240, 253, 250),
            border: Rgb::new(0x2d, 0xd4, 0xa4),
            inner_border: Rgb::new(0x00, 0xbf, 0xe7),
            accent: Rgb::new(0x1a, 0x9b, 0x7f),
            title: Rgb::new(0x13, 0x4e, 0x4a),
            text: Rgb::new(0x1e, 0x3a, 0x3a),
            corner: Rgb::new(0x2d, 0xd4, 0xa4),
        },
    );
    themes
});

/// All registered themes in a stable order.
pub fn all_themes() -> impl Iterator<Item = &'static DesignTheme> {
    THEMES.values()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_style_has_a_theme() {
        for style in DesignStyle::ALL {
            assert_eq!(style.theme().style, style);
        }
        assert_eq!(all_themes().count(), DesignStyle::ALL.len());
    }

    #[test]
    fn test_theme_palettes() {
        let classic = DesignStyle::Classic.theme();
        assert_eq!(classic.name, "Classic Gold");
        assert_eq!(classic.border, Rgb::from_hex("#c9a227").unwrap());
        assert_eq!(classic.title, Rgb::from_hex("#1a365d").unwrap());
        assert_eq!(classic.page_background, Rgb::new(255, 254, 245));

        let modern = DesignStyle::Modern.theme();
        assert_eq!(modern.name, "Modern Teal");
        assert_eq!(modern.inner_border, Rgb::from_hex("#00BFE7").unwrap());
        assert_eq!(modern.page_background, Rgb::new(240, 253, 250));
    }

    #[test]
    fn test_design_style_parsing() {
        assert_eq!("classic".parse::<DesignStyle>(), Ok(DesignStyle::Classic));
        assert_eq!(" Modern ".parse::<DesignStyle>(), Ok(DesignStyle::Modern));
        assert_eq!("Modern Teal".parse::<DesignStyle>(), Ok(DesignStyle::Modern));
        assert!("neon".parse::<DesignStyle>().is_err());
        assert_eq!(DesignStyle::default(), DesignStyle::Classic);
    }

    #[test]
    fn test_hex_parsing_rejects_garbage() {
        assert_eq!(Rgb::from_hex("zzzzzz"), None);
        assert_eq!(Rgb::from_hex(""), None);
        assert_eq!(Rgb::from_hex("#00000"), None);
        assert_eq!(Rgb::new(255, 0, 0).to_unit(), (1.0, 0.0, 0.0));
    }
}
