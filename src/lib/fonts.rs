//! Font discovery for raster output and the embedded signature font.
//!
//! PDF output uses the base-14 fonts for everything except the signature, so the only
//! font the vector exporter ever needs from disk is the script face. Raster output has
//! to draw real glyphs, so every face used by the layout is resolved here against the
//! system font database (plus any user-supplied directories) with a list of aliases per
//! family. Nothing in here is fatal: a face that cannot be found is drawn with the copy
//! of the matching base-14 face that printpdf bundles, and the script face falls back
//! to Times bold italic.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::panic;
use std::path::{Path, PathBuf};

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::{point, Font, Scale};

use crate::pdf::builtin_font;
use crate::scene::FontFace;
use crate::CertError;

/// Font-related configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    /// Directories or font files searched before the system fonts.
    pub custom_paths: Vec<PathBuf>,
    pub sans_family: Option<String>,
    pub serif_family: Option<String>,
    pub mono_family: Option<String>,
    /// Family name of the signature font when it is not given as a file.
    pub script_family: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        FontConfig {
            custom_paths: Vec::new(),
            sans_family: None,
            serif_family: None,
            mono_family: None,
            script_family: "Dancing Script".to_string(),
        }
    }
}

/// Returns common aliases for a font name.
///
/// This allows the base-14 names used by the layout to resolve to whatever metric
/// compatible family the machine has installed.
fn get_font_aliases(name: &str) -> Vec<&'static str> {
    match name.to_lowercase().as_str() {
        "arial" => vec!["Helvetica", "Liberation Sans", "FreeSans"],
        "helvetica" => vec!["Arial", "Liberation Sans", "Nimbus Sans", "FreeSans", "DejaVu Sans"],
        "times new roman" | "times" => vec![
            "Times",
            "Times New Roman",
            "Liberation Serif",
            "Nimbus Roman",
            "FreeSerif",
            "DejaVu Serif",
        ],
        "courier new" | "courier" => vec![
            "Courier",
            "Courier New",
            "Liberation Mono",
            "Nimbus Mono PS",
            "FreeMono",
            "DejaVu Sans Mono",
        ],
        "dancing script" => vec!["Great Vibes", "Pacifico", "URW Chancery L", "Z003"],
        _ => vec![],
    }
}

/// The distinct font files a certificate can need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FontSlot {
    Sans,
    SansBold,
    Serif,
    SerifBold,
    SerifItalic,
    SerifBoldItalic,
    Mono,
    Script,
}

impl FontSlot {
    const SYSTEM: [FontSlot; 7] = [
        FontSlot::Sans,
        FontSlot::SansBold,
        FontSlot::Serif,
        FontSlot::SerifBold,
        FontSlot::SerifItalic,
        FontSlot::SerifBoldItalic,
        FontSlot::Mono,
    ];

    fn for_face(face: FontFace) -> FontSlot {
        match face {
            FontFace::Helvetica => FontSlot::Sans,
            FontFace::HelveticaBold => FontSlot::SansBold,
            FontFace::TimesRoman => FontSlot::Serif,
            FontFace::TimesBold => FontSlot::SerifBold,
            FontFace::TimesItalic => FontSlot::SerifItalic,
            FontFace::TimesBoldItalic => FontSlot::SerifBoldItalic,
            FontFace::Courier => FontSlot::Mono,
            FontFace::Script => FontSlot::Script,
        }
    }

    /// Slots to try, in order, when this one is missing.
    fn fallbacks(self) -> &'static [FontSlot] {
        match self {
            FontSlot::Sans => &[FontSlot::Serif, FontSlot::Mono],
            FontSlot::SansBold => &[FontSlot::Sans, FontSlot::SerifBold, FontSlot::Serif],
            FontSlot::Serif => &[FontSlot::Sans, FontSlot::Mono],
            FontSlot::SerifBold => &[FontSlot::Serif, FontSlot::SansBold, FontSlot::Sans],
            FontSlot::SerifItalic => &[FontSlot::Serif, FontSlot::Sans],
            FontSlot::SerifBoldItalic => &[
                FontSlot::SerifBold,
                FontSlot::SerifItalic,
                FontSlot::Serif,
                FontSlot::Sans,
            ],
            FontSlot::Mono => &[FontSlot::Sans, FontSlot::Serif],
            FontSlot::Script => &[FontSlot::SerifBoldItalic, FontSlot::SerifItalic, FontSlot::Serif],
        }
    }

    /// The base-14 face standing in for this slot. The script face has none.
    fn base_face(self) -> Option<FontFace> {
        match self {
            FontSlot::Sans => Some(FontFace::Helvetica),
            FontSlot::SansBold => Some(FontFace::HelveticaBold),
            FontSlot::Serif => Some(FontFace::TimesRoman),
            FontSlot::SerifBold => Some(FontFace::TimesBold),
            FontSlot::SerifItalic => Some(FontFace::TimesItalic),
            FontSlot::SerifBoldItalic => Some(FontFace::TimesBoldItalic),
            FontSlot::Mono => Some(FontFace::Courier),
            FontSlot::Script => None,
        }
    }

    fn weight(self) -> Weight {
        match self {
            FontSlot::SansBold | FontSlot::SerifBold | FontSlot::SerifBoldItalic => Weight::BOLD,
            _ => Weight::NORMAL,
        }
    }

    fn style(self) -> Style {
        match self {
            FontSlot::SerifItalic | FontSlot::SerifBoldItalic => Style::Italic,
            _ => Style::Normal,
        }
    }
}

/// The system font database is scanned once per process.
static SYSTEM_FONTS: Lazy<Database> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    debug!("Loaded {} system font faces", db.len());
    db
});

/// The base-14 faces printpdf ships as WinAnsi TrueType subsets, parsed once per process.
static BUILTIN_FONTS: Lazy<HashMap<FontSlot, Font<'static>>> = Lazy::new(|| {
    FontSlot::SYSTEM
        .iter()
        .filter_map(|&slot| {
            let face = slot.base_face()?;
            let font = parse_font(builtin_font(face).get_subset_font().bytes, 0);
            if font.is_none() {
                warn!("Bundled font for {:?} failed to parse", face);
            }
            font.map(|font| (slot, font))
        })
        .collect()
});

/// The bundled base-14 face for `face`. The script face maps to Times bold italic.
pub fn bundled_font(face: FontFace) -> Option<&'static Font<'static>> {
    let slot = match FontSlot::for_face(face) {
        FontSlot::Script => FontSlot::SerifBoldItalic,
        slot => slot,
    };
    BUILTIN_FONTS.get(&slot)
}

/// Parses font bytes with rusttype, guarding against panics in malformed files.
fn parse_font(bytes: Vec<u8>, index: u32) -> Option<Font<'static>> {
    panic::catch_unwind(move || Font::try_from_vec_and_index(bytes, index)).unwrap_or(None)
}

/// Reads a single font file and checks that it parses.
pub fn load_font_file(path: &Path) -> Result<Vec<u8>, CertError> {
    let bytes = fs::read(path).map_err(|e| CertError::FontError {
        font_name: path.display().to_string(),
        message: e.to_string(),
        suggestion: "Check the font path in the [assets] or [fonts] configuration".to_string(),
    })?;
    if parse_font(bytes.clone(), 0).is_none() {
        return Err(CertError::FontError {
            font_name: path.display().to_string(),
            message: "the file is not a TrueType/OpenType font".to_string(),
            suggestion: "Use a .ttf or .otf file (collections are not supported)".to_string(),
        });
    }
    Ok(bytes)
}

/// The rusttype faces resolved for one export session.
pub struct FontBook {
    fonts: HashMap<FontSlot, Font<'static>>,
    /// Slots no system face was found for; these draw with the bundled base-14 face.
    bundled_slots: Vec<FontSlot>,
    script_bytes: Option<Vec<u8>>,
}

impl FontBook {
    /// A font book that draws everything with the bundled base-14 faces and has no
    /// signature font.
    pub fn bundled() -> Self {
        FontBook {
            fonts: HashMap::new(),
            bundled_slots: FontSlot::SYSTEM.to_vec(),
            script_bytes: None,
        }
    }

    /// Resolves every face, searching `config.custom_paths` before the system fonts.
    /// `signature_font` is tried before the configured script family.
    pub fn load(config: &FontConfig, signature_font: Option<&Path>) -> Self {
        let mut db = SYSTEM_FONTS.clone();
        for path in &config.custom_paths {
            if path.is_dir() {
                db.load_fonts_dir(path);
            } else if path.is_file() {
                if let Err(e) = db.load_font_file(path) {
                    warn!("Failed to read font file {:?}: {}", path, e);
                }
            } else {
                warn!("Font path {:?} does not exist", path);
            }
        }

        let mut book = FontBook {
            fonts: HashMap::new(),
            bundled_slots: Vec::new(),
            script_bytes: None,
        };
        for slot in FontSlot::SYSTEM {
            let preferred = match slot {
                FontSlot::Sans | FontSlot::SansBold => config.sans_family.as_deref(),
                FontSlot::Mono => config.mono_family.as_deref(),
                _ => config.serif_family.as_deref(),
            };
            let base = match slot {
                FontSlot::Sans | FontSlot::SansBold => "Helvetica",
                FontSlot::Mono => "Courier",
                _ => "Times",
            };
            let mut names: Vec<&str> = preferred.into_iter().collect();
            names.push(base);
            names.extend(get_font_aliases(base));

            let generic = match slot {
                FontSlot::Sans | FontSlot::SansBold => Family::SansSerif,
                FontSlot::Mono => Family::Monospace,
                _ => Family::Serif,
            };
            if let Some((font, _)) = query_font(&db, &names, Some(generic), slot) {
                book.fonts.insert(slot, font);
            } else {
                debug!("No system face for {:?}, using the bundled face", slot);
                book.bundled_slots.push(slot);
            }
        }

        if book.bundled_slots.len() == FontSlot::SYSTEM.len() {
            warn!("No system fonts matched; raster text uses the bundled base-14 faces");
        } else if !book.bundled_slots.is_empty() {
            info!("{} raster faces use the bundled base-14 faces", book.bundled_slots.len());
        }

        book.load_script(config, signature_font, &db);
        book
    }

    fn load_script(&mut self, config: &FontConfig, signature_font: Option<&Path>, db: &Database) {
        if let Some(path) = signature_font {
            match load_font_file(path) {
                Ok(bytes) => {
                    if let Some(font) = parse_font(bytes.clone(), 0) {
                        info!("Using signature font {}", path.display());
                        self.fonts.insert(FontSlot::Script, font);
                        self.script_bytes = Some(bytes);
                        return;
                    }
                }
                Err(e) => debug!("Signature font unavailable: {}", e),
            }
        }

        let mut names = vec![config.script_family.as_str()];
        names.extend(get_font_aliases(&config.script_family));
        if let Some((font, bytes)) = query_font(db, &names, None, FontSlot::Script) {
            info!("Using system signature font '{}'", config.script_family);
            self.fonts.insert(FontSlot::Script, font);
            self.script_bytes = Some(bytes);
        } else {
            warn!(
                "Could not load signature font '{}'; falling back to Times italic",
                config.script_family
            );
        }
    }

    /// Whether the signature can be set in the script face.
    pub fn has_script(&self) -> bool {
        self.script_bytes.is_some()
    }

    /// Raw bytes of the script face, for embedding in PDF output.
    pub fn script_font_bytes(&self) -> Option<&[u8]> {
        self.script_bytes.as_deref()
    }

    /// Whether some raster face had no system match and is drawn with a bundled face.
    pub fn uses_bundled_faces(&self) -> bool {
        !self.bundled_slots.is_empty()
    }

    /// Advance width in points of `text` set in the loaded `face` at `size` points.
    pub fn measure(&self, face: FontFace, size: f32, text: &str) -> Option<f32> {
        let font = self.font_for(face)?;
        let glyphs: Vec<_> = font.layout(text, em_scale(font, size), point(0.0, 0.0)).collect();
        Some(
            glyphs
                .last()
                .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                .unwrap_or(0.0),
        )
    }

    /// The face to rasterize `face` with. Each slot prefers its system face, then its
    /// bundled face, before moving down the fallback chain.
    pub fn font_for(&self, face: FontFace) -> Option<&Font<'static>> {
        let slot = FontSlot::for_face(face);
        std::iter::once(slot)
            .chain(slot.fallbacks().iter().copied())
            .find_map(|s| self.fonts.get(&s).or_else(|| BUILTIN_FONTS.get(&s)))
    }
}

/// rusttype scales by ascent-to-descent height; certificate font sizes are em sizes.
pub fn em_scale(font: &Font<'_>, size: f32) -> Scale {
    let v = font.v_metrics_unscaled();
    let units_per_em = font.units_per_em() as f32;
    let height = v.ascent - v.descent;
    if units_per_em <= 0.0 || height <= 0.0 {
        return Scale::uniform(size);
    }
    Scale::uniform(size * height / units_per_em)
}

/// Queries `db` for the first family in `names` (then `generic`) matching the slot's
/// weight and style. Collections are accepted; rusttype reads the indexed face.
fn query_font(
    db: &Database,
    names: &[&str],
    generic: Option<Family<'_>>,
    slot: FontSlot,
) -> Option<(Font<'static>, Vec<u8>)> {
    let mut families: Vec<Family<'_>> = names.iter().map(|&n| Family::Name(n)).collect();
    families.extend(generic);
    let query = Query {
        families: &families,
        weight: slot.weight(),
        stretch: Stretch::Normal,
        style: slot.style(),
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| {
        let bytes = data.to_vec();
        parse_font(bytes.clone(), index).map(|font| (font, bytes))
    })
    .flatten()
}
