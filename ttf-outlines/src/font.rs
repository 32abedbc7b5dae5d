//! The font facade.

use ttf_read::{
    tables::{head::Head, maxp::Maxp},
    FontRef, TableProvider,
};

use crate::{charmap::Charmap, glyf, GlyphId, LoadError, Outline};

/// A font parsed into resolved outlines and a character map.
///
/// Everything is decoded up front, so the font does not borrow the input
/// data. Apart from the character map's lookup cache it is immutable, and
/// it can be shared freely between threads.
#[derive(Clone, Debug)]
pub struct OutlineFont {
    head: Head,
    maxp: Maxp,
    outlines: Vec<Outline>,
    charmap: Charmap,
}

impl OutlineFont {
    /// Parses a font file.
    ///
    /// Fails if the data is not a font, if any of the `head`, `maxp`,
    /// `loca`, `glyf` or `cmap` tables is missing or malformed, or if a
    /// composite glyph cannot be resolved.
    pub fn new(data: &[u8]) -> Result<Self, LoadError> {
        let font = FontRef::new(data)?;
        Self::from_font_ref(&font)
    }

    /// Builds the font from an already parsed table directory.
    pub fn from_font_ref(font: &FontRef) -> Result<Self, LoadError> {
        let head = font.head()?;
        let maxp = font.maxp()?;
        let loca = font.loca(head.has_long_loca_offsets())?;
        let glyf = font.glyf()?;
        log::debug!(
            "{} glyphs, {} loca offsets, {} units per em",
            maxp.num_glyphs,
            if head.has_long_loca_offsets() { "long" } else { "short" },
            head.units_per_em
        );
        let outlines = glyf::load_outlines(&loca, &glyf, maxp.num_glyphs)?;
        let charmap = Charmap::new(&font.cmap()?)?;
        Ok(Self {
            head,
            maxp,
            outlines,
            charmap,
        })
    }

    /// The font header.
    pub fn head(&self) -> &Head {
        &self.head
    }

    /// The maximum profile.
    pub fn maxp(&self) -> &Maxp {
        &self.maxp
    }

    pub fn glyph_count(&self) -> usize {
        self.outlines.len()
    }

    /// All outlines, indexed by glyph identifier.
    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    pub fn outline(&self, glyph_id: GlyphId) -> Option<&Outline> {
        self.outlines.get(glyph_id.to_usize())
    }

    pub fn charmap(&self) -> &Charmap {
        &self.charmap
    }

    /// Maps a codepoint (and optional variation selector) and returns the
    /// outline of the resulting glyph.
    ///
    /// The flag is `true` if `next` was consumed as a variation selector.
    pub fn outline_for_char(&self, codepoint: u32, next: Option<u32>) -> (Option<&Outline>, bool) {
        let mapping = self.charmap.map(codepoint, next);
        (self.outline(mapping.glyph_id), mapping.skip_next)
    }
}
