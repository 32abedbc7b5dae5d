//! Mapping of characters (codepoints, not graphemes) to glyph identifiers.
//!
//! The mappings are derived from the
//! [cmap](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap)
//! table.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use ttf_read::tables::cmap::{Cmap, Cmap14, CmapSubtable, EncodingRecord};

use crate::{GlyphId, LoadError};

/// The result of mapping a codepoint, possibly followed by a variation
/// selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphMapping {
    /// The glyph to draw; [`GlyphId::NOTDEF`] if the font has none.
    pub glyph_id: GlyphId,
    /// `true` if the following codepoint was consumed as a variation
    /// selector and should not be mapped on its own.
    pub skip_next: bool,
}

/// Mapping of characters to glyph identifiers.
///
/// ## Selection strategy
///
/// Every subtable except those in format 14 is consulted in the order of
/// the encoding records. While the answer is still glyph 0, the next
/// subtable's answer replaces it. Once a nonzero glyph is found, only a
/// later Windows Unicode BMP subtable (platform 3, encoding 1) that maps
/// the codepoint to a nonzero glyph can replace it.
///
/// Answers are memoized. The cache is shared between threads and never
/// changes the result of a lookup.
#[derive(Debug, Default)]
pub struct Charmap {
    subtables: Vec<(EncodingRecord, CmapSubtable)>,
    variant_subtables: Vec<Cmap14>,
    cache: RwLock<HashMap<u32, GlyphId>>,
}

impl Clone for Charmap {
    fn clone(&self) -> Self {
        Self {
            subtables: self.subtables.clone(),
            variant_subtables: self.variant_subtables.clone(),
            cache: Default::default(),
        }
    }
}

impl Charmap {
    /// Decodes every subtable of the given `cmap` table.
    pub fn new(cmap: &Cmap) -> Result<Self, LoadError> {
        let mut subtables = Vec::new();
        let mut variant_subtables = Vec::new();
        for entry in cmap.subtables() {
            let (record, subtable) = entry?;
            log::debug!(
                "cmap subtable: platform {:?}, encoding {}, format {}",
                record.platform_id(),
                record.encoding_id(),
                subtable.format()
            );
            match subtable {
                CmapSubtable::Format14(cmap14) => variant_subtables.push(cmap14),
                other => subtables.push((record, other)),
            }
        }
        Ok(Self {
            subtables,
            variant_subtables,
            cache: Default::default(),
        })
    }

    /// Returns true if a Unicode variation sequence mapping is available.
    pub fn has_variant_map(&self) -> bool {
        !self.variant_subtables.is_empty()
    }

    /// The subtables used for plain codepoint lookup, in directory order.
    pub fn subtables(&self) -> impl Iterator<Item = (&EncodingRecord, &CmapSubtable)> + '_ {
        self.subtables
            .iter()
            .map(|(record, subtable)| (record, subtable))
    }

    /// Maps a codepoint, and optionally the codepoint after it, to a glyph.
    ///
    /// If `next` is a variation selector known to the font, the variation
    /// sequence is resolved and [`GlyphMapping::skip_next`] is set.
    pub fn map(&self, codepoint: u32, next: Option<u32>) -> GlyphMapping {
        let glyph_id = self.map_codepoint(codepoint);
        let mut mapping = GlyphMapping {
            glyph_id,
            skip_next: false,
        };
        let Some(selector) = next else {
            return mapping;
        };
        for cmap14 in &self.variant_subtables {
            let (variant, skip_next) = cmap14.map_sequence(codepoint, glyph_id, selector);
            if variant != GlyphId::NOTDEF {
                mapping = GlyphMapping {
                    glyph_id: variant,
                    skip_next,
                };
                break;
            }
        }
        mapping
    }

    /// Maps a codepoint to a glyph, ignoring variation sequences.
    pub fn map_codepoint(&self, codepoint: u32) -> GlyphId {
        if let Ok(cache) = self.cache.read() {
            if let Some(glyph_id) = cache.get(&codepoint) {
                return *glyph_id;
            }
        }
        let glyph_id = self.lookup(codepoint);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(codepoint, glyph_id);
        }
        glyph_id
    }

    fn lookup(&self, codepoint: u32) -> GlyphId {
        let mut glyph_id = GlyphId::NOTDEF;
        for (record, subtable) in &self.subtables {
            if glyph_id == GlyphId::NOTDEF {
                glyph_id = subtable.map_codepoint(codepoint);
            } else if record.is_windows_unicode_bmp() {
                let candidate = subtable.map_codepoint(codepoint);
                if candidate != GlyphId::NOTDEF {
                    glyph_id = candidate;
                }
            }
        }
        glyph_id
    }

    /// Returns every codepoint covered by a non-variation subtable.
    ///
    /// A codepoint is covered if some segment or group contains it, even if
    /// it maps to glyph 0 there.
    pub fn codepoints(&self) -> BTreeSet<u32> {
        self.subtables
            .iter()
            .flat_map(|(_, subtable)| subtable.iter_codepoints())
            .collect()
    }

    /// The number of codepoints whose mapping has been memoized.
    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use ttf_read::{FontData, FontRead};
    use ttf_test_data::cmap::{format12, format6, Cmap14Builder, Cmap4Builder, CmapBuilder};

    use super::*;

    fn charmap(table: &[u8]) -> Charmap {
        Charmap::new(&Cmap::read(FontData::new(table)).unwrap()).unwrap()
    }

    #[test]
    fn first_nonzero_subtable_wins() {
        let a = format6(0x41, &[1, 0]);
        let b = format6(0x41, &[5, 6]);
        let map = charmap(&CmapBuilder::new().subtable(0, 3, &a).subtable(1, 0, &b).build());
        assert_eq!(map.map_codepoint(0x41), GlyphId::new(1));
        // glyph 0 from the first subtable is filled in by the next one
        assert_eq!(map.map_codepoint(0x42), GlyphId::new(6));
        assert_eq!(map.map_codepoint(0x43), GlyphId::NOTDEF);
    }

    #[test]
    fn zero_is_filled_in_by_any_later_subtable() {
        let a = format6(0x41, &[0, 0]);
        let b = format6(0x42, &[0]);
        let c = format6(0x41, &[9, 10]);
        let map = charmap(
            &CmapBuilder::new()
                .subtable(0, 3, &a)
                .subtable(1, 0, &b)
                .subtable(0, 4, &c)
                .build(),
        );
        assert_eq!(map.map_codepoint(0x41), GlyphId::new(9));
        assert_eq!(map.map_codepoint(0x42), GlyphId::new(10));
    }

    #[test]
    fn windows_bmp_overrides_with_nonzero() {
        let a = format6(0x41, &[1, 0, 3]);
        let b = format6(0x41, &[5, 6, 0]);
        let map = charmap(&CmapBuilder::new().subtable(0, 3, &a).subtable(3, 1, &b).build());
        assert_eq!(map.map_codepoint(0x41), GlyphId::new(5));
        assert_eq!(map.map_codepoint(0x42), GlyphId::new(6));
        // zero from the windows subtable does not override
        assert_eq!(map.map_codepoint(0x43), GlyphId::new(3));
    }

    #[test]
    fn windows_bmp_first_in_directory() {
        let a = format6(0x41, &[5, 0]);
        let b = format6(0x41, &[7, 8]);
        let map = charmap(&CmapBuilder::new().subtable(3, 1, &a).subtable(3, 10, &b).build());
        // platform 3 encoding 10 does not override a nonzero answer
        assert_eq!(map.map_codepoint(0x41), GlyphId::new(5));
        // but it does fill in glyph 0
        assert_eq!(map.map_codepoint(0x42), GlyphId::new(8));
    }

    #[test]
    fn empty_cmap() {
        let map = charmap(&CmapBuilder::new().build());
        assert_eq!(map.map(0x41, Some(0xfe00)), GlyphMapping::default());
        assert!(map.codepoints().is_empty());
    }

    #[test]
    fn lookups_are_cached() {
        let map = charmap(
            &CmapBuilder::new()
                .subtable(3, 1, &Cmap4Builder::new().delta_segment(0x61, 0x7a, -0x60).build())
                .build(),
        );
        assert_eq!(map.cached_len(), 0);
        assert_eq!(map.map_codepoint(0x62), GlyphId::new(2));
        assert_eq!(map.map_codepoint(0x62), GlyphId::new(2));
        assert_eq!(map.map_codepoint(0x10ffff), GlyphId::NOTDEF);
        assert_eq!(map.cached_len(), 2);
        // clones start cold but agree
        let clone = map.clone();
        assert_eq!(clone.cached_len(), 0);
        assert_eq!(clone.map_codepoint(0x62), GlyphId::new(2));
    }

    #[test]
    fn variation_sequences() {
        let base = format12(&[(0x4e00, 0x4e10, 10)]);
        let variants = Cmap14Builder::new()
            .variant(0xfe00, 0x4e01, 99)
            .default_range(0xfe00, 0x4e02, 1)
            .build();
        let map = charmap(
            &CmapBuilder::new()
                .subtable(0, 5, &variants)
                .subtable(3, 10, &base)
                .build(),
        );
        assert!(map.has_variant_map());
        assert_eq!(map.subtables().count(), 1);
        assert_eq!(
            map.map(0x4e01, Some(0xfe00)),
            GlyphMapping {
                glyph_id: GlyphId::new(99),
                skip_next: true
            }
        );
        // default glyph for a known selector
        assert_eq!(
            map.map(0x4e02, Some(0xfe00)),
            GlyphMapping {
                glyph_id: GlyphId::new(12),
                skip_next: true
            }
        );
        // unknown selector: base mapping, nothing skipped
        assert_eq!(
            map.map(0x4e01, Some(0xfe0f)),
            GlyphMapping {
                glyph_id: GlyphId::new(11),
                skip_next: false
            }
        );
        // the plain lookup is unaffected by earlier variant queries
        assert_eq!(map.map_codepoint(0x4e01), GlyphId::new(11));
    }

    #[test]
    fn coverage_is_sorted_and_deduplicated() {
        let format4 = Cmap4Builder::new().delta_segment(0x41, 0x43, 1).build();
        let groups = format12(&[(0x42, 0x44, 1), (0x1f600, 0x1f601, 9)]);
        let variants = Cmap14Builder::new().variant(0xfe00, 0x2000, 1).build();
        let map = charmap(
            &CmapBuilder::new()
                .subtable(0, 3, &format4)
                .subtable(0, 5, &variants)
                .subtable(3, 10, &groups)
                .build(),
        );
        assert_eq!(
            map.codepoints().into_iter().collect::<Vec<_>>(),
            [0x41, 0x42, 0x43, 0x44, 0xffff, 0x1f600, 0x1f601]
        );
    }
}
