//! Encoders for character map subtables and the `cmap` table itself.

use std::collections::BTreeMap;

use ttf_types::{GlyphId, Uint24};

use crate::{be_buffer, BeBuffer};

/// A format 0 subtable.
///
/// `glyph_ids` is padded with zeros (or truncated) to 256 entries.
pub fn format0(glyph_ids: &[u8]) -> Vec<u8> {
    let mut glyphs = [0u8; 256];
    let len = glyph_ids.len().min(256);
    glyphs[..len].copy_from_slice(&glyph_ids[..len]);
    let mut buf = be_buffer! { 0u16, 262u16, 0u16 };
    buf.extend(glyphs);
    buf.into_vec()
}

/// A format 6 subtable covering `first_code..first_code + glyph_ids.len()`.
pub fn format6(first_code: u16, glyph_ids: &[u16]) -> Vec<u8> {
    let length = 10 + 2 * glyph_ids.len();
    let mut buf = be_buffer! { 6u16, (length as u16), 0u16, first_code, (glyph_ids.len() as u16) };
    buf.extend(glyph_ids.iter().copied());
    buf.into_vec()
}

/// A format 12 subtable from `(start, end, start_glyph)` groups.
pub fn format12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let length = 16 + 12 * groups.len();
    let mut buf = be_buffer! { 12u16, 0u16, (length as u32), 0u32, (groups.len() as u32) };
    for (start, end, start_glyph) in groups {
        buf.push(*start).push(*end).push(*start_glyph);
    }
    buf.into_vec()
}

#[derive(Clone, Debug)]
enum Cmap4Segment {
    Delta { start: u16, end: u16, delta: i16 },
    Array { start: u16, glyph_ids: Vec<u16> },
}

/// Builds a format 4 subtable.
///
/// Segments must be added in ascending order; the `0xFFFF` terminator is
/// appended automatically.
#[derive(Clone, Debug, Default)]
pub struct Cmap4Builder {
    segments: Vec<Cmap4Segment>,
}

impl Cmap4Builder {
    pub fn new() -> Self {
        Default::default()
    }

    /// A segment mapped by adding `delta` to each codepoint.
    pub fn delta_segment(mut self, start: u16, end: u16, delta: i16) -> Self {
        self.segments
            .push(Cmap4Segment::Delta { start, end, delta });
        self
    }

    /// A segment mapped through the glyph id array, one glyph per
    /// codepoint starting at `start`.
    pub fn array_segment(mut self, start: u16, glyph_ids: &[u16]) -> Self {
        self.segments.push(Cmap4Segment::Array {
            start,
            glyph_ids: glyph_ids.to_vec(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut segments = self.segments.clone();
        segments.push(Cmap4Segment::Delta {
            start: 0xffff,
            end: 0xffff,
            delta: 1,
        });
        let seg_count = segments.len();
        let mut end_codes = Vec::with_capacity(seg_count);
        let mut start_codes = Vec::with_capacity(seg_count);
        let mut deltas = Vec::with_capacity(seg_count);
        let mut range_offsets = Vec::with_capacity(seg_count);
        let mut glyph_id_array = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            match segment {
                Cmap4Segment::Delta { start, end, delta } => {
                    start_codes.push(*start);
                    end_codes.push(*end);
                    deltas.push(*delta);
                    range_offsets.push(0u16);
                }
                Cmap4Segment::Array { start, glyph_ids } => {
                    start_codes.push(*start);
                    end_codes.push(start + (glyph_ids.len() as u16).saturating_sub(1));
                    deltas.push(0);
                    // bytes from this offset entry to the segment's first glyph
                    range_offsets.push((2 * (seg_count - i + glyph_id_array.len())) as u16);
                    glyph_id_array.extend_from_slice(glyph_ids);
                }
            }
        }
        let entry_selector = (seg_count as f64).log2().floor() as u16;
        let search_range = 2 * 2u16.pow(entry_selector as u32);
        let range_shift = (2 * seg_count as u16).saturating_sub(search_range);
        let length = 16 + 8 * seg_count + 2 * glyph_id_array.len();

        let mut buf = be_buffer! {
            4u16,
            (length as u16),
            0u16,
            (2 * seg_count as u16),
            search_range,
            entry_selector,
            range_shift
        };
        buf.extend(end_codes)
            .push(0u16)
            .extend(start_codes)
            .extend(deltas)
            .extend(range_offsets)
            .extend(glyph_id_array);
        buf.into_vec()
    }
}

#[derive(Clone, Debug, Default)]
struct SelectorData {
    default_ranges: Vec<(u32, u8)>,
    variants: Vec<(u32, u16)>,
}

/// Builds a format 14 subtable.
#[derive(Clone, Debug, Default)]
pub struct Cmap14Builder {
    selectors: BTreeMap<u32, SelectorData>,
}

impl Cmap14Builder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a default UVS range: `start` and the `additional_count`
    /// codepoints after it.
    pub fn default_range(mut self, selector: u32, start: u32, additional_count: u8) -> Self {
        self.selectors
            .entry(selector)
            .or_default()
            .default_ranges
            .push((start, additional_count));
        self
    }

    /// Add a non-default UVS mapping.
    pub fn variant(mut self, selector: u32, codepoint: u32, glyph_id: u16) -> Self {
        self.selectors
            .entry(selector)
            .or_default()
            .variants
            .push((codepoint, glyph_id));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        const HEADER_LEN: usize = 10;
        const RECORD_LEN: usize = 11;
        let mut records = BeBuffer::new();
        let mut tables = BeBuffer::new();
        let tables_start = HEADER_LEN + RECORD_LEN * self.selectors.len();
        for (selector, data) in &self.selectors {
            let default_offset = if data.default_ranges.is_empty() {
                0
            } else {
                let offset = tables_start + tables.len();
                tables.push(data.default_ranges.len() as u32);
                for (start, additional_count) in &data.default_ranges {
                    tables.push(Uint24::new(*start)).push(*additional_count);
                }
                offset as u32
            };
            let non_default_offset = if data.variants.is_empty() {
                0
            } else {
                let offset = tables_start + tables.len();
                tables.push(data.variants.len() as u32);
                for (codepoint, glyph_id) in &data.variants {
                    tables
                        .push(Uint24::new(*codepoint))
                        .push(GlyphId::new(*glyph_id));
                }
                offset as u32
            };
            records
                .push(Uint24::new(*selector))
                .push(default_offset)
                .push(non_default_offset);
        }
        let length = tables_start + tables.len();
        let mut buf = be_buffer! { 14u16, (length as u32), (self.selectors.len() as u32) };
        buf.extend_bytes(&records).extend_bytes(&tables);
        buf.into_vec()
    }
}

/// Builds a `cmap` table from encoding records and their subtables.
///
/// Records are written in the order they are added. Identical subtables
/// are stored once and shared.
#[derive(Clone, Debug, Default)]
pub struct CmapBuilder {
    records: Vec<(u16, u16, Vec<u8>)>,
}

impl CmapBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn subtable(mut self, platform_id: u16, encoding_id: u16, subtable: &[u8]) -> Self {
        self.records
            .push((platform_id, encoding_id, subtable.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut header = be_buffer! { 0u16, (self.records.len() as u16) };
        let mut subtables = BeBuffer::new();
        let mut offsets: Vec<(&[u8], u32)> = Vec::new();
        let subtables_start = 4 + 8 * self.records.len();
        for (platform_id, encoding_id, data) in &self.records {
            let offset = match offsets.iter().find(|(bytes, _)| *bytes == data.as_slice()) {
                Some((_, offset)) => *offset,
                None => {
                    let offset = (subtables_start + subtables.len()) as u32;
                    subtables.extend_bytes(data);
                    offsets.push((data.as_slice(), offset));
                    offset
                }
            };
            header.push(*platform_id).push(*encoding_id).push(offset);
        }
        header.extend_bytes(&subtables);
        header.into_vec()
    }
}

/// Contains two codepoint ranges, both [6, 64].
pub fn repetitive_cmap4() -> BeBuffer {
    be_buffer! {
      4u16,                      // format
      0u16,                      // length, unused
      0u16,                      // language, unused
      4u16,                      // segCountX2, 2 * 2 segments
      0u16,                      // searchRange, unused
      0u16,                      // entrySelector, unused
      0u16,                      // rangeShift, unused
      // endCode
      [64u16, 64],
      0u16,                      // reservedPad
      // startCode
      [6u16, 6],
      // idDelta
      [0i16, 0],
      // idRangeOffset
      [0u16, 0]
      // no glyphIdArray entries
    }
}
