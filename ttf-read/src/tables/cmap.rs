//! The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap) table
//!
//! Subtables are decoded into owned, normalized representations when they
//! are read. Lookups on a decoded subtable never fail: a codepoint that
//! is not covered maps to [`GlyphId::NOTDEF`].

use std::collections::{btree_map::Entry, BTreeMap};
use std::ops::Range;

use types::{BigEndian, FixedSize, GlyphId, Scalar, Tag, Uint24};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// 'cmap'
pub const TAG: Tag = Tag::new(b"cmap");

/// Unicode codepoints in the supplementary planes end here.
const MAX_CODEPOINT: u32 = 0x10FFFF;

/// [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#overview)
#[derive(Clone, Debug)]
pub struct Cmap<'a> {
    data: FontData<'a>,
    version: u16,
    encoding_records: &'a [EncodingRecord],
}

impl TopLevelTable for Cmap<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Cmap<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version = cursor.read()?;
        let num_tables: u16 = cursor.read()?;
        let encoding_records = cursor.read_array(num_tables as usize)?;
        Ok(Cmap {
            data,
            version,
            encoding_records,
        })
    }
}

impl<'a> Cmap<'a> {
    /// Table version number (0).
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The encoding records, in the order they appear in the table.
    pub fn encoding_records(&self) -> &'a [EncodingRecord] {
        self.encoding_records
    }

    /// Decode the subtable referenced by the given record.
    pub fn subtable(&self, record: &EncodingRecord) -> Result<CmapSubtable, ReadError> {
        self.data.read_table_at(record.subtable_offset() as usize)
    }

    /// Decode every subtable, in encoding record order.
    pub fn subtables(
        &self,
    ) -> impl Iterator<Item = Result<(EncodingRecord, CmapSubtable), ReadError>> + '_ {
        self.encoding_records
            .iter()
            .map(|record| self.subtable(record).map(|subtable| (*record, subtable)))
    }
}

/// Part of [Cmap]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
pub struct EncodingRecord {
    platform_id: BigEndian<u16>,
    encoding_id: BigEndian<u16>,
    subtable_offset: BigEndian<u32>,
}

impl EncodingRecord {
    /// Platform ID.
    pub fn platform_id(&self) -> PlatformId {
        PlatformId::new(self.platform_id.get())
    }

    /// Platform-specific encoding ID.
    pub fn encoding_id(&self) -> u16 {
        self.encoding_id.get()
    }

    /// Byte offset from beginning of the cmap table to the subtable for
    /// this encoding.
    pub fn subtable_offset(&self) -> u32 {
        self.subtable_offset.get()
    }

    /// `true` for the Windows Unicode BMP encoding (platform 3, encoding 1).
    pub fn is_windows_unicode_bmp(&self) -> bool {
        self.platform_id() == PlatformId::Windows && self.encoding_id() == 1
    }
}

impl FixedSize for EncodingRecord {
    const RAW_BYTE_LEN: usize = u16::RAW_BYTE_LEN + u16::RAW_BYTE_LEN + u32::RAW_BYTE_LEN;
}

/// <https://docs.microsoft.com/en-us/typography/opentype/spec/name#platform-ids>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformId {
    #[default]
    Unicode,
    Macintosh,
    ISO,
    Windows,
    Custom,
    Unknown(u16),
}

impl PlatformId {
    /// Create from a raw scalar.
    pub fn new(raw: u16) -> Self {
        match raw {
            0 => Self::Unicode,
            1 => Self::Macintosh,
            2 => Self::ISO,
            3 => Self::Windows,
            4 => Self::Custom,
            other => Self::Unknown(other),
        }
    }
}

/// A decoded character map subtable.
///
/// The set of formats is closed; anything other than 0, 4, 6, 12 and 14
/// (including format 2) is kept as [`CmapSubtable::Unsupported`] and maps
/// every codepoint to glyph 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CmapSubtable {
    /// Format 0 byte encoding table, normalized to a segment map.
    Format0(Cmap4),
    Format4(Cmap4),
    Format6(Cmap6),
    Format12(Cmap12),
    Format14(Cmap14),
    /// Any other format, with its format number.
    Unsupported(u16),
}

impl<'a> FontRead<'a> for CmapSubtable {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            0 => Cmap4::read_byte_table(data).map(Self::Format0),
            4 => Cmap4::read(data).map(Self::Format4),
            6 => Cmap6::read(data).map(Self::Format6),
            12 => Cmap12::read(data).map(Self::Format12),
            14 => Cmap14::read(data).map(Self::Format14),
            other => {
                log::debug!("cmap subtable format {other} is not supported, mapping to glyph 0");
                Ok(Self::Unsupported(other))
            }
        }
    }
}

impl CmapSubtable {
    /// The format number of the subtable as stored in the font.
    pub fn format(&self) -> u16 {
        match self {
            Self::Format0(_) => 0,
            Self::Format4(_) => 4,
            Self::Format6(_) => 6,
            Self::Format12(_) => 12,
            Self::Format14(_) => 14,
            Self::Unsupported(format) => *format,
        }
    }

    /// Maps a codepoint to a glyph identifier.
    ///
    /// Format 14 subtables need a variation selector and always return
    /// glyph 0 here; see [`Cmap14::map_variant`].
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> GlyphId {
        match self {
            Self::Format0(subtable) | Self::Format4(subtable) => subtable.map_codepoint(codepoint),
            Self::Format6(subtable) => subtable.map_codepoint(codepoint),
            Self::Format12(subtable) => subtable.map_codepoint(codepoint),
            Self::Format14(_) | Self::Unsupported(_) => GlyphId::NOTDEF,
        }
    }

    /// Returns an iterator over every codepoint covered by the subtable.
    ///
    /// This includes codepoints that a covering segment maps to glyph 0.
    /// Format 14 and unsupported subtables cover nothing.
    pub fn iter_codepoints(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Self::Format0(subtable) | Self::Format4(subtable) => {
                Box::new(subtable.iter_codepoints())
            }
            Self::Format6(subtable) => Box::new(subtable.iter_codepoints()),
            Self::Format12(subtable) => Box::new(subtable.iter_codepoints()),
            Self::Format14(_) | Self::Unsupported(_) => Box::new(std::iter::empty()),
        }
    }
}

fn to_vec<T: Scalar + Copy>(raw: &[BigEndian<T>]) -> Vec<T> {
    raw.iter().map(BigEndian::get).collect()
}

/// [cmap Format 4](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values):
/// Segment mapping to delta values
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cmap4 {
    end_code: Vec<u16>,
    start_code: Vec<u16>,
    id_delta: Vec<i16>,
    id_range_offsets: Vec<u16>,
    glyph_id_array: Vec<u16>,
}

impl<'a> FontRead<'a> for Cmap4 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance::<u16>(); // format
        let length: u16 = cursor.read()?;
        cursor.advance::<u16>(); // language
        let seg_count_x2: u16 = cursor.read()?;
        let seg_count = seg_count_x2 as usize / 2;
        // searchRange, entrySelector, rangeShift
        cursor.advance_by(3 * u16::RAW_BYTE_LEN);
        let end_code = to_vec(cursor.read_array::<BigEndian<u16>>(seg_count)?);
        cursor.advance::<u16>(); // reservedPad
        let start_code = to_vec(cursor.read_array::<BigEndian<u16>>(seg_count)?);
        let id_delta = to_vec(cursor.read_array::<BigEndian<i16>>(seg_count)?);
        let id_range_offsets = to_vec(cursor.read_array::<BigEndian<u16>>(seg_count)?);
        // the glyph id array runs to the end of the subtable, as declared
        // by its length field
        let start = cursor.position()?;
        let end = (length as usize).min(data.len()).max(start);
        let end = end - (end - start) % u16::RAW_BYTE_LEN;
        let glyph_id_array = to_vec(data.read_array::<BigEndian<u16>>(start..end)?);
        Ok(Cmap4 {
            end_code,
            start_code,
            id_delta,
            id_range_offsets,
            glyph_id_array,
        })
    }
}

impl Cmap4 {
    /// Read a [format 0](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-0-byte-encoding-table)
    /// subtable and normalize it to two segments: `0..=255` mapped through
    /// the byte array, and the `0xFFFF` terminator mapped to glyph 0.
    pub fn read_byte_table(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        // format, length, language
        cursor.advance_by(3 * u16::RAW_BYTE_LEN);
        let glyph_id_array = cursor.read_bytes(256)?;
        Ok(Self::from_byte_table(glyph_id_array))
    }

    fn from_byte_table(glyph_ids: &[u8]) -> Self {
        Cmap4 {
            end_code: vec![255, 0xFFFF],
            start_code: vec![0, 0xFFFF],
            id_delta: vec![0, 1],
            // the first offset points just past the offset array: two
            // entries of two bytes
            id_range_offsets: vec![4, 0],
            glyph_id_array: glyph_ids.iter().map(|gid| *gid as u16).collect(),
        }
    }

    /// The number of segments.
    pub fn seg_count(&self) -> usize {
        self.end_code.len()
    }

    /// Returns the `(start, end)` codepoints of each segment.
    pub fn segments(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.start_code
            .iter()
            .copied()
            .zip(self.end_code.iter().copied())
    }

    /// Maps a codepoint to a glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> GlyphId {
        let Ok(codepoint) = u16::try_from(codepoint.into()) else {
            return GlyphId::NOTDEF;
        };
        // first segment whose end is >= the codepoint
        let segment_ix = self.end_code.partition_point(|end| *end < codepoint);
        let (Some(start), Some(delta), Some(range_offset)) = (
            self.start_code.get(segment_ix),
            self.id_delta.get(segment_ix),
            self.id_range_offsets.get(segment_ix),
        ) else {
            return GlyphId::NOTDEF;
        };
        if codepoint < *start {
            return GlyphId::NOTDEF;
        }
        if *range_offset == 0 {
            return GlyphId::new(codepoint.wrapping_add(*delta as u16));
        }
        // the range offset is relative to its own position in the
        // id_range_offsets array, so subtract the distance from that
        // position to the start of the glyph id array
        let index = (*range_offset / 2) as isize + (codepoint - *start) as isize
            - (self.id_range_offsets.len() - segment_ix) as isize;
        usize::try_from(index)
            .ok()
            .and_then(|index| self.glyph_id_array.get(index))
            .map(|gid| GlyphId::new(*gid))
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Returns an iterator over every codepoint in every segment.
    pub fn iter_codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments()
            .flat_map(|(start, end)| start as u32..=end as u32)
    }
}

/// [cmap Format 6](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-6-trimmed-table-mapping):
/// Trimmed table mapping
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cmap6 {
    first_code: u16,
    glyph_id_array: Vec<u16>,
}

impl<'a> FontRead<'a> for Cmap6 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        // format, length, language
        cursor.advance_by(3 * u16::RAW_BYTE_LEN);
        let first_code = cursor.read()?;
        let entry_count: u16 = cursor.read()?;
        let glyph_id_array = to_vec(cursor.read_array::<BigEndian<u16>>(entry_count as usize)?);
        Ok(Cmap6 {
            first_code,
            glyph_id_array,
        })
    }
}

impl Cmap6 {
    /// First character code of subrange.
    pub fn first_code(&self) -> u16 {
        self.first_code
    }

    /// Maps a codepoint to a glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> GlyphId {
        codepoint
            .into()
            .checked_sub(self.first_code as u32)
            .and_then(|index| self.glyph_id_array.get(index as usize))
            .map(|gid| GlyphId::new(*gid))
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Returns an iterator over `first_code..first_code + entry_count`.
    pub fn iter_codepoints(&self) -> impl Iterator<Item = u32> {
        let start = self.first_code as u32;
        start..start + self.glyph_id_array.len() as u32
    }
}

/// Part of [Cmap12]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
struct RawSequentialMapGroup {
    start_char_code: BigEndian<u32>,
    end_char_code: BigEndian<u32>,
    start_glyph_id: BigEndian<u32>,
}

impl FixedSize for RawSequentialMapGroup {
    const RAW_BYTE_LEN: usize = 3 * u32::RAW_BYTE_LEN;
}

/// A contiguous run of codepoints mapped to a contiguous run of glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequentialMapGroup {
    /// First character code in this group.
    pub start_char_code: u32,
    /// Last character code in this group.
    pub end_char_code: u32,
    /// Glyph index corresponding to the starting character code.
    pub start_glyph_id: u32,
}

/// [cmap Format 12](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-12-segmented-coverage):
/// Segmented coverage
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cmap12 {
    groups: Vec<SequentialMapGroup>,
}

impl<'a> FontRead<'a> for Cmap12 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        // format, reserved
        cursor.advance_by(2 * u16::RAW_BYTE_LEN);
        // length, language
        cursor.advance_by(2 * u32::RAW_BYTE_LEN);
        let num_groups: u32 = cursor.read()?;
        let groups = cursor
            .read_array::<RawSequentialMapGroup>(num_groups as usize)?
            .iter()
            .map(|group| SequentialMapGroup {
                start_char_code: group.start_char_code.get(),
                end_char_code: group.end_char_code.get(),
                start_glyph_id: group.start_glyph_id.get(),
            })
            .collect();
        Ok(Cmap12 { groups })
    }
}

impl Cmap12 {
    pub fn groups(&self) -> &[SequentialMapGroup] {
        &self.groups
    }

    /// Maps a codepoint to a glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> GlyphId {
        let codepoint = codepoint.into();
        // one past the last group starting at or before the codepoint
        let ix = self
            .groups
            .partition_point(|group| group.start_char_code <= codepoint);
        let Some(group) = ix.checked_sub(1).and_then(|ix| self.groups.get(ix)) else {
            return GlyphId::NOTDEF;
        };
        if codepoint > group.end_char_code {
            return GlyphId::NOTDEF;
        }
        group
            .start_glyph_id
            .checked_add(codepoint - group.start_char_code)
            .and_then(|gid| u16::try_from(gid).ok())
            .map(GlyphId::new)
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Returns an iterator over the codepoints of every group, limited to
    /// the Unicode range.
    pub fn iter_codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.iter().flat_map(|group| {
            group.start_char_code.min(MAX_CODEPOINT + 1)..=group.end_char_code.min(MAX_CODEPOINT)
        })
    }
}

/// Part of [Cmap14]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
struct VariationSelectorRecord {
    var_selector: BigEndian<Uint24>,
    default_uvs_offset: BigEndian<u32>,
    non_default_uvs_offset: BigEndian<u32>,
}

impl FixedSize for VariationSelectorRecord {
    const RAW_BYTE_LEN: usize = Uint24::RAW_BYTE_LEN + 2 * u32::RAW_BYTE_LEN;
}

/// Part of [Cmap14]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
struct UnicodeRange {
    start_unicode_value: BigEndian<Uint24>,
    additional_count: u8,
}

impl FixedSize for UnicodeRange {
    const RAW_BYTE_LEN: usize = Uint24::RAW_BYTE_LEN + u8::RAW_BYTE_LEN;
}

/// Part of [Cmap14]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
struct UvsMapping {
    unicode_value: BigEndian<Uint24>,
    glyph_id: BigEndian<GlyphId>,
}

impl FixedSize for UvsMapping {
    const RAW_BYTE_LEN: usize = Uint24::RAW_BYTE_LEN + GlyphId::RAW_BYTE_LEN;
}

/// The sequences for a single variation selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariationSelector {
    default_ranges: Vec<Range<u32>>,
    overrides: BTreeMap<u32, GlyphId>,
}

impl VariationSelector {
    /// Ranges of base codepoints that use the glyph from the regular
    /// mapping.
    pub fn default_ranges(&self) -> &[Range<u32>] {
        &self.default_ranges
    }

    /// Returns `true` if the base codepoint is in a default range.
    pub fn is_default(&self, codepoint: u32) -> bool {
        self.default_ranges
            .iter()
            .any(|range| range.contains(&codepoint))
    }

    /// The glyph explicitly assigned to the base codepoint, if any.
    pub fn override_for(&self, codepoint: u32) -> Option<GlyphId> {
        self.overrides.get(&codepoint).copied()
    }
}

/// The result of mapping a variation sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapVariant {
    /// The variation selector should be ignored, and the default mapping
    /// of the character should be used.
    UseDefault,
    /// The variant glyph mapped by a codepoint.
    Variant(GlyphId),
}

/// [cmap Format 14](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-14-unicode-variation-sequences):
/// Unicode Variation Sequences
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cmap14 {
    selectors: BTreeMap<u32, VariationSelector>,
}

impl<'a> FontRead<'a> for Cmap14 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance::<u16>(); // format
        cursor.advance::<u32>(); // length
        let num_records: u32 = cursor.read()?;
        let records = cursor.read_array::<VariationSelectorRecord>(num_records as usize)?;
        let mut selectors = BTreeMap::new();
        for record in records {
            let selector = record.var_selector.get().to_u32();
            let variation = VariationSelector {
                default_ranges: read_default_uvs(data, record.default_uvs_offset.get())?,
                overrides: read_non_default_uvs(data, record.non_default_uvs_offset.get())?,
            };
            match selectors.entry(selector) {
                Entry::Vacant(entry) => {
                    entry.insert(variation);
                }
                Entry::Occupied(_) => {
                    log::warn!("ignoring duplicate record for variation selector U+{selector:04X}")
                }
            }
        }
        Ok(Cmap14 { selectors })
    }
}

/// Ranges are `start..start + additional_count`.
fn read_default_uvs(data: FontData, offset: u32) -> Result<Vec<Range<u32>>, ReadError> {
    if offset == 0 {
        return Ok(Vec::new());
    }
    let mut cursor = data
        .split_off(offset as usize)
        .ok_or(ReadError::TruncatedData)?
        .cursor();
    let num_ranges: u32 = cursor.read()?;
    Ok(cursor
        .read_array::<UnicodeRange>(num_ranges as usize)?
        .iter()
        .map(|range| {
            let start = range.start_unicode_value.get().to_u32();
            start..start + range.additional_count as u32
        })
        .collect())
}

fn read_non_default_uvs(data: FontData, offset: u32) -> Result<BTreeMap<u32, GlyphId>, ReadError> {
    let mut overrides = BTreeMap::new();
    if offset == 0 {
        return Ok(overrides);
    }
    let mut cursor = data
        .split_off(offset as usize)
        .ok_or(ReadError::TruncatedData)?
        .cursor();
    let num_mappings: u32 = cursor.read()?;
    for mapping in cursor.read_array::<UvsMapping>(num_mappings as usize)? {
        overrides
            .entry(mapping.unicode_value.get().to_u32())
            .or_insert(mapping.glyph_id.get());
    }
    Ok(overrides)
}

impl Cmap14 {
    /// The variation selectors present in the subtable, in ascending order.
    pub fn selectors(&self) -> impl Iterator<Item = (u32, &VariationSelector)> + '_ {
        self.selectors
            .iter()
            .map(|(selector, variation)| (*selector, variation))
    }

    /// Returns the variant mapping for the given codepoint and selector.
    ///
    /// Returns `None` if the selector is not known to this subtable. A known
    /// selector without an explicit glyph for the codepoint yields
    /// [`MapVariant::UseDefault`], whether or not the codepoint falls in one
    /// of the selector's default ranges.
    pub fn map_variant(
        &self,
        codepoint: impl Into<u32>,
        selector: impl Into<u32>,
    ) -> Option<MapVariant> {
        let variation = self.selectors.get(&selector.into())?;
        let codepoint = codepoint.into();
        match variation.override_for(codepoint) {
            Some(gid) => Some(MapVariant::Variant(gid)),
            None => Some(MapVariant::UseDefault),
        }
    }

    /// Resolves a base codepoint followed by a selector.
    ///
    /// Returns the glyph and whether the caller should skip the selector
    /// codepoint: an explicit override wins, any other known selector
    /// yields `default_glyph`, and an unknown selector yields glyph 0 with
    /// no skip.
    pub fn map_sequence(
        &self,
        codepoint: impl Into<u32>,
        default_glyph: GlyphId,
        selector: impl Into<u32>,
    ) -> (GlyphId, bool) {
        match self.map_variant(codepoint, selector) {
            Some(MapVariant::Variant(gid)) => (gid, true),
            Some(MapVariant::UseDefault) => (default_glyph, true),
            None => (GlyphId::NOTDEF, false),
        }
    }
}
