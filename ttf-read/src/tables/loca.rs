//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use std::ops::Range;

use crate::{
    read::{FontRead, FontReadWithArgs, ReadArgs, ReadError},
    table_provider::TopLevelTable,
    FontData,
};
use types::{BigEndian, FixedSize, GlyphId, Tag};

use super::glyf::{Glyf, Glyph};

/// 'loca'
pub const TAG: Tag = Tag::new(b"loca");

/// The [loca] table.
///
/// Holds one offset per glyph plus a trailing sentinel, so that the data
/// for glyph `i` lives at `loca[i]..loca[i + 1]` in the `glyf` table.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug)]
pub enum Loca<'a> {
    /// Offsets divided by two, selected by `head.indexToLocFormat == 0`.
    Short(&'a [BigEndian<u16>]),
    Long(&'a [BigEndian<u32>]),
}

impl TopLevelTable for Loca<'_> {
    const TAG: Tag = TAG;
}

impl<'a> Loca<'a> {
    pub fn read(data: FontData<'a>, is_long: bool) -> Result<Self, ReadError> {
        Self::read_with_args(data, &is_long)
    }

    /// The number of glyphs addressable by this table.
    pub fn len(&self) -> usize {
        match self {
            Loca::Short(data) => data.len().saturating_sub(1),
            Loca::Long(data) => data.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt to return the byte offset stored at the given index.
    pub fn get_raw(&self, idx: usize) -> Option<u32> {
        match self {
            Loca::Short(data) => data.get(idx).map(|x| x.get() as u32 * 2),
            Loca::Long(data) => data.get(idx).map(|x| x.get()),
        }
    }

    /// All stored offsets, including the sentinel, as byte offsets.
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len() + 1).filter_map(|idx| self.get_raw(idx))
    }

    /// The byte range of the given glyph's data in the `glyf` table.
    pub fn glyph_range(&self, gid: GlyphId) -> Result<Range<usize>, ReadError> {
        let idx = gid.to_usize();
        let start = self.get_raw(idx).ok_or(ReadError::TruncatedData)?;
        let end = self.get_raw(idx + 1).ok_or(ReadError::TruncatedData)?;
        if end < start {
            return Err(ReadError::MalformedData("loca offsets are not ascending"));
        }
        Ok(start as usize..end as usize)
    }

    /// Returns the glyph with the given identifier, or `None` if its data
    /// is empty.
    pub fn get_glyf(&self, gid: GlyphId, glyf: &Glyf<'a>) -> Result<Option<Glyph<'a>>, ReadError> {
        let range = self.glyph_range(gid)?;
        if range.is_empty() {
            return Ok(None);
        }
        glyf.glyph_data(range).and_then(Glyph::read).map(Some)
    }
}

impl ReadArgs for Loca<'_> {
    type Args = bool;
}

impl<'a> FontReadWithArgs<'a> for Loca<'a> {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        let is_long = *args;
        // trailing padding that does not make up a whole entry is ignored
        if is_long {
            let len = data.len() - data.len() % u32::RAW_BYTE_LEN;
            data.read_array(0..len).map(Loca::Long)
        } else {
            let len = data.len() - data.len() % u16::RAW_BYTE_LEN;
            data.read_array(0..len).map(Loca::Short)
        }
    }
}

#[cfg(test)]
mod tests {
    use ttf_test_data::{
        be_buffer,
        glyf::{GlyfLocaBuilder, SimpleGlyphBuilder},
    };

    use super::*;

    #[test]
    fn short_offsets_are_doubled() {
        let buf = be_buffer! { [0u16, 5, 5, 12] };
        let loca = Loca::read(FontData::new(&buf), false).unwrap();
        assert_eq!(loca.len(), 3);
        assert_eq!(loca.offsets().collect::<Vec<_>>(), [0, 10, 10, 24]);
        assert_eq!(loca.glyph_range(GlyphId::new(0)), Ok(0..10));
        assert_eq!(loca.glyph_range(GlyphId::new(1)), Ok(10..10));
        assert_eq!(loca.glyph_range(GlyphId::new(2)), Ok(10..24));
        assert_eq!(
            loca.glyph_range(GlyphId::new(3)),
            Err(ReadError::TruncatedData)
        );
    }

    #[test]
    fn long_offsets() {
        let buf = be_buffer! { [0u32, 0x12345, 0x20000] };
        let loca = Loca::read(FontData::new(&buf), true).unwrap();
        assert_eq!(loca.len(), 2);
        assert_eq!(loca.glyph_range(GlyphId::new(1)), Ok(0x12345..0x20000));
    }

    #[test]
    fn descending_offsets() {
        let buf = be_buffer! { [0u32, 20, 10] };
        let loca = Loca::read(FontData::new(&buf), true).unwrap();
        assert!(matches!(
            loca.glyph_range(GlyphId::new(1)),
            Err(ReadError::MalformedData(_))
        ));
    }

    #[test]
    fn odd_padding_ignored() {
        let buf = be_buffer! { [0u16, 4], 0u8 };
        let loca = Loca::read(FontData::new(&buf), false).unwrap();
        assert_eq!(loca.len(), 1);
    }

    #[test]
    fn get_glyf_reads_located_glyphs() {
        let simple = SimpleGlyphBuilder::new()
            .contour(&[(0, 0, true), (10, 20, true), (20, 0, true)])
            .build();
        let (glyf_data, loca_data) = GlyfLocaBuilder::new()
            .add_glyph(&simple)
            .add_glyph([0u8; 0])
            .build(false);
        let glyf = Glyf::read(FontData::new(&glyf_data)).unwrap();
        let loca = Loca::read(FontData::new(&loca_data), false).unwrap();
        assert_eq!(loca.len(), 2);
        let Some(Glyph::Simple(glyph)) = loca.get_glyf(GlyphId::new(0), &glyf).unwrap() else {
            panic!("expected a simple glyph");
        };
        assert_eq!(glyph.num_points(), 3);
        assert!(loca.get_glyf(GlyphId::new(1), &glyf).unwrap().is_none());
        assert_eq!(
            loca.get_glyf(GlyphId::new(2), &glyf).err(),
            Some(ReadError::TruncatedData)
        );
    }

    #[test]
    fn get_glyf_range_past_glyf_table() {
        let buf = be_buffer! { [0u16, 8] };
        let loca = Loca::read(FontData::new(&buf), false).unwrap();
        let glyf = Glyf::read(FontData::new(&[0u8; 4])).unwrap();
        assert_eq!(
            loca.get_glyf(GlyphId::new(0), &glyf).err(),
            Some(ReadError::TruncatedData)
        );
    }
}
