//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use types::{Fixed, LongDateTime, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// 'head'
pub const TAG: Tag = Tag::new(b"head");

/// The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head)
/// (font header) table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Head {
    pub major_version: u16,
    pub minor_version: u16,
    /// Set by font manufacturer.
    pub font_revision: Fixed,
    /// To compute: set it to 0, sum the entire font as uint32, then
    /// store 0xB1B0AFBA - sum.
    pub checksum_adjustment: u32,
    /// Always `0x5F0F3CF5`; any other value is rejected when reading.
    pub magic_number: u32,
    pub flags: u16,
    /// Set to a value from 16 to 16384.
    pub units_per_em: u16,
    pub created: LongDateTime,
    pub modified: LongDateTime,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,
    /// Deprecated (Set to 2).
    pub font_direction_hint: i16,
    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub index_to_loc_format: i16,
    /// 0 for current format.
    pub glyph_data_format: i16,
}

impl Head {
    /// The required value of the `magic_number` field.
    pub const MAGIC: u32 = 0x5F0F3CF5;

    /// `true` if `loca` stores 32-bit offsets.
    pub fn has_long_loca_offsets(&self) -> bool {
        self.index_to_loc_format != 0
    }
}

impl TopLevelTable for Head {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Head {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version = cursor.read()?;
        let minor_version = cursor.read()?;
        let font_revision = cursor.read()?;
        let checksum_adjustment = cursor.read()?;
        let magic_number = cursor.read()?;
        if magic_number != Self::MAGIC {
            return Err(ReadError::BadMagic(magic_number));
        }
        Ok(Head {
            major_version,
            minor_version,
            font_revision,
            checksum_adjustment,
            magic_number,
            flags: cursor.read()?,
            units_per_em: cursor.read()?,
            created: cursor.read()?,
            modified: cursor.read()?,
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
            mac_style: cursor.read()?,
            lowest_rec_ppem: cursor.read()?,
            font_direction_hint: cursor.read()?,
            index_to_loc_format: cursor.read()?,
            glyph_data_format: cursor.read()?,
        })
    }
}
