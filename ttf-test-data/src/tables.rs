//! Minimal `head` and `maxp` tables.

use ttf_types::{Fixed, LongDateTime};

use crate::be_buffer;

/// The `head` magic number.
pub const HEAD_MAGIC: u32 = 0x5F0F3CF5;

/// A version 1.0 `head` table with an empty bounding box.
///
/// `index_to_loc_format` is 0 for short `loca` offsets and 1 for long.
pub fn head_bytes(units_per_em: u16, index_to_loc_format: i16) -> Vec<u8> {
    be_buffer! {
        1u16, 0u16,
        (Fixed::from_f64(1.5)),
        0u32,
        HEAD_MAGIC,
        // flags
        0x000bu16,
        units_per_em,
        (LongDateTime::new(3_600_000_000)),
        (LongDateTime::new(3_600_086_400)),
        // xMin, yMin, xMax, yMax
        0i16, 0i16, 0i16, 0i16,
        // macStyle, lowestRecPPEM, fontDirectionHint
        0u16, 8u16, 2i16,
        index_to_loc_format,
        0i16
    }
    .into_vec()
}

/// A version 1.0 `maxp` table with all limits set to zero.
pub fn maxp_bytes(num_glyphs: u16) -> Vec<u8> {
    be_buffer! {
        0x00010000u32,
        num_glyphs,
        [0u16; 13]
    }
    .into_vec()
}

/// A version 0.5 `maxp` table, as used by CFF fonts.
pub fn maxp_v05_bytes(num_glyphs: u16) -> Vec<u8> {
    be_buffer! { 0x00005000u32, num_glyphs }.into_vec()
}
