//! Complete fonts assembled from the builders in this crate.

use ttf_types::{F2Dot14, Tag};

use crate::{
    cmap::{Cmap14Builder, Cmap4Builder, CmapBuilder},
    glyf::{CompositeGlyphBuilder, GlyfLocaBuilder, SimpleGlyphBuilder},
    tables::{head_bytes, maxp_bytes},
    FontBuilder,
};

/// Assemble a font with `head`, `maxp`, `loca`, `glyf` and `cmap` tables.
///
/// Tables are written in that order.
pub fn assemble_font(glyphs: &[Vec<u8>], cmap: &[u8], long_loca: bool) -> Vec<u8> {
    let mut glyf_loca = GlyfLocaBuilder::new();
    for glyph in glyphs {
        glyf_loca.add_glyph(glyph);
    }
    let (glyf, loca) = glyf_loca.build(long_loca);
    let mut builder = FontBuilder::new();
    builder
        .add_raw(Tag::new(b"head"), head_bytes(1000, long_loca as i16))
        .add_raw(Tag::new(b"maxp"), maxp_bytes(glyf_loca.num_glyphs()))
        .add_raw(Tag::new(b"loca"), loca)
        .add_raw(Tag::new(b"glyf"), glyf)
        .add_raw(Tag::new(b"cmap"), cmap);
    builder.build()
}

/// Glyph ids and codepoints of [`sample_font`].
pub mod sample {
    use ttf_types::GlyphId;

    /// A box.
    pub const NOTDEF: GlyphId = GlyphId::new(0);
    /// A triangle with instructions, mapped from `A`.
    pub const TRIANGLE: GlyphId = GlyphId::new(1);
    /// A square, mapped from `B`.
    pub const SQUARE: GlyphId = GlyphId::new(2);
    /// No outline, mapped from space.
    pub const SPACE: GlyphId = GlyphId::new(3);
    /// TRIANGLE, then SQUARE offset by (600, 0); mapped from `C`.
    pub const PAIR: GlyphId = GlyphId::new(4);
    /// PAIR scaled by one half and offset by (10, 20); mapped from `D`.
    pub const NESTED: GlyphId = GlyphId::new(5);
    /// SQUARE rotated a quarter turn; mapped from `E`.
    pub const ROTATED: GlyphId = GlyphId::new(6);
    /// The variant of TRIANGLE selected by `A` U+FE00, and the glyph for
    /// U+1F600.
    pub const VARIANT: GlyphId = GlyphId::new(7);

    pub const NUM_GLYPHS: u16 = 8;
    /// The selector with a variation sequence for `A`.
    pub const SELECTOR: u32 = 0xFE00;
    /// A codepoint outside the BMP, only in the format 12 subtable.
    pub const EMOJI: u32 = 0x1F600;
}

/// A small font exercising simple, empty and composite glyphs, and every
/// kind of character map the reader understands.
///
/// See [`sample`] for its contents. The format 4 subtable covers `F`
/// without mapping it to a glyph.
pub fn sample_font() -> Vec<u8> {
    let half = F2Dot14::from_f32(0.5);
    let glyphs = vec![
        SimpleGlyphBuilder::new()
            .contour(&[(50, 0, true), (450, 0, true), (450, 700, true), (50, 700, true)])
            .build(),
        SimpleGlyphBuilder::new()
            .contour(&[(0, 0, true), (250, 700, true), (500, 0, true)])
            .instructions(&[0xb0, 0x00])
            .build(),
        SimpleGlyphBuilder::new()
            .contour(&[(100, 100, true), (400, 100, true), (400, 400, true), (100, 400, true)])
            .build(),
        Vec::new(),
        CompositeGlyphBuilder::new()
            .offset(sample::TRIANGLE, 0, 0)
            .offset(sample::SQUARE, 600, 0)
            .build(),
        CompositeGlyphBuilder::new()
            .scaled(sample::PAIR, 10, 20, half)
            .instructions(&[0x4b])
            .build(),
        CompositeGlyphBuilder::new()
            .two_by_two(
                sample::SQUARE,
                0,
                0,
                [F2Dot14::ZERO, F2Dot14::ONE, F2Dot14::from_f32(-1.0), F2Dot14::ZERO],
            )
            .build(),
        SimpleGlyphBuilder::new()
            .contour(&[(0, 0, true), (250, 700, false), (500, 0, true)])
            .build(),
    ];
    let format4 = Cmap4Builder::new()
        .delta_segment(0x20, 0x20, 3 - 0x20)
        .array_segment(0x41, &[1, 2, 4, 5, 6, 0])
        .build();
    let format12 = crate::cmap::format12(&[
        (0x20, 0x20, 3),
        (0x41, 0x42, 1),
        (sample::EMOJI, sample::EMOJI, sample::VARIANT.to_u16() as u32),
    ]);
    let format14 = Cmap14Builder::new()
        .variant(sample::SELECTOR, 0x41, sample::VARIANT.to_u16())
        .default_range(sample::SELECTOR, 0x42, 0)
        .build();
    let cmap = CmapBuilder::new()
        .subtable(0, 3, &format4)
        .subtable(0, 5, &format14)
        .subtable(3, 1, &format4)
        .subtable(3, 10, &format12)
        .build();
    assemble_font(&glyphs, &cmap, false)
}
