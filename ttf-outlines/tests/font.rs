//! Loading complete fonts through the facade.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use ttf_outlines::{
    raw::{types::BoundingBox, ReadError},
    GlyphId, GlyphMapping, LoadError, OutlineFont, OutlinePoint, Tag,
};
use ttf_test_data::{
    cmap::{format6, CmapBuilder},
    fonts::{assemble_font, sample, sample_font},
    glyf::{CompositeGlyphBuilder, SimpleGlyphBuilder},
    tables::{head_bytes, maxp_bytes},
    FontBuilder,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The tables of a font in directory order.
fn font_tables(data: &[u8]) -> Vec<(Tag, Vec<u8>)> {
    let font = ttf_outlines::raw::FontRef::new(data).unwrap();
    font.table_records()
        .iter()
        .map(|record| {
            let bytes = font.table_data(record.tag()).unwrap().as_bytes().to_vec();
            (record.tag(), bytes)
        })
        .collect()
}

fn rebuild(tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    for (tag, data) in tables {
        builder.add_raw(*tag, data);
    }
    builder.build()
}

#[test]
fn sample_font_outlines() {
    init_logging();
    let font = OutlineFont::new(&sample_font()).unwrap();
    assert_eq!(font.glyph_count(), sample::NUM_GLYPHS as usize);
    assert_eq!(font.head().units_per_em, 1000);
    assert_eq!(font.maxp().num_glyphs, sample::NUM_GLYPHS);

    let triangle = font.outline(sample::TRIANGLE).unwrap();
    assert_eq!(triangle.contour_ends, [2]);
    assert_eq!(triangle.instructions, [0xb0, 0x00]);
    assert_eq!(
        triangle.bounds,
        BoundingBox {
            x_min: 0,
            y_min: 0,
            x_max: 500,
            y_max: 700
        }
    );
    assert!(font.outline(sample::SPACE).unwrap().is_empty());
    assert!(font.outline(GlyphId::new(sample::NUM_GLYPHS)).is_none());

    let pair = font.outline(sample::PAIR).unwrap();
    assert_eq!(pair.contour_ends, [2, 6]);
    assert_eq!(pair.points[3], OutlinePoint::new(700, 100, true));
    assert!(pair.instructions.is_empty());

    let nested = font.outline(sample::NESTED).unwrap();
    assert_eq!(nested.points.len(), 7);
    // (250, 700) halved, then moved by (10, 20)
    assert_eq!(nested.points[1], OutlinePoint::new(135, 370, true));
    assert_eq!(nested.instructions, [0x4b]);
    assert_eq!(
        nested.bounds,
        BoundingBox {
            x_min: 10,
            y_min: 20,
            x_max: 510,
            y_max: 370
        }
    );

    let rotated = font.outline(sample::ROTATED).unwrap();
    assert_eq!(
        rotated.points,
        [
            OutlinePoint::new(-100, 100, true),
            OutlinePoint::new(-100, 400, true),
            OutlinePoint::new(-400, 400, true),
            OutlinePoint::new(-400, 100, true),
        ]
    );
}

#[test]
fn every_outline_ends_on_its_last_point() {
    let font = OutlineFont::new(&sample_font()).unwrap();
    for (gid, outline) in font.outlines().iter().enumerate() {
        assert_eq!(outline.glyph_id, GlyphId::new(gid as u16));
        if !outline.is_empty() {
            assert_eq!(
                outline.contour_ends.last().map(|end| *end as usize),
                Some(outline.points.len() - 1)
            );
        }
    }
}

#[test]
fn sample_font_mapping() {
    let font = OutlineFont::new(&sample_font()).unwrap();
    let charmap = font.charmap();
    assert_eq!(charmap.map_codepoint(' ' as u32), sample::SPACE);
    assert_eq!(charmap.map_codepoint('A' as u32), sample::TRIANGLE);
    assert_eq!(charmap.map_codepoint('E' as u32), sample::ROTATED);
    assert_eq!(charmap.map_codepoint('F' as u32), GlyphId::NOTDEF);
    // only the format 12 subtable has it; it fills in the glyph 0 answer of
    // the subtables before it
    assert_eq!(charmap.map_codepoint(sample::EMOJI), sample::VARIANT);
    assert_eq!(
        charmap.map('A' as u32, Some(sample::SELECTOR)),
        GlyphMapping {
            glyph_id: sample::VARIANT,
            skip_next: true
        }
    );
    assert_eq!(
        charmap.map('B' as u32, Some(sample::SELECTOR)),
        GlyphMapping {
            glyph_id: sample::SQUARE,
            skip_next: true
        }
    );
    assert_eq!(
        charmap.map('A' as u32, Some('B' as u32)),
        GlyphMapping {
            glyph_id: sample::TRIANGLE,
            skip_next: false
        }
    );
    let (outline, skip) = font.outline_for_char('C' as u32, None);
    assert_eq!(outline.map(|outline| outline.glyph_id), Some(sample::PAIR));
    assert!(!skip);
    let (outline, skip) = font.outline_for_char('A' as u32, Some(sample::SELECTOR));
    assert_eq!(outline.map(|outline| outline.glyph_id), Some(sample::VARIANT));
    assert!(skip);
}

#[test]
fn sample_font_coverage() {
    let font = OutlineFont::new(&sample_font()).unwrap();
    let codepoints = font.charmap().codepoints();
    assert_eq!(
        codepoints.into_iter().collect::<Vec<_>>(),
        [0x20, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0xffff, sample::EMOJI]
    );
}

#[test]
fn directory_order_does_not_matter() {
    let data = sample_font();
    let expected = OutlineFont::new(&data).unwrap();
    let tables = font_tables(&data);
    // every rotation, and the reverse of each
    for shift in 0..tables.len() {
        let mut reordered = tables.clone();
        reordered.rotate_left(shift);
        for order in [reordered.clone(), reordered.into_iter().rev().collect()] {
            let font = OutlineFont::new(&rebuild(&order)).unwrap();
            assert_eq!(font.outlines(), expected.outlines());
            assert_eq!(font.head(), expected.head());
            for codepoint in [0x20, 0x41, 0x45, 0x46, sample::EMOJI] {
                assert_eq!(
                    font.charmap().map(codepoint, Some(sample::SELECTOR)),
                    expected.charmap().map(codepoint, Some(sample::SELECTOR))
                );
            }
        }
    }
}

#[test]
fn each_required_table_is_required() {
    let tables = font_tables(&sample_font());
    for tag in ["head", "maxp", "loca", "glyf", "cmap"] {
        let tag = Tag::new_checked(tag.as_bytes()).unwrap();
        let remaining = tables
            .iter()
            .filter(|(t, _)| *t != tag)
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(
            OutlineFont::new(&rebuild(&remaining)).err(),
            Some(LoadError::Read(ReadError::MissingRequiredTable(tag)))
        );
    }
}

#[test]
fn extra_tables_are_ignored() {
    let mut tables = font_tables(&sample_font());
    tables.insert(2, (Tag::new(b"post"), vec![0, 3, 0, 0]));
    tables.push((Tag::new(b"fpgm"), vec![0xb0, 0x01]));
    let font = OutlineFont::new(&rebuild(&tables)).unwrap();
    assert_eq!(font.glyph_count(), sample::NUM_GLYPHS as usize);
}

#[test]
fn bad_head_magic() {
    let mut tables = font_tables(&sample_font());
    let head = &mut tables.iter_mut().find(|(tag, _)| tag == b"head").unwrap().1;
    head[12..16].copy_from_slice(&[0x5f, 0x0f, 0x3c, 0xf6]);
    assert_eq!(
        OutlineFont::new(&rebuild(&tables)).err(),
        Some(LoadError::Read(ReadError::BadMagic(0x5f0f3cf6)))
    );
}

#[test]
fn truncated_tables_fail() {
    let tables = font_tables(&sample_font());
    for tag in [b"head", b"loca", b"glyf"] {
        let mut truncated = tables.clone();
        let data = &mut truncated.iter_mut().find(|(t, _)| t == tag).unwrap().1;
        data.truncate(data.len() - 3);
        assert_eq!(
            OutlineFont::new(&rebuild(&truncated)).err(),
            Some(LoadError::Read(ReadError::TruncatedData)),
            "{}",
            Tag::new(tag)
        );
    }
    assert_eq!(
        OutlineFont::new(&sample_font()[..100]).err(),
        Some(LoadError::Read(ReadError::TruncatedData))
    );
}

#[test]
fn long_loca_offsets() {
    let glyphs = vec![
        Vec::new(),
        SimpleGlyphBuilder::new()
            .contour(&[(0, 0, true), (10, 10, false), (20, 0, true)])
            .build(),
    ];
    let cmap = CmapBuilder::new().subtable(3, 1, &format6(0x61, &[1])).build();
    let short = OutlineFont::new(&assemble_font(&glyphs, &cmap, false)).unwrap();
    let long = OutlineFont::new(&assemble_font(&glyphs, &cmap, true)).unwrap();
    assert!(long.head().has_long_loca_offsets());
    assert_eq!(short.outlines(), long.outlines());
    assert_eq!(long.charmap().map_codepoint(0x61), GlyphId::new(1));
}

#[test]
fn composite_cycle_fails_to_load() {
    let glyphs = vec![
        CompositeGlyphBuilder::new()
            .offset(GlyphId::new(1), 0, 0)
            .build(),
        CompositeGlyphBuilder::new()
            .offset(GlyphId::new(0), 0, 0)
            .build(),
    ];
    let cmap = CmapBuilder::new().build();
    assert!(matches!(
        OutlineFont::new(&assemble_font(&glyphs, &cmap, false)),
        Err(LoadError::CycleDetected(_))
    ));
}

#[test]
fn glyph_count_comes_from_maxp() {
    // loca has room for three glyphs, maxp declares two
    let glyphs = vec![Vec::new(), Vec::new(), Vec::new()];
    let data = assemble_font(&glyphs, &CmapBuilder::new().build(), false);
    let mut tables = font_tables(&data);
    tables
        .iter_mut()
        .find(|(tag, _)| tag == b"maxp")
        .unwrap()
        .1 = maxp_bytes(2);
    let font = OutlineFont::new(&rebuild(&tables)).unwrap();
    assert_eq!(font.glyph_count(), 2);
    // and the reverse is truncation
    tables.iter_mut().find(|(tag, _)| tag == b"maxp").unwrap().1 = maxp_bytes(4);
    tables.iter_mut().find(|(tag, _)| tag == b"head").unwrap().1 = head_bytes(2048, 0);
    assert_eq!(
        OutlineFont::new(&rebuild(&tables)).err(),
        Some(LoadError::Read(ReadError::TruncatedData))
    );
}

#[test]
fn shared_between_threads() {
    let font = Arc::new(OutlineFont::new(&sample_font()).unwrap());
    let handles = (0..8)
        .map(|i| {
            let font = Arc::clone(&font);
            std::thread::spawn(move || {
                (0..200u32)
                    .map(|n| {
                        let codepoint = 0x20 + (n * 7 + i) % 0x40;
                        (codepoint, font.charmap().map_codepoint(codepoint))
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();
    let cold = OutlineFont::new(&sample_font()).unwrap();
    for handle in handles {
        for (codepoint, glyph_id) in handle.join().unwrap() {
            assert_eq!(cold.charmap().map_codepoint(codepoint), glyph_id);
        }
    }
    assert!(font.charmap().cached_len() <= 0x40);
}

#[cfg(feature = "serde")]
#[test]
fn outline_serde_round_trip() {
    let font = OutlineFont::new(&sample_font()).unwrap();
    let outline = font.outline(sample::NESTED).unwrap();
    let json = serde_json::to_string(outline).unwrap();
    let back: ttf_outlines::Outline = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, outline);
}
