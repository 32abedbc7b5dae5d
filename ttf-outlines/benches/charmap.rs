use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ttf_outlines::OutlineFont;
use ttf_test_data::fonts::{sample, sample_font};

fn charmap_lookup(c: &mut Criterion) {
    let data = sample_font();
    let font = OutlineFont::new(&data).unwrap();
    let codepoints = (0x20u32..0x80).chain([sample::EMOJI]).collect::<Vec<_>>();

    c.bench_function("map_codepoint (warm cache)", |b| {
        b.iter(|| {
            for codepoint in &codepoints {
                black_box(font.charmap().map_codepoint(*codepoint));
            }
        })
    });
    c.bench_function("map_codepoint (cold cache)", |b| {
        b.iter(|| {
            let charmap = font.charmap().clone();
            for codepoint in &codepoints {
                black_box(charmap.map_codepoint(*codepoint));
            }
        })
    });
    c.bench_function("map with selector", |b| {
        b.iter(|| black_box(font.charmap().map('A' as u32, Some(sample::SELECTOR))))
    });
}

fn load(c: &mut Criterion) {
    let data = sample_font();
    c.bench_function("OutlineFont::new", |b| {
        b.iter(|| OutlineFont::new(black_box(&data)).unwrap())
    });
}

criterion_group!(benches, charmap_lookup, load);
criterion_main!(benches);
