//! Encoders for glyph data and the `glyf`/`loca` pair.

use ttf_types::{F2Dot14, GlyphId};

use crate::BeBuffer;

// simple glyph flags
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR: u8 = 0x20;

// composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;

/// Builds a simple glyph from absolute coordinates.
///
/// The bounding box is computed from the points. Coordinates are delta
/// encoded with 16-bit wrapping arithmetic, the way a reader decodes them.
#[derive(Clone, Debug, Default)]
pub struct SimpleGlyphBuilder {
    contours: Vec<Vec<(i16, i16, bool)>>,
    instructions: Vec<u8>,
}

impl SimpleGlyphBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a contour of `(x, y, on_curve)` points.
    pub fn contour(mut self, points: &[(i16, i16, bool)]) -> Self {
        self.contours.push(points.to_vec());
        self
    }

    pub fn instructions(mut self, instructions: &[u8]) -> Self {
        self.instructions = instructions.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let points = self.contours.iter().flatten().copied().collect::<Vec<_>>();
        let (x_min, y_min, x_max, y_max) = points.iter().fold(
            (i16::MAX, i16::MAX, i16::MIN, i16::MIN),
            |(x_min, y_min, x_max, y_max), (x, y, _)| {
                (x_min.min(*x), y_min.min(*y), x_max.max(*x), y_max.max(*y))
            },
        );
        let (x_min, y_min, x_max, y_max) = if points.is_empty() {
            (0, 0, 0, 0)
        } else {
            (x_min, y_min, x_max, y_max)
        };

        let mut buf = BeBuffer::new();
        buf.push(self.contours.len() as i16)
            .push(x_min)
            .push(y_min)
            .push(x_max)
            .push(y_max);
        let mut end_point = -1i32;
        for contour in &self.contours {
            end_point += contour.len() as i32;
            buf.push(end_point as u16);
        }
        buf.push(self.instructions.len() as u16)
            .extend_bytes(&self.instructions);

        let mut flags = Vec::with_capacity(points.len());
        let mut x_data = BeBuffer::new();
        let mut y_data = BeBuffer::new();
        let (mut last_x, mut last_y) = (0i16, 0i16);
        for (x, y, on_curve) in points {
            let mut flag = if on_curve { ON_CURVE_POINT } else { 0 };
            flag |= encode_delta(
                x.wrapping_sub(last_x),
                X_SHORT_VECTOR,
                X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
                &mut x_data,
            );
            flag |= encode_delta(
                y.wrapping_sub(last_y),
                Y_SHORT_VECTOR,
                Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
                &mut y_data,
            );
            flags.push(flag);
            (last_x, last_y) = (x, y);
        }
        buf.extend_bytes(&flags)
            .extend_bytes(&x_data)
            .extend_bytes(&y_data);
        buf.into_vec()
    }
}

/// Write a single coordinate delta, returning the flag bits that describe
/// its encoding.
fn encode_delta(delta: i16, short_flag: u8, same_or_positive_flag: u8, out: &mut BeBuffer) -> u8 {
    match delta {
        0 => same_or_positive_flag,
        1..=255 => {
            out.push(delta as u8);
            short_flag | same_or_positive_flag
        }
        -255..=-1 => {
            out.push(delta.unsigned_abs() as u8);
            short_flag
        }
        _ => {
            out.push(delta);
            0
        }
    }
}

/// Builds a composite glyph.
///
/// Offsets are written as bytes when both fit in an `i8`, otherwise as
/// words. The header always has an empty bounding box.
#[derive(Clone, Debug, Default)]
pub struct CompositeGlyphBuilder {
    components: Vec<(GlyphId, i16, i16, Vec<F2Dot14>)>,
    instructions: Option<Vec<u8>>,
}

impl CompositeGlyphBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// A component placed at `(dx, dy)` with no transform.
    pub fn offset(mut self, glyph: GlyphId, dx: i16, dy: i16) -> Self {
        self.components.push((glyph, dx, dy, Vec::new()));
        self
    }

    /// A component with a uniform scale.
    pub fn scaled(mut self, glyph: GlyphId, dx: i16, dy: i16, scale: F2Dot14) -> Self {
        self.components.push((glyph, dx, dy, vec![scale]));
        self
    }

    /// A component with a full transform, given in file order:
    /// `[xx, yx, xy, yy]`.
    pub fn two_by_two(mut self, glyph: GlyphId, dx: i16, dy: i16, matrix: [F2Dot14; 4]) -> Self {
        self.components.push((glyph, dx, dy, matrix.to_vec()));
        self
    }

    /// Instructions, written after the last component.
    pub fn instructions(mut self, instructions: &[u8]) -> Self {
        self.instructions = Some(instructions.to_vec());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = BeBuffer::new();
        buf.push(-1i16).push(0i16).push(0i16).push(0i16).push(0i16);
        for (i, (glyph, dx, dy, transform)) in self.components.iter().enumerate() {
            let is_last = i + 1 == self.components.len();
            let args_are_bytes = i8::try_from(*dx).is_ok() && i8::try_from(*dy).is_ok();
            let mut flags = ARGS_ARE_XY_VALUES;
            if !args_are_bytes {
                flags |= ARG_1_AND_2_ARE_WORDS;
            }
            flags |= match transform.len() {
                1 => WE_HAVE_A_SCALE,
                4 => WE_HAVE_A_TWO_BY_TWO,
                _ => 0,
            };
            if !is_last {
                flags |= MORE_COMPONENTS;
            } else if self.instructions.is_some() {
                flags |= WE_HAVE_INSTRUCTIONS;
            }
            buf.push(flags).push(*glyph);
            if args_are_bytes {
                buf.push(*dx as i8).push(*dy as i8);
            } else {
                buf.push(*dx).push(*dy);
            }
            buf.extend(transform.iter().copied());
        }
        if let Some(instructions) = &self.instructions {
            buf.push(instructions.len() as u16)
                .extend_bytes(instructions);
        }
        buf.into_vec()
    }
}

/// Assembles glyph data into `glyf` and `loca` tables.
#[derive(Clone, Debug, Default)]
pub struct GlyfLocaBuilder {
    glyphs: Vec<Vec<u8>>,
}

impl GlyfLocaBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add the next glyph. Empty data produces a glyph with no outline.
    pub fn add_glyph(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.glyphs.push(data.as_ref().to_vec());
        self
    }

    pub fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    /// Returns the `glyf` and `loca` tables.
    ///
    /// Each glyph is padded to an even length so that short offsets can be
    /// used; `long_offsets` selects the `loca` format.
    pub fn build(&self, long_offsets: bool) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = BeBuffer::new();
        let mut offsets = vec![0u32];
        for glyph in &self.glyphs {
            glyf.extend_bytes(glyph).align_to(2);
            offsets.push(glyf.len() as u32);
        }
        let mut loca = BeBuffer::new();
        if long_offsets {
            loca.extend(offsets);
        } else {
            loca.extend(offsets.into_iter().map(|offset| (offset / 2) as u16));
        }
        (glyf.into_vec(), loca.into_vec())
    }
}
