//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use std::ops::Range;

use types::{BigEndian, BoundingBox, F2Dot14, GlyphId, Tag};

use crate::{font_data::Cursor, FontData, FontRead, ReadError, TopLevelTable};

/// 'glyf'
pub const TAG: Tag = Tag::new(b"glyf");

/// Size of the header shared by simple and composite glyphs.
pub const GLYPH_HEADER_LEN: usize = 10;

// flag sets stored as a single big-endian integer
macro_rules! flags_type {
    (
        $(#[$attr:meta])*
        $name:ident($ty:ty) {
            $( $(#[$flag_attr:meta])* const $flag:ident = $value:literal; )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name($ty);

        impl $name {
            $( $(#[$flag_attr])* pub const $flag: Self = Self($value); )*

            /// Returns an empty set of flags.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Returns the raw value of the flags currently stored.
            pub const fn bits(&self) -> $ty {
                self.0
            }

            /// Convert from underlying bit representation, dropping any bits
            /// that do not correspond to flags.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self(bits & (0 $(| $value)*))
            }

            /// Returns `true` if all of the flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let names: &[&str] = &[
                    $( if self.contains(Self::$flag) && Self::$flag.0 != 0 { stringify!($flag) } else { "" }, )*
                ];
                let set = names.iter().filter(|name| !name.is_empty());
                write!(f, "{}(", stringify!($name))?;
                for (i, name) in set.enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    f.write_str(name)?;
                }
                f.write_str(")")
            }
        }

        impl types::Scalar for $name {
            type Raw = <$ty as types::Scalar>::Raw;

            fn to_raw(self) -> Self::Raw {
                types::Scalar::to_raw(self.0)
            }

            fn from_raw(raw: Self::Raw) -> Self {
                Self::from_bits_truncate(<$ty as types::Scalar>::from_raw(raw))
            }
        }
    };
}

flags_type! {
    /// Flags used in [SimpleGlyph]
    SimpleGlyphFlags(u8) {
        /// Bit 0: If set, the point is on the curve; otherwise, it is off
        /// the curve.
        const ON_CURVE_POINT = 0x01;
        /// Bit 1: If set, the corresponding x-coordinate is 1 byte long,
        /// and the sign is determined by the
        /// X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR flag. If not set, its
        /// interpretation depends on the
        /// X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR flag: If that other flag
        /// is set, the x-coordinate is the same as the previous
        /// x-coordinate, and no element is added to the xCoordinates
        /// array. If both flags are not set, the corresponding element in
        /// the xCoordinates array is two bytes and interpreted as a signed
        /// integer.
        const X_SHORT_VECTOR = 0x02;
        /// Bit 2: Same as X_SHORT_VECTOR, for the y-coordinate.
        const Y_SHORT_VECTOR = 0x04;
        /// Bit 3: If set, the next byte (read as unsigned) specifies the
        /// number of additional times this flag byte is to be repeated in
        /// the logical flags array.
        const REPEAT_FLAG = 0x08;
        /// Bit 4: Sign of a short x delta, or "same as previous" for a long one.
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        /// Bit 5: Same as bit 4, for the y-coordinate.
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        /// Bit 6: If set, contours in the glyph description may overlap.
        const OVERLAP_SIMPLE = 0x40;
    }
}

flags_type! {
    /// Flags used in [CompositeGlyph]
    CompositeGlyphFlags(u16) {
        /// Bit 0: If this is set, the arguments are 16-bit (uint16 or
        /// int16); otherwise, they are bytes (uint8 or int8).
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// Bit 1: If this is set, the arguments are signed xy values;
        /// otherwise, they are unsigned point numbers.
        const ARGS_ARE_XY_VALUES = 0x0002;
        /// Bit 2: If set and ARGS_ARE_XY_VALUES is also set, the xy
        /// values are rounded to the nearest grid line. Ignored if
        /// ARGS_ARE_XY_VALUES is not set.
        const ROUND_XY_TO_GRID = 0x0004;
        /// Bit 3: This indicates that there is a simple scale for the
        /// component. Otherwise, scale = 1.0.
        const WE_HAVE_A_SCALE = 0x0008;
        /// Bit 5: Indicates at least one more glyph after this one.
        const MORE_COMPONENTS = 0x0020;
        /// Bit 6: The x direction will use a different scale from the y
        /// direction.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// Bit 7: There is a 2 by 2 transformation that will be used to
        /// scale the component.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Bit 8: Following the last component are instructions for the
        /// composite character.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        /// Bit 9: If set, this forces the aw and lsb (and rsb) for the
        /// composite to be equal to those from this component glyph.
        const USE_MY_METRICS = 0x0200;
        /// Bit 10: If set, the components of the compound glyph overlap.
        const OVERLAP_COMPOUND = 0x0400;
        /// Bit 11: The composite is designed to have the component offset
        /// scaled.
        const SCALED_COMPONENT_OFFSET = 0x0800;
        /// Bit 12: The composite is designed not to have the component
        /// offset scaled.
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

/// The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table
#[derive(Clone, Copy, Debug)]
pub struct Glyf<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Glyf<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Glyf<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Glyf { data })
    }
}

impl<'a> Glyf<'a> {
    /// The raw table data.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// The data for a single glyph, as located by `loca`.
    pub fn glyph_data(&self, range: Range<usize>) -> Result<FontData<'a>, ReadError> {
        self.data.slice(range).ok_or(ReadError::TruncatedData)
    }
}

/// The header common to both simple and composite glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphHeader {
    /// If the number of contours is greater than zero, this is a single
    /// glyph; otherwise it is a composite.
    pub number_of_contours: i16,
    /// Declared bounds of the glyph's control points.
    pub bbox: BoundingBox<i16>,
}

impl GlyphHeader {
    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        Ok(GlyphHeader {
            number_of_contours: cursor.read()?,
            bbox: BoundingBox {
                x_min: cursor.read()?,
                y_min: cursor.read()?,
                x_max: cursor.read()?,
                y_max: cursor.read()?,
            },
        })
    }
}

/// Either a simple or a composite glyph.
#[derive(Clone, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

impl<'a> FontRead<'a> for Glyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let number_of_contours: i16 = data.read_at(0)?;
        if number_of_contours > 0 {
            SimpleGlyph::read(data).map(Self::Simple)
        } else {
            CompositeGlyph::read(data).map(Self::Composite)
        }
    }
}

impl Glyph<'_> {
    pub fn header(&self) -> &GlyphHeader {
        match self {
            Self::Simple(glyph) => &glyph.header,
            Self::Composite(glyph) => &glyph.header,
        }
    }
}

/// A glyph defined directly by its contours.
#[derive(Clone, Debug)]
pub struct SimpleGlyph<'a> {
    header: GlyphHeader,
    end_pts_of_contours: &'a [BigEndian<u16>],
    instructions: &'a [u8],
    /// flags, then x coordinates, then y coordinates
    glyph_data: &'a [u8],
}

impl<'a> FontRead<'a> for SimpleGlyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let header = GlyphHeader::read(&mut cursor)?;
        let n_contours = header.number_of_contours.max(0) as usize;
        let end_pts_of_contours = cursor.read_array(n_contours)?;
        let instruction_length: u16 = cursor.read()?;
        let instructions = cursor.read_bytes(instruction_length as usize)?;
        let glyph_data = cursor
            .remaining()
            .map(|data| data.as_bytes())
            .unwrap_or_default();
        Ok(SimpleGlyph {
            header,
            end_pts_of_contours,
            instructions,
            glyph_data,
        })
    }
}

/// A point in a simple glyph, in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurvePoint {
    /// X coordinate.
    pub x: i16,
    /// Y coordinate.
    pub y: i16,
    /// True if this is an on-curve point.
    pub on_curve: bool,
}

impl CurvePoint {
    /// Construct a new `CurvePoint`
    pub fn new(x: i16, y: i16, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }
}

impl<'a> SimpleGlyph<'a> {
    pub fn header(&self) -> &GlyphHeader {
        &self.header
    }

    /// Index of the last point of each contour.
    pub fn end_pts_of_contours(&self) -> &'a [BigEndian<u16>] {
        self.end_pts_of_contours
    }

    /// Returns the TrueType interpreter instructions.
    pub fn instructions(&self) -> &'a [u8] {
        self.instructions
    }

    /// Returns the total number of points, one past the last contour end.
    pub fn num_points(&self) -> usize {
        self.end_pts_of_contours
            .last()
            .map(|last| last.get() as usize + 1)
            .unwrap_or(0)
    }

    /// Returns true if the contours in the simple glyph may overlap.
    pub fn has_overlapping_contours(&self) -> bool {
        FontData::new(self.glyph_data)
            .read_at::<SimpleGlyphFlags>(0)
            .map(|flag| flag.contains(SimpleGlyphFlags::OVERLAP_SIMPLE))
            .unwrap_or_default()
    }

    /// Decodes the flag and coordinate streams into points.
    ///
    /// Flags are run-length encoded; coordinates are stored as deltas from
    /// the previous point, all x values first and then all y values.
    pub fn read_points(&self) -> Result<Vec<CurvePoint>, ReadError> {
        let n_points = self.num_points();
        let mut cursor = FontData::new(self.glyph_data).cursor();
        let mut flags = Vec::with_capacity(n_points);
        while flags.len() < n_points {
            let flag: SimpleGlyphFlags = cursor.read()?;
            flags.push(flag);
            if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                let count = cursor.read::<u8>()? as usize;
                // repeats past the last point are ignored
                let count = count.min(n_points - flags.len());
                flags.extend(std::iter::repeat(flag).take(count));
            }
        }
        let mut points = Vec::with_capacity(n_points);
        let mut x = 0i16;
        for flag in &flags {
            x = x.wrapping_add(read_delta(
                &mut cursor,
                *flag,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            )?);
            points.push(CurvePoint::new(
                x,
                0,
                flag.contains(SimpleGlyphFlags::ON_CURVE_POINT),
            ));
        }
        let mut y = 0i16;
        for (point, flag) in points.iter_mut().zip(&flags) {
            y = y.wrapping_add(read_delta(
                &mut cursor,
                *flag,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            )?);
            point.y = y;
        }
        Ok(points)
    }
}

fn read_delta(
    cursor: &mut Cursor,
    flag: SimpleGlyphFlags,
    short_bit: SimpleGlyphFlags,
    same_or_positive_bit: SimpleGlyphFlags,
) -> Result<i16, ReadError> {
    let same_or_positive = flag.contains(same_or_positive_bit);
    if flag.contains(short_bit) {
        let delta = cursor.read::<u8>()? as i16;
        Ok(if same_or_positive { delta } else { -delta })
    } else if same_or_positive {
        Ok(0)
    } else {
        cursor.read::<i16>()
    }
}

/// A glyph consisting of transformed references to other glyphs.
#[derive(Clone, Debug)]
pub struct CompositeGlyph<'a> {
    header: GlyphHeader,
    component_data: &'a [u8],
}

impl<'a> FontRead<'a> for CompositeGlyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let header = GlyphHeader::read(&mut cursor)?;
        let component_data = cursor
            .remaining()
            .map(|data| data.as_bytes())
            .unwrap_or_default();
        Ok(CompositeGlyph {
            header,
            component_data,
        })
    }
}

/// Transform for a composite component.
///
/// Points are mapped as `x' = xx * x + xy * y`, `y' = yx * x + yy * y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

impl Transform {
    /// Returns `true` if this transform leaves points unchanged.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// A reference to another glyph. Part of [CompositeGlyph].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// Component flags.
    pub flags: CompositeGlyphFlags,
    /// Glyph identifier.
    pub glyph: GlyphId,
    /// Anchor for component placement.
    pub anchor: Anchor,
    /// Component transformation matrix.
    pub transform: Transform,
}

/// Anchor position for a composite component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The component is moved by this offset.
    Offset { x: i16, y: i16 },
    /// A point in the composite is aligned with a point in the component.
    Point { base: u16, component: u16 },
}

impl<'a> CompositeGlyph<'a> {
    pub fn header(&self) -> &GlyphHeader {
        &self.header
    }

    /// Returns an iterator over the components of the composite glyph.
    ///
    /// The iterator stops after the first error.
    pub fn components(&self) -> ComponentIter<'a> {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::empty(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
    }

    /// Returns the TrueType interpreter instructions that follow the last
    /// component, if the last component's flags announce them.
    pub fn instructions(&self) -> Result<Option<&'a [u8]>, ReadError> {
        let mut iter = self.components();
        for component in iter.by_ref() {
            component?;
        }
        if !iter
            .cur_flags
            .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
        {
            return Ok(None);
        }
        let len: u16 = iter.cursor.read()?;
        iter.cursor.read_bytes(len as usize).map(Some)
    }
}

/// Iterator that decodes the components of a [CompositeGlyph].
#[derive(Clone)]
pub struct ComponentIter<'a> {
    cur_flags: CompositeGlyphFlags,
    done: bool,
    cursor: Cursor<'a>,
}

impl ComponentIter<'_> {
    fn read_component(&mut self) -> Result<Component, ReadError> {
        let flags: CompositeGlyphFlags = self.cursor.read()?;
        self.cur_flags = flags;
        let glyph = self.cursor.read::<GlyphId>()?;
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let anchor = match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: self.cursor.read()?,
                y: self.cursor.read()?,
            },
            (true, false) => Anchor::Offset {
                x: self.cursor.read::<i8>()? as _,
                y: self.cursor.read::<i8>()? as _,
            },
            (false, true) => Anchor::Point {
                base: self.cursor.read()?,
                component: self.cursor.read()?,
            },
            (false, false) => Anchor::Point {
                base: self.cursor.read::<u8>()? as _,
                component: self.cursor.read::<u8>()? as _,
            },
        };
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.cursor.read()?;
            transform.yx = self.cursor.read()?;
            transform.xy = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        }
        Ok(Component {
            flags,
            glyph,
            anchor,
            transform,
        })
    }
}

impl Iterator for ComponentIter<'_> {
    type Item = Result<Component, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let component = self.read_component();
        self.done = match &component {
            Ok(component) => !component
                .flags
                .contains(CompositeGlyphFlags::MORE_COMPONENTS),
            Err(_) => true,
        };
        Some(component)
    }
}
