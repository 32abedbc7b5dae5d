//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use types::Tag;

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// 'maxp'
pub const TAG: Tag = Tag::new(b"maxp");

/// Version 0.5, used by fonts with CFF outlines.
pub const VERSION_0_5: u32 = 0x00005000;
/// Version 1.0, used by fonts with TrueType outlines.
pub const VERSION_1_0: u32 = 0x00010000;

/// The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp)
/// (maximum profile) table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maxp {
    /// The version: 0x00005000 for version 0.5, 0x00010000 for version 1.0.
    pub version: u32,
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
    /// Limits that only exist in version 1.0 tables.
    pub limits: Option<MaxpLimits>,
}

/// The fields of a version 1.0 `maxp` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaxpLimits {
    /// Maximum points in a non-composite glyph.
    pub max_points: u16,
    /// Maximum contours in a non-composite glyph.
    pub max_contours: u16,
    /// Maximum points in a composite glyph.
    pub max_composite_points: u16,
    /// Maximum contours in a composite glyph.
    pub max_composite_contours: u16,
    /// 1 if instructions do not use the twilight zone (Z0), or 2 if
    /// instructions do use Z0.
    pub max_zones: u16,
    /// Maximum points used in Z0.
    pub max_twilight_points: u16,
    /// Number of Storage Area locations.
    pub max_storage: u16,
    /// Number of FDEFs, equal to the highest function number + 1.
    pub max_function_defs: u16,
    /// Number of IDEFs.
    pub max_instruction_defs: u16,
    /// Maximum stack depth across Font Program ('fpgm' table), CVT
    /// Program ('prep' table) and all glyph instructions.
    pub max_stack_elements: u16,
    /// Maximum byte count for glyph instructions.
    pub max_size_of_instructions: u16,
    /// Maximum number of components referenced at "top level" for any
    /// composite glyph.
    pub max_component_elements: u16,
    /// Maximum levels of recursion; 1 for simple components.
    pub max_component_depth: u16,
}

impl TopLevelTable for Maxp {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Maxp {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version = cursor.read()?;
        let num_glyphs = cursor.read()?;
        let limits = if version == VERSION_0_5 {
            None
        } else {
            Some(MaxpLimits {
                max_points: cursor.read()?,
                max_contours: cursor.read()?,
                max_composite_points: cursor.read()?,
                max_composite_contours: cursor.read()?,
                max_zones: cursor.read()?,
                max_twilight_points: cursor.read()?,
                max_storage: cursor.read()?,
                max_function_defs: cursor.read()?,
                max_instruction_defs: cursor.read()?,
                max_stack_elements: cursor.read()?,
                max_size_of_instructions: cursor.read()?,
                max_component_elements: cursor.read()?,
                max_component_depth: cursor.read()?,
            })
        };
        Ok(Maxp {
            version,
            num_glyphs,
            limits,
        })
    }
}
