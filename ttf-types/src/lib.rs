//! Common [scalar data types][data types] used in TrueType font files
//!
//! [data types]: https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod bbox;
mod fixed;
mod glyph_id;
mod longdatetime;
mod point;
mod raw;
mod tag;
mod uint24;

pub use bbox::BoundingBox;
pub use fixed::{F2Dot14, Fixed};
pub use glyph_id::GlyphId;
pub use longdatetime::LongDateTime;
pub use point::Point;
pub use raw::{BigEndian, FixedSize, Scalar};
pub use tag::{InvalidTag, Tag};
pub use uint24::Uint24;

/// The SFNT version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The legacy Apple SFNT version for TrueType fonts (`true`).
pub const TRUE_SFNT_VERSION: u32 = 0x74727565;
/// The SFNT version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
