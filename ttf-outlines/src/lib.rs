//! Glyph outlines and character mapping for TrueType fonts.
//!
//! This crate turns the raw tables exposed by [`ttf_read`](raw) into the
//! two things a text renderer needs from a font:
//!
//! * an indexed set of glyph [`Outline`]s, with composite glyphs resolved
//!   into plain contours, and
//! * a [`Charmap`] answering "which glyph draws this codepoint", including
//!   [Unicode variation sequences](http://unicode.org/faq/vs.html).
//!
//! Loading is all or nothing: [`OutlineFont::new`] either returns a fully
//! resolved font or a [`LoadError`]. After that, lookups never fail; a
//! codepoint that the font does not cover maps to glyph 0.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use ttf_outlines::OutlineFont;
//!
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let font = OutlineFont::new(&font_bytes).expect("failed to load font");
//! for ch in "hello".chars() {
//!     let (outline, _) = font.outline_for_char(ch as u32, None);
//!     if let Some(outline) = outline {
//!         println!("{ch}: {} contours", outline.contour_ends.len());
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Expose our "raw" underlying parser crate.
pub extern crate ttf_read as raw;

mod charmap;
mod error;
mod font;
mod glyf;
mod outline;

pub use charmap::{Charmap, GlyphMapping};
pub use error::LoadError;
pub use font::OutlineFont;
pub use outline::{Outline, OutlinePoint};

/// Type for a glyph identifier.
pub type GlyphId = ttf_read::types::GlyphId;

/// Type for a 4-byte tag used to identify font tables and other resources.
pub type Tag = ttf_read::types::Tag;

/// Maximum nesting depth of composite glyphs.
///
/// A composite whose components are themselves composites nested deeper
/// than this fails to load with [`LoadError::RecursionLimitExceeded`].
pub const GLYF_COMPOSITE_RECURSION_LIMIT: usize = 32;
