//! The tables needed to map text to glyph outlines.

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod loca;
pub mod maxp;
