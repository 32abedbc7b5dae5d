//! Test data shared between the ttf crates.
//!
//! Fonts are assembled in code rather than checked in as binaries, so that
//! each test states exactly the bytes it depends on.

pub mod bebuffer;
mod builder;
pub mod cmap;
pub mod fonts;
pub mod glyf;
pub mod tables;

pub use bebuffer::BeBuffer;
pub use builder::FontBuilder;
