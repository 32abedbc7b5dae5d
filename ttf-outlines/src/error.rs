//! Errors that may occur while loading a font.

use ttf_read::ReadError;

use crate::GlyphId;

/// An error that prevents a font from being loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The font data is malformed, truncated or missing a required table.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// Composite glyphs are nested more deeply than
    /// [`GLYF_COMPOSITE_RECURSION_LIMIT`](crate::GLYF_COMPOSITE_RECURSION_LIMIT).
    #[error("recursion limit exceeded loading composite glyph {0}")]
    RecursionLimitExceeded(GlyphId),
    /// A composite glyph refers, directly or through other composites, to
    /// itself.
    #[error("composite glyph {0} refers to itself")]
    CycleDetected(GlyphId),
    /// A composite glyph refers to a glyph past the end of the font.
    #[error("glyph {0} not found")]
    GlyphNotFound(GlyphId),
}
