//! a trait for things that can serve font tables

use types::Tag;

use crate::{tables, FontData, FontRead, FontReadWithArgs, ReadError};

/// A table that has an associated tag.
///
/// This is true of top-level tables, but not their various subtables.
pub trait TopLevelTable {
    /// The table's tag.
    const TAG: Tag;
}

/// An interface for accessing tables from a font (or font-like object)
pub trait TableProvider<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>>;

    fn expect_data_for_tag(&self, tag: Tag) -> Result<FontData<'a>, ReadError> {
        self.data_for_tag(tag)
            .ok_or(ReadError::MissingRequiredTable(tag))
    }

    fn expect_table<T: TopLevelTable + FontRead<'a>>(&self) -> Result<T, ReadError> {
        self.expect_data_for_tag(T::TAG).and_then(FontRead::read)
    }

    fn head(&self) -> Result<tables::head::Head, ReadError> {
        self.expect_table()
    }

    fn maxp(&self) -> Result<tables::maxp::Maxp, ReadError> {
        self.expect_table()
    }

    /// Read the `loca` table.
    ///
    /// `is_long` can be optionally provided, if you have already read the
    /// `head` table; otherwise it is read here. The table must hold at least
    /// `numGlyphs + 1` offsets.
    fn loca(&self, is_long: impl Into<Option<bool>>) -> Result<tables::loca::Loca<'a>, ReadError> {
        let is_long = match is_long.into() {
            Some(is_long) => is_long,
            None => self.head()?.has_long_loca_offsets(),
        };
        let num_glyphs = self.maxp()?.num_glyphs;
        let loca: tables::loca::Loca = self
            .expect_data_for_tag(tables::loca::TAG)
            .and_then(|data| FontReadWithArgs::read_with_args(data, &is_long))?;
        if loca.len() < num_glyphs as usize {
            return Err(ReadError::TruncatedData);
        }
        Ok(loca)
    }

    fn glyf(&self) -> Result<tables::glyf::Glyf<'a>, ReadError> {
        self.expect_table()
    }

    fn cmap(&self) -> Result<tables::cmap::Cmap<'a>, ReadError> {
        self.expect_table()
    }
}
