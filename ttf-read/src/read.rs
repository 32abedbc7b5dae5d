//! Traits for interpreting font data

use types::Tag;

use crate::font_data::FontData;

/// A type that can be read from raw table data.
///
/// This trait is implemented for all font tables that are self-describing: that
/// is, tables that do not require any external state in order to interpret their
/// underlying bytes. (Tables that require external state implement
/// [`FontReadWithArgs`] instead)
pub trait FontRead<'a>: Sized {
    /// Read an instance of `Self` from the provided data, performing validation.
    ///
    /// In the case of a table, this method is responsible for ensuring the input
    /// data is consistent: this means ensuring that any versioned fields are
    /// present as required by the version, and that any array lengths are not
    /// out-of-bounds.
    fn read(data: FontData<'a>) -> Result<Self, ReadError>;
}

/// A trait for a type that needs additional arguments to be read.
pub trait ReadArgs {
    type Args: Copy;
}

/// A trait for types that require external data in order to be constructed.
///
/// `loca`, for instance, cannot be interpreted without the offset format
/// from `head`.
pub trait FontReadWithArgs<'a>: Sized + ReadArgs {
    /// read an item, using the provided args.
    ///
    /// If a type requires multiple arguments, they will be passed as a tuple.
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError>;
}

/// An error that occurs when reading font data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ReadError {
    /// A field, array or table extends past the end of the available data.
    #[error("unexpected end of data")]
    TruncatedData,
    /// The `head` table magic number was not `0x5F0F3CF5`.
    #[error("bad magic number in head table: 0x{0:08X}")]
    BadMagic(u32),
    /// One of the tables needed to load outlines is not in the directory.
    #[error("the required '{0}' table is missing")]
    MissingRequiredTable(Tag),
    #[error("invalid sfnt version 0x{0:08X}")]
    InvalidSfnt(u32),
    #[error("specified array length not a multiple of item size")]
    InvalidArrayLen,
    #[error("malformed data: '{0}'")]
    MalformedData(&'static str),
}
