//! Reading the outline tables of TrueType fonts
//!
//! This crate provides memory safe, bounds checked parsing of the parts of a
//! font file that are needed to turn Unicode text into glyph outlines: the
//! [table directory][table-directory] and the `head`, `maxp`, `loca`, `glyf`
//! and `cmap` tables.
//!
//! Table data is borrowed from the input bytes wherever the file layout
//! allows it. Types whose on-disk form must be normalized before use (such
//! as character map subtables) are decoded into owned representations.
//!
//! For resolved outlines and codepoint lookup with caching, see the
//! `ttf-outlines` crate.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use ttf_read::{FontRef, TableProvider};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let font = FontRef::new(&font_bytes).expect("failed to read font data");
//! let head = font.head().expect("missing 'head' table");
//! let maxp = font.maxp().expect("missing 'maxp' table");
//!
//! println!("{} units per em, {} glyphs", head.units_per_em, maxp.num_glyphs);
//! ```
//!
//! [table-directory]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod font_data;
mod read;
mod table_provider;
pub mod tables;

pub use font_data::FontData;
pub use read::{FontRead, FontReadWithArgs, ReadArgs, ReadError};
pub use table_provider::{TableProvider, TopLevelTable};

/// Public re-export of the ttf-types crate.
pub extern crate ttf_types as types;

use std::collections::{btree_map::Entry, BTreeMap};
use std::ops::Range;

use types::{BigEndian, FixedSize, Tag};

/// A record in the font's table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
pub struct TableRecord {
    tag: BigEndian<Tag>,
    checksum: BigEndian<u32>,
    offset: BigEndian<u32>,
    length: BigEndian<u32>,
}

impl TableRecord {
    /// Table identifier.
    pub fn tag(&self) -> Tag {
        self.tag.get()
    }

    /// Checksum for the table.
    pub fn checksum(&self) -> u32 {
        self.checksum.get()
    }

    /// Offset from the beginning of the font data.
    pub fn offset(&self) -> u32 {
        self.offset.get()
    }

    /// Length of the table.
    pub fn length(&self) -> u32 {
        self.length.get()
    }

    /// The byte range of the table within the font data.
    pub fn data_range(&self) -> Range<usize> {
        let start = self.offset() as usize;
        start..start.saturating_add(self.length() as usize)
    }
}

impl FixedSize for TableRecord {
    const RAW_BYTE_LEN: usize = Tag::RAW_BYTE_LEN + 3 * u32::RAW_BYTE_LEN;
}

/// Reference to the contents of a font file.
///
/// The table directory is read once, up front, into a map from tag to
/// record; tables are then located by tag regardless of the order in which
/// they appear in the file.
#[derive(Clone)]
pub struct FontRef<'a> {
    data: FontData<'a>,
    sfnt_version: u32,
    table_records: &'a [TableRecord],
    tables: BTreeMap<Tag, TableRecord>,
}

impl<'a> FontRef<'a> {
    /// Creates a new reference to an in-memory font backed by the given data.
    ///
    /// The data must be a single TrueType or OpenType font; collections are
    /// not supported.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        let data = FontData::new(data);
        let mut cursor = data.cursor();
        let sfnt_version: u32 = cursor.read()?;
        if ![
            types::TT_SFNT_VERSION,
            types::TRUE_SFNT_VERSION,
            types::CFF_SFNT_VERSION,
        ]
        .contains(&sfnt_version)
        {
            return Err(ReadError::InvalidSfnt(sfnt_version));
        }
        let num_tables: u16 = cursor.read()?;
        // searchRange, entrySelector, rangeShift
        cursor.advance_by(3 * u16::RAW_BYTE_LEN);
        let table_records: &[TableRecord] = cursor.read_array(num_tables as usize)?;
        let mut tables = BTreeMap::new();
        for record in table_records {
            match tables.entry(record.tag()) {
                Entry::Vacant(entry) => {
                    entry.insert(*record);
                }
                Entry::Occupied(_) => {
                    log::warn!("ignoring duplicate '{}' table record", record.tag());
                }
            }
        }
        log::debug!(
            "sfnt 0x{sfnt_version:08X} with {num_tables} tables: {:?}",
            table_records.iter().map(TableRecord::tag).collect::<Vec<_>>()
        );
        Ok(FontRef {
            data,
            sfnt_version,
            table_records,
            tables,
        })
    }

    /// The sfnt version tag at the start of the file.
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// The table records, in the order they appear in the directory.
    pub fn table_records(&self) -> &'a [TableRecord] {
        self.table_records
    }

    /// The record for the table with the given tag, if present.
    pub fn table_record(&self, tag: Tag) -> Option<&TableRecord> {
        self.tables.get(&tag)
    }

    /// Returns the data for the table with the specified tag, if present.
    ///
    /// Returns `None` if the tag is missing or the record points outside of
    /// the font data.
    pub fn table_data(&self, tag: Tag) -> Option<FontData<'a>> {
        self.tables
            .get(&tag)
            .and_then(|record| self.data.slice(record.data_range()))
    }

    /// The raw bytes of the whole font.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }
}

impl<'a> TableProvider<'a> for FontRef<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_data(tag)
    }

    fn expect_data_for_tag(&self, tag: Tag) -> Result<FontData<'a>, ReadError> {
        let record = self
            .tables
            .get(&tag)
            .ok_or(ReadError::MissingRequiredTable(tag))?;
        self.data
            .slice(record.data_range())
            .ok_or(ReadError::TruncatedData)
    }
}

#[cfg(test)]
mod tests {
    use ttf_test_data::{be_buffer, FontBuilder};
    use types::{Tag, TT_SFNT_VERSION};

    use super::*;

    #[test]
    fn unsorted_table_directory() {
        let cff2_data = &[0u8, 1, 2, 3];
        let post_data = &[4u8, 5, 6, 7, 8];
        let gdef_data = &[9u8, 10];
        let mut builder = FontBuilder::new();
        builder
            .add_raw(Tag::new(b"post"), post_data)
            .add_raw(Tag::new(b"GDEF"), gdef_data)
            .add_raw(Tag::new(b"CFF2"), cff2_data);
        let font_data = builder.build();
        let font = FontRef::new(&font_data).unwrap();
        let tags = font
            .table_records()
            .iter()
            .map(TableRecord::tag)
            .collect::<Vec<_>>();
        assert_eq!(tags, [Tag::new(b"post"), Tag::new(b"GDEF"), Tag::new(b"CFF2")]);
        assert_eq!(
            font.table_data(Tag::new(b"CFF2")).unwrap().as_bytes(),
            cff2_data
        );
        assert_eq!(
            font.table_data(Tag::new(b"post")).unwrap().as_bytes(),
            post_data
        );
        assert_eq!(
            font.table_data(Tag::new(b"GDEF")).unwrap().as_bytes(),
            gdef_data
        );
        assert!(font.table_data(Tag::new(b"glyf")).is_none());
    }

    #[test]
    fn missing_table_is_reported_by_tag() {
        let font_data = FontBuilder::new().build();
        let font = FontRef::new(&font_data).unwrap();
        assert_eq!(
            font.expect_data_for_tag(Tag::new(b"cmap")).err(),
            Some(ReadError::MissingRequiredTable(Tag::new(b"cmap")))
        );
    }

    #[test]
    fn record_past_end_of_data() {
        let buf = be_buffer! {
            TT_SFNT_VERSION,
            1u16, 16u16, 0u16, 0u16,
            (Tag::new(b"head")), 0u32, 28u32, 100u32
        };
        let font = FontRef::new(&buf).unwrap();
        assert!(font.table_data(Tag::new(b"head")).is_none());
        assert_eq!(
            font.expect_data_for_tag(Tag::new(b"head")).err(),
            Some(ReadError::TruncatedData)
        );
    }

    #[test]
    fn truncated_directory() {
        let buf = be_buffer! {
            TT_SFNT_VERSION,
            // claims two records, provides one
            2u16, 32u16, 1u16, 0u16,
            (Tag::new(b"head")), 0u32, 44u32, 0u32
        };
        assert_eq!(FontRef::new(&buf).err(), Some(ReadError::TruncatedData));
        assert_eq!(
            FontRef::new(&[0, 1, 0]).err(),
            Some(ReadError::TruncatedData)
        );
    }

    #[test]
    fn bad_sfnt_version() {
        let buf = be_buffer! { 0xdeadbeef_u32, 0u16, 0u16, 0u16, 0u16 };
        assert_eq!(
            FontRef::new(&buf).err(),
            Some(ReadError::InvalidSfnt(0xdeadbeef))
        );
    }

    #[test]
    fn duplicate_tag_keeps_first() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut builder = FontBuilder::new();
        builder
            .add_raw(Tag::new(b"name"), [1u8, 1])
            .add_raw(Tag::new(b"name"), [2u8, 2, 2]);
        let font_data = builder.build();
        let font = FontRef::new(&font_data).unwrap();
        assert_eq!(font.table_records().len(), 2);
        assert_eq!(
            font.table_data(Tag::new(b"name")).unwrap().as_bytes(),
            &[1u8, 1]
        );
    }
}
