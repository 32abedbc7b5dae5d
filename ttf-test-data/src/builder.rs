//! Assembling a table directory and table data into a font file.

use ttf_types::{Tag, TT_SFNT_VERSION};

use crate::BeBuffer;

const TABLE_RECORD_LEN: usize = 16;
const TABLE_DIRECTORY_HEADER_LEN: usize = 12;

/// Build a font from a list of tables.
///
/// Unlike a production font writer, records are written in the order the
/// tables were added and duplicate tags are kept, so that tests can
/// produce directories a reader has to cope with.
#[derive(Debug, Clone)]
pub struct FontBuilder {
    sfnt_version: u32,
    tables: Vec<(Tag, Vec<u8>)>,
}

impl Default for FontBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBuilder {
    pub fn new() -> Self {
        FontBuilder {
            sfnt_version: TT_SFNT_VERSION,
            tables: Vec::new(),
        }
    }

    /// Override the version written at the start of the file.
    pub fn sfnt_version(&mut self, version: u32) -> &mut Self {
        self.sfnt_version = version;
        self
    }

    /// Add a table with the given tag and contents.
    pub fn add_raw(&mut self, tag: Tag, data: impl AsRef<[u8]>) -> &mut Self {
        self.tables.push((tag, data.as_ref().to_vec()));
        self
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.iter().any(|(t, _)| *t == tag)
    }

    /// Assemble the font.
    ///
    /// Each table starts on a four byte boundary.
    pub fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let entry_selector = (num_tables as f64).log2().floor() as u16;
        let search_range = (2u16.pow(entry_selector as u32)).saturating_mul(16);
        let range_shift = (num_tables.saturating_mul(16)).saturating_sub(search_range);

        let mut buf = BeBuffer::new();
        buf.push(self.sfnt_version)
            .push(num_tables)
            .push(search_range)
            .push(entry_selector)
            .push(range_shift);

        let mut offset = TABLE_DIRECTORY_HEADER_LEN + self.tables.len() * TABLE_RECORD_LEN;
        for (tag, data) in &self.tables {
            buf.push(*tag)
                .push(checksum(data))
                .push(offset as u32)
                .push(data.len() as u32);
            offset += data.len().next_multiple_of(4);
        }
        for (_, data) in &self.tables {
            buf.extend_bytes(data).align_to(4);
        }
        buf.into_vec()
    }
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0u32, u32::wrapping_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_header() {
        let mut builder = FontBuilder::new();
        builder
            .add_raw(Tag::new(b"head"), [1u8, 2, 3])
            .add_raw(Tag::new(b"maxp"), [4u8; 6])
            .add_raw(Tag::new(b"cmap"), [5u8; 4]);
        let data = builder.build();
        // version, numTables 3, searchRange 32, entrySelector 1, rangeShift 16
        assert_eq!(&data[..12], &[0, 1, 0, 0, 0, 3, 0, 32, 0, 1, 0, 16]);
        // first table starts after the three records and is padded to 4
        assert_eq!(&data[12 + 8..12 + 16], &[0, 0, 0, 60, 0, 0, 0, 3]);
        assert_eq!(&data[60..64], &[1, 2, 3, 0]);
        assert_eq!(&data[64..70], &[4; 6]);
        assert_eq!(&data[72..76], &[5; 4]);
        assert_eq!(data.len(), 76);
    }

    #[test]
    fn checksum_pads_final_word() {
        assert_eq!(checksum(&[0, 0, 0, 1, 2]), 0x0200_0001);
    }
}
