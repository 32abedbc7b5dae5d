//! small utilities used in tests

use ttf_types::Scalar;

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeBuffer(Vec<u8>);

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Write any scalar to this buffer.
    pub fn push(&mut self, item: impl Scalar) -> &mut Self {
        self.0.extend_from_slice(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(&mut self, iter: impl IntoIterator<Item = T>) -> &mut Self {
        for item in iter {
            self.0.extend_from_slice(item.to_raw().as_ref());
        }
        self
    }

    /// Append raw bytes, unchanged.
    pub fn extend_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(bytes);
        self
    }

    /// Pad with zeros up to a multiple of `alignment`.
    pub fn align_to(&mut self, alignment: usize) -> &mut Self {
        let padded_len = self.0.len().next_multiple_of(alignment);
        self.0.resize(padded_len, 0);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite the scalar at `offset`, which must already be written.
    pub fn write_at(&mut self, offset: usize, item: impl Scalar) {
        let raw = item.to_raw();
        let bytes = raw.as_ref();
        self.0[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<BeBuffer> for Vec<u8> {
    fn from(buf: BeBuffer) -> Self {
        buf.0
    }
}

/// Build a [`BeBuffer`] from a list of scalars.
///
/// Each item is either a single token (a literal, a constant or a
/// parenthesized expression) which is pushed as-is, or a bracketed list
/// (or repeat expression) which is written element by element. Negative
/// literals must be parenthesized:
///
/// ```
/// # use ttf_test_data::be_buffer;
/// let buf = be_buffer! { 1u16, (-2i16), [3u8, 4] };
/// assert_eq!(&*buf, &[0, 1, 0xff, 0xfe, 3, 4]);
/// ```
#[macro_export]
macro_rules! be_buffer {
    ( $( $item:tt ),* $(,)? ) => {{
        let mut buffer = $crate::bebuffer::BeBuffer::new();
        $( $crate::be_buffer_add!(buffer, $item); )*
        buffer
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! be_buffer_add {
    ($buffer:ident, [ $item:expr ; $count:expr ]) => {
        $buffer.extend([ $item ; $count ]);
    };
    ($buffer:ident, [ $( $item:expr ),* $(,)? ]) => {
        $buffer.extend([ $( $item ),* ]);
    };
    ($buffer:ident, $item:tt) => {
        $buffer.push($item);
    };
}
