use core::fmt::Debug;

use crate::error::InvalidMessage;

/// A cursor over a byte slice being decoded.
pub struct Reader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn init(bytes: &'a [u8]) -> Self {
        Reader {
            buffer: bytes,
            cursor: 0,
        }
    }

    /// Split off the next `length` bytes as a reader of their own.
    pub fn sub(&mut self, length: usize) -> Result<Self, InvalidMessage> {
        self.take(length)
            .map(Reader::init)
            .ok_or(InvalidMessage::MessageTooShort)
    }

    /// Everything not yet read.  The reader is exhausted afterwards.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buffer[self.cursor..];
        self.cursor = self.buffer.len();
        rest
    }

    /// The next `length` bytes, or `None` (consuming nothing) if fewer remain.
    pub fn take(&mut self, length: usize) -> Option<&'a [u8]> {
        let end = self.cursor.checked_add(length)?;
        let taken = self.buffer.get(self.cursor..end)?;
        self.cursor = end;
        Some(taken)
    }

    pub fn any_left(&self) -> bool {
        self.cursor < self.buffer.len()
    }

    /// Fails with `TrailingData(name)` unless everything was read.
    pub fn expect_empty(&self, name: &'static str) -> Result<(), InvalidMessage> {
        match self.any_left() {
            true => Err(InvalidMessage::TrailingData(name)),
            false => Ok(()),
        }
    }

    pub fn used(&self) -> usize {
        self.cursor
    }

    pub fn left(&self) -> usize {
        self.buffer.len() - self.cursor
    }
}

/// A wire-format value.
pub trait Codec: Debug + Sized {
    /// Append the encoding of `self` to `bytes`.
    fn encode(&self, bytes: &mut Vec<u8>);

    /// Decode one value from the front of `r`.
    fn read(_: &mut Reader<'_>) -> Result<Self, InvalidMessage>;

    fn get_encoding(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.encode(&mut bytes);
        bytes
    }

    /// Decode from the front of `bytes`; anything after the value is ignored.
    fn read_bytes(bytes: &[u8]) -> Result<Self, InvalidMessage> {
        Self::read(&mut Reader::init(bytes))
    }
}

/// Reads `N` bytes for the integer type `name`.
fn read_array<const N: usize>(
    r: &mut Reader<'_>,
    name: &'static str,
) -> Result<[u8; N], InvalidMessage> {
    r.take(N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(InvalidMessage::MissingData(name))
}

impl Codec for u8 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.push(*self);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        read_array::<1>(r, "u8").map(|[b]| b)
    }
}

pub(crate) fn put_u16(v: u16, out: &mut [u8]) {
    out[..2].copy_from_slice(&v.to_be_bytes());
}

impl Codec for u16 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_be_bytes());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        read_array(r, "u16").map(Self::from_be_bytes)
    }
}

/// A three byte big-endian length, as used by handshake headers and
/// certificate lists.
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone)]
pub struct u24(pub u32);

impl From<u24> for usize {
    fn from(v: u24) -> Self {
        v.0 as Self
    }
}

impl Codec for u24 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.0.to_be_bytes()[1..]);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let [a, b, c] = read_array(r, "u24")?;
        Ok(Self(u32::from_be_bytes([0, a, b, c])))
    }
}

impl Codec for u32 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_be_bytes());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        read_array(r, "u32").map(Self::from_be_bytes)
    }
}

impl Codec for u64 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_be_bytes());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        read_array(r, "u64").map(Self::from_be_bytes)
    }
}

/// A length-prefixed list, the prefix width coming from the element type.
impl<T: Codec + TlsListElement + Debug> Codec for Vec<T> {
    fn encode(&self, bytes: &mut Vec<u8>) {
        let nested = LengthPrefixedBuffer::new(T::SIZE_LEN, bytes);
        for item in self {
            item.encode(nested.buf);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let len = match T::SIZE_LEN {
            ListLength::U8 => usize::from(u8::read(r)?),
            ListLength::U16 => usize::from(u16::read(r)?),
            ListLength::U24 { max } => usize::from(u24::read(r)?).min(max),
        };

        let mut sub = r.sub(len)?;
        let mut items = Self::new();
        while sub.any_left() {
            items.push(T::read(&mut sub)?);
        }
        Ok(items)
    }
}

/// Something that appears in TLS lists, and the width of those lists'
/// length prefix.
pub trait TlsListElement {
    const SIZE_LEN: ListLength;
}

pub enum ListLength {
    U8,
    U16,
    /// Lengths above `max` are clamped to it.
    U24 { max: usize },
}

impl ListLength {
    fn width(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U24 { .. } => 3,
        }
    }
}

/// Encodes a length-prefixed structure in one pass: the prefix is
/// reserved on creation and filled in on drop.
///
/// Until then the prefix reads as all ones, so a body encoded
/// half-way never parses as something shorter.
pub(crate) struct LengthPrefixedBuffer<'a> {
    pub(crate) buf: &'a mut Vec<u8>,
    len_offset: usize,
    size_len: ListLength,
}

impl<'a> LengthPrefixedBuffer<'a> {
    pub(crate) fn new(size_len: ListLength, buf: &'a mut Vec<u8>) -> Self {
        let len_offset = buf.len();
        buf.resize(len_offset + size_len.width(), 0xff);
        Self {
            buf,
            len_offset,
            size_len,
        }
    }
}

impl Drop for LengthPrefixedBuffer<'_> {
    fn drop(&mut self) {
        let width = self.size_len.width();
        let body_len = self.buf.len() - self.len_offset - width;
        debug_assert!(body_len < 1 << (8 * width));
        let be = (body_len as u32).to_be_bytes();
        self.buf[self.len_offset..self.len_offset + width].copy_from_slice(&be[4 - width..]);
    }
}
