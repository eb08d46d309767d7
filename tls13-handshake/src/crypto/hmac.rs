use zeroize::Zeroize;

/// HMAC over one hash function.  HKDF and every Finished and binder MAC
/// are computed with it.
pub trait Hmac: Send + Sync {
    /// Key an instance with `key`.
    fn with_key(&self, key: &[u8]) -> Box<dyn Key>;

    /// The output length of the underlying hash (`L` in RFC2104).
    fn hash_output_len(&self) -> usize;
}

/// A keyed HMAC instance.
pub trait Key: Send + Sync {
    /// The tag over the concatenation of `parts`.
    fn sign(&self, parts: &[&[u8]]) -> Tag;

    /// Length of the tags `sign` produces.
    fn tag_len(&self) -> usize;
}

/// An HMAC tag.  It is wiped when dropped.
#[derive(Clone)]
pub struct Tag {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl Tag {
    /// Copy `bytes`, which must not exceed [`Tag::MAX_LEN`].
    pub fn new(bytes: &[u8]) -> Self {
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            buf,
            used: bytes.len(),
        }
    }

    /// Longest tag we can hold.
    pub const MAX_LEN: usize = 64;
}

impl Drop for Tag {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}
