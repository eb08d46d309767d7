pub use crate::msgs::enums::HashAlgorithm;

/// A hash function, as the transcript and the key schedule use it.
pub trait Hash: Send + Sync {
    /// Begin a running hash.
    fn start(&self) -> Box<dyn Context>;

    /// Hash `data` in one go.
    fn hash(&self, data: &[u8]) -> Output;

    /// `Hash.length` in RFC8446 terms.
    fn output_len(&self) -> usize;

    /// The IANA name of this function.
    fn algorithm(&self) -> HashAlgorithm;
}

/// A running hash.
pub trait Context: Send + Sync {
    /// Feed `data` in.
    fn update(&mut self, data: &[u8]);

    /// The digest of everything fed in so far.  The context stays usable.
    fn fork_finish(&self) -> Output;
}

/// A digest held inline, up to SHA-512 in size.
#[derive(Clone)]
pub struct Output {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl Output {
    /// Copy `bytes`, which must not exceed [`Output::MAX_LEN`].
    pub fn new(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= Self::MAX_LEN);
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            buf,
            used: bytes.len(),
        }
    }

    /// Longest digest we can hold.
    pub const MAX_LEN: usize = 64;
}

impl AsRef<[u8]> for Output {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

impl core::fmt::Debug for Output {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        crate::msgs::base::hex(f, self.as_ref())
    }
}
