use zeroize::Zeroize;

use super::hmac;

/// HKDF (RFC5869) for one hash function, built from its HMAC.
///
/// The key schedule only ever needs single-block outputs, so expansion is
/// limited to `Hash.length` bytes.
pub(crate) struct Hkdf(pub(crate) &'static dyn hmac::Hmac);

impl Hkdf {
    /// `HKDF-Extract(salt, ikm)`.  No salt means `Hash.length` zero bytes.
    pub(crate) fn extract(&self, salt: Option<&[u8]>, ikm: &[u8]) -> Box<dyn HkdfExpander> {
        let zeroes = [0u8; hmac::Tag::MAX_LEN];
        let salt = salt.unwrap_or(&zeroes[..self.0.hash_output_len()]);
        let prk = self.0.with_key(salt).sign(&[ikm]);
        Box::new(HmacExpander(self.0.with_key(prk.as_ref())))
    }

    /// `HKDF-Extract(salt, 0)`, the input being `Hash.length` zero bytes.
    pub(crate) fn extract_zeroes(&self, salt: Option<&[u8]>) -> Box<dyn HkdfExpander> {
        let zeroes = [0u8; hmac::Tag::MAX_LEN];
        self.extract(salt, &zeroes[..self.0.hash_output_len()])
    }

    /// Expand from `okm` used directly as the PRK, as TLS1.3 does with
    /// traffic secrets.
    pub(crate) fn expander_for_okm(&self, okm: &OkmBlock) -> Box<dyn HkdfExpander> {
        Box::new(HmacExpander(self.0.with_key(okm.as_ref())))
    }

    /// `HMAC(key, message)` with this hash.
    pub(crate) fn hmac_sign(&self, key: &OkmBlock, message: &[u8]) -> hmac::Tag {
        self.0
            .with_key(key.as_ref())
            .sign(&[message])
    }
}

/// `HKDF-Expand` with the PRK held inside.
pub(crate) trait HkdfExpander: Send + Sync {
    /// `HKDF-Expand(PRK, info, Hash.length)`, where `info` is the
    /// concatenation of its parts.
    fn expand_block(&self, info: &[&[u8]]) -> OkmBlock;

    /// `Hash.length`.
    fn hash_len(&self) -> usize;
}

struct HmacExpander(Box<dyn hmac::Key>);

impl HkdfExpander for HmacExpander {
    fn expand_block(&self, info: &[&[u8]]) -> OkmBlock {
        // One block: T(1) = HMAC(PRK, info | 0x01)
        let mut parts = info.to_vec();
        parts.push(&[1u8]);
        OkmBlock::new(self.0.sign(&parts).as_ref())
    }

    fn hash_len(&self) -> usize {
        self.0.tag_len()
    }
}

/// One `Hash.length` block of HKDF output: a secret of the key schedule.
/// It is wiped when dropped.
#[derive(Clone)]
pub struct OkmBlock {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl OkmBlock {
    /// Copy `bytes`, which must not exceed [`OkmBlock::MAX_LEN`].
    pub fn new(bytes: &[u8]) -> Self {
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            buf,
            used: bytes.len(),
        }
    }

    /// Longest block we can hold.
    pub const MAX_LEN: usize = 64;
}

impl Drop for OkmBlock {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

impl AsRef<[u8]> for OkmBlock {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

impl core::fmt::Debug for OkmBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OkmBlock")
            .field("len", &self.used)
            .finish_non_exhaustive()
    }
}
