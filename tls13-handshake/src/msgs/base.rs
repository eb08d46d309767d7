use core::fmt;

use pki_types::CertificateDer;
use zeroize::Zeroize;

use crate::error::InvalidMessage;
use crate::msgs::codec::{u24, Codec, ListLength, Reader, TlsListElement};

/// Bytes whose extent is set by the enclosing structure: a Finished
/// body, an unknown extension body, or a whole encoded message.
#[derive(Clone, Eq, PartialEq)]
pub struct Payload(pub Vec<u8>);

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Takes everything left in `r`; cannot fail.
    pub fn read(r: &mut Reader<'_>) -> Self {
        Self(r.rest().to_vec())
    }
}

impl Codec for Payload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self::read(r))
    }
}

macro_rules! prefixed_payload {
    ($(#[$attr:meta])* $name:ident, $len:ty) => {
        $(#[$attr])*
        #[derive(Clone, Eq, PartialEq)]
        pub struct $name(pub Vec<u8>);

        impl $name {
            pub fn new(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }

            pub fn empty() -> Self {
                Self(Vec::new())
            }

            /// Encodes `body` the way a value of this type would be,
            /// without copying it into one first.
            pub fn encode_slice(body: &[u8], bytes: &mut Vec<u8>) {
                debug_assert!(body.len() <= <$len>::MAX as usize);
                (body.len() as $len).encode(bytes);
                bytes.extend_from_slice(body);
            }
        }

        impl Codec for $name {
            fn encode(&self, bytes: &mut Vec<u8>) {
                Self::encode_slice(&self.0, bytes);
            }

            fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
                let len = <$len>::read(r)? as usize;
                Ok(Self(r.sub(len)?.rest().to_vec()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                hex(f, &self.0)
            }
        }
    };
}

prefixed_payload!(
    /// Opaque bytes behind a u16 length: key shares, tickets, signatures.
    PayloadU16,
    u16
);

prefixed_payload!(
    /// Opaque bytes behind a u8 length: ticket nonces, binders, ALPN
    /// names, and the PSK inside a stored ticket.
    PayloadU8,
    u8
);

impl PayloadU8 {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for PayloadU8 {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PayloadU8 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Lists of these (ALPN names, PSK binders) take a u16 length.
impl TlsListElement for PayloadU8 {
    const SIZE_LEN: ListLength = ListLength::U16;
}

impl Zeroize for PayloadU8 {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// A certificate in a TLS1.3 `CertificateEntry`: u24 length, then DER.
impl Codec for CertificateDer<'static> {
    fn encode(&self, bytes: &mut Vec<u8>) {
        u24(self.len() as u32).encode(bytes);
        bytes.extend_from_slice(self);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let len = usize::from(u24::read(r)?);
        Ok(Self::from(r.sub(len)?.rest().to_vec()))
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex(f, &self.0)
    }
}

/// Lower-case hex, no separators.
pub(crate) fn hex<'a>(
    f: &mut fmt::Formatter<'_>,
    payload: impl IntoIterator<Item = &'a u8>,
) -> fmt::Result {
    payload
        .into_iter()
        .try_for_each(|b| write!(f, "{:02x}", b))
}
