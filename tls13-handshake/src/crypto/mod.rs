//! The primitives the engine treats as black boxes, behind traits so a
//! test or an embedder can swap them.  [`ring`] has the defaults.

use core::fmt::Debug;

use zeroize::Zeroize;

use crate::error::Error;
pub use crate::msgs::enums::NamedGroup;
pub use crate::rand::GetRandomFailed;

/// Running hashes for the transcript.
pub mod hash;
/// Keyed MACs.
pub mod hmac;
/// HKDF as the key schedule uses it: extract, then single-block expands.
pub mod tls13;
/// Suites, groups and signature algorithms backed by *ring*.
pub mod ring;

/// Where client randoms and session ids come from.
pub trait SecureRandom: Send + Sync + Debug {
    /// Fill all of `buf`.
    fn fill(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed>;
}

/// A key exchange group we can offer a key share for.
pub trait SupportedKxGroup: Send + Sync + Debug {
    /// Generate an ephemeral key pair for one handshake.
    fn start(&self) -> Result<Box<dyn ActiveKeyExchange>, Error>;

    /// The group's name on the wire.
    fn name(&self) -> NamedGroup;
}

/// Our half of one key exchange, waiting for the server's share.
pub trait ActiveKeyExchange: Send + Sync {
    /// Combine with the server's `peer_pub_key`, consuming our private key.
    ///
    /// A share that is malformed for the group must be refused with
    /// `PeerMisbehaved::InvalidKeyShare`.
    fn complete(self: Box<Self>, peer_pub_key: &[u8]) -> Result<SharedSecret, Error>;

    /// Our public share, encoded as a `KeyShareEntry` carries it.
    fn pub_key(&self) -> &[u8];

    /// The group this exchange is in.
    fn group(&self) -> NamedGroup;
}

/// The (EC)DHE shared secret.  It is wiped when dropped.
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// The raw secret, the key schedule's (EC)DHE input.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl From<&[u8]> for SharedSecret {
    fn from(source: &[u8]) -> Self {
        Self(source.to_vec())
    }
}
