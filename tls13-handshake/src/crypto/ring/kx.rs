use core::fmt;

use ring::agreement;
use ring::rand::SystemRandom;

use crate::crypto::{ActiveKeyExchange, SharedSecret, SupportedKxGroup};
use crate::error::{Error, PeerMisbehaved};
use crate::msgs::enums::NamedGroup;
use crate::rand::GetRandomFailed;

/// An ECDHE group, as a *ring* agreement algorithm.
struct KxGroup {
    name: NamedGroup,
    alg: &'static agreement::Algorithm,
}

impl KxGroup {
    /// Shape check on the server's key share.  Whether a NIST point is on
    /// the curve is left to *ring*.
    fn share_is_well_formed(&self, share: &[u8]) -> bool {
        match self.name {
            NamedGroup::X25519 => share.len() == 32,
            // RFC8446 section 4.2.8.2: uncompressed points only.
            _ => share.first() == Some(&0x04),
        }
    }
}

impl SupportedKxGroup for KxGroup {
    fn start(&self) -> Result<Box<dyn ActiveKeyExchange>, Error> {
        let priv_key = agreement::EphemeralPrivateKey::generate(self.alg, &SystemRandom::new())
            .map_err(|_| GetRandomFailed)?;
        let pub_key = priv_key
            .compute_public_key()
            .map_err(|_| GetRandomFailed)?;

        Ok(Box::new(KeyExchange {
            group: KxGroup {
                name: self.name,
                alg: self.alg,
            },
            priv_key,
            pub_key,
        }))
    }

    fn name(&self) -> NamedGroup {
        self.name
    }
}

impl fmt::Debug for KxGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.name, f)
    }
}

/// X25519 (RFC7748).
pub static X25519: &dyn SupportedKxGroup = &KxGroup {
    name: NamedGroup::X25519,
    alg: &agreement::X25519,
};

/// ECDH over NIST P-256.
pub static SECP256R1: &dyn SupportedKxGroup = &KxGroup {
    name: NamedGroup::secp256r1,
    alg: &agreement::ECDH_P256,
};

/// ECDH over NIST P-384.
pub static SECP384R1: &dyn SupportedKxGroup = &KxGroup {
    name: NamedGroup::secp384r1,
    alg: &agreement::ECDH_P384,
};

/// Our half of one exchange, alive from ClientHello to ServerHello.
struct KeyExchange {
    group: KxGroup,
    priv_key: agreement::EphemeralPrivateKey,
    pub_key: agreement::PublicKey,
}

impl ActiveKeyExchange for KeyExchange {
    fn complete(self: Box<Self>, peer: &[u8]) -> Result<SharedSecret, Error> {
        if !self.group.share_is_well_formed(peer) {
            return Err(PeerMisbehaved::InvalidKeyShare.into());
        }

        let peer_key = agreement::UnparsedPublicKey::new(self.group.alg, peer);
        agreement::agree_ephemeral(self.priv_key, &peer_key, |secret| SharedSecret::from(secret))
            .map_err(|_| PeerMisbehaved::InvalidKeyShare.into())
    }

    fn pub_key(&self) -> &[u8] {
        self.pub_key.as_ref()
    }

    fn group(&self) -> NamedGroup {
        self.group.name
    }
}
