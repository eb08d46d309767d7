use webpki::ring as webpki_algs;

use crate::crypto::{SecureRandom, SupportedKxGroup};
use crate::enums::{CipherSuite, SignatureScheme};
use crate::rand::GetRandomFailed;
use crate::tls13::Tls13CipherSuite;
use crate::webpki::WebPkiSupportedAlgorithms;

pub(crate) mod hash;
pub(crate) mod hmac;
pub(crate) mod kx;

/// The default source of randomness, backed by *ring*'s `SystemRandom`.
#[derive(Debug)]
pub struct Ring;

impl SecureRandom for Ring {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed> {
        use ring::rand::SecureRandom;

        ring::rand::SystemRandom::new()
            .fill(buf)
            .map_err(|_| GetRandomFailed)
    }
}

/// The TLS1.3 ciphersuite TLS_AES_128_GCM_SHA256
pub static TLS13_AES_128_GCM_SHA256: &Tls13CipherSuite = &Tls13CipherSuite {
    suite: CipherSuite::TLS13_AES_128_GCM_SHA256,
    hash_provider: &hash::SHA256,
    hmac_provider: &hmac::HMAC_SHA256,
};

/// The TLS1.3 ciphersuite TLS_AES_256_GCM_SHA384
pub static TLS13_AES_256_GCM_SHA384: &Tls13CipherSuite = &Tls13CipherSuite {
    suite: CipherSuite::TLS13_AES_256_GCM_SHA384,
    hash_provider: &hash::SHA384,
    hmac_provider: &hmac::HMAC_SHA384,
};

/// The TLS1.3 ciphersuite TLS_CHACHA20_POLY1305_SHA256
pub static TLS13_CHACHA20_POLY1305_SHA256: &Tls13CipherSuite = &Tls13CipherSuite {
    suite: CipherSuite::TLS13_CHACHA20_POLY1305_SHA256,
    hash_provider: &hash::SHA256,
    hmac_provider: &hmac::HMAC_SHA256,
};

/// The cipher suites offered by default, in preference order.
pub static DEFAULT_CIPHER_SUITES: &[&Tls13CipherSuite] = &[
    TLS13_AES_128_GCM_SHA256,
    TLS13_AES_256_GCM_SHA384,
    TLS13_CHACHA20_POLY1305_SHA256,
];

/// All defined key exchange groups supported by *ring* appear in this module.
pub mod kx_group {
    pub use super::kx::{SECP256R1, SECP384R1, X25519};
}

/// The key exchange groups offered by default.  A key share is only sent
/// for the first one.
pub static DEFAULT_KX_GROUPS: &[&dyn SupportedKxGroup] = &[kx_group::SECP256R1, kx_group::X25519];

/// Everything webpki can verify with *ring*.  Certificate chains may use
/// any algorithm in `all`; handshake signatures only the schemes in
/// `mapping`, which is also the order they are advertised in.
pub static SUPPORTED_SIG_ALGS: WebPkiSupportedAlgorithms = WebPkiSupportedAlgorithms {
    all: &[
        webpki_algs::ECDSA_P256_SHA256,
        webpki_algs::ECDSA_P256_SHA384,
        webpki_algs::ECDSA_P384_SHA256,
        webpki_algs::ECDSA_P384_SHA384,
        webpki_algs::ED25519,
        webpki_algs::RSA_PSS_2048_8192_SHA256_LEGACY_KEY,
        webpki_algs::RSA_PSS_2048_8192_SHA384_LEGACY_KEY,
        webpki_algs::RSA_PSS_2048_8192_SHA512_LEGACY_KEY,
        webpki_algs::RSA_PKCS1_2048_8192_SHA256,
        webpki_algs::RSA_PKCS1_2048_8192_SHA384,
        webpki_algs::RSA_PKCS1_2048_8192_SHA512,
    ],
    // A TLS1.3 ECDSA scheme also pins the curve.
    mapping: &[
        (SignatureScheme::ECDSA_NISTP384_SHA384, webpki_algs::ECDSA_P384_SHA384),
        (SignatureScheme::ECDSA_NISTP256_SHA256, webpki_algs::ECDSA_P256_SHA256),
        (SignatureScheme::ED25519, webpki_algs::ED25519),
        (SignatureScheme::RSA_PSS_SHA512, webpki_algs::RSA_PSS_2048_8192_SHA512_LEGACY_KEY),
        (SignatureScheme::RSA_PSS_SHA384, webpki_algs::RSA_PSS_2048_8192_SHA384_LEGACY_KEY),
        (SignatureScheme::RSA_PSS_SHA256, webpki_algs::RSA_PSS_2048_8192_SHA256_LEGACY_KEY),
        (SignatureScheme::RSA_PKCS1_SHA512, webpki_algs::RSA_PKCS1_2048_8192_SHA512),
        (SignatureScheme::RSA_PKCS1_SHA384, webpki_algs::RSA_PKCS1_2048_8192_SHA384),
        (SignatureScheme::RSA_PKCS1_SHA256, webpki_algs::RSA_PKCS1_2048_8192_SHA256),
    ],
};
