use core::fmt;

use crate::crypto::tls13::Hkdf;
use crate::crypto::{hash, hmac};
use crate::enums::CipherSuite;
use crate::msgs::enums::HashAlgorithm;

pub(crate) mod key_schedule;

/// A TLS 1.3 cipher suite supported by this crate.
///
/// Only the parts of a suite the handshake needs are described here: its
/// identifier, and the hash (and so HMAC and HKDF) it runs the key schedule
/// and transcript with.  Record protection lives outside this crate.
pub struct Tls13CipherSuite {
    /// The TLS enumeration naming this cipher suite.
    pub suite: CipherSuite,

    /// Which hash function the suite uses for the transcript.
    pub hash_provider: &'static dyn hash::Hash,

    /// HMAC with the suite's hash; HKDF is built on top of it.
    pub hmac_provider: &'static dyn hmac::Hmac,
}

impl Tls13CipherSuite {
    /// Can a session using suite self resume from suite prev?
    pub fn can_resume_from(&self, prev: &Self) -> bool {
        self.hash_algorithm() == prev.hash_algorithm()
    }

    /// The hash algorithm used by this suite.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_provider.algorithm()
    }

    /// HKDF over this suite's HMAC.
    pub(crate) fn hkdf(&self) -> Hkdf {
        Hkdf(self.hmac_provider)
    }
}

impl PartialEq for Tls13CipherSuite {
    fn eq(&self, other: &Self) -> bool {
        self.suite == other.suite
    }
}

impl fmt::Debug for Tls13CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tls13CipherSuite")
            .field("suite", &self.suite)
            .finish()
    }
}

/// Constructs the signature message specified in section 4.4.3 of RFC8446.
pub(crate) fn construct_server_verify_message(handshake_hash: &hash::Output) -> VerifyMessage {
    VerifyMessage::new(handshake_hash, SERVER_CONSTANT)
}

pub(crate) struct VerifyMessage {
    buf: [u8; MAX_VERIFY_MSG],
    used: usize,
}

impl VerifyMessage {
    fn new(handshake_hash: &hash::Output, context_string_with_0: &[u8; 34]) -> Self {
        let used = 64 + context_string_with_0.len() + handshake_hash.as_ref().len();
        let mut buf = [0x20u8; MAX_VERIFY_MSG];

        let (_spaces, context) = buf.split_at_mut(64);
        let (context, hash) = context.split_at_mut(34);
        context.copy_from_slice(context_string_with_0);
        hash[..handshake_hash.as_ref().len()].copy_from_slice(handshake_hash.as_ref());

        Self { buf, used }
    }
}

impl AsRef<[u8]> for VerifyMessage {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

const SERVER_CONSTANT: &[u8; 34] = b"TLS 1.3, server CertificateVerify\x00";
const MAX_VERIFY_MSG: usize = 64 + SERVER_CONSTANT.len() + hash::Output::MAX_LEN;
