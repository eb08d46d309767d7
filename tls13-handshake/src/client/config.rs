use core::fmt;
use std::sync::Arc;

use pki_types::ServerName;

use crate::crypto::ring::{self, DEFAULT_CIPHER_SUITES, DEFAULT_KX_GROUPS, SUPPORTED_SIG_ALGS};
use crate::crypto::{SecureRandom, SupportedKxGroup};
use crate::key_log::{KeyLog, NoKeyLog};
use crate::msgs::handshake::ClientExtension;
use crate::msgs::persist::NewSessionTicket;
use crate::time_provider::{DefaultTimeProvider, TimeProvider};
use crate::tls13::Tls13CipherSuite;
use crate::verify::{HostnameVerifier, ServerCertVerifier};
use crate::webpki::{WebPkiHostnameVerifier, WebPkiSupportedAlgorithms};

/// Configuration for one or more client handshakes.
///
/// Share one between handshakes as an `Arc<ClientConfig>`.  Build one with
/// [`ClientConfig::new()`], then adjust the public fields.
///
/// # Defaults
///
/// * [`ClientConfig::server_name`]: none; it must be set before a handshake starts.
/// * [`ClientConfig::cipher_suites`]: AES-128-GCM-SHA256, AES-256-GCM-SHA384,
///   CHACHA20-POLY1305-SHA256, in that order.
/// * [`ClientConfig::kx_groups`]: secp256r1 then X25519.
/// * [`ClientConfig::alpn_protocols`]: the default is empty -- no ALPN protocol is negotiated.
/// * [`ClientConfig::resumption`]: none -- every handshake is a full one.
/// * [`ClientConfig::key_log`]: key material is not logged.
#[derive(Clone)]
pub struct ClientConfig {
    /// The name of the server we intend to reach.
    ///
    /// A DNS name is sent as SNI, and every name is matched against the
    /// server's certificate by [`ClientConfig::hostname_verifier`].
    pub server_name: Option<ServerName<'static>>,

    /// Cipher suites to offer, most preferred first.
    pub cipher_suites: Vec<&'static Tls13CipherSuite>,

    /// Key exchange groups to support, most preferred first.
    ///
    /// A key share is sent for the first one only; all are listed in
    /// `supported_groups`.
    pub kx_groups: Vec<&'static dyn SupportedKxGroup>,

    /// Which ALPN protocols we include in our client hello.
    /// If empty, no ALPN extension is sent.
    pub alpn_protocols: Vec<Vec<u8>>,

    /// Additional extensions sent in the ClientHello, after the ones the
    /// engine builds and before any PSK extension.
    ///
    /// Each must be of a type the engine does not already send, and none
    /// may be `pre_shared_key`; `start_handshake` fails otherwise.
    pub extra_extensions: Vec<ClientExtension>,

    /// Send a random 32-byte legacy session id, as middlebox
    /// compatibility mode does (RFC 8446 appendix D.4).
    pub compatibility_mode: bool,

    /// A ticket from an earlier session to offer for resumption.
    ///
    /// Tickets that have expired, or whose suite is not in
    /// [`ClientConfig::cipher_suites`], are not offered.
    pub resumption: Option<NewSessionTicket>,

    /// Also offer the `psk_ke` mode, in which the server may resume
    /// without a fresh key exchange.
    ///
    /// The default is false: only `psk_dhe_ke` is offered, and a server
    /// accepting a PSK without sending a key share is refused.
    pub allow_psk_ke_mode: bool,

    /// How to decide whether the server's certificate chain is trusted.
    pub verifier: Arc<dyn ServerCertVerifier>,

    /// How to decide whether the server's certificate names
    /// [`ClientConfig::server_name`].
    pub hostname_verifier: Arc<dyn HostnameVerifier>,

    /// Which signature schemes can be checked in the server's
    /// CertificateVerify, and with which algorithms.
    pub signature_algorithms: WebPkiSupportedAlgorithms,

    /// Source of randomness for the client random and legacy session id.
    pub secure_random: &'static dyn SecureRandom,

    /// Source of the current time, for certificate validity and ticket ages.
    pub time_provider: Arc<dyn TimeProvider>,

    /// How to output key material for debugging.  The default
    /// does nothing.
    pub key_log: Arc<dyn KeyLog>,
}

impl ClientConfig {
    /// A configuration that validates server certificates with `verifier`,
    /// and uses defaults for everything else.
    pub fn new(verifier: Arc<dyn ServerCertVerifier>) -> Self {
        Self {
            server_name: None,
            cipher_suites: DEFAULT_CIPHER_SUITES.to_vec(),
            kx_groups: DEFAULT_KX_GROUPS.to_vec(),
            alpn_protocols: Vec::new(),
            extra_extensions: Vec::new(),
            compatibility_mode: false,
            resumption: None,
            allow_psk_ke_mode: false,
            verifier,
            hostname_verifier: Arc::new(WebPkiHostnameVerifier),
            signature_algorithms: SUPPORTED_SIG_ALGS,
            secure_random: &ring::Ring,
            time_provider: Arc::new(DefaultTimeProvider),
            key_log: Arc::new(NoKeyLog),
        }
    }

    /// Set [`ClientConfig::server_name`], returning the config.
    pub fn with_server_name(mut self, server_name: ServerName<'static>) -> Self {
        self.server_name = Some(server_name);
        self
    }

    pub(crate) fn find_cipher_suite(
        &self,
        suite: crate::enums::CipherSuite,
    ) -> Option<&'static Tls13CipherSuite> {
        self.cipher_suites
            .iter()
            .copied()
            .find(|scs| scs.suite == suite)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_name", &self.server_name)
            .field("cipher_suites", &self.cipher_suites)
            .field("kx_groups", &self.kx_groups)
            .field("alpn_protocols", &self.alpn_protocols)
            .field("extra_extensions", &self.extra_extensions)
            .field("compatibility_mode", &self.compatibility_mode)
            .field("resumption", &self.resumption)
            .field("allow_psk_ke_mode", &self.allow_psk_ke_mode)
            .field("verifier", &self.verifier)
            .field("hostname_verifier", &self.hostname_verifier)
            .field("signature_algorithms", &self.signature_algorithms)
            .field("key_log", &self.key_log)
            .finish_non_exhaustive()
    }
}
