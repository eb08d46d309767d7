//! Key schedule maintenance for TLS1.3

use crate::crypto::hmac;
use crate::crypto::tls13::{HkdfExpander, OkmBlock};
use crate::key_log::KeyLog;
use crate::tls13::Tls13CipherSuite;

// We express the state of a contained KeySchedule using these
// typestates.  This means we can write code that cannot accidentally
// derive a secret from the wrong stage of the schedule, or against a
// transcript checkpoint belonging to another stage.

/// The early stage: the PSK (or the all-zero secret) has been input.
pub(crate) struct KeyScheduleEarly {
    ks: KeySchedule,
}

impl KeyScheduleEarly {
    /// Start the schedule with `psk`, or with the zero secret if there is none.
    pub(crate) fn new(suite: &'static Tls13CipherSuite, psk: Option<&[u8]>) -> Self {
        let ks = match psk {
            Some(psk) => KeySchedule::new(suite, psk),
            None => KeySchedule::new_with_empty_secret(suite),
        };
        Self { ks }
    }

    pub(crate) fn suite(&self) -> &'static Tls13CipherSuite {
        self.ks.suite
    }

    /// `client_early_traffic_secret`, over the transcript through ClientHello.
    pub(crate) fn client_early_traffic_secret(
        &self,
        hs_hash: &[u8],
        key_log: &dyn KeyLog,
        client_random: &[u8; 32],
    ) -> OkmBlock {
        self.ks.derive_logged_secret(
            SecretKind::ClientEarlyTrafficSecret,
            hs_hash,
            key_log,
            client_random,
        )
    }

    /// `early_exporter_master_secret`, over the transcript through ClientHello.
    pub(crate) fn early_exporter_master_secret(
        &self,
        hs_hash: &[u8],
        key_log: &dyn KeyLog,
        client_random: &[u8; 32],
    ) -> OkmBlock {
        self.ks.derive_logged_secret(
            SecretKind::EarlyExporterMasterSecret,
            hs_hash,
            key_log,
            client_random,
        )
    }

    /// Compute a PSK binder over `hs_hash`: the hash of the ClientHello
    /// truncated before its binders.
    pub(crate) fn resumption_psk_binder_key_and_sign_verify_data(
        &self,
        hs_hash: &[u8],
    ) -> hmac::Tag {
        let resumption_psk_binder_key = self
            .ks
            .derive_for_empty_hash(SecretKind::ResumptionPskBinderKey);
        self.ks
            .sign_verify_data(&resumption_psk_binder_key, hs_hash)
    }

    /// Move to the handshake stage, inputting the (EC)DHE shared secret.
    ///
    /// `None` is a PSK-only handshake: the zero secret is input instead.
    pub(crate) fn into_handshake(mut self, shared_secret: Option<&[u8]>) -> KeyScheduleHandshakeStart {
        match shared_secret {
            Some(secret) => self.ks.input_secret(secret),
            None => self.ks.input_empty(),
        }
        KeyScheduleHandshakeStart { ks: self.ks }
    }
}

/// The handshake secret is known, but no traffic secret has been derived from it.
pub(crate) struct KeyScheduleHandshakeStart {
    ks: KeySchedule,
}

impl KeyScheduleHandshakeStart {
    /// Derive both handshake traffic secrets over the transcript through ServerHello.
    pub(crate) fn derive_handshake_secrets(
        self,
        hs_hash: &[u8],
        key_log: &dyn KeyLog,
        client_random: &[u8; 32],
    ) -> KeyScheduleHandshake {
        let client_handshake_traffic_secret = self.ks.derive_logged_secret(
            SecretKind::ClientHandshakeTrafficSecret,
            hs_hash,
            key_log,
            client_random,
        );

        let server_handshake_traffic_secret = self.ks.derive_logged_secret(
            SecretKind::ServerHandshakeTrafficSecret,
            hs_hash,
            key_log,
            client_random,
        );

        KeyScheduleHandshake {
            ks: self.ks,
            client_handshake_traffic_secret,
            server_handshake_traffic_secret,
        }
    }
}

pub(crate) struct KeyScheduleHandshake {
    ks: KeySchedule,
    client_handshake_traffic_secret: OkmBlock,
    server_handshake_traffic_secret: OkmBlock,
}

impl KeyScheduleHandshake {
    pub(crate) fn client_handshake_traffic_secret(&self) -> &OkmBlock {
        &self.client_handshake_traffic_secret
    }

    pub(crate) fn server_handshake_traffic_secret(&self) -> &OkmBlock {
        &self.server_handshake_traffic_secret
    }

    /// The verify_data the server's Finished must carry.
    ///
    /// `hs_hash` covers everything before the server Finished.
    pub(crate) fn sign_server_finish(&self, hs_hash: &[u8]) -> hmac::Tag {
        self.ks
            .sign_verify_data(&self.server_handshake_traffic_secret, hs_hash)
    }

    /// The verify_data of our Finished.
    ///
    /// `hs_hash` covers everything through the server Finished.
    pub(crate) fn sign_client_finish(&self, hs_hash: &[u8]) -> hmac::Tag {
        self.ks
            .sign_verify_data(&self.client_handshake_traffic_secret, hs_hash)
    }

    /// Move to the master secret, deriving the application traffic secrets
    /// and exporter secret over the transcript through the server Finished.
    pub(crate) fn into_traffic(
        mut self,
        hs_hash: &[u8],
        key_log: &dyn KeyLog,
        client_random: &[u8; 32],
    ) -> KeyScheduleTraffic {
        self.ks.input_empty();

        let client_application_traffic_secret = self.ks.derive_logged_secret(
            SecretKind::ClientApplicationTrafficSecret,
            hs_hash,
            key_log,
            client_random,
        );

        let server_application_traffic_secret = self.ks.derive_logged_secret(
            SecretKind::ServerApplicationTrafficSecret,
            hs_hash,
            key_log,
            client_random,
        );

        let exporter_master_secret = self.ks.derive_logged_secret(
            SecretKind::ExporterMasterSecret,
            hs_hash,
            key_log,
            client_random,
        );

        KeyScheduleTraffic {
            ks: self.ks,
            client_application_traffic_secret,
            server_application_traffic_secret,
            exporter_master_secret,
        }
    }
}

/// The master secret stage.
pub(crate) struct KeyScheduleTraffic {
    ks: KeySchedule,
    client_application_traffic_secret: OkmBlock,
    server_application_traffic_secret: OkmBlock,
    exporter_master_secret: OkmBlock,
}

impl KeyScheduleTraffic {
    pub(crate) fn client_application_traffic_secret(&self) -> &OkmBlock {
        &self.client_application_traffic_secret
    }

    pub(crate) fn server_application_traffic_secret(&self) -> &OkmBlock {
        &self.server_application_traffic_secret
    }

    pub(crate) fn exporter_master_secret(&self) -> &OkmBlock {
        &self.exporter_master_secret
    }

    /// Derive `resumption_master_secret` over the transcript through the
    /// client Finished.
    pub(crate) fn resumption(&self, hs_hash: &[u8]) -> KeyScheduleResumption {
        KeyScheduleResumption {
            suite: self.ks.suite,
            resumption_master_secret: self
                .ks
                .derive(SecretKind::ResumptionMasterSecret, hs_hash),
        }
    }
}

pub(crate) struct KeyScheduleResumption {
    suite: &'static Tls13CipherSuite,
    resumption_master_secret: OkmBlock,
}

impl KeyScheduleResumption {
    /// The PSK for a ticket carrying `nonce`.
    ///
    /// ```text
    /// HKDF-Expand-Label(resumption_master_secret, "resumption", ticket_nonce, Hash.length)
    /// ```
    pub(crate) fn derive_ticket_psk(&self, nonce: &[u8]) -> OkmBlock {
        let expander = self
            .suite
            .hkdf()
            .expander_for_okm(&self.resumption_master_secret);
        hkdf_expand_label_block(expander.as_ref(), b"resumption", nonce)
    }
}

/// This is the TLS1.3 key schedule.  It stores the current secret and
/// the suite.  This isn't used directly; but only through the
/// typestates.
struct KeySchedule {
    current: Box<dyn HkdfExpander>,
    suite: &'static Tls13CipherSuite,
}

impl KeySchedule {
    fn new(suite: &'static Tls13CipherSuite, secret: &[u8]) -> Self {
        Self {
            current: suite.hkdf().extract(None, secret),
            suite,
        }
    }

    /// Creates a key schedule without a PSK.
    fn new_with_empty_secret(suite: &'static Tls13CipherSuite) -> Self {
        Self {
            current: suite.hkdf().extract_zeroes(None),
            suite,
        }
    }

    /// Input the empty secret.
    ///
    /// RFC 8446: "If a given secret is not available, then the
    /// 0-value consisting of a string of Hash.length bytes set
    /// to zeros is used."
    fn input_empty(&mut self) {
        let salt = self.derive_for_empty_hash(SecretKind::DerivedSecret);
        self.current = self
            .suite
            .hkdf()
            .extract_zeroes(Some(salt.as_ref()));
    }

    /// Input the given secret.
    fn input_secret(&mut self, secret: &[u8]) {
        let salt = self.derive_for_empty_hash(SecretKind::DerivedSecret);
        self.current = self
            .suite
            .hkdf()
            .extract(Some(salt.as_ref()), secret);
    }

    /// Derive a secret of given `kind`, using current handshake hash `hs_hash`.
    ///
    /// More specifically
    /// ```text
    ///    Derive-Secret(., "derived", Messages)
    /// ```
    /// where `hs_hash` is `Messages`.
    fn derive(&self, kind: SecretKind, hs_hash: &[u8]) -> OkmBlock {
        hkdf_expand_label_block(self.current.as_ref(), kind.to_bytes(), hs_hash)
    }

    fn derive_logged_secret(
        &self,
        kind: SecretKind,
        hs_hash: &[u8],
        key_log: &dyn KeyLog,
        client_random: &[u8; 32],
    ) -> OkmBlock {
        let output = self.derive(kind, hs_hash);

        if let Some(log_label) = kind.log_label() {
            if key_log.will_log(log_label) {
                key_log.log(log_label, client_random, output.as_ref());
            }
        }
        output
    }

    /// Derive a secret of given `kind` using the hash of the empty string
    /// for the handshake hash.
    ///
    /// Useful only for the following `SecretKind`s:
    /// - `SecretKind::ResumptionPskBinderKey`
    /// - `SecretKind::DerivedSecret`
    fn derive_for_empty_hash(&self, kind: SecretKind) -> OkmBlock {
        let empty_hash = self.suite.hash_provider.hash(&[]);
        self.derive(kind, empty_hash.as_ref())
    }

    /// Sign the finished message consisting of `hs_hash` using the key material
    /// `base_key`.
    ///
    /// See RFC 8446 section 4.4.4.
    fn sign_verify_data(&self, base_key: &OkmBlock, hs_hash: &[u8]) -> hmac::Tag {
        let hkdf = self.suite.hkdf();
        let expander = hkdf.expander_for_okm(base_key);
        let hmac_key = hkdf_expand_label_block(expander.as_ref(), b"finished", &[]);

        hkdf.hmac_sign(&hmac_key, hs_hash)
    }
}

/// `HKDF-Expand-Label(secret, label, context, Hash.length)` (RFC8446 section 7.1).
///
/// The `HkdfLabel` structure is passed to the expander in pieces rather
/// than assembled into one buffer.
pub(crate) fn hkdf_expand_label_block(
    expander: &dyn HkdfExpander,
    label: &[u8],
    context: &[u8],
) -> OkmBlock {
    const PREFIX: &[u8] = b"tls13 ";

    let length = (expander.hash_len() as u16).to_be_bytes();
    let label_len = [(PREFIX.len() + label.len()) as u8];
    let context_len = [context.len() as u8];

    expander.expand_block(&[
        &length[..],
        &label_len[..],
        PREFIX,
        label,
        &context_len[..],
        context,
    ])
}

/// The kinds of secret we can extract from `KeySchedule`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SecretKind {
    ResumptionPskBinderKey,
    ClientEarlyTrafficSecret,
    EarlyExporterMasterSecret,
    ClientHandshakeTrafficSecret,
    ServerHandshakeTrafficSecret,
    ClientApplicationTrafficSecret,
    ServerApplicationTrafficSecret,
    ExporterMasterSecret,
    ResumptionMasterSecret,
    DerivedSecret,
}

impl SecretKind {
    fn to_bytes(self) -> &'static [u8] {
        use self::SecretKind::*;
        match self {
            ResumptionPskBinderKey => b"res binder",
            ClientEarlyTrafficSecret => b"c e traffic",
            EarlyExporterMasterSecret => b"e exp master",
            ClientHandshakeTrafficSecret => b"c hs traffic",
            ServerHandshakeTrafficSecret => b"s hs traffic",
            ClientApplicationTrafficSecret => b"c ap traffic",
            ServerApplicationTrafficSecret => b"s ap traffic",
            ExporterMasterSecret => b"exp master",
            ResumptionMasterSecret => b"res master",
            DerivedSecret => b"derived",
        }
    }

    fn log_label(self) -> Option<&'static str> {
        use self::SecretKind::*;
        Some(match self {
            ClientEarlyTrafficSecret => "CLIENT_EARLY_TRAFFIC_SECRET",
            EarlyExporterMasterSecret => "EARLY_EXPORTER_SECRET",
            ClientHandshakeTrafficSecret => "CLIENT_HANDSHAKE_TRAFFIC_SECRET",
            ServerHandshakeTrafficSecret => "SERVER_HANDSHAKE_TRAFFIC_SECRET",
            ClientApplicationTrafficSecret => "CLIENT_TRAFFIC_SECRET_0",
            ServerApplicationTrafficSecret => "SERVER_TRAFFIC_SECRET_0",
            ExporterMasterSecret => "EXPORTER_SECRET",
            _ => {
                return None;
            }
        })
    }
}
