use pki_types::ServerName;

#[cfg(feature = "logging")]
use crate::log::{debug, trace, warn};
use crate::client::client_conn::{HandshakeData, Status};
use crate::client::config::ClientConfig;
use crate::client::events::{MessageSender, StatusEvents};
use crate::client::tls13;
use crate::crypto::ActiveKeyExchange;
use crate::enums::{HandshakeType, ProtocolVersion, SignatureScheme};
use crate::error::{ApiMisuse, Error, OtherError, PeerIncompatible, PeerMisbehaved};
use crate::hash_hs::{Checkpoint, HandshakeHashBuffer};
use crate::msgs::base::Payload;
use crate::msgs::enums::{Compression, ExtensionType, PskKeyExchangeMode};
use crate::msgs::handshake::{
    ClientExtension, ClientHelloPayload, HandshakeMessagePayload, HandshakePayload, KeyShareEntry,
    PresharedKeyIdentity, PresharedKeyOffer, ProtocolName, Random, SessionId,
};
use crate::msgs::message::HandshakeMessage;
use crate::msgs::persist::NewSessionTicket;
use crate::tls13::key_schedule::KeyScheduleEarly;
use crate::tls13::Tls13CipherSuite;

pub(super) type NextState = Box<dyn State>;
pub(super) type NextStateOrError = Result<NextState, Error>;

/// One state of the client handshake.
///
/// `handle` consumes the state: on success it yields the next one, on
/// error the handshake is over.
pub(crate) trait State: Send {
    fn handle(self: Box<Self>, cx: &mut ClientContext<'_>, m: HandshakeMessage) -> NextStateOrError;

    fn status(&self) -> Status;
}

/// Everything a state may touch besides itself.
pub(crate) struct ClientContext<'a> {
    pub(crate) config: &'a ClientConfig,
    pub(crate) sender: &'a mut dyn MessageSender,
    pub(crate) events: &'a mut dyn StatusEvents,
    pub(crate) data: &'a mut HandshakeData,
}

impl ClientContext<'_> {
    pub(crate) fn send_msg(&mut self, m: &HandshakeMessage) -> Result<(), Error> {
        trace!("Sending {:?}", m.parsed);
        self.sender
            .send(m.bytes())
            .map_err(|e| Error::Io(OtherError::new(e)))
    }
}

/// What we offered in our ClientHello, for checking the server's choices
/// against.
pub(super) struct ClientHelloDetails {
    pub(super) server_name: ServerName<'static>,
    pub(super) sent_extensions: Vec<ExtensionType>,
    pub(super) session_id: SessionId,
    pub(super) signature_schemes: Vec<SignatureScheme>,
    pub(super) alpn_protocols: Vec<Vec<u8>>,
}

impl ClientHelloDetails {
    fn new(server_name: ServerName<'static>, ch: &ClientHelloPayload, schemes: &[SignatureScheme]) -> Self {
        Self {
            server_name,
            sent_extensions: ch
                .extensions
                .iter()
                .map(ClientExtension::ext_type)
                .collect(),
            session_id: ch.session_id,
            signature_schemes: schemes.to_vec(),
            alpn_protocols: Vec::new(),
        }
    }

    pub(super) fn server_sent_unsolicited_extensions(
        &self,
        received_exts: &[ExtensionType],
        allowed_unsolicited: &[ExtensionType],
    ) -> bool {
        received_exts.iter().any(|ext| {
            !allowed_unsolicited.contains(ext) && !self.sent_extensions.contains(ext)
        })
    }
}

/// A resumption ticket we decided to offer.
pub(super) struct Resumption {
    pub(super) ticket: NewSessionTicket,
    pub(super) suite: &'static Tls13CipherSuite,
}

fn check_signature_schemes(
    config: &ClientConfig,
    schemes: &[SignatureScheme],
) -> Result<(), Error> {
    if schemes.is_empty() {
        return Err(ApiMisuse::NoSignatureSchemes.into());
    }

    match schemes
        .iter()
        .find(|scheme| !config.signature_algorithms.supports_scheme(**scheme))
    {
        Some(scheme) => Err(ApiMisuse::UnverifiableSignatureScheme(*scheme).into()),
        None => Ok(()),
    }
}

/// Pick the configured ticket, if it can still be offered.
fn find_resumption(config: &ClientConfig) -> Result<Option<Resumption>, Error> {
    let ticket = match &config.resumption {
        Some(ticket) => ticket,
        None => return Ok(None),
    };

    let suite = match config.find_cipher_suite(ticket.suite()) {
        Some(suite) => suite,
        None => {
            warn!(
                "Not resuming: ticket cipher suite {:?} is not configured",
                ticket.suite()
            );
            return Ok(None);
        }
    };

    let now = config
        .time_provider
        .current_time()
        .ok_or(Error::FailedToGetCurrentTime)?;
    if ticket.has_expired(now) {
        warn!("Not resuming: ticket has expired");
        return Ok(None);
    }

    Ok(Some(Resumption {
        ticket: ticket.clone(),
        suite,
    }))
}

/// Build and send the ClientHello, derive the early secrets, and return the
/// state that waits for the ServerHello.
pub(super) fn start_handshake(
    cx: &mut ClientContext<'_>,
    signature_schemes: &[SignatureScheme],
) -> NextStateOrError {
    let config = cx.config;

    let server_name = config
        .server_name
        .clone()
        .ok_or(ApiMisuse::NoServerNameConfigured)?;
    let first_suite = *config
        .cipher_suites
        .first()
        .ok_or(ApiMisuse::NoCipherSuitesConfigured)?;
    let first_group = *config
        .kx_groups
        .first()
        .ok_or(ApiMisuse::NoKeyExchangeGroupsConfigured)?;
    check_signature_schemes(config, signature_schemes)?;

    let random = crate::rand::random_array::<32>(config.secure_random)?;
    let session_id = match config.compatibility_mode {
        true => SessionId::new(crate::rand::random_array::<32>(config.secure_random)?),
        false => SessionId::empty(),
    };

    let resuming = find_resumption(config)?;
    let kx = first_group.start()?;

    let mut exts = vec![ClientExtension::SupportedVersions(vec![ProtocolVersion::TLSv1_3])];
    if let ServerName::DnsName(dns_name) = &server_name {
        exts.push(ClientExtension::make_sni(dns_name));
    }
    exts.push(ClientExtension::NamedGroups(
        config
            .kx_groups
            .iter()
            .map(|group| group.name())
            .collect(),
    ));
    exts.push(ClientExtension::SignatureAlgorithms(
        signature_schemes.to_vec(),
    ));
    exts.push(ClientExtension::KeyShare(vec![KeyShareEntry::new(
        kx.group(),
        kx.pub_key(),
    )]));
    if !config.alpn_protocols.is_empty() {
        exts.push(ClientExtension::Protocols(
            config
                .alpn_protocols
                .iter()
                .cloned()
                .map(ProtocolName::from)
                .collect(),
        ));
    }

    let mut psk_modes = vec![PskKeyExchangeMode::PSK_DHE_KE];
    if config.allow_psk_ke_mode {
        psk_modes.push(PskKeyExchangeMode::PSK_KE);
    }
    exts.push(ClientExtension::PresharedKeyModes(psk_modes));
    for extra in &config.extra_extensions {
        let typ = extra.ext_type();
        if typ == ExtensionType::PreSharedKey || exts.iter().any(|ext| ext.ext_type() == typ) {
            return Err(ApiMisuse::ConflictingExtraExtension(typ).into());
        }
        exts.push(extra.clone());
    }

    // The PSK extension must be last: its binder covers everything before it.
    if let Some(resuming) = &resuming {
        let now = config
            .time_provider
            .current_time()
            .ok_or(Error::FailedToGetCurrentTime)?;
        let obfuscated_ticket_age = resuming.ticket.obfuscated_ticket_age(now);
        let binder_len = resuming.suite.hash_provider.output_len();
        let identity = PresharedKeyIdentity::new(resuming.ticket.ticket().to_vec(), obfuscated_ticket_age);
        exts.push(ClientExtension::PresharedKey(PresharedKeyOffer::new(
            identity,
            vec![0u8; binder_len],
        )));
        debug!("Offering resumption with suite {:?}", resuming.suite.suite);
    }

    let chp = ClientHelloPayload {
        client_version: ProtocolVersion::TLSv1_2,
        random: Random::from(random),
        session_id,
        cipher_suites: config
            .cipher_suites
            .iter()
            .map(|scs| scs.suite)
            .collect(),
        compression_methods: vec![Compression::Null],
        extensions: exts,
    };

    let mut hello = ClientHelloDetails::new(server_name, &chp, signature_schemes);
    hello.alpn_protocols = config.alpn_protocols.clone();

    let mut chp = HandshakeMessagePayload {
        typ: HandshakeType::ClientHello,
        payload: HandshakePayload::ClientHello(chp),
    };

    let mut transcript_buffer = HandshakeHashBuffer::new();
    let early_key_schedule = match &resuming {
        Some(resuming) => fill_in_psk_binder(resuming, &transcript_buffer, &mut chp),
        None => KeyScheduleEarly::new(first_suite, None),
    };

    let ch = HandshakeMessage::from(chp);
    cx.send_msg(&ch)?;
    transcript_buffer.add_message(&ch);

    let hash = transcript_buffer.get_hash_given(early_key_schedule.suite().hash_provider, &[]);
    let key_log = &*config.key_log;
    cx.data.client_random = random;
    cx.data.secrets.client_early_traffic_secret = Some(
        early_key_schedule.client_early_traffic_secret(hash.as_ref(), key_log, &random),
    );
    cx.data.secrets.early_exporter_master_secret = Some(
        early_key_schedule.early_exporter_master_secret(hash.as_ref(), key_log, &random),
    );
    cx.events.early_secrets_available();

    Ok(Box::new(ExpectServerHello {
        hello,
        resuming,
        random,
        transcript_buffer,
        early_key_schedule,
        offered_key_share: kx,
    }))
}

/// Compute the PSK binder over the ClientHello truncated before its binders,
/// and write it in place of the placeholder.
fn fill_in_psk_binder(
    resuming: &Resumption,
    transcript: &HandshakeHashBuffer,
    hmp: &mut HandshakeMessagePayload,
) -> KeyScheduleEarly {
    let suite = resuming.suite;
    let binder_plaintext = hmp.get_encoding_for_binder_signing();
    let handshake_hash = transcript.get_hash_given(suite.hash_provider, &binder_plaintext);

    let key_schedule = KeyScheduleEarly::new(suite, Some(resuming.ticket.psk()));
    let real_binder =
        key_schedule.resumption_psk_binder_key_and_sign_verify_data(handshake_hash.as_ref());

    if let HandshakePayload::ClientHello(ch) = &mut hmp.payload {
        ch.set_psk_binder(real_binder.as_ref());
    }

    key_schedule
}

struct ExpectServerHello {
    hello: ClientHelloDetails,
    resuming: Option<Resumption>,
    random: [u8; 32],
    transcript_buffer: HandshakeHashBuffer,
    early_key_schedule: KeyScheduleEarly,
    offered_key_share: Box<dyn ActiveKeyExchange>,
}

// Extensions we allow in ServerHello.
static ALLOWED_SERVER_HELLO_EXTS: &[ExtensionType] = &[
    ExtensionType::KeyShare,
    ExtensionType::PreSharedKey,
    ExtensionType::SupportedVersions,
];

impl State for ExpectServerHello {
    fn handle(self: Box<Self>, cx: &mut ClientContext<'_>, m: HandshakeMessage) -> NextStateOrError {
        if let HandshakePayload::HelloRetryRequest(_) = &m.parsed.payload {
            return Err(PeerIncompatible::ServerSentHelloRetryRequest.into());
        }

        let server_hello =
            require_handshake_msg!(m, HandshakeType::ServerHello, HandshakePayload::ServerHello)?;
        trace!("We got ServerHello {:?}", server_hello);

        match server_hello.supported_versions() {
            None => return Err(PeerMisbehaved::MissingSupportedVersionsExtension.into()),
            Some(ProtocolVersion::TLSv1_3) => {}
            Some(_) => return Err(PeerMisbehaved::SelectedUnofferedVersion.into()),
        }

        if server_hello.key_share().is_none() && server_hello.psk_index().is_none() {
            return Err(PeerMisbehaved::MissingKeyShare.into());
        }

        if server_hello.has_duplicate_extension() {
            return Err(PeerMisbehaved::DuplicateServerHelloExtensions.into());
        }

        if server_hello
            .extensions
            .iter()
            .any(|ext| !ALLOWED_SERVER_HELLO_EXTS.contains(&ext.ext_type()))
        {
            return Err(PeerMisbehaved::DisallowedServerHelloExtension.into());
        }

        if server_hello.session_id != self.hello.session_id {
            return Err(PeerMisbehaved::ServerEchoedWrongSessionId.into());
        }

        if server_hello.compression_method != Compression::Null {
            return Err(PeerMisbehaved::SelectedUnofferedCompression.into());
        }

        let suite = cx
            .config
            .find_cipher_suite(server_hello.cipher_suite)
            .ok_or(PeerMisbehaved::SelectedUnofferedCipherSuite)?;
        debug!("Using ciphersuite {:?}", suite);

        let psk_accepted = match (server_hello.psk_index(), &self.resuming) {
            (None, _) => false,
            (Some(_), None) => return Err(PeerMisbehaved::SelectedUnofferedPsk.into()),
            (Some(0), Some(resuming)) => {
                if !suite.can_resume_from(resuming.suite) {
                    return Err(PeerMisbehaved::ResumptionOfferedWithIncompatibleCipherSuite.into());
                }
                debug!("Resuming using PSK");
                true
            }
            (Some(_), Some(_)) => return Err(PeerMisbehaved::SelectedInvalidPsk.into()),
        };

        let shared_secret = match server_hello.key_share() {
            Some(their_key_share) => {
                if their_key_share.group != self.offered_key_share.group() {
                    return Err(PeerMisbehaved::SelectedUnofferedKxGroup.into());
                }
                Some(
                    self.offered_key_share
                        .complete(&their_key_share.payload.0)?,
                )
            }
            None if psk_accepted && cx.config.allow_psk_ke_mode => None,
            None => return Err(PeerMisbehaved::MissingKeyShare.into()),
        };

        let key_schedule_early = match psk_accepted {
            true => self.early_key_schedule,
            false => KeyScheduleEarly::new(suite, None),
        };
        let key_schedule_pre_handshake = key_schedule_early.into_handshake(
            shared_secret
                .as_ref()
                .map(|ss| ss.secret_bytes()),
        );

        let mut transcript = self
            .transcript_buffer
            .start_hash(suite.hash_provider);
        transcript.add_message(&m, Checkpoint::ServerHello);
        let hash_at_server_hello = transcript.checkpoint(Checkpoint::ServerHello)?;

        let key_schedule = key_schedule_pre_handshake.derive_handshake_secrets(
            hash_at_server_hello.as_ref(),
            &*cx.config.key_log,
            &self.random,
        );

        let data = &mut *cx.data;
        data.suite = Some(suite);
        data.psk_accepted = psk_accepted;
        data.secrets.client_handshake_traffic_secret =
            Some(key_schedule.client_handshake_traffic_secret().clone());
        data.secrets.server_handshake_traffic_secret =
            Some(key_schedule.server_handshake_traffic_secret().clone());
        cx.events.handshake_secrets_available();

        Ok(Box::new(tls13::ExpectEncryptedExtensions {
            hello: self.hello,
            random: self.random,
            suite,
            psk_accepted,
            transcript,
            key_schedule,
        }))
    }

    fn status(&self) -> Status {
        Status::ClientHelloSent
    }
}

/// A Finished message carrying `verify_data`.
pub(super) fn finished_message(verify_data: &[u8]) -> HandshakeMessage {
    HandshakeMessage::from(HandshakeMessagePayload {
        typ: HandshakeType::Finished,
        payload: HandshakePayload::Finished(Payload::new(verify_data)),
    })
}
