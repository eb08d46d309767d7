use pki_types::CertificateDer;
use subtle::ConstantTimeEq;

#[cfg(feature = "logging")]
use crate::log::{debug, trace};
use crate::client::client_conn::Status;
use crate::client::hs::{self, ClientContext, ClientHelloDetails, NextStateOrError, State};
use crate::enums::HandshakeType;
use crate::error::{CertificateError, Error, PeerMisbehaved};
use crate::hash_hs::{Checkpoint, HandshakeHash};
use crate::msgs::enums::ExtensionType;
use crate::msgs::handshake::{HandshakePayload, ServerExtension};
use crate::msgs::message::HandshakeMessage;
use crate::msgs::persist::NewSessionTicket;
use crate::tls13::key_schedule::{KeyScheduleHandshake, KeyScheduleResumption};
use crate::tls13::{construct_server_verify_message, Tls13CipherSuite};
use crate::verify;
use crate::webpki::verify_tls13_signature;

// Extensions we expect in plaintext in the ServerHello.
static DISALLOWED_TLS13_EXTS: &[ExtensionType] = &[
    ExtensionType::PreSharedKey,
    ExtensionType::KeyShare,
    ExtensionType::SupportedVersions,
];

fn validate_encrypted_extensions(
    hello: &ClientHelloDetails,
    exts: &[ServerExtension],
) -> Result<(), Error> {
    if crate::msgs::handshake::has_duplicates(exts.iter().map(|ext| ext.ext_type())) {
        return Err(PeerMisbehaved::DuplicateEncryptedExtensions.into());
    }

    if exts
        .iter()
        .any(|ext| DISALLOWED_TLS13_EXTS.contains(&ext.ext_type()))
    {
        return Err(PeerMisbehaved::DisallowedEncryptedExtension.into());
    }

    // Extensions we don't understand pass through for the caller to judge.
    let understood = exts
        .iter()
        .filter(|ext| !matches!(ext, ServerExtension::Unknown(_)))
        .map(|ext| ext.ext_type())
        .collect::<Vec<_>>();
    if hello.server_sent_unsolicited_extensions(&understood, &[]) {
        return Err(PeerMisbehaved::UnsolicitedEncryptedExtension.into());
    }

    Ok(())
}

fn process_alpn_protocol(
    hello: &ClientHelloDetails,
    exts: &[ServerExtension],
) -> Result<Option<Vec<u8>>, Error> {
    let protocols = exts.iter().find_map(|ext| match ext {
        ServerExtension::Protocols(protocols) => Some(protocols),
        _ => None,
    });

    let selected = match protocols {
        None => return Ok(None),
        Some(protocols) if protocols.len() == 1 => protocols[0].as_ref(),
        Some(_) => return Err(PeerMisbehaved::SelectedUnofferedApplicationProtocol.into()),
    };

    if !hello
        .alpn_protocols
        .iter()
        .any(|offered| offered.as_slice() == selected)
    {
        return Err(PeerMisbehaved::SelectedUnofferedApplicationProtocol.into());
    }

    debug!("ALPN protocol is {:?}", selected);
    Ok(Some(selected.to_vec()))
}

pub(super) struct ExpectEncryptedExtensions {
    pub(super) hello: ClientHelloDetails,
    pub(super) random: [u8; 32],
    pub(super) suite: &'static Tls13CipherSuite,
    pub(super) psk_accepted: bool,
    pub(super) transcript: HandshakeHash,
    pub(super) key_schedule: KeyScheduleHandshake,
}

impl State for ExpectEncryptedExtensions {
    fn handle(mut self: Box<Self>, cx: &mut ClientContext<'_>, m: HandshakeMessage) -> NextStateOrError {
        let exts = require_handshake_msg!(
            m,
            HandshakeType::EncryptedExtensions,
            HandshakePayload::EncryptedExtensions
        )?;
        debug!("TLS1.3 encrypted extensions: {:?}", exts);

        validate_encrypted_extensions(&self.hello, exts)?;
        let alpn_protocol = process_alpn_protocol(&self.hello, exts)?;
        self.transcript
            .add_message(&m, Checkpoint::EncryptedExtensions);

        cx.data.alpn_protocol = alpn_protocol;
        cx.data.received_extensions = exts.clone();
        cx.events.extensions_received(exts);

        if self.psk_accepted {
            // We *don't* verify a certificate chain here: resumption is a
            // continuation of the previous session in terms of security policy.
            let cert_verified = verify::ServerCertVerified::assertion();
            let sig_verified = verify::HandshakeSignatureValid::assertion();
            Ok(Box::new(ExpectFinished {
                random: self.random,
                suite: self.suite,
                transcript: self.transcript,
                key_schedule: self.key_schedule,
                verified_at: Checkpoint::EncryptedExtensions,
                _cert_verified: cert_verified,
                _sig_verified: sig_verified,
            }))
        } else {
            Ok(Box::new(ExpectCertificate {
                hello: self.hello,
                random: self.random,
                suite: self.suite,
                transcript: self.transcript,
                key_schedule: self.key_schedule,
            }))
        }
    }

    fn status(&self) -> Status {
        Status::ServerHelloReceived
    }
}

struct ExpectCertificate {
    hello: ClientHelloDetails,
    random: [u8; 32],
    suite: &'static Tls13CipherSuite,
    transcript: HandshakeHash,
    key_schedule: KeyScheduleHandshake,
}

impl State for ExpectCertificate {
    fn handle(mut self: Box<Self>, cx: &mut ClientContext<'_>, m: HandshakeMessage) -> NextStateOrError {
        let cert_chain = require_handshake_msg!(
            m,
            HandshakeType::Certificate,
            HandshakePayload::CertificateTls13
        )?;

        // This is only non-empty for client auth.
        if !cert_chain.context.0.is_empty() {
            return Err(PeerMisbehaved::IllegalCertificateRequestContext.into());
        }

        // We offered no extensions that a server may echo per certificate.
        if cert_chain.any_entry_has_extension() {
            return Err(PeerMisbehaved::UnsolicitedCertExtension.into());
        }

        let server_cert_chain = cert_chain.clone().into_certificate_chain();
        if server_cert_chain.is_empty() {
            return Err(PeerMisbehaved::NoCertificatesPresented.into());
        }
        trace!("Server cert chain has {} certificates", server_cert_chain.len());

        self.transcript
            .add_message(&m, Checkpoint::Certificate);
        cx.data.server_cert_chain = server_cert_chain.clone();

        Ok(Box::new(ExpectCertificateVerify {
            hello: self.hello,
            random: self.random,
            suite: self.suite,
            transcript: self.transcript,
            key_schedule: self.key_schedule,
            server_cert_chain,
        }))
    }

    fn status(&self) -> Status {
        Status::EncryptedExtensionsReceived
    }
}

struct ExpectCertificateVerify {
    hello: ClientHelloDetails,
    random: [u8; 32],
    suite: &'static Tls13CipherSuite,
    transcript: HandshakeHash,
    key_schedule: KeyScheduleHandshake,
    server_cert_chain: Vec<CertificateDer<'static>>,
}

impl State for ExpectCertificateVerify {
    fn handle(mut self: Box<Self>, cx: &mut ClientContext<'_>, m: HandshakeMessage) -> NextStateOrError {
        let cert_verify = require_handshake_msg!(
            m,
            HandshakeType::CertificateVerify,
            HandshakePayload::CertificateVerify
        )?;

        if !self
            .hello
            .signature_schemes
            .contains(&cert_verify.scheme)
        {
            return Err(PeerMisbehaved::SignedHandshakeWithUnadvertisedSigScheme.into());
        }

        let (end_entity, intermediates) = self
            .server_cert_chain
            .split_first()
            .ok_or(PeerMisbehaved::NoCertificatesPresented)?;

        // 1. Verify their signature on the handshake.
        let handshake_hash = self
            .transcript
            .checkpoint(Checkpoint::Certificate)?;
        let sig_verified = verify_tls13_signature(
            construct_server_verify_message(&handshake_hash).as_ref(),
            end_entity,
            cert_verify,
            &cx.config.signature_algorithms,
        )?;

        // 2. Verify the certificate chain.
        let now = cx
            .config
            .time_provider
            .current_time()
            .ok_or(Error::FailedToGetCurrentTime)?;
        let cert_verified = cx
            .config
            .verifier
            .verify_server_cert(end_entity, intermediates, now)?;

        // 3. Verify it names the server we wanted.
        if !cx
            .config
            .hostname_verifier
            .verify_hostname(&self.hello.server_name, end_entity)
        {
            return Err(CertificateError::NotValidForName.into());
        }

        self.transcript
            .add_message(&m, Checkpoint::CertificateVerify);

        Ok(Box::new(ExpectFinished {
            random: self.random,
            suite: self.suite,
            transcript: self.transcript,
            key_schedule: self.key_schedule,
            verified_at: Checkpoint::CertificateVerify,
            _cert_verified: cert_verified,
            _sig_verified: sig_verified,
        }))
    }

    fn status(&self) -> Status {
        Status::CertificateReceived
    }
}

struct ExpectFinished {
    random: [u8; 32],
    suite: &'static Tls13CipherSuite,
    transcript: HandshakeHash,
    key_schedule: KeyScheduleHandshake,
    /// The last message the server's Finished covers.
    verified_at: Checkpoint,
    _cert_verified: verify::ServerCertVerified,
    _sig_verified: verify::HandshakeSignatureValid,
}

impl State for ExpectFinished {
    fn handle(self: Box<Self>, cx: &mut ClientContext<'_>, m: HandshakeMessage) -> NextStateOrError {
        let mut st = *self;
        let finished =
            require_handshake_msg!(m, HandshakeType::Finished, HandshakePayload::Finished)?;

        let handshake_hash = st.transcript.checkpoint(st.verified_at)?;
        let expect_verify_data = st
            .key_schedule
            .sign_server_finish(handshake_hash.as_ref());

        let matches = expect_verify_data
            .as_ref()
            .ct_eq(finished.bytes());
        let _fin = match bool::from(matches) {
            true => verify::FinishedMessageVerified::assertion(),
            false => return Err(Error::DecryptError),
        };

        st.transcript
            .add_message(&m, Checkpoint::ServerFinished);
        let hash_after_server_finished = st
            .transcript
            .checkpoint(Checkpoint::ServerFinished)?;

        let verify_data = st
            .key_schedule
            .sign_client_finish(hash_after_server_finished.as_ref());
        let client_finished = hs::finished_message(verify_data.as_ref());
        cx.send_msg(&client_finished)?;
        st.transcript
            .add_message(&client_finished, Checkpoint::ClientFinished);
        let hash_after_client_finished = st
            .transcript
            .checkpoint(Checkpoint::ClientFinished)?;

        let key_schedule_traffic = st.key_schedule.into_traffic(
            hash_after_server_finished.as_ref(),
            &*cx.config.key_log,
            &st.random,
        );
        let resumption = key_schedule_traffic.resumption(hash_after_client_finished.as_ref());

        let secrets = &mut cx.data.secrets;
        secrets.client_application_traffic_secret =
            Some(key_schedule_traffic.client_application_traffic_secret().clone());
        secrets.server_application_traffic_secret =
            Some(key_schedule_traffic.server_application_traffic_secret().clone());
        secrets.exporter_master_secret = Some(key_schedule_traffic.exporter_master_secret().clone());
        debug!("Handshake finished with {:?}", st.suite.suite);
        cx.events.handshake_finished();

        Ok(Box::new(ExpectTraffic {
            suite: st.suite,
            resumption,
        }))
    }

    fn status(&self) -> Status {
        match self.verified_at {
            Checkpoint::EncryptedExtensions => Status::EncryptedExtensionsReceived,
            _ => Status::CertificateVerifyReceived,
        }
    }
}

// -- Traffic transit state (TLS1.3) --
// In this state we can be sent tickets.
struct ExpectTraffic {
    /// The suite this session negotiated, which new tickets are bound to.
    suite: &'static Tls13CipherSuite,
    resumption: KeyScheduleResumption,
}

impl State for ExpectTraffic {
    fn handle(self: Box<Self>, cx: &mut ClientContext<'_>, m: HandshakeMessage) -> NextStateOrError {
        let nst = require_handshake_msg!(
            m,
            HandshakeType::NewSessionTicket,
            HandshakePayload::NewSessionTicketTls13
        )?;

        if nst.has_duplicate_extension() {
            return Err(PeerMisbehaved::DuplicateNewSessionTicketExtensions.into());
        }

        let now = cx
            .config
            .time_provider
            .current_time()
            .ok_or(Error::FailedToGetCurrentTime)?;
        let psk = self
            .resumption
            .derive_ticket_psk(&nst.nonce.0);
        let ticket = NewSessionTicket::new(
            self.suite.suite,
            nst,
            psk.as_ref().to_vec(),
            now,
        );
        debug!("Ticket received, lifetime {}s", nst.lifetime);

        cx.data.tickets.push(ticket.clone());
        cx.events.new_session_ticket(ticket);
        Ok(self)
    }

    fn status(&self) -> Status {
        Status::Finished
    }
}
