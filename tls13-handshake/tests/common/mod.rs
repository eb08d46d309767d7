#![allow(dead_code)]

pub use std::sync::Arc;
use std::sync::Mutex;

use pki_types::{CertificateDer, ServerName};
use ring::rand::SystemRandom;
use ring::{digest, hmac, signature};
use tls13_handshake::crypto::ring::TLS13_AES_128_GCM_SHA256;
use tls13_handshake::crypto::{
    ActiveKeyExchange, GetRandomFailed, NamedGroup, SecureRandom, SharedSecret, SupportedKxGroup,
};
use tls13_handshake::internal::msgs::base::Payload;
use tls13_handshake::internal::msgs::enums::Compression;
use tls13_handshake::internal::msgs::handshake::{
    CertificatePayloadTls13, ClientHelloPayload, DigitallySignedStruct, HandshakeMessagePayload,
    HandshakePayload, KeyShareEntry, NewSessionTicketPayloadTls13, Random, ServerExtension,
    ServerHelloPayload, SessionId,
};
use tls13_handshake::{
    CipherSuite, ClientConfig, ClientHandshake, Error, HandshakeMessage, HandshakeType,
    MessageSender, NewSessionTicket, PeerMisbehaved, ProtocolVersion, RootCertStore,
    SignatureScheme, StatusEvents, WebPkiServerVerifier,
};

/// A CA and a `localhost` end-entity certificate it issued.
pub struct Pki {
    pub ca: CertificateDer<'static>,
    pub end_entity: CertificateDer<'static>,
    pub end_entity_pkcs8: Vec<u8>,
}

impl Pki {
    pub fn new() -> Self {
        Self::for_names(vec!["localhost".to_string()])
    }

    pub fn for_names(names: Vec<String>) -> Self {
        let ca_key = rcgen::KeyPair::generate().unwrap();
        let mut ca_params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params.distinguished_name = rcgen::DistinguishedName::new();
        ca_params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "tls13-handshake test CA");
        ca_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        ca_params.key_usages = vec![
            rcgen::KeyUsagePurpose::KeyCertSign,
            rcgen::KeyUsagePurpose::DigitalSignature,
        ];
        let ca_cert = ca_params.self_signed(&ca_key).unwrap();

        let ee_key = rcgen::KeyPair::generate().unwrap();
        let mut ee_params = rcgen::CertificateParams::new(names).unwrap();
        ee_params.distinguished_name = rcgen::DistinguishedName::new();
        ee_params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "tls13-handshake test server");
        ee_params.extended_key_usages = vec![rcgen::ExtendedKeyUsagePurpose::ServerAuth];
        let ee_cert = ee_params
            .signed_by(&ee_key, &ca_cert, &ca_key)
            .unwrap();

        Self {
            ca: ca_cert.der().clone(),
            end_entity: ee_cert.der().clone(),
            end_entity_pkcs8: ee_key.serialize_der(),
        }
    }

    pub fn roots(&self) -> RootCertStore {
        let mut roots = RootCertStore::empty();
        roots.add(self.ca.clone()).unwrap();
        roots
    }
}

/// Fills every buffer with 0x11.
#[derive(Debug)]
pub struct FixedRandom;

pub static FIXED_RANDOM: FixedRandom = FixedRandom;

impl SecureRandom for FixedRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed> {
        buf.fill(0x11);
        Ok(())
    }
}

pub const CLIENT_SHARE: [u8; 32] = [0xc1; 32];
pub const SERVER_SHARE: [u8; 32] = [0x51; 32];
pub const SHARED_SECRET: [u8; 32] = [0x5e; 32];

/// A key exchange with fixed shares and a fixed shared secret, posing as X25519.
#[derive(Debug)]
pub struct FakeKxGroup;

pub static FAKE_KX_GROUP: FakeKxGroup = FakeKxGroup;

impl SupportedKxGroup for FakeKxGroup {
    fn start(&self) -> Result<Box<dyn ActiveKeyExchange>, Error> {
        Ok(Box::new(FakeKx))
    }

    fn name(&self) -> NamedGroup {
        NamedGroup::X25519
    }
}

struct FakeKx;

impl ActiveKeyExchange for FakeKx {
    fn complete(self: Box<Self>, peer_pub_key: &[u8]) -> Result<SharedSecret, Error> {
        match peer_pub_key == &SERVER_SHARE[..] {
            true => Ok(SharedSecret::from(&SHARED_SECRET[..])),
            false => Err(PeerMisbehaved::InvalidKeyShare.into()),
        }
    }

    fn pub_key(&self) -> &[u8] {
        &CLIENT_SHARE
    }

    fn group(&self) -> NamedGroup {
        NamedGroup::X25519
    }
}

#[derive(Clone, Default)]
pub struct SentMessages(Arc<Mutex<Vec<Vec<u8>>>>);

impl SentMessages {
    pub fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl MessageSender for SentMessages {
    fn send(&mut self, message: &[u8]) -> std::io::Result<()> {
        self.0
            .lock()
            .unwrap()
            .push(message.to_vec());
        Ok(())
    }
}

/// A sender whose transport is gone.
pub struct BrokenPipe;

impl MessageSender for BrokenPipe {
    fn send(&mut self, _message: &[u8]) -> std::io::Result<()> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }
}

#[derive(Debug)]
pub enum Event {
    EarlySecrets,
    HandshakeSecrets,
    Extensions(Vec<ServerExtension>),
    Finished,
    Ticket(NewSessionTicket),
}

#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<Event>>>);

impl Events {
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

impl StatusEvents for Events {
    fn early_secrets_available(&mut self) {
        self.push(Event::EarlySecrets);
    }

    fn handshake_secrets_available(&mut self) {
        self.push(Event::HandshakeSecrets);
    }

    fn extensions_received(&mut self, extensions: &[ServerExtension]) {
        self.push(Event::Extensions(extensions.to_vec()));
    }

    fn handshake_finished(&mut self) {
        self.push(Event::Finished);
    }

    fn new_session_ticket(&mut self, ticket: NewSessionTicket) {
        self.push(Event::Ticket(ticket));
    }
}

pub const SCHEMES: &[SignatureScheme] = &[SignatureScheme::ECDSA_NISTP256_SHA256];

/// A config trusting `pki`, naming `localhost`, with one suite and
/// deterministic randomness and key exchange.
pub fn make_config(pki: &Pki) -> ClientConfig {
    let mut config = ClientConfig::new(Arc::new(WebPkiServerVerifier::new(pki.roots())))
        .with_server_name(ServerName::try_from("localhost").unwrap());
    config.cipher_suites = vec![TLS13_AES_128_GCM_SHA256];
    config.kx_groups = vec![&FAKE_KX_GROUP as &'static dyn SupportedKxGroup];
    config.secure_random = &FIXED_RANDOM;
    config
}

pub fn make_handshake(config: ClientConfig) -> (ClientHandshake, SentMessages, Events) {
    let sent = SentMessages::default();
    let events = Events::default();
    let hs = ClientHandshake::new(
        Arc::new(config),
        Box::new(sent.clone()),
        Box::new(events.clone()),
    );
    (hs, sent, events)
}

/// The TLS1.3 key schedule, done directly with *ring*.
pub struct Oracle {
    digest: &'static digest::Algorithm,
    hmac: hmac::Algorithm,
}

impl Oracle {
    pub fn for_suite(suite: CipherSuite) -> Self {
        match suite {
            CipherSuite::TLS13_AES_256_GCM_SHA384 => Self {
                digest: &digest::SHA384,
                hmac: hmac::HMAC_SHA384,
            },
            _ => Self {
                digest: &digest::SHA256,
                hmac: hmac::HMAC_SHA256,
            },
        }
    }

    pub fn hash_len(&self) -> usize {
        self.digest.output_len()
    }

    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        digest::digest(self.digest, data)
            .as_ref()
            .to_vec()
    }

    pub fn hmac(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        hmac::sign(&hmac::Key::new(self.hmac, key), data)
            .as_ref()
            .to_vec()
    }

    pub fn extract(&self, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
        self.hmac(salt, ikm)
    }

    /// HKDF-Expand-Label producing one hash length of output.
    pub fn expand_label(&self, secret: &[u8], label: &[u8], context: &[u8]) -> Vec<u8> {
        let mut info = Vec::new();
        info.extend_from_slice(&(self.hash_len() as u16).to_be_bytes());
        info.push((6 + label.len()) as u8);
        info.extend_from_slice(b"tls13 ");
        info.extend_from_slice(label);
        info.push(context.len() as u8);
        info.extend_from_slice(context);
        info.push(0x01);
        self.hmac(secret, &info)
    }

    pub fn early_secret(&self, psk: Option<&[u8]>) -> Vec<u8> {
        let zeroes = vec![0u8; self.hash_len()];
        self.extract(&zeroes, psk.unwrap_or(&zeroes[..]))
    }

    /// The next stage's secret, inputting `ikm` (or zeroes).
    pub fn next_secret(&self, prev: &[u8], ikm: Option<&[u8]>) -> Vec<u8> {
        let zeroes = vec![0u8; self.hash_len()];
        let derived = self.expand_label(prev, b"derived", &self.hash(&[]));
        self.extract(&derived, ikm.unwrap_or(&zeroes[..]))
    }

    pub fn verify_data(&self, base_key: &[u8], transcript_hash: &[u8]) -> Vec<u8> {
        let finished_key = self.expand_label(base_key, b"finished", &[]);
        self.hmac(&finished_key, transcript_hash)
    }

    pub fn binder(&self, psk: &[u8], truncated_client_hello: &[u8]) -> Vec<u8> {
        let early = self.early_secret(Some(psk));
        let binder_key = self.expand_label(&early, b"res binder", &self.hash(&[]));
        self.verify_data(&binder_key, &self.hash(truncated_client_hello))
    }
}

/// A scripted server: it builds the messages a real one would send, keeps
/// the transcript, and computes every secret with the [`Oracle`].
pub struct TestServer {
    pub oracle: Oracle,
    pub suite: CipherSuite,
    pub psk: Option<Vec<u8>>,
    pub transcript: Vec<u8>,
    pub client_random: [u8; 32],
    pub client_early_traffic_secret: Vec<u8>,
    pub client_handshake_traffic_secret: Vec<u8>,
    pub server_handshake_traffic_secret: Vec<u8>,
    pub client_application_traffic_secret: Vec<u8>,
    pub server_application_traffic_secret: Vec<u8>,
    pub exporter_master_secret: Vec<u8>,
    pub resumption_master_secret: Vec<u8>,
    handshake_secret: Vec<u8>,
    end_entity: CertificateDer<'static>,
    signing_key: signature::EcdsaKeyPair,
    rng: SystemRandom,
}

impl TestServer {
    pub fn new(suite: CipherSuite, pki: &Pki) -> Self {
        let rng = SystemRandom::new();
        let signing_key = signature::EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &pki.end_entity_pkcs8,
            &rng,
        )
        .unwrap();

        Self {
            oracle: Oracle::for_suite(suite),
            suite,
            psk: None,
            transcript: Vec::new(),
            client_random: [0u8; 32],
            client_early_traffic_secret: Vec::new(),
            client_handshake_traffic_secret: Vec::new(),
            server_handshake_traffic_secret: Vec::new(),
            client_application_traffic_secret: Vec::new(),
            server_application_traffic_secret: Vec::new(),
            exporter_master_secret: Vec::new(),
            resumption_master_secret: Vec::new(),
            handshake_secret: Vec::new(),
            end_entity: pki.end_entity.clone(),
            signing_key,
            rng,
        }
    }

    pub fn with_psk(mut self, psk: &[u8]) -> Self {
        self.psk = Some(psk.to_vec());
        self
    }

    fn record(&mut self, typ: HandshakeType, payload: HandshakePayload) -> HandshakeMessage {
        let m = HandshakeMessage::from(HandshakeMessagePayload { typ, payload });
        self.transcript
            .extend_from_slice(m.bytes());
        m
    }

    pub fn transcript_hash(&self) -> Vec<u8> {
        self.oracle.hash(&self.transcript)
    }

    pub fn read_client_hello(&mut self, bytes: &[u8]) -> ClientHelloPayload {
        let m = HandshakeMessage::read_bytes(bytes).unwrap();
        let ch = match &m.payload().payload {
            HandshakePayload::ClientHello(ch) => ch.clone(),
            other => panic!("expected ClientHello, got {:?}", other),
        };
        self.transcript.extend_from_slice(bytes);
        self.client_random = ch.random.0;

        let early = self
            .oracle
            .early_secret(self.psk.as_deref());
        self.client_early_traffic_secret =
            self.oracle
                .expand_label(&early, b"c e traffic", &self.transcript_hash());
        ch
    }

    pub fn default_server_hello_extensions() -> Vec<ServerExtension> {
        vec![
            ServerExtension::SupportedVersions(ProtocolVersion::TLSv1_3),
            ServerExtension::KeyShare(KeyShareEntry::new(NamedGroup::X25519, SERVER_SHARE)),
        ]
    }

    pub fn server_hello_payload(&self, extensions: Vec<ServerExtension>) -> ServerHelloPayload {
        ServerHelloPayload {
            legacy_version: ProtocolVersion::TLSv1_2,
            random: Random([0x22; 32]),
            session_id: SessionId::empty(),
            cipher_suite: self.suite,
            compression_method: Compression::Null,
            extensions,
        }
    }

    /// A ServerHello that is not recorded and derives nothing.
    pub fn unrecorded_server_hello(&self, extensions: Vec<ServerExtension>) -> HandshakeMessage {
        HandshakeMessage::from(HandshakeMessagePayload {
            typ: HandshakeType::ServerHello,
            payload: HandshakePayload::ServerHello(self.server_hello_payload(extensions)),
        })
    }

    pub fn server_hello(&mut self, extensions: Vec<ServerExtension>) -> HandshakeMessage {
        let with_key_share = extensions
            .iter()
            .any(|ext| matches!(ext, ServerExtension::KeyShare(_)));
        let shp = self.server_hello_payload(extensions);
        let m = self.record(HandshakeType::ServerHello, HandshakePayload::ServerHello(shp));

        let early = self
            .oracle
            .early_secret(self.psk.as_deref());
        let shared = match with_key_share {
            true => Some(&SHARED_SECRET[..]),
            false => None,
        };
        self.handshake_secret = self
            .oracle
            .next_secret(&early, shared);
        let hash = self.transcript_hash();
        self.client_handshake_traffic_secret =
            self.oracle
                .expand_label(&self.handshake_secret, b"c hs traffic", &hash);
        self.server_handshake_traffic_secret =
            self.oracle
                .expand_label(&self.handshake_secret, b"s hs traffic", &hash);
        m
    }

    pub fn encrypted_extensions(&mut self, extensions: Vec<ServerExtension>) -> HandshakeMessage {
        self.record(
            HandshakeType::EncryptedExtensions,
            HandshakePayload::EncryptedExtensions(extensions),
        )
    }

    pub fn certificate(&mut self) -> HandshakeMessage {
        let payload = CertificatePayloadTls13::new([self.end_entity.clone()]);
        self.record(
            HandshakeType::Certificate,
            HandshakePayload::CertificateTls13(payload),
        )
    }

    pub fn certificate_verify_signature(&self) -> Vec<u8> {
        let mut message = vec![0x20u8; 64];
        message.extend_from_slice(b"TLS 1.3, server CertificateVerify\x00");
        message.extend_from_slice(&self.transcript_hash());
        self.signing_key
            .sign(&self.rng, &message)
            .unwrap()
            .as_ref()
            .to_vec()
    }

    pub fn certificate_verify(&mut self) -> HandshakeMessage {
        let dss = DigitallySignedStruct::new(
            SignatureScheme::ECDSA_NISTP256_SHA256,
            self.certificate_verify_signature(),
        );
        self.record(
            HandshakeType::CertificateVerify,
            HandshakePayload::CertificateVerify(dss),
        )
    }

    pub fn server_verify_data(&self) -> Vec<u8> {
        self.oracle
            .verify_data(&self.server_handshake_traffic_secret, &self.transcript_hash())
    }

    /// The server's Finished, after which the application secrets are known.
    pub fn finished(&mut self) -> HandshakeMessage {
        let verify_data = self.server_verify_data();
        let m = self.record(
            HandshakeType::Finished,
            HandshakePayload::Finished(Payload::new(verify_data)),
        );

        let master = self
            .oracle
            .next_secret(&self.handshake_secret, None);
        let hash = self.transcript_hash();
        self.client_application_traffic_secret =
            self.oracle
                .expand_label(&master, b"c ap traffic", &hash);
        self.server_application_traffic_secret =
            self.oracle
                .expand_label(&master, b"s ap traffic", &hash);
        self.exporter_master_secret = self
            .oracle
            .expand_label(&master, b"exp master", &hash);
        self.handshake_secret = master;
        m
    }

    /// The encoding of the Finished message we expect from the client.
    pub fn expected_client_finished(&self) -> Vec<u8> {
        let verify_data = self
            .oracle
            .verify_data(&self.client_handshake_traffic_secret, &self.transcript_hash());
        HandshakeMessage::from(HandshakeMessagePayload {
            typ: HandshakeType::Finished,
            payload: HandshakePayload::Finished(Payload::new(verify_data)),
        })
        .bytes()
        .to_vec()
    }

    pub fn read_client_finished(&mut self, bytes: &[u8]) {
        assert_eq!(bytes, self.expected_client_finished());
        self.transcript.extend_from_slice(bytes);
        let master = self.handshake_secret.clone();
        self.resumption_master_secret =
            self.oracle
                .expand_label(&master, b"res master", &self.transcript_hash());
    }

    /// A NewSessionTicket and the PSK it carries.
    pub fn new_session_ticket(&self, nonce: &[u8], ticket: &[u8]) -> (HandshakeMessage, Vec<u8>) {
        let nst = NewSessionTicketPayloadTls13::new(3600, 0x0102_0304, nonce.to_vec(), ticket.to_vec());
        let m = HandshakeMessage::from(HandshakeMessagePayload {
            typ: HandshakeType::NewSessionTicket,
            payload: HandshakePayload::NewSessionTicketTls13(nst),
        });
        let psk = self
            .oracle
            .expand_label(&self.resumption_master_secret, b"resumption", nonce);
        (m, psk)
    }
}

/// Run a full handshake against `server` up to and including the server
/// Finished and the client's reply.
pub fn do_full_handshake(hs: &mut ClientHandshake, sent: &SentMessages, server: &mut TestServer) {
    hs.start_handshake(SCHEMES).unwrap();
    let ch = sent.take();
    server.read_client_hello(&ch[0]);

    hs.received(server.server_hello(TestServer::default_server_hello_extensions()))
        .unwrap();
    hs.received(server.encrypted_extensions(vec![]))
        .unwrap();
    hs.received(server.certificate()).unwrap();
    hs.received(server.certificate_verify())
        .unwrap();
    hs.received(server.finished()).unwrap();

    let fin = sent.take();
    assert_eq!(fin.len(), 1);
    server.read_client_finished(&fin[0]);
}
