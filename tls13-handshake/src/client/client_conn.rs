use core::{fmt, mem};
use std::sync::Arc;

use pki_types::CertificateDer;

#[cfg(feature = "logging")]
use crate::log::{debug, warn};
use crate::client::config::ClientConfig;
use crate::client::events::{MessageSender, StatusEvents};
use crate::client::hs::{self, ClientContext, State};
use crate::crypto::tls13::OkmBlock;
use crate::enums::SignatureScheme;
use crate::error::{ApiMisuse, Error};
use crate::msgs::handshake::ServerExtension;
use crate::msgs::message::HandshakeMessage;
use crate::msgs::persist::NewSessionTicket;
use crate::tls13::Tls13CipherSuite;

/// Where a [`ClientHandshake`] has got to.
///
/// The order is the order of a full handshake; a resumed handshake goes
/// straight from `EncryptedExtensionsReceived` to `Finished`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    /// `start_handshake` has not been called.
    Initial,
    /// The ClientHello was sent; waiting for the ServerHello.
    ClientHelloSent,
    /// Waiting for EncryptedExtensions.
    ServerHelloReceived,
    /// Waiting for the server's Certificate, or its Finished when resuming.
    EncryptedExtensionsReceived,
    /// Waiting for CertificateVerify.
    CertificateReceived,
    /// Waiting for the server's Finished.
    CertificateVerifyReceived,
    /// Both Finished messages were exchanged.  NewSessionTicket messages may
    /// still arrive.
    Finished,
    /// A fatal error occurred.
    Aborted,
}

/// Secrets derived so far.
#[derive(Default)]
pub(crate) struct Secrets {
    pub(crate) client_early_traffic_secret: Option<OkmBlock>,
    pub(crate) early_exporter_master_secret: Option<OkmBlock>,
    pub(crate) client_handshake_traffic_secret: Option<OkmBlock>,
    pub(crate) server_handshake_traffic_secret: Option<OkmBlock>,
    pub(crate) client_application_traffic_secret: Option<OkmBlock>,
    pub(crate) server_application_traffic_secret: Option<OkmBlock>,
    pub(crate) exporter_master_secret: Option<OkmBlock>,
}

/// What the handshake has learned, readable through [`ClientHandshake`].
pub(crate) struct HandshakeData {
    pub(crate) status: Status,
    pub(crate) client_random: [u8; 32],
    pub(crate) suite: Option<&'static Tls13CipherSuite>,
    pub(crate) psk_accepted: bool,
    pub(crate) secrets: Secrets,
    pub(crate) alpn_protocol: Option<Vec<u8>>,
    pub(crate) server_cert_chain: Vec<CertificateDer<'static>>,
    pub(crate) received_extensions: Vec<ServerExtension>,
    pub(crate) tickets: Vec<NewSessionTicket>,
}

impl HandshakeData {
    fn new() -> Self {
        Self {
            status: Status::Initial,
            client_random: [0u8; 32],
            suite: None,
            psk_accepted: false,
            secrets: Secrets::default(),
            alpn_protocol: None,
            server_cert_chain: Vec::new(),
            received_extensions: Vec::new(),
            tickets: Vec::new(),
        }
    }
}

enum HandshakeState {
    Initial,
    Running(Box<dyn State>),
    Aborted,
}

/// The client side of one TLS1.3 handshake.
///
/// Messages go out through the [`MessageSender`]; messages from the server
/// are delivered with [`ClientHandshake::received()`] (or
/// [`ClientHandshake::received_bytes()`]) in the order they arrived.  Once
/// any call fails, the handshake is aborted and every later call fails
/// with [`ApiMisuse::HandshakeAborted`].
pub struct ClientHandshake {
    config: Arc<ClientConfig>,
    sender: Box<dyn MessageSender>,
    events: Box<dyn StatusEvents>,
    data: HandshakeData,
    state: HandshakeState,
}

impl ClientHandshake {
    /// Make a new handshake, which does nothing until
    /// [`ClientHandshake::start_handshake()`] is called.
    pub fn new(
        config: Arc<ClientConfig>,
        sender: Box<dyn MessageSender>,
        events: Box<dyn StatusEvents>,
    ) -> Self {
        Self {
            config,
            sender,
            events,
            data: HandshakeData::new(),
            state: HandshakeState::Initial,
        }
    }

    /// Send the ClientHello, offering `signature_schemes` for the server's
    /// CertificateVerify.
    ///
    /// Each scheme must be verifiable with
    /// [`ClientConfig::signature_algorithms`].
    pub fn start_handshake(&mut self, signature_schemes: &[SignatureScheme]) -> Result<(), Error> {
        match self.state {
            HandshakeState::Initial => {}
            HandshakeState::Running(_) => return Err(ApiMisuse::HandshakeAlreadyStarted.into()),
            HandshakeState::Aborted => return Err(ApiMisuse::HandshakeAborted.into()),
        }

        let config = Arc::clone(&self.config);
        let mut cx = ClientContext {
            config: &config,
            sender: &mut *self.sender,
            events: &mut *self.events,
            data: &mut self.data,
        };

        let result = hs::start_handshake(&mut cx, signature_schemes);
        self.advance(result)
    }

    /// Process one handshake message from the server.
    pub fn received(&mut self, m: HandshakeMessage) -> Result<(), Error> {
        let state = match mem::replace(&mut self.state, HandshakeState::Aborted) {
            HandshakeState::Running(state) => state,
            HandshakeState::Initial => {
                self.state = HandshakeState::Initial;
                return Err(ApiMisuse::HandshakeNotStarted.into());
            }
            HandshakeState::Aborted => return Err(ApiMisuse::HandshakeAborted.into()),
        };

        let config = Arc::clone(&self.config);
        let mut cx = ClientContext {
            config: &config,
            sender: &mut *self.sender,
            events: &mut *self.events,
            data: &mut self.data,
        };

        let result = state.handle(&mut cx, m);
        self.advance(result)
    }

    /// Decode one complete handshake message and process it.
    pub fn received_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        match self.state {
            HandshakeState::Running(_) => {}
            HandshakeState::Initial => return Err(ApiMisuse::HandshakeNotStarted.into()),
            HandshakeState::Aborted => return Err(ApiMisuse::HandshakeAborted.into()),
        }

        match HandshakeMessage::read_bytes(bytes) {
            Ok(m) => self.received(m),
            Err(err) => self.advance(Err(err.into())),
        }
    }

    fn advance(&mut self, result: hs::NextStateOrError) -> Result<(), Error> {
        match result {
            Ok(next) => {
                debug!("Handshake status now {:?}", next.status());
                self.data.status = next.status();
                self.state = HandshakeState::Running(next);
                Ok(())
            }
            Err(err) => {
                warn!("Handshake aborted: {}", err);
                self.data.status = Status::Aborted;
                self.state = HandshakeState::Aborted;
                Err(err)
            }
        }
    }

    /// Where the handshake has got to.
    pub fn status(&self) -> Status {
        self.data.status
    }

    /// The cipher suite the server selected.
    pub fn selected_cipher_suite(&self) -> Result<&'static Tls13CipherSuite, Error> {
        self.data
            .suite
            .ok_or_else(|| ApiMisuse::SecretNotYetAvailable.into())
    }

    /// True if the server accepted our resumption PSK.
    pub fn psk_accepted(&self) -> bool {
        self.data.psk_accepted
    }

    /// The ALPN protocol the server selected, if any.
    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        self.data.alpn_protocol.as_deref()
    }

    /// The server's certificate chain, end-entity first.
    ///
    /// Empty before the Certificate message, and for resumed handshakes.
    pub fn server_certificates(&self) -> &[CertificateDer<'static>] {
        &self.data.server_cert_chain
    }

    /// The server's EncryptedExtensions.
    pub fn received_extensions(&self) -> &[ServerExtension] {
        &self.data.received_extensions
    }

    /// Every resumption ticket received so far, oldest first.
    pub fn tickets(&self) -> &[NewSessionTicket] {
        &self.data.tickets
    }

    /// The client random we sent.
    pub fn client_random(&self) -> Result<&[u8; 32], Error> {
        match self.data.status {
            Status::Initial => Err(ApiMisuse::HandshakeNotStarted.into()),
            _ => Ok(&self.data.client_random),
        }
    }

    /// `client_early_traffic_secret`, available once the ClientHello is sent.
    ///
    /// Without a resumption ticket it is derived from an all-zero PSK, so
    /// it protects nothing.
    pub fn client_early_traffic_secret(&self) -> Result<&[u8], Error> {
        secret(&self.data.secrets.client_early_traffic_secret)
    }

    /// `early_exporter_master_secret`, available with the one above.
    pub fn early_exporter_master_secret(&self) -> Result<&[u8], Error> {
        secret(&self.data.secrets.early_exporter_master_secret)
    }

    /// `client_handshake_traffic_secret`, available after ServerHello.
    pub fn client_handshake_traffic_secret(&self) -> Result<&[u8], Error> {
        secret(&self.data.secrets.client_handshake_traffic_secret)
    }

    /// `server_handshake_traffic_secret`, available after ServerHello.
    pub fn server_handshake_traffic_secret(&self) -> Result<&[u8], Error> {
        secret(&self.data.secrets.server_handshake_traffic_secret)
    }

    /// `client_application_traffic_secret_0`, available after the server's Finished.
    pub fn client_application_traffic_secret(&self) -> Result<&[u8], Error> {
        secret(&self.data.secrets.client_application_traffic_secret)
    }

    /// `server_application_traffic_secret_0`, available after the server's Finished.
    pub fn server_application_traffic_secret(&self) -> Result<&[u8], Error> {
        secret(&self.data.secrets.server_application_traffic_secret)
    }

    /// `exporter_master_secret`, available after the server's Finished.
    pub fn exporter_master_secret(&self) -> Result<&[u8], Error> {
        secret(&self.data.secrets.exporter_master_secret)
    }
}

fn secret(block: &Option<OkmBlock>) -> Result<&[u8], Error> {
    block
        .as_ref()
        .map(|block| block.as_ref())
        .ok_or_else(|| ApiMisuse::SecretNotYetAvailable.into())
}

impl fmt::Debug for ClientHandshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandshake")
            .field("status", &self.data.status)
            .field("suite", &self.data.suite)
            .field("psk_accepted", &self.data.psk_accepted)
            .finish_non_exhaustive()
    }
}
