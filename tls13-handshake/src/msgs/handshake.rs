use std::collections::BTreeSet;
use std::fmt;

use pki_types::{CertificateDer, DnsName};
use subtle::ConstantTimeEq;

use crate::enums::{CipherSuite, HandshakeType, ProtocolVersion, SignatureScheme};
use crate::error::InvalidMessage;
use crate::msgs::base::{Payload, PayloadU16, PayloadU8};
use crate::msgs::codec::{self, Codec, LengthPrefixedBuffer, ListLength, Reader, TlsListElement};
use crate::msgs::enums::{
    Compression, ExtensionType, NamedGroup, PskKeyExchangeMode, ServerNameType,
};

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Random(pub [u8; 32]);

impl fmt::Debug for Random {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        super::base::hex(f, &self.0)
    }
}

/// A ServerHello carrying this `random` is a HelloRetryRequest
/// (RFC8446 section 4.1.3).
pub(crate) static HELLO_RETRY_REQUEST_RANDOM: Random = Random([
    0xcf, 0x21, 0xad, 0x74, 0xe5, 0x9a, 0x61, 0x11, 0xbe, 0x1d, 0x8c, 0x02, 0x1e, 0x65, 0xb8, 0x91,
    0xc2, 0xa2, 0x11, 0x16, 0x7a, 0xbb, 0x8c, 0x5e, 0x07, 0x9e, 0x09, 0xe2, 0xc8, 0xa8, 0x33, 0x9c,
]);

impl Codec for Random {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        r.take(32)
            .and_then(|bytes| bytes.try_into().ok())
            .map(Self)
            .ok_or(InvalidMessage::MissingData("Random"))
    }
}

impl From<[u8; 32]> for Random {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// `legacy_session_id`: empty, or 32 random bytes in middlebox
/// compatibility mode.  The server must echo it.
#[derive(Copy, Clone)]
pub struct SessionId {
    len: u8,
    data: [u8; 32],
}

impl SessionId {
    pub fn new(data: [u8; 32]) -> Self {
        Self { len: 32, data }
    }

    pub fn empty() -> Self {
        Self {
            len: 0,
            data: [0; 32],
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn as_slice(&self) -> &[u8] {
        &self.data[..self.len()]
    }
}

impl PartialEq for SessionId {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && bool::from(self.as_slice().ct_eq(other.as_slice()))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        super::base::hex(f, self.as_slice())
    }
}

impl Codec for SessionId {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.len.encode(bytes);
        bytes.extend_from_slice(self.as_slice());
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let len = u8::read(r)?;
        if len > 32 {
            return Err(InvalidMessage::TrailingData("SessionID"));
        }

        let body = r
            .take(len as usize)
            .ok_or(InvalidMessage::MissingData("SessionID"))?;
        let mut data = [0u8; 32];
        data[..body.len()].copy_from_slice(body);
        Ok(Self { len, data })
    }
}

/// An extension we carry without interpreting.  Its type is written by
/// the enclosing extension enum; only the body lives here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownExtension {
    pub typ: ExtensionType,
    pub payload: Payload,
}

impl UnknownExtension {
    fn read(typ: ExtensionType, r: &mut Reader<'_>) -> Self {
        Self {
            typ,
            payload: Payload::read(r),
        }
    }
}

/// Writes `typ`, then the u16-length-prefixed body produced by `body`.
fn encode_extension(typ: ExtensionType, bytes: &mut Vec<u8>, body: impl FnOnce(&mut Vec<u8>)) {
    typ.encode(bytes);
    let nested = LengthPrefixedBuffer::new(ListLength::U16, bytes);
    body(nested.buf);
}

/// Reads an extension header and hands its body to `body`, which must
/// consume all of it.
fn read_extension<T>(
    r: &mut Reader<'_>,
    name: &'static str,
    body: impl FnOnce(ExtensionType, &mut Reader<'_>) -> Result<T, InvalidMessage>,
) -> Result<T, InvalidMessage> {
    let typ = ExtensionType::read(r)?;
    let len = u16::read(r)? as usize;
    let mut sub = r.sub(len)?;
    let ext = body(typ, &mut sub)?;
    sub.expect_empty(name)?;
    Ok(ext)
}

impl TlsListElement for NamedGroup {
    const SIZE_LEN: ListLength = ListLength::U16;
}

impl TlsListElement for SignatureScheme {
    const SIZE_LEN: ListLength = ListLength::U16;
}

impl TlsListElement for CipherSuite {
    const SIZE_LEN: ListLength = ListLength::U16;
}

impl TlsListElement for Compression {
    const SIZE_LEN: ListLength = ListLength::U8;
}

impl TlsListElement for ProtocolVersion {
    const SIZE_LEN: ListLength = ListLength::U8;
}

impl TlsListElement for PskKeyExchangeMode {
    const SIZE_LEN: ListLength = ListLength::U8;
}

/// A `host_name` entry of the `server_name` extension.  No other name
/// type has ever been defined, so no other is accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerNameEntry(pub DnsName<'static>);

impl ServerNameEntry {
    /// RFC6066 wants the name "without a trailing dot".
    pub fn host_name(dns_name: &DnsName<'_>) -> Self {
        let name: &str = dns_name.as_ref();
        let name = match name.strip_suffix('.') {
            Some(trimmed) => DnsName::try_from(trimmed)
                .map(|n| n.to_owned())
                .unwrap_or_else(|_| dns_name.to_owned()),
            None => dns_name.to_owned(),
        };
        Self(name)
    }
}

impl Codec for ServerNameEntry {
    fn encode(&self, bytes: &mut Vec<u8>) {
        ServerNameType::HostName.encode(bytes);
        let name: &str = self.0.as_ref();
        PayloadU16::encode_slice(name.as_bytes(), bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        if ServerNameType::read(r)? != ServerNameType::HostName {
            return Err(InvalidMessage::InvalidServerName);
        }

        let raw = PayloadU16::read(r)?;
        std::str::from_utf8(&raw.0)
            .ok()
            .and_then(|s| DnsName::try_from(s).ok())
            .map(|name| Self(name.to_owned()))
            .ok_or(InvalidMessage::InvalidServerName)
    }
}

impl TlsListElement for ServerNameEntry {
    const SIZE_LEN: ListLength = ListLength::U16;
}

/// An ALPN protocol name.
pub type ProtocolName = PayloadU8;

/// One PSK binder: HMAC over the ClientHello up to the binders list.
pub type PresharedKeyBinder = PayloadU8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyShareEntry {
    pub group: NamedGroup,
    pub payload: PayloadU16,
}

impl KeyShareEntry {
    pub fn new(group: NamedGroup, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            group,
            payload: PayloadU16::new(payload.into()),
        }
    }
}

impl Codec for KeyShareEntry {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.group.encode(bytes);
        self.payload.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            group: NamedGroup::read(r)?,
            payload: PayloadU16::read(r)?,
        })
    }
}

impl TlsListElement for KeyShareEntry {
    const SIZE_LEN: ListLength = ListLength::U16;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresharedKeyIdentity {
    pub identity: PayloadU16,
    /// Ticket age in milliseconds plus the ticket's `age_add`, mod 2^32.
    pub obfuscated_ticket_age: u32,
}

impl PresharedKeyIdentity {
    pub fn new(id: Vec<u8>, age: u32) -> Self {
        Self {
            identity: PayloadU16::new(id),
            obfuscated_ticket_age: age,
        }
    }
}

impl Codec for PresharedKeyIdentity {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.identity.encode(bytes);
        self.obfuscated_ticket_age.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            identity: PayloadU16::read(r)?,
            obfuscated_ticket_age: u32::read(r)?,
        })
    }
}

impl TlsListElement for PresharedKeyIdentity {
    const SIZE_LEN: ListLength = ListLength::U16;
}

/// The client's `pre_shared_key` extension.  `identities[i]` is bound by
/// `binders[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresharedKeyOffer {
    pub identities: Vec<PresharedKeyIdentity>,
    pub binders: Vec<PresharedKeyBinder>,
}

impl PresharedKeyOffer {
    /// An offer of the single identity `id`.
    pub fn new(id: PresharedKeyIdentity, binder: Vec<u8>) -> Self {
        Self {
            identities: vec![id],
            binders: vec![PresharedKeyBinder::from(binder)],
        }
    }
}

impl Codec for PresharedKeyOffer {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.identities.encode(bytes);
        self.binders.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let identities = Vec::<PresharedKeyIdentity>::read(r)?;
        let binders = Vec::<PresharedKeyBinder>::read(r)?;

        if identities.is_empty() {
            Err(InvalidMessage::IllegalEmptyList("PskIdentities"))
        } else if identities.len() != binders.len() {
            Err(InvalidMessage::PskIdentitiesAndBindersMismatch)
        } else {
            Ok(Self {
                identities,
                binders,
            })
        }
    }
}

/// ClientHello extensions.  Anything we do not send ourselves decodes as
/// `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientExtension {
    ServerName(Vec<ServerNameEntry>),
    SupportedVersions(Vec<ProtocolVersion>),
    NamedGroups(Vec<NamedGroup>),
    SignatureAlgorithms(Vec<SignatureScheme>),
    KeyShare(Vec<KeyShareEntry>),
    Protocols(Vec<ProtocolName>),
    PresharedKeyModes(Vec<PskKeyExchangeMode>),
    PresharedKey(PresharedKeyOffer),
    Unknown(UnknownExtension),
}

impl ClientExtension {
    pub fn ext_type(&self) -> ExtensionType {
        match self {
            Self::ServerName(_) => ExtensionType::ServerName,
            Self::SupportedVersions(_) => ExtensionType::SupportedVersions,
            Self::NamedGroups(_) => ExtensionType::EllipticCurves,
            Self::SignatureAlgorithms(_) => ExtensionType::SignatureAlgorithms,
            Self::KeyShare(_) => ExtensionType::KeyShare,
            Self::Protocols(_) => ExtensionType::ALProtocolNegotiation,
            Self::PresharedKeyModes(_) => ExtensionType::PSKKeyExchangeModes,
            Self::PresharedKey(_) => ExtensionType::PreSharedKey,
            Self::Unknown(r) => r.typ,
        }
    }

    /// A `server_name` extension naming `dns_name`.
    pub fn make_sni(dns_name: &DnsName<'_>) -> Self {
        Self::ServerName(vec![ServerNameEntry::host_name(dns_name)])
    }
}

impl Codec for ClientExtension {
    fn encode(&self, bytes: &mut Vec<u8>) {
        encode_extension(self.ext_type(), bytes, |body| match self {
            Self::ServerName(r) => r.encode(body),
            Self::SupportedVersions(r) => r.encode(body),
            Self::NamedGroups(r) => r.encode(body),
            Self::SignatureAlgorithms(r) => r.encode(body),
            Self::KeyShare(r) => r.encode(body),
            Self::Protocols(r) => r.encode(body),
            Self::PresharedKeyModes(r) => r.encode(body),
            Self::PresharedKey(r) => r.encode(body),
            Self::Unknown(r) => r.payload.encode(body),
        })
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        read_extension(r, "ClientExtension", |typ, sub| {
            Ok(match typ {
                ExtensionType::ServerName => Self::ServerName(Vec::read(sub)?),
                ExtensionType::SupportedVersions => Self::SupportedVersions(Vec::read(sub)?),
                ExtensionType::EllipticCurves => Self::NamedGroups(Vec::read(sub)?),
                ExtensionType::SignatureAlgorithms => Self::SignatureAlgorithms(Vec::read(sub)?),
                ExtensionType::KeyShare => Self::KeyShare(Vec::read(sub)?),
                ExtensionType::ALProtocolNegotiation => Self::Protocols(Vec::read(sub)?),
                ExtensionType::PSKKeyExchangeModes => Self::PresharedKeyModes(Vec::read(sub)?),
                ExtensionType::PreSharedKey => Self::PresharedKey(PresharedKeyOffer::read(sub)?),
                _ => Self::Unknown(UnknownExtension::read(typ, sub)),
            })
        })
    }
}

impl TlsListElement for ClientExtension {
    const SIZE_LEN: ListLength = ListLength::U16;
}

/// Extensions a server may send in ServerHello or EncryptedExtensions.
/// Which are allowed where is checked by the client state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerExtension {
    ServerNameAck,
    Protocols(Vec<ProtocolName>),
    KeyShare(KeyShareEntry),
    PresharedKey(u16),
    SupportedVersions(ProtocolVersion),
    EarlyData,
    Unknown(UnknownExtension),
}

impl ServerExtension {
    pub fn ext_type(&self) -> ExtensionType {
        match self {
            Self::ServerNameAck => ExtensionType::ServerName,
            Self::Protocols(_) => ExtensionType::ALProtocolNegotiation,
            Self::KeyShare(_) => ExtensionType::KeyShare,
            Self::PresharedKey(_) => ExtensionType::PreSharedKey,
            Self::SupportedVersions(_) => ExtensionType::SupportedVersions,
            Self::EarlyData => ExtensionType::EarlyData,
            Self::Unknown(r) => r.typ,
        }
    }
}

impl Codec for ServerExtension {
    fn encode(&self, bytes: &mut Vec<u8>) {
        encode_extension(self.ext_type(), bytes, |body| match self {
            Self::ServerNameAck | Self::EarlyData => {}
            Self::Protocols(r) => r.encode(body),
            Self::KeyShare(r) => r.encode(body),
            Self::PresharedKey(r) => r.encode(body),
            Self::SupportedVersions(r) => r.encode(body),
            Self::Unknown(r) => r.payload.encode(body),
        })
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        read_extension(r, "ServerExtension", |typ, sub| {
            Ok(match typ {
                ExtensionType::ServerName if !sub.any_left() => Self::ServerNameAck,
                ExtensionType::ALProtocolNegotiation => Self::Protocols(Vec::read(sub)?),
                ExtensionType::KeyShare => Self::KeyShare(KeyShareEntry::read(sub)?),
                ExtensionType::PreSharedKey => Self::PresharedKey(u16::read(sub)?),
                ExtensionType::SupportedVersions => {
                    Self::SupportedVersions(ProtocolVersion::read(sub)?)
                }
                ExtensionType::EarlyData if !sub.any_left() => Self::EarlyData,
                _ => Self::Unknown(UnknownExtension::read(typ, sub)),
            })
        })
    }
}

impl TlsListElement for ServerExtension {
    const SIZE_LEN: ListLength = ListLength::U16;
}

/// True if some extension type appears twice in `types`.
pub(crate) fn has_duplicates(types: impl IntoIterator<Item = ExtensionType>) -> bool {
    let mut seen = BTreeSet::new();
    types
        .into_iter()
        .any(|typ| !seen.insert(u16::from(typ)))
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientHelloPayload {
    pub client_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionId,
    pub cipher_suites: Vec<CipherSuite>,
    pub compression_methods: Vec<Compression>,
    pub extensions: Vec<ClientExtension>,
}

impl Codec for ClientHelloPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.client_version.encode(bytes);
        self.random.encode(bytes);
        self.session_id.encode(bytes);
        self.cipher_suites.encode(bytes);
        self.compression_methods.encode(bytes);
        self.extensions.encode(bytes);
    }

    /// A TLS1.3 ClientHello always has extensions, and nothing after them.
    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let ch = Self {
            client_version: ProtocolVersion::read(r)?,
            random: Random::read(r)?,
            session_id: SessionId::read(r)?,
            cipher_suites: Vec::read(r)?,
            compression_methods: Vec::read(r)?,
            extensions: if r.any_left() { Vec::read(r)? } else { Vec::new() },
        };

        if r.any_left() {
            Err(InvalidMessage::TrailingData("ClientHelloPayload"))
        } else if ch.extensions.is_empty() {
            Err(InvalidMessage::MissingData("ClientHelloPayload"))
        } else {
            Ok(ch)
        }
    }
}

impl ClientHelloPayload {
    pub fn has_duplicate_extension(&self) -> bool {
        has_duplicates(self.extensions.iter().map(|ext| ext.ext_type()))
    }

    pub fn psk(&self) -> Option<&PresharedKeyOffer> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                ClientExtension::PresharedKey(offer) => Some(offer),
                _ => None,
            })
    }

    /// The binders authenticate everything before them, so a PSK
    /// extension has to come last.
    pub fn check_psk_ext_is_last(&self) -> bool {
        matches!(self.extensions.last(), Some(ClientExtension::PresharedKey(_)))
    }

    /// Overwrite the first binder of the trailing PSK extension.  The
    /// replacement must have the placeholder's length.
    pub(crate) fn set_psk_binder(&mut self, binder: impl Into<Vec<u8>>) {
        if let Some(ClientExtension::PresharedKey(offer)) = self.extensions.last_mut() {
            if let Some(slot) = offer.binders.first_mut() {
                *slot = PresharedKeyBinder::from(binder.into());
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerHelloPayload {
    pub legacy_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionId,
    pub cipher_suite: CipherSuite,
    pub compression_method: Compression,
    pub extensions: Vec<ServerExtension>,
}

impl Codec for ServerHelloPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.legacy_version.encode(bytes);
        self.random.encode(bytes);
        self.session_id.encode(bytes);
        self.cipher_suite.encode(bytes);
        self.compression_method.encode(bytes);

        if !self.extensions.is_empty() {
            self.extensions.encode(bytes);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            legacy_version: ProtocolVersion::read(r)?,
            random: Random::read(r)?,
            session_id: SessionId::read(r)?,
            cipher_suite: CipherSuite::read(r)?,
            compression_method: Compression::read(r)?,
            extensions: if r.any_left() { Vec::read(r)? } else { Vec::new() },
        })
    }
}

impl ServerHelloPayload {
    pub fn has_duplicate_extension(&self) -> bool {
        has_duplicates(self.extensions.iter().map(|ext| ext.ext_type()))
    }

    pub fn key_share(&self) -> Option<&KeyShareEntry> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                ServerExtension::KeyShare(share) => Some(share),
                _ => None,
            })
    }

    pub fn psk_index(&self) -> Option<u16> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                ServerExtension::PresharedKey(index) => Some(*index),
                _ => None,
            })
    }

    pub fn supported_versions(&self) -> Option<ProtocolVersion> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                ServerExtension::SupportedVersions(version) => Some(*version),
                _ => None,
            })
    }
}

/// One certificate of a TLS1.3 Certificate message.  We act on no
/// per-certificate extension, so their block is kept undecoded.
#[derive(Clone, Debug, PartialEq)]
pub struct CertificateEntry {
    pub cert: CertificateDer<'static>,
    pub exts: PayloadU16,
}

impl CertificateEntry {
    pub fn new(cert: CertificateDer<'static>) -> Self {
        Self {
            cert,
            exts: PayloadU16::empty(),
        }
    }
}

impl Codec for CertificateEntry {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.cert.encode(bytes);
        self.exts.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            cert: CertificateDer::read(r)?,
            exts: PayloadU16::read(r)?,
        })
    }
}

impl TlsListElement for CertificateEntry {
    // Longer chains are truncated to this, and then fail to decode.
    const SIZE_LEN: ListLength = ListLength::U24 { max: 0x1_0000 };
}

#[derive(Clone, Debug, PartialEq)]
pub struct CertificatePayloadTls13 {
    pub context: PayloadU8,
    pub entries: Vec<CertificateEntry>,
}

impl Codec for CertificatePayloadTls13 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.context.encode(bytes);
        self.entries.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            context: PayloadU8::read(r)?,
            entries: Vec::read(r)?,
        })
    }
}

impl CertificatePayloadTls13 {
    /// A server's Certificate message: empty context, no extensions.
    pub fn new(certs: impl IntoIterator<Item = CertificateDer<'static>>) -> Self {
        Self {
            context: PayloadU8::empty(),
            entries: certs
                .into_iter()
                .map(CertificateEntry::new)
                .collect(),
        }
    }

    pub fn any_entry_has_extension(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| !entry.exts.0.is_empty())
    }

    /// End-entity first, as sent.
    pub fn into_certificate_chain(self) -> Vec<CertificateDer<'static>> {
        self.entries
            .into_iter()
            .map(|entry| entry.cert)
            .collect()
    }
}

/// A CertificateVerify body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigitallySignedStruct {
    pub scheme: SignatureScheme,
    sig: PayloadU16,
}

impl DigitallySignedStruct {
    pub fn new(scheme: SignatureScheme, sig: Vec<u8>) -> Self {
        Self {
            scheme,
            sig: PayloadU16::new(sig),
        }
    }

    pub fn signature(&self) -> &[u8] {
        &self.sig.0
    }
}

impl Codec for DigitallySignedStruct {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.scheme.encode(bytes);
        self.sig.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let scheme = match SignatureScheme::read(r)? {
            SignatureScheme::Unknown(_) => return Err(InvalidMessage::UnknownSignatureScheme),
            known => known,
        };

        Ok(Self {
            scheme,
            sig: PayloadU16::read(r)?,
        })
    }
}

/// NewSessionTicket extensions.  We act on none, so all are carried raw;
/// `early_data` only matters for 0-RTT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewSessionTicketExtension {
    Unknown(UnknownExtension),
}

impl NewSessionTicketExtension {
    pub fn ext_type(&self) -> ExtensionType {
        match self {
            Self::Unknown(r) => r.typ,
        }
    }
}

impl Codec for NewSessionTicketExtension {
    fn encode(&self, bytes: &mut Vec<u8>) {
        let Self::Unknown(ext) = self;
        encode_extension(ext.typ, bytes, |body| ext.payload.encode(body))
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        read_extension(r, "NewSessionTicketExtension", |typ, sub| {
            Ok(Self::Unknown(UnknownExtension::read(typ, sub)))
        })
    }
}

impl TlsListElement for NewSessionTicketExtension {
    const SIZE_LEN: ListLength = ListLength::U16;
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewSessionTicketPayloadTls13 {
    /// Seconds the ticket may be used for.
    pub lifetime: u32,
    /// Added to the ticket age the client reports back.
    pub age_add: u32,
    pub nonce: PayloadU8,
    pub ticket: PayloadU16,
    pub exts: Vec<NewSessionTicketExtension>,
}

impl NewSessionTicketPayloadTls13 {
    pub fn new(lifetime: u32, age_add: u32, nonce: Vec<u8>, ticket: Vec<u8>) -> Self {
        Self {
            lifetime,
            age_add,
            nonce: PayloadU8::new(nonce),
            ticket: PayloadU16::new(ticket),
            exts: vec![],
        }
    }

    pub fn has_duplicate_extension(&self) -> bool {
        has_duplicates(self.exts.iter().map(|ext| ext.ext_type()))
    }
}

impl Codec for NewSessionTicketPayloadTls13 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.lifetime.encode(bytes);
        self.age_add.encode(bytes);
        self.nonce.encode(bytes);
        self.ticket.encode(bytes);
        self.exts.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            lifetime: u32::read(r)?,
            age_add: u32::read(r)?,
            nonce: PayloadU8::read(r)?,
            ticket: PayloadU16::read(r)?,
            exts: Vec::read(r)?,
        })
    }
}

/// The body of a handshake message, decoded according to its type.
#[derive(Clone, Debug, PartialEq)]
pub enum HandshakePayload {
    ClientHello(ClientHelloPayload),
    ServerHello(ServerHelloPayload),
    HelloRetryRequest(ServerHelloPayload),
    EncryptedExtensions(Vec<ServerExtension>),
    CertificateTls13(CertificatePayloadTls13),
    CertificateVerify(DigitallySignedStruct),
    Finished(Payload),
    NewSessionTicketTls13(NewSessionTicketPayloadTls13),
    /// A type this engine never receives; the body is kept opaque.
    Unknown(Payload),
}

impl HandshakePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        match self {
            Self::ClientHello(x) => x.encode(bytes),
            Self::ServerHello(x) | Self::HelloRetryRequest(x) => x.encode(bytes),
            Self::EncryptedExtensions(x) => x.encode(bytes),
            Self::CertificateTls13(x) => x.encode(bytes),
            Self::CertificateVerify(x) => x.encode(bytes),
            Self::Finished(x) | Self::Unknown(x) => x.encode(bytes),
            Self::NewSessionTicketTls13(x) => x.encode(bytes),
        }
    }

    fn read(typ: HandshakeType, r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(match typ {
            HandshakeType::ClientHello => Self::ClientHello(ClientHelloPayload::read(r)?),
            HandshakeType::ServerHello => {
                let hello = ServerHelloPayload::read(r)?;
                match hello.random == HELLO_RETRY_REQUEST_RANDOM {
                    true => Self::HelloRetryRequest(hello),
                    false => Self::ServerHello(hello),
                }
            }
            HandshakeType::EncryptedExtensions => Self::EncryptedExtensions(Vec::read(r)?),
            HandshakeType::Certificate => {
                Self::CertificateTls13(CertificatePayloadTls13::read(r)?)
            }
            HandshakeType::CertificateVerify => {
                Self::CertificateVerify(DigitallySignedStruct::read(r)?)
            }
            HandshakeType::Finished => Self::Finished(Payload::read(r)),
            HandshakeType::NewSessionTicket => {
                Self::NewSessionTicketTls13(NewSessionTicketPayloadTls13::read(r)?)
            }
            _ => Self::Unknown(Payload::read(r)),
        })
    }
}

/// A handshake message: its type, then its u24-length-prefixed body.
#[derive(Clone, Debug, PartialEq)]
pub struct HandshakeMessagePayload {
    pub typ: HandshakeType,
    pub payload: HandshakePayload,
}

impl Codec for HandshakeMessagePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.typ.encode(bytes);
        let nested = LengthPrefixedBuffer::new(ListLength::U24 { max: usize::MAX }, bytes);
        self.payload.encode(nested.buf);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let typ = HandshakeType::read(r)?;
        let len = codec::u24::read(r)?.0 as usize;
        let mut sub = r.sub(len)?;
        let payload = HandshakePayload::read(typ, &mut sub)?;
        sub.expect_empty("HandshakeMessagePayload")?;
        Ok(Self { typ, payload })
    }
}

impl HandshakeMessagePayload {
    /// The encoding with a trailing PSK binders list cut off: what the
    /// binder HMAC covers.  Messages without one are returned whole.
    pub fn get_encoding_for_binder_signing(&self) -> Vec<u8> {
        let mut encoding = self.get_encoding();

        if let HandshakePayload::ClientHello(ch) = &self.payload {
            if let Some(ClientExtension::PresharedKey(offer)) = ch.extensions.last() {
                let binders_len = offer.binders.get_encoding().len();
                encoding.truncate(encoding.len() - binders_len);
            }
        }

        encoding
    }
}
