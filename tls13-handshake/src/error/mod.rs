//! What can go wrong during a handshake, and which alert each failure
//! owes the server.

use core::fmt;

use crate::enums::{AlertDescription, HandshakeType, SignatureScheme};
use crate::msgs::enums::ExtensionType;


/// A handshake failure.
///
/// Failures caused by the server map onto one alert each, available from
/// [`Error::alert()`].  Failures caused by our caller or transport map
/// onto none.
#[non_exhaustive]
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// A handshake message arrived that the current state has no use for.
    InappropriateHandshakeMessage {
        /// The types the current state would have accepted.
        expect_types: Vec<HandshakeType>,
        /// The type that arrived.
        got_type: HandshakeType,
    },

    /// A message did not decode.
    InvalidMessage(InvalidMessage),

    /// The server's CertificateVerify signature or Finished MAC was wrong.
    DecryptError,

    /// The server wants something this engine does not do.
    PeerIncompatible(PeerIncompatible),

    /// The server broke the protocol.
    PeerMisbehaved(PeerMisbehaved),

    /// The server's certificate was rejected.
    InvalidCertificate(CertificateError),

    /// An internal inconsistency, described by the string.
    General(String),

    /// The random source failed.
    FailedToGetRandomBytes,

    /// The [`TimeProvider`](crate::TimeProvider) had no time to give.
    FailedToGetCurrentTime,

    /// The engine was driven wrongly by its caller.
    ApiMisuse(ApiMisuse),

    /// The [`MessageSender`](crate::MessageSender) failed.
    Io(OtherError),
}

impl Error {
    /// The alert this failure should be reported to the server with.
    pub fn alert(&self) -> Option<AlertDescription> {
        AlertDescription::try_from(self).ok()
    }
}

/// Fails for errors that owe the server no alert.
impl TryFrom<&Error> for AlertDescription {
    type Error = ();

    fn try_from(error: &Error) -> Result<Self, Self::Error> {
        match error {
            Error::InappropriateHandshakeMessage { .. } => Ok(Self::UnexpectedMessage),
            Error::InvalidMessage(_) => Ok(Self::DecodeError),
            Error::DecryptError => Ok(Self::DecryptError),
            Error::PeerIncompatible(e) => Ok(Self::from(*e)),
            Error::PeerMisbehaved(e) => Ok(Self::from(*e)),
            Error::InvalidCertificate(e) => Ok(Self::from(e)),
            Error::General(_) | Error::FailedToGetRandomBytes | Error::FailedToGetCurrentTime => {
                Ok(Self::InternalError)
            }
            Error::ApiMisuse(_) | Error::Io(_) => Err(()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InappropriateHandshakeMessage {
                expect_types,
                got_type,
            } => {
                write!(f, "received unexpected handshake message: got {:?} when expecting ", got_type)?;
                for (i, typ) in expect_types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{:?}", typ)?;
                }
                Ok(())
            }
            Self::InvalidMessage(why) => write!(f, "undecodable message: {:?}", why),
            Self::DecryptError => f.write_str("server signature or Finished did not verify"),
            Self::PeerIncompatible(why) => write!(f, "server is incompatible: {:?}", why),
            Self::PeerMisbehaved(why) => write!(f, "server misbehaved: {:?}", why),
            Self::InvalidCertificate(why) => write!(f, "server certificate rejected: {}", why),
            Self::General(why) => write!(f, "internal error: {}", why),
            Self::FailedToGetRandomBytes => f.write_str("no randomness available"),
            Self::FailedToGetCurrentTime => f.write_str("current time unavailable"),
            Self::ApiMisuse(why) => write!(f, "API misuse: {:?}", why),
            Self::Io(err) => write!(f, "sending a handshake message failed: {}", err),
        }
    }
}

impl std::error::Error for Error {}

macro_rules! wrap_error {
    ($($inner:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$inner> for Error {
                fn from(e: $inner) -> Self {
                    Self::$variant(e)
                }
            }
        )*
    };
}

wrap_error! {
    InvalidMessage => InvalidMessage,
    PeerIncompatible => PeerIncompatible,
    PeerMisbehaved => PeerMisbehaved,
    CertificateError => InvalidCertificate,
    ApiMisuse => ApiMisuse,
}

impl From<crate::rand::GetRandomFailed> for Error {
    fn from(_: crate::rand::GetRandomFailed) -> Self {
        Self::FailedToGetRandomBytes
    }
}

/// Why a message failed to decode.  Every case is a `decode_error` alert.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidMessage {
    /// A handshake header claimed more body than there was.
    MessageTooShort,
    /// The named structure ran out of bytes.
    MissingData(&'static str),
    /// The named structure had bytes after its last field.
    TrailingData(&'static str),
    /// The named list must not be empty.
    IllegalEmptyList(&'static str),
    /// A signature scheme field held a value we cannot interpret.
    UnknownSignatureScheme,
    /// A `server_name` entry was not a DNS name.
    InvalidServerName,
    /// `pre_shared_key` identities and binders differ in number.
    PskIdentitiesAndBindersMismatch,
}

/// Protocol violations by the server.
///
/// Callers should not branch on these: there is no recovery from any of
/// them, and the list may change.
#[allow(missing_docs)]
#[non_exhaustive]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PeerMisbehaved {
    DisallowedEncryptedExtension,
    DisallowedServerHelloExtension,
    DuplicateEncryptedExtensions,
    DuplicateNewSessionTicketExtensions,
    DuplicateServerHelloExtensions,
    IllegalCertificateRequestContext,
    InvalidKeyShare,
    MissingKeyShare,
    MissingSupportedVersionsExtension,
    NoCertificatesPresented,
    ResumptionOfferedWithIncompatibleCipherSuite,
    SelectedInvalidPsk,
    SelectedUnofferedApplicationProtocol,
    SelectedUnofferedCipherSuite,
    SelectedUnofferedCompression,
    SelectedUnofferedKxGroup,
    SelectedUnofferedPsk,
    SelectedUnofferedVersion,
    ServerEchoedWrongSessionId,
    SignedHandshakeWithUnadvertisedSigScheme,
    UnsolicitedCertExtension,
    UnsolicitedEncryptedExtension,
}

impl From<PeerMisbehaved> for AlertDescription {
    fn from(e: PeerMisbehaved) -> Self {
        use PeerMisbehaved::*;
        match e {
            DuplicateEncryptedExtensions | UnsolicitedCertExtension | UnsolicitedEncryptedExtension => {
                Self::UnsupportedExtension
            }
            MissingKeyShare | MissingSupportedVersionsExtension => Self::MissingExtension,
            _ => Self::IllegalParameter,
        }
    }
}

/// Server behaviour that is legal TLS1.3 but unsupported here.
#[allow(missing_docs)]
#[non_exhaustive]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PeerIncompatible {
    ServerSentHelloRetryRequest,
}

impl From<PeerIncompatible> for AlertDescription {
    fn from(e: PeerIncompatible) -> Self {
        match e {
            PeerIncompatible::ServerSentHelloRetryRequest => Self::HandshakeFailure,
        }
    }
}

/// Why a [`ServerCertVerifier`](crate::ServerCertVerifier) rejected the
/// server's certificate.
///
/// Verifiers should pick the closest case: it decides the alert sent.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum CertificateError {
    /// Not a well-formed certificate.
    BadEncoding,
    /// Past `notAfter`.
    Expired,
    /// Before `notBefore`.
    NotValidYet,
    /// Revoked by its issuer.
    Revoked,
    /// A critical extension the verifier does not understand.
    UnhandledCriticalExtension,
    /// The chain does not end at a trusted root.
    UnknownIssuer,
    /// Some certificate's signature does not verify under its issuer's key.
    BadSignature,
    /// The server name is not among the certificate's names.
    NotValidForName,
    /// Extended key usage does not permit server authentication.
    InvalidPurpose,
    /// Rejected by policy beyond the certificate itself.
    ApplicationVerificationFailure,
    /// Anything else; never equal to any other value.
    Other(OtherError),
}

impl PartialEq for CertificateError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Other(_), _) | (_, Self::Other(_)) => false,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl From<&CertificateError> for AlertDescription {
    fn from(e: &CertificateError) -> Self {
        match e {
            CertificateError::NotValidForName => Self::CertificateUnknown,
            _ => Self::BadCertificate,
        }
    }
}

impl fmt::Display for CertificateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(other) => fmt::Display::fmt(other, f),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// Mistakes by the engine's caller.  None of these are sent to the server.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum ApiMisuse {
    /// SNI and the hostname check both need a server name.
    NoServerNameConfigured,

    /// `cipher_suites` is empty.
    NoCipherSuitesConfigured,

    /// `kx_groups` is empty.
    NoKeyExchangeGroupsConfigured,

    /// `start_handshake` was given no signature schemes.
    NoSignatureSchemes,

    /// `start_handshake` was given a scheme the configured verification
    /// algorithms cannot check.
    UnverifiableSignatureScheme(SignatureScheme),

    /// `start_handshake` was called twice.
    HandshakeAlreadyStarted,

    /// A message was delivered before `start_handshake`.
    HandshakeNotStarted,

    /// An earlier error ended the handshake.
    HandshakeAborted,

    /// The handshake has not yet derived the requested secret.
    SecretNotYetAvailable,

    /// `extra_extensions` holds an extension the engine builds itself, or
    /// a `pre_shared_key` extension.
    ConflictingExtraExtension(ExtensionType),
}

impl fmt::Display for ApiMisuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for ApiMisuse {}

mod other_error {
    use std::error::Error as StdError;
    use std::fmt;
    use std::sync::Arc;

    /// An error from outside the engine, such as the transport's I/O
    /// error or a verifier's own failure.  Never equal to anything.
    #[derive(Debug, Clone)]
    pub struct OtherError(Arc<dyn StdError + Send + Sync>);

    impl OtherError {
        /// Wrap `err`.
        pub fn new(err: impl StdError + Send + Sync + 'static) -> Self {
            Self(Arc::new(err))
        }
    }

    impl PartialEq for OtherError {
        fn eq(&self, _: &Self) -> bool {
            false
        }
    }

    impl fmt::Display for OtherError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(&self.0, f)
        }
    }

    impl StdError for OtherError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self.0.as_ref())
        }
    }
}

pub use other_error::OtherError;
