//! # tls13-handshake - the client side of a TLS1.3 handshake
//!
//! This crate drives a TLS1.3 client handshake from the first ClientHello
//! to the exchange of Finished messages, derives every secret of the TLS1.3
//! key schedule along the way, authenticates the server, and accepts
//! resumption tickets afterwards.  Offering one of those tickets in a later
//! handshake resumes the session with a pre-shared key.
//!
//! ## What it does not do
//!
//! It doesn't make TCP connections, frame or encrypt records, or buffer
//! fragmented messages.  Handshake messages come in whole, through
//! [`ClientHandshake::received()`]; messages we produce go out whole, through
//! a [`MessageSender`] you supply.  Protecting them with the traffic secrets
//! the engine exposes is the job of your record layer.
//!
//! Server-side handshakes, 0-RTT application data, HelloRetryRequest
//! and any protocol version below TLS1.3 are not supported.
//!
//! ## Getting started
//!
//! First we load some root certificates.  These are used to authenticate the
//! server.
//!
//! ```rust,no_run
//! # let der_roots: Vec<pki_types::CertificateDer<'static>> = Vec::new();
//! let mut root_store = tls13_handshake::RootCertStore::empty();
//! root_store.add_parsable_certificates(der_roots);
//! ```
//!
//! Next, we make a `ClientConfig`.  You're likely to make one of these per
//! process, and use it for all handshakes made by that process.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # let root_store = tls13_handshake::RootCertStore::empty();
//! let verifier = Arc::new(tls13_handshake::WebPkiServerVerifier::new(Arc::new(root_store)));
//! let config = tls13_handshake::ClientConfig::new(verifier)
//!     .with_server_name("example.com".try_into().unwrap());
//! ```
//!
//! Now we can start a handshake.  The ClientHello is passed to the sender
//! immediately; every message from the server is then handed over in turn.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use tls13_handshake::{ClientHandshake, NoStatusEvents, SignatureScheme, Status};
//! # let config: tls13_handshake::ClientConfig = unimplemented!();
//! # fn next_message() -> Vec<u8> { unimplemented!() }
//! let mut handshake = ClientHandshake::new(
//!     Arc::new(config),
//!     Box::new(Vec::<Vec<u8>>::new()),
//!     Box::new(NoStatusEvents),
//! );
//! handshake
//!     .start_handshake(&[SignatureScheme::ECDSA_NISTP256_SHA256])
//!     .unwrap();
//!
//! while handshake.status() != Status::Finished {
//!     handshake.received_bytes(&next_message()).unwrap();
//! }
//! let secret = handshake.client_application_traffic_secret().unwrap();
//! ```
//!
//! # Crate features
//!
//! - `logging` (enabled by default): make the library emit log messages via
//!   the [`log`](https://crates.io/crates/log) crate.

// Deny unsafe code, warn on undocumented public APIs, etc.
#![forbid(unsafe_code, unused_must_use)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::use_self,
    trivial_casts,
    trivial_numeric_casts,
    missing_docs,
    unreachable_pub,
    unused_import_braces,
    unused_extern_crates,
    unused_qualifications
)]
// Relax these clippy lints:
// - new_ret_no_self: we sometimes return `Arc<Self>`, which seems fine
// - single_component_path_imports: our top-level `use log` import causes
//   a false positive, https://github.com/rust-lang/rust-clippy/issues/5210
// - new_without_default: for internal constructors, the indirection is not
//   helpful
#![allow(
    clippy::new_ret_no_self,
    clippy::single_component_path_imports,
    clippy::new_without_default
)]
// Enable documentation for all features on docs.rs
#![cfg_attr(docsrs, feature(doc_cfg))]

// log for logging (optional).
#[cfg(feature = "logging")]
use log;

#[cfg(not(feature = "logging"))]
#[macro_use]
mod log {
    macro_rules! trace    ( ($($tt:tt)*) => {{}} );
    macro_rules! debug    ( ($($tt:tt)*) => {{}} );
    macro_rules! warn     ( ($($tt:tt)*) => {{}} );
    macro_rules! error    ( ($($tt:tt)*) => {{}} );
}

#[macro_use]
mod msgs;
#[macro_use]
mod check;
mod enums;
mod error;
mod hash_hs;
mod key_log;
mod rand;
mod time_provider;
mod verify;
mod webpki;

/// Internal classes which may be useful outside the library.
/// The contents of this section DO NOT form part of the stable interface.
pub mod internal {
    /// Low-level TLS message parsing and encoding functions.
    pub mod msgs {
        pub use crate::msgs::*;
    }
}

/// Crypto provider interface, and the *ring* provider.
pub mod crypto;

/// TLS1.3 cipher suites and key schedule.
pub mod tls13;

// The public interface is:
pub use crate::client::{
    ClientConfig, ClientHandshake, MessageSender, NoStatusEvents, Status, StatusEvents,
};
pub use crate::enums::{
    AlertDescription, CipherSuite, HandshakeType, ProtocolVersion, SignatureScheme,
};
pub use crate::error::{
    ApiMisuse, CertificateError, Error, InvalidMessage, OtherError, PeerIncompatible,
    PeerMisbehaved,
};
pub use crate::key_log::{KeyLog, NoKeyLog};
pub use crate::msgs::handshake::{ClientExtension, ServerExtension};
pub use crate::msgs::message::HandshakeMessage;
pub use crate::msgs::persist::NewSessionTicket;
pub use crate::time_provider::{DefaultTimeProvider, TimeProvider};
pub use crate::tls13::Tls13CipherSuite;
pub use crate::verify::{
    HandshakeSignatureValid, HostnameVerifier, ServerCertVerified, ServerCertVerifier,
};
pub use crate::webpki::{
    RootCertStore, WebPkiHostnameVerifier, WebPkiServerVerifier, WebPkiSupportedAlgorithms,
};

/// Items for use in a client.
mod client;
