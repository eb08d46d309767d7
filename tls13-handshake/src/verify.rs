use core::fmt::Debug;

use pki_types::{CertificateDer, ServerName, UnixTime};

use crate::error::Error;

// Proof tokens.  The client states carry these from the check that made
// them to the state that relies on it, so skipping a check fails to
// compile.  Grep for `assertion()` to find every place one is minted.

/// The server's CertificateVerify signature checked out.
#[derive(Debug)]
pub struct HandshakeSignatureValid(());

impl HandshakeSignatureValid {
    /// Mint the token; only call after a successful check.
    pub fn assertion() -> Self {
        Self(())
    }
}

/// The server's Finished MAC checked out.
#[derive(Debug)]
pub(crate) struct FinishedMessageVerified(());

impl FinishedMessageVerified {
    pub(crate) fn assertion() -> Self {
        Self(())
    }
}

/// The server's certificate chain was accepted.
#[derive(Debug)]
pub struct ServerCertVerified(());

impl ServerCertVerified {
    /// Mint the token; only call after a successful check.
    pub fn assertion() -> Self {
        Self(())
    }
}

/// Decides whether the server's chain leads to something we trust.
///
/// Names are not its concern; a [`HostnameVerifier`] checks those.
pub trait ServerCertVerifier: Debug + Send + Sync {
    /// `end_entity` is the first certificate of the server's Certificate
    /// message and `intermediates` the rest, in the order sent, possibly
    /// none.  Nothing has been parsed yet.
    ///
    /// Rejections should be an [`Error::InvalidCertificate`], ideally with
    /// [`CertificateError::BadEncoding`](crate::CertificateError::BadEncoding)
    /// for anything that does not parse.  The engine answers them with a
    /// `bad_certificate` alert.
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        now: UnixTime,
    ) -> Result<ServerCertVerified, Error>;
}

/// Decides whether a certificate names the server we meant to reach.
pub trait HostnameVerifier: Debug + Send + Sync {
    /// True if `end_entity` is valid for `server_name`.
    fn verify_hostname(&self, server_name: &ServerName<'_>, end_entity: &CertificateDer<'_>) -> bool;
}
