use std::sync::Arc;

use pki_types::{CertificateDer, ServerName, UnixTime};

use super::{pki_error, RootCertStore, WebPkiSupportedAlgorithms};
use crate::crypto::ring::SUPPORTED_SIG_ALGS;
use crate::error::Error;
#[cfg(feature = "logging")]
use crate::log::debug;
use crate::verify::{HostnameVerifier, ServerCertVerified, ServerCertVerifier};

/// Checks that the server's chain leads to one of `roots` and is valid
/// now.  It does no revocation checking and leaves names to a
/// [`HostnameVerifier`].
#[derive(Debug)]
pub struct WebPkiServerVerifier {
    roots: Arc<RootCertStore>,
    supported: WebPkiSupportedAlgorithms,
}

impl WebPkiServerVerifier {
    /// Verify against `roots`, with every algorithm *ring* supports.
    pub fn new(roots: impl Into<Arc<RootCertStore>>) -> Self {
        Self::new_with_algorithms(roots, SUPPORTED_SIG_ALGS)
    }

    /// Like `new`, but chains may only be signed with `supported.all`.
    pub fn new_with_algorithms(
        roots: impl Into<Arc<RootCertStore>>,
        supported: WebPkiSupportedAlgorithms,
    ) -> Self {
        Self {
            roots: roots.into(),
            supported,
        }
    }
}

impl ServerCertVerifier for WebPkiServerVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        webpki::EndEntityCert::try_from(end_entity)
            .and_then(|cert| {
                cert.verify_for_usage(
                    self.supported.all,
                    self.roots.anchors(),
                    intermediates,
                    now,
                    webpki::KeyUsage::server_auth(),
                    None,
                    None,
                )
                .map(|_| ())
            })
            .map_err(pki_error)?;

        Ok(ServerCertVerified::assertion())
    }
}

/// Matches the server name against the subject alternative names of the
/// end-entity certificate.
#[derive(Debug, Default)]
pub struct WebPkiHostnameVerifier;

impl HostnameVerifier for WebPkiHostnameVerifier {
    fn verify_hostname(&self, server_name: &ServerName<'_>, end_entity: &CertificateDer<'_>) -> bool {
        let result = webpki::EndEntityCert::try_from(end_entity)
            .and_then(|cert| cert.verify_is_valid_for_subject_name(server_name));

        match result {
            Ok(()) => true,
            Err(_err) => {
                debug!("{:?} does not name the certificate: {:?}", server_name, _err);
                false
            }
        }
    }
}
