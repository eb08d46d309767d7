use core::fmt;

use pki_types::{CertificateDer, SignatureVerificationAlgorithm};

use super::pki_error;
use crate::enums::SignatureScheme;
use crate::error::{Error, PeerMisbehaved};
use crate::msgs::handshake::DigitallySignedStruct;
use crate::verify::HandshakeSignatureValid;

/// The webpki algorithms used to check server certificates and
/// CertificateVerify signatures.
#[derive(Clone, Copy)]
pub struct WebPkiSupportedAlgorithms {
    /// Algorithms a certificate chain may be signed with.
    pub all: &'static [&'static dyn SignatureVerificationAlgorithm],

    /// The handshake signature schemes we accept, most preferred first,
    /// each with the one algorithm that verifies it.
    pub mapping: &'static [(SignatureScheme, &'static dyn SignatureVerificationAlgorithm)],
}

impl WebPkiSupportedAlgorithms {
    /// The schemes in `mapping`, in order.
    pub fn supported_schemes(&self) -> Vec<SignatureScheme> {
        self.mapping
            .iter()
            .map(|(scheme, _)| *scheme)
            .collect()
    }

    /// True if `scheme` is in `mapping`.
    pub fn supports_scheme(&self, scheme: SignatureScheme) -> bool {
        self.algorithm_for(scheme).is_some()
    }

    fn algorithm_for(
        &self,
        scheme: SignatureScheme,
    ) -> Option<&'static dyn SignatureVerificationAlgorithm> {
        self.mapping
            .iter()
            .find(|(s, _)| *s == scheme)
            .map(|(_, alg)| *alg)
    }
}

impl fmt::Debug for WebPkiSupportedAlgorithms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.mapping.iter().map(|(scheme, _)| scheme))
            .finish()
    }
}

/// Check the server's CertificateVerify: `dss` must be a signature over
/// `msg` by the key in `cert`, under a scheme `supported` can verify.
///
/// A scheme we never offered is the server misbehaving; a signature that
/// does not verify is [`Error::DecryptError`].
pub(crate) fn verify_tls13_signature(
    msg: &[u8],
    cert: &CertificateDer<'_>,
    dss: &DigitallySignedStruct,
    supported: &WebPkiSupportedAlgorithms,
) -> Result<HandshakeSignatureValid, Error> {
    let alg = supported
        .algorithm_for(dss.scheme)
        .ok_or(PeerMisbehaved::SignedHandshakeWithUnadvertisedSigScheme)?;

    webpki::EndEntityCert::try_from(cert)
        .map_err(pki_error)?
        .verify_signature(alg, msg, dss.signature())
        .map_err(|_| Error::DecryptError)?;

    Ok(HandshakeSignatureValid::assertion())
}
