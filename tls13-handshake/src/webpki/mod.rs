//! Default trust validation, hostname checking and CertificateVerify
//! signature checking, all backed by `webpki`.

use crate::error::{CertificateError, Error, OtherError};

mod anchors;
mod server_verifier;
mod verify;

pub use anchors::RootCertStore;
pub use server_verifier::{WebPkiHostnameVerifier, WebPkiServerVerifier};
pub(crate) use verify::verify_tls13_signature;
pub use verify::WebPkiSupportedAlgorithms;

fn pki_error(error: webpki::Error) -> Error {
    use webpki::Error::*;
    match error {
        BadDer | BadDerTime | TrailingData(_) => CertificateError::BadEncoding.into(),
        CertNotValidYet => CertificateError::NotValidYet.into(),
        CertExpired | InvalidCertValidity => CertificateError::Expired.into(),
        UnknownIssuer => CertificateError::UnknownIssuer.into(),
        CertNotValidForName => CertificateError::NotValidForName.into(),
        CertRevoked => CertificateError::Revoked.into(),
        UnsupportedCriticalExtension => CertificateError::UnhandledCriticalExtension.into(),
        RequiredEkuNotFound => CertificateError::InvalidPurpose.into(),

        InvalidSignatureForPublicKey
        | UnsupportedSignatureAlgorithm
        | UnsupportedSignatureAlgorithmForPublicKey => CertificateError::BadSignature.into(),

        _ => CertificateError::Other(OtherError::new(error)).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pki_errors_map_to_certificate_errors() {
        assert_eq!(
            pki_error(webpki::Error::BadDer),
            Error::InvalidCertificate(CertificateError::BadEncoding)
        );
        assert_eq!(
            pki_error(webpki::Error::CertExpired),
            Error::InvalidCertificate(CertificateError::Expired)
        );
        assert_eq!(
            pki_error(webpki::Error::UnknownIssuer),
            Error::InvalidCertificate(CertificateError::UnknownIssuer)
        );
        assert_eq!(
            pki_error(webpki::Error::CertNotValidForName),
            Error::InvalidCertificate(CertificateError::NotValidForName)
        );
        assert!(matches!(
            pki_error(webpki::Error::PathLenConstraintViolated),
            Error::InvalidCertificate(CertificateError::Other(_))
        ));
    }
}
