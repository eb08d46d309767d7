use core::fmt;

use pki_types::{CertificateDer, TrustAnchor};
use webpki::anchor_from_trusted_cert;

use super::pki_error;
use crate::error::Error;
#[cfg(feature = "logging")]
use crate::log::debug;

/// The trust anchors a server's chain must lead back to.
#[derive(Clone, Default)]
pub struct RootCertStore {
    anchors: Vec<TrustAnchor<'static>>,
}

impl RootCertStore {
    /// A store that trusts nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Trust `der`, failing if it does not parse as a certificate.
    pub fn add(&mut self, der: CertificateDer<'_>) -> Result<(), Error> {
        let anchor = anchor_from_trusted_cert(&der).map_err(pki_error)?;
        self.anchors.push(anchor.to_owned());
        Ok(())
    }

    /// Trust every certificate in `ders` that parses, skipping the rest.
    ///
    /// System bundles tend to carry a few malformed roots, so one bad
    /// entry should not cost the whole bundle.  Returns `(added, skipped)`.
    pub fn add_parsable_certificates<'a>(
        &mut self,
        ders: impl IntoIterator<Item = CertificateDer<'a>>,
    ) -> (usize, usize) {
        let before = self.anchors.len();
        let mut skipped = 0;
        for der in ders {
            if self.add(der).is_err() {
                skipped += 1;
            }
        }
        let added = self.anchors.len() - before;
        debug!("root store took {} certificates and skipped {}", added, skipped);
        (added, skipped)
    }

    /// How many anchors are trusted.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// True if nothing is trusted yet.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub(crate) fn anchors(&self) -> &[TrustAnchor<'static>] {
        &self.anchors
    }
}

impl fmt::Debug for RootCertStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootCertStore({} anchors)", self.anchors.len())
    }
}
