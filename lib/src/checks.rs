use std::sync::Arc;

use rustls_pki_types::CertificateDer;

use crate::{AsyncCheck, Completer, Status, SyncCheck, VerificationRequest};

/// Diagnostic of a [`Fixed`] check configured to fail
pub const FIXED_FAILURE: &str = "fixed check is configured to fail";

/// Check with a predetermined outcome, useful in tests and for staging deployments
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fixed {
    succeed: bool,
}

impl Fixed {
    /// Check that accepts every peer
    pub fn passing() -> Self {
        Self { succeed: true }
    }

    /// Check that rejects every peer
    pub fn failing() -> Self {
        Self { succeed: false }
    }

    fn status(&self) -> Status {
        if self.succeed {
            Status::Verified
        } else {
            Status::rejected(FIXED_FAILURE)
        }
    }
}

impl SyncCheck for Fixed {
    fn check(&self, _request: &VerificationRequest) -> Status {
        self.status()
    }
}

impl AsyncCheck for Fixed {
    fn check(&self, _request: Arc<VerificationRequest>, completer: Completer) {
        completer.complete(self.status())
    }
}

/// Accepts only a peer presenting exactly the expected end-entity certificate
///
/// Comparing the full DER is stronger than any name check. Requests that do not carry the
/// certificate are rejected.
#[derive(Clone, Debug)]
pub struct PinnedCertificate {
    expected: CertificateDer<'static>,
}

impl PinnedCertificate {
    /// Pin the given DER-encoded certificate
    pub fn new(expected: CertificateDer<'static>) -> Self {
        Self { expected }
    }
}

impl SyncCheck for PinnedCertificate {
    fn check(&self, request: &VerificationRequest) -> Status {
        match request.certificate() {
            Some(cert) if cert == &self.expected => Status::Verified,
            Some(_) => Status::rejected("peer certificate does not match the pinned certificate"),
            None => Status::rejected("no peer certificate available to compare with the pin"),
        }
    }
}

/// Accepts a peer iff one of its URI SAN entries is in the allow-list
///
/// URIs are compared byte-for-byte, as identities such as SPIFFE IDs are case sensitive.
#[derive(Clone, Debug, Default)]
pub struct UriAllowList {
    allowed: Vec<String>,
}

impl UriAllowList {
    /// Allow-list with the given URIs
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl SyncCheck for UriAllowList {
    fn check(&self, request: &VerificationRequest) -> Status {
        let presented = request.san_names().uri();
        if presented.iter().any(|uri| self.allowed.contains(uri)) {
            return Status::Verified;
        }
        tracing::debug!("none of {} URI SAN entries is allowed", presented.len());
        Status::rejected("peer URI SAN is not in the allow-list")
    }
}
