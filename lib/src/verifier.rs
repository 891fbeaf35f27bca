use std::sync::Arc;

use crate::completion::Verification;
use crate::{ExternalVerifier, HostnameVerifier, Status, VerificationRequest};

/// Peer identity verifier configured for a channel
///
/// Constructed once and shared across handshakes. Every variant holds immutable configuration
/// only, so a single instance may be used concurrently.
#[derive(Clone, Debug)]
pub enum Verifier {
    /// Built-in hostname verification, always synchronous
    Hostname(HostnameVerifier),
    /// Deployment-supplied check, synchronous or asynchronous
    External(ExternalVerifier),
}

impl Verifier {
    /// Start verifying a request
    pub fn verify(&self, request: Arc<VerificationRequest>) -> Verification {
        match self {
            Self::Hostname(verifier) => Verification::Complete(verifier.verify(&request)),
            Self::External(verifier) => verifier.verify(request),
        }
    }

    /// Callback form of [`Verifier::verify`]
    ///
    /// Returns `true` if the final status was written to `sync_status`, in which case
    /// `callback` is never invoked. Returns `false` if the status is deferred, in which case
    /// `sync_status` must not be read and `callback` is invoked exactly once later.
    pub fn verify_with_callback(
        &self,
        request: Arc<VerificationRequest>,
        sync_status: &mut Status,
        callback: impl FnOnce(Status) + Send + 'static,
    ) -> bool {
        match self {
            Self::Hostname(verifier) => {
                *sync_status = verifier.verify(&request);
                true
            }
            Self::External(verifier) => {
                verifier.verify_with_callback(request, sync_status, callback)
            }
        }
    }

    /// `true` if results may be delivered after `verify` returns
    pub fn is_asynchronous(&self) -> bool {
        match self {
            Self::Hostname(_) => false,
            Self::External(verifier) => verifier.is_asynchronous(),
        }
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::Hostname(HostnameVerifier::new())
    }
}

impl From<HostnameVerifier> for Verifier {
    fn from(verifier: HostnameVerifier) -> Self {
        Self::Hostname(verifier)
    }
}

impl From<ExternalVerifier> for Verifier {
    fn from(verifier: ExternalVerifier) -> Self {
        Self::External(verifier)
    }
}
