use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use rustls::{CertificateError, OtherError};

use crate::completion::Verification;
use crate::{Status, VerificationRequest, Verifier};

/// Name mismatches reported by the WebPKI verifiers are superseded by our own name checks.
///
/// Name verification is the LAST step inside the WebPKI verifiers, so trapping it does not
/// skip any chain, signature or validity checks.
pub(crate) fn is_name_mismatch(err: &rustls::Error) -> bool {
    matches!(
        err,
        rustls::Error::InvalidCertificate(
            CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. }
        )
    )
}

/// Run a synchronous verifier against the peer certificate on behalf of a Rustls hook
pub(crate) fn verify_peer(
    verifier: &Verifier,
    target_name: String,
    end_entity: &CertificateDer<'_>,
) -> Result<(), rustls::Error> {
    let request = VerificationRequest::from_certificate(target_name, end_entity)
        .map_err(|err| rustls::Error::General(err.to_string()))?;

    let status = match verifier.verify(Arc::new(request)) {
        Verification::Complete(status) => status,
        // adapters refuse asynchronous verifiers when they are built
        Verification::Pending(_) => {
            Status::rejected("asynchronous verifier used from a synchronous handshake hook")
        }
    };

    tracing::debug!("peer identity verified: {}", status.is_ok());
    tracing::trace!("peer identity verification result: {status}");

    status.into_result().map_err(|err| {
        rustls::Error::InvalidCertificate(CertificateError::Other(OtherError(Arc::new(err))))
    })
}

pub(crate) fn ensure_synchronous(verifier: &Verifier) -> Result<(), crate::Error> {
    if verifier.is_asynchronous() {
        return Err(crate::Error::asynchronous_verifier());
    }
    Ok(())
}
