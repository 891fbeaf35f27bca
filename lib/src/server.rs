use rustls::client::danger::HandshakeSignatureValid;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, UnixTime};
use rustls::server::danger::{ClientCertVerified, ClientCertVerifier};
use rustls::server::WebPkiClientVerifier;
use rustls::{DigitallySignedStruct, DistinguishedName, RootCertStore, SignatureScheme};
use std::sync::Arc;

use crate::{Error, Verifier};

/// Create a client certificate verifier (mTLS) that validates the chain against `roots` and
/// then checks the client's identity with `verifier`, using `expected_name` as the target.
///
/// Rustls drives certificate verification synchronously, so asynchronous verifiers are
/// rejected here.
pub fn verifier(
    roots: Arc<RootCertStore>,
    expected_name: impl Into<String>,
    verifier: Verifier,
) -> Result<Arc<dyn ClientCertVerifier>, Error> {
    crate::handshake::ensure_synchronous(&verifier)?;

    let chain =
        WebPkiClientVerifier::builder_with_provider(roots, crate::default_crypto_provider().into())
            .build()?;

    Ok(Arc::new(ClientIdentityVerifier {
        chain,
        expected_name: expected_name.into(),
        verifier,
    }))
}

/// Create a server configuration that requires client certificates and verifies the client's
/// identity with `verifier`
pub fn config(
    roots: Arc<RootCertStore>,
    expected_client_name: impl Into<String>,
    verifier: Verifier,
    local_cert_chain: Vec<CertificateDer<'static>>,
    private_key: PrivateKeyDer<'static>,
) -> Result<rustls::ServerConfig, Error> {
    let verifier = self::verifier(roots, expected_client_name, verifier)?;

    let config = rustls::ServerConfig::builder_with_provider(crate::default_crypto_provider().into())
        .with_safe_default_protocol_versions()?
        .with_client_cert_verifier(verifier)
        .with_single_cert(local_cert_chain, private_key)?;

    Ok(config)
}

#[derive(Debug)]
struct ClientIdentityVerifier {
    chain: Arc<dyn ClientCertVerifier>,
    expected_name: String,
    verifier: Verifier,
}

impl ClientCertVerifier for ClientIdentityVerifier {
    fn offer_client_auth(&self) -> bool {
        self.chain.offer_client_auth()
    }

    fn client_auth_mandatory(&self) -> bool {
        self.chain.client_auth_mandatory()
    }

    fn root_hint_subjects(&self) -> &[DistinguishedName] {
        self.chain.root_hint_subjects()
    }

    fn verify_client_cert(
        &self,
        end_entity: &CertificateDer,
        intermediates: &[CertificateDer],
        now: UnixTime,
    ) -> Result<ClientCertVerified, rustls::Error> {
        let verified = self
            .chain
            .verify_client_cert(end_entity, intermediates, now)?;

        crate::handshake::verify_peer(&self.verifier, self.expected_name.clone(), end_entity)?;

        Ok(verified)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.chain.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.chain.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.chain.supported_verify_schemes()
    }
}
