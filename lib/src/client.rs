use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::sync::Arc;

use crate::{Error, Verifier};

/// Create a server certificate verifier that validates the chain against `roots` and then
/// delegates the identity decision to `verifier`, using the TLS server name as the target.
///
/// Rustls drives certificate verification synchronously, so asynchronous verifiers are
/// rejected here.
pub fn verifier(
    roots: Arc<RootCertStore>,
    verifier: Verifier,
) -> Result<Arc<dyn ServerCertVerifier>, Error> {
    crate::handshake::ensure_synchronous(&verifier)?;

    let chain =
        WebPkiServerVerifier::builder_with_provider(roots, crate::default_crypto_provider().into())
            .build()?;

    Ok(Arc::new(PeerIdentityVerifier { chain, verifier }))
}

/// Create a client configuration without client authentication that verifies the server's
/// identity with `verifier`
pub fn config(roots: Arc<RootCertStore>, verifier: Verifier) -> Result<rustls::ClientConfig, Error> {
    let config = rustls::ClientConfig::builder_with_provider(crate::default_crypto_provider().into())
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(self::verifier(roots, verifier)?)
        .with_no_client_auth();

    Ok(config)
}

#[derive(Debug)]
struct PeerIdentityVerifier {
    chain: Arc<WebPkiServerVerifier>,
    verifier: Verifier,
}

impl ServerCertVerifier for PeerIdentityVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        match self
            .chain
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Ok(_) => {}
            Err(err) if crate::handshake::is_name_mismatch(&err) => {}
            Err(err) => return Err(err),
        }

        crate::handshake::verify_peer(&self.verifier, target_name(server_name), end_entity)?;

        Ok(ServerCertVerified::assertion())
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

fn target_name(server_name: &ServerName<'_>) -> String {
    match server_name {
        ServerName::DnsName(name) => name.as_ref().to_string(),
        ServerName::IpAddress(ip) => std::net::IpAddr::from(*ip).to_string(),
        _ => String::new(),
    }
}
