use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use rustls_pki_types::CertificateDer;
use x509_parser::prelude::*;

/// Subject Alternative Name entries presented by the peer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanNames {
    dns: Vec<String>,
    ip: Vec<IpAddr>,
    uri: Vec<String>,
    email: Vec<String>,
}

impl SanNames {
    /// DNS names, in certificate order
    pub fn dns(&self) -> &[String] {
        self.dns.as_slice()
    }

    /// IP addresses, in certificate order
    pub fn ip(&self) -> &[IpAddr] {
        self.ip.as_slice()
    }

    /// URIs, in certificate order
    pub fn uri(&self) -> &[String] {
        self.uri.as_slice()
    }

    /// RFC 822 email addresses, in certificate order
    pub fn email(&self) -> &[String] {
        self.email.as_slice()
    }

    /// `true` if no entries of any kind are present
    pub fn is_empty(&self) -> bool {
        self.dns.is_empty() && self.ip.is_empty() && self.uri.is_empty() && self.email.is_empty()
    }
}

/// Identity fields of the peer together with the name the caller intended to reach
///
/// The request is assembled with the consuming `with_*` methods and is read-only afterwards.
/// Verifiers receive it by reference, or as an `Arc` when the check runs asynchronously.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationRequest {
    target_name: String,
    common_name: Option<String>,
    san_names: SanNames,
    certificate: Option<CertificateDer<'static>>,
}

impl VerificationRequest {
    /// Start a request for the given target name
    pub fn new(target_name: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            ..Self::default()
        }
    }

    /// Build a request from a DER-encoded end-entity certificate.
    ///
    /// The certificate must already have passed chain validation. Only the subject common name
    /// and the Subject Alternative Name extension are read.
    pub fn from_certificate(
        target_name: impl Into<String>,
        end_entity: &CertificateDer<'_>,
    ) -> Result<Self, crate::Error> {
        let (_, cert) = X509Certificate::from_der(end_entity.as_ref())?;

        let mut request = Self::new(target_name);

        // a common name that cannot be decoded is skipped, the SANs still apply
        if let Some(cn) = cert.subject().iter_common_name().next() {
            match cn.as_str() {
                Ok(cn) => request.common_name = Some(cn.to_string()),
                Err(err) => tracing::trace!("ignoring undecodable common name: {err}"),
            }
        }

        for ext in cert.extensions() {
            if let ParsedExtension::SubjectAlternativeName(san) = ext.parsed_extension() {
                for name in &san.general_names {
                    match name {
                        GeneralName::DNSName(dns) => request.san_names.dns.push(dns.to_string()),
                        GeneralName::URI(uri) => request.san_names.uri.push(uri.to_string()),
                        GeneralName::RFC822Name(email) => {
                            request.san_names.email.push(email.to_string())
                        }
                        GeneralName::IPAddress(bytes) => match ip_from_octets(bytes) {
                            Some(ip) => request.san_names.ip.push(ip),
                            None => tracing::debug!(
                                "ignoring IP SAN with invalid length: {}",
                                bytes.len()
                            ),
                        },
                        _ => {}
                    }
                }
            }
        }

        request.certificate = Some(end_entity.clone().into_owned());

        Ok(request)
    }

    /// Set the subject common name of the peer
    pub fn with_common_name(self, common_name: impl Into<String>) -> Self {
        Self {
            common_name: Some(common_name.into()),
            ..self
        }
    }

    /// Append a DNS SAN entry
    pub fn with_dns_san(mut self, name: impl Into<String>) -> Self {
        self.san_names.dns.push(name.into());
        self
    }

    /// Append an IP address SAN entry
    pub fn with_ip_san(mut self, ip: IpAddr) -> Self {
        self.san_names.ip.push(ip);
        self
    }

    /// Append a URI SAN entry
    pub fn with_uri_san(mut self, uri: impl Into<String>) -> Self {
        self.san_names.uri.push(uri.into());
        self
    }

    /// Append an email SAN entry
    pub fn with_email_san(mut self, email: impl Into<String>) -> Self {
        self.san_names.email.push(email.into());
        self
    }

    /// Attach the DER-encoded end-entity certificate of the peer
    pub fn with_certificate(self, certificate: CertificateDer<'static>) -> Self {
        Self {
            certificate: Some(certificate),
            ..self
        }
    }

    /// Name the caller intended to connect to
    pub fn target_name(&self) -> &str {
        self.target_name.as_str()
    }

    /// Subject common name of the peer, if present
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    /// DNS SAN entries of the peer
    pub fn dns_sans(&self) -> &[String] {
        self.san_names.dns()
    }

    /// All SAN entries of the peer
    pub fn san_names(&self) -> &SanNames {
        &self.san_names
    }

    /// DER-encoded end-entity certificate, when the request was built from one
    pub fn certificate(&self) -> Option<&CertificateDer<'static>> {
        self.certificate.as_ref()
    }
}

fn ip_from_octets(bytes: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
        return Some(IpAddr::V4(Ipv4Addr::from(v4)));
    }
    if let Ok(v6) = <[u8; 16]>::try_from(bytes) {
        return Some(IpAddr::V6(Ipv6Addr::from(v6)));
    }
    None
}
