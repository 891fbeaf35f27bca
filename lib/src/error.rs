use rustls::client::VerifierBuilderError;

/// Opaque error type used by the library that implements [`std::error::Error`].
#[derive(Debug)]
pub struct Error {
    details: Details,
}

impl Error {
    pub(crate) fn rejected(message: String) -> Self {
        Self {
            details: Details::Rejected(message),
        }
    }

    pub(crate) fn asynchronous_verifier() -> Self {
        Self {
            details: Details::AsynchronousVerifier,
        }
    }

    /// Diagnostic of a rejected peer identity, if this error is a rejection
    pub fn rejection(&self) -> Option<&str> {
        match &self.details {
            Details::Rejected(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

impl std::error::Error for Error {}

impl From<x509_parser::nom::Err<x509_parser::error::X509Error>> for Error {
    fn from(err: x509_parser::nom::Err<x509_parser::error::X509Error>) -> Self {
        Self {
            details: Details::X509(err),
        }
    }
}

impl From<x509_parser::error::X509Error> for Error {
    fn from(err: x509_parser::error::X509Error) -> Self {
        Self {
            details: Details::X509(x509_parser::nom::Err::Error(err)),
        }
    }
}

impl From<rustls::Error> for Error {
    fn from(err: rustls::Error) -> Self {
        Self {
            details: Details::Tls(err),
        }
    }
}

impl From<VerifierBuilderError> for Error {
    fn from(err: VerifierBuilderError) -> Self {
        Self {
            details: Details::BuilderError(err),
        }
    }
}

#[derive(Debug)]
enum Details {
    /// Error decoding the peer certificate
    X509(x509_parser::nom::Err<x509_parser::error::X509Error>),
    /// Error returned by Rustls
    Tls(rustls::Error),
    /// Error building a certificate verifier
    BuilderError(VerifierBuilderError),
    /// Asynchronous verifier handed to a synchronous Rustls hook
    AsynchronousVerifier,
    /// Peer identity rejected by a verifier
    Rejected(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.details {
            Details::X509(err) => write!(f, "X.509 error: {err}"),
            Details::Tls(err) => write!(f, "Rustls error: {err}"),
            Details::BuilderError(err) => write!(f, "Error building certificate verifier: {err}"),
            Details::AsynchronousVerifier => f.write_str(
                "asynchronous verifiers cannot be driven by Rustls' synchronous certificate verification",
            ),
            Details::Rejected(msg) => write!(f, "peer identity rejected: {msg}"),
        }
    }
}
