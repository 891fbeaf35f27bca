#![doc = include_str!("../README.md")]

#[cfg(all(feature = "crypto-ring", feature = "crypto-aws-lc-rs"))]
compile_error!("Features 'crypto-ring' and 'crypto-aws-lc-rs' are mutually exclusive and cannot be enabled together");

#[cfg(not(any(feature = "crypto-ring", feature = "crypto-aws-lc-rs")))]
compile_error!("'crypto-ring' OR 'crypto-aws-lc-rs' must be enabled");

#[cfg(feature = "crypto-ring")]
pub(crate) use rustls::crypto::ring::default_provider as default_crypto_provider;

#[cfg(feature = "crypto-aws-lc-rs")]
pub(crate) use rustls::crypto::aws_lc_rs::default_provider as default_crypto_provider;

/// Built-in custom checks
pub mod checks;
/// Client configurations that verify the server's identity
pub mod client;
/// Single-shot delivery of deferred verification results
pub mod completion;
/// Server configurations that verify the client's identity
pub mod server;

mod error;
mod external;
mod hostname;
mod request;
mod status;
mod verifier;

pub use completion::{Completer, Pending, Verification};
pub use error::*;
pub use external::*;
pub use hostname::*;
pub use request::*;
pub use status::*;
pub use verifier::*;

pub(crate) mod handshake;
