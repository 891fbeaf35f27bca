use crate::{Status, VerificationRequest};
use std::net::IpAddr;

/// Diagnostic returned when no certificate name matches the target
pub const HOSTNAME_MISMATCH: &str = "Hostname Verification Check failed.";

/// Controls how much detail a hostname rejection carries
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DiagnosticVerbosity {
    /// Only the fixed diagnostic. Certificate contents never appear in the message.
    #[default]
    Redacted,
    /// Append the target and the rejected candidate names, for operator debugging
    Detailed,
}

/// Built-in check that the peer certificate names the target the caller intended to reach
///
/// Candidates are the subject common name and every DNS SAN entry. A candidate matches if it
/// equals the target (ignoring ASCII case and a trailing dot) or if it is a wildcard of the form
/// `*.<suffix>` covering exactly one leftmost label of the target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostnameVerifier {
    verbosity: DiagnosticVerbosity,
}

impl HostnameVerifier {
    /// Hostname verifier with redacted diagnostics
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the verbosity of rejection diagnostics
    pub fn with_verbosity(self, verbosity: DiagnosticVerbosity) -> Self {
        Self { verbosity }
    }

    /// Verify the request. Always completes before returning.
    pub fn verify(&self, request: &VerificationRequest) -> Status {
        let target = strip_port(request.target_name());

        let candidates: Vec<&str> = request
            .common_name()
            .into_iter()
            .chain(request.dns_sans().iter().map(String::as_str))
            .filter(|name| !name.is_empty())
            .collect();

        if candidates.iter().any(|candidate| matches_host(target, candidate)) {
            return Status::Verified;
        }

        tracing::debug!("peer certificate names do not match the target");

        match self.verbosity {
            DiagnosticVerbosity::Redacted => Status::rejected(HOSTNAME_MISMATCH),
            DiagnosticVerbosity::Detailed => Status::rejected(format!(
                "{HOSTNAME_MISMATCH} target: '{target}', candidates: [{}]",
                candidates.join(", ")
            )),
        }
    }
}

/// Test whether a certificate name matches the target name
///
/// * comparison ignores ASCII case
/// * one trailing dot on either side is ignored
/// * `*.<suffix>` matches iff the target is `<label>.<suffix>` where `<label>` is a single
///   non-empty label
/// * `*.` and partial wildcards such as `f*.example.com` never match
/// * an IP address target only matches the identical address text, never a wildcard
pub fn matches_host(target: &str, candidate: &str) -> bool {
    let (target, candidate) = match (normalize(target), normalize(candidate)) {
        (Some(target), Some(candidate)) => (target, candidate),
        _ => return false,
    };

    // targets are never patterns
    if target.contains('*') {
        return false;
    }

    let suffix = match candidate.strip_prefix("*.") {
        Some(suffix) => suffix,
        None => {
            if candidate.contains('*') {
                return false;
            }
            return candidate.eq_ignore_ascii_case(target);
        }
    };

    if target.parse::<IpAddr>().is_ok() {
        return false;
    }

    if suffix.is_empty() || suffix.contains('*') {
        return false;
    }

    // target must be "<label>.<suffix>"
    if target.len() <= suffix.len() + 1 {
        return false;
    }
    let split = target.len() - suffix.len();
    if !target.is_char_boundary(split) || !target[split..].eq_ignore_ascii_case(suffix) {
        return false;
    }

    let label = &target[..split];
    match label.strip_suffix('.') {
        Some(label) => !label.is_empty() && !label.contains('.'),
        None => false,
    }
}

/// Strip a single trailing dot and reject names with empty labels
fn normalize(name: &str) -> Option<&str> {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return None;
    }
    Some(name)
}

/// Remove a `:port` suffix, handling bracketed IPv6 literals
fn strip_port(target: &str) -> &str {
    if let Some(rest) = target.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, "")) => host,
            Some((host, port)) if is_port(port.strip_prefix(':')) => host,
            _ => target,
        };
    }

    match target.rsplit_once(':') {
        // more than one colon is a bare IPv6 literal
        Some((host, port)) if !host.contains(':') && is_port(Some(port)) => host,
        _ => target,
    }
}

fn is_port(port: Option<&str>) -> bool {
    match port {
        Some(port) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
