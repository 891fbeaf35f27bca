use sfio_peer_verify::{
    matches_host, DiagnosticVerbosity, HostnameVerifier, Status, VerificationRequest,
    HOSTNAME_MISMATCH,
};

fn verify(request: VerificationRequest) -> Status {
    HostnameVerifier::new().verify(&request)
}

#[test]
fn exact_names_match_ignoring_case() {
    assert!(matches_host("foo.bar.com", "foo.bar.com"));
    assert!(matches_host("FOO.bar.com", "foo.BAR.com"));
    assert!(!matches_host("foo.bar.com", "foo.baz.com"));
    assert!(!matches_host("foo.bar.com", "bar.com"));
}

#[test]
fn wildcard_covers_exactly_one_label() {
    assert!(matches_host("foo.bar.com", "*.bar.com"));
    assert!(matches_host("FOO.BAR.COM", "*.bar.com"));
    assert!(!matches_host("a.foo.bar.com", "*.bar.com"));
    assert!(!matches_host("bar.com", "*.bar.com"));
    assert!(!matches_host(".bar.com", "*.bar.com"));
    assert!(!matches_host("foobar.com", "*.bar.com"));
}

#[test]
fn degenerate_wildcards_match_nothing() {
    assert!(!matches_host("foo.bar.com", "*."));
    assert!(!matches_host("foo.bar.com", "*"));
    assert!(!matches_host("foo.bar.com", "f*.bar.com"));
    assert!(!matches_host("foo.bar.com", "*.*.com"));
    assert!(!matches_host("foo.bar.com", "foo.*.com"));
    assert!(!matches_host("*.bar.com", "*.bar.com"));
}

#[test]
fn ip_address_targets_match_only_exactly() {
    assert!(matches_host("10.0.0.1", "10.0.0.1"));
    assert!(!matches_host("10.0.0.1", "*.0.0.1"));
    assert!(!matches_host("10.0.0.1", "10.0.0.2"));

    let request = VerificationRequest::new("10.0.0.1:443").with_dns_san("*.0.0.1");
    assert!(!verify(request).is_ok());
}

#[test]
fn trailing_dots_and_empty_labels() {
    assert!(matches_host("foo.bar.com.", "foo.bar.com"));
    assert!(matches_host("foo.bar.com", "*.bar.com."));
    assert!(!matches_host("foo..bar.com", "foo..bar.com"));
    assert!(!matches_host("", ""));
    assert!(!matches_host("foo.bar.com", ""));
}

#[test]
fn common_name_match_succeeds() {
    let status = verify(VerificationRequest::new("foo.bar.com").with_common_name("foo.bar.com"));
    assert_eq!(status, Status::Verified);
}

#[test]
fn common_name_mismatch_fails_with_fixed_diagnostic() {
    let status = verify(VerificationRequest::new("foo.bar.com").with_common_name("foo.baz.com"));
    assert_eq!(status.message(), Some(HOSTNAME_MISMATCH));
}

#[test]
fn dns_san_rescues_common_name_mismatch() {
    let request = VerificationRequest::new("foo.bar.com")
        .with_common_name("foo.baz.com")
        .with_dns_san("*.bar.com");
    assert!(verify(request).is_ok());
}

#[test]
fn empty_suffix_wildcard_san_fails() {
    let request = VerificationRequest::new("foo.bar.com")
        .with_common_name("foo.baz.com")
        .with_dns_san("*.");
    assert!(!verify(request).is_ok());
}

#[test]
fn every_candidate_is_tried() {
    let request = VerificationRequest::new("foo.bar.com")
        .with_dns_san("")
        .with_dns_san("nope.example.com")
        .with_dns_san("*.")
        .with_dns_san("foo.bar.com");
    assert!(verify(request).is_ok());
}

#[test]
fn empty_common_name_is_not_a_candidate() {
    let request = VerificationRequest::new("").with_common_name("");
    assert!(!verify(request).is_ok());
}

#[test]
fn no_names_at_all_fails() {
    assert!(!verify(VerificationRequest::new("foo.bar.com")).is_ok());
}

#[test]
fn port_is_ignored() {
    let request = VerificationRequest::new("foo.bar.com:443").with_dns_san("*.bar.com");
    assert!(verify(request).is_ok());

    let request = VerificationRequest::new("[::1]:8443").with_common_name("::1");
    assert!(verify(request).is_ok());

    let request = VerificationRequest::new("foo.bar.com:").with_dns_san("*.bar.com");
    assert!(!verify(request).is_ok());
}

#[test]
fn detailed_diagnostics_list_candidates() {
    let request = VerificationRequest::new("foo.bar.com")
        .with_common_name("foo.baz.com")
        .with_dns_san("*.qux.com");
    let status = HostnameVerifier::new()
        .with_verbosity(DiagnosticVerbosity::Detailed)
        .verify(&request);

    let message = status.message().unwrap();
    assert!(message.starts_with(HOSTNAME_MISMATCH));
    assert!(message.contains("foo.bar.com"));
    assert!(message.contains("foo.baz.com"));
    assert!(message.contains("*.qux.com"));
}

#[test]
fn redacted_diagnostics_do_not_leak_candidates() {
    let request = VerificationRequest::new("foo.bar.com").with_common_name("secret.internal");
    let status = verify(request);
    assert!(!status.message().unwrap().contains("secret.internal"));
}
