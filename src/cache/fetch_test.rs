use super::*;

#[test]
fn transport_failures_are_retryable() {
    assert!(FetchError::Request("connection reset".into()).is_retryable());
    assert!(FetchError::Body("eof".into()).is_retryable());
}

#[test]
fn server_errors_and_throttling_are_retryable() {
    assert!(FetchError::Status { status: 503 }.is_retryable());
    assert!(FetchError::Status { status: 429 }.is_retryable());
    assert!(FetchError::Status { status: 408 }.is_retryable());
}

#[test]
fn client_errors_are_not_retryable() {
    assert!(!FetchError::Status { status: 404 }.is_retryable());
    assert!(!FetchError::Status { status: 403 }.is_retryable());
    assert!(!FetchError::ClientBuild("tls".into()).is_retryable());
}

#[test]
fn status_error_message_includes_code() {
    let msg = FetchError::Status { status: 404 }.to_string();
    assert!(msg.contains("404"));
}

#[test]
fn http_fetcher_builds_with_default_timeouts() {
    assert!(HttpFetcher::new(HttpTimeouts::default()).is_ok());
}
