//! Tests for domain error construction and trace capture.

use super::*;
use rstest::rstest;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn unknown_user_echoes_username_as_json() {
    let username = Username::new("test-user").expect("valid username");
    let error = Error::unknown_user(&username);

    assert_eq!(error.code(), ErrorCode::UnknownUser);
    assert_eq!(error.message(), r#"{"user":"test-user"}"#);
}

#[rstest]
fn unknown_user_escapes_quotes() {
    let username = Username::new(r#"odd"name"#).expect("valid username");
    let error = Error::unknown_user(&username);

    let parsed: serde_json::Value = serde_json::from_str(error.message()).expect("json message");
    assert_eq!(parsed["user"], r#"odd"name"#);
}

#[rstest]
#[case("")]
#[case(" ghost")]
fn unknown_user_name_echoes_raw_text(#[case] raw: &str) {
    let error = Error::unknown_user_name(raw);

    assert_eq!(error.code(), ErrorCode::UnknownUser);
    let parsed: serde_json::Value = serde_json::from_str(error.message()).expect("json message");
    assert_eq!(parsed["user"], raw);
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("trace id");
    let error = TraceId::scope(trace_id, async { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn with_trace_id_overrides_captured_value() {
    let error = Error::invalid_request("bad").with_trace_id("abc");
    assert_eq!(error.trace_id(), Some("abc"));
}

#[rstest]
fn display_uses_message() {
    assert_eq!(Error::internal("boom").to_string(), "boom");
}
