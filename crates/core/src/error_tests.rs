use super::*;

#[test]
fn unknown_terminal_maps_to_404() {
    let err = CoreError::UnknownTerminal("abc123".to_string());
    assert_eq!(err.code().http_status(), 404);
    assert_eq!(err.code().as_str(), "UNKNOWN_TERMINAL");
}

#[test]
fn timeout_maps_to_504() {
    let err = CoreError::Timeout("shell wait".to_string());
    assert_eq!(err.code().http_status(), 504);
}

#[test]
fn delivery_failure_carries_message_id() {
    let err = CoreError::DeliveryFailure {
        message_id: "m-1".to_string(),
        reason: "send_input raised".to_string(),
    };
    assert!(err.to_string().contains("m-1"));
    assert_eq!(err.code().http_status(), 502);
}
