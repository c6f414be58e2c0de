use super::*;
use crate::test_support::FakeMultiplexer;

#[tokio::test]
async fn create_then_send_then_capture_round_trips() {
    let mux = FakeMultiplexer::new();
    mux.create_window("sess-a", "win-1").await.unwrap();
    assert!(mux.has_window("sess-a", "win-1").await.unwrap());

    mux.send_keys("sess-a", "win-1", "hello").await.unwrap();
    let history = mux.get_history("sess-a", "win-1", None).await.unwrap();
    assert!(history.contains("hello"));
}

#[tokio::test]
async fn send_keys_to_missing_window_is_multiplexer_unavailable() {
    let mux = FakeMultiplexer::new();
    let err = mux.send_keys("sess-a", "nope", "hi").await.unwrap_err();
    assert_eq!(err.code(), crate::error::ErrorCode::MultiplexerUnavailable);
}

#[tokio::test]
async fn destroy_window_then_has_window_is_false() {
    let mux = FakeMultiplexer::new();
    mux.create_window("sess-a", "win-1").await.unwrap();
    mux.destroy_window("sess-a", "win-1").await.unwrap();
    assert!(!mux.has_window("sess-a", "win-1").await.unwrap());
}
