use super::*;
use crate::test_support::FakeMultiplexer;

fn service_with(mux: FakeMultiplexer, dir: &tempfile::TempDir) -> TerminalService {
    let store = Arc::new(MetadataStore::open(dir.path().join("store.jsonl")).unwrap());
    let providers = Arc::new(ProviderManager::new(store.clone()));
    let log_reader = Arc::new(LogReader::new(dir.path().join("logs"), 100));
    let config = CoreConfig {
        init_poll_interval: std::time::Duration::from_millis(1),
        init_timeout: std::time::Duration::from_millis(20),
        ..CoreConfig::default()
    };
    TerminalService::new(Arc::new(mux), store, providers, log_reader, config)
}

#[tokio::test]
async fn create_terminal_registers_window_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let mux = FakeMultiplexer::new().with_echo_after_send("\u{276f} ");
    let service = service_with(mux, &dir);

    let terminal = service.create_terminal(ProviderKind::Codex, None, None).await.unwrap();
    assert_eq!(service.get_terminal(&terminal.id).unwrap().id, terminal.id);
    assert_eq!(service.list_terminals().len(), 1);
}

#[tokio::test]
async fn create_terminal_rolls_back_on_provider_init_timeout() {
    let dir = tempfile::tempdir().unwrap();
    // No echo configured: the fake agent never reaches idle, so
    // initialize() times out and creation must leave no trace.
    let mux = FakeMultiplexer::new();
    let service = service_with(mux, &dir);

    let err = service.create_terminal(ProviderKind::Codex, None, None).await.unwrap_err();
    assert_eq!(err.code(), crate::error::ErrorCode::Timeout);
    assert!(service.list_terminals().is_empty());
}

#[tokio::test]
async fn destroy_terminal_removes_metadata_and_window() {
    let dir = tempfile::tempdir().unwrap();
    let mux = FakeMultiplexer::new().with_echo_after_send("\u{276f} ");
    let service = service_with(mux, &dir);

    let terminal = service.create_terminal(ProviderKind::Codex, None, None).await.unwrap();
    service.destroy_terminal(&terminal.id, true).await.unwrap();

    assert!(service.get_terminal(&terminal.id).is_err());
    assert!(service.list_terminals().is_empty());
}

#[tokio::test]
async fn send_input_to_unknown_terminal_is_unknown_terminal_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_with(FakeMultiplexer::new(), &dir);
    let err = service.send_input("ghost", "hello").await.unwrap_err();
    assert_eq!(err.code(), crate::error::ErrorCode::UnknownTerminal);
}

#[tokio::test]
async fn get_output_last_extracts_reply_via_provider() {
    let dir = tempfile::tempdir().unwrap();
    let mux = FakeMultiplexer::new().with_echo_after_send("\u{276f} ");
    let service = service_with(mux, &dir);

    let terminal = service.create_terminal(ProviderKind::Codex, None, None).await.unwrap();
    service.send_input(&terminal.id, "You fix the tests").await.unwrap();
    service.send_input(&terminal.id, "codex: tests now pass").await.unwrap();

    let last = service.get_output(&terminal.id, OutputMode::Last).await.unwrap();
    assert!(last.contains("tests now pass"));
}
