use super::*;
use axum::routing::post;
use axum::Json;

async fn fixed_terminal() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "id": "t-1", "session_name": "fleet-t1" }))
}

async fn spawn_fake_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let router = axum::Router::new().route("/terminals", post(fixed_terminal));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn headless_launch_succeeds_without_attaching() {
    let url = spawn_fake_server().await;
    let args = LaunchArgs {
        url,
        agent_profile: "reviewer".to_string(),
        session_name: None,
        provider: Some("codex".to_string()),
        headless: true,
    };
    assert_eq!(run(args).await, 0);
}

#[tokio::test]
async fn connection_refused_returns_1() {
    let args = LaunchArgs {
        url: "http://127.0.0.1:1".to_string(),
        agent_profile: "reviewer".to_string(),
        session_name: None,
        provider: None,
        headless: true,
    };
    assert_eq!(run(args).await, 1);
}

#[test]
fn attach_to_unknown_tmux_session_fails() {
    assert_ne!(attach("fleet-session-that-does-not-exist"), 0);
}
