//! REPL slash commands driven against the mock backend

mod common;

use common::{app, signed_in_app, FakeIdentity, MockBackend};
use foundry_chat::cli::commands::{handle_command, CommandResult};
use serde_json::json;

#[tokio::test]
async fn test_plain_text_is_chat() {
    let backend = MockBackend::spawn().await;
    let mut app = signed_in_app(&backend).await;

    assert_eq!(
        handle_command("  hello there ", &mut app).await,
        CommandResult::Continue("hello there".to_string())
    );
    assert_eq!(handle_command("/quit", &mut app).await, CommandResult::Exit);
}

#[tokio::test]
async fn test_unknown_command() {
    let backend = MockBackend::spawn().await;
    let mut app = signed_in_app(&backend).await;

    match handle_command("/frobnicate", &mut app).await {
        CommandResult::Handled(output) => assert!(output.starts_with("Unknown command: /frobnicate")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_use_by_number_and_id() {
    let backend = MockBackend::spawn().await;
    backend.set_agents(
        200,
        json!({"agents": [
            {"agent_id": "a1", "display_name": "Agent One"},
            {"agent_id": "a2", "display_name": "Agent Two"},
        ]}),
    );
    let mut app = signed_in_app(&backend).await;

    assert_eq!(
        handle_command("/use 2", &mut app).await,
        CommandResult::Handled("Chatting with Agent Two (a2)".to_string())
    );
    assert_eq!(app.state().selected_agent(), Some("a2"));

    assert_eq!(
        handle_command("/use a1", &mut app).await,
        CommandResult::Handled("Chatting with Agent One (a1)".to_string())
    );

    assert_eq!(handle_command("/use nope", &mut app).await, CommandResult::None);
    assert_eq!(app.error(), Some("Unknown agent: nope"));
    assert_eq!(app.state().selected_agent(), Some("a1"));
}

#[tokio::test]
async fn test_agents_lists_selection() {
    let backend = MockBackend::spawn().await;
    let mut app = signed_in_app(&backend).await;

    assert_eq!(
        handle_command("/agents", &mut app).await,
        CommandResult::Handled("Agents:\n* 1. Agent One (a1)".to_string())
    );
    assert_eq!(backend.requests_to("/agents").len(), 2);
}

#[tokio::test]
async fn test_commands_need_sign_in() {
    let backend = MockBackend::spawn().await;
    let mut app = app(&backend, FakeIdentity::new());

    assert_eq!(
        handle_command("/agents", &mut app).await,
        CommandResult::Handled("Not signed in. Use '/signin' first.".to_string())
    );
    assert_eq!(
        handle_command("/signout", &mut app).await,
        CommandResult::Handled("Not signed in.".to_string())
    );
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_history_after_send() {
    let backend = MockBackend::spawn().await;
    let mut app = signed_in_app(&backend).await;
    assert_eq!(
        handle_command("/history", &mut app).await,
        CommandResult::Handled("No messages yet.".to_string())
    );

    app.send_message("hello").await;

    assert_eq!(
        handle_command("/history", &mut app).await,
        CommandResult::Handled("user: hello\nassistant: hi there".to_string())
    );
}

#[tokio::test]
async fn test_signout_command() {
    let backend = MockBackend::spawn().await;
    let mut app = signed_in_app(&backend).await;

    assert_eq!(
        handle_command("/signout", &mut app).await,
        CommandResult::Handled("Signed out.".to_string())
    );
    assert!(app.account().is_none());
    assert!(app.state().agents().is_empty());
}
