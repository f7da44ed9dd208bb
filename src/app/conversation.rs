//! Conversation controller
//!
//! A send appends the user message right away, then either the assistant's
//! answer or a displayed error. The user message is never rolled back.

use crate::api::ApiRequest;
use crate::app::App;
use crate::core::{ChatRequest, ChatResponse, Message};

impl App {
    /// Edit the input draft
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.set_input(text);
    }

    /// Send whatever is in the input draft
    pub async fn submit_input(&mut self) {
        let text = self.state.input().to_string();
        self.send_message(&text).await;
    }

    /// Send `text` to the selected agent.
    ///
    /// Blank text or no selected agent makes this a no-op.
    pub async fn send_message(&mut self, text: &str) {
        let text = text.trim();
        let Some(agent_id) = self.state.selected_agent().map(str::to_string) else {
            return;
        };
        if text.is_empty() {
            return;
        }

        self.state.clear_input();
        self.state.clear_error();
        self.state.push_message(Message::user(text));

        let body = match serde_json::to_value(ChatRequest {
            agent_id: &agent_id,
            message: text,
        }) {
            Ok(body) => body,
            Err(e) => {
                self.state.set_error(e.to_string());
                return;
            }
        };

        let result = self
            .api
            .fetch::<ChatResponse>(&self.session, "/chat", ApiRequest::post(body))
            .await;

        match result {
            Ok(res) => {
                self.state
                    .push_message(Message::assistant(res.answer_or_placeholder()));
            }
            Err(e) => {
                tracing::warn!(agent_id = %agent_id, "Chat request failed: {}", e);
                self.state.set_error(e.to_string());
            }
        }
    }
}
