//! Application state container
//!
//! Agents, the selected agent, the transcript, the input draft and the
//! displayed error. It starts empty, is filled after sign-in and is reset on
//! sign-out.

use crate::core::{Agent, Message};

/// Everything the user sees besides the account
#[derive(Debug, Clone, Default)]
pub struct AppState {
    agents: Vec<Agent>,
    selected_agent: Option<String>,
    /// Append-only transcript
    messages: Vec<Message>,
    input: String,
    error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agents from the last successful load
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Id of the selected agent
    pub fn selected_agent(&self) -> Option<&str> {
        self.selected_agent.as_deref()
    }

    /// The selected agent's directory entry
    pub fn selected_agent_info(&self) -> Option<&Agent> {
        let id = self.selected_agent.as_deref()?;
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Replace the agent list wholesale.
    ///
    /// A selection missing from the new list is dropped; with no selection
    /// left, the first listed agent is selected.
    pub fn replace_agents(&mut self, agents: Vec<Agent>) {
        self.agents = agents;

        if let Some(ref id) = self.selected_agent {
            if !self.agents.iter().any(|a| &a.id == id) {
                self.selected_agent = None;
            }
        }

        if self.selected_agent.is_none() {
            self.selected_agent = self.agents.first().map(|a| a.id.clone());
        }
    }

    /// Select a listed agent; returns false if `id` is not in the list
    pub fn select_agent(&mut self, id: &str) -> bool {
        if self.agents.iter().any(|a| a.id == id) {
            self.selected_agent = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Append to the transcript
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop agents, selection and transcript
    pub fn reset(&mut self) {
        self.agents.clear();
        self.selected_agent = None;
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents() -> Vec<Agent> {
        vec![Agent::new("a1", "Agent One"), Agent::new("a2", "Agent Two")]
    }

    #[test]
    fn test_first_agent_selected() {
        let mut state = AppState::new();
        state.replace_agents(agents());
        assert_eq!(state.selected_agent(), Some("a1"));
        assert_eq!(state.selected_agent_info().unwrap().display_name, "Agent One");
    }

    #[test]
    fn test_empty_list_leaves_selection_unset() {
        let mut state = AppState::new();
        state.replace_agents(vec![]);
        assert_eq!(state.selected_agent(), None);
    }

    #[test]
    fn test_existing_selection_kept() {
        let mut state = AppState::new();
        state.replace_agents(agents());
        assert!(state.select_agent("a2"));

        state.replace_agents(agents());
        assert_eq!(state.selected_agent(), Some("a2"));
    }

    #[test]
    fn test_stale_selection_replaced() {
        let mut state = AppState::new();
        state.replace_agents(agents());
        assert!(state.select_agent("a2"));

        state.replace_agents(vec![Agent::new("a3", "Agent Three")]);
        assert_eq!(state.selected_agent(), Some("a3"));
    }

    #[test]
    fn test_unknown_agent_not_selected() {
        let mut state = AppState::new();
        state.replace_agents(agents());
        assert!(!state.select_agent("nope"));
        assert_eq!(state.selected_agent(), Some("a1"));
    }

    #[test]
    fn test_reset() {
        let mut state = AppState::new();
        state.replace_agents(agents());
        state.push_message(Message::user("hello"));
        state.set_input("draft");

        state.reset();
        assert!(state.agents().is_empty());
        assert_eq!(state.selected_agent(), None);
        assert!(state.messages().is_empty());
        assert_eq!(state.input(), "draft");
    }
}
