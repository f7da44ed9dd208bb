//! Agent directory loading and selection

use crate::api::ApiRequest;
use crate::app::App;
use crate::core::AgentsResponse;

impl App {
    /// Fetch `/agents` and replace the agent list.
    ///
    /// On failure the previous list stays and the error is shown.
    pub async fn load_agents(&mut self) {
        self.state.clear_error();

        let result = self
            .api
            .fetch::<AgentsResponse>(&self.session, "/agents", ApiRequest::get())
            .await;

        match result {
            Ok(res) => {
                tracing::debug!(count = res.agents.len(), "Loaded agents");
                self.state.replace_agents(res.agents);
            }
            Err(e) => {
                tracing::warn!("Loading agents failed: {}", e);
                self.state.set_error(e.to_string());
            }
        }
    }

    /// Select the agent with `id`
    pub fn select_agent(&mut self, id: &str) {
        if self.state.select_agent(id) {
            self.state.clear_error();
        } else {
            self.state.set_error(format!("Unknown agent: {}", id));
        }
    }
}
