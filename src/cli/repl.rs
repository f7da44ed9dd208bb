//! Interactive REPL for foundry-chat
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::app::App;
use crate::cli::commands::{agent_list, handle_command, CommandResult};
use crate::core::{Config, Result, Role};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    app: App,
    /// Agent to select once the directory is loaded
    preferred_agent: Option<String>,
}

impl Repl {
    /// Create a REPL signing in through Entra ID
    pub fn with_config(config: &Config) -> Result<Self> {
        Ok(Self::with_app(App::from_config(config)?))
    }

    /// Create a REPL around an existing app
    pub fn with_app(app: App) -> Self {
        Self {
            app,
            preferred_agent: None,
        }
    }

    /// Select this agent after sign-in instead of the first one listed
    pub fn preferred_agent(mut self, agent: Option<String>) -> Self {
        self.preferred_agent = agent;
        self
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        println!("Signing in...");
        self.app.sign_in().await;
        if self.app.account().is_some() && self.app.error().is_none() {
            if let Some(agent) = self.preferred_agent.as_deref() {
                self.app.select_agent(agent);
            }
        }
        match (self.app.account(), self.app.error()) {
            (Some(account), error) => {
                println!("Signed in as {}\n", account.username);
                match error {
                    Some(e) => eprintln!("Error: {}\n", e),
                    None => println!("{}\n", agent_list(&self.app)),
                }
            }
            (None, error) => {
                if let Some(e) = error {
                    eprintln!("Error: {}", e);
                }
                println!("Type /signin to try again.\n");
            }
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            // Print prompt
            print!("You: ");
            stdout.flush()?;

            // Read input
            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.app).await {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                }
                CommandResult::None => {
                    if let Some(e) = self.app.error() {
                        eprintln!("Error: {}\n", e);
                    }
                }
                CommandResult::Continue(text) => self.chat(text).await,
            }
        }

        Ok(())
    }

    /// Send one chat line and print what came back
    async fn chat(&mut self, text: String) {
        if self.app.account().is_none() {
            println!("Not signed in. Use '/signin' first.\n");
            return;
        }
        if self.app.state().selected_agent().is_none() {
            println!("No agent selected. Use '/agents' to reload the list.\n");
            return;
        }

        let before = self.app.state().messages().len();
        self.app.set_input(text);
        self.app.submit_input().await;

        for message in &self.app.state().messages()[before..] {
            if message.role == Role::Assistant {
                println!("\nAssistant:\n{}\n", message.text);
            }
        }
        if let Some(e) = self.app.error() {
            eprintln!("\nError: {}\n", e);
        }
    }

    /// Print the startup banner
    fn print_banner(&self) {
        println!();
        println!("Foundry Agents Chat");
        println!("───────────────────────────────────────────────────────────");
        println!("Backend:  {}", self.app.api_base());
        println!("Commands: /signin, /agents, /use, /history, /status, /help, /exit");
        println!("───────────────────────────────────────────────────────────");
    }
}
