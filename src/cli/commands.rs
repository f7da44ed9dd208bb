//! CLI commands
//!
//! Slash commands that can be executed in the REPL. Any other line is a chat
//! message.

use crate::app::App;

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Send the line as a chat message
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// No output needed
    None,
}

/// Parse and handle special commands
pub async fn handle_command(input: &str, app: &mut App) -> CommandResult {
    let input = input.trim();
    if !input.starts_with('/') {
        return CommandResult::Continue(input.to_string());
    }

    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "/exit" | "/quit" | "/q" => CommandResult::Exit,

        "/help" | "/?" => CommandResult::Handled(help_text()),

        "/signin" | "/login" => {
            app.sign_in().await;
            match app.error() {
                Some(_) => CommandResult::None,
                None => CommandResult::Handled(format!(
                    "{}\n\n{}",
                    signed_in_line(app),
                    agent_list(app)
                )),
            }
        }

        "/signout" | "/logout" => {
            if app.account().is_none() {
                return CommandResult::Handled("Not signed in.".to_string());
            }
            app.sign_out().await;
            CommandResult::Handled("Signed out.".to_string())
        }

        "/agents" | "/refresh" => {
            if app.account().is_none() {
                return CommandResult::Handled(not_signed_in());
            }
            app.load_agents().await;
            match app.error() {
                Some(_) => CommandResult::None,
                None => CommandResult::Handled(agent_list(app)),
            }
        }

        "/use" => handle_use_command(args, app),

        "/history" => CommandResult::Handled(history(app)),

        "/status" => CommandResult::Handled(status(app)),

        _ => CommandResult::Handled(format!(
            "Unknown command: {}. Type '/help' for available commands.",
            cmd
        )),
    }
}

/// Select an agent by id or by its number in `/agents`
fn handle_use_command(args: &str, app: &mut App) -> CommandResult {
    if app.account().is_none() {
        return CommandResult::Handled(not_signed_in());
    }
    if args.is_empty() {
        return CommandResult::Handled(format!(
            "Usage: /use <agent id | number>\n\n{}",
            agent_list(app)
        ));
    }

    let id = match args.parse::<usize>() {
        Ok(n) if n >= 1 && n <= app.state().agents().len() => {
            app.state().agents()[n - 1].id.clone()
        }
        _ => args.to_string(),
    };

    app.select_agent(&id);
    match app.error() {
        Some(_) => CommandResult::None,
        None => CommandResult::Handled(format!("Chatting with {}", selected_name(app))),
    }
}

fn not_signed_in() -> String {
    "Not signed in. Use '/signin' first.".to_string()
}

fn signed_in_line(app: &App) -> String {
    match app.account() {
        Some(account) => format!("Signed in as {}", account.username),
        None => "Not signed in".to_string(),
    }
}

fn selected_name(app: &App) -> String {
    app.state()
        .selected_agent_info()
        .map(|a| format!("{} ({})", a.display_name, a.id))
        .unwrap_or_else(|| "(none)".to_string())
}

/// Numbered agent list with the selection marked
pub fn agent_list(app: &App) -> String {
    let state = app.state();
    if state.agents().is_empty() {
        return "No agents available.".to_string();
    }

    let mut output = String::from("Agents:\n");
    for (i, agent) in state.agents().iter().enumerate() {
        let marker = if state.selected_agent() == Some(agent.id.as_str()) {
            "*"
        } else {
            " "
        };
        output.push_str(&format!(
            "{} {}. {} ({})\n",
            marker,
            i + 1,
            agent.display_name,
            agent.id
        ));
    }
    output.trim_end().to_string()
}

fn history(app: &App) -> String {
    let messages = app.state().messages();
    if messages.is_empty() {
        return "No messages yet.".to_string();
    }

    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn status(app: &App) -> String {
    format!(
        "Status:\n\
         ─────────────────────────────\n\
         Account:   {}\n\
         Provider:  {}\n\
         Backend:   {}\n\
         Agent:     {}\n\
         Agents:    {}\n\
         History:   {} messages",
        app.account()
            .map(|a| a.username.as_str())
            .unwrap_or("(signed out)"),
        app.session().provider_name(),
        app.api_base(),
        selected_name(app),
        app.state().agents().len(),
        app.state().messages().len(),
    )
}

/// Generate help text
fn help_text() -> String {
    r#"Commands:
─────────────────────────────────────────────
  /signin              Sign in through the browser
  /signout             Sign out and clear agents and messages
  /agents, /refresh    Reload and list the available agents
  /use <id|number>     Chat with another agent
  /history             Show the conversation so far
  /status              Show account, backend and agent
  /help, /?            Show this help message
  /exit, /quit, /q     Exit

Anything else is sent to the selected agent.

Keyboard Shortcuts:
  Ctrl+D               Exit
─────────────────────────────────────────────"#
        .to_string()
}
