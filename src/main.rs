//! foundry-chat - terminal chat client for backend-configured agents
//!
//! Main entry point for the CLI application.

use clap::Parser;
use foundry_chat::core::Role;
use foundry_chat::{App, Config, Repl};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// foundry-chat - chat with backend-configured agents
#[derive(Parser, Debug)]
#[command(name = "foundry-chat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Directory tenant (overrides TENANT_ID)
    #[arg(long)]
    tenant_id: Option<String>,

    /// Application client id (overrides SPA_CLIENT_ID)
    #[arg(long)]
    client_id: Option<String>,

    /// Scope for backend tokens (overrides API_SCOPE)
    #[arg(long)]
    api_scope: Option<String>,

    /// Agent to chat with instead of the first one listed
    #[arg(long, short = 'a')]
    agent: Option<String>,

    /// Single message mode (non-interactive)
    #[arg(long, short = 'm')]
    message: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.print_config {
        println!("# {}", Config::config_file().display());
        println!("{}", Config::default_config_toml());
        return Ok(());
    }

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(api_base) = args.api_base {
        config.api.base_url = api_base;
    }

    if let Some(tenant_id) = args.tenant_id {
        config.auth.tenant_id = tenant_id;
    }

    if let Some(client_id) = args.client_id {
        config.auth.client_id = client_id;
    }

    if let Some(api_scope) = args.api_scope {
        config.auth.api_scope = api_scope;
    }

    config.validate()?;

    // Single message mode
    if let Some(message) = args.message {
        let message = single_shot_text(&message)?;
        let mut app = App::from_config(&config)?;

        app.sign_in().await;
        if let Some(e) = app.error() {
            anyhow::bail!("{}", e);
        }

        if let Some(ref agent) = args.agent {
            app.select_agent(agent);
        }
        if let Some(e) = app.error() {
            anyhow::bail!("{}", e);
        }
        if app.state().selected_agent().is_none() {
            anyhow::bail!("No agents available");
        }

        app.send_message(message).await;
        if let Some(e) = app.error() {
            anyhow::bail!("{}", e);
        }

        if let Some(reply) = app
            .state()
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
        {
            println!("{}", reply.text);
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(&config)?.preferred_agent(args.agent);
    repl.run().await?;

    Ok(())
}

/// Text for `--message`, which must not be blank
fn single_shot_text(message: &str) -> anyhow::Result<&str> {
    let text = message.trim();
    if text.is_empty() {
        anyhow::bail!("--message needs some text to send");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shot_rejects_blank_message() {
        assert!(single_shot_text("   ").is_err());
        assert!(single_shot_text("").is_err());
        assert_eq!(single_shot_text("  hello ").unwrap(), "hello");
    }

    #[test]
    fn test_args_parse_message() {
        let args = Args::parse_from(["foundry-chat", "-m", "hi", "-a", "a2"]);
        assert_eq!(args.message.as_deref(), Some("hi"));
        assert_eq!(args.agent.as_deref(), Some("a2"));
    }
}
