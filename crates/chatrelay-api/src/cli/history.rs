//! `chatrelay history` subcommands.

use clap::Subcommand;
use console::style;

use chatrelay_types::chat::TurnRole;

use chatrelay_api::state::AppState;

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Print the stored turns of a session.
    Show {
        /// Session id (the chat_session_id cookie value).
        session_id: String,
    },

    /// Delete a session's stored history.
    Clear {
        /// Session id (the chat_session_id cookie value).
        session_id: String,
    },
}

pub async fn run(state: &AppState, action: HistoryCommand, json: bool) -> anyhow::Result<()> {
    match action {
        HistoryCommand::Show { session_id } => show_history(state, &session_id, json).await,
        HistoryCommand::Clear { session_id } => clear_history(state, &session_id, json).await,
    }
}

async fn show_history(state: &AppState, session_id: &str, json: bool) -> anyhow::Result<()> {
    let turns = state.relay.history().get(session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!("  No history for session {}", style(session_id).cyan());
        return Ok(());
    }

    println!();
    println!(
        "  {} turns for session {}",
        style(turns.len()).bold(),
        style(session_id).cyan()
    );
    println!();
    for turn in &turns {
        let label = match turn.role {
            TurnRole::User => style("user ").green().bold(),
            TurnRole::Model => style("model").magenta().bold(),
        };
        println!("  {label}  {}", turn.text);
    }
    println!();

    Ok(())
}

async fn clear_history(state: &AppState, session_id: &str, json: bool) -> anyhow::Result<()> {
    state.relay.history().clear(session_id).await?;

    if json {
        println!("{}", serde_json::json!({ "session_id": session_id, "cleared": true }));
    } else {
        println!("  {} Cleared history for {}", style("✓").green(), style(session_id).cyan());
    }

    Ok(())
}
