//! `chatrelay config` subcommands.

use clap::Subcommand;
use console::style;

use chatrelay_core::config::ConfigSource;
use chatrelay_core::provider::ProviderKind;

use chatrelay_api::state::AppState;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Load relay.toml and the environment, and report which upstream
    /// protocol would be used. The API key is never printed.
    Check,
}

pub async fn run(state: &AppState, action: ConfigCommand, json: bool) -> anyhow::Result<()> {
    match action {
        ConfigCommand::Check => check_config(state, json).await,
    }
}

async fn check_config(state: &AppState, json: bool) -> anyhow::Result<()> {
    let source = state.relay.config_source();
    let config = source.load().await?;
    let provider = ProviderKind::classify(&config.api_url);
    let settings = state.relay.settings();

    if json {
        let report = serde_json::json!({
            "config_path": source.path().display().to_string(),
            "api_url": config.api_url,
            "model_name": config.model_name,
            "temperature": config.temperature,
            "persona_prompt_set": !config.persona_prompt.is_empty(),
            "provider": provider.name(),
            "max_history": settings.max_history,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("  {} Configuration OK", style("✓").green().bold());
    println!();
    println!("  Config file  {}", style(source.path().display()).dim());
    println!("  API URL      {}", style(&config.api_url).cyan());
    println!("  Protocol     {}", style(provider.name()).cyan());
    println!("  Model        {}", config.model_name);
    println!("  Temperature  {}", config.temperature);
    println!(
        "  Persona      {}",
        if config.persona_prompt.is_empty() {
            "none".to_string()
        } else if provider == ProviderKind::ChatCompletions {
            "set".to_string()
        } else {
            "set (not sent to generateContent upstreams)".to_string()
        }
    );
    println!();

    Ok(())
}
