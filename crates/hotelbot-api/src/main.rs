//! Hotel chatbot store CLI entry point.
//!
//! Binary name: `hotelbot`
//!
//! Parses CLI arguments, initializes tracing, the database and services, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::message::MessageCommand;
use cli::preference::PreferenceCommand;
use cli::recommendation::RecommendationCommand;
use cli::session::SessionCommand;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,hotelbot=debug",
        _ => "trace",
    };

    hotelbot_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "hotelbot", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    hotelbot_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;
    let json = cli.json;

    match cli.command {
        Commands::Session { action } => match action {
            SessionCommand::Start { email } => {
                cli::session::start_session(&state, email.as_deref(), json).await?;
            }
            SessionCommand::List { limit, offset } => {
                cli::session::list_sessions(&state, limit, offset, json).await?;
            }
            SessionCommand::Show { session_id } => {
                cli::session::show_session(&state, &session_id, json).await?;
            }
            SessionCommand::Email { session_id, email } => {
                cli::session::set_email(&state, &session_id, email.as_deref(), json).await?;
            }
            SessionCommand::Delete { session_id, force } => {
                cli::session::delete_session(&state, &session_id, force, json).await?;
            }
        },

        Commands::Message { action } => match action {
            MessageCommand::Add {
                session_id,
                sender,
                text,
                intent,
            } => {
                cli::message::add_message(&state, &session_id, sender, &text, intent, json).await?;
            }
            MessageCommand::List {
                session_id,
                limit,
                offset,
            } => {
                cli::message::list_messages(&state, &session_id, limit, offset, json).await?;
            }
        },

        Commands::Prefs { action } => match action {
            PreferenceCommand::Set { session_id, args } => {
                cli::preference::set_preferences(&state, &session_id, args, json).await?;
            }
            PreferenceCommand::Show { session_id } => {
                cli::preference::show_preferences(&state, &session_id, json).await?;
            }
        },

        Commands::Rec { action } => match action {
            RecommendationCommand::Add { args } => {
                cli::recommendation::add_recommendation(&state, args, json).await?;
            }
            RecommendationCommand::List { session_id, limit } => {
                cli::recommendation::list_recommendations(&state, &session_id, limit, json)
                    .await?;
            }
            RecommendationCommand::Click {
                recommendation_id,
                session_id,
                strict,
            } => {
                cli::recommendation::click(&state, recommendation_id, &session_id, strict, json)
                    .await?;
            }
            RecommendationCommand::Clicks { recommendation_id } => {
                cli::recommendation::list_clicks(&state, recommendation_id, json).await?;
            }
        },

        Commands::Status => {
            cli::status::status(&state, json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
