//! Message CLI commands: add, list.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use hotelbot_core::chat::repository::ChatRepository;
use hotelbot_types::message::{NewMessage, Sender};
use hotelbot_types::session::SessionId;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum MessageCommand {
    /// Append a message to a session.
    Add {
        /// Session id (UUID).
        session_id: SessionId,

        /// Who sent the message: `user` or `bot`.
        #[arg(long, default_value = "user")]
        sender: Sender,

        /// Message body.
        text: String,

        /// Intent label the bot classified this turn as.
        #[arg(long)]
        intent: Option<String>,
    },

    /// List the messages of a session in conversation order.
    List {
        /// Session id (UUID).
        session_id: SessionId,

        /// Maximum number of messages to show.
        #[arg(long)]
        limit: Option<i64>,

        /// Number of messages to skip.
        #[arg(long)]
        offset: Option<i64>,
    },
}

pub async fn add_message(
    state: &AppState,
    session_id: &SessionId,
    sender: Sender,
    text: &str,
    intent: Option<String>,
    json: bool,
) -> Result<()> {
    let message = NewMessage {
        session_id: *session_id,
        sender,
        text: text.to_string(),
        intent,
    };
    let saved = state
        .chat_service
        .record_message(message)
        .await
        .with_context(|| format!("Failed to add message to session '{session_id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!(
            "  {} Message #{} added: {}",
            style("✓").green().bold(),
            saved.id,
            style(&saved).dim()
        );
    }

    Ok(())
}

pub async fn list_messages(
    state: &AppState,
    session_id: &SessionId,
    limit: Option<i64>,
    offset: Option<i64>,
    json: bool,
) -> Result<()> {
    let messages = state
        .chat_service
        .chat_repo()
        .get_messages(session_id, limit, offset)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!(
            "  {} No messages in session {}",
            style("i").blue().bold(),
            style(session_id.short()).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Time").fg(Color::White),
        Cell::new("Sender").fg(Color::White),
        Cell::new("Intent").fg(Color::White),
        Cell::new("Text").fg(Color::White),
    ]);

    for msg in &messages {
        let sender_cell = match msg.sender {
            Sender::User => Cell::new("user").fg(Color::Green),
            Sender::Bot => Cell::new("bot").fg(Color::Magenta),
        };

        table.add_row(vec![
            Cell::new(msg.id.to_string()).fg(Color::DarkGrey),
            Cell::new(msg.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()).fg(Color::White),
            sender_cell,
            Cell::new(msg.intent.as_deref().unwrap_or("")).fg(Color::DarkGrey),
            Cell::new(&msg.text),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}
