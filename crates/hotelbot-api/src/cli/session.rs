//! Session CLI commands: start, list, show, email, delete.
//!
//! `show` prints the whole transcript (messages, cached preferences and
//! recommendations); `delete` asks for confirmation unless `--force`.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use hotelbot_core::chat::repository::ChatRepository;
use hotelbot_types::message::Sender;
use hotelbot_types::session::SessionId;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a new chat session.
    Start {
        /// Email address to attach to the session.
        #[arg(long)]
        email: Option<String>,
    },

    /// List sessions, most recent first.
    List {
        /// Maximum number of sessions to show.
        #[arg(long)]
        limit: Option<i64>,

        /// Number of sessions to skip.
        #[arg(long)]
        offset: Option<i64>,
    },

    /// Show a session with its transcript, preferences and recommendations.
    Show {
        /// Session id (UUID).
        session_id: SessionId,
    },

    /// Set or clear the email attached to a session.
    Email {
        /// Session id (UUID).
        session_id: SessionId,

        /// New email address; omit to clear it.
        email: Option<String>,
    },

    /// Delete a session and everything it owns.
    Delete {
        /// Session id (UUID).
        session_id: SessionId,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

/// Start a new session.
///
/// # Examples
///
/// ```bash
/// hotelbot session start
/// hotelbot session start --email guest@example.com --json
/// ```
pub async fn start_session(state: &AppState, email: Option<&str>, json: bool) -> Result<()> {
    let session = state.chat_service.start_session(email).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Session {} started",
        style("✓").green().bold(),
        style(session.id).cyan()
    );
    if let Some(email) = &session.email {
        println!("  Email: {}", style(email).white());
    }
    println!();

    Ok(())
}

pub async fn list_sessions(
    state: &AppState,
    limit: Option<i64>,
    offset: Option<i64>,
    json: bool,
) -> Result<()> {
    let sessions = state.chat_service.list_sessions(limit, offset).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style("hotelbot session start").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Last activity").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
    ]);

    for session in &sessions {
        let message_count = state
            .chat_service
            .chat_repo()
            .count_messages(Some(&session.id))
            .await?;

        table.add_row(vec![
            Cell::new(session.id.to_string()).fg(Color::Cyan),
            Cell::new(session.email.as_deref().unwrap_or("-")).fg(Color::White),
            Cell::new(session.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string())
                .fg(Color::DarkGrey),
            Cell::new(message_count.to_string()).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print a session transcript.
///
/// # Examples
///
/// ```bash
/// hotelbot session show <session-id>
/// hotelbot session show <session-id> --json
/// ```
pub async fn show_session(state: &AppState, session_id: &SessionId, json: bool) -> Result<()> {
    let transcript = state
        .chat_service
        .transcript(session_id)
        .await
        .with_context(|| format!("Session '{session_id}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
        return Ok(());
    }

    let session = &transcript.session;
    println!();
    println!("  {}", style(session).cyan().bold());
    println!(
        "  Email:         {}",
        session.email.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Last activity: {}",
        session.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    println!("  {}", style("── Messages ──").dim());
    if transcript.messages.is_empty() {
        println!("  {}", style("(no messages)").dim());
    }
    for msg in &transcript.messages {
        let label = match msg.sender {
            Sender::User => style("user").green().bold(),
            Sender::Bot => style("bot ").magenta().bold(),
        };
        let intent = msg
            .intent
            .as_deref()
            .map(|i| format!(" [{i}]"))
            .unwrap_or_default();
        println!(
            "  {} {}{} {}",
            style(msg.timestamp.format("%H:%M:%S")).dim(),
            label,
            style(intent).dim(),
            msg.text
        );
    }
    println!();

    println!("  {}", style("── Preferences ──").dim());
    match &transcript.preference {
        Some(pref) => println!("  {pref} ({} guests)", pref.guests),
        None => println!("  {}", style("(none)").dim()),
    }
    println!();

    println!("  {}", style("── Recommendations ──").dim());
    if transcript.recommendations.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for rec in &transcript.recommendations {
        println!(
            "  #{} {} {}",
            rec.id,
            rec,
            style(format!("{}/night", rec.price_per_night)).yellow()
        );
    }
    println!();

    Ok(())
}

pub async fn set_email(
    state: &AppState,
    session_id: &SessionId,
    email: Option<&str>,
    json: bool,
) -> Result<()> {
    let session = state
        .chat_service
        .set_email(session_id, email)
        .await
        .with_context(|| format!("Failed to update session '{session_id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        match &session.email {
            Some(email) => println!(
                "  {} Email for {} set to {}",
                style("✓").green().bold(),
                style(session.id.short()).cyan(),
                email
            ),
            None => println!(
                "  {} Email for {} cleared",
                style("✓").green().bold(),
                style(session.id.short()).cyan()
            ),
        }
    }

    Ok(())
}

/// Delete a session with confirmation.
///
/// # Examples
///
/// ```bash
/// hotelbot session delete <session-id>
/// hotelbot session delete <session-id> --force
/// ```
pub async fn delete_session(
    state: &AppState,
    session_id: &SessionId,
    force: bool,
    json: bool,
) -> Result<()> {
    let session = state
        .chat_service
        .get_session(session_id)
        .await?
        .with_context(|| format!("Session '{session_id}' not found"))?;

    if !force && !json {
        let message_count = state
            .chat_service
            .chat_repo()
            .count_messages(Some(session_id))
            .await?;

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session {} ({} messages)?",
                style(session.id.short()).red().bold(),
                message_count
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_service.end_session(session_id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": session_id.to_string()})
        );
    } else {
        println!(
            "  {} Session {} deleted.",
            style("x").red().bold(),
            session.id.short()
        );
    }

    Ok(())
}
