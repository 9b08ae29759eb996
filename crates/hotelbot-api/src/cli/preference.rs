//! Search preference CLI commands: set, show.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use console::style;

use hotelbot_core::repository::preference::PreferenceRepository;
use hotelbot_types::money::Money;
use hotelbot_types::preference::{ExtraPreferences, SearchPreferenceInput};
use hotelbot_types::session::SessionId;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum PreferenceCommand {
    /// Replace the cached search preferences of a session.
    Set {
        /// Session id (UUID).
        session_id: SessionId,

        #[command(flatten)]
        args: PreferenceArgs,
    },

    /// Show the cached search preferences of a session.
    Show {
        /// Session id (UUID).
        session_id: SessionId,
    },
}

/// Every flag maps to one field; unset flags clear the stored value.
#[derive(Args)]
pub struct PreferenceArgs {
    /// Destination city or area.
    #[arg(long, default_value = "")]
    pub location: String,

    /// Check-in date (YYYY-MM-DD).
    #[arg(long)]
    pub check_in: Option<NaiveDate>,

    /// Check-out date (YYYY-MM-DD).
    #[arg(long)]
    pub check_out: Option<NaiveDate>,

    #[arg(long, default_value_t = 1)]
    pub guests: u32,

    /// Lower bound of the nightly budget, e.g. 80 or 79.99.
    #[arg(long)]
    pub budget_min: Option<Money>,

    /// Upper bound of the nightly budget.
    #[arg(long)]
    pub budget_max: Option<Money>,

    #[arg(long, default_value = "")]
    pub room_type: String,

    /// Extra preference as KEY=VALUE; VALUE is parsed as JSON when possible.
    #[arg(long = "extra", value_parser = parse_extra)]
    pub extra: Vec<(String, serde_json::Value)>,
}

impl From<PreferenceArgs> for SearchPreferenceInput {
    fn from(args: PreferenceArgs) -> Self {
        SearchPreferenceInput {
            location: args.location,
            check_in: args.check_in,
            check_out: args.check_out,
            guests: args.guests,
            budget_min: args.budget_min,
            budget_max: args.budget_max,
            room_type: args.room_type,
            extra: args.extra.into_iter().collect::<ExtraPreferences>(),
        }
    }
}

/// Parse `key=value`. `pets=true` yields a JSON bool, `floor=high` a string.
fn parse_extra(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub async fn set_preferences(
    state: &AppState,
    session_id: &SessionId,
    args: PreferenceArgs,
    json: bool,
) -> Result<()> {
    let input = SearchPreferenceInput::from(args);
    let saved = state
        .chat_service
        .save_preferences(session_id, &input)
        .await
        .with_context(|| format!("Failed to save preferences for session '{session_id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!(
            "  {} Preferences for {} saved: {}",
            style("✓").green().bold(),
            style(session_id.short()).cyan(),
            saved
        );
    }

    Ok(())
}

pub async fn show_preferences(state: &AppState, session_id: &SessionId, json: bool) -> Result<()> {
    let preference = state
        .chat_service
        .preference_repo()
        .get_preference(session_id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preference)?);
        return Ok(());
    }

    let Some(pref) = preference else {
        println!();
        println!(
            "  {} No preferences cached for session {}",
            style("i").blue().bold(),
            style(session_id.short()).cyan()
        );
        println!();
        return Ok(());
    };

    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    println!();
    println!("  {}", style(&pref).cyan().bold());
    println!();
    println!("  Location:   {}", if pref.location.is_empty() { "-" } else { pref.location.as_str() });
    println!("  Check-in:   {}", or_dash(pref.check_in.map(|d| d.to_string())));
    println!("  Check-out:  {}", or_dash(pref.check_out.map(|d| d.to_string())));
    println!("  Guests:     {}", pref.guests);
    println!(
        "  Budget:     {} - {}",
        or_dash(pref.budget_min.map(|m| m.to_string())),
        or_dash(pref.budget_max.map(|m| m.to_string()))
    );
    println!("  Room type:  {}", if pref.room_type.is_empty() { "-" } else { pref.room_type.as_str() });
    for (key, value) in &pref.extra {
        println!("  {key}: {value}");
    }
    println!(
        "  Updated:    {}",
        style(pref.updated_at.format("%Y-%m-%d %H:%M:%S UTC")).dim()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extra_reads_json_values() {
        assert_eq!(
            parse_extra("pets=true").unwrap(),
            ("pets".to_string(), serde_json::json!(true))
        );
        assert_eq!(
            parse_extra("max_floor=12").unwrap(),
            ("max_floor".to_string(), serde_json::json!(12))
        );
    }

    #[test]
    fn parse_extra_falls_back_to_string() {
        assert_eq!(
            parse_extra("floor=high").unwrap(),
            ("floor".to_string(), serde_json::json!("high"))
        );
    }

    #[test]
    fn parse_extra_rejects_missing_key() {
        assert!(parse_extra("=true").is_err());
        assert!(parse_extra("no-separator").is_err());
    }
}
