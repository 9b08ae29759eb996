//! Recommendation CLI commands: add, list, click, clicks.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

use hotelbot_core::chat::service::ClickOutcome;
use hotelbot_core::repository::recommendation::RecommendationRepository;
use hotelbot_types::money::Money;
use hotelbot_types::recommendation::{NewHotelRecommendation, RecommendationClick, RecommendationId};
use hotelbot_types::session::SessionId;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum RecommendationCommand {
    /// Record a hotel recommendation sent to a session.
    Add {
        #[command(flatten)]
        args: RecommendationArgs,
    },

    /// List the recommendations of a session, newest first.
    List {
        /// Session id (UUID).
        session_id: SessionId,

        /// Maximum number of recommendations to show.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Record that a session clicked a recommendation.
    Click {
        /// Recommendation id.
        recommendation_id: i64,

        /// Session id (UUID) of the clicking user.
        session_id: SessionId,

        /// Fail instead of ignoring a repeat click.
        #[arg(long)]
        strict: bool,
    },

    /// List the clicks on a recommendation.
    Clicks {
        /// Recommendation id.
        recommendation_id: i64,
    },
}

#[derive(Args)]
pub struct RecommendationArgs {
    /// Session id (UUID) the hotel was recommended to.
    pub session_id: SessionId,

    /// Hotel id in the booking provider.
    #[arg(long)]
    pub booking_id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub location: String,

    /// Nightly price, e.g. 129.90.
    #[arg(long)]
    pub price: Money,

    /// Guest rating on a 0-10 scale.
    #[arg(long)]
    pub rating: Option<f64>,

    #[arg(long, default_value_t = 0)]
    pub rating_count: u32,

    #[arg(long)]
    pub image_url: Option<String>,

    /// Tracked booking link (required).
    #[arg(long)]
    pub affiliate_url: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Amenity label; repeat for several.
    #[arg(long = "amenity")]
    pub amenities: Vec<String>,

    /// Ranking score assigned by the recommender.
    #[arg(long, default_value_t = 0.0)]
    pub score: f64,
}

impl From<RecommendationArgs> for NewHotelRecommendation {
    fn from(args: RecommendationArgs) -> Self {
        NewHotelRecommendation {
            session_id: args.session_id,
            booking_id: args.booking_id,
            name: args.name,
            location: args.location,
            price_per_night: args.price,
            rating: args.rating,
            total_rating_count: args.rating_count,
            image_url: args.image_url,
            affiliate_url: args.affiliate_url.unwrap_or_default(),
            description: args.description,
            amenities: args.amenities,
            score: args.score,
        }
    }
}

pub async fn add_recommendation(
    state: &AppState,
    args: RecommendationArgs,
    json: bool,
) -> Result<()> {
    let new = NewHotelRecommendation::from(args);
    let saved = state
        .chat_service
        .recommend(&new)
        .await
        .with_context(|| format!("Failed to record recommendation '{}'", new.booking_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!(
            "  {} Recommendation #{} recorded: {}",
            style("✓").green().bold(),
            saved.id,
            style(&saved).cyan()
        );
    }

    Ok(())
}

pub async fn list_recommendations(
    state: &AppState,
    session_id: &SessionId,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let repo = state.chat_service.recommendation_repo();
    let recommendations = repo.list_recommendations(session_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    if recommendations.is_empty() {
        println!();
        println!(
            "  {} No recommendations for session {}",
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
        Cell::new("Hotel").fg(Color::White),
        Cell::new("Price/night").fg(Color::White),
        Cell::new("Rating").fg(Color::White),
        Cell::new("Score").fg(Color::White),
        Cell::new("Clicks").fg(Color::White),
        Cell::new("Sent").fg(Color::White),
    ]);

    for rec in &recommendations {
        let clicks = repo.count_clicks(Some(rec.id)).await?;
        let rating = match rec.rating {
            Some(r) => format!("{r:.1} ({})", rec.total_rating_count),
            None => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(rec.id.to_string()).fg(Color::DarkGrey),
            Cell::new(rec.to_string()).fg(Color::Cyan),
            Cell::new(rec.price_per_night.to_string())
                .fg(Color::Yellow)
                .set_alignment(CellAlignment::Right),
            Cell::new(rating).fg(Color::White),
            Cell::new(format!("{:.2}", rec.score)).fg(Color::White),
            Cell::new(clicks.to_string()).fg(if clicks > 0 { Color::Green } else { Color::DarkGrey }),
            Cell::new(rec.sent_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

/// Record a click. Repeat clicks are ignored unless `strict` is set, in which
/// case they fail with a constraint violation.
///
/// # Examples
///
/// ```bash
/// hotelbot rec click 12 <session-id>
/// hotelbot rec click 12 <session-id> --strict
/// ```
pub async fn click(
    state: &AppState,
    recommendation_id: i64,
    session_id: &SessionId,
    strict: bool,
    json: bool,
) -> Result<()> {
    let recommendation_id = RecommendationId(recommendation_id);

    let outcome = if strict {
        let click = state
            .chat_service
            .recommendation_repo()
            .record_click(recommendation_id, session_id)
            .await?;
        ClickOutcome::Recorded(click)
    } else {
        state
            .chat_service
            .register_click(recommendation_id, session_id)
            .await?
    };

    match outcome {
        ClickOutcome::Recorded(click) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&click)?);
            } else {
                println!(
                    "  {} Click on #{} by {} recorded.",
                    style("✓").green().bold(),
                    recommendation_id,
                    style(session_id.short()).cyan()
                );
            }
        }
        ClickOutcome::AlreadyRecorded => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "recorded": false,
                        "recommendation_id": recommendation_id.0,
                        "session_id": session_id.to_string(),
                    })
                );
            } else {
                println!(
                    "  {} Session {} already clicked #{}.",
                    style("i").blue().bold(),
                    style(session_id.short()).cyan(),
                    recommendation_id
                );
            }
        }
    }

    Ok(())
}

pub async fn list_clicks(state: &AppState, recommendation_id: i64, json: bool) -> Result<()> {
    let recommendation_id = RecommendationId(recommendation_id);
    let repo = state.chat_service.recommendation_repo();

    let recommendation = repo
        .get_recommendation(recommendation_id)
        .await?
        .with_context(|| format!("Recommendation #{recommendation_id} not found"))?;
    let clicks: Vec<RecommendationClick> = repo.list_clicks(recommendation_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&clicks)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&recommendation).cyan().bold());
    println!();
    if clicks.is_empty() {
        println!("  {}", style("(no clicks)").dim());
    }
    for click in &clicks {
        println!(
            "  {}  {}",
            style(click.clicked_at.format("%Y-%m-%d %H:%M:%S")).dim(),
            click.session_id
        );
    }
    println!();

    Ok(())
}
