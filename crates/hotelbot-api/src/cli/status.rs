//! Store status dashboard command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Display row counts for every table, the data directory and the version.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let stats = state.chat_service.stats().await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} hotelbot v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Store ──").dim());
    println!("  Sessions:        {}", style(stats.sessions).bold());
    println!("  Messages:        {}", stats.messages);
    println!("  Preferences:     {}", stats.preferences);
    println!("  Recommendations: {}", stats.recommendations);
    println!(
        "  Clicks:          {}",
        if stats.clicks > 0 {
            style(stats.clicks).green()
        } else {
            style(stats.clicks).dim()
        }
    );
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Data dir: {}", state.data_dir.display());
    println!();

    Ok(())
}
