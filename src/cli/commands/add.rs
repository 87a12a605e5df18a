use super::draft::load_draft;
use super::drain_notices;
use crate::constants::tables;
use crate::services::{CatalogError, RowOutcome};
use crate::state::SharedState;
use std::path::Path;

pub async fn cmd_add_anime(state: &SharedState, path: &Path) -> anyhow::Result<()> {
    let form = load_draft(path).await?;
    let mut form_notices = form.subscribe();

    if form.validate_for_submit().is_err() {
        drain_notices(&mut form_notices);
        return Ok(());
    }

    state.require_user().await?;
    let mut notices = state.event_bus.subscribe();

    println!("Submitting '{}'...", form.draft().title);
    match state.catalog.add_anime(form.draft()).await {
        Ok(report) => {
            drain_notices(&mut notices);
            println!("  ID: {}", report.anime.id);
            println!(
                "  Inserted {} episodes, {} links, {} subtitles",
                report.inserted(tables::EPISODES),
                report.inserted(tables::EPISODE_LINKS),
                report.inserted(tables::SUBTITLES)
            );

            for row in report.failures() {
                if let RowOutcome::Failed(reason) = &row.outcome {
                    println!(
                        "  ⚠ {} for episode {} failed: {reason}",
                        row.table, row.episode_number
                    );
                }
            }
        }
        Err(CatalogError::Submit(e)) => println!("✗ {}", e.user_message()),
        Err(CatalogError::AuthRequired) => {
            println!("✗ Authentication issue. Please sign out and sign in again.");
        }
        Err(e) => println!("✗ Failed to add anime: {e}"),
    }

    Ok(())
}
