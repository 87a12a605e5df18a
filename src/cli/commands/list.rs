//! List anime command handler

use crate::domain::AnimeStatus;
use crate::state::SharedState;

pub async fn cmd_list_anime(state: &SharedState) -> anyhow::Result<()> {
    let user = state.require_user().await?;
    let snapshot = state.catalog.snapshot();

    if snapshot.anime.is_empty() {
        println!("No anime in {}'s catalog.", user.name);
        println!();
        println!("Create a draft with: animedash draft anime.json --title \"...\"");
        return Ok(());
    }

    println!("Your Anime ({} total)", snapshot.anime.len());
    println!("{:-<70}", "");

    for entry in &snapshot.anime {
        let anime = &entry.anime;
        let status_indicator = match anime.status {
            AnimeStatus::Ongoing => "🟢",
            AnimeStatus::Completed => "✓",
            AnimeStatus::Upcoming => "📅",
        };

        println!(
            "{} {} ({}) [{} eps, {} links]",
            status_indicator,
            anime.title,
            anime.release_year,
            entry.episodes.len(),
            entry.link_count()
        );
        println!(
            "  ID: {} | Rating: {:.1} | Genres: {}",
            anime.id,
            anime.rating,
            anime.genres.join(", ")
        );
    }

    println!();
    println!("Legend: 🟢 Ongoing | ✓ Completed | 📅 Upcoming");

    Ok(())
}
