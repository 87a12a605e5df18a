use super::parse_anime_id;
use crate::models::{AnimeWithDetails, EpisodeWithLinks};
use crate::state::SharedState;

pub async fn cmd_show_anime(state: &SharedState, id_str: &str) -> anyhow::Result<()> {
    let Some(id) = parse_anime_id(id_str) else {
        return Ok(());
    };

    state.require_user().await?;
    let snapshot = state.catalog.snapshot();

    let Some(entry) = snapshot.anime.iter().find(|a| a.anime.id == id) else {
        println!("Anime with ID {id} not found in your catalog.");
        return Ok(());
    };

    display_anime(entry);
    Ok(())
}

fn display_anime(entry: &AnimeWithDetails) {
    let anime = &entry.anime;

    println!("Anime Info");
    println!("{:-<60}", "");
    println!("Title:    {}", anime.title);
    println!("ID:       {}", anime.id);
    println!("Status:   {}", anime.status);
    println!("Year:     {}", anime.release_year);
    println!("Rating:   {:.1}", anime.rating);
    if let Some(studio) = &anime.studio_name {
        println!("Studio:   {studio}");
    }
    println!("Genres:   {}", anime.genres.join(", "));
    println!("Episodes: {}", anime.episode_count);
    println!("Updated:  {}", anime.updated_at.format("%Y-%m-%d %H:%M"));

    if !anime.synopsis.is_empty() {
        println!();
        println!("{}", anime.synopsis);
    }

    println!();
    println!("Episodes");
    println!("{:-<60}", "");
    for episode in &entry.episodes {
        display_episode(episode);
    }
}

fn display_episode(episode: &EpisodeWithLinks) {
    let record = &episode.episode;
    let title = record.title.as_deref().unwrap_or("");
    let duration = record
        .duration
        .as_deref()
        .map(|d| format!(" [{d}]"))
        .unwrap_or_default();

    println!("{:>4}. {title}{duration}", record.episode_number);

    if episode.links.is_empty() {
        println!("      (no links)");
    }

    for link in &episode.links {
        let quality = link.link.quality.as_deref().unwrap_or("?");
        println!("      {} {} ({quality})", link.link.platform, link.link.url);

        for subtitle in &link.subtitles {
            let source = subtitle
                .url
                .as_deref()
                .or(subtitle.file_path.as_deref())
                .unwrap_or("");
            println!("        ↳ {} {source}", subtitle.language);
        }
    }
}
