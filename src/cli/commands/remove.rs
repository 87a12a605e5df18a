use super::parse_anime_id;
use crate::services::CatalogError;
use crate::state::SharedState;
use crate::store::StoreError;

pub async fn cmd_remove_anime(state: &SharedState, id_str: &str, yes: bool) -> anyhow::Result<()> {
    let Some(id) = parse_anime_id(id_str) else {
        return Ok(());
    };

    state.require_user().await?;
    let snapshot = state.catalog.snapshot();

    let Some(entry) = snapshot.anime.iter().find(|a| a.anime.id == id) else {
        println!("Anime with ID {id} not found in your catalog.");
        return Ok(());
    };
    let title = entry.anime.title.clone();

    if !yes {
        println!(
            "Delete '{}' (ID: {}) with {} episodes and all their links?",
            title,
            id,
            entry.episodes.len()
        );
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match state.catalog.delete_anime(id).await {
        Ok(()) => println!("✓ Removed: {title}"),
        Err(CatalogError::Store(StoreError::NotFound(_))) => {
            println!("Anime with ID {id} was already removed.");
        }
        Err(e) => println!("✗ Failed to delete anime: {e}"),
    }

    Ok(())
}
