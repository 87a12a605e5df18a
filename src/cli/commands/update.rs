use super::parse_anime_id;
use crate::cli::UpdateArgs;
use crate::constants::limits;
use crate::domain::AnimeStatus;
use crate::models::AnimeUpdate;
use crate::state::SharedState;

pub async fn cmd_update_anime(state: &SharedState, args: UpdateArgs) -> anyhow::Result<()> {
    let Some(id) = parse_anime_id(&args.id) else {
        return Ok(());
    };

    let status = match args.status.as_deref().map(str::parse::<AnimeStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => {
            println!("✗ {e}");
            return Ok(());
        }
        None => None,
    };

    if let Some(rating) = args.rating
        && !(limits::MIN_RATING..=limits::MAX_RATING).contains(&rating)
    {
        println!(
            "✗ Rating must be between {} and {}",
            limits::MIN_RATING,
            limits::MAX_RATING
        );
        return Ok(());
    }

    let archived = if args.archive {
        Some(true)
    } else if args.unarchive {
        Some(false)
    } else {
        None
    };

    let patch = AnimeUpdate {
        title: args.title,
        description: args.description,
        synopsis: args.synopsis,
        release_year: args.year,
        rating: args.rating,
        status,
        thumbnail_url: args.thumbnail,
        is_archived: archived,
        genres: (!args.genres.is_empty()).then_some(args.genres),
        ..AnimeUpdate::default()
    };

    if patch.is_empty() {
        println!("Nothing to update. Pass at least one field, e.g. --title \"...\"");
        return Ok(());
    }

    state.require_user().await?;

    match state.catalog.update_anime(id, patch).await {
        Ok(record) => {
            println!("✓ Updated: {}", record.title);
            if record.is_archived {
                println!("  Archived; it no longer appears in 'animedash list'.");
            }
        }
        Err(e) => println!("✗ Failed to update anime: {e}"),
    }

    Ok(())
}
