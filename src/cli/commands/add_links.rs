use super::{parse_anime_id, print_notice};
use crate::cli::AddLinksArgs;
use crate::constants;
use crate::domain::events::NotificationEvent;
use crate::form::validation::url_shape_warning;
use crate::models::{LinkDraft, SubtitleDraft};
use crate::services::{CatalogError, RowOutcome};
use crate::state::SharedState;

pub async fn cmd_add_links(state: &SharedState, args: AddLinksArgs) -> anyhow::Result<()> {
    let Some(anime_id) = parse_anime_id(&args.anime_id) else {
        return Ok(());
    };

    if !constants::is_supported_platform(&args.platform) {
        println!(
            "✗ Platform must be one of: {}",
            constants::SUPPORTED_PLATFORMS.join(", ")
        );
        return Ok(());
    }
    if let Some(warning) = url_shape_warning(&args.url) {
        print_notice(&NotificationEvent::warning(warning));
    }

    let mut subtitles = Vec::with_capacity(args.subtitles.len());
    for entry in &args.subtitles {
        let Some((language, url)) = entry.split_once('=') else {
            println!("✗ Subtitle must be LANGUAGE=URL, got '{entry}'");
            return Ok(());
        };
        subtitles.push(SubtitleDraft {
            language: language.trim().to_string(),
            url: url.trim().to_string(),
            ..SubtitleDraft::default()
        });
    }
    if subtitles.len() > constants::limits::MAX_SUBTITLES_PER_LINK {
        println!(
            "✗ Maximum {} subtitles allowed per link",
            constants::limits::MAX_SUBTITLES_PER_LINK
        );
        return Ok(());
    }

    let link = LinkDraft {
        platform: args.platform,
        url: args.url,
        quality: args.quality.unwrap_or_default(),
        file_size: args.file_size.unwrap_or_default(),
        subtitles,
    };

    state.require_user().await?;

    match state
        .catalog
        .add_links_to_anime(anime_id, args.episode, std::slice::from_ref(&link))
        .await
    {
        Ok(rows) => {
            for row in rows {
                match row.outcome {
                    RowOutcome::Inserted => println!("✓ Added {} row", row.table),
                    RowOutcome::Failed(reason) => {
                        println!("⚠ {} row failed: {reason}", row.table);
                    }
                    RowOutcome::Skipped(reason) => {
                        println!("  Skipped {} row ({reason:?})", row.table);
                    }
                }
            }
        }
        Err(CatalogError::EpisodeNotFound { episode_number, .. }) => {
            println!("✗ Episode {episode_number} not found for anime {anime_id}");
        }
        Err(e) => println!("✗ Failed to add links: {e}"),
    }

    Ok(())
}
