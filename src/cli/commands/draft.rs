use super::drain_notices;
use crate::cli::DraftArgs;
use crate::domain::AnimeStatus;
use crate::form::{FormController, FormError};
use crate::models::{AnimeDraft, AnimeField};
use anyhow::Context;
use std::path::Path;

pub(super) async fn load_draft(path: &Path) -> anyhow::Result<FormController> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read draft: {}", path.display()))?;
    let draft: AnimeDraft = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse draft: {}", path.display()))?;
    FormController::from_draft(draft)
        .with_context(|| format!("Draft exceeds limits: {}", path.display()))
}

pub async fn cmd_draft(args: DraftArgs) -> anyhow::Result<()> {
    let mut form = match &args.from {
        Some(path) => load_draft(path).await?,
        None => FormController::new(),
    };
    let mut notices = form.subscribe();

    let status = match args.status.as_deref().map(str::parse::<AnimeStatus>) {
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => {
            println!("✗ {e}");
            return Ok(());
        }
        None => None,
    };

    let result = apply(&mut form, &args, status);
    drain_notices(&mut notices);
    if let Err(e) = result {
        if !e.is_user_visible() {
            println!("✗ {e}");
        }
        println!("Draft not saved.");
        return Ok(());
    }

    let content = serde_json::to_string_pretty(form.draft())?;
    tokio::fs::write(&args.output, content)
        .await
        .with_context(|| format!("Failed to write draft: {}", args.output.display()))?;

    let stats = form.stats();
    println!("✓ Draft saved to {}", args.output.display());
    println!(
        "  {} episodes | {} links ({} episodes with links) | {} subtitles",
        stats.episodes, stats.total_links, stats.episodes_with_links, stats.total_subtitles
    );

    if form.validate_for_submit().is_ok() {
        println!("Ready to submit with: animedash add {}", args.output.display());
    } else {
        drain_notices(&mut notices);
        println!("Edit the draft file, then submit with: animedash add {}", args.output.display());
    }

    Ok(())
}

fn apply(
    form: &mut FormController,
    args: &DraftArgs,
    status: Option<AnimeStatus>,
) -> Result<(), FormError> {
    let scalar_fields = [
        args.title.clone().map(AnimeField::Title),
        args.description.clone().map(AnimeField::Description),
        args.studio.clone().map(AnimeField::StudioName),
        args.rating.map(AnimeField::Rating),
        args.year.map(AnimeField::ReleaseYear),
        status.map(AnimeField::Status),
    ];
    for field in scalar_fields.into_iter().flatten() {
        form.set_field(field);
    }

    for genre in &args.genres {
        if !form.draft().genres.contains(genre) {
            form.toggle_genre(genre);
        }
    }

    if let Some(count) = args.episodes {
        form.set_episode_count(count)?;
    }
    if let Some(count) = args.quick_setup {
        form.quick_setup(count)?;
    }
    if let Some(duration) = &args.duration {
        form.set_all_durations(duration)?;
    }
    if let Some(platform) = &args.platform {
        form.set_all_platform(platform)?;
    }
    if let Some(quality) = &args.quality {
        form.set_all_quality(quality)?;
    }

    Ok(())
}
