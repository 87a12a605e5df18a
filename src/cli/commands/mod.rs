mod add;
mod add_links;
mod auth;
mod draft;
mod list;
mod remove;
mod show;
mod update;

pub use add::cmd_add_anime;
pub use add_links::cmd_add_links;
pub use auth::{cmd_login, cmd_logout, cmd_reset_password, cmd_signup, cmd_whoami};
pub use draft::cmd_draft;
pub use list::cmd_list_anime;
pub use remove::cmd_remove_anime;
pub use show::cmd_show_anime;
pub use update::cmd_update_anime;

use crate::domain::AnimeId;
use crate::domain::events::{NoticeLevel, NotificationEvent};
use tokio::sync::broadcast;

fn parse_anime_id(id_str: &str) -> Option<AnimeId> {
    let id = id_str.parse().ok();
    if id.is_none() {
        println!("Invalid anime ID: {id_str}");
        println!("Use 'animedash list' to see anime IDs.");
    }
    id
}

/// Uses the flag value when given, otherwise reads one line from stdin.
fn read_password(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    println!("Password:");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn print_notice(event: &NotificationEvent) {
    let marker = match event.level() {
        NoticeLevel::Success => "✓",
        NoticeLevel::Warning => "⚠",
        NoticeLevel::Error => "✗",
    };
    println!("{marker} {}", event.message());
}

/// Prints every notification already queued on `rx`.
fn drain_notices(rx: &mut broadcast::Receiver<NotificationEvent>) {
    while let Ok(event) = rx.try_recv() {
        if !matches!(event, NotificationEvent::CatalogRefreshed { .. }) {
            print_notice(&event);
        }
    }
}
