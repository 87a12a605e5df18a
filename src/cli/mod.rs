//! CLI module - Command-line interface for animedash
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// animedash - Anime catalog manager
/// Curate anime, episodes, streaming links and subtitles in your backend
#[derive(Parser)]
#[command(name = "animedash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    Init,

    /// Create an account
    Signup {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in and remember the session
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Send a password reset email
    ResetPassword {
        email: String,
        /// Page the reset link should land on
        #[arg(long)]
        redirect_to: Option<String>,
    },

    /// List your anime
    #[command(alias = "ls", alias = "l")]
    List,

    /// Show an anime with its episodes, links and subtitles
    #[command(alias = "i", alias = "info")]
    Show {
        /// Anime ID
        id: String,
    },

    /// Build a draft file to review and submit with `add`
    Draft(DraftArgs),

    /// Submit a draft file
    #[command(alias = "a")]
    Add {
        /// Draft JSON file
        path: PathBuf,
    },

    /// Change fields of an anime
    Update(UpdateArgs),

    /// Delete an anime
    #[command(alias = "rm", alias = "r")]
    Remove {
        /// Anime ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Add a link to an existing episode
    AddLinks(AddLinksArgs),
}

#[derive(clap::Args)]
pub struct DraftArgs {
    /// Where to write the draft JSON
    pub output: PathBuf,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub studio: Option<String>,

    #[arg(long)]
    pub rating: Option<f32>,

    #[arg(long)]
    pub year: Option<i32>,

    /// ongoing, completed or upcoming
    #[arg(long)]
    pub status: Option<String>,

    /// Repeat for several genres
    #[arg(long = "genre")]
    pub genres: Vec<String>,

    /// Total number of empty episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Append episodes prefilled with the quick-setup template
    #[arg(long)]
    pub quick_setup: Option<usize>,

    /// Duration for every episode (MM:SS)
    #[arg(long)]
    pub duration: Option<String>,

    /// Platform for every link
    #[arg(long)]
    pub platform: Option<String>,

    /// Quality for every link
    #[arg(long)]
    pub quality: Option<String>,

    /// Start from an existing draft instead of a fresh one
    #[arg(long)]
    pub from: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    /// Anime ID
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub synopsis: Option<String>,

    #[arg(long)]
    pub rating: Option<f32>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub thumbnail: Option<String>,

    /// Replace the genre list; repeat for several
    #[arg(long = "genre")]
    pub genres: Vec<String>,

    /// Hide the anime from the catalog
    #[arg(long, conflicts_with = "unarchive")]
    pub archive: bool,

    #[arg(long)]
    pub unarchive: bool,
}

#[derive(clap::Args)]
pub struct AddLinksArgs {
    /// Anime ID
    pub anime_id: String,

    /// Episode number
    pub episode: u32,

    #[arg(long)]
    pub platform: String,

    #[arg(long)]
    pub url: String,

    #[arg(long)]
    pub quality: Option<String>,

    #[arg(long)]
    pub file_size: Option<String>,

    /// LANGUAGE=URL, repeat for several
    #[arg(long = "subtitle")]
    pub subtitles: Vec<String>,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_links_parses_subtitles() {
        let cli = Cli::try_parse_from([
            "animedash",
            "add-links",
            "0b6f2b36-1d5e-4b8e-8f0c-2a4b6c8d0e12",
            "3",
            "--platform",
            "Crunchyroll",
            "--url",
            "https://crunchyroll.example/3",
            "--subtitle",
            "English=https://subs.example/3.vtt",
        ])
        .unwrap();

        let Some(Commands::AddLinks(args)) = cli.command else {
            panic!("expected add-links");
        };
        assert_eq!(args.episode, 3);
        assert_eq!(args.subtitles, vec!["English=https://subs.example/3.vtt"]);
    }

    #[test]
    fn archive_flags_conflict() {
        let result = Cli::try_parse_from(["animedash", "update", "id", "--archive", "--unarchive"]);
        assert!(result.is_err());
    }
}
