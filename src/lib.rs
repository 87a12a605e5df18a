pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod form;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use config::LogFormat;
use state::SharedState;
use tracing_subscriber::EnvFilter;

/// Runs one CLI command with the configuration `main` already loaded.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let cli = Cli::parse();

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.general.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    match command {
        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Set backend.url and backend.anon_key in config.toml.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        Commands::Draft(args) => cli::cmd_draft(args).await,

        command => {
            config.validate()?;
            let state = SharedState::new(config)?;
            dispatch(&state, command).await
        }
    }
}

async fn dispatch(state: &SharedState, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Signup { email, password } => cli::cmd_signup(state, &email, password).await,
        Commands::Login { email, password } => cli::cmd_login(state, &email, password).await,
        Commands::Logout => cli::cmd_logout(state).await,
        Commands::Whoami => cli::cmd_whoami(state).await,
        Commands::ResetPassword { email, redirect_to } => {
            cli::cmd_reset_password(state, &email, redirect_to.as_deref()).await
        }
        Commands::List => cli::cmd_list_anime(state).await,
        Commands::Show { id } => cli::cmd_show_anime(state, &id).await,
        Commands::Add { path } => cli::cmd_add_anime(state, &path).await,
        Commands::Update(args) => cli::cmd_update_anime(state, args).await,
        Commands::Remove { id, yes } => cli::cmd_remove_anime(state, &id, yes).await,
        Commands::AddLinks(args) => cli::cmd_add_links(state, args).await,
        Commands::Init | Commands::Draft(_) => Ok(()),
    }
}

fn print_help() {
    println!("animedash - Anime catalog manager");
    println!();
    println!("USAGE:");
    println!("  animedash <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  init                     Create default config file");
    println!("  signup <email>           Create an account");
    println!("  login <email>            Sign in and remember the session");
    println!("  logout                   Sign out");
    println!("  whoami                   Show the signed-in user");
    println!("  reset-password <email>   Send a password reset email");
    println!("  list, ls                 List your anime");
    println!("  show <id>                Show episodes, links and subtitles");
    println!("  draft <file> [OPTIONS]   Build a draft file");
    println!("  add <file>               Submit a draft file");
    println!("  update <id> [OPTIONS]    Change fields of an anime");
    println!("  remove, rm <id>          Delete an anime");
    println!("  add-links <id> <ep>      Add a link to an existing episode");
    println!("  help                     Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  animedash draft frieren.json --title \"Frieren\" --genre Fantasy --quick-setup 28");
    println!("  animedash add frieren.json");
    println!("  animedash add-links <id> 3 --platform Crunchyroll --url https://...");
}
