// syrinx - terminal client for a self-hosted music streaming server
// Player lives in the TUI; session and admin work are plain subcommands

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use syrinx::api::{ApiClient, ApiError, SettingsUpdate, TokenStore};
use syrinx::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "syrinx")]
#[command(about = "Terminal client for self-hosted music streaming")]
struct Cli {
    /// Server URL (overrides the configured one)
    #[arg(long)]
    server: Option<String>,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive player (the default)
    Play,
    /// Log in and save the session token
    Login { username: String },
    /// Create a new account (when the server allows signups)
    Register { username: String },
    /// Forget the saved session
    Logout,
    /// Show who is logged in
    Me,
    /// List songs, optionally filtered
    Songs { query: Option<String> },
    /// Download the active (or a random) background image
    Background {
        #[arg(long)]
        random: bool,
        /// Where to write the image
        #[arg(long, default_value = "background.jpg")]
        out: PathBuf,
    },
    /// Admin operations (require an admin account)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum AdminCommand {
    /// List songs with love totals
    Songs { query: Option<String> },
    /// Upload an audio file (title/artist derived from the filename)
    Upload { file: PathBuf },
    /// Fix up a song's title and/or artist
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
    },
    /// Delete a song and its file
    DeleteSong { id: i64 },
    /// List accounts
    Users,
    /// Delete an account
    DeleteUser { id: i64 },
    /// Show app settings
    Settings,
    /// Change app settings
    SetSettings {
        #[arg(long)]
        auto_change_background: Option<bool>,
        #[arg(long)]
        allow_registration: Option<bool>,
    },
    /// List background images
    Backgrounds,
    /// Upload a background image
    UploadBackground { file: PathBuf },
    /// Make one background image the active one
    ActivateBackground { id: i64 },
    /// Delete a background image
    DeleteBackground { id: i64 },
}

fn init_logging(dev: bool) -> Result<()> {
    let log_dir = Config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender - the TUI owns stdout, logs go to a file
    let file_appender = tracing_appender::rolling::daily(&log_dir, "syrinx.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,syrinx=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if dev {
        eprintln!("🔧 Dev mode: debug output enabled, logs in {}", log_dir.display());
    }

    // Keep the appender guard alive for the whole run
    std::mem::forget(guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.dev)?;

    let mut config = Config::load()?;
    if let Some(server) = cli.server {
        config.server.url = server;
    }

    let token_store = TokenStore::new(Config::token_path()?);
    let mut api = ApiClient::with_token(&config.server.url, token_store.load());

    let command = cli.command.unwrap_or(Command::Play);
    if matches!(command, Command::Play) {
        return run_player(config, api, token_store).await;
    }

    let result = match command {
        Command::Play => Ok(()), // handled above
        Command::Login { username } => login(&mut api, &token_store, &username).await,
        Command::Register { username } => register(&mut api, &token_store, &username).await,
        Command::Logout => {
            token_store.clear()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Me => me(&api).await,
        Command::Songs { query } => songs(&api, query.as_deref()).await,
        Command::Background { random, out } => background(&api, random, &out).await,
        Command::Admin(admin_command) => admin(&api, admin_command).await,
    };

    // Any 401 means the stored session is dead - drop it and say so
    if let Err(error) = result {
        let auth_failure = error
            .downcast_ref::<ApiError>()
            .map(ApiError::is_auth_failure)
            .unwrap_or(false);
        if auth_failure {
            let _ = token_store.clear();
            println!("Session invalid - run `syrinx login <username>` first.");
            return Ok(());
        }
        return Err(error);
    }

    Ok(())
}

#[cfg(all(feature = "tui", feature = "audio"))]
async fn run_player(config: Config, api: ApiClient, token_store: TokenStore) -> Result<()> {
    use syrinx::ui::{App, AppExit};
    use tracing::info;

    // Gate entry to the player on a live session
    let user = match api.me().await {
        Ok(user) => user,
        Err(ApiError::Unauthorized) => {
            token_store.clear()?;
            println!("Not logged in - run `syrinx login <username>` first.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!("starting player as {}", user.username);
    let mut app = App::new(config, api, token_store, user.username)?;
    match app.run().await? {
        AppExit::SessionExpired => {
            println!("Session expired - run `syrinx login <username>` to continue.");
        }
        AppExit::Quit => {}
    }
    Ok(())
}

#[cfg(not(all(feature = "tui", feature = "audio")))]
async fn run_player(_config: Config, _api: ApiClient, _token_store: TokenStore) -> Result<()> {
    anyhow::bail!("this build has no player - rebuild with the `tui` and `audio` features")
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn login(api: &mut ApiClient, token_store: &TokenStore, username: &str) -> Result<()> {
    let password = prompt("Password: ")?;
    match api.login(username, &password).await {
        Ok(token) => {
            token_store.save(&token.access_token)?;
            let user = api.me().await?;
            println!("Logged in as {} ({}).", user.username, user.role);
            Ok(())
        }
        Err(ApiError::Unauthorized) => {
            println!("Invalid username or password.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn register(api: &mut ApiClient, token_store: &TokenStore, username: &str) -> Result<()> {
    if !api.registration_allowed().await? {
        println!("This server does not accept new registrations.");
        return Ok(());
    }

    let password = prompt("Password: ")?;
    let confirm = prompt("Confirm password: ")?;
    let token = api.register(username, &password, &confirm).await?;
    token_store.save(&token.access_token)?;
    println!("Welcome, {}! You are now logged in.", username);
    Ok(())
}

async fn me(api: &ApiClient) -> Result<()> {
    if !api.has_token() {
        println!("Not logged in.");
        return Ok(());
    }
    let user = api.me().await?;
    println!("{} ({})", user.username, user.role);
    Ok(())
}

async fn songs(api: &ApiClient, query: Option<&str>) -> Result<()> {
    let songs = api.list_songs(query).await?;

    if songs.is_empty() {
        println!("No songs found.");
        return Ok(());
    }

    for song in &songs {
        let duration = song.duration_string();
        let duration = if duration.is_empty() {
            String::new()
        } else {
            format!(" ({duration})")
        };
        println!(
            "{:>5}  {} - {}{}  {} {}",
            song.id,
            song.display_title(),
            song.artist,
            duration,
            song.love_count,
            song.love_marker(),
        );
    }
    Ok(())
}

async fn background(api: &ApiClient, random: bool, out: &Path) -> Result<()> {
    let bytes = if random {
        api.random_background().await?
    } else {
        api.active_background().await?
    };
    std::fs::write(out, &bytes)?;
    println!("Saved {} bytes to {}.", bytes.len(), out.display());
    Ok(())
}

fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("not a usable file name: {}", path.display()))?
        .to_string();
    let content = std::fs::read(path)?;
    Ok((filename, content))
}

async fn admin(api: &ApiClient, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Songs { query } => {
            let songs = api.admin_list_songs(query.as_deref()).await?;
            for song in &songs {
                println!(
                    "{:>5}  {} - {}  [{}]  {} ❤",
                    song.id,
                    song.display_title(),
                    song.artist,
                    song.filename,
                    song.love_count,
                );
            }
        }
        AdminCommand::Upload { file } => {
            let (filename, content) = read_upload(&file)?;
            let song = api.admin_upload_song(&filename, content).await?;
            println!(
                "Uploaded as id {}: {} - {}",
                song.id,
                song.display_title(),
                song.artist
            );
        }
        AdminCommand::Edit { id, title, artist } => {
            if title.is_none() && artist.is_none() {
                println!("Nothing to change - pass --title and/or --artist.");
                return Ok(());
            }
            let song = api
                .admin_update_song(id, title.as_deref(), artist.as_deref())
                .await?;
            println!("Updated {}: {} - {}", song.id, song.display_title(), song.artist);
        }
        AdminCommand::DeleteSong { id } => {
            api.admin_delete_song(id).await?;
            println!("Deleted song {id}.");
        }
        AdminCommand::Users => {
            let users = api.admin_list_users().await?;
            for user in &users {
                println!(
                    "{:>5}  {}  ({}, joined {})",
                    user.id,
                    user.username,
                    user.role,
                    user.created_date(),
                );
            }
        }
        AdminCommand::DeleteUser { id } => {
            api.admin_delete_user(id).await?;
            println!("Deleted user {id}.");
        }
        AdminCommand::Settings => {
            let settings = api.admin_get_settings().await?;
            print_settings(&settings);
        }
        AdminCommand::SetSettings {
            auto_change_background,
            allow_registration,
        } => {
            if auto_change_background.is_none() && allow_registration.is_none() {
                println!("Nothing to change.");
                return Ok(());
            }
            let settings = api
                .admin_update_settings(&SettingsUpdate {
                    auto_change_background,
                    allow_registration,
                })
                .await?;
            print_settings(&settings);
        }
        AdminCommand::Backgrounds => {
            let images = api.admin_list_backgrounds().await?;
            for image in &images {
                let marker = if image.is_active { " (active)" } else { "" };
                println!("{:>5}  {}{}", image.id, image.filename, marker);
            }
        }
        AdminCommand::UploadBackground { file } => {
            let (filename, content) = read_upload(&file)?;
            let image = api.admin_upload_background(&filename, content).await?;
            println!("Uploaded background {} as id {}.", image.filename, image.id);
        }
        AdminCommand::ActivateBackground { id } => {
            api.admin_activate_background(id).await?;
            println!("Background {id} is now active.");
        }
        AdminCommand::DeleteBackground { id } => {
            api.admin_delete_background(id).await?;
            println!("Deleted background {id}.");
        }
    }

    Ok(())
}

fn print_settings(settings: &syrinx::api::AppSettings) {
    println!("auto_change_background = {}", settings.auto_change_background);
    println!("allow_registration     = {}", settings.allow_registration);
}
