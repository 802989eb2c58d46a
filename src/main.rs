use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use podcatch::config::Config;
use podcatch::feed::feed_client;
use podcatch::storage::Database;
use podcatch::subscription::subscribe_to_feed;

/// Get the config directory path (~/.config/podcatch/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("podcatch"))
}

#[derive(Parser, Debug)]
#[command(name = "podcatch", about = "Podcast subscription manager")]
struct Args {
    /// Database file (overrides the config file)
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Subscribe to a podcast feed URL (or refresh it if already subscribed)
    Subscribe { url: String },
    /// List all subscribed podcasts
    List,
    /// List the stored episodes of a podcast, newest first
    Episodes { podcast_id: i64 },
    /// Re-fetch an existing subscription
    Refresh { podcast_id: i64 },
    /// Delete a podcast and all of its episodes
    Delete { podcast_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }
    let config = Config::load(&config_dir.join("config.toml"))?;

    let db_path = args
        .database
        .or(config.database_path)
        .unwrap_or_else(|| config_dir.join("podcasts.db"));
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = Database::open(db_path_str)
        .await
        .context("Failed to open database")?;

    let client = feed_client(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to build HTTP client")?;

    match args.command {
        Command::Subscribe { url } => {
            let podcast = subscribe_to_feed(&db, &client, &url).await?;
            let episodes = db.episodes_for_podcast(podcast.id).await?;
            println!(
                "Subscribed to \"{}\" (id {}, {} episodes)",
                podcast.title,
                podcast.id,
                episodes.len()
            );
        }
        Command::List => {
            let podcasts = db.list_podcasts().await?;
            if podcasts.is_empty() {
                println!("No subscriptions yet. Try: podcatch subscribe <url>");
            }
            for podcast in podcasts {
                println!(
                    "{:>4}  {}  (updated {})",
                    podcast.id, podcast.title, podcast.updated_at
                );
            }
        }
        Command::Episodes { podcast_id } => {
            let podcast = db
                .get_podcast(podcast_id)
                .await?
                .with_context(|| format!("No podcast with id {}", podcast_id))?;
            println!("{} — episodes:", podcast.title);
            for episode in db.episodes_for_podcast(podcast_id).await? {
                let date = episode.published_at.as_deref().unwrap_or("unknown date");
                let duration = episode
                    .duration
                    .map(|d| format!(" [{}]", d))
                    .unwrap_or_default();
                println!("  {}  {}{}", date, episode.title, duration);
            }
        }
        Command::Refresh { podcast_id } => {
            let podcast = db
                .get_podcast(podcast_id)
                .await?
                .with_context(|| format!("No podcast with id {}", podcast_id))?;
            let refreshed = subscribe_to_feed(&db, &client, &podcast.feed_url).await?;
            let episodes = db.episodes_for_podcast(refreshed.id).await?;
            println!(
                "Refreshed \"{}\" ({} episodes stored)",
                refreshed.title,
                episodes.len()
            );
        }
        Command::Delete { podcast_id } => {
            let removed = db.delete_podcast(podcast_id).await?;
            println!("Deleted podcast {} ({} episodes removed)", podcast_id, removed);
        }
    }

    Ok(())
}
