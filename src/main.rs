//! cloud_gallery CLI - Inspect and list gallery source links.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cloud_gallery::link_parser::{self, Provider};
use cloud_gallery::{
    Authenticator, DropboxLister, Gallery, GoogleCredentials, GoogleDriveLister, ListerConfig,
    LocalLister,
};

/// CLI tool for resolving and listing cloud gallery links.
#[derive(Parser)]
#[command(name = "cloud_gallery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dropbox bearer access token.
    #[arg(long, env = "DROPBOX_ACCESS_TOKEN", hide_env_values = true)]
    dropbox_token: Option<String>,

    /// Path to Google service account JSON credentials file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Google Drive API key.
    #[arg(long, env = "GOOGLE_DRIVE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a link or path is classified and normalized.
    Parse {
        /// Dropbox/Drive URL or local path.
        link: String,
    },

    /// List the images behind a link or path.
    List {
        /// Dropbox/Drive URL or local path.
        link: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Parse { link } => {
            let parsed = link_parser::try_parse(link)
                .with_context(|| format!("Unsupported link: {}", link))?;
            let display = parsed.provider.display();

            println!("provider:   {} ({})", parsed.provider, display.name);
            println!("id:         {}", parsed.id);
            println!("normalized: {}", parsed.normalized);
            println!("valid:      {}", link_parser::validate(&parsed));
        }

        Commands::List { link, json } => {
            let parsed = link_parser::try_parse(link)
                .with_context(|| format!("Unsupported link: {}", link))?;
            let gallery = build_gallery(&cli, parsed.provider)?;

            let images = gallery.list_images(&parsed).await.with_context(|| {
                format!("Could not load images from {}", parsed.provider.name())
            })?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&images)?);
            } else if images.is_empty() {
                println!("No images found.");
            } else {
                println!("{:<44} {:>10} {:<11} {}", "ID", "SIZE", "DIMENSIONS", "NAME");
                println!("{}", "-".repeat(100));
                for image in images {
                    println!("{}", image);
                }
            }
        }
    }

    Ok(())
}

/// Configure only the lister the link needs, so missing credentials for
/// other providers don't matter.
fn build_gallery(cli: &Cli, provider: Provider) -> Result<Gallery> {
    let config = ListerConfig::default().with_request_timeout(Duration::from_secs(cli.timeout));

    let gallery = match provider {
        Provider::Dropbox => {
            let token = cli
                .dropbox_token
                .clone()
                .context("Dropbox links need --dropbox-token or DROPBOX_ACCESS_TOKEN")?;
            Gallery::new().with_dropbox(DropboxLister::with_config(token, config))
        }
        Provider::Gdrive => {
            let mut credentials = GoogleCredentials::default();
            if let Some(path) = &cli.credentials {
                let auth = Authenticator::from_file(path)
                    .with_context(|| format!("Failed to load credentials from {:?}", path))?;
                credentials.service_account = Some(auth);
            }
            credentials.api_key = cli.api_key.clone();
            Gallery::new().with_gdrive(GoogleDriveLister::with_config(credentials, config))
        }
        Provider::Local => Gallery::new().with_local(LocalLister::with_config(&config)),
    };

    Ok(gallery)
}
