use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ghartifact::github::client::parse_repo_slug;
use ghartifact::github::http::format_github_error;
use ghartifact::resource::DEFAULT_ARCHIVE_FORMAT;
use ghartifact::{Artifact, Config, GithubClient};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Inspect, download and delete GitHub Actions artifacts
#[derive(Parser, Debug)]
#[command(name = "ghartifact", version, about, long_about = None)]
struct Args {
    /// GitHub token (overrides GITHUB_TOKEN and the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API base URL (GitHub Enterprise: https://HOST/api/v3)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every field of one artifact
    Show {
        /// Repository as OWNER/REPO
        repo: String,
        artifact_id: u64,
    },
    /// List one page of a repository's artifacts
    List {
        /// Repository as OWNER/REPO
        repo: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Download an artifact archive
    Download {
        /// Repository as OWNER/REPO
        repo: String,
        artifact_id: u64,
        #[arg(long, default_value = DEFAULT_ARCHIVE_FORMAT)]
        format: String,
        /// Output file (defaults to the server-provided filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete an artifact
    Delete {
        /// Repository as OWNER/REPO
        repo: String,
        artifact_id: u64,
    },
    /// Persist defaults to the config file
    Config {
        /// Token to store
        #[arg(long)]
        set_token: Option<String>,
        /// API base URL to store
        #[arg(long)]
        set_api_url: Option<String>,
        /// Page size to store
        #[arg(long)]
        set_per_page: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("ghartifact started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("ghartifact").join("ghartifact.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".ghartifact").join("ghartifact.log");
    }
    PathBuf::from("ghartifact.log")
}

/// Settings given on the command line, taking precedence over environment and config
struct Overrides {
    token: Option<String>,
    api_url: Option<String>,
}

impl Overrides {
    fn client(&self, config: &Config) -> Result<GithubClient> {
        let api_url = self
            .api_url
            .clone()
            .unwrap_or_else(|| config.effective_api_url());
        let token = self.token.clone().or_else(|| config.effective_token());

        GithubClient::with_settings(
            &api_url,
            token,
            config.effective_timeout(),
            config.effective_per_page(),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level)?;

    let config = Config::load();
    let overrides = Overrides {
        token: args.token,
        api_url: args.api_url,
    };

    if let Err(err) = run(args.command, config, &overrides).await {
        tracing::error!("{:?}", err);
        eprintln!("Error: {}", format_github_error(&err));
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, mut config: Config, overrides: &Overrides) -> Result<()> {
    match command {
        Command::Show { repo, artifact_id } => {
            let (owner, name) = parse_repo_slug(&repo)?;
            let client = overrides.client(&config)?;
            let mut artifact = client.lazy_artifact(owner, name, artifact_id);
            print_details(&mut artifact).await
        }
        Command::List {
            repo,
            page,
            per_page,
        } => {
            let (owner, name) = parse_repo_slug(&repo)?;
            if per_page.is_some() {
                config.per_page = per_page;
            }
            let client = overrides.client(&config)?;
            let listing = client.list_artifacts(owner, name, page).await?;

            println!("{} artifacts (page {})", listing.total_count, page.max(1));
            for mut artifact in listing.artifacts {
                print_row(&mut artifact).await?;
            }
            Ok(())
        }
        Command::Download {
            repo,
            artifact_id,
            format,
            output,
        } => {
            let (owner, name) = parse_repo_slug(&repo)?;
            let client = overrides.client(&config)?;
            let mut artifact = client.lazy_artifact(owner, name, artifact_id);
            let archive = artifact.download(&format).await?;

            // Server-provided names are reduced to their final component
            let path = output.unwrap_or_else(|| {
                archive
                    .filename
                    .as_deref()
                    .and_then(|name| Path::new(name).file_name())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(format!("artifact-{}.{}", artifact_id, format)))
            });
            std::fs::write(&path, &archive.content)
                .with_context(|| format!("Failed to write {:?}", path))?;

            println!("Wrote {} bytes to {}", archive.content.len(), path.display());
            Ok(())
        }
        Command::Delete { repo, artifact_id } => {
            let (owner, name) = parse_repo_slug(&repo)?;
            let client = overrides.client(&config)?;
            let mut artifact = client.lazy_artifact(owner, name, artifact_id);

            if artifact.delete().await? {
                println!("Deleted {}", artifact);
                Ok(())
            } else {
                anyhow::bail!("GitHub did not delete artifact {}", artifact_id)
            }
        }
        Command::Config {
            set_token,
            set_api_url,
            set_per_page,
        } => {
            if let Some(api_url) = set_api_url {
                config.api_url = Some(api_url);
            }
            if let Some(per_page) = set_per_page {
                config.per_page = Some(per_page);
            }
            match set_token {
                Some(token) => config.set_token(&token)?,
                None => config.save()?,
            }

            println!("api_url:  {}", config.effective_api_url());
            println!("per_page: {}", config.effective_per_page());
            println!(
                "token:    {}",
                if config.effective_token().is_some() { "set" } else { "not set" }
            );
            Ok(())
        }
    }
}

async fn print_row(artifact: &mut Artifact) -> Result<()> {
    let id = artifact.id().await?.unwrap_or_default();
    let size = artifact.size_in_bytes().await?.unwrap_or_default();
    let expired = artifact.expired().await?.unwrap_or(false);
    let name = artifact.name().await?.unwrap_or("-").to_string();

    println!(
        "{:>12}  {:>12}  {:<8}  {}",
        id,
        size,
        if expired { "expired" } else { "" },
        name
    );
    Ok(())
}

async fn print_details(artifact: &mut Artifact) -> Result<()> {
    let attrs = artifact.ensure_loaded().await?;
    let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    println!("id:                   {}", show(attrs.id.value().map(|v| v.to_string())));
    println!("node_id:              {}", show(attrs.node_id.cloned()));
    println!("name:                 {}", show(attrs.name.cloned()));
    println!(
        "size_in_bytes:        {}",
        show(attrs.size_in_bytes.value().map(|v| v.to_string()))
    );
    println!("url:                  {}", show(attrs.url.cloned()));
    println!("archive_download_url: {}", show(attrs.archive_download_url.cloned()));
    println!("expired:              {}", show(attrs.expired.value().map(|v| v.to_string())));
    println!("created_at:           {}", show(attrs.created_at.value().map(|v| v.to_rfc3339())));
    println!("updated_at:           {}", show(attrs.updated_at.value().map(|v| v.to_rfc3339())));
    println!("expires_at:           {}", show(attrs.expires_at.value().map(|v| v.to_rfc3339())));
    Ok(())
}
