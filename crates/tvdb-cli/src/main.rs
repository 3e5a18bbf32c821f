//! tvdb - command-line client for the TVDB v4 API.

/// Application configuration (TOML).
mod config;
/// Plain-text rendering of records.
mod render;
/// Interactive shell.
mod shell;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use tvdb_api::TvdbClient;
use tvdb_api::types::SeasonType;

use crate::config::{AppConfig, resolve_config_path};
use crate::shell::{ShellCommand, dispatch, run_shell};

/// Environment variable holding the API key.
const API_KEY_ENV: &str = "TVDB_API_KEY";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Config file (default: ~/.config/tvdb/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search series, movies and people.
    Search(SearchArgs),
    /// Show a series.
    Series(IdArgs),
    /// List a page of a series' episodes.
    Episodes(EpisodesArgs),
    /// Show an episode.
    Episode(IdArgs),
    /// List the seasons of a series.
    Seasons(IdArgs),
    /// Show a movie.
    Movie(IdArgs),
    /// Show a person.
    Person(IdArgs),
    /// Show an artwork item.
    Artwork(IdArgs),
    /// Start the interactive shell.
    Shell,
    /// Write a config file with default settings.
    Init(InitArgs),
}

/// Arguments for the `init` subcommand.
#[derive(clap::Args)]
struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "breaking bad").
    #[arg(long, required = true)]
    query: String,
}

/// Arguments for subcommands taking a single record ID.
#[derive(clap::Args)]
struct IdArgs {
    /// TVDB record ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `episodes` subcommand.
#[derive(clap::Args)]
struct EpisodesArgs {
    /// TVDB series ID.
    #[arg(long, required = true)]
    id: u64,
    /// Page number.
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Episode ordering: default, official, dvd, absolute, alternate, regional.
    #[arg(long, default_value_t = SeasonType::Default)]
    season_type: SeasonType,
}

impl Commands {
    /// Maps a one-shot subcommand onto the equivalent shell command.
    /// Returns `None` for `shell` and `init`.
    fn to_shell_command(&self) -> Option<ShellCommand> {
        let command = match self {
            Self::Search(args) => ShellCommand::Search(args.query.clone()),
            Self::Series(args) => ShellCommand::Series(args.id),
            Self::Episodes(args) => ShellCommand::Episodes {
                id: args.id,
                page: args.page,
                season_type: args.season_type,
            },
            Self::Episode(args) => ShellCommand::Episode(args.id),
            Self::Seasons(args) => ShellCommand::Seasons(args.id),
            Self::Movie(args) => ShellCommand::Movie(args.id),
            Self::Person(args) => ShellCommand::Person(args.id),
            Self::Artwork(args) => ShellCommand::Artwork(args.id),
            Self::Shell | Self::Init(_) => return None,
        };
        Some(command)
    }
}

/// Picks the API key: the environment wins over the config file.
/// Empty values count as unset.
///
/// # Errors
///
/// Returns an error if neither source provides a key.
fn pick_api_key(from_env: Option<String>, from_config: Option<&str>) -> Result<String> {
    from_env
        .filter(|k| !k.is_empty())
        .or_else(|| from_config.filter(|k| !k.is_empty()).map(String::from))
        .with_context(|| {
            format!("{API_KEY_ENV} environment variable or api_key in the config file is required")
        })
}

/// Builds a `TvdbClient` from the config file and environment, and logs in.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, no API key is
/// available, the client fails to build, or the login is rejected.
#[instrument(skip_all)]
async fn connect_client(config_path: Option<&PathBuf>) -> Result<TvdbClient> {
    let path = resolve_config_path(config_path)?;
    let config = AppConfig::load(&path)?;
    tracing::debug!(path = %path.display(), "Config loaded");

    let api_key = pick_api_key(std::env::var(API_KEY_ENV).ok(), config.api_key.as_deref())?;

    TvdbClient::builder()
        .api_key(api_key)
        .base_url(config.base_url()?)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(config.timeout())
        .retry_policy(config.retry_policy())
        .connect()
        .await
        .context("failed to connect to TVDB")
}

/// Logs rendered lines at INFO level.
fn log_lines(lines: &[String]) {
    for line in lines {
        tracing::info!("{line}");
    }
}

/// Runs a one-shot subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the request fails.
#[instrument(skip_all)]
async fn run_command(command: &ShellCommand, config_path: Option<&PathBuf>) -> Result<()> {
    let client = connect_client(config_path).await?;
    let lines = dispatch(&client, command).await?;
    log_lines(&lines);
    Ok(())
}

/// Runs the interactive shell on stdin/stdout.
///
/// # Errors
///
/// Returns an error if the client cannot be built or terminal I/O fails.
#[instrument(skip_all)]
async fn run_interactive(config_path: Option<&PathBuf>) -> Result<()> {
    let client = connect_client(config_path).await?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_shell(&client, stdin.lock(), stdout.lock()).await
}

/// Writes the default config to the resolved config path.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or the
/// write fails.
fn run_init(args: &InitArgs, config_path: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    if path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default().save(&path)?;
    tracing::info!("Config written to {}", path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match &cli.command {
        Commands::Init(args) => run_init(args, cli.config.as_ref()),
        Commands::Shell => run_interactive(cli.config.as_ref()).await,
        command => match command.to_shell_command() {
            Some(shell_command) => run_command(&shell_command, cli.config.as_ref()).await,
            None => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::CommandFactory;
    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;

    #[test]
    fn test_cli_definition() {
        // Arrange & Act & Assert
        Cli::command().debug_assert();
    }

    #[test]
    fn test_episodes_args_defaults() {
        // Arrange & Act
        let cli = Cli::try_parse_from(["tvdb", "episodes", "--id", "81189"]).unwrap();

        // Assert
        assert_eq!(
            cli.command.to_shell_command(),
            Some(ShellCommand::Episodes {
                id: 81_189,
                page: 0,
                season_type: SeasonType::Default,
            })
        );
    }

    #[test]
    fn test_episodes_args_season_type() {
        // Arrange & Act
        let cli = Cli::try_parse_from([
            "tvdb",
            "episodes",
            "--id",
            "81189",
            "--page",
            "1",
            "--season-type",
            "Absolute",
        ])
        .unwrap();

        // Assert
        assert_eq!(
            cli.command.to_shell_command(),
            Some(ShellCommand::Episodes {
                id: 81_189,
                page: 1,
                season_type: SeasonType::Absolute,
            })
        );
    }

    #[test]
    fn test_invalid_season_type_is_rejected() {
        // Arrange & Act
        let result =
            Cli::try_parse_from(["tvdb", "episodes", "--id", "1", "--season-type", "weekly"]);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_shell_has_no_one_shot_command() {
        // Arrange & Act
        let cli = Cli::try_parse_from(["tvdb", "--config", "/tmp/x.toml", "shell"]).unwrap();

        // Assert
        assert!(cli.command.to_shell_command().is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
    }

    #[test]
    fn test_run_init_writes_defaults_once() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tvdb").join("config.toml");
        let args = InitArgs { force: false };

        // Act
        run_init(&args, Some(&path)).unwrap();
        let second = run_init(&args, Some(&path));

        // Assert
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
        assert!(second.unwrap_err().to_string().contains("already exists"));
        assert!(run_init(&InitArgs { force: true }, Some(&path)).is_ok());
    }

    #[test]
    fn test_pick_api_key_prefers_env() {
        // Arrange & Act
        let key = pick_api_key(Some(String::from("env-key")), Some("file-key")).unwrap();

        // Assert
        assert_eq!(key, "env-key");
    }

    #[test]
    fn test_pick_api_key_falls_back_to_config() {
        // Arrange & Act
        let key = pick_api_key(Some(String::new()), Some("file-key")).unwrap();

        // Assert
        assert_eq!(key, "file-key");
    }

    #[test]
    fn test_pick_api_key_missing() {
        // Arrange & Act
        let result = pick_api_key(None, None);

        // Assert
        assert!(result.unwrap_err().to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_log_lines_emits_one_event_per_line() {
        // Arrange
        let lines = vec![
            String::from("Series: Breaking Bad (ID: 81189)"),
            String::from("Aliases:"),
        ];
        let (subscriber, handle) = subscriber::mock()
            .event(
                expect::event()
                    .at_level(tracing::Level::INFO)
                    .with_fields(expect::msg("Series: Breaking Bad (ID: 81189)")),
            )
            .event(expect::event().with_fields(expect::msg("Aliases:")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || {
            log_lines(&lines);
        });

        // Assert
        handle.assert_finished();
    }
}
