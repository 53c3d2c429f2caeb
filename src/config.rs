// Command-line and environment configuration.
// Parses flags with env fallbacks and validates them into runtime settings.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use url::Url;

use crate::api::DEFAULT_BASE_URL;
use crate::error::{FeedError, Result};
use crate::query::{DEFAULT_RETRY, QueryOptions};
use crate::state::Route;

const DEFAULT_STALE_TIME_SECS: u64 = 5 * 60;

/// Command-line arguments for the feedview binary.
#[derive(Debug, Parser)]
#[command(name = "feedview", version, about = "Browse a post feed in the terminal")]
pub struct CliArgs {
    /// Base URL of the posts API.
    #[arg(
        long = "base-url",
        env = "FEEDVIEW_BASE_URL",
        value_name = "URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub base_url: String,

    /// Seconds a successful fetch is served from cache.
    #[arg(
        long = "stale-time-secs",
        env = "FEEDVIEW_STALE_TIME_SECS",
        default_value_t = DEFAULT_STALE_TIME_SECS
    )]
    pub stale_time_secs: u64,

    /// Retries after a failed fetch, with exponential backoff.
    #[arg(long, env = "FEEDVIEW_RETRY", default_value_t = DEFAULT_RETRY)]
    pub retry: u32,

    /// Log file; defaults to feedview.log in the platform data directory.
    #[arg(long = "log-file", env = "FEEDVIEW_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Screen to open at startup: `/` for the feed or `/{id}` for a post.
    #[arg(long, env = "FEEDVIEW_OPEN", value_name = "PATH", default_value = "/")]
    pub open: String,

    /// Log filter directive, e.g. `info` or `feedview=debug`.
    #[arg(long = "log-level", env = "FEEDVIEW_LOG", default_value = "info")]
    pub log_level: String,
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub file: PathBuf,
    pub filter: String,
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub query: QueryOptions,
    pub logging: LoggingSettings,
    pub initial_route: Route,
}

impl Settings {
    pub fn from_cli(args: CliArgs) -> Result<Self> {
        let parsed = Url::parse(&args.base_url).map_err(|err| {
            FeedError::Config(format!("invalid base URL {}: {}", args.base_url, err))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FeedError::Config(format!(
                "base URL must use http or https, got {}",
                parsed.scheme()
            )));
        }

        let initial_route = Route::parse(&args.open)
            .ok_or_else(|| FeedError::Config(format!("invalid start path {}", args.open)))?;

        let file = match args.log_file {
            Some(path) => path,
            None => default_log_path().ok_or_else(|| {
                FeedError::Config("no data directory available; pass --log-file".to_string())
            })?,
        };

        Ok(Self {
            base_url: args.base_url.trim_end_matches('/').to_string(),
            query: QueryOptions {
                stale_time: Duration::from_secs(args.stale_time_secs),
                retry: args.retry,
                ..QueryOptions::default()
            },
            logging: LoggingSettings {
                file,
                filter: args.log_level,
            },
            initial_route,
        })
    }
}

/// Get the platform data directory (~/.local/share/feedview on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "feedview").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Default path of the log file.
pub fn default_log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("feedview.log"))
}
