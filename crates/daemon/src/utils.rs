use clap::Parser;
use cityweather_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_CATALOG_URL, DEFAULT_CITY_LIMIT,
    DEFAULT_DB_PATH, DEFAULT_FETCH_INTERVAL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_WEATHER_URL,
};
use reqwest::Client;
use serde_json::Value;
use slog::{debug, o, Drain, Level, Logger};
use std::{env, fmt, path::PathBuf, time::Duration};

use crate::{ConfigError, FetchError};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "City weather daemon - polls current weather for the most populous cities into SQLite"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $CITYWEATHER_DAEMON_CONFIG, ./daemon.toml,
    /// $XDG_CONFIG_HOME/cityweather/daemon.toml, /etc/cityweather/daemon.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "CITYWEATHER_DAEMON_LEVEL")]
    pub level: Option<String>,

    /// SQLite database file
    #[arg(long, env = "CITYWEATHER_DAEMON_DB_PATH")]
    pub db_path: Option<String>,

    /// Ranked city dataset search endpoint
    #[arg(long, env = "CITYWEATHER_DAEMON_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Current weather endpoint
    #[arg(long, env = "CITYWEATHER_DAEMON_WEATHER_URL")]
    pub weather_url: Option<String>,

    /// Weather api key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Number of cities to track, ranked by population
    #[arg(long, env = "CITYWEATHER_DAEMON_CITY_LIMIT")]
    pub city_limit: Option<u32>,

    /// Seconds to sleep between polling cycles
    #[arg(short, long, env = "CITYWEATHER_DAEMON_SLEEP_INTERVAL")]
    pub sleep_interval: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "CITYWEATHER_DAEMON_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// HTTP User-Agent header for upstream requests
    #[arg(short, long, env = "CITYWEATHER_DAEMON_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Cli {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(self.db_path.as_deref().unwrap_or(DEFAULT_DB_PATH))
    }

    pub fn catalog_url(&self) -> String {
        self.catalog_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string())
    }

    pub fn weather_url(&self) -> String {
        self.weather_url
            .clone()
            .unwrap_or_else(|| DEFAULT_WEATHER_URL.to_string())
    }

    pub fn city_limit(&self) -> u32 {
        self.city_limit.unwrap_or(DEFAULT_CITY_LIMIT)
    }

    pub fn sleep_interval(&self) -> u64 {
        self.sleep_interval.unwrap_or(DEFAULT_FETCH_INTERVAL)
    }

    pub fn request_timeout(&self) -> u64 {
        self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("cityweather-daemon/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Validates the effective settings and freezes them into a [`PipelineConfig`]
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        let city_limit = self.city_limit();
        if city_limit == 0 {
            return Err(ConfigError::Invalid {
                name: "city_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.sleep_interval() == 0 {
            return Err(ConfigError::Invalid {
                name: "sleep_interval",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.request_timeout() == 0 {
            return Err(ConfigError::Invalid {
                name: "request_timeout",
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(PipelineConfig {
            api_key,
            catalog_url: self.catalog_url(),
            weather_url: self.weather_url(),
            city_limit,
            poll_interval: Duration::from_secs(self.sleep_interval()),
            request_timeout: Duration::from_secs(self.request_timeout()),
            user_agent: self.user_agent(),
            db_path: self.db_path(),
        })
    }
}

/// Settings handed to each component at construction
#[derive(Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub catalog_url: String,
    pub weather_url: String,
    pub city_limit: u32,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub db_path: PathBuf,
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("api_key", &"<redacted>")
            .field("catalog_url", &self.catalog_url)
            .field("weather_url", &self.weather_url)
            .field("city_limit", &self.city_limit)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> anyhow::Result<Cli> {
    // A missing .env file is fine, the variables may come from the real environment
    let _ = dotenvy::dotenv();
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("CITYWEATHER_DAEMON_CONFIG", "daemon.toml")
    };

    let file_config: Cli = load_config(&source)?;
    Ok(merge_config(cli_args, file_config))
}

/// CLI args (and the env vars clap resolved for them) override file config
pub fn merge_config(cli_args: Cli, file_config: Cli) -> Cli {
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        db_path: cli_args.db_path.or(file_config.db_path),
        catalog_url: cli_args.catalog_url.or(file_config.catalog_url),
        weather_url: cli_args.weather_url.or(file_config.weather_url),
        api_key: cli_args.api_key.or(file_config.api_key),
        city_limit: cli_args.city_limit.or(file_config.city_limit),
        sleep_interval: cli_args.sleep_interval.or(file_config.sleep_interval),
        request_timeout: cli_args.request_timeout.or(file_config.request_timeout),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Shared HTTP client for the JSON upstream APIs
pub struct JsonFetcher {
    logger: Logger,
    client: Client,
}

impl JsonFetcher {
    pub fn new(logger: Logger, user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { logger, client })
    }

    /// GETs `url` with the given query parameters and decodes the body as JSON.
    ///
    /// Query values are not logged, they may carry credentials.
    pub async fn fetch_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        debug!(self.logger, "requesting: {}", url);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
