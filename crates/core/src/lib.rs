//! City Weather Core Library
//!
//! Shared utilities for the ingestion daemon:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Default endpoints and intervals

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{create_dir_all, create_parent_dir};

/// Application name used for XDG paths
pub const APP_NAME: &str = "cityweather";

/// Default time between polling cycles (1 hour)
pub const DEFAULT_FETCH_INTERVAL: u64 = 3600;

/// Number of cities pulled from the catalog
pub const DEFAULT_CITY_LIMIT: u32 = 50;

/// Default HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 20;

/// Ranked city dataset search endpoint (opendatasoft geonames export)
pub const DEFAULT_CATALOG_URL: &str = "https://data.opendatasoft.com/api/records/1.0/search/";

/// Dataset holding every city with a population above 1000
pub const CATALOG_DATASET: &str = "geonames-all-cities-with-a-population-1000@public";

/// Current weather by coordinates endpoint
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Default SQLite database file
pub const DEFAULT_DB_PATH: &str = "./data/weather_data.db";
