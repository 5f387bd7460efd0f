use thiserror::Error;

/// Schema, connection and transaction failures from the SQLite store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to prepare database directory: {0}")]
    Directory(#[from] std::io::Error),
}

/// An upstream payload lacks a required field or carries a value of the wrong shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedPayloadError {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("invalid value for field `{path}`: {reason}")]
    InvalidField { path: String, reason: String },
}

impl MalformedPayloadError {
    pub fn missing(path: impl Into<String>) -> Self {
        MalformedPayloadError::MissingField(path.into())
    }

    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        MalformedPayloadError::InvalidField {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Transport failures and unusable responses from the upstream APIs
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("response body from {url} is not valid json: {reason}")]
    Decode { url: String, reason: String },
    #[error("malformed payload: {0}")]
    Malformed(#[from] MalformedPayloadError),
}

/// Missing or unusable settings, raised before any request is sent
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("no weather api key configured, set OPENWEATHER_API_KEY or `api_key` in the config file")]
    MissingApiKey,
    #[error("invalid setting `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Why a single city was skipped during a polling cycle
#[derive(Error, Debug)]
pub enum CityError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Malformed(#[from] MalformedPayloadError),
}

/// Failures that leave the daemon with nothing to do
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("schema initialization failed: {0}")]
    Schema(#[source] StorageError),
    #[error("city catalog fetch failed: {0}")]
    Catalog(#[source] FetchError),
}
