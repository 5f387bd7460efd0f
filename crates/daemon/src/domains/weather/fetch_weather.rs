use serde_json::Value;
use slog::{debug, Logger};
use std::sync::Arc;

use crate::{Coordinates, FetchError, JsonFetcher};

/// Decoded current-weather response, shape not yet validated
pub type RawWeatherPayload = Value;

pub struct WeatherService {
    pub logger: Logger,
    pub fetcher: Arc<JsonFetcher>,
    weather_url: String,
    api_key: String,
}

impl WeatherService {
    pub fn new(
        logger: Logger,
        fetcher: Arc<JsonFetcher>,
        weather_url: String,
        api_key: String,
    ) -> Self {
        WeatherService {
            logger,
            fetcher,
            weather_url,
            api_key,
        }
    }

    /// Fetches the current weather at a point, in metric units.
    pub async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawWeatherPayload, FetchError> {
        debug!(self.logger, "fetching weather for lat {} lon {}", latitude, longitude);
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        self.fetcher.fetch_json(&self.weather_url, &query).await
    }

    pub async fn fetch_weather_at(
        &self,
        coordinates: Coordinates,
    ) -> Result<RawWeatherPayload, FetchError> {
        self.fetch_weather(coordinates.latitude, coordinates.longitude)
            .await
    }
}
