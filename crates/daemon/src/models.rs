use time::OffsetDateTime;

/// Geographic position as reported by the city catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A cataloged city.
///
/// `id` is the population rank at catalog-fetch time (1-based position in the
/// upstream response). It is not stable across re-fetches if the upstream
/// ordering or the cutoff changes.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub population: i64,
    /// Used to query the weather api, not persisted
    pub coordinates: Coordinates,
}

/// Upstream weather condition, keyed by the provider's condition code
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCondition {
    pub id: i64,
    pub description: String,
    pub icon_id: String,
}

/// One observation of the current weather in a city
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub city_id: i64,
    pub weather_id: i64,
    pub temperature: f64,
    pub temperature_feels_like: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub humidity: i64,
    pub pressure: i64,
    pub sea_level_pressure: Option<i64>,
    pub ground_level_pressure: Option<i64>,
    pub visibility: i64,
    pub wind_speed: f64,
    pub wind_direction: i64,
    pub wind_gust: Option<f64>,
    pub clouds: i64,
    pub rain_1h: Option<f64>,
    pub rain_3h: Option<f64>,
    pub snow_1h: Option<f64>,
    pub snow_3h: Option<f64>,
    pub date_time: OffsetDateTime,
    pub sunrise: OffsetDateTime,
    pub sunset: OffsetDateTime,
}

/// A persisted observation together with its row id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObservation {
    pub cw_id: i64,
    pub weather: CurrentWeather,
}
