use serde::Deserialize;
use time::OffsetDateTime;

use crate::{City, CurrentWeather, MalformedPayloadError, RawWeatherPayload, WeatherCondition};

#[derive(Deserialize)]
struct WeatherResponse {
    weather: Option<Vec<ConditionEntry>>,
    main: Option<Main>,
    visibility: Option<f64>,
    wind: Option<Wind>,
    clouds: Option<Clouds>,
    rain: Option<Precipitation>,
    snow: Option<Precipitation>,
    dt: Option<f64>,
    sys: Option<Sys>,
}

#[derive(Deserialize)]
struct ConditionEntry {
    id: Option<f64>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Deserialize, Default)]
struct Main {
    temp: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    sea_level: Option<f64>,
    grnd_level: Option<f64>,
}

#[derive(Deserialize, Default)]
struct Wind {
    speed: Option<f64>,
    deg: Option<f64>,
    gust: Option<f64>,
}

#[derive(Deserialize, Default)]
struct Clouds {
    all: Option<f64>,
}

#[derive(Deserialize, Default)]
struct Precipitation {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Deserialize, Default)]
struct Sys {
    sunrise: Option<f64>,
    sunset: Option<f64>,
}

fn required<T>(value: Option<T>, path: &str) -> Result<T, MalformedPayloadError> {
    value.ok_or_else(|| MalformedPayloadError::missing(path))
}

/// Integer columns accept JSON numbers with no fractional part.
fn whole(value: f64, path: &str) -> Result<i64, MalformedPayloadError> {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(MalformedPayloadError::invalid(path, "expected an integer"))
    }
}

fn required_i64(value: Option<f64>, path: &str) -> Result<i64, MalformedPayloadError> {
    whole(required(value, path)?, path)
}

fn optional_i64(value: Option<f64>, path: &str) -> Result<Option<i64>, MalformedPayloadError> {
    value.map(|v| whole(v, path)).transpose()
}

fn timestamp(value: Option<f64>, path: &str) -> Result<OffsetDateTime, MalformedPayloadError> {
    OffsetDateTime::from_unix_timestamp(required_i64(value, path)?)
        .map_err(|e| MalformedPayloadError::invalid(path, e.to_string()))
}

impl TryFrom<ConditionEntry> for WeatherCondition {
    type Error = MalformedPayloadError;

    fn try_from(entry: ConditionEntry) -> Result<Self, Self::Error> {
        Ok(WeatherCondition {
            id: required_i64(entry.id, "weather.0.id")?,
            description: required(entry.description, "weather.0.description")?,
            icon_id: required(entry.icon, "weather.0.icon")?,
        })
    }
}

impl WeatherResponse {
    fn into_records(
        self,
        city: &City,
    ) -> Result<(WeatherCondition, CurrentWeather), MalformedPayloadError> {
        // only the first reported condition is kept
        let entry = self
            .weather
            .and_then(|entries| entries.into_iter().next())
            .ok_or_else(|| MalformedPayloadError::missing("weather.0"))?;
        let condition = WeatherCondition::try_from(entry)?;

        let main = self.main.unwrap_or_default();
        let wind = self.wind.unwrap_or_default();
        let clouds = self.clouds.unwrap_or_default();
        let rain = self.rain.unwrap_or_default();
        let snow = self.snow.unwrap_or_default();
        let sys = self.sys.unwrap_or_default();

        let current = CurrentWeather {
            city_id: city.id,
            weather_id: condition.id,
            temperature: required(main.temp, "main.temp")?,
            temperature_feels_like: required(main.feels_like, "main.feels_like")?,
            min_temperature: required(main.temp_min, "main.temp_min")?,
            max_temperature: required(main.temp_max, "main.temp_max")?,
            humidity: required_i64(main.humidity, "main.humidity")?,
            pressure: required_i64(main.pressure, "main.pressure")?,
            sea_level_pressure: optional_i64(main.sea_level, "main.sea_level")?,
            ground_level_pressure: optional_i64(main.grnd_level, "main.grnd_level")?,
            visibility: required_i64(self.visibility, "visibility")?,
            wind_speed: required(wind.speed, "wind.speed")?,
            wind_direction: required_i64(wind.deg, "wind.deg")?,
            wind_gust: wind.gust,
            clouds: required_i64(clouds.all, "clouds.all")?,
            rain_1h: rain.one_hour,
            rain_3h: rain.three_hours,
            snow_1h: snow.one_hour,
            snow_3h: snow.three_hours,
            date_time: timestamp(self.dt, "dt")?,
            sunrise: timestamp(sys.sunrise, "sys.sunrise")?,
            sunset: timestamp(sys.sunset, "sys.sunset")?,
        };

        Ok((condition, current))
    }
}

/// Splits a raw current-weather payload into its condition and measurement records.
///
/// Required fields fail the transform when absent; precipitation, gust and
/// sea/ground level pressure become `None` instead. A value of the wrong type
/// anywhere in the payload is malformed.
pub fn transform(
    city: &City,
    payload: &RawWeatherPayload,
) -> Result<(WeatherCondition, CurrentWeather), MalformedPayloadError> {
    let response = WeatherResponse::deserialize(payload)
        .map_err(|e| MalformedPayloadError::invalid("weather response", e.to_string()))?;
    response.into_records(city)
}
