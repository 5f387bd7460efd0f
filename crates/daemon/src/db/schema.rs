//! Table definitions for the weather store.
//!
//! Foreign keys are declared but not enforced: `Database::open` turns
//! `PRAGMA foreign_keys` off. An observation whose city row was never stored
//! is still kept.

pub const CREATE_CITIES: &str = "CREATE TABLE IF NOT EXISTS cities (
    city_id INTEGER PRIMARY KEY NOT NULL,
    name VARCHAR(100) UNIQUE NOT NULL,
    country VARCHAR(100) NOT NULL,
    population INT(10) NOT NULL
)";

pub const CREATE_WEATHER_CONDITION: &str = "CREATE TABLE IF NOT EXISTS weather_condition (
    weather_id INTEGER PRIMARY KEY NOT NULL,
    description VARCHAR(100) NOT NULL,
    icon_id VARCHAR(10) NOT NULL
)";

pub const CREATE_CURRENT_WEATHER: &str = "CREATE TABLE IF NOT EXISTS current_weather (
    cw_id INTEGER PRIMARY KEY NOT NULL,
    city_id INT REFERENCES cities (city_id) ON UPDATE CASCADE,
    weather_id INT REFERENCES weather_condition (weather_id) ON UPDATE CASCADE,
    temperature FLOAT,
    temperature_feels_like FLOAT,
    min_temperature FLOAT,
    max_temperature FLOAT,
    humidity INT,
    pressure INT,
    sea_level_pressure INT,
    ground_level_pressure INT,
    visibility INT,
    wind_speed FLOAT,
    wind_direction INT,
    wind_gust FLOAT,
    clouds INT,
    rain_1h FLOAT,
    rain_3h FLOAT,
    snow_1h FLOAT,
    snow_3h FLOAT,
    date_time TIMESTAMP,
    sunrise TIMESTAMP,
    sunset TIMESTAMP
)";

/// Creation order, parents before children
pub const TABLES: [&str; 3] = [CREATE_CITIES, CREATE_WEATHER_CONDITION, CREATE_CURRENT_WEATHER];
