use cityweather_core::create_parent_dir;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::{path::Path, time::Duration};
use time::OffsetDateTime;

use super::schema;
use crate::{City, Coordinates, CurrentWeather, StorageError, StoredObservation, WeatherCondition};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if missing) the SQLite file at `db_path`.
    ///
    /// Schema creation is a separate step, see [`Database::initialize_schema`].
    pub async fn open(db_path: &Path) -> Result<Self, StorageError> {
        create_parent_dir(db_path)?;

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            // sqlx turns enforcement on by default
            .foreign_keys(false);

        // single writer, single connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the cities, weather_condition and current_weather tables if absent.
    /// Safe to call on every start.
    pub async fn initialize_schema(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for statement in schema::TABLES {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Inserts cities, leaving rows with an existing id or name untouched.
    /// Returns the number of rows inserted.
    pub async fn upsert_cities(&self, cities: &[City]) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for city in cities {
            inserted += sqlx::query(
                "INSERT OR IGNORE INTO cities (city_id, name, country, population)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(city.id)
            .bind(&city.name)
            .bind(&city.country)
            .bind(city.population)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Inserts weather conditions; the first description seen for a code wins.
    pub async fn upsert_weather_conditions(
        &self,
        conditions: &[WeatherCondition],
    ) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for condition in conditions {
            inserted += sqlx::query(
                "INSERT OR IGNORE INTO weather_condition (weather_id, description, icon_id)
                 VALUES (?, ?, ?)",
            )
            .bind(condition.id)
            .bind(&condition.description)
            .bind(&condition.icon_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Appends observations to the log, every call adds new rows.
    pub async fn upsert_current_weather(
        &self,
        observations: &[CurrentWeather],
    ) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for w in observations {
            inserted += sqlx::query(
                "INSERT OR IGNORE INTO current_weather (
                    city_id, weather_id, temperature, temperature_feels_like,
                    min_temperature, max_temperature, humidity, pressure,
                    sea_level_pressure, ground_level_pressure, visibility,
                    wind_speed, wind_direction, wind_gust, clouds,
                    rain_1h, rain_3h, snow_1h, snow_3h,
                    date_time, sunrise, sunset
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(w.city_id)
            .bind(w.weather_id)
            .bind(w.temperature)
            .bind(w.temperature_feels_like)
            .bind(w.min_temperature)
            .bind(w.max_temperature)
            .bind(w.humidity)
            .bind(w.pressure)
            .bind(w.sea_level_pressure)
            .bind(w.ground_level_pressure)
            .bind(w.visibility)
            .bind(w.wind_speed)
            .bind(w.wind_direction)
            .bind(w.wind_gust)
            .bind(w.clouds)
            .bind(w.rain_1h)
            .bind(w.rain_3h)
            .bind(w.snow_1h)
            .bind(w.snow_3h)
            .bind(w.date_time.unix_timestamp())
            .bind(w.sunrise.unix_timestamp())
            .bind(w.sunset.unix_timestamp())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Cities ordered by rank. Coordinates are not stored and come back as zero.
    pub async fn list_cities(&self) -> Result<Vec<City>, StorageError> {
        let rows = sqlx::query(
            "SELECT city_id, name, country, population FROM cities ORDER BY city_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<City, StorageError> {
                Ok(City {
                    id: row.try_get("city_id")?,
                    name: row.try_get("name")?,
                    country: row.try_get("country")?,
                    population: row.try_get("population")?,
                    coordinates: Coordinates {
                        latitude: 0.0,
                        longitude: 0.0,
                    },
                })
            })
            .collect()
    }

    pub async fn get_weather_condition(
        &self,
        weather_id: i64,
    ) -> Result<Option<WeatherCondition>, StorageError> {
        let row = sqlx::query(
            "SELECT weather_id, description, icon_id FROM weather_condition WHERE weather_id = ?",
        )
        .bind(weather_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<WeatherCondition, StorageError> {
            Ok(WeatherCondition {
                id: row.try_get("weather_id")?,
                description: row.try_get("description")?,
                icon_id: row.try_get("icon_id")?,
            })
        })
        .transpose()
    }

    /// Observations for a city, oldest row first
    pub async fn current_weather_for_city(
        &self,
        city_id: i64,
    ) -> Result<Vec<StoredObservation>, StorageError> {
        let rows = sqlx::query(
            "SELECT cw_id, city_id, weather_id, temperature, temperature_feels_like,
                    min_temperature, max_temperature, humidity, pressure,
                    sea_level_pressure, ground_level_pressure, visibility,
                    wind_speed, wind_direction, wind_gust, clouds,
                    rain_1h, rain_3h, snow_1h, snow_3h,
                    date_time, sunrise, sunset
             FROM current_weather WHERE city_id = ? ORDER BY cw_id",
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_observation).collect()
    }

    pub async fn count_current_weather(&self) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM current_weather")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// `(name, sql)` of every table, sorted by name
    pub async fn table_definitions(&self) -> Result<Vec<(String, String)>, StorageError> {
        let tables: Vec<(String, String)> = sqlx::query_as(
            "SELECT name, sql FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    /// Flushes the WAL and closes every pooled connection.
    ///
    /// The pool is closed even when the checkpoint fails; the checkpoint error
    /// is returned afterwards.
    pub async fn close(&self) -> Result<(), StorageError> {
        let checkpoint = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
            .execute(&self.pool)
            .await;
        self.pool.close().await;
        checkpoint?;
        Ok(())
    }
}

fn timestamp(row: &SqliteRow, column: &str) -> Result<OffsetDateTime, StorageError> {
    let seconds: i64 = row.try_get(column)?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))
}

fn row_to_observation(row: &SqliteRow) -> Result<StoredObservation, StorageError> {
    Ok(StoredObservation {
        cw_id: row.try_get("cw_id")?,
        weather: CurrentWeather {
            city_id: row.try_get("city_id")?,
            weather_id: row.try_get("weather_id")?,
            temperature: row.try_get("temperature")?,
            temperature_feels_like: row.try_get("temperature_feels_like")?,
            min_temperature: row.try_get("min_temperature")?,
            max_temperature: row.try_get("max_temperature")?,
            humidity: row.try_get("humidity")?,
            pressure: row.try_get("pressure")?,
            sea_level_pressure: row.try_get("sea_level_pressure")?,
            ground_level_pressure: row.try_get("ground_level_pressure")?,
            visibility: row.try_get("visibility")?,
            wind_speed: row.try_get("wind_speed")?,
            wind_direction: row.try_get("wind_direction")?,
            wind_gust: row.try_get("wind_gust")?,
            clouds: row.try_get("clouds")?,
            rain_1h: row.try_get("rain_1h")?,
            rain_3h: row.try_get("rain_3h")?,
            snow_1h: row.try_get("snow_1h")?,
            snow_3h: row.try_get("snow_3h")?,
            date_time: timestamp(row, "date_time")?,
            sunrise: timestamp(row, "sunrise")?,
            sunset: timestamp(row, "sunset")?,
        },
    })
}
