use slog::{error, info, warn, Logger};
use std::sync::Arc;

use crate::{
    transform, City, CityError, CityService, CurrentWeather, Database, FetchError, JsonFetcher,
    PipelineConfig, StartupError, WeatherCondition, WeatherService,
};

/// Outcome of one polling cycle. `None` counts mean the write failed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    pub observed: usize,
    pub failed: usize,
    pub conditions_inserted: Option<u64>,
    pub observations_inserted: Option<u64>,
}

pub struct Pipeline {
    logger: Logger,
    config: PipelineConfig,
    db: Database,
    city_service: CityService,
    weather_service: WeatherService,
}

impl Pipeline {
    pub fn new(logger: Logger, config: PipelineConfig, db: Database) -> Result<Self, FetchError> {
        let fetcher = Arc::new(JsonFetcher::new(
            logger.clone(),
            &config.user_agent,
            config.request_timeout,
        )?);
        let city_service =
            CityService::new(logger.clone(), fetcher.clone(), config.catalog_url.clone());
        let weather_service = WeatherService::new(
            logger.clone(),
            fetcher,
            config.weather_url.clone(),
            config.api_key.clone(),
        );

        Ok(Pipeline {
            logger,
            config,
            db,
            city_service,
            weather_service,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Creates the schema and loads the city catalog.
    ///
    /// Schema and catalog failures are fatal. Failing to store the cities is
    /// logged and the returned catalog is still used for polling.
    pub async fn bootstrap(&self) -> Result<Vec<City>, StartupError> {
        self.db
            .initialize_schema()
            .await
            .map_err(StartupError::Schema)?;
        info!(self.logger, "database schema ready");

        let cities = self
            .city_service
            .fetch_top_cities(self.config.city_limit)
            .await
            .map_err(StartupError::Catalog)?;

        match self.db.upsert_cities(&cities).await {
            Ok(inserted) => info!(
                self.logger,
                "cities saved to database ({} of {} new)",
                inserted,
                cities.len()
            ),
            Err(e) => error!(self.logger, "failed to save cities: {}", e),
        }

        Ok(cities)
    }

    async fn observe_city(&self, city: &City) -> Result<(WeatherCondition, CurrentWeather), CityError> {
        let payload = self
            .weather_service
            .fetch_weather_at(city.coordinates)
            .await?;
        Ok(transform(city, &payload)?)
    }

    /// Fetches, transforms and stores the current weather for every city.
    ///
    /// A city whose fetch or payload fails is skipped. Observations are only
    /// written once their weather conditions are stored.
    pub async fn run_cycle(&self, cities: &[City]) -> CycleReport {
        let mut report = CycleReport::default();
        let mut conditions = Vec::with_capacity(cities.len());
        let mut observations = Vec::with_capacity(cities.len());

        for city in cities {
            match self.observe_city(city).await {
                Ok((condition, current)) => {
                    conditions.push(condition);
                    observations.push(current);
                }
                Err(e) => {
                    report.failed += 1;
                    error!(self.logger, "skipping {} ({}): {}", city.name, city.country, e);
                }
            }
        }
        report.observed = observations.len();

        if observations.is_empty() {
            warn!(self.logger, "no weather observed for any of {} cities", cities.len());
            return report;
        }

        match self.db.upsert_weather_conditions(&conditions).await {
            Ok(inserted) => {
                info!(self.logger, "weather conditions saved ({} new)", inserted);
                report.conditions_inserted = Some(inserted);
            }
            Err(e) => {
                error!(self.logger, "failed to save weather conditions, skipping observations: {}", e);
                return report;
            }
        }

        match self.db.upsert_current_weather(&observations).await {
            Ok(inserted) => {
                info!(self.logger, "current weather saved for {} cities", inserted);
                report.observations_inserted = Some(inserted);
            }
            Err(e) => error!(self.logger, "failed to save current weather: {}", e),
        }

        report
    }
}
