use cityweather_core::CATALOG_DATASET;
use serde::Deserialize;
use serde_json::Value;
use slog::{info, Logger};
use std::sync::Arc;

use crate::{City, Coordinates, FetchError, JsonFetcher, MalformedPayloadError};

#[derive(Deserialize)]
struct CatalogResponse {
    records: Vec<CatalogRecord>,
}

#[derive(Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    fields: CatalogFields,
}

#[derive(Deserialize, Default)]
struct CatalogFields {
    ascii_name: Option<String>,
    cou_name_en: Option<String>,
    population: Option<i64>,
    coordinates: Option<Vec<f64>>,
}

impl CatalogRecord {
    /// `rank` is the 1-based position of the record in the response
    fn into_city(self, rank: usize) -> Result<City, MalformedPayloadError> {
        let field = |name: &str| format!("records.{}.fields.{}", rank - 1, name);
        let fields = self.fields;

        let name = fields
            .ascii_name
            .ok_or_else(|| MalformedPayloadError::missing(field("ascii_name")))?;
        let country = fields
            .cou_name_en
            .ok_or_else(|| MalformedPayloadError::missing(field("cou_name_en")))?;
        let population = fields
            .population
            .ok_or_else(|| MalformedPayloadError::missing(field("population")))?;
        let coordinates = match fields.coordinates.as_deref() {
            // upstream order is [latitude, longitude]
            Some([latitude, longitude, ..]) => Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            },
            Some(_) => {
                return Err(MalformedPayloadError::invalid(
                    field("coordinates"),
                    "expected [latitude, longitude]",
                ))
            }
            None => return Err(MalformedPayloadError::missing(field("coordinates"))),
        };

        Ok(City {
            id: rank as i64,
            name,
            country,
            population,
            coordinates,
        })
    }
}

/// Parses a catalog search response into ranked cities.
///
/// Any malformed record fails the whole catalog.
pub fn parse_catalog(payload: Value) -> Result<Vec<City>, MalformedPayloadError> {
    if payload.get("records").is_none() {
        return Err(MalformedPayloadError::missing("records"));
    }
    let response: CatalogResponse = serde_json::from_value(payload)
        .map_err(|e| MalformedPayloadError::invalid("records", e.to_string()))?;

    response
        .records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_city(index + 1))
        .collect()
}

pub struct CityService {
    pub logger: Logger,
    pub fetcher: Arc<JsonFetcher>,
    catalog_url: String,
}

impl CityService {
    pub fn new(logger: Logger, fetcher: Arc<JsonFetcher>, catalog_url: String) -> Self {
        CityService {
            logger,
            fetcher,
            catalog_url,
        }
    }

    /// Fetches the `limit` most populous cities, ranked by descending population.
    pub async fn fetch_top_cities(&self, limit: u32) -> Result<Vec<City>, FetchError> {
        info!(self.logger, "fetching top {} cities from {}", limit, self.catalog_url);
        let query = [
            ("dataset", CATALOG_DATASET.to_string()),
            ("q", String::new()),
            ("lang", "en".to_string()),
            ("rows", limit.to_string()),
            ("sort", "population".to_string()),
        ];
        let payload = self.fetcher.fetch_json(&self.catalog_url, &query).await?;
        let cities = parse_catalog(payload)?;

        info!(self.logger, "catalog returned {} cities", cities.len());
        Ok(cities)
    }
}
