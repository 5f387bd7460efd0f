use daemon::{City, Coordinates, Database, PipelineConfig};
use serde_json::{json, Value};
use slog::{o, Logger};
use std::time::Duration;
use tempfile::TempDir;

pub const API_KEY: &str = "test-key";

pub fn test_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// Keeps the temp dir alive for as long as the database is in use
pub struct TestStore {
    pub db: Database,
    pub dir: TempDir,
}

pub async fn open_store() -> TestStore {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db = Database::open(&dir.path().join("data/weather_data.db"))
        .await
        .expect("failed to open database");
    db.initialize_schema()
        .await
        .expect("failed to create schema");
    TestStore { db, dir }
}

pub fn city(id: i64, name: &str, country: &str, population: i64, lat: f64, lon: f64) -> City {
    City {
        id,
        name: name.to_string(),
        country: country.to_string(),
        population,
        coordinates: Coordinates {
            latitude: lat,
            longitude: lon,
        },
    }
}

pub fn catalog_record(name: &str, country: &str, population: i64, lat: f64, lon: f64) -> Value {
    json!({
        "datasetid": "geonames-all-cities-with-a-population-1000@public",
        "fields": {
            "ascii_name": name,
            "cou_name_en": country,
            "population": population,
            "coordinates": [lat, lon]
        }
    })
}

pub fn catalog(records: Vec<Value>) -> Value {
    json!({ "nhits": records.len(), "records": records })
}

pub fn weather_payload(condition_id: i64, description: &str, icon: &str, temp: f64) -> Value {
    json!({
        "weather": [{"id": condition_id, "main": "Clear", "description": description, "icon": icon}],
        "main": {
            "temp": temp,
            "feels_like": 21.9,
            "temp_min": 20,
            "temp_max": 24,
            "humidity": 55,
            "pressure": 1013
        },
        "visibility": 10000,
        "wind": {"speed": 3.1, "deg": 200},
        "clouds": {"all": 0},
        "dt": 1700000000,
        "sys": {"sunrise": 1699990000, "sunset": 1700030000}
    })
}

pub fn test_config(server_uri: &str, dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        api_key: API_KEY.to_string(),
        catalog_url: format!("{}/api/records/1.0/search/", server_uri),
        weather_url: format!("{}/data/2.5/weather", server_uri),
        city_limit: 50,
        poll_interval: Duration::from_secs(3600),
        request_timeout: Duration::from_secs(5),
        user_agent: "cityweather-test".to_string(),
        db_path: dir.path().join("data/weather_data.db"),
    }
}
