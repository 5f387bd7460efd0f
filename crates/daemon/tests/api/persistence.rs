use crate::helpers::{city, open_store};
use daemon::{CurrentWeather, Database, WeatherCondition};
use time::OffsetDateTime;

fn observation(city_id: i64, weather_id: i64) -> CurrentWeather {
    CurrentWeather {
        city_id,
        weather_id,
        temperature: 22.5,
        temperature_feels_like: 21.9,
        min_temperature: 20.0,
        max_temperature: 24.0,
        humidity: 55,
        pressure: 1013,
        sea_level_pressure: Some(1015),
        ground_level_pressure: None,
        visibility: 10000,
        wind_speed: 3.1,
        wind_direction: 200,
        wind_gust: None,
        clouds: 0,
        rain_1h: Some(0.42),
        rain_3h: None,
        snow_1h: None,
        snow_3h: None,
        date_time: OffsetDateTime::from_unix_timestamp(1700000000).unwrap(),
        sunrise: OffsetDateTime::from_unix_timestamp(1699990000).unwrap(),
        sunset: OffsetDateTime::from_unix_timestamp(1700030000).unwrap(),
    }
}

fn condition(id: i64, description: &str, icon: &str) -> WeatherCondition {
    WeatherCondition {
        id,
        description: description.to_string(),
        icon_id: icon.to_string(),
    }
}

#[tokio::test]
async fn schema_creation_is_idempotent() {
    let store = open_store().await;
    let before = store.db.table_definitions().await.unwrap();

    store.db.initialize_schema().await.unwrap();
    let after = store.db.table_definitions().await.unwrap();

    let names: Vec<&str> = after.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["cities", "current_weather", "weather_condition"]);
    assert_eq!(before, after);
}

#[tokio::test]
async fn duplicate_cities_are_ignored() {
    let store = open_store().await;
    let cities = vec![
        city(1, "Tokyo", "Japan", 37400068, 35.68, 139.69),
        city(2, "Delhi", "India", 28514000, 28.65, 77.23),
    ];

    assert_eq!(store.db.upsert_cities(&cities).await.unwrap(), 2);
    assert_eq!(store.db.upsert_cities(&cities).await.unwrap(), 0);

    let stored = store.db.list_cities().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].id, 1);
    assert_eq!(stored[0].name, "Tokyo");
    assert_eq!(stored[1].population, 28514000);
}

#[tokio::test]
async fn first_condition_description_wins() {
    let store = open_store().await;

    let first = store
        .db
        .upsert_weather_conditions(&[condition(800, "clear sky", "01d")])
        .await
        .unwrap();
    let second = store
        .db
        .upsert_weather_conditions(&[condition(800, "sunny", "01n")])
        .await
        .unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 0);
    let stored = store.db.get_weather_condition(800).await.unwrap().unwrap();
    assert_eq!(stored.description, "clear sky");
    assert_eq!(stored.icon_id, "01d");
    assert!(store.db.get_weather_condition(500).await.unwrap().is_none());
}

#[tokio::test]
async fn repeated_observations_append_rows() {
    let store = open_store().await;
    store
        .db
        .upsert_cities(&[city(1, "Tokyo", "Japan", 37400068, 35.68, 139.69)])
        .await
        .unwrap();
    store
        .db
        .upsert_weather_conditions(&[condition(800, "clear sky", "01d")])
        .await
        .unwrap();

    let observed = observation(1, 800);
    store.db.upsert_current_weather(&[observed.clone()]).await.unwrap();
    store.db.upsert_current_weather(&[observed.clone()]).await.unwrap();

    assert_eq!(store.db.count_current_weather().await.unwrap(), 2);
    let rows = store.db.current_weather_for_city(1).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].cw_id < rows[1].cw_id);
    assert_eq!(rows[0].weather, observed);
    assert_eq!(rows[1].weather, observed);
}

#[tokio::test]
async fn data_survives_reopen() {
    let store = open_store().await;
    let path = store.dir.path().join("data/weather_data.db");
    store
        .db
        .upsert_cities(&[city(1, "Tokyo", "Japan", 37400068, 35.68, 139.69)])
        .await
        .unwrap();
    store.db.close().await.unwrap();

    let reopened = Database::open(&path).await.unwrap();
    reopened.initialize_schema().await.unwrap();
    let cities = reopened.list_cities().await.unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].name, "Tokyo");
    reopened.close().await.unwrap();
}

#[tokio::test]
async fn foreign_keys_are_not_enforced() {
    let store = open_store().await;

    let enforced: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(store.db.pool())
        .await
        .unwrap();
    assert_eq!(enforced, 0);

    // neither city 99 nor condition 800 exist
    let inserted = store
        .db
        .upsert_current_weather(&[observation(99, 800)])
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(store.db.current_weather_for_city(99).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_batch_is_rolled_back() {
    let store = open_store().await;
    sqlx::query(
        "CREATE TRIGGER reject_rain BEFORE INSERT ON weather_condition
         WHEN NEW.weather_id = 500
         BEGIN SELECT RAISE(ABORT, 'rain rejected'); END",
    )
    .execute(store.db.pool())
    .await
    .unwrap();

    let result = store
        .db
        .upsert_weather_conditions(&[
            condition(800, "clear sky", "01d"),
            condition(500, "light rain", "10d"),
        ])
        .await;

    assert!(result.is_err());
    // the row written before the failure is gone with the transaction
    assert!(store.db.get_weather_condition(800).await.unwrap().is_none());

    // the single pooled connection is usable again
    let retried = store
        .db
        .upsert_weather_conditions(&[condition(800, "clear sky", "01d")])
        .await
        .unwrap();
    assert_eq!(retried, 1);
}
