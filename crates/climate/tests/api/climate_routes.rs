use crate::helpers::{mock_dataset, spawn_app, spawn_app_with_dataset, MockClimateAccess};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use climate_api::{Error, StationActivity, TemperatureStats};
use hyper::{header, Method};
use serde_json::{from_slice, json, Value};
use std::sync::Arc;
use time::macros::date;
use tower::ServiceExt;

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();

    app.clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.")
}

async fn json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    from_slice(&body).unwrap()
}

async fn text_body(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn precipitation_covers_trailing_year() {
    let test_app = spawn_app_with_dataset(mock_dataset());

    let response = get(&test_app.app, "/api/v1.0/precipitation").await;
    assert_eq!(response.status(), StatusCode::OK);

    // same-day readings collapse onto the last station read
    assert_eq!(
        json_body(response).await,
        json!({
            "2016-08-23": 0.0,
            "2017-08-18": null,
            "2017-08-23": 0.08
        })
    );
}

#[tokio::test]
async fn stations_lists_every_identifier() {
    let test_app = spawn_app_with_dataset(mock_dataset());

    let response = get(&test_app.app, "/api/v1.0/stations").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!(["USC00519397", "USC00519281"])
    );
}

#[tokio::test]
async fn tobs_returns_most_active_station_readings() {
    let test_app = spawn_app_with_dataset(mock_dataset());

    let response = get(&test_app.app, "/api/v1.0/tobs").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([77.0, 79.0, 76.0]));
}

#[tokio::test]
async fn tobs_selects_busiest_station_once() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_most_active_station()
        .times(1)
        .returning(|| {
            Ok(StationActivity {
                station_id: "USC00519281".to_string(),
                observation_count: 2772,
            })
        });
    climate_db
        .expect_station_temperatures()
        .withf(|station_id| station_id == "USC00519281")
        .times(1)
        .returning(|_| Ok(vec![77.0, 80.0]));
    climate_db.expect_most_active_station_temperatures().never();
    let test_app = spawn_app(Arc::new(climate_db));

    let response = get(&test_app.app, "/api/v1.0/tobs").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([77.0, 80.0]));
}

#[tokio::test]
async fn start_only_stats_are_open_ended() {
    let test_app = spawn_app_with_dataset(mock_dataset());

    let response = get(&test_app.app, "/api/v1.0/2017-01-01").await;
    assert_eq!(response.status(), StatusCode::OK);

    let stats: TemperatureStats = from_slice(
        &to_bytes(response.into_body(), usize::MAX).await.unwrap(),
    )
    .unwrap();
    assert_eq!(stats.start_date, "2017-01-01");
    assert_eq!(stats.end_date, "N/A");
    assert_eq!(stats.min_temperature, Some(76.0));
    assert_eq!(stats.max_temperature, Some(81.0));
    let avg = stats.avg_temperature.unwrap();
    assert!((avg - 236.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn start_end_stats_include_both_bounds() {
    let test_app = spawn_app_with_dataset(mock_dataset());

    let response = get(&test_app.app, "/api/v1.0/2016-08-23/2016-08-23").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "start_date": "2016-08-23",
            "end_date": "2016-08-23",
            "TMIN": 77.0,
            "TAVG": 79.0,
            "TMAX": 81.0
        })
    );
}

#[tokio::test]
async fn stats_outside_dataset_are_null() {
    let test_app = spawn_app_with_dataset(mock_dataset());

    let response = get(&test_app.app, "/api/v1.0/2020-01-01/2020-12-31").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "start_date": "2020-01-01",
            "end_date": "2020-12-31",
            "TMIN": null,
            "TAVG": null,
            "TMAX": null
        })
    );
}

#[tokio::test]
async fn malformed_dates_are_rejected() {
    let mut climate_db = MockClimateAccess::new();
    climate_db.expect_temperature_stats().never();
    let test_app = spawn_app(Arc::new(climate_db));

    let response = get(&test_app.app, "/api/v1.0/08-23-2017").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(text_body(response).await.contains("08-23-2017"));

    let response = get(&test_app.app, "/api/v1.0/2017-01-01/2017-02-30").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(text_body(response).await.contains("2017-02-30"));
}

#[tokio::test]
async fn stats_pass_parsed_dates_to_query() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .withf(|start, end| *start == date!(2017 - 02 - 28) && *end == Some(date!(2017 - 03 - 05)))
        .times(1)
        .returning(|_, _| TemperatureStats {
            start_date: "2017-02-28".to_string(),
            end_date: "2017-03-05".to_string(),
            min_temperature: Some(62.0),
            avg_temperature: Some(69.5),
            max_temperature: Some(77.0),
        });
    let test_app = spawn_app(Arc::new(climate_db));

    let response = get(&test_app.app, "/api/v1.0/2017-02-28/2017-03-05").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["TAVG"], json!(69.5));
}

#[tokio::test]
async fn empty_dataset_is_not_found() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_precipitation_series()
        .times(1)
        .returning(|| Err(Error::EmptyDataset));
    climate_db
        .expect_most_active_station()
        .times(1)
        .returning(|| Err(Error::EmptyDataset));
    climate_db.expect_station_temperatures().never();
    climate_db.expect_station_ids().times(1).returning(Vec::new);
    let test_app = spawn_app(Arc::new(climate_db));

    let response = get(&test_app.app, "/api/v1.0/precipitation").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&test_app.app, "/api/v1.0/tobs").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&test_app.app, "/api/v1.0/stations").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}
