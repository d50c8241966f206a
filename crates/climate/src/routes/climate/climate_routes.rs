use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::{error, info};
use std::{collections::BTreeMap, sync::Arc};
use time::Date;

use crate::{db, parse_date, AppState, TemperatureStats};

fn to_response(err: db::Error) -> (StatusCode, String) {
    error!("error answering climate query: {}", err);
    let status = match err {
        db::Error::EmptyDataset => StatusCode::NOT_FOUND,
        db::Error::MalformedDate { .. } => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string())
}

fn parse_path_date(input: &str) -> Result<Date, db::Error> {
    parse_date(input).map_err(|source| db::Error::MalformedDate {
        input: input.to_owned(),
        source,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation per date for the trailing 365 days of the dataset", content_type = "application/json", body = BTreeMap<String, Option<f64>>),
        (status = NOT_FOUND, description = "No observations are loaded")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, (StatusCode, String)> {
    let series = state.climate_db.precipitation_series().map_err(to_response)?;
    Ok(Json(
        series
            .into_iter()
            .map(|(date, prcp)| (date.to_string(), prcp))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station identifier in storage order", content_type = "application/json", body = Vec<String>)
    ))]
pub async fn stations(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.climate_db.station_ids())
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature readings of the most active station for the trailing 365 days", content_type = "application/json", body = Vec<f64>),
        (status = NOT_FOUND, description = "No observations are loaded")
    ))]
pub async fn temperature_observations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<f64>>, (StatusCode, String)> {
    let active = state.climate_db.most_active_station().map_err(to_response)?;
    info!(
        "most active station: {} ({} observations)",
        active.station_id, active.observation_count
    );
    let temperatures = state
        .climate_db
        .station_temperatures(&active.station_id)
        .map_err(to_response)?;
    Ok(Json(temperatures))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
         ("start" = String, Path, description = "First day of the range, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature min/avg/max from start through the latest observation", content_type = "application/json", body = TemperatureStats),
        (status = BAD_REQUEST, description = "Start is not a YYYY-MM-DD date")
    ))]
pub async fn temperature_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStats>, (StatusCode, String)> {
    let start = parse_path_date(&start).map_err(to_response)?;
    Ok(Json(state.climate_db.temperature_stats(start, None)))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
         ("start" = String, Path, description = "First day of the range, YYYY-MM-DD"),
         ("end" = String, Path, description = "Last day of the range, inclusive, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature min/avg/max between start and end", content_type = "application/json", body = TemperatureStats),
        (status = BAD_REQUEST, description = "Start or end is not a YYYY-MM-DD date")
    ))]
pub async fn temperature_stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, (StatusCode, String)> {
    let start = parse_path_date(&start).map_err(to_response)?;
    let end = parse_path_date(&end).map_err(to_response)?;
    Ok(Json(state.climate_db.temperature_stats(start, Some(end))))
}
