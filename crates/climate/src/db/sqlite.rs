use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

use super::{parse_date, Dataset, Observation, Station};

#[derive(sqlx::FromRow)]
struct MeasurementRow {
    id: i64,
    station: String,
    date: String,
    prcp: Option<f64>,
    tobs: Option<f64>,
}

impl TryFrom<MeasurementRow> for Observation {
    type Error = anyhow::Error;

    fn try_from(row: MeasurementRow) -> Result<Self> {
        let date = parse_date(&row.date)
            .with_context(|| format!("measurement {} has invalid date '{}'", row.id, row.date))?;
        let temperature = row
            .tobs
            .ok_or_else(|| anyhow!("measurement {} is missing a temperature reading", row.id))?;

        Ok(Observation {
            station_id: row.station,
            date,
            precipitation: row.prcp,
            temperature,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StationRow {
    station: String,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Station {
            station_id: row.station,
        }
    }
}

/// Opens the climate database read-only, copies both tables into memory and releases the handle.
pub async fn load_dataset(path: &str) -> Result<Dataset> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open climate database: {}", path))?;

    let dataset = read_dataset(&pool).await;
    pool.close().await;
    let dataset = dataset?;

    match dataset.date_span() {
        Some((first, last)) => info!(
            "Loaded {} observations from {} stations ({} to {}) from {}",
            dataset.observations().len(),
            dataset.stations().len(),
            first,
            last,
            path
        ),
        None => info!(
            "Loaded an empty observation table with {} stations from {}",
            dataset.stations().len(),
            path
        ),
    }

    Ok(dataset)
}

/// Reads both tables in storage order through an already opened pool.
pub async fn read_dataset(pool: &SqlitePool) -> Result<Dataset> {
    let measurements: Vec<MeasurementRow> =
        sqlx::query_as("SELECT id, station, date, prcp, tobs FROM measurement ORDER BY id")
            .fetch_all(pool)
            .await
            .context("Failed to read measurement table")?;
    debug!("read {} measurement rows", measurements.len());

    let observations = measurements
        .into_iter()
        .map(Observation::try_from)
        .collect::<Result<Vec<_>>>()?;

    let stations: Vec<StationRow> = sqlx::query_as("SELECT station FROM station ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to read station table")?;
    debug!("read {} station rows", stations.len());

    Ok(Dataset::new(
        observations,
        stations.into_iter().map(Station::from).collect(),
    ))
}
