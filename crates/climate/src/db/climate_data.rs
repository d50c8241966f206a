use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};
use time::{Date, Duration};
use utoipa::ToSchema;

use super::{Dataset, Observation};

/// Length of the trailing window anchored on the most recent observation.
pub const TRAILING_WINDOW_DAYS: i64 = 365;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No observations loaded, unable to anchor a date window")]
    EmptyDataset,
    #[error("Malformed date '{input}', expected YYYY-MM-DD: {source}")]
    MalformedDate {
        input: String,
        #[source]
        source: time::error::Parse,
    },
}

/// Precipitation per day, keyed by date alone.
pub type PrecipitationSeries = BTreeMap<Date, Option<f64>>;

#[derive(Clone, Debug, PartialEq)]
pub struct StationActivity {
    pub station_id: String,
    pub observation_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureStats {
    pub start_date: String,
    /// "N/A" when the range is open ended
    pub end_date: String,
    #[serde(rename = "TMIN")]
    pub min_temperature: Option<f64>,
    #[serde(rename = "TAVG")]
    pub avg_temperature: Option<f64>,
    #[serde(rename = "TMAX")]
    pub max_temperature: Option<f64>,
}

pub const OPEN_ENDED: &str = "N/A";

pub trait ClimateData: Sync + Send {
    /// Latest observation date across every station
    fn recent_date(&self) -> Result<Date, Error>;
    fn precipitation_series(&self) -> Result<PrecipitationSeries, Error>;
    fn station_ids(&self) -> Vec<String>;
    fn most_active_station(&self) -> Result<StationActivity, Error>;
    /// Temperatures of one station inside the trailing window of the whole dataset
    fn station_temperatures(&self, station_id: &str) -> Result<Vec<f64>, Error>;
    fn most_active_station_temperatures(&self) -> Result<Vec<f64>, Error> {
        let active = self.most_active_station()?;
        self.station_temperatures(&active.station_id)
    }
    fn temperature_stats(&self, start: Date, end: Option<Date>) -> TemperatureStats;
}

pub struct ClimateAccess {
    dataset: Arc<Dataset>,
}

impl ClimateAccess {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    fn trailing_window_start(&self) -> Result<Date, Error> {
        let recent = self.recent_date()?;
        Ok(recent.saturating_sub(Duration::days(TRAILING_WINDOW_DAYS)))
    }

    fn in_trailing_window(&self) -> Result<impl Iterator<Item = &Observation>, Error> {
        let cutoff = self.trailing_window_start()?;
        Ok(self
            .dataset
            .observations()
            .iter()
            .filter(move |obs| obs.date >= cutoff))
    }
}

impl ClimateData for ClimateAccess {
    fn recent_date(&self) -> Result<Date, Error> {
        self.dataset
            .observations()
            .iter()
            .map(|obs| obs.date)
            .max()
            .ok_or(Error::EmptyDataset)
    }

    fn precipitation_series(&self) -> Result<PrecipitationSeries, Error> {
        // Readings from different stations on the same day overwrite each other
        Ok(self
            .in_trailing_window()?
            .map(|obs| (obs.date, obs.precipitation))
            .collect())
    }

    fn station_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.dataset
            .stations()
            .iter()
            .filter(|station| seen.insert(station.station_id.as_str()))
            .map(|station| station.station_id.clone())
            .collect()
    }

    fn most_active_station(&self) -> Result<StationActivity, Error> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for obs in self.dataset.observations() {
            *counts.entry(obs.station_id.as_str()).or_default() += 1;
        }

        // Ties go to the lexicographically smallest station id
        counts
            .into_iter()
            .max_by(|(id_a, count_a), (id_b, count_b)| {
                count_a.cmp(count_b).then_with(|| id_b.cmp(id_a))
            })
            .map(|(station_id, observation_count)| StationActivity {
                station_id: station_id.to_owned(),
                observation_count,
            })
            .ok_or(Error::EmptyDataset)
    }

    fn station_temperatures(&self, station_id: &str) -> Result<Vec<f64>, Error> {
        Ok(self
            .in_trailing_window()?
            .filter(|obs| obs.station_id == station_id)
            .map(|obs| obs.temperature)
            .collect())
    }

    fn temperature_stats(&self, start: Date, end: Option<Date>) -> TemperatureStats {
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        let in_range = self
            .dataset
            .observations()
            .iter()
            .filter(|obs| obs.date >= start && end.map_or(true, |end| obs.date <= end));
        for obs in in_range {
            min = Some(min.map_or(obs.temperature, |m| m.min(obs.temperature)));
            max = Some(max.map_or(obs.temperature, |m| m.max(obs.temperature)));
            sum += obs.temperature;
            count += 1;
        }

        TemperatureStats {
            start_date: start.to_string(),
            end_date: end.map_or_else(|| OPEN_ENDED.to_string(), |end| end.to_string()),
            min_temperature: min,
            avg_temperature: (count > 0).then(|| sum / count as f64),
            max_temperature: max,
        }
    }
}
