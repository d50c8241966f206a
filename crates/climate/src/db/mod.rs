pub mod climate_data;
pub mod sqlite;

pub use climate_data::*;
pub use sqlite::*;

use time::{macros::format_description, Date};

/// One weather reading taken at a station on a given day.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub station_id: String,
    pub date: Date,
    pub precipitation: Option<f64>,
    pub temperature: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Station {
    pub station_id: String,
}

/// Immutable snapshot of both tables, loaded once at startup and shared by every request.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
    stations: Vec<Station>,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>, stations: Vec<Station>) -> Self {
        Self {
            observations,
            stations,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Earliest and latest observation dates, if any observations exist
    pub fn date_span(&self) -> Option<(Date, Date)> {
        let first = self.observations.iter().map(|o| o.date).min()?;
        let last = self.observations.iter().map(|o| o.date).max()?;
        Some((first, last))
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
}
