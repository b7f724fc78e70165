#![crate_name = "inflammation"]
use std::fmt;
use std::sync::Arc;

use crate::error::{InflammationError, Result};

pub mod prelude;

pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod serializers;
pub mod statistics;
pub mod table;

/// Inflammation readings, one row per patient and one column per day.
pub type InflammationTable = ndarray::Array2<f64>;

pub type Day = u32;

/// Anything identified by a display name.
pub trait Person {
    fn name(&self) -> &str;
}

/// A single inflammation reading taken on `day`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub day: Day,
    pub value: f64,
}

impl Observation {
    pub fn new(day: Day, value: f64) -> Self {
        Self { day, value }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A patient in an inflammation study and their observation history.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    name: String,
    observations: Vec<Observation>,
}

impl Patient {
    /// Constructs a `Patient` with no observations.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            observations: vec![],
        }
    }

    pub fn with_observations(name: &str, observations: Vec<Observation>) -> Self {
        Self {
            name: name.into(),
            observations,
        }
    }

    /// Records a new observation and returns it.
    ///
    /// Without an explicit `day` the observation is placed on the day
    /// after the latest one, or on day 0 for an empty history. Fails with
    /// `DayOverflow` when the latest day is already `Day::MAX`.
    pub fn add_observation(&mut self, value: f64, day: Option<Day>) -> Result<&Observation> {
        let day = match (day, self.observations.last()) {
            (Some(day), _) => day,
            (None, Some(last)) => last
                .day
                .checked_add(1)
                .ok_or(InflammationError::DayOverflow(last.day))?,
            (None, None) => 0,
        };
        self.observations.push(Observation::new(day, value));
        Ok(&self.observations[self.observations.len() - 1])
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn last_observation(&self) -> Option<&Observation> {
        self.observations.last()
    }
}

impl Person for Patient {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A doctor and the patients assigned to them.
///
/// Patients are shared rather than owned, a patient may be assigned to
/// more than one doctor.
#[derive(Debug, Clone)]
pub struct Doctor {
    name: String,
    patients: Vec<Arc<Patient>>,
}

impl Doctor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            patients: vec![],
        }
    }

    pub fn with_patients<I>(name: &str, patients: I) -> Self
    where
        I: IntoIterator<Item = Arc<Patient>>,
    {
        Self {
            name: name.into(),
            patients: patients.into_iter().collect(),
        }
    }

    /// Assigns a patient and returns the updated list.
    pub fn add_patient(&mut self, patient: Arc<Patient>) -> &[Arc<Patient>] {
        self.patients.push(patient);
        &self.patients
    }

    pub fn patients(&self) -> &[Arc<Patient>] {
        &self.patients
    }
}

impl Person for Doctor {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
