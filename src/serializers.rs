//! Conversion between patient records and their persisted text form.
//!
//! `Serializer` implementations map models to plain records and back.
//! `Format` turns a list of records into one text blob, and `PatientStore`
//! moves that blob to and from disk. Supporting a new file format only
//! touches `Format`.
use crate::logging::{self, Component};
use crate::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

/// Maps models to serializable records and back, preserving order.
pub trait Serializer {
    type Model;
    type Record: Serialize + DeserializeOwned;

    fn serialize(instances: &[Self::Model]) -> Vec<Self::Record>;
    fn deserialize(data: Vec<Self::Record>) -> Vec<Self::Model>;
}

/// Persisted form of an `Observation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationRecord {
    pub day: Day,
    #[serde(with = "non_finite_as_token")]
    pub value: f64,
}

/// Persisted form of a `Patient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    pub name: String,
    pub observations: Vec<ObservationRecord>,
}

// JSON numbers cannot hold NaN or infinities, so those are written as the
// string tokens "NaN", "Infinity" and "-Infinity". A bare null reads as NaN.
mod non_finite_as_token {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use serde::Serializer;

    const NAN: &str = "NaN";
    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reading {
        Number(f64),
        Token(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if *value == f64::INFINITY {
            serializer.serialize_str(INFINITY)
        } else if *value == f64::NEG_INFINITY {
            serializer.serialize_str(NEG_INFINITY)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Reading>::deserialize(deserializer)? {
            None => Ok(f64::NAN),
            Some(Reading::Number(value)) => Ok(value),
            Some(Reading::Token(token)) => match token.as_str() {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    de::Unexpected::Str(other),
                    &"a number, \"NaN\", \"Infinity\" or \"-Infinity\"",
                )),
            },
        }
    }
}

pub struct ObservationSerializer;

impl Serializer for ObservationSerializer {
    type Model = Observation;
    type Record = ObservationRecord;

    fn serialize(instances: &[Observation]) -> Vec<ObservationRecord> {
        instances
            .iter()
            .map(|observation| ObservationRecord {
                day: observation.day,
                value: observation.value,
            })
            .collect()
    }

    fn deserialize(data: Vec<ObservationRecord>) -> Vec<Observation> {
        data.into_iter()
            .map(|record| Observation::new(record.day, record.value))
            .collect()
    }
}

pub struct PatientSerializer;

impl Serializer for PatientSerializer {
    type Model = Patient;
    type Record = PatientRecord;

    fn serialize(instances: &[Patient]) -> Vec<PatientRecord> {
        instances
            .iter()
            .map(|patient| PatientRecord {
                name: patient.name().to_owned(),
                observations: ObservationSerializer::serialize(patient.observations()),
            })
            .collect()
    }

    fn deserialize(data: Vec<PatientRecord>) -> Vec<Patient> {
        data.into_iter()
            .map(|record| {
                let observations = ObservationSerializer::deserialize(record.observations);
                Patient::with_observations(&record.name, observations)
            })
            .collect()
    }
}

impl PatientSerializer {
    /// Writes `patients` to `path` as JSON, replacing the file atomically.
    pub fn save<P: AsRef<Path>>(patients: &[Patient], path: P) -> Result<()> {
        PatientStore::new().save(patients, path)
    }

    /// Reads patients from a JSON file written by `save`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Patient>> {
        PatientStore::new().load(path)
    }
}

/// Text encodings for a list of records, looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// A single JSON array of objects.
    Json,
    /// One JSON object per line.
    JsonLines,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Json, Format::JsonLines];

    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::JsonLines => "jsonl",
        }
    }

    /// Picks the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or(Format::Json)
    }

    pub fn encode<T: Serialize>(&self, records: &[T]) -> Result<String> {
        match self {
            Format::Json => Ok(serde_json::to_string(records)?),
            Format::JsonLines => {
                let mut text = String::new();
                for record in records {
                    text.push_str(&serde_json::to_string(record)?);
                    text.push('\n');
                }
                Ok(text)
            }
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<Vec<T>> {
        match self {
            Format::Json => Ok(serde_json::from_str(text)?),
            Format::JsonLines => text
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(idx, line)| {
                    serde_json::from_str(line).map_err(|e| {
                        InflammationError::Format(format!("line {}: {}", idx + 1, e))
                    })
                })
                .collect(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Format {
    type Err = InflammationError;

    fn from_str(s: &str) -> Result<Self> {
        Format::ALL
            .iter()
            .copied()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| InflammationError::Format(format!("unknown record format `{}`", s)))
    }
}

/// Saves and loads whole patient lists in one `Format`.
#[derive(Debug, Clone)]
pub struct PatientStore {
    format: Format,
    atomic: bool,
}

impl PatientStore {
    /// A JSON store with atomic writes.
    pub fn new() -> Self {
        Self {
            format: Format::Json,
            atomic: true,
        }
    }

    /// A store whose format follows the file extension of `path`.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        let mut store = Self::new();
        store.format(Format::from_path(path.as_ref()));
        store
    }

    pub fn format(&mut self, format: Format) -> &mut Self {
        self.format = format;
        self
    }

    /// Write through a temporary file and rename it over the target.
    ///
    /// An existing target keeps its permissions. A new file gets the
    /// temporary file's owner-only permissions.
    pub fn atomic(&mut self, atomic: bool) -> &mut Self {
        self.atomic = atomic;
        self
    }

    pub fn save<P: AsRef<Path>>(&self, patients: &[Patient], path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.format.encode(&PatientSerializer::serialize(patients))?;

        let written = if self.atomic {
            write_atomic(path, &text)
        } else {
            fs::write(path, &text)
        };

        if let Err(e) = written {
            logging::error(
                Component::Store,
                &format!("could not write {}: {}", path.display(), e),
            );
            return Err(InflammationError::io(path, e));
        }

        logging::info(
            Component::Store,
            &format!(
                "saved {} patients to {} as {}",
                patients.len(),
                path.display(),
                self.format
            ),
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Patient>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| InflammationError::io(path, e))?;
        let records: Vec<PatientRecord> = self.format.decode(&text)?;
        let patients = PatientSerializer::deserialize(records);

        logging::info(
            Component::Store,
            &format!("loaded {} patients from {}", patients.len(), path.display()),
        );
        Ok(patients)
    }
}

impl Default for PatientStore {
    fn default() -> Self {
        Self::new()
    }
}

fn write_atomic(path: &Path, text: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
