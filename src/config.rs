//! TOML configuration for table loading, the record store and logging.
//!
//! Every section and key is optional:
//!
//! ```toml
//! [table]
//! delimiter = ","
//! headers = false
//!
//! [store]
//! format = "json"
//! atomic = true
//!
//! [logging]
//! level = "info"
//! file = "inflammation.log"
//! timestamps = false
//! ```
use crate::logging::{self, Component, LogLevel};
use crate::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub table: TableConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    pub delimiter: String,
    pub headers: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".into(),
            headers: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub format: String,
    pub atomic: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            format: Format::Json.name().into(),
            atomic: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
            timestamps: false,
        }
    }
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| InflammationError::io(path, e))?;
        let config: Config = text.parse()?;
        logging::debug(
            Component::Config,
            &format!("read configuration from {}", path.display()),
        );
        Ok(config)
    }

    pub fn table_builder(&self) -> Result<TableBuilder> {
        let delimiter = match self.table.delimiter.as_bytes() {
            [byte] => *byte,
            _ => {
                return Err(InflammationError::Config(format!(
                    "delimiter must be a single byte, got `{}`",
                    self.table.delimiter
                )))
            }
        };

        let mut builder = TableBuilder::new();
        builder.delimiter(delimiter).headers(self.table.headers);
        Ok(builder)
    }

    pub fn store(&self) -> Result<PatientStore> {
        let format = self
            .store
            .format
            .parse::<Format>()
            .map_err(|e| InflammationError::Config(e.to_string()))?;

        let mut store = PatientStore::new();
        store.format(format).atomic(self.store.atomic);
        Ok(store)
    }

    /// Installs the configured logger as the global one.
    pub fn init_logging(&self) -> Result<()> {
        let level = self.logging.level.parse::<LogLevel>()?;
        logging::init_logger(level, self.logging.file.as_deref(), self.logging.timestamps);
        Ok(())
    }
}

impl FromStr for Config {
    type Err = InflammationError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::error::Error;

    #[test]
    fn test_empty_config_uses_defaults() -> Result<(), Box<dyn Error>> {
        let config: Config = "".parse()?;
        assert_eq!(config, Config::default());
        assert_eq!(config.table.delimiter, ",");
        assert!(config.store.atomic);
        assert_eq!(config.logging.level, "info");
        Ok(())
    }

    #[test]
    fn test_partial_config() -> Result<(), Box<dyn Error>> {
        let config: Config = "[table]\ndelimiter = \";\"\nheaders = true\n\n[store]\nformat = \"jsonl\"\n"
            .parse()?;
        assert_eq!(config.table.delimiter, ";");
        assert!(config.table.headers);
        assert_eq!(config.store.format, "jsonl");
        assert!(config.store.atomic);

        let table = config
            .table_builder()?
            .from_reader("a;b\n1;2\n".as_bytes())?;
        assert_eq!(table, array![[1., 2.]]);
        Ok(())
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = "[table\ndelimiter = ".parse::<Config>();
        assert!(matches!(result, Err(InflammationError::Config(_))));

        let result = "[store]\ncompression = true\n".parse::<Config>();
        assert!(matches!(result, Err(InflammationError::Config(_))));
    }

    #[test]
    fn test_invalid_values_are_config_errors() -> Result<(), Box<dyn Error>> {
        let config: Config = "[table]\ndelimiter = \"::\"\n[store]\nformat = \"xml\"\n[logging]\nlevel = \"loud\"\n"
            .parse()?;
        assert!(matches!(config.table_builder(), Err(InflammationError::Config(_))));
        assert!(matches!(config.store(), Err(InflammationError::Config(_))));
        assert!(matches!(config.init_logging(), Err(InflammationError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_configured_store_round_trip() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::TempDir::new()?;
        let config_path = dir.path().join("inflammation.toml");
        fs::write(&config_path, "[store]\nformat = \"jsonl\"\natomic = false\n")?;

        let config = Config::from_path(&config_path)?;
        let mut patient = Patient::new("Alice");
        patient.add_observation(0.5, None)?;

        let data_path = dir.path().join("patients.jsonl");
        config.store()?.save(&[patient.clone()], &data_path)?;
        let loaded = config.store()?.load(&data_path)?;
        assert_eq!(loaded, vec![patient]);
        Ok(())
    }
}
