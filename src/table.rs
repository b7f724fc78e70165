use crate::logging::{self, Component};
use crate::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Builds an `InflammationTable` from nested rows.
///
/// All rows must have the same number of days.
pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<InflammationTable> {
    let patients = rows.len();
    let days = rows.first().map_or(0, |row| row.len());

    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != days) {
        return Err(InflammationError::InvalidShape(format!(
            "row {} has {} days, expected {}",
            idx,
            row.len(),
            days
        )));
    }

    let data: Vec<f64> = rows.into_iter().flatten().collect();
    InflammationTable::from_shape_vec((patients, days), data)
        .map_err(|e| InflammationError::InvalidShape(e.to_string()))
}

/// Loads a comma separated table without a header row.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<InflammationTable> {
    TableBuilder::new().from_path(path)
}

/// Reads delimited numeric text into an `InflammationTable`
///
/// One line per patient, one field per day.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    headers: bool,
    delimiter: u8,
}

impl TableBuilder {
    /// Construct a new builder for headerless, comma separated input
    pub fn new() -> Self {
        Self {
            headers: false,
            delimiter: b',',
        }
    }

    /// Skip the first line as a header row
    pub fn headers(&mut self, headers: bool) -> &mut Self {
        self.headers = headers;
        self
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<InflammationTable> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| InflammationError::io(path, e))?;
        let table = self.from_reader(file)?;
        logging::info(
            Component::Table,
            &format!(
                "loaded {} patients over {} days from {}",
                table.nrows(),
                table.ncols(),
                path.display()
            ),
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<InflammationTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.headers)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = vec![];
        for (idx, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| {
                let ragged = matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. });
                if ragged {
                    InflammationError::InvalidShape(e.to_string())
                } else {
                    InflammationError::from(e)
                }
            })?;

            let row = record
                .iter()
                .enumerate()
                .map(|(day, field)| {
                    field.parse::<f64>().map_err(|_| {
                        InflammationError::Format(format!(
                            "row {}, day {}: `{}` is not a number",
                            idx, day, field
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        logging::debug(Component::Table, &format!("parsed {} rows", rows.len()));
        from_rows(rows)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
