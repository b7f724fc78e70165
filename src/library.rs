use crate::prelude::*;
use ndarray::{ArrayBase, Data, Ix2};
use serde::Serialize;

/// One patient's row of readings, labelled with their name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub data: Vec<f64>,
}

/// Pairs each row of `data` with the name at the same position.
///
/// Fails with `LengthMismatch` when the row and name counts differ.
pub fn attach_names<S, N>(data: &ArrayBase<S, Ix2>, names: &[N]) -> Result<Vec<NamedSeries>>
where
    S: Data<Elem = f64>,
    N: AsRef<str>,
{
    if data.nrows() != names.len() {
        return Err(InflammationError::LengthMismatch {
            rows: data.nrows(),
            names: names.len(),
        });
    }

    Ok(data
        .rows()
        .into_iter()
        .zip(names.iter())
        .map(|(row, name)| NamedSeries {
            name: name.as_ref().to_owned(),
            data: row.to_vec(),
        })
        .collect())
}
