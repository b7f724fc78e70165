use crate::logging::{self, Component};
use crate::prelude::*;
use ndarray::{Array1, ArrayBase, Axis, Data, Dimension, Ix2, Zip};

/// Per-day aggregates over a table with one row per patient.
///
/// Every method fails with `InvalidShape` for a table without rows or days.
pub trait DailyStatistics {
    fn daily_mean(&self) -> Result<Array1<f64>>;
    fn daily_max(&self) -> Result<Array1<f64>>;
    fn daily_min(&self) -> Result<Array1<f64>>;
}

fn ensure_not_empty<S>(data: &ArrayBase<S, Ix2>) -> Result<()>
where
    S: Data<Elem = f64>,
{
    let (patients, days) = data.dim();
    if patients == 0 || days == 0 {
        return Err(InflammationError::InvalidShape(format!(
            "cannot aggregate an empty {} x {} table",
            patients, days
        )));
    }
    Ok(())
}

// NaN in a column wins, the same as an unmasked max/min.
fn nan_propagating(acc: f64, x: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if acc.is_nan() || x.is_nan() {
        f64::NAN
    } else {
        pick(acc, x)
    }
}

impl<S> DailyStatistics for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn daily_mean(&self) -> Result<Array1<f64>> {
        ensure_not_empty(self)?;
        self.mean_axis(Axis(0)).ok_or_else(|| {
            InflammationError::InvalidShape("cannot average over zero patients".into())
        })
    }

    fn daily_max(&self) -> Result<Array1<f64>> {
        ensure_not_empty(self)?;
        Ok(self.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| {
            nan_propagating(acc, x, f64::max)
        }))
    }

    fn daily_min(&self) -> Result<Array1<f64>> {
        ensure_not_empty(self)?;
        Ok(self.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| {
            nan_propagating(acc, x, f64::min)
        }))
    }
}

/// Scales every patient's row by that row's maximum.
///
/// NaN entries are skipped when locating the maximum. Results that are
/// not finite (zero or NaN maxima) or negative become `0`, so the output
/// lies in `[0, 1]`. The input is never modified.
///
/// Checks run in a fixed order: negative values (`InvalidValue`), then
/// rank (`InvalidShape`), then conversion into a 2-D table (`InvalidType`).
pub fn patient_normalise<S, D>(data: &ArrayBase<S, D>) -> Result<InflammationTable>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if data.iter().any(|&x| x < 0.0) {
        return Err(InflammationError::InvalidValue);
    }

    if data.ndim() != 2 {
        return Err(InflammationError::InvalidShape(format!(
            "inflammation array should be 2-dimensional, got {} dimensions",
            data.ndim()
        )));
    }

    // Cannot fail once the rank check has passed; InvalidType stays for
    // callers matching on the full error set.
    let table = data
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|e| InflammationError::InvalidType(e.to_string()))?;

    // f64::max ignores NaN, so an all-NaN row keeps the NaN seed.
    let maxima = table.map_axis(Axis(1), |row| row.iter().copied().fold(f64::NAN, f64::max));

    let degenerate = maxima.iter().filter(|max| !(**max > 0.0)).count();
    if degenerate > 0 {
        logging::warn(
            Component::Statistics,
            &format!("{} patient rows have no positive maximum, clamped to 0", degenerate),
        );
    }

    let mut normalised = table.to_owned();
    Zip::from(normalised.rows_mut())
        .and(&maxima)
        .for_each(|mut row, &max| {
            row.mapv_inplace(|x| {
                let scaled = x / max;
                if scaled.is_finite() && scaled >= 0.0 {
                    scaled
                } else {
                    0.0
                }
            })
        });

    Ok(normalised)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array, IxDyn};
    use std::error::Error;

    fn assert_close(actual: &InflammationTable, expected: &InflammationTable) {
        assert_eq!(actual.dim(), expected.dim());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-2, "{} != {}", actual, expected);
        }
    }

    #[test]
    fn test_daily_aggregates() -> Result<(), Box<dyn Error>> {
        let data = array![[1., 2., 3.], [4., 5., 6.]];
        assert_eq!(data.daily_mean()?, array![2.5, 3.5, 4.5]);
        assert_eq!(data.daily_max()?, array![4., 5., 6.]);
        assert_eq!(data.daily_min()?, array![1., 2., 3.]);
        Ok(())
    }

    #[test]
    fn test_daily_aggregates_on_views() -> Result<(), Box<dyn Error>> {
        let data = array![[0., 0.], [0., 0.], [2., 8.]];
        let view = data.slice(ndarray::s![1.., ..]);
        assert_eq!(view.daily_mean()?, array![1., 4.]);
        assert_eq!(view.daily_min()?, array![0., 0.]);
        Ok(())
    }

    #[test]
    fn test_daily_max_propagates_nan() -> Result<(), Box<dyn Error>> {
        let data = array![[1., f64::NAN], [4., 2.]];
        let maxima = data.daily_max()?;
        assert_eq!(maxima[0], 4.);
        assert!(maxima[1].is_nan());
        Ok(())
    }

    #[test]
    fn test_daily_aggregates_reject_empty_table() {
        let data = InflammationTable::zeros((0, 3));
        assert!(matches!(data.daily_mean(), Err(InflammationError::InvalidShape(_))));
        assert!(matches!(data.daily_max(), Err(InflammationError::InvalidShape(_))));
        assert!(matches!(data.daily_min(), Err(InflammationError::InvalidShape(_))));
    }

    #[test]
    fn test_patient_normalise() -> Result<(), Box<dyn Error>> {
        let data = array![[1., 2., 3.], [4., 5., 6.], [7., 8., 9.]];
        let expected = array![[0.33, 0.67, 1.], [0.67, 0.83, 1.], [0.78, 0.89, 1.]];
        assert_close(&patient_normalise(&data)?, &expected);
        Ok(())
    }

    #[test]
    fn test_patient_normalise_clamps_zero_and_nan_rows() -> Result<(), Box<dyn Error>> {
        let data = array![
            [0., 0., 0.],
            [f64::NAN, 1., 2.],
            [f64::NAN, f64::NAN, f64::NAN]
        ];
        let expected = array![[0., 0., 0.], [0., 0.5, 1.], [0., 0., 0.]];
        assert_eq!(patient_normalise(&data)?, expected);
        Ok(())
    }

    #[test]
    fn test_patient_normalise_values_in_unit_range() -> Result<(), Box<dyn Error>> {
        let data = array![[0.5, 12., 3.], [9., 0., 1.], [2., 2., 2.]];
        let normalised = patient_normalise(&data)?;
        assert!(normalised.iter().all(|&x| (0.0..=1.0).contains(&x)));
        for row in normalised.rows() {
            assert_eq!(row.iter().copied().fold(f64::NAN, f64::max), 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_patient_normalise_rejects_negative_values() {
        let data = array![[1., -2., 3.], [4., 5., 6.]];
        let before = data.clone();
        assert!(matches!(
            patient_normalise(&data),
            Err(InflammationError::InvalidValue)
        ));
        assert_eq!(data, before);
    }

    #[test]
    fn test_patient_normalise_rejects_wrong_rank() {
        let flat = array![1., 2., 3.];
        assert!(matches!(
            patient_normalise(&flat),
            Err(InflammationError::InvalidShape(_))
        ));

        let cube = Array::<f64, _>::zeros((2, 2, 2));
        assert!(matches!(
            patient_normalise(&cube),
            Err(InflammationError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_patient_normalise_checks_values_before_rank() {
        let mut cube = Array::<f64, _>::ones((2, 2, 2));
        cube[[1, 0, 1]] = -1.;
        assert!(matches!(
            patient_normalise(&cube),
            Err(InflammationError::InvalidValue)
        ));
    }

    #[test]
    fn test_patient_normalise_accepts_dynamic_rank() -> Result<(), Box<dyn Error>> {
        let data = Array::from_shape_vec(IxDyn(&[2, 2]), vec![1., 2., 4., 4.])?;
        assert_eq!(patient_normalise(&data)?, array![[0.5, 1.], [1., 1.]]);
        Ok(())
    }
}
