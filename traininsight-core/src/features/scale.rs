//! Column standardization (zero mean, unit variance).

use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as a constant column.
const MIN_STD_DEV: f64 = 1e-12;

/// Per-column mean and population standard deviation learned from a matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

impl StandardScaler {
    /// Learn column statistics. `rows` must be non-empty and rectangular.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let dims = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut means = vec![0.0; dims];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut std_devs = vec![0.0; dims];
        for row in rows {
            for ((s, v), m) in std_devs.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut std_devs {
            *s = (*s / n).sqrt();
        }

        Self { means, std_devs }
    }

    /// Rescale rows; constant columns map to 0.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.std_devs))
                    .map(|(v, (m, s))| {
                        if *s < MIN_STD_DEV {
                            0.0
                        } else {
                            (v - m) / s
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn fit_transform(rows: &[Vec<f64>]) -> (Self, Vec<Vec<f64>>) {
        let scaler = Self::fit(rows);
        let scaled = scaler.transform(rows);
        (scaler, scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_variance() {
        let rows = vec![
            vec![95.0, 1.0, 0.2],
            vec![40.0, 12.0, 1.0],
            vec![70.0, 5.0, 0.5],
            vec![55.0, 20.0, 0.8],
        ];
        let (_, scaled) = StandardScaler::fit_transform(&rows);
        for col in 0..3 {
            let values: Vec<f64> = scaled.iter().map(|r| r[col]).collect();
            let mean = values.iter().sum::<f64>() / 4.0;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let rows = vec![vec![1.0, 3.0], vec![1.0, 5.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&rows);
        assert_eq!(scaler.std_devs[0], 0.0);
        assert_eq!(scaled[0][0], 0.0);
        assert_eq!(scaled[1][0], 0.0);
        assert_eq!(scaled[0][1], -1.0);
        assert_eq!(scaled[1][1], 1.0);
    }
}
