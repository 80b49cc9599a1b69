use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::AnalysisError;

/// Correlation curve fitting method
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CurveFit {
    /// The correlation curve as measured, without smoothing
    #[default]
    Raw,
    /// Least-squares polynomial
    Polynomial,
    /// Non-increasing least-squares fit (pool adjacent violators)
    Monotonic,
}
impl CurveFit {
    /// Returns the fitted curve at the sample frequencies
    pub fn fit(
        &self,
        frequency: &[f64],
        correlation: &[f64],
        degree: usize,
    ) -> Result<Vec<f64>, AnalysisError> {
        match self {
            CurveFit::Raw => Ok(correlation.to_vec()),
            CurveFit::Polynomial => polyfit(frequency, correlation, degree),
            CurveFit::Monotonic => Ok(non_increasing(correlation)),
        }
    }
}

fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, AnalysisError> {
    let n = x.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let degree = if n <= degree {
        log::warn!("{n} samples: polynomial degree lowered from {degree} to {}", n - 1);
        n - 1
    } else {
        degree
    };
    let vandermonde = DMatrix::from_fn(n, degree + 1, |i, j| x[i].powi(j as i32));
    let coefs = vandermonde
        .clone()
        .svd(true, true)
        .solve(&DVector::from_column_slice(y), 1e-12)
        .map_err(|e| AnalysisError::Fit(e.to_string()))?;
    Ok((vandermonde * coefs).iter().cloned().collect())
}

fn non_increasing(y: &[f64]) -> Vec<f64> {
    // (mean, count) of the pooled blocks
    let mut blocks: Vec<(f64, usize)> = Vec::with_capacity(y.len());
    for &value in y {
        blocks.push((value, 1));
        while let [.., (m1, w1), (m2, w2)] = blocks[..] {
            if m1 >= m2 {
                break;
            }
            let w = w1 + w2;
            blocks.truncate(blocks.len() - 2);
            blocks.push(((m1 * w1 as f64 + m2 * w2 as f64) / w as f64, w));
        }
    }
    blocks
        .into_iter()
        .flat_map(|(mean, count)| std::iter::repeat(mean).take(count))
        .collect()
}
