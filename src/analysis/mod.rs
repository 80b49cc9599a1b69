//! Resolution analysis of Fourier correlation curves
//!
//! The correlation curve is first fitted ([CurveFit]), then compared to the
//! threshold curve of a resolution [Criterion].
//! The resolution is given by the first frequency where the fitted curve falls
//! below the threshold, that frequency is found by linear interpolation
//! between the samples on both sides of the crossing.

use serde::Serialize;

use crate::{
    correlation::{CorrelationCurve, CorrelationDataCollection},
    options::{FrcOptions, OptionsError},
};

mod criterion;
mod fit;
pub use criterion::{snr_threshold, Criterion, HALF_BIT_SNR, ONE_BIT_SNR};
pub use fit::CurveFit;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("curve fitting failed: {0}")]
    Fit(String),
    #[error("pixel spacing must be positive, found {0}")]
    Spacing(f64),
    #[error("no correlation curve to analyze")]
    Empty,
    #[error("invalid analysis options")]
    Options(#[from] OptionsError),
}
type Result<T> = std::result::Result<T, AnalysisError>;

/// Point where the correlation curve crosses the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolutionPoint {
    /// normalized frequency (Nyquist = 1)
    pub frequency: f64,
    pub correlation: f64,
}

/// Outcome of the resolution analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found {
        point: ResolutionPoint,
        /// resolution in the units of the pixel spacing
        resolution: f64,
        /// effective pixel spacing
        spacing: f64,
    },
    /// The correlation curve never falls below the threshold
    NotFound,
}

/// Resolution analysis result of one correlation curve
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// the analyzed correlation curve
    pub curve: CorrelationCurve,
    /// the fitted curve, restricted to the rings with Fourier samples
    pub fit: CorrelationCurve,
    /// the threshold at the frequencies of the fitted curve
    pub threshold: Vec<f64>,
    pub criterion: Criterion,
    pub outcome: Resolution,
}
impl ResolutionResult {
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, Resolution::Found { .. })
    }
    pub fn resolution(&self) -> Option<f64> {
        match self.outcome {
            Resolution::Found { resolution, .. } => Some(resolution),
            Resolution::NotFound => None,
        }
    }
    pub fn resolution_point(&self) -> Option<ResolutionPoint> {
        match self.outcome {
            Resolution::Found { point, .. } => Some(point),
            Resolution::NotFound => None,
        }
    }
    /// Divides the effective spacing and the resolution by `factor`
    pub fn correct(&mut self, factor: f64) {
        if let Resolution::Found {
            resolution,
            spacing,
            ..
        } = &mut self.outcome
        {
            *resolution /= factor;
            *spacing /= factor;
        }
    }
}

/// Finds the first crossing of `correlation` below `threshold`
///
/// The crossing is located between the last sample at or above the threshold
/// and the next sample below it.
pub fn find_crossing(
    frequency: &[f64],
    correlation: &[f64],
    threshold: &[f64],
) -> Option<ResolutionPoint> {
    let diff: Vec<f64> = correlation
        .iter()
        .zip(threshold)
        .map(|(c, t)| c - t)
        .collect();
    (1..diff.len().min(frequency.len())).find_map(|i| {
        let (d0, d1) = (diff[i - 1], diff[i]);
        if !(d0 >= 0f64 && d1 < 0f64) {
            return None;
        }
        let s = d0 / (d0 - d1);
        let frequency = frequency[i - 1] + s * (frequency[i] - frequency[i - 1]);
        (frequency > 0f64).then(|| ResolutionPoint {
            frequency,
            correlation: correlation[i - 1] + s * (correlation[i] - correlation[i - 1]),
        })
    })
}

/// Resolution analysis of a collection of correlation curves
pub struct FourierCorrelationAnalysis<'a> {
    data: &'a CorrelationDataCollection,
    spacing: f64,
    options: &'a FrcOptions,
}
impl<'a> FourierCorrelationAnalysis<'a> {
    /// Creates the analysis for curves computed from images with the given pixel `spacing`
    pub fn new(
        data: &'a CorrelationDataCollection,
        spacing: f64,
        options: &'a FrcOptions,
    ) -> Result<Self> {
        if !(spacing > 0f64 && spacing.is_finite()) {
            return Err(AnalysisError::Spacing(spacing));
        }
        options.validate()?;
        Ok(Self {
            data,
            spacing,
            options,
        })
    }
    /// Analyzes every curve of the collection, in key order
    pub fn execute(&self) -> Result<Vec<(usize, ResolutionResult)>> {
        self.data
            .iter()
            .map(|(key, curve)| self.analyze(curve).map(|result| (key, result)))
            .collect()
    }
    /// Analyzes a single correlation curve
    pub fn analyze(&self, curve: &CorrelationCurve) -> Result<ResolutionResult> {
        let FrcOptions {
            criterion,
            threshold,
            snr,
            curve_fit,
            curve_fit_degree,
            z_correction,
            ..
        } = *self.options;

        // rings without samples carry no information
        let rings: Vec<usize> = (0..curve.len())
            .filter(|&i| curve.points_per_bin[i] > 0)
            .collect();
        let frequency: Vec<f64> = rings.iter().map(|&i| curve.frequency[i]).collect();
        let correlation: Vec<f64> = rings.iter().map(|&i| curve.correlation[i]).collect();
        let points: Vec<usize> = rings.iter().map(|&i| curve.points_per_bin[i]).collect();

        let fitted = curve_fit.fit(&frequency, &correlation, curve_fit_degree)?;
        let threshold = criterion.threshold_curve(&points, threshold, snr);

        let outcome = match find_crossing(&frequency, &fitted, &threshold) {
            Some(point) => {
                let spacing = z_correction * self.spacing;
                let resolution = spacing / point.frequency;
                log::info!(
                    "{criterion} criterion crossed at frequency {:.4} (correlation {:.4}): resolution {:.4}",
                    point.frequency,
                    point.correlation,
                    resolution
                );
                Resolution::Found {
                    point,
                    resolution,
                    spacing,
                }
            }
            None => {
                log::warn!("correlation never falls below the {criterion} criterion");
                Resolution::NotFound
            }
        };
        Ok(ResolutionResult {
            curve: curve.clone(),
            fit: CorrelationCurve {
                frequency,
                correlation: fitted,
                points_per_bin: points,
            },
            threshold,
            criterion,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(correlation: Vec<f64>) -> CorrelationCurve {
        let n = correlation.len();
        CorrelationCurve::new(
            (0..n).map(|i| i as f64 / n as f64).collect(),
            correlation,
            (0..n).map(|i| 1 + 8 * i).collect(),
        )
        .unwrap()
    }

    #[test]
    fn crossing_is_interpolated() {
        let point =
            find_crossing(&[0., 0.25, 0.5, 0.75], &[1., 0.75, 0.25, 0.], &[0.5; 4]).unwrap();
        assert!((point.frequency - 0.375).abs() < 1e-12);
        assert!((point.correlation - 0.5).abs() < 1e-12);
    }

    #[test]
    fn first_crossing_wins() {
        let point = find_crossing(
            &[0., 0.25, 0.5, 0.75, 1.],
            &[1., 0.25, 0.75, 0.25, 0.],
            &[0.5; 5],
        )
        .unwrap();
        assert!((point.frequency - 0.25 * 2. / 3.).abs() < 1e-12);
    }

    #[test]
    fn no_crossing() {
        assert!(find_crossing(&[0., 0.5, 1.], &[1., 1., 1.], &[0.5; 3]).is_none());
        // a curve starting below the threshold never crosses it
        assert!(find_crossing(&[0., 0.5, 1.], &[0., 0., 0.], &[0.5; 3]).is_none());
        assert!(find_crossing(&[], &[], &[]).is_none());
    }

    #[test]
    fn resolution_from_crossing() {
        let data: CorrelationDataCollection =
            vec![curve(vec![1., 0.75, 0.25, 0.])].into_iter().collect();
        let options = FrcOptions::default().threshold(0.5).z_correction(2.);
        let analysis = FourierCorrelationAnalysis::new(&data, 0.1, &options).unwrap();
        let results = analysis.execute().unwrap();
        assert_eq!(results.len(), 1);
        let (key, result) = &results[0];
        assert_eq!(*key, 0);
        match result.outcome {
            Resolution::Found {
                point,
                resolution,
                spacing,
            } => {
                assert!((point.frequency - 0.375).abs() < 1e-12);
                assert!((spacing - 0.2).abs() < 1e-12);
                assert!((resolution - 0.2 / 0.375).abs() < 1e-12);
            }
            Resolution::NotFound => panic!("expected a crossing"),
        }
        assert_eq!(result.threshold, vec![0.5; 4]);
    }

    #[test]
    fn perfect_correlation_has_no_resolution() {
        let data: CorrelationDataCollection = vec![curve(vec![1.; 16])].into_iter().collect();
        let options = FrcOptions::default();
        let results = FourierCorrelationAnalysis::new(&data, 0.05, &options)
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(results[0].1.outcome, Resolution::NotFound);
        assert_eq!(results[0].1.resolution(), None);
    }

    #[test]
    fn empty_rings_are_skipped() {
        let c = CorrelationCurve::new(
            vec![0., 0.125, 0.25, 0.375],
            vec![1., 0., 0.75, 0.25],
            vec![1, 0, 12, 0],
        )
        .unwrap();
        let data: CorrelationDataCollection = vec![c].into_iter().collect();
        let options = FrcOptions::default().threshold(0.5);
        let results = FourierCorrelationAnalysis::new(&data, 1., &options)
            .unwrap()
            .execute()
            .unwrap();
        let result = &results[0].1;
        assert_eq!(result.fit.frequency, vec![0., 0.25]);
        assert!(!result.is_found());
    }

    #[test]
    fn correction_divides_resolution_and_spacing() {
        let data: CorrelationDataCollection =
            vec![curve(vec![1., 0.75, 0.25, 0.])].into_iter().collect();
        let options = FrcOptions::default().threshold(0.5);
        let mut result = FourierCorrelationAnalysis::new(&data, 1., &options)
            .unwrap()
            .analyze(&data[0])
            .unwrap();
        let before = result.resolution().unwrap();
        result.correct(2.);
        assert!((result.resolution().unwrap() - before / 2.).abs() < 1e-12);
        match result.outcome {
            Resolution::Found { spacing, .. } => assert!((spacing - 0.5).abs() < 1e-12),
            Resolution::NotFound => panic!("expected a crossing"),
        }
    }

    #[test]
    fn invalid_spacing() {
        let data = CorrelationDataCollection::new();
        let options = FrcOptions::default();
        assert!(matches!(
            FourierCorrelationAnalysis::new(&data, 0., &options),
            Err(AnalysisError::Spacing(_))
        ));
    }
}
