use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// SNR of the one-bit criterion
pub const ONE_BIT_SNR: f64 = 0.5;
/// SNR of the half-bit criterion
pub const HALF_BIT_SNR: f64 = 0.2071;

/// Resolution criterion
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
pub enum Criterion {
    /// Constant threshold
    #[default]
    Fixed,
    /// Information content of 1 bit per ring
    OneBit,
    /// Information content of 1/2 bit per ring
    HalfBit,
    /// Signal-to-noise ratio per ring
    Snr,
}

/// Threshold of a ring with `points` Fourier samples for a given `snr`
///
/// `T = (snr + (2√snr + 1)/√n) / (snr + 1 + 2√snr/√n)`
/// A ring without samples gets a threshold of 1.
pub fn snr_threshold(points: usize, snr: f64) -> f64 {
    if points == 0 {
        return 1f64;
    }
    let sqrt_n = (points as f64).sqrt();
    let sqrt_snr = snr.sqrt();
    (snr + (2f64 * sqrt_snr + 1f64) / sqrt_n) / (snr + 1f64 + 2f64 * sqrt_snr / sqrt_n)
}

impl Criterion {
    /// Threshold curve for the given number of points per ring
    ///
    /// `threshold` is used by [Criterion::Fixed] and `snr` by [Criterion::Snr]
    pub fn threshold_curve(
        &self,
        points_per_bin: &[usize],
        threshold: f64,
        snr: f64,
    ) -> Vec<f64> {
        match self {
            Criterion::Fixed => vec![threshold; points_per_bin.len()],
            Criterion::OneBit => curve(points_per_bin, ONE_BIT_SNR),
            Criterion::HalfBit => curve(points_per_bin, HALF_BIT_SNR),
            Criterion::Snr => curve(points_per_bin, snr),
        }
    }
}
fn curve(points_per_bin: &[usize], snr: f64) -> Vec<f64> {
    points_per_bin
        .iter()
        .map(|&n| snr_threshold(n, snr))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn names() {
        let names: Vec<String> = Criterion::iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["fixed", "one-bit", "half-bit", "snr"]);
        assert_eq!("half-bit".parse::<Criterion>().unwrap(), Criterion::HalfBit);
        assert!("two-bit".parse::<Criterion>().is_err());
    }

    #[test]
    fn fixed_threshold() {
        let t = Criterion::Fixed.threshold_curve(&[1, 8, 12], 1. / 7., 0.5);
        assert_eq!(t, vec![1. / 7.; 3]);
    }

    #[test]
    fn bit_thresholds() {
        // van Heel & Schatz closed forms
        let n = 100usize;
        let s = (n as f64).sqrt();
        let one_bit = (0.5 + 2.4142 / s) / (1.5 + 1.4142 / s);
        let half_bit = (0.2071 + 1.9102 / s) / (1.2071 + 0.9102 / s);
        let t = Criterion::OneBit.threshold_curve(&[n], 0., 0.);
        assert!((t[0] - one_bit).abs() < 1e-4);
        let t = Criterion::HalfBit.threshold_curve(&[n], 0., 0.);
        assert!((t[0] - half_bit).abs() < 1e-4);
    }

    #[test]
    fn snr_threshold_decreases_with_points() {
        let t = Criterion::Snr.threshold_curve(&[0, 4, 16, 64, 1024], 0., 0.5);
        assert_eq!(t[0], 1.);
        assert!(t.windows(2).skip(1).all(|w| w[1] < w[0]));
        assert!((t[4] - 0.5 / 1.5).abs() < 0.05);
    }
}
