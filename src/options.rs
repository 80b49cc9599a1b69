use std::{
    env::{self, VarError},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::analysis::{Criterion, CurveFit};

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("{0} must be positive, found {1}")]
    NotPositive(&'static str, f64),
    #[error("the fixed threshold must be in ]0,1[, found {0}")]
    Threshold(f64),
    #[error("failed to read env var {1:?}")]
    Env(#[source] VarError, String),
    #[error("invalid value {1:?} for env var {0:?}")]
    Parse(String, String),
}
type Result<T> = std::result::Result<T, OptionsError>;

/// Fourier ring correlation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrcOptions {
    /// skip the Hamming window
    pub disable_hamming: bool,
    /// ring width [pixel]
    pub d_bin: f64,
    /// resolution criterion
    pub criterion: Criterion,
    /// threshold of the fixed criterion
    pub threshold: f64,
    /// SNR of the SNR criterion
    pub snr: f64,
    /// correlation curve fitting method
    pub curve_fit: CurveFit,
    /// degree of the polynomial fit, lowered to the number of rings minus one on small images
    pub curve_fit_degree: usize,
    /// anisotropy correction factor
    pub z_correction: f64,
    /// average the 2 complementary checkerboard splits (single image only)
    pub average: bool,
}
impl Default for FrcOptions {
    fn default() -> Self {
        Self {
            disable_hamming: false,
            d_bin: 1f64,
            criterion: Criterion::Fixed,
            threshold: 1f64 / 7f64,
            snr: 0.5,
            curve_fit: CurveFit::Raw,
            curve_fit_degree: 3,
            z_correction: 1f64,
            average: true,
        }
    }
}
impl FrcOptions {
    pub fn disable_hamming(self, disable_hamming: bool) -> Self {
        Self {
            disable_hamming,
            ..self
        }
    }
    pub fn d_bin(self, d_bin: f64) -> Self {
        Self { d_bin, ..self }
    }
    pub fn criterion(self, criterion: Criterion) -> Self {
        Self { criterion, ..self }
    }
    /// Sets the threshold of the fixed criterion
    pub fn threshold(self, threshold: f64) -> Self {
        Self { threshold, ..self }
    }
    pub fn snr(self, snr: f64) -> Self {
        Self { snr, ..self }
    }
    pub fn curve_fit(self, curve_fit: CurveFit) -> Self {
        Self { curve_fit, ..self }
    }
    pub fn curve_fit_degree(self, curve_fit_degree: usize) -> Self {
        Self {
            curve_fit_degree,
            ..self
        }
    }
    pub fn z_correction(self, z_correction: f64) -> Self {
        Self {
            z_correction,
            ..self
        }
    }
    pub fn average(self, average: bool) -> Self {
        Self { average, ..self }
    }
    /// Overrides the options with the environment variables that are set
    ///
    /// `FRC_D_BIN`, `FRC_CRITERION`, `FRC_THRESHOLD`, `FRC_SNR`, `FRC_CURVE_FIT`,
    /// `FRC_Z_CORRECTION` and `FRC_DISABLE_HAMMING`
    pub fn from_env(self) -> Result<Self> {
        let mut this = self;
        if let Some(value) = env_var("FRC_D_BIN")? {
            this.d_bin = value;
        }
        if let Some(value) = env_var("FRC_CRITERION")? {
            this.criterion = value;
        }
        if let Some(value) = env_var("FRC_THRESHOLD")? {
            this.threshold = value;
        }
        if let Some(value) = env_var("FRC_SNR")? {
            this.snr = value;
        }
        if let Some(value) = env_var("FRC_CURVE_FIT")? {
            this.curve_fit = value;
        }
        if let Some(value) = env_var("FRC_Z_CORRECTION")? {
            this.z_correction = value;
        }
        if let Some(value) = env_var("FRC_DISABLE_HAMMING")? {
            this.disable_hamming = value;
        }
        Ok(this)
    }
    /// Checks the options values
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("d_bin", self.d_bin),
            ("z_correction", self.z_correction),
            ("snr", self.snr),
        ] {
            if !(value > 0f64 && value.is_finite()) {
                return Err(OptionsError::NotPositive(name, value));
            }
        }
        if !(self.threshold > 0f64 && self.threshold < 1f64) {
            return Err(OptionsError::Threshold(self.threshold));
        }
        Ok(())
    }
}

fn env_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| OptionsError::Parse(name.to_string(), value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(OptionsError::Env(e, name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = FrcOptions::default();
        assert_eq!(options.d_bin, 1.);
        assert_eq!(options.threshold, 1. / 7.);
        assert_eq!(options.criterion, Criterion::Fixed);
        assert_eq!(options.curve_fit, CurveFit::Raw);
        assert!(!options.disable_hamming);
        assert!(options.average);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn builder() {
        let options = FrcOptions::default()
            .d_bin(2.)
            .criterion(Criterion::HalfBit)
            .curve_fit(CurveFit::Polynomial)
            .curve_fit_degree(5)
            .disable_hamming(true)
            .average(false);
        assert_eq!(options.d_bin, 2.);
        assert_eq!(options.criterion, Criterion::HalfBit);
        assert_eq!(options.curve_fit_degree, 5);
        assert!(options.disable_hamming);
        assert!(!options.average);
    }

    #[test]
    fn validation() {
        assert!(matches!(
            FrcOptions::default().d_bin(0.).validate(),
            Err(OptionsError::NotPositive("d_bin", _))
        ));
        assert!(matches!(
            FrcOptions::default().z_correction(-1.).validate(),
            Err(OptionsError::NotPositive("z_correction", _))
        ));
        assert!(matches!(
            FrcOptions::default().threshold(1.).validate(),
            Err(OptionsError::Threshold(_))
        ));
    }

    #[test]
    fn env_overrides() {
        env::set_var("FRC_D_BIN", "2.5");
        env::set_var("FRC_CRITERION", "one-bit");
        let options = FrcOptions::default().from_env().unwrap();
        assert_eq!(options.d_bin, 2.5);
        assert_eq!(options.criterion, Criterion::OneBit);
        env::set_var("FRC_CRITERION", "two-bit");
        assert!(matches!(
            FrcOptions::default().from_env(),
            Err(OptionsError::Parse(..))
        ));
        env::remove_var("FRC_D_BIN");
        env::remove_var("FRC_CRITERION");
    }
}
