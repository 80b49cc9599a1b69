use std::{ops::Index, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CorrelationError {
    #[error("correlation curves of different lengths: {0} and {1}")]
    Mismatch(usize, usize),
    #[error("failed to write correlation curve")]
    Csv(#[from] csv::Error),
}
type Result<T> = std::result::Result<T, CorrelationError>;

/// Fourier correlation curve
///
/// One sample per frequency ring:
///  - the ring radius normalized by the Nyquist radius,
///  - the correlation in the ring,
///  - the number of Fourier samples in the ring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationCurve {
    pub frequency: Vec<f64>,
    pub correlation: Vec<f64>,
    pub points_per_bin: Vec<usize>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Record {
    frequency: f64,
    correlation: f64,
    points: usize,
}

impl CorrelationCurve {
    pub fn new(
        frequency: Vec<f64>,
        correlation: Vec<f64>,
        points_per_bin: Vec<usize>,
    ) -> Result<Self> {
        if frequency.len() != correlation.len() {
            return Err(CorrelationError::Mismatch(
                frequency.len(),
                correlation.len(),
            ));
        }
        if frequency.len() != points_per_bin.len() {
            return Err(CorrelationError::Mismatch(
                frequency.len(),
                points_per_bin.len(),
            ));
        }
        Ok(Self {
            frequency,
            correlation,
            points_per_bin,
        })
    }
    /// Number of frequency rings
    pub fn len(&self) -> usize {
        self.frequency.len()
    }
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }
    /// Averages the correlation of two curves: `0.5 * self + 0.5 * other`
    ///
    /// The frequencies and the number of points per ring are taken from `self`.
    /// This is a plain mean, the rings are not weighted by their number of points.
    pub fn blend(&self, other: &CorrelationCurve) -> Result<CorrelationCurve> {
        if self.len() != other.len() {
            return Err(CorrelationError::Mismatch(self.len(), other.len()));
        }
        Ok(Self {
            frequency: self.frequency.clone(),
            correlation: self
                .correlation
                .iter()
                .zip(&other.correlation)
                .map(|(a, b)| 0.5 * a + 0.5 * b)
                .collect(),
            points_per_bin: self.points_per_bin.clone(),
        })
    }
    /// Writes the curve into a CSV file with the columns `frequency,correlation,points`
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for ((&frequency, &correlation), &points) in self
            .frequency
            .iter()
            .zip(&self.correlation)
            .zip(&self.points_per_bin)
        {
            wtr.serialize(Record {
                frequency,
                correlation,
                points,
            })?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Correlation curves indexed by dataset keys
///
/// Keys are small integers handed out in sequence, so the curves are stored
/// in a vector indexed by key.
#[derive(Debug, Clone, Default)]
pub struct CorrelationDataCollection {
    curves: Vec<Option<CorrelationCurve>>,
}
impl CorrelationDataCollection {
    pub fn new() -> Self {
        Default::default()
    }
    /// Inserts a curve at `key`, returning the curve previously stored there
    pub fn insert(&mut self, key: usize, curve: CorrelationCurve) -> Option<CorrelationCurve> {
        if key >= self.curves.len() {
            self.curves.resize(key + 1, None);
        }
        self.curves[key].replace(curve)
    }
    /// Appends a curve at the next key and returns that key
    pub fn push(&mut self, curve: CorrelationCurve) -> usize {
        let key = self.curves.len();
        self.curves.push(Some(curve));
        key
    }
    pub fn get(&self, key: usize) -> Option<&CorrelationCurve> {
        self.curves.get(key).and_then(|c| c.as_ref())
    }
    pub fn get_mut(&mut self, key: usize) -> Option<&mut CorrelationCurve> {
        self.curves.get_mut(key).and_then(|c| c.as_mut())
    }
    /// Number of curves
    pub fn len(&self) -> usize {
        self.curves.iter().flatten().count()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Iterator over the `(key, curve)` pairs in increasing key order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CorrelationCurve)> + '_ {
        self.curves
            .iter()
            .enumerate()
            .filter_map(|(key, curve)| curve.as_ref().map(|c| (key, c)))
    }
    /// Blends every curve with the curve under the same key in `other`
    ///
    /// Curves without a counterpart in `other` are kept as they are.
    pub fn combine(&self, other: &CorrelationDataCollection) -> Result<Self> {
        let curves = self
            .curves
            .iter()
            .enumerate()
            .map(|(key, curve)| match (curve, other.get(key)) {
                (Some(a), Some(b)) => a.blend(b).map(Some),
                (curve, _) => Ok(curve.clone()),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { curves })
    }
}
impl Index<usize> for CorrelationDataCollection {
    type Output = CorrelationCurve;

    fn index(&self, key: usize) -> &Self::Output {
        self.get(key)
            .unwrap_or_else(|| panic!("no correlation curve with key {key}"))
    }
}
impl FromIterator<CorrelationCurve> for CorrelationDataCollection {
    fn from_iter<T: IntoIterator<Item = CorrelationCurve>>(iter: T) -> Self {
        Self {
            curves: iter.into_iter().map(Some).collect(),
        }
    }
}
