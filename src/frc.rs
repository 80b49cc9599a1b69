//! Image resolution measurement by Fourier Ring Correlation
//!
//! [FourierRingCorrelation] correlates the Fourier spectra of two images ring
//! by ring. [calculate_two_image_frc] and [calculate_single_image_frc] wrap it
//! with the preprocessing and the resolution analysis.

use rustfft::num_complex::Complex64;

use crate::{
    analysis::{AnalysisError, FourierCorrelationAnalysis, Resolution, ResolutionResult},
    correlation::{CorrelationCurve, CorrelationDataCollection},
    fft::fft2_centered,
    image::{Image, ImageError},
    iterators::FourierRingIterator,
    options::FrcOptions,
    processing::{
        apply_hamming_window, checkerboard_split, reverse_checkerboard_split, zero_pad_to_cube,
        zero_pad_to_matching_shape,
    },
    Result,
};

#[derive(Debug, thiserror::Error)]
pub enum FrcError {
    #[error("the image dimensions do not match: {0:?} and {1:?}")]
    Shape(Vec<usize>, Vec<usize>),
    #[error("the image spacings do not match: {0:?} and {1:?}")]
    Spacing(Vec<f64>, Vec<f64>),
    #[error("Fourier ring correlation requires 2D images, found {0}D")]
    NotTwoDimensional(usize),
    #[error("expected a square Fourier grid, found {0}x{1}")]
    NonSquareGrid(usize, usize),
    #[error("the ring width must be positive, found {0}")]
    InvalidBinWidth(f64),
    #[error("rings built for a {iterator}x{iterator} grid, the images are {grid}x{grid}")]
    IteratorMismatch { iterator: usize, grid: usize },
    #[error("failed to pad the images")]
    Image(#[from] ImageError),
}

/// Empirical model `a·exp(c·(x − b)) + d`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialModel {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}
impl ExponentialModel {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * (self.c * (x - self.b)).exp() + self.d
    }
}
/// Calibration of the single image resolution against the two images resolution
///
/// The resolution of a checkerboard split image and the pixel spacing are
/// divided by the model evaluated at the crossing frequency.
/// These values are calibration data, they must not be altered.
#[allow(clippy::excessive_precision)]
pub const SINGLE_IMAGE_CORRECTION: ExponentialModel = ExponentialModel {
    a: 0.95988146,
    b: 0.97979108,
    c: 13.90441896,
    d: 0.55146136,
};

/// 2D Fourier ring correlation of two images
pub struct FourierRingCorrelation {
    iterator: FourierRingIterator,
    fft_image1: Vec<Complex64>,
    fft_image2: Vec<Complex64>,
    freq_nyq: usize,
    pixel_size: f64,
}
impl FourierRingCorrelation {
    /// Zero pads both images to a square and computes their centered spectra
    ///
    /// The images must have the same shape and spacing and the rings must be
    /// built for the padded square grid.
    pub fn new(
        image1: &Image,
        image2: &Image,
        iterator: FourierRingIterator,
    ) -> std::result::Result<Self, FrcError> {
        if image1.shape() != image2.shape() {
            return Err(FrcError::Shape(
                image1.shape().to_vec(),
                image2.shape().to_vec(),
            ));
        }
        if image1.spacing() != image2.spacing() {
            return Err(FrcError::Spacing(
                image1.spacing().to_vec(),
                image2.spacing().to_vec(),
            ));
        }
        if image1.ndim() != 2 {
            return Err(FrcError::NotTwoDimensional(image1.ndim()));
        }
        let pixel_size = image1.spacing()[0];

        let image1 = zero_pad_to_cube(image1)?;
        let image2 = zero_pad_to_cube(image2)?;
        let side = image1.shape()[0];
        if iterator.side() != side {
            return Err(FrcError::IteratorMismatch {
                iterator: iterator.side(),
                grid: side,
            });
        }

        Ok(Self {
            iterator,
            fft_image1: fft2_centered(image1.data(), side),
            fft_image2: fft2_centered(image2.data(), side),
            freq_nyq: side / 2,
            pixel_size,
        })
    }
    /// Pixel spacing along the first axis
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }
    /// Computes the correlation curve
    ///
    /// Rings without energy or without samples have a correlation of 0.
    pub fn execute(self) -> CorrelationCurve {
        let n = self.iterator.len();
        let mut c1 = vec![0f64; n];
        let mut c2 = vec![0f64; n];
        let mut c3 = vec![0f64; n];
        let mut points = vec![0usize; n];

        for (ind_ring, idx) in &self.iterator {
            for &k in ind_ring {
                let (s1, s2) = (self.fft_image1[k], self.fft_image2[k]);
                c1[idx] += (s1 * s2.conj()).re;
                c2[idx] += s1.norm_sqr();
                c3[idx] += s2.norm_sqr();
            }
            points[idx] = ind_ring.len();
        }

        let correlation = c1
            .iter()
            .zip(c2.iter().zip(&c3))
            .map(|(c1, (c2, c3))| {
                let frc = c1.abs() / (c2 * c3).sqrt();
                if frc.is_finite() {
                    frc
                } else {
                    0f64
                }
            })
            .collect();
        let frequency = self
            .iterator
            .radii()
            .iter()
            .map(|r| r / self.freq_nyq as f64)
            .collect();

        CorrelationCurve {
            frequency,
            correlation,
            points_per_bin: points,
        }
    }
}

/// Correlates two images of the same shape with rings of width `d_bin`
fn correlate(image1: &Image, image2: &Image, d_bin: f64) -> Result<CorrelationCurve> {
    let side = image1.shape().iter().copied().max().unwrap_or(0);
    let iterator = FourierRingIterator::new([side, side], d_bin)?;
    Ok(FourierRingCorrelation::new(image1, image2, iterator)?.execute())
}

fn analyze(
    data: &CorrelationDataCollection,
    spacing: f64,
    options: &FrcOptions,
) -> Result<ResolutionResult> {
    let results = FourierCorrelationAnalysis::new(data, spacing, options)?.execute()?;
    results
        .into_iter()
        .next()
        .map(|(_, result)| result)
        .ok_or_else(|| AnalysisError::Empty.into())
}

fn window(image: &Image, options: &FrcOptions) -> Result<Image> {
    Ok(if options.disable_hamming {
        image.clone()
    } else {
        apply_hamming_window(image)?
    })
}

/// Measures the resolution from two independent acquisitions of the same field of view
pub fn calculate_two_image_frc(
    image1: &Image,
    image2: &Image,
    options: &FrcOptions,
) -> Result<ResolutionResult> {
    options.validate()?;
    if image1.shape() != image2.shape() {
        return Err(FrcError::Shape(image1.shape().to_vec(), image2.shape().to_vec()).into());
    }
    if image1.ndim() != 2 {
        return Err(FrcError::NotTwoDimensional(image1.ndim()).into());
    }
    log::debug!("two images FRC: {:?} images", image1.shape());

    let image1 = window(image1, options)?;
    let image2 = window(image2, options)?;

    let mut frc_data = CorrelationDataCollection::new();
    frc_data.insert(0, correlate(&image1, &image2, options.d_bin)?);

    analyze(&frc_data, image1.spacing()[0], options)
}

/// Measures the resolution of a single image
///
/// The image is split in two with a checkerboard pattern and the resolution
/// of the two halves is corrected with [SINGLE_IMAGE_CORRECTION].
pub fn calculate_single_image_frc(image: &Image, options: &FrcOptions) -> Result<ResolutionResult> {
    options.validate()?;
    if image.ndim() != 2 {
        return Err(FrcError::NotTwoDimensional(image.ndim()).into());
    }
    log::debug!("single image FRC: {:?} image", image.shape());

    let image = window(image, options)?;

    let (image1, image2) = checkerboard_split(&image)?;
    let (image1, image2) = zero_pad_to_matching_shape(&image1, &image2)?;
    let mut frc_data = CorrelationDataCollection::new();
    frc_data.insert(0, correlate(&image1, &image2, options.d_bin)?);

    if options.average {
        let (image3, image4) = reverse_checkerboard_split(&image)?;
        let (image3, image4) = zero_pad_to_matching_shape(&image3, &image4)?;
        let mut reverse_data = CorrelationDataCollection::new();
        reverse_data.insert(0, correlate(&image3, &image4, options.d_bin)?);
        frc_data = frc_data.combine(&reverse_data)?;
    }

    let mut result = analyze(&frc_data, image1.spacing()[0], options)?;

    if let Resolution::Found { point, .. } = result.outcome {
        let correction = SINGLE_IMAGE_CORRECTION.evaluate(point.frequency);
        log::debug!(
            "single image correction at frequency {:.4}: {correction:.4}",
            point.frequency
        );
        result.correct(correction);
    }
    Ok(result)
}
