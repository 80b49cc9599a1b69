/*!
# FRC resolution

Spatial resolution of 2D microscopy images by Fourier Ring Correlation (FRC).

The Fourier transforms of two images of the same field of view are correlated
in concentric rings of the frequency plane.
The resolution is the inverse of the frequency where the correlation falls below
a resolution criterion.

## Key Components

- [`FourierRingIterator`] - partition of the Fourier plane into rings
- [`FourierRingCorrelation`] - the correlation curve of two images
- [`CorrelationDataCollection`] - correlation curves indexed by dataset
- [`FourierCorrelationAnalysis`] - resolution from the correlation curves
- [`calculate_two_image_frc`] and [`calculate_single_image_frc`] - complete measurements

## Usage

```rust,no_run
use frc_resolution::{calculate_single_image_frc, FrcOptions, Image};

let image = Image::from_npy("image.npy", [0.05, 0.05])?;
let options = FrcOptions::default().d_bin(1.0);
let result = calculate_single_image_frc(&image, &options)?;
match result.resolution() {
    Some(resolution) => println!("resolution: {resolution:.3}"),
    None => println!("resolution not found"),
}
# Ok::<(), frc_resolution::Error>(())
```
*/

pub mod analysis;
pub mod correlation;
pub mod error;
mod fft;
pub mod frc;
pub mod image;
pub mod iterators;
pub mod options;
pub mod processing;

pub use analysis::{
    Criterion, CurveFit, FourierCorrelationAnalysis, Resolution, ResolutionPoint,
    ResolutionResult,
};
pub use correlation::{CorrelationCurve, CorrelationDataCollection};
pub use error::{Error, Result};
pub use frc::{
    calculate_single_image_frc, calculate_two_image_frc, ExponentialModel,
    FourierRingCorrelation, SINGLE_IMAGE_CORRECTION,
};
pub use image::Image;
pub use iterators::FourierRingIterator;
pub use options::FrcOptions;
