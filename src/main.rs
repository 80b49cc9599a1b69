use std::path::{Path, PathBuf};

use frc_resolution::{
    calculate_single_image_frc, calculate_two_image_frc, Criterion, CurveFit, FrcOptions, Image,
    Resolution,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "frc",
    about = "Image resolution measurement by Fourier Ring Correlation"
)]
struct Opt {
    /// Image files (.npy or .npz), one for a single image FRC, two for a two images FRC
    #[structopt(parse(from_os_str), required = true, max_values = 2)]
    images: Vec<PathBuf>,
    /// Pixel spacing
    #[structopt(long, default_value = "1")]
    spacing: f64,
    /// Array name in .npz archives
    #[structopt(long, default_value = "image")]
    key: String,
    /// Ring width [pixel]
    #[structopt(long)]
    d_bin: Option<f64>,
    /// Resolution criterion: fixed, one-bit, half-bit or snr
    #[structopt(short, long)]
    criterion: Option<Criterion>,
    /// Threshold of the fixed criterion
    #[structopt(short, long)]
    threshold: Option<f64>,
    /// SNR of the snr criterion
    #[structopt(long)]
    snr: Option<f64>,
    /// Correlation curve fit: raw, polynomial or monotonic
    #[structopt(long)]
    curve_fit: Option<CurveFit>,
    /// Degree of the polynomial fit
    #[structopt(long)]
    degree: Option<usize>,
    /// Anisotropy correction factor
    #[structopt(short, long)]
    z_correction: Option<f64>,
    /// Skip the Hamming window
    #[structopt(long)]
    disable_hamming: bool,
    /// Single image FRC without averaging of the complementary splits
    #[structopt(long)]
    no_average: bool,
    /// Save the correlation curve to a CSV file
    #[structopt(long, parse(from_os_str))]
    curve: Option<PathBuf>,
}

fn load(path: &Path, key: &str, spacing: f64) -> frc_resolution::Result<Image> {
    Ok(match path.extension().and_then(|e| e.to_str()) {
        Some("npz") => Image::from_npz(path, key, [spacing; 2])?,
        _ => Image::from_npy(path, [spacing; 2])?,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut options = FrcOptions::default().from_env()?;
    if let Some(arg) = opt.d_bin {
        options = options.d_bin(arg);
    }
    if let Some(arg) = opt.criterion {
        options = options.criterion(arg);
    }
    if let Some(arg) = opt.threshold {
        options = options.threshold(arg);
    }
    if let Some(arg) = opt.snr {
        options = options.snr(arg);
    }
    if let Some(arg) = opt.curve_fit {
        options = options.curve_fit(arg);
    }
    if let Some(arg) = opt.degree {
        options = options.curve_fit_degree(arg);
    }
    if let Some(arg) = opt.z_correction {
        options = options.z_correction(arg);
    }
    if opt.disable_hamming {
        options = options.disable_hamming(true);
    }
    if opt.no_average {
        options = options.average(false);
    }
    log::info!("{:?}", options);

    let images = opt
        .images
        .iter()
        .map(|path| load(path, &opt.key, opt.spacing))
        .collect::<frc_resolution::Result<Vec<Image>>>()?;
    let result = match images.as_slice() {
        [image] => calculate_single_image_frc(image, &options)?,
        [image1, image2] => calculate_two_image_frc(image1, image2, &options)?,
        _ => anyhow::bail!("expected 1 or 2 images, found {}", images.len()),
    };

    if let Some(path) = opt.curve {
        result.curve.to_csv(&path)?;
        log::info!("correlation curve saved to {:?}", path);
    }

    match result.outcome {
        Resolution::Found {
            point,
            resolution,
            spacing,
        } => {
            println!(
                "{} criterion: frequency {:.4}, correlation {:.4}",
                result.criterion, point.frequency, point.correlation
            );
            println!("spacing: {:.6}", spacing);
            println!("resolution: {:.6}", resolution);
        }
        Resolution::NotFound => println!("resolution not found"),
    }

    Ok(())
}
