//! Batch resolution measurements
//!
//! Single image FRC of every `.npy` file matching a glob pattern, the results
//! are written to a CSV file.

use std::path::PathBuf;

use frc_resolution::{calculate_single_image_frc, FrcOptions, Image, Resolution};
use glob::glob;
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use serde::Serialize;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "frc-batch", about = "Batch single image FRC measurements")]
struct Opt {
    /// Glob pattern of the .npy image files
    pattern: String,
    /// Pixel spacing
    #[structopt(long, default_value = "1")]
    spacing: f64,
    /// Output CSV file
    #[structopt(short, long, default_value = "frc.csv", parse(from_os_str))]
    output: PathBuf,
}

#[derive(Serialize)]
struct Record {
    file: String,
    frequency: Option<f64>,
    correlation: Option<f64>,
    resolution: Option<f64>,
    found: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let options = FrcOptions::default().from_env()?;
    options.validate()?;

    let files: Vec<PathBuf> = glob(&opt.pattern)?.collect::<Result<_, _>>()?;
    log::info!("{} files matching {:?}", files.len(), opt.pattern);

    let pb = ProgressBar::new(files.len() as u64);
    let records = files
        .par_iter()
        .progress_with(pb)
        .map(|file| -> frc_resolution::Result<Record> {
            let image = Image::from_npy(file, [opt.spacing; 2])?;
            let result = calculate_single_image_frc(&image, &options)?;
            let file = file.display().to_string();
            Ok(match result.outcome {
                Resolution::Found {
                    point, resolution, ..
                } => Record {
                    file,
                    frequency: Some(point.frequency),
                    correlation: Some(point.correlation),
                    resolution: Some(resolution),
                    found: true,
                },
                Resolution::NotFound => Record {
                    file,
                    frequency: None,
                    correlation: None,
                    resolution: None,
                    found: false,
                },
            })
        })
        .collect::<frc_resolution::Result<Vec<Record>>>()?;

    let mut wtr = csv::Writer::from_path(&opt.output)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    log::info!("results saved to {:?}", opt.output);

    Ok(())
}
