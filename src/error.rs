use crate::{
    analysis::AnalysisError, correlation::CorrelationError, frc::FrcError, image::ImageError,
    options::OptionsError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `image` module")]
    Image(#[from] ImageError),
    #[error("Error in the `frc` module")]
    Frc(#[from] FrcError),
    #[error("Error in the `correlation` module")]
    Correlation(#[from] CorrelationError),
    #[error("Error in the `analysis` module")]
    Analysis(#[from] AnalysisError),
    #[error("Error in the `options` module")]
    Options(#[from] OptionsError),
}

pub type Result<T> = std::result::Result<T, Error>;
