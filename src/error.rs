use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("an analysis is already in progress on this analyzer")]
    AnalysisInProgress,

    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PaletteError>;
