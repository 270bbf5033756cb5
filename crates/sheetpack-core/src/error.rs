use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetPackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid atlas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("No viable position for a {width}x{height} image ({placed} already placed)")]
    NoViablePosition { width: u32, height: u32, placed: usize },
    #[error("Nothing to pack")]
    Empty,
    #[error("No placement recorded for `{0}`")]
    MissingPlacement(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, SheetPackError>;
