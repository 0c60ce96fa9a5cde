use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid project root: {0}")]
    InvalidRoot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
