use std::io;

/// A grid cell that cannot be packed into a board nibble.
///
/// Valid cells hold 0 (empty) or a power of two between 2 and 32768.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid tile {value} at row {row}, column {col}: expected 0 or a power of two in 2..=32768")]
pub struct InvalidTileError {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

/// Failure to load or validate a search configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
