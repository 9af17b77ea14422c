use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("invalid colour bands: {0}")]
    InvalidColorBands(String),
    #[error("chunk workers are unavailable: {0}")]
    WorkersUnavailable(String),
}
