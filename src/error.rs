use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Series length mismatch: '{series}' has {found} values, expected {expected}")]
    Validation {
        series: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Failed to load series: {0}")]
    Load(String),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChartError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ChartError::Validation { .. })
    }

    pub fn is_render(&self) -> bool {
        matches!(self, ChartError::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
