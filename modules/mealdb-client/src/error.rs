use thiserror::Error;

pub type Result<T> = std::result::Result<T, MealDbError>;

#[derive(Debug, Error)]
pub enum MealDbError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for MealDbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MealDbError::Parse(err.to_string())
        } else {
            MealDbError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MealDbError {
    fn from(err: serde_json::Error) -> Self {
        MealDbError::Parse(err.to_string())
    }
}
