use thiserror::Error;

pub mod dependency_set;
pub mod record;
pub mod version;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading dependency record: {0}")]
    IO(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported Go version `{0}`")]
    InvalidGoVersion(String),
}
