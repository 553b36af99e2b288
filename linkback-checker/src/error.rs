use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status code: {0}")]
    HttpStatus(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("browser unavailable")]
    RenderUnavailable,

    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, CheckError>;
