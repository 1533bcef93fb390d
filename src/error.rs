#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Data directory not found")]
    NoDataDir,

    #[error("No catalog API key configured (set TMDB_API_KEY or catalog.api_key)")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog returned HTTP {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Malformed catalog response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Search query is empty")]
    EmptyInput,

    #[error("URL opener not found: {0}")]
    OpenerNotFound(String),

    #[error("Failed to launch URL opener: {0}")]
    OpenerLaunch(String),
}

pub type Result<T> = std::result::Result<T, Error>;
