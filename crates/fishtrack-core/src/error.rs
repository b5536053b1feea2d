use thiserror::Error;

#[derive(Error, Debug)]
pub enum FishtrackError {
    #[error("database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Parser(#[from] fishtrack_parser::ParserError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("persistence failed for transmitter '{transmitter}': {message}")]
    PersistenceFailed { transmitter: String, message: String },

    #[error("'{mode}' is an unknown connection mode; use 'local' or 'remote'")]
    UnknownMode { mode: String },
}

pub type Result<T> = std::result::Result<T, FishtrackError>;
