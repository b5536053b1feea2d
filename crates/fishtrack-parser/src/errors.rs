use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ParserAttempt {
    pub layout: &'static str,
    pub message: String,
}

impl ParserAttempt {
    pub fn new(layout: &'static str, message: impl Into<String>) -> Self {
        Self {
            layout,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParserAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.layout, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("no layout recognized this file; attempts: {attempts:?}")]
    UnknownFormat { attempts: Vec<ParserAttempt> },

    #[error("{layout} row {row_index} has bad timestamp '{value}'")]
    BadDateTime {
        layout: &'static str,
        row_index: usize,
        value: String,
    },

    #[error("station name(s) do not match the required pattern: {offenders:?}")]
    BadStationName { offenders: Vec<String> },

    #[error("station mapping file is malformed: {message}")]
    BadStationMapping { message: String },

    #[error("{layout} file did not contain any data rows")]
    EmptyData { layout: &'static str },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
