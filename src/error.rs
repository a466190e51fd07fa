use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with {status}: {body}")]
    Server { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to start the CoreNLP server on port {port} (possibly something is already running there)")]
    PortInUse { port: u16 },

    #[error("Service permanently failed: {0}")]
    PermanentlyFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Properties cache does not have {0}")]
    UnknownPropertiesKey(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Annotation missing from response: {0}")]
    MissingAnnotation(String),

    #[error("Malformed parse tree: {0}")]
    TreeParse(String),

    #[error("Malformed properties at line {line}: {message}")]
    PropertiesParse { line: usize, message: String },
}

impl Error {
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }

    pub fn permanently_failed<T: fmt::Display>(msg: T) -> Self {
        Self::PermanentlyFailed(msg.to_string())
    }

    pub fn tree_parse<T: fmt::Display>(msg: T) -> Self {
        Self::TreeParse(msg.to_string())
    }

    pub fn missing_annotation<T: fmt::Display>(name: T) -> Self {
        Self::MissingAnnotation(name.to_string())
    }

    pub fn properties_parse<T: fmt::Display>(line: usize, msg: T) -> Self {
        Self::PropertiesParse {
            line,
            message: msg.to_string(),
        }
    }
}

impl From<java_properties::PropertiesError> for Error {
    fn from(e: java_properties::PropertiesError) -> Self {
        Self::properties_parse(e.line_number().unwrap_or(0), e)
    }
}
