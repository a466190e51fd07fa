use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response encodings the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
    Xml,
    Conll,
    Conllu,
    Serialized,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
            OutputFormat::Xml => "xml",
            OutputFormat::Conll => "conll",
            OutputFormat::Conllu => "conllu",
            OutputFormat::Serialized => "serialized",
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            OutputFormat::Text | OutputFormat::Xml | OutputFormat::Conll | OutputFormat::Conllu
        )
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "xml" => Ok(OutputFormat::Xml),
            "conll" => Ok(OutputFormat::Conll),
            "conllu" => Ok(OutputFormat::Conllu),
            "serialized" => Ok(OutputFormat::Serialized),
            other => Err(crate::Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Request body encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Text,
    Serialized,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Text => "text",
            InputFormat::Serialized => "serialized",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            InputFormat::Text => "text/plain; charset=utf-8",
            InputFormat::Serialized => "application/x-protobuf",
        }
    }

    /// Unknown names fall back to plain text.
    pub fn from_name(name: &str) -> Self {
        match name {
            "serialized" => InputFormat::Serialized,
            _ => InputFormat::Text,
        }
    }
}
