//! CoreNLP properties.
//!
//! The server is configured with Java `.properties` files and every request
//! carries a JSON object of string properties. [`Properties`] covers both.

use crate::Result;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use java_properties::{PropertiesIter, PropertiesWriter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Writes every entry of `other` over this set.
    pub fn update(&mut self, other: &Properties) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Parses Java properties syntax from an in-memory string.
    pub fn parse(input: &str) -> Result<Self> {
        Self::read_from(input.as_bytes(), UTF_8)
    }

    /// Reads an ISO-8859-1 `.properties` file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::read_from(BufReader::new(file), WINDOWS_1252)
    }

    fn read_from<R: Read>(reader: R, encoding: &'static Encoding) -> Result<Self> {
        let mut props = Properties::new();
        PropertiesIter::new_with_encoding(reader, encoding).read_into(|key, value| props.set(key, value))?;
        Ok(props)
    }

    /// Renders `key = value` lines; characters outside Latin-1 become `\uXXXX`.
    pub fn to_properties_string(&self) -> Result<String> {
        let bytes = self.encode()?;
        let (text, _, _) = WINDOWS_1252.decode(&bytes);
        Ok(text.into_owned())
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.encode()?)?;
        debug!("Wrote {} properties to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut writer = PropertiesWriter::new_with_encoding(&mut bytes, WINDOWS_1252);
        writer.set_kv_separator(" = ")?;
        for (key, value) in &self.entries {
            writer.write(key, value)?;
        }
        writer.finish()?;
        Ok(bytes)
    }

    /// Writes to a fresh `corenlp_server-<id>.props` file in the temp directory.
    pub fn write_temp(&self) -> Result<PathBuf> {
        let id = Uuid::new_v4().simple().to_string();
        let path = std::env::temp_dir().join(format!("corenlp_server-{}.props", &id[..16]));
        self.write_file(&path)?;
        Ok(path)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (key, value) in iter {
            props.set(key, value);
        }
        props
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
