//! Responses of the `/tokensregex`, `/semgrex` and `/tregex` endpoints.
//!
//! Each sentence is a JSON object whose numeric keys (`"0"`, `"1"`, ...)
//! hold the matches and whose `length` key holds the match count. Tregex
//! responses omit `length`.

use crate::protocol::ParseTree;
use crate::{Error, Result};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub sentences: Vec<SentenceMatches>,
}

impl MatchResponse {
    pub fn sentence(&self, index: usize) -> Option<&SentenceMatches> {
        self.sentences.get(index)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.sentences.iter().map(SentenceMatches::len).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentenceMatches {
    pub length: Option<usize>,
    pub matches: BTreeMap<usize, Match>,
}

impl SentenceMatches {
    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(&index)
    }

    /// Reported match count, or the number of entries when none is reported.
    pub fn len(&self) -> usize {
        self.length.unwrap_or(self.matches.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Match)> {
        self.matches.iter().map(|(i, m)| (*i, m))
    }
}

impl<'de> Deserialize<'de> for SentenceMatches {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut sentence = SentenceMatches::default();

        for (key, value) in raw {
            if key == "length" {
                sentence.length = Some(serde_json::from_value(value).map_err(de::Error::custom)?);
            } else if let Ok(index) = key.parse::<usize>() {
                let found: Match = serde_json::from_value(value).map_err(de::Error::custom)?;
                sentence.matches.insert(index, found);
            }
        }
        Ok(sentence)
    }
}

impl Serialize for SentenceMatches {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.matches.len() + 1))?;
        if let Some(length) = self.length {
            map.serialize_entry("length", &length)?;
        }
        for (index, found) in &self.matches {
            map.serialize_entry(&index.to_string(), found)?;
        }
        map.end()
    }
}

impl fmt::Display for SentenceMatches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} match(es)", self.len())?;
        for (index, found) in self.iter() {
            write!(f, "\n  {}: {}", index, found)?;
        }
        Ok(())
    }
}

/// A captured group or named node: `{"text": .., "begin": .., "end": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

/// One match. The field set differs per endpoint, so the raw object is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Match {
    fields: Map<String, Value>,
}

impl Match {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn text(&self) -> Option<&str> {
        self.fields.get("text").and_then(Value::as_str)
    }

    pub fn begin(&self) -> Option<usize> {
        self.number("begin")
    }

    pub fn end(&self) -> Option<usize> {
        self.number("end")
    }

    /// Numbered tokensregex group; group 0 is the match itself.
    pub fn group(&self, index: usize) -> Option<Capture> {
        self.capture(&index.to_string())
    }

    /// Semgrex named node, addressed as `subject` or `$subject`.
    pub fn named(&self, name: &str) -> Option<Capture> {
        let key = if name.starts_with('$') {
            name.to_string()
        } else {
            format!("${}", name)
        };
        self.capture(&key)
    }

    /// The bracketed subtree of a tregex match, trailing newline included.
    pub fn tree_match(&self) -> Option<&str> {
        self.fields.get("match").and_then(Value::as_str)
    }

    pub fn span_string(&self) -> Option<&str> {
        self.fields.get("spanString").and_then(Value::as_str)
    }

    pub fn parse_tree(&self) -> Result<ParseTree> {
        let tree = self
            .tree_match()
            .ok_or_else(|| Error::missing_annotation("match"))?;
        ParseTree::parse(tree)
    }

    /// Tregex named nodes as `(name, subtree)` pairs.
    pub fn named_nodes(&self) -> Vec<(String, String)> {
        self.fields
            .get("namedNodes")
            .and_then(Value::as_array)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter_map(Value::as_object)
                    .flat_map(|node| {
                        node.iter()
                            .filter_map(|(name, tree)| Some((name.clone(), tree.as_str()?.to_string())))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn number(&self, key: &str) -> Option<usize> {
        self.fields
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }

    fn capture(&self, key: &str) -> Option<Capture> {
        serde_json::from_value(self.fields.get(key)?.clone()).ok()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tree) = self.tree_match() {
            return f.write_str(tree.trim_end());
        }
        match self.text() {
            Some(text) => write!(f, "{:?}", text)?,
            None => f.write_str("<no text>")?,
        }
        if let (Some(begin), Some(end)) = (self.begin(), self.end()) {
            write!(f, " [{}..{})", begin, end)?;
        }
        Ok(())
    }
}
