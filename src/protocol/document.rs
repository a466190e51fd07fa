//! The annotated document returned for `outputFormat=json`.

use crate::protocol::ParseTree;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub corefs: BTreeMap<String, Vec<CorefMention>>,
}

impl Document {
    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    /// Coreference chains ordered by numeric chain id.
    pub fn coref_chains(&self) -> Vec<CorefChain> {
        let mut chains: Vec<CorefChain> = self
            .corefs
            .iter()
            .map(|(id, mentions)| CorefChain {
                id: id.parse().unwrap_or_default(),
                mentions: mentions.clone(),
            })
            .collect();
        chains.sort_by_key(|chain| chain.id);
        chains
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse: Option<String>,
    #[serde(rename = "basicDependencies", default)]
    pub basic_dependencies: Vec<Dependency>,
    #[serde(rename = "enhancedDependencies", default)]
    pub enhanced_dependencies: Vec<Dependency>,
    #[serde(rename = "enhancedPlusPlusDependencies", default)]
    pub enhanced_plus_plus_dependencies: Vec<Dependency>,
    #[serde(rename = "entitymentions", default)]
    pub entity_mentions: Vec<EntityMention>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn parse_tree(&self) -> Result<ParseTree> {
        let parse = self
            .parse
            .as_deref()
            .ok_or_else(|| Error::missing_annotation("parse"))?;
        ParseTree::parse(parse)
    }

    pub fn basic_dependency_graph(&self) -> DependencyGraph<'_> {
        DependencyGraph(&self.basic_dependencies)
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn mention(&self, index: usize) -> Option<&EntityMention> {
        self.entity_mentions.get(index)
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                out.push_str(token.before.as_deref().unwrap_or(" "));
            }
            out.push_str(token.original_text.as_deref().unwrap_or(&token.word));
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub word: String,
    #[serde(rename = "originalText", default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(rename = "characterOffsetBegin", default)]
    pub character_offset_begin: usize,
    #[serde(rename = "characterOffsetEnd", default)]
    pub character_offset_end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ner: Option<String>,
    #[serde(rename = "normalizedNER", default, skip_serializing_if = "Option::is_none")]
    pub normalized_ner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "index: {}", self.index)?;
        writeln!(f, "word: {:?}", self.word)?;
        let optional = [
            ("originalText", &self.original_text),
            ("lemma", &self.lemma),
            ("pos", &self.pos),
            ("ner", &self.ner),
            ("normalizedNER", &self.normalized_ner),
            ("speaker", &self.speaker),
            ("before", &self.before),
            ("after", &self.after),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                writeln!(f, "{}: {:?}", name, value)?;
            }
        }
        write!(
            f,
            "characterOffsets: {}..{}",
            self.character_offset_begin, self.character_offset_end
        )
    }
}

/// A governor → dependent edge; token indices are 1-based, 0 is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub dep: String,
    pub governor: usize,
    #[serde(rename = "governorGloss")]
    pub governor_gloss: String,
    pub dependent: usize,
    #[serde(rename = "dependentGloss")]
    pub dependent_gloss: String,
}

impl Dependency {
    pub fn is_root(&self) -> bool {
        self.governor == 0
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}-{}, {}-{})",
            self.dep, self.governor_gloss, self.governor, self.dependent_gloss, self.dependent
        )
    }
}

/// Displays a sentence's edges one per line.
#[derive(Debug, Clone, Copy)]
pub struct DependencyGraph<'a>(pub &'a [Dependency]);

impl DependencyGraph<'_> {
    pub fn root(&self) -> Option<&Dependency> {
        self.0.iter().find(|edge| edge.is_root())
    }

    pub fn dependents_of(&self, governor: usize) -> impl Iterator<Item = &Dependency> {
        self.0.iter().filter(move |edge| edge.governor == governor)
    }
}

impl fmt::Display for DependencyGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edge) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", edge)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    #[serde(rename = "docTokenBegin", default)]
    pub doc_token_begin: usize,
    #[serde(rename = "docTokenEnd", default)]
    pub doc_token_end: usize,
    #[serde(rename = "tokenBegin", default)]
    pub token_begin: usize,
    #[serde(rename = "tokenEnd", default)]
    pub token_end: usize,
    pub text: String,
    #[serde(rename = "characterOffsetBegin", default)]
    pub character_offset_begin: usize,
    #[serde(rename = "characterOffsetEnd", default)]
    pub character_offset_end: usize,
    pub ner: String,
    #[serde(rename = "normalizedNER", default, skip_serializing_if = "Option::is_none")]
    pub normalized_ner: Option<String>,
    #[serde(rename = "nerConfidences", default, skip_serializing_if = "Option::is_none")]
    pub ner_confidences: Option<BTreeMap<String, f64>>,
}

impl fmt::Display for EntityMention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} [{}] tokens {}..{} chars {}..{}",
            self.text,
            self.ner,
            self.token_begin,
            self.token_end,
            self.character_offset_begin,
            self.character_offset_end
        )?;
        if let Some(normalized) = &self.normalized_ner {
            write!(f, " normalized {:?}", normalized)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorefMention {
    pub id: u32,
    pub text: String,
    #[serde(rename = "type", default)]
    pub mention_type: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub animacy: String,
    #[serde(rename = "startIndex")]
    pub start_index: usize,
    #[serde(rename = "endIndex")]
    pub end_index: usize,
    #[serde(rename = "headIndex")]
    pub head_index: usize,
    #[serde(rename = "sentNum")]
    pub sent_num: usize,
    #[serde(default)]
    pub position: Vec<usize>,
    #[serde(rename = "isRepresentativeMention", default)]
    pub is_representative_mention: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorefChain {
    pub id: u32,
    pub mentions: Vec<CorefMention>,
}

impl CorefChain {
    pub fn representative(&self) -> Option<&CorefMention> {
        self.mentions
            .iter()
            .find(|m| m.is_representative_mention)
            .or_else(|| self.mentions.first())
    }
}

impl fmt::Display for CorefChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain {}:", self.id)?;
        for mention in &self.mentions {
            write!(
                f,
                "\n  {:?} sentence {} tokens {}..{} ({}, {}, {}, {})",
                mention.text,
                mention.sent_num,
                mention.start_index,
                mention.end_index,
                mention.mention_type,
                mention.number,
                mention.gender,
                mention.animacy
            )?;
            if mention.is_representative_mention {
                f.write_str(" representative")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        serde_json::from_value(json!({
            "sentences": [{
                "index": 0,
                "parse": "(ROOT\n  (S\n    (NP (NNP Chris) (NNP Manning))\n    (VP (VBZ is)\n      (NP (DT a) (JJ nice) (NN person)))\n    (. .)))",
                "basicDependencies": [
                    {"dep": "ROOT", "governor": 0, "governorGloss": "ROOT", "dependent": 6, "dependentGloss": "person"},
                    {"dep": "compound", "governor": 2, "governorGloss": "Manning", "dependent": 1, "dependentGloss": "Chris"},
                    {"dep": "nsubj", "governor": 6, "governorGloss": "person", "dependent": 2, "dependentGloss": "Manning"}
                ],
                "entitymentions": [{
                    "docTokenBegin": 0, "docTokenEnd": 2, "tokenBegin": 0, "tokenEnd": 2,
                    "text": "Chris Manning", "characterOffsetBegin": 0, "characterOffsetEnd": 13,
                    "ner": "PERSON", "nerConfidences": {"PERSON": 0.99}
                }],
                "tokens": [
                    {"index": 1, "word": "Chris", "originalText": "Chris", "lemma": "Chris",
                     "characterOffsetBegin": 0, "characterOffsetEnd": 5, "pos": "NNP", "ner": "PERSON",
                     "speaker": "PER0", "before": "", "after": " "},
                    {"index": 2, "word": "Manning", "originalText": "Manning", "lemma": "Manning",
                     "characterOffsetBegin": 6, "characterOffsetEnd": 13, "pos": "NNP", "ner": "PERSON",
                     "before": " ", "after": " "}
                ]
            }],
            "corefs": {
                "10": [{"id": 10, "text": "oranges", "type": "NOMINAL", "number": "PLURAL", "gender": "NEUTRAL",
                        "animacy": "INANIMATE", "startIndex": 4, "endIndex": 5, "headIndex": 4, "sentNum": 3,
                        "position": [3, 2], "isRepresentativeMention": true}],
                "4": [
                    {"id": 4, "text": "Chris Manning", "type": "PROPER", "number": "SINGULAR", "gender": "MALE",
                     "animacy": "ANIMATE", "startIndex": 1, "endIndex": 3, "headIndex": 2, "sentNum": 1,
                     "position": [1, 1], "isRepresentativeMention": true},
                    {"id": 6, "text": "He", "type": "PRONOMINAL", "number": "SINGULAR", "gender": "MALE",
                     "animacy": "ANIMATE", "startIndex": 1, "endIndex": 2, "headIndex": 1, "sentNum": 3,
                     "position": [3, 1], "isRepresentativeMention": false}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_sentence_accessors() {
        let doc = sample();
        let sentence = doc.sentence(0).unwrap();

        let tree = sentence.parse_tree().unwrap();
        assert_eq!(tree.child(0).unwrap().value, "S");

        let token = sentence.token(0).unwrap();
        assert_eq!(token.pos.as_deref(), Some("NNP"));
        assert_eq!(token.ner.as_deref(), Some("PERSON"));
        assert!(token.to_string().contains("word: \"Chris\""));

        assert_eq!(sentence.mention(0).unwrap().text, "Chris Manning");
        assert_eq!(sentence.text(), "Chris Manning");
    }

    #[test]
    fn test_missing_parse_is_reported() {
        let sentence = Sentence::default();
        assert!(matches!(sentence.parse_tree(), Err(Error::MissingAnnotation(name)) if name == "parse"));
    }

    #[test]
    fn test_dependency_graph_display() {
        let doc = sample();
        let graph = doc.sentences[0].basic_dependency_graph();
        assert_eq!(graph.root().unwrap().dependent_gloss, "person");
        assert_eq!(graph.dependents_of(6).count(), 1);
        assert_eq!(
            graph.to_string(),
            "ROOT(ROOT-0, person-6)\ncompound(Manning-2, Chris-1)\nnsubj(person-6, Manning-2)"
        );
    }

    #[test]
    fn test_coref_chains_sorted_numerically() {
        let chains = sample().coref_chains();
        assert_eq!(chains.iter().map(|c| c.id).collect::<Vec<_>>(), vec![4, 10]);
        assert_eq!(chains[0].representative().unwrap().text, "Chris Manning");
        let rendered = chains[0].to_string();
        assert!(rendered.starts_with("chain 4:"));
        assert!(rendered.contains("\"He\" sentence 3"));
    }

    #[test]
    fn test_minimal_document_deserializes() {
        let doc: Document = serde_json::from_str(r#"{"sentences":[{"index":0,"tokens":[{"index":1,"word":"Hi"}]}]}"#).unwrap();
        assert!(doc.corefs.is_empty());
        assert!(doc.sentences[0].tokens[0].pos.is_none());
        assert_eq!(doc.tokens().count(), 1);
    }
}
