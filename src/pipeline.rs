//! Languages with built-in CoreNLP pipeline defaults.

use crate::properties::Properties;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Arabic,
    Chinese,
    English,
    French,
    German,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Arabic,
        Language::Chinese,
        Language::English,
        Language::French,
        Language::German,
        Language::Spanish,
    ];

    /// Accepts the full or two-letter name, in any case.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == lower || lang.short_name() == lower)
    }

    pub fn is_language(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Arabic => "arabic",
            Language::Chinese => "chinese",
            Language::English => "english",
            Language::French => "french",
            Language::German => "german",
            Language::Spanish => "spanish",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::Chinese => "zh",
            Language::English => "en",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
        }
    }

    pub fn default_annotators(&self) -> &'static str {
        match self {
            Language::Arabic => "tokenize,ssplit,pos,parse",
            Language::Chinese => "tokenize,ssplit,pos,lemma,ner,parse,coref",
            Language::English => "tokenize,ssplit,pos,lemma,ner,depparse",
            Language::French => "tokenize,ssplit,pos,depparse",
            Language::German => "tokenize,ssplit,pos,ner,parse",
            Language::Spanish => "tokenize,ssplit,pos,lemma,ner,depparse,kbp",
        }
    }

    /// Name of the properties file bundled in the language's models jar.
    pub fn properties_file(&self) -> String {
        match self {
            Language::English => "StanfordCoreNLP.properties".to_string(),
            lang => format!("StanfordCoreNLP-{}.properties", lang.name()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_name(s).ok_or_else(|| crate::Error::config(format!("Unknown language: {}", s)))
    }
}

/// Request properties reproducing the stock English pipeline.
pub fn english_request_defaults() -> Properties {
    Properties::new()
        .with("annotators", Language::English.default_annotators())
        .with("tokenize.language", "en")
        .with(
            "pos.model",
            "edu/stanford/nlp/models/pos-tagger/english-left3words-distsim.tagger",
        )
        .with(
            "ner.model",
            "edu/stanford/nlp/models/ner/english.all.3class.distsim.crf.ser.gz,\
             edu/stanford/nlp/models/ner/english.muc.7class.distsim.crf.ser.gz,\
             edu/stanford/nlp/models/ner/english.conll.4class.distsim.crf.ser.gz",
        )
        .with("sutime.language", "english")
        .with(
            "sutime.rules",
            "edu/stanford/nlp/models/sutime/defs.sutime.txt,\
             edu/stanford/nlp/models/sutime/english.sutime.txt,\
             edu/stanford/nlp/models/sutime/english.holidays.sutime.txt",
        )
        .with("ner.applyNumericClassifiers", "true")
        .with("ner.useSUTime", "true")
        .with(
            "ner.fine.regexner.mapping",
            "ignorecase=true,validpospattern=^(NN|JJ).*,\
             edu/stanford/nlp/models/kbp/english/gazetteers/regexner_caseless.tab;\
             edu/stanford/nlp/models/kbp/english/gazetteers/regexner_cased.tab",
        )
        .with("ner.fine.regexner.noDefaultOverwriteLabels", "CITY")
        .with("ner.language", "en")
        .with("depparse.model", "edu/stanford/nlp/models/parser/nndep/english_UD.gz")
}
