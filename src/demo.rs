//! The walkthrough printed by `corenlp-demo`.
//!
//! Each section starts with a `---` line followed by its title.

use crate::Client;
use anyhow::Context;
use std::io::Write;

pub const SAMPLE_TEXT: &str =
    "Chris Manning is a nice person. Chris wrote a simple sentence. He also gives oranges to people.";

pub const ANNOTATORS: [&str; 8] = ["tokenize", "ssplit", "pos", "lemma", "ner", "parse", "depparse", "coref"];

pub const TOKENSREGEX_PATTERN: &str = "([ner: PERSON]+) /wrote/ /an?/ []{0,3} /sentence|article/";
pub const SEMGREX_PATTERN: &str = "{word:wrote} >nsubj {}=subject >obj {}=object";
pub const TREGEX_PATTERN: &str = "NP";

pub fn section<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    writeln!(out, "---")?;
    writeln!(out, "{}", title)
}

pub fn write_input<W: Write>(out: &mut W, text: &str) -> std::io::Result<()> {
    section(out, "input text")?;
    writeln!(out)?;
    writeln!(out, "{}", text)
}

/// Annotates `text`, runs the three pattern queries and writes every section
/// after the input text.
pub async fn run<W: Write>(client: &Client, text: &str, out: &mut W) -> anyhow::Result<()> {
    let ann = client.annotate(text).await?;
    let sentence = ann.sentence(0).context("annotation has no sentences")?;

    section(out, "constituency parse of first sentence")?;
    let constituency_parse = sentence.parse_tree()?;
    writeln!(out, "{:#}", constituency_parse)?;

    section(out, "first subtree of constituency parse")?;
    let subtree = constituency_parse.child(0).context("parse tree has no children")?;
    writeln!(out, "{:#}", subtree)?;

    section(out, "value of first subtree of constituency parse")?;
    writeln!(out, "{}", subtree.value)?;

    section(out, "dependency parse of first sentence")?;
    writeln!(out, "{}", sentence.basic_dependency_graph())?;

    section(out, "first token of first sentence")?;
    let token = sentence.token(0).context("sentence has no tokens")?;
    writeln!(out, "{}", token)?;

    section(out, "part of speech tag of token")?;
    writeln!(out, "{}", token.pos.as_deref().unwrap_or_default())?;

    section(out, "named entity tag of token")?;
    writeln!(out, "{}", token.ner.as_deref().unwrap_or_default())?;

    section(out, "first entity mention in sentence")?;
    let mention = sentence.mention(0).context("sentence has no entity mentions")?;
    writeln!(out, "{}", mention)?;

    section(out, "coref chains for the example")?;
    for chain in ann.coref_chains() {
        writeln!(out, "{}", chain)?;
    }

    section(out, "tokensregex: who wrote a sentence")?;
    let matches = client.tokensregex(text, TOKENSREGEX_PATTERN).await?;
    writeln!(out, "{}", matches.len())?;
    let second = matches.sentence(1).context("tokensregex returned fewer than two sentences")?;
    writeln!(out, "{}", second.len())?;
    let found = second.get(0).context("no tokensregex match in the second sentence")?;
    writeln!(out, "{}", found.text().unwrap_or_default())?;
    writeln!(out, "{}", found.group(1).map(|g| g.text).unwrap_or_default())?;

    section(out, "semgrex: subject and object of 'wrote'")?;
    let matches = client.semgrex(text, SEMGREX_PATTERN).await?;
    writeln!(out, "{}", matches.len())?;
    let second = matches.sentence(1).context("semgrex returned fewer than two sentences")?;
    writeln!(out, "{}", second.len())?;
    let found = second.get(0).context("no semgrex match in the second sentence")?;
    writeln!(out, "{}", found.text().unwrap_or_default())?;
    writeln!(out, "{}", found.named("subject").map(|c| c.text).unwrap_or_default())?;
    writeln!(out, "{}", found.named("object").map(|c| c.text).unwrap_or_default())?;

    section(out, "tregex: noun phrases")?;
    let matches = client.tregex(text, TREGEX_PATTERN).await?;
    for (index, sentence) in matches.sentences.iter().enumerate() {
        writeln!(out, "sentence {}: {}", index, sentence)?;
    }
    let noun_phrase = matches
        .sentence(1)
        .and_then(|s| s.get(1))
        .context("tregex found fewer than two noun phrases in the second sentence")?;
    writeln!(out, "{}", noun_phrase.tree_match().unwrap_or_default().trim_end())?;

    Ok(())
}
