//! Constituency trees in Penn Treebank bracketing.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    pub value: String,
    pub children: Vec<ParseTree>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut atom_start: Option<usize> = None;

    for (i, c) in input.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(start) = atom_start.take() {
                tokens.push(Token::Atom(&input[start..i]));
            }
            match c {
                '(' => tokens.push(Token::Open),
                ')' => tokens.push(Token::Close),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(i);
        }
    }
    if let Some(start) = atom_start {
        tokens.push(Token::Atom(&input[start..]));
    }
    tokens
}

impl ParseTree {
    pub fn leaf(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn node(value: impl Into<String>, children: Vec<ParseTree>) -> Self {
        Self {
            value: value.into(),
            children,
        }
    }

    /// Parses a bracketed tree such as `(ROOT (S (NP (NNP Chris)) ...))`.
    ///
    /// Whitespace (including the newlines CoreNLP uses for indentation and
    /// the trailing newline on tregex matches) is insignificant. An unlabeled
    /// outer bracket, as in `( (S ...))`, yields a node with an empty value.
    pub fn parse(input: &str) -> Result<Self> {
        let mut stack: Vec<ParseTree> = Vec::new();
        let mut root: Option<ParseTree> = None;
        let mut expect_label = false;

        for token in tokenize(input) {
            if root.is_some() {
                return Err(Error::tree_parse("trailing input after complete tree"));
            }
            match token {
                Token::Open => {
                    stack.push(ParseTree::leaf(String::new()));
                    expect_label = true;
                }
                Token::Atom(atom) => {
                    let top = stack
                        .last_mut()
                        .ok_or_else(|| Error::tree_parse(format!("'{}' outside of brackets", atom)))?;
                    if expect_label {
                        top.value = atom.to_string();
                        expect_label = false;
                    } else {
                        top.children.push(ParseTree::leaf(atom));
                    }
                }
                Token::Close => {
                    let node = stack.pop().ok_or_else(|| Error::tree_parse("unbalanced ')'"))?;
                    expect_label = false;
                    if node.children.is_empty() {
                        return Err(Error::tree_parse(format!(
                            "bracketed node '({})' has no children",
                            node.value
                        )));
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
            }
        }

        if !stack.is_empty() {
            return Err(Error::tree_parse("unbalanced '('"));
        }
        root.ok_or_else(|| Error::tree_parse("no tree in input"))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A tag directly over a single word, e.g. `(NN sentence)`.
    pub fn is_preterminal(&self) -> bool {
        self.children.len() == 1 && self.children[0].is_leaf()
    }

    pub fn child(&self, index: usize) -> Option<&ParseTree> {
        self.children.get(index)
    }

    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.is_leaf() {
            out.push(&self.value);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    /// The covered words joined by single spaces.
    pub fn words(&self) -> String {
        self.leaves().join(" ")
    }

    /// `(tag, word)` pairs in surface order.
    pub fn tagged_words(&self) -> Vec<(&str, &str)> {
        self.subtrees()
            .filter(|t| t.is_preterminal())
            .map(|t| (t.value.as_str(), t.children[0].value.as_str()))
            .collect()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(ParseTree::depth).max().unwrap_or(0)
    }

    /// Pre-order traversal including `self`.
    pub fn subtrees(&self) -> Subtrees<'_> {
        Subtrees { stack: vec![self] }
    }

    fn fmt_compact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return f.write_str(&self.value);
        }
        write!(f, "({}", self.value)?;
        for child in &self.children {
            f.write_str(" ")?;
            child.fmt_compact(f)?;
        }
        f.write_str(")")
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let flat = self
            .children
            .iter()
            .all(|c| c.is_leaf() || c.is_preterminal());
        if self.is_leaf() || flat {
            return self.fmt_compact(f);
        }
        write!(f, "({}", self.value)?;
        // Leading preterminals stay on the label's line.
        let mut broken = false;
        for child in &self.children {
            if child.is_leaf() || (child.is_preterminal() && !broken) {
                f.write_str(" ")?;
                child.fmt_compact(f)?;
            } else {
                write!(f, "\n{:width$}", "", width = indent + 2)?;
                child.fmt_indented(f, indent + 2)?;
                broken = true;
            }
        }
        f.write_str(")")
    }
}

pub struct Subtrees<'a> {
    stack: Vec<&'a ParseTree>,
}

impl<'a> Iterator for Subtrees<'a> {
    type Item = &'a ParseTree;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.stack.pop()?;
        self.stack.extend(tree.children.iter().rev());
        Some(tree)
    }
}

impl fmt::Display for ParseTree {
    /// Single-line bracketing; `{:#}` indents nested phrases.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.fmt_indented(f, 0)
        } else {
            self.fmt_compact(f)
        }
    }
}

impl FromStr for ParseTree {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_SENTENCE: &str = "(ROOT\n  (S\n    (NP (NNP Chris) (NNP Manning))\n    (VP (VBZ is)\n      (NP (DT a) (JJ nice) (NN person)))\n    (. .)))";

    #[test]
    fn test_parse_indented_corenlp_output() {
        let tree = ParseTree::parse(FIRST_SENTENCE).unwrap();
        assert_eq!(tree.value, "ROOT");
        assert_eq!(tree.children.len(), 1);

        let s = tree.child(0).unwrap();
        assert_eq!(s.value, "S");
        assert_eq!(s.children.len(), 3);
        assert_eq!(s.child(0).unwrap().to_string(), "(NP (NNP Chris) (NNP Manning))");
        assert_eq!(tree.words(), "Chris Manning is a nice person .");
        assert_eq!(tree.depth(), 6);
    }

    #[test]
    fn test_display_round_trips_compact_form() {
        let compact = "(ROOT (S (NP (NNP Chris) (NNP Manning)) (VP (VBZ is) (NP (DT a) (JJ nice) (NN person))) (. .)))";
        let tree: ParseTree = FIRST_SENTENCE.parse().unwrap();
        assert_eq!(tree.to_string(), compact);
        assert_eq!(ParseTree::parse(compact).unwrap(), tree);
    }

    #[test]
    fn test_alternate_display_indents_phrases() {
        let tree = ParseTree::parse(FIRST_SENTENCE).unwrap();
        let pretty = format!("{:#}", tree);
        assert_eq!(pretty, FIRST_SENTENCE);
        assert_eq!(ParseTree::parse(&pretty).unwrap(), tree);
    }

    #[test]
    fn test_tregex_match_with_trailing_newline() {
        let tree = ParseTree::parse("(NP (DT a) (JJ simple) (NN sentence))\n").unwrap();
        assert_eq!(tree.to_string(), "(NP (DT a) (JJ simple) (NN sentence))");
        assert_eq!(
            tree.tagged_words(),
            vec![("DT", "a"), ("JJ", "simple"), ("NN", "sentence")]
        );
        assert!(tree.child(2).unwrap().is_preterminal());
        assert!(!tree.is_preterminal());
    }

    #[test]
    fn test_unlabeled_root() {
        let tree = ParseTree::parse("( (S (NN hi)))").unwrap();
        assert_eq!(tree.value, "");
        assert_eq!(tree.child(0).unwrap().value, "S");
    }

    #[test]
    fn test_subtrees_preorder() {
        let tree = ParseTree::parse("(NP (DT a) (NN b))").unwrap();
        let labels: Vec<&str> = tree.subtrees().map(|t| t.value.as_str()).collect();
        assert_eq!(labels, vec!["NP", "DT", "a", "NN", "b"]);
    }

    #[test]
    fn test_malformed_trees() {
        let inputs = [
            "",
            "   ",
            "(NP (DT a)",
            "(NP (DT a)))",
            "(NP a) (NP b)",
            "word",
            "()",
            "(NP)",
            "(S (NP) (VP (VBD ran)))",
        ];
        for input in inputs {
            assert!(
                matches!(ParseTree::parse(input), Err(Error::TreeParse(_))),
                "expected failure for {:?}",
                input
            );
        }
    }
}
