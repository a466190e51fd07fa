//! Runs the demo walkthrough against the fake CoreNLP server and checks what
//! it prints.

mod common;

use common::{spawn_fake_server, SAMPLE_TEXT};
use corenlp_client::demo::{self, ANNOTATORS};
use corenlp_client::{Client, StartServer};

/// Splits demo output into `(title, body lines)` pairs.
fn sections(output: &str) -> Vec<(String, Vec<String>)> {
    let mut sections = Vec::new();
    let mut lines = output.lines().peekable();
    while let Some(line) = lines.next() {
        assert_eq!(line, "---", "output must start each section with a separator");
        let title = lines.next().expect("section title").to_string();
        let mut body = Vec::new();
        while let Some(next) = lines.peek() {
            if *next == "---" {
                break;
            }
            body.push(next.to_string());
            lines.next();
        }
        sections.push((title, body));
    }
    sections
}

async fn demo_output() -> String {
    let (endpoint, _recorder) = spawn_fake_server().await;
    let client = Client::builder()
        .with_endpoint(&endpoint)
        .with_start_server(StartServer::DontStart)
        .with_annotators(ANNOTATORS)
        .connect()
        .await
        .unwrap();

    let mut out = Vec::new();
    demo::write_input(&mut out, SAMPLE_TEXT).unwrap();
    demo::run(&client, SAMPLE_TEXT, &mut out).await.unwrap();
    client.shutdown().await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_demo_prints_every_section_in_order() {
    let output = demo_output().await;
    let titles: Vec<String> = sections(&output).into_iter().map(|(title, _)| title).collect();
    assert_eq!(
        titles,
        vec![
            "input text",
            "constituency parse of first sentence",
            "first subtree of constituency parse",
            "value of first subtree of constituency parse",
            "dependency parse of first sentence",
            "first token of first sentence",
            "part of speech tag of token",
            "named entity tag of token",
            "first entity mention in sentence",
            "coref chains for the example",
            "tokensregex: who wrote a sentence",
            "semgrex: subject and object of 'wrote'",
            "tregex: noun phrases",
        ]
    );
}

#[tokio::test]
async fn test_demo_section_bodies() {
    let output = demo_output().await;
    let sections = sections(&output);
    let body = |index: usize| sections[index].1.join("\n");

    assert_eq!(body(0), format!("\n{}", SAMPLE_TEXT));
    assert_eq!(
        body(1),
        "(ROOT\n  (S\n    (NP (NNP Chris) (NNP Manning))\n    (VP (VBZ is)\n      (NP (DT a) (JJ nice) (NN person)))\n    (. .)))"
    );
    assert!(body(2).starts_with("(S\n  (NP (NNP Chris) (NNP Manning))"));
    assert_eq!(body(3), "S");
    assert_eq!(sections[4].1.first().map(String::as_str), Some("ROOT(ROOT-0, person-6)"));
    assert!(body(5).starts_with("index: 1\nword: \"Chris\""));
    assert_eq!(body(6), "NNP");
    assert_eq!(body(7), "PERSON");
    assert!(body(8).starts_with("\"Chris Manning\" [PERSON]"));
    assert!(body(9).starts_with("chain 4:"));
    assert!(body(9).contains("\"He\""));
}

#[tokio::test]
async fn test_demo_pattern_sections() {
    let output = demo_output().await;
    let sections = sections(&output);

    assert_eq!(
        sections[10].1,
        vec!["3", "1", "Chris wrote a simple sentence", "Chris"]
    );
    assert_eq!(sections[11].1, vec!["3", "1", "wrote", "Chris", "sentence"]);

    let tregex = &sections[12].1;
    assert!(tregex[0].starts_with("sentence 0:"));
    assert_eq!(
        tregex.last().map(String::as_str),
        Some("(NP (DT a) (JJ simple) (NN sentence))")
    );
}
