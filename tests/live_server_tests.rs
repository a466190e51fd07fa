//! Tests against a real CoreNLP server.
//!
//! Start one with `java -mx5g -cp "$CORENLP_HOME/*" edu.stanford.nlp.pipeline.StanfordCoreNLPServer`
//! and run `CORENLP_ENDPOINT=http://localhost:9000 cargo test -- --ignored`.

use corenlp_client::demo::{ANNOTATORS, SAMPLE_TEXT};
use corenlp_client::{Client, StartServer};

async fn live_client() -> Client {
    let endpoint =
        std::env::var("CORENLP_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());
    Client::builder()
        .with_endpoint(endpoint)
        .with_start_server(StartServer::DontStart)
        .with_annotators(ANNOTATORS)
        .connect()
        .await
        .expect("client")
}

#[tokio::test]
#[ignore]
async fn test_live_annotate() {
    let client = live_client().await;
    let ann = client.annotate(SAMPLE_TEXT).await.unwrap();

    assert_eq!(ann.sentences.len(), 3);
    let sentence = ann.sentence(0).unwrap();
    assert_eq!(sentence.parse_tree().unwrap().value, "ROOT");
    assert_eq!(sentence.token(0).unwrap().word, "Chris");
    assert!(!ann.coref_chains().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_live_patterns() {
    let client = live_client().await;

    let tokens = client
        .tokensregex(SAMPLE_TEXT, "([ner: PERSON]+) /wrote/ /an?/ []{0,3} /sentence|article/")
        .await
        .unwrap();
    assert_eq!(tokens.sentence(1).unwrap().get(0).unwrap().text(), Some("Chris wrote a simple sentence"));

    let deps = client
        .semgrex(SAMPLE_TEXT, "{word:wrote} >nsubj {}=subject >obj {}=object")
        .await
        .unwrap();
    let found = deps.sentence(1).unwrap().get(0).unwrap();
    assert_eq!(found.named("subject").unwrap().text, "Chris");
    assert_eq!(found.named("object").unwrap().text, "sentence");

    let trees = client.tregex(SAMPLE_TEXT, "NP").await.unwrap();
    assert_eq!(
        trees.sentence(1).unwrap().get(1).unwrap().tree_match(),
        Some("(NP (DT a) (JJ simple) (NN sentence))\n")
    );
}
