//! `GoogleTranslator` against a wiremock server, and the classifier on top of it.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xsent_core::SentimentLabel;
use xsent_sentiment::{Classifier, GoogleTranslator, SlangNormalizer, TranslationError, Translator};

fn translator(server: &MockServer) -> GoogleTranslator {
    GoogleTranslator::with_base_url(&server.uri(), 5, 2).expect("translator should build")
}

#[tokio::test]
async fn translate_returns_joined_segments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("sl", "id"))
        .and(query_param("tl", "en"))
        .and(query_param("q", "sangat bagus sekali"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            [["very good", "sangat bagus sekali", null, null, 10]],
            null,
            "id"
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let text = translator(&server)
        .translate("sangat bagus sekali")
        .await
        .unwrap();
    assert_eq!(text, "very good");
}

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = translator(&server).translate("halo").await.unwrap_err();
    assert!(matches!(err, TranslationError::Http(_)));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let err = translator(&server).translate("halo").await.unwrap_err();
    assert!(matches!(err, TranslationError::Deserialize { .. }));
}

#[tokio::test]
async fn empty_segments_are_empty_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[], null, "id"])))
        .mount(&server)
        .await;

    let err = translator(&server).translate("halo").await.unwrap_err();
    assert!(matches!(err, TranslationError::Empty));
}

#[tokio::test]
async fn classifier_scores_translation_and_falls_back_on_outage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("q", "pelayanan tidak ramah"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            [["the service is terrible", "pelayanan tidak ramah", null, null, 10]],
            null,
            "id"
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let classifier = Classifier::new(SlangNormalizer::builtin(), Some(translator(&server)));

    let translated = classifier.classify_text("Pelayanan TIDAK ramah!").await;
    assert!(translated.translated);
    assert_eq!(translated.pivot_text, "the service is terrible");
    assert_eq!(translated.label, SentimentLabel::Negative);

    let fallback = classifier.classify_text("harga mahal bgt").await;
    assert!(!fallback.translated);
    assert_eq!(fallback.pivot_text, "harga mahal banget");
    assert_eq!(fallback.label, SentimentLabel::Negative);
}
