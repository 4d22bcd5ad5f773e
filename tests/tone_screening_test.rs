use base64::{engine::general_purpose::STANDARD, Engine as _};
use httpmock::prelude::*;
use serde_json::json;
use shotmap_etl::classify::screening::labelled_filename;
use shotmap_etl::classify::{
    Exemplars, GeminiToneClassifier, Screening, ScreeningPolicy, Tone, ToneScreener,
};
use shotmap_etl::core::rate_limit::MinIntervalGate;
use shotmap_etl::utils::validation::Validate;
use shotmap_etl::{EtlError, TomlConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    config: TomlConfig,
}

/// 在暫存目錄寫入三張參考圖，並產生指向 mock server 的設定
fn fixture(server: &MockServer) -> Fixture {
    let dir = TempDir::new().unwrap();
    for name in ["positive.png", "negative.png", "neutral.png"] {
        std::fs::write(dir.path().join(name), format!("exemplar {}", name)).unwrap();
    }

    std::env::set_var("TONE_SCREEN_TEST_KEY", "test-key");
    let path = |name: &str| dir.path().join(name).to_str().unwrap().replace('\\', "/");
    let toml = format!(
        r#"
[classifier]
endpoint = "{}"
api_key = "${{TONE_SCREEN_TEST_KEY}}"
model = "test-model"
min_image_bytes = 16
min_interval_ms = 0

[classifier.exemplars]
positive = "{}"
negative = "{}"
neutral = "{}"
"#,
        server.url("/v1beta/models"),
        path("positive.png"),
        path("negative.png"),
        path("neutral.png"),
    );
    let config_path = dir.path().join("shotmap.toml");
    std::fs::write(&config_path, toml).unwrap();

    let config = TomlConfig::from_file(&config_path).unwrap();
    config.validate().unwrap();
    Fixture { _dir: dir, config }
}

async fn screener(config: &TomlConfig) -> ToneScreener<GeminiToneClassifier> {
    let classifier_config = config.classifier().unwrap();
    let exemplars = Exemplars::load(classifier_config).await.unwrap();
    let limiter = Arc::new(MinIntervalGate::new(Duration::ZERO));
    let classifier = GeminiToneClassifier::new(classifier_config, exemplars, limiter).unwrap();
    ToneScreener::new(classifier, ScreeningPolicy::from(classifier_config))
}

fn reply(text: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
}

#[tokio::test]
async fn test_kept_image_is_labelled_with_tone() {
    let server = MockServer::start();
    let candidate = b"celebration photo, large and sharp".to_vec();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/test-model:generateContent")
            .header("x-goog-api-key", "test-key")
            .body_contains(STANDARD.encode("exemplar positive.png"))
            .body_contains(STANDARD.encode(&candidate));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(reply("Positive, 96,\n 91\n"));
    });

    let fixture = fixture(&server);
    let screener = screener(&fixture.config).await;

    let outcome = screener.screen(&candidate).await.unwrap();
    mock.assert();
    assert_eq!(outcome, Screening::Keep { tone: Tone::Positive });
    assert_eq!(labelled_filename("saka-1.jpg", Tone::Positive), "saka-1-Positive.jpg");
}

#[tokio::test]
async fn test_small_image_skips_classifier() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(reply("Positive, 99, 99"));
    });

    let fixture = fixture(&server);
    let screener = screener(&fixture.config).await;

    let outcome = screener.screen(b"tiny").await.unwrap();
    assert_eq!(outcome, Screening::TooSmall { bytes: 4 });
    mock.assert_hits(0);
}

#[tokio::test]
async fn test_thresholds_reject_weak_and_blurry_images() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).body_contains(STANDARD.encode(b"frustrated but far away"));
        then.status(200).json_body(reply("Negative, 72, 95"));
    });
    server.mock(|when, then| {
        when.method(POST).body_contains(STANDARD.encode(b"neutral portrait, grainy"));
        then.status(200).json_body(reply("Neutral, 10, 40"));
    });

    let fixture = fixture(&server);
    let screener = screener(&fixture.config).await;

    let weak = screener.screen(b"frustrated but far away").await.unwrap();
    assert_eq!(
        weak,
        Screening::WeakTone {
            tone: Tone::Negative,
            strength: 72
        }
    );

    let blurry = screener.screen(b"neutral portrait, grainy").await.unwrap();
    assert_eq!(blurry, Screening::LowQuality { quality: 40 });
}

#[tokio::test]
async fn test_malformed_reply_is_a_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(200)
            .json_body(reply("The player appears to be celebrating."));
    });

    let fixture = fixture(&server);
    let screener = screener(&fixture.config).await;

    let err = screener
        .screen(b"a perfectly ordinary candidate image")
        .await
        .unwrap_err();
    assert!(matches!(err, EtlError::ClassificationParseError { .. }));
}

#[tokio::test]
async fn test_upstream_failure_is_a_classifier_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(429).body("quota exceeded");
    });

    let fixture = fixture(&server);
    let screener = screener(&fixture.config).await;

    let err = screener
        .screen(b"a perfectly ordinary candidate image")
        .await
        .unwrap_err();
    match err {
        EtlError::ClassifierError { message } => assert!(message.contains("429")),
        other => panic!("unexpected error: {:?}", other),
    }
}
