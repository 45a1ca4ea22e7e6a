//! HttpSynthesizer against a mocked OpenAI-compatible speech endpoint.

use sori_lib::SoriError;
use sori_lib::sori_core::types::{SynthConfig, SynthRequest};
use sori_lib::synth::{HttpSynthesizer, Synthesizer};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: &str) -> SynthConfig {
    SynthConfig {
        base_url: base_url.to_string(),
        ..Default::default()
    }
}

fn request(text: &str, rate: Option<&str>) -> SynthRequest {
    SynthRequest {
        text: text.to_string(),
        voice: "ko-KR-SunHiNeural".to_string(),
        rate: rate.map(str::to_string),
    }
}

/// Minimal MP3 frame header plus padding
fn mock_mp3() -> Vec<u8> {
    vec![0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00]
}

#[tokio::test]
async fn writes_audio_to_destination() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_partial_json(serde_json::json!({
            "input": "안녕하세요",
            "voice": "ko-KR-SunHiNeural",
            "response_format": "mp3",
            "model": "tts-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("0000_abcdef.mp3");
    let synth = HttpSynthesizer::new(&config(&server.uri()));

    synth.synthesize(&request("안녕하세요", None), &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), mock_mp3());
    assert!(!dir.path().join("0000_abcdef.mp3.partial").exists());
}

#[tokio::test]
async fn rate_becomes_speed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_partial_json(serde_json::json!({ "speed": 0.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("slow.mp3");
    let synth = HttpSynthesizer::new(&config(&server.uri()));

    synth.synthesize(&request("천천히", Some("-50%")), &dest).await.unwrap();
    assert!(dest.exists());
}

#[tokio::test]
async fn sends_bearer_token_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&server.uri());
    cfg.api_key = Some("secret".into());
    let synth = HttpSynthesizer::new(&cfg);

    synth
        .synthesize(&request("네", None), &dir.path().join("a.mp3"))
        .await
        .unwrap();
}

#[tokio::test]
async fn error_status_is_rejected_and_leaves_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("x.mp3");
    let synth = HttpSynthesizer::new(&config(&server.uri()));

    let err = synth.synthesize(&request("둘", None), &dest).await.unwrap_err();
    match err {
        SoriError::Rejected { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dest.exists());
    assert!(!dir.path().join("x.mp3.partial").exists());
}

#[tokio::test]
async fn malformed_rate_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let synth = HttpSynthesizer::new(&config(&server.uri()));
    let err = synth
        .synthesize(&request("셋", Some("fast")), &dir.path().join("c.mp3"))
        .await
        .unwrap_err();
    assert!(matches!(err, SoriError::Rate(_)));
}

#[tokio::test]
async fn unreachable_server_is_http_error() {
    let dir = tempfile::tempdir().unwrap();
    // Port 9 (discard) is not an HTTP server.
    let synth = HttpSynthesizer::new(&config("http://127.0.0.1:9"));
    let err = synth
        .synthesize(&request("넷", None), &dir.path().join("d.mp3"))
        .await
        .unwrap_err();
    assert!(matches!(err, SoriError::Http(_)));
}
