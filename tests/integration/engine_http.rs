//! Engine over the real HTTP transport against a mockito server.

use crate::mock_server::MockServerFixture;
use lingo_engine::{
    BlockingEngine, ChatMessage, Engine, EngineConfig, Error, Identity, LocalizationParams, Payload,
};
use serde_json::json;

#[tokio::test]
async fn test_two_chunks_are_translated_and_reassembled() {
    let fixture = MockServerFixture::new().await;
    let a = fixture
        .mock_localize(
            json!({"locale": {"source": "en", "target": "es"}, "data": {"a": "Hello"}}),
            json!({"data": {"a": "Hola"}}),
        )
        .await;
    let b = fixture
        .mock_localize(
            json!({"locale": {"source": "en", "target": "es"}, "data": {"b": "World"}}),
            json!({"data": {"b": "Mundo"}}),
        )
        .await;

    let engine = fixture.builder().batch_size(1).build().unwrap();
    let mut input = Payload::new();
    input.insert("a".into(), json!("Hello"));
    input.insert("b".into(), json!("World"));

    let out = engine
        .localize_object(&input, &LocalizationParams::new("es").with_source_locale("en"))
        .await
        .unwrap();

    assert_eq!(serde_json::Value::Object(out), json!({"a": "Hola", "b": "Mundo"}));
    a.assert_async().await;
    b.assert_async().await;
    engine.close().await;
}

#[tokio::test]
async fn test_server_errors_are_retried_until_exhausted() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_error_response("/i18n", 503, 3).await;
    let engine = fixture.builder().retry_max_attempts(2).build().unwrap();

    let err = engine
        .localize_text("Hello", &LocalizationParams::new("es"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RetryExhausted { attempts: 3, .. }));
    assert_eq!(err.status_code(), Some(503));
    assert!(!err.suggestions().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_error_response("/i18n", 400, 1).await;
    let engine = fixture.engine();

    let err = engine
        .localize_text("Hello", &LocalizationParams::new("es"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 400, .. }));
    assert!(!err.is_retryable());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_payload_in_success_response() {
    let fixture = MockServerFixture::new().await;
    let _m = fixture
        .mock_json_response("/i18n", 200, r#"{"error":"unsupported locale pair"}"#)
        .await;
    let err = fixture
        .engine()
        .localize_text("Hello", &LocalizationParams::new("tlh"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Service { ref message, .. } if message == "unsupported locale pair"));
}

#[tokio::test]
async fn test_chat_sends_texts_only() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_localize(
            json!({"data": {"chat_0": "Hi there", "chat_1": "Bye"}}),
            json!({"data": {"chat_0": "Hola", "chat_1": "Adiós"}}),
        )
        .await;

    let chat = vec![ChatMessage::new("Alice", "Hi there"), ChatMessage::new("Bob", "Bye")];
    let out = fixture
        .engine()
        .localize_chat(&chat, &LocalizationParams::new("es"))
        .await
        .unwrap();

    assert_eq!(
        out,
        vec![ChatMessage::new("Alice", "Hola"), ChatMessage::new("Bob", "Adiós")]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_recognize_locale() {
    let fixture = MockServerFixture::new().await;
    let _m = fixture
        .mock_json_response("/recognize", 200, r#"{"locale":"es"}"#)
        .await;
    let locale = fixture.engine().recognize_locale("¿Dónde está?").await.unwrap();
    assert_eq!(locale, "es");
}

#[tokio::test]
async fn test_whoami_identity_and_unauthenticated() {
    let fixture = MockServerFixture::new().await;
    let _m = fixture
        .mock_json_response("/whoami", 200, r#"{"email":"dev@example.com","id":"usr_1"}"#)
        .await;
    assert_eq!(
        fixture.engine().whoami().await.unwrap(),
        Some(Identity {
            email: "dev@example.com".into(),
            id: "usr_1".into()
        })
    );

    let fixture = MockServerFixture::new().await;
    let _m = fixture.mock_error_response("/whoami", 401, 1).await;
    assert_eq!(fixture.engine().whoami().await.unwrap(), None);
}

#[tokio::test]
async fn test_closed_engine_does_not_send() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_error_response("/i18n", 500, 0).await;
    let engine = fixture.engine();
    engine.close().await;
    assert!(engine.is_closed());

    let err = engine
        .localize_text("Hello", &LocalizationParams::new("es"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_quick_translate_with_config() {
    let fixture = MockServerFixture::new().await;
    let _m = fixture
        .mock_localize(json!({"data": {"text": "Good night"}}), json!({"data": {"text": "Buenas noches"}}))
        .await;
    let config = EngineConfig {
        api_url: fixture.base_url.clone(),
        ..EngineConfig::new(crate::mock_server::API_KEY)
    };
    let out = Engine::quick_translate_with_config(config, "Good night", &LocalizationParams::new("es"))
        .await
        .unwrap();
    assert_eq!(out.as_text(), Some("Buenas noches"));
}

#[test]
fn test_blocking_engine_over_http() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let fixture = runtime.block_on(MockServerFixture::new());
    let _m = runtime.block_on(fixture.mock_json_response("/recognize", 200, r#"{"locale":"fr"}"#));
    let config = EngineConfig {
        api_url: fixture.base_url.clone(),
        ..EngineConfig::new(crate::mock_server::API_KEY)
    };

    // The blocking engine runs its own runtime; keep it off the fixture's threads.
    let locale = std::thread::spawn(move || {
        let engine = BlockingEngine::new(config).unwrap();
        let out = engine.recognize_locale("Bonjour tout le monde");
        engine.close();
        out
    })
    .join()
    .unwrap()
    .unwrap();
    assert_eq!(locale, "fr");
}

#[tokio::test]
async fn test_validation_happens_before_network() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_error_response("/i18n", 500, 0).await;
    let engine = fixture.engine();

    let bad_chat = vec![ChatMessage::new("", "Hello")];
    assert!(matches!(
        engine.localize_chat(&bad_chat, &LocalizationParams::new("es")).await,
        Err(Error::Validation { .. })
    ));
    assert!(matches!(
        engine.localize_text("Hello", &LocalizationParams::new("not a locale")).await,
        Err(Error::Validation { .. })
    ));
    mock.assert_async().await;
}
