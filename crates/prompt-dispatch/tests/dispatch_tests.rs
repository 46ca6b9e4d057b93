//! End-to-end dispatch tests against mocked provider backends.

use prompt_dispatch::providers::openrouter::TITLE;
use prompt_dispatch::{
    ApiKeyProviderConfig, CustomProviderConfig, DefaultProviderConfig, DispatchError, Dispatcher,
    OptimizationRequest, OptimizeMessage, OptimizeResponse, Provider, ProviderConfig, Settings,
    FALLBACK_OPENROUTER_KEY, REWRITE_INSTRUCTION,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(provider: Provider) -> OptimizationRequest {
    OptimizationRequest::new("write a poem about rust", provider).expect("valid request")
}

async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|r| r.body_json::<Value>().expect("json body"))
        .collect()
}

fn missing_env_file(dir: &tempfile::TempDir) -> DefaultProviderConfig {
    DefaultProviderConfig {
        env_file: Some(dir.path().join("missing.env")),
        ..Default::default()
    }
}

#[tokio::test]
async fn missing_credentials_make_no_network_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let blank = ApiKeyProviderConfig::new("").with_base_url(server.uri());
    let config = ProviderConfig::default()
        .with_gemini(blank.clone())
        .with_openai(blank);
    let dispatcher = Dispatcher::new();

    for provider in [Provider::Gemini, Provider::Claude, Provider::OpenAI] {
        let err = dispatcher
            .dispatch(&request(provider), &config)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::MissingCredential(provider));
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_without_endpoint_makes_no_network_call() {
    let config = ProviderConfig::default().with_custom(CustomProviderConfig::default().with_api_key("k"));

    let err = Dispatcher::new()
        .dispatch(&request(Provider::Custom), &config)
        .await
        .unwrap_err();

    assert_eq!(err, DispatchError::MissingEndpoint);
}

#[tokio::test]
async fn gemini_result_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "AIza-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": " Hello " }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_gemini(
        ApiKeyProviderConfig::new("AIza-test").with_base_url(format!("{}/v1beta", server.uri())),
    );

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Gemini), &config)
        .await
        .unwrap();
    assert_eq!(text, "Hello");

    let bodies = received_bodies(&server).await;
    assert_eq!(
        bodies[0]["contents"][0]["parts"][0]["text"],
        format!("TASK: {REWRITE_INSTRUCTION}\n\nORIGINAL PROMPT: write a poem about rust")
    );
}

#[tokio::test]
async fn claude_sends_key_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "\nA clearer poem request.\n" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_claude(
        ApiKeyProviderConfig::new("sk-ant-test").with_base_url(format!("{}/v1", server.uri())),
    );

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Claude), &config)
        .await
        .unwrap();
    assert_eq!(text, "A clearer poem request.");

    let bodies = received_bodies(&server).await;
    assert_eq!(bodies[0]["max_tokens"], 1024);
    assert_eq!(bodies[0]["messages"].as_array().unwrap().len(), 1);
    assert_eq!(bodies[0]["messages"][0]["role"], "user");
}

#[tokio::test]
async fn openai_uses_system_and_user_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-openai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Rewritten prompt " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_openai(
        ApiKeyProviderConfig::new("sk-openai")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_model("gpt-4o-mini"),
    );

    let text = Dispatcher::new()
        .dispatch(&request(Provider::OpenAI), &config)
        .await
        .unwrap();
    assert_eq!(text, "Rewritten prompt");

    let body = &received_bodies(&server).await[0];
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], REWRITE_INSTRUCTION);
    assert_eq!(body["messages"][1]["content"], "write a poem about rust");
}

#[tokio::test]
async fn custom_reads_flat_response_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header("authorization", "Bearer local-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Rewritten." })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_custom(
        CustomProviderConfig::new(format!("{}/generate", server.uri())).with_api_key("local-key"),
    );

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Custom), &config)
        .await
        .unwrap();
    assert_eq!(text, "Rewritten.");

    let body = &received_bodies(&server).await[0];
    assert!(body.get("model").is_none());
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn custom_stringifies_unknown_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "foo": 1 })))
        .mount(&server)
        .await;

    let config = ProviderConfig::default()
        .with_custom(CustomProviderConfig::new(format!("{}/generate", server.uri())));

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Custom), &config)
        .await
        .unwrap();
    assert_eq!(text, r#"{"foo":1}"#);
}

#[tokio::test]
async fn custom_blank_response_field_returns_serialized_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default()
        .with_custom(CustomProviderConfig::new(format!("{}/generate", server.uri())));

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Custom), &config)
        .await
        .unwrap();
    assert_eq!(text, r#"{"response":""}"#);
}

#[tokio::test]
async fn custom_without_key_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_custom(
        CustomProviderConfig::new(format!("{}/v1/chat/completions", server.uri()))
            .with_api_key(""),
    );

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Custom), &config)
        .await
        .unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn default_uses_key_from_bundled_resource() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, "OPENROUTER_API_KEY=sk-or-v1-from-file\n").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-or-v1-from-file"))
        .and(header("x-title", TITLE))
        .and(header_exists("http-referer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "  Structured prompt  " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_default(DefaultProviderConfig {
        env_file: Some(env_file),
        base_url: Some(format!("{}/api/v1", server.uri())),
        model: None,
    });

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Default), &config)
        .await
        .unwrap();
    assert_eq!(text, "Structured prompt");

    let body = &received_bodies(&server).await[0];
    assert_eq!(body["reasoning"]["enabled"], true);
    assert_eq!(body["model"], "xiaomi/mimo-v2-flash:free");
}

#[tokio::test]
async fn default_falls_back_to_builtin_key_when_resource_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header(
            "authorization",
            format!("Bearer {FALLBACK_OPENROUTER_KEY}").as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "fallback worked" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_default(DefaultProviderConfig {
        base_url: Some(server.uri()),
        ..missing_env_file(&dir)
    });

    let text = Dispatcher::new()
        .dispatch(&request(Provider::Default), &config)
        .await
        .unwrap();
    assert_eq!(text, "fallback worked");
}

#[tokio::test]
async fn http_errors_carry_provider_message() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "error": { "message": "rate limited" } })),
        )
        .mount(&server)
        .await;

    let keyed = ApiKeyProviderConfig::new("key").with_base_url(server.uri());
    let config = ProviderConfig::default()
        .with_gemini(keyed.clone())
        .with_claude(keyed.clone())
        .with_openai(keyed)
        .with_custom(CustomProviderConfig::new(format!("{}/custom", server.uri())))
        .with_default(DefaultProviderConfig {
            base_url: Some(server.uri()),
            ..missing_env_file(&dir)
        });
    let dispatcher = Dispatcher::new();

    for provider in Provider::ALL {
        let err = dispatcher
            .dispatch(&request(provider), &config)
            .await
            .unwrap_err();
        match err {
            DispatchError::Http { status, message } => {
                assert_eq!(status, 429, "{provider}");
                assert_eq!(message, "rate limited", "{provider}");
            }
            other => panic!("{provider}: expected Http error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn http_error_without_envelope_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let config = ProviderConfig::default().with_custom(
        CustomProviderConfig::new(format!("{}/chat", server.uri())).with_name("LM Studio"),
    );

    let err = Dispatcher::new()
        .dispatch(&request(Provider::Custom), &config)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::Http {
            status: 502,
            message: "LM Studio API Error: Bad Gateway".to_string()
        }
    );
}

#[tokio::test]
async fn unnamed_custom_endpoint_error_uses_default_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let config = ProviderConfig::default()
        .with_custom(CustomProviderConfig::new(format!("{}/chat", server.uri())));

    let err = Dispatcher::new()
        .dispatch(&request(Provider::Custom), &config)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Custom API Error: Bad Gateway");
}

#[tokio::test]
async fn unexpected_shapes_are_malformed_for_strict_providers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let keyed = ApiKeyProviderConfig::new("key").with_base_url(server.uri());
    let config = ProviderConfig::default()
        .with_openai(keyed.clone())
        .with_gemini(keyed);
    let dispatcher = Dispatcher::new();

    for provider in [Provider::OpenAI, Provider::Gemini] {
        let err = dispatcher
            .dispatch(&request(provider), &config)
            .await
            .unwrap_err();
        assert!(
            matches!(err, DispatchError::MalformedResponse(_)),
            "{provider}: {err:?}"
        );
    }
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    let config = ProviderConfig::default()
        .with_openai(ApiKeyProviderConfig::new("key").with_base_url("http://127.0.0.1:1/v1"));

    let err = Dispatcher::new()
        .dispatch(&request(Provider::OpenAI), &config)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DispatchError::Network(
            "Network Error: Could not reach OpenAI. Please check your internet connection."
                .to_string()
        )
    );
}

#[tokio::test]
async fn dropped_connection_error_does_not_leak_gemini_key() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    let config = ProviderConfig::default().with_gemini(
        ApiKeyProviderConfig::new("AIza-SECRET").with_base_url(format!("http://{addr}/v1beta")),
    );

    let err = Dispatcher::new()
        .dispatch(&request(Provider::Gemini), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Network(_)));
    assert!(!err.to_string().contains("AIza-SECRET"), "{err}");
}

#[tokio::test]
async fn repeated_dispatch_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Same answer" } }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let config = ProviderConfig::default()
        .with_openai(ApiKeyProviderConfig::new("key").with_base_url(server.uri()));
    let snapshot = config.clone();
    let dispatcher = Dispatcher::new();
    let req = request(Provider::OpenAI);

    let first = dispatcher.dispatch(&req, &config).await;
    let second = dispatcher.dispatch(&req, &config).await;

    assert_eq!(first, second);
    assert_eq!(first.unwrap(), "Same answer");
    assert_eq!(config, snapshot);
}

#[tokio::test]
async fn handle_round_trips_inbound_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Better." })))
        .mount(&server)
        .await;

    let settings = Settings {
        provider: Some("custom".to_string()),
        providers: ProviderConfig::default()
            .with_custom(CustomProviderConfig::new(format!("{}/x", server.uri()))),
    };
    let message: OptimizeMessage =
        serde_json::from_str(r#"{"action":"optimize_prompt","text":"make it better"}"#).unwrap();

    let response = Dispatcher::new().handle(message, &settings).await;

    assert_eq!(
        response,
        OptimizeResponse::Optimized {
            optimized_text: "Better.".to_string()
        }
    );
}
