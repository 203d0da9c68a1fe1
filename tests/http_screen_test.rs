use anyhow::Result;
use httpmock::prelude::*;
use screen_wiring::adapters::{HttpSource, LocalStoreSource, NullSurface};
use screen_wiring::app::{assemble, Sources, Wiring};
use screen_wiring::core::parse::JsonFieldParser;
use screen_wiring::core::TriggerOutcome;
use screen_wiring::{
    build_screen, AppConfig, BusyPolicy, FetchError, MergePolicy, ScreenError, Variant, ViewState,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_mvp_screen_from_toml_with_real_http() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/posts/1")
            .header("Accept", "application/json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"id": 1, "title": "First Post", "userId": 1}));
    });

    let toml_content = format!(
        r#"
[screen]
name = "posts"
variant = "mvp"
surface = "null"

[network]
endpoint = "{}"
timeout_seconds = 5
headers = {{ Accept = "application/json" }}

[parser]
kind = "json"
pointer = "/title"
"#,
        server.url("/posts/1")
    );

    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("screen.toml");
    tokio::fs::write(&config_path, toml_content).await?;

    let config = AppConfig::from_file(&config_path)?;
    let screen = build_screen(&config)?;

    assert_eq!(screen.variant(), Variant::Mvp);
    assert_eq!(screen.load().await, TriggerOutcome::Delivered { request_id: 1 });
    api_mock.assert();
    assert_eq!(screen.view().last_value().unwrap(), "First Post");
    Ok(())
}

#[tokio::test]
async fn test_viper_screen_reads_store_when_network_errors() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/feed");
        then.status(500);
    });

    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("feed.json"),
        r#"{"title": "Cached Post"}"#,
    )?;
    let store_path = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let toml_content = format!(
        r#"
[screen]
name = "feed"
variant = "viper"
surface = "null"

[network]
endpoint = "{}"

[store]
base_path = "{}"
key = "feed.json"

[parser]
kind = "json"
pointer = "/title"

[viper]
merge_policy = "fallback"
"#,
        server.url("/feed"),
        store_path
    );
    let config = AppConfig::from_toml_str(&toml_content)?;
    let screen = build_screen(&config)?;

    // 載入走網路，500 會變成錯誤狀態
    assert_eq!(screen.load().await, TriggerOutcome::Failed { request_id: 1 });
    api_mock.assert();
    assert_eq!(
        screen.view().state(),
        ViewState::Failed(ScreenError::Fetch(FetchError::Status {
            source_name: "network".to_string(),
            status: 500
        }))
    );

    // 顯示後走本地儲存
    assert_eq!(
        screen.appear().await,
        Some(TriggerOutcome::Delivered { request_id: 2 })
    );
    assert_eq!(screen.view().last_value().unwrap(), "Cached Post");
    Ok(())
}

#[tokio::test]
async fn test_slow_endpoint_surfaces_timeout() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .delay(Duration::from_millis(1500))
            .body(r#"{"title": "too late"}"#);
    });

    let network = HttpSource::with_options(
        server.url("/slow"),
        reqwest::Method::GET,
        HashMap::new(),
        Duration::from_millis(200),
    )?;
    let temp_dir = TempDir::new()?;
    let wiring = Wiring {
        name: "slow".to_string(),
        variant: Variant::Mvvm,
        parser: Arc::new(JsonFieldParser::new("/title")),
        busy_policy: BusyPolicy::Reject,
        merge_policy: MergePolicy::Sequence,
    };
    let sources = Sources {
        network: Box::new(network),
        store: Box::new(LocalStoreSource::new(temp_dir.path(), "unused.json")),
    };
    let screen = assemble(&wiring, sources, Box::new(NullSurface));

    assert_eq!(screen.load().await, TriggerOutcome::Failed { request_id: 1 });
    match screen.view().state() {
        ViewState::Failed(ScreenError::Fetch(err)) => assert!(err.is_timeout(), "{:?}", err),
        other => panic!("expected timeout, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_every_variant_renders_the_same_http_payload() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/posts/2");
        then.status(200)
            .json_body(serde_json::json!({"id": 2, "title": "Second Post"}));
    });

    let toml_content = format!(
        r#"
[screen]
surface = "null"

[network]
endpoint = "{}"

[parser]
kind = "json"
pointer = "/title"
"#,
        server.url("/posts/2")
    );
    let config = AppConfig::from_toml_str(&toml_content)?;

    for variant in Variant::ALL {
        let screen = screen_wiring::build_screen_as(&config, variant)?;
        assert!(screen.load().await.is_delivered(), "{}", variant);
        assert_eq!(screen.view().last_value().unwrap(), "Second Post");
    }
    api_mock.assert_hits(4);
    Ok(())
}
