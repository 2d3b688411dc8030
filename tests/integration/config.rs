use std::time::Duration;
use tempfile::TempDir;
use wikins_cli::cache::NamespaceCache;
use wikins_cli::config::WikinsConfig;
use wikins_cli::core::{WikinsError, user_friendly_error};

#[tokio::test]
async fn test_config_file_drives_hosts_and_cache() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    tokio::fs::write(
        &config_path,
        r#"
fetch_timeout_secs = 5
cache_ttl_secs = 600

[hosts]
commonswiki = "commons.example.org"
localwiki = "wiki.local"
"#,
    )
    .await
    .unwrap();

    let config = WikinsConfig::load_with_optional(Some(config_path)).await.unwrap();
    assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
    assert_eq!(config.cache_ttl(), Some(Duration::from_secs(600)));

    let cache = NamespaceCache::from_config(&config).unwrap();
    assert_eq!(cache.hosts().resolve_host("commonswiki").as_deref(), Some("commons.example.org"));
    assert_eq!(cache.hosts().resolve_host("localwiki").as_deref(), Some("wiki.local"));
    assert_eq!(cache.hosts().resolve_host("enwiki").as_deref(), Some("en.wikipedia.org"));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_empty_host_override_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    tokio::fs::write(&config_path, "[hosts]\nbrokenwiki = \"\"\n").await.unwrap();

    let err = WikinsConfig::load_from(&config_path).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<WikinsError>(), Some(WikinsError::ConfigError { .. })));

    let ctx = user_friendly_error(err);
    assert!(ctx.suggestion.unwrap().contains("config init"));
}
