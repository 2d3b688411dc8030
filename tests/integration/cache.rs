use std::sync::Arc;
use std::time::Duration;
use wikins_cli::cache::{LoadOutcome, NamespaceCache};
use wikins_cli::column::{ColumnType, HeaderColumn, WikiPage};
use wikins_cli::site::HostResolver;
use wikins_cli::test_utils::{StubSource, init_test_logging, sample_table};

fn wikimedia_stub() -> StubSource {
    ["en.wikipedia.org", "de.wikipedia.org", "commons.wikimedia.org", "www.wikidata.org"]
        .into_iter()
        .fold(StubSource::new(), |source, host| source.with_table(host, sample_table()))
        .with_delay(Duration::from_millis(25))
}

/// Two views mount at the same time and render from the shared cache.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_views_render_after_shared_load() {
    init_test_logging(None);
    let source = Arc::new(wikimedia_stub());
    let cache = NamespaceCache::new(source.clone(), HostResolver::default());

    let first_view = vec![
        HeaderColumn::wiki_page("enwiki", Some(14)),
        HeaderColumn::wiki_page("commonswiki", Some(6)),
        HeaderColumn::new(ColumnType::String),
    ];
    let second_view = vec![
        HeaderColumn::wiki_page("commonswiki", Some(6)),
        HeaderColumn::wiki_page("wikidatawiki", Some(0)),
        HeaderColumn::new(ColumnType::Location),
    ];

    let first = {
        let cache = cache.clone();
        let wikis = HeaderColumn::required_wikis(&first_view);
        tokio::spawn(async move { cache.ensure_loaded(wikis).await })
    };
    let second = {
        let cache = cache.clone();
        let wikis = HeaderColumn::required_wikis(&second_view);
        tokio::spawn(async move { cache.ensure_loaded(wikis).await })
    };
    assert!(first.await.unwrap().all_loaded());
    assert!(second.await.unwrap().all_loaded());

    assert_eq!(source.calls_for("commons.wikimedia.org"), 1);
    assert_eq!(source.total_calls(), 3);

    let labels: Vec<String> = first_view.iter().map(|c| c.generate_label(&cache)).collect();
    assert_eq!(labels, ["Enwiki Category", "Commons file", "text"]);

    let labels: Vec<String> = second_view.iter().map(|c| c.generate_label(&cache)).collect();
    assert_eq!(labels, ["Commons file", "Wikidata item", "location"]);

    let cell = WikiPage::in_column("Foo.png", &first_view[1]);
    assert_eq!(cell.display_title(&cache), "File:Foo.png");
    let cell = WikiPage::in_column("Q42", &second_view[1]);
    assert_eq!(cell.display_title(&cache), "Q42");
}

#[tokio::test]
async fn test_partial_failure_keeps_other_wikis() {
    let source = Arc::new(wikimedia_stub());
    let cache = NamespaceCache::new(source.clone(), HostResolver::default());

    let report = cache.ensure_loaded(["enwiki", "frwiki", "", "dewiki"]).await;

    assert_eq!(report.len(), 4);
    assert!(matches!(report.outcome("frwiki"), Some(LoadOutcome::Failed(_))));
    assert_eq!(report.outcome(""), Some(&LoadOutcome::Unresolvable));
    let missing: Vec<&str> = report.missing().map(|(wiki, _)| wiki).collect();
    assert_eq!(missing, ["", "frwiki"]);

    assert_eq!(cache.loaded_wikis(), ["dewiki", "enwiki"]);
    assert_eq!(cache.prefix_with_namespace("frwiki", 6, "Foo.png"), "Foo.png");
    assert_eq!(cache.prefix_with_namespace("dewiki", 6, "Foo.png"), "File:Foo.png");
}

#[tokio::test]
async fn test_configured_host_is_used_for_fetch() {
    let source = Arc::new(StubSource::new().with_table("wiki.local", sample_table()));
    let hosts = HostResolver::with_overrides([("localwiki", "wiki.local")]);
    let cache = NamespaceCache::new(source.clone(), hosts);

    cache.ensure_loaded(["localwiki"]).await;

    assert_eq!(source.calls_for("wiki.local"), 1);
    assert_eq!(cache.prefix_with_namespace("localwiki", 2, "Example"), "User:Example");
}
