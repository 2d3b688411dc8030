use super::*;
use crate::test_utils::{StubSource, init_test_logging, sample_table};

const EN: &str = "en.wikipedia.org";
const DE: &str = "de.wikipedia.org";
const FR: &str = "fr.wikipedia.org";
const COMMONS: &str = "commons.wikimedia.org";

fn stub() -> StubSource {
    StubSource::new()
        .with_table(EN, sample_table())
        .with_table(DE, sample_table())
        .with_table(FR, sample_table())
        .with_table(COMMONS, sample_table())
}

fn cache_with(source: &Arc<StubSource>) -> NamespaceCache {
    init_test_logging(None);
    NamespaceCache::new(source.clone(), HostResolver::default())
}

#[tokio::test]
async fn test_empty_request_makes_no_calls() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    let report = cache.ensure_loaded(Vec::<String>::new()).await;

    assert!(report.is_empty());
    assert!(report.all_loaded());
    assert_eq!(source.total_calls(), 0);
}

#[tokio::test]
async fn test_fetches_each_missing_wiki_once() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    let report = cache.ensure_loaded(["enwiki", "commonswiki", "enwiki"]).await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(report.outcome("commonswiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(source.calls_for(EN), 1);
    assert_eq!(source.calls_for(COMMONS), 1);
    assert!(cache.is_loaded("enwiki"));
    assert!(!cache.is_pending("enwiki"));
}

#[tokio::test]
async fn test_cached_wikis_are_not_fetched_again() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    cache.ensure_loaded(["enwiki"]).await;
    let report = cache.ensure_loaded(["enwiki"]).await;

    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Cached));
    assert_eq!(report.fetch_count(), 0);
    assert_eq!(source.calls_for(EN), 1);
}

#[tokio::test]
async fn test_overlapping_parallel_requests_share_fetches() {
    let source = Arc::new(stub().with_delay(Duration::from_millis(50)));
    let cache = cache_with(&source);

    let (first, second) = tokio::join!(
        cache.ensure_loaded(["enwiki", "dewiki"]),
        cache.ensure_loaded(["dewiki", "frwiki"]),
    );

    assert_eq!(source.calls_for(EN), 1);
    assert_eq!(source.calls_for(DE), 1);
    assert_eq!(source.calls_for(FR), 1);
    assert_eq!(first.outcome("dewiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(second.outcome("dewiki"), Some(&LoadOutcome::Awaited));
    assert!(first.all_loaded());
    assert!(second.all_loaded());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_tasks_fetch_once() {
    let source = Arc::new(stub().with_delay(Duration::from_millis(20)));
    let cache = cache_with(&source);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.ensure_loaded(["enwiki", "commonswiki"]).await })
        })
        .collect();

    for handle in handles {
        let report = handle.await.unwrap();
        assert!(report.all_loaded(), "report: {report:?}");
    }

    assert_eq!(source.calls_for(EN), 1);
    assert_eq!(source.calls_for(COMMONS), 1);
}

#[tokio::test]
async fn test_failure_does_not_abort_siblings() {
    let source = Arc::new(stub().failing_first(DE, 1));
    let cache = cache_with(&source);

    let report = cache.ensure_loaded(["enwiki", "dewiki", "frwiki"]).await;

    assert!(matches!(report.outcome("dewiki"), Some(LoadOutcome::Failed(_))));
    assert!(report.outcome("enwiki").unwrap().is_loaded());
    assert!(report.outcome("frwiki").unwrap().is_loaded());
    assert_eq!(report.missing().count(), 1);
    assert!(!cache.is_loaded("dewiki"));
    assert!(!cache.is_pending("dewiki"));
}

#[tokio::test]
async fn test_failed_wiki_is_retried_on_next_request() {
    let source = Arc::new(stub().failing_first(EN, 1));
    let cache = cache_with(&source);

    let first = cache.ensure_loaded(["enwiki"]).await;
    let second = cache.ensure_loaded(["enwiki"]).await;

    assert!(matches!(first.outcome("enwiki"), Some(LoadOutcome::Failed(_))));
    assert_eq!(second.outcome("enwiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(source.calls_for(EN), 2);
    assert_eq!(cache.prefix_with_namespace("enwiki", 6, "Foo.png"), "File:Foo.png");
}

#[tokio::test]
async fn test_waiters_of_failed_fetch_do_not_refetch() {
    let source = Arc::new(stub().with_delay(Duration::from_millis(30)).failing_first(EN, 1));
    let cache = cache_with(&source);

    let (first, second) =
        tokio::join!(cache.ensure_loaded(["enwiki"]), cache.ensure_loaded(["enwiki"]));

    assert!(matches!(first.outcome("enwiki"), Some(LoadOutcome::Failed(_))));
    assert_eq!(second.outcome("enwiki"), Some(&LoadOutcome::Unavailable));
    assert_eq!(source.calls_for(EN), 1);
    assert!(!cache.is_pending("enwiki"));
}

#[tokio::test]
async fn test_unresolvable_wiki_is_skipped() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    let report = cache.ensure_loaded(["", "foo", "enwiki"]).await;

    assert_eq!(report.outcome(""), Some(&LoadOutcome::Unresolvable));
    assert_eq!(report.outcome("foo"), Some(&LoadOutcome::Unresolvable));
    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(source.total_calls(), 1);
    assert!(!cache.is_pending("foo"));
    assert_eq!(cache.prefix_with_namespace("foo", 6, "Bar"), "Bar");
}

#[tokio::test]
async fn test_fetch_timeout_clears_pending() {
    let source = Arc::new(stub().with_delay(Duration::from_secs(10)));
    let cache = cache_with(&source).with_fetch_timeout(Duration::from_millis(50));

    let report = cache.ensure_loaded(["enwiki"]).await;

    assert!(matches!(
        report.outcome("enwiki"),
        Some(LoadOutcome::Failed(WikinsError::FetchTimeout { .. }))
    ));
    assert!(!cache.is_pending("enwiki"));
    assert!(!cache.is_loaded("enwiki"));
}

#[tokio::test]
async fn test_cancelled_fetch_clears_pending() {
    let source = Arc::new(stub().with_delay(Duration::from_millis(500)));
    let cache = cache_with(&source);

    let cancelled =
        tokio::time::timeout(Duration::from_millis(20), cache.ensure_loaded(["enwiki"])).await;
    assert!(cancelled.is_err());
    assert!(!cache.is_pending("enwiki"));

    let report = cache.ensure_loaded(["enwiki"]).await;
    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(source.calls_for(EN), 2);
}

#[tokio::test(start_paused = true)]
async fn test_pending_wait_times_out_without_refetch() {
    let source = Arc::new(stub().with_delay(Duration::from_secs(3600)));
    let cache = cache_with(&source).with_fetch_timeout(Duration::from_secs(10));

    // Start a fetch that stays in flight because nothing polls it again
    let mut held = Box::pin(cache.ensure_loaded(["enwiki"]));
    assert!(futures::poll!(&mut held).is_pending());
    assert!(cache.is_pending("enwiki"));
    assert_eq!(source.calls_for(EN), 1);

    let started = tokio::time::Instant::now();
    let report = cache.ensure_loaded(["enwiki"]).await;

    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Unavailable));
    assert!(started.elapsed() >= pending_state_timeout(Duration::from_secs(10)));
    assert_eq!(source.calls_for(EN), 1);
    assert!(cache.is_pending("enwiki"));

    drop(held);
    assert!(!cache.is_pending("enwiki"));
    assert!(!cache.is_loaded("enwiki"));
}

#[tokio::test]
async fn test_whitespace_variants_are_not_merged() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    let report = cache.ensure_loaded(["enwiki", " enwiki", "enwiki "]).await;

    assert_eq!(report.len(), 3);
    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(report.outcome(" enwiki"), Some(&LoadOutcome::Unresolvable));
    assert_eq!(report.outcome("enwiki "), Some(&LoadOutcome::Unresolvable));
    assert_eq!(source.calls_for(EN), 1);
    assert_eq!(cache.loaded_wikis(), ["enwiki"]);
}

#[tokio::test]
async fn test_prefix_with_namespace() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);
    cache.ensure_loaded(["commonswiki"]).await;

    assert_eq!(cache.prefix_with_namespace("commonswiki", 0, "Foo"), "Foo");
    assert_eq!(cache.prefix_with_namespace("commonswiki", 6, "Foo.png"), "File:Foo.png");
    assert_eq!(cache.prefix_with_namespace("commonswiki", 14, "Maps"), "Category:Maps");
}

#[tokio::test]
async fn test_prefix_cache_miss_returns_bare_title() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);
    cache.ensure_loaded(["enwiki"]).await;

    // unknown namespace on a loaded wiki
    assert_eq!(cache.prefix_with_namespace("enwiki", 4242, "Foo"), "Foo");
    // wiki never loaded
    assert_eq!(cache.prefix_with_namespace("dewiki", 6, "Foo.png"), "Foo.png");
    // main namespace needs no lookup
    assert_eq!(cache.prefix_with_namespace("dewiki", 0, "Foo"), "Foo");
    assert_eq!(source.calls_for(DE), 0);
}

#[tokio::test]
async fn test_try_prefix_reports_misses() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    let err = cache.try_prefix_with_namespace("dewiki", 6, "Foo.png").unwrap_err();
    assert_eq!(
        err,
        WikinsError::NamespaceLookupFailed {
            wiki: "dewiki".to_string(),
            namespace_id: 6,
        }
    );
    assert_eq!(cache.try_prefix_with_namespace("dewiki", 0, "Foo").unwrap(), "Foo");
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    cache.ensure_loaded(["enwiki"]).await;
    assert!(cache.invalidate("enwiki"));
    assert!(!cache.invalidate("enwiki"));
    assert!(!cache.is_loaded("enwiki"));

    let report = cache.ensure_loaded(["enwiki"]).await;
    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(source.calls_for(EN), 2);
}

#[tokio::test]
async fn test_clear_keeps_nothing_loaded() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);

    cache.ensure_loaded(["enwiki", "dewiki"]).await;
    assert_eq!(cache.loaded_wikis(), vec!["dewiki".to_string(), "enwiki".to_string()]);

    cache.clear();
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_expired_entries_are_refetched() {
    let source = Arc::new(stub());
    let cache = cache_with(&source).with_ttl(Some(Duration::from_millis(30)));

    cache.ensure_loaded(["enwiki"]).await;
    assert!(cache.is_loaded("enwiki"));

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!cache.is_loaded("enwiki"));
    assert_eq!(cache.prefix_with_namespace("enwiki", 6, "Foo.png"), "Foo.png");

    let report = cache.ensure_loaded(["enwiki"]).await;
    assert_eq!(report.outcome("enwiki"), Some(&LoadOutcome::Fetched));
    assert_eq!(source.calls_for(EN), 2);
}

#[tokio::test]
async fn test_clones_share_entries() {
    let source = Arc::new(stub());
    let cache = cache_with(&source);
    let other = cache.clone();

    cache.ensure_loaded(["enwiki"]).await;
    assert!(other.is_loaded("enwiki"));
    assert_eq!(other.ensure_loaded(["enwiki"]).await.fetch_count(), 0);
}
