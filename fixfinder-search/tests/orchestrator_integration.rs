//! Integration tests for the deep search pipeline.
//!
//! Fake adapters stand in for the real sources, so these tests exercise
//! fan-out, timeout isolation, dedup, ranking and the envelope without any
//! network calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fixfinder_search::{
    ArticleResult, DeepSearch, DiscussionResult, SearchError, SearchQuery, SearchRequest,
    SourceAdapter, SourceKind, SourceResult, VideoResult,
};

const WORDS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
];

enum Behaviour {
    Return(Vec<SourceResult>),
    Stall,
    Fail,
}

struct FakeAdapter {
    kind: SourceKind,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakeAdapter {
    fn new(kind: SourceKind, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for FakeAdapter {
    async fn search(
        &self,
        _query: &str,
        max_results: usize,
    ) -> Result<Vec<SourceResult>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Return(results) => Ok(results.iter().take(max_results).cloned().collect()),
            Behaviour::Stall => std::future::pending().await,
            Behaviour::Fail => Err(SearchError::Http("upstream returned 503".into())),
        }
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}

fn make_result(kind: SourceKind, title: &str, relevance: f64) -> SourceResult {
    let url = format!("https://example.com/{}/{}", kind, title.replace(' ', "-"));
    match kind {
        SourceKind::Forums => ArticleResult {
            title: title.into(),
            url,
            source: "example.com".into(),
            snippet: String::new(),
            relevance,
        }
        .into(),
        SourceKind::Discussions => DiscussionResult {
            title: title.into(),
            url,
            community: "fixit".into(),
            score: 12,
            reply_count: 3,
            excerpt: String::new(),
            author: "someone".into(),
            created_at: None,
            relevance,
        }
        .into(),
        SourceKind::Videos => VideoResult {
            title: title.into(),
            url,
            video_id: "abc".into(),
            channel: "channel".into(),
            duration: "4:20".into(),
            views: "1K views".into(),
            thumbnail: "https://i.ytimg.com/vi/abc/hqdefault.jpg".into(),
            transcript: Some("remove the laptop screen bezel".into()),
            relevance,
        }
        .into(),
    }
}

/// `count` results with distinct title keys and scattered relevance.
fn results_for(kind: SourceKind, count: usize) -> Vec<SourceResult> {
    (0..count)
        .map(|i| {
            let title = format!("laptop screen {} {}", kind, WORDS[i % WORDS.len()]);
            make_result(kind, &title, (i as f64 * 0.37) % 1.0)
        })
        .collect()
}

fn query(text: &str, kinds: &[SourceKind], max_results: i64) -> SearchQuery {
    SearchQuery::builder(text)
        .source_kinds(kinds.iter().copied())
        .max_results(max_results)
        .build()
        .expect("valid query")
}

#[tokio::test]
async fn stalled_source_does_not_hold_up_the_others() {
    let forums = FakeAdapter::new(
        SourceKind::Forums,
        Behaviour::Return(results_for(SourceKind::Forums, 3)),
    );
    let stalled = FakeAdapter::new(SourceKind::Discussions, Behaviour::Stall);
    let videos = FakeAdapter::new(
        SourceKind::Videos,
        Behaviour::Return(results_for(SourceKind::Videos, 2)),
    );
    let engine = DeepSearch::empty(Duration::from_millis(200))
        .with_adapter(forums)
        .with_adapter(stalled.clone())
        .with_adapter(videos);

    let started = Instant::now();
    let results = engine
        .execute(&query("laptop screen cracked", SourceKind::all(), 10))
        .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    assert_eq!(stalled.calls(), 1);
    assert!(results.results_for(SourceKind::Discussions).is_empty());
    assert_eq!(results.results_for(SourceKind::Forums).len(), 3);
    assert_eq!(results.results_for(SourceKind::Videos).len(), 2);
    assert_eq!(results.total_results, 5);
}

#[tokio::test]
async fn failing_source_contributes_empty_list() {
    let engine = DeepSearch::empty(Duration::from_secs(5))
        .with_adapter(FakeAdapter::new(SourceKind::Forums, Behaviour::Fail))
        .with_adapter(FakeAdapter::new(
            SourceKind::Videos,
            Behaviour::Return(results_for(SourceKind::Videos, 4)),
        ));

    let results = engine
        .execute(&query("toaster sparks", SourceKind::all(), 10))
        .await;
    assert!(results.results_for(SourceKind::Forums).is_empty());
    assert!(results.results_for(SourceKind::Discussions).is_empty());
    assert_eq!(results.results_for(SourceKind::Videos).len(), 4);
    assert_eq!(results.total_results, 4);
}

#[tokio::test]
async fn cross_source_title_duplicates_collapse_to_first_kind() {
    let shared = "Replace laptop screen hinge";
    let engine = DeepSearch::empty(Duration::from_secs(5))
        .with_adapter(FakeAdapter::new(
            SourceKind::Forums,
            Behaviour::Return(vec![make_result(SourceKind::Forums, shared, 0.2)]),
        ))
        .with_adapter(FakeAdapter::new(
            SourceKind::Discussions,
            Behaviour::Return(vec![make_result(
                SourceKind::Discussions,
                "laptop SCREEN hinge - replace?",
                0.9,
            )]),
        ))
        .with_adapter(FakeAdapter::new(
            SourceKind::Videos,
            Behaviour::Return(vec![
                make_result(SourceKind::Videos, "Hinge replace, laptop screen", 0.8),
                make_result(SourceKind::Videos, "Cracked bezel teardown", 0.5),
            ]),
        ));

    let results = engine
        .execute(&query("laptop hinge", SourceKind::all(), 10))
        .await;
    assert_eq!(results.results_for(SourceKind::Forums).len(), 1);
    assert!(results.results_for(SourceKind::Discussions).is_empty());
    let videos = results.results_for(SourceKind::Videos);
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].title(), "Cracked bezel teardown");
    assert_eq!(results.total_results, 2);
}

#[tokio::test]
async fn envelope_invariants_hold() {
    let mut wild = results_for(SourceKind::Forums, 6);
    wild.push(make_result(SourceKind::Forums, "laptop screen overrated", 4.2));
    wild.push(make_result(SourceKind::Forums, "laptop screen negative", -3.0));

    let engine = DeepSearch::empty(Duration::from_secs(5))
        .with_adapter(FakeAdapter::new(SourceKind::Forums, Behaviour::Return(wild)))
        .with_adapter(FakeAdapter::new(
            SourceKind::Discussions,
            Behaviour::Return(results_for(SourceKind::Discussions, 5)),
        ))
        .with_adapter(FakeAdapter::new(
            SourceKind::Videos,
            Behaviour::Return(results_for(SourceKind::Videos, 7)),
        ));

    let results = engine
        .execute(&query("laptop screen flicker", SourceKind::all(), 10))
        .await;

    let sum: usize = results.results.values().map(Vec::len).sum();
    assert_eq!(results.total_results, sum);
    assert_eq!(results.results.len(), 3);
    for list in results.results.values() {
        assert!(list.len() <= 10);
        assert!(list
            .windows(2)
            .all(|pair| pair[0].relevance() >= pair[1].relevance()));
        assert!(list
            .iter()
            .all(|item| (0.0..=1.0).contains(&item.relevance())));
    }
}

#[tokio::test]
async fn requested_subset_with_max_five() {
    let forums = FakeAdapter::new(
        SourceKind::Forums,
        Behaviour::Return(results_for(SourceKind::Forums, 8)),
    );
    let discussions = FakeAdapter::new(
        SourceKind::Discussions,
        Behaviour::Return(results_for(SourceKind::Discussions, 8)),
    );
    let videos = FakeAdapter::new(
        SourceKind::Videos,
        Behaviour::Return(results_for(SourceKind::Videos, 8)),
    );
    let engine = DeepSearch::empty(Duration::from_secs(5))
        .with_adapter(forums)
        .with_adapter(discussions.clone())
        .with_adapter(videos);

    let results = engine
        .execute(&query(
            "laptop screen cracked",
            &[SourceKind::Forums, SourceKind::Videos],
            5,
        ))
        .await;

    assert_eq!(discussions.calls(), 0);
    assert!(results.results_for(SourceKind::Discussions).is_empty());
    assert_eq!(results.results_for(SourceKind::Forums).len(), 5);
    assert_eq!(results.results_for(SourceKind::Videos).len(), 5);
    assert!(results.total_results <= 10);
}

#[tokio::test]
async fn adapter_returning_too_many_is_truncated() {
    /// Ignores `max_results`.
    struct Greedy;

    #[async_trait]
    impl SourceAdapter for Greedy {
        async fn search(&self, _: &str, _: usize) -> Result<Vec<SourceResult>, SearchError> {
            Ok(results_for(SourceKind::Forums, 8))
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Forums
        }
    }

    let engine = DeepSearch::empty(Duration::from_secs(5)).with_adapter(Arc::new(Greedy));
    let results = engine
        .execute(&query("laptop", &[SourceKind::Forums], 3))
        .await;
    assert_eq!(results.results_for(SourceKind::Forums).len(), 3);
}

#[tokio::test]
async fn blank_query_rejected_before_any_adapter_runs() {
    let forums = FakeAdapter::new(
        SourceKind::Forums,
        Behaviour::Return(results_for(SourceKind::Forums, 2)),
    );
    let engine = DeepSearch::empty(Duration::from_secs(5)).with_adapter(forums.clone());

    for request in [
        SearchRequest {
            query: String::new(),
            ..SearchRequest::default()
        },
        SearchRequest {
            query: "kettle".into(),
            max_results: Some(0),
            ..SearchRequest::default()
        },
        SearchRequest {
            query: "kettle".into(),
            max_results: Some(-2),
            ..SearchRequest::default()
        },
    ] {
        let err = engine.handle(request).await.unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
    }
    assert_eq!(forums.calls(), 0);
}

#[tokio::test]
async fn all_sources_empty_still_timed() {
    let engine = DeepSearch::empty(Duration::from_secs(5))
        .with_adapter(FakeAdapter::new(SourceKind::Forums, Behaviour::Return(Vec::new())))
        .with_adapter(FakeAdapter::new(
            SourceKind::Discussions,
            Behaviour::Return(Vec::new()),
        ))
        .with_adapter(FakeAdapter::new(SourceKind::Videos, Behaviour::Return(Vec::new())));

    let results = engine
        .execute(&query("obscure gadget", SourceKind::all(), 10))
        .await;
    assert_eq!(results.total_results, 0);
    assert!(results.search_time_ms > 0.0);
    assert_eq!(results.query, "obscure gadget");
}

#[tokio::test]
async fn empty_source_list_returns_empty_envelope() {
    let forums = FakeAdapter::new(
        SourceKind::Forums,
        Behaviour::Return(results_for(SourceKind::Forums, 2)),
    );
    let engine = DeepSearch::empty(Duration::from_secs(5)).with_adapter(forums.clone());
    let request = SearchRequest {
        query: "kettle".into(),
        sources: Some(Vec::new()),
        ..SearchRequest::default()
    };

    let results = engine.handle(request).await.expect("ok");
    assert_eq!(results.total_results, 0);
    assert_eq!(forums.calls(), 0);

    let json = serde_json::to_value(&results).expect("serialise");
    for key in ["forums", "discussions", "videos"] {
        assert_eq!(json["results"][key], serde_json::json!([]));
    }
}

#[tokio::test]
async fn unknown_and_alias_source_names() {
    let videos = FakeAdapter::new(
        SourceKind::Videos,
        Behaviour::Return(results_for(SourceKind::Videos, 1)),
    );
    let engine = DeepSearch::empty(Duration::from_secs(5)).with_adapter(videos.clone());
    let request = SearchRequest {
        query: "laptop fan".into(),
        sources: Some(vec!["YouTube".into(), "podcasts".into()]),
        ..SearchRequest::default()
    };

    let results = engine.handle(request).await.expect("ok");
    assert_eq!(videos.calls(), 1);
    assert_eq!(results.total_results, 1);
}

#[tokio::test]
async fn one_engine_serves_concurrent_requests() {
    let engine = DeepSearch::empty(Duration::from_secs(5)).with_adapter(FakeAdapter::new(
        SourceKind::Forums,
        Behaviour::Return(results_for(SourceKind::Forums, 4)),
    ));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .execute(&query(&format!("laptop screen {i}"), &[SourceKind::Forums], 2))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let results = handle.await.expect("task");
        assert_eq!(results.total_results, 2);
    }
}

#[tokio::test]
async fn ranking_is_deterministic() {
    let build = || {
        DeepSearch::empty(Duration::from_secs(5))
            .with_adapter(FakeAdapter::new(
                SourceKind::Forums,
                Behaviour::Return(results_for(SourceKind::Forums, 6)),
            ))
            .with_adapter(FakeAdapter::new(
                SourceKind::Videos,
                Behaviour::Return(results_for(SourceKind::Videos, 6)),
            ))
    };
    let q = query("laptop screen", SourceKind::all(), 10);
    let first = build().execute(&q).await;
    let second = build().execute(&q).await;
    assert_eq!(first.results, second.results);
}
