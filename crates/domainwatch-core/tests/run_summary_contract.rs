//! Contract test: run summary output
//!
//! The run summary is the engine's only externally observable output. Its
//! shape must be stable: every tracked domain appears exactly once, sorted
//! by name, with an empty change list when nothing changed and the `error`
//! key omitted when there is none.

mod common;

use common::*;
use domainwatch_core::model::{DomainRecord, LiveSnapshot};
use domainwatch_core::{DomainGateway, MemoryGateway};
use std::sync::Arc;

#[tokio::test]
async fn summary_is_sorted_and_complete() {
    let resolver = MockResolver::new();
    resolver.set_snapshot(blank_snapshot("zzz.com"));
    resolver.set_snapshot(blank_snapshot("aaa.com"));
    resolver.set_snapshot(LiveSnapshot {
        statuses: Some(vec!["serverHold".to_string()]),
        ..LiveSnapshot::new("mmm.com")
    });

    let gateway = Arc::new(MemoryGateway::new());
    for (id, name) in [("d1", "zzz.com"), ("d2", "aaa.com"), ("d3", "mmm.com")] {
        gateway
            .track_domain(&DomainRecord::new(id, name))
            .await
            .unwrap();
    }

    let engine = engine_with(resolver, gateway);
    let summary = engine.run_once().await.unwrap();

    let names: Vec<_> = summary.results.iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(names, vec!["aaa.com", "mmm.com", "zzz.com"]);

    // Quiet domains are present with empty change lists, not omitted.
    assert!(summary.results[0].changes.is_empty());
    assert_eq!(
        summary.results[1].changes,
        vec!["Status added: serverHold".to_string()]
    );
    assert_eq!(summary.note, "processed 3 domain(s), 1 change(s), 0 failure(s)");
}

#[tokio::test]
async fn summary_serializes_with_stable_shape() {
    let resolver = MockResolver::new();
    resolver.set_snapshot(blank_snapshot("ok.com"));
    resolver.set_failure("down.com", "probe refused");

    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .track_domain(&DomainRecord::new("d1", "ok.com"))
        .await
        .unwrap();
    gateway
        .track_domain(&DomainRecord::new("d2", "down.com"))
        .await
        .unwrap();

    let engine = engine_with(resolver, gateway);
    let summary = engine.run_once().await.unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    // Failed domain carries its error verbatim.
    assert_eq!(results[0]["domain"], "down.com");
    assert!(
        results[0]["error"]
            .as_str()
            .unwrap()
            .contains("probe refused")
    );

    // Healthy domain omits the error key entirely.
    assert_eq!(results[1]["domain"], "ok.com");
    assert!(results[1].get("error").is_none());
    assert_eq!(results[1]["changes"].as_array().unwrap().len(), 0);

    assert!(json["note"].as_str().unwrap().contains("1 failure(s)"));
}

#[tokio::test]
async fn abort_applies_to_one_run_only() {
    let resolver = MockResolver::new();
    resolver.set_snapshot(blank_snapshot("a.com"));
    resolver.set_snapshot(blank_snapshot("b.com"));

    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .track_domain(&DomainRecord::new("d1", "a.com"))
        .await
        .unwrap();
    gateway
        .track_domain(&DomainRecord::new("d2", "b.com"))
        .await
        .unwrap();

    let engine = engine_with(resolver, gateway);

    // An abort left over from an earlier run must not poison this one.
    engine.abort_handle().abort();
    let summary = engine.run_once().await.unwrap();

    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.note, "processed 2 domain(s), 0 change(s), 0 failure(s)");
}

#[tokio::test]
async fn many_domains_reconcile_under_bounded_concurrency() {
    let resolver = MockResolver::new();
    let gateway = Arc::new(MemoryGateway::new());

    for i in 0..20 {
        let name = format!("domain{i:02}.com");
        resolver.set_snapshot(LiveSnapshot {
            statuses: Some(vec!["ok".to_string()]),
            ..LiveSnapshot::new(&name)
        });
        gateway
            .track_domain(&DomainRecord::new(format!("d{i}"), &name))
            .await
            .unwrap();
    }

    let engine = engine_with(resolver.clone(), gateway);
    let summary = engine.run_once().await.unwrap();

    assert_eq!(summary.results.len(), 20);
    assert_eq!(resolver.fetch_count(), 20);
    assert!(summary.results.iter().all(|r| r.error.is_none()));
    // Completion order may vary; output order may not.
    let mut sorted = summary.results.clone();
    sorted.sort_by(|a, b| a.domain.cmp(&b.domain));
    assert_eq!(summary.results, sorted);
}
