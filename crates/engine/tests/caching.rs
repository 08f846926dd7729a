use std::sync::Arc;
use std::thread;

use brief_engine::{Card, Engine, EngineConfig, FixedClock, TokenJaccard};
use brief_protocol::{CandidateText, NewsItem, StatsSnapshot};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn engine() -> Engine {
    Engine::new(EngineConfig::default())
        .expect("engine")
        .with_clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 8, 7).unwrap())))
}

fn launch_card(n: usize) -> Card {
    let mut text = CandidateText::new(
        format!("Example Labs releases Model-{n} v2.1"),
        format!(
            "Example Labs released Model-{n} v2.1 with a 12% latency reduction. \
             The AI model is available to developers today."
        ),
    );
    text.source_name = "Example News".to_string();
    text.url = format!("https://news.example.com/{n}");
    Card::new(NewsItem::from_text(text))
}

#[test]
fn repeated_builds_return_the_same_payload_and_count_once() {
    let engine = engine();
    let card = launch_card(1);

    let first = engine.build_payload(&card);
    let second = engine.build_payload(&card);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);

    let eval = engine.evaluate(&card);
    if let Some(payload) = eval.payload {
        assert!(Arc::ptr_eq(&first, &payload));
    }
    assert_eq!(engine.stats().snapshot().total_processed, 1);
}

#[test]
fn evict_forces_an_identical_rebuild() {
    let engine = engine();
    let mut card = launch_card(2);

    let first = engine.build_payload(&card);
    let evicted = card.evict().expect("payload was cached");
    assert!(Arc::ptr_eq(&first, &evicted));
    assert!(card.cached().is_none());

    let rebuilt = engine.build_payload(&card);
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(*first, *rebuilt);
    assert_eq!(engine.stats().snapshot().total_processed, 2);
}

#[test]
fn reset_starts_a_fresh_run() {
    let engine = engine();
    let _ = engine.build_payload(&launch_card(3));
    assert_ne!(engine.stats().snapshot(), StatsSnapshot::default());
    engine.stats().reset();
    assert_eq!(engine.stats().snapshot(), StatsSnapshot::default());
}

#[test]
fn one_shared_card_is_built_once_across_threads() {
    let engine = Arc::new(engine());
    let card = Arc::new(launch_card(4));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let card = Arc::clone(&card);
            thread::spawn(move || engine.build_payload(&card))
        })
        .collect();
    let payloads: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .collect();

    assert!(payloads.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(engine.stats().snapshot().total_processed, 1);
}

#[test]
fn concurrent_items_share_one_statistics_accumulator() {
    let engine = Arc::new(engine());
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for n in 0..25 {
                    let card = launch_card(worker * 100 + n);
                    let _ = engine.build_payload(&card);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker");
    }

    let stats = engine.stats().snapshot();
    assert_eq!(stats.total_processed, 100);
    assert_eq!(stats.eligible + stats.ineligible, 100);
    assert_eq!(stats.proof_present + stats.proof_missing, 100);
}

#[test]
fn payloads_do_not_depend_on_thread_scheduling() {
    let engine = Arc::new(engine());
    let sequential: Vec<_> = (0..10)
        .map(|n| (*engine.build_payload(&launch_card(n))).clone())
        .collect();

    let handles: Vec<_> = (0..10)
        .map(|n| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || (*engine.build_payload(&launch_card(n))).clone())
        })
        .collect();
    let parallel: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn similarity_backend_is_swappable() {
    let engine = Engine::with_similarity(EngineConfig::default(), Arc::new(TokenJaccard))
        .expect("engine");
    assert_eq!(engine.compactor().similarity().name(), "token_jaccard");
    let payload = engine.build_payload(&launch_card(5));
    assert!(!payload.lead.is_empty());
}
