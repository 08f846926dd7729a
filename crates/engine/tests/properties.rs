use std::sync::Arc;

use brief_engine::{Card, Engine, EngineConfig, FixedClock, MIN_BULLET_CHARS};
use brief_protocol::{CandidateText, ContentKind, NewsItem};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use proptest::prelude::*;
use regex::Regex;

static ENGINE: Lazy<Engine> = Lazy::new(|| {
    Engine::new(EngineConfig::default())
        .expect("engine")
        .with_clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 8, 7).unwrap())))
});

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap());

const PIECES: &[&str] = &[
    "OpenAI",
    "GPT-4o",
    "Claude 3.5 Sonnet",
    "launched",
    "70B parameters",
    "$12M",
    "94.5%",
    "MMLU",
    "v2.3",
    "3x faster",
    "and",
    "the",
    "with",
    "stay tuned for more",
    "details to follow",
    "subscribe",
    "阿里云",
    "发布",
    "大模型",
    "通义千问2.5",
    "融资1亿元",
    "该事件值得持续关注",
    "更多细节尚未披露",
    "的",
    "。",
    ". ",
    "...",
    "，",
    "\n",
];

fn prose() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => prop::sample::select(PIECES).prop_map(str::to_string),
            1 => "[a-zA-Z0-9 ,.%$]{0,12}",
            1 => "[\u{4e00}-\u{4e2f}，。]{0,8}",
        ],
        0..14,
    )
    .prop_map(|parts| parts.join(" "))
}

fn news_item() -> impl Strategy<Value = NewsItem> {
    (
        prose(),
        prose(),
        prose(),
        prop::collection::vec(prose(), 0..3),
        prop::collection::vec(prose(), 0..3),
        prop::option::of("[a-z]{0,6}( [A-Z][a-z]{2,6})?"),
        prop::option::of("(2025-0[1-9]-1[0-9]|[0-9]{10}|garbage)"),
    )
        .prop_map(|(title, body, summary, observations, effects, source, published)| {
            let mut text = CandidateText::new(title, body);
            text.source_name = source.unwrap_or_default();
            text.published_date = published.unwrap_or_default();
            let mut item = NewsItem::from_text(text);
            item.summary = summary.clone();
            item.facts = vec![summary];
            item.observations = observations.clone();
            item.effects = effects;
            item.drafts = observations;
            item
        })
}

fn banned_in(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    ENGINE
        .config()
        .fragment
        .banned_templates
        .iter()
        .find(|banned| lower.contains(&banned.to_lowercase()))
        .cloned()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn payload_is_total(item in news_item()) {
        let payload = ENGINE.build_payload(&Card::new(item));
        for field in payload.text_fields() {
            prop_assert!(!field.trim().is_empty(), "empty field in {payload:?}");
        }
        prop_assert!(ISO_DATE.is_match(&payload.proof_line), "{}", payload.proof_line);
        for action in &payload.actions {
            prop_assert!(action.chars().count() >= MIN_BULLET_CHARS, "{action}");
        }
        prop_assert!((0.0..=1.0).contains(&payload.zh_ratio));
        prop_assert!((0.0..=1.0).contains(&payload.dedup_ratio));
    }

    #[test]
    fn payload_never_leaks_banned_templates(item in news_item()) {
        let payload = ENGINE.build_payload(&Card::new(item));
        for field in payload.text_fields() {
            prop_assert_eq!(banned_in(field), None, "{}", field);
        }
    }

    #[test]
    fn anchors_are_verbatim(title in prose(), body in prose()) {
        let anchors = ENGINE.extract_anchors(&title, &body);
        prop_assert!(anchors.anchors.len() <= ENGINE.config().anchors.max_anchors);
        prop_assert_eq!(anchors.has_anchor, !anchors.anchors.is_empty());
        for anchor in &anchors.anchors {
            prop_assert!(
                title.contains(&anchor.text) || body.contains(&anchor.text),
                "{:?} not in {:?} / {:?}", anchor.text, title, body
            );
        }
    }

    #[test]
    fn event_gate_is_at_least_as_strict_as_signal(text in prose()) {
        let breakdown = ENGINE.score_density(&text);
        prop_assert!(breakdown.score <= 100);
        let event = ENGINE.gate(&breakdown, ContentKind::Event);
        let corp = ENGINE.gate(&breakdown, ContentKind::Corp);
        let signal = ENGINE.gate(&breakdown, ContentKind::Signal);
        if event.passed {
            prop_assert!(corp.passed);
        }
        if corp.passed {
            prop_assert!(signal.passed);
        }
    }

    #[test]
    fn trimming_never_empties_clean_input(text in prose()) {
        let trimmed = ENGINE.trim_trailing_fragment(&text);
        if !text.trim().is_empty() && !ENGINE.is_fragment(text.trim()) {
            prop_assert!(!trimmed.is_empty(), "{text:?}");
        }
    }
}
