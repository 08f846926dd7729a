//! Report sentence templates.
//!
//! Every template only rearranges values already present on the item (title, source,
//! date, anchors, list fields). None of them states a fact of its own.

use brief_protocol::{AnchorType, Channel};

/// Literal text of every template below. Config validation refuses banned strings that
/// would match one of these, so a fallback can never trip the banned list.
pub(crate) const FIXED_PHRASES: &[&str] = &[
    "报道，",
    "，涉及金额 ",
    "，对应版本为 ",
    "，并给出 ",
    " 基准成绩。",
    "，模型参数规模为 ",
    "，关键指标为 ",
    "于",
    "报道：",
    "要点：",
    "该消息由",
    "发布，归入",
    "动态。",
    "从产品层面看，",
    "将影响用户的选型与使用评估。",
    "从技术层面看，",
    "为模型能力与工程实践提供了新的参照。",
    "从商业层面看，",
    "涉及市场格局与投资判断。",
    "从开发者层面看，",
    "关系到工具链与集成方式的选择。",
    "影响要点：",
    "可核验数据：",
    "目前公开信息有限，影响范围以",
    "后续披露为准。",
    "跟进：",
    "风险提示：",
    "持续跟踪",
    "的后续进展（",
    "核对",
    "原文与官方渠道信息，确认关键数据。",
    "评估",
    "对现有业务与技术路线的潜在影响。",
    "相关信息仍以",
    "报道为准，存在后续更新的可能。",
    "关键数据尚待官方或第三方独立验证（截至",
    "资讯（",
    "未注明来源",
];

pub(crate) const UNNAMED_SOURCE: &str = "未注明来源";

#[derive(Debug, Clone, Copy)]
pub(crate) struct TemplateContext<'a> {
    pub subject: &'a str,
    pub source: &'a str,
    pub date: &'a str,
    pub channel: Channel,
}

pub(crate) fn channel_label(channel: Channel) -> &'static str {
    match channel {
        Channel::Product => "产品",
        Channel::Tech => "技术",
        Channel::Business => "商业",
        Channel::Dev => "开发者",
    }
}

/// Lead sentence carrying the primary anchor; `None` selects the generic fallback.
pub(crate) fn anchor_lead(ctx: &TemplateContext<'_>, anchor: Option<(AnchorType, &str)>) -> String {
    let TemplateContext {
        subject, source, ..
    } = *ctx;
    match anchor {
        Some((AnchorType::Money, anchor)) => format!("{source}报道，{subject}，涉及金额 {anchor}。"),
        Some((AnchorType::Product | AnchorType::Version, anchor)) => {
            format!("{source}报道，{subject}，对应版本为 {anchor}。")
        }
        Some((AnchorType::Benchmark, anchor)) => {
            format!("{source}报道，{subject}，并给出 {anchor} 基准成绩。")
        }
        Some((AnchorType::Params, anchor)) => {
            format!("{source}报道，{subject}，模型参数规模为 {anchor}。")
        }
        Some((AnchorType::Metric, anchor)) => format!("{source}报道，{subject}，关键指标为 {anchor}。"),
        None => format!("{source}于{}报道：{subject}。", ctx.date),
    }
}

/// Second lead sentence built from a verbatim source fact, or the item's own metadata.
pub(crate) fn lead_detail(ctx: &TemplateContext<'_>, fact: Option<&str>) -> String {
    match fact {
        Some(fact) => format!("要点：{}", terminate(fact)),
        None => format!(
            "该消息由{}于{}发布，归入{}动态。",
            ctx.source,
            ctx.date,
            channel_label(ctx.channel)
        ),
    }
}

pub(crate) fn channel_impact(ctx: &TemplateContext<'_>) -> String {
    let subject = ctx.subject;
    match ctx.channel {
        Channel::Product => format!("从产品层面看，「{subject}」将影响用户的选型与使用评估。"),
        Channel::Tech => format!("从技术层面看，「{subject}」为模型能力与工程实践提供了新的参照。"),
        Channel::Business => format!("从商业层面看，「{subject}」涉及市场格局与投资判断。"),
        Channel::Dev => format!("从开发者层面看，「{subject}」关系到工具链与集成方式的选择。"),
    }
}

pub(crate) fn impact_detail(ctx: &TemplateContext<'_>, effect: Option<&str>, anchors: &[&str]) -> String {
    if let Some(effect) = effect {
        return format!("影响要点：{}", terminate(effect));
    }
    if !anchors.is_empty() {
        return format!("可核验数据：{}。", anchors.join("、"));
    }
    format!("目前公开信息有限，影响范围以{}后续披露为准。", ctx.source)
}

pub(crate) fn framed_action(text: &str) -> String {
    format!("跟进：{}", terminate(text))
}

pub(crate) fn framed_risk(text: &str) -> String {
    format!("风险提示：{}", terminate(text))
}

/// Deterministic per-slot action when the item has too few usable observations.
pub(crate) fn fallback_action(ctx: &TemplateContext<'_>, slot: usize) -> String {
    let TemplateContext {
        subject,
        source,
        date,
        ..
    } = *ctx;
    match slot {
        0 => format!("持续跟踪「{subject}」的后续进展（{date}）。"),
        1 => format!("核对{source}原文与官方渠道信息，确认关键数据。"),
        _ => format!("评估「{subject}」对现有业务与技术路线的潜在影响。"),
    }
}

pub(crate) fn fallback_risk(ctx: &TemplateContext<'_>, slot: usize) -> String {
    let TemplateContext {
        subject,
        source,
        date,
        ..
    } = *ctx;
    match slot {
        0 => format!("「{subject}」相关信息仍以{source}报道为准，存在后续更新的可能。"),
        _ => format!("关键数据尚待官方或第三方独立验证（截至{date}）。"),
    }
}

/// Title of last resort when neither the title nor the body yields one.
pub(crate) fn fallback_title(source: &str, date: &str) -> String {
    format!("{source}资讯（{date}）")
}

/// Append a terminator matching the sentence's script when it has none.
pub(crate) fn terminate(sentence: &str) -> String {
    let trimmed = sentence.trim();
    if crate::text::ends_with_terminal(trimmed) {
        return trimmed.to_string();
    }
    let ends_cjk = trimmed.chars().last().is_some_and(crate::text::is_cjk);
    if ends_cjk || crate::text::cjk_ratio(trimmed) >= 0.5 {
        format!("{trimmed}。")
    } else {
        format!("{trimmed}.")
    }
}

/// Join two sentences, adding a space only between Latin sentences.
pub(crate) fn join_sentences(first: &str, second: &str) -> String {
    let first = terminate(first);
    let second = terminate(second);
    let cjk_boundary = first.chars().last().is_some_and(crate::text::is_cjk_punct)
        || second.chars().next().is_some_and(crate::text::is_cjk);
    if cjk_boundary {
        format!("{first}{second}")
    } else {
        format!("{first} {second}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext<'static> {
        TemplateContext {
            subject: "OpenAI 发布 GPT-5",
            source: "Example News",
            date: "2025-08-07",
            channel: Channel::Product,
        }
    }

    #[test]
    fn anchor_lead_embeds_anchor_verbatim() {
        let lead = anchor_lead(&ctx(), Some((AnchorType::Money, "$0.003")));
        assert!(lead.contains("$0.003"), "{lead}");
        assert!(lead.contains("OpenAI 发布 GPT-5"), "{lead}");
    }

    #[test]
    fn fallback_lead_carries_date() {
        let lead = anchor_lead(&ctx(), None);
        assert!(lead.contains("2025-08-07"), "{lead}");
    }

    #[test]
    fn fallback_slots_differ() {
        let ctx = ctx();
        let actions: Vec<String> = (0..3).map(|slot| fallback_action(&ctx, slot)).collect();
        assert_ne!(actions[0], actions[1]);
        assert_ne!(actions[1], actions[2]);
        assert_ne!(fallback_risk(&ctx, 0), fallback_risk(&ctx, 1));
        for text in actions {
            assert!(text.chars().count() >= 12, "{text}");
        }
    }

    #[test]
    fn join_uses_space_only_for_latin() {
        assert_eq!(join_sentences("First one", "Second one."), "First one. Second one.");
        assert_eq!(join_sentences("第一句", "第二句"), "第一句。第二句。");
    }

    #[test]
    fn fixed_phrases_cover_template_literals() {
        let rendered = fallback_action(&ctx(), 1);
        assert!(FIXED_PHRASES.iter().any(|p| rendered.contains(p)));
    }
}
