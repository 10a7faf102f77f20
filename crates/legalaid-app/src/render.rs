//! Plain-text rendering for the terminal.

use std::fmt::Write;

use legalaid_chat::{CategoryFilter, ScenarioPopup, TopicCard, TOPIC_CARDS};
use legalaid_client::HealthStatus;
use legalaid_core::{AssistantPayload, Message, MessagePayload};

/// Topic cards admitted by `filter`, numbered by position in the full list.
pub fn topic_list(filter: CategoryFilter) -> String {
    let mut out = format!("Topics ({filter}):\n");
    for (i, card) in TOPIC_CARDS.iter().enumerate() {
        if filter.admits(card.category) {
            let _ = writeln!(out, "  {:>2}. {}", i + 1, card_line(card));
        }
    }
    out
}

fn card_line(card: &TopicCard) -> String {
    format!(
        "{} - {} [{}, {}]",
        card.title, card.description, card.category, card.complexity
    )
}

pub fn scenario_list(popup: &ScenarioPopup) -> String {
    let mut out = format!("{} ({}):\n", popup.card_title, popup.category);
    if popup.scenarios.is_empty() {
        out.push_str("  No scenarios available right now.\n");
        return out;
    }
    for (i, scenario) in popup.scenarios.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, scenario.title);
        if !scenario.description.is_empty() {
            let _ = writeln!(out, "     {}", scenario.description);
        }
    }
    out.push_str("Use /pick <n> to use one, or /close.\n");
    out
}

/// One conversation entry, prefixed with its 1-based history position.
pub fn message(position: usize, message: &Message) -> String {
    let time = message.timestamp.format("%H:%M:%S");
    match &message.payload {
        MessagePayload::User(text) => format!("[{position}] You ({time}): {text}\n"),
        MessagePayload::Assistant(payload) => {
            format!("[{position}] Legal Expert Analysis ({time})\n{}", answer(payload))
        }
    }
}

fn answer(payload: &AssistantPayload) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}", payload.analysis_preamble());
    let _ = writeln!(out, "\n  In Simple Terms:\n    {}", payload.answer);

    if !payload.suggestion.is_empty() {
        let _ = writeln!(out, "\n  Suggestion:\n    {}", payload.suggestion);
    }

    if !payload.applicable_laws.is_empty() {
        let _ = writeln!(out, "\n  Applicable Laws & Regulations:");
        for law in &payload.applicable_laws {
            let _ = writeln!(out, "    - {} ({})", law.name, law.section);
            if !law.description.is_empty() {
                let _ = writeln!(out, "      {}", law.description);
            }
        }
    }

    if !payload.action_plan.is_empty() {
        let _ = writeln!(out, "\n  Action Plan:");
        for (i, step) in payload.action_plan.iter().enumerate() {
            let _ = writeln!(out, "    {}. {}", i + 1, step);
        }
    }

    if !payload.reasoning.is_empty() {
        let _ = writeln!(out, "\n  Reasoning: {}", payload.reasoning);
    }
    out
}

/// Health line, followed by the supported categories when known.
pub fn health(status: &HealthStatus, categories: &[String]) -> String {
    let mut out = if status.is_healthy() {
        format!("Backend is healthy ({} rules loaded)", status.rules_loaded)
    } else {
        format!("Backend reports status \"{}\"", status.status)
    };
    if !categories.is_empty() {
        let _ = write!(out, "\nCategories: {}", categories.join(", "));
    }
    out
}
