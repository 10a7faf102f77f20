//! Command execution for the terminal client.

use std::sync::Arc;

use legalaid_chat::{find_card, ChatError, ChatOrchestrator, PendingQuery, TOPIC_CARDS};
use legalaid_client::LegalBackend;
use legalaid_core::{MessageId, NarrationSection, Role};
use legalaid_speech::SpeakOutcome;

use crate::command::{CardRef, Command, HELP};
use crate::render;

/// Result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep reading input; print the text if non-empty.
    Continue(String),
    Quit,
}

impl Step {
    fn say(text: impl Into<String>) -> Self {
        Step::Continue(text.into())
    }
}

pub struct Repl {
    chat: Arc<ChatOrchestrator>,
    backend: Arc<dyn LegalBackend>,
}

impl Repl {
    pub fn new(chat: Arc<ChatOrchestrator>, backend: Arc<dyn LegalBackend>) -> Self {
        Self { chat, backend }
    }

    pub async fn execute(&self, command: Command) -> Step {
        match command {
            Command::Nothing => Step::say(""),
            Command::Ask(text) => {
                // A rejected question must not stay in the draft, or every
                // later question would be appended to it and rejected too.
                let previous = self.chat.draft();
                self.chat.append_to_draft(&text);
                match self.chat.begin_send() {
                    Ok(pending) => self.dispatch(pending),
                    Err(e) => {
                        self.chat.set_draft(previous);
                        Step::say(e.to_string())
                    }
                }
            }
            Command::Send => match self.chat.begin_send() {
                Ok(pending) => self.dispatch(pending),
                Err(e) => Step::say(e.to_string()),
            },
            Command::Topics(filter) => Step::say(render::topic_list(filter)),
            Command::Open(card) => self.open(card).await,
            Command::Pick(n) => match self.chat.select_scenario(n.saturating_sub(1)) {
                Ok(scenario) => Step::say(format!(
                    "Draft: {}\nEdit with more text or /send it.",
                    scenario.query
                )),
                Err(ChatError::ScenarioOutOfRange { available, .. }) => {
                    Step::say(format!("No scenario {n}; there are {available}."))
                }
                Err(e) => Step::say(e.to_string()),
            },
            Command::Close => {
                self.chat.close_scenarios();
                Step::say("")
            }
            Command::Draft => {
                let draft = self.chat.draft();
                let interim = self.chat.speech_input().interim_text;
                let mut out = if draft.is_empty() {
                    "Draft is empty.".to_string()
                } else {
                    format!("Draft: {draft}")
                };
                if !interim.is_empty() {
                    out.push_str(&format!("\n(hearing: {interim})"));
                }
                Step::say(out)
            }
            Command::ClearDraft => {
                self.chat.clear_draft();
                Step::say("Draft cleared.")
            }
            Command::Reset => {
                self.chat.reset();
                Step::say("Started a new conversation.")
            }
            Command::History => Step::say(self.history()),
            Command::Speak { section, message } => self.speak(section, message),
            Command::StopSpeaking => {
                self.chat.stop_speaking();
                Step::say("")
            }
            Command::Listen => match self.chat.toggle_listening() {
                Ok(true) => Step::say("Listening... use /listen again to stop."),
                Ok(false) => Step::say("Stopped listening."),
                Err(e) => Step::say(e.to_string()),
            },
            Command::Health => match self.backend.health().await {
                Ok(status) => {
                    let categories = self.backend.categories().await.unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Failed to list backend categories");
                        Vec::new()
                    });
                    Step::say(render::health(&status, &categories))
                }
                Err(e) => Step::say(format!("Backend unreachable: {e}")),
            },
            Command::Help => Step::say(HELP),
            Command::Quit => Step::Quit,
        }
    }

    /// Finish `pending` on a background task; the answer prints on arrival.
    fn dispatch(&self, pending: PendingQuery) -> Step {
        let category = pending.category;

        let chat = Arc::clone(&self.chat);
        tokio::spawn(async move {
            let answer = chat.finish_send(pending).await;
            let position = chat
                .messages()
                .iter()
                .position(|m| m.id == answer.id)
                .map(|i| i + 1)
                .unwrap_or(0);
            println!("{}", render::message(position, &answer));
        });

        Step::say(format!("Asking about {category}..."))
    }

    async fn open(&self, card: CardRef) -> Step {
        let title = match card {
            CardRef::Number(n) => match n.checked_sub(1).and_then(|i| TOPIC_CARDS.get(i)) {
                Some(card) => card.title.to_string(),
                None => {
                    return Step::say(format!(
                        "No topic {n}; there are {} (see /topics).",
                        TOPIC_CARDS.len()
                    ))
                }
            },
            CardRef::Title(title) => find_card(&title)
                .map(|card| card.title.to_string())
                .unwrap_or(title),
        };

        self.chat.open_scenarios(&title).await;
        match self.chat.scenario_popup() {
            Some(popup) => Step::say(render::scenario_list(&popup)),
            None => Step::say(""),
        }
    }

    fn history(&self) -> String {
        let messages = self.chat.messages();
        if messages.is_empty() {
            return "No messages yet.".to_string();
        }
        let mut out: String = messages
            .iter()
            .enumerate()
            .map(|(i, m)| render::message(i + 1, m))
            .collect::<Vec<_>>()
            .join("\n");
        if self.chat.is_loading() {
            out.push_str("\nWaiting for an answer...");
        }
        out
    }

    fn speak(&self, section: NarrationSection, position: Option<usize>) -> Step {
        let messages = self.chat.messages();
        let target: Option<MessageId> = match position {
            Some(n) => n.checked_sub(1).and_then(|i| messages.get(i)).map(|m| m.id),
            None => messages
                .iter()
                .rev()
                .find(|m| m.role() == Role::Assistant)
                .map(|m| m.id),
        };
        let Some(id) = target else {
            return Step::say("No answer to read yet.");
        };

        match self.chat.speak_section(id, section) {
            Ok(SpeakOutcome::Started(_)) => Step::say(format!("Reading {section} aloud.")),
            Ok(SpeakOutcome::Stopped) => Step::say(format!("Stopped reading {section}.")),
            Err(e) => Step::say(e.to_string()),
        }
    }
}
