//! Chat orchestrator: the state behind the chat surface.
//!
//! Owns the composer draft, the conversation log, the scenario popup, the
//! in-flight query count and both speech sessions, and wires them to the
//! classifier, dispatcher and scenario provider.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use legalaid_client::{LegalBackend, QueryDispatcher, ScenarioProvider};
use legalaid_core::{Category, LegalAidConfig, Message, MessageId, NarrationSection, Scenario};
use legalaid_speech::{
    RecognitionEvent, RecognitionSessionId, SectionId, SpeakOutcome, SpeechInputSession,
    SpeechInputState, SpeechOutputSession, SpeechRecognizer, SpeechSynthesizer, UtteranceEvent,
    UtteranceId,
};

use crate::classifier::{CategoryClassifier, ScenarioCategoryMapper};
use crate::error::ChatError;
use crate::store::ConversationStore;

/// The scenario list opened from a topic card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPopup {
    pub card_title: String,
    pub category: Category,
    pub scenarios: Vec<Scenario>,
    pub loading: bool,
}

/// A query whose user message is logged but whose answer has not arrived.
///
/// Counts toward [`ChatOrchestrator::is_loading`] until dropped.
#[derive(Debug)]
pub struct PendingQuery {
    pub message_id: MessageId,
    pub category: Category,
    pub text: String,
    _in_flight: InFlight,
}

#[derive(Debug)]
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn begin(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Central coordinator for one conversation.
pub struct ChatOrchestrator {
    classifier: CategoryClassifier,
    mapper: ScenarioCategoryMapper,
    dispatcher: QueryDispatcher,
    provider: ScenarioProvider,
    store: ConversationStore,
    draft: Mutex<String>,
    popup: Mutex<Option<(u64, ScenarioPopup)>>,
    popup_requests: AtomicU64,
    in_flight: Arc<AtomicUsize>,
    speech_input: SpeechInputSession,
    speech_output: SpeechOutputSession,
    max_message_length: usize,
}

impl ChatOrchestrator {
    pub fn new(
        backend: Arc<dyn LegalBackend>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        config: &LegalAidConfig,
    ) -> Self {
        Self {
            classifier: CategoryClassifier::new(),
            mapper: ScenarioCategoryMapper::new(),
            dispatcher: QueryDispatcher::new(Arc::clone(&backend)),
            provider: ScenarioProvider::new(backend),
            store: ConversationStore::new(),
            draft: Mutex::new(String::new()),
            popup: Mutex::new(None),
            popup_requests: AtomicU64::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            speech_input: SpeechInputSession::new(recognizer, config.speech.input.clone()),
            speech_output: SpeechOutputSession::new(synthesizer, config.speech.output),
            max_message_length: config.chat.max_message_length,
        }
    }

    fn draft_lock(&self) -> MutexGuard<'_, String> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn popup_lock(&self) -> MutexGuard<'_, Option<(u64, ScenarioPopup)>> {
        self.popup.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Conversation
    // =========================================================================

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn messages(&self) -> Vec<Message> {
        self.store.all()
    }

    /// Start a new conversation. Speech output for the old messages stops.
    pub fn reset(&self) {
        self.speech_output.stop();
        self.store.reset();
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // =========================================================================
    // Draft
    // =========================================================================

    pub fn draft(&self) -> String {
        self.draft_lock().clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *self.draft_lock() = text.into();
    }

    pub fn clear_draft(&self) {
        self.draft_lock().clear();
    }

    /// Append `text`, separated from existing content by one space.
    pub fn append_to_draft(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut draft = self.draft_lock();
        if !draft.is_empty() {
            draft.push(' ');
        }
        draft.push_str(text);
    }

    // =========================================================================
    // Sending
    // =========================================================================

    /// Validate and take the draft, log it as a user message and classify it.
    ///
    /// On error the draft is left untouched and nothing is logged.
    pub fn begin_send(&self) -> Result<PendingQuery, ChatError> {
        let text = {
            let mut draft = self.draft_lock();
            if draft.trim().is_empty() {
                return Err(ChatError::EmptyMessage);
            }
            if draft.chars().count() > self.max_message_length {
                return Err(ChatError::MessageTooLong(self.max_message_length));
            }
            std::mem::take(&mut *draft)
        };

        let in_flight = InFlight::begin(&self.in_flight);
        let message = Message::user(text.clone());
        let message_id = message.id;
        self.store.append(message);
        let category = self.classifier.classify(&text);
        tracing::info!(message = %message_id, category = %category, "User message sent");

        Ok(PendingQuery {
            message_id,
            category,
            text,
            _in_flight: in_flight,
        })
    }

    /// Dispatch `pending` and log the answer. Always produces an assistant
    /// message; backend failures become the fallback answer.
    pub async fn finish_send(&self, pending: PendingQuery) -> Message {
        let payload = self.dispatcher.send(pending.category, &pending.text).await;
        let message = Message::assistant(payload);
        self.store.append(message.clone());
        tracing::debug!(
            question = %pending.message_id,
            answer = %message.id,
            "Assistant message appended"
        );
        message
    }

    /// Send the draft and wait for the answer.
    pub async fn send_draft(&self) -> Result<Message, ChatError> {
        let pending = self.begin_send()?;
        Ok(self.finish_send(pending).await)
    }

    // =========================================================================
    // Scenario popup
    // =========================================================================

    /// Open the scenario list for a topic card and fetch its scenarios.
    ///
    /// Returns the fetched list. If the popup was closed or reopened while
    /// fetching, the result is discarded.
    pub async fn open_scenarios(&self, card_title: &str) -> Vec<Scenario> {
        let category = self.mapper.map_title(card_title);
        let request = self.popup_requests.fetch_add(1, Ordering::SeqCst) + 1;
        *self.popup_lock() = Some((
            request,
            ScenarioPopup {
                card_title: card_title.to_string(),
                category,
                scenarios: Vec::new(),
                loading: true,
            },
        ));
        tracing::info!(card = card_title, category = %category, "Scenario popup opened");

        let scenarios = self.provider.fetch(category).await;

        let mut popup = self.popup_lock();
        match popup.as_mut() {
            Some((current, open)) if *current == request => {
                open.scenarios = scenarios.clone();
                open.loading = false;
            }
            _ => tracing::debug!(
                card = card_title,
                "Popup changed while fetching, dropping scenarios"
            ),
        }
        scenarios
    }

    pub fn scenario_popup(&self) -> Option<ScenarioPopup> {
        self.popup_lock().as_ref().map(|(_, popup)| popup.clone())
    }

    /// Put scenario `index` of the open popup into the draft and close it.
    pub fn select_scenario(&self, index: usize) -> Result<Scenario, ChatError> {
        let mut popup = self.popup_lock();
        let (_, open) = popup.as_ref().ok_or(ChatError::NoScenarioPopup)?;
        let scenario = open
            .scenarios
            .get(index)
            .cloned()
            .ok_or(ChatError::ScenarioOutOfRange {
                index,
                available: open.scenarios.len(),
            })?;
        *popup = None;
        drop(popup);

        self.set_draft(scenario.query.clone());
        tracing::debug!(title = %scenario.title, "Scenario selected");
        Ok(scenario)
    }

    pub fn close_scenarios(&self) {
        *self.popup_lock() = None;
    }

    // =========================================================================
    // Speech output
    // =========================================================================

    pub fn speech_output(&self) -> &SpeechOutputSession {
        &self.speech_output
    }

    /// Read a section of an assistant message aloud, or stop it if it is
    /// the section already playing.
    pub fn speak_section(
        &self,
        message_id: MessageId,
        section: NarrationSection,
    ) -> Result<SpeakOutcome, ChatError> {
        let message = self
            .store
            .get(message_id)
            .ok_or(ChatError::MessageNotFound(message_id))?;
        let text = message
            .assistant_payload()
            .and_then(|payload| payload.narration(section))
            .ok_or(ChatError::NothingToNarrate(section))?;

        let outcome = self
            .speech_output
            .speak(&text, SectionId::for_message(message_id, section))?;
        Ok(outcome)
    }

    pub fn stop_speaking(&self) {
        self.speech_output.stop();
    }

    pub fn active_section(&self) -> Option<SectionId> {
        self.speech_output.active_section()
    }

    pub fn handle_utterance_event(&self, utterance: UtteranceId, event: UtteranceEvent) {
        self.speech_output.handle_event(utterance, event);
    }

    // =========================================================================
    // Speech input
    // =========================================================================

    pub fn speech_input(&self) -> SpeechInputState {
        self.speech_input.state()
    }

    pub fn start_listening(&self) -> Result<RecognitionSessionId, ChatError> {
        Ok(self.speech_input.start()?)
    }

    pub fn stop_listening(&self) {
        self.speech_input.stop();
    }

    /// Start when idle, stop when listening. Returns whether we are now listening.
    pub fn toggle_listening(&self) -> Result<bool, ChatError> {
        Ok(self.speech_input.toggle()?)
    }

    /// Apply a recognizer callback. Finalized text moves into the draft.
    pub fn handle_recognition_event(&self, session: RecognitionSessionId, event: RecognitionEvent) {
        self.speech_input.handle_event(session, event);
        let transcript = self.speech_input.take_transcript();
        if !transcript.is_empty() {
            self.append_to_draft(&transcript);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use legalaid_client::{MockBackend, QueryResponse};
    use legalaid_core::{ApplicableLaw, AssistantPayload, Role};
    use legalaid_speech::{
        MockRecognizer, MockSynthesizer, SpeechCapabilityKind, SpeechError, SpeechOutputState,
        TranscriptFragment, UnsupportedHost,
    };

    struct Harness {
        backend: Arc<MockBackend>,
        recognizer: Arc<MockRecognizer>,
        synthesizer: Arc<MockSynthesizer>,
        chat: Arc<ChatOrchestrator>,
    }

    fn harness_with(backend: MockBackend) -> Harness {
        let backend = Arc::new(backend);
        let recognizer = Arc::new(MockRecognizer::new());
        let synthesizer = Arc::new(MockSynthesizer::new());
        let chat = Arc::new(ChatOrchestrator::new(
            backend.clone(),
            recognizer.clone(),
            synthesizer.clone(),
            &LegalAidConfig::default(),
        ));
        Harness {
            backend,
            recognizer,
            synthesizer,
            chat,
        }
    }

    fn harness() -> Harness {
        harness_with(MockBackend::new())
    }

    fn rich_response() -> QueryResponse {
        QueryResponse {
            answer: Some("Your landlord must return the deposit.".to_string()),
            suggestion: Some("Write to them.".to_string()),
            reasoning: Some("Deposit rule.".to_string()),
            applicable_laws: Some(vec![ApplicableLaw {
                name: "Tenancy Act".to_string(),
                section: "Section 44".to_string(),
                description: "Deposit return".to_string(),
            }]),
            action_plan: Some(vec!["Gather receipts".to_string(), "Send a letter".to_string()]),
            matched_rule: Some("housing_deposit".to_string()),
        }
    }

    // =========================================================================
    // Sending
    // =========================================================================

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let h = harness();
        h.chat.set_draft("My landlord won't return my deposit");

        let answer = h.chat.send_draft().await.unwrap();

        let messages = h.chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0].user_text(),
            Some("My landlord won't return my deposit")
        );
        assert_eq!(messages[1].role(), Role::Assistant);
        assert_eq!(messages[1].id, answer.id);
        assert_eq!(h.backend.queries()[0].category, Category::Housing);
        assert!(h.chat.draft().is_empty());
        assert!(!h.chat.is_loading());
    }

    #[tokio::test]
    async fn test_send_classifies_each_category() {
        let h = harness();
        for text in [
            "My landlord won't return my deposit",
            "I was fired without notice",
            "The product I bought is broken",
        ] {
            h.chat.set_draft(text);
            h.chat.send_draft().await.unwrap();
        }

        let categories: Vec<_> = h.backend.queries().iter().map(|q| q.category).collect();
        assert_eq!(
            categories,
            vec![Category::Housing, Category::Employment, Category::Consumer]
        );
    }

    #[tokio::test]
    async fn test_whitespace_draft_is_ignored() {
        let h = harness();
        h.chat.set_draft("   \n ");

        assert_eq!(h.chat.send_draft().await, Err(ChatError::EmptyMessage));
        assert!(h.chat.messages().is_empty());
        assert_eq!(h.backend.query_count(), 0);
        assert_eq!(h.chat.draft(), "   \n ");
    }

    #[tokio::test]
    async fn test_overlong_draft_rejected() {
        let h = harness();
        h.chat.set_draft("a".repeat(2001));

        assert_eq!(h.chat.send_draft().await, Err(ChatError::MessageTooLong(2000)));
        assert!(h.chat.messages().is_empty());
        assert_eq!(h.backend.query_count(), 0);

        h.chat.clear_draft();
        assert_eq!(h.chat.draft(), "");
    }

    #[tokio::test]
    async fn test_query_failure_yields_fallback_message() {
        let h = harness_with(MockBackend::new().with_failing_queries());
        h.chat.set_draft("I was fired without notice");

        let answer = h.chat.send_draft().await.unwrap();
        let payload = answer.assistant_payload().unwrap();

        assert_eq!(
            payload.answer,
            "Sorry, I encountered an error processing your request. Please try again."
        );
        assert!(payload.applicable_laws.is_empty());
        assert!(payload.action_plan.is_empty());
        assert_eq!(h.chat.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_loading_while_pending() {
        let h = harness();
        h.chat.set_draft("refund please");

        let pending = h.chat.begin_send().unwrap();
        assert!(h.chat.is_loading());
        assert!(h.chat.draft().is_empty());
        assert_eq!(h.chat.messages().len(), 1);

        h.chat.finish_send(pending).await;
        assert!(!h.chat.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_pending_query_clears_loading() {
        let h = harness();
        h.chat.set_draft("refund please");
        let pending = h.chat.begin_send().unwrap();
        drop(pending);
        assert!(!h.chat.is_loading());
    }

    #[tokio::test]
    async fn test_overlapping_sends_append_in_completion_order() {
        let h = harness_with(
            MockBackend::new().with_delay_for("slow", Duration::from_millis(200)),
        );

        h.chat.set_draft("slow rent question");
        let slow = h.chat.begin_send().unwrap();
        h.chat.set_draft("fast rent question");
        let fast = h.chat.begin_send().unwrap();

        let chat = Arc::clone(&h.chat);
        let slow_task = tokio::spawn(async move { chat.finish_send(slow).await });
        let fast_answer = h.chat.finish_send(fast).await;
        assert!(h.chat.is_loading());
        let slow_answer = slow_task.await.unwrap();

        let ids: Vec<_> = h.chat.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[2], fast_answer.id);
        assert_eq!(ids[3], slow_answer.id);
        assert!(!h.chat.is_loading());
    }

    #[tokio::test]
    async fn test_reset_clears_conversation() {
        let h = harness();
        h.chat.set_draft("warranty");
        h.chat.send_draft().await.unwrap();

        h.chat.reset();
        assert!(h.chat.messages().is_empty());
    }

    // =========================================================================
    // Scenario popup
    // =========================================================================

    fn scenario(title: &str, query: &str) -> Scenario {
        Scenario {
            title: title.to_string(),
            description: String::new(),
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_select_fills_draft_and_closes() {
        let h = harness_with(MockBackend::new().with_scenarios(vec![
            scenario("Deposit kept", "My landlord kept my deposit"),
            scenario("No repairs", "My landlord won't fix the heating"),
        ]));

        let list = h.chat.open_scenarios("Security Deposit").await;
        assert_eq!(list.len(), 2);
        assert_eq!(h.backend.scenario_requests(), vec![Category::Housing]);

        let popup = h.chat.scenario_popup().unwrap();
        assert_eq!(popup.card_title, "Security Deposit");
        assert!(!popup.loading);

        let picked = h.chat.select_scenario(1).unwrap();
        assert_eq!(picked.title, "No repairs");
        assert_eq!(h.chat.draft(), "My landlord won't fix the heating");
        assert!(h.chat.scenario_popup().is_none());
    }

    #[tokio::test]
    async fn test_select_replaces_draft() {
        let h = harness_with(
            MockBackend::new().with_scenarios(vec![scenario("Overtime", "My boss owes overtime")]),
        );
        h.chat.set_draft("half typed");
        h.chat.open_scenarios("Overtime Pay").await;
        h.chat.select_scenario(0).unwrap();
        assert_eq!(h.chat.draft(), "My boss owes overtime");
    }

    #[tokio::test]
    async fn test_select_out_of_range() {
        let h = harness();
        h.chat.open_scenarios("Defective Product").await;

        // Empty backend list yields the single fallback scenario.
        assert_eq!(
            h.chat.select_scenario(3),
            Err(ChatError::ScenarioOutOfRange {
                index: 3,
                available: 1
            })
        );
        assert!(h.chat.scenario_popup().is_some());
    }

    #[tokio::test]
    async fn test_select_without_popup() {
        let h = harness();
        assert_eq!(h.chat.select_scenario(0), Err(ChatError::NoScenarioPopup));

        h.chat.open_scenarios("Service Dispute").await;
        h.chat.close_scenarios();
        assert_eq!(h.chat.select_scenario(0), Err(ChatError::NoScenarioPopup));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_popup_empty() {
        let h = harness_with(MockBackend::new().with_failing_scenarios());
        let list = h.chat.open_scenarios("Unpaid Wages").await;

        assert!(list.is_empty());
        let popup = h.chat.scenario_popup().unwrap();
        assert_eq!(popup.category, Category::Employment);
        assert!(popup.scenarios.is_empty());
    }

    // =========================================================================
    // Speech
    // =========================================================================

    async fn answered(h: &Harness) -> MessageId {
        h.chat.set_draft("deposit");
        h.chat.send_draft().await.unwrap().id
    }

    #[tokio::test]
    async fn test_speak_section_uses_narration_text() {
        let h = harness_with(MockBackend::new().with_response(rich_response()));
        let id = answered(&h).await;

        h.chat
            .speak_section(id, NarrationSection::ApplicableLaws)
            .unwrap();

        let spoken = h.synthesizer.spoken();
        assert_eq!(spoken[0].text, "Tenancy Act, Section 44: Deposit return");
    }

    #[tokio::test]
    async fn test_speak_section_toggle_and_switch() {
        let h = harness_with(MockBackend::new().with_response(rich_response()));
        let id = answered(&h).await;

        let first = match h.chat.speak_section(id, NarrationSection::MainAnswer).unwrap() {
            SpeakOutcome::Started(u) => u,
            SpeakOutcome::Stopped => panic!("expected start"),
        };
        h.chat.handle_utterance_event(first, UtteranceEvent::Started);
        assert_eq!(
            h.chat.active_section(),
            Some(SectionId::for_message(id, NarrationSection::MainAnswer))
        );

        h.chat.speak_section(id, NarrationSection::ActionPlan).unwrap();
        assert_eq!(h.synthesizer.cancel_count(), 1);
        assert_eq!(h.synthesizer.spoken()[1].text, "Gather receipts. Send a letter");

        assert_eq!(
            h.chat.speak_section(id, NarrationSection::ActionPlan),
            Ok(SpeakOutcome::Stopped)
        );
        assert_eq!(h.chat.speech_output().state(), SpeechOutputState::Idle);
    }

    #[tokio::test]
    async fn test_speak_sections_of_different_messages_do_not_alias() {
        let h = harness_with(MockBackend::new().with_response(rich_response()));
        let first = answered(&h).await;
        let second = answered(&h).await;

        h.chat.speak_section(first, NarrationSection::MainAnswer).unwrap();
        let outcome = h.chat.speak_section(second, NarrationSection::MainAnswer).unwrap();
        assert!(matches!(outcome, SpeakOutcome::Started(_)));
    }

    #[tokio::test]
    async fn test_speak_empty_section() {
        let h = harness();
        let id = answered(&h).await;
        assert_eq!(
            h.chat.speak_section(id, NarrationSection::ActionPlan),
            Err(ChatError::NothingToNarrate(NarrationSection::ActionPlan))
        );
    }

    #[tokio::test]
    async fn test_speak_user_message_or_unknown() {
        let h = harness();
        answered(&h).await;
        let user_id = h.chat.messages()[0].id;

        assert_eq!(
            h.chat.speak_section(user_id, NarrationSection::MainAnswer),
            Err(ChatError::NothingToNarrate(NarrationSection::MainAnswer))
        );
        let missing = MessageId::next();
        assert_eq!(
            h.chat.speak_section(missing, NarrationSection::MainAnswer),
            Err(ChatError::MessageNotFound(missing))
        );
    }

    #[tokio::test]
    async fn test_speech_unsupported_host() {
        let backend = Arc::new(MockBackend::new());
        let chat = ChatOrchestrator::new(
            backend,
            Arc::new(UnsupportedHost),
            Arc::new(UnsupportedHost),
            &LegalAidConfig::default(),
        );
        chat.store().append(Message::assistant(AssistantPayload {
            answer: "An answer".to_string(),
            ..AssistantPayload::default()
        }));
        let id = chat.messages()[0].id;

        assert_eq!(
            chat.speak_section(id, NarrationSection::MainAnswer),
            Err(ChatError::Speech(SpeechError::UnsupportedCapability(
                SpeechCapabilityKind::Synthesis
            )))
        );
        assert_eq!(
            chat.start_listening(),
            Err(ChatError::Speech(SpeechError::UnsupportedCapability(
                SpeechCapabilityKind::Recognition
            )))
        );
        assert!(!chat.speech_input().is_listening);
    }

    #[tokio::test]
    async fn test_final_transcript_appends_to_draft() {
        let h = harness();
        h.chat.set_draft("Hello");
        let session = h.chat.start_listening().unwrap();

        h.chat.handle_recognition_event(
            session,
            RecognitionEvent::Result(vec![TranscriptFragment::interim("my land")]),
        );
        assert_eq!(h.chat.draft(), "Hello");
        assert_eq!(h.chat.speech_input().interim_text, "my land");

        h.chat.handle_recognition_event(
            session,
            RecognitionEvent::Result(vec![TranscriptFragment::final_text("my landlord")]),
        );
        assert_eq!(h.chat.draft(), "Hello my landlord");
        assert!(h.chat.speech_input().interim_text.is_empty());

        h.chat.stop_listening();
        assert!(!h.chat.speech_input().is_listening);
        assert_eq!(h.recognizer.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_stops_speech() {
        let h = harness_with(MockBackend::new().with_response(rich_response()));
        let id = answered(&h).await;
        h.chat.speak_section(id, NarrationSection::MainAnswer).unwrap();

        h.chat.reset();
        assert_eq!(h.chat.speech_output().state(), SpeechOutputState::Idle);
        assert_eq!(h.synthesizer.cancel_count(), 1);
    }
}
