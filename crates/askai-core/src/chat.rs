//! The send/receive lifecycle of a chat exchange
//!
//! ```text
//! Idle -> UserMessageAppended -> PlaceholderAppended -> AwaitingResponse -> Resolved
//!                                                                        \-> Failed
//! ```
//!
//! [`ChatClient::begin_send`] performs the optimistic half synchronously and
//! hands back what to send; the caller performs the relay call wherever it
//! likes (inline via [`ChatClient::send`], or on a spawned task) and feeds the
//! result to [`ChatClient::complete`].

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::conversation::Conversation;
use crate::language::Language;
use crate::message::Message;
use crate::relay::{RelayClient, RelayError};
use crate::speech::{select_voice, SpeechOutput, Utterance, PREFERRED_VOICE};
use crate::text::clean_response;

/// Bot message shown when the relay call fails
pub const FAILURE_TEXT: &str = "Oops! Something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    UserMessageAppended,
    PlaceholderAppended,
    AwaitingResponse,
    Resolved,
    Failed,
}

/// What to send upstream for an exchange that was just started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub prompt: String,
    pub language: Language,
}

pub struct ChatClient {
    conversation: Conversation,
    state: ExchangeState,
    language: Language,
    relay: Arc<dyn RelayClient>,
    speech: Arc<dyn SpeechOutput>,
    speech_enabled: bool,
    preferred_voice: String,
}

impl ChatClient {
    pub fn new(relay: Arc<dyn RelayClient>, speech: Arc<dyn SpeechOutput>) -> Self {
        Self {
            conversation: Conversation::new(),
            state: ExchangeState::Idle,
            language: Language::default(),
            relay,
            speech,
            speech_enabled: true,
            preferred_voice: PREFERRED_VOICE.to_string(),
        }
    }

    pub fn with_speech_enabled(mut self, enabled: bool) -> Self {
        self.speech_enabled = enabled;
        self
    }

    pub fn with_preferred_voice(mut self, fragment: &str) -> Self {
        self.preferred_voice = fragment.to_string();
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Language of the most recent user message
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn relay(&self) -> Arc<dyn RelayClient> {
        Arc::clone(&self.relay)
    }

    pub fn is_awaiting(&self) -> bool {
        self.state == ExchangeState::AwaitingResponse
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech_enabled
    }

    pub fn toggle_speech(&mut self) -> bool {
        self.speech_enabled = !self.speech_enabled;
        self.speech_enabled
    }

    /// Append the user message and the typing placeholder.
    ///
    /// Returns `None` without touching the conversation for blank text, or
    /// while a previous exchange is still awaiting its reply.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingExchange> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_awaiting() {
            warn!("Send ignored while a reply is pending");
            return None;
        }

        let language = Language::detect(text);
        self.language = language;

        self.conversation.push_user(text);
        self.state = ExchangeState::UserMessageAppended;

        self.conversation.push_placeholder();
        self.state = ExchangeState::PlaceholderAppended;

        let prompt = language.prompt_for(text);
        self.state = ExchangeState::AwaitingResponse;
        debug!(language = language.tag(), "Awaiting reply");

        Some(PendingExchange { prompt, language })
    }

    /// Replace the placeholder with the outcome of the relay call. Returns
    /// the bot message that was appended, or `None` if nothing was pending.
    pub async fn complete(&mut self, result: Result<String, RelayError>) -> Option<&Message> {
        if !self.is_awaiting() {
            warn!("Reply arrived with no exchange pending");
            return None;
        }

        match result {
            Ok(output) => {
                let reply = clean_response(&output);
                self.conversation.resolve(reply.clone());
                self.state = ExchangeState::Resolved;
                info!(chars = reply.chars().count(), "Reply received");

                if self.speech_enabled {
                    self.speak(&reply).await;
                }
            }
            Err(e) => {
                error!(error = %e, "Relay request failed");
                self.conversation.resolve(FAILURE_TEXT);
                self.state = ExchangeState::Failed;
            }
        }

        self.conversation.last()
    }

    /// Run a whole exchange: optimistic append, relay call, resolution
    pub async fn send(&mut self, text: &str) -> Option<&Message> {
        let pending = self.begin_send(text)?;
        let result = self.relay.generate(&pending.prompt).await;
        self.complete(result).await
    }

    async fn speak(&self, text: &str) {
        let language = Language::detect(text);
        let voices = self.speech.voices().await;
        let voice = select_voice(&voices, language, &self.preferred_voice);
        let utterance = Utterance::new(text, language, voice);

        if let Err(e) = self.speech.speak(&utterance).await {
            warn!(error = %e, "Could not speak reply");
        }
    }
}
