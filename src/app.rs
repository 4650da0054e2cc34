use std::sync::Arc;

use askai_core::{
    CaptureError, ChatClient, Config, HttpRelayClient, Language, RelayError, SpeechError,
    SpeechInput, VoiceInput,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub type ReplyTask = JoinHandle<Result<String, RelayError>>;
pub type CaptureTask = JoinHandle<Result<Option<String>, SpeechError>>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Chat state
    pub chat: ChatClient,
    pub input: VoiceInput,
    pub reply_task: Option<ReplyTask>,
    pub capture_task: Option<CaptureTask>,
    pub speech_input: Arc<dyn SpeechInput>,
    pub notice: Option<String>,

    // Transcript scrolling
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript, set during render
    pub chat_width: u16,  // inner width of the transcript, set during render
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub relay_url: String,
}

impl App {
    pub fn new(config: &Config, relay_url: String) -> Self {
        let relay = HttpRelayClient::new(&relay_url);
        let chat = ChatClient::new(Arc::new(relay), config.speech_output())
            .with_speech_enabled(config.speech_enabled())
            .with_preferred_voice(config.preferred_voice());

        Self::with_chat(chat, config.speech_input(), relay_url)
    }

    pub fn with_chat(chat: ChatClient, speech_input: Arc<dyn SpeechInput>, relay_url: String) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            chat,
            input: VoiceInput::new(),
            reply_task: None,
            capture_task: None,
            speech_input,
            notice: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_tail: true,

            animation_frame: 0,

            relay_url,
        }
    }

    /// Send whatever is in the input box. Blank input and sends while a
    /// reply is still pending are ignored.
    pub fn submit(&mut self) {
        if self.reply_task.is_some() || self.chat.is_awaiting() {
            return;
        }
        let Some(text) = self.input.submit() else {
            return;
        };
        self.send(&text);
    }

    fn send(&mut self, text: &str) {
        let Some(pending) = self.chat.begin_send(text) else {
            return;
        };
        self.notice = None;
        self.follow_tail = true;

        let relay = self.chat.relay();
        self.reply_task = Some(tokio::spawn(async move {
            relay.generate(&pending.prompt).await
        }));
    }

    /// Start a single-shot speech capture in the current chat language
    pub fn start_capture(&mut self) {
        match self.input.start_capture(self.speech_input.as_ref()) {
            Ok(()) => {
                let speech = Arc::clone(&self.speech_input);
                let language: Language = self.chat.language();
                self.notice = Some(format!("Listening ({})...", language.display_name()));
                self.capture_task = Some(tokio::spawn(async move {
                    speech.recognize(language).await
                }));
            }
            Err(CaptureError::AlreadyListening) => {}
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    pub fn toggle_speech(&mut self) {
        let enabled = self.chat.toggle_speech();
        self.notice = Some(if enabled {
            "Speech output on".to_string()
        } else {
            "Speech output off".to_string()
        });
        if let Err(e) = Config::save_speech_enabled(enabled) {
            warn!(error = %e, "Could not save speech setting");
        }
    }

    /// Collect finished background work. Called after every event.
    pub async fn poll_tasks(&mut self) {
        if self.reply_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.reply_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(RelayError::Server {
                        status: 0,
                        message: format!("relay task aborted: {}", e),
                    }),
                };
                self.chat.complete(result).await;
                self.follow_tail = true;
            }
        }

        if self.capture_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.capture_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(error = %e, "Speech capture task aborted");
                        Ok(None)
                    }
                };
                let heard = self.input.finish_capture(result);
                self.notice = if heard {
                    info!("Transcript captured");
                    None
                } else {
                    Some("Didn't catch that".to_string())
                };
                self.input_mode = InputMode::Editing;
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.chat.is_awaiting()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() || self.input.is_listening() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_tail = self.chat_scroll >= max;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    /// Number of wrapped lines the transcript occupies
    pub fn transcript_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in self.chat.messages() {
            total_lines += 1; // Sender line ("You:" or "AI:")
            for line in msg.text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines += char_count / wrap_width + 1;
            }
            total_lines += 1; // Blank line after message
        }
        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }

    pub fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.transcript_lines().saturating_sub(visible_height)
    }

    /// Keep the newest message in view unless the user scrolled up
    pub fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if self.follow_tail || self.chat_scroll > max {
            self.chat_scroll = max;
        }
    }
}
