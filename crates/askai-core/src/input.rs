//! Text field plus single-shot speech capture
//!
//! Both the send key and the send action go through [`VoiceInput::submit`],
//! which refuses blank content. Speech capture is split in two halves so the
//! recognition itself can run on a background task: [`VoiceInput::start_capture`]
//! checks the capability and marks the widget as listening,
//! [`VoiceInput::finish_capture`] applies the result.

use thiserror::Error;
use tracing::warn;

use crate::speech::{SpeechError, SpeechInput};

/// Notice shown when the platform has no speech recognition
pub const UNSUPPORTED_NOTICE: &str = "Speech recognition is not supported on this system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("{}", UNSUPPORTED_NOTICE)]
    Unsupported,

    #[error("already listening")]
    AlreadyListening,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone, Default)]
pub struct VoiceInput {
    text: String,
    cursor: usize, // in characters, not bytes
    listening: bool,
}

impl VoiceInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// True when a submit would actually send something
    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Replace the whole field, leaving the cursor at the end
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Take the field's content for sending. Blank or whitespace-only
    /// content is left in place and nothing is returned.
    pub fn submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        Some(text)
    }

    /// Begin a recognition session. The caller runs the recognizer and
    /// reports back through [`VoiceInput::finish_capture`].
    pub fn start_capture(&mut self, speech: &dyn SpeechInput) -> Result<(), CaptureError> {
        if !speech.is_available() {
            return Err(CaptureError::Unsupported);
        }
        if self.listening {
            return Err(CaptureError::AlreadyListening);
        }
        self.listening = true;
        Ok(())
    }

    /// Apply the outcome of a recognition session. A final transcript
    /// overwrites the field; returns whether it did.
    pub fn finish_capture(&mut self, result: Result<Option<String>, SpeechError>) -> bool {
        self.listening = false;
        match result {
            Ok(Some(transcript)) => {
                self.set_text(transcript);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Speech capture failed");
                false
            }
        }
    }
}
