pub mod chat;
pub mod config;
pub mod conversation;
pub mod input;
pub mod language;
pub mod message;
pub mod protocol;
pub mod relay;
pub mod speech;
pub mod text;

// Re-export main types for convenience
pub use chat::{ChatClient, ExchangeState, PendingExchange, FAILURE_TEXT};
pub use config::Config;
pub use conversation::Conversation;
pub use input::{CaptureError, VoiceInput, UNSUPPORTED_NOTICE};
pub use language::Language;
pub use message::{Message, Sender, PLACEHOLDER_TEXT};
pub use protocol::{ErrorResponse, GenerateRequest, GenerateResponse, GENERATION_FAILED};
pub use relay::{HttpRelayClient, RelayClient, RelayError};
pub use speech::{
    CommandSpeechInput, CommandSpeechOutput, SpeechError, SpeechInput, SpeechOutput, Unavailable,
    Utterance, Voice,
};
pub use text::clean_response;
