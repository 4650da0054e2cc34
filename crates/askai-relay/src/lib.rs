pub mod config;
pub mod gemini;
pub mod server;

pub use config::RelayConfig;
pub use gemini::{GeminiClient, Generator, UpstreamError, DEFAULT_GEMINI_URL};
pub use server::{router, serve, RelayState};
