use clap::Parser;

use crate::gemini::DEFAULT_GEMINI_URL;

#[derive(Parser, Debug, Clone)]
#[command(name = "askai-relay")]
#[command(author, version, about = "Relay chat prompts to the Gemini generateContent API", long_about = None)]
pub struct RelayConfig {
    /// Address to listen on
    #[arg(long, env = "ASKAI_RELAY_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Gemini API key, sent upstream as the `key` query parameter
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// generateContent endpoint
    #[arg(long, env = "GEMINI_URL", default_value = DEFAULT_GEMINI_URL)]
    pub upstream_url: String,

    #[arg(short, long)]
    pub verbose: bool,
}
