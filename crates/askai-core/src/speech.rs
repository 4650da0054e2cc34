//! Speech capabilities
//!
//! Recognition and synthesis are platform collaborators, so the chat client
//! only sees the [`SpeechInput`] and [`SpeechOutput`] traits. [`Unavailable`]
//! stands in wherever the platform has nothing to offer; the command-backed
//! implementations drive external programs (an `espeak-ng` compatible
//! synthesizer and any recognizer that prints its transcript on stdout).

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::language::Language;

/// Fixed speaking rate (1.0 = the engine's normal speed)
pub const DEFAULT_RATE: f32 = 1.0;
/// Fixed pitch (1.0 = the engine's natural pitch)
pub const DEFAULT_PITCH: f32 = 1.0;
/// Voice name fragment preferred for natural sounding output
pub const PREFERRED_VOICE: &str = "Google";

// espeak-ng defaults that map to rate/pitch 1.0
const ESPEAK_WORDS_PER_MINUTE: f32 = 175.0;
const ESPEAK_PITCH: f32 = 50.0;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech recognition is not available")]
    Unsupported,

    #[error("speech command is empty")]
    EmptyCommand,

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Identifier passed back to the engine when speaking
    pub id: String,
    pub name: String,
    pub lang: String,
}

impl Voice {
    /// Matches either the full tag ("hi-IN") or its primary subtag ("hi")
    pub fn speaks(&self, language: Language) -> bool {
        self.lang.eq_ignore_ascii_case(language.tag()) || self.lang.eq_ignore_ascii_case(language.code())
    }
}

/// One request to speak some text
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: Language,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, language: Language, voice: Option<Voice>) -> Self {
        Self {
            text: text.into(),
            language,
            voice,
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
        }
    }
}

/// Pick the voice for a language: a matching voice whose name contains the
/// preferred fragment, then any matching voice, then whatever comes first.
pub fn select_voice(voices: &[Voice], language: Language, preferred: &str) -> Option<Voice> {
    voices
        .iter()
        .find(|v| v.speaks(language) && v.name.contains(preferred))
        .or_else(|| voices.iter().find(|v| v.speaks(language)))
        .or_else(|| voices.first())
        .cloned()
}

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn voices(&self) -> Vec<Voice>;

    /// Start speaking. Returns once the utterance is handed to the engine,
    /// not when it finishes.
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;
}

#[async_trait]
pub trait SpeechInput: Send + Sync {
    fn is_available(&self) -> bool;

    /// Listen for a single utterance and return its final transcript, or
    /// `None` if nothing was heard.
    async fn recognize(&self, language: Language) -> Result<Option<String>, SpeechError>;
}

/// Stand-in for a platform without speech support
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl SpeechOutput for Unavailable {
    async fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    async fn speak(&self, _utterance: &Utterance) -> Result<(), SpeechError> {
        Ok(())
    }
}

#[async_trait]
impl SpeechInput for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    async fn recognize(&self, _language: Language) -> Result<Option<String>, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Speaks through an `espeak-ng` compatible program
#[derive(Debug, Clone)]
pub struct CommandSpeechOutput {
    program: String,
}

impl CommandSpeechOutput {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

#[async_trait]
impl SpeechOutput for CommandSpeechOutput {
    async fn voices(&self) -> Vec<Voice> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => parse_espeak_voices(&String::from_utf8_lossy(&out.stdout)),
            Ok(out) => {
                warn!(program = %self.program, status = %out.status, "Listing voices failed");
                Vec::new()
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "Could not run speech synthesizer");
                Vec::new()
            }
        }
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let mut cmd = Command::new(&self.program);
        if let Some(voice) = &utterance.voice {
            cmd.arg("-v").arg(&voice.id);
        }
        cmd.arg("-s")
            .arg(((ESPEAK_WORDS_PER_MINUTE * utterance.rate).round() as u32).to_string())
            .arg("-p")
            .arg(((ESPEAK_PITCH * utterance.pitch).round() as u32).to_string())
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Not awaited; tokio reaps the child once it exits
        cmd.spawn().map_err(|source| SpeechError::Spawn {
            command: self.program.clone(),
            source,
        })?;

        debug!(
            voice = utterance.voice.as_ref().map(|v| v.id.as_str()).unwrap_or("default"),
            language = utterance.language.tag(),
            "Speaking reply"
        );
        Ok(())
    }
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
/// ```
pub fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 {
                return None;
            }
            Some(Voice {
                id: cols[1].to_string(),
                name: cols[3].to_string(),
                lang: cols[1].to_string(),
            })
        })
        .collect()
}

/// Runs an external recognizer once per capture.
///
/// The command line is split on whitespace and `{lang}` is replaced with the
/// language tag. The first non-empty line the program prints is the
/// transcript.
#[derive(Debug, Clone)]
pub struct CommandSpeechInput {
    command: String,
}

impl CommandSpeechInput {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

#[async_trait]
impl SpeechInput for CommandSpeechInput {
    fn is_available(&self) -> bool {
        !self.command.trim().is_empty()
    }

    async fn recognize(&self, language: Language) -> Result<Option<String>, SpeechError> {
        let mut parts = self.command.split_whitespace().map(|p| p.replace("{lang}", language.tag()));
        let program = parts.next().ok_or(SpeechError::EmptyCommand)?;

        let output = Command::new(&program)
            .args(parts)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|source| SpeechError::Spawn {
                command: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SpeechError::Failed {
                command: program,
                status: output.status,
            });
        }

        let transcript = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string);
        Ok(transcript)
    }
}
