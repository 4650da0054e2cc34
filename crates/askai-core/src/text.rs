use regex::Regex;
use std::sync::OnceLock;

/// Characters the model uses for markdown emphasis, code and bullets
const MARKUP_CHARS: &[char] = &['*', '_', '~', '`', '•', '-'];

fn blank_lines() -> &'static Regex {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    BLANK_LINES.get_or_init(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"))
}

/// Strip markup characters, collapse blank lines and trim a model reply
/// so it reads (and speaks) as plain text.
pub fn clean_response(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped: String = text.chars().filter(|c| !MARKUP_CHARS.contains(c)).collect();
    blank_lines().replace_all(&stripped, "\n").trim().to_string()
}
