use crate::message::{Message, Sender};

/// Ordered chat history owned by a single session.
///
/// Display order is append order. At most one pending placeholder exists
/// and, while present, it is the last message.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Append the "typing" placeholder. Returns false (and appends nothing)
    /// if one is already pending.
    pub fn push_placeholder(&mut self) -> bool {
        if self.has_pending() {
            return false;
        }
        self.messages.push(Message::placeholder());
        true
    }

    pub fn has_pending(&self) -> bool {
        self.messages.iter().any(|m| m.pending)
    }

    /// Drop any pending placeholder and append the bot reply in its place
    pub fn resolve(&mut self, text: impl Into<String>) {
        self.messages.retain(|m| !m.pending);
        self.messages.push(Message::bot(text));
    }

    pub fn count_by(&self, sender: Sender) -> usize {
        self.messages.iter().filter(|m| m.sender == sender).count()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::PLACEHOLDER_TEXT;

    #[test]
    fn placeholder_stays_last_until_resolved() {
        let mut conv = Conversation::new();
        conv.push_user("hello");
        assert!(conv.push_placeholder());

        let last = conv.last().unwrap();
        assert!(last.pending);
        assert_eq!(last.text, PLACEHOLDER_TEXT);

        conv.resolve("hi there");
        assert_eq!(conv.len(), 2);
        assert!(!conv.has_pending());
        assert_eq!(conv.last().unwrap(), &Message::bot("hi there"));
    }

    #[test]
    fn second_placeholder_is_refused() {
        let mut conv = Conversation::new();
        assert!(conv.push_placeholder());
        assert!(!conv.push_placeholder());
        assert_eq!(conv.messages().iter().filter(|m| m.pending).count(), 1);
    }

    #[test]
    fn resolve_without_placeholder_just_appends() {
        let mut conv = Conversation::new();
        conv.push_user("q");
        conv.resolve("a");
        assert_eq!(conv.count_by(Sender::User), 1);
        assert_eq!(conv.count_by(Sender::Bot), 1);
    }

    #[test]
    fn history_order_is_append_order() {
        let mut conv = Conversation::new();
        conv.push_user("one");
        conv.push_placeholder();
        conv.resolve("two");
        conv.push_user("three");

        let texts: Vec<&str> = conv.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }
}
