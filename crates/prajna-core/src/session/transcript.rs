use crate::api::{Message, Role};

/// What the message pane shows, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptItem {
    Message(Message),
    /// The "assistant is typing" placeholder while a reply is outstanding.
    Typing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    items: Vec<TranscriptItem>,
}

impl Transcript {
    pub fn items(&self) -> &[TranscriptItem] {
        &self.items
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.items.iter().filter_map(|item| match item {
            TranscriptItem::Message(message) => Some(message),
            TranscriptItem::Typing => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, message: Message) {
        self.items.push(TranscriptItem::Message(message));
    }

    pub fn show_typing(&mut self) {
        if !self.is_typing() {
            self.items.push(TranscriptItem::Typing);
        }
    }

    pub fn is_typing(&self) -> bool {
        self.items.iter().any(|item| matches!(item, TranscriptItem::Typing))
    }

    /// Swap the typing placeholder for `message`, or append if there is none.
    pub fn resolve_typing(&mut self, message: Message) {
        match self.items.iter().position(|item| matches!(item, TranscriptItem::Typing)) {
            Some(index) => self.items[index] = TranscriptItem::Message(message),
            None => self.push(message),
        }
    }

    pub fn replace(&mut self, messages: Vec<Message>) {
        self.items = messages.into_iter().map(TranscriptItem::Message).collect();
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages().filter(|m| m.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_placeholder_is_replaced_in_place() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("Hello"));
        transcript.show_typing();
        transcript.show_typing();
        assert_eq!(transcript.len(), 2);

        transcript.resolve_typing(Message::assistant("Hi!", vec![]));
        assert!(!transcript.is_typing());
        assert_eq!(transcript.count_role(Role::Assistant), 1);
        assert_eq!(transcript.items()[1], TranscriptItem::Message(Message::assistant("Hi!", vec![])));
    }

    #[test]
    fn resolve_without_placeholder_appends() {
        let mut transcript = Transcript::default();
        transcript.resolve_typing(Message::assistant("late", vec![]));
        assert_eq!(transcript.len(), 1);
    }
}
