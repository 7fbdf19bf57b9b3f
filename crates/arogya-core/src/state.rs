//! UI-agnostic chat state
//!
//! The transcript is the message list the widget renders into. Front ends
//! read `entries()` to draw bubbles and drain `take_changes()` to learn what
//! was appended or removed since the last frame (auto-scroll, redraw).

use serde::{Deserialize, Serialize};

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A rendered chat message. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into() }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self { sender: Sender::Ai, text: text.into() }
    }
}

/// Identifies one outstanding reply request and its loading placeholder
pub type Ticket = u64;

/// One row of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(Message),
    /// Loading indicator shown while `ticket` is awaiting its reply
    Placeholder { ticket: Ticket },
}

impl Entry {
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Entry::Message(m) => Some(m),
            Entry::Placeholder { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Entry::Placeholder { .. })
    }
}

/// Journal record of a transcript mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Appended(Entry),
    Removed(Ticket),
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    changes: Vec<Change>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_message(&mut self, message: Message) {
        self.push(Entry::Message(message));
    }

    pub fn push_placeholder(&mut self, ticket: Ticket) {
        self.push(Entry::Placeholder { ticket });
    }

    fn push(&mut self, entry: Entry) {
        self.changes.push(Change::Appended(entry.clone()));
        self.entries.push(entry);
    }

    /// Remove the placeholder for `ticket`. Returns false when it was
    /// already gone, which is not an error.
    pub fn remove_placeholder(&mut self, ticket: Ticket) -> bool {
        let Some(idx) = self
            .entries
            .iter()
            .position(|e| *e == Entry::Placeholder { ticket })
        else {
            return false;
        };
        self.entries.remove(idx);
        self.changes.push(Change::Removed(ticket));
        true
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(Entry::as_message)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.entries.iter().rev().find_map(Entry::as_message)
    }

    pub fn has_placeholder(&self) -> bool {
        self.entries.iter().any(Entry::is_placeholder)
    }

    pub fn count_from(&self, sender: Sender) -> usize {
        self.messages().filter(|m| m.sender == sender).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Changes recorded since the last call
    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }
}
