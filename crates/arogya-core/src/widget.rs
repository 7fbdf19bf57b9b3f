//! Chat widget controller
//!
//! Owns the message list, the text input and a handle to the reply service.
//! A submission renders the user's message and a loading placeholder right
//! away, then hands back a [`ReplyRequest`] for the caller to run on whatever
//! executor it likes. Feeding the finished [`Reply`] to [`ChatWidget::finish`]
//! swaps the placeholder for the reply (or the configured error message).

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use crate::client::ReplyService;
use crate::config::{BusyPolicy, WidgetConfig};
use crate::error::Result;
use crate::state::{Message, Ticket, Transcript};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
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
        if self.cursor < self.char_count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Replace the contents, leaving the cursor at the end
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Outcome of handing text to the widget
#[derive(Debug)]
pub enum Submission {
    /// Input was empty after trimming; nothing happened
    Empty,
    /// A reply is outstanding and the busy policy is `reject`
    Busy,
    /// Held until the outstanding reply finishes
    Queued { position: usize },
    /// Rendered; run the request to get the reply
    Dispatched(ReplyRequest),
}

impl Submission {
    pub fn into_request(self) -> Option<ReplyRequest> {
        match self {
            Submission::Dispatched(request) => Some(request),
            _ => None,
        }
    }
}

/// One pending call to the reply service
pub struct ReplyRequest {
    ticket: Ticket,
    message: String,
    service: Arc<dyn ReplyService>,
}

impl fmt::Debug for ReplyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyRequest")
            .field("ticket", &self.ticket)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl ReplyRequest {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Perform the network call. Runs exactly once; no retry.
    pub async fn run(self) -> Reply {
        let result = self.service.reply(&self.message).await;
        Reply {
            ticket: self.ticket,
            result,
        }
    }
}

/// A finished request, success or failure
#[derive(Debug)]
pub struct Reply {
    pub ticket: Ticket,
    pub result: Result<String>,
}

/// Counters shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub sent: usize,
    pub replies: usize,
    pub failures: usize,
}

pub struct ChatWidget {
    config: WidgetConfig,
    service: Arc<dyn ReplyService>,
    transcript: Transcript,
    input: InputLine,
    awaiting: Option<Ticket>,
    queued: VecDeque<String>,
    next_ticket: Ticket,
    stats: SessionStats,
}

impl ChatWidget {
    /// Bind a widget to its service and render the welcome message
    pub fn attach(config: WidgetConfig, service: Arc<dyn ReplyService>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push_message(Message::ai(config.welcome_message.clone()));

        Self {
            config,
            service,
            transcript,
            input: InputLine::default(),
            awaiting: None,
            queued: VecDeque::new(),
            next_ticket: 1,
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn input(&self) -> &InputLine {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputLine {
        &mut self.input
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Send button / Enter key
    pub fn submit_input(&mut self) -> Submission {
        let raw = self.input.text().to_string();
        self.submit(&raw)
    }

    /// Suggestion chip: send its text as if typed.
    ///
    /// The input is only touched when the text is accepted (and then cleared),
    /// so a rejected chip leaves an unsent draft where it was.
    pub fn use_suggestion(&mut self, text: &str) -> Submission {
        self.submit(text)
    }

    pub fn submit(&mut self, raw: &str) -> Submission {
        let text = raw.trim();
        if text.is_empty() {
            return Submission::Empty;
        }

        if self.awaiting.is_some() {
            return match self.config.busy_policy {
                BusyPolicy::Reject => {
                    debug!("reply outstanding, rejecting submission");
                    Submission::Busy
                }
                BusyPolicy::Queue => {
                    self.queued.push_back(text.to_string());
                    self.input.clear();
                    debug!(queued = self.queued.len(), "reply outstanding, queued submission");
                    Submission::Queued {
                        position: self.queued.len(),
                    }
                }
            };
        }

        let request = self.dispatch(text.to_string());
        self.input.clear();
        Submission::Dispatched(request)
    }

    fn dispatch(&mut self, text: String) -> ReplyRequest {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        self.transcript.push_message(Message::user(text.clone()));
        self.transcript.push_placeholder(ticket);
        self.awaiting = Some(ticket);
        self.stats.sent += 1;

        info!(ticket, "dispatching chat message");
        ReplyRequest {
            ticket,
            message: text,
            service: Arc::clone(&self.service),
        }
    }

    /// Render a finished reply. Returns the next queued request, if any.
    pub fn finish(&mut self, reply: Reply) -> Option<ReplyRequest> {
        let Reply { ticket, result } = reply;

        if self.awaiting == Some(ticket) {
            self.awaiting = None;
        } else {
            warn!(ticket, awaiting = ?self.awaiting, "reply does not match the outstanding request");
        }

        // Always clear the placeholder before the terminal message
        self.transcript.remove_placeholder(ticket);

        match result {
            Ok(text) => {
                debug!(ticket, "reply received");
                self.stats.replies += 1;
                self.transcript.push_message(Message::ai(text));
            }
            Err(e) => {
                error!(ticket, error = %e, "chat request failed");
                self.stats.failures += 1;
                self.transcript
                    .push_message(Message::ai(self.config.error_message.clone()));
            }
        }

        if self.awaiting.is_none() {
            self.queued.pop_front().map(|text| self.dispatch(text))
        } else {
            None
        }
    }

    /// Submit and wait for the reply (and any queued follow-ups) in place.
    /// Returns false when nothing was dispatched.
    pub async fn send(&mut self, raw: &str) -> bool {
        let Some(request) = self.submit(raw).into_request() else {
            return false;
        };

        let mut next = Some(request);
        while let Some(request) = next {
            let reply = request.run().await;
            next = self.finish(reply);
        }
        true
    }
}
