use std::sync::Arc;
use arogya_core::{
    ChatError, ChatWidget, Entry, Reply, ReplyRequest, ReplyService, Submission, Ticket,
    ViewSwitcher, WidgetConfig,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tracing::{debug, error};

pub const CHAT_VIEW: &str = "chat";
pub const DASHBOARD_VIEW: &str = "dashboard";
pub const SETTINGS_VIEW: &str = "settings";

/// Sidebar entries: (panel id, link label)
pub const VIEWS: [(&str, &str); 3] = [
    (CHAT_VIEW, "Chat"),
    (DASHBOARD_VIEW, "Dashboard"),
    (SETTINGS_VIEW, "Settings"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Input,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    /// One-line notice shown in the footer (e.g. busy rejection)
    pub status: Option<String>,

    pub widget: ChatWidget,
    pub views: ViewSwitcher,
    /// Sidebar cursor; separate from which link is active
    pub sidebar_state: ListState,

    /// Ticket of the request running on the runtime, if any
    pub pending_reply: Option<Ticket>,
    // Finished requests are sent here and come back as `AppEvent::Reply`
    reply_tx: mpsc::UnboundedSender<Reply>,
    reply_rx: Option<mpsc::UnboundedReceiver<Reply>>,

    // Animation state
    pub animation_frame: u8, // 0-2

    // Transcript scroll
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript area
    pub chat_width: u16,  // inner width, for wrap calculations

    // Panel areas for mouse hit-testing (updated during render)
    pub sidebar_area: Option<Rect>,
    pub chat_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub send_area: Option<Rect>,
}

impl App {
    pub fn new(config: WidgetConfig, service: Arc<dyn ReplyService>) -> Self {
        let widget = ChatWidget::attach(config, service);
        let views = ViewSwitcher::new(VIEWS);

        let mut sidebar_state = ListState::default();
        sidebar_state.select(Some(0));
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Sidebar,
            status: None,

            widget,
            views,
            sidebar_state,

            pending_reply: None,
            reply_tx,
            reply_rx: Some(reply_rx),

            animation_frame: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            sidebar_area: None,
            chat_area: None,
            input_area: None,
            send_area: None,
        }
    }

    /// Receiver for finished replies, handed to the event loop once
    pub fn take_reply_events(&mut self) -> Option<mpsc::UnboundedReceiver<Reply>> {
        self.reply_rx.take()
    }

    pub fn chat_visible(&self) -> bool {
        self.views.is_visible(CHAT_VIEW)
    }

    // Chat actions

    /// Send button / Enter in the input box
    pub fn submit(&mut self) {
        let submission = self.widget.submit_input();
        self.handle_submission(submission);
    }

    /// Suggestion chip `index` (0-based)
    pub fn use_suggestion(&mut self, index: usize) {
        let Some(text) = self.widget.config().suggestions.get(index).cloned() else {
            return;
        };
        let submission = self.widget.use_suggestion(&text);
        self.handle_submission(submission);
    }

    /// Suggestions are offered until the user has said something
    pub fn suggestions_visible(&self) -> bool {
        self.widget.stats().sent == 0 && !self.widget.config().suggestions.is_empty()
    }

    fn handle_submission(&mut self, submission: Submission) {
        match submission {
            Submission::Empty => {}
            Submission::Busy => {
                self.status = Some("Still waiting for the last reply...".to_string());
            }
            Submission::Queued { position } => {
                self.status = Some(format!("Queued ({} waiting)", position));
            }
            Submission::Dispatched(request) => {
                self.status = None;
                self.spawn_reply(request);
            }
        }
        self.sync_transcript();
    }

    fn spawn_reply(&mut self, request: ReplyRequest) {
        let ticket = request.ticket();
        self.pending_reply = Some(ticket);

        let tx = self.reply_tx.clone();
        tokio::spawn(async move {
            // A panicking service still has to clear the placeholder
            let reply = match tokio::spawn(request.run()).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!(ticket, error = %e, "reply task failed");
                    Reply {
                        ticket,
                        result: Err(ChatError::Interrupted(e.to_string())),
                    }
                }
            };
            if tx.send(reply).is_err() {
                debug!(ticket, "event loop gone, dropping reply");
            }
        });
    }

    /// Render a finished reply and send the next queued message, if any
    pub fn finish_reply(&mut self, reply: Reply) {
        if self.pending_reply == Some(reply.ticket) {
            self.pending_reply = None;
        }

        if let Some(next) = self.widget.finish(reply) {
            debug!(ticket = next.ticket(), "dispatching queued message");
            self.spawn_reply(next);
        }
        if self.widget.queued_len() == 0 {
            self.status = None;
        }
        self.sync_transcript();
    }

    /// Wait for the outstanding reply, if any
    #[cfg(test)]
    pub async fn await_reply(&mut self) {
        if self.pending_reply.is_none() {
            return;
        }
        let reply = match self.reply_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        };
        if let Some(reply) = reply {
            self.finish_reply(reply);
        }
    }

    /// Follow the tail whenever the transcript changed
    pub fn sync_transcript(&mut self) {
        let changes = self.widget.transcript_mut().take_changes();
        if !changes.is_empty() {
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.widget.transcript().has_placeholder() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Rendered height of the transcript at the current width
    pub fn transcript_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for entry in self.widget.transcript().entries() {
            // Label line ("You" / "Arogya") and the blank line after the bubble
            total_lines = total_lines.saturating_add(2);
            match entry {
                Entry::Message(msg) => {
                    for line in msg.text.lines() {
                        // Character count, not byte length
                        let char_count = line.chars().count();
                        total_lines = total_lines.saturating_add(char_count.max(1).div_ceil(wrap_width));
                    }
                    if msg.text.is_empty() {
                        total_lines = total_lines.saturating_add(1);
                    }
                }
                Entry::Placeholder { .. } => total_lines = total_lines.saturating_add(1),
            }
        }

        // ratatui scroll offsets are u16
        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_scroll = self.transcript_lines().saturating_sub(visible_height);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.transcript_lines().saturating_sub(self.chat_height.max(1));
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_chat_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_chat_down((self.chat_height / 2).max(1));
    }

    // Sidebar navigation

    pub fn sidebar_down(&mut self) {
        let len = self.views.links().len();
        if len > 0 {
            let i = self.sidebar_state.selected().unwrap_or(0);
            self.sidebar_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn sidebar_up(&mut self) {
        let i = self.sidebar_state.selected().unwrap_or(0);
        self.sidebar_state.select(Some(i.saturating_sub(1)));
    }

    pub fn activate_selected_link(&mut self) {
        if let Some(i) = self.sidebar_state.selected() {
            self.open_link(i);
        }
    }

    /// Switch panels via link `index` (keyboard or mouse)
    pub fn open_link(&mut self, index: usize) {
        if index >= self.views.links().len() {
            return;
        }
        self.sidebar_state.select(Some(index));
        self.views.activate_link(index);
        debug!(view = ?self.views.visible_panel(), "switched view");

        if !self.chat_visible() {
            self.input_mode = InputMode::Normal;
            self.focus = FocusPane::Sidebar;
        }
    }

    /// Start typing in the chat input (only when the chat panel is showing)
    pub fn focus_input(&mut self) {
        if self.chat_visible() {
            self.focus = FocusPane::Input;
            self.input_mode = InputMode::Editing;
            self.widget.input_mut().move_end();
        }
    }

    pub fn leave_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.focus = FocusPane::Sidebar;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;

    /// Echoes a fixed reply, or fails when `reply` is None
    pub struct FixedService {
        pub reply: Option<&'static str>,
    }

    #[async_trait]
    impl ReplyService for FixedService {
        async fn reply(&self, _message: &str) -> arogya_core::error::Result<String> {
            self.reply
                .map(str::to_string)
                .ok_or(ChatError::Status { status: 500, detail: None })
        }
    }

    pub fn app_with(reply: Option<&'static str>, config: WidgetConfig) -> App {
        App::new(config, Arc::new(FixedService { reply }))
    }
}
