use std::io::{self, Stderr};
use std::time::Duration;
use anyhow::Result;
use arogya_core::Reply;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::warn;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Loading indicator frame rate
const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// A spawned chat request finished
    Reply(Reply),
    Tick,
}

/// Merges terminal input, finished replies and the animation tick into one
/// stream for the run loop.
pub struct EventHandler {
    terminal: EventStream,
    replies: mpsc::UnboundedReceiver<Reply>,
    ticks: Interval,
}

impl EventHandler {
    pub fn new(replies: mpsc::UnboundedReceiver<Reply>) -> Self {
        let mut ticks = tokio::time::interval(TICK_RATE);
        // a slow frame shouldn't cause a burst of catch-up ticks
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            terminal: EventStream::new(),
            replies,
            ticks,
        }
    }

    /// Next event for the app. None once the terminal closes.
    pub async fn next(&mut self) -> Option<AppEvent> {
        loop {
            tokio::select! {
                Some(reply) = self.replies.recv() => return Some(AppEvent::Reply(reply)),
                _ = self.ticks.tick() => return Some(AppEvent::Tick),
                event = self.terminal.next() => match event {
                    Some(Ok(event)) => {
                        if let Some(event) = translate(event) {
                            return Some(event);
                        }
                    }
                    Some(Err(e)) => warn!(error = %e, "terminal event stream error"),
                    None => return None,
                },
            }
        }
    }
}

/// Map a crossterm event to the ones the app reacts to
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        // Only key presses, not releases
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
