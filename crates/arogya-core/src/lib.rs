pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod views;
pub mod widget;

// Re-export main types for convenience
pub use client::{HttpReplyService, ReplyService};
pub use config::{BubbleAlign, BubbleStyle, BubbleStyles, BusyPolicy, LoadingIndicatorStyle, WidgetConfig};
pub use error::ChatError;
pub use state::{Change, Entry, Message, Sender, Ticket, Transcript};
pub use views::{NavLink, Panel, ViewSwitcher};
pub use widget::{ChatWidget, InputLine, Reply, ReplyRequest, SessionStats, Submission};
