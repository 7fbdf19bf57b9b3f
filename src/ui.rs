use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use arogya_core::{BubbleAlign, BubbleStyle, BusyPolicy, Entry, LoadingIndicatorStyle, Message, Sender};
use crate::app::{App, FocusPane, InputMode, CHAT_VIEW, DASHBOARD_VIEW, SETTINGS_VIEW};

const SIDEBAR_WIDTH: u16 = 18;
const SEND_WIDTH: u16 = 10;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            // Push any accumulated plain text
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

/// Colour name or `#rrggbb` from the config, falling back when unparseable
fn parse_color(name: &str, fallback: Color) -> Color {
    name.parse().unwrap_or(fallback)
}

fn alignment(align: BubbleAlign) -> Alignment {
    match align {
        BubbleAlign::Left => Alignment::Left,
        BubbleAlign::Right => Alignment::Right,
    }
}

fn label_line(bubble: &BubbleStyle, fallback: Color) -> Line<'static> {
    Line::from(Span::styled(
        format!("{}:", bubble.label),
        Style::default()
            .fg(parse_color(&bubble.color, fallback))
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(alignment(bubble.align))
}

/// Label, body and trailing blank line for one message
fn message_lines(msg: &Message, bubble: &BubbleStyle, fallback: Color) -> Vec<Line<'static>> {
    let mut lines = vec![label_line(bubble, fallback)];
    let align = alignment(bubble.align);
    match msg.sender {
        Sender::Ai => {
            for line in msg.text.lines() {
                lines.push(parse_markdown_line(line).alignment(align));
            }
        }
        Sender::User => {
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()).alignment(align));
            }
        }
    }
    lines.push(Line::default());
    lines
}

fn loading_line(style: LoadingIndicatorStyle, frame: u8) -> Line<'static> {
    match style {
        LoadingIndicatorStyle::Dots => {
            // One dot lit at a time, left to right
            let spans = (0..3u8)
                .map(|i| {
                    let color = if i == frame { Color::White } else { Color::DarkGray };
                    Span::styled(if i < 2 { "● " } else { "●" }, Style::default().fg(color))
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        }
        LoadingIndicatorStyle::Ellipsis => Line::from(Span::styled(
            ".".repeat(frame as usize + 1),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);

    // Hidden panels get no hit areas
    app.chat_area = None;
    app.input_area = None;
    app.send_area = None;

    let visible = app.views.visible_panel().map(str::to_string);
    match visible.as_deref() {
        Some(CHAT_VIEW) => render_chat_panel(app, frame, main_area),
        Some(DASHBOARD_VIEW) => render_dashboard(app, frame, main_area),
        Some(SETTINGS_VIEW) => render_settings(app, frame, main_area),
        _ => render_empty(frame, main_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let waiting = if app.widget.is_awaiting_reply() {
        " [waiting for reply]"
    } else {
        ""
    };

    let title = Line::from(vec![
        Span::styled(" Arogya AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Health & Fitness Coach", Style::default().fg(Color::White)),
        Span::styled(waiting, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    app.sidebar_area = Some(area);

    let focused = app.focus == FocusPane::Sidebar;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let items: Vec<ListItem> = app
        .views
        .links()
        .iter()
        .map(|link| {
            let style = if link.active {
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(format!(" {} ", link.label)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Menu "),
        )
        .highlight_symbol(if focused { "> " } else { "  " });

    frame.render_stateful_widget(list, area, &mut app.sidebar_state);
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let suggestions_height = if app.suggestions_visible() {
        (app.widget.config().suggestions.len().min(9) + 2) as u16
    } else {
        0
    };

    let [chat_area, suggestions_area, input_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(suggestions_height),
        Constraint::Length(3),
    ])
    .areas(area);

    render_transcript(app, frame, chat_area);
    if suggestions_height > 0 {
        render_suggestions(app, frame, suggestions_area);
    }
    render_input(app, frame, input_row);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store dimensions for scroll calculations (inner size minus borders)
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let config = app.widget.config();
    let mut lines: Vec<Line> = Vec::new();

    for entry in app.widget.transcript().entries() {
        match entry {
            Entry::Message(msg) => {
                let (bubble, fallback) = match msg.sender {
                    Sender::User => (&config.bubbles.user, Color::Cyan),
                    Sender::Ai => (&config.bubbles.ai, Color::Yellow),
                };
                lines.extend(message_lines(msg, bubble, fallback));
            }
            Entry::Placeholder { .. } => {
                lines.push(label_line(&config.bubbles.ai, Color::Yellow));
                lines.push(
                    loading_line(config.loading_indicator_style, app.animation_frame)
                        .alignment(alignment(config.bubbles.ai.align)),
                );
                lines.push(Line::default());
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_suggestions(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let lines: Vec<Line> = app
        .widget
        .config()
        .suggestions
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, text)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), key_style),
                Span::raw(format!(" {}", text)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Try asking ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_WIDTH),
    ])
    .areas(area);

    app.input_area = Some(input_area);
    app.send_area = Some(send_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message (i to type) ");

    // Horizontal scroll that keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.widget.input().cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .widget
        .input()
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    let send_color = if app.widget.is_awaiting_reply() {
        Color::DarkGray
    } else {
        Color::Green
    };
    let send = Paragraph::new(Span::styled("Send", Style::default().add_modifier(Modifier::BOLD)))
        .alignment(Alignment::Center)
        .style(Style::default().fg(send_color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(send_color)),
        );
    frame.render_widget(send, send_area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<20}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White).bold()),
    ])
}

fn render_dashboard(app: &App, frame: &mut Frame, area: Rect) {
    let stats = app.widget.stats();

    let lines = vec![
        Line::default(),
        stat_line("Messages sent", stats.sent.to_string()),
        stat_line("Replies received", stats.replies.to_string()),
        stat_line("Errors shown", stats.failures.to_string()),
        stat_line(
            "Waiting for reply",
            if app.widget.is_awaiting_reply() { "yes" } else { "no" }.to_string(),
        ),
        stat_line("Queued messages", app.widget.queued_len().to_string()),
        Line::default(),
        stat_line("Coach server", app.widget.config().chat_endpoint()),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Dashboard ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_settings(app: &App, frame: &mut Frame, area: Rect) {
    let config = app.widget.config();
    let indicator = match config.loading_indicator_style {
        LoadingIndicatorStyle::Dots => "dots",
        LoadingIndicatorStyle::Ellipsis => "ellipsis",
    };
    let policy = match config.busy_policy {
        BusyPolicy::Reject => "reject",
        BusyPolicy::Queue => "queue",
    };

    let lines = vec![
        Line::default(),
        stat_line("Server URL", config.server_url.clone()),
        stat_line("Loading indicator", indicator.to_string()),
        stat_line("While waiting", policy.to_string()),
        stat_line(
            "User bubble",
            format!("{} ({})", config.bubbles.user.label, config.bubbles.user.color),
        ),
        stat_line(
            "Coach bubble",
            format!("{} ({})", config.bubbles.ai.label, config.bubbles.ai.color),
        ),
        stat_line("Suggestions", config.suggestions.len().to_string()),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Settings (edit config.json to change) ");

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let text = Paragraph::new(Span::styled(
        "Nothing to show",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(text, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " MENU ",
        InputMode::Editing => " TYPE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.input_mode {
        InputMode::Normal => {
            let mut hints = vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" menu ", label_style),
                Span::styled(" Enter ", key_style),
                Span::styled(" open ", label_style),
            ];
            if app.chat_visible() {
                hints.extend(vec![
                    Span::styled(" i ", key_style),
                    Span::styled(" type ", label_style),
                ]);
                if app.suggestions_visible() {
                    hints.extend(vec![
                        Span::styled(" 1-9 ", key_style),
                        Span::styled(" suggestion ", label_style),
                    ]);
                }
            }
            hints.extend(vec![
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

    if let Some(status) = &app.status {
        hints.push(Span::styled(
            format!("  {}", status),
            Style::default().bg(Color::Black).fg(Color::Yellow),
        ));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app_with;
    use arogya_core::{BubbleStyles, WidgetConfig};
    use ratatui::{backend::TestBackend, Terminal};

    const TEST_WIDTH: u16 = 100;
    const TEST_HEIGHT: u16 = 30;

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(TEST_WIDTH, TEST_HEIGHT)).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn chat_panel_shows_welcome_and_send_button() {
        let mut app = app_with(None, WidgetConfig::default());
        let screen = draw(&mut app);

        assert!(screen.contains("Hello! I'm Arogya AI. What is your primary health goal today?"));
        assert!(screen.contains("Send"));
        assert!(screen.contains("Try asking"));
        assert!(app.send_area.is_some());
        assert!(app.chat_area.is_some());
    }

    #[test]
    fn dots_placeholder_renders_three_dots() {
        let mut app = app_with(None, WidgetConfig::default());
        app.widget.transcript_mut().push_placeholder(1);
        let screen = draw(&mut app);
        assert!(screen.contains("● ● ●"));
    }

    #[test]
    fn ellipsis_placeholder_grows_with_frame() {
        let config = WidgetConfig {
            loading_indicator_style: LoadingIndicatorStyle::Ellipsis,
            ..WidgetConfig::default()
        };
        let mut app = app_with(None, config);
        app.widget.transcript_mut().push_placeholder(1);
        app.animation_frame = 2;
        let screen = draw(&mut app);
        assert!(screen.contains("..."));
        assert!(!screen.contains('●'));
    }

    #[test]
    fn dashboard_replaces_chat() {
        let mut app = app_with(None, WidgetConfig::default());
        app.open_link(1);
        let screen = draw(&mut app);

        assert!(screen.contains("Messages sent"));
        assert!(screen.contains("http://127.0.0.1:5000/chat"));
        assert!(!screen.contains("What is your primary health goal"));
        // hidden chat panel has no clickable send button
        assert!(app.send_area.is_none());
    }

    #[test]
    fn unknown_view_renders_empty_panel() {
        let mut app = app_with(None, WidgetConfig::default());
        app.views.show_view("progress", None);
        let screen = draw(&mut app);
        assert!(screen.contains("Nothing to show"));
    }

    #[test]
    fn bold_markdown_is_styled() {
        let line = parse_markdown_line("Eat **more protein** today");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "more protein");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));

        let unclosed = parse_markdown_line("a **b");
        assert_eq!(unclosed.spans.len(), 1);
        assert_eq!(unclosed.spans[0].content, "a **b");
    }

    #[test]
    fn bubbles_follow_configured_alignment() {
        let bubbles = BubbleStyles::default();
        let user = message_lines(&Message::user("hi"), &bubbles.user, Color::Cyan);
        assert_eq!(user[0].alignment, Some(Alignment::Right));
        assert_eq!(user[1].alignment, Some(Alignment::Right));

        let ai = message_lines(&Message::ai("hello"), &bubbles.ai, Color::Yellow);
        assert_eq!(ai[0].alignment, Some(Alignment::Left));
        assert_eq!(ai.len(), 3);
    }

    #[test]
    fn bad_colour_falls_back() {
        assert_eq!(parse_color("not-a-colour", Color::Yellow), Color::Yellow);
        assert_eq!(parse_color("cyan", Color::Yellow), Color::Cyan);
    }
}
