use askai_core::{Message, Sender};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let speech = if app.chat.speech_enabled() { "on" } else { "off" };
    let header = Line::from(vec![
        Span::styled(
            " ✦ Ask our AI anything ",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}  speech: {}", app.relay_url, speech),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn sender_line(sender: Sender) -> Line<'static> {
    let color = match sender {
        Sender::User => Color::Cyan,
        Sender::Bot => Color::Yellow,
    };
    Line::from(Span::styled(
        format!("{}:", sender.display_name()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn message_lines<'a>(msg: &'a Message, animation_frame: u8, lines: &mut Vec<Line<'a>>) {
    lines.push(sender_line(msg.sender));

    if msg.pending {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Bot is typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else {
        for line in msg.text.lines() {
            lines.push(Line::from(line));
        }
    }

    lines.push(Line::default());
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, used for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    app.clamp_scroll();

    let border_color = if app.input_mode == InputMode::Normal {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Chat ({}) ", app.chat.language().display_name()));

    let text = if app.chat.messages().is_empty() {
        Text::from(Span::styled(
            "Start a conversation by typing below.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for msg in app.chat.messages() {
            message_lines(msg, app.animation_frame, &mut lines);
        }
        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if app.input.is_listening() {
        Color::Red
    } else if editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = if app.input.is_listening() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        format!(" Listening{} ", dots)
    } else {
        " Ask me anything ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible (inner width excludes borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.input_mode {
        InputMode::Editing => "Enter send · Ctrl-T speak · Esc menu · Ctrl-C quit",
        InputMode::Normal => "i type · m speak · s speech on/off · j/k scroll · q quit",
    };

    let line = match &app.notice {
        Some(notice) => Line::from(vec![
            Span::styled(format!(" {} ", notice), Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::styled(format!("  {}", hints), Style::default().fg(Color::DarkGray)),
        ]),
        None => Line::from(Span::styled(format!(" {}", hints), Style::default().fg(Color::DarkGray))),
    };

    frame.render_widget(Paragraph::new(line), area);
}
