use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::session::{App, QuestionStatus};

/// Lines below the question list: 1 separator + 4 count rows. The mouse
/// handler subtracts this from the sidebar height to find the list area.
pub const STATUS_BLOCK_LINES: usize = 5;

/// First list row shown, chosen so the current question stays centered
/// once the list overflows. Rendering and mouse hit-testing both use this.
pub fn scroll_offset(app: &App, visible: usize) -> usize {
    let total = app.question_count();
    if visible == 0 || total <= visible {
        return 0;
    }
    app.current_question
        .saturating_sub(visible / 2)
        .min(total - visible)
}

pub fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(1) as usize; // -1 for right border
    let list_height = inner_height.saturating_sub(STATUS_BLOCK_LINES);
    let total = app.question_count();
    let offset = scroll_offset(app, list_height);

    if let Some(session) = app.session.as_ref() {
        for (qi, q) in session
            .paper
            .questions
            .iter()
            .enumerate()
            .skip(offset)
        {
            if lines.len() >= list_height {
                break;
            }

            let status = session.question_status(&q.id);
            let (icon, icon_color) = match status {
                QuestionStatus::Unread => ("·", Color::DarkGray),
                QuestionStatus::Unanswered => ("○", Color::White),
                QuestionStatus::Answered => ("✓", Color::Green),
                QuestionStatus::Flagged => ("⚑", Color::Red),
            };

            let is_current = qi == app.current_question;
            let bg = if is_current { Color::DarkGray } else { Color::Reset };
            let row_fg = match status {
                QuestionStatus::Answered => Some(Color::Green),
                QuestionStatus::Flagged => Some(Color::Red),
                _ => None,
            };
            let style = if is_current {
                let s = Style::default().add_modifier(Modifier::BOLD).bg(bg);
                match row_fg {
                    Some(fg) => s.fg(fg),
                    None => s.fg(Color::White),
                }
            } else if let Some(fg) = row_fg {
                Style::default().fg(fg).bg(bg)
            } else {
                Style::default().bg(bg)
            };

            lines.push(Line::from(vec![
                Span::styled(if is_current { " ▸ " } else { "   " }.to_string(), style),
                Span::styled(format!("{} ", icon), Style::default().fg(icon_color).bg(bg)),
                Span::styled(format!("{:>2}. ", qi + 1), style),
                Span::styled(q.question_type.label().to_string(), style),
            ]));
        }
    }

    while lines.len() < list_height {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "─".repeat(inner_width),
        Style::default().fg(Color::DarkGray),
    )));

    let counts = app
        .session
        .as_ref()
        .map(|s| s.status_counts())
        .unwrap_or_default();
    let max_n = *[counts.answered, counts.flagged, counts.unanswered, counts.unread]
        .iter()
        .max()
        .unwrap_or(&0);
    let width = if max_n >= 100 {
        3
    } else if max_n >= 10 {
        2
    } else {
        1
    };

    let status_items: Vec<(&str, usize, Color, &str)> = vec![
        ("✓", counts.answered, Color::Green, "answered"),
        ("⚑", counts.flagged, Color::Red, "flagged"),
        ("○", counts.unanswered, Color::White, "unanswered"),
        ("·", counts.unread, Color::DarkGray, "unread"),
    ];

    for (icon, count, color, label) in status_items {
        lines.push(Line::from(Span::styled(
            format!("  {} {:>w$} {}", icon, count, label, w = width),
            Style::default().fg(color),
        )));
    }

    let sidebar_title = format!(" {} Questions ", total);

    let block = Block::default()
        .borders(Borders::RIGHT)
        .title(sidebar_title)
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, area);

    if total > list_height {
        let scrollbar_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: list_height as u16,
        };
        let mut scrollbar_state = ScrollbarState::new(total.saturating_sub(1))
            .position(app.current_question)
            .viewport_content_length(3);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}
