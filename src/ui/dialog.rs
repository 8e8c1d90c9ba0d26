use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::session::{App, Dialog};

pub fn draw_dialog(f: &mut Frame, area: Rect, app: &App) {
    let Some(dialog) = app.top_dialog() else {
        return;
    };

    match dialog {
        Dialog::ConfirmSubmit => draw_confirm_submit(f, area, app),
        Dialog::ConfirmQuit => draw_confirm_quit(f, area),
        Dialog::SubmitFailed(error) => draw_submit_failed(f, area, error),
        Dialog::TimeWarning => draw_time_warning(f, area),
        Dialog::Help => draw_help(f, area),
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn draw_confirm_submit(f: &mut Frame, area: Rect, app: &App) {
    // unanswered_count covers flagged questions too, unlike the sidebar
    // status buckets where a flag wins over everything else.
    let (unanswered, flagged) = app
        .session
        .as_ref()
        .map(|s| (s.unanswered_count(), s.status_counts().flagged))
        .unwrap_or_default();

    let mut msg_lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Submit your exam?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if unanswered > 0 {
        msg_lines.push(Line::from(Span::styled(
            format!("   {} questions are not answered.", unanswered),
            Style::default().fg(Color::White),
        )));
    }
    if flagged > 0 {
        msg_lines.push(Line::from(Span::styled(
            format!("   {} questions are flagged.", flagged),
            Style::default().fg(Color::White),
        )));
    }

    msg_lines.push(Line::from(""));
    msg_lines.push(Line::from(vec![
        Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ]));
    msg_lines.push(Line::from(""));

    // +2 keeps the border from clipping the hint row
    let rect = centered_rect(42, msg_lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let widget = Paragraph::new(msg_lines).block(block);
    f.render_widget(widget, rect);
}

fn draw_confirm_quit(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Quit?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   The timer keeps running on the"),
        Line::from("   server. Answers are kept up to"),
        Line::from("   the last save."),
        Line::from(""),
        Line::from(vec![
            Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
            Span::raw("    "),
            Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];

    let rect = centered_rect(38, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, rect);
}

fn draw_submit_failed(f: &mut Frame, area: Rect, error: &str) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   ✗  Submission Failed",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for chunk in wrap_plain(error, 40).into_iter().take(3) {
        lines.push(Line::from(format!("   {}", chunk)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from("   Your answers are kept up to the"));
    lines.push(Line::from("   last save."));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   [Enter] Retry", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Close", Style::default().fg(Color::DarkGray)),
    ]));
    lines.push(Line::from(""));

    let rect = centered_rect(48, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, rect);
}

fn draw_time_warning(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   ⚠  2 MINUTES REMAINING",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   Your attempt will submit on its"),
        Line::from("   own when time expires."),
        Line::from(""),
        Line::from(Span::styled(
            "          [Enter] Continue",
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
    ];

    let rect = centered_rect(42, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, rect);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Key Bindings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   arrows     Previous/Next question"),
        Line::from("   PgUp/PgDn  Jump 5 questions"),
        Line::from("   Home/End   First/Last question"),
        Line::from("   a-z        Select choice"),
        Line::from("   t/f        Answer true/false"),
        Line::from("   Enter      Edit text answer"),
        Line::from("   Ctrl+E     Open external editor"),
        Line::from("   Ctrl+F     Toggle flag"),
        Line::from("   Ctrl+S     Submit attempt"),
        Line::from("   Ctrl+Q     Quit"),
        Line::from("   ?          This help"),
        Line::from("   Esc        Close dialog"),
        Line::from(""),
        Line::from(Span::styled(
            "        [Esc] Close",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let rect = centered_rect(44, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, rect);
}

/// Break a message into lines of at most `width` chars at word boundaries.
fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            result.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}
