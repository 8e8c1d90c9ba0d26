use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::session::App;
use crate::timer::format_duration;

/// Top row: centered subject name with the countdown pinned to the right
/// edge. The countdown flips to white-on-red for the final two minutes.
pub fn draw_titlebar(f: &mut Frame, area: Rect, app: &App) {
    let width = area.width as usize;
    let subject = app
        .session
        .as_ref()
        .map(|s| s.paper.subject.name.as_str())
        .unwrap_or("Exam");
    let title = format!("[ {} ]", subject);

    let (timer, timer_style) = match app.remaining_seconds {
        Some(secs) if secs <= 120 && secs > 0 => (
            format!(" {} remaining ", format_duration(secs)),
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Some(secs) => (
            format!(" {} remaining ", format_duration(secs)),
            Style::default().fg(Color::Rgb(200, 200, 120)),
        ),
        None => (String::new(), Style::default()),
    };

    let title_cols = title.chars().count();
    let timer_cols = timer.chars().count();
    let left = width.saturating_sub(title_cols) / 2;
    let right = width.saturating_sub(left + title_cols + timer_cols);

    let line = Line::from(vec![
        Span::raw(" ".repeat(left)),
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(right)),
        Span::styled(timer, timer_style),
    ]);

    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}
