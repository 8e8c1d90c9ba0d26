use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::session::App;
use crate::timer::format_duration;
use crate::ui::markdown::markdown_to_lines;

/// Pre-exam page: paper facts and instructions. The countdown is already
/// running while this is shown.
pub fn draw_instructions(f: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let paper = &session.paper;
    let duration_secs = paper
        .end_time
        .signed_duration_since(paper.start_time)
        .num_seconds();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", paper.subject.name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "  {} questions · {} marks · {}",
                paper.total_questions,
                paper.max_marks,
                format_duration(duration_secs)
            ),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "─".repeat(area.width.saturating_sub(4) as usize),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    if paper.instructions.trim().is_empty() {
        lines.push(Line::from(Span::styled(
            "  No special instructions.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for line in markdown_to_lines(&paper.instructions) {
            let indented = Line::from(
                std::iter::once(Span::raw("  "))
                    .chain(line.spans.into_iter())
                    .collect::<Vec<_>>(),
            );
            lines.push(indented);
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "─".repeat(area.width.saturating_sub(4) as usize),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    if let Some(secs) = app.remaining_seconds {
        lines.push(Line::from(Span::styled(
            format!("  Time remaining: {}", format_duration(secs)),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("  [Enter] Begin", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Ctrl+Q] Quit", Style::default().fg(Color::DarkGray)),
    ]));
    lines.push(Line::from(""));

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
