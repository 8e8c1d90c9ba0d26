use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::session::{App, SaveStatus};

pub fn draw_statusbar(f: &mut Frame, area: Rect, app: &App) {
    let counts = app
        .session
        .as_ref()
        .map(|s| s.status_counts())
        .unwrap_or_default();

    let (save_text, save_color) = match &app.save_status {
        SaveStatus::Idle => (String::new(), Color::DarkGray),
        SaveStatus::Saving => ("saving...".to_string(), Color::Yellow),
        SaveStatus::Saved(at) => (format!("saved {}", at.format("%H:%M:%S")), Color::Green),
        SaveStatus::Failed { consecutive, .. } => (
            format!("save failed x{}, retrying", consecutive),
            Color::Red,
        ),
    };

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("✓ {} answered", counts.answered),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("⚑ {} flagged", counts.flagged),
            Style::default().fg(Color::Red),
        ),
        Span::raw("   "),
        Span::styled(
            format!("○ {} unanswered", counts.unanswered),
            Style::default().fg(Color::White),
        ),
        Span::raw("   "),
        Span::styled(
            format!("· {} unread", counts.unread),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if !save_text.is_empty() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(save_text, Style::default().fg(save_color)));
    }

    spans.push(Span::raw("   "));
    spans.push(Span::styled("[?] help", Style::default().fg(Color::DarkGray)));

    let widget =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}
