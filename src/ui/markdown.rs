use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render markdown (question text, paper instructions) into styled lines.
pub fn markdown_to_lines(text: &str) -> Vec<Line<'static>> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = LineBuilder::default();
    for event in Parser::new_ext(text, opts) {
        builder.push_event(event);
    }
    builder.finish()
}

/// Accumulates spans into lines while tracking nested inline styles.
#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
}

impl LineBuilder {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn push_event(&mut self, event: Event) {
        match event {
            Event::Start(Tag::Paragraph) | Event::Start(Tag::CodeBlock(_)) => {
                self.spans.clear();
            }
            Event::End(TagEnd::Paragraph) => {
                self.flush();
                self.blank();
            }
            Event::Start(Tag::Heading { level, .. }) => {
                self.spans.clear();
                let depth = match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    _ => 3,
                };
                self.spans.push(Span::styled(
                    format!("{} ", "#".repeat(depth)),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush();
                self.blank();
            }
            Event::Start(Tag::Item) => {
                self.spans.clear();
                self.spans.push(Span::raw("  • "));
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::Strong) => {
                self.styles.push(self.style().add_modifier(Modifier::BOLD));
            }
            Event::Start(Tag::Emphasis) => {
                self.styles.push(self.style().add_modifier(Modifier::ITALIC));
            }
            Event::Start(Tag::Strikethrough) => {
                self.styles
                    .push(self.style().add_modifier(Modifier::CROSSED_OUT));
            }
            Event::End(TagEnd::Strong)
            | Event::End(TagEnd::Emphasis)
            | Event::End(TagEnd::Strikethrough) => {
                self.styles.pop();
            }
            Event::Text(text) => {
                let style = self.style();
                self.spans.push(Span::styled(text.to_string(), style));
            }
            Event::Code(code) => {
                self.spans.push(Span::styled(
                    format!("`{}`", code),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}
