use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::model::QuestionType;
use crate::session::{App, ExamSession, InputMode};
use crate::ui::markdown::markdown_to_lines;

/// Maps content lines to clickable options for mouse handling.
pub struct HitMap {
    /// (first_content_line, option_index) for each rendered option.
    pub choice_lines: Vec<(usize, usize)>,
    /// First content line past the last option row.
    pub choices_end: usize,
}

/// Compute the hit map for the current question, mirroring draw_question's
/// layout. Only choice questions are clickable, so text questions yield none.
pub fn compute_hit_map(app: &App, area: Rect) -> Option<HitMap> {
    let question = app.current_question()?;

    if !matches!(
        question.question_type,
        QuestionType::Mcq | QuestionType::TrueFalse
    ) {
        return None;
    }

    let area_width = area.width as usize;
    let mut line_count: usize = 0;

    // Header: title + meta + blank
    line_count += 3;

    // Body lines (wrapped)
    let body_lines = markdown_to_lines(&question.question_text);
    let body_wrap_width = area_width.saturating_sub(4);
    for bl in body_lines {
        line_count += wrap_styled_line(bl, body_wrap_width).len();
    }

    line_count += 1; // blank line before options

    let mut choice_lines: Vec<(usize, usize)> = Vec::new();
    match question.question_type {
        QuestionType::Mcq => {
            for (i, option) in question.options.iter().enumerate() {
                choice_lines.push((line_count, i));
                let prefix_len = 9; // "  (●) A. "
                let text_width = area_width.saturating_sub(prefix_len);
                line_count += wrap_text(option, text_width).len();
            }
        }
        QuestionType::TrueFalse => {
            choice_lines.push((line_count, 0));
            choice_lines.push((line_count + 1, 1));
            line_count += 2;
        }
        _ => unreachable!(),
    }

    Some(HitMap {
        choice_lines,
        choices_end: line_count,
    })
}

pub fn draw_question(f: &mut Frame, area: Rect, app: &App) {
    let question = match app.current_question() {
        Some(q) => q.clone(),
        None => {
            let p = Paragraph::new("No questions").block(Block::default().borders(Borders::ALL));
            f.render_widget(p, area);
            return;
        }
    };
    let session = match app.session.as_ref() {
        Some(s) => s,
        None => return,
    };

    let mut lines: Vec<Line> = Vec::new();
    let number = app.current_question + 1;

    // Question header
    lines.push(Line::from(Span::styled(
        format!("  ## Question {}", number),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    let mark_word = if question.marks == 1 { "mark" } else { "marks" };
    lines.push(Line::from(Span::styled(
        format!(
            "  {} {} · {}",
            question.marks,
            mark_word,
            question.difficulty.label()
        ),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    // Question body (markdown, with wrapping)
    let body_lines = markdown_to_lines(&question.question_text);
    let body_wrap_width = (area.width as usize).saturating_sub(4);
    for line in body_lines {
        for wline in wrap_styled_line(line, body_wrap_width) {
            let indented = Line::from(
                std::iter::once(Span::raw("  "))
                    .chain(wline.spans.into_iter())
                    .collect::<Vec<_>>(),
            );
            lines.push(indented);
        }
    }

    lines.push(Line::from(""));

    // Answer widget
    match question.question_type {
        QuestionType::Mcq => {
            let selected_idx = session
                .answer(&question.id)
                .and_then(|v| v.as_array())
                .and_then(|a| a.first())
                .and_then(|v| v.as_u64())
                .map(|n| n as usize);

            for (i, option) in question.options.iter().enumerate() {
                let is_selected = selected_idx == Some(i);
                let letter = (b'A' + i as u8) as char;
                let radio = if is_selected { "(●)" } else { "( )" };
                let style = if is_selected {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };

                let prefix = format!("  {} {}. ", radio, letter);
                let prefix_len = prefix.chars().count();
                let text_width = (area.width as usize).saturating_sub(prefix_len);
                let wrapped = wrap_text(option, text_width);
                for (li, wline) in wrapped.iter().enumerate() {
                    if li == 0 {
                        lines.push(Line::from(vec![
                            Span::styled(prefix.clone(), style),
                            Span::styled(wline.clone(), style),
                        ]));
                    } else {
                        lines.push(Line::from(vec![
                            Span::raw(" ".repeat(prefix_len)),
                            Span::styled(wline.clone(), style),
                        ]));
                    }
                }
            }
        }
        QuestionType::TrueFalse => {
            let picked = session.answer(&question.id).and_then(|v| v.as_bool());
            for (label, key, want) in [("True", "t", true), ("False", "f", false)] {
                let is_selected = picked == Some(want);
                let radio = if is_selected { "(●)" } else { "( )" };
                let style = if is_selected {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {} {}", radio, label), style),
                    Span::styled(format!("  [{}]", key), Style::default().fg(Color::DarkGray)),
                ]));
            }
        }
        QuestionType::FillInTheBlank => {
            draw_fill_box(&mut lines, area, app, session, &question.id);
        }
        QuestionType::Essay => {
            draw_essay_editor(&mut lines, area, app, session, &question.id);
        }
    }

    // Apply scroll with clamping
    let total_content_lines = lines.len();
    let visible_height = area.height as usize;
    let scroll = app
        .question_scroll
        .min(total_content_lines.saturating_sub(visible_height));
    let display_lines: Vec<Line> = lines.into_iter().skip(scroll).collect();

    let widget = Paragraph::new(display_lines);
    f.render_widget(widget, area);

    if total_content_lines > visible_height {
        let mut scrollbar_state = ScrollbarState::new(total_content_lines)
            .position(scroll)
            .viewport_content_length(visible_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

/// Single-line input box for fill-in-the-blank answers.
fn draw_fill_box(
    lines: &mut Vec<Line<'static>>,
    area: Rect,
    app: &App,
    session: &ExamSession,
    question_id: &str,
) {
    let stored = session
        .answer(question_id)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let is_editing = app.input_mode == InputMode::TextInput;
    let display_text = if is_editing {
        app.text_input.clone()
    } else {
        stored
    };

    // Box frame: 2 margin each side; dashes exclude the corners, the inner
    // text width also excludes the "│ " and " │" gutters
    let dashes = area.width.saturating_sub(6) as usize;
    let inner = area.width.saturating_sub(8) as usize;

    lines.push(Line::from(vec![
        Span::raw("  ┌"),
        Span::raw("─".repeat(dashes)),
        Span::raw("┐"),
    ]));

    if display_text.is_empty() && !is_editing {
        let placeholder = "Type your answer...";
        let ph_len = placeholder.len().min(inner);
        let padding = inner.saturating_sub(ph_len);
        lines.push(Line::from(vec![
            Span::raw("  │ "),
            Span::styled(placeholder, Style::default().fg(Color::DarkGray)),
            Span::raw(" ".repeat(padding)),
            Span::raw(" │"),
        ]));
    } else {
        let display_len = floor_boundary(&display_text, inner);
        let shown_chars = display_text[..display_len].chars().count();

        let mut spans = vec![Span::raw("  │ ")];
        if is_editing {
            let cursor_pos = floor_boundary(&display_text, app.text_cursor.min(display_len));
            if cursor_pos < display_len {
                let ch_end = next_boundary(&display_text, cursor_pos);
                spans.push(Span::styled(
                    display_text[..cursor_pos].to_string(),
                    Style::default().fg(Color::White),
                ));
                spans.push(Span::styled(
                    display_text[cursor_pos..ch_end].to_string(),
                    Style::default().fg(Color::Black).bg(Color::White),
                ));
                spans.push(Span::styled(
                    display_text[ch_end..display_len].to_string(),
                    Style::default().fg(Color::White),
                ));
                spans.push(Span::raw(" ".repeat(inner.saturating_sub(shown_chars))));
            } else {
                spans.push(Span::styled(
                    display_text[..display_len].to_string(),
                    Style::default().fg(Color::White),
                ));
                // Cursor at end, shown as a block on a space
                spans.push(Span::styled(
                    " ".to_string(),
                    Style::default().fg(Color::Black).bg(Color::White),
                ));
                spans.push(Span::raw(" ".repeat(inner.saturating_sub(shown_chars + 1))));
            }
        } else {
            spans.push(Span::styled(
                display_text[..display_len].to_string(),
                Style::default().fg(Color::White),
            ));
            spans.push(Span::raw(" ".repeat(inner.saturating_sub(shown_chars))));
        }
        spans.push(Span::raw(" │"));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(vec![
        Span::raw("  └"),
        Span::raw("─".repeat(dashes)),
        Span::raw("┘"),
    ]));
}

/// Multi-line editor view for essay answers, scrolled to keep the cursor
/// visible. Editing happens inline or through an external editor.
fn draw_essay_editor(
    lines: &mut Vec<Line<'static>>,
    area: Rect,
    app: &App,
    session: &ExamSession,
    question_id: &str,
) {
    let is_editing = app.input_mode == InputMode::TextInput;
    let display_text = if is_editing {
        app.text_input.clone()
    } else {
        session
            .answer(question_id)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    // Lines after the editor: blank + external-editor hint
    let after_count = 2;
    let before_count = lines.len();
    let editor_inner = (area.height as usize)
        .saturating_sub(before_count)
        .saturating_sub(2) // top + bottom border
        .saturating_sub(after_count)
        .max(1);

    let dashes = area.width.saturating_sub(6) as usize;
    let inner_w = area.width.saturating_sub(8) as usize;

    let text_lines: Vec<&str> = if display_text.is_empty() {
        vec![""]
    } else {
        display_text.split('\n').collect()
    };

    // Cursor logical position (row, byte column within row)
    let (cursor_row, cursor_col) = if is_editing {
        let pos = floor_boundary(&app.text_input, app.text_cursor);
        let before = &app.text_input[..pos];
        let row = before.matches('\n').count();
        let col = before.rfind('\n').map_or(pos, |p| pos - p - 1);
        (row, col)
    } else {
        (0, 0)
    };

    // Build visual rows with word wrapping
    let mut visual_rows: Vec<String> = Vec::new();
    let mut cursor_vrow: usize = 0;
    let mut cursor_vcol: usize = 0;

    for (li, line_text) in text_lines.iter().enumerate() {
        let wraps = wrap_with_offsets(line_text, inner_w);
        if is_editing && li == cursor_row {
            let (vr, vc) = find_visual_cursor(&wraps, cursor_col);
            cursor_vrow = visual_rows.len() + vr;
            cursor_vcol = vc;
        }
        for (_offset, display) in wraps {
            visual_rows.push(display);
        }
    }

    // Location indicator in the top border
    let current_line = if is_editing {
        cursor_row + 1
    } else if !display_text.is_empty() {
        1
    } else {
        0
    };
    let indicator = if current_line > 0 {
        format!("[line {} of {}]", current_line, text_lines.len())
    } else {
        String::new()
    };
    let left_dashes = dashes.saturating_sub(indicator.len());
    lines.push(Line::from(vec![
        Span::raw("  ┌"),
        Span::raw("─".repeat(left_dashes)),
        Span::styled(indicator, Style::default().fg(Color::DarkGray)),
        Span::raw("┐"),
    ]));

    let scroll = if cursor_vrow >= editor_inner {
        cursor_vrow - editor_inner + 1
    } else {
        0
    };

    for vi in 0..editor_inner {
        let row_idx = scroll + vi;
        if row_idx < visual_rows.len() {
            let row_text = &visual_rows[row_idx];
            let display_len = floor_boundary(row_text, inner_w);
            let shown_chars = row_text[..display_len].chars().count();

            if is_editing && row_idx == cursor_vrow {
                let col = floor_boundary(row_text, cursor_vcol.min(display_len));
                let mut spans = vec![Span::raw("  │ ")];
                if col < display_len {
                    let ch_end = next_boundary(row_text, col);
                    spans.push(Span::styled(
                        row_text[..col].to_string(),
                        Style::default().fg(Color::White),
                    ));
                    spans.push(Span::styled(
                        row_text[col..ch_end].to_string(),
                        Style::default().fg(Color::Black).bg(Color::White),
                    ));
                    spans.push(Span::styled(
                        row_text[ch_end..display_len].to_string(),
                        Style::default().fg(Color::White),
                    ));
                    spans.push(Span::raw(" ".repeat(inner_w.saturating_sub(shown_chars))));
                } else {
                    spans.push(Span::styled(
                        row_text[..display_len].to_string(),
                        Style::default().fg(Color::White),
                    ));
                    spans.push(Span::styled(
                        " ".to_string(),
                        Style::default().fg(Color::Black).bg(Color::White),
                    ));
                    spans.push(Span::raw(
                        " ".repeat(inner_w.saturating_sub(shown_chars + 1)),
                    ));
                }
                spans.push(Span::raw(" │"));
                lines.push(Line::from(spans));
            } else if row_idx == 0 && !is_editing && display_text.is_empty() {
                let placeholder = "Type your answer...";
                let ph_len = placeholder.len().min(inner_w);
                let padding = inner_w.saturating_sub(ph_len);
                lines.push(Line::from(vec![
                    Span::raw("  │ "),
                    Span::styled(placeholder, Style::default().fg(Color::DarkGray)),
                    Span::raw(" ".repeat(padding)),
                    Span::raw(" │"),
                ]));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  │ "),
                    Span::styled(
                        row_text[..display_len].to_string(),
                        Style::default().fg(Color::White),
                    ),
                    Span::raw(" ".repeat(inner_w.saturating_sub(shown_chars))),
                    Span::raw(" │"),
                ]));
            }
        } else {
            lines.push(Line::from(vec![
                Span::raw("  │ "),
                Span::raw(" ".repeat(inner_w)),
                Span::raw(" │"),
            ]));
        }
    }

    lines.push(Line::from(vec![
        Span::raw("  └"),
        Span::raw("─".repeat(dashes)),
        Span::raw("┘"),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [Ctrl+E] Open in $EDITOR",
        Style::default().fg(Color::DarkGray),
    )));
}

/// Wrap a styled Line at `width`, preserving span styles across breaks.
fn wrap_styled_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line];
    }

    let total_width: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
    if total_width <= width {
        return vec![line];
    }

    // Flatten into (char, style) pairs
    let mut chars: Vec<(char, Style)> = Vec::new();
    for span in &line.spans {
        for c in span.content.chars() {
            chars.push((c, span.style));
        }
    }

    let mut result: Vec<Line<'static>> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars.len() - pos <= width {
            result.push(styled_chars_to_line(&chars[pos..]));
            break;
        }

        let chunk_end = pos + width;
        let break_at = if chunk_end < chars.len() && chars[chunk_end].0 == ' ' {
            chunk_end
        } else if let Some(sp) = chars[pos..chunk_end].iter().rposition(|(c, _)| *c == ' ') {
            if sp > 0 {
                pos + sp
            } else {
                chunk_end
            }
        } else {
            chunk_end
        };

        result.push(styled_chars_to_line(&chars[pos..break_at]));
        pos = break_at;
        if pos < chars.len() && chars[pos].0 == ' ' {
            pos += 1;
        }
    }

    if result.is_empty() {
        result.push(Line::from(""));
    }

    result
}

/// Rebuild a Line from (char, style) pairs, grouping runs of the same style.
fn styled_chars_to_line(chars: &[(char, Style)]) -> Line<'static> {
    if chars.is_empty() {
        return Line::from("");
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_text = String::new();
    let mut current_style = chars[0].1;

    for &(c, style) in chars {
        if style == current_style {
            current_text.push(c);
        } else {
            if !current_text.is_empty() {
                spans.push(Span::styled(current_text, current_style));
                current_text = String::new();
            }
            current_style = style;
            current_text.push(c);
        }
    }
    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, current_style));
    }

    Line::from(spans)
}

/// Word-wrap one logical line, returning (start_byte_offset, display_text)
/// for each visual row. Breaks land on char boundaries.
fn wrap_with_offsets(text: &str, width: usize) -> Vec<(usize, String)> {
    if text.is_empty() {
        return vec![(0, String::new())];
    }
    if width == 0 {
        return vec![(0, text.to_string())];
    }

    let mut result: Vec<(usize, String)> = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if rest.chars().count() <= width {
            result.push((pos, rest.to_string()));
            break;
        }

        // Byte offset of the first char past the visible chunk
        let chunk_end = rest
            .char_indices()
            .nth(width)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let chunk = &rest[..chunk_end];

        if rest[chunk_end..].starts_with(' ') {
            // Natural break right after the chunk
            result.push((pos, chunk.to_string()));
            pos += chunk_end + 1;
        } else if let Some(sp) = chunk.rfind(' ') {
            if sp > 0 {
                result.push((pos, chunk[..sp].to_string()));
                pos += sp + 1;
            } else {
                // Only a leading space, hard break
                result.push((pos, chunk.to_string()));
                pos += chunk_end;
            }
        } else {
            // No space found, hard break
            result.push((pos, chunk.to_string()));
            pos += chunk_end;
        }
    }

    if result.is_empty() {
        result.push((0, String::new()));
    }

    result
}

/// Find the visual (row_within_line, byte_col) for a cursor at `cursor_col`
/// in a wrapped line.
fn find_visual_cursor(wraps: &[(usize, String)], cursor_col: usize) -> (usize, usize) {
    for (i, (start, text)) in wraps.iter().enumerate() {
        let next_start = if i + 1 < wraps.len() {
            wraps[i + 1].0
        } else {
            usize::MAX
        };
        if cursor_col < next_start || i == wraps.len() - 1 {
            return (i, cursor_col.saturating_sub(*start).min(text.len()));
        }
    }
    (0, 0)
}

/// Wrap plain text to fit within `width` columns, breaking at word
/// boundaries.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
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

/// Clamp a byte index to the nearest char boundary at or before it.
fn floor_boundary(text: &str, idx: usize) -> usize {
    let mut i = idx.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Byte index just past the char starting at `idx`.
fn next_boundary(text: &str, idx: usize) -> usize {
    text[idx..].chars().next().map_or(idx, |c| idx + c.len_utf8())
}
