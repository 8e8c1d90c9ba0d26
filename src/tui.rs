use std::io;
use std::sync::mpsc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::Rect;
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;

use crate::api;
use crate::editor;
use crate::model::QuestionType;
use crate::net::{NetEvent, NetJob};
use crate::session::*;
use crate::timer::{self, TimerEvent};

pub fn run_tui(
    mut app: App,
    job_tx: mpsc::Sender<NetJob>,
    net_rx: mpsc::Receiver<NetEvent>,
) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Cannot enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| format!("Cannot enter alternate screen: {}", e))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("Cannot create terminal: {}", e))?;

    let result = main_loop(&mut terminal, &mut app, &job_tx, &net_rx);

    // Restore terminal. Dropping the app afterwards drops the countdown
    // receiver, which stops the timer thread; dropping the job sender in
    // the caller stops the worker.
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    job_tx: &mpsc::Sender<NetJob>,
    net_rx: &mpsc::Receiver<NetEvent>,
) -> Result<(), String> {
    loop {
        terminal
            .draw(|f| crate::ui::draw(f, app))
            .map_err(|e| format!("Draw error: {}", e))?;

        if app.should_quit {
            break;
        }

        // Poll for input events
        if event::poll(Duration::from_millis(100)).map_err(|e| format!("Poll error: {}", e))? {
            match event::read().map_err(|e| format!("Read error: {}", e))? {
                Event::Key(key) => {
                    handle_key(key, app, terminal, job_tx)?;
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size().unwrap_or_default();
                    let area = Rect::new(0, 0, size.width, size.height);
                    handle_mouse(mouse, app, area)?;
                }
                _ => {}
            }
        }

        // Handle timer events (drained first so a tick cannot mutate the
        // receiver while it is being read)
        let timer_events: Vec<TimerEvent> = match &app.timer_rx {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        };
        for ev in timer_events {
            handle_timer(ev, app, job_tx);
        }

        // Handle network events
        while let Ok(ev) = net_rx.try_recv() {
            handle_net(ev, app);
        }
    }

    Ok(())
}

fn handle_key(
    key: KeyEvent,
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    job_tx: &mpsc::Sender<NetJob>,
) -> Result<(), String> {
    // Handle dialog keys first
    if app.has_dialog() {
        return handle_dialog_key(key, app, job_tx);
    }

    match app.screen {
        Screen::Loading => {
            if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                app.should_quit = true;
            }
            Ok(())
        }
        Screen::LoadFailed => handle_load_failed_key(key, app, job_tx),
        Screen::Instructions => handle_instructions_key(key, app),
        Screen::Working => handle_working_key(key, app, terminal, job_tx),
        Screen::Submitted | Screen::AlreadySubmitted => {
            if key.code == KeyCode::Enter {
                app.should_quit = true;
            }
            Ok(())
        }
        Screen::Submitting => Ok(()),
    }
}

fn handle_load_failed_key(
    key: KeyEvent,
    app: &mut App,
    job_tx: &mpsc::Sender<NetJob>,
) -> Result<(), String> {
    match key.code {
        KeyCode::Char('r') => {
            app.screen = Screen::Loading;
            app.load_error.clear();
            let _ = job_tx.send(NetJob::FetchAttempt {
                attempt_id: app.attempt_id.clone(),
            });
        }
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        _ => {}
    }
    Ok(())
}

fn handle_instructions_key(key: KeyEvent, app: &mut App) -> Result<(), String> {
    match key.code {
        KeyCode::Enter => {
            app.screen = Screen::Working;
            if app.question_count() > 0 {
                app.navigate_to(0);
            }
        }
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.push_dialog(Dialog::ConfirmQuit);
        }
        _ => {}
    }
    Ok(())
}

fn handle_working_key(
    key: KeyEvent,
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    job_tx: &mpsc::Sender<NetJob>,
) -> Result<(), String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global bindings
    if ctrl {
        match key.code {
            KeyCode::Char('q') => {
                app.push_dialog(Dialog::ConfirmQuit);
                return Ok(());
            }
            KeyCode::Char('s') => {
                request_submit(app, job_tx);
                return Ok(());
            }
            KeyCode::Char('f') => {
                if !app.expired {
                    if let Some(id) = app.current_question().map(|q| q.id.clone()) {
                        if let Some(session) = app.session.as_mut() {
                            session.toggle_flag(&id);
                        }
                    }
                }
                return Ok(());
            }
            KeyCode::Up | KeyCode::Left => {
                navigate_prev(app);
                return Ok(());
            }
            KeyCode::Down | KeyCode::Right => {
                navigate_next(app);
                return Ok(());
            }
            KeyCode::Char('e') => {
                if !app.expired {
                    open_essay_editor(app, terminal);
                }
                return Ok(());
            }
            _ => {}
        }
    }

    // After expiry only review remains: navigate, retry submit, quit
    if app.expired {
        match key.code {
            KeyCode::Up | KeyCode::Left => navigate_prev(app),
            KeyCode::Down | KeyCode::Right => navigate_next(app),
            KeyCode::Char('?') => app.push_dialog(Dialog::Help),
            _ => handle_page_keys(key, app),
        }
        return Ok(());
    }

    // Input-mode-specific bindings
    match app.input_mode {
        InputMode::TextInput => handle_text_input_key(key, app),
        InputMode::ChoiceSelect => handle_choice_key(key, app),
        InputMode::Navigation => handle_nav_key(key, app),
    }
}

fn open_essay_editor(app: &mut App, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    let is_essay = app
        .current_question()
        .map_or(false, |q| q.question_type == QuestionType::Essay);
    if !is_essay {
        return;
    }

    app.commit_text_input();
    let current_text = app.text_input.clone();

    // Suspend terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();

    let edited = editor::open_editor(&current_text);

    // Restore terminal
    execute!(terminal.backend_mut(), EnterAlternateScreen, EnableMouseCapture).ok();
    enable_raw_mode().ok();
    terminal.clear().ok();

    match edited {
        Ok(new_text) => {
            app.text_input = new_text;
            app.text_cursor = app.text_input.len();
            app.commit_text_input();
        }
        Err(e) => {
            // Keep the in-app draft untouched
            tracing::warn!("External editor failed: {}", e);
        }
    }
}

fn handle_text_input_key(key: KeyEvent, app: &mut App) -> Result<(), String> {
    let is_essay = app
        .current_question()
        .map_or(false, |q| q.question_type == QuestionType::Essay);

    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.text_input.insert(app.text_cursor, c);
            app.text_cursor += c.len_utf8();
        }
        KeyCode::Backspace => {
            if app.text_cursor > 0 {
                app.text_cursor = prev_boundary(&app.text_input, app.text_cursor);
                app.text_input.remove(app.text_cursor);
            }
        }
        KeyCode::Delete => {
            if app.text_cursor < app.text_input.len() {
                app.text_input.remove(app.text_cursor);
            }
        }
        KeyCode::Left => {
            app.text_cursor = prev_boundary(&app.text_input, app.text_cursor);
        }
        KeyCode::Right => {
            app.text_cursor = next_boundary(&app.text_input, app.text_cursor);
        }
        KeyCode::Enter => {
            if is_essay {
                app.text_input.insert(app.text_cursor, '\n');
                app.text_cursor += 1;
            } else {
                app.commit_text_input();
                navigate_next(app);
            }
        }
        KeyCode::Up => {
            if is_essay {
                move_cursor_up(app);
            } else {
                navigate_prev(app);
            }
        }
        KeyCode::Down => {
            if is_essay {
                move_cursor_down(app);
            } else {
                navigate_next(app);
            }
        }
        KeyCode::Home => {
            if is_essay {
                let before = &app.text_input[..app.text_cursor];
                let line_start = before.rfind('\n').map_or(0, |p| p + 1);
                app.text_cursor = line_start;
            } else {
                app.text_cursor = 0;
            }
        }
        KeyCode::End => {
            if is_essay {
                let after = &app.text_input[app.text_cursor..];
                let line_end = after
                    .find('\n')
                    .map_or(app.text_input.len(), |p| app.text_cursor + p);
                app.text_cursor = line_end;
            } else {
                app.text_cursor = app.text_input.len();
            }
        }
        KeyCode::Esc => {
            app.commit_text_input();
            app.input_mode = InputMode::Navigation;
        }
        _ => {}
    }
    Ok(())
}

fn cursor_row_col(text: &str, cursor: usize) -> (usize, usize) {
    let pos = cursor.min(text.len());
    let before = &text[..pos];
    let row = before.matches('\n').count();
    let col = before.rfind('\n').map_or(pos, |p| pos - p - 1);
    (row, col)
}

fn move_cursor_up(app: &mut App) {
    let (row, col) = cursor_row_col(&app.text_input, app.text_cursor);
    if row == 0 {
        return;
    }
    let lines: Vec<&str> = app.text_input.split('\n').collect();
    let target_row = row - 1;
    let target_col = clamp_to_boundary(lines[target_row], col);
    let mut offset = 0;
    for line in lines.iter().take(target_row) {
        offset += line.len() + 1;
    }
    offset += target_col;
    app.text_cursor = offset;
}

fn move_cursor_down(app: &mut App) {
    let (row, col) = cursor_row_col(&app.text_input, app.text_cursor);
    let lines: Vec<&str> = app.text_input.split('\n').collect();
    if row + 1 >= lines.len() {
        return;
    }
    let target_row = row + 1;
    let target_col = clamp_to_boundary(lines[target_row], col);
    let mut offset = 0;
    for line in lines.iter().take(target_row) {
        offset += line.len() + 1;
    }
    offset += target_col;
    app.text_cursor = offset;
}

fn handle_choice_key(key: KeyEvent, app: &mut App) -> Result<(), String> {
    let question = match app.current_question().cloned() {
        Some(q) => q,
        None => return Ok(()),
    };

    match key.code {
        KeyCode::Up | KeyCode::Left => {
            navigate_prev(app);
        }
        KeyCode::Down | KeyCode::Right => {
            navigate_next(app);
        }
        KeyCode::Char('?') => {
            app.push_dialog(Dialog::Help);
        }
        KeyCode::Char('t')
            if question.question_type == QuestionType::TrueFalse
                && !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            select_choice(app, 0);
        }
        KeyCode::Char('f')
            if question.question_type == QuestionType::TrueFalse
                && !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            select_choice(app, 1);
        }
        KeyCode::Char(c)
            if c.is_ascii_lowercase() && !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            let idx = (c as u8 - b'a') as usize;
            select_choice(app, idx);
        }
        _ => {
            handle_page_keys(key, app);
        }
    }
    Ok(())
}

/// Writes the clicked or typed option into the store, shaped per question
/// type: MCQ stores `[optionIndex]`, true/false stores a bool. Re-picking
/// the already selected option does not dirty anything.
fn select_choice(app: &mut App, idx: usize) {
    let question = match app.current_question().cloned() {
        Some(q) => q,
        None => return,
    };
    let value = match question.question_type {
        QuestionType::Mcq => {
            if idx >= question.options.len() {
                return;
            }
            serde_json::json!([idx])
        }
        QuestionType::TrueFalse => match idx {
            0 => serde_json::json!(true),
            1 => serde_json::json!(false),
            _ => return,
        },
        _ => return,
    };
    app.choice_cursor = idx;
    if let Some(session) = app.session.as_mut() {
        if session.answer(&question.id) != Some(&value) {
            session.set_answer(&question.id, value);
        }
    }
}

fn handle_nav_key(key: KeyEvent, app: &mut App) -> Result<(), String> {
    // Enter or typing a character resumes editing for text questions
    let is_text_question = app.current_question().map_or(false, |q| {
        matches!(
            q.question_type,
            QuestionType::FillInTheBlank | QuestionType::Essay
        )
    });
    if is_text_question {
        match key.code {
            KeyCode::Enter => {
                app.input_mode = InputMode::TextInput;
                return Ok(());
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) && c != '?' => {
                app.input_mode = InputMode::TextInput;
                app.text_input.insert(app.text_cursor, c);
                app.text_cursor += c.len_utf8();
                return Ok(());
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Up | KeyCode::Left => navigate_prev(app),
        KeyCode::Down | KeyCode::Right => navigate_next(app),
        KeyCode::Char('?') => {
            app.push_dialog(Dialog::Help);
        }
        _ => {
            handle_page_keys(key, app);
        }
    }
    Ok(())
}

fn handle_page_keys(key: KeyEvent, app: &mut App) {
    let total = app.question_count();
    match key.code {
        KeyCode::PageUp => {
            let new_idx = app.current_question.saturating_sub(5);
            app.navigate_to(new_idx);
        }
        KeyCode::PageDown => {
            let new_idx = (app.current_question + 5).min(total.saturating_sub(1));
            app.navigate_to(new_idx);
        }
        KeyCode::Home => {
            app.navigate_to(0);
        }
        KeyCode::End => {
            if total > 0 {
                app.navigate_to(total - 1);
            }
        }
        _ => {}
    }
}

fn navigate_prev(app: &mut App) {
    if app.current_question > 0 {
        app.navigate_to(app.current_question - 1);
    }
}

fn navigate_next(app: &mut App) {
    let total = app.question_count();
    if app.current_question + 1 < total {
        app.navigate_to(app.current_question + 1);
    }
}

fn handle_dialog_key(
    key: KeyEvent,
    app: &mut App,
    job_tx: &mpsc::Sender<NetJob>,
) -> Result<(), String> {
    let dialog = app.top_dialog().cloned();
    match dialog {
        Some(Dialog::ConfirmSubmit) => match key.code {
            KeyCode::Enter => {
                app.pop_dialog();
                do_submit(app, job_tx);
            }
            KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::ConfirmQuit) => match key.code {
            KeyCode::Enter => {
                app.pop_dialog();
                app.commit_text_input();
                app.should_quit = true;
            }
            KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::SubmitFailed(_)) => match key.code {
            KeyCode::Enter => {
                app.pop_dialog();
                do_submit(app, job_tx);
            }
            KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::TimeWarning) => match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::Help) => match key.code {
            KeyCode::Esc | KeyCode::Char('?') => {
                app.pop_dialog();
            }
            _ => {}
        },
        None => {}
    }
    Ok(())
}

fn handle_timer(event: TimerEvent, app: &mut App, job_tx: &mpsc::Sender<NetJob>) {
    match event {
        TimerEvent::Tick(secs) => {
            app.remaining_seconds = Some(secs);
            maybe_autosave(app, job_tx);
        }
        TimerEvent::Warning => {
            if app.screen == Screen::Working && !app.has_dialog() {
                app.push_dialog(Dialog::TimeWarning);
            }
        }
        TimerEvent::Expired => {
            app.expired = true;
            app.remaining_seconds = Some(0);
            app.dialog_stack.clear();
            if app.session.is_some() {
                tracing::info!("Attempt {} expired, auto-submitting", app.attempt_id);
                do_submit(app, job_tx);
            }
        }
    }
}

/// Due-check for the periodic save, run on every countdown tick. A clean
/// store reschedules without touching the network; a failure pushes the
/// next attempt out by the backoff interval (applied in `handle_net`).
fn maybe_autosave(app: &mut App, job_tx: &mpsc::Sender<NetJob>) {
    let active = app
        .session
        .as_ref()
        .map(|s| s.submission() == SubmissionState::NotSubmitted)
        .unwrap_or(false);
    if !active || app.save_inflight || Utc::now() < app.next_autosave_at {
        return;
    }

    app.commit_text_input();

    let session = match app.session.as_ref() {
        Some(s) => s,
        None => return,
    };
    if !session.has_dirty() {
        app.next_autosave_at = due_in(app.autosave_period);
        return;
    }

    let writes = session.snapshot_dirty();
    let attempt_id = session.attempt_id.clone();
    app.save_inflight = true;
    app.save_status = SaveStatus::Saving;
    let _ = job_tx.send(NetJob::SaveAnswers { attempt_id, writes });
}

fn handle_net(event: NetEvent, app: &mut App) {
    match event {
        NetEvent::Loaded(seed) => {
            // A second load for the same attempt (retry races) is ignored
            if app.session.is_some() {
                return;
            }
            if seed.attempt.status == crate::model::AttemptStatus::Submitted {
                app.screen = Screen::AlreadySubmitted;
                return;
            }
            let deadline = seed.deadline;
            app.session = Some(ExamSession::new(*seed));
            app.timer_rx = Some(timer::spawn_countdown(deadline));
            app.next_autosave_at = due_in(app.autosave_period);
            app.screen = Screen::Instructions;
        }
        NetEvent::LoadFailed(error) => {
            app.load_error = error;
            app.screen = Screen::LoadFailed;
        }
        NetEvent::Saved { writes } => {
            if let Some(session) = app.session.as_mut() {
                session.reconcile_flushed(&writes);
            }
            app.save_inflight = false;
            app.save_backoff.record_success();
            app.save_status = SaveStatus::Saved(Utc::now());
            app.next_autosave_at = due_in(app.autosave_period);
        }
        NetEvent::SaveFailed { error } => {
            app.save_inflight = false;
            app.save_backoff.record_failure();
            app.save_status = SaveStatus::Failed {
                consecutive: app.save_backoff.consecutive_failures(),
                error,
            };
            app.next_autosave_at = due_in(app.save_backoff.interval());
        }
        NetEvent::Submitted => {
            if let Some(session) = app.session.as_mut() {
                session.submission_succeeded();
            }
            app.submitted_at = Some(Utc::now());
            app.screen = Screen::Submitted;
        }
        NetEvent::SubmitFailed { error } => {
            if let Some(session) = app.session.as_mut() {
                session.submission_failed();
            }
            app.screen = Screen::Working;
            app.push_dialog(Dialog::SubmitFailed(error));
        }
    }
}

/// Manual submit trigger. Confirmation is only needed while questions are
/// unanswered and time remains; an expired attempt or a fully answered
/// paper submits immediately.
fn request_submit(app: &mut App, job_tx: &mpsc::Sender<NetJob>) {
    app.commit_text_input();
    let session = match app.session.as_ref() {
        Some(s) => s,
        None => return,
    };
    if session.submission() != SubmissionState::NotSubmitted {
        return;
    }
    if app.expired || session.unanswered_count() == 0 {
        do_submit(app, job_tx);
    } else {
        app.push_dialog(Dialog::ConfirmSubmit);
    }
}

/// Claims the submission guard and hands the worker one job carrying the
/// final dirty snapshot and the idempotency key. Both triggers funnel
/// through here, so a keypress racing expiry cannot submit twice.
fn do_submit(app: &mut App, job_tx: &mpsc::Sender<NetJob>) {
    app.commit_text_input();
    let session = match app.session.as_mut() {
        Some(s) => s,
        None => return,
    };
    if !session.begin_submission() {
        return;
    }
    let final_writes = session.snapshot_dirty();
    let idempotency_key = api::submit_idempotency_key(&session.attempt_id, &session.started_at);
    let attempt_id = session.attempt_id.clone();
    tracing::info!(
        "Submitting attempt {} ({} answers in final flush)",
        attempt_id,
        final_writes.len()
    );
    app.screen = Screen::Submitting;
    let _ = job_tx.send(NetJob::SubmitAttempt {
        attempt_id,
        final_writes,
        idempotency_key,
    });
}

fn due_in(period: Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::seconds(period.as_secs() as i64)
}

fn handle_mouse(mouse: MouseEvent, app: &mut App, size: Rect) -> Result<(), String> {
    // Only handle mouse in Working screen
    if app.screen != Screen::Working {
        return Ok(());
    }

    if app.has_dialog() {
        return Ok(());
    }

    let layout = crate::ui::layout::compute_layout(size);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let x = mouse.column;
            let y = mouse.row;

            // Click in sidebar: jump to the clicked question
            if x >= layout.sidebar.x
                && x < layout.sidebar.x + layout.sidebar.width
                && y >= layout.sidebar.y
                && y < layout.sidebar.y + layout.sidebar.height
            {
                let relative_y = y.saturating_sub(layout.sidebar.y + 1) as usize;
                let inner_height = layout.sidebar.height.saturating_sub(2) as usize;
                let list_height =
                    inner_height.saturating_sub(crate::ui::sidebar::STATUS_BLOCK_LINES);
                if relative_y < list_height {
                    let offset = crate::ui::sidebar::scroll_offset(app, list_height);
                    let idx = offset + relative_y;
                    if idx < app.question_count() {
                        app.navigate_to(idx);
                    }
                }
            }
            // Click in main area: select the clicked option
            else if x >= layout.main.x
                && x < layout.main.x + layout.main.width
                && y >= layout.main.y
                && y < layout.main.y + layout.main.height
                && !app.expired
            {
                let visible_y = y.saturating_sub(layout.main.y) as usize;
                let content_line = visible_y + app.question_scroll;

                if let Some(hit_map) = crate::ui::question::compute_hit_map(app, layout.main) {
                    let mut clicked_choice = None;
                    for (ci, &(start, idx)) in hit_map.choice_lines.iter().enumerate() {
                        let end = if ci + 1 < hit_map.choice_lines.len() {
                            hit_map.choice_lines[ci + 1].0
                        } else {
                            hit_map.choices_end
                        };
                        if content_line >= start && content_line < end {
                            clicked_choice = Some(idx);
                            break;
                        }
                    }
                    if let Some(choice_idx) = clicked_choice {
                        select_choice(app, choice_idx);
                    }
                }
            }
        }
        MouseEventKind::ScrollUp => {
            let x = mouse.column;
            let y = mouse.row;

            if x >= layout.sidebar.x
                && x < layout.sidebar.x + layout.sidebar.width
                && y >= layout.sidebar.y
                && y < layout.sidebar.y + layout.sidebar.height
            {
                navigate_prev(app);
            } else if x >= layout.main.x
                && x < layout.main.x + layout.main.width
                && y >= layout.main.y
                && y < layout.main.y + layout.main.height
            {
                if app.question_scroll > 0 {
                    app.question_scroll -= 1;
                }
            }
        }
        MouseEventKind::ScrollDown => {
            let x = mouse.column;
            let y = mouse.row;

            if x >= layout.sidebar.x
                && x < layout.sidebar.x + layout.sidebar.width
                && y >= layout.sidebar.y
                && y < layout.sidebar.y + layout.sidebar.height
            {
                navigate_next(app);
            } else if x >= layout.main.x
                && x < layout.main.x + layout.main.width
                && y >= layout.main.y
                && y < layout.main.y + layout.main.height
            {
                app.question_scroll += 1;
            }
        }
        _ => {}
    }

    Ok(())
}

/// Byte index of the char boundary immediately before `idx`.
fn prev_boundary(text: &str, idx: usize) -> usize {
    let mut i = idx.min(text.len());
    if i == 0 {
        return 0;
    }
    i -= 1;
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Byte index just past the char starting at `idx`.
fn next_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    text[idx..]
        .chars()
        .next()
        .map_or(text.len(), |c| idx + c.len_utf8())
}

/// Clamp a byte column to the nearest char boundary at or before it.
fn clamp_to_boundary(line: &str, col: usize) -> usize {
    let mut c = col.min(line.len());
    while !line.is_char_boundary(c) {
        c -= 1;
    }
    c
}
