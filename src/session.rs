use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::loader::SessionSeed;
use crate::model::*;
use crate::net::SaveBackoff;
use crate::timer::TimerEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading,
    LoadFailed,
    Instructions,
    Working,
    Submitting,
    Submitted,
    AlreadySubmitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmSubmit,
    ConfirmQuit,
    SubmitFailed(String),
    TimeWarning,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Navigation,
    ChoiceSelect,
    TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    NotSubmitted,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved(DateTime<Utc>),
    Failed { consecutive: u32, error: String },
}

/// Server-backed attempt state: the paper, the answers keyed by question id,
/// and which of them still have to be flushed.
#[derive(Debug, Clone)]
pub struct ExamSession {
    pub paper: ExamPaper,
    pub attempt_id: String,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    answers: HashMap<String, Value>,
    dirty: HashSet<String>,
    flags: HashSet<String>,
    visited: HashSet<String>,
    submission: SubmissionState,
}

impl ExamSession {
    /// Answers already stored on the server seed the store clean; only
    /// edits made in this process become dirty.
    pub fn new(seed: SessionSeed) -> Self {
        let mut answers = HashMap::new();
        for resp in &seed.attempt.responses {
            if !resp.answer.is_null() {
                answers.insert(resp.question_id.clone(), resp.answer.clone());
            }
        }
        Self {
            paper: seed.paper,
            attempt_id: seed.attempt.id,
            started_at: seed.attempt.start_time,
            deadline: seed.deadline,
            answers,
            dirty: HashSet::new(),
            flags: HashSet::new(),
            visited: HashSet::new(),
            submission: SubmissionState::NotSubmitted,
        }
    }

    pub fn answer(&self, question_id: &str) -> Option<&Value> {
        self.answers.get(question_id)
    }

    /// Last write wins; every write marks the question dirty, including a
    /// clear back to an empty value (the server needs the clear too).
    pub fn set_answer(&mut self, question_id: &str, value: Value) {
        self.answers.insert(question_id.to_string(), value);
        self.dirty.insert(question_id.to_string());
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Dirty answers in paper order, cloned so later edits cannot bleed
    /// into an in-flight save batch.
    pub fn snapshot_dirty(&self) -> Vec<AnswerWrite> {
        self.paper
            .questions
            .iter()
            .filter(|q| self.dirty.contains(&q.id))
            .filter_map(|q| {
                self.answers.get(&q.id).map(|v| AnswerWrite {
                    question_id: q.id.clone(),
                    student_answer: v.clone(),
                })
            })
            .collect()
    }

    /// Clears dirty marks for a flushed batch, but only where the current
    /// value still equals the flushed one. A question edited while the save
    /// was in flight stays dirty for the next flush.
    pub fn reconcile_flushed(&mut self, flushed: &[AnswerWrite]) {
        for write in flushed {
            if self.answers.get(&write.question_id) == Some(&write.student_answer) {
                self.dirty.remove(&write.question_id);
            }
        }
    }

    pub fn toggle_flag(&mut self, question_id: &str) {
        if !self.flags.remove(question_id) {
            self.flags.insert(question_id.to_string());
        }
    }

    pub fn is_flagged(&self, question_id: &str) -> bool {
        self.flags.contains(question_id)
    }

    pub fn mark_visited(&mut self, question_id: &str) {
        self.visited.insert(question_id.to_string());
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    /// Claims the one allowed submission. Returns false when a submission
    /// is already in flight or has completed, so duplicate triggers
    /// (user keypress racing expiry) collapse into a single request.
    pub fn begin_submission(&mut self) -> bool {
        if self.submission == SubmissionState::NotSubmitted {
            self.submission = SubmissionState::Submitting;
            true
        } else {
            false
        }
    }

    pub fn submission_succeeded(&mut self) {
        self.submission = SubmissionState::Submitted;
    }

    /// A failed submission reopens the attempt for a manual retry.
    pub fn submission_failed(&mut self) {
        if self.submission == SubmissionState::Submitting {
            self.submission = SubmissionState::NotSubmitted;
        }
    }

    /// Flags do not count: a flagged question with an answer is answered.
    pub fn unanswered_count(&self) -> usize {
        self.paper
            .questions
            .iter()
            .filter(|q| match self.answers.get(&q.id) {
                Some(v) => answer_is_empty(v),
                None => true,
            })
            .count()
    }

    pub fn question_status(&self, question_id: &str) -> QuestionStatus {
        if self.flags.contains(question_id) {
            return QuestionStatus::Flagged;
        }
        match self.answers.get(question_id) {
            Some(v) if !answer_is_empty(v) => QuestionStatus::Answered,
            _ => {
                if self.visited.contains(question_id) {
                    QuestionStatus::Unanswered
                } else {
                    QuestionStatus::Unread
                }
            }
        }
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for q in &self.paper.questions {
            match self.question_status(&q.id) {
                QuestionStatus::Unread => counts.unread += 1,
                QuestionStatus::Unanswered => counts.unanswered += 1,
                QuestionStatus::Answered => counts.answered += 1,
                QuestionStatus::Flagged => counts.flagged += 1,
            }
        }
        counts
    }
}

#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub attempt_id: String,
    pub session: Option<ExamSession>,
    pub current_question: usize,
    pub input_mode: InputMode,
    pub dialog_stack: Vec<Dialog>,
    pub choice_cursor: usize,
    pub text_input: String,
    pub text_cursor: usize,
    pub remaining_seconds: Option<i64>,
    pub expired: bool,
    pub load_error: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub save_status: SaveStatus,
    pub save_inflight: bool,
    pub next_autosave_at: DateTime<Utc>,
    pub save_backoff: SaveBackoff,
    pub autosave_period: Duration,
    pub timer_rx: Option<mpsc::Receiver<TimerEvent>>,
    pub question_scroll: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(attempt_id: String, autosave_period: Duration) -> Self {
        Self {
            screen: Screen::Loading,
            attempt_id,
            session: None,
            current_question: 0,
            input_mode: InputMode::Navigation,
            dialog_stack: Vec::new(),
            choice_cursor: 0,
            text_input: String::new(),
            text_cursor: 0,
            remaining_seconds: None,
            expired: false,
            load_error: String::new(),
            submitted_at: None,
            save_status: SaveStatus::Idle,
            save_inflight: false,
            next_autosave_at: Utc::now(),
            save_backoff: SaveBackoff::new(autosave_period),
            autosave_period,
            timer_rx: None,
            question_scroll: 0,
            should_quit: false,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session
            .as_ref()
            .and_then(|s| s.paper.questions.get(self.current_question))
    }

    pub fn question_count(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.paper.questions.len())
            .unwrap_or(0)
    }

    pub fn navigate_to(&mut self, idx: usize) {
        if idx >= self.question_count() {
            return;
        }
        self.commit_text_input();
        self.current_question = idx;
        if let Some(id) = self.current_question().map(|q| q.id.clone()) {
            if let Some(session) = self.session.as_mut() {
                session.mark_visited(&id);
            }
        }
        self.load_text_input_for_current();
        self.choice_cursor = 0;
        self.question_scroll = 0;
        self.update_input_mode();
    }

    /// Writes the text buffer into the answer store, but only when it
    /// actually changed. Leaving a question without typing must not mark
    /// anything dirty.
    pub fn commit_text_input(&mut self) {
        let question = match self.current_question() {
            Some(q) => q.clone(),
            None => return,
        };
        let is_text = matches!(
            question.question_type,
            QuestionType::FillInTheBlank | QuestionType::Essay
        );
        if !is_text {
            return;
        }
        let session = match self.session.as_mut() {
            Some(s) => s,
            None => return,
        };
        let new_value = Value::String(self.text_input.clone());
        match session.answer(&question.id) {
            Some(v) if *v == new_value => {}
            None if self.text_input.is_empty() => {}
            _ => session.set_answer(&question.id, new_value),
        }
    }

    pub fn load_text_input_for_current(&mut self) {
        let stored = self
            .current_question()
            .and_then(|q| self.session.as_ref().and_then(|s| s.answer(&q.id)))
            .and_then(|v| v.as_str().map(str::to_string));
        match stored {
            Some(text) => {
                self.text_cursor = text.len();
                self.text_input = text;
            }
            None => {
                self.text_input.clear();
                self.text_cursor = 0;
            }
        }
    }

    fn update_input_mode(&mut self) {
        if let Some(q) = self.current_question() {
            self.input_mode = match q.question_type {
                QuestionType::Mcq | QuestionType::TrueFalse => InputMode::ChoiceSelect,
                QuestionType::FillInTheBlank => InputMode::TextInput,
                QuestionType::Essay => InputMode::Navigation,
            };
        }
    }

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialog_stack.last()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialog_stack.push(dialog);
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuestionStatus {
    Unread,
    Unanswered,
    Answered,
    Flagged,
}

#[derive(Debug, Default)]
pub struct StatusCounts {
    pub unread: usize,
    pub unanswered: usize,
    pub answered: usize,
    pub flagged: usize,
}
