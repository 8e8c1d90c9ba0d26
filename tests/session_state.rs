use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;

use termcbt::loader::SessionSeed;
use termcbt::model::{
    Attempt, AttemptStatus, Difficulty, ExamMode, ExamPaper, Question, QuestionType,
    SavedResponse, Subject,
};
use termcbt::session::{App, ExamSession, InputMode, QuestionStatus, SubmissionState};
use termcbt::timer::attempt_deadline;

fn question(id: &str, question_type: QuestionType, options: &[&str]) -> Question {
    Question {
        id: id.to_string(),
        question_type,
        question_text: format!("Question {}", id),
        options: options.iter().map(|s| s.to_string()).collect(),
        marks: 1,
        difficulty: Difficulty::Medium,
    }
}

/// Four questions, one of each type, with an exam window of one hour and a
/// start ten minutes into the window.
fn seed_with(responses: Vec<SavedResponse>) -> SessionSeed {
    let window_start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
    let started_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 10, 0).unwrap();
    SessionSeed {
        attempt: Attempt {
            id: "att-1".to_string(),
            exam_paper_id: "paper-1".to_string(),
            student_id: "stu-1".to_string(),
            start_time: started_at,
            status: AttemptStatus::InProgress,
            responses,
        },
        paper: ExamPaper {
            id: "paper-1".to_string(),
            subject: Subject {
                id: "s1".to_string(),
                name: "Physics".to_string(),
            },
            max_marks: 20,
            start_time: window_start,
            end_time: window_end,
            mode: ExamMode::Cbt,
            total_questions: 4,
            instructions: String::new(),
            questions: vec![
                question("q1", QuestionType::Mcq, &["A", "B", "C"]),
                question("q2", QuestionType::TrueFalse, &[]),
                question("q3", QuestionType::FillInTheBlank, &[]),
                question("q4", QuestionType::Essay, &[]),
            ],
        },
        deadline: attempt_deadline(started_at, window_start, window_end),
    }
}

fn response(question_id: &str, answer: serde_json::Value) -> SavedResponse {
    SavedResponse {
        question_id: question_id.to_string(),
        answer,
    }
}

#[test]
fn test_seeded_answers_start_clean() {
    let seed = seed_with(vec![
        response("q1", json!([0])),
        response("q4", json!(null)),
    ]);
    let session = ExamSession::new(seed);

    assert_eq!(session.answer("q1"), Some(&json!([0])));
    // null responses are not answers
    assert_eq!(session.answer("q4"), None);
    assert!(!session.has_dirty());
    assert!(session.snapshot_dirty().is_empty());
}

#[test]
fn test_snapshot_follows_paper_order() {
    let mut session = ExamSession::new(seed_with(vec![]));
    session.set_answer("q3", json!("heat"));
    session.set_answer("q1", json!([1]));

    let writes = session.snapshot_dirty();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].question_id, "q1");
    assert_eq!(writes[0].student_answer, json!([1]));
    assert_eq!(writes[1].question_id, "q3");
    assert_eq!(writes[1].student_answer, json!("heat"));
}

#[test]
fn test_overwrite_keeps_single_write() {
    let mut session = ExamSession::new(seed_with(vec![]));
    session.set_answer("q1", json!([0]));
    session.set_answer("q1", json!([2]));

    assert_eq!(session.answer("q1"), Some(&json!([2])));
    let writes = session.snapshot_dirty();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].student_answer, json!([2]));
}

#[test]
fn test_reconcile_keeps_inflight_edit_dirty() {
    let mut session = ExamSession::new(seed_with(vec![]));
    session.set_answer("q1", json!([0]));
    session.set_answer("q3", json!("a"));

    let batch = session.snapshot_dirty();
    // q1 is edited while the batch is in flight
    session.set_answer("q1", json!([2]));
    session.reconcile_flushed(&batch);

    let remaining = session.snapshot_dirty();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].question_id, "q1");
    assert_eq!(remaining[0].student_answer, json!([2]));
}

#[test]
fn test_clearing_an_answer_is_a_write() {
    let mut session = ExamSession::new(seed_with(vec![]));
    session.set_answer("q3", json!("draft"));
    let batch = session.snapshot_dirty();
    session.reconcile_flushed(&batch);
    assert!(!session.has_dirty());

    session.set_answer("q3", json!(""));
    let writes = session.snapshot_dirty();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].student_answer, json!(""));
    assert_eq!(session.question_status("q3"), QuestionStatus::Unread);
}

#[test]
fn test_flags_toggle_without_touching_answers() {
    let mut session = ExamSession::new(seed_with(vec![response("q1", json!([0]))]));

    session.toggle_flag("q1");
    assert!(session.is_flagged("q1"));
    assert_eq!(session.question_status("q1"), QuestionStatus::Flagged);
    assert!(!session.has_dirty());
    assert_eq!(session.unanswered_count(), 3);

    session.toggle_flag("q1");
    assert!(!session.is_flagged("q1"));
    assert_eq!(session.question_status("q1"), QuestionStatus::Answered);
}

#[test]
fn test_submission_claim_is_exclusive() {
    let mut session = ExamSession::new(seed_with(vec![]));

    assert!(session.begin_submission());
    assert_eq!(session.submission(), SubmissionState::Submitting);
    // a second trigger while in flight is refused
    assert!(!session.begin_submission());

    session.submission_failed();
    assert_eq!(session.submission(), SubmissionState::NotSubmitted);
    assert!(session.begin_submission());

    session.submission_succeeded();
    assert_eq!(session.submission(), SubmissionState::Submitted);
    assert!(!session.begin_submission());
    // failure after success must not reopen the attempt
    session.submission_failed();
    assert_eq!(session.submission(), SubmissionState::Submitted);
}

#[test]
fn test_unanswered_counts_empty_shapes() {
    let mut session = ExamSession::new(seed_with(vec![]));
    assert_eq!(session.unanswered_count(), 4);

    session.set_answer("q1", json!([0]));
    session.set_answer("q2", json!(false));
    session.set_answer("q3", json!(""));
    session.set_answer("q4", json!([]));

    // false answers a true/false question; "" and [] do not answer anything
    assert_eq!(session.unanswered_count(), 2);
}

#[test]
fn test_question_status_precedence() {
    let mut session = ExamSession::new(seed_with(vec![response("q1", json!([0]))]));
    session.mark_visited("q2");
    session.toggle_flag("q1");

    assert_eq!(session.question_status("q1"), QuestionStatus::Flagged);
    assert_eq!(session.question_status("q2"), QuestionStatus::Unanswered);
    assert_eq!(session.question_status("q3"), QuestionStatus::Unread);

    let counts = session.status_counts();
    assert_eq!(counts.flagged, 1);
    assert_eq!(counts.unanswered, 1);
    assert_eq!(counts.answered, 0);
    assert_eq!(counts.unread, 2);
    assert_eq!(
        counts.flagged + counts.unanswered + counts.answered + counts.unread,
        4
    );
}

fn app_with_session(responses: Vec<SavedResponse>) -> App {
    let mut app = App::new("att-1".to_string(), Duration::from_secs(30));
    app.session = Some(ExamSession::new(seed_with(responses)));
    app
}

#[test]
fn test_navigate_marks_visited_and_loads_text() {
    let mut app = app_with_session(vec![response("q3", json!("42"))]);

    app.navigate_to(2);
    assert_eq!(app.current_question, 2);
    assert_eq!(app.text_input, "42");
    assert_eq!(app.text_cursor, 2);
    assert_eq!(app.input_mode, InputMode::TextInput);

    let session = app.session.as_ref().unwrap();
    assert_eq!(session.question_status("q3"), QuestionStatus::Answered);
    assert_eq!(session.question_status("q1"), QuestionStatus::Unread);
}

#[test]
fn test_navigate_past_end_is_ignored() {
    let mut app = app_with_session(vec![]);
    app.navigate_to(1);
    app.navigate_to(99);
    assert_eq!(app.current_question, 1);
}

#[test]
fn test_commit_text_input_only_on_change() {
    let mut app = app_with_session(vec![]);

    // visiting and leaving a text question without typing stays clean
    app.navigate_to(2);
    app.navigate_to(0);
    assert!(!app.session.as_ref().unwrap().has_dirty());

    app.navigate_to(2);
    app.text_input = "joule".to_string();
    app.text_cursor = app.text_input.len();
    app.navigate_to(3);
    {
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.answer("q3"), Some(&json!("joule")));
        assert!(session.has_dirty());
    }

    let batch = app.session.as_ref().unwrap().snapshot_dirty();
    app.session.as_mut().unwrap().reconcile_flushed(&batch);

    // revisiting without editing must not dirty the stored answer again
    app.navigate_to(2);
    app.navigate_to(0);
    assert!(!app.session.as_ref().unwrap().has_dirty());
}

#[test]
fn test_input_mode_follows_question_type() {
    let mut app = app_with_session(vec![]);

    app.navigate_to(0);
    assert_eq!(app.input_mode, InputMode::ChoiceSelect);
    app.navigate_to(1);
    assert_eq!(app.input_mode, InputMode::ChoiceSelect);
    app.navigate_to(2);
    assert_eq!(app.input_mode, InputMode::TextInput);
    // essays open in navigation; editing is an explicit step
    app.navigate_to(3);
    assert_eq!(app.input_mode, InputMode::Navigation);
}

#[test]
fn test_answer_progress_over_many_questions() {
    let mut seed = seed_with(vec![]);
    seed.paper.questions = (1..=10)
        .map(|i| question(&format!("q{}", i), QuestionType::Mcq, &["A", "B"]))
        .collect();
    seed.paper.total_questions = 10;
    let mut session = ExamSession::new(seed);

    for i in 1..=7 {
        session.set_answer(&format!("q{}", i), json!([0]));
    }

    assert_eq!(session.unanswered_count(), 3);
    let counts = session.status_counts();
    assert_eq!(counts.answered, 7);
    assert_eq!(counts.unread, 3);
}
