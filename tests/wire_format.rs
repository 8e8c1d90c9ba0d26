use std::fs;

use serde_json::json;

use termcbt::api::AttemptBundle;
use termcbt::model::{
    answer_is_empty, AnswerWrite, ApiEnvelope, AttemptStatus, Difficulty, ExamMode, ExamPaper,
    QuestionType,
};

fn load_fixture() -> ApiEnvelope<AttemptBundle> {
    let content = fs::read_to_string("fixtures/attempt_bundle.json").expect("Cannot read fixture");
    serde_json::from_str(&content).expect("Cannot parse fixture")
}

#[test]
fn test_parse_attempt_bundle_envelope() {
    let envelope = load_fixture();
    assert!(envelope.success);
    assert_eq!(envelope.message, "Attempt fetched");

    let bundle = envelope.data.expect("fixture carries data");
    let attempt = &bundle.attempt;
    assert_eq!(attempt.id, "att-7f3a");
    assert_eq!(attempt.exam_paper_id, "paper-22");
    assert_eq!(attempt.student_id, "stu-914");
    assert_eq!(attempt.status, AttemptStatus::InProgress);
    assert_eq!(attempt.start_time.to_rfc3339(), "2026-03-02T09:05:00+00:00");

    let paper = &bundle.exam_paper;
    assert_eq!(paper.id, "paper-22");
    assert_eq!(paper.subject.name, "Biology");
    assert_eq!(paper.mode, ExamMode::Cbt);
    assert_eq!(paper.max_marks, 40);
    assert_eq!(paper.total_questions, 4);
    assert!(paper.instructions.contains("Calculators"));
    assert_eq!(paper.questions.len(), 4);
}

#[test]
fn test_parse_question_variants() {
    let bundle = load_fixture().data.expect("fixture carries data");
    let questions = &bundle.exam_paper.questions;

    let mcq = &questions[0];
    assert_eq!(mcq.question_type, QuestionType::Mcq);
    assert_eq!(mcq.options.len(), 4);
    assert_eq!(mcq.options[1], "Mitochondrion");
    assert_eq!(mcq.marks, 2);
    assert_eq!(mcq.difficulty, Difficulty::Easy);

    // options key absent on the wire parses as an empty list
    let tf = &questions[1];
    assert_eq!(tf.question_type, QuestionType::TrueFalse);
    assert!(tf.options.is_empty());

    let fill = &questions[2];
    assert_eq!(fill.question_type, QuestionType::FillInTheBlank);
    assert!(fill.question_text.contains("____"));

    let essay = &questions[3];
    assert_eq!(essay.question_type, QuestionType::Essay);
    assert_eq!(essay.marks, 10);
    assert_eq!(essay.difficulty, Difficulty::Hard);
}

#[test]
fn test_saved_response_shapes_per_type() {
    let bundle = load_fixture().data.expect("fixture carries data");
    let responses = &bundle.attempt.responses;
    assert_eq!(responses.len(), 3);

    assert_eq!(responses[0].question_id, "q1");
    assert_eq!(responses[0].answer, json!([1]));

    assert_eq!(responses[1].question_id, "q2");
    assert_eq!(responses[1].answer, json!(false));

    assert_eq!(responses[2].question_id, "q4");
    assert!(responses[2].answer.is_null());
}

#[test]
fn test_answer_write_serializes_camel_case() {
    let write = AnswerWrite {
        question_id: "q9".to_string(),
        student_answer: json!([2]),
    };
    let value = serde_json::to_value(&write).expect("Cannot serialize write");
    assert_eq!(value, json!({ "questionId": "q9", "studentAnswer": [2] }));

    let essay = AnswerWrite {
        question_id: "q4".to_string(),
        student_answer: json!("Cristae increase surface area."),
    };
    let value = serde_json::to_value(&essay).expect("Cannot serialize write");
    assert_eq!(value["studentAnswer"], json!("Cristae increase surface area."));
}

#[test]
fn test_envelope_without_message_or_data() {
    let envelope: ApiEnvelope<AttemptBundle> =
        serde_json::from_str(r#"{ "success": false }"#).expect("Cannot parse envelope");
    assert!(!envelope.success);
    assert_eq!(envelope.message, "");
    assert!(envelope.data.is_none());
}

#[test]
fn test_paper_optional_fields_default() {
    let raw = r#"{
        "id": "paper-1",
        "subject": { "id": "s1", "name": "History" },
        "maxMarks": 10,
        "startTime": "2026-01-10T08:00:00Z",
        "endTime": "2026-01-10T09:00:00Z",
        "mode": "PAPER",
        "totalQuestions": 5
    }"#;
    let paper: ExamPaper = serde_json::from_str(raw).expect("Cannot parse paper");
    assert_eq!(paper.mode, ExamMode::Paper);
    assert!(paper.instructions.is_empty());
    assert!(paper.questions.is_empty());
}

#[test]
fn test_answer_is_empty() {
    assert!(answer_is_empty(&json!(null)));
    assert!(answer_is_empty(&json!("")));
    assert!(answer_is_empty(&json!([])));

    assert!(!answer_is_empty(&json!("0")));
    assert!(!answer_is_empty(&json!([0])));
    // False is a committed answer to a true/false question
    assert!(!answer_is_empty(&json!(false)));
    assert!(!answer_is_empty(&json!("  ")));
}
