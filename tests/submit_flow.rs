use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;

use termcbt::api::{submit_idempotency_key, ApiError, AttemptBundle, ExamApi};
use termcbt::loader::SessionLoader;
use termcbt::model::{
    AnswerWrite, Attempt, AttemptStatus, Difficulty, ExamMode, ExamPaper, Question, QuestionType,
    Subject,
};
use termcbt::net::{spawn_worker, NetEvent, NetJob, SaveBackoff};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fetch(String),
    Save(String, Vec<AnswerWrite>),
    Submit(String, String),
}

/// In-memory backend recording every call. Failures are toggled per method
/// so a test can flip a flag between jobs.
struct FakeApi {
    bundle: AttemptBundle,
    calls: Arc<Mutex<Vec<Call>>>,
    fail_saves: Arc<AtomicBool>,
    fail_submits: Arc<AtomicBool>,
}

impl FakeApi {
    fn new(bundle: AttemptBundle) -> Self {
        Self {
            bundle,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_saves: Arc::new(AtomicBool::new(false)),
            fail_submits: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl ExamApi for FakeApi {
    fn start_attempt(&self, _exam_paper_id: &str) -> Result<AttemptBundle, ApiError> {
        Ok(self.bundle.clone())
    }

    fn fetch_attempt(&self, attempt_id: &str) -> Result<AttemptBundle, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Fetch(attempt_id.to_string()));
        Ok(self.bundle.clone())
    }

    fn save_answers(&self, attempt_id: &str, writes: &[AnswerWrite]) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Save(attempt_id.to_string(), writes.to_vec()));
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ApiError::Rejected("save rejected".to_string()));
        }
        Ok(())
    }

    fn submit_attempt(&self, attempt_id: &str, idempotency_key: &str) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Submit(attempt_id.to_string(), idempotency_key.to_string()));
        if self.fail_submits.load(Ordering::SeqCst) {
            return Err(ApiError::Rejected("submit rejected".to_string()));
        }
        Ok(())
    }
}

fn question(id: &str, question_type: QuestionType) -> Question {
    Question {
        id: id.to_string(),
        question_type,
        question_text: format!("Question {}", id),
        options: vec!["A".to_string(), "B".to_string()],
        marks: 1,
        difficulty: Difficulty::Easy,
    }
}

fn bundle(mode: ExamMode) -> AttemptBundle {
    let window_start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
    let started_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 0).unwrap();
    AttemptBundle {
        attempt: Attempt {
            id: "att-1".to_string(),
            exam_paper_id: "paper-1".to_string(),
            student_id: "stu-1".to_string(),
            start_time: started_at,
            status: AttemptStatus::InProgress,
            responses: vec![],
        },
        exam_paper: ExamPaper {
            id: "paper-1".to_string(),
            subject: Subject {
                id: "s1".to_string(),
                name: "Chemistry".to_string(),
            },
            max_marks: 10,
            start_time: window_start,
            end_time: window_end,
            mode,
            total_questions: 2,
            instructions: String::new(),
            questions: vec![
                question("q1", QuestionType::Mcq),
                question("q2", QuestionType::FillInTheBlank),
            ],
        },
    }
}

fn write(question_id: &str, answer: serde_json::Value) -> AnswerWrite {
    AnswerWrite {
        question_id: question_id.to_string(),
        student_answer: answer,
    }
}

fn recv(net_rx: &mpsc::Receiver<NetEvent>) -> NetEvent {
    net_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("worker did not reply in time")
}

#[test]
fn test_worker_loads_attempt() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let calls = api.calls.clone();
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    job_tx
        .send(NetJob::FetchAttempt {
            attempt_id: "att-1".to_string(),
        })
        .unwrap();

    match recv(&net_rx) {
        NetEvent::Loaded(seed) => {
            assert_eq!(seed.attempt.id, "att-1");
            assert_eq!(seed.paper.questions.len(), 2);
            // deadline = started_at + window length, not the window end
            assert_eq!(seed.deadline.to_rfc3339(), "2026-03-02T10:05:00+00:00");
        }
        other => panic!("Expected Loaded, got {:?}", other),
    }
    assert_eq!(*calls.lock().unwrap(), vec![Call::Fetch("att-1".to_string())]);
}

#[test]
fn test_repeat_load_hits_cache() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let calls = api.calls.clone();
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    for _ in 0..2 {
        job_tx
            .send(NetJob::FetchAttempt {
                attempt_id: "att-1".to_string(),
            })
            .unwrap();
        match recv(&net_rx) {
            NetEvent::Loaded(_) => {}
            other => panic!("Expected Loaded, got {:?}", other),
        }
    }

    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[test]
fn test_primed_loader_skips_fetch() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let calls = api.calls.clone();
    let mut loader = SessionLoader::new(api);
    loader
        .prime(bundle(ExamMode::Cbt))
        .expect("Cannot prime loader");
    let (job_tx, net_rx) = spawn_worker(loader);

    job_tx
        .send(NetJob::FetchAttempt {
            attempt_id: "att-1".to_string(),
        })
        .unwrap();

    match recv(&net_rx) {
        NetEvent::Loaded(seed) => assert_eq!(seed.attempt.id, "att-1"),
        other => panic!("Expected Loaded, got {:?}", other),
    }
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_paper_mode_attempt_is_rejected() {
    let api = FakeApi::new(bundle(ExamMode::Paper));
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    job_tx
        .send(NetJob::FetchAttempt {
            attempt_id: "att-1".to_string(),
        })
        .unwrap();

    match recv(&net_rx) {
        NetEvent::LoadFailed(error) => {
            assert!(error.contains("not a computer-based test"), "{}", error);
        }
        other => panic!("Expected LoadFailed, got {:?}", other),
    }
}

#[test]
fn test_flush_runs_before_submit() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let calls = api.calls.clone();
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    let final_writes = vec![write("q1", json!([1])), write("q2", json!("salt"))];
    job_tx
        .send(NetJob::SubmitAttempt {
            attempt_id: "att-1".to_string(),
            final_writes: final_writes.clone(),
            idempotency_key: "key-1".to_string(),
        })
        .unwrap();

    match recv(&net_rx) {
        NetEvent::Submitted => {}
        other => panic!("Expected Submitted, got {:?}", other),
    }
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::Save("att-1".to_string(), final_writes),
            Call::Submit("att-1".to_string(), "key-1".to_string()),
        ]
    );
}

#[test]
fn test_submit_without_pending_writes_skips_flush() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let calls = api.calls.clone();
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    job_tx
        .send(NetJob::SubmitAttempt {
            attempt_id: "att-1".to_string(),
            final_writes: vec![],
            idempotency_key: "key-1".to_string(),
        })
        .unwrap();

    match recv(&net_rx) {
        NetEvent::Submitted => {}
        other => panic!("Expected Submitted, got {:?}", other),
    }
    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::Submit("att-1".to_string(), "key-1".to_string())]
    );
}

#[test]
fn test_submit_proceeds_when_flush_fails() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let calls = api.calls.clone();
    api.fail_saves.store(true, Ordering::SeqCst);
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    job_tx
        .send(NetJob::SubmitAttempt {
            attempt_id: "att-1".to_string(),
            final_writes: vec![write("q1", json!([0]))],
            idempotency_key: "key-1".to_string(),
        })
        .unwrap();

    // the flush is best-effort; the submission itself still goes out
    match recv(&net_rx) {
        NetEvent::Submitted => {}
        other => panic!("Expected Submitted, got {:?}", other),
    }
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], Call::Save(_, _)));
    assert!(matches!(calls[1], Call::Submit(_, _)));
}

#[test]
fn test_submit_failure_reported_then_retry_succeeds() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let calls = api.calls.clone();
    let fail_submits = api.fail_submits.clone();
    fail_submits.store(true, Ordering::SeqCst);
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    let submit_job = || NetJob::SubmitAttempt {
        attempt_id: "att-1".to_string(),
        final_writes: vec![],
        idempotency_key: "key-1".to_string(),
    };

    job_tx.send(submit_job()).unwrap();
    match recv(&net_rx) {
        NetEvent::SubmitFailed { error } => {
            assert!(error.contains("submit rejected"), "{}", error);
        }
        other => panic!("Expected SubmitFailed, got {:?}", other),
    }

    fail_submits.store(false, Ordering::SeqCst);
    job_tx.send(submit_job()).unwrap();
    match recv(&net_rx) {
        NetEvent::Submitted => {}
        other => panic!("Expected Submitted, got {:?}", other),
    }

    // the retry presents the same idempotency key
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
}

#[test]
fn test_save_failure_then_retry() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let fail_saves = api.fail_saves.clone();
    fail_saves.store(true, Ordering::SeqCst);
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    let writes = vec![write("q2", json!("brine"))];
    job_tx
        .send(NetJob::SaveAnswers {
            attempt_id: "att-1".to_string(),
            writes: writes.clone(),
        })
        .unwrap();
    match recv(&net_rx) {
        NetEvent::SaveFailed { error } => assert!(error.contains("save rejected"), "{}", error),
        other => panic!("Expected SaveFailed, got {:?}", other),
    }

    fail_saves.store(false, Ordering::SeqCst);
    job_tx
        .send(NetJob::SaveAnswers {
            attempt_id: "att-1".to_string(),
            writes: writes.clone(),
        })
        .unwrap();
    match recv(&net_rx) {
        NetEvent::Saved { writes: flushed } => assert_eq!(flushed, writes),
        other => panic!("Expected Saved, got {:?}", other),
    }
}

#[test]
fn test_jobs_run_strictly_in_order() {
    let api = FakeApi::new(bundle(ExamMode::Cbt));
    let (job_tx, net_rx) = spawn_worker(SessionLoader::new(api));

    job_tx
        .send(NetJob::SaveAnswers {
            attempt_id: "att-1".to_string(),
            writes: vec![write("q1", json!([0]))],
        })
        .unwrap();
    job_tx
        .send(NetJob::SubmitAttempt {
            attempt_id: "att-1".to_string(),
            final_writes: vec![],
            idempotency_key: "key-1".to_string(),
        })
        .unwrap();

    match recv(&net_rx) {
        NetEvent::Saved { .. } => {}
        other => panic!("Expected Saved first, got {:?}", other),
    }
    match recv(&net_rx) {
        NetEvent::Submitted => {}
        other => panic!("Expected Submitted second, got {:?}", other),
    }
}

#[test]
fn test_idempotency_key_is_stable() {
    let started = Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 0).unwrap();

    let key = submit_idempotency_key("att-1", &started);
    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    assert_eq!(key, submit_idempotency_key("att-1", &started));
    assert_ne!(key, submit_idempotency_key("att-2", &started));
    let later = Utc.with_ymd_and_hms(2026, 3, 2, 9, 6, 0).unwrap();
    assert_ne!(key, submit_idempotency_key("att-1", &later));
}

#[test]
fn test_save_backoff_doubles_and_caps() {
    let mut backoff = SaveBackoff::new(Duration::from_secs(30));
    assert_eq!(backoff.interval(), Duration::from_secs(30));

    backoff.record_failure();
    assert_eq!(backoff.interval(), Duration::from_secs(60));
    backoff.record_failure();
    assert_eq!(backoff.interval(), Duration::from_secs(120));
    backoff.record_failure();
    assert_eq!(backoff.interval(), Duration::from_secs(240));
    backoff.record_failure();
    // capped at eight periods
    assert_eq!(backoff.interval(), Duration::from_secs(240));
    assert_eq!(backoff.consecutive_failures(), 4);

    backoff.record_success();
    assert_eq!(backoff.consecutive_failures(), 0);
    assert_eq!(backoff.interval(), Duration::from_secs(30));
}
