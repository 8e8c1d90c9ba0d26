use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::api::ExamApi;
use crate::loader::{SessionLoader, SessionSeed};
use crate::model::AnswerWrite;

#[derive(Debug)]
pub enum NetJob {
    FetchAttempt {
        attempt_id: String,
    },
    SaveAnswers {
        attempt_id: String,
        writes: Vec<AnswerWrite>,
    },
    SubmitAttempt {
        attempt_id: String,
        final_writes: Vec<AnswerWrite>,
        idempotency_key: String,
    },
}

#[derive(Debug)]
pub enum NetEvent {
    Loaded(Box<SessionSeed>),
    LoadFailed(String),
    Saved { writes: Vec<AnswerWrite> },
    SaveFailed { error: String },
    Submitted,
    SubmitFailed { error: String },
}

/// Runs all blocking HTTP off the UI thread. Jobs are processed strictly
/// in order, one at a time, so a submit queued after a save cannot overtake
/// it and two saves can never overlap. The thread exits when the job
/// sender is dropped.
pub fn spawn_worker<A: ExamApi + Send + 'static>(
    mut loader: SessionLoader<A>,
) -> (mpsc::Sender<NetJob>, mpsc::Receiver<NetEvent>) {
    let (job_tx, job_rx) = mpsc::channel::<NetJob>();
    let (event_tx, event_rx) = mpsc::channel::<NetEvent>();

    thread::spawn(move || {
        for job in job_rx {
            let event = run_job(&mut loader, job);
            if event_tx.send(event).is_err() {
                break;
            }
        }
    });

    (job_tx, event_rx)
}

fn run_job<A: ExamApi>(loader: &mut SessionLoader<A>, job: NetJob) -> NetEvent {
    match job {
        NetJob::FetchAttempt { attempt_id } => match loader.load(&attempt_id) {
            Ok(seed) => {
                tracing::info!("Loaded attempt {}", attempt_id);
                NetEvent::Loaded(Box::new(seed))
            }
            Err(e) => {
                tracing::warn!("Failed to load attempt {}: {}", attempt_id, e);
                NetEvent::LoadFailed(e.to_string())
            }
        },
        NetJob::SaveAnswers { attempt_id, writes } => {
            match loader.api().save_answers(&attempt_id, &writes) {
                Ok(()) => {
                    tracing::info!("Saved {} answers for attempt {}", writes.len(), attempt_id);
                    NetEvent::Saved { writes }
                }
                Err(e) => {
                    tracing::warn!("Autosave failed for attempt {}: {}", attempt_id, e);
                    NetEvent::SaveFailed {
                        error: e.to_string(),
                    }
                }
            }
        }
        NetJob::SubmitAttempt {
            attempt_id,
            final_writes,
            idempotency_key,
        } => {
            // The flush is best-effort: a failure is logged and submission
            // proceeds, because the submit call is the boundary the server
            // grades against.
            if !final_writes.is_empty() {
                if let Err(e) = loader.api().save_answers(&attempt_id, &final_writes) {
                    tracing::warn!("Final flush failed for attempt {}: {}", attempt_id, e);
                }
            }
            match loader.api().submit_attempt(&attempt_id, &idempotency_key) {
                Ok(()) => {
                    tracing::info!("Submitted attempt {}", attempt_id);
                    NetEvent::Submitted
                }
                Err(e) => {
                    tracing::warn!("Submit failed for attempt {}: {}", attempt_id, e);
                    NetEvent::SubmitFailed {
                        error: e.to_string(),
                    }
                }
            }
        }
    }
}

/// Delay policy for autosave retries: the reference period normally,
/// doubled per consecutive failure, capped at eight periods.
#[derive(Debug)]
pub struct SaveBackoff {
    period: Duration,
    consecutive_failures: u32,
}

impl SaveBackoff {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            consecutive_failures: 0,
        }
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn interval(&self) -> Duration {
        let factor = 2u32.saturating_pow(self.consecutive_failures).min(8);
        self.period * factor
    }
}
