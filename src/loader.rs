use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::api::{ApiError, AttemptBundle, ExamApi};
use crate::model::{Attempt, ExamMode, ExamPaper};
use crate::timer;

/// A loaded attempt ready to become a session: the attempt, its paper, and
/// the absolute deadline computed exactly once.
#[derive(Debug, Clone)]
pub struct SessionSeed {
    pub attempt: Attempt,
    pub paper: ExamPaper,
    pub deadline: DateTime<Utc>,
}

/// Loads attempts over any `ExamApi` and caches them by attempt id, so a
/// repeated load of the same attempt never refetches.
pub struct SessionLoader<A: ExamApi> {
    api: A,
    cache: HashMap<String, SessionSeed>,
}

impl<A: ExamApi> SessionLoader<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: HashMap::new(),
        }
    }

    pub fn load(&mut self, attempt_id: &str) -> Result<SessionSeed, ApiError> {
        if let Some(seed) = self.cache.get(attempt_id) {
            return Ok(seed.clone());
        }
        let bundle = self.api.fetch_attempt(attempt_id)?;
        let seed = seed_from(bundle)?;
        self.cache.insert(attempt_id.to_string(), seed.clone());
        Ok(seed)
    }

    /// Caches a bundle already in hand (the start flow returns one), so the
    /// first `load` after starting an attempt needs no network.
    pub fn prime(&mut self, bundle: AttemptBundle) -> Result<SessionSeed, ApiError> {
        let seed = seed_from(bundle)?;
        self.cache.insert(seed.attempt.id.clone(), seed.clone());
        Ok(seed)
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

fn seed_from(bundle: AttemptBundle) -> Result<SessionSeed, ApiError> {
    if bundle.exam_paper.mode != ExamMode::Cbt {
        return Err(ApiError::NotCbt);
    }
    let deadline = timer::attempt_deadline(
        bundle.attempt.start_time,
        bundle.exam_paper.start_time,
        bundle.exam_paper.end_time,
    );
    Ok(SessionSeed {
        attempt: bundle.attempt,
        paper: bundle.exam_paper,
        deadline,
    })
}
