use chrono::{DateTime, Utc};

use crate::domain::certification::check_result::CheckResult;

/// Results of a single engine run, in check registration order.
#[derive(Debug)]
pub struct Report {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    results: Vec<CheckResult>,
}

impl Report {
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        results: Vec<CheckResult>,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            results,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn find_result_by_name(&self, check_name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.check_name() == check_name)
    }

    pub fn passed(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.outcome().is_passed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.outcome().is_failed())
    }

    pub fn errored(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.outcome().is_errored())
    }

    pub fn passed_overall(&self) -> bool {
        self.results.iter().all(|r| r.outcome().is_passed())
    }
}
