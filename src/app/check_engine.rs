use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use itertools::Itertools;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{Instrument, debug, error, info, info_span};

use crate::app::component_factory::EngineConfig;
use crate::app::{AssetRegistryError, Check, CheckError, ImageReference};
use crate::domain::certification::{check_result::CheckResult, outcome::Outcome, report::Report};

type Evaluation = (Result<bool, CheckError>, Duration);

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("check {0:?} is registered more than once")]
    DuplicateCheckName(String),

    #[error("invalid asset registry: {0}")]
    AssetRegistry(#[from] AssetRegistryError),
}

/// Runs an ordered set of checks against one image at a time.
///
/// Every check runs in its own task, bounded by the configured timeout, so a
/// panicking or stuck check only affects its own result.
pub struct CheckEngine {
    checks: Vec<Arc<dyn Check>>,
    check_timeout: Duration,
    parallel: bool,
}

impl CheckEngine {
    pub fn new(
        checks: Vec<Arc<dyn Check>>,
        config: &EngineConfig,
    ) -> Result<Self, ConfigurationError> {
        if let Some(name) = checks.iter().map(|c| c.name()).duplicates().next() {
            return Err(ConfigurationError::DuplicateCheckName(name.to_owned()));
        }

        Ok(Self {
            checks,
            check_timeout: config.check_timeout(),
            parallel: config.parallel,
        })
    }

    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub async fn run(&self, image: &ImageReference) -> Report {
        let started_at = Utc::now();
        debug!(
            "running {} checks against {image:?} ({})",
            self.checks.len(),
            if self.parallel { "parallel" } else { "sequential" }
        );

        let results = if self.parallel {
            let spawned = self
                .checks
                .iter()
                .map(|check| (check, Instant::now(), self.spawn(check, image)))
                .collect_vec();

            join_all(
                spawned
                    .into_iter()
                    .map(|(check, spawned_at, handle)| async move {
                        self.record(check, spawned_at, handle.await)
                    }),
            )
            .await
        } else {
            let mut results = Vec::with_capacity(self.checks.len());
            for check in &self.checks {
                let spawned_at = Instant::now();
                let joined = self.spawn(check, image).await;
                results.push(self.record(check, spawned_at, joined));
            }
            results
        };

        Report::new(started_at, Utc::now(), results)
    }

    fn spawn(&self, check: &Arc<dyn Check>, image: &ImageReference) -> JoinHandle<Evaluation> {
        let check = check.clone();
        let image = image.clone();
        let check_timeout = self.check_timeout;
        let span = info_span!("check", name = check.name());

        tokio::spawn(
            async move {
                let started = Instant::now();
                let verdict = match tokio::time::timeout(check_timeout, check.validate(&image)).await
                {
                    Ok(verdict) => verdict,
                    Err(_) => Err(CheckError::Timeout(check_timeout)),
                };
                (verdict, started.elapsed())
            }
            .instrument(span),
        )
    }

    fn record(
        &self,
        check: &Arc<dyn Check>,
        spawned_at: Instant,
        joined: Result<Evaluation, JoinError>,
    ) -> CheckResult {
        let (verdict, elapsed) = match joined {
            Ok(evaluation) => evaluation,
            Err(join_error) if join_error.is_panic() => (
                Err(CheckError::Panicked(panic_message(join_error.into_panic()))),
                spawned_at.elapsed(),
            ),
            Err(join_error) => (
                Err(CheckError::Aborted(join_error.to_string())),
                spawned_at.elapsed(),
            ),
        };

        let name = check.name();
        let outcome = Outcome::from(verdict);
        match &outcome {
            Outcome::Passed => info!("check {name} passed"),
            Outcome::Failed => info!("check {name} did not pass"),
            Outcome::Errored(cause) => error!("check {name} could not be evaluated: {cause}"),
        }

        CheckResult::new(
            name.to_owned(),
            outcome,
            check.metadata(),
            check.help(),
            elapsed,
        )
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
