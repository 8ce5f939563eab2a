use std::time::Duration;

use crate::domain::certification::help_text::HelpText;
use crate::domain::certification::metadata::Metadata;
use crate::domain::certification::outcome::Outcome;

#[derive(Debug)]
pub struct CheckResult {
    check_name: String,
    outcome: Outcome,
    metadata: Metadata,
    help: Option<HelpText>,
    elapsed: Duration,
}

impl CheckResult {
    /// Help is only kept for outcomes that did not pass.
    pub fn new(
        check_name: String,
        outcome: Outcome,
        metadata: Metadata,
        help: HelpText,
        elapsed: Duration,
    ) -> Self {
        let help = if outcome.is_passed() { None } else { Some(help) };

        Self {
            check_name,
            outcome,
            metadata,
            help,
            elapsed,
        }
    }

    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn help(&self) -> Option<&HelpText> {
        self.help.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
