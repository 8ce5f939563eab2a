use std::time::Duration;

use thiserror::Error;

/// Why a check could not reach a verdict.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("unable to evaluate the image: {0}")]
    Evaluation(Box<dyn std::error::Error + Send + Sync>),

    #[error("check did not complete within {0:?}")]
    Timeout(Duration),

    #[error("check panicked: {0}")]
    Panicked(String),

    #[error("check was aborted before completing: {0}")]
    Aborted(String),
}
