use super::check_error::CheckError;

#[derive(Debug)]
pub enum Outcome {
    Passed,
    Failed,
    Errored(CheckError),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored(_))
    }

    pub fn error(&self) -> Option<&CheckError> {
        match self {
            Self::Errored(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<Result<bool, CheckError>> for Outcome {
    fn from(value: Result<bool, CheckError>) -> Self {
        match value {
            Ok(true) => Outcome::Passed,
            Ok(false) => Outcome::Failed,
            Err(cause) => Outcome::Errored(cause),
        }
    }
}
