use serde::Serialize;

/// Remediation shown to the user when a check fails or errors.
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub struct HelpText {
    pub message: String,
    pub suggestion: String,
}
