use serde::Serialize;

use crate::domain::certification::level::Level;

/// Static description of a check, attached to every result it produces.
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub struct Metadata {
    pub description: String,
    pub level: Level,
    pub knowledge_base_url: String,
    pub check_url: String,
}
