use std::fmt::{Display, Formatter};

use serde::Serialize;

#[derive(PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Best,
    Good,
    Optional,
    Required,
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Level::Best => "best",
                Level::Good => "good",
                Level::Optional => "optional",
                Level::Required => "required",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn it_renders_levels_in_lowercase() {
        assert_eq!(Level::Best.to_string(), "best");
        assert_eq!(Level::Required.to_string(), "required");
        assert_eq!(serde_json::to_string(&Level::Good).unwrap(), "\"good\"");
    }
}
